//! Errors raised while setting up flag groups and while parsing command
//! arguments.
use failure::{Error, Fail};

/// Raised when command arguments can't be turned into flag values. The
/// message is meant to be shown to the user who typed the command.
#[derive(Debug, Clone, PartialEq, Eq, Fail)]
pub enum FlagParseError {
    #[fail(display = "{} is not a valid flag.", token)]
    NotAFlag { token: String },
    #[fail(display = "{} flag '{}' requires a value input.", name, identifier)]
    RequiresValue { name: String, identifier: String },
    #[fail(display = "{} flag '{}' does not require a value.", name, identifier)]
    NoValueAccepted { name: String, identifier: String },
    #[fail(display = "{} is not a number!", input)]
    NotANumber { input: String },
    #[fail(display = "{} is not in valid range!", input)]
    OutOfRange { input: String },
    #[fail(display = "{} is not a valid value: {}", input, reason)]
    InvalidValue { input: String, reason: String },
}

impl FlagParseError {
    /// The argument(s) the error complains about.
    pub fn offending(&self) -> &str {
        match self {
            FlagParseError::NotAFlag { token } => token,
            FlagParseError::RequiresValue { identifier, .. }
            | FlagParseError::NoValueAccepted { identifier, .. } => identifier,
            FlagParseError::NotANumber { input }
            | FlagParseError::OutOfRange { input }
            | FlagParseError::InvalidValue { input, .. } => input,
        }
    }
}

/// Raised while setting up flag groups. These are fatal: nothing should run
/// on top of an inconsistent index.
#[derive(Debug, Clone, PartialEq, Eq, Fail)]
pub enum GroupError {
    #[fail(display = "flag '{}' has an empty identifier", name)]
    EmptyIdentifier { name: String },
    #[fail(display = "duplicate flag key: {}", key)]
    DuplicateKey { key: String },
    #[fail(display = "duplicate flag group name: {}", name)]
    DuplicateGroup { name: String },
    #[fail(display = "invalid flag group declaration: {}", reason)]
    Config { reason: String },
}

/// Renders `err` with every cause it wraps, outermost first, e.g.
/// `failed to load spawn.toml: unknown variant `color``.
pub fn describe(err: &Error) -> String {
    err.iter_chain()
        .map(|cause| cause.to_string())
        .collect::<Vec<_>>()
        .join(": ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn messages() {
        let err = FlagParseError::NotAFlag {
            token: "--bogus".to_owned(),
        };
        assert_eq!(err.to_string(), "--bogus is not a valid flag.");
        assert_eq!(err.offending(), "--bogus");

        let err = FlagParseError::RequiresValue {
            name: "count".to_owned(),
            identifier: "--count".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "count flag '--count' requires a value input."
        );

        let err = GroupError::DuplicateGroup {
            name: "spawn".to_owned(),
        };
        assert_eq!(err.to_string(), "duplicate flag group name: spawn");
    }

    #[test]
    fn describe_includes_causes() {
        let err: Error = GroupError::DuplicateGroup {
            name: "spawn".to_owned(),
        }
        .context("failed to register groups")
        .into();
        assert_eq!(
            describe(&err),
            "failed to register groups: duplicate flag group name: spawn"
        );
    }
}
