//! A single command flag: its keys, the kind of value it takes and how a raw
//! argument turns into a typed value.
use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::FlagParseError;
use crate::result::Binding;

/// Any type a flag can resolve to.
pub trait FlagType: Clone + fmt::Debug + Send + Sync + 'static {}

impl<T: Clone + fmt::Debug + Send + Sync + 'static> FlagType for T {}

/// A resolved value with its concrete type erased. Downcast it through
/// `as_any`.
pub trait FlagValue: fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

impl<T: FlagType> FlagValue for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub type ValueParser<T> = Arc<dyn Fn(&str) -> Result<T, FlagParseError> + Send + Sync>;
pub type ValueSuggester = Arc<dyn Fn() -> Vec<String> + Send + Sync>;

/// Whether a flag never, always or optionally consumes the next argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    NoValue,
    RequiredValue,
    OptionalValue,
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::NoValue => write!(f, "no value"),
            Variant::RequiredValue => write!(f, "required value"),
            Variant::OptionalValue => write!(f, "optional value"),
        }
    }
}

/// How a flag gets its value.
#[derive(Clone)]
pub enum FlagKind<T> {
    /// `--verbose`. Never takes an argument; the key alone yields `present`.
    NoValue { present: T, absent: T },
    /// `--count 5`. The key must be followed by a value.
    RequiredValue { parser: ValueParser<T>, default: T },
    /// `--name [value]`. Without a value the flag resolves to `present`, or
    /// to `default` if no `present` value is declared.
    OptionalValue {
        parser: ValueParser<T>,
        present: Option<T>,
        default: T,
    },
}

impl<T> FlagKind<T> {
    pub fn variant(&self) -> Variant {
        match self {
            FlagKind::NoValue { .. } => Variant::NoValue,
            FlagKind::RequiredValue { .. } => Variant::RequiredValue,
            FlagKind::OptionalValue { .. } => Variant::OptionalValue,
        }
    }
}

#[derive(Clone)]
pub struct Flag<T> {
    name: String,
    identifier: String,
    aliases: Vec<String>,
    kind: FlagKind<T>,
    suggester: Option<ValueSuggester>,
}

impl<T: FlagType> Flag<T> {
    pub fn new<N, I>(name: N, identifier: I, kind: FlagKind<T>) -> Flag<T>
    where
        N: Into<String>,
        I: Into<String>,
    {
        Flag {
            name: name.into(),
            identifier: identifier.into(),
            aliases: Vec::new(),
            kind,
            suggester: None,
        }
    }

    pub fn no_value<N, I>(name: N, identifier: I, present: T, absent: T) -> Flag<T>
    where
        N: Into<String>,
        I: Into<String>,
    {
        Flag::new(name, identifier, FlagKind::NoValue { present, absent })
    }

    pub fn required_value<N, I, F>(name: N, identifier: I, default: T, parser: F) -> Flag<T>
    where
        N: Into<String>,
        I: Into<String>,
        F: Fn(&str) -> Result<T, FlagParseError> + Send + Sync + 'static,
    {
        let parser: ValueParser<T> = Arc::new(parser);
        Flag::new(name, identifier, FlagKind::RequiredValue { parser, default })
    }

    pub fn optional_value<N, I, F>(name: N, identifier: I, default: T, parser: F) -> Flag<T>
    where
        N: Into<String>,
        I: Into<String>,
        F: Fn(&str) -> Result<T, FlagParseError> + Send + Sync + 'static,
    {
        let parser: ValueParser<T> = Arc::new(parser);
        Flag::new(
            name,
            identifier,
            FlagKind::OptionalValue {
                parser,
                present: None,
                default,
            },
        )
    }

    /// Adds another key the flag can be referred by.
    pub fn alias<S: Into<String>>(mut self, alias: S) -> Flag<T> {
        self.aliases.push(alias.into());
        self
    }

    /// Sets the candidates offered when completing this flag's value.
    pub fn suggestions<F>(mut self, suggester: F) -> Flag<T>
    where
        F: Fn() -> Vec<String> + Send + Sync + 'static,
    {
        self.suggester = Some(Arc::new(suggester));
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    #[inline]
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    #[inline]
    pub fn kind(&self) -> &FlagKind<T> {
        &self.kind
    }

    #[inline]
    pub fn variant(&self) -> Variant {
        self.kind.variant()
    }

    /// Converts a raw argument into the flag's value. A `NoValue` flag
    /// rejects any input.
    pub fn parse_value(&self, input: &str) -> Result<T, FlagParseError> {
        match &self.kind {
            FlagKind::NoValue { .. } => Err(self.no_value_accepted()),
            FlagKind::RequiredValue { parser, .. } | FlagKind::OptionalValue { parser, .. } => {
                parser(input)
            }
        }
    }

    /// The value implied by the key appearing without an argument. `None`
    /// for `RequiredValue` flags: they can't be given without one.
    pub fn implicit_value(&self) -> Option<T> {
        match &self.kind {
            FlagKind::NoValue { present, .. } => Some(present.clone()),
            FlagKind::RequiredValue { .. } => None,
            FlagKind::OptionalValue {
                present, default, ..
            } => Some(present.as_ref().unwrap_or(default).clone()),
        }
    }

    /// The value used when the flag is absent from the arguments.
    pub fn default_value(&self) -> T {
        match &self.kind {
            FlagKind::NoValue { absent, .. } => absent.clone(),
            FlagKind::RequiredValue { default, .. } | FlagKind::OptionalValue { default, .. } => {
                default.clone()
            }
        }
    }

    pub fn suggest_values(&self) -> Vec<String> {
        match (&self.kind, &self.suggester) {
            (FlagKind::NoValue { .. }, _) | (_, None) => Vec::new(),
            (_, Some(suggester)) => suggester(),
        }
    }

    fn requires_value(&self) -> FlagParseError {
        FlagParseError::RequiresValue {
            name: self.name.clone(),
            identifier: self.identifier.clone(),
        }
    }

    fn no_value_accepted(&self) -> FlagParseError {
        FlagParseError::NoValueAccepted {
            name: self.name.clone(),
            identifier: self.identifier.clone(),
        }
    }
}

impl<T> fmt::Debug for Flag<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flag")
            .field("name", &self.name)
            .field("identifier", &self.identifier)
            .field("aliases", &self.aliases)
            .field("variant", &self.kind.variant())
            .finish()
    }
}

/// A `Flag<T>` with `T` erased so that flags of different types can share
/// one group.
pub(crate) trait AnyFlag: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;
    fn identifier(&self) -> &str;
    fn aliases(&self) -> &[String];
    fn variant(&self) -> Variant;
    fn suggest_values(&self) -> Vec<String>;
    fn as_any(&self) -> &dyn Any;
    fn default_boxed(&self) -> Box<dyn FlagValue>;

    /// Binds the flag with the argument following its key, or with nothing.
    /// An empty argument counts as nothing.
    fn consume(&self, input: Option<&str>) -> Result<Binding, FlagParseError>;
}

impl<T: FlagType> AnyFlag for Flag<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn aliases(&self) -> &[String] {
        &self.aliases
    }

    fn variant(&self) -> Variant {
        self.kind.variant()
    }

    fn suggest_values(&self) -> Vec<String> {
        Flag::suggest_values(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn default_boxed(&self) -> Box<dyn FlagValue> {
        Box::new(self.default_value())
    }

    fn consume(&self, input: Option<&str>) -> Result<Binding, FlagParseError> {
        let input = input.filter(|input| !input.is_empty());
        match (&self.kind, input) {
            (FlagKind::NoValue { present, .. }, None) => Ok(Binding::implied(present.clone())),
            (FlagKind::NoValue { .. }, Some(_)) => Err(self.no_value_accepted()),
            (FlagKind::RequiredValue { .. }, None) => Err(self.requires_value()),
            (FlagKind::OptionalValue { present, default, .. }, None) => {
                Ok(Binding::implied(present.as_ref().unwrap_or(default).clone()))
            }
            (FlagKind::RequiredValue { parser, .. }, Some(input))
            | (FlagKind::OptionalValue { parser, .. }, Some(input)) => {
                Ok(Binding::user_input(parser(input)?))
            }
        }
    }
}
