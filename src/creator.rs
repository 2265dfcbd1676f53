//! Builders for the flags most commands need: boolean switches, bounded
//! numbers and free-form values.
use std::str::FromStr;
use std::sync::Arc;

use crate::error::FlagParseError;
use crate::flag::{Flag, FlagKind, FlagType, ValueParser};

/// Suggested values for numeric flags. A short fixed list keeps completion
/// usable; anything in range is still accepted.
const NUMBER_SUGGESTIONS: std::ops::RangeInclusive<i64> = 1..=20;

/// Builds a `NoValue` flag resolving to a `bool`.
pub struct SwitchCreator {
    name: String,
    identifier: String,
    aliases: Vec<String>,
    present: bool,
}

impl SwitchCreator {
    pub fn new<N: Into<String>, I: Into<String>>(name: N, identifier: I) -> SwitchCreator {
        SwitchCreator {
            name: name.into(),
            identifier: identifier.into(),
            aliases: Vec::new(),
            present: true,
        }
    }

    pub fn alias<S: Into<String>>(mut self, alias: S) -> SwitchCreator {
        self.aliases.push(alias.into());
        self
    }

    /// The value when the key is given. The absent value is its negation.
    pub fn present_value(mut self, present: bool) -> SwitchCreator {
        self.present = present;
        self
    }

    pub fn create(self) -> Flag<bool> {
        let flag = Flag::no_value(self.name, self.identifier, self.present, !self.present);
        self.aliases.into_iter().fold(flag, Flag::alias)
    }
}

/// Builds a `RequiredValue` flag holding a number, optionally bounded by an
/// inclusive range.
///
/// The default is `T::default()` unless `default_value` is called. It is not
/// checked against the range: an absent flag may resolve to a value its own
/// parser would reject.
pub struct NumberCreator<T> {
    name: String,
    identifier: String,
    aliases: Vec<String>,
    parser: Option<ValueParser<T>>,
    default: Option<T>,
    min: Option<T>,
    max: Option<T>,
    suggestions: Option<Vec<String>>,
}

impl<T> NumberCreator<T>
where
    T: FlagType + FromStr + PartialOrd + Default,
{
    pub fn new<N: Into<String>, I: Into<String>>(name: N, identifier: I) -> NumberCreator<T> {
        NumberCreator {
            name: name.into(),
            identifier: identifier.into(),
            aliases: Vec::new(),
            parser: None,
            default: None,
            min: None,
            max: None,
            suggestions: None,
        }
    }

    pub fn alias<S: Into<String>>(mut self, alias: S) -> NumberCreator<T> {
        self.aliases.push(alias.into());
        self
    }

    /// Replaces the `FromStr` based parser.
    pub fn parser<F>(mut self, parser: F) -> NumberCreator<T>
    where
        F: Fn(&str) -> Result<T, FlagParseError> + Send + Sync + 'static,
    {
        self.parser = Some(Arc::new(parser));
        self
    }

    pub fn default_value(mut self, default: T) -> NumberCreator<T> {
        self.default = Some(default);
        self
    }

    pub fn range(mut self, min: T, max: T) -> NumberCreator<T> {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn min(mut self, min: T) -> NumberCreator<T> {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: T) -> NumberCreator<T> {
        self.max = Some(max);
        self
    }

    pub fn suggestions(mut self, suggestions: Vec<String>) -> NumberCreator<T> {
        self.suggestions = Some(suggestions);
        self
    }

    pub fn create(self) -> Flag<T> {
        let convert: ValueParser<T> = match self.parser {
            Some(parser) => parser,
            None => Arc::new(|input: &str| {
                input.trim().parse::<T>().map_err(|_| FlagParseError::NotANumber {
                    input: input.to_owned(),
                })
            }),
        };

        let bounds = Bounds {
            min: self.min,
            max: self.max,
        };

        let suggestions = match self.suggestions {
            Some(suggestions) => suggestions,
            None => NUMBER_SUGGESTIONS
                .map(|n| n.to_string())
                .filter(|n| matches!(convert(n.as_str()), Ok(num) if bounds.contains(&num)))
                .collect(),
        };

        let default = self.default.unwrap_or_default();
        if !bounds.contains(&default) {
            debug!(
                "flag '{}': default {:?} is outside its range",
                self.identifier, default
            );
        }

        let parser = move |input: &str| {
            let num = convert(input)?;
            if !bounds.contains(&num) {
                return Err(FlagParseError::OutOfRange {
                    input: input.to_owned(),
                });
            }
            Ok(num)
        };

        let flag = Flag::required_value(self.name, self.identifier, default, parser)
            .suggestions(move || suggestions.clone());
        self.aliases.into_iter().fold(flag, Flag::alias)
    }
}

struct Bounds<T> {
    min: Option<T>,
    max: Option<T>,
}

impl<T: PartialOrd> Bounds<T> {
    fn contains(&self, num: &T) -> bool {
        if matches!(&self.min, Some(min) if num < min) {
            return false;
        }
        if matches!(&self.max, Some(max) if num > max) {
            return false;
        }
        true
    }
}

/// Builds a flag holding any value produced by `parser`. The flag requires a
/// value unless `optional` or `present_value` is called.
pub struct ValueCreator<T> {
    name: String,
    identifier: String,
    aliases: Vec<String>,
    parser: ValueParser<T>,
    default: Option<T>,
    optional: bool,
    present: Option<T>,
    suggestions: Vec<String>,
}

impl<T> ValueCreator<T>
where
    T: FlagType + Default,
{
    pub fn new<N, I, F>(name: N, identifier: I, parser: F) -> ValueCreator<T>
    where
        N: Into<String>,
        I: Into<String>,
        F: Fn(&str) -> Result<T, FlagParseError> + Send + Sync + 'static,
    {
        ValueCreator {
            name: name.into(),
            identifier: identifier.into(),
            aliases: Vec::new(),
            parser: Arc::new(parser),
            default: None,
            optional: false,
            present: None,
            suggestions: Vec::new(),
        }
    }

    pub fn alias<S: Into<String>>(mut self, alias: S) -> ValueCreator<T> {
        self.aliases.push(alias.into());
        self
    }

    pub fn default_value(mut self, default: T) -> ValueCreator<T> {
        self.default = Some(default);
        self
    }

    pub fn optional(mut self) -> ValueCreator<T> {
        self.optional = true;
        self
    }

    /// The value when the key is given without an argument.
    pub fn present_value(mut self, present: T) -> ValueCreator<T> {
        self.optional = true;
        self.present = Some(present);
        self
    }

    pub fn suggestions(mut self, suggestions: Vec<String>) -> ValueCreator<T> {
        self.suggestions = suggestions;
        self
    }

    pub fn create(self) -> Flag<T> {
        let default = self.default.unwrap_or_default();
        let kind = if self.optional {
            FlagKind::OptionalValue {
                parser: self.parser,
                present: self.present,
                default,
            }
        } else {
            FlagKind::RequiredValue {
                parser: self.parser,
                default,
            }
        };

        let suggestions = self.suggestions;
        let flag = Flag::new(self.name, self.identifier, kind).suggestions(move || suggestions.clone());
        self.aliases.into_iter().fold(flag, Flag::alias)
    }
}

/// A parser accepting one of `choices`, matched case-insensitively and
/// returned in its declared spelling.
pub fn choice_parser(
    choices: Vec<String>,
) -> impl Fn(&str) -> Result<String, FlagParseError> + Send + Sync + 'static {
    move |input: &str| {
        choices
            .iter()
            .find(|choice| choice.eq_ignore_ascii_case(input))
            .cloned()
            .ok_or_else(|| FlagParseError::InvalidValue {
                input: input.to_owned(),
                reason: format!("expected one of {}", choices.join(", ")),
            })
    }
}
