//! Values resolved from command arguments for one `FlagGroup`.
use std::fmt;

use crate::error::FlagParseError;
use crate::flag::{FlagType, FlagValue, Variant};
use crate::group::{FlagGroup, FlagInfo, FlagKey};

/// Where a flag's value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// Parsed from an argument the user typed.
    UserInput,
    /// The flag was given without a value, or bound programmatically.
    Implied,
    /// The flag was not given at all.
    Default,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::UserInput => write!(f, "user input"),
            Source::Implied => write!(f, "implied"),
            Source::Default => write!(f, "default"),
        }
    }
}

#[derive(Debug)]
pub(crate) struct Binding {
    value: Box<dyn FlagValue>,
    source: Source,
}

impl Binding {
    pub(crate) fn user_input<T: FlagType>(value: T) -> Binding {
        Binding {
            value: Box::new(value),
            source: Source::UserInput,
        }
    }

    pub(crate) fn implied<T: FlagType>(value: T) -> Binding {
        Binding {
            value: Box::new(value),
            source: Source::Implied,
        }
    }

    pub(crate) fn value(&self) -> &dyn FlagValue {
        &*self.value
    }

    pub(crate) fn source(&self) -> Source {
        self.source
    }
}

/// One flag of a result, as yielded by `FlagResult::iter`.
#[derive(Debug)]
pub struct Entry<'a> {
    pub info: FlagInfo<'a>,
    /// The `Debug` rendering of the resolved value.
    pub value: String,
    pub source: Source,
}

/// The values of all flags of a group, as given by one command invocation.
/// Flags that were not given resolve to their defaults.
pub struct FlagResult<'g> {
    group: &'g FlagGroup,
    bindings: Vec<Option<Binding>>,
}

impl<'g> FlagResult<'g> {
    /// A result where every flag has its default value.
    pub fn empty(group: &'g FlagGroup) -> FlagResult<'g> {
        FlagResult {
            group,
            bindings: (0..group.len()).map(|_| None).collect(),
        }
    }

    /// Parses command arguments into flag values.
    ///
    /// The first argument must be a flag key. Every following argument is
    /// either a key or the value of the flag before it, depending on that
    /// flag's variant:
    ///
    /// - `NoValue`: the next argument must be a key.
    /// - `OptionalValue`: a key is treated as a key, anything else as the
    ///   value.
    /// - `RequiredValue`: the next argument must not be a key.
    ///
    /// Nothing is returned if any argument is rejected.
    pub fn parse<S: AsRef<str>>(
        args: &[S],
        group: &'g FlagGroup,
    ) -> Result<FlagResult<'g>, FlagParseError> {
        let mut result = FlagResultBuilder::new(group);
        if args.is_empty() {
            return Ok(result.finish());
        }

        let mut current = group.index_of(args[0].as_ref());
        let mut i = 1;
        loop {
            // `args[i - 1]` is the argument `current` was looked up from.
            let flag = match current {
                Some(flag) => flag,
                None => {
                    return Err(FlagParseError::NotAFlag {
                        token: args[i - 1].as_ref().to_owned(),
                    });
                }
            };

            if i >= args.len() {
                // Reached the end with a pending flag. A `RequiredValue` flag
                // fails here.
                result.bind_index(flag, None)?;
                break;
            }

            let arg = args[i].as_ref();
            let next = group.index_of(arg);
            let variant = group.flag_at(flag).variant();
            trace!(
                "parse: flag='{}' ({}), arg='{}', is_key={}",
                group.flag_at(flag).identifier(),
                variant,
                arg,
                next.is_some()
            );

            match variant {
                Variant::NoValue => {
                    result.bind_index(flag, None)?;
                    current = next;
                    i += 1;
                }
                Variant::OptionalValue if next.is_some() => {
                    result.bind_index(flag, None)?;
                    current = next;
                    i += 1;
                }
                Variant::RequiredValue if next.is_some() => {
                    let flag = group.flag_at(flag);
                    return Err(FlagParseError::RequiresValue {
                        name: flag.name().to_owned(),
                        identifier: flag.identifier().to_owned(),
                    });
                }
                Variant::OptionalValue | Variant::RequiredValue => {
                    result.bind_index(flag, Some(arg))?;
                    if i + 1 >= args.len() {
                        break;
                    }
                    current = group.index_of(args[i + 1].as_ref());
                    i += 2;
                }
            }
        }

        Ok(result.finish())
    }

    /// The value of `flag`, or its default if it wasn't given.
    ///
    /// Panics if `flag` belongs to another group.
    pub fn value_of<T: FlagType>(&self, flag: &FlagKey<T>) -> T {
        let typed = self.group.typed_flag(flag);
        match &self.bindings[flag.index()] {
            Some(binding) => match binding.value().as_any().downcast_ref::<T>() {
                Some(value) => value.clone(),
                None => panic!(
                    "flag '{}' is bound to a value of another type",
                    typed.identifier()
                ),
            },
            None => typed.default_value(),
        }
    }

    /// Panics if `flag` belongs to another group.
    pub fn source<T: FlagType>(&self, flag: &FlagKey<T>) -> Source {
        self.group.typed_flag(flag);
        self.bindings[flag.index()]
            .as_ref()
            .map(Binding::source)
            .unwrap_or(Source::Default)
    }

    /// Whether the value of `flag` was typed by the user.
    pub fn is_user_supplied<T: FlagType>(&self, flag: &FlagKey<T>) -> bool {
        self.source(flag) == Source::UserInput
    }

    /// Whether `flag` was absent from the arguments and so holds its default.
    pub fn is_defaulted<T: FlagType>(&self, flag: &FlagKey<T>) -> bool {
        self.source(flag) == Source::Default
    }

    pub fn group(&self) -> &'g FlagGroup {
        self.group
    }

    pub fn is_for_group(&self, group: &FlagGroup) -> bool {
        self.group.id() == group.id()
    }

    /// Every flag of the group with its resolved value.
    pub fn iter(&self) -> impl Iterator<Item = Entry<'_>> + '_ {
        self.group.flags().map(move |info| {
            let (value, source) = match &self.bindings[info.index] {
                Some(binding) => (format!("{:?}", binding.value()), binding.source()),
                None => (
                    format!("{:?}", self.group.flag_at(info.index).default_boxed()),
                    Source::Default,
                ),
            };
            Entry {
                info,
                value,
                source,
            }
        })
    }
}

impl<'g> fmt::Debug for FlagResult<'g> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.iter()
                    .map(|entry| (entry.info.identifier, (entry.value, entry.source))),
            )
            .finish()
    }
}

/// Builds a `FlagResult` flag by flag.
pub struct FlagResultBuilder<'g> {
    result: FlagResult<'g>,
}

impl<'g> FlagResultBuilder<'g> {
    pub fn new(group: &'g FlagGroup) -> FlagResultBuilder<'g> {
        FlagResultBuilder {
            result: FlagResult::empty(group),
        }
    }

    /// Binds `flag` the way the parser does when it meets the flag's key
    /// followed by `input` (or by nothing).
    ///
    /// Panics if `flag` belongs to another group.
    pub fn bind_input<T: FlagType>(
        &mut self,
        flag: &FlagKey<T>,
        input: Option<&str>,
    ) -> Result<&mut FlagResultBuilder<'g>, FlagParseError> {
        self.result.group.typed_flag(flag);
        self.bind_index(flag.index(), input)?;
        Ok(self)
    }

    /// Binds `flag` to `value`. The value is not considered user input.
    ///
    /// Panics if `flag` belongs to another group.
    pub fn bind<T: FlagType>(&mut self, flag: &FlagKey<T>, value: T) -> &mut FlagResultBuilder<'g> {
        self.result.group.typed_flag(flag);
        self.set(flag.index(), Binding::implied(value));
        self
    }

    pub fn finish(self) -> FlagResult<'g> {
        self.result
    }

    pub(crate) fn bind_index(&mut self, index: usize, input: Option<&str>) -> Result<(), FlagParseError> {
        let binding = self.result.group.flag_at(index).consume(input)?;
        self.set(index, binding);
        Ok(())
    }

    fn set(&mut self, index: usize, binding: Binding) {
        let slot = &mut self.result.bindings[index];
        if slot.is_some() {
            warn!(
                "flag '{}' given more than once; keeping the last value",
                self.result.group.flag_at(index).identifier()
            );
        }
        *slot = Some(binding);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creator::{NumberCreator, SwitchCreator, ValueCreator};
    use pretty_assertions::assert_eq;

    struct Sample {
        group: FlagGroup,
        count: FlagKey<i32>,
        verbose: FlagKey<bool>,
        title: FlagKey<String>,
    }

    fn sample() -> Sample {
        let mut builder = FlagGroup::builder();
        let count = builder.add(
            NumberCreator::new("count", "--count")
                .range(1, 20)
                .default_value(1)
                .create(),
        );
        let verbose = builder.add(SwitchCreator::new("verbose", "--verbose").alias("-v").create());
        let title = builder.add(
            ValueCreator::new("title", "--title", |input: &str| Ok(input.to_owned()))
                .default_value("untitled".to_owned())
                .optional()
                .create(),
        );
        Sample {
            group: builder.build().unwrap(),
            count,
            verbose,
            title,
        }
    }

    #[test]
    fn no_arguments() {
        let s = sample();
        let none: &[&str] = &[];
        let result = FlagResult::parse(none, &s.group).unwrap();
        assert_eq!(result.value_of(&s.count), 1);
        assert_eq!(result.value_of(&s.verbose), false);
        assert_eq!(result.value_of(&s.title), "untitled");
        assert!(result.is_defaulted(&s.count));
        assert!(!result.is_user_supplied(&s.count));
        assert!(result.is_for_group(&s.group));
    }

    #[test]
    fn values_and_switches() {
        let s = sample();
        let result = s.group.parse(&["--count", "5", "--verbose"]).unwrap();
        assert_eq!(result.value_of(&s.count), 5);
        assert_eq!(result.source(&s.count), Source::UserInput);
        assert_eq!(result.value_of(&s.verbose), true);
        assert_eq!(result.source(&s.verbose), Source::Implied);
        assert!(!result.is_defaulted(&s.verbose));
        assert!(result.is_defaulted(&s.title));
    }

    #[test]
    fn optional_value() {
        let s = sample();
        let result = s.group.parse(&["--title", "-v"]).unwrap();
        assert_eq!(result.value_of(&s.title), "untitled");
        assert_eq!(result.source(&s.title), Source::Implied);
        assert_eq!(result.value_of(&s.verbose), true);

        let result = s.group.parse(&["--title", "hello", "--count", "3"]).unwrap();
        assert_eq!(result.value_of(&s.title), "hello");
        assert!(result.is_user_supplied(&s.title));
        assert_eq!(result.value_of(&s.count), 3);

        let result = s.group.parse(&["-v", "--title"]).unwrap();
        assert_eq!(result.source(&s.title), Source::Implied);
    }

    #[test]
    fn errors() {
        let s = sample();
        let err = s.group.parse(&["--verbose", "--count"]).unwrap_err();
        assert_eq!(err.to_string(), "count flag '--count' requires a value input.");

        let err = s.group.parse(&["--count", "-v"]).unwrap_err();
        assert_eq!(err.to_string(), "count flag '--count' requires a value input.");

        let err = s.group.parse(&["--bogus"]).unwrap_err();
        assert_eq!(
            err,
            FlagParseError::NotAFlag {
                token: "--bogus".to_owned()
            }
        );

        // A switch never takes a value.
        let err = s.group.parse(&["--verbose", "yes"]).unwrap_err();
        assert_eq!(err.to_string(), "yes is not a valid flag.");

        // After a value the next argument must be a key again.
        let err = s.group.parse(&["--count", "2", "3"]).unwrap_err();
        assert_eq!(err.to_string(), "3 is not a valid flag.");
        let err = s.group.parse(&["--title", "a", "b"]).unwrap_err();
        assert_eq!(err.to_string(), "b is not a valid flag.");

        let err = s.group.parse(&["--count", "50"]).unwrap_err();
        assert_eq!(err, FlagParseError::OutOfRange { input: "50".to_owned() });
    }

    #[test]
    fn last_occurrence_wins() {
        let s = sample();
        let result = s.group.parse(&["--count", "2", "--count", "4"]).unwrap();
        assert_eq!(result.value_of(&s.count), 4);
    }

    #[test]
    fn builder() {
        let s = sample();
        let mut builder = FlagResultBuilder::new(&s.group);
        builder
            .bind_input(&s.count, Some("7"))
            .unwrap()
            .bind(&s.verbose, true);
        let result = builder.finish();
        assert_eq!(result.value_of(&s.count), 7);
        assert!(result.is_user_supplied(&s.count));
        assert_eq!(result.value_of(&s.verbose), true);
        assert!(!result.is_user_supplied(&s.verbose));
        assert!(!result.is_defaulted(&s.verbose));

        let mut builder = FlagResultBuilder::new(&s.group);
        assert!(builder.bind_input(&s.count, None).is_err());
        assert_eq!(
            builder.bind_input(&s.verbose, Some("x")).err(),
            Some(FlagParseError::NoValueAccepted {
                name: "verbose".to_owned(),
                identifier: "--verbose".to_owned(),
            })
        );
    }

    #[test]
    fn entries() {
        let s = sample();
        let result = s.group.parse(&["--count", "5"]).unwrap();
        let entries: Vec<(String, String, Source)> = result
            .iter()
            .map(|entry| (entry.info.identifier.to_owned(), entry.value, entry.source))
            .collect();
        assert_eq!(
            entries,
            vec![
                ("--count".to_owned(), "5".to_owned(), Source::UserInput),
                ("--verbose".to_owned(), "false".to_owned(), Source::Default),
                ("--title".to_owned(), "\"untitled\"".to_owned(), Source::Default),
            ]
        );
    }

    #[test]
    #[should_panic(expected = "Flag is not in group")]
    fn foreign_flag() {
        let s = sample();
        let other = sample();
        let result = FlagResult::empty(&s.group);
        result.value_of(&other.count);
    }
}
