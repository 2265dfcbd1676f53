//! A group of flags with their keys indexed for lookup.
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{FlagParseError, GroupError};
use crate::flag::{AnyFlag, Flag, FlagType, Variant};
use crate::result::FlagResult;

static NEXT_GROUP_ID: AtomicUsize = AtomicUsize::new(0);

lazy_static! {
    static ref EMPTY: FlagGroup = FlagGroup {
        id: GroupId::next(),
        flags: Vec::new(),
        index: HashMap::new(),
        identifiers: Vec::new(),
    };
}

/// Distinguishes groups from each other so that a `FlagKey` can't be used
/// with a group it wasn't created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupId(usize);

impl GroupId {
    fn next() -> GroupId {
        GroupId(NEXT_GROUP_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A typed handle to a flag in a specific group.
pub struct FlagKey<T> {
    group: GroupId,
    index: usize,
    marker: PhantomData<fn() -> T>,
}

impl<T> FlagKey<T> {
    fn new(group: GroupId, index: usize) -> FlagKey<T> {
        FlagKey {
            group,
            index,
            marker: PhantomData,
        }
    }

    #[inline]
    pub fn group(&self) -> GroupId {
        self.group
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }
}

impl<T> Clone for FlagKey<T> {
    fn clone(&self) -> FlagKey<T> {
        *self
    }
}

impl<T> Copy for FlagKey<T> {}

impl<T> PartialEq for FlagKey<T> {
    fn eq(&self, other: &FlagKey<T>) -> bool {
        self.group == other.group && self.index == other.index
    }
}

impl<T> Eq for FlagKey<T> {}

impl<T> fmt::Debug for FlagKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FlagKey({:?}, #{})", self.group, self.index)
    }
}

/// Read-only view of a flag in a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagInfo<'a> {
    pub index: usize,
    pub name: &'a str,
    pub identifier: &'a str,
    pub aliases: &'a [String],
    pub variant: Variant,
}

/// Collects flags for a new `FlagGroup`.
pub struct FlagGroupBuilder {
    id: GroupId,
    flags: Vec<Box<dyn AnyFlag>>,
}

impl FlagGroupBuilder {
    /// Adds a flag and returns the key to read its value from results of
    /// the group being built.
    pub fn add<T: FlagType>(&mut self, flag: Flag<T>) -> FlagKey<T> {
        let key = FlagKey::new(self.id, self.flags.len());
        self.flags.push(Box::new(flag));
        key
    }

    /// Indexes all identifiers and aliases. Fails if two flags share a key.
    pub fn build(self) -> Result<FlagGroup, GroupError> {
        let mut index = HashMap::new();
        let mut identifiers = Vec::with_capacity(self.flags.len());
        for (i, flag) in self.flags.iter().enumerate() {
            let identifier = flag.identifier().to_lowercase();
            if identifier.is_empty() {
                return Err(GroupError::EmptyIdentifier {
                    name: flag.name().to_owned(),
                });
            }

            let keys = std::iter::once(identifier.clone())
                .chain(flag.aliases().iter().map(|alias| alias.to_lowercase()));
            for key in keys {
                if let Some(&owner) = index.get(&key) {
                    if owner != i {
                        return Err(GroupError::DuplicateKey { key });
                    }
                }
                index.insert(key, i);
            }

            identifiers.push(identifier);
        }

        debug!("flag group {:?}: {:?}", self.id, identifiers);
        Ok(FlagGroup {
            id: self.id,
            flags: self.flags,
            index,
            identifiers,
        })
    }
}

/// An immutable set of flags. Key lookup is case-insensitive.
pub struct FlagGroup {
    id: GroupId,
    flags: Vec<Box<dyn AnyFlag>>,
    /// Lowercased identifiers and aliases to indices into `flags`.
    index: HashMap<String, usize>,
    /// Lowercased primary identifiers in declaration order.
    identifiers: Vec<String>,
}

impl FlagGroup {
    pub fn builder() -> FlagGroupBuilder {
        FlagGroupBuilder {
            id: GroupId::next(),
            flags: Vec::new(),
        }
    }

    /// The shared group without any flags.
    pub fn empty() -> &'static FlagGroup {
        &*EMPTY
    }

    #[inline]
    pub fn id(&self) -> GroupId {
        self.id
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn identifiers(&self) -> &[String] {
        &self.identifiers
    }

    pub fn flags(&self) -> impl Iterator<Item = FlagInfo<'_>> {
        (0..self.flags.len()).map(move |index| self.info(index))
    }

    /// Finds the flag `key` refers to. Absence is a normal outcome.
    pub fn lookup(&self, key: &str) -> Option<FlagInfo<'_>> {
        self.index_of(key).map(|index| self.info(index))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index_of(key).is_some()
    }

    pub fn contains<T>(&self, flag: &FlagKey<T>) -> bool {
        flag.group == self.id && flag.index < self.flags.len()
    }

    /// Returns a typed handle for the flag `key` refers to, provided it holds
    /// values of type `T`.
    pub fn key_for<T: FlagType>(&self, key: &str) -> Option<FlagKey<T>> {
        let index = self.index_of(key)?;
        if self.flags[index].as_any().is::<Flag<T>>() {
            Some(FlagKey::new(self.id, index))
        } else {
            None
        }
    }

    /// Parses `args` into flag values. See `FlagResult::parse`.
    pub fn parse<S: AsRef<str>>(&self, args: &[S]) -> Result<FlagResult<'_>, FlagParseError> {
        FlagResult::parse(args, self)
    }

    /// Suggests what may come after `args`, the last of which is the
    /// argument being typed:
    ///
    /// - After a `RequiredValue` key, only its value suggestions.
    /// - After an `OptionalValue` key, its value suggestions followed by the
    ///   identifiers of flags not given yet.
    /// - Otherwise, the identifiers of flags not given yet.
    pub fn suggest_next<S: AsRef<str>>(&self, args: &[S]) -> Vec<String> {
        let active = if args.len() < 2 {
            None
        } else {
            self.index_of(args[args.len() - 2].as_ref())
        };

        let flag = match active {
            Some(index) => &self.flags[index],
            None => return self.remaining_identifiers(args),
        };

        match flag.variant() {
            Variant::NoValue => self.remaining_identifiers(args),
            Variant::OptionalValue => {
                let mut suggestions = flag.suggest_values();
                for identifier in self.remaining_identifiers(args) {
                    if !suggestions.contains(&identifier) {
                        suggestions.push(identifier);
                    }
                }
                suggestions
            }
            Variant::RequiredValue => flag.suggest_values(),
        }
    }

    fn remaining_identifiers<S: AsRef<str>>(&self, args: &[S]) -> Vec<String> {
        let given: HashSet<usize> = args
            .iter()
            .filter_map(|arg| self.index_of(arg.as_ref()))
            .collect();

        self.identifiers
            .iter()
            .enumerate()
            .filter(|(index, _)| !given.contains(index))
            .map(|(_, identifier)| identifier.clone())
            .collect()
    }

    pub(crate) fn index_of(&self, key: &str) -> Option<usize> {
        self.index.get(&key.to_lowercase()).copied()
    }

    pub(crate) fn flag_at(&self, index: usize) -> &dyn AnyFlag {
        &*self.flags[index]
    }

    /// The flag behind `key`. Panics if the key is from another group.
    pub(crate) fn typed_flag<T: FlagType>(&self, flag: &FlagKey<T>) -> &Flag<T> {
        if !self.contains(flag) {
            panic!("Flag is not in group: {:?}", flag);
        }

        let any = &self.flags[flag.index];
        match any.as_any().downcast_ref::<Flag<T>>() {
            Some(typed) => typed,
            None => panic!(
                "flag '{}' does not hold values of type {}",
                any.identifier(),
                std::any::type_name::<T>()
            ),
        }
    }

    fn info(&self, index: usize) -> FlagInfo<'_> {
        let flag = &self.flags[index];
        FlagInfo {
            index,
            name: flag.name(),
            identifier: flag.identifier(),
            aliases: flag.aliases(),
            variant: flag.variant(),
        }
    }
}

impl fmt::Debug for FlagGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlagGroup")
            .field("id", &self.id)
            .field("identifiers", &self.identifiers)
            .field("flags", &self.flags)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creator::{NumberCreator, SwitchCreator, ValueCreator};
    use pretty_assertions::assert_eq;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn sample() -> FlagGroup {
        let mut builder = FlagGroup::builder();
        builder.add(
            NumberCreator::<i32>::new("count", "--count")
                .alias("-c")
                .range(1, 3)
                .create(),
        );
        builder.add(SwitchCreator::new("verbose", "--Verbose").create());
        builder.add(
            ValueCreator::new("name", "--name", |input: &str| Ok(input.to_owned()))
                .optional()
                .suggestions(strings(&["alex", "sam"]))
                .create(),
        );
        builder.build().unwrap()
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let group = sample();
        assert_eq!(group.identifiers(), &strings(&["--count", "--verbose", "--name"])[..]);
        assert_eq!(group.lookup("--VERBOSE").map(|info| info.name), Some("verbose"));
        assert_eq!(group.lookup("-C").map(|info| info.index), Some(0));
        assert_eq!(group.lookup("--bogus"), None);
        assert!(group.contains_key("--Name"));
    }

    #[test]
    fn duplicate_keys() {
        let mut builder = FlagGroup::builder();
        builder.add(SwitchCreator::new("a", "--all").create());
        builder.add(SwitchCreator::new("b", "--both").alias("--ALL").create());
        assert_eq!(
            builder.build().unwrap_err(),
            GroupError::DuplicateKey {
                key: "--all".to_owned()
            }
        );

        // An alias repeating its own identifier is harmless.
        let mut builder = FlagGroup::builder();
        builder.add(SwitchCreator::new("a", "--all").alias("--all").create());
        assert!(builder.build().is_ok());

        let mut builder = FlagGroup::builder();
        builder.add(SwitchCreator::new("a", "").create());
        assert_eq!(
            builder.build().unwrap_err(),
            GroupError::EmptyIdentifier {
                name: "a".to_owned()
            }
        );
    }

    #[test]
    fn typed_keys() {
        let group = sample();
        let count = group.key_for::<i32>("-c").unwrap();
        assert_eq!(count.index(), 0);
        assert!(group.contains(&count));
        assert_eq!(group.key_for::<String>("--count"), None);
        assert!(!sample().contains(&count));
    }

    #[test]
    fn empty_group() {
        let group = FlagGroup::empty();
        assert!(group.is_empty());
        assert_eq!(group.id(), FlagGroup::empty().id());
        assert_eq!(group.suggest_next(&["--x"]), Vec::<String>::new());
    }

    #[test]
    fn suggest_flag_keys() {
        let group = sample();
        let none: &[&str] = &[];
        assert_eq!(group.suggest_next(none), strings(&["--count", "--verbose", "--name"]));
        assert_eq!(group.suggest_next(&["--"]), strings(&["--count", "--verbose", "--name"]));
        // After a flag without value, only flags not given yet.
        assert_eq!(group.suggest_next(&["--verbose", ""]), strings(&["--count", "--name"]));
        // Aliases count as the flag being given.
        assert_eq!(
            group.suggest_next(&["-c", "2", "--verbose", ""]),
            strings(&["--name"])
        );
        // Unknown second to last argument.
        assert_eq!(group.suggest_next(&["2", ""]), strings(&["--count", "--verbose", "--name"]));
    }

    #[test]
    fn suggest_values() {
        let group = sample();
        assert_eq!(group.suggest_next(&["--count", ""]), strings(&["1", "2", "3"]));
        assert_eq!(
            group.suggest_next(&["--verbose", "--count", "4"]),
            strings(&["1", "2", "3"])
        );
        assert_eq!(
            group.suggest_next(&["--name", ""]),
            strings(&["alex", "sam", "--count", "--verbose"])
        );
    }
}
