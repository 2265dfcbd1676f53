use std::collections::HashSet;

use crate::group::FlagGroup;

/// Something a command framework can ask for tab-completion candidates.
/// `config` selects what to complete (e.g. a flag group name) and `args`
/// are the arguments typed so far, the last one being the partial word.
pub trait CompletionProvider: Send + Sync {
    /// The name the provider is registered under.
    fn id(&self) -> &str;
    fn complete(&self, config: &str, args: &[String]) -> Vec<String>;
}

/// The `Completion` Builder.
pub struct CompletionBuilder {
    entries: Vec<String>,
    query: Option<String>,
}

impl CompletionBuilder {
    #[inline]
    pub fn new() -> CompletionBuilder {
        CompletionBuilder {
            entries: Vec::new(),
            query: None,
        }
    }

    #[inline]
    pub fn entries(mut self, entries: Vec<String>) -> CompletionBuilder {
        self.entries = entries;
        self
    }

    /// Keeps only entries starting with `query`, ignoring case.
    #[inline]
    pub fn search(mut self, query: Option<&str>) -> CompletionBuilder {
        self.query = query.map(|query| query.to_lowercase());
        self
    }

    /// Returns the matching entries in their original order, without
    /// duplicates.
    pub fn build(self) -> Vec<String> {
        let mut seen = HashSet::new();
        let query = self.query;
        self.entries
            .into_iter()
            .filter(|entry| match &query {
                Some(query) => entry.to_lowercase().starts_with(query.as_str()),
                None => true,
            })
            .filter(|entry| seen.insert(entry.clone()))
            .collect()
    }
}

impl Default for CompletionBuilder {
    fn default() -> CompletionBuilder {
        CompletionBuilder::new()
    }
}

/// Suggestions for the last of `args`, narrowed down to what has been typed
/// of it so far.
pub fn complete<S: AsRef<str>>(group: &FlagGroup, args: &[S]) -> Vec<String> {
    let current_word = args.last().map(|arg| arg.as_ref());
    trace!("complete: args={}, current='{:?}'", args.len(), current_word);
    CompletionBuilder::new()
        .entries(group.suggest_next(args))
        .search(current_word)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creator::{NumberCreator, SwitchCreator};
    use pretty_assertions::assert_eq;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn builder() {
        let entries = strings(&["--count", "--Color", "--verbose", "--count"]);
        assert_eq!(
            CompletionBuilder::new().entries(entries.clone()).build(),
            strings(&["--count", "--Color", "--verbose"])
        );
        assert_eq!(
            CompletionBuilder::new()
                .entries(entries)
                .search(Some("--C"))
                .build(),
            strings(&["--count", "--Color"])
        );
    }

    #[test]
    fn complete_partial_words() {
        let mut builder = FlagGroup::builder();
        builder.add(NumberCreator::<i32>::new("count", "--count").range(1, 12).create());
        builder.add(SwitchCreator::new("verbose", "--verbose").create());
        let group = builder.build().unwrap();

        assert_eq!(complete(&group, &["--c"]), strings(&["--count"]));
        assert_eq!(complete(&group, &["--count", "1"]), strings(&["1", "10", "11", "12"]));
        assert_eq!(complete(&group, &["--verbose", ""]), strings(&["--count"]));
        assert_eq!(complete(&group, &["--verbose", "x"]), Vec::<String>::new());
    }
}
