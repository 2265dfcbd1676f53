//! Named flag groups, looked up by the command framework when it needs
//! completions for a command's flags.
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::completion::{self, CompletionProvider};
use crate::error::GroupError;
use crate::group::FlagGroup;

/// The id under which `FlagGroupManager` provides completions. The group
/// name is passed as the provider config.
pub const PROVIDER_ID: &str = "flags";

lazy_static! {
    static ref GLOBAL: FlagGroupManager = FlagGroupManager::new();
}

/// The process-wide registry. Groups are registered during startup and only
/// read afterwards.
pub fn global() -> &'static FlagGroupManager {
    &*GLOBAL
}

/// Maps case-insensitive names to flag groups. Groups can't be replaced or
/// removed once registered.
pub struct FlagGroupManager {
    groups: RwLock<BTreeMap<String, Arc<FlagGroup>>>,
}

impl FlagGroupManager {
    pub fn new() -> FlagGroupManager {
        FlagGroupManager {
            groups: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn register(&self, name: &str, group: FlagGroup) -> Result<Arc<FlagGroup>, GroupError> {
        let group = Arc::new(group);
        self.register_shared(name, group.clone())?;
        Ok(group)
    }

    pub fn register_shared(&self, name: &str, group: Arc<FlagGroup>) -> Result<(), GroupError> {
        let name = name.to_lowercase();
        let mut groups = self.groups.write().unwrap_or_else(PoisonError::into_inner);
        if groups.contains_key(&name) {
            return Err(GroupError::DuplicateGroup { name });
        }

        debug!("registered flag group '{}' ({} flags)", name, group.len());
        groups.insert(name, group);
        Ok(())
    }

    pub fn group_for(&self, name: &str) -> Option<Arc<FlagGroup>> {
        let groups = self.groups.read().unwrap_or_else(PoisonError::into_inner);
        groups.get(&name.to_lowercase()).cloned()
    }

    pub fn groups(&self) -> Vec<Arc<FlagGroup>> {
        let groups = self.groups.read().unwrap_or_else(PoisonError::into_inner);
        groups.values().cloned().collect()
    }

    /// Registered names, lowercased and sorted.
    pub fn group_names(&self) -> Vec<String> {
        let groups = self.groups.read().unwrap_or_else(PoisonError::into_inner);
        groups.keys().cloned().collect()
    }

    /// Completion candidates for `args` within the group `name`. An unknown
    /// group yields nothing.
    pub fn complete<S: AsRef<str>>(&self, name: &str, args: &[S]) -> Vec<String> {
        match self.group_for(name) {
            Some(group) => completion::complete(&group, args),
            None => {
                warn!("no flag group with name found: {}", name);
                Vec::new()
            }
        }
    }
}

impl Default for FlagGroupManager {
    fn default() -> FlagGroupManager {
        FlagGroupManager::new()
    }
}

impl CompletionProvider for FlagGroupManager {
    fn id(&self) -> &str {
        PROVIDER_ID
    }

    fn complete(&self, config: &str, args: &[String]) -> Vec<String> {
        FlagGroupManager::complete(self, config, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creator::SwitchCreator;
    use pretty_assertions::assert_eq;

    fn switches(keys: &[&str]) -> FlagGroup {
        let mut builder = FlagGroup::builder();
        for key in keys {
            builder.add(SwitchCreator::new(key.trim_start_matches('-'), *key).create());
        }
        builder.build().unwrap()
    }

    #[test]
    fn register_and_lookup() {
        let manager = FlagGroupManager::new();
        let group = manager.register("Spawn", switches(&["--silent"])).unwrap();
        assert_eq!(manager.group_for("SPAWN").map(|g| g.id()), Some(group.id()));
        assert!(manager.group_for("teleport").is_none());

        manager.register("kill", switches(&["--all"])).unwrap();
        assert_eq!(manager.group_names(), vec!["kill".to_owned(), "spawn".to_owned()]);
        assert_eq!(manager.groups().len(), 2);
    }

    #[test]
    fn duplicate_names() {
        let manager = FlagGroupManager::new();
        manager.register("spawn", switches(&["--silent"])).unwrap();
        assert_eq!(
            manager.register("SPAWN", switches(&["--loud"])).unwrap_err(),
            GroupError::DuplicateGroup {
                name: "spawn".to_owned()
            }
        );
        // The first registration is kept.
        assert_eq!(
            manager.group_for("spawn").unwrap().identifiers(),
            &["--silent".to_owned()]
        );
    }

    #[test]
    fn completion_provider() {
        let manager = FlagGroupManager::new();
        manager.register("spawn", switches(&["--silent", "--safe", "--x"])).unwrap();

        let provider: &dyn CompletionProvider = &manager;
        assert_eq!(provider.id(), "flags");
        assert_eq!(
            provider.complete("spawn", &["--s".to_owned()]),
            vec!["--silent".to_owned(), "--safe".to_owned()]
        );
        assert_eq!(provider.complete("unknown", &["--s".to_owned()]), Vec::<String>::new());
    }
}
