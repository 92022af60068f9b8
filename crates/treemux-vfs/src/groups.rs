//! The virtual grouping table.
//!
//! Virtual groups are UI-only folders that organize backend roots; they
//! have no backend of their own. The closed [`GroupKind`] enum plus the
//! name table below replace ad-hoc string comparisons: adding a backend
//! category means one variant here and one routing rule.

use treemux_core::config::groups::GroupsConfig;

/// The closed set of virtual group kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKind {
    /// Group holding all remote backend roots.
    Remotes,
    /// Group holding all registry provider roots.
    Registries,
}

impl GroupKind {
    /// Every group kind, in display order.
    pub const ALL: [GroupKind; 2] = [GroupKind::Remotes, GroupKind::Registries];

    /// Whether paths under this group resolve back to the home
    /// aggregator (membership is precomputed and embedded in the
    /// snapshot) instead of to the member backend named by the next
    /// path segment.
    pub fn resolves_to_home(self) -> bool {
        matches!(self, GroupKind::Registries)
    }
}

/// Display-name lookup table for the virtual groups.
#[derive(Debug, Clone)]
pub struct GroupTable {
    remotes: String,
    registries: String,
}

impl GroupTable {
    /// Build the table from configuration.
    pub fn new(config: &GroupsConfig) -> Self {
        Self {
            remotes: config.remotes.clone(),
            registries: config.registries.clone(),
        }
    }

    /// Resolve a path segment to a group kind, if it names one.
    pub fn lookup(&self, name: &str) -> Option<GroupKind> {
        if name == self.remotes {
            Some(GroupKind::Remotes)
        } else if name == self.registries {
            Some(GroupKind::Registries)
        } else {
            None
        }
    }

    /// The display name of a group.
    pub fn name_of(&self, kind: GroupKind) -> &str {
        match kind {
            GroupKind::Remotes => &self.remotes,
            GroupKind::Registries => &self.registries,
        }
    }
}

impl Default for GroupTable {
    fn default() -> Self {
        Self::new(&GroupsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_round_trip() {
        let table = GroupTable::default();
        for kind in GroupKind::ALL {
            assert_eq!(table.lookup(table.name_of(kind)), Some(kind));
        }
        assert_eq!(table.lookup("Session"), None);
    }

    #[test]
    fn test_registries_resolve_to_home() {
        assert!(GroupKind::Registries.resolves_to_home());
        assert!(!GroupKind::Remotes.resolves_to_home());
    }
}
