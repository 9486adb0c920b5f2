//! Reference collection for the first (dry-run) pass.

use indexmap::{IndexMap, IndexSet};
use quill_core::{ClassName, MemberName, Reference};

/// Accumulates references while a tree is emitted without output.
///
/// Candidates are grouped by the simple name they would be imported under,
/// in first-seen order. The same canonical name is only recorded once per
/// group.
#[derive(Debug, Default)]
pub struct ReferenceCollector {
    types: IndexMap<String, IndexSet<ClassName>>,
    members: IndexMap<String, IndexSet<MemberName>>,
    referenced_types: IndexSet<String>,
    referenced_members: IndexSet<String>,
}

impl ReferenceCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// A type that could be imported under `simple_name`.
    pub fn record_type(&mut self, simple_name: &str, class: ClassName) {
        self.types
            .entry(simple_name.to_string())
            .or_default()
            .insert(class);
    }

    /// A member that could be imported under `simple_name`.
    pub fn record_member(&mut self, simple_name: &str, member: MemberName) {
        self.members
            .entry(simple_name.to_string())
            .or_default()
            .insert(member);
    }

    /// A type name already used unqualified in this file. No other type may
    /// be imported under it.
    pub fn record_referenced_type(&mut self, name: &str) {
        if !self.referenced_types.contains(name) {
            self.referenced_types.insert(name.to_string());
        }
    }

    /// A member name already used unqualified in this file. Types are free
    /// to share it.
    pub fn record_referenced_member(&mut self, name: &str) {
        if !self.referenced_members.contains(name) {
            self.referenced_members.insert(name.to_string());
        }
    }

    pub fn finish(self) -> CollectedReferences {
        CollectedReferences {
            types: self.types,
            members: self.members,
            referenced_types: self.referenced_types,
            referenced_members: self.referenced_members,
        }
    }
}

/// The immutable result of a collection pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectedReferences {
    /// Importable types grouped by simple name, in first-seen order.
    pub types: IndexMap<String, IndexSet<ClassName>>,
    /// Importable members grouped by simple name, in first-seen order.
    pub members: IndexMap<String, IndexSet<MemberName>>,
    /// Type names that already resolve to something in the file.
    pub referenced_types: IndexSet<String>,
    /// Member names that already resolve to something in the file.
    pub referenced_members: IndexSet<String>,
}

impl CollectedReferences {
    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.members.is_empty()
    }

    pub fn type_count(&self) -> usize {
        self.types.values().map(IndexSet::len).sum()
    }

    pub fn member_count(&self) -> usize {
        self.members.values().map(IndexSet::len).sum()
    }

    /// Every collected reference, types first.
    pub fn references(&self) -> impl Iterator<Item = Reference> + '_ {
        let types = self
            .types
            .values()
            .flatten()
            .cloned()
            .map(Reference::Type);
        let members = self
            .members
            .values()
            .flatten()
            .cloned()
            .map(Reference::Member);
        types.chain(members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_in_first_seen_order() {
        let mut collector = ReferenceCollector::new();
        collector.record_type("Date", ClassName::new("java.util", "Date"));
        collector.record_type("List", ClassName::new("kotlin.collections", "List"));
        collector.record_type("Date", ClassName::new("java.sql", "Date"));
        collector.record_type("Date", ClassName::new("java.util", "Date"));

        let collected = collector.finish();
        let keys: Vec<_> = collected.types.keys().cloned().collect();
        assert_eq!(keys, ["Date", "List"]);

        let dates: Vec<_> = collected.types["Date"]
            .iter()
            .map(ClassName::canonical_name)
            .collect();
        assert_eq!(dates, ["java.util.Date", "java.sql.Date"]);
        assert_eq!(collected.type_count(), 3);
    }

    #[test]
    fn test_members_are_separate() {
        let mut collector = ReferenceCollector::new();
        collector.record_type("Foo", ClassName::new("a", "Foo"));
        collector.record_member("Foo", MemberName::new("b", "Foo"));

        let collected = collector.finish();
        assert_eq!(collected.type_count(), 1);
        assert_eq!(collected.member_count(), 1);
        assert_eq!(collected.references().count(), 2);
    }

    #[test]
    fn test_referenced_names_dedup() {
        let mut collector = ReferenceCollector::new();
        collector.record_referenced_type("Taco");
        collector.record_referenced_type("Taco");
        let collected = collector.finish();
        assert_eq!(collected.referenced_types.len(), 1);
        assert!(collected.referenced_members.is_empty());
        assert!(collected.is_empty());
    }

    #[test]
    fn test_referenced_namespaces_are_separate() {
        let mut collector = ReferenceCollector::new();
        collector.record_referenced_type("Foo");
        collector.record_referenced_member("bar");
        let collected = collector.finish();
        assert!(!collected.referenced_members.contains("Foo"));
        assert!(!collected.referenced_types.contains("bar"));
    }
}
