//! Name resolution: from collected references to an import table.
//!
//! Resolution is a pure function of the collected references, the file's
//! explicit import requests and the lexical policy. The resulting
//! [`ImportTable`] is what the emit pass consults to pick display names.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use quill_core::{ClassName, Error, LexicalPolicy, MemberName, Reference, Result};

use crate::CollectedReferences;

/// Whether an import brings in a type or a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ImportKind {
    Type,
    Member,
}

/// One import directive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Import {
    qualified_name: String,
    alias: Option<String>,
    kind: ImportKind,
}

impl Import {
    pub fn new(qualified_name: impl Into<String>, kind: ImportKind) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            alias: None,
            kind,
        }
    }

    pub fn aliased(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn kind(&self) -> ImportKind {
        self.kind
    }

    /// `a.b.C` or `a.b.C as D`, with every segment escaped.
    pub fn render(&self, policy: &LexicalPolicy) -> Result<String> {
        let name = policy.escape_segments(&self.qualified_name)?;
        match &self.alias {
            Some(alias) => Ok(format!("{name} as {}", policy.escape(alias)?)),
            None => Ok(name),
        }
    }
}

/// An import the caller asks for, optionally under an alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRequest {
    pub reference: Reference,
    pub alias: Option<String>,
}

impl ImportRequest {
    pub fn new(reference: impl Into<Reference>) -> Self {
        Self {
            reference: reference.into(),
            alias: None,
        }
    }

    pub fn aliased(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

/// Display names and import directives for one output file.
///
/// Types and members live in separate namespaces: within each, a display
/// name maps to exactly one canonical name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportTable {
    types: IndexMap<String, ClassName>,
    members: IndexMap<String, MemberName>,
    /// Canonical name -> explicit alias.
    aliases: IndexMap<String, String>,
    imports: BTreeSet<Import>,
}

impl ImportTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from explicit requests. Two requests that would give
    /// different canonical names the same display name are an error.
    pub fn from_requests(requests: &[ImportRequest]) -> Result<Self> {
        let mut table = Self::new();
        for request in requests {
            table.request(request)?;
        }
        Ok(table)
    }

    fn request(&mut self, request: &ImportRequest) -> Result<()> {
        let canonical = request.reference.canonical_name();
        let display = request
            .alias
            .clone()
            .unwrap_or_else(|| request.reference.simple_name().to_string());

        let existing = match &request.reference {
            Reference::Type(class) => claim(&mut self.types, &display, class),
            Reference::Member(member) => claim(&mut self.members, &display, member),
        };
        if let Some(existing) = existing {
            let display_name = display.as_str();
            tracing::trace!(
                name = display_name,
                first = existing.as_str(),
                second = canonical.as_str(),
                "import conflict"
            );
            return Err(Error::import_conflict(display, existing, canonical));
        }

        let kind = match request.reference {
            Reference::Type(_) => ImportKind::Type,
            Reference::Member(_) => ImportKind::Member,
        };
        let mut import = Import::new(canonical.clone(), kind);
        if let Some(alias) = &request.alias {
            self.aliases.entry(canonical).or_insert_with(|| alias.clone());
            import = import.aliased(alias.clone());
        }
        self.imports.insert(import);
        Ok(())
    }

    /// The explicit alias a canonical name was imported under.
    pub fn alias_for(&self, canonical_name: &str) -> Option<&str> {
        self.aliases.get(canonical_name).map(String::as_str)
    }

    /// The type a simple name or alias refers to.
    pub fn imported_type(&self, display_name: &str) -> Option<&ClassName> {
        self.types.get(display_name)
    }

    /// The member a simple name or alias refers to.
    pub fn imported_member(&self, display_name: &str) -> Option<&MemberName> {
        self.members.get(display_name)
    }

    pub fn imports(&self) -> impl Iterator<Item = &Import> {
        self.imports.iter()
    }

    pub fn len(&self) -> usize {
        self.imports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.imports.is_empty()
    }

    /// Rendered import directives, sorted and deduplicated.
    pub fn render(&self, policy: &LexicalPolicy) -> Result<Vec<String>> {
        let rendered = self
            .imports
            .iter()
            .map(|import| import.render(policy))
            .collect::<Result<BTreeSet<_>>>()?;
        Ok(rendered.into_iter().collect())
    }
}

/// Insert `value` under `display` unless a different value holds it.
/// Returns the canonical name of the holder on conflict.
fn claim<T>(map: &mut IndexMap<String, T>, display: &str, value: &T) -> Option<String>
where
    T: Clone + PartialEq + std::fmt::Display,
{
    match map.get(display) {
        Some(existing) if existing != value => Some(existing.to_string()),
        Some(_) => None,
        None => {
            map.insert(display.to_string(), value.clone());
            None
        }
    }
}

/// Decide which collected references get a short name and an import.
///
/// For each simple-name group, in first-seen order:
///
/// - names already used unqualified in the same namespace, or claimed by
///   an explicit import, are left alone and the group renders qualified.
///   Types and members have separate namespaces.
/// - otherwise the first collected canonical name takes the simple name and
///   every other one in the group renders qualified with no import
/// - packages the policy imports by default get the short name but no
///   directive
pub fn resolve_imports(
    collected: &CollectedReferences,
    explicit: ImportTable,
    policy: &LexicalPolicy,
) -> ImportTable {
    let mut table = explicit;

    for (simple_name, classes) in &collected.types {
        if collected.referenced_types.contains(simple_name)
            || table.types.contains_key(simple_name)
        {
            tracing::trace!(name = %simple_name, "type name shadowed, rendering qualified");
            continue;
        }
        let Some(winner) = classes.first() else {
            continue;
        };
        if classes.len() > 1 {
            tracing::trace!(
                name = %simple_name,
                winner = %winner,
                qualified = classes.len() - 1,
                "type name clash"
            );
        }
        table.types.insert(simple_name.clone(), winner.clone());
        if !policy.is_default_import(winner.package()) {
            table
                .imports
                .insert(Import::new(winner.canonical_name(), ImportKind::Type));
        }
    }

    for (simple_name, members) in &collected.members {
        if collected.referenced_members.contains(simple_name)
            || table.members.contains_key(simple_name)
        {
            tracing::trace!(name = %simple_name, "member name shadowed, rendering qualified");
            continue;
        }
        let Some(winner) = members.first() else {
            continue;
        };
        if members.len() > 1 {
            tracing::trace!(
                name = %simple_name,
                winner = %winner,
                qualified = members.len() - 1,
                "member name clash"
            );
        }
        table.members.insert(simple_name.clone(), winner.clone());
        if !policy.is_default_import(winner.package()) {
            table
                .imports
                .insert(Import::new(winner.canonical_name(), ImportKind::Member));
        }
    }

    tracing::debug!(imports = table.len(), "resolved imports");
    table
}

#[cfg(test)]
mod tests {
    use quill_core::{LexicalPolicy, PLAIN};

    use super::*;
    use crate::ReferenceCollector;

    const WITH_DEFAULTS: LexicalPolicy = LexicalPolicy {
        default_imports: &["kotlin"],
        ..PLAIN
    };

    fn date(package: &str) -> ClassName {
        ClassName::new(package, "Date")
    }

    #[test]
    fn test_first_seen_wins() {
        let mut collector = ReferenceCollector::new();
        collector.record_type("Date", date("java.util"));
        collector.record_type("Date", date("java.sql"));

        let table = resolve_imports(&collector.finish(), ImportTable::new(), &PLAIN);
        assert_eq!(table.imported_type("Date"), Some(&date("java.util")));
        assert_eq!(table.render(&PLAIN).unwrap(), ["java.util.Date"]);
    }

    #[test]
    fn test_explicit_alias_beats_first_seen() {
        let explicit =
            ImportTable::from_requests(&[ImportRequest::new(date("java.sql")).aliased("SqlDate")])
                .unwrap();
        let mut collector = ReferenceCollector::new();
        // aliased classes are recorded under their alias
        collector.record_type("SqlDate", date("java.sql"));
        collector.record_type("Date", date("java.util"));

        let table = resolve_imports(&collector.finish(), explicit, &PLAIN);
        assert_eq!(table.alias_for("java.sql.Date"), Some("SqlDate"));
        assert_eq!(
            table.render(&PLAIN).unwrap(),
            ["java.sql.Date as SqlDate", "java.util.Date"]
        );
    }

    #[test]
    fn test_explicit_import_shadows_collected() {
        let explicit = ImportTable::from_requests(&[ImportRequest::new(date("java.sql"))]).unwrap();
        let mut collector = ReferenceCollector::new();
        collector.record_type("Date", date("java.util"));

        let table = resolve_imports(&collector.finish(), explicit, &PLAIN);
        assert_eq!(table.imported_type("Date"), Some(&date("java.sql")));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_conflicting_requests() {
        let err = ImportTable::from_requests(&[
            ImportRequest::new(date("java.util")),
            ImportRequest::new(date("java.sql")),
        ])
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "conflicting imports for 'Date': java.util.Date and java.sql.Date"
        );

        let err = ImportTable::from_requests(&[
            ImportRequest::new(ClassName::new("a", "Foo")).aliased("Bar"),
            ImportRequest::new(ClassName::new("b", "Bar")),
        ])
        .unwrap_err();
        assert!(matches!(*err, Error::ImportConflict { .. }));
    }

    #[test]
    fn test_duplicate_request_is_fine() {
        let table = ImportTable::from_requests(&[
            ImportRequest::new(date("java.util")),
            ImportRequest::new(date("java.util")),
        ])
        .unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_referenced_names_block_imports() {
        let mut collector = ReferenceCollector::new();
        collector.record_type("Taco", ClassName::new("other", "Taco"));
        collector.record_referenced_type("Taco");

        let table = resolve_imports(&collector.finish(), ImportTable::new(), &PLAIN);
        assert!(table.is_empty());
        assert!(table.imported_type("Taco").is_none());
    }

    #[test]
    fn test_local_type_does_not_block_member_import() {
        let mut collector = ReferenceCollector::new();
        collector.record_referenced_type("Foo");
        collector.record_member("Foo", MemberName::new("com.other", "Foo"));

        let table = resolve_imports(&collector.finish(), ImportTable::new(), &PLAIN);
        assert_eq!(table.render(&PLAIN).unwrap(), ["com.other.Foo"]);
        assert!(table.imported_type("Foo").is_none());
    }

    #[test]
    fn test_local_member_does_not_block_type_import() {
        let mut collector = ReferenceCollector::new();
        collector.record_referenced_member("Foo");
        collector.record_type("Foo", ClassName::new("com.other", "Foo"));

        let table = resolve_imports(&collector.finish(), ImportTable::new(), &PLAIN);
        assert_eq!(table.render(&PLAIN).unwrap(), ["com.other.Foo"]);
        assert!(table.imported_member("Foo").is_none());
    }

    #[test]
    fn test_default_imports_are_not_emitted() {
        let mut collector = ReferenceCollector::new();
        collector.record_type("String", ClassName::new("kotlin", "String"));
        collector.record_member("listOf", MemberName::new("kotlin", "listOf"));

        let table = resolve_imports(&collector.finish(), ImportTable::new(), &WITH_DEFAULTS);
        assert!(table.is_empty());
        assert!(table.imported_type("String").is_some());
        assert!(table.imported_member("listOf").is_some());
    }

    #[test]
    fn test_members_resolve_independently() {
        let mut collector = ReferenceCollector::new();
        collector.record_type("Foo", ClassName::new("a", "Foo"));
        collector.record_member("Foo", MemberName::new("b", "Foo"));

        let table = resolve_imports(&collector.finish(), ImportTable::new(), &PLAIN);
        assert_eq!(table.render(&PLAIN).unwrap(), ["a.Foo", "b.Foo"]);
    }
}
