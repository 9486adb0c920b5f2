//! Collision-free local names.

use indexmap::{IndexMap, IndexSet};
use quill_core::{Error, LexicalPolicy, Result};

/// Hands out identifiers that clash neither with each other nor with the
/// policy's reserved words.
///
/// Names can be tagged so code emitted later can look them up again:
///
/// ```
/// use quill_codegen::NameAllocator;
/// use quill_core::PLAIN;
///
/// let mut names = NameAllocator::new(&PLAIN);
/// assert_eq!(names.new_tagged_name("count", "rows")?, "count");
/// assert_eq!(names.new_name("count"), "count_");
/// assert_eq!(names.get("rows")?, "count");
/// # Ok::<(), Box<quill_core::Error>>(())
/// ```
///
/// Clone an allocator to give a nested scope its own names on top of the
/// enclosing ones.
#[derive(Debug, Clone)]
pub struct NameAllocator {
    allocated: IndexSet<String>,
    tags: IndexMap<String, String>,
}

impl NameAllocator {
    pub fn new(policy: &LexicalPolicy) -> Self {
        Self {
            allocated: policy
                .reserved_words
                .iter()
                .map(|word| word.to_string())
                .collect(),
            tags: IndexMap::new(),
        }
    }

    /// Allocate a name close to `suggestion`.
    pub fn new_name(&mut self, suggestion: &str) -> String {
        let mut name = to_identifier(suggestion);
        while self.allocated.contains(&name) {
            name.push('_');
        }
        self.allocated.insert(name.clone());
        name
    }

    /// Allocate a name and remember it under `tag`.
    pub fn new_tagged_name(&mut self, suggestion: &str, tag: &str) -> Result<String> {
        if let Some(first) = self.tags.get(tag) {
            return Err(Box::new(Error::DuplicateTag {
                tag: tag.to_string(),
                first: first.clone(),
                second: suggestion.to_string(),
            }));
        }
        let name = self.new_name(suggestion);
        self.tags.insert(tag.to_string(), name.clone());
        Ok(name)
    }

    /// The name allocated for `tag`.
    pub fn get(&self, tag: &str) -> Result<&str> {
        self.tags.get(tag).map(String::as_str).ok_or_else(|| {
            Box::new(Error::UnknownTag {
                tag: tag.to_string(),
            })
        })
    }
}

/// Replace characters that cannot appear in an identifier with `_`, and
/// prefix one that cannot start it.
fn to_identifier(suggestion: &str) -> String {
    let mut out = String::with_capacity(suggestion.len() + 1);
    for (i, c) in suggestion.chars().enumerate() {
        if i == 0 && !(c.is_alphabetic() || c == '_') {
            out.push('_');
        }
        out.push(if c.is_alphanumeric() || c == '_' { c } else { '_' });
    }
    if out.is_empty() {
        out.push('_');
    }
    out
}

#[cfg(test)]
mod tests {
    use quill_core::PLAIN;

    use super::*;

    const RESERVED: LexicalPolicy = LexicalPolicy {
        reserved_words: &["fun", "val"],
        ..PLAIN
    };

    #[test]
    fn test_reserved_words_are_avoided() {
        let mut names = NameAllocator::new(&RESERVED);
        assert_eq!(names.new_name("fun"), "fun_");
        assert_eq!(names.new_name("fun"), "fun__");
        assert_eq!(names.new_name("value"), "value");
    }

    #[test]
    fn test_suggestions_become_identifiers() {
        let mut names = NameAllocator::new(&PLAIN);
        assert_eq!(names.new_name("a-b c"), "a_b_c");
        assert_eq!(names.new_name("1st"), "_1st");
        assert_eq!(names.new_name(""), "_");
        assert_eq!(names.new_name("_"), "__");
    }

    #[test]
    fn test_tags() {
        let mut names = NameAllocator::new(&PLAIN);
        names.new_tagged_name("taco", "first").unwrap();
        let err = names.new_tagged_name("burrito", "first").unwrap_err();
        assert_eq!(
            err.to_string(),
            "tag first cannot be used for both 'taco' and 'burrito'"
        );
        assert_eq!(names.get("first").unwrap(), "taco");
        assert_eq!(names.get("second").unwrap_err().to_string(), "unknown tag: second");
    }

    #[test]
    fn test_clone_scopes_names() {
        let mut outer = NameAllocator::new(&PLAIN);
        outer.new_name("row");
        let mut inner = outer.clone();
        assert_eq!(inner.new_name("row"), "row_");
        assert_eq!(outer.new_name("column"), "column");
        assert_eq!(inner.new_name("column"), "column");
    }
}
