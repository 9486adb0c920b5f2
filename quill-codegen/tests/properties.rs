//! Property tests for wrapping and name resolution.

use std::collections::HashSet;

use proptest::prelude::*;
use quill_codegen::{
    Arg, CodeBlock, CodeWriter, ImportKind, ImportTable, LineWrapper, resolve_imports,
};
use quill_core::{ClassName, LexicalPolicy, PLAIN, RenderConfig, Result};

/// Backticks names containing spaces, and keeps `return` with its value.
const TICKS: LexicalPolicy = LexicalPolicy {
    escape_identifier: backtick_spaces,
    glued_keywords: &["return"],
    ..PLAIN
};

fn backtick_spaces(name: &str) -> Result<String> {
    if name.contains(' ') {
        Ok(format!("`{name}`"))
    } else {
        Ok(name.to_string())
    }
}

/// Split a line at spaces outside backticks.
fn tokens(line: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    for c in line.chars() {
        match c {
            ' ' if !quoted => {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
            }
            '`' => {
                quoted = !quoted;
                current.push(c);
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Emit `template` through a writer wrapping at `limit`.
fn write_all(template: &str, args: &[Arg], limit: usize) -> String {
    let code = CodeBlock::of(template, args).unwrap();
    let config = RenderConfig::default().with_column_limit(limit);
    let mut writer = CodeWriter::new(config, TICKS, ImportTable::new());
    writer.emit_code(&code).unwrap();
    writer.finish().unwrap()
}

fn wrap_all(chunks: &[&str], limit: usize, level: usize) -> String {
    let mut wrapper = LineWrapper::with_indent_unit("  ", limit);
    for chunk in chunks {
        wrapper.append(chunk, level, "").unwrap();
    }
    wrapper.finish().unwrap()
}

fn class_names() -> impl Strategy<Value = Vec<ClassName>> {
    let package = prop::sample::select(vec!["a", "b", "c.d"]);
    let name = prop::sample::select(vec!["Foo", "Bar", "Baz"]);
    prop::collection::vec(
        (package, name).prop_map(|(p, n)| ClassName::new(p, n)),
        0..12,
    )
}

/// Collect `classes` as if they were written in package `a`, resolve, and
/// return a writer ready for the emit pass.
fn resolved_writer(classes: &[ClassName]) -> CodeWriter {
    let config = RenderConfig::default();
    let mut collector = CodeWriter::collecting(config, PLAIN, ImportTable::new());
    collector.push_package("a").unwrap();
    for class in classes {
        collector.lookup_name(class);
    }
    collector.pop_package();
    let collected = collector.into_collected().unwrap();

    let imports = resolve_imports(&collected, ImportTable::new(), &PLAIN);
    let mut writer = CodeWriter::new(config, PLAIN, imports);
    writer.push_package("a").unwrap();
    writer
}

proptest! {
    #[test]
    fn test_fencepost(text in "[a-z +]{0,40}", split in 0usize..40, limit in 2usize..30) {
        let split = split.min(text.len());
        let (head, tail) = text.split_at(split);
        prop_assert_eq!(wrap_all(&[head, tail], limit, 2), wrap_all(&[&text], limit, 2));
    }

    #[test]
    fn test_never_splits_a_token(
        words in prop::collection::vec(
            prop_oneof!["[a-z]{1,15}", "[a-z]{1,6}( [a-z]{1,6}){1,3}"],
            1..12,
        ),
        limit in 1usize..20,
    ) {
        let template = vec!["%N"; words.len()].join(" ");
        let args: Vec<Arg> = words.iter().map(|w| Arg::from(w.as_str())).collect();
        let out = write_all(&template, &args, limit);

        let expected: Vec<String> = words.iter().map(|w| backtick_spaces(w).unwrap()).collect();
        let emitted: Vec<String> = out.lines().flat_map(tokens).collect();
        prop_assert_eq!(&emitted, &expected);

        for line in out.lines() {
            prop_assert_eq!(line.matches('`').count() % 2, 0, "line {:?}", line);
            if line.chars().count() > limit {
                // Only a lone over-long token may overflow.
                prop_assert!(tokens(line).len() <= 1, "line {:?}", line);
            }
        }
    }

    #[test]
    fn test_return_keeps_its_value(
        words in prop::collection::vec("[a-m]{1,10}", 0..8),
        value in "[a-z]{1,10}",
        limit in 1usize..30,
    ) {
        let text = format!("{} return {value}\n", words.join(" "));
        let out = write_all(&text, &[], limit);
        prop_assert!(!out.contains("return\n"), "{:?}", out);
        let expected = format!("return {value}");
        prop_assert!(out.contains(&expected), "{:?}", out);
    }

    #[test]
    fn test_resolution_is_idempotent(classes in class_names()) {
        let mut writer = resolved_writer(&classes);
        for class in &classes {
            let first = writer.lookup_name(class);
            let second = writer.lookup_name(class);
            prop_assert_eq!(first, second);
        }
    }

    #[test]
    fn test_imports_are_injective(classes in class_names()) {
        let writer = resolved_writer(&classes);

        let mut display_names = HashSet::new();
        for import in writer.imports().imports() {
            prop_assert_eq!(import.kind(), ImportKind::Type);
            prop_assert!(!import.qualified_name().starts_with("a."));
            let display = import
                .alias()
                .or_else(|| import.qualified_name().rsplit('.').next())
                .unwrap_or_default()
                .to_string();
            prop_assert!(display_names.insert(display));
        }
    }

    #[test]
    fn test_distinct_classes_render_distinctly(classes in class_names()) {
        let mut writer = resolved_writer(&classes);
        let unique: HashSet<&ClassName> = classes.iter().collect();

        let rendered: HashSet<String> = unique.iter().map(|c| writer.lookup_name(c)).collect();
        prop_assert_eq!(rendered.len(), unique.len());
    }
}
