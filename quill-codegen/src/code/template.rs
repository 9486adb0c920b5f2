//! Template parsing and argument binding.

use std::ops::Range;

use indexmap::IndexMap;
use quill_core::{Error, Result, TemplateContext};

use super::{Arg, Instruction, PlaceholderKind};

/// Accumulates text between instructions so adjacent characters form one run.
#[derive(Default)]
struct Emitted {
    instructions: Vec<Instruction>,
    text: String,
}

impl Emitted {
    fn push_char(&mut self, c: char) {
        match structural(c) {
            Some(instruction) => self.push(instruction),
            None => self.text.push(c),
        }
    }

    fn push(&mut self, instruction: Instruction) {
        self.flush();
        self.instructions.push(instruction);
    }

    fn flush(&mut self) {
        if !self.text.is_empty() {
            self.instructions
                .push(Instruction::Text(std::mem::take(&mut self.text)));
        }
    }

    fn finish(mut self) -> Vec<Instruction> {
        self.flush();
        self.instructions
    }
}

fn structural(c: char) -> Option<Instruction> {
    match c {
        '\n' => Some(Instruction::Newline),
        '⇥' => Some(Instruction::Indent),
        '⇤' => Some(Instruction::Unindent),
        '«' => Some(Instruction::OpenStatement),
        '»' => Some(Instruction::CloseStatement),
        _ => None,
    }
}

/// Append text that carries no placeholders.
pub(super) fn push_raw(instructions: &mut Vec<Instruction>, text: &str) {
    let mut emitted = Emitted::default();
    for c in text.chars() {
        emitted.push_char(c);
    }
    instructions.extend(emitted.finish());
}

/// Bind a template in relative (`%L`) or indexed (`%1L`) mode.
pub(super) fn bind_positional(template: &str, args: &[Arg]) -> Result<Vec<Instruction>> {
    let ctx = TemplateContext::new(template);
    let chars: Vec<(usize, char)> = template.char_indices().collect();
    let mut emitted = Emitted::default();

    let mut has_relative = false;
    let mut has_indexed = false;
    let mut relative_count = 0;
    let mut indexed_count = vec![0usize; args.len()];

    let mut p = 0;
    while p < chars.len() {
        let (at, c) = chars[p];
        p += 1;
        if c != '%' {
            emitted.push_char(c);
            continue;
        }

        // Zero or more digits, then the kind character.
        let index_start = p;
        while p < chars.len() && chars[p].1.is_ascii_digit() {
            p += 1;
        }
        let Some(&(kind_at, kind_char)) = chars.get(p) else {
            return Err(ctx.dangling(at));
        };
        p += 1;
        let digits = &template[chars[index_start].0..kind_at];
        let span = at..kind_at + kind_char.len_utf8();

        if kind_char == '%' {
            if !digits.is_empty() {
                return Err(ctx.indexed_escape(span));
            }
            emitted.text.push('%');
            continue;
        }

        let kind = PlaceholderKind::from_char(kind_char)
            .ok_or_else(|| ctx.unknown_placeholder(kind_char, kind_at))?;

        let index = if digits.is_empty() {
            has_relative = true;
            relative_count += 1;
            if relative_count > args.len() {
                return Err(ctx.index_out_of_range(relative_count, span, args.len()));
            }
            relative_count - 1
        } else {
            has_indexed = true;
            // Overflowing indices are out of range like any other.
            let index: usize = digits.parse().unwrap_or(0);
            if index == 0 || index > args.len() {
                return Err(ctx.index_out_of_range(index, span, args.len()));
            }
            indexed_count[index - 1] += 1;
            index - 1
        };
        if has_indexed && has_relative {
            return Err(ctx.mixed_indexing(span));
        }

        let arg = coerce(kind, &args[index], &ctx, span)?;
        emitted.push(Instruction::Placeholder { kind, arg });
    }

    if has_indexed {
        let unused: Vec<String> = indexed_count
            .iter()
            .enumerate()
            .filter(|(_, count)| **count == 0)
            .map(|(i, _)| format!("%{}", i + 1))
            .collect();
        if !unused.is_empty() {
            return Err(Box::new(Error::UnusedIndexedArguments {
                plural: if unused.len() == 1 { "" } else { "s" },
                unused: unused.join(", "),
            }));
        }
    } else if relative_count < args.len() {
        return Err(Box::new(Error::UnusedRelativeArguments {
            expected: relative_count,
            received: args.len(),
        }));
    }

    Ok(emitted.finish())
}

/// Bind a template whose placeholders are written `%name:K`.
pub(super) fn bind_named(template: &str, args: &[(&str, Arg)]) -> Result<Vec<Instruction>> {
    let mut named: IndexMap<&str, &Arg> = IndexMap::new();
    for (name, arg) in args {
        if !is_argument_name(name) {
            return Err(Box::new(Error::InvalidArgumentName {
                name: name.to_string(),
            }));
        }
        named.insert(*name, arg);
    }

    let ctx = TemplateContext::new(template);
    let chars: Vec<(usize, char)> = template.char_indices().collect();
    let mut emitted = Emitted::default();

    let mut p = 0;
    while p < chars.len() {
        let (at, c) = chars[p];
        if c != '%' {
            emitted.push_char(c);
            p += 1;
            continue;
        }

        if let Some((kind_char, end)) = named_placeholder(&chars, p) {
            let kind_at = chars[end - 1].0;
            let span = at..kind_at + kind_char.len_utf8();
            let name_text = &template[chars[p + 1].0..chars[end - 2].0];

            let arg = named
                .get(name_text)
                .copied()
                .ok_or_else(|| ctx.missing_named_argument(name_text, span.clone()))?;
            let kind = PlaceholderKind::from_char(kind_char)
                .ok_or_else(|| ctx.unknown_placeholder(kind_char, kind_at))?;
            let arg = coerce(kind, arg, &ctx, span)?;
            emitted.push(Instruction::Placeholder { kind, arg });
            p = end;
            continue;
        }

        match chars.get(p + 1) {
            None => return Err(ctx.dangling(at)),
            Some((_, '%')) => {
                emitted.text.push('%');
                p += 2;
            }
            Some(&(next_at, next)) => return Err(ctx.unknown_placeholder(next, next_at)),
        }
    }

    Ok(emitted.finish())
}

/// Match `%name:K` at `p`. Returns the kind character and the index just
/// past it.
fn named_placeholder(chars: &[(usize, char)], p: usize) -> Option<(char, usize)> {
    let mut q = p + 1;
    while q < chars.len() && is_word_char(chars[q].1) {
        q += 1;
    }
    if q == p + 1 || chars.get(q).map(|(_, c)| *c) != Some(':') {
        return None;
    }
    let (_, kind) = *chars.get(q + 1)?;
    if !is_word_char(kind) {
        return None;
    }
    Some((kind, q + 2))
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// `[a-z][A-Za-z0-9_]*`
fn is_argument_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some('a'..='z')) && chars.all(is_word_char)
}

/// Check and normalize an argument for its placeholder kind.
fn coerce(
    kind: PlaceholderKind,
    arg: &Arg,
    ctx: &TemplateContext,
    span: Range<usize>,
) -> Result<Arg> {
    let coerced = match (kind, arg) {
        (PlaceholderKind::Literal, arg) => arg.clone(),

        (PlaceholderKind::Name, Arg::Str(name)) => Arg::Str(name.clone()),
        (PlaceholderKind::Name, Arg::Member(member)) => Arg::Str(member.simple_name().to_string()),
        (PlaceholderKind::Name, Arg::Node(node)) => match node.name() {
            Some(name) => Arg::Str(name.to_string()),
            None => return Err(ctx.argument_mismatch("name", arg.to_string(), span)),
        },
        (PlaceholderKind::Name, arg) => {
            return Err(ctx.argument_mismatch("name", arg.to_string(), span));
        }

        (PlaceholderKind::String, Arg::Str(_) | Arg::Null) => arg.clone(),
        (PlaceholderKind::String, arg) => Arg::Str(arg.to_string()),

        (PlaceholderKind::IndentedString, Arg::Str(_) | Arg::Null | Arg::Code(_)) => arg.clone(),
        (PlaceholderKind::IndentedString, arg) => Arg::Str(arg.to_string()),

        (PlaceholderKind::Type, Arg::Type(_)) => arg.clone(),
        (PlaceholderKind::Type, arg) => {
            return Err(ctx.argument_mismatch("type", arg.to_string(), span));
        }

        (PlaceholderKind::Member, Arg::Member(_)) => arg.clone(),
        (PlaceholderKind::Member, arg) => {
            return Err(ctx.argument_mismatch("member", arg.to_string(), span));
        }
    };
    Ok(coerced)
}

#[cfg(test)]
mod tests {
    use quill_core::{ClassName, MemberName};

    use super::*;

    fn text(s: &str) -> Instruction {
        Instruction::Text(s.to_string())
    }

    fn bind(template: &str, args: &[Arg]) -> Result<Vec<Instruction>> {
        bind_positional(template, args)
    }

    #[test]
    fn test_text_and_markers() {
        let instructions = bind("«a⇥\nb⇤»", &[]).unwrap();
        assert_eq!(
            instructions,
            [
                Instruction::OpenStatement,
                text("a"),
                Instruction::Indent,
                Instruction::Newline,
                text("b"),
                Instruction::Unindent,
                Instruction::CloseStatement,
            ]
        );
    }

    #[test]
    fn test_percent_escape() {
        assert_eq!(bind("100%% sure", &[]).unwrap(), [text("100% sure")]);
    }

    #[test]
    fn test_indexed_argument_reused() {
        let system = Arg::from(ClassName::new("java.lang", "System"));
        let instructions = bind("%1T.out.println(%1S)", &[system.clone()]).unwrap();
        assert_eq!(instructions.len(), 4);
        assert_eq!(
            instructions[0],
            Instruction::Placeholder {
                kind: PlaceholderKind::Type,
                arg: system,
            }
        );
        assert_eq!(
            instructions[2],
            Instruction::Placeholder {
                kind: PlaceholderKind::String,
                arg: Arg::Str("java.lang.System".to_string()),
            }
        );
    }

    #[test]
    fn test_unused_indexed_arguments() {
        let err = bind("%1L %1L %1L", &[Arg::from(1), Arg::from(2), Arg::from(3)]).unwrap_err();
        assert_eq!(err.to_string(), "unused arguments: %2, %3");
    }

    #[test]
    fn test_single_unused_indexed_argument() {
        let err = bind("%2L", &[Arg::from(1), Arg::from(2)]).unwrap_err();
        assert_eq!(err.to_string(), "unused argument: %1");
    }

    #[test]
    fn test_unused_relative_arguments() {
        let err = bind("%L", &[Arg::from(1), Arg::from(2)]).unwrap_err();
        assert_eq!(err.to_string(), "unused arguments: expected 1, received 2");
    }

    #[test]
    fn test_arguments_without_placeholders() {
        let err = bind("plain", &[Arg::from(1)]).unwrap_err();
        assert!(matches!(*err, Error::UnusedRelativeArguments { .. }));
    }

    #[test]
    fn test_index_out_of_range() {
        let err = bind("%1L %3L", &[Arg::from(1)]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "index 3 for '%3L' not in range (received 1 arguments)"
        );
        let err = bind("%0L", &[Arg::from(1)]).unwrap_err();
        assert!(matches!(*err, Error::IndexOutOfRange { index: 0, .. }));
    }

    #[test]
    fn test_relative_out_of_range() {
        let err = bind("%L %L", &[Arg::from(1)]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "index 2 for '%L' not in range (received 1 arguments)"
        );
    }

    #[test]
    fn test_mixed_indexing() {
        let err = bind("%1L %L", &[Arg::from(1)]).unwrap_err();
        assert_eq!(err.to_string(), "cannot mix indexed and positional parameters");
    }

    #[test]
    fn test_indexed_escape() {
        let err = bind("%1%", &[]).unwrap_err();
        assert_eq!(err.to_string(), "%% may not have an index");
    }

    #[test]
    fn test_dangling() {
        let err = bind("abc %", &[]).unwrap_err();
        assert_eq!(err.to_string(), "dangling format characters in 'abc %'");
        assert!(bind("%12", &[]).is_err());
    }

    #[test]
    fn test_unknown_placeholder() {
        let err = bind("%X", &[Arg::from(1)]).unwrap_err();
        assert_eq!(err.to_string(), "unknown format %X at 1 in '%X'");
    }

    #[test]
    fn test_type_mismatch() {
        let err = bind("%T", &[Arg::from("String")]).unwrap_err();
        assert_eq!(err.to_string(), "expected type but was String");
    }

    #[test]
    fn test_name_from_member() {
        let member = MemberName::new("kotlin.collections", "listOf");
        let instructions = bind("%N", &[Arg::from(member)]).unwrap();
        assert_eq!(
            instructions,
            [Instruction::Placeholder {
                kind: PlaceholderKind::Name,
                arg: Arg::Str("listOf".to_string()),
            }]
        );
    }

    #[test]
    fn test_name_rejects_number() {
        let err = bind("%N", &[Arg::from(3)]).unwrap_err();
        assert_eq!(err.to_string(), "expected name but was 3");
    }

    #[test]
    fn test_named_arguments() {
        let food = Arg::from("tacos");
        let instructions = bind_named("I like %food:L, %food:L", &[("food", food)]).unwrap();
        assert_eq!(instructions.len(), 4);
        assert_eq!(instructions[1], text(", "));
    }

    #[test]
    fn test_named_argument_missing() {
        let err = bind_named("%food:L", &[("drink", Arg::from("tea"))]).unwrap_err();
        assert_eq!(err.to_string(), "Missing named argument for %food");
    }

    #[test]
    fn test_named_argument_must_be_lowercase() {
        let err = bind_named("%Food:L", &[("Food", Arg::from("x"))]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "argument 'Food' must start with a lowercase character"
        );
    }

    #[test]
    fn test_named_percent_and_dangling() {
        assert_eq!(bind_named("50%%", &[]).unwrap(), [text("50%")]);
        assert!(bind_named("50%", &[]).is_err());
        let err = bind_named("%x", &[]).unwrap_err();
        assert!(matches!(*err, Error::UnknownPlaceholder { .. }));
    }

    #[test]
    fn test_is_argument_name() {
        assert!(is_argument_name("food"));
        assert!(is_argument_name("fooBar_2"));
        assert!(!is_argument_name("Food"));
        assert!(!is_argument_name("2food"));
        assert!(!is_argument_name(""));
    }
}
