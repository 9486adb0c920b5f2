//! The emitter: replays code blocks into a line wrapper.
//!
//! A [`CodeWriter`] runs in one of two modes. While collecting, it renders
//! into an unbounded wrapper that is thrown away and records every
//! importable reference. While emitting, it consults the resolved
//! [`ImportTable`] and produces the final text.

use std::borrow::Cow;
use std::fmt;

use quill_core::{
    ClassName, Error, LexicalPolicy, MemberName, QuoteOptions, RenderConfig, Result, TypeName,
};

use crate::{
    Arg, CodeBlock, CollectedReferences, ImportTable, Instruction, LineWrapper, NON_BREAKING_SPACE,
    PlaceholderKind, ReferenceCollector,
};

/// Wrapped KDoc lines continue the ` * ` gutter.
const KDOC_PREFIX: &str = " * ";
const COMMENT_PREFIX: &str = "// ";

/// A declaration node that can appear as a template argument.
///
/// `%N` uses [`name`](Self::name), `%L` calls [`emit`](Self::emit).
pub trait Declaration: fmt::Debug + Send + Sync {
    fn name(&self) -> Option<&str>;

    /// Emit the declaration in its standalone form.
    fn emit(&self, writer: &mut CodeWriter) -> Result<()>;
}

/// A type declaration currently being written, for scope-aware lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeScope {
    pub name: String,
    pub nested_types: Vec<String>,
    pub enum_constants: Vec<String>,
    pub functions: Vec<String>,
    /// Inner types see the functions of their enclosing type.
    pub is_inner: bool,
}

impl TypeScope {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Streams code blocks into formatted text.
#[derive(Debug)]
pub struct CodeWriter {
    out: LineWrapper,
    config: RenderConfig,
    policy: LexicalPolicy,
    imports: ImportTable,
    collector: Option<ReferenceCollector>,
    indent_level: usize,
    kdoc: bool,
    comment: bool,
    package: Option<String>,
    type_stack: Vec<TypeScope>,
    /// Line of the open statement being written, `None` outside a statement.
    /// The first line is indented normally, the rest are double-indented.
    statement_line: Option<usize>,
    trailing_newline: bool,
}

impl CodeWriter {
    /// A writer for the emit pass.
    pub fn new(config: RenderConfig, policy: LexicalPolicy, imports: ImportTable) -> Self {
        Self::with_wrapper(
            LineWrapper::new(config.indent, config.column_limit),
            config,
            policy,
            imports,
            None,
        )
    }

    /// A writer for the collection pass. `explicit` holds the file's own
    /// import requests so aliases are honored while collecting.
    pub fn collecting(config: RenderConfig, policy: LexicalPolicy, explicit: ImportTable) -> Self {
        Self::with_wrapper(
            LineWrapper::new(config.indent, usize::MAX),
            config,
            policy,
            explicit,
            Some(ReferenceCollector::new()),
        )
    }

    fn with_wrapper(
        out: LineWrapper,
        config: RenderConfig,
        policy: LexicalPolicy,
        imports: ImportTable,
        collector: Option<ReferenceCollector>,
    ) -> Self {
        Self {
            out,
            config,
            policy,
            imports,
            collector,
            indent_level: 0,
            kdoc: false,
            comment: false,
            package: None,
            type_stack: Vec::new(),
            statement_line: None,
            trailing_newline: true,
        }
    }

    /// Render a lone block with no imports and no column limit.
    pub fn render_fragment(code: &CodeBlock, policy: &LexicalPolicy) -> Result<String> {
        let config = RenderConfig::default().with_column_limit(usize::MAX);
        let mut writer = Self::new(config, *policy, ImportTable::new());
        writer.emit_code(code)?;
        writer.finish()
    }

    pub fn policy(&self) -> &LexicalPolicy {
        &self.policy
    }

    pub fn imports(&self) -> &ImportTable {
        &self.imports
    }

    pub fn is_collecting(&self) -> bool {
        self.collector.is_some()
    }

    pub fn indent(&mut self, levels: usize) {
        self.indent_level += levels;
    }

    pub fn unindent(&mut self, levels: usize) -> Result<()> {
        if levels > self.indent_level {
            return Err(Box::new(Error::Unindent {
                levels,
                from: self.indent_level,
            }));
        }
        self.indent_level -= levels;
        Ok(())
    }

    pub fn push_package(&mut self, package: &str) -> Result<()> {
        if let Some(current) = &self.package {
            return Err(Error::invalid_declaration(format!(
                "package already set: {current}"
            )));
        }
        self.package = Some(package.to_string());
        Ok(())
    }

    pub fn pop_package(&mut self) {
        self.package = None;
    }

    pub fn push_type(&mut self, scope: TypeScope) {
        self.type_stack.push(scope);
    }

    pub fn pop_type(&mut self) {
        self.type_stack.pop();
    }

    /// Suspend the open statement, if any. Declarations nested in an
    /// expression must not pick up its continuation indent.
    pub fn suspend_statement(&mut self) -> Option<usize> {
        self.statement_line.take()
    }

    pub fn resume_statement(&mut self, statement_line: Option<usize>) {
        self.statement_line = statement_line;
    }

    /// Emit a `//` comment block.
    pub fn emit_comment(&mut self, code: &CodeBlock) -> Result<()> {
        // Force the prefix on the first line.
        self.trailing_newline = true;
        self.comment = true;
        let result = self.emit_code(code).and_then(|()| self.emit("\n"));
        self.comment = false;
        result
    }

    /// Emit a `/** */` documentation block. Types mentioned in it are
    /// never imported.
    pub fn emit_kdoc(&mut self, code: &CodeBlock) -> Result<()> {
        if code.is_empty() {
            return Ok(());
        }
        self.emit("/**\n")?;
        self.kdoc = true;
        let result = self.emit_code_with(code, false, true);
        self.kdoc = false;
        result?;
        self.emit(" */\n")
    }

    /// Bind and emit a template in one step.
    pub fn emit_format(&mut self, template: &str, args: &[Arg]) -> Result<()> {
        let code = CodeBlock::of(template, args)?;
        self.emit_code(&code)
    }

    pub fn emit_code(&mut self, code: &CodeBlock) -> Result<()> {
        self.emit_code_with(code, false, false)
    }

    /// Replay `code`. In a constant context strings always use the
    /// single-line form.
    pub fn emit_code_with(
        &mut self,
        code: &CodeBlock,
        constant_context: bool,
        ensure_trailing_newline: bool,
    ) -> Result<()> {
        for instruction in code.instructions() {
            match instruction {
                Instruction::Text(text) => self.emit(text)?,
                Instruction::Newline => self.emit("\n")?,
                Instruction::Placeholder { kind, arg } => {
                    self.emit_placeholder(*kind, arg, constant_context)?;
                }
                Instruction::Indent => self.indent(1),
                Instruction::Unindent => self.unindent(1)?,
                Instruction::OpenStatement => {
                    if self.statement_line.is_some() {
                        return Err(Error::unbalanced_statement(
                            "can't open a new statement until the current statement is closed \
                             (opening « followed by another « without a closing »)",
                            format!("{:?}", code.instructions()),
                        ));
                    }
                    self.statement_line = Some(0);
                }
                Instruction::CloseStatement => {
                    let Some(line) = self.statement_line.take() else {
                        return Err(Error::unbalanced_statement(
                            "can't close a statement that hasn't been opened \
                             (closing » is not preceded by an opening «)",
                            format!("{:?}", code.instructions()),
                        ));
                    };
                    if line > 0 {
                        // End of a multi-line statement.
                        self.unindent(2)?;
                    }
                }
            }
        }
        if ensure_trailing_newline && self.out.has_pending_segments() {
            self.emit("\n")?;
        }
        Ok(())
    }

    fn emit_placeholder(
        &mut self,
        kind: PlaceholderKind,
        arg: &Arg,
        constant_context: bool,
    ) -> Result<()> {
        match (kind, arg) {
            (PlaceholderKind::Literal, arg) => self.emit_literal(arg, constant_context),
            (PlaceholderKind::Name, arg) => {
                let name = self.policy.escape(&arg.to_string())?;
                self.emit_identifier(&name)
            }
            (PlaceholderKind::String | PlaceholderKind::IndentedString, Arg::Null) => {
                self.emit("null")
            }
            (PlaceholderKind::String, arg) => {
                let options = QuoteOptions {
                    keep_templates: false,
                    single_line: constant_context,
                };
                let literal = self.policy.quote(&arg.to_string(), options);
                self.emit_non_wrapping(&literal)
            }
            (PlaceholderKind::IndentedString, arg) => {
                let value = match arg {
                    Arg::Code(code) => self.render_nested(code)?,
                    other => other.to_string(),
                };
                let options = QuoteOptions {
                    keep_templates: true,
                    single_line: constant_context,
                };
                let literal = self.policy.quote(&value, options);
                self.emit_non_wrapping(&literal)
            }
            (PlaceholderKind::Type, Arg::Type(ty)) => self.emit_type(ty),
            (PlaceholderKind::Member, Arg::Member(member)) => self.emit_member(member),
            (kind, arg) => Err(Error::invalid_declaration(format!(
                "%{} bound to unsupported argument {arg}",
                kind.as_char()
            ))),
        }
    }

    fn emit_literal(&mut self, arg: &Arg, constant_context: bool) -> Result<()> {
        match arg {
            Arg::Code(code) => self.emit_code_with(code, constant_context, false),
            Arg::Node(node) => node.emit(self),
            Arg::Str(text) => self.emit(text),
            other => self.emit(&other.to_string()),
        }
    }

    /// Render `code` into a string using the current resolution context and
    /// an unbounded column limit.
    fn render_nested(&mut self, code: &CodeBlock) -> Result<String> {
        let nested = LineWrapper::new(self.config.indent, usize::MAX);
        let saved = std::mem::replace(&mut self.out, nested);
        let trailing_newline = std::mem::replace(&mut self.trailing_newline, false);
        let result = self.emit_code(code);
        self.trailing_newline = trailing_newline;
        let nested = std::mem::replace(&mut self.out, saved);
        result?;
        nested.finish()
    }

    /// Emit a type reference using its resolved display form.
    pub fn emit_type(&mut self, ty: &TypeName) -> Result<()> {
        match ty {
            TypeName::Class { class, .. } => self.emit_class(class)?,
            TypeName::Parameterized { raw, arguments, .. } => {
                self.emit_class(raw)?;
                if !arguments.is_empty() {
                    self.emit("<")?;
                    for (i, argument) in arguments.iter().enumerate() {
                        if i > 0 {
                            self.emit(", ")?;
                        }
                        self.emit_type(argument)?;
                    }
                    self.emit(">")?;
                }
            }
            TypeName::Variable(variable) => self.emit(&variable.name)?,
            TypeName::Wildcard { variance, bound } => {
                self.emit(variance.keyword())?;
                self.emit(" ")?;
                self.emit_type(bound)?;
            }
            TypeName::Star => self.emit("*")?,
            TypeName::Lambda { function, nullable } => {
                if *nullable {
                    self.emit("(")?;
                }
                if function.suspend {
                    self.emit("suspend ")?;
                }
                if let Some(receiver) = &function.receiver {
                    if matches!(**receiver, TypeName::Lambda { .. }) {
                        self.emit("(")?;
                        self.emit_type(receiver)?;
                        self.emit(")")?;
                    } else {
                        self.emit_type(receiver)?;
                    }
                    self.emit(".")?;
                }
                self.emit("(")?;
                for (i, parameter) in function.parameters.iter().enumerate() {
                    if i > 0 {
                        self.emit(", ")?;
                    }
                    self.emit_type(parameter)?;
                }
                self.emit(") -> ")?;
                self.emit_type(&function.return_type)?;
                if *nullable {
                    self.emit(")")?;
                }
            }
        }
        if ty.is_nullable() {
            self.emit("?")?;
        }
        Ok(())
    }

    fn emit_class(&mut self, class: &ClassName) -> Result<()> {
        let name = self.lookup_name(class);
        let escaped = self.policy.escape_segments(&name)?;
        self.emit_identifier(&escaped)
    }

    pub fn emit_member(&mut self, member: &MemberName) -> Result<()> {
        let name = self.lookup_member(member);
        let escaped = self.policy.escape_segments(&name)?;
        self.emit_identifier(&escaped)
    }

    /// Emit an already escaped name. Spaces inside backticks are not wrap
    /// points.
    pub fn emit_identifier(&mut self, name: &str) -> Result<()> {
        if !name.contains(' ') {
            return self.emit(name);
        }
        let glued: String = name
            .chars()
            .map(|c| if c == ' ' { NON_BREAKING_SPACE } else { c })
            .collect();
        self.emit(&glued)
    }

    /// The shortest name that identifies `class` here.
    ///
    /// Walks from `class` out through its enclosing classes looking for a
    /// simple name (or alias) that resolves back to the same class in the
    /// current scope. A name that resolves to something else forces the
    /// canonical form. Same-package classes use their simple names;
    /// everything else is qualified and, outside KDoc, recorded as
    /// importable.
    pub fn lookup_name(&mut self, class: &ClassName) -> String {
        let mut name_resolved = false;
        let mut candidate = Some(class.clone());
        while let Some(current) = candidate {
            let alias = self
                .imports
                .alias_for(&current.canonical_name())
                .map(str::to_string);
            let simple_name = alias
                .clone()
                .unwrap_or_else(|| current.simple_name().to_string());
            let resolved = self.resolve(&simple_name);
            name_resolved = resolved.is_some();

            if resolved.as_ref() == Some(&current) {
                if alias.is_none() {
                    self.record_referenced_type(class.top_level().simple_name());
                }
                let nested = &class.simple_names()[current.simple_names().len()..];
                return if nested.is_empty() {
                    simple_name
                } else {
                    format!("{simple_name}.{}", nested.join("."))
                };
            }
            candidate = current.enclosing();
        }

        if name_resolved {
            return class.canonical_name();
        }

        if self.package.as_deref() == Some(class.package()) {
            self.record_referenced_type(class.top_level().simple_name());
            return class.simple_names().join(".");
        }

        if !self.kdoc {
            self.record_importable_type(class);
        }
        class.canonical_name()
    }

    /// The shortest name that identifies `member` here.
    pub fn lookup_member(&mut self, member: &MemberName) -> String {
        let canonical = member.canonical_name();
        let simple_name = self
            .imports
            .alias_for(&canonical)
            .unwrap_or(member.simple_name())
            .to_string();

        let imported = self
            .imports
            .imported_member(&simple_name)
            .map(|imported| imported == member);
        match imported {
            Some(true) => return simple_name,
            Some(false) => {
                if let Some(enclosing) = member.enclosing() {
                    let enclosing = self.lookup_name(enclosing);
                    return format!("{enclosing}.{simple_name}");
                }
            }
            None => {}
        }

        if self.package.as_deref() == Some(member.package()) && member.enclosing().is_none() {
            self.record_referenced_member(member.simple_name());
            return member.simple_name().to_string();
        }

        if !self.kdoc
            && (member.is_extension() || !self.is_function_in_scope(member.simple_name()))
        {
            self.record_importable_member(member);
        }
        canonical
    }

    /// True if a type on the scope stack declares a function with this name.
    /// Only inner types see their enclosing type's functions.
    fn is_function_in_scope(&self, simple_name: &str) -> bool {
        for scope in self.type_stack.iter().rev() {
            if scope.functions.iter().any(|f| f == simple_name) {
                return true;
            }
            if !scope.is_inner {
                break;
            }
        }
        false
    }

    /// The class `simple_name` refers to in the current scope, if any.
    fn resolve(&self, simple_name: &str) -> Option<ClassName> {
        for depth in (0..self.type_stack.len()).rev() {
            if self.type_stack[depth]
                .nested_types
                .iter()
                .any(|n| n == simple_name)
            {
                return Some(self.stack_class_name(depth).nested(simple_name));
            }
        }

        if let Some(top) = self.type_stack.first() {
            let package = self.package.clone().unwrap_or_default();
            if top.name == simple_name {
                return Some(ClassName::new(package, simple_name));
            }
            if top.enum_constants.iter().any(|c| c == simple_name) {
                return Some(ClassName::new(package, top.name.clone()).nested(simple_name));
            }
        }

        self.imports.imported_type(simple_name).cloned()
    }

    /// The class at `depth` on the scope stack.
    fn stack_class_name(&self, depth: usize) -> ClassName {
        let package = self.package.clone().unwrap_or_default();
        let mut class = ClassName::new(package, self.type_stack[0].name.clone());
        for scope in &self.type_stack[1..=depth] {
            class = class.nested(scope.name.clone());
        }
        class
    }

    fn record_importable_type(&mut self, class: &ClassName) {
        let top_level = class.top_level();
        let simple_name = self
            .imports
            .alias_for(&top_level.canonical_name())
            .unwrap_or(top_level.simple_name())
            .to_string();
        if let Some(collector) = &mut self.collector {
            collector.record_type(&simple_name, top_level);
        }
    }

    fn record_importable_member(&mut self, member: &MemberName) {
        if member.package().is_empty() {
            return;
        }
        let simple_name = self
            .imports
            .alias_for(&member.canonical_name())
            .unwrap_or(member.simple_name())
            .to_string();
        if let Some(collector) = &mut self.collector {
            collector.record_member(&simple_name, member.clone());
        }
    }

    fn record_referenced_type(&mut self, name: &str) {
        if let Some(collector) = &mut self.collector {
            collector.record_referenced_type(name);
        }
    }

    fn record_referenced_member(&mut self, name: &str) {
        if let Some(collector) = &mut self.collector {
            collector.record_referenced_member(name);
        }
    }

    /// Emit `s`, wrapping at spaces.
    pub fn emit(&mut self, s: &str) -> Result<()> {
        self.emit_text(s, false)
    }

    /// Emit `s` without wrap points. Newlines still end lines.
    pub fn emit_non_wrapping(&mut self, s: &str) -> Result<()> {
        self.emit_text(s, true)
    }

    /// All output goes through here: indentation is written lazily so
    /// blank lines carry no trailing whitespace.
    fn emit_text(&mut self, s: &str, non_wrapping: bool) -> Result<()> {
        for (i, line) in s.split('\n').enumerate() {
            if i > 0 {
                // Keep blank lines in KDoc and comments inside the block.
                if (self.kdoc || self.comment) && self.trailing_newline {
                    self.emit_indentation()?;
                    self.out
                        .append_non_wrapping(if self.kdoc { " *" } else { "//" })?;
                }
                self.out.newline()?;
                self.trailing_newline = true;
                if let Some(line) = self.statement_line {
                    if line == 0 {
                        // Start of a multi-line statement.
                        self.indent(2);
                    }
                    self.statement_line = Some(line + 1);
                }
            }

            if line.is_empty() {
                continue;
            }

            if self.trailing_newline {
                self.emit_indentation()?;
                if self.kdoc {
                    self.out.append_non_wrapping(KDOC_PREFIX)?;
                } else if self.comment {
                    self.out.append_non_wrapping(COMMENT_PREFIX)?;
                }
            }

            if non_wrapping {
                self.out.append_non_wrapping(line)?;
            } else if self.kdoc {
                self.out.append(line, self.indent_level, KDOC_PREFIX)?;
            } else if self.comment {
                self.out.append(line, self.indent_level, COMMENT_PREFIX)?;
            } else {
                let line = glue_keywords(line, &self.policy);
                self.out.append(&line, self.indent_level + 2, "")?;
            }
            self.trailing_newline = false;
        }
        Ok(())
    }

    fn emit_indentation(&mut self) -> Result<()> {
        let unit = self.config.indent.unit();
        for _ in 0..self.indent_level {
            self.out.append_non_wrapping(&unit)?;
        }
        Ok(())
    }

    /// Flush and return the output. Fails if a statement or indentation
    /// level was left open.
    pub fn finish(self) -> Result<String> {
        self.check_balanced()?;
        self.out.finish()
    }

    /// End a collection pass.
    pub fn into_collected(self) -> Result<CollectedReferences> {
        self.check_balanced()?;
        Ok(self.collector.unwrap_or_default().finish())
    }

    fn check_balanced(&self) -> Result<()> {
        if self.statement_line.is_some() {
            return Err(Box::new(Error::UnclosedStatement));
        }
        if self.indent_level != 0 {
            return Err(Box::new(Error::UnclosedIndent {
                level: self.indent_level,
            }));
        }
        Ok(())
    }
}

/// Replace the space after each glued keyword with a non-breaking one.
fn glue_keywords<'a>(line: &'a str, policy: &LexicalPolicy) -> Cow<'a, str> {
    if policy.glued_keywords.is_empty() || !line.contains(' ') {
        return Cow::Borrowed(line);
    }
    let mut out = String::with_capacity(line.len());
    let mut word_start = 0;
    for (i, c) in line.char_indices() {
        if c == ' ' && policy.is_glued(&line[word_start..i]) {
            out.push(NON_BREAKING_SPACE);
        } else {
            out.push(c);
        }
        if !(c.is_alphanumeric() || c == '_' || c == '@') {
            word_start = i + c.len_utf8();
        }
    }
    Cow::Owned(out)
}
