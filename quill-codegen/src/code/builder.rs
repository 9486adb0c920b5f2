use quill_core::Result;

use super::{Arg, CodeBlock, Instruction, template};

/// Fluent API for composing a [`CodeBlock`].
///
/// # Example
///
/// ```
/// use quill_codegen::{Arg, CodeBlock};
///
/// let code = CodeBlock::builder()
///     .begin_control_flow("if (%N > 0)", &[Arg::from("count")])?
///     .add_statement("println(%S)", &[Arg::from("positive")])?
///     .end_control_flow()
///     .build();
///
/// assert_eq!(code.to_string(), "if (count > 0) {\n  println(\"positive\")\n}\n");
/// # Ok::<(), Box<quill_core::Error>>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct CodeBlockBuilder {
    instructions: Vec<Instruction>,
}

impl CodeBlockBuilder {
    pub(super) fn from_instructions(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Add code with relative (`%L`) or indexed (`%1L`) arguments.
    pub fn add(mut self, template: &str, args: &[Arg]) -> Result<Self> {
        self.instructions
            .extend(template::bind_positional(template, args)?);
        Ok(self)
    }

    /// Add code with named arguments (`%name:L`).
    pub fn add_named(mut self, template: &str, args: &[(&str, Arg)]) -> Result<Self> {
        self.instructions
            .extend(template::bind_named(template, args)?);
        Ok(self)
    }

    /// Add a complete statement: `«` + code + newline + `»`.
    pub fn add_statement(mut self, template: &str, args: &[Arg]) -> Result<Self> {
        let body = template::bind_positional(template, args)?;
        self.instructions.push(Instruction::OpenStatement);
        self.instructions.extend(body);
        self.instructions.push(Instruction::Newline);
        self.instructions.push(Instruction::CloseStatement);
        Ok(self)
    }

    /// Add a nested block verbatim.
    pub fn add_code(mut self, code: &CodeBlock) -> Self {
        self.instructions.extend(code.instructions.iter().cloned());
        self
    }

    /// Open a braced block, such as `if (x == 5)`. A trailing `{` is added
    /// unless the text already opens one.
    pub fn begin_control_flow(self, template: &str, args: &[Arg]) -> Result<Self> {
        Ok(self.add(&with_opening_brace(template), args)?.indent())
    }

    /// Close the current block and open the next, such as `else if (x == 10)`.
    pub fn next_control_flow(self, template: &str, args: &[Arg]) -> Result<Self> {
        Ok(self
            .unindent()
            .add(&format!("}} {template} {{\n"), args)?
            .indent())
    }

    pub fn end_control_flow(mut self) -> Self {
        self = self.unindent();
        template::push_raw(&mut self.instructions, "}\n");
        self
    }

    /// Increase indentation level.
    pub fn indent(mut self) -> Self {
        self.instructions.push(Instruction::Indent);
        self
    }

    /// Decrease indentation level.
    pub fn unindent(mut self) -> Self {
        self.instructions.push(Instruction::Unindent);
        self
    }

    pub fn build(self) -> CodeBlock {
        CodeBlock {
            instructions: self.instructions,
        }
    }
}

fn with_opening_brace(template: &str) -> String {
    for c in template.chars().rev() {
        match c {
            '{' => return format!("{template}\n"),
            '}' => break,
            _ => {}
        }
    }
    format!("{template} {{\n")
}
