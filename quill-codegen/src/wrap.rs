//! Column-bounded greedy line wrapping.

use quill_core::{Error, Indent, Result};

/// Forces a wrap opportunity where a plain space would not read well.
pub const WRAP_POINT: char = '♢';
/// A space that never wraps.
pub const NON_BREAKING_SPACE: char = '·';

/// Soft line wrapper over an owned buffer.
///
/// Text appended with [`append`](Self::append) is split into segments at
/// spaces and [`WRAP_POINT`]s. Segments are held until the line ends, then
/// laid out greedily: a segment that does not fit starts a new line at the
/// wrap indent. Segments are never split, so an over-long token overflows.
#[derive(Debug)]
pub struct LineWrapper {
    out: String,
    indent: String,
    column_limit: usize,
    closed: bool,
    /// Segments of the current line. Never empty; a lone "" means nothing
    /// was written since the last newline.
    segments: Vec<String>,
    /// Wrap indent level, set by the last wrap point on this line.
    indent_level: Option<usize>,
    line_prefix: String,
}

impl LineWrapper {
    pub fn new(indent: Indent, column_limit: usize) -> Self {
        Self::with_indent_unit(indent.unit(), column_limit)
    }

    pub fn with_indent_unit(indent: impl Into<String>, column_limit: usize) -> Self {
        Self {
            out: String::new(),
            indent: indent.into(),
            column_limit,
            closed: false,
            segments: vec![String::new()],
            indent_level: None,
            line_prefix: String::new(),
        }
    }

    pub fn has_pending_segments(&self) -> bool {
        self.segments.len() != 1 || !self.segments[0].is_empty()
    }

    /// Append `s`, treating spaces and `♢` as wrap points, `·` as a glued
    /// space and `\n` as a hard line end.
    ///
    /// `indent_level` and `line_prefix` apply to continuation lines created
    /// by wrap points in this call.
    pub fn append(&mut self, s: &str, indent_level: usize, line_prefix: &str) -> Result<()> {
        self.ensure_open()?;

        for c in s.chars() {
            match c {
                ' ' | WRAP_POINT => {
                    self.indent_level = Some(indent_level);
                    self.line_prefix.clear();
                    self.line_prefix.push_str(line_prefix);
                    self.segments.push(String::new());
                }
                '\n' => self.newline()?,
                NON_BREAKING_SPACE => self.current_segment().push(' '),
                c => self.current_segment().push(c),
            }
        }
        Ok(())
    }

    /// Glue `s` onto the current segment, ignoring the column budget.
    pub fn append_non_wrapping(&mut self, s: &str) -> Result<()> {
        self.ensure_open()?;
        if s.contains('\n') {
            return Err(Box::new(Error::NewlineInNonWrapping {
                text: s.to_string(),
            }));
        }
        self.current_segment().push_str(s);
        Ok(())
    }

    /// End the current line.
    pub fn newline(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.emit_current_line();
        self.out.push('\n');
        self.indent_level = None;
        Ok(())
    }

    /// Flush outstanding text and forbid further writes.
    pub fn close(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.emit_current_line();
        self.closed = true;
        Ok(())
    }

    /// Close and return everything written.
    pub fn finish(mut self) -> Result<String> {
        if !self.closed {
            self.close()?;
        }
        Ok(self.out)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(Box::new(Error::WrapperClosed));
        }
        Ok(())
    }

    fn current_segment(&mut self) -> &mut String {
        // segments is never empty
        let last = self.segments.len() - 1;
        &mut self.segments[last]
    }

    fn emit_current_line(&mut self) {
        self.fold_unsafe_breaks();

        let indent_level = self.indent_level.unwrap_or(0);
        let continuation_width =
            char_width(&self.indent) * indent_level + char_width(&self.line_prefix);

        let mut start = 0;
        let mut column = char_width(&self.segments[0]);
        for i in 1..self.segments.len() {
            let width = char_width(&self.segments[i]);
            let next = column + 1 + width;

            if next > self.column_limit {
                self.emit_segment_range(start, i, indent_level);
                start = i;
                column = continuation_width + width;
                continue;
            }
            column = next;
        }
        self.emit_segment_range(start, self.segments.len(), indent_level);

        self.segments.clear();
        self.segments.push(String::new());
    }

    /// A line must not start with `+` or `-`: merge such segments into the
    /// one before so any break lands after the operator.
    fn fold_unsafe_breaks(&mut self) {
        let mut i = 1;
        while i < self.segments.len() {
            if is_unsafe_line_start(&self.segments[i]) {
                let segment = self.segments.remove(i);
                let previous = &mut self.segments[i - 1];
                previous.push(' ');
                previous.push_str(&segment);
            } else {
                i += 1;
            }
        }
    }

    fn emit_segment_range(&mut self, start: usize, end: usize, indent_level: usize) {
        if start > 0 {
            self.out.push('\n');
            for _ in 0..indent_level {
                self.out.push_str(&self.indent);
            }
            self.out.push_str(&self.line_prefix);
        }

        self.out.push_str(&self.segments[start]);
        for segment in &self.segments[start + 1..end] {
            self.out.push(' ');
            self.out.push_str(segment);
        }
    }
}

fn is_unsafe_line_start(segment: &str) -> bool {
    (segment.starts_with('+') || segment.starts_with('-')) && !segment.starts_with("->")
}

fn char_width(s: &str) -> usize {
    s.chars().count()
}
