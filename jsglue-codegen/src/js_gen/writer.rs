// Brace-scoped text builder used by the JS emitters.

use crate::error::{CodegenError, Result};

const INDENT: &str = "    ";

/// Append-only text buffer with brace-scoped, auto-indented blocks.
///
/// Prefer [`GlueWriter::block`]: it closes the brace on every exit path of the
/// body, including when the body returns an error.
pub struct GlueWriter {
    out: String,
    depth: usize,
}

impl GlueWriter {
    pub fn new() -> Self {
        Self { out: String::with_capacity(16 * 1024), depth: 0 }
    }

    /// Current nesting depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Append one full line at the current indentation.
    pub fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if !text.is_empty() {
            for _ in 0..self.depth {
                self.out.push_str(INDENT);
            }
            self.out.push_str(text);
        }
        self.out.push('\n');
    }

    /// Write `header {` and enter a new scope.
    pub fn open_block(&mut self, header: &str) {
        if header.is_empty() {
            self.line("{");
        } else {
            self.line(format!("{header} {{"));
        }
        self.depth += 1;
    }

    /// Leave the current scope, writing `}` followed by `suffix` (e.g. `,` or `;`).
    pub fn close_block(&mut self, suffix: &str) -> Result<()> {
        if self.depth == 0 {
            return Err(CodegenError::UnbalancedScope(0));
        }
        self.depth -= 1;
        self.line(format!("}}{suffix}"));
        Ok(())
    }

    /// Emit `header { ... }` with `body` writing the contents.
    pub fn block<F>(&mut self, header: &str, body: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.block_with_suffix(header, "", body)
    }

    /// Like [`block`](Self::block), with text appended after the closing brace.
    pub fn block_with_suffix<F>(&mut self, header: &str, suffix: &str, body: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.open_block(header);
        let result = body(self);
        self.close_block(suffix)?;
        result
    }

    /// Consume the writer. Fails if any block is still open.
    pub fn finish(self) -> Result<String> {
        if self.depth != 0 {
            return Err(CodegenError::UnbalancedScope(self.depth));
        }
        Ok(self.out)
    }
}

impl Default for GlueWriter {
    fn default() -> Self {
        Self::new()
    }
}
