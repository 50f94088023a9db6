//! Transformation context threaded through the document walk.

use super::Options;
use crate::error::SidenoteError;
use crate::model::Inline;

/// The single piece of mutable state carried through a transformation:
/// the note counter, the active options, and the markup buffer the inline
/// renderer writes into.
///
/// Numbering correctness depends on strict left-to-right, depth-first
/// visitation, so one context serves exactly one document walk.
pub struct Context<'a> {
    options: &'a Options,
    note_counter: u32,
    buffer: String,
}

impl<'a> Context<'a> {
    /// Creates a context for a fresh document walk. Note numbering starts at 1.
    pub fn new(options: &'a Options) -> Self {
        Self {
            options,
            note_counter: 1,
            buffer: String::with_capacity(256),
        }
    }

    /// Allocates the next note identifier and advances the counter.
    pub fn next_note_id(&mut self) -> String {
        let id = format!("sn-{}", self.note_counter);
        self.note_counter += 1;
        id
    }

    /// Whether text and attribute output is HTML-escaped.
    pub fn escape_enabled(&self) -> bool {
        self.options.escape_text
    }

    /// Writes a raw string to the markup buffer without escaping.
    pub fn push_raw(&mut self, s: &str) {
        self.buffer.push_str(s);
    }

    /// Writes text content to the buffer, escaped unless compatibility mode
    /// disabled escaping.
    pub fn push_text(&mut self, s: &str) {
        if self.options.escape_text {
            self.buffer.push_str(&html_escape::encode_text(s));
        } else {
            self.buffer.push_str(s);
        }
    }

    /// Writes an attribute value to the buffer, escaped unless compatibility
    /// mode disabled escaping.
    pub fn push_attr_value(&mut self, s: &str) {
        if self.options.escape_text {
            self.buffer
                .push_str(&html_escape::encode_double_quoted_attribute(s));
        } else {
            self.buffer.push_str(s);
        }
    }

    /// Renders an inline sequence to a markup string, concatenated with no
    /// separator, leaving the caller's buffer untouched.
    pub fn render_inlines_to_html(&mut self, inlines: &[Inline]) -> Result<String, SidenoteError> {
        // Import here to avoid a circular dependency at module level.
        use super::render::render_inline;

        let saved = std::mem::take(&mut self.buffer);
        for inline in inlines {
            render_inline(inline, self)?;
        }
        Ok(std::mem::replace(&mut self.buffer, saved))
    }
}
