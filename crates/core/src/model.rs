//! Typed document model over the Pandoc JSON AST.
//!
//! Pandoc serializes every node as `{"t": <kind>, "c": <payload>}` where the
//! payload is often a positional array, so the conversions here are explicit
//! rather than serde-derived. Each category keeps an opaque `Other` variant
//! holding the untouched JSON value: the transformer must not assume it knows
//! every node kind, and unknown nodes round-trip unchanged.

use crate::error::SidenoteError;
use serde_json::{Value, json};

/// A parsed document: an ordered sequence of block nodes plus the metadata
/// fields Pandoc carries alongside them, preserved opaquely.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// The `pandoc-api-version` field, passed through untouched.
    pub api_version: Value,
    /// The `meta` field, passed through untouched.
    pub meta: Value,
    /// Top-level block nodes in document order.
    pub blocks: Vec<Block>,
}

/// A block-level node.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// A paragraph holding an inline sequence.
    Para(Vec<Inline>),
    /// Pandoc's unwrapped paragraph-like container (e.g. footnote bodies,
    /// tight list items). Treated exactly like `Para`.
    Plain(Vec<Inline>),
    /// A section header.
    Header {
        /// Heading level (1-6).
        level: i64,
        /// Pandoc attr triple `[id, classes, kv]`, passed through untouched.
        attr: Value,
        /// The header's inline children.
        content: Vec<Inline>,
    },
    /// Any other block kind, passed through unmodified.
    Other(Value),
}

/// An inline-level node.
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    /// A raw text run.
    Str(String),
    /// A single inter-word space.
    Space,
    /// A soft line break.
    SoftBreak,
    /// Emphasized children.
    Emph(Vec<Inline>),
    /// Strongly emphasized children.
    Strong(Vec<Inline>),
    /// Underlined children.
    Underline(Vec<Inline>),
    /// Struck-out children.
    Strikeout(Vec<Inline>),
    /// Subscripted children.
    Subscript(Vec<Inline>),
    /// Superscripted children.
    Superscript(Vec<Inline>),
    /// Quoted children with a quote-style tag.
    Quoted {
        /// Single or double typographic quotes.
        style: QuoteStyle,
        /// The quoted inline children.
        content: Vec<Inline>,
    },
    /// A hyperlink.
    Link {
        /// Pandoc attr triple, passed through untouched.
        attr: Value,
        /// The link's label inlines.
        label: Vec<Inline>,
        /// Target URL.
        target: String,
        /// Link title (often empty).
        title: String,
    },
    /// A footnote: one nested block sequence holding the note body.
    Note(Vec<Block>),
    /// Pre-rendered markup in a named format, not subject to further
    /// structural interpretation.
    RawInline {
        /// Markup format tag (e.g. "html").
        format: String,
        /// The raw markup payload.
        text: String,
    },
    /// Any other inline kind, rendered via a raw-payload fallback.
    Other(Value),
}

/// Quote style carried by `Quoted` nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum QuoteStyle {
    /// Single typographic quotes.
    Single,
    /// Double typographic quotes.
    Double,
    /// An unrecognized style tag; rendered without quote glyphs.
    Other(String),
}

/// Returns the `t` tag of a serialized node.
fn node_tag<'v>(value: &'v Value, category: &str) -> Result<&'v str, SidenoteError> {
    value
        .get("t")
        .and_then(Value::as_str)
        .ok_or_else(|| SidenoteError::shape(category, "missing kind tag"))
}

/// Returns the `c` payload of a serialized node.
fn node_content<'v>(value: &'v Value, kind: &str) -> Result<&'v Value, SidenoteError> {
    value
        .get("c")
        .ok_or_else(|| SidenoteError::shape(kind, "missing content payload"))
}

fn inlines_from(value: &Value, kind: &str) -> Result<Vec<Inline>, SidenoteError> {
    let items = value
        .as_array()
        .ok_or_else(|| SidenoteError::shape(kind, "child inlines must be an array"))?;
    items.iter().map(Inline::from_value).collect()
}

fn blocks_from(value: &Value, kind: &str) -> Result<Vec<Block>, SidenoteError> {
    let items = value
        .as_array()
        .ok_or_else(|| SidenoteError::shape(kind, "child blocks must be an array"))?;
    items.iter().map(Block::from_value).collect()
}

fn inlines_to_value(inlines: &[Inline]) -> Value {
    Value::Array(inlines.iter().map(Inline::to_value).collect())
}

impl QuoteStyle {
    /// Parses the quote-style tag object at the head of a `Quoted` payload.
    pub fn from_value(value: &Value) -> Result<Self, SidenoteError> {
        let tag = node_tag(value, "Quoted")?;
        Ok(match tag {
            "SingleQuote" => QuoteStyle::Single,
            "DoubleQuote" => QuoteStyle::Double,
            other => QuoteStyle::Other(other.to_string()),
        })
    }

    /// Serializes the quote-style tag back to its JSON form.
    pub fn to_value(&self) -> Value {
        let tag = match self {
            QuoteStyle::Single => "SingleQuote",
            QuoteStyle::Double => "DoubleQuote",
            QuoteStyle::Other(tag) => tag.as_str(),
        };
        json!({ "t": tag })
    }
}

impl Inline {
    /// Parses a serialized inline node.
    ///
    /// Recognized kinds with malformed payloads fail with a shape error;
    /// unrecognized kinds are captured opaquely as `Inline::Other`.
    pub fn from_value(value: &Value) -> Result<Self, SidenoteError> {
        let tag = node_tag(value, "Inline")?;
        Ok(match tag {
            "Str" => {
                let text = node_content(value, tag)?
                    .as_str()
                    .ok_or_else(|| SidenoteError::shape(tag, "text payload must be a string"))?;
                Inline::Str(text.to_string())
            }
            "Space" => Inline::Space,
            "SoftBreak" => Inline::SoftBreak,
            "Emph" => Inline::Emph(inlines_from(node_content(value, tag)?, tag)?),
            "Strong" => Inline::Strong(inlines_from(node_content(value, tag)?, tag)?),
            "Underline" => Inline::Underline(inlines_from(node_content(value, tag)?, tag)?),
            "Strikeout" => Inline::Strikeout(inlines_from(node_content(value, tag)?, tag)?),
            "Subscript" => Inline::Subscript(inlines_from(node_content(value, tag)?, tag)?),
            "Superscript" => Inline::Superscript(inlines_from(node_content(value, tag)?, tag)?),
            "Quoted" => {
                let parts = node_content(value, tag)?
                    .as_array()
                    .filter(|parts| parts.len() == 2)
                    .ok_or_else(|| {
                        SidenoteError::shape(tag, "payload must be [style, inlines]")
                    })?;
                let content = inlines_from(&parts[1], tag)?;
                if content.is_empty() {
                    return Err(SidenoteError::shape(tag, "no child inlines"));
                }
                Inline::Quoted {
                    style: QuoteStyle::from_value(&parts[0])?,
                    content,
                }
            }
            "Link" => {
                let parts = node_content(value, tag)?
                    .as_array()
                    .filter(|parts| parts.len() == 3)
                    .ok_or_else(|| {
                        SidenoteError::shape(tag, "payload must be [attr, label, target]")
                    })?;
                let target = parts[2]
                    .get(0)
                    .and_then(Value::as_str)
                    .ok_or_else(|| SidenoteError::shape(tag, "missing target URL"))?;
                let title = parts[2]
                    .get(1)
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                Inline::Link {
                    attr: parts[0].clone(),
                    label: inlines_from(&parts[1], tag)?,
                    target: target.to_string(),
                    title: title.to_string(),
                }
            }
            "Note" => Inline::Note(blocks_from(node_content(value, tag)?, tag)?),
            "RawInline" => {
                let parts = node_content(value, tag)?
                    .as_array()
                    .ok_or_else(|| SidenoteError::shape(tag, "payload must be [format, text]"))?;
                let format = parts
                    .first()
                    .and_then(Value::as_str)
                    .ok_or_else(|| SidenoteError::shape(tag, "missing format"))?;
                let text = parts
                    .get(1)
                    .and_then(Value::as_str)
                    .ok_or_else(|| SidenoteError::shape(tag, "missing raw text"))?;
                Inline::RawInline {
                    format: format.to_string(),
                    text: text.to_string(),
                }
            }
            _ => Inline::Other(value.clone()),
        })
    }

    /// Serializes the inline node back to Pandoc JSON.
    pub fn to_value(&self) -> Value {
        match self {
            Inline::Str(text) => json!({ "t": "Str", "c": text }),
            Inline::Space => json!({ "t": "Space" }),
            Inline::SoftBreak => json!({ "t": "SoftBreak" }),
            Inline::Emph(children) => json!({ "t": "Emph", "c": inlines_to_value(children) }),
            Inline::Strong(children) => json!({ "t": "Strong", "c": inlines_to_value(children) }),
            Inline::Underline(children) => {
                json!({ "t": "Underline", "c": inlines_to_value(children) })
            }
            Inline::Strikeout(children) => {
                json!({ "t": "Strikeout", "c": inlines_to_value(children) })
            }
            Inline::Subscript(children) => {
                json!({ "t": "Subscript", "c": inlines_to_value(children) })
            }
            Inline::Superscript(children) => {
                json!({ "t": "Superscript", "c": inlines_to_value(children) })
            }
            Inline::Quoted { style, content } => {
                json!({ "t": "Quoted", "c": [style.to_value(), inlines_to_value(content)] })
            }
            Inline::Link {
                attr,
                label,
                target,
                title,
            } => {
                json!({ "t": "Link", "c": [attr, inlines_to_value(label), [target, title]] })
            }
            Inline::Note(blocks) => {
                let body: Vec<Value> = blocks.iter().map(Block::to_value).collect();
                json!({ "t": "Note", "c": body })
            }
            Inline::RawInline { format, text } => {
                json!({ "t": "RawInline", "c": [format, text] })
            }
            Inline::Other(value) => value.clone(),
        }
    }
}

impl Block {
    /// Parses a serialized block node.
    pub fn from_value(value: &Value) -> Result<Self, SidenoteError> {
        let tag = node_tag(value, "Block")?;
        Ok(match tag {
            "Para" => Block::Para(inlines_from(node_content(value, tag)?, tag)?),
            "Plain" => Block::Plain(inlines_from(node_content(value, tag)?, tag)?),
            "Header" => {
                let parts = node_content(value, tag)?
                    .as_array()
                    .filter(|parts| parts.len() == 3)
                    .ok_or_else(|| {
                        SidenoteError::shape(tag, "payload must be [level, attr, inlines]")
                    })?;
                let level = parts[0]
                    .as_i64()
                    .ok_or_else(|| SidenoteError::shape(tag, "level must be an integer"))?;
                Block::Header {
                    level,
                    attr: parts[1].clone(),
                    content: inlines_from(&parts[2], tag)?,
                }
            }
            _ => Block::Other(value.clone()),
        })
    }

    /// Serializes the block node back to Pandoc JSON.
    pub fn to_value(&self) -> Value {
        match self {
            Block::Para(inlines) => json!({ "t": "Para", "c": inlines_to_value(inlines) }),
            Block::Plain(inlines) => json!({ "t": "Plain", "c": inlines_to_value(inlines) }),
            Block::Header {
                level,
                attr,
                content,
            } => json!({ "t": "Header", "c": [level, attr, inlines_to_value(content)] }),
            Block::Other(value) => value.clone(),
        }
    }
}

impl Document {
    /// Parses a Pandoc JSON document value.
    pub fn from_value(value: &Value) -> Result<Self, SidenoteError> {
        let blocks = value
            .get("blocks")
            .ok_or_else(|| SidenoteError::shape("Document", "missing blocks field"))?;
        Ok(Document {
            api_version: value
                .get("pandoc-api-version")
                .cloned()
                .unwrap_or(Value::Null),
            meta: value.get("meta").cloned().unwrap_or(Value::Null),
            blocks: blocks_from(blocks, "Document")?,
        })
    }

    /// Serializes the document back to a Pandoc JSON value.
    pub fn to_value(&self) -> Value {
        let mut object = serde_json::Map::new();
        if !self.api_version.is_null() {
            object.insert("pandoc-api-version".to_string(), self.api_version.clone());
        }
        if !self.meta.is_null() {
            object.insert("meta".to_string(), self.meta.clone());
        }
        object.insert(
            "blocks".to_string(),
            Value::Array(self.blocks.iter().map(Block::to_value).collect()),
        );
        Value::Object(object)
    }

    /// Parses a document from serialized JSON text.
    pub fn from_json_str(input: &str) -> Result<Self, SidenoteError> {
        let value: Value = serde_json::from_str(input)?;
        Self::from_value(&value)
    }

    /// Serializes the document to JSON text.
    pub fn to_json_string(&self) -> Result<String, SidenoteError> {
        Ok(serde_json::to_string(&self.to_value())?)
    }
}
