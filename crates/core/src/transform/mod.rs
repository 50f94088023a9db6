//! The footnote-to-sidenote tree transformation.
//!
//! A single pass over a parsed document: every footnote node found in a
//! paragraph-like container is replaced in place by a raw-HTML sidenote or
//! margin-note widget, and plain-text URLs inside note bodies are
//! auto-linked. Everything the pass does not recognize is carried through
//! untouched.
//!
//! # Module structure
//!
//! - `context` - the numbering context threaded through the walk
//! - `render` - inline rendering rules and the note widget

mod context;
pub mod render;

pub use context::Context;

use crate::error::SidenoteError;
use crate::model::Document;

/// Rendering options for the transformer.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Options {
    /// Whether plain text and attribute values are HTML-escaped on output.
    /// Disable for byte-for-byte compatibility with the historical filter,
    /// which emitted source text verbatim.
    #[serde(default = "default_escape_text")]
    pub escape_text: bool,
}

fn default_escape_text() -> bool {
    true
}

impl Default for Options {
    fn default() -> Self {
        Self {
            escape_text: default_escape_text(),
        }
    }
}

/// Transforms a document, replacing every footnote with a sidenote widget.
///
/// The walk is synchronous and strictly ordered: note identifiers are
/// allocated `sn-1`, `sn-2`, ... in depth-first, left-to-right document
/// order. Sibling count and order never change; only `Note` nodes are
/// rewritten. Malformed nodes abort the whole transformation with a shape
/// error, since a skipped note would desynchronize the numbering.
pub fn transform(document: Document, options: &Options) -> Result<Document, SidenoteError> {
    let Document {
        api_version,
        meta,
        blocks,
    } = document;

    let mut ctx = Context::new(options);
    let blocks = render::walk_blocks(blocks, &mut ctx)?;

    Ok(Document {
        api_version,
        meta,
        blocks,
    })
}

/// Parses a serialized Pandoc JSON document, transforms it, and re-serializes
/// the result. This is the seam the binding crates and stream-filter callers
/// use; the core itself never touches process I/O.
pub fn transform_json(input: &str, options: &Options) -> Result<String, SidenoteError> {
    let document = Document::from_json_str(input)?;
    let transformed = transform(document, options)?;
    transformed.to_json_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Block, Inline, QuoteStyle};
    use serde_json::{Value, json};

    fn text(s: &str) -> Inline {
        Inline::Str(s.to_string())
    }

    fn note(body: Vec<Inline>) -> Inline {
        Inline::Note(vec![Block::Para(body)])
    }

    fn doc(blocks: Vec<Block>) -> Document {
        Document {
            api_version: Value::Null,
            meta: Value::Null,
            blocks,
        }
    }

    fn compat() -> Options {
        Options { escape_text: false }
    }

    /// Extracts the rendered widget HTML from a replacement node.
    fn widget_html(inline: &Inline) -> &str {
        match inline {
            Inline::RawInline { format, text } => {
                assert_eq!(format, "html");
                text
            }
            other => panic!("expected RawInline replacement, got {:?}", other),
        }
    }

    #[test]
    fn replaces_notes_in_place_preserving_siblings() {
        let input = doc(vec![Block::Para(vec![
            text("a"),
            note(vec![text("first")]),
            text("b"),
            note(vec![text("second")]),
        ])]);

        let out = transform(input, &Options::default()).unwrap();
        let Block::Para(children) = &out.blocks[0] else {
            panic!("paragraph should stay a paragraph");
        };
        assert_eq!(children.len(), 4);
        assert_eq!(children[0], text("a"));
        assert_eq!(children[2], text("b"));
        assert!(widget_html(&children[1]).contains("first"));
        assert!(widget_html(&children[3]).contains("second"));
    }

    #[test]
    fn note_ids_increase_regardless_of_classification() {
        let input = doc(vec![Block::Para(vec![
            note(vec![text("{-} margin one")]),
            note(vec![text("numbered")]),
            note(vec![text("{-} margin two")]),
        ])]);

        let out = transform(input, &Options::default()).unwrap();
        let Block::Para(children) = &out.blocks[0] else {
            panic!("expected paragraph");
        };
        assert!(widget_html(&children[0]).contains("for=\"sn-1\""));
        assert!(widget_html(&children[1]).contains("for=\"sn-2\""));
        assert!(widget_html(&children[2]).contains("for=\"sn-3\""));
    }

    #[test]
    fn numbers_notes_across_blocks_in_document_order() {
        let input = doc(vec![
            Block::Header {
                level: 1,
                attr: json!(["", [], []]),
                content: vec![text("T"), note(vec![text("in header")])],
            },
            Block::Plain(vec![note(vec![text("in plain")])]),
        ]);

        let out = transform(input, &Options::default()).unwrap();
        let Block::Header { content, .. } = &out.blocks[0] else {
            panic!("expected header");
        };
        assert!(widget_html(&content[1]).contains("id=\"sn-1\""));
        let Block::Plain(children) = &out.blocks[1] else {
            panic!("expected plain block");
        };
        assert!(widget_html(&children[0]).contains("id=\"sn-2\""));
    }

    #[test]
    fn sidenote_classification_and_widget_shape() {
        let input = doc(vec![Block::Para(vec![note(vec![text("body")])])]);
        let out = transform(input, &Options::default()).unwrap();
        let Block::Para(children) = &out.blocks[0] else {
            panic!("expected paragraph");
        };
        let html = widget_html(&children[0]);

        assert!(html.starts_with("<span class=\"sidenote-wrapper\">"));
        assert!(html.contains("<label for=\"sn-1\" class=\"margin-toggle sidenote-number\"></label>"));
        assert!(html.contains("<input type=\"checkbox\" id=\"sn-1\" class=\"margin-toggle\"/>"));
        assert!(html.contains("<span class=\"sidenote\">body<br /><br /></span>"));
        assert!(html.ends_with("</span></span>"));
    }

    #[test]
    fn margin_note_marker_is_classified_and_stripped() {
        let input = doc(vec![Block::Para(vec![note(vec![text("{-}   remark")])])]);
        let out = transform(input, &Options::default()).unwrap();
        let Block::Para(children) = &out.blocks[0] else {
            panic!("expected paragraph");
        };
        let html = widget_html(&children[0]);

        assert!(html.contains("class=\"margin-toggle\">&#8853;</label>"));
        assert!(!html.contains("sidenote-number"));
        assert!(html.contains("<span class=\"marginnote\">remark<br /><br /></span>"));
        assert!(!html.contains("{-}"));
    }

    #[test]
    fn marker_must_be_a_prefix() {
        let input = doc(vec![Block::Para(vec![note(vec![text("see {-} inside")])])]);
        let out = transform(input, &Options::default()).unwrap();
        let Block::Para(children) = &out.blocks[0] else {
            panic!("expected paragraph");
        };
        let html = widget_html(&children[0]);
        assert!(html.contains("sidenote-number"));
        assert!(html.contains("see {-} inside"));
    }

    #[test]
    fn transform_is_deterministic() {
        let build = || {
            doc(vec![Block::Para(vec![
                text("x"),
                note(vec![text("{-} m")]),
                note(vec![Inline::Emph(vec![text("hi")])]),
            ])])
        };
        let first = transform(build(), &Options::default()).unwrap();
        let second = transform(build(), &Options::default()).unwrap();
        assert_eq!(first.to_value(), second.to_value());
    }

    #[test]
    fn note_bodies_autolink_urls() {
        let input = doc(vec![Block::Para(vec![note(vec![text(
            "see http://example.com/page, ok",
        )])])]);
        let out = transform(input, &Options::default()).unwrap();
        let Block::Para(children) = &out.blocks[0] else {
            panic!("expected paragraph");
        };
        let html = widget_html(&children[0]);
        assert!(html.contains(
            "<a href=\"http://example.com/page\" target=\"_blank\" rel=\"noopener noreferrer\">"
        ));
        assert!(html.contains("</a>, ok"));
    }

    #[test]
    fn nested_emphasis_renders_inside_note_content() {
        let input = doc(vec![Block::Para(vec![note(vec![
            Inline::Emph(vec![text("hi")]),
        ])])]);
        let out = transform(input, &Options::default()).unwrap();
        let Block::Para(children) = &out.blocks[0] else {
            panic!("expected paragraph");
        };
        assert!(
            widget_html(&children[0])
                .contains("<span class=\"sidenote\"><em>hi</em><br /><br /></span>")
        );
    }

    #[test]
    fn container_kinds_use_their_tag_pairs() {
        let input = doc(vec![Block::Para(vec![note(vec![
            Inline::Strong(vec![text("b")]),
            Inline::Underline(vec![text("u")]),
            Inline::Strikeout(vec![text("s")]),
            Inline::Subscript(vec![text("d")]),
            Inline::Superscript(vec![text("p")]),
            Inline::SoftBreak,
        ])])]);
        let out = transform(input, &Options::default()).unwrap();
        let Block::Para(children) = &out.blocks[0] else {
            panic!("expected paragraph");
        };
        let html = widget_html(&children[0]);
        assert!(html.contains("<strong>b</strong>"));
        assert!(html.contains("<u>u</u>"));
        assert!(html.contains("<s>s</s>"));
        assert!(html.contains("<sub>d</sub>"));
        assert!(html.contains("<sup>p</sup>"));
        assert!(html.contains("<br />"));
    }

    #[test]
    fn links_render_target_and_first_label_text_only() {
        let input = doc(vec![Block::Para(vec![note(vec![Inline::Link {
            attr: json!(["", [], []]),
            label: vec![text("X"), Inline::Space, text("ignored")],
            target: "https://x.test".to_string(),
            title: String::new(),
        }])])]);
        let out = transform(input, &Options::default()).unwrap();
        let Block::Para(children) = &out.blocks[0] else {
            panic!("expected paragraph");
        };
        let html = widget_html(&children[0]);
        assert!(html.contains(
            "<a href=\"https://x.test\" target=\"_blank\" rel=\"noopener noreferrer\">X</a>"
        ));
        assert!(!html.contains("ignored"));
    }

    #[test]
    fn quoted_styles_pick_their_glyphs() {
        let quoted = |style, s: &str| Inline::Quoted {
            style,
            content: vec![text(s)],
        };
        let input = doc(vec![Block::Para(vec![note(vec![
            quoted(QuoteStyle::Single, "a"),
            quoted(QuoteStyle::Double, "b"),
            quoted(QuoteStyle::Other("WeirdQuote".to_string()), "c"),
        ])])]);
        let out = transform(input, &Options::default()).unwrap();
        let Block::Para(children) = &out.blocks[0] else {
            panic!("expected paragraph");
        };
        let html = widget_html(&children[0]);
        assert!(html.contains("\u{2018}a\u{2019}\u{201c}b\u{201d}c"));
    }

    #[test]
    fn unknown_blocks_pass_through_unchanged() {
        let bullet = json!({ "t": "BulletList", "c": [[{ "t": "Plain", "c": [] }]] });
        let input = doc(vec![
            Block::Other(bullet.clone()),
            Block::Para(vec![note(vec![text("n")])]),
        ]);
        let out = transform(input, &Options::default()).unwrap();
        assert_eq!(out.blocks[0], Block::Other(bullet));
    }

    #[test]
    fn non_note_inlines_pass_through_unchanged() {
        let input = doc(vec![Block::Para(vec![
            text("keep"),
            Inline::Emph(vec![text("me")]),
        ])]);
        let out = transform(input, &Options::default()).unwrap();
        let Block::Para(children) = &out.blocks[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(children[0], text("keep"));
        assert_eq!(children[1], Inline::Emph(vec![text("me")]));
    }

    #[test]
    fn unknown_inline_in_note_falls_back_to_raw_payload() {
        let code = Inline::Other(json!({ "t": "Code", "c": "let x" }));
        let line_break = Inline::Other(json!({ "t": "LineBreak" }));
        let raw = Inline::RawInline {
            format: "html".to_string(),
            text: "<wbr>".to_string(),
        };
        let input = doc(vec![Block::Para(vec![note(vec![code, line_break, raw])])]);
        let out = transform(input, &compat()).unwrap();
        let Block::Para(children) = &out.blocks[0] else {
            panic!("expected paragraph");
        };
        let html = widget_html(&children[0]);
        assert!(html.contains("let x<wbr>"));
    }

    #[test]
    fn empty_note_body_is_a_shape_error() {
        let input = doc(vec![Block::Para(vec![Inline::Note(Vec::new())])]);
        let err = transform(input, &Options::default()).unwrap_err();
        assert!(matches!(err, SidenoteError::Shape { node, .. } if node == "Note"));
    }

    #[test]
    fn link_with_empty_label_is_a_shape_error() {
        let input = doc(vec![Block::Para(vec![note(vec![Inline::Link {
            attr: Value::Null,
            label: Vec::new(),
            target: "https://x.test".to_string(),
            title: String::new(),
        }])])]);
        let err = transform(input, &Options::default()).unwrap_err();
        assert!(matches!(err, SidenoteError::Shape { node, .. } if node == "Link"));
    }

    #[test]
    fn escaping_is_on_by_default_and_off_in_compat_mode() {
        let build = || doc(vec![Block::Para(vec![note(vec![text("<b> & done")])])]);

        let escaped = transform(build(), &Options::default()).unwrap();
        let Block::Para(children) = &escaped.blocks[0] else {
            panic!("expected paragraph");
        };
        assert!(widget_html(&children[0]).contains("&lt;b&gt; &amp; done"));

        let verbatim = transform(build(), &compat()).unwrap();
        let Block::Para(children) = &verbatim.blocks[0] else {
            panic!("expected paragraph");
        };
        assert!(widget_html(&children[0]).contains("<b> & done"));
    }

    #[test]
    fn transform_json_round_trips_a_pandoc_document() {
        let input = json!({
            "pandoc-api-version": [1, 23, 1],
            "meta": { "title": { "t": "MetaString", "c": "T" } },
            "blocks": [
                { "t": "Para", "c": [
                    { "t": "Str", "c": "Body" },
                    { "t": "Note", "c": [
                        { "t": "Para", "c": [{ "t": "Str", "c": "a note" }] },
                    ]},
                ]},
                { "t": "HorizontalRule" },
            ],
        })
        .to_string();

        let output = transform_json(&input, &Options::default()).unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["pandoc-api-version"], json!([1, 23, 1]));
        assert_eq!(value["meta"]["title"]["c"], json!("T"));
        assert_eq!(value["blocks"][1], json!({ "t": "HorizontalRule" }));

        let replaced = &value["blocks"][0]["c"][1];
        assert_eq!(replaced["t"], json!("RawInline"));
        assert_eq!(replaced["c"][0], json!("html"));
        let html = replaced["c"][1].as_str().unwrap();
        assert!(html.contains("sidenote-wrapper"));
        assert!(html.contains("a note"));
    }

    #[test]
    fn transform_json_rejects_malformed_input() {
        let err = transform_json("{", &Options::default()).unwrap_err();
        assert!(matches!(err, SidenoteError::Json(_)));

        let err = transform_json(r#"{"meta":{}}"#, &Options::default()).unwrap_err();
        assert!(matches!(err, SidenoteError::Shape { .. }));
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: Options = serde_json::from_str("{}").unwrap();
        assert!(options.escape_text);
        let options: Options = serde_json::from_str(r#"{"escape_text":false}"#).unwrap();
        assert!(!options.escape_text);
    }
}
