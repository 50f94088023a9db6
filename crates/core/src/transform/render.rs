//! Rendering rules for inline nodes and the sidenote widget.

use super::context::Context;
use crate::autolink::autolink_urls;
use crate::error::SidenoteError;
use crate::model::{Block, Inline, QuoteStyle};
use serde_json::Value;

/// Marker prefix that classifies a note body as an unnumbered margin note.
const MARGIN_MARKER: &str = "{-}";
/// Circled-plus glyph shown on margin-note toggles.
const MARGIN_SYMBOL: &str = "&#8853;";

/// Walks a block sequence, replacing every footnote found in paragraph-like
/// containers with a rendered sidenote widget.
pub fn walk_blocks(blocks: Vec<Block>, ctx: &mut Context) -> Result<Vec<Block>, SidenoteError> {
    blocks
        .into_iter()
        .map(|block| walk_block(block, ctx))
        .collect()
}

/// Walks one block. Only paragraph-like containers and headers have their
/// inline children visited; every other kind passes through unchanged,
/// including block containers this walker does not enumerate.
fn walk_block(block: Block, ctx: &mut Context) -> Result<Block, SidenoteError> {
    Ok(match block {
        Block::Para(inlines) => Block::Para(walk_inlines(inlines, ctx)?),
        Block::Plain(inlines) => Block::Plain(walk_inlines(inlines, ctx)?),
        Block::Header {
            level,
            attr,
            content,
        } => Block::Header {
            level,
            attr,
            content: walk_inlines(content, ctx)?,
        },
        other => other,
    })
}

/// Walks an inline sequence: notes become raw-markup widgets at the same
/// position, everything else is left untouched. Sibling count and order are
/// preserved.
pub fn walk_inlines(inlines: Vec<Inline>, ctx: &mut Context) -> Result<Vec<Inline>, SidenoteError> {
    inlines
        .into_iter()
        .map(|inline| match inline {
            Inline::Note(blocks) => render_note(&blocks, ctx),
            other => Ok(other),
        })
        .collect()
}

/// Renders one note into its replacement widget and advances the note counter.
///
/// The note body is the inline content of the note's first paragraph-like
/// block. A rendered body starting with `{-}` (plus optional whitespace, both
/// stripped) classifies the note as an unnumbered margin note; anything else
/// becomes a numbered sidenote. The widget is a label/checkbox toggle pair
/// keyed by the allocated note id, so show/hide works without scripting.
pub fn render_note(blocks: &[Block], ctx: &mut Context) -> Result<Inline, SidenoteError> {
    let body = match blocks.first() {
        Some(Block::Para(inlines)) | Some(Block::Plain(inlines)) => inlines,
        Some(_) => {
            return Err(SidenoteError::shape(
                "Note",
                "body must begin with a paragraph",
            ));
        }
        None => return Err(SidenoteError::shape("Note", "missing body")),
    };

    let rendered = ctx.render_inlines_to_html(body)?;
    let note_id = ctx.next_note_id();

    let (label_class, label_symbol, content_class, content) =
        match rendered.strip_prefix(MARGIN_MARKER) {
            Some(rest) => ("margin-toggle", MARGIN_SYMBOL, "marginnote", rest.trim_start()),
            None => (
                "margin-toggle sidenote-number",
                "",
                "sidenote",
                rendered.as_str(),
            ),
        };

    let html = format!(
        "<span class=\"sidenote-wrapper\">\
         <label for=\"{note_id}\" class=\"{label_class}\">{label_symbol}</label>\
         <input type=\"checkbox\" id=\"{note_id}\" class=\"margin-toggle\"/>\
         <span class=\"{content_class}\">{content}<br /><br /></span>\
         </span>"
    );

    Ok(Inline::RawInline {
        format: "html".to_string(),
        text: html,
    })
}

/// Renders children wrapped in a fixed tag pair.
fn render_wrapped(
    tag: &str,
    children: &[Inline],
    ctx: &mut Context,
) -> Result<(), SidenoteError> {
    ctx.push_raw(&format!("<{}>", tag));
    for child in children {
        render_inline(child, ctx)?;
    }
    ctx.push_raw(&format!("</{}>", tag));
    Ok(())
}

/// Recursively collects the plain text of an inline node, ignoring markup.
fn collect_plain_text(node: &Inline, buffer: &mut String) {
    match node {
        Inline::Str(text) => buffer.push_str(text),
        Inline::Space => buffer.push(' '),
        Inline::Emph(children)
        | Inline::Strong(children)
        | Inline::Underline(children)
        | Inline::Strikeout(children)
        | Inline::Subscript(children)
        | Inline::Superscript(children) => {
            for child in children {
                collect_plain_text(child, buffer);
            }
        }
        Inline::Quoted { content, .. } => {
            for child in content {
                collect_plain_text(child, buffer);
            }
        }
        Inline::Link { label, .. } => {
            for child in label {
                collect_plain_text(child, buffer);
            }
        }
        _ => {}
    }
}

/// Renders one inline node into the context's markup buffer.
///
/// One fixed rule per kind; unrecognized kinds fall back to their raw payload
/// rather than failing, so new Pandoc node kinds degrade gracefully.
pub fn render_inline(node: &Inline, ctx: &mut Context) -> Result<(), SidenoteError> {
    match node {
        Inline::Space => ctx.push_raw(" "),
        Inline::SoftBreak => ctx.push_raw("<br />"),
        Inline::Str(text) => {
            let html = autolink_urls(text, ctx.escape_enabled());
            ctx.push_raw(&html);
        }
        Inline::Emph(children) => render_wrapped("em", children, ctx)?,
        Inline::Strong(children) => render_wrapped("strong", children, ctx)?,
        Inline::Underline(children) => render_wrapped("u", children, ctx)?,
        Inline::Strikeout(children) => render_wrapped("s", children, ctx)?,
        Inline::Subscript(children) => render_wrapped("sub", children, ctx)?,
        Inline::Superscript(children) => render_wrapped("sup", children, ctx)?,
        Inline::Quoted { style, content } => {
            if content.is_empty() {
                return Err(SidenoteError::shape("Quoted", "no child inlines"));
            }
            let (open, close) = match style {
                QuoteStyle::Single => ("\u{2018}", "\u{2019}"),
                QuoteStyle::Double => ("\u{201c}", "\u{201d}"),
                QuoteStyle::Other(_) => ("", ""),
            };
            ctx.push_raw(open);
            for child in content {
                render_inline(child, ctx)?;
            }
            ctx.push_raw(close);
        }
        Inline::Link { label, target, .. } => {
            // Only the first label child contributes visible text. Narrow,
            // but downstream output depends on it.
            let first = label
                .first()
                .ok_or_else(|| SidenoteError::shape("Link", "missing label sequence"))?;
            ctx.push_raw("<a href=\"");
            ctx.push_attr_value(target);
            ctx.push_raw("\" target=\"_blank\" rel=\"noopener noreferrer\">");
            let mut text = String::new();
            collect_plain_text(first, &mut text);
            ctx.push_text(&text);
            ctx.push_raw("</a>");
        }
        Inline::Note(_) => {
            log::warn!("nested note inside a note body is not supported; dropping it");
        }
        Inline::RawInline { text, .. } => ctx.push_raw(text),
        Inline::Other(value) => {
            match value.get("c").and_then(Value::as_str) {
                Some(payload) => ctx.push_text(payload),
                None => {
                    let tag = value.get("t").and_then(Value::as_str).unwrap_or("unknown");
                    log::debug!("unhandled inline node kind {}; rendering nothing", tag);
                }
            }
        }
    }
    Ok(())
}
