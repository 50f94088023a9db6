#![deny(missing_docs)]
//! Sidenote core: Pandoc document model and footnote-to-sidenote transformer.

/// URL auto-linking inside plain text runs.
pub mod autolink;
/// Core error types.
pub mod error;
/// Typed document model over the Pandoc JSON AST.
pub mod model;
/// The footnote-to-sidenote tree transformation.
pub mod transform;

pub use autolink::autolink_urls;
pub use error::SidenoteError;
pub use model::{Block, Document, Inline, QuoteStyle};
pub use transform::{Context, Options, transform, transform_json};
