//! Content module - manifest entries, post documents and their loading

mod frontmatter;
pub mod loader;
mod markdown;
mod post;

pub use frontmatter::{parse_list, ListError, ListSyntax, MetaValue, ParsedDocument};
pub use loader::{LoadError, PostCatalogLoader, Source};
pub use markdown::MarkdownRenderer;
pub use post::{parse_manifest, PostSummary};
