//! Show a single post

use anyhow::Result;

use crate::content::{MetaValue, ParsedDocument};
use crate::render::fallback_title;
use crate::Blog;

/// Print a post's metadata, or its full page markup with `html`
pub async fn run(blog: &Blog, file: &str, html: bool) -> Result<()> {
    let loader = blog.loader()?;

    if html {
        let theme = blog.theme_store(None)?.current();
        let page = loader.post_page(Some(file), theme).await;
        print!("{}", page.to_html(&blog.config, theme));
        return Ok(());
    }

    let raw = loader.fetch_document(file).await?;
    let parsed = ParsedDocument::parse(&raw);
    let detail = loader.renderer().render_detail(&parsed, &fallback_title(file));

    println!("Title:    {}", detail.title);
    println!("Date:     {}", detail.date);
    if let Some(category) = &detail.category {
        println!("Category: {}", category);
    }
    if !detail.tags.is_empty() {
        println!("Tags:     {}", detail.tags.join(", "));
    }

    let extra: Vec<_> = parsed
        .metadata
        .iter()
        .filter(|(key, _)| !matches!(key.as_str(), "title" | "date" | "category" | "tags"))
        .collect();
    if !extra.is_empty() {
        println!("Other:");
        for (key, value) in extra {
            match value {
                MetaValue::Text(text) => println!("  {}: {}", key, text),
                MetaValue::List(items) => println!("  {}: [{}]", key, items.join(", ")),
            }
        }
    }

    println!();
    println!("{}", parsed.body.trim_end());
    Ok(())
}
