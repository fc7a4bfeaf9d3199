//! List site content

use anyhow::Result;

use crate::filter::{tag_counts, FilterState};
use crate::Blog;

/// List posts visible under a filter, or the tag set
pub async fn run(blog: &Blog, content_type: &str, state: &FilterState) -> Result<()> {
    let loader = blog.loader()?;
    let posts = loader.fetch_manifest().await?;

    match content_type {
        "post" | "posts" => {
            let visible = state.visible(&posts);
            println!("Posts ({} of {}):", visible.len(), posts.len());
            for post in visible {
                let category = if post.category.is_empty() {
                    String::new()
                } else {
                    format!(" ({})", post.category)
                };
                println!("  {} - {}{} [{}]", post.date, post.title, category, post.file);
                if !post.tags.is_empty() {
                    println!("      #{}", post.tags.join(" #"));
                }
            }
        }
        "tag" | "tags" => {
            let tags = tag_counts(&posts);
            println!("Tags ({}):", tags.len());
            for (tag, count) in tags {
                println!("  {} ({})", tag, count);
            }
        }
        _ => {
            anyhow::bail!("Unknown type: {}. Available: post, tag", content_type);
        }
    }

    Ok(())
}
