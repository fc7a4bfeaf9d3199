//! Show or change the persisted theme

use anyhow::Result;

use crate::theme::Theme;
use crate::Blog;

/// Run a theme action: `show`, `toggle`, `light` or `dark`
pub fn run(blog: &Blog, action: &str, system: Option<Theme>) -> Result<()> {
    let mut themes = blog.theme_store(None)?;
    if let Some(system) = system {
        themes.on_system_change(system);
    }

    match action {
        "show" => {
            let origin = if themes.persisted().is_some() {
                "saved"
            } else if system.is_some() {
                "system"
            } else {
                "default"
            };
            println!("{} ({})", themes.current(), origin);
        }
        "toggle" => {
            let theme = themes.toggle()?;
            println!("Switched to {}", theme);
        }
        other => {
            let theme: Theme = other.parse()?;
            themes.set(theme)?;
            println!("Switched to {}", theme);
        }
    }

    Ok(())
}
