//! giscus comment widget

use lazy_static::lazy_static;
use regex::Regex;

use crate::config::CommentsConfig;
use crate::render::html_escape;

lazy_static! {
    static ref WIDGET_SCRIPT: Regex = Regex::new(r#"(?s)<script[^>]*src="[^"]*giscus[^"]*"[^>]*>.*?</script>"#)
        .expect("widget script pattern is valid");
}

/// Builds and mounts the embeddable comment script
#[derive(Debug, Clone)]
pub struct CommentWidget {
    config: CommentsConfig,
}

impl CommentWidget {
    pub fn new(config: CommentsConfig) -> Self {
        Self { config }
    }

    /// Build from configuration; `None` when comments are disabled
    pub fn from_config(config: &CommentsConfig) -> Option<Self> {
        config.enable.then(|| Self::new(config.clone()))
    }

    /// The `<script>` element that loads the widget
    pub fn script(&self) -> String {
        let c = &self.config;
        let attrs = [
            ("data-repo", c.repo.as_str()),
            ("data-repo-id", c.repo_id.as_str()),
            ("data-category", c.category.as_str()),
            ("data-category-id", c.category_id.as_str()),
            ("data-mapping", c.mapping.as_str()),
            ("data-strict", flag(c.strict)),
            ("data-reactions-enabled", flag(c.reactions_enabled)),
            ("data-emit-metadata", flag(c.emit_metadata)),
            ("data-input-position", c.input_position.as_str()),
            ("data-theme", c.theme.as_str()),
            ("data-lang", c.lang.as_str()),
        ];

        let mut script = format!(r#"<script src="{}""#, html_escape(&c.src));
        for (name, value) in attrs {
            script.push_str(&format!(r#" {}="{}""#, name, html_escape(value)));
        }
        script.push_str(r#" crossorigin="anonymous" async></script>"#);
        script
    }

    /// Place the widget into a container's markup, replacing any widget
    /// script already mounted there
    pub fn mount(&self, container: &str) -> String {
        let cleaned = WIDGET_SCRIPT.replace_all(container, "");
        format!("{}{}", cleaned, self.script())
    }
}

fn flag(on: bool) -> &'static str {
    if on {
        "1"
    } else {
        "0"
    }
}
