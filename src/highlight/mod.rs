//! Syntax highlighting over rendered markup
//!
//! Works on finished HTML: every `<pre><code class="language-*">` block
//! in the document is replaced with its highlighted form. Blocks without
//! a language class are left alone.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use syntect::highlighting::{Theme as SyntectTheme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::config::HighlightConfig;
use crate::render::html_unescape;
use crate::theme::Theme;

lazy_static! {
    static ref CODE_BLOCK: Regex =
        Regex::new(r#"(?s)<pre><code class="language-([^"\s]+)">(.*?)</code></pre>"#)
            .expect("code block pattern is valid");
}

/// Code highlighter backed by syntect
pub struct Highlighter {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    light_theme: String,
    dark_theme: String,
    line_numbers: bool,
}

impl Highlighter {
    /// Create a highlighter with the default themes
    pub fn new() -> Self {
        Self::with_options(&HighlightConfig::default())
    }

    /// Create with custom settings
    pub fn with_options(config: &HighlightConfig) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            light_theme: config.light_theme.clone(),
            dark_theme: config.dark_theme.clone(),
            line_numbers: config.line_number,
        }
    }

    /// Build from configuration; `None` when highlighting is disabled
    pub fn from_config(config: &HighlightConfig) -> Option<Self> {
        config.enable.then(|| Self::with_options(config))
    }

    /// Highlight every language-tagged code block in `markup`
    pub fn highlight_all(&self, markup: &str, theme: Theme) -> String {
        let Some(syntect_theme) = self.syntect_theme(theme) else {
            tracing::warn!("No highlighting theme available, leaving code blocks as-is");
            return markup.to_string();
        };

        CODE_BLOCK
            .replace_all(markup, |caps: &Captures| {
                let code = html_unescape(&caps[2]);
                self.highlight_code(&code, &caps[1], syntect_theme)
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }

    fn syntect_theme(&self, theme: Theme) -> Option<&SyntectTheme> {
        let name = match theme {
            Theme::Light => &self.light_theme,
            Theme::Dark => &self.dark_theme,
        };
        self.theme_set
            .themes
            .get(name)
            .or_else(|| self.theme_set.themes.values().next())
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: &str, theme: &SyntectTheme) -> Option<String> {
        // Try to find syntax for the language
        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        match highlighted_html_for_string(code, &self.syntax_set, syntax, theme) {
            Ok(highlighted) => Some(if self.line_numbers {
                add_line_numbers(&highlighted, lang)
            } else {
                format!(r#"<figure class="highlight {}">{}</figure>"#, lang, highlighted)
            }),
            Err(e) => {
                tracing::debug!("Highlighting {} block failed: {}", lang, e);
                None
            }
        }
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

/// Add line numbers to highlighted code
fn add_line_numbers(code: &str, lang: &str) -> String {
    let lines: Vec<&str> = code.lines().collect();

    let gutter = (1..=lines.len())
        .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
        .collect::<Vec<_>>()
        .join("\n");
    let code_lines = lines.join("\n");

    format!(
        r#"<figure class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code">{}</td></tr></table></figure>"#,
        lang, gutter, code_lines
    )
}
