//! HTML and URL escaping helpers

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left alone by JavaScript's `encodeURIComponent`
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Reverse [`html_escape`] for text pulled back out of rendered markup
pub fn html_unescape(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}

/// Percent-encode a query parameter value
pub fn encode_uri_component(s: &str) -> String {
    utf8_percent_encode(s, URI_COMPONENT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<script>alert("x" & 'y')</script>"#),
            "&lt;script&gt;alert(&quot;x&quot; &amp; &#39;y&#39;)&lt;/script&gt;"
        );
        assert_eq!(html_escape("plain 한글"), "plain 한글");
    }

    #[test]
    fn test_html_unescape() {
        let raw = r#"if a < b && c > "d" { 'e' }"#;
        assert_eq!(html_unescape(&html_escape(raw)), raw);
        assert_eq!(html_unescape("&amp;lt;"), "&lt;");
    }

    #[test]
    fn test_encode_uri_component() {
        assert_eq!(encode_uri_component("a.md"), "a.md");
        assert_eq!(encode_uri_component("dir/my post.md"), "dir%2Fmy%20post.md");
        assert_eq!(encode_uri_component("a&b=c?"), "a%26b%3Dc%3F");
        assert_eq!(encode_uri_component("it's(1)!*~"), "it's(1)!*~");
        assert_eq!(encode_uri_component("글.md"), "%EA%B8%80.md");
    }
}
