//! Escaping helpers for the three contexts user text lands in: HTML
//! text/attributes, CSS declarations, and inline `<script>` data.

/// Escape text for use in HTML element content or a double-quoted
/// attribute value.
pub fn html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
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

/// Strip characters that could terminate a CSS declaration, rule, or the
/// surrounding `<style>` element.
pub fn css_value(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | '{' | '}' | ';' | '\\' | '\n' | '\r'))
        .collect()
}

/// Quote a URL for `url('...')`.
pub fn css_url(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\'' => out.push_str("%27"),
            '\\' => out.push_str("%5C"),
            '<' => out.push_str("%3C"),
            '>' => out.push_str("%3E"),
            '\n' | '\r' => {}
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Serialize a JSON value so it can sit inside an inline `<script>` block.
///
/// `<`, `>` and `&` only ever occur inside JSON string literals, so
/// replacing them with `\u` escapes keeps the value identical to a JS
/// parser while making `</script>` impossible.
pub fn script_json(value: &serde_json::Value) -> String {
    value
        .to_string()
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}

/// Percent-encode a query-string component (RFC 3986 unreserved set kept).
pub fn query_component(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_escapes_markup_and_quotes() {
        assert_eq!(
            html(r#"<b>"Tom & Jerry's"</b>"#),
            "&lt;b&gt;&quot;Tom &amp; Jerry&#39;s&quot;&lt;/b&gt;"
        );
    }

    #[test]
    fn css_value_cannot_break_out() {
        assert_eq!(css_value("Georgia; } </style><script>"), "Georgia  /stylescript");
    }

    #[test]
    fn css_url_is_quoted() {
        assert_eq!(css_url("https://x.test/a'b.jpg"), "'https://x.test/a%27b.jpg'");
    }

    #[test]
    fn script_json_neutralises_closing_tag() {
        let value = serde_json::json!({ "subject": "</script><script>alert(1)</script>" });
        let out = script_json(&value);
        assert!(!out.contains("</script>"));
        let round: serde_json::Value =
            serde_json::from_str(&out).expect("still valid JSON");
        assert_eq!(round, value);
    }

    #[test]
    fn query_component_encodes_reserved() {
        assert_eq!(query_component("6Lc-abc_1"), "6Lc-abc_1");
        assert_eq!(query_component("a b&c"), "a%20b%26c");
    }
}
