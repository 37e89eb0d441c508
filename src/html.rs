//! Small helpers shared by the email templates and the confirmation pages.

/// Escape text for interpolation into HTML element content or attribute values.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
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

/// Cut `input` to at most `max` characters, appending "..." when anything was dropped.
pub fn truncate(input: &str, max: usize) -> String {
    match input.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &input[..idx]),
        None => input.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_markup() {
        assert_eq!(
            escape(r#"<script>alert("x")</script> & 'y'"#),
            "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt; &amp; &#39;y&#39;"
        );
        assert_eq!(escape("Tech Fest 2025"), "Tech Fest 2025");
    }

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        assert_eq!(truncate("short", 150), "short");
        assert_eq!(truncate("abcdef", 3), "abc...");
        assert_eq!(truncate("ঢাকা ঢাকা", 4), "ঢাকা...");
        assert_eq!(truncate("exact", 5), "exact");
    }
}
