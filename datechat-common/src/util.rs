//! Utility functions for DateChat services.

/// Hide the middle half of a secret for display.
///
/// With `L` characters, `half = L / 2`, `start = half / 2` and
/// `end = start + half`; the result is `s[..start] + " ... " + s[end..]`.
/// Indices count characters, not bytes.
pub fn mask_middle(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let half = chars.len() / 2;
    let start = half / 2;
    let end = start + half;

    let head: String = chars[..start].iter().collect();
    let tail: String = chars[end..].iter().collect();
    format!("{head} ... {tail}")
}

/// Truncate a string to at most `max_chars` characters, appending "..." if truncated.
pub fn truncate_with_ellipsis(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => {
            let truncated = &s[..idx];
            format!("{}...", truncated.trim_end())
        }
        None => s.to_string(),
    }
}

/// Sanitize a string for safe logging (redact sensitive patterns).
pub fn sanitize_for_log(s: &str) -> String {
    let patterns: &[(&str, &str)] = &[
        (r"(?i)(api[_-]?key|apikey)[=:]\s*\S{20,}", "$1=***REDACTED***"),
        (r"(?i)(token|secret|bearer)\s*[=:]?\s*\S{10,}", "$1 ***REDACTED***"),
        (r"sk-[a-zA-Z0-9_\-]{20,}", "***REDACTED_API_KEY***"),
    ];

    let mut result = s.to_string();
    for (pattern, replacement) in patterns {
        if let Ok(re) = regex::Regex::new(pattern) {
            result = re.replace_all(&result, *replacement).to_string();
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_middle_sixteen_chars() {
        assert_eq!(mask_middle("ABCDEFGHIJKLMNOP"), "ABCD ... MNOP");
    }

    #[test]
    fn test_mask_middle_odd_and_short_lengths() {
        // L=7: half=3, start=1, end=4
        assert_eq!(mask_middle("abcdefg"), "a ... efg");
        // L=1: half=0, start=0, end=0
        assert_eq!(mask_middle("x"), " ... x");
        assert_eq!(mask_middle(""), " ... ");
    }

    #[test]
    fn test_mask_middle_multibyte() {
        // L=8: half=4, start=2, end=6
        assert_eq!(mask_middle("äöüßÄÖÜé"), "äö ... Üé");
    }

    #[test]
    fn test_truncate_with_ellipsis() {
        assert_eq!(truncate_with_ellipsis("hello", 10), "hello");
        assert_eq!(truncate_with_ellipsis("hello world", 5), "hello...");
        assert_eq!(truncate_with_ellipsis("😀😀😀😀", 2), "😀😀...");
    }

    #[test]
    fn test_sanitize_for_log() {
        let input = "Incorrect API key provided: sk-proj-12345678901234567890";
        let output = sanitize_for_log(input);
        assert!(!output.contains("sk-proj-12345678901234567890"));
        assert!(output.contains("REDACTED"));
    }
}
