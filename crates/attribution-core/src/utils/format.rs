use std::sync::OnceLock;

use regex::Regex;

/// Counter label shown above the student list
pub fn student_total_label(count: usize) -> String {
    format!("{} étudiant-e-s", count)
}

/// Counter label shown above the availability list
pub fn corp_total_label(count: usize) -> String {
    format!("{} disponibilités", count)
}

/// Decode the handful of HTML entities Django's autoescape produces
pub fn decode_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?s)<[^>]*>").expect("tag pattern"))
}

/// Reduce server-rendered markup to its text, one non-empty line per block
pub fn strip_html(markup: &str) -> String {
    let text = tag_pattern().replace_all(markup, "\n");
    decode_entities(&text)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}
