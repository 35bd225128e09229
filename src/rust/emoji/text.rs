use std::sync::OnceLock;

use regex::Regex;

/// Lowercases text and strips the `@user` mention placeholder and `#` marks.
pub fn preprocess_text(text: &str) -> String {
    text.to_lowercase()
        .replace("@user", "")
        .replace('#', "")
        .trim()
        .to_string()
}

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b\w\w+\b").expect("token pattern is valid"))
}

/// Words of two or more word characters, in order.
pub fn tokenize(text: &str) -> Vec<&str> {
    token_pattern().find_iter(text).map(|m| m.as_str()).collect()
}
