//! Response languages.

use regex::Regex;
use std::sync::LazyLock;

/// Language used when a chat never picked one.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Supported language codes with their display names.
pub const SUPPORTED_LANGUAGES: [(&str, &str); 6] = [
    ("en", "English"),
    ("hi", "Hindi"),
    ("ta", "Tamil"),
    ("te", "Telugu"),
    ("kn", "Kannada"),
    ("mr", "Marathi"),
];

static SWITCH_REQUEST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:summarize|explain|respond|answer|talk)\s+in\s+(hindi|हिंदी|tamil|telugu|kannada|marathi)")
        .expect("Invalid regex")
});

/// Display name for a language code; unknown codes read as English.
pub fn language_name(code: &str) -> &'static str {
    SUPPORTED_LANGUAGES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
        .unwrap_or("English")
}

/// Detect requests like "summarize in Hindi".
///
/// Returns the language code and the word the user wrote.
pub fn parse_switch_request(text: &str) -> Option<(&'static str, String)> {
    let word = SWITCH_REQUEST.captures(text)?.get(1)?.as_str().to_string();
    let code = match word.to_lowercase().as_str() {
        "hindi" | "हिंदी" => "hi",
        "tamil" => "ta",
        "telugu" => "te",
        "kannada" => "kn",
        "marathi" => "mr",
        _ => DEFAULT_LANGUAGE,
    };
    Some((code, word))
}
