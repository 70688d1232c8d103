//! Fixed reply texts.

use crate::language::language_name;

pub const HELP: &str = "*📖 How to use this bot*\n\n\
*Step 1:* Paste a YouTube link\n\
*Step 2:* Get your summary\n\
*Step 3:* Ask any question!\n\n\
*Language:* Type \"Summarize in Hindi\" or \"Explain in Tamil\"\n\n\
*Commands:*\n\
/summary – Re-show last summary\n\
/deepdive – Deep analysis\n\
/actionpoints – Action items\n\
/language – Language menu\n\
/clear – Clear session\n";

pub const SESSION_CLEARED: &str = "🗑️ Session cleared! Send a new YouTube link.";
pub const CHOOSE_LANGUAGE: &str = "🌐 Choose your language:";
pub const NO_SUMMARY: &str = "❌ No summary yet. Send a YouTube link first!";
pub const NO_VIDEO: &str = "❌ No video loaded. Send a YouTube link first!";
pub const BAD_URL: &str = "❌ Could not read that URL. Please try again.";
pub const CACHE_HIT: &str = "⚡ Found in cache! Generating summary...";
pub const FETCHING: &str = "⏳ *Fetching transcript...*";
pub const GENERATING_SUMMARY: &str = "🧠 *Generating summary...*";
pub const FOLLOW_UP_HINT: &str =
    "💬 *Now ask me anything about this video!*\n_Example: What did they say about money?_";
pub const DEEP_DIVE_LOADING: &str = "🔬 Doing deep analysis...";
pub const ACTION_POINTS_LOADING: &str = "📋 Extracting action points...";
pub const TASK_FAILED: &str = "❌ Something went wrong. Please try again.";
pub const ANSWER_FAILED: &str = "❌ Error answering. Please try again.";
pub const SEND_A_LINK: &str =
    "👋 Send me a YouTube link to get started!\n\nExample:\nhttps://youtube.com/watch?v=dQw4w9WgXcQ";

pub fn welcome(first_name: Option<&str>) -> String {
    format!(
        "👋 *Welcome {}!*\n\n\
I'm your YouTube AI Assistant 🤖\n\n\
*How to use:*\n\
1️⃣ Paste any YouTube link\n\
2️⃣ Get a structured summary\n\
3️⃣ Ask questions about the video!\n\n\
*Commands:*\n\
/summary – Show last summary\n\
/deepdive – Deep analysis\n\
/actionpoints – Get action items\n\
/language – Switch language\n\
/clear – Start over\n\
/help – Help\n\n\
_Paste a YouTube link to begin!_ 🚀",
        first_name.unwrap_or_default()
    )
}

pub fn fetch_failed(error: &str) -> String {
    format!("❌ *Error:* {}", error)
}

pub fn summary_failed(error: &str) -> String {
    format!("❌ Error generating summary: {}", error)
}

/// Reply to a free-text language switch, echoing the word the user typed.
pub fn language_switched(code: &str, word: &str) -> String {
    if code == "hi" {
        "✅ भाषा हिंदी में बदल दी गई! 🇮🇳".to_string()
    } else {
        format!("✅ Language switched! I'll now respond in {}.", word)
    }
}

/// Reply to a language picked from the menu.
pub fn language_selected(code: &str) -> String {
    match code {
        "hi" => "✅ भाषा *हिंदी* में सेट हो गई! अब मैं हिंदी में जवाब दूंगा 🇮🇳".to_string(),
        "en" => "✅ Language set to *English 🇬🇧*!".to_string(),
        _ => format!("✅ Language set to *{}*!", language_name(code)),
    }
}

/// Button label for a language in the menu.
pub fn language_button(code: &str) -> String {
    match code {
        "en" => "🇬🇧 English".to_string(),
        "hi" => "🇮🇳 Hindi".to_string(),
        _ => language_name(code).to_string(),
    }
}
