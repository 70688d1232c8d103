//! Prompt templates for tldw.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("Invalid regex"));

/// A system/user prompt pair with `{{variable}}` placeholders.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Prompts {
    pub summary: PromptPair,
    pub answer: PromptPair,
    pub deep_dive: PromptPair,
    pub action_points: PromptPair,
}

impl Default for Prompts {
    fn default() -> Self {
        Self {
            summary: PromptPair {
                system: "You are an expert YouTube video analyst. Respond ENTIRELY in {{language}}."
                    .to_string(),
                user: r#"Summarize this YouTube video titled "{{title}}".

Transcript:
{{transcript}}

Respond in {{language}}. Use this EXACT format:

🎥 *{{title}}*

📌 *Key Points*
1. [key point]
2. [key point]
3. [key point]
4. [key point]
5. [key point]

⏱ *Important Timestamps*
- [0:00] – [topic covered]
- [X:XX] – [topic covered]
- [X:XX] – [topic covered]

🧠 *Core Takeaway*
[2-3 sentence summary of the main lesson]

💡 *Best For*
[One sentence: who should watch this]"#
                    .to_string(),
            },
            answer: PromptPair {
                system: r#"You answer questions about YouTube videos using ONLY the transcript provided.
If the answer is not in the transcript, reply exactly: "{{not_found}}"
Never make up information. Respond in {{language}}."#
                    .to_string(),
                user: r#"Video: "{{title}}"

Transcript:
{{transcript}}

Question: {{question}}

Answer based ONLY on the transcript. Respond in {{language}}."#
                    .to_string(),
            },
            deep_dive: PromptPair {
                system: "You are a deep analysis expert. Respond in {{language}}.".to_string(),
                user: r#"Do a DEEP DIVE analysis of this transcript. Respond in {{language}}.

Transcript:
{{transcript}}

Use this format:

🔬 *Deep Dive Analysis*

📊 *Main Arguments*
[Key arguments made in the video]

🔍 *Underlying Themes*
[3-5 deeper themes]

⚖️ *Strengths & Gaps*
[What is strong, what is missing]

🎯 *Key Insights*
[Most important insights for the viewer]"#
                    .to_string(),
            },
            action_points: PromptPair {
                system: "You extract practical action items from video content. Respond in {{language}}."
                    .to_string(),
                user: r#"Extract all action items from this transcript. Respond in {{language}}.

Transcript:
{{transcript}}

Use this format:

📋 *Action Points*

🚀 *Do Today*
- [action]
- [action]

📅 *This Week*
- [action]
- [action]

🎯 *Long Term*
- [action]

💰 *Biggest Quick Win*
[The single most impactful thing to do right now]"#
                    .to_string(),
            },
        }
    }
}

impl Prompts {
    /// Load prompts, applying overrides from `custom_dir` when present.
    pub fn load(custom_dir: Option<&str>) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let overrides: [(&str, &mut PromptPair); 4] = [
                ("summary.toml", &mut prompts.summary),
                ("answer.toml", &mut prompts.answer),
                ("deep_dive.toml", &mut prompts.deep_dive),
                ("action_points.toml", &mut prompts.action_points),
            ];

            for (file, slot) in overrides {
                let path = custom_path.join(file);
                if path.exists() {
                    let content = std::fs::read_to_string(&path)?;
                    *slot = toml::from_str(&content)?;
                }
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Substitution is a single pass over the template: values are copied
    /// verbatim, so placeholders inside them stay as written. Unknown
    /// placeholders are left untouched.
    pub fn render(template: &str, vars: &HashMap<&str, String>) -> String {
        PLACEHOLDER
            .replace_all(template, |caps: &Captures| match vars.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }
}
