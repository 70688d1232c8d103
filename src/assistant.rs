//! Prompt construction and generation for the bot's four video tasks.

use crate::chunking::{chunk_transcript, select_best_chunk, truncate_middle};
use crate::config::{LlmSettings, PromptPair, Prompts};
use crate::error::Result;
use crate::language::language_name;
use crate::llm::Generator;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Transcript budgets, in characters, for each task.
#[derive(Debug, Clone, Copy)]
pub struct Budgets {
    pub summary: usize,
    pub analysis: usize,
    pub answer_chunk: usize,
}

impl Budgets {
    pub fn from_settings(settings: &LlmSettings) -> Self {
        Self {
            summary: settings.summary_max_chars,
            analysis: settings.analysis_max_chars,
            answer_chunk: settings.answer_chunk_chars,
        }
    }
}

impl Default for Budgets {
    fn default() -> Self {
        Self::from_settings(&LlmSettings::default())
    }
}

/// Sentence the model must reply with when the transcript lacks an answer.
pub fn not_covered_sentence(language: &str) -> &'static str {
    match language {
        "hi" => "यह विषय वीडियो में शामिल नहीं है।",
        _ => "This topic is not covered in the video.",
    }
}

/// Summaries, answers and analyses of a transcript.
pub struct Assistant {
    generator: Arc<dyn Generator>,
    prompts: Prompts,
    budgets: Budgets,
}

impl Assistant {
    pub fn new(generator: Arc<dyn Generator>, prompts: Prompts, budgets: Budgets) -> Self {
        Self {
            generator,
            prompts,
            budgets,
        }
    }

    /// Structured summary of the whole video.
    #[instrument(skip(self, transcript), fields(title = %title))]
    pub async fn summarize(&self, transcript: &str, title: &str, language: &str) -> Result<String> {
        let mut vars = base_vars(language);
        vars.insert("title", title.to_string());
        vars.insert("transcript", truncate_middle(transcript, self.budgets.summary));

        self.run(&self.prompts.summary, &vars).await
    }

    /// Answer a question from the chunk of the transcript that best matches it.
    #[instrument(skip(self, transcript), fields(title = %title))]
    pub async fn answer(
        &self,
        question: &str,
        transcript: &str,
        title: &str,
        language: &str,
    ) -> Result<String> {
        let chunks = chunk_transcript(transcript, self.budgets.answer_chunk);
        let relevant = select_best_chunk(&chunks, question);
        info!("Answering from 1 of {} chunks", chunks.len());

        let mut vars = base_vars(language);
        vars.insert("title", title.to_string());
        vars.insert("transcript", relevant.to_string());
        vars.insert("question", question.to_string());
        vars.insert("not_found", not_covered_sentence(language).to_string());

        self.run(&self.prompts.answer, &vars).await
    }

    #[instrument(skip(self, transcript))]
    pub async fn deep_dive(&self, transcript: &str, language: &str) -> Result<String> {
        let mut vars = base_vars(language);
        vars.insert("transcript", truncate_middle(transcript, self.budgets.analysis));

        self.run(&self.prompts.deep_dive, &vars).await
    }

    #[instrument(skip(self, transcript))]
    pub async fn action_points(&self, transcript: &str, language: &str) -> Result<String> {
        let mut vars = base_vars(language);
        vars.insert("transcript", truncate_middle(transcript, self.budgets.analysis));

        self.run(&self.prompts.action_points, &vars).await
    }

    async fn run(&self, pair: &PromptPair, vars: &HashMap<&str, String>) -> Result<String> {
        let system = Prompts::render(&pair.system, vars);
        let user = Prompts::render(&pair.user, vars);

        self.generator.complete(&system, &user).await.inspect_err(|e| {
            error!("Generation failed: {}", e);
        })
    }
}

fn base_vars(language: &str) -> HashMap<&'static str, String> {
    let mut vars = HashMap::new();
    vars.insert("language", language_name(language).to_string());
    vars
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::MIDDLE_TRIMMED;
    use crate::error::TldwError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every prompt and replies with a fixed string.
    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl Generator for Recorder {
        async fn complete(&self, system: &str, user: &str) -> Result<String> {
            self.calls
                .lock()
                .unwrap()
                .push((system.to_string(), user.to_string()));
            Ok("reply".to_string())
        }
    }

    struct Failing;

    #[async_trait]
    impl Generator for Failing {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
            Err(TldwError::Generation("rate limited".to_string()))
        }
    }

    fn assistant(budgets: Budgets) -> (Assistant, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let assistant = Assistant::new(recorder.clone(), Prompts::default(), budgets);
        (assistant, recorder)
    }

    fn last_call(recorder: &Recorder) -> (String, String) {
        recorder.calls.lock().unwrap().last().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_summary_prompt() {
        let (assistant, recorder) = assistant(Budgets::default());
        let reply = assistant
            .summarize("[0:01] hello world", "My Video", "hi")
            .await
            .unwrap();
        assert_eq!(reply, "reply");

        let (system, user) = last_call(&recorder);
        assert!(system.contains("Respond ENTIRELY in Hindi"));
        assert!(user.contains("titled \"My Video\""));
        assert!(user.contains("[0:01] hello world"));
        assert!(!user.contains("{{"));
    }

    #[tokio::test]
    async fn test_question_text_is_not_substituted() {
        let (assistant, recorder) = assistant(Budgets::default());
        assistant
            .answer("what is {{title}} about", "[0:01] text body", "Hidden Title", "en")
            .await
            .unwrap();

        let (_, user) = last_call(&recorder);
        assert!(user.contains("what is {{title}} about"));
    }

    #[tokio::test]
    async fn test_summary_truncates_long_transcript() {
        let budgets = Budgets {
            summary: 20,
            ..Budgets::default()
        };
        let (assistant, recorder) = assistant(budgets);
        let transcript = format!("{}{}{}", "a".repeat(10), "b".repeat(50), "c".repeat(10));
        assistant.summarize(&transcript, "T", "en").await.unwrap();

        let (_, user) = last_call(&recorder);
        assert!(user.contains(&format!("{}{}{}", "a".repeat(10), MIDDLE_TRIMMED, "c".repeat(10))));
        assert!(!user.contains("bbbb"));
    }

    #[tokio::test]
    async fn test_answer_uses_relevant_chunk() {
        let budgets = Budgets {
            answer_chunk: 40,
            ..Budgets::default()
        };
        let (assistant, recorder) = assistant(budgets);
        let transcript = "[0:01] intro on cooking pasta dishes\n[3:00] saving money through budgeting";
        assistant
            .answer("tell me about budgeting", transcript, "T", "en")
            .await
            .unwrap();

        let (system, user) = last_call(&recorder);
        assert!(system.contains("This topic is not covered in the video."));
        assert!(user.contains("[3:00] saving money"));
        assert!(!user.contains("pasta"));
        assert!(user.contains("Question: tell me about budgeting"));
    }

    #[tokio::test]
    async fn test_answer_not_covered_in_hindi() {
        let (assistant, recorder) = assistant(Budgets::default());
        assistant.answer("kya?", "[0:01] text", "T", "hi").await.unwrap();

        let (system, _) = last_call(&recorder);
        assert!(system.contains("यह विषय वीडियो में शामिल नहीं है।"));
        assert!(system.contains("Respond in Hindi"));
    }

    #[tokio::test]
    async fn test_analysis_tasks() {
        let (assistant, recorder) = assistant(Budgets::default());
        assistant.deep_dive("[0:01] text", "ta").await.unwrap();
        let (system, user) = last_call(&recorder);
        assert!(system.contains("Tamil"));
        assert!(user.contains("DEEP DIVE"));

        assistant.action_points("[0:01] text", "xx").await.unwrap();
        let (system, user) = last_call(&recorder);
        assert!(system.contains("English"));
        assert!(user.contains("Action Points"));
    }

    #[tokio::test]
    async fn test_generation_failure_propagates() {
        let assistant = Assistant::new(Arc::new(Failing), Prompts::default(), Budgets::default());
        let err = assistant.deep_dive("[0:01] text", "en").await.unwrap_err();
        assert!(matches!(err, TldwError::Generation(_)));
        assert_eq!(err.to_string(), "AI error: rate limited");
    }
}
