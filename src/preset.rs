//! LLM preset configurations for each assistant task.
//!
//! A preset bundles the provider, model, sampling settings, system message and
//! prompt template a task is sent with.

use crate::config::Provider;
use serde::Serialize;

const GROQ_LARGE_MODEL: &str = "llama-3.3-70b-versatile";
const GROQ_INSTANT_MODEL: &str = "llama-3.1-8b-instant";
const OPENAI_CHAT_MODEL: &str = "gpt-3.5-turbo";

const SUMMARIZER_SYSTEM: &str = "You are a concise and clear summarizer.";
const TEACHER_SYSTEM: &str = "You are a kind teacher explaining things simply.";

/// Style of a generated article summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryStyle {
    /// Concise bullet points
    BulletPoints,
    /// Academic abstract
    Abstract,
    /// Simple English for a younger audience
    SimpleEnglish,
}

impl SummaryStyle {
    /// Returns all styles in generation order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::BulletPoints, Self::Abstract, Self::SimpleEnglish]
    }

    /// Returns the human-readable label used when comparing summaries.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::BulletPoints => "Bullet Points",
            Self::Abstract => "Abstract",
            Self::SimpleEnglish => "Simple English",
        }
    }
}

/// Task an assistant sends to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Answer a question from a document chunk
    StudyAnswer,
    /// Draft an email reply
    EmailReply,
    /// Summarize an article in the given style
    Summary(SummaryStyle),
    /// Pull financial figures out of an article as JSON
    FinancialExtraction,
}

/// Preset configuration for one LLM task.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmPreset {
    /// Unique preset identifier
    pub id: &'static str,
    /// Provider the task is designed for
    pub provider: Provider,
    /// Model id
    pub model: &'static str,
    /// Sampling temperature, `None` for the provider default
    pub temperature: Option<f32>,
    /// Completion token limit, `None` for the provider default
    pub max_tokens: Option<u32>,
    /// Optional system message sent before the prompt
    pub system_prompt: Option<&'static str>,
    /// Name of the prompt template to render
    pub template: &'static str,
}

impl LlmPreset {
    /// Creates the preset for the given task.
    #[must_use]
    pub const fn for_task(task: TaskKind) -> Self {
        match task {
            TaskKind::StudyAnswer => Self {
                id: "study-answer",
                provider: Provider::Groq,
                model: GROQ_LARGE_MODEL,
                temperature: Some(0.3),
                max_tokens: Some(512),
                system_prompt: None,
                template: "study_answer",
            },
            TaskKind::EmailReply => Self {
                id: "email-reply",
                provider: Provider::Groq,
                model: GROQ_LARGE_MODEL,
                temperature: Some(0.3),
                max_tokens: Some(512),
                system_prompt: None,
                template: "email_reply",
            },
            TaskKind::Summary(style) => Self::summary(style),
            TaskKind::FinancialExtraction => Self {
                id: "financial-extraction",
                provider: Provider::OpenAi,
                model: OPENAI_CHAT_MODEL,
                temperature: None,
                max_tokens: None,
                system_prompt: None,
                template: "financial_extraction",
            },
        }
    }

    const fn summary(style: SummaryStyle) -> Self {
        let (id, system_prompt, template) = match style {
            SummaryStyle::BulletPoints => ("summary-bullets", SUMMARIZER_SYSTEM, "summary_bullets"),
            SummaryStyle::Abstract => ("summary-abstract", SUMMARIZER_SYSTEM, "summary_abstract"),
            SummaryStyle::SimpleEnglish => ("summary-simple", TEACHER_SYSTEM, "summary_simple"),
        };

        Self {
            id,
            provider: Provider::Groq,
            model: GROQ_INSTANT_MODEL,
            temperature: Some(0.3),
            max_tokens: Some(300),
            system_prompt: Some(system_prompt),
            template,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_labels() {
        let labels: Vec<&str> = SummaryStyle::all().iter().map(|s| s.label()).collect();
        assert_eq!(labels, ["Bullet Points", "Abstract", "Simple English"]);
    }

    #[test]
    fn test_study_and_reply_presets() {
        for task in [TaskKind::StudyAnswer, TaskKind::EmailReply] {
            let preset = LlmPreset::for_task(task);
            assert_eq!(preset.model, "llama-3.3-70b-versatile");
            assert_eq!(preset.temperature, Some(0.3));
            assert_eq!(preset.max_tokens, Some(512));
            assert_eq!(preset.provider, Provider::Groq);
            assert!(preset.system_prompt.is_none());
        }
    }

    #[test]
    fn test_summary_presets() {
        let bullets = LlmPreset::for_task(TaskKind::Summary(SummaryStyle::BulletPoints));
        assert_eq!(bullets.model, "llama-3.1-8b-instant");
        assert_eq!(bullets.max_tokens, Some(300));
        assert_eq!(bullets.system_prompt, Some(SUMMARIZER_SYSTEM));

        let simple = LlmPreset::for_task(TaskKind::Summary(SummaryStyle::SimpleEnglish));
        assert_eq!(simple.system_prompt, Some(TEACHER_SYSTEM));
        assert_eq!(simple.template, "summary_simple");
    }

    #[test]
    fn test_financial_preset_uses_provider_defaults() {
        let preset = LlmPreset::for_task(TaskKind::FinancialExtraction);
        assert_eq!(preset.provider, Provider::OpenAi);
        assert_eq!(preset.model, "gpt-3.5-turbo");
        assert!(preset.temperature.is_none());
        assert!(preset.max_tokens.is_none());
    }
}
