use crate::{
    client::{CompletionProvider, CompletionRequest},
    config::Config,
    error::{Error, Result},
    input::Tone,
    preset::{LlmPreset, TaskKind},
    prompt::TemplateEngine,
};
use serde::Serialize;
use tracing::{debug, info, instrument};

/// A drafted email reply and the prompt that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct DraftedReply {
    /// Tone the reply was requested in
    pub tone: Tone,
    /// Prompt sent to the model
    pub prompt: String,
    /// Drafted reply text
    pub reply: String,
}

/// Drafts replies to incoming emails.
#[derive(Debug)]
pub struct EmailReply<'a, P> {
    config: &'a Config,
    provider: P,
    templates: TemplateEngine,
}

impl<'a, P: CompletionProvider> EmailReply<'a, P> {
    /// Creates an email reply drafter.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt templates fail to load.
    pub fn new(config: &'a Config, provider: P) -> Result<Self> {
        Ok(Self {
            config,
            provider,
            templates: TemplateEngine::new()?,
        })
    }

    /// Renders the reply prompt without calling the model.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn build_prompt(&self, email: &str, points: &[String], tone: Tone) -> Result<String> {
        self.templates.email_reply(email.trim(), points, tone)
    }

    /// Drafts a reply to `email` covering `points` in the requested tone.
    ///
    /// # Errors
    ///
    /// Returns an error if the email is empty, prompt rendering fails, or the
    /// provider call fails.
    #[instrument(skip_all, fields(tone = %tone, points = points.len()))]
    pub fn draft(&self, email: &str, points: &[String], tone: Tone) -> Result<DraftedReply> {
        if email.trim().is_empty() {
            return Err(Error::config("email text must not be empty"));
        }

        let prompt = self.build_prompt(email, points, tone)?;
        debug!("Reply prompt:\n{}", prompt);

        let preset = LlmPreset::for_task(TaskKind::EmailReply);
        let request = CompletionRequest::from_preset(&preset, self.config, prompt.clone());
        let reply = self.provider.send(&request)?;

        info!("Drafted {} reply ({} chars)", tone, reply.len());
        Ok(DraftedReply {
            tone,
            prompt,
            reply,
        })
    }
}
