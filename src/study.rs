//! Document question answering: pick the chunk that best matches the
//! question and let the model answer from it.

use crate::{
    chunker::Chunker,
    client::{CompletionProvider, CompletionRequest},
    config::Config,
    error::{Error, Result},
    keywords::TokenizeStrategy,
    preset::{LlmPreset, TaskKind},
    prompt::TemplateEngine,
    scorer::{Candidate, ScoredCandidate, Selector},
};
use serde::Serialize;
use tracing::{debug, info, instrument};

/// Result of answering one question.
#[derive(Debug, Clone, Serialize)]
pub struct StudyAnswer {
    /// Chunk used as context
    pub context: ScoredCandidate,
    /// Prompt sent to the model
    pub prompt: String,
    /// Model answer
    pub answer: String,
}

/// Answers questions about a document.
#[derive(Debug)]
pub struct StudyAssistant<'a, P> {
    config: &'a Config,
    provider: P,
    chunker: Chunker,
    selector: Selector,
    templates: TemplateEngine,
}

impl<'a, P: CompletionProvider> StudyAssistant<'a, P> {
    /// Creates an assistant using the configured chunk size and overlap.
    ///
    /// # Errors
    ///
    /// Returns an error if the chunk configuration is invalid or the prompt
    /// templates fail to load.
    pub fn new(config: &'a Config, provider: P) -> Result<Self> {
        Ok(Self {
            config,
            provider,
            chunker: Chunker::new(config.chunk_size, config.chunk_overlap)?,
            // Question and chunks are compared as raw lower-cased words.
            selector: Selector::new(TokenizeStrategy::Raw),
            templates: TemplateEngine::new()?,
        })
    }

    /// Returns the chunk of `document` that best matches `question`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyCandidateSet`] if the document has no words.
    pub fn best_chunk(&self, document: &str, question: &str) -> Result<ScoredCandidate> {
        let candidates: Vec<Candidate> = self
            .chunker
            .chunks(document)
            .map(crate::chunker::Chunk::into_candidate)
            .collect();

        debug!("Scoring {} chunks against the question", candidates.len());
        self.selector.select_best(question, &candidates)
    }

    /// Answers `question` from the best-matching chunk of `document`.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is empty, prompt rendering fails, or
    /// the provider call fails.
    #[instrument(skip_all, fields(document_len = document.len()))]
    pub fn answer(&self, document: &str, question: &str) -> Result<StudyAnswer> {
        let question = question.trim().to_lowercase();
        if question.is_empty() {
            return Err(Error::config("question must not be empty"));
        }

        let context = self.best_chunk(document, &question)?;
        info!(
            "Selected {} (score {:.4}) as context",
            context.label, context.score
        );

        let prompt = self.templates.study_answer(&context.text, &question)?;
        let preset = LlmPreset::for_task(TaskKind::StudyAnswer);
        let request = CompletionRequest::from_preset(&preset, self.config, prompt.clone());

        let answer = self.provider.send(&request)?;

        Ok(StudyAnswer {
            context,
            prompt,
            answer,
        })
    }
}
