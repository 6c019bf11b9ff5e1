//! News brief generation: summarize an article in several styles and keep
//! the summary whose keywords best cover the article.

use crate::{
    client::{CompletionProvider, CompletionRequest},
    config::Config,
    error::Result,
    keywords::TokenizeStrategy,
    preset::{LlmPreset, SummaryStyle, TaskKind},
    prompt::TemplateEngine,
    scorer::{Candidate, ScoredCandidate, Selector, best_of},
};
use serde::Serialize;
use tracing::{info, instrument};

/// One generated summary.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    /// Style the summary was requested in
    pub style: SummaryStyle,
    /// Overlap score against the article
    pub score: f64,
    /// Summary text
    pub text: String,
}

/// Every summary of an article plus the selected one.
#[derive(Debug, Clone, Serialize)]
pub struct BriefReport {
    /// Summaries in generation order
    pub summaries: Vec<Summary>,
    /// Highest-scoring summary (first wins on ties)
    pub best: ScoredCandidate,
}

impl BriefReport {
    /// Renders the chosen summary with its label.
    #[must_use]
    pub fn best_summary_text(&self) -> String {
        format!(
            "Best Summary (by keywords: {}):\n{}",
            self.best.label, self.best.text
        )
    }
}

/// Generates styled summaries and picks the best one.
#[derive(Debug)]
pub struct NewsBrief<'a, P> {
    config: &'a Config,
    provider: P,
    selector: Selector,
    templates: TemplateEngine,
}

impl<'a, P: CompletionProvider> NewsBrief<'a, P> {
    /// Creates a news brief generator.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt templates fail to load.
    pub fn new(config: &'a Config, provider: P) -> Result<Self> {
        Ok(Self {
            config,
            provider,
            // Article and summaries are compared on cleaned keywords.
            selector: Selector::new(TokenizeStrategy::Normalized),
            templates: TemplateEngine::new()?,
        })
    }

    /// Summarizes `article` in a single style.
    ///
    /// # Errors
    ///
    /// Returns an error if prompt rendering or the provider call fails.
    pub fn summarize(&self, article: &str, style: SummaryStyle) -> Result<String> {
        let prompt = self
            .templates
            .summary(style, article, self.config.summary_count)?;
        let preset = LlmPreset::for_task(TaskKind::Summary(style));
        let request = CompletionRequest::from_preset(&preset, self.config, prompt);

        info!("Requesting {} summary", style.label());
        self.provider.send(&request)
    }

    /// Summarizes `article` in every style and selects the best summary.
    ///
    /// # Errors
    ///
    /// Returns an error if any summary request fails.
    #[instrument(skip_all, fields(article_len = article.len()))]
    pub fn run(&self, article: &str) -> Result<BriefReport> {
        let candidates = SummaryStyle::all()
            .iter()
            .map(|&style| Ok(Candidate::new(style.label(), self.summarize(article, style)?)))
            .collect::<Result<Vec<_>>>()?;

        let scored = self.selector.score_all(article, &candidates);
        let summaries = SummaryStyle::all()
            .iter()
            .zip(&scored)
            .map(|(&style, scored)| Summary {
                style,
                score: scored.score,
                text: scored.text.clone(),
            })
            .collect();

        let best = best_of(scored)?;
        info!("Best summary by keywords: {} ({:.4})", best.label, best.score);

        Ok(BriefReport { summaries, best })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::ScriptedProvider;
    use crate::client::Role;
    use crate::error::Error;

    const ARTICLE: &str = "Scientists announced a breakthrough battery technology. \
        The battery charges electric vehicles within minutes. \
        Manufacturers expect production to start next year.";

    #[test]
    fn test_run_selects_best_summary() {
        let config = Config::builder().build().unwrap();
        let provider = ScriptedProvider::new([
            "- Battery news",
            "Scientists announced a breakthrough battery that charges electric vehicles within minutes.",
            "Some people made a new thing.",
        ]);
        let brief = NewsBrief::new(&config, &provider).unwrap();

        let report = brief.run(ARTICLE).unwrap();
        assert_eq!(report.summaries.len(), 3);
        assert_eq!(report.best.label, "Abstract");
        assert!(report.summaries[1].score > report.summaries[0].score);
        assert!(report.summaries.iter().all(|s| s.score < 1.0));
        assert!(
            report
                .best_summary_text()
                .starts_with("Best Summary (by keywords: Abstract):\nScientists")
        );
    }

    #[test]
    fn test_run_sends_styled_requests() {
        let config = Config::builder().summary_count(3).build().unwrap();
        let provider = ScriptedProvider::new(["a", "b", "c"]);
        let brief = NewsBrief::new(&config, &provider).unwrap();
        brief.run(ARTICLE).unwrap();

        let requests = provider.requests();
        assert_eq!(requests.len(), 3);
        for request in &requests {
            assert_eq!(request.model, "llama-3.1-8b-instant");
            assert_eq!(request.messages[0].role, Role::System);
            assert_eq!(request.max_tokens, Some(300));
        }
        assert!(requests[0].messages[1].content.contains("in 3 concise bullet points"));
        assert!(requests[1].messages[1].content.contains("3-sentence abstract"));
        assert_eq!(
            requests[2].messages[0].content,
            "You are a kind teacher explaining things simply."
        );
    }

    #[test]
    fn test_all_zero_scores_keep_first() {
        let config = Config::builder().build().unwrap();
        let provider = ScriptedProvider::new(["one", "two", "three"]);
        let report = NewsBrief::new(&config, provider).unwrap().run(ARTICLE).unwrap();

        assert_eq!(report.best.label, "Bullet Points");
        assert!(report.best.score.abs() < f64::EPSILON);
    }

    #[test]
    fn test_failed_summary_aborts() {
        let config = Config::builder().build().unwrap();
        let provider = ScriptedProvider::failing(Error::Http {
            message: "connection refused".to_string(),
        });
        let err = NewsBrief::new(&config, provider).unwrap().run(ARTICLE).unwrap_err();
        assert!(err.is_provider());
    }
}
