//! Keyword-overlap scoring and best-candidate selection.
//!
//! The same scorer serves two purposes: retrieving the document chunk that
//! best matches a question, and picking the summary that best covers an
//! article. Each caller names its [`TokenizeStrategy`] explicitly.

use crate::{
    error::{Error, Result},
    keywords::{KeywordExtractor, KeywordSet, TokenizeStrategy},
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, trace};

/// A labelled text competing to be selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    /// Label, unique within one selection call
    pub label: String,

    /// Candidate text
    pub text: String,
}

impl Candidate {
    /// Creates a new candidate.
    #[must_use]
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }
}

impl<L: Into<String>, T: Into<String>> From<(L, T)> for Candidate {
    fn from((label, text): (L, T)) -> Self {
        Self::new(label, text)
    }
}

/// A candidate together with its overlap score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    /// Candidate label
    pub label: String,

    /// Candidate text
    pub text: String,

    /// Overlap score in `[0, 1)`
    pub score: f64,
}

/// Scores `candidate` against an already extracted reference keyword set.
///
/// `score = |keywords(candidate) ∩ reference| / (|reference| + 1)`
#[must_use]
pub fn score(
    candidate: &str,
    reference_keywords: &KeywordSet,
    extractor: &dyn KeywordExtractor,
) -> f64 {
    let candidate_keywords = extractor.extract(candidate);
    overlap_score(&candidate_keywords, reference_keywords)
}

#[allow(clippy::cast_precision_loss)]
fn overlap_score(candidate_keywords: &KeywordSet, reference_keywords: &KeywordSet) -> f64 {
    let overlap = candidate_keywords.intersection(reference_keywords).count();
    overlap as f64 / (reference_keywords.len() + 1) as f64
}

/// Picks the candidate whose keywords best overlap a reference text.
#[derive(Clone)]
pub struct Selector {
    strategy: TokenizeStrategy,
    extractor: Arc<dyn KeywordExtractor>,
}

impl std::fmt::Debug for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selector")
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}

impl Default for Selector {
    fn default() -> Self {
        Self::new(TokenizeStrategy::default())
    }
}

impl Selector {
    /// Creates a selector that tokenizes reference and candidates with `strategy`.
    #[must_use]
    pub fn new(strategy: TokenizeStrategy) -> Self {
        Self {
            strategy,
            extractor: strategy.create(),
        }
    }

    /// Scores every candidate against `reference`, preserving input order.
    #[must_use]
    pub fn score_all(&self, reference: &str, candidates: &[Candidate]) -> Vec<ScoredCandidate> {
        let reference_keywords = self.extractor.extract(reference);
        trace!("Reference has {} keywords", reference_keywords.len());

        candidates
            .iter()
            .map(|candidate| {
                let score = score(&candidate.text, &reference_keywords, self.extractor.as_ref());
                debug!("Keyword overlap score for {}: {:.4}", candidate.label, score);
                ScoredCandidate {
                    label: candidate.label.clone(),
                    text: candidate.text.clone(),
                    score,
                }
            })
            .collect()
    }

    /// Returns the best-scoring candidate.
    ///
    /// Ties go to the candidate that appears first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyCandidateSet`] if `candidates` is empty.
    pub fn select_best(
        &self,
        reference: &str,
        candidates: &[Candidate],
    ) -> Result<ScoredCandidate> {
        best_of(self.score_all(reference, candidates))
    }
}

/// Returns the highest-scoring entry, keeping the first on ties.
///
/// # Errors
///
/// Returns [`Error::EmptyCandidateSet`] if `scored` is empty.
pub fn best_of(scored: impl IntoIterator<Item = ScoredCandidate>) -> Result<ScoredCandidate> {
    let mut best: Option<ScoredCandidate> = None;

    for candidate in scored {
        if best
            .as_ref()
            .is_none_or(|current| candidate.score > current.score)
        {
            best = Some(candidate);
        }
    }

    best.ok_or(Error::EmptyCandidateSet)
}

/// Selects the best candidate using the normalized keyword strategy.
///
/// # Errors
///
/// Returns [`Error::EmptyCandidateSet`] if `candidates` is empty.
///
/// # Examples
///
/// ```
/// use llm_assist::{Candidate, select_best};
///
/// let candidates = [
///     Candidate::new("A", "machine learning is great"),
///     Candidate::new("B", "cats and dogs"),
/// ];
/// let best = select_best("machine learning models", &candidates)?;
/// assert_eq!(best.label, "A");
/// assert!((best.score - 0.5).abs() < f64::EPSILON);
/// # Ok::<(), llm_assist::Error>(())
/// ```
pub fn select_best(reference: &str, candidates: &[Candidate]) -> Result<ScoredCandidate> {
    Selector::new(TokenizeStrategy::Normalized).select_best(reference, candidates)
}
