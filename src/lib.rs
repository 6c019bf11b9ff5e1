//! # llm-assist
//!
//! Small LLM assistants built around keyword-overlap selection.
//!
//! ## Features
//!
//! - Keyword extraction with raw or normalized tokenization
//! - Overlapping word chunking of long documents
//! - Keyword-overlap scoring and best-candidate selection
//! - Document Q&A, news briefs, email replies and financial data extraction
//!   against any OpenAI-compatible chat completion endpoint
//!
//! ## Quick Start
//!
//! ```
//! use llm_assist::{Candidate, chunk, extract_keywords, select_best};
//!
//! # fn main() -> llm_assist::Result<()> {
//! let keywords = extract_keywords("Machine learning models, trained!");
//! assert!(keywords.contains("machine"));
//! assert!(keywords.contains("trained"));
//!
//! let chunks = chunk("a b c d e", 3, 1)?;
//! assert_eq!(chunks.len(), 3);
//!
//! let best = select_best(
//!     "machine learning models",
//!     &[
//!         Candidate::new("A", "machine learning is great"),
//!         Candidate::new("B", "cats and dogs"),
//!     ],
//! )?;
//! assert_eq!(best.label, "A");
//! # Ok(())
//! # }
//! ```
//!
//! ## Talking to a model
//!
//! ```no_run
//! use llm_assist::{ChatClient, Config, Provider, StudyAssistant, load_document};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! let client = ChatClient::new(&config, Provider::Groq)?;
//!
//! let document = load_document("notes.txt");
//! let answer = StudyAssistant::new(&config, client)?.answer(&document, "What is mitosis?")?;
//! println!("{}", answer.answer);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! 1. **Keywords**: Turns text into a set of keywords
//! 2. **Chunker**: Splits documents into overlapping word windows
//! 3. **Scorer**: Ranks candidates by keyword overlap with a reference
//! 4. **Client**: Sends rendered prompts to the completion provider
//! 5. **Workflows**: `StudyAssistant`, `NewsBrief`, `EmailReply`, `FinancialExtractor`
//! 6. **Writer**: Renders results and persists them atomically

#![warn(
    missing_docs,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
#![allow(clippy::module_name_repetitions)]

mod brief;
mod chunker;
mod client;
mod config;
mod error;
mod financial;
mod input;
mod keywords;
mod prompt;
mod reply;
mod scorer;
mod study;
mod writer;

pub mod preset;

pub use brief::{BriefReport, NewsBrief, Summary};
pub use chunker::{Chunk, Chunker, Chunks, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, chunk};
pub use client::{ChatClient, ChatMessage, CompletionProvider, CompletionRequest, Role};
pub use config::{Config, ConfigBuilder, Endpoint, Provider};
pub use error::{Error, Result};
pub use financial::{
    DEFAULT_MEASURES, FinancialExtractor, FinancialReport, Measure, NOT_FOUND,
    parse_financial_json, parse_financial_response,
};
pub use input::{Tone, load_document, prompt_line, read_all, split_items, tone_menu};
pub use keywords::{KeywordExtractor, KeywordSet, TokenizeStrategy, extract_keywords};
pub use preset::{LlmPreset, SummaryStyle, TaskKind};
pub use prompt::TemplateEngine;
pub use reply::{DraftedReply, EmailReply};
pub use scorer::{Candidate, ScoredCandidate, Selector, best_of, score, select_best};
pub use study::{StudyAnswer, StudyAssistant};
pub use writer::{OutputFormat, Report, Writer, output_path, render};
