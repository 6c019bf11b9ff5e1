//! Financial measure extraction from news articles.

use crate::{
    client::{CompletionProvider, CompletionRequest},
    config::Config,
    error::{Error, Result},
    preset::{LlmPreset, TaskKind},
    prompt::TemplateEngine,
};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, instrument, warn};

/// Measures reported when the model response cannot be parsed.
pub const DEFAULT_MEASURES: [&str; 8] = [
    "Company Name",
    "Stock Symbol",
    "Revenue",
    "Net Income",
    "Total Assets",
    "EBITDA",
    "Stock Price",
    "EPS",
];

/// Value used for measures the model could not find.
pub const NOT_FOUND: &str = "Not Found";

/// One measure/value row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Measure {
    /// Measure name, e.g. "Revenue"
    pub measure: String,
    /// Extracted value
    pub value: String,
}

impl Measure {
    fn new(measure: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            measure: measure.into(),
            value: value.into(),
        }
    }
}

/// Table of extracted financial measures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinancialReport {
    /// Rows in the order the model returned them
    pub rows: Vec<Measure>,
    /// Whether the rows came from the fallback table
    #[serde(skip)]
    pub fallback: bool,
}

impl FinancialReport {
    /// The fallback table with every measure set to "Not Found".
    #[must_use]
    pub fn not_found() -> Self {
        Self {
            rows: DEFAULT_MEASURES
                .iter()
                .map(|measure| Measure::new(*measure, NOT_FOUND))
                .collect(),
            fallback: true,
        }
    }

    /// Looks up the value of a measure by name.
    #[must_use]
    pub fn get(&self, measure: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|row| row.measure == measure)
            .map(|row| row.value.as_str())
    }
}

/// Parses a model response into a report, keeping the key order.
///
/// # Errors
///
/// Returns [`Error::Serialization`] if the response is not a JSON object.
pub fn parse_financial_json(response: &str) -> Result<FinancialReport> {
    let body = strip_code_fence(response);
    let value: Value = serde_json::from_str(body)?;

    let Value::Object(map) = value else {
        return Err(Error::Serialization {
            message: "expected a JSON object of measures".to_string(),
        });
    };

    Ok(FinancialReport {
        rows: rows_from_map(map),
        fallback: false,
    })
}

/// Parses a model response, falling back to the "Not Found" table.
#[must_use]
pub fn parse_financial_response(response: &str) -> FinancialReport {
    match parse_financial_json(response) {
        Ok(report) => report,
        Err(e) => {
            warn!("Could not parse financial data, using fallback table: {}", e);
            FinancialReport::not_found()
        }
    }
}

fn rows_from_map(map: Map<String, Value>) -> Vec<Measure> {
    map.into_iter()
        .map(|(measure, value)| {
            let value = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
            Measure::new(measure, value)
        })
        .collect()
}

/// Removes a surrounding Markdown code fence such as ```` ```json ````.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the info string ("json") up to the first newline.
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.trim_end()
        .strip_suffix("```")
        .unwrap_or(rest)
        .trim()
}

/// Extracts financial measures from articles.
#[derive(Debug)]
pub struct FinancialExtractor<'a, P> {
    config: &'a Config,
    provider: P,
    templates: TemplateEngine,
}

impl<'a, P: CompletionProvider> FinancialExtractor<'a, P> {
    /// Creates a financial extractor.
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

    /// Extracts the financial measures mentioned in `article`.
    ///
    /// Unparseable responses produce the fallback table rather than an error.
    ///
    /// # Errors
    ///
    /// Returns an error if prompt rendering or the provider call fails.
    #[instrument(skip_all, fields(article_len = article.len()))]
    pub fn extract(&self, article: &str) -> Result<FinancialReport> {
        let prompt = self.templates.financial_extraction(article.trim())?;
        let preset = LlmPreset::for_task(TaskKind::FinancialExtraction);
        let request = CompletionRequest::from_preset(&preset, self.config, prompt);

        let response = self.provider.send(&request)?;
        debug!("Raw financial response:\n{}", response);

        let report = parse_financial_response(&response);
        info!("Extracted {} financial measures", report.rows.len());
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::ScriptedProvider;

    const RESPONSE: &str = r#"{
        "Company Name": "Apple Inc.",
        "Stock Symbol": "AAPL",
        "Revenue": "$365.8 billion",
        "Net Income": "$94.7 billion",
        "Total Assets": "$351 billion",
        "EBITDA": "$112.4 billion",
        "Stock Price": "$177.57",
        "Earnings per Share (EPS)": "$5.61"
    }"#;

    #[test]
    fn test_parse_preserves_order() {
        let report = parse_financial_json(RESPONSE).unwrap();
        assert!(!report.fallback);
        assert_eq!(report.rows.len(), 8);
        assert_eq!(report.rows[0], Measure::new("Company Name", "Apple Inc."));
        assert_eq!(report.rows[7].measure, "Earnings per Share (EPS)");
        assert_eq!(report.get("Revenue"), Some("$365.8 billion"));
        assert_eq!(report.get("EPS"), None);
    }

    #[test]
    fn test_parse_fenced_response() {
        let fenced = format!("```json\n{RESPONSE}\n```");
        let report = parse_financial_json(&fenced).unwrap();
        assert_eq!(report.get("Stock Symbol"), Some("AAPL"));
    }

    #[test]
    fn test_non_string_values() {
        let report =
            parse_financial_json(r#"{"Stock Price": 177.57, "EBITDA": null}"#).unwrap();
        assert_eq!(report.get("Stock Price"), Some("177.57"));
        assert_eq!(report.get("EBITDA"), Some("null"));
    }

    #[test]
    fn test_fallback_table() {
        let report = parse_financial_response("Sorry, I cannot help with that.");
        assert!(report.fallback);
        assert_eq!(report, FinancialReport::not_found());
        assert_eq!(report.rows.len(), 8);
        assert!(report.rows.iter().all(|row| row.value == NOT_FOUND));
        assert_eq!(report.rows[7].measure, "EPS");

        assert!(parse_financial_response("[1, 2]").fallback);
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("  {}  "), "{}");
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("```json\n{\"a\": 1}```"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```"), "");
    }

    #[test]
    fn test_extract() {
        let config = Config::builder().build().unwrap();
        let provider = ScriptedProvider::new([RESPONSE]);
        let extractor = FinancialExtractor::new(&config, &provider).unwrap();

        let report = extractor
            .extract("Apple Inc. reported a revenue of $365.8 billion.")
            .unwrap();
        assert_eq!(report.get("Company Name"), Some("Apple Inc."));

        let requests = provider.requests();
        assert_eq!(requests[0].model, "gpt-3.5-turbo");
        assert_eq!(requests[0].temperature, None);
        assert_eq!(requests[0].max_tokens, None);
        assert!(requests[0].messages[0].content.ends_with("reported a revenue of $365.8 billion."));
    }

    #[test]
    fn test_extract_model_override() {
        let config = Config::builder().model("gpt-4o-mini").build().unwrap();
        let provider = ScriptedProvider::new(["not json"]);
        let extractor = FinancialExtractor::new(&config, &provider).unwrap();

        let report = extractor.extract("No numbers here.").unwrap();
        assert!(report.fallback);
        assert_eq!(provider.requests()[0].model, "gpt-4o-mini");
    }
}
