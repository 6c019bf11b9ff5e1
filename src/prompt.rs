use crate::{
    error::{Error, Result},
    input::Tone,
    preset::{LlmPreset, SummaryStyle, TaskKind},
};
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera, Value};

#[derive(Serialize)]
struct StudyContext<'a> {
    context: &'a str,
    question: &'a str,
}

#[derive(Serialize)]
struct ReplyContext<'a> {
    tone: &'a str,
    email: &'a str,
    points: &'a [String],
}

#[derive(Serialize)]
struct SummaryContext<'a> {
    count: usize,
    text: &'a str,
}

#[derive(Serialize)]
struct ArticleContext<'a> {
    text: &'a str,
}

/// Template engine rendering the prompt of every task.
pub struct TemplateEngine {
    tera: Tera,
}

impl std::fmt::Debug for TemplateEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateEngine")
            .field("templates", &self.tera.get_template_names().count())
            .finish()
    }
}

impl TemplateEngine {
    /// Creates a new template engine with the built-in prompt templates.
    ///
    /// # Errors
    ///
    /// Returns an error if template registration fails.
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        Self::register_builtin_templates(&mut tera)?;
        Self::register_filters(&mut tera);

        Ok(Self { tera })
    }

    /// Registers the built-in prompt templates.
    fn register_builtin_templates(tera: &mut Tera) -> Result<()> {
        let templates = [
            ("study_answer", include_str!("../templates/study_answer.tera")),
            ("email_reply", include_str!("../templates/email_reply.tera")),
            ("summary_bullets", include_str!("../templates/summary_bullets.tera")),
            ("summary_abstract", include_str!("../templates/summary_abstract.tera")),
            ("summary_simple", include_str!("../templates/summary_simple.tera")),
            (
                "financial_extraction",
                include_str!("../templates/financial_extraction.tera"),
            ),
        ];

        for (name, source) in templates {
            tera.add_raw_template(name, source)
                .map_err(|e| Error::template(name, &e))?;
        }

        Ok(())
    }

    /// Registers custom Tera filters.
    fn register_filters(tera: &mut Tera) {
        // ['a', 'b'] list rendering for bullet points
        tera.register_filter("quoted_list", Self::quoted_list_filter);
    }

    /// Renders an array of strings as `['first', 'second']`.
    fn quoted_list_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
        let Some(items) = value.as_array() else {
            return Err(tera::Error::msg("quoted_list expects an array"));
        };

        let quoted: Vec<String> = items
            .iter()
            .map(|item| {
                let text = item
                    .as_str()
                    .map_or_else(|| item.to_string(), str::to_owned);
                format!("'{}'", text.replace('\\', "\\\\").replace('\'', "\\'"))
            })
            .collect();

        Ok(Value::String(format!("[{}]", quoted.join(", "))))
    }

    fn render(&self, template: &str, data: &impl Serialize) -> Result<String> {
        let context = Context::from_serialize(data).map_err(|e| Error::template(template, &e))?;

        self.tera
            .render(template, &context)
            .map_err(|e| Error::template(template, &e))
    }

    /// Renders the question-answering prompt around the best chunk.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn study_answer(&self, context: &str, question: &str) -> Result<String> {
        let preset = LlmPreset::for_task(TaskKind::StudyAnswer);
        self.render(preset.template, &StudyContext { context, question })
    }

    /// Renders the email reply prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn email_reply(&self, email: &str, points: &[String], tone: Tone) -> Result<String> {
        let preset = LlmPreset::for_task(TaskKind::EmailReply);
        self.render(
            preset.template,
            &ReplyContext {
                tone: tone.as_str(),
                email,
                points,
            },
        )
    }

    /// Renders the summary prompt for one style.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn summary(&self, style: SummaryStyle, text: &str, count: usize) -> Result<String> {
        let preset = LlmPreset::for_task(TaskKind::Summary(style));
        self.render(preset.template, &SummaryContext { count, text })
    }

    /// Renders the financial extraction prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn financial_extraction(&self, text: &str) -> Result<String> {
        let preset = LlmPreset::for_task(TaskKind::FinancialExtraction);
        self.render(preset.template, &ArticleContext { text })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> TemplateEngine {
        TemplateEngine::new().unwrap()
    }

    #[test]
    fn test_template_engine_creation() {
        assert!(TemplateEngine::new().is_ok());
    }

    #[test]
    fn test_study_answer() {
        let prompt = engine()
            .study_answer("Cells divide by mitosis.", "how do cells divide?")
            .unwrap();
        assert_eq!(
            prompt,
            "Context:\nCells divide by mitosis.\n\nQuestion:how do cells divide?\n\nAnswer:"
        );
    }

    #[test]
    fn test_email_reply() {
        let points = vec!["thank customer".to_string(), "send brochure".to_string()];
        let prompt = engine()
            .email_reply("Can you send pricing?", &points, Tone::Friendly)
            .unwrap();
        assert_eq!(
            prompt,
            "Draft a professional email reply in a friendly tone based on the following.\n\
             Original email: 'Can you send pricing?'\n\
             Key points to include: ['thank customer', 'send brochure']\n\
             Reply:"
        );
    }

    #[test]
    fn test_email_reply_without_points() {
        let prompt = engine().email_reply("Hi", &[], Tone::Formal).unwrap();
        assert!(prompt.contains("Key points to include: []\n"));
        assert!(prompt.contains("in a formal tone"));
    }

    #[test]
    fn test_summary_prompts() {
        let engine = engine();
        assert_eq!(
            engine.summary(SummaryStyle::BulletPoints, "ARTICLE", 5).unwrap(),
            "Summarize the following text in 5 concise bullet points:\n\nARTICLE"
        );
        assert_eq!(
            engine.summary(SummaryStyle::Abstract, "ARTICLE", 3).unwrap(),
            "Summarize the following text as a 3-sentence abstract:\n\nARTICLE"
        );
        assert_eq!(
            engine.summary(SummaryStyle::SimpleEnglish, "ARTICLE", 5).unwrap(),
            "Summarize the following text in simple English suitable for a 12-year-old, \
             in 5 sentences:\n\nARTICLE"
        );
    }

    #[test]
    fn test_financial_prompt() {
        let prompt = engine()
            .financial_extraction("Apple Inc. reported revenue of $365.8 billion.")
            .unwrap();
        let expected = r#"Please retrieve Company Name, Stock Symbol, Revenue, Net Income, Total Assets, EBITDA, Stock Price, earnings per share (EPS) from the given financial text or the news article. If you can't find the information from the text or the news article then return "Not Found". DO NOT MAKE UP ANY INFORMATION.
For the Stock Symbol, return the ticker symbol of the company. For example, if the company name is "Apple Inc.", then return "AAPL" as the Stock Symbol.
Always return your response in the below JSON format:
{
    "Company Name": "Walmart Inc.",
    "Stock Symbol": "WMT",
    "Revenue": "$559.2 billion",
    "Net Income": "$13.7 billion",
    "Total Assets": "$252.5 billion",
    "EBITDA": "$22.5 billion",
    "Stock Price": "$177.57",
    "Earnings per Share (EPS)": "$5.61"
}
News Article:
=============
Apple Inc. reported revenue of $365.8 billion."#;
        assert_eq!(prompt, expected);
    }

    #[test]
    fn test_text_is_not_escaped() {
        let prompt = engine().study_answer("<b>R&D</b> \"quoted\"", "q").unwrap();
        assert!(prompt.contains("<b>R&D</b> \"quoted\""));
    }

    #[test]
    fn test_quoted_list_filter() {
        let value = serde_json::json!(["it's", "plain"]);
        let result = TemplateEngine::quoted_list_filter(&value, &HashMap::new()).unwrap();
        assert_eq!(result.as_str().unwrap(), r"['it\'s', 'plain']");

        let not_a_list = Value::String("x".to_string());
        assert!(TemplateEngine::quoted_list_filter(&not_a_list, &HashMap::new()).is_err());
    }
}
