//! Intent extraction through an OpenAI-compatible chat-completions service.

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{ComparisonType, IntentExtractor, QueryIntent, QueryType, SuggestionType};
use crate::{
    model::{ConversationTurn, Role, Units},
    provider::openweather::truncate_body,
};

pub const DEFAULT_BASE_URL: &str = "https://api.x.ai/v1";
pub const DEFAULT_MODEL: &str = "grok-beta";

/// How many prior turns are quoted in the prompt.
const PROMPT_HISTORY: usize = 4;

#[derive(Debug, Clone)]
pub struct CompletionClient {
    api_key: String,
    base_url: String,
    model: String,
    http: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    stream: bool,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

impl CompletionClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            http: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages,
            stream: false,
            temperature: 0.1,
            max_tokens: 500,
        };

        let res = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to completion service")?;

        let status = res.status();
        let body = res.text().await.context("Failed to read completion response body")?;

        if !status.is_success() {
            bail!("Completion request failed with status {status}: {}", truncate_body(&body));
        }

        let parsed: ChatResponse =
            serde_json::from_str(&body).context("Failed to parse completion response JSON")?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| anyhow!("Completion response had no choices"))
    }
}

#[async_trait]
impl IntentExtractor for CompletionClient {
    async fn extract(
        &self,
        text: &str,
        history: &[ConversationTurn],
        today: NaiveDate,
    ) -> Result<QueryIntent> {
        let messages = vec![
            ChatMessage { role: "system".into(), content: system_prompt(history, today) },
            ChatMessage { role: "user".into(), content: text.to_string() },
        ];

        let content = self.complete(messages).await?;
        debug!("Completion service replied: {}", content);

        parse_intent(&content, today)
    }
}

fn system_prompt(history: &[ConversationTurn], today: NaiveDate) -> String {
    let start = history.len().saturating_sub(PROMPT_HISTORY);
    let context = history[start..]
        .iter()
        .map(|turn| {
            let speaker = match turn.role {
                Role::User => "User",
                Role::Assistant => "Assistant",
            };
            format!("{speaker}: {}", turn.text)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You read weather questions and answer with one JSON object, nothing else.

Query types:
- SINGLE_LOCATION: weather for one place
- COMPARISON: weather across several places
- FOLLOW_UP: refers back to the conversation ("what about alaska", "on which day")
- DATE_RANGE: a weekend or named day
- SUGGESTION: asks for places to go ("suggest me a colder place")

If the question names no place but the conversation does, reuse that place.

Format:
{{"queryType": "...", "cities": ["..."], "date": "YYYY-MM-DD", "dateRange": ["YYYY-MM-DD", "YYYY-MM-DD"],
 "units": "Celsius|Fahrenheit", "comparisonType": "temperature|rain|general",
 "suggestionType": "colder|warmer|rainy|snowy|coastal|mountain|general", "context": "..."}}

Examples:
"Compare weather of Karachi and Istanbul" -> {{"queryType": "COMPARISON", "cities": ["Karachi", "Istanbul"], "comparisonType": "general"}}
"which is colder, murree or faisalabad" -> {{"queryType": "COMPARISON", "cities": ["Murree", "Faisalabad"], "comparisonType": "temperature"}}
"suggest me a colder place" -> {{"queryType": "SUGGESTION", "cities": [], "suggestionType": "colder"}}

Today is {today}.

Conversation so far:
{context}"#,
        today = today.format("%Y-%m-%d"),
    )
}

/// Reads the service's reply, tolerating fenced JSON and loosely typed fields.
pub fn parse_intent(content: &str, today: NaiveDate) -> Result<QueryIntent> {
    let json = strip_fences(content);
    let value: Value =
        serde_json::from_str(json).context("Completion service did not return valid JSON")?;
    let obj = value.as_object().ok_or_else(|| anyhow!("Completion service returned non-object JSON"))?;

    let str_field = |key: &str| obj.get(key).and_then(Value::as_str);

    let query_type = str_field("queryType").and_then(QueryType::from_label).unwrap_or(QueryType::SingleLocation);
    let mut intent = QueryIntent::new(query_type, today);

    intent.cities = match obj.get("cities").or_else(|| obj.get("city")) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    };

    if let Some(date) = str_field("date").and_then(parse_day) {
        intent.date = date;
    }

    if let Some(Value::Array(range)) = obj.get("dateRange") {
        let days: Vec<NaiveDate> = range.iter().filter_map(Value::as_str).filter_map(parse_day).collect();
        if let [first, .., last] = days.as_slice() {
            intent.date_range = Some((*first, *last));
        }
    }

    if str_field("units").is_some_and(|u| u.trim().eq_ignore_ascii_case("fahrenheit")) {
        intent.units = Units::Fahrenheit;
    }

    intent.comparison_type =
        str_field("comparisonType").and_then(ComparisonType::from_label).unwrap_or_default();

    intent.suggestion_type = str_field("suggestionType").and_then(SuggestionType::from_label);
    if intent.query_type == QueryType::Suggestion && intent.suggestion_type.is_none() {
        intent.suggestion_type = Some(SuggestionType::General);
    }

    intent.context_note = str_field("context").filter(|c| !c.trim().is_empty()).map(String::from);

    Ok(intent)
}

fn parse_day(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

fn strip_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else { return trimmed };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 14).expect("valid date")
    }

    #[test]
    fn parses_fenced_reply() {
        let reply = "```json\n{\"queryType\": \"COMPARISON\", \"cities\": [\"Karachi\", \"Istanbul\"], \"comparisonType\": \"general\"}\n```";
        let intent = parse_intent(reply, today()).expect("should parse");

        assert_eq!(intent.query_type, QueryType::Comparison);
        assert_eq!(intent.cities, vec!["Karachi".to_string(), "Istanbul".to_string()]);
        assert_eq!(intent.date, today());
    }

    #[test]
    fn tolerates_loose_fields() {
        let reply = r#"{"queryType": "weather", "city": "Oslo", "date": "not a date", "units": "Fahrenheit"}"#;
        let intent = parse_intent(reply, today()).expect("should parse");

        assert_eq!(intent.query_type, QueryType::SingleLocation);
        assert_eq!(intent.cities, vec!["Oslo".to_string()]);
        assert_eq!(intent.date, today());
        assert_eq!(intent.units, Units::Fahrenheit);
    }

    #[test]
    fn reads_dates_and_ranges() {
        let reply = r#"{"queryType": "DATE_RANGE", "cities": ["Paris"], "date": "2026-10-17", "dateRange": ["2026-10-17", "2026-10-18"]}"#;
        let intent = parse_intent(reply, today()).expect("should parse");

        let sat = NaiveDate::from_ymd_opt(2026, 10, 17).expect("valid date");
        let sun = NaiveDate::from_ymd_opt(2026, 10, 18).expect("valid date");
        assert_eq!(intent.date, sat);
        assert_eq!(intent.date_range, Some((sat, sun)));
    }

    #[test]
    fn suggestion_without_type_is_general() {
        let intent = parse_intent(r#"{"queryType": "SUGGESTION"}"#, today()).expect("should parse");
        assert_eq!(intent.suggestion_type, Some(SuggestionType::General));
    }

    #[test]
    fn prose_is_an_error() {
        assert!(parse_intent("Sure! Paris is lovely.", today()).is_err());
        assert!(parse_intent("[1, 2]", today()).is_err());
    }

    #[test]
    fn prompt_quotes_recent_turns_only() {
        let history: Vec<ConversationTurn> =
            (0..6).map(|i| ConversationTurn::user(&format!("turn {i}"))).collect();
        let prompt = system_prompt(&history, today());

        assert!(prompt.contains("Today is 2026-10-14."));
        assert!(!prompt.contains("turn 1"));
        assert!(prompt.contains("User: turn 2"));
        assert!(prompt.contains("User: turn 5"));
    }
}
