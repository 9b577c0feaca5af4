//! Turning free text into a structured weather query.
//!
//! Two extractors sit behind [`IntentPipeline`]: an optional remote
//! completion service and the rule-based extractor, which always works.
//! Any failure of the first falls through to the second.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::{debug, warn};

use crate::model::{ConversationTurn, Units};

pub mod classifier;
pub mod dates;
pub mod lexicon;
pub mod remote;
pub mod rules;

pub use classifier::is_weather_related;
pub use rules::RuleBasedExtractor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryType {
    SingleLocation,
    Comparison,
    FollowUp,
    DateRange,
    Suggestion,
}

impl QueryType {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_uppercase().replace([' ', '-'], "_").as_str() {
            "SINGLE_LOCATION" => Some(Self::SingleLocation),
            "COMPARISON" => Some(Self::Comparison),
            "FOLLOW_UP" => Some(Self::FollowUp),
            "DATE_RANGE" => Some(Self::DateRange),
            "SUGGESTION" => Some(Self::Suggestion),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonType {
    Temperature,
    Rain,
    #[default]
    General,
}

impl ComparisonType {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "temperature" => Some(Self::Temperature),
            "rain" => Some(Self::Rain),
            "general" => Some(Self::General),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionType {
    Colder,
    Warmer,
    Rainy,
    Snowy,
    Coastal,
    Mountain,
    General,
}

impl SuggestionType {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "colder" => Some(Self::Colder),
            "warmer" => Some(Self::Warmer),
            "rainy" => Some(Self::Rainy),
            "snowy" => Some(Self::Snowy),
            "coastal" => Some(Self::Coastal),
            "mountain" => Some(Self::Mountain),
            "general" => Some(Self::General),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Colder => "colder",
            Self::Warmer => "warmer",
            Self::Rainy => "rainy",
            Self::Snowy => "snowy",
            Self::Coastal => "coastal",
            Self::Mountain => "mountain",
            Self::General => "general",
        }
    }
}

/// Structured interpretation of one user utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryIntent {
    pub query_type: QueryType,
    pub cities: Vec<String>,
    pub date: NaiveDate,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub units: Units,
    pub comparison_type: ComparisonType,
    pub suggestion_type: Option<SuggestionType>,
    pub context_note: Option<String>,
}

impl QueryIntent {
    pub fn new(query_type: QueryType, today: NaiveDate) -> Self {
        Self {
            query_type,
            cities: Vec::new(),
            date: today,
            date_range: None,
            units: Units::Celsius,
            comparison_type: ComparisonType::General,
            suggestion_type: None,
            context_note: None,
        }
    }
}

#[async_trait]
pub trait IntentExtractor: Send + Sync + Debug {
    async fn extract(
        &self,
        text: &str,
        history: &[ConversationTurn],
        today: NaiveDate,
    ) -> anyhow::Result<QueryIntent>;
}

/// Primary extractor with the rule-based extractor as fallback.
#[derive(Debug, Default)]
pub struct IntentPipeline {
    primary: Option<Box<dyn IntentExtractor>>,
    fallback: RuleBasedExtractor,
}

impl IntentPipeline {
    pub fn rule_based() -> Self {
        Self::default()
    }

    pub fn with_primary(primary: Box<dyn IntentExtractor>) -> Self {
        Self { primary: Some(primary), fallback: RuleBasedExtractor }
    }

    pub fn has_primary(&self) -> bool {
        self.primary.is_some()
    }

    /// Never fails: primary errors degrade silently to the rule-based path.
    pub async fn extract_intent(
        &self,
        text: &str,
        history: &[ConversationTurn],
        today: NaiveDate,
    ) -> QueryIntent {
        if let Some(primary) = &self.primary {
            match primary.extract(text, history, today).await {
                Ok(intent) => {
                    debug!("Primary extractor intent: {:?}", intent);
                    return intent;
                }
                Err(e) => warn!("Intent extraction degraded to rule-based parsing: {:#}", e),
            }
        }

        let intent = self.fallback.parse(text, history, today);
        debug!("Rule-based intent: {:?}", intent);
        intent
    }
}
