//! Rule-based intent extraction. Needs nothing but the text and history.
//!
//! Location candidates come from an ordered table of named patterns plus a
//! gazetteer scan. Candidates are not validated here: stray words that slip
//! through fail later at geocoding.

use async_trait::async_trait;
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

use super::{
    ComparisonType, IntentExtractor, QueryIntent, QueryType, SuggestionType,
    dates::parse_date,
    lexicon::{GAZETTEER, is_stopword, title_case},
};
use crate::model::{ConversationTurn, Role, Units};

/// How many recent turns are scanned for carried-over locations.
pub const CONTEXT_WINDOW: usize = 3;

const PLACE: &str = r"(?P<place>[a-z][a-z .'-]*?)";
const TAIL: &str = r"\s*(?:\b(?:today|tonight|tomorrow|now|right\s+now|currently|this|next|on|and|or|vs|versus|like|weekend|please|in|at|for)\b|[?!.,;:]|$)";

const LEADING_NOISE: &[&str] = &[
    "the", "a", "an", "how", "hows", "what", "whats", "is", "was", "will", "it", "be", "about",
    "tell", "me", "weather", "in", "at",
];
const TRAILING_NOISE: &[&str] =
    &["today", "tomorrow", "tonight", "now", "currently", "right", "please", "weather", "like", "there"];

pub struct LocationPattern {
    pub name: &'static str,
    regex: Regex,
}

static LOCATION_PATTERNS: LazyLock<Vec<LocationPattern>> = LazyLock::new(|| {
    let table = [
        ("preposition", format!(r"\b(?:in|at|for|about|near)\s+{PLACE}{TAIL}")),
        ("weather_of", format!(r"\bweather\s+(?:of|in)\s+{PLACE}{TAIL}")),
        ("hows", format!(r"\bhow(?:'s|s|\s+is|\s+will)\s+{PLACE}{TAIL}")),
        ("whats_like", format!(r"\bwhat(?:'s|s|\s+is)\s+{PLACE}\s+like\b")),
        (
            "place_then_time",
            r"^\s*(?P<place>[a-z][a-z .-]*?)\s+(?:today|tonight|now|right\s+now|currently)\b"
                .to_string(),
        ),
        ("bare_word", r"^\s*(?P<place>[a-z][a-z.'-]{3,})\s*[?!.]*\s*$".to_string()),
    ];

    table
        .into_iter()
        .map(|(name, pattern)| LocationPattern {
            name,
            regex: Regex::new(&pattern).expect("location pattern must compile"),
        })
        .collect()
});

static COMPARISON_MARKERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bcompare\b|\bcomparison\b|\bvs\b|\bversus\b").expect("comparison pattern must compile")
});

static WHICH_IS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bwhich\s+(?:one\s+)?(?:is|are)\s+(?P<what>cold|cool|warm|hot|rain|wet|sun|dry|better)")
        .expect("which-is pattern must compile")
});

static SUGGESTION_MARKERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"suggest.*(?:cold|warm|hot|cool|place)|(?:cold|warm|hot|cool|better).*place|\bwhere\b.*\b(?:rain|snow)|\b(?:want|like)\s+to\s+see\s+(?:rain|snow)|\bshow\s+me\s+(?:rain|snow)",
    )
    .expect("suggestion pattern must compile")
});

static DAY_MARKERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:weekend|monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b")
        .expect("day pattern must compile")
});

static FOLLOW_UP_MARKERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:which|what)\s+day\b|\bon\s+which\b|\bwhen\b|\bwhat\s+about\b")
        .expect("follow-up pattern must compile")
});

static COMPARISON_SPLIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+(?:and|or|vs\.?|versus)\s+").expect("split pattern must compile")
});

#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedExtractor;

impl RuleBasedExtractor {
    pub fn parse(&self, text: &str, history: &[ConversationTurn], today: NaiveDate) -> QueryIntent {
        let lower = normalize(text);
        let (mut query_type, comparison_type) = detect_query_type(&lower);

        let mut intent = QueryIntent::new(query_type, today);
        intent.comparison_type = comparison_type;

        let mut cities = location_candidates(&lower);

        if cities.is_empty() && query_type != QueryType::Suggestion {
            let carried = carried_locations(history);
            if !carried.is_empty() {
                intent.context_note =
                    Some(format!("Referenced cities from context: {}", carried.join(", ")));
                cities = carried;
            }
        }

        if query_type == QueryType::Comparison && cities.len() < 2 {
            let split = split_comparison(&lower);
            if split.len() > cities.len() {
                cities = split;
            }
        }

        let mention = parse_date(&lower, today);
        intent.date = mention.date;
        intent.date_range = mention.range;
        let detected = query_type;
        if mention.range.is_some()
            || (mention.names_day
                && matches!(query_type, QueryType::SingleLocation | QueryType::FollowUp))
        {
            query_type = QueryType::DateRange;
        }

        if lower.contains("fahrenheit") || lower.contains("°f") {
            intent.units = Units::Fahrenheit;
        }

        // Kept through a weekend switch so the turn can still be routed as a suggestion.
        if detected == QueryType::Suggestion {
            intent.suggestion_type = Some(suggestion_type(&lower));
        }

        intent.query_type = query_type;
        intent.cities = cities;
        intent
    }
}

#[async_trait]
impl IntentExtractor for RuleBasedExtractor {
    async fn extract(
        &self,
        text: &str,
        history: &[ConversationTurn],
        today: NaiveDate,
    ) -> anyhow::Result<QueryIntent> {
        Ok(self.parse(text, history, today))
    }
}

fn normalize(text: &str) -> String {
    text.to_lowercase().replace('\u{2019}', "'")
}

fn detect_query_type(lower: &str) -> (QueryType, ComparisonType) {
    if let Some(caps) = WHICH_IS.captures(lower) {
        let comparison = match &caps["what"] {
            "cold" | "cool" | "warm" | "hot" => ComparisonType::Temperature,
            "rain" | "wet" => ComparisonType::Rain,
            _ => ComparisonType::General,
        };
        return (QueryType::Comparison, comparison);
    }

    if COMPARISON_MARKERS.is_match(lower) {
        let comparison = if lower.split_whitespace().any(|w| w.starts_with("rain")) {
            ComparisonType::Rain
        } else if ["temperature", "colder", "warmer", "hotter", "cooler"].iter().any(|w| lower.contains(w)) {
            ComparisonType::Temperature
        } else {
            ComparisonType::General
        };
        return (QueryType::Comparison, comparison);
    }

    let query_type = if SUGGESTION_MARKERS.is_match(lower) {
        QueryType::Suggestion
    } else if DAY_MARKERS.is_match(lower) {
        QueryType::DateRange
    } else if FOLLOW_UP_MARKERS.is_match(lower) {
        QueryType::FollowUp
    } else {
        QueryType::SingleLocation
    };
    (query_type, ComparisonType::General)
}

fn suggestion_type(lower: &str) -> SuggestionType {
    let any = |words: &[&str]| words.iter().any(|w| lower.contains(w));

    if any(&["cold", "cool", "chill", "mountain", "hill"]) {
        SuggestionType::Colder
    } else if any(&["hot", "warm", "heat", "desert"]) {
        SuggestionType::Warmer
    } else if any(&["rain"]) {
        SuggestionType::Rainy
    } else if any(&["snow"]) {
        SuggestionType::Snowy
    } else if any(&["beach", "coast", "sea", "ocean"]) {
        SuggestionType::Coastal
    } else {
        SuggestionType::General
    }
}

/// Location strings in `text`, title-cased, deduplicated, in order of appearance.
pub fn location_candidates(text: &str) -> Vec<String> {
    let lower = normalize(text);
    let mut found: Vec<(usize, String)> = Vec::new();
    let mut spans: Vec<(usize, usize)> = Vec::new();

    for pattern in LOCATION_PATTERNS.iter() {
        for caps in pattern.regex.captures_iter(&lower) {
            let Some(place) = caps.name("place") else { continue };
            if let Some(cleaned) = clean_candidate(place.as_str()) {
                spans.push((place.start(), place.end()));
                found.push((place.start(), cleaned));
            }
        }
    }

    for name in GAZETTEER {
        for (start, _) in lower.match_indices(name) {
            let end = start + name.len();
            let inside_capture = spans.iter().any(|&(s, e)| start >= s && end <= e);
            if is_word_at(&lower, start, end) && !inside_capture {
                found.push((start, title_case(name)));
            }
        }
    }

    found.sort_by_key(|(start, _)| *start);

    let mut cities: Vec<String> = Vec::new();
    for (_, city) in found {
        if !cities.iter().any(|c| c.eq_ignore_ascii_case(&city)) {
            cities.push(city);
        }
    }
    cities
}

/// Runs a single named pattern; `None` if no pattern has that name.
pub fn match_pattern(name: &str, text: &str) -> Option<Vec<String>> {
    let pattern = LOCATION_PATTERNS.iter().find(|p| p.name == name)?;
    let lower = normalize(text);
    Some(
        pattern
            .regex
            .captures_iter(&lower)
            .filter_map(|caps| caps.name("place").and_then(|m| clean_candidate(m.as_str())))
            .collect(),
    )
}

pub fn pattern_names() -> Vec<&'static str> {
    LOCATION_PATTERNS.iter().map(|p| p.name).collect()
}

fn clean_candidate(raw: &str) -> Option<String> {
    let words: Vec<&str> = raw
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| matches!(c, ',' | '.' | '\'' | '-')))
        .filter(|w| !w.is_empty())
        .collect();

    let start = words.iter().position(|w| !LEADING_NOISE.contains(w))?;
    let end = words.iter().rposition(|w| !TRAILING_NOISE.contains(w))?;
    if start > end {
        return None;
    }
    let words = &words[start..=end];

    if words.iter().all(|w| is_stopword(w)) {
        return None;
    }

    let joined = words.join(" ");
    if joined.chars().count() <= 2 {
        return None;
    }
    Some(title_case(&joined))
}

fn is_word_at(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}

/// Locations mentioned by the user in the last few turns, most recent first.
fn carried_locations(history: &[ConversationTurn]) -> Vec<String> {
    let mut carried: Vec<String> = Vec::new();
    for turn in history.iter().rev().take(CONTEXT_WINDOW) {
        if turn.role != Role::User {
            continue;
        }
        for city in location_candidates(&turn.text) {
            if !carried.iter().any(|c| c.eq_ignore_ascii_case(&city)) {
                carried.push(city);
            }
        }
    }
    carried
}

fn split_comparison(lower: &str) -> Vec<String> {
    let Some(m) = COMPARISON_SPLIT.find(lower) else { return Vec::new() };
    let (left, right) = (&lower[..m.start()], &lower[m.end()..]);

    let mut cities = side_locations(left, Side::Left);
    for city in side_locations(right, Side::Right) {
        if !cities.iter().any(|c| c.eq_ignore_ascii_case(&city)) {
            cities.push(city);
        }
    }
    cities
}

#[derive(Clone, Copy)]
enum Side {
    Left,
    Right,
}

fn side_locations(part: &str, side: Side) -> Vec<String> {
    let found = location_candidates(part);
    if !found.is_empty() {
        return found;
    }

    // The word nearest the conjunction is the likeliest place name.
    let mut words = part
        .split(|c: char| c.is_whitespace() || matches!(c, ',' | '?' | '!' | '.' | ':' | ';'))
        .filter(|w| !w.is_empty());
    let nearest = match side {
        Side::Left => words.next_back(),
        Side::Right => words.next(),
    };

    nearest
        .filter(|w| w.chars().count() > 2 && w.chars().all(char::is_alphabetic) && !is_stopword(w))
        .map(|w| vec![title_case(w)])
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 14).expect("valid date")
    }

    fn parse(text: &str) -> QueryIntent {
        RuleBasedExtractor.parse(text, &[], today())
    }

    fn cities(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn comparison_with_and() {
        let intent = parse("Compare weather of Karachi and Istanbul");
        assert_eq!(intent.query_type, QueryType::Comparison);
        assert_eq!(intent.cities, cities(&["Karachi", "Istanbul"]));
        assert_eq!(intent.comparison_type, ComparisonType::General);
    }

    #[test]
    fn which_is_colder_is_a_temperature_comparison() {
        let intent = parse("which is colder, Murree or Faisalabad");
        assert_eq!(intent.query_type, QueryType::Comparison);
        assert_eq!(intent.comparison_type, ComparisonType::Temperature);
        assert_eq!(intent.cities, cities(&["Murree", "Faisalabad"]));
    }

    #[test]
    fn comparison_split_recovers_unknown_names() {
        let intent = parse("which is warmer, Lyon or Nantes?");
        assert_eq!(intent.cities, cities(&["Lyon", "Nantes"]));
    }

    #[test]
    fn suggestion_without_cities() {
        let intent = parse("suggest me a colder place");
        assert_eq!(intent.query_type, QueryType::Suggestion);
        assert_eq!(intent.suggestion_type, Some(SuggestionType::Colder));
        assert!(intent.cities.is_empty());
    }

    #[test]
    fn suggestion_types_by_keyword() {
        assert_eq!(parse("suggest a warm place").suggestion_type, Some(SuggestionType::Warmer));
        assert_eq!(parse("suggest a snowy place").suggestion_type, Some(SuggestionType::Snowy));
        assert_eq!(parse("where can I see rain").suggestion_type, Some(SuggestionType::Rainy));
        assert_eq!(parse("suggest a beach place").suggestion_type, Some(SuggestionType::Coastal));
        assert_eq!(parse("suggest a place").suggestion_type, Some(SuggestionType::General));
    }

    #[test]
    fn follow_up_names_a_new_place() {
        let history = vec![ConversationTurn::user("How's Istanbul?")];
        let intent = RuleBasedExtractor.parse("what about alaska", &history, today());
        assert_eq!(intent.query_type, QueryType::FollowUp);
        assert!(intent.cities.contains(&"Alaska".to_string()));
        assert!(intent.context_note.is_none());
    }

    #[test]
    fn follow_up_without_place_carries_context() {
        let history = vec![
            ConversationTurn::user("How's Istanbul?"),
            ConversationTurn::assistant("Weather in Istanbul, TR: clear sky, 21°C."),
        ];
        let intent = RuleBasedExtractor.parse("what about sep 3", &history, today());
        assert_eq!(intent.query_type, QueryType::FollowUp);
        assert_eq!(intent.cities, cities(&["Istanbul"]));
        assert_eq!(intent.date, NaiveDate::from_ymd_opt(2026, 9, 3).expect("valid date"));
        assert!(intent.context_note.is_some_and(|n| n.contains("Istanbul")));
    }

    #[test]
    fn context_only_looks_back_three_turns() {
        let history = vec![
            ConversationTurn::user("How's Istanbul?"),
            ConversationTurn::assistant("..."),
            ConversationTurn::user("thanks"),
            ConversationTurn::assistant("..."),
        ];
        let intent = RuleBasedExtractor.parse("what about tomorrow", &history, today());
        assert!(intent.cities.is_empty());
    }

    #[test]
    fn most_recent_context_comes_first() {
        let history = vec![
            ConversationTurn::user("How's Paris?"),
            ConversationTurn::user("and Berlin?"),
        ];
        let intent = RuleBasedExtractor.parse("what about tomorrow", &history, today());
        assert_eq!(intent.cities, cities(&["Berlin", "Paris"]));
    }

    #[test]
    fn weekend_switches_to_date_range() {
        let intent = parse("weather in Paris this weekend");
        assert_eq!(intent.query_type, QueryType::DateRange);
        assert_eq!(intent.cities, cities(&["Paris"]));
        assert!(intent.date_range.is_some());
    }

    #[test]
    fn weekend_comparison_becomes_date_range() {
        let intent = parse("compare paris and london this weekend");
        assert_eq!(intent.query_type, QueryType::DateRange);
        assert!(intent.cities.contains(&"Paris".to_string()));
        assert!(intent.cities.contains(&"London".to_string()));
        let sat = NaiveDate::from_ymd_opt(2026, 10, 17).expect("valid date");
        let sun = NaiveDate::from_ymd_opt(2026, 10, 18).expect("valid date");
        assert_eq!(intent.date_range, Some((sat, sun)));
    }

    #[test]
    fn weekend_suggestion_keeps_its_kind() {
        let intent = parse("suggest a colder place for the weekend");
        assert_eq!(intent.query_type, QueryType::DateRange);
        assert_eq!(intent.suggestion_type, Some(SuggestionType::Colder));
    }

    #[test]
    fn weekday_name_does_not_override_comparison() {
        let intent = parse("compare Karachi and Lahore on friday");
        assert_eq!(intent.query_type, QueryType::Comparison);
    }

    #[test]
    fn tomorrow_and_units() {
        let intent = parse("temperature in Oslo tomorrow in fahrenheit");
        assert_eq!(intent.query_type, QueryType::SingleLocation);
        assert_eq!(intent.cities, cities(&["Oslo"]));
        assert_eq!(intent.units, Units::Fahrenheit);
        assert_eq!(intent.date, NaiveDate::from_ymd_opt(2026, 10, 15).expect("valid date"));
    }

    #[test]
    fn multi_word_places_survive() {
        assert_eq!(parse("How's it in New York today?").cities, cities(&["New York"]));
        assert_eq!(parse("what's the weather like in san francisco").cities, cities(&["San Francisco"]));
    }

    #[test]
    fn bare_word_is_a_place() {
        assert_eq!(parse("Reykjavik").cities, cities(&["Reykjavik"]));
        assert!(parse("thanks").cities.is_empty());
    }

    #[test]
    fn patterns_can_be_run_individually() {
        assert!(pattern_names().contains(&"hows"));
        assert_eq!(match_pattern("hows", "How's Lagos?"), Some(cities(&["Lagos"])));
        assert_eq!(match_pattern("whats_like", "what's Lima like"), Some(cities(&["Lima"])));
        assert_eq!(match_pattern("preposition", "how is it in the morning"), Some(Vec::new()));
        assert_eq!(match_pattern("no_such_pattern", "Lima"), None);
    }

    #[test]
    fn gazetteer_needs_word_boundaries() {
        assert!(location_candidates("is chrome any good").is_empty());
    }
}
