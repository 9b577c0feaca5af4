//! Binary gate: could this text be a weather question?
//!
//! Recall is favoured over precision. A false positive only costs a failed
//! lookup further down; a false negative blocks the user.

use regex::Regex;
use std::sync::LazyLock;

use super::lexicon::{WEATHER_KEYWORDS, is_stopword};

static CONTEXTUAL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"how'?s?\s+it\s+in\s+[a-z\s,.-]+",
        r"how\s+is\s+it\s+in\s+[a-z\s,.-]+",
        r"what'?s?\s+it\s+like\s+in\s+[a-z\s,.-]+",
        r"how'?s?\s+[a-z\s,.-]+\s+today",
        r"how'?s?\s+[a-z\s,.-]+\s+right\s+now",
        r"what'?s?\s+[a-z\s,.-]+\s+like",
        r"how\s+about\s+[a-z\s,.-]+",
        r"tell\s+me\s+about\s+[a-z\s,.-]+",
        r"condition.*in\s+[a-z\s,.-]+",
        r"outside.*in\s+[a-z\s,.-]+",
        r"suggest.*(?:cold|warm|place)",
        r"where.*is.*it.*(?:raining|snowing)",
        r"where.*can.*i.*see.*(?:rain|snow)",
        r"i.*want.*to.*see.*(?:rain|snow)",
        r"show.*me.*(?:rain|snow)",
        r"what\s+about\s+[a-z0-9\s,.-]+",
        r"(?:which|what)\s+day",
        r"\bon\s+which\b",
        r"\bcompare\b|\bversus\b|\bvs\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("contextual pattern must compile"))
    .collect()
});

// Each captures the would-be place as `place`.
static LOCATION_SHAPED: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\bin\s+(?P<place>[a-z][a-z\s,.'-]*?)\s*[?!.]*\s*$",
        r"^\s*(?P<place>[a-z][a-z\s,.'-]*?)\s+(?:today|now|currently|right\s+now)\b",
        r"^\s*(?P<place>[a-z][a-z.'-]{2,})\s*[?!.]*\s*$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("location pattern must compile"))
    .collect()
});

pub fn is_weather_related(text: &str) -> bool {
    let lower = text.to_lowercase().replace('\u{2019}', "'");

    if WEATHER_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return true;
    }

    if CONTEXTUAL_PATTERNS.iter().any(|re| re.is_match(&lower)) {
        return true;
    }

    LOCATION_SHAPED
        .iter()
        .filter_map(|re| re.captures(&lower))
        .any(|caps| could_be_place(&caps["place"]))
}

fn could_be_place(candidate: &str) -> bool {
    candidate
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|w| w.chars().count() > 2)
        .any(|w| !is_stopword(w))
}
