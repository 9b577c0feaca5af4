use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Coarse region key for suggestion tables. Not a geographic authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegionCode {
    Pk,
    In,
    Us,
    Gb,
    Ca,
    Au,
    Tr,
    Ae,
    Unknown,
}

impl RegionCode {
    /// Maps an ISO country code ("PK", "gb", "UK") to a region.
    pub fn from_country_code(code: &str) -> Self {
        match code.trim().to_uppercase().as_str() {
            "PK" => Self::Pk,
            "IN" => Self::In,
            "US" => Self::Us,
            "GB" | "UK" => Self::Gb,
            "CA" => Self::Ca,
            "AU" => Self::Au,
            "TR" => Self::Tr,
            "AE" => Self::Ae,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pk => "PK",
            Self::In => "IN",
            Self::Us => "US",
            Self::Gb => "GB",
            Self::Ca => "CA",
            Self::Au => "AU",
            Self::Tr => "TR",
            Self::Ae => "AE",
            Self::Unknown => "??",
        }
    }
}

// First matching entry wins, so longer names that contain shorter ones come first.
// Names match on word boundaries only.
const REGION_TABLE: &[(&str, RegionCode)] = &[
    // Pakistan
    ("pakistan", RegionCode::Pk),
    ("karachi", RegionCode::Pk),
    ("lahore", RegionCode::Pk),
    ("islamabad", RegionCode::Pk),
    ("rawalpindi", RegionCode::Pk),
    ("faisalabad", RegionCode::Pk),
    ("multan", RegionCode::Pk),
    ("peshawar", RegionCode::Pk),
    ("quetta", RegionCode::Pk),
    ("murree", RegionCode::Pk),
    ("sialkot", RegionCode::Pk),
    ("skardu", RegionCode::Pk),
    ("gilgit", RegionCode::Pk),
    ("hunza", RegionCode::Pk),
    ("punjab", RegionCode::Pk),
    ("sindh", RegionCode::Pk),
    // United States, ahead of "india" because of "indiana"
    ("indiana", RegionCode::Us),
    ("new england", RegionCode::Us),
    ("united states", RegionCode::Us),
    ("usa", RegionCode::Us),
    ("new york", RegionCode::Us),
    ("los angeles", RegionCode::Us),
    ("san francisco", RegionCode::Us),
    ("chicago", RegionCode::Us),
    ("seattle", RegionCode::Us),
    ("boston", RegionCode::Us),
    ("miami", RegionCode::Us),
    ("denver", RegionCode::Us),
    ("alaska", RegionCode::Us),
    ("anchorage", RegionCode::Us),
    ("california", RegionCode::Us),
    ("texas", RegionCode::Us),
    ("florida", RegionCode::Us),
    ("colorado", RegionCode::Us),
    // India
    ("india", RegionCode::In),
    ("delhi", RegionCode::In),
    ("mumbai", RegionCode::In),
    ("kolkata", RegionCode::In),
    ("chennai", RegionCode::In),
    ("bangalore", RegionCode::In),
    ("bengaluru", RegionCode::In),
    ("jaipur", RegionCode::In),
    ("shimla", RegionCode::In),
    ("goa", RegionCode::In),
    // Australia, ahead of "wales"
    ("new south wales", RegionCode::Au),
    ("queensland", RegionCode::Au),
    // United Kingdom
    ("united kingdom", RegionCode::Gb),
    ("britain", RegionCode::Gb),
    ("england", RegionCode::Gb),
    ("scotland", RegionCode::Gb),
    ("wales", RegionCode::Gb),
    ("london", RegionCode::Gb),
    ("manchester", RegionCode::Gb),
    ("birmingham", RegionCode::Gb),
    ("liverpool", RegionCode::Gb),
    ("edinburgh", RegionCode::Gb),
    ("glasgow", RegionCode::Gb),
    // Canada
    ("canada", RegionCode::Ca),
    ("toronto", RegionCode::Ca),
    ("vancouver", RegionCode::Ca),
    ("montreal", RegionCode::Ca),
    ("calgary", RegionCode::Ca),
    ("ottawa", RegionCode::Ca),
    // Australia
    ("australia", RegionCode::Au),
    ("sydney", RegionCode::Au),
    ("melbourne", RegionCode::Au),
    ("brisbane", RegionCode::Au),
    // Turkey
    ("turkey", RegionCode::Tr),
    ("türkiye", RegionCode::Tr),
    ("istanbul", RegionCode::Tr),
    ("ankara", RegionCode::Tr),
    ("izmir", RegionCode::Tr),
    ("antalya", RegionCode::Tr),
    // United Arab Emirates
    ("emirates", RegionCode::Ae),
    ("uae", RegionCode::Ae),
    ("dubai", RegionCode::Ae),
    ("abu dhabi", RegionCode::Ae),
    ("sharjah", RegionCode::Ae),
];

static REGION_PATTERNS: LazyLock<Vec<(Regex, RegionCode)>> = LazyLock::new(|| {
    REGION_TABLE
        .iter()
        .map(|(name, code)| {
            let pattern = format!(r"\b{}\b", regex::escape(name));
            (Regex::new(&pattern).expect("region pattern must compile"), *code)
        })
        .collect()
});

/// Case-insensitive whole-word lookup; `fallback` when nothing matches.
pub fn resolve_region(location: &str, fallback: RegionCode) -> RegionCode {
    let lower = location.to_lowercase();
    REGION_PATTERNS
        .iter()
        .find(|(pattern, _)| pattern.is_match(&lower))
        .map(|(_, code)| *code)
        .unwrap_or(fallback)
}
