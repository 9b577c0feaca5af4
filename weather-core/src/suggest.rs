//! Static place suggestions keyed by region and kind.
//!
//! Region tables win over the global one. Entries are geocodable strings,
//! nearest-looking first.

use crate::{intent::SuggestionType, region::RegionCode};

pub const DEFAULT_LIMIT: usize = 3;

type Table = &'static [(SuggestionType, &'static [&'static str])];

const PK: Table = &[
    (
        SuggestionType::Colder,
        &[
            "Murree, Pakistan", "Nathiagali, Pakistan", "Kaghan Valley, Pakistan", "Skardu, Pakistan",
            "Chitral, Pakistan", "Gilgit, Pakistan", "Hunza Valley, Pakistan", "Swat, Pakistan",
        ],
    ),
    (
        SuggestionType::Warmer,
        &[
            "Karachi, Pakistan", "Hyderabad, Pakistan", "Sukkur, Pakistan", "Multan, Pakistan",
            "Bahawalpur, Pakistan", "Jacobabad, Pakistan",
        ],
    ),
    (
        SuggestionType::Rainy,
        &[
            "Lahore, Pakistan", "Islamabad, Pakistan", "Sialkot, Pakistan", "Gujranwala, Pakistan",
            "Rawalpindi, Pakistan",
        ],
    ),
    (
        SuggestionType::Snowy,
        &[
            "Murree, Pakistan", "Skardu, Pakistan", "Chitral, Pakistan", "Hunza Valley, Pakistan",
            "Naran, Pakistan",
        ],
    ),
    (SuggestionType::Coastal, &["Karachi, Pakistan", "Gwadar, Pakistan", "Pasni, Pakistan"]),
    (
        SuggestionType::Mountain,
        &["Murree, Pakistan", "Skardu, Pakistan", "Chitral, Pakistan", "Hunza Valley, Pakistan"],
    ),
];

const IN: Table = &[
    (SuggestionType::Colder, &["Shimla, India", "Manali, India", "Darjeeling, India", "Ooty, India"]),
    (SuggestionType::Warmer, &["Chennai, India", "Jaisalmer, India", "Nagpur, India"]),
    (SuggestionType::Rainy, &["Mumbai, India", "Cherrapunji, India", "Kochi, India"]),
    (SuggestionType::Snowy, &["Gulmarg, India", "Manali, India", "Leh, India"]),
    (SuggestionType::Coastal, &["Goa, India", "Kochi, India", "Puducherry, India"]),
    (SuggestionType::Mountain, &["Shimla, India", "Darjeeling, India", "Munnar, India"]),
];

const US: Table = &[
    (SuggestionType::Colder, &["Anchorage, US", "Duluth, US", "Fairbanks, US"]),
    (SuggestionType::Warmer, &["Miami, US", "Phoenix, US", "Honolulu, US"]),
    (SuggestionType::Rainy, &["Seattle, US", "Portland, US", "Ketchikan, US"]),
    (SuggestionType::Snowy, &["Buffalo, US", "Denver, US", "Anchorage, US"]),
    (SuggestionType::Coastal, &["San Diego, US", "Miami, US", "Charleston, US"]),
    (SuggestionType::Mountain, &["Aspen, US", "Boulder, US", "Jackson, US"]),
];

const GB: Table = &[
    (SuggestionType::Colder, &["Aberdeen, GB", "Inverness, GB", "Aviemore, GB"]),
    (SuggestionType::Warmer, &["Brighton, GB", "Plymouth, GB", "Bournemouth, GB"]),
    (SuggestionType::Rainy, &["Glasgow, GB", "Cardiff, GB", "Manchester, GB"]),
    (SuggestionType::Coastal, &["Brighton, GB", "St Ives, GB", "Whitby, GB"]),
    (SuggestionType::Mountain, &["Fort William, GB", "Keswick, GB", "Snowdonia, GB"]),
];

const CA: Table = &[
    (SuggestionType::Colder, &["Whitehorse, CA", "Yellowknife, CA", "Winnipeg, CA"]),
    (SuggestionType::Warmer, &["Victoria, CA", "Kelowna, CA", "Windsor, CA"]),
    (SuggestionType::Rainy, &["Vancouver, CA", "Prince Rupert, CA", "Halifax, CA"]),
    (SuggestionType::Snowy, &["Quebec City, CA", "Whistler, CA", "St. John's, CA"]),
    (SuggestionType::Coastal, &["Halifax, CA", "Victoria, CA", "Tofino, CA"]),
    (SuggestionType::Mountain, &["Banff, CA", "Jasper, CA", "Whistler, CA"]),
];

const GLOBAL: Table = &[
    (
        SuggestionType::Rainy,
        &["London, UK", "Seattle, USA", "Vancouver, Canada", "Mumbai, India", "Singapore"],
    ),
    (
        SuggestionType::Snowy,
        &["Moscow, Russia", "Toronto, Canada", "Stockholm, Sweden", "Oslo, Norway", "Helsinki, Finland"],
    ),
    (
        SuggestionType::Colder,
        &["Moscow, Russia", "Stockholm, Sweden", "Oslo, Norway", "Helsinki, Finland", "Reykjavik, Iceland"],
    ),
    (
        SuggestionType::Warmer,
        &["Dubai, UAE", "Bangkok, Thailand", "Singapore", "Miami, USA", "Cairo, Egypt"],
    ),
    (SuggestionType::Coastal, &["Barcelona, Spain", "Sydney, Australia", "Cape Town, South Africa"]),
    (SuggestionType::Mountain, &["Zermatt, Switzerland", "Banff, Canada", "Queenstown, New Zealand"]),
];

fn region_table(region: RegionCode) -> Option<Table> {
    match region {
        RegionCode::Pk => Some(PK),
        RegionCode::In => Some(IN),
        RegionCode::Us => Some(US),
        RegionCode::Gb => Some(GB),
        RegionCode::Ca => Some(CA),
        _ => None,
    }
}

fn lookup(table: Table, kind: SuggestionType) -> Option<&'static [&'static str]> {
    table.iter().find(|(k, _)| *k == kind).map(|(_, places)| *places)
}

/// Up to `limit` places of the requested kind; empty when nothing fits.
pub fn suggest(kind: SuggestionType, region: RegionCode, limit: usize) -> Vec<&'static str> {
    region_table(region)
        .and_then(|table| lookup(table, kind))
        .or_else(|| lookup(GLOBAL, kind))
        .map(|places| places.iter().take(limit).copied().collect())
        .unwrap_or_default()
}
