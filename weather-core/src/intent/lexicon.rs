//! Word lists shared by the classifier and the rule-based extractor.

/// Vocabulary that marks text as weather-related on its own.
pub const WEATHER_KEYWORDS: &[&str] = &[
    "weather", "temperature", "rain", "snow", "sunny", "cloudy", "wind", "humidity",
    "pressure", "forecast", "climate", "storm", "thunder", "lightning", "fog", "mist",
    "hot", "cold", "warm", "cool", "freezing", "boiling", "degrees", "celsius", "fahrenheit",
    "precipitation", "drizzle", "shower", "blizzard", "hurricane", "tornado", "cyclone",
    "atmosphere", "barometric", "visibility", "uv", "index", "seasons", "winter", "summer",
    "spring", "autumn", "fall", "monsoon", "dry", "wet", "arid", "tropical", "arctic",
];

/// Words that never name a place on their own.
pub const STOPWORDS: &[&str] = &[
    // function words
    "a", "an", "the", "and", "but", "for", "are", "any", "can", "had", "her", "was", "one",
    "our", "out", "day", "get", "has", "him", "his", "how", "its", "may", "new", "now", "old",
    "see", "two", "way", "who", "boy", "did", "man", "end", "few", "got", "let", "put", "say",
    "she", "too", "use", "yes", "not", "you", "all", "oil", "what", "when", "where", "why",
    "it", "is", "me", "my", "there", "here", "this", "that", "them", "they", "about", "with",
    // chit-chat
    "hello", "hey", "hiya", "thanks", "thank", "okay", "cool", "nice", "please", "sorry",
    "bye", "goodbye", "help", "joke", "lol", "good", "great", "morning", "evening", "night",
    // weather talk that follows prepositions
    "weather", "temperature", "temp", "forecast", "outside", "like", "today", "tomorrow",
    "tonight", "currently", "right", "weekend", "week", "next", "place", "places",
    "celsius", "fahrenheit", "degrees",
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday",
];

/// Place names matched anywhere in the text.
pub const GAZETTEER: &[&str] = &[
    "karachi", "lahore", "islamabad", "rawalpindi", "faisalabad", "multan", "peshawar",
    "quetta", "murree", "london", "paris", "new york", "tokyo", "delhi", "mumbai", "istanbul",
    "dubai", "singapore", "berlin", "madrid", "rome", "vienna", "amsterdam", "barcelona",
    "moscow", "sydney", "melbourne", "toronto", "vancouver", "chicago", "los angeles",
    "san francisco", "miami", "boston", "beijing", "shanghai", "hong kong", "seoul", "osaka",
    "bangkok", "jakarta", "manila", "alaska", "anchorage", "fairbanks", "juneau", "sitka",
    "ketchikan", "nome", "barrow", "turkey", "cairo", "stockholm", "oslo", "prague",
    "budapest", "kolkata", "chennai", "seattle",
];

pub const MONTHS: &[(&str, u32)] = &[
    ("january", 1), ("jan", 1), ("february", 2), ("feb", 2), ("march", 3), ("mar", 3),
    ("april", 4), ("apr", 4), ("may", 5), ("june", 6), ("jun", 6), ("july", 7), ("jul", 7),
    ("august", 8), ("aug", 8), ("september", 9), ("sept", 9), ("sep", 9), ("october", 10),
    ("oct", 10), ("november", 11), ("nov", 11), ("december", 12), ("dec", 12),
];

pub fn is_stopword(word: &str) -> bool {
    let word = word.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'');
    STOPWORDS.contains(&word.to_lowercase().as_str())
}

pub fn month_number(name: &str) -> Option<u32> {
    let name = name.to_lowercase();
    MONTHS.iter().find(|(m, _)| *m == name).map(|(_, n)| *n)
}

/// "new YORK" -> "New York".
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
