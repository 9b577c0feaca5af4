//! One conversational turn, end to end: classify, extract, fetch, format.
//!
//! All mutable state lives in [`Session`], which the caller owns and passes
//! into every turn. A turn always appends exactly one user turn and one
//! assistant turn, and only a successful fetch replaces the displayed card.

use chrono::{Local, NaiveDate};
use tracing::{debug, info, warn};

use crate::{
    fetch::WeatherService,
    format::{INSUFFICIENT_COMPARISON, format_comparison, format_dated, format_single},
    geocoding::reverse_geocode,
    geolocation::{PositionOptions, PositionSource},
    intent::{IntentPipeline, QueryIntent, QueryType, SuggestionType, is_weather_related},
    model::{Coordinate, ConversationTurn, GeocodedPlace, LocationQuery, NormalizedWeather, Units},
    region::{RegionCode, resolve_region},
    suggest::{DEFAULT_LIMIT, suggest},
};

pub const NOT_WEATHER_REPLY: &str = "I can only help with weather questions. Ask me about the weather somewhere, or ask me to suggest a colder or warmer place.";

pub const NEED_PLACE_REPLY: &str = "Which place do you mean? Name a city, for example \"How's it in Tokyo today?\", or ask me to suggest a colder or warmer place.";

/// Conversation state for one user.
#[derive(Debug, Default)]
pub struct Session {
    history: Vec<ConversationTurn>,
    user_position: Option<Coordinate>,
    user_place: Option<GeocodedPlace>,
    displayed: Option<NormalizedWeather>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_position(position: Coordinate) -> Self {
        Self { user_position: Some(position), ..Self::default() }
    }

    pub fn history(&self) -> &[ConversationTurn] {
        &self.history
    }

    pub fn user_position(&self) -> Option<Coordinate> {
        self.user_position
    }

    pub fn user_place(&self) -> Option<&GeocodedPlace> {
        self.user_place.as_ref()
    }

    /// The weather card currently on display.
    pub fn displayed(&self) -> Option<&NormalizedWeather> {
        self.displayed.as_ref()
    }

    /// Write-once: later calls keep the first place.
    fn cache_user_place(&mut self, place: GeocodedPlace) {
        if self.user_place.is_none() {
            self.user_place = Some(place);
        }
    }
}

/// What a turn produced: the reply text and, on success, new card data.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub reply: String,
    pub card: Option<NormalizedWeather>,
    /// Units the reply was written in; the card should match.
    pub units: Units,
}

impl TurnOutcome {
    fn text(reply: impl Into<String>) -> Self {
        Self { reply: reply.into(), card: None, units: Units::Celsius }
    }
}

#[derive(Debug)]
pub struct Assistant {
    weather: WeatherService,
    intents: IntentPipeline,
    position: Box<dyn PositionSource>,
    position_options: PositionOptions,
    default_location: String,
    default_region: RegionCode,
}

impl Assistant {
    pub fn new(weather: WeatherService, intents: IntentPipeline, position: Box<dyn PositionSource>) -> Self {
        Self {
            weather,
            intents,
            position,
            position_options: PositionOptions::default(),
            default_location: crate::config::DEFAULT_LOCATION.to_string(),
            default_region: RegionCode::Unknown,
        }
    }

    /// Place shown when the user's position is unknown, and the region
    /// used for suggestions in that case.
    pub fn with_defaults(mut self, location: &str, region: RegionCode) -> Self {
        self.default_location = location.to_string();
        self.default_region = region;
        self
    }

    /// Locates the user and loads the initial card. Never fails: without a
    /// position the default location is shown instead.
    pub async fn start_session(&self) -> Session {
        let mut session = Session::new();

        let query = match self.position.current_position(&self.position_options).await {
            Ok(at) => {
                session.user_position = Some(at);
                if let Some(place) = reverse_geocode(self.weather.geocoder(), at).await {
                    info!("User located near {}", place.display_name());
                    session.cache_user_place(place);
                }
                LocationQuery::Coordinate(at)
            }
            Err(e) => {
                info!("{}; showing {} instead", e, self.default_location);
                LocationQuery::Name(self.default_location.clone())
            }
        };

        match self.weather.fetch_weather(&query, session.user_position).await {
            Ok(weather) => session.displayed = Some(weather),
            Err(e) => warn!("Initial weather for {} failed: {}", query, e),
        }

        session
    }

    pub async fn handle_turn(&self, session: &mut Session, text: &str) -> TurnOutcome {
        self.handle_turn_on(session, text, Local::now().date_naive()).await
    }

    /// [`Assistant::handle_turn`] with an explicit "today".
    pub async fn handle_turn_on(&self, session: &mut Session, text: &str, today: NaiveDate) -> TurnOutcome {
        let outcome = if is_weather_related(text) {
            let intent = self.intents.extract_intent(text, &session.history, today).await;
            debug!("Turn intent: {:?}", intent);
            session.history.push(ConversationTurn::user(text));
            let mut outcome = self.answer(session, text, &intent, today).await;
            outcome.units = intent.units;
            outcome
        } else {
            session.history.push(ConversationTurn::user(text));
            TurnOutcome::text(NOT_WEATHER_REPLY)
        };

        session.history.push(ConversationTurn::assistant(outcome.reply.clone()));
        if let Some(card) = &outcome.card {
            session.displayed = Some(card.clone());
        }
        outcome
    }

    async fn answer(&self, session: &mut Session, text: &str, intent: &QueryIntent, today: NaiveDate) -> TurnOutcome {
        match intent.query_type {
            QueryType::Suggestion => {
                let kind = intent.suggestion_type.unwrap_or(SuggestionType::General);
                self.answer_suggestion(session, intent, kind).await
            }
            QueryType::Comparison => self.answer_comparison(session, intent).await,
            QueryType::DateRange if intent.cities.is_empty() && intent.suggestion_type.is_some() => {
                let kind = intent.suggestion_type.unwrap_or(SuggestionType::General);
                self.answer_suggestion(session, intent, kind).await
            }
            QueryType::DateRange if intent.cities.len() > 1 => {
                self.answer_dated_many(session, intent, today).await
            }
            QueryType::SingleLocation | QueryType::FollowUp | QueryType::DateRange => {
                self.answer_place(session, text, intent, today).await
            }
        }
    }

    async fn answer_place(
        &self,
        session: &Session,
        text: &str,
        intent: &QueryIntent,
        today: NaiveDate,
    ) -> TurnOutcome {
        let Some(city) = intent.cities.first() else {
            return TurnOutcome::text(NEED_PLACE_REPLY);
        };

        let query = LocationQuery::Name(city.clone());
        let weather = match self.weather.fetch_weather(&query, session.user_position).await {
            Ok(weather) => weather,
            Err(e) => return TurnOutcome::text(e.user_message()),
        };

        let dated = intent.query_type == QueryType::DateRange
            || intent.date_range.is_some()
            || intent.date != today;

        let reply = if dated {
            format_dated(&weather, &weather.location.name, intent.date, intent.units, intent.date_range, today)
        } else {
            format_single(&weather, text, intent.units)
        };

        TurnOutcome { reply, card: Some(weather), units: intent.units }
    }

    /// One dated reply per named place; places that fail are reported inline.
    async fn answer_dated_many(&self, session: &Session, intent: &QueryIntent, today: NaiveDate) -> TurnOutcome {
        let results = self.weather.fetch_many(&intent.cities, session.user_position).await;
        let sections: Vec<String> = results
            .into_iter()
            .map(|result| match result {
                Ok(weather) => format_dated(
                    &weather,
                    &weather.location.name,
                    intent.date,
                    intent.units,
                    intent.date_range,
                    today,
                ),
                Err(e) => e.user_message(),
            })
            .collect();

        TurnOutcome::text(sections.join("\n\n"))
    }

    async fn answer_comparison(&self, session: &Session, intent: &QueryIntent) -> TurnOutcome {
        if intent.cities.len() < 2 {
            return TurnOutcome::text(INSUFFICIENT_COMPARISON);
        }

        let results = self.weather.fetch_many(&intent.cities, session.user_position).await;
        let weather: Vec<Option<NormalizedWeather>> = results
            .into_iter()
            .zip(&intent.cities)
            .map(|(result, city)| match result {
                Ok(weather) => Some(weather),
                Err(e) => {
                    debug!("Dropping {} from comparison: {}", city, e);
                    None
                }
            })
            .collect();

        TurnOutcome::text(format_comparison(&weather, &intent.cities, intent.comparison_type, intent.units))
    }

    async fn answer_suggestion(
        &self,
        session: &mut Session,
        intent: &QueryIntent,
        kind: SuggestionType,
    ) -> TurnOutcome {
        let region = self.user_region(session, intent).await;
        let places = suggest(kind, region, DEFAULT_LIMIT);
        debug!("Suggestions for {} in {}: {:?}", kind.as_str(), region.as_str(), places);

        let Some((first, rest)) = places.split_first() else {
            return TurnOutcome::text(format!(
                "I don't have {} suggestions for your area. Try asking about a specific city instead.",
                kind.as_str()
            ));
        };

        let others = if rest.is_empty() {
            String::new()
        } else {
            let list: Vec<String> = rest.iter().map(|p| format!("- {p}")).collect();
            format!("\n\nOther options:\n{}", list.join("\n"))
        };

        let query = LocationQuery::Name(first.to_string());
        match self.weather.fetch_weather(&query, session.user_position).await {
            Ok(weather) => {
                let summary = format_single(&weather, "weather", intent.units);
                TurnOutcome {
                    reply: format!("Try {first} (now on the weather card):\n{summary}{others}"),
                    card: Some(weather),
                    units: intent.units,
                }
            }
            Err(e) => {
                warn!("Suggested place {} could not be loaded: {}", first, e);
                TurnOutcome::text(format!("You could try {first}.{others}"))
            }
        }
    }

    /// Region from the named place, else the user's own place, else the default.
    async fn user_region(&self, session: &mut Session, intent: &QueryIntent) -> RegionCode {
        if let Some(city) = intent.cities.first() {
            return resolve_region(city, self.default_region);
        }

        if session.user_place.is_none() {
            if let Some(at) = session.user_position {
                if let Some(place) = reverse_geocode(self.weather.geocoder(), at).await {
                    session.cache_user_place(place);
                }
            }
        }

        match &session.user_place {
            Some(place) => match RegionCode::from_country_code(&place.country) {
                RegionCode::Unknown => resolve_region(&place.display_name(), self.default_region),
                code => code,
            },
            None => self.default_region,
        }
    }
}
