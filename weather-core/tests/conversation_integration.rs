//! Whole turns through the assistant against a mock OpenWeather server.

mod common;

use chrono::NaiveDate;
use common::{current_body, geo_entry, mount_current_at, mount_geocode, service};
use serde_json::json;
use weather_core::{
    Assistant, IntentPipeline, Session, geolocation::FixedPosition, intent::remote::CompletionClient,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 14).expect("valid date")
}

fn assistant(server: &MockServer, intents: IntentPipeline) -> Assistant {
    Assistant::new(service(server), intents, Box::new(FixedPosition(None)))
}

async fn mount_paris(server: &MockServer) {
    mount_geocode(
        server,
        "Paris",
        "1",
        json!([geo_entry("Paris", "FR", Some("Ile-de-France"), 48.8566, 2.3522)]),
    )
    .await;
    mount_current_at(server, "48.8566", current_body("Paris", "FR", 48.8566, 2.3522, 15.0, "clear sky")).await;
}

#[tokio::test]
async fn single_place_question_updates_card() {
    let server = MockServer::start().await;
    mount_paris(&server).await;

    let assistant = assistant(&server, IntentPipeline::rule_based());
    let mut session = Session::new();
    let outcome = assistant.handle_turn_on(&mut session, "How's Paris?", today()).await;

    assert!(outcome.reply.contains("Paris"), "reply was {}", outcome.reply);
    assert!(outcome.reply.contains("15"));
    assert!(outcome.reply.contains("clear sky"));
    assert!(outcome.reply.contains("11 km/h"));
    assert_eq!(session.displayed().map(|w| w.location.name.as_str()), Some("Paris"));
    assert_eq!(session.history().len(), 2);
}

#[tokio::test]
async fn temperature_comparison_names_extremes() {
    let server = MockServer::start().await;
    mount_geocode(&server, "Murree", "1", json!([geo_entry("Murree", "PK", None, 33.907, 73.3943)])).await;
    mount_geocode(&server, "Faisalabad", "1", json!([geo_entry("Faisalabad", "PK", None, 31.4187, 73.0791)]))
        .await;
    mount_current_at(&server, "33.907", current_body("Murree", "PK", 33.907, 73.3943, 10.0, "mist")).await;
    mount_current_at(&server, "31.4187", current_body("Faisalabad", "PK", 31.4187, 73.0791, 30.0, "haze")).await;

    let assistant = assistant(&server, IntentPipeline::rule_based());
    let mut session = Session::new();
    let outcome =
        assistant.handle_turn_on(&mut session, "which is colder, Murree or Faisalabad", today()).await;

    assert!(outcome.reply.contains("Coldest: Murree at 10°C"), "reply was {}", outcome.reply);
    assert!(outcome.reply.contains("Warmest: Faisalabad at 30°C"));
    assert!(outcome.reply.contains("Temperature difference: 20°C"));
    assert!(outcome.card.is_none());
}

#[tokio::test]
async fn unrelated_question_never_reaches_provider() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let assistant = assistant(&server, IntentPipeline::rule_based());
    let mut session = Session::new();
    let outcome = assistant.handle_turn_on(&mut session, "tell me a joke", today()).await;

    assert!(outcome.reply.contains("only help with weather"));
    assert!(session.displayed().is_none());
}

#[tokio::test]
async fn completion_service_drives_the_turn() {
    let server = MockServer::start().await;
    mount_paris(&server).await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": {
                "role": "assistant",
                "content": "{\"queryType\": \"SINGLE_LOCATION\", \"cities\": [\"Paris\"]}"
            } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let completion = CompletionClient::new("SECRET".to_string()).with_base_url(&format!("{}/v1", server.uri()));
    let assistant = assistant(&server, IntentPipeline::with_primary(Box::new(completion)));
    let mut session = Session::new();
    let outcome =
        assistant.handle_turn_on(&mut session, "what is the weather like in the French capital?", today()).await;

    assert!(outcome.reply.contains("Paris"), "reply was {}", outcome.reply);
    assert!(outcome.card.is_some());
}
