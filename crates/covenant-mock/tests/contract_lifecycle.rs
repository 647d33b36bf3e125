//! End-to-end life cycle: two consumer tests sharing one registry, then
//! contract assembly and backend hand-off.

use covenant_mock::{
    BackendError, Body, BodyBuilder, ContractBuilder, ContractDocument, HttpMethod,
    InteractionBuilder, InteractionRegistry, InteractionRequest, InteractionResponse, MatchError,
    VerifiedBackend,
};
use std::sync::Arc;

fn event_body() -> Body {
    let mut builder = BodyBuilder::new();
    builder
        .string_type("eventType", "DetailsView")
        .unwrap()
        .guid("eventId", "45D80D13-D5A2-48D7-8353-CBB4C0EAABF5")
        .unwrap()
        .date_format("timestamp", "2011-07-01T01:41:03", "%Y-%m-%dT%H:%M:%S")
        .unwrap();
    builder.build().unwrap()
}

struct AcceptingBackend;

impl VerifiedBackend for AcceptingBackend {
    fn finalize(&self, _document: &ContractDocument) -> Result<(), BackendError> {
        Ok(())
    }
}

#[test]
fn two_test_scopes_accumulate_into_one_contract() {
    let registry = Arc::new(InteractionRegistry::new());

    // ----- first test scope -----
    let mut builder = InteractionBuilder::new(Arc::clone(&registry));
    builder
        .given("there are events with ids '45D80D13-D5A2-48D7-8353-CBB4C0EAABF5'")
        .unwrap();
    builder.upon_receiving("a request to retrieve all events").unwrap();
    builder.with_request(
        InteractionRequest::new(HttpMethod::Get, "/events")
            .with_header("Accept", "application/json"),
    );
    builder
        .will_respond_with(
            InteractionResponse::new(200)
                .with_header("Content-Type", "application/json; charset=utf-8")
                .with_body(event_body()),
        )
        .unwrap();

    registry.find_match(HttpMethod::Get, "/events").unwrap();
    registry.verify().unwrap();
    registry.clear_scoped();

    // ----- second test scope: replays the same line, adds a new one -----
    let mut builder = InteractionBuilder::new(Arc::clone(&registry));
    builder
        .given("there are events with ids '45D80D13-D5A2-48D7-8353-CBB4C0EAABF5'")
        .unwrap();
    builder.upon_receiving("a request to retrieve all events").unwrap();
    builder.with_request(
        InteractionRequest::new(HttpMethod::Get, "/events")
            .with_header("Accept", "application/json"),
    );
    builder
        .will_respond_with(InteractionResponse::new(200).with_body(event_body()))
        .unwrap();

    builder.upon_receiving("a request to create a new event").unwrap();
    builder.with_request(
        InteractionRequest::new(HttpMethod::Post, "/events").with_body(event_body()),
    );
    builder
        .will_respond_with(InteractionResponse::new(201))
        .unwrap();

    registry.find_match(HttpMethod::Get, "/events").unwrap();
    registry.find_match(HttpMethod::Post, "/events").unwrap();
    registry.verify().unwrap();
    registry.clear_scoped();

    // ----- assembly: the replayed line is emitted once -----
    let mut contract = ContractBuilder::new();
    contract.service_consumer("Event API Consumer").unwrap();
    contract.has_pact_with("Event API").unwrap();
    let document = contract.document(&registry).unwrap();

    assert_eq!(document.interactions.len(), 2);
    assert_eq!(
        document.interactions[0].description,
        "a request to retrieve all events"
    );
    assert_eq!(
        document.interactions[1].description,
        "a request to create a new event"
    );

    AcceptingBackend.finalize(&document).unwrap();
}

#[test]
fn failed_test_scope_reports_aggregate_and_recovers_after_clear() {
    let registry = Arc::new(InteractionRegistry::new());

    let mut builder = InteractionBuilder::new(Arc::clone(&registry));
    builder.upon_receiving("a request that never arrives").unwrap();
    builder.with_request(InteractionRequest::new(HttpMethod::Get, "/events"));
    builder
        .will_respond_with(InteractionResponse::new(200))
        .unwrap();

    // A stray request for something else fails per-request without
    // touching usage counts.
    assert!(matches!(
        registry.find_match(HttpMethod::Delete, "/events/1"),
        Err(MatchError::NoMatchingInteraction { .. })
    ));

    let err = registry.verify().unwrap_err();
    assert_eq!(err.unused.len(), 1);

    // The next scope is unaffected by the failed one.
    registry.clear_scoped();
    let mut builder = InteractionBuilder::new(Arc::clone(&registry));
    builder.upon_receiving("a request for stats").unwrap();
    builder.with_request(InteractionRequest::new(HttpMethod::Get, "/stats"));
    builder
        .will_respond_with(InteractionResponse::new(200))
        .unwrap();

    registry.find_match(HttpMethod::Get, "/stats").unwrap();
    registry.verify().unwrap();
}
