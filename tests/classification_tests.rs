mod support;

use cambist::error::ApiErrorKind;
use cambist::poloniex::errors;
use serde_json::json;

#[test]
fn every_exact_message_maps_to_its_kind() {
    let classifier = errors::classifier();
    for (message, kind) in errors::exact_table() {
        assert_eq!(classifier.classify(message).kind(), *kind, "{message}");
    }
}

#[test]
fn broad_needles_match_with_embedded_dynamic_values() {
    let classifier = errors::classifier();
    let cases = [
        (
            "Nonce must be greater than 1550000000000. You provided 1549999999999.",
            ApiErrorKind::InvalidNonce,
        ),
        ("Total must be at least 0.0001.", ApiErrorKind::InvalidOrder),
        ("Amount must be at least 0.000001.", ApiErrorKind::InvalidOrder),
        (
            "Order 514845991795 is either completed or does not exist.",
            ApiErrorKind::OrderNotFound,
        ),
        ("Not enough BTC.", ApiErrorKind::InsufficientFunds),
        (
            "You have already called cancelOrder or moveOrder on this order. Please wait for that call's response.",
            ApiErrorKind::CancelPending,
        ),
    ];
    for (message, kind) in cases {
        assert_eq!(classifier.classify(message).kind(), kind, "{message}");
    }
}

#[test]
fn unmapped_messages_become_exchange_error() {
    let classifier = errors::classifier();
    let err = classifier.classify("An entirely novel failure.");
    assert_eq!(err.kind(), ApiErrorKind::ExchangeError);
    assert!(err.to_string().contains("An entirely novel failure."));
}

#[tokio::test]
async fn error_bodies_surface_as_classified_errors() {
    let (client, transport) = support::client();
    transport.push_ok(json!({"error": "Not enough BTC."}));

    let err = client.fetch_balance().await.unwrap_err();
    assert_eq!(
        err.as_api().unwrap().kind(),
        ApiErrorKind::InsufficientFunds
    );
}
