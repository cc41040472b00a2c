mod common;

use std::rc::Rc;

use common::{init_logger, FakeTransport};
use parking_core::error::ValidationError;
use parking_core::password::{validate_new_password, BreachChecker, PwnedPasswords};

// SHA-1("password") = 5BAA6 1E4C9B93F3F0682250B6CF8331B7EE68FD8
const RANGE_5BAA6: &str = "003D68EB55068C33ACE09247EE4C639306B:3\r\n\
                           1E4C9B93F3F0682250B6CF8331B7EE68FD8:9545824\r\n\
                           1E4FE8DE8E1A4D8F2B1B2C5E6BE1D1A1D1C:0";

fn checker(transport: &Rc<FakeTransport>) -> PwnedPasswords<Rc<FakeTransport>> {
    init_logger();
    PwnedPasswords::new("https://pwned.test/", transport.clone())
}

#[tokio::test]
async fn only_the_hash_prefix_is_sent() {
    let transport = Rc::new(FakeTransport::new());
    transport.respond(200, RANGE_5BAA6);

    let count = checker(&transport).breach_count("password").await.unwrap();

    assert_eq!(count, 9_545_824);
    let sent = &transport.requests()[0];
    assert_eq!(sent.url, "https://pwned.test/range/5BAA6");
    assert_eq!(sent.header_value("add-padding"), Some("true"));
    assert!(sent.header_value("authorization").is_none());
    assert!(!sent.url.contains("password"));
}

#[tokio::test]
async fn breached_password_is_refused() {
    let transport = Rc::new(FakeTransport::new());
    transport.respond(200, RANGE_5BAA6);

    let outcome = validate_new_password("password", "password", &checker(&transport)).await;

    assert_eq!(outcome, Err(ValidationError::Breached { count: 9_545_824 }));
    assert_eq!(
        outcome.unwrap_err().to_string(),
        "This password has appeared in a data breach and cannot be used. Please choose a different password."
    );
}

#[tokio::test]
async fn mismatch_is_checked_before_the_lookup() {
    let transport = Rc::new(FakeTransport::new());

    let outcome = validate_new_password("password", "Password", &checker(&transport)).await;

    assert_eq!(outcome, Err(ValidationError::Mismatch));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn lookup_failures_let_the_password_through() {
    let transport = Rc::new(FakeTransport::new());
    transport.respond(503, "");
    transport.fail("offline");
    let checker = checker(&transport);

    assert!(checker.breach_count("password").await.is_err());
    assert_eq!(validate_new_password("password", "password", &checker).await, Ok(()));
}
