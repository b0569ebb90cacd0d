use super::*;
use jsonwebtoken::{decode, DecodingKey, Validation};

const PRIVATE_KEY: &str = include_str!("fixtures/service_account_key.pem");
const PUBLIC_KEY: &str = include_str!("fixtures/service_account_key.pub.pem");
const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

fn credentials() -> ServiceAccountCredentials {
    ServiceAccountCredentials::new("rsvp-writer@wedding.iam.gserviceaccount.com", PRIVATE_KEY)
}

#[test]
fn escaped_newlines_in_key_are_restored() {
    let escaped = PRIVATE_KEY.replace('\n', "\\n");
    let creds = ServiceAccountCredentials::new("svc@example.com", escaped);
    assert_eq!(creds.private_key, PRIVATE_KEY);
}

#[test]
fn debug_output_hides_private_key() {
    let rendered = format!("{:?}", credentials());
    assert!(rendered.contains("rsvp-writer@wedding.iam.gserviceaccount.com"));
    assert!(!rendered.contains("BEGIN PRIVATE KEY"));
}

#[test]
fn assertion_claims_target_sheets_scope_and_token_audience() {
    let now = Utc::now();
    let assertion = mint_assertion(&credentials(), TOKEN_URI, now).expect("assertion");

    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_audience(&[TOKEN_URI]);
    let decoded = decode::<serde_json::Value>(
        &assertion,
        &DecodingKey::from_rsa_pem(PUBLIC_KEY.as_bytes()).expect("public key"),
        &validation,
    )
    .expect("decode");

    assert_eq!(
        decoded.claims["iss"],
        "rsvp-writer@wedding.iam.gserviceaccount.com"
    );
    assert_eq!(decoded.claims["scope"], SHEETS_SCOPE);
    assert_eq!(decoded.claims["aud"], TOKEN_URI);
    assert_eq!(decoded.claims["iat"], now.timestamp());
    assert_eq!(decoded.claims["exp"], now.timestamp() + 3600);
}

#[test]
fn garbage_key_is_rejected() {
    let creds = ServiceAccountCredentials::new("svc@example.com", "not a pem");
    assert!(mint_assertion(&creds, TOKEN_URI, Utc::now()).is_err());
}
