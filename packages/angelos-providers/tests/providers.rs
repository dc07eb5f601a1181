use reqwest::header::{AUTHORIZATION, HeaderName};
use serde_json::{Map, Value};

use angelos_providers::Error;

#[test]
fn builds_bearer_auth_header() {
	let headers =
		angelos_providers::auth_headers("secret", &Map::new()).expect("Failed to build headers.");
	let value = headers.get(AUTHORIZATION).expect("Missing authorization header.");

	assert_eq!(value, "Bearer secret");
}

#[test]
fn blank_api_key_skips_authorization() {
	let mut extra = Map::new();

	extra.insert("api-key".to_string(), Value::String("azure-secret".to_string()));

	let headers = angelos_providers::auth_headers("", &extra).expect("Failed to build headers.");

	assert!(headers.get(AUTHORIZATION).is_none());
	assert_eq!(
		headers.get(HeaderName::from_static("api-key")).expect("Missing api-key header."),
		"azure-secret"
	);
}

#[test]
fn non_string_default_header_is_rejected() {
	let mut extra = Map::new();

	extra.insert("x-retries".to_string(), Value::from(3));

	let err = angelos_providers::auth_headers("secret", &extra)
		.expect_err("Expected invalid header config.");

	assert!(matches!(err, Error::InvalidConfig { .. }), "Unexpected error: {err}");
}
