mod common;

// crates.io
use time::{Duration, OffsetDateTime};
// self
use common::*;
use oauth2_gateway::{
	auth::{AccessToken, TokenSet},
	error::{ConfigError, Error},
	http::DefaultTransportErrorMapper,
	pipeline::{Method, RequestOptions},
};

fn expiring_token(
	client: &ScriptedClient,
	refresh: Option<&str>,
) -> AccessToken<ScriptedHttpClient, DefaultTransportErrorMapper> {
	let mut tokens =
		TokenSet::bearer("old").with_expires_at(OffsetDateTime::now_utc() - Duration::minutes(1));

	if let Some(refresh) = refresh {
		tokens = tokens.with_refresh_token(refresh);
	}

	AccessToken::from_tokens(client.clone(), tokens)
}

#[tokio::test]
async fn refresh_keeps_previous_refresh_token_when_not_rotated() {
	let (client, transport) = scripted_client(config(SITE));

	transport.push(json(200, r#"{"access_token":"new","expires_in":60}"#));

	let token = expiring_token(&client, Some("R1"));

	assert!(token.tokens().is_expired_at(OffsetDateTime::now_utc()));

	let refreshed = token.refresh().await.expect("Refresh should succeed.");
	let request = &transport.requests()[0];

	assert_eq!(request.method, "POST");
	assert_eq!(request.url, "https://gateway.example.com/auth/access_token");
	assert_eq!(
		request.body_str(),
		"grant_type=refresh_token&refresh_token=R1&client_id=client-it&client_secret=secret-it"
	);
	assert_eq!(refreshed.token().expose(), "new");
	assert_eq!(refreshed.tokens().refresh_token.as_ref().map(|t| t.expose()), Some("R1"));
	assert!(!refreshed.tokens().is_expired_at(OffsetDateTime::now_utc()));
	assert_eq!(token.token().expose(), "old");
}

#[tokio::test]
async fn refresh_adopts_rotated_refresh_token() {
	let (client, transport) = scripted_client(config(SITE));

	transport.push(json(200, r#"{"access_token":"new","refresh_token":"R2"}"#));

	let refreshed = expiring_token(&client, Some("R1"))
		.refresh_with(&[("scope".into(), "email".into())])
		.await
		.expect("Refresh should succeed.");

	assert_eq!(refreshed.tokens().refresh_token.as_ref().map(|t| t.expose()), Some("R2"));
	assert!(transport.requests()[0].body_str().ends_with("&scope=email"));
}

#[tokio::test]
async fn refresh_without_refresh_token_fails_locally() {
	let (client, transport) = scripted_client(config(SITE));
	let err = expiring_token(&client, None)
		.refresh()
		.await
		.expect_err("Refresh without a refresh token should fail.");

	assert!(matches!(err, Error::Config(ConfigError::MissingRefreshToken)));
	assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn refresh_without_access_token_in_response_fails() {
	let (client, transport) = scripted_client(config(SITE));

	transport.push(json(200, "{}"));

	let err = expiring_token(&client, Some("R1"))
		.refresh()
		.await
		.expect_err("A token response without credentials should fail.");

	assert!(matches!(err, Error::MissingField { ref field } if field == "access_token"));
}

#[tokio::test]
async fn refresh_stopped_by_redirect_budget_fails() {
	let (client, transport) = scripted_client(config(SITE).max_redirects(0));

	transport.push(redirect(302, "/auth/elsewhere"));

	let err = expiring_token(&client, Some("R1"))
		.refresh()
		.await
		.expect_err("An unresolved redirect should not yield a token.");

	assert!(matches!(err, Error::MissingField { ref field } if field == "access_token"));
	assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn refresh_substitutes_bound_provider_into_token_path() {
	let (client, transport) = scripted_client(config(SITE).token_path("/auth/:provider/token"));

	transport.push(json(200, r#"{"access_token":"new"}"#));

	let refreshed = expiring_token(&client, Some("R1"))
		.with_provider(provider("github"))
		.refresh()
		.await
		.expect("Refresh should succeed.");

	assert_eq!(transport.requests()[0].url, "https://gateway.example.com/auth/github/token");
	assert_eq!(refreshed.provider(), Some(&provider("github")));
}

#[tokio::test]
async fn refresh_without_bound_provider_rejects_provider_token_path() {
	let (client, transport) = scripted_client(config(SITE).token_path("/auth/:provider/token"));
	let err = expiring_token(&client, Some("R1"))
		.refresh()
		.await
		.expect_err("Unbound provider paths should fail.");

	assert!(matches!(err, Error::Config(ConfigError::UnboundProvider { .. })));
	assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn refresh_raises_provider_errors() {
	let (client, transport) = scripted_client(config(SITE).raise_on_error(false));

	transport.push(json(400, r#"{"error":"invalid_grant"}"#));

	let err = expiring_token(&client, Some("stale"))
		.refresh()
		.await
		.expect_err("Rejected refresh should fail.");

	assert_eq!(err.as_provider_error().map(|e| e.status), Some(400));
}

#[tokio::test]
async fn authenticated_requests_carry_bearer_only_when_present() {
	let (client, transport) = scripted_client(config(SITE));

	transport.push(json(200, "{}")).push(json(200, "{}"));

	AccessToken::from_tokens(client.clone(), TokenSet::bearer("T1"))
		.request(Method::GET, "/api/me", RequestOptions::new())
		.await
		.expect("Bearer request should succeed.");
	AccessToken::from_tokens(client.clone(), TokenSet::default())
		.request(Method::GET, "/api/me", RequestOptions::new())
		.await
		.expect("Anonymous request should succeed.");

	let requests = transport.requests();

	assert_eq!(requests[0].header("authorization"), Some("Bearer T1"));
	assert_eq!(requests[1].header("authorization"), None);
}
