//! Walks through a full gateway login: print the authorize URL, read the callback URL the
//! gateway redirected to, and print the canonical identity.
//!
//! ```sh
//! GATEWAY_SITE=https://gateway.example.com GATEWAY_CLIENT_ID=demo GATEWAY_CLIENT_SECRET=secret \
//! 	cargo run --example gateway_login -- github
//! ```

// std
use std::{env, io};
// crates.io
use color_eyre::{Result, eyre::eyre};
use url::Url;
// self
use oauth2_gateway::{
	auth::ProviderId, client::Client, config::ClientConfig, flows::AuthorizationCallback,
};

fn var(name: &str, default: &str) -> String {
	env::var(name).unwrap_or_else(|_| default.to_owned())
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let provider = ProviderId::new(env::args().nth(1).unwrap_or_else(|| "github".into()))?;
	let config = ClientConfig::builder(
		var("GATEWAY_CLIENT_ID", "demo-client"),
		var("GATEWAY_CLIENT_SECRET", "demo-secret"),
		Url::parse(&var("GATEWAY_SITE", "https://gateway.example.com"))?,
	)
	.redirect_uri(Url::parse(&var("GATEWAY_REDIRECT_URI", "https://app.example.com/callback"))?)
	.build()?;
	let client = Client::new(config)?;
	let session = client.start_authorization(provider, &[])?;

	println!("Send your user to {}.", session.authorize_url);
	println!("Paste the callback URL the gateway redirected to:");

	let mut line = String::new();

	io::stdin().read_line(&mut line)?;

	let callback = AuthorizationCallback::from_url(&Url::parse(line.trim())?)?;
	let identity = client
		.complete_authorization(session, &callback)
		.await
		.map_err(|e| eyre!("Login failed: {e}."))?;

	println!("{}", serde_json::to_string_pretty(&identity)?);

	Ok(())
}
