//! Example: password authentication
//!
//! Logs in with a username and password, then makes a call with the
//! returned session token.
//!
//! Usage:
//!   SL_USERNAME=... SL_PASSWORD=... cargo run --bin password-login

use softlayer_client::{CallOptions, Client, ClientConfig};
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("info"))
        .init();

    let config = ClientConfig::from_env()?;
    let username = config
        .username
        .clone()
        .ok_or_else(|| anyhow::anyhow!("SL_USERNAME is not set"))?;
    let password = env::var("SL_PASSWORD")?;

    let mut builder = Client::builder().anonymous();
    if let Some(url) = config.endpoint_url {
        builder = builder.endpoint_url(url);
    }
    let client = builder.build()?;

    client
        .authenticate_with_password(&username, &password, None, None)
        .await?;
    println!("Logged in: {:?}", client.auth());

    let user = client
        .call(
            "Account",
            "getCurrentUser",
            &[],
            CallOptions::new().mask("id,username"),
        )
        .await?;
    println!("Current user: {:?}", user.get("username"));

    Ok(())
}
