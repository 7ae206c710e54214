//! Example: single call with an object mask
//!
//! Reads credentials from the environment and prints a few account fields.
//!
//! Usage:
//!   SL_USERNAME=... SL_API_KEY=... cargo run --bin account-info
//!
//! Set `RUST_LOG=softlayer_client=debug` to see the request spans.

use serde::Deserialize;
use softlayer_client::{CallOptions, ClientConfig};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Account {
    id: i64,
    company_name: String,
    email: Option<String>,
    master_user: Option<MasterUser>,
}

#[derive(Debug, Deserialize)]
struct MasterUser {
    username: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = ClientConfig::from_env()?;
    if !config.has_credentials() {
        anyhow::bail!("set SL_USERNAME and SL_API_KEY");
    }
    let client = config.into_builder().build()?;

    let account: Account = client
        .call_as(
            "Account",
            "getObject",
            &[],
            CallOptions::new().mask("id,companyName,email,masterUser[username]"),
        )
        .await?;

    println!("Account {}: {}", account.id, account.company_name);
    if let Some(email) = &account.email {
        println!("  email:  {}", email);
    }
    if let Some(owner) = &account.master_user {
        println!("  owner:  {}", owner.username);
    }

    Ok(())
}
