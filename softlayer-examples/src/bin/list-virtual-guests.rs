//! Example: paged iteration
//!
//! Streams `SoftLayer_Account::getVirtualGuests` 50 at a time, optionally
//! stopping after a number of guests given on the command line.
//!
//! Usage:
//!   SL_USERNAME=... SL_API_KEY=... cargo run --bin list-virtual-guests
//!   SL_USERNAME=... SL_API_KEY=... cargo run --bin list-virtual-guests -- 200

use futures::TryStreamExt;
use softlayer_client::{CallOptions, ClientConfig, Value};
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let limit: u32 = match env::args().nth(1) {
        Some(arg) => arg.parse()?,
        None => 0,
    };

    let client = ClientConfig::from_env()?.into_builder().build()?;

    let options = CallOptions::new()
        .mask("id,hostname,domain,primaryIpAddress,datacenter[name]")
        .limit(limit);
    let mut guests = Box::pin(client.iter_call_chunked(
        "Account",
        "getVirtualGuests",
        &[],
        50,
        options,
    )?);

    let mut count = 0usize;
    while let Some(guest) = guests.try_next().await? {
        count += 1;
        println!(
            "{:>10}  {:<40}  {:<15}  {}",
            field(&guest, "id"),
            format!("{}.{}", field(&guest, "hostname"), field(&guest, "domain")),
            field(&guest, "primaryIpAddress"),
            guest
                .get("datacenter")
                .map(|dc| field(dc, "name"))
                .unwrap_or_default(),
        );
    }

    tracing::info!(count, "listed virtual guests");
    Ok(())
}

fn field(value: &Value, name: &str) -> String {
    match value.get(name) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Int(i)) => i.to_string(),
        Some(other) => format!("{:?}", other),
        None => String::new(),
    }
}
