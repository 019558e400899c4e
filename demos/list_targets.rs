//! List Targets Example
//!
//! Demonstrates:
//! - Querying the metadata endpoint
//! - Opening a new tab
//!
//! Usage:
//!   cargo run --example list_targets [-- --port 9222] [-- --open https://example.com]
//!
//! The browser must already be running with `--remote-debugging-port`.

// ============================================================================
// Imports
// ============================================================================

use chromectl::{DebuggerConfig, TargetResolver};
use serde_json::json;
use tracing_subscriber::EnvFilter;

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("chromectl=info"))
        .with_target(false)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let port = flag_value(&args, "--port")
        .map(str::parse)
        .transpose()?
        .unwrap_or(chromectl::config::DEFAULT_PORT);

    let resolver = TargetResolver::new(DebuggerConfig::new().with_port(port))?;

    if let Some(url) = flag_value(&args, "--open") {
        let target = resolver.new_tab(url).await?;
        println!("{}", json!({"id": target.id, "url": target.url}));
        return Ok(());
    }

    for target in resolver.list_targets().await? {
        println!(
            "{}",
            json!({
                "id": target.id,
                "type": target.target_type,
                "title": target.title,
                "url": target.url,
                "attached": target.attached,
            })
        );
    }

    Ok(())
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}
