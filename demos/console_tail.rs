//! Console Tail Example
//!
//! Demonstrates:
//! - Attaching to a target by id
//! - Enabling protocol domains
//! - Streaming `Log.entryAdded` and `Runtime.consoleAPICalled` events
//!
//! Usage:
//!   cargo run --example console_tail -- <target-id> [--for SECONDS] [--port 9222]

// ============================================================================
// Imports
// ============================================================================

use std::time::{Duration, Instant};

use anyhow::Context;
use chromectl::{DebuggerConfig, Event, TargetResolver};
use serde_json::{Value, json};
use tokio::time::timeout;
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
    let target_id = args
        .get(1)
        .filter(|a| !a.starts_with("--"))
        .context("usage: console_tail <target-id> [--for SECONDS] [--port PORT]")?;
    let seconds: f64 = flag_value(&args, "--for").map(str::parse).transpose()?.unwrap_or(10.0);
    let port = flag_value(&args, "--port")
        .map(str::parse)
        .transpose()?
        .unwrap_or(chromectl::config::DEFAULT_PORT);

    let resolver = TargetResolver::new(DebuggerConfig::new().with_port(port))?;
    let connection = resolver.attach(target_id).await?;

    let mut events = connection.subscribe(256);
    connection.send("Runtime.enable", None).await?;
    connection.send("Log.enable", None).await?;

    let start = Instant::now();
    let deadline = Duration::from_secs_f64(seconds);

    while let Some(remaining) = deadline.checked_sub(start.elapsed()) {
        let Ok(Some(event)) = timeout(remaining, events.recv()).await else {
            break;
        };
        if let Some(line) = render(&event, start.elapsed()) {
            println!("{line}");
        }
    }

    connection.close().await;
    Ok(())
}

// ============================================================================
// Rendering
// ============================================================================

fn render(event: &Event, elapsed: Duration) -> Option<Value> {
    let t = format!("+{:.3}s", elapsed.as_secs_f64());

    match event.method.as_str() {
        "Log.entryAdded" => {
            let entry = &event.params["entry"];
            Some(json!({
                "t": t,
                "level": entry["level"],
                "source": entry["source"],
                "text": entry["text"],
            }))
        }
        "Runtime.consoleAPICalled" => {
            let args: Vec<Value> = event.params["args"]
                .as_array()
                .map(|args| {
                    args.iter()
                        .map(|a| match a.get("value") {
                            Some(value) => value.clone(),
                            None => a.get("description").unwrap_or(&a["type"]).clone(),
                        })
                        .collect()
                })
                .unwrap_or_default();
            Some(json!({"t": t, "console": event.params["type"], "args": args}))
        }
        _ => None,
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}
