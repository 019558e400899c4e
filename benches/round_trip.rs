//! Command round-trip benchmark suite.
//!
//! Benchmarks command latency against a local echo endpoint:
//! - Sequential commands on one connection
//! - Concurrent commands in flight: 1, 16, 64
//!
//! Run with: cargo bench --bench round_trip
//! Results saved to: target/criterion/

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use chromectl::Connection;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use futures_util::future::join_all;
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::runtime::Runtime;
use tokio_tungstenite::tungstenite::Message;

// ============================================================================
// Benchmark Parameters
// ============================================================================

const CONCURRENCY: &[usize] = &[1, 16, 64];

// ============================================================================
// Echo Endpoint
// ============================================================================

/// Spawns an endpoint that answers every command with its own params.
async fn spawn_echo_endpoint() -> String {
    let listener = TcpListener::bind(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0))
        .await
        .expect("bind");
    let port = listener.local_addr().expect("local addr").port();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let Ok(ws) = tokio_tungstenite::accept_async(stream).await else {
                    return;
                };
                let (mut write, mut read) = ws.split();

                while let Some(Ok(Message::Text(text))) = read.next().await {
                    let Ok(request) = serde_json::from_str::<Value>(&text) else {
                        continue;
                    };
                    let reply = json!({"id": request["id"], "result": request["params"]});
                    if write.send(Message::Text(reply.to_string().into())).await.is_err() {
                        break;
                    }
                }
            });
        }
    });

    format!("ws://127.0.0.1:{port}/devtools/page/BENCH")
}

// ============================================================================
// Benchmark: Round Trip
// ============================================================================

fn bench_round_trip(c: &mut Criterion) {
    let rt = Runtime::new().expect("runtime");
    let connection = rt.block_on(async {
        let url = spawn_echo_endpoint().await;
        Connection::connect(&url).await.expect("connect")
    });

    let mut group = c.benchmark_group("round_trip");

    group.bench_function("sequential", |b| {
        b.to_async(&rt).iter(|| async {
            connection
                .send("Echo.test", Some(json!({"x": 1})))
                .await
                .expect("echo")
        });
    });

    for &in_flight in CONCURRENCY {
        group.bench_with_input(
            BenchmarkId::new("concurrent", in_flight),
            &in_flight,
            |b, &n| {
                b.to_async(&rt).iter(|| async {
                    let calls = (0..n).map(|i| connection.send("Echo.test", Some(json!({"i": i}))));
                    for result in join_all(calls).await {
                        result.expect("echo");
                    }
                });
            },
        );
    }

    group.finish();
    rt.block_on(connection.close());
}

criterion_group!(benches, bench_round_trip);
criterion_main!(benches);
