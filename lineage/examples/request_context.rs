//! Example: Per-request context shared by every task a request spawns
//!
//! Run with `RUST_LOG=lineage=debug` to watch nodes being created and
//! destroyed.

use lineage::context;
use lineage::task::spawn;
use lineage::time::sleep;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

struct Request {
    server: &'static str,
    id: u32,
}

async fn query_database(table: &'static str) {
    sleep(Duration::from_millis(15)).await;

    let request = context::get::<String>("request").unwrap_or_default();
    let elapsed = context::elapsed(None).unwrap_or_default();
    println!("  [{request}] query on {table} after {elapsed:?}");
}

async fn handle(request: Request) {
    // Each request is its own unit of work, whoever accepted it.
    context::scope().unwrap();
    context::set("request", format!("{}#{}", request.server, request.id), Some(true)).unwrap();

    let users = spawn(query_database("users"));
    let orders = spawn(async {
        sleep(Duration::from_millis(5)).await;
        query_database("orders").await;
    });

    users.await;
    orders.await;

    println!(
        "[{}#{}] done, {} live contexts",
        request.server,
        request.id,
        context::size()
    );
}

async fn serve(server: &'static str, requests: u32) {
    context::set("server", server, None).unwrap();

    let handles: Vec<_> = (0..requests)
        .map(|id| spawn(handle(Request { server, id })))
        .collect();

    for handle in handles {
        handle.await;
    }

    // Requests were scoped, so the server never saw their values.
    assert!(context::get::<String>("request").is_none());
}

#[lineage::main(context)]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let api = spawn(serve("api", 2));
    let admin = spawn(serve("admin", 1));

    api.await;
    admin.await;

    println!("all requests served, {} live contexts", context::size());
}
