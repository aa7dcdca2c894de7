//! Live change notifications.
//!
//! Demonstrates:
//! - Opening the shared change channel
//! - Callback subscriptions for one event and for all events
//! - Consuming changes as a stream with `watch`
//! - Unsubscribing
//!
//! Usage:
//!   cargo run --example live_updates
//!   cargo run --example live_updates -- --url http://localhost:8080
//!   cargo run --example live_updates -- --no-wait

mod common;

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use common::Args;
use serde_json::{Value, json};
use thunderbase::{Client, Result};

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let args = Args::parse();
    common::init_logging(args.debug);

    if let Err(e) = run(args).await {
        eprintln!("\n[ERROR] {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    println!("=== Live Updates ===\n");

    // ========================================================================
    // Connect
    // ========================================================================

    println!("[1] Connecting to {}...", args.url);
    let client = Client::new(&args.url)?;
    client.connect().await?;
    println!("    ✓ Connected to {}\n", client.ws_url());

    // ========================================================================
    // Subscribe
    // ========================================================================

    println!("[2] Subscribing...");
    let posts = client.collection("posts");

    let inserts = posts.subscribe("INSERT", |event| {
        println!("    [posts INSERT] {}", event.record());
    })?;
    let everything = posts.subscribe("*", |event| {
        println!("    [posts *] {} {}", event.event, event.record());
    })?;
    let mut comments = client.collection("comments").watch("*")?;
    println!("    ✓ {} subscriptions\n", client.subscription_count());

    // ========================================================================
    // Generate Changes
    // ========================================================================

    println!("[3] Writing a post and a comment...");
    let post: Value = posts.create(&json!({ "title": "hello" })).await?;
    let post_id = post["id"].as_u64().unwrap_or_default();
    let _: Value = client
        .collection("comments")
        .create(&json!({ "post": post_id, "body": "first" }))
        .await?;

    match tokio::time::timeout(Duration::from_secs(5), comments.next()).await {
        Ok(Some(event)) => println!("    [comments stream] {} {}", event.event, event.record()),
        _ => println!("    (no comment event received)"),
    }
    println!();

    // ========================================================================
    // Unsubscribe
    // ========================================================================

    println!("[4] Unsubscribing from INSERT only...");
    posts.unsubscribe(inserts);
    let _: Value = posts.update(post_id, &json!({ "title": "edited" })).await?;
    tokio::time::sleep(Duration::from_millis(200)).await;
    println!("    ✓ Only the wildcard subscription saw the UPDATE\n");

    common::wait_for_exit(args.no_wait).await;

    posts.unsubscribe(everything);
    drop(comments);
    client.disconnect();

    println!("=== Done ===");
    Ok(())
}
