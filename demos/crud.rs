//! CRUD against a ThunderBase server.
//!
//! Demonstrates:
//! - Creating a client
//! - Creating, reading, updating and deleting records
//! - Listing with a filter
//! - Typed records with serde
//!
//! Usage:
//!   cargo run --example crud
//!   cargo run --example crud -- --url http://localhost:8080
//!   cargo run --example crud -- --debug

mod common;

// ============================================================================
// Imports
// ============================================================================

use common::Args;
use serde::Deserialize;
use serde_json::{Value, json};
use thunderbase::{Client, Filter, Result};

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct User {
    id: u64,
    name: String,
}

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
    println!("=== CRUD ===\n");

    // ========================================================================
    // Create Client
    // ========================================================================

    println!("[1] Creating client for {}...", args.url);
    let client = Client::new(&args.url)?;
    let users = client.collection("users");
    println!("    ✓ Client ready\n");

    // ========================================================================
    // Create
    // ========================================================================

    println!("[2] Creating user...");
    let created: User = users.create(&json!({ "name": "Ada" })).await?;
    println!("    ✓ Created {} (id {})\n", created.name, created.id);

    // ========================================================================
    // Read
    // ========================================================================

    println!("[3] Fetching user {}...", created.id);
    let fetched: Value = users.get_one(created.id).await?;
    println!("    ✓ {fetched}\n");

    // ========================================================================
    // Update
    // ========================================================================

    println!("[4] Renaming user...");
    let updated: Value = users
        .update(created.id, &json!({ "name": "Ada Lovelace" }))
        .await?;
    println!("    ✓ {updated}\n");

    // ========================================================================
    // List
    // ========================================================================

    println!("[5] Listing users named 'Ada Lovelace'...");
    let filter = Filter::new().with("name", "Ada Lovelace");
    let matches: Vec<Value> = users.all(&filter).await?;
    println!("    ✓ {} match(es)\n", matches.len());

    // ========================================================================
    // Delete
    // ========================================================================

    println!("[6] Deleting user...");
    let deleted: Value = users.delete(created.id).await?;
    println!("    ✓ {deleted}\n");

    println!("=== Done ===");
    Ok(())
}
