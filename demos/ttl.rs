//! Example demonstrating time-to-live as the release mechanism.
//!
//! Every admission is bounded by a TTL. A job that never calls
//! `delete_job` (crashed worker, lost network partition) stops counting
//! against its category once the TTL elapses, so capacity can never leak
//! permanently. The store enforces the TTL; the limiter never sweeps.

use slotgate::{MemoryStore, RateLimiter};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    // Jobs that do not specify a TTL get a 3 second default here
    let limiter = RateLimiter::with_default_ttl(MemoryStore::new(), Duration::from_secs(3))?;

    println!("=== TTL Expiry Example ===\n");

    // One job with an explicit 1 second TTL, one falling back to the default
    let short = limiter
        .add_job("backup", 2, Some("short-lived"), Some(Duration::from_secs(1)))
        .await?;
    let long = limiter.add_job("backup", 2, Some("long-lived"), None).await?;
    println!("admitted {} (ttl 1s) and {} (default ttl 3s)\n", short, long);

    let slots = limiter.list_jobs("backup", 2).await?;
    println!("immediately after admission:");
    for slot in &slots {
        println!("  {}", slot);
    }

    // After 2 seconds the short job has expired, the long one survives
    tokio::time::sleep(Duration::from_secs(2)).await;
    let slots = limiter.list_jobs("backup", 2).await?;
    println!("\nafter 2 seconds:");
    for slot in &slots {
        println!("  {}", slot);
    }

    // After 4 seconds both slots have freed themselves
    tokio::time::sleep(Duration::from_secs(2)).await;
    let slots = limiter.list_jobs("backup", 2).await?;
    println!("\nafter 4 seconds:");
    for slot in &slots {
        println!("  {}", slot);
    }

    println!("\n=== Example Complete ===");
    println!("No delete_job call was made; the store expired both slots.");

    Ok(())
}
