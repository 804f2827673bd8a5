//! Example demonstrating Redis-backed slots for distributed limiting.
//!
//! This example shows how to share a concurrency bound across multiple
//! application instances through Redis. This is useful for:
//!
//! - Worker fleets where only N jobs of a kind may run at once, globally
//! - Microservice replicas that must respect one shared bound
//! - Horizontal scaling scenarios where local state isn't sufficient
//!
//! # Quick Start
//!
//! 1. Start Redis:
//!    ```bash
//!    docker run -p 6379:6379 redis:7-alpine
//!    ```
//!
//! 2. Run the example:
//!    ```bash
//!    cargo run --example redis --features redis-storage
//!    ```
//!
//! # Testing Distributed Limiting
//!
//! Run multiple instances in different terminals at the same time:
//! ```bash
//! # Terminal 1
//! cargo run --example redis --features redis-storage
//!
//! # Terminal 2
//! cargo run --example redis --features redis-storage
//! ```
//!
//! Both instances address the same slot keys in Redis, so their combined
//! running jobs never exceed the category's limit.

use slotgate::{LimiterError, RateLimiter, RedisStore};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("=== Redis-Backed Limiting Example ===\n");

    // Two connections stand in for two application instances
    let instance_a = RateLimiter::new(RedisStore::connect("redis://127.0.0.1:6379").await?);
    let instance_b = RateLimiter::new(RedisStore::connect("redis://127.0.0.1:6379").await?);

    // A 30 second TTL keeps demo slots from lingering in Redis if this
    // process is killed before the cleanup below runs
    let ttl = Some(Duration::from_secs(30));

    println!("Instance A admits 2 jobs into \"render\" (limit 2):");
    let first = instance_a.add_job("render", 2, None, ttl).await?;
    let second = instance_a.add_job("render", 2, None, ttl).await?;
    println!("  admitted {}\n  admitted {}\n", first, second);

    println!("Instance B sees the same occupancy:");
    let slots = instance_b.list_jobs("render", 2).await?;
    for slot in &slots {
        println!("  {}", slot);
    }

    println!("\nInstance B tries to admit a 3rd job:");
    match instance_b.add_job("render", 2, None, ttl).await {
        Err(LimiterError::NoSlotAvailable) => println!("  rejected: the bound is global"),
        other => println!("  unexpected outcome: {:?}", other),
    }

    // Either instance may release; the slot keys are shared
    println!("\nInstance B releases {} (admitted by A):", first);
    instance_b.delete_job("render", 2, &first).await?;

    let third = instance_b.add_job("render", 2, None, ttl).await?;
    println!("  admitted {}", third);

    // Clean up so reruns start from empty slots
    instance_a.delete_job("render", 2, &second).await?;
    instance_b.delete_job("render", 2, &third).await?;

    println!("\n=== Example Complete ===");
    println!("Run two copies of this example side by side to watch them");
    println!("contend for the same two slots.");

    Ok(())
}
