//! Basic example demonstrating slot-based admission control.
//!
//! This example runs a category with three slots through its full
//! lifecycle: admissions fill the slots, a fourth job is rejected, and
//! releasing a job reopens admission.

use slotgate::{LimiterError, MemoryStore, RateLimiter};

#[tokio::main]
async fn main() -> Result<(), LimiterError> {
    // Show the limiter's debug events alongside the printed output
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let limiter = RateLimiter::new(MemoryStore::new());

    println!("=== Basic Admission Example ===\n");
    println!("Category: \"encode\", limit: 3\n");

    // Fill every slot
    println!("Admitting 3 jobs:");
    let mut ids = Vec::new();
    for _ in 0..3 {
        let id = limiter.add_job("encode", 3, None, None).await?;
        println!("  admitted {}", id);
        ids.push(id);
    }

    println!("\nSlots now:");
    let slots = limiter.list_jobs("encode", 3).await?;
    for slot in &slots {
        println!("  {}", slot);
    }

    // The category is full
    println!("\nAdmitting a 4th job:");
    match limiter.add_job("encode", 3, None, None).await {
        Err(LimiterError::NoSlotAvailable) => println!("  rejected: no slot available"),
        other => println!("  unexpected outcome: {:?}", other),
    }

    // Releasing one occupant reopens the lowest freed ordinal
    println!("\nReleasing {}:", ids[0]);
    limiter.delete_job("encode", 3, &ids[0]).await?;

    let id = limiter.add_job("encode", 3, None, None).await?;
    println!("  admitted {} into the freed slot", id);

    println!("\nSlots now:");
    let slots = limiter.list_jobs("encode", 3).await?;
    for slot in &slots {
        println!("  {}", slot);
    }

    let snapshot = limiter.metrics().snapshot();
    println!(
        "\n=== Example Complete ===\nadmitted={} rejected={} released={}",
        snapshot.jobs_admitted, snapshot.admissions_rejected, snapshot.slots_released
    );

    Ok(())
}
