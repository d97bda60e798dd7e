//! `ldy slots` handlers.

use anyhow::Result;

use super::{load_config, open_desk, parse_date};

pub async fn seed(date: &str, config_paths: Vec<String>) -> Result<()> {
    let date = parse_date(date)?;
    let loaded = load_config(&config_paths)?;
    let desk = open_desk(&loaded).await?;

    let created = desk.seed_day(date).await?;
    for slot in &created {
        println!(
            "slot_created=true slot_id={} date={} time_range={} max_capacity={}",
            slot.id, slot.date, slot.time_range, slot.max_capacity
        );
    }
    println!(
        "seeded={} date={} config_hash={}",
        created.len(),
        date,
        loaded.config_hash
    );
    Ok(())
}

pub async fn list(date: &str) -> Result<()> {
    let date = parse_date(date)?;
    let loaded = load_config(&[])?;
    let desk = open_desk(&loaded).await?;

    let slots = desk.list_available_slots(date).await;
    for slot in &slots {
        println!(
            "slot_id={} time_range={} bookings={}/{} remaining={}",
            slot.id,
            slot.time_range,
            slot.current_bookings,
            slot.max_capacity,
            slot.remaining()
        );
    }
    println!("slots={} date={}", slots.len(), date);
    Ok(())
}
