//! Command handler modules for ldy-cli.
//!
//! Shared utilities used by multiple command paths live here.
//! Command-specific logic lives in the submodules.

pub mod barcode;
pub mod order;
pub mod slots;

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use ldy_config::LoadedConfig;
use ldy_core::{BookingRules, LaundryDesk};
use tracing::debug;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Parse a CLI `--date` string (YYYY-MM-DD).
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .with_context(|| format!("invalid --date '{}'. expected YYYY-MM-DD", raw))
}

/// Explicit paths win; otherwise fall back to `LDY_CONFIG` (or defaults).
pub fn load_config(config_paths: &[String]) -> Result<LoadedConfig> {
    if config_paths.is_empty() {
        return ldy_config::load_from_env();
    }
    let path_refs: Vec<&str> = config_paths.iter().map(|s| s.as_str()).collect();
    ldy_config::load_layered_yaml(&path_refs)
}

/// Connect to Postgres and wrap it in a desk with rules from `loaded`.
pub async fn open_desk(loaded: &LoadedConfig) -> Result<LaundryDesk> {
    let cfg = loaded.laundry()?;
    let pool = ldy_db::connect_from_env().await?;
    debug!(config_hash = %loaded.config_hash, "desk opened");
    Ok(LaundryDesk::new(
        Arc::new(ldy_db::PgStore::new(pool)),
        BookingRules::from_config(&cfg),
    ))
}
