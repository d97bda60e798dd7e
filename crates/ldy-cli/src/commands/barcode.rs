//! `ldy barcode` handlers. Pure, no database.

use std::fs;

use anyhow::{bail, Context, Result};
use ldy_core::barcode;

pub fn token() {
    println!("{}", barcode::generate_token());
}

pub fn render(text: &str, out: Option<&str>) -> Result<()> {
    let text = text.trim();
    if text.is_empty() {
        bail!("--text must not be blank");
    }

    let pbm = barcode::render_barcode(text).to_pbm();
    match out {
        Some(path) => {
            fs::write(path, &pbm).with_context(|| format!("write barcode image failed: {path}"))?;
            println!("barcode_written=true path={} token={}", path, text);
        }
        None => print!("{pbm}"),
    }
    Ok(())
}
