//! Loading and screening the quote collection.
//!
//! Collections are plain JSON arrays of quotes. A bundled collection ships
//! inside the binary; `--quotes` (or `KHANH_QUOTES`) points at a replacement
//! file in the same format.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use phapcu::quote::Quote;
use phapcu::text;
use tracing::warn;

const BUNDLED: &str = include_str!("../data/quotes.json");

/// Load the collection, NFC-normalize content and drop invalid records with
/// a warning. The pool keeps file order.
pub fn load(path: Option<&Path>) -> Result<Vec<Quote>> {
  let raw = match path {
    Some(path) => fs::read_to_string(path)
      .with_context(|| format!("failed to read quotes file {}", path.display()))?,
    None => BUNDLED.to_string(),
  };
  parse(&raw)
}

fn parse(raw: &str) -> Result<Vec<Quote>> {
  let records: Vec<Quote> =
    serde_json::from_str(raw).context("quotes collection is not valid JSON")?;

  let mut pool = Vec::with_capacity(records.len());
  for mut quote in records {
    quote.content = text::normalize(&quote.content);
    let defects = quote.validate();
    if defects.is_empty() {
      pool.push(quote);
    } else {
      warn!(id = %quote.id, ?defects, "dropping invalid quote");
    }
  }
  Ok(pool)
}
