use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use colored::*;

use phapcu::quote::Quote;
use phapcu::rotation::{RotationConfig, RotationEngine};
use phapcu::search::{SearchArgs, SearchQuery, SearchResult};
use phapcu::{search, text};

/// Search the collection and print scored matches
pub fn search_quotes(pool: &[Quote], options: &SearchArgs, terms: &[String]) -> Result<()> {
  let query = SearchQuery::from_args(options, terms);
  let needle = query.query.clone().unwrap_or_default();
  let results = search::search(pool, &query);

  if results.is_empty() {
    println!("No quotes match '{}'", needle.yellow());
    return Ok(());
  }

  for result in &results {
    print_result(result, &needle);
  }
  println!();
  println!("{} matching quote(s)", results.len().to_string().green());
  Ok(())
}

/// Browse the collection with attribute filters but no text query
pub fn list_quotes(pool: &[Quote], options: &SearchArgs) -> Result<()> {
  let query = SearchQuery::from_args(options, &[]);
  let results = search::search(pool, &query);

  if results.is_empty() {
    println!("No quotes to show");
    return Ok(());
  }

  for result in &results {
    print_quote(&result.quote);
  }
  println!();
  println!("{} quote(s)", results.len().to_string().green());
  Ok(())
}

/// Print one random quote, no recent-window involved
pub fn random_quote(pool: &[Quote]) -> Result<()> {
  let engine = RotationEngine::new();
  let quote = engine.random_quote(pool)?;
  print_quote(&quote);
  Ok(())
}

/// Rotate quotes in the foreground until Ctrl-C
pub async fn rotate_quotes(pool: Vec<Quote>, interval_secs: u64, recent_limit: usize) -> Result<()> {
  let engine = RotationEngine::with_config(RotationConfig {
    interval: Duration::from_secs(interval_secs),
    recent_quotes_limit: recent_limit,
  });
  engine.subscribe(|quote| print_quote(quote));

  let pool = Arc::new(pool);
  let first = engine.start(&pool)?;
  println!(
    "Rotating {} quotes every {}s, Ctrl-C to stop",
    pool.len().to_string().cyan(),
    engine.config().interval.as_secs().to_string().yellow()
  );
  print_quote(&first);

  tokio::signal::ctrl_c().await?;
  engine.stop();
  println!();
  println!("{} rotation stopped", "✓".green());
  Ok(())
}

/// List categories with their quote counts
pub fn list_categories(pool: &[Quote]) -> Result<()> {
  let listed = search::categories(pool);
  if listed.is_empty() {
    println!("No categories");
    return Ok(());
  }
  for category in &listed {
    let count = search::filter_by_category(pool, category).len();
    println!("{}  {}", format!("{count:>4}").green(), category.cyan());
  }
  Ok(())
}

/// List tags with their quote counts
pub fn list_tags(pool: &[Quote]) -> Result<()> {
  let listed = search::tags(pool);
  if listed.is_empty() {
    println!("No tags");
    return Ok(());
  }
  for tag in &listed {
    let count = pool
      .iter()
      .filter(|quote| quote.tags.iter().any(|t| text::equals_fold(t, tag, false)))
      .count();
    println!("{}  {}", format!("{count:>4}").green(), tag.cyan());
  }
  Ok(())
}

fn print_quote(quote: &Quote) {
  println!();
  println!("  {}", quote.content.bold());
  println!("  {} {}", "—".dimmed(), quote.author.cyan());
  if quote.tags.is_empty() {
    println!("  {}", quote.category.yellow());
  } else {
    println!("  {}  {}", quote.category.yellow(), quote.tags.join(", ").dimmed());
  }
}

fn print_result(result: &SearchResult, needle: &str) {
  let content = text::truncate(&result.quote.content, 200, "...");
  let matched = result
    .matched_fields
    .iter()
    .map(|field| field.to_string())
    .collect::<Vec<_>>()
    .join(", ");
  println!();
  println!("  {}", paint_matches(&content, needle));
  println!(
    "  {} {}  {}  {}",
    "—".dimmed(),
    result.quote.author.cyan(),
    result.quote.category.yellow(),
    format!("{:.2} via {matched}", result.score).dimmed()
  );
}

// Terminal flavor of highlighting: paint matching words instead of wrapping
// them in markup.
fn paint_matches(content: &str, needle: &str) -> String {
  if needle.trim().is_empty() {
    return content.to_string();
  }
  let mut out = String::with_capacity(content.len());
  let mut rest = content;
  while !rest.is_empty() {
    let in_word = !rest.starts_with(|c: char| c.is_whitespace());
    let end = rest
      .find(|c: char| c.is_whitespace() == in_word)
      .unwrap_or(rest.len());
    let (run, tail) = rest.split_at(end);
    if in_word && text::contains_fold(run, needle, false) {
      out.push_str(&run.yellow().bold().to_string());
    } else {
      out.push_str(run);
    }
    rest = tail;
  }
  out
}
