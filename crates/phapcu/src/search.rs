//! Diacritic-insensitive search and filtering over a quote pool.
//!
//! Everything in this module is pure: callers pass a slice of quotes and get
//! fresh result vectors back. Scores come from a fixed tier table rather than
//! statistics, so the same pool and query always rank identically.

use clap::Args;

use crate::quote::{Language, Quote, QuoteType};
use crate::text;

/// Score assigned when browsing without a text query.
pub const BROWSE_SCORE: f32 = 0.5;

// Relevance tiers per field: exact equality, prefix, substring.
const CONTENT_TIERS: (f32, f32, f32) = (1.0, 0.85, 0.7);
const AUTHOR_TIERS: (f32, f32, f32) = (0.9, 0.75, 0.6);
const CATEGORY_SCORE: f32 = 0.55;
const TAG_SCORE: f32 = 0.5;

/// Which quote attributes matched the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchedField {
  Content,
  Author,
  Category,
  Tags,
}

impl std::fmt::Display for MatchedField {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let name = match self {
      MatchedField::Content => "content",
      MatchedField::Author => "author",
      MatchedField::Category => "category",
      MatchedField::Tags => "tags",
    };
    write!(f, "{name}")
  }
}

/// A scored hit. Higher scores sort first; equal scores keep pool order.
#[derive(Debug, Clone)]
pub struct SearchResult {
  pub quote: Quote,
  pub score: f32,
  pub matched_fields: Vec<MatchedField>,
}

/// Search input: an optional free-text query plus attribute filters and
/// pagination. [`Default`] browses the whole pool.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
  /// Free text matched against content, author, category and tags
  pub query: Option<String>,
  /// Keep only these quote types
  pub types: Option<Vec<QuoteType>>,
  /// Keep only this category (folded equality)
  pub category: Option<String>,
  /// Keep only this language
  pub language: Option<Language>,
  /// Keep quotes carrying at least one of these tags
  pub tags: Option<Vec<String>>,
  /// Match diacritics exactly instead of folding them away
  pub with_diacritics: bool,
  /// Page size; unlimited when absent
  pub limit: Option<usize>,
  /// Results skipped before the page starts
  pub offset: usize,
}

/// Search flags shared by the command line surfaces.
#[derive(Args)]
pub struct SearchArgs {
  /// Restrict to a quote type
  #[arg(short = 't', long = "type", value_enum)]
  pub quote_type: Option<QuoteType>,

  /// Restrict to a category (diacritic-insensitive)
  #[arg(short, long)]
  pub category: Option<String>,

  /// Restrict to a language
  #[arg(short, long, value_enum)]
  pub language: Option<Language>,

  /// Restrict to quotes carrying this tag (repeatable)
  #[arg(long = "tag")]
  pub tags: Vec<String>,

  /// Match diacritics exactly instead of folding them
  #[arg(long)]
  pub with_diacritics: bool,

  /// Maximum number of results to show
  #[arg(long)]
  pub limit: Option<usize>,

  /// Results to skip before the first shown
  #[arg(long, default_value_t = 0)]
  pub offset: usize,
}

impl SearchQuery {
  /// Build an engine query from command line flags plus free search terms.
  pub fn from_args(args: &SearchArgs, terms: &[String]) -> Self {
    let joined = terms.join(" ");
    Self {
      query: if joined.trim().is_empty() { None } else { Some(joined) },
      types: args.quote_type.map(|quote_type| vec![quote_type]),
      category: args.category.clone(),
      language: args.language,
      tags: if args.tags.is_empty() { None } else { Some(args.tags.clone()) },
      with_diacritics: args.with_diacritics,
      limit: args.limit,
      offset: args.offset,
    }
  }
}

/// Filter, score, sort and paginate the pool. Never fails: an empty or fully
/// filtered-out pool yields an empty vec. A blank query skips scoring and
/// returns everything that passes the filters at [`BROWSE_SCORE`].
pub fn search(quotes: &[Quote], query: &SearchQuery) -> Vec<SearchResult> {
  let filtered = quotes.iter().filter(|quote| passes_filters(quote, query));

  let mut results: Vec<SearchResult> = match query.query.as_deref().map(str::trim) {
    None | Some("") => filtered
      .map(|quote| SearchResult {
        quote: quote.clone(),
        score: BROWSE_SCORE,
        matched_fields: Vec::new(),
      })
      .collect(),
    Some(needle) => filtered
      .filter_map(|quote| score_quote(quote, needle, query.with_diacritics))
      .collect(),
  };

  // Stable sort keeps pool order among equal scores
  results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

  results
    .into_iter()
    .skip(query.offset)
    .take(query.limit.unwrap_or(usize::MAX))
    .collect()
}

/// Quotes whose category equals `category` under the fold.
pub fn filter_by_category<'a>(quotes: &'a [Quote], category: &str) -> Vec<&'a Quote> {
  quotes
    .iter()
    .filter(|quote| text::equals_fold(&quote.category, category, false))
    .collect()
}

/// Quotes of the given type.
pub fn filter_by_type(quotes: &[Quote], quote_type: QuoteType) -> Vec<&Quote> {
  quotes.iter().filter(|quote| quote.quote_type == quote_type).collect()
}

/// Quotes in the given language.
pub fn filter_by_language(quotes: &[Quote], language: Language) -> Vec<&Quote> {
  quotes.iter().filter(|quote| quote.language == language).collect()
}

/// Distinct categories across the pool, first-seen spelling, sorted by
/// folded form.
pub fn categories(quotes: &[Quote]) -> Vec<String> {
  distinct(quotes.iter().map(|quote| quote.category.as_str()))
}

/// Distinct tags across the pool, first-seen spelling, sorted by folded form.
pub fn tags(quotes: &[Quote]) -> Vec<String> {
  distinct(quotes.iter().flat_map(|quote| quote.tags.iter().map(String::as_str)))
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
  let mut seen: Vec<(String, String)> = Vec::new();
  for value in values {
    let folded = text::strip_diacritics(value).to_lowercase();
    if !seen.iter().any(|(existing, _)| *existing == folded) {
      seen.push((folded, value.to_string()));
    }
  }
  seen.sort_by(|a, b| a.0.cmp(&b.0));
  seen.into_iter().map(|(_, original)| original).collect()
}

fn passes_filters(quote: &Quote, query: &SearchQuery) -> bool {
  if let Some(types) = &query.types {
    if !types.contains(&quote.quote_type) {
      return false;
    }
  }
  if let Some(category) = &query.category {
    if !text::equals_fold(&quote.category, category, false) {
      return false;
    }
  }
  if let Some(language) = query.language {
    if quote.language != language {
      return false;
    }
  }
  if let Some(tags) = &query.tags {
    let any_tag = tags
      .iter()
      .any(|wanted| quote.tags.iter().any(|tag| text::equals_fold(tag, wanted, false)));
    if !any_tag {
      return false;
    }
  }
  true
}

// The score is the best tier across fields; matched_fields records every
// field that hit, in content/author/category/tags order.
fn score_quote(quote: &Quote, needle: &str, with_diacritics: bool) -> Option<SearchResult> {
  let mut matched_fields = Vec::new();
  let mut score = 0.0_f32;

  if let Some(tier) = field_tier(&quote.content, needle, with_diacritics, CONTENT_TIERS) {
    matched_fields.push(MatchedField::Content);
    score = score.max(tier);
  }
  if let Some(tier) = field_tier(&quote.author, needle, with_diacritics, AUTHOR_TIERS) {
    matched_fields.push(MatchedField::Author);
    score = score.max(tier);
  }
  if folded(&quote.category, with_diacritics).contains(&folded(needle, with_diacritics)) {
    matched_fields.push(MatchedField::Category);
    score = score.max(CATEGORY_SCORE);
  }
  let tag_hit = quote
    .tags
    .iter()
    .any(|tag| folded(tag, with_diacritics).contains(&folded(needle, with_diacritics)));
  if tag_hit {
    matched_fields.push(MatchedField::Tags);
    score = score.max(TAG_SCORE);
  }

  if matched_fields.is_empty() {
    None
  } else {
    Some(SearchResult { quote: quote.clone(), score, matched_fields })
  }
}

fn field_tier(
  field: &str,
  needle: &str,
  with_diacritics: bool,
  (exact, prefix, substring): (f32, f32, f32),
) -> Option<f32> {
  let field = folded(field, with_diacritics);
  let needle = folded(needle, with_diacritics);
  if field == needle {
    Some(exact)
  } else if field.starts_with(&needle) {
    Some(prefix)
  } else if field.contains(&needle) {
    Some(substring)
  } else {
    None
  }
}

// with_diacritics keeps the marks but still folds case and normalization
fn folded(value: &str, with_diacritics: bool) -> String {
  if with_diacritics {
    text::normalize(value).to_lowercase()
  } else {
    text::strip_diacritics(value).to_lowercase()
  }
}
