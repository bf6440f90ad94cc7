//! Quote records, their classification enums and validation.
//!
//! The JSON representation uses camelCase keys and compact language codes so
//! collections are interchangeable with the web and mobile shells.

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::text;

/// Longest content accepted by [`Quote::validate`], in characters.
pub const MAX_CONTENT_CHARS: usize = 5000;

/// Content classification for a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum QuoteType {
  BuddhistQuote,
  LifeLesson,
  Proverb,
  /// Vietnamese folk verse
  CaDao,
  WisdomSaying,
}

/// Language of the quote content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum Language {
  #[serde(rename = "vi")]
  #[value(alias = "vi")]
  Vietnamese,
  #[serde(rename = "en")]
  #[value(alias = "en")]
  English,
  #[serde(rename = "vi-en")]
  #[value(alias = "vi-en")]
  Bilingual,
}

/// A single quote. The engines select among quotes and never rewrite them;
/// whoever owns the collection owns mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
  pub id: Uuid,
  /// Quote text, NFC-normalized so identical Vietnamese renders identically
  pub content: String,
  /// Attribution, or "Unknown"/"Traditional" where none survives
  pub author: String,
  #[serde(rename = "type")]
  pub quote_type: QuoteType,
  pub category: String,
  pub tags: Vec<String>,
  pub language: Language,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// A single defect reported by [`Quote::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("content is required")]
  EmptyContent,
  #[error("content exceeds {MAX_CONTENT_CHARS} characters")]
  ContentTooLong,
  #[error("author is required")]
  EmptyAuthor,
  #[error("category is required")]
  EmptyCategory,
}

impl Quote {
  /// Create a quote with a fresh id and current timestamps. Content is
  /// NFC-normalized on the way in.
  pub fn new(
    content: &str,
    author: &str,
    quote_type: QuoteType,
    category: &str,
    tags: &[&str],
    language: Language,
  ) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      content: text::normalize(content),
      author: author.to_string(),
      quote_type,
      category: category.to_string(),
      tags: tags.iter().map(|tag| tag.to_string()).collect(),
      language,
      created_at: now,
      updated_at: now,
    }
  }

  /// Report every defect in this quote; an empty list means valid.
  pub fn validate(&self) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if self.content.trim().is_empty() {
      errors.push(ValidationError::EmptyContent);
    }
    if self.content.chars().count() > MAX_CONTENT_CHARS {
      errors.push(ValidationError::ContentTooLong);
    }
    if self.author.trim().is_empty() {
      errors.push(ValidationError::EmptyAuthor);
    }
    if self.category.trim().is_empty() {
      errors.push(ValidationError::EmptyCategory);
    }
    errors
  }
}
