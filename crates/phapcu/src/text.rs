//! Vietnamese-aware text folding and formatting.
//!
//! Quote content mixes Vietnamese and English while queries usually arrive
//! from a plain ASCII keyboard. Folding closes the gap: decompose, drop the
//! combining marks, transliterate the stroke letter, lowercase. Both sides of
//! every comparison go through the same fold, so "Thích Nhất Hạnh" and
//! "thich nhat hanh" meet in the middle.

use unicode_normalization::UnicodeNormalization;

/// Normalize text to NFC so visually identical Vietnamese strings compare
/// equal byte-for-byte
pub fn normalize(text: &str) -> String {
  text.nfc().collect()
}

/// Remove Vietnamese diacritics: "Thiền định" becomes "Thien dinh"
///
/// Decomposes to NFD, drops combining marks and maps đ/Đ (a base letter that
/// never decomposes) to d/D. Text without diacritics comes back unchanged.
pub fn strip_diacritics(text: &str) -> String {
  text
    .nfd()
    .filter(|c| !is_combining_mark(*c))
    .map(|c| match c {
      'đ' => 'd',
      'Đ' => 'D',
      other => other,
    })
    .collect()
}

fn is_combining_mark(c: char) -> bool {
  matches!(c, '\u{0300}'..='\u{036f}')
}

fn fold(text: &str, case_sensitive: bool) -> String {
  let stripped = strip_diacritics(text);
  if case_sensitive {
    stripped
  } else {
    stripped.to_lowercase()
  }
}

/// Diacritic-insensitive string equality, case-insensitive unless asked
pub fn equals_fold(a: &str, b: &str, case_sensitive: bool) -> bool {
  fold(a, case_sensitive) == fold(b, case_sensitive)
}

/// Diacritic-insensitive substring test
pub fn contains_fold(haystack: &str, needle: &str, case_sensitive: bool) -> bool {
  fold(haystack, case_sensitive).contains(&fold(needle, case_sensitive))
}

/// Truncate to `max_len` characters at a word boundary, appending `ellipsis`
///
/// Lengths count characters rather than bytes so multi-byte Vietnamese
/// letters are never split. A single word longer than the budget is hard-cut.
pub fn truncate(text: &str, max_len: usize, ellipsis: &str) -> String {
  if text.chars().count() <= max_len {
    return text.to_string();
  }

  let budget = max_len.saturating_sub(ellipsis.chars().count());
  let cut: String = text.chars().take(budget).collect();

  match cut.rfind(char::is_whitespace) {
    Some(boundary) if boundary > 0 => format!("{}{}", &cut[..boundary], ellipsis),
    _ => format!("{cut}{ellipsis}"),
  }
}

/// Count whitespace-delimited words; blank text counts zero
pub fn count_words(text: &str) -> usize {
  text.split_whitespace().count()
}

/// Wrap every word whose folded form contains the folded query in
/// `<tag>`..`</tag>` markers, preserving the original spelling and spacing.
/// A blank query returns the text unchanged.
pub fn highlight(text: &str, query: &str, tag: &str) -> String {
  if query.trim().is_empty() {
    return text.to_string();
  }

  let needle = fold(query, false);
  let mut out = String::with_capacity(text.len());
  let mut rest = text;
  while !rest.is_empty() {
    let in_word = !rest.starts_with(|c: char| c.is_whitespace());
    let end = rest
      .find(|c: char| c.is_whitespace() == in_word)
      .unwrap_or(rest.len());
    let (run, tail) = rest.split_at(end);
    if in_word && fold(run, false).contains(&needle) {
      out.push_str(&format!("<{tag}>{run}</{tag}>"));
    } else {
      out.push_str(run);
    }
    rest = tail;
  }
  out
}
