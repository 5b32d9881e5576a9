//! Answer validation for the free-text games.
//!
//! Typed answers are compared after Unicode NFC normalization, case
//! folding, and whitespace collapsing, so "  hello " matches "Hello"
//! and composed/decomposed Arabic forms compare equal.

use unicode_normalization::UnicodeNormalization;

/// Canonical form used for comparison
fn canonicalize(s: &str) -> String {
  s.nfc()
    .collect::<String>()
    .to_lowercase()
    .split_whitespace()
    .collect::<Vec<_>>()
    .join(" ")
}

/// True when a typed answer matches the expected one
pub fn answers_match(expected: &str, given: &str) -> bool {
  !expected.trim().is_empty() && canonicalize(expected) == canonicalize(given)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_exact_match() {
    assert!(answers_match("apple", "apple"));
  }

  #[test]
  fn test_case_insensitive() {
    assert!(answers_match("Apple", "aPPLe"));
  }

  #[test]
  fn test_whitespace_tolerant() {
    assert!(answers_match("ice cream", "  ice   cream "));
  }

  #[test]
  fn test_wrong_answer_rejected() {
    assert!(!answers_match("apple", "apples"));
    assert!(!answers_match("apple", ""));
  }

  #[test]
  fn test_empty_expected_never_matches() {
    assert!(!answers_match("", ""));
    assert!(!answers_match("  ", "  "));
  }

  #[test]
  fn test_unicode_normalization() {
    // é as a single code point vs e + combining acute
    assert!(answers_match("caf\u{e9}", "cafe\u{301}"));
  }
}
