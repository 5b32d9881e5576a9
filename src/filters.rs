//! Askama template filters.

use crate::config;

/// Map a stored badge gradient to a CSS class string, falling back to
/// the default gradient for definitions that carry none.
///
/// Usage in templates:
/// ```html
/// <div class="badge bg-gradient-to-r {{ achievement.gradient|gradient_class }}">
/// ```
#[askama::filter_fn]
pub fn gradient_class(
    gradient: impl std::fmt::Display,
    _: &dyn askama::Values,
) -> askama::Result<String> {
    let g = gradient.to_string();
    if g.trim().is_empty() {
        Ok(config::DEFAULT_GRADIENT.to_string())
    } else {
        Ok(g)
    }
}
