//! Unlock notifications.
//!
//! Resolves newly-unlocked ids against the loaded definitions into toast
//! view-models for the response, logging each unlock. Ids that no longer
//! resolve (definition deleted mid-flight) are skipped.

use crate::config;
use crate::domain::AchievementDefinition;

/// Display payload for one unlock toast
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AchievementToast {
  pub id: String,
  pub title: String,
  pub icon: String,
  pub gradient: String,
}

/// Build toasts for newly-unlocked ids, preserving unlock order
pub fn toasts_for(
  definitions: &[AchievementDefinition],
  newly_unlocked: &[String],
) -> Vec<AchievementToast> {
  newly_unlocked
    .iter()
    .filter_map(|id| {
      let def = definitions.iter().find(|d| &d.id == id)?;
      tracing::info!("Unlocked achievement: {}", def.title);
      Some(AchievementToast {
        id: def.id.clone(),
        title: def.title.clone(),
        icon: def.icon.clone(),
        gradient: def
          .gradient
          .clone()
          .unwrap_or_else(|| config::DEFAULT_GRADIENT.to_string()),
      })
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::AchievementKind;

  fn def(id: &str, title: &str, gradient: Option<&str>) -> AchievementDefinition {
    AchievementDefinition {
      id: id.to_string(),
      title: title.to_string(),
      description: String::new(),
      kind: AchievementKind::TotalQuestions,
      target: 50,
      icon: "trophy".to_string(),
      gradient: gradient.map(|g| g.to_string()),
    }
  }

  #[test]
  fn test_toasts_preserve_unlock_order() {
    let definitions = vec![
      def("total_50", "Beginner", Some("from-purple-400 to-pink-500")),
      def("total_100", "Language Lover", None),
    ];
    let toasts = toasts_for(
      &definitions,
      &["total_100".to_string(), "total_50".to_string()],
    );
    assert_eq!(toasts.len(), 2);
    assert_eq!(toasts[0].title, "Language Lover");
    assert_eq!(toasts[1].title, "Beginner");
  }

  #[test]
  fn test_missing_definition_skipped() {
    let definitions = vec![def("total_50", "Beginner", None)];
    let toasts = toasts_for(
      &definitions,
      &["gone_10".to_string(), "total_50".to_string()],
    );
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].id, "total_50");
  }

  #[test]
  fn test_default_gradient_applied() {
    let definitions = vec![def("total_50", "Beginner", None)];
    let toasts = toasts_for(&definitions, &["total_50".to_string()]);
    assert_eq!(toasts[0].gradient, crate::config::DEFAULT_GRADIENT);
  }
}
