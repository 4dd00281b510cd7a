//! Name normalization, uniqueness and ordering.

use crate::{Challenge, EntityType, Person, ValidationError};
use std::cmp::Ordering;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Entities with a user-visible name that must be unique.
pub trait Named {
    fn name(&self) -> &str;
}

impl Named for Challenge {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Person {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Trimmed, lowercased form used for comparisons.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Whether `proposed` already exists in `items`, ignoring case and
/// surrounding whitespace.
pub fn name_exists<T: Named>(items: &[T], proposed: &str) -> bool {
    let wanted = normalize_name(proposed);
    items.iter().any(|item| normalize_name(item.name()) == wanted)
}

/// Required-field check followed by the duplicate check.
///
/// Returns the trimmed name to store.
pub fn validate_new_name<T: Named>(
    items: &[T],
    proposed: &str,
    entity_type: EntityType,
) -> Result<String, ValidationError> {
    let trimmed = proposed.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::RequiredName { entity_type });
    }
    if name_exists(items, trimmed) {
        return Err(ValidationError::DuplicateName {
            entity_type,
            name: trimmed.to_string(),
        });
    }
    Ok(trimmed.to_string())
}

/// Primary collation key: decomposed, accents stripped, lowercased.
fn collation_key(name: &str) -> String {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Ascending display order for names.
///
/// Base letters decide first, so `Ágata` sorts with the `a`s. Accents and
/// case only break ties.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Item(&'static str);

    impl Named for Item {
        fn name(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn test_name_exists_ignores_case_and_whitespace() {
        assert!(name_exists(&[Item("Ana ")], "ana"));
        assert!(name_exists(&[Item("QUIZ")], "  quiz  "));
    }

    #[test]
    fn test_name_exists_is_not_a_prefix_match() {
        assert!(!name_exists(&[Item("Ana")], "Anabela"));
        assert!(!name_exists::<Item>(&[], "Ana"));
    }

    #[test]
    fn test_validate_new_name() {
        let items = [Item("Quiz")];
        assert_eq!(
            validate_new_name(&items, "  Quiz ", EntityType::Challenge),
            Err(ValidationError::DuplicateName {
                entity_type: EntityType::Challenge,
                name: "Quiz".to_string(),
            })
        );
        assert_eq!(
            validate_new_name(&items, "   ", EntityType::Challenge),
            Err(ValidationError::RequiredName {
                entity_type: EntityType::Challenge,
            })
        );
        assert_eq!(
            validate_new_name(&items, " Relay ", EntityType::Challenge),
            Ok("Relay".to_string())
        );
    }

    #[test]
    fn test_compare_names() {
        assert_eq!(compare_names("ana", "Bruno"), Ordering::Less);
        assert_eq!(compare_names("Bruno", "ana"), Ordering::Greater);
        assert_eq!(compare_names("Ana", "Ana"), Ordering::Equal);
        assert_ne!(compare_names("Ana", "ana"), Ordering::Equal);
    }

    #[test]
    fn test_compare_names_ignores_accents_first() {
        assert_eq!(compare_names("Ágata", "Zeca"), Ordering::Less);
        assert_eq!(compare_names("Élio", "Eva"), Ordering::Less);
        assert_eq!(compare_names("Zoë", "Zoe"), Ordering::Greater);

        let mut names = vec!["Zeca", "Ágata", "Bruno", "agnes"];
        names.sort_by(|a, b| compare_names(a, b));
        assert_eq!(names, vec!["Ágata", "agnes", "Bruno", "Zeca"]);
    }

    #[test]
    fn test_name_exists_with_accented_names() {
        assert!(name_exists(&[Item("Ágata")], "  ÁGATA "));
        assert!(!name_exists(&[Item("Ágata")], "Agata"));
    }
}
