//! Sequential display numbers for new challenges and people.
//!
//! Numbers are derived from the current collection, never from the opaque
//! id. Freed numbers are not reused. Nothing here serializes allocation across
//! sessions: two sessions creating at once can receive the same number.

use crate::{Challenge, Person};

/// Entities that carry a human-facing sequence number.
pub trait Numbered {
    fn sequence_number(&self) -> i64;
}

impl Numbered for Challenge {
    fn sequence_number(&self) -> i64 {
        self.display_number
    }
}

impl Numbered for Person {
    fn sequence_number(&self) -> i64 {
        self.enrollment_number
    }
}

/// Next number after the largest valid value of `field`, or 1.
///
/// Values that are missing or `<= 0` are ignored.
pub fn next_number<T, F>(items: &[T], field: F) -> i64
where
    F: Fn(&T) -> Option<i64>,
{
    items
        .iter()
        .filter_map(|item| field(item))
        .filter(|n| *n > 0)
        .max()
        .map_or(1, |max| max.saturating_add(1))
}

/// [`next_number`] over the entity's own sequence field.
pub fn next_sequence<T: Numbered>(items: &[T]) -> i64 {
    next_number(items, |item| Some(item.sequence_number()))
}
