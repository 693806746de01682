//! Evaluates queries against feature attribute maps.

use std::cmp::Ordering;

use crate::layer::AttributeMap;
use crate::query::condition::{AttributeCondition, ConditionOp};
use crate::query::text_match;
use crate::query::{Combinator, Query};
use crate::value::{ordered_compare, values_equal, AttributeValue};

/// Evaluates one condition against the attributes of a single feature.
///
/// A field absent from the map behaves as absent, not as an error: every
/// operator yields false except `IsEmpty`, which yields true.
pub fn evaluate_condition(attributes: &AttributeMap, condition: &AttributeCondition) -> bool {
    let value = match attributes.get(&condition.field) {
        Some(value) => value,
        None => return matches!(condition.op, ConditionOp::IsEmpty),
    };
    match &condition.op {
        ConditionOp::Equals(operand) => values_equal(value, operand),
        ConditionOp::NotEquals(operand) => !values_equal(value, operand),
        ConditionOp::Contains(text) => textual(value, |s| text_match::contains_ci(s, text)),
        ConditionOp::StartsWith(text) => textual(value, |s| text_match::starts_with_ci(s, text)),
        ConditionOp::EndsWith(text) => textual(value, |s| text_match::ends_with_ci(s, text)),
        ConditionOp::GreaterThan(operand) => {
            ordered_compare(value, operand) == Some(Ordering::Greater)
        }
        ConditionOp::LessThan(operand) => ordered_compare(value, operand) == Some(Ordering::Less),
        ConditionOp::Between(low, high) => {
            matches!(
                ordered_compare(value, low),
                Some(Ordering::Greater | Ordering::Equal)
            ) && matches!(
                ordered_compare(value, high),
                Some(Ordering::Less | Ordering::Equal)
            )
        }
        ConditionOp::IsEmpty => value.is_empty(),
    }
}

fn textual(value: &AttributeValue, predicate: impl Fn(&str) -> bool) -> bool {
    value.as_text().is_some_and(|text| predicate(&text))
}

/// Folds all conditions with the query combinator. An empty condition list
/// is vacuously true so the free word can carry the query alone.
pub fn conditions_match(attributes: &AttributeMap, query: &Query) -> bool {
    if query.conditions.is_empty() {
        return true;
    }
    match query.combinator {
        Combinator::And => query
            .conditions
            .iter()
            .all(|condition| evaluate_condition(attributes, condition)),
        Combinator::Or => query
            .conditions
            .iter()
            .any(|condition| evaluate_condition(attributes, condition)),
    }
}

/// Number of attribute fields whose text rendering contains the free word.
fn free_word_hits(attributes: &AttributeMap, word: &str) -> usize {
    attributes
        .values()
        .filter(|value| {
            value
                .as_text()
                .is_some_and(|text| text_match::contains_ci(&text, word))
        })
        .count()
}

/// Full match decision for one feature. Returns a relevance score when the
/// feature matches, `None` otherwise.
///
/// The free word and the condition set are both gates: when both are
/// present, a feature must pass the free word somewhere in its attributes
/// and pass the combined conditions. The score counts free-word field hits
/// plus individually satisfied conditions, so a feature matching more of
/// the query sorts ahead under relevance ordering.
pub fn feature_match_score(attributes: &AttributeMap, query: &Query) -> Option<i64> {
    let word_hits = match query.free_word() {
        Some(word) => {
            let hits = free_word_hits(attributes, word);
            if hits == 0 {
                return None;
            }
            hits
        }
        None => 0,
    };
    if !conditions_match(attributes, query) {
        return None;
    }
    let condition_hits = query
        .conditions
        .iter()
        .filter(|condition| evaluate_condition(attributes, condition))
        .count();
    Some((word_hits + condition_hits) as i64)
}
