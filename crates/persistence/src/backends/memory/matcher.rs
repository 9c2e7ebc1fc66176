//! Evaluation of resource filters against JSON resources.

use std::cmp::Ordering;

use chrono::DateTime;
use serde_json::Value;

use crate::filter::{ComparisonOperator, FilterValue, LogicalOperator, MembershipOperator};
use crate::filter::{Operation, ResourceFilter};

use super::document;

/// Returns true if `resource` satisfies every operation of `filter`.
pub(crate) fn matches(resource: &Value, filter: &ResourceFilter) -> bool {
    filter
        .operations()
        .iter()
        .all(|operation| matches_operation(resource, operation))
}

fn matches_operation(resource: &Value, operation: &Operation) -> bool {
    match operation {
        Operation::Compare {
            operator,
            field,
            value,
        } => {
            let candidates = candidates(resource, field);
            match operator {
                ComparisonOperator::Equal => candidates.iter().any(|c| equals(c, value)),
                ComparisonOperator::NotEqual => !candidates.iter().any(|c| equals(c, value)),
                ComparisonOperator::GreaterThan => any_ordering(&candidates, value, |o| o.is_gt()),
                ComparisonOperator::GreaterThanEqual => {
                    any_ordering(&candidates, value, |o| o.is_ge())
                }
                ComparisonOperator::LesserThan => any_ordering(&candidates, value, |o| o.is_lt()),
                ComparisonOperator::LesserThanEqual => {
                    any_ordering(&candidates, value, |o| o.is_le())
                }
            }
        }
        Operation::Membership {
            operator,
            field,
            values,
        } => {
            let candidates = candidates(resource, field);
            let found = candidates
                .iter()
                .any(|c| values.iter().any(|value| equals(c, value)));
            match operator {
                MembershipOperator::In => found,
                MembershipOperator::NotIn => !found,
            }
        }
        Operation::Exists { field, exists } => document::contains(resource, field) == *exists,
        Operation::Regex { field, pattern } => candidates(resource, field)
            .iter()
            .filter_map(|c| c.as_str())
            .any(|s| pattern.is_match(s)),
        Operation::Logical { operator, filters } => match operator {
            LogicalOperator::Or => filters.iter().any(|f| matches(resource, f)),
            LogicalOperator::Nor => !filters.iter().any(|f| matches(resource, f)),
            LogicalOperator::And => filters.iter().all(|f| matches(resource, f)),
        },
        Operation::Search { text } => text_score(resource, text) > 0.0,
    }
}

/// Values a field operation is evaluated against: every value at the path,
/// plus the elements of arrays found there.
fn candidates<'a>(resource: &'a Value, field: &str) -> Vec<&'a Value> {
    let mut candidates = Vec::new();
    for value in document::lookup(resource, field) {
        if let Value::Array(items) = value {
            candidates.extend(items.iter());
        }
        candidates.push(value);
    }
    candidates
}

fn equals(candidate: &Value, value: &FilterValue) -> bool {
    compare(candidate, value) == Some(Ordering::Equal)
}

fn any_ordering(candidates: &[&Value], value: &FilterValue, accept: fn(Ordering) -> bool) -> bool {
    candidates
        .iter()
        .filter_map(|c| compare(c, value))
        .any(accept)
}

/// Orders a stored value against a filter value.
///
/// Only values of the same type are comparable. Dates match RFC 3339
/// strings and epoch milliseconds.
fn compare(candidate: &Value, value: &FilterValue) -> Option<Ordering> {
    match (candidate, value) {
        (Value::String(s), FilterValue::String(v)) => Some(s.as_str().cmp(v.as_str())),
        (Value::Number(n), FilterValue::Integer(v)) => match n.as_i64() {
            Some(n) => Some(n.cmp(v)),
            None => n.as_f64()?.partial_cmp(&(*v as f64)),
        },
        (Value::Number(n), FilterValue::Float(v)) => n.as_f64()?.partial_cmp(v),
        (Value::Bool(b), FilterValue::Boolean(v)) => Some(b.cmp(v)),
        (Value::String(s), FilterValue::Date(v)) => {
            let date = DateTime::parse_from_rfc3339(s).ok()?;
            Some(date.to_utc().cmp(v))
        }
        (Value::Number(n), FilterValue::Date(v)) => Some(n.as_i64()?.cmp(&v.timestamp_millis())),
        _ => None,
    }
}

/// Relevance of `resource` for a free-text query.
///
/// The query is split on whitespace; terms prefixed with `-` exclude
/// resources containing them. The score is the number of occurrences of
/// the positive terms among the words of every string in the resource,
/// compared case-insensitively. Zero means no match.
pub(crate) fn text_score(resource: &Value, text: &str) -> f64 {
    let mut positive = Vec::new();
    let mut negative = Vec::new();
    for term in text.split_whitespace() {
        match term.strip_prefix('-') {
            Some(term) if !term.is_empty() => negative.push(term.to_lowercase()),
            Some(_) => {}
            None => positive.push(term.to_lowercase()),
        }
    }

    let mut words = Vec::new();
    collect_words(resource, &mut words);

    if words.iter().any(|word| negative.contains(word)) {
        return 0.0;
    }

    words.iter().filter(|word| positive.contains(word)).count() as f64
}

fn collect_words(value: &Value, words: &mut Vec<String>) {
    match value {
        Value::String(s) => words.extend(
            s.split(|c: char| !c.is_alphanumeric())
                .filter(|word| !word.is_empty())
                .map(str::to_lowercase),
        ),
        Value::Array(items) => items.iter().for_each(|item| collect_words(item, words)),
        Value::Object(map) => map.values().for_each(|item| collect_words(item, words)),
        _ => {}
    }
}
