//! Operators, values and operations carried by a [`ResourceFilter`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ResourceFilter;

/// Every operator a filter operation may carry.
///
/// The textual names are the ones used on the wire by the web layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    /// Field equals value.
    Equal,
    /// Field differs from value.
    NotEqual,
    /// Field is strictly greater than value.
    GreaterThan,
    /// Field is greater than or equal to value.
    GreaterThanEqual,
    /// Field is strictly lesser than value.
    LesserThan,
    /// Field is lesser than or equal to value.
    LesserThanEqual,
    /// Field is one of the values.
    In,
    /// Field is none of the values.
    NotIn,
    /// Field matches a regular expression.
    Regex,
    /// Field is present (or absent).
    Exists,
    /// Free-text search over the resource.
    Search,
    /// At least one nested filter matches.
    Or,
    /// No nested filter matches.
    Nor,
    /// Every nested filter matches.
    And,
}

impl Operator {
    /// All operators, in declaration order.
    pub const ALL: [Operator; 14] = [
        Operator::Equal,
        Operator::NotEqual,
        Operator::GreaterThan,
        Operator::GreaterThanEqual,
        Operator::LesserThan,
        Operator::LesserThanEqual,
        Operator::In,
        Operator::NotIn,
        Operator::Regex,
        Operator::Exists,
        Operator::Search,
        Operator::Or,
        Operator::Nor,
        Operator::And,
    ];

    /// Returns the wire name of the operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equal => "equal",
            Operator::NotEqual => "notEqual",
            Operator::GreaterThan => "greaterThan",
            Operator::GreaterThanEqual => "greaterThanEqual",
            Operator::LesserThan => "lesserThan",
            Operator::LesserThanEqual => "lesserThanEqual",
            Operator::In => "in",
            Operator::NotIn => "notIn",
            Operator::Regex => "regex",
            Operator::Exists => "exists",
            Operator::Search => "search",
            Operator::Or => "or",
            Operator::Nor => "nor",
            Operator::And => "and",
        }
    }

    /// Returns true for `or`, `nor` and `and`.
    pub fn is_logical(&self) -> bool {
        matches!(self, Operator::Or | Operator::Nor | Operator::And)
    }

    /// Returns true for operators bound to a field.
    pub fn is_comparison(&self) -> bool {
        !self.is_logical() && *self != Operator::Search
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::ALL
            .into_iter()
            .find(|operator| operator.as_str() == s)
            .ok_or_else(|| format!("unknown filter operator: {}", s))
    }
}

/// Scalar comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    /// `equal`
    Equal,
    /// `notEqual`
    NotEqual,
    /// `greaterThan`
    GreaterThan,
    /// `greaterThanEqual`
    GreaterThanEqual,
    /// `lesserThan`
    LesserThan,
    /// `lesserThanEqual`
    LesserThanEqual,
}

impl From<ComparisonOperator> for Operator {
    fn from(operator: ComparisonOperator) -> Self {
        match operator {
            ComparisonOperator::Equal => Operator::Equal,
            ComparisonOperator::NotEqual => Operator::NotEqual,
            ComparisonOperator::GreaterThan => Operator::GreaterThan,
            ComparisonOperator::GreaterThanEqual => Operator::GreaterThanEqual,
            ComparisonOperator::LesserThan => Operator::LesserThan,
            ComparisonOperator::LesserThanEqual => Operator::LesserThanEqual,
        }
    }
}

/// Set membership operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MembershipOperator {
    /// `in`
    In,
    /// `notIn`
    NotIn,
}

impl From<MembershipOperator> for Operator {
    fn from(operator: MembershipOperator) -> Self {
        match operator {
            MembershipOperator::In => Operator::In,
            MembershipOperator::NotIn => Operator::NotIn,
        }
    }
}

/// Operators grouping nested filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOperator {
    /// `or`
    Or,
    /// `nor`
    Nor,
    /// `and`
    And,
}

impl From<LogicalOperator> for Operator {
    fn from(operator: LogicalOperator) -> Self {
        match operator {
            LogicalOperator::Or => Operator::Or,
            LogicalOperator::Nor => Operator::Nor,
            LogicalOperator::And => Operator::And,
        }
    }
}

/// A primitive value a field can be compared against.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Text value.
    String(String),
    /// Integral number.
    Integer(i64),
    /// Floating point number.
    Float(f64),
    /// Boolean value.
    Boolean(bool),
    /// Point in time.
    Date(DateTime<Utc>),
}

impl FilterValue {
    /// Returns the JSON representation used when comparing against stored
    /// resources. Dates are rendered as RFC 3339 strings.
    pub fn to_json(&self) -> Value {
        match self {
            FilterValue::String(s) => Value::String(s.clone()),
            FilterValue::Integer(n) => Value::from(*n),
            FilterValue::Float(n) => Value::from(*n),
            FilterValue::Boolean(b) => Value::Bool(*b),
            FilterValue::Date(d) => Value::String(d.to_rfc3339_opts(SecondsFormat::Millis, true)),
        }
    }

    /// Returns a short name of the value type.
    pub fn kind(&self) -> &'static str {
        match self {
            FilterValue::String(_) => "string",
            FilterValue::Integer(_) => "integer",
            FilterValue::Float(_) => "float",
            FilterValue::Boolean(_) => "boolean",
            FilterValue::Date(_) => "date",
        }
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::String(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        FilterValue::String(s)
    }
}

impl From<&String> for FilterValue {
    fn from(s: &String) -> Self {
        FilterValue::String(s.clone())
    }
}

impl From<i64> for FilterValue {
    fn from(n: i64) -> Self {
        FilterValue::Integer(n)
    }
}

impl From<i32> for FilterValue {
    fn from(n: i32) -> Self {
        FilterValue::Integer(n.into())
    }
}

impl From<u32> for FilterValue {
    fn from(n: u32) -> Self {
        FilterValue::Integer(n.into())
    }
}

impl From<f64> for FilterValue {
    fn from(n: f64) -> Self {
        FilterValue::Float(n)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        FilterValue::Boolean(b)
    }
}

impl From<DateTime<Utc>> for FilterValue {
    fn from(d: DateTime<Utc>) -> Self {
        FilterValue::Date(d)
    }
}

/// A compiled regular expression used by the `regex` operator.
///
/// Two patterns are equal when their source strings are equal.
#[derive(Debug, Clone)]
pub struct Pattern(Regex);

impl Pattern {
    /// Wraps a compiled regular expression.
    pub fn new(regex: Regex) -> Self {
        Self(regex)
    }

    /// Returns the source of the regular expression.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the compiled regular expression.
    pub fn regex(&self) -> &Regex {
        &self.0
    }

    /// Tests a string against the pattern.
    pub fn is_match(&self, haystack: &str) -> bool {
        self.0.is_match(haystack)
    }
}

impl From<Regex> for Pattern {
    fn from(regex: Regex) -> Self {
        Self(regex)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Serialize for Pattern {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A single operation of a [`ResourceFilter`].
///
/// Each variant carries only what its operator family needs.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Scalar comparison of a field against a value.
    Compare {
        operator: ComparisonOperator,
        field: String,
        value: FilterValue,
    },
    /// Membership of a field in a list of values.
    Membership {
        operator: MembershipOperator,
        field: String,
        values: Vec<FilterValue>,
    },
    /// Presence of a field.
    Exists { field: String, exists: bool },
    /// Regular expression match on a field.
    Regex { field: String, pattern: Pattern },
    /// Logical grouping of nested filters.
    Logical {
        operator: LogicalOperator,
        filters: Vec<ResourceFilter>,
    },
    /// Free-text search.
    Search { text: String },
}

impl Operation {
    /// Returns the operator of the operation.
    pub fn operator(&self) -> Operator {
        match self {
            Operation::Compare { operator, .. } => (*operator).into(),
            Operation::Membership { operator, .. } => (*operator).into(),
            Operation::Exists { .. } => Operator::Exists,
            Operation::Regex { .. } => Operator::Regex,
            Operation::Logical { operator, .. } => (*operator).into(),
            Operation::Search { .. } => Operator::Search,
        }
    }

    /// Returns the field the operation applies to, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            Operation::Compare { field, .. }
            | Operation::Membership { field, .. }
            | Operation::Exists { field, .. }
            | Operation::Regex { field, .. } => Some(field),
            Operation::Logical { .. } | Operation::Search { .. } => None,
        }
    }

    /// Returns the nested filters of a logical operation.
    pub fn filters(&self) -> Option<&[ResourceFilter]> {
        match self {
            Operation::Logical { filters, .. } => Some(filters),
            _ => None,
        }
    }

    /// Returns the scalar value of a comparison operation.
    pub fn value(&self) -> Option<&FilterValue> {
        match self {
            Operation::Compare { value, .. } => Some(value),
            _ => None,
        }
    }
}
