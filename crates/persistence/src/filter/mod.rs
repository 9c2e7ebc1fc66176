//! Storage-agnostic resource filters.
//!
//! A [`ResourceFilter`] is an ordered list of [`Operation`]s describing which
//! resources a storage call applies to. Each backend translates it exactly once
//! into its native query syntax, so query-building code can be tested without a
//! live database.
//!
//! Filters are persistent values: every builder method borrows the filter and
//! returns a new one. A failed builder call leaves the receiver untouched, and
//! a filter handed to a storage backend can never change afterwards.
//!
//! ```
//! use cms_persistence::filter::{Operator, ResourceFilter};
//!
//! # fn main() -> Result<(), cms_persistence::error::FilterError> {
//! let filter = ResourceFilter::new()
//!     .equal("status", "published")?
//!     .is_in("tag", ["a", "b"])?
//!     .or([
//!         ResourceFilter::new().equal("owner", "u1")?,
//!         ResourceFilter::new().equal("owner", "u2")?,
//!     ]);
//!
//! assert_eq!(filter.len(), 3);
//! assert!(filter.has_operation(Operator::Or));
//! assert!(filter.comparison_operation(Operator::Equal, Some("owner")).is_some());
//! # Ok(())
//! # }
//! ```

mod operation;

use regex::Regex;

use crate::error::{FilterError, FilterResult};

pub use operation::{
    ComparisonOperator, FilterValue, LogicalOperator, MembershipOperator, Operation, Operator,
    Pattern,
};

/// A composable description of the resources a storage call targets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceFilter {
    operations: Vec<Operation>,
}

impl ResourceFilter {
    /// Creates an empty filter, matching every resource.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the operations in insertion order.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Returns the number of top-level operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Returns true if the filter has no operation.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Adds an `equal` operation.
    pub fn equal(
        &self,
        field: impl Into<String>,
        value: impl Into<FilterValue>,
    ) -> FilterResult<Self> {
        self.compare(ComparisonOperator::Equal, field.into(), value.into())
    }

    /// Adds a `notEqual` operation.
    pub fn not_equal(
        &self,
        field: impl Into<String>,
        value: impl Into<FilterValue>,
    ) -> FilterResult<Self> {
        self.compare(ComparisonOperator::NotEqual, field.into(), value.into())
    }

    /// Adds a `greaterThan` operation.
    pub fn greater_than(
        &self,
        field: impl Into<String>,
        value: impl Into<FilterValue>,
    ) -> FilterResult<Self> {
        self.compare(ComparisonOperator::GreaterThan, field.into(), value.into())
    }

    /// Adds a `greaterThanEqual` operation.
    pub fn greater_than_equal(
        &self,
        field: impl Into<String>,
        value: impl Into<FilterValue>,
    ) -> FilterResult<Self> {
        self.compare(ComparisonOperator::GreaterThanEqual, field.into(), value.into())
    }

    /// Adds a `lesserThan` operation.
    pub fn lesser_than(
        &self,
        field: impl Into<String>,
        value: impl Into<FilterValue>,
    ) -> FilterResult<Self> {
        self.compare(ComparisonOperator::LesserThan, field.into(), value.into())
    }

    /// Adds a `lesserThanEqual` operation.
    pub fn lesser_than_equal(
        &self,
        field: impl Into<String>,
        value: impl Into<FilterValue>,
    ) -> FilterResult<Self> {
        self.compare(ComparisonOperator::LesserThanEqual, field.into(), value.into())
    }

    /// Adds an `in` operation: the field must equal one of `values`.
    pub fn is_in<I>(&self, field: impl Into<String>, values: I) -> FilterResult<Self>
    where
        I: IntoIterator,
        I::Item: Into<FilterValue>,
    {
        self.membership(MembershipOperator::In, field.into(), values)
    }

    /// Adds a `notIn` operation: the field must equal none of `values`.
    pub fn not_in<I>(&self, field: impl Into<String>, values: I) -> FilterResult<Self>
    where
        I: IntoIterator,
        I::Item: Into<FilterValue>,
    {
        self.membership(MembershipOperator::NotIn, field.into(), values)
    }

    /// Adds an `exists` operation.
    pub fn exists(&self, field: impl Into<String>, exists: bool) -> FilterResult<Self> {
        let field = validate_field(Operator::Exists, field.into())?;
        Ok(self.with_operation(Operation::Exists { field, exists }))
    }

    /// Adds a `regex` operation.
    pub fn regex(&self, field: impl Into<String>, regex: Regex) -> FilterResult<Self> {
        let field = validate_field(Operator::Regex, field.into())?;
        Ok(self.with_operation(Operation::Regex {
            field,
            pattern: Pattern::new(regex),
        }))
    }

    /// Adds a free-text `search` operation.
    pub fn search(&self, text: impl Into<String>) -> Self {
        self.with_operation(Operation::Search { text: text.into() })
    }

    /// Adds nested filters to the `or` operation.
    ///
    /// Filters join an existing `or` operation when there is one. An empty
    /// group adds nothing and returns an unchanged copy, so
    /// `has_operation(Operator::Or)` stays false; backends such as MongoDB
    /// reject an empty `$or`. The same holds for [`nor`](Self::nor) and
    /// [`and`](Self::and).
    pub fn or(&self, filters: impl IntoIterator<Item = ResourceFilter>) -> Self {
        self.logical(LogicalOperator::Or, filters)
    }

    /// Adds nested filters to the `nor` operation. An empty group adds
    /// nothing.
    pub fn nor(&self, filters: impl IntoIterator<Item = ResourceFilter>) -> Self {
        self.logical(LogicalOperator::Nor, filters)
    }

    /// Adds nested filters to the `and` operation. An empty group adds
    /// nothing.
    pub fn and(&self, filters: impl IntoIterator<Item = ResourceFilter>) -> Self {
        self.logical(LogicalOperator::And, filters)
    }

    /// Returns true if a top-level operation uses `operator`.
    pub fn has_operation(&self, operator: Operator) -> bool {
        self.operations.iter().any(|op| op.operator() == operator)
    }

    /// Finds a logical operation, looking at top-level operations first and
    /// then depth-first into nested filters.
    ///
    /// Returns `None` for non-logical operators.
    pub fn logical_operation(&self, operator: Operator) -> Option<&Operation> {
        if !operator.is_logical() {
            return None;
        }

        if let Some(found) = self.operations.iter().find(|op| op.operator() == operator) {
            return Some(found);
        }

        self.operations
            .iter()
            .filter_map(Operation::filters)
            .flatten()
            .find_map(|nested| nested.logical_operation(operator))
    }

    /// Finds the first comparison operation using `operator` (and bound to
    /// `field` when given), searching nested filters depth-first.
    ///
    /// Returns `None` for logical operators and `search`.
    pub fn comparison_operation(&self, operator: Operator, field: Option<&str>) -> Option<&Operation> {
        if !operator.is_comparison() {
            return None;
        }

        for operation in &self.operations {
            if operation.operator() == operator
                && field.is_none_or(|field| operation.field() == Some(field))
            {
                return Some(operation);
            }

            if let Some(found) = operation
                .filters()
                .into_iter()
                .flatten()
                .find_map(|nested| nested.comparison_operation(operator, field))
            {
                return Some(found);
            }
        }

        None
    }

    /// Returns the text of the first top-level `search` operation.
    pub fn search_text(&self) -> Option<&str> {
        self.operations.iter().find_map(|op| match op {
            Operation::Search { text } => Some(text.as_str()),
            _ => None,
        })
    }

    fn compare(
        &self,
        operator: ComparisonOperator,
        field: String,
        value: FilterValue,
    ) -> FilterResult<Self> {
        let field = validate_field(operator.into(), field)?;
        validate_value(operator.into(), &field, &value)?;
        Ok(self.with_operation(Operation::Compare {
            operator,
            field,
            value,
        }))
    }

    fn membership<I>(
        &self,
        operator: MembershipOperator,
        field: String,
        values: I,
    ) -> FilterResult<Self>
    where
        I: IntoIterator,
        I::Item: Into<FilterValue>,
    {
        let field = validate_field(operator.into(), field)?;
        let values: Vec<FilterValue> = values.into_iter().map(Into::into).collect();
        for value in &values {
            validate_value(operator.into(), &field, value)?;
        }
        Ok(self.with_operation(Operation::Membership {
            operator,
            field,
            values,
        }))
    }

    fn logical(
        &self,
        operator: LogicalOperator,
        filters: impl IntoIterator<Item = ResourceFilter>,
    ) -> Self {
        let mut filters = filters.into_iter().peekable();
        if filters.peek().is_none() {
            return self.clone();
        }

        let mut next = self.clone();
        let existing = next.operations.iter_mut().find_map(|op| match op {
            Operation::Logical {
                operator: current,
                filters,
            } if *current == operator => Some(filters),
            _ => None,
        });

        match existing {
            Some(existing) => existing.extend(filters),
            None => next.operations.push(Operation::Logical {
                operator,
                filters: filters.collect(),
            }),
        }
        next
    }

    fn with_operation(&self, operation: Operation) -> Self {
        let mut operations = Vec::with_capacity(self.operations.len() + 1);
        operations.extend_from_slice(&self.operations);
        operations.push(operation);
        Self { operations }
    }
}

fn validate_field(operator: Operator, field: String) -> FilterResult<String> {
    if field.is_empty() {
        return Err(FilterError::InvalidField { operator });
    }
    Ok(field)
}

fn validate_value(operator: Operator, field: &str, value: &FilterValue) -> FilterResult<()> {
    match value {
        FilterValue::Float(n) if !n.is_finite() => Err(FilterError::InvalidValue {
            operator,
            field: field.to_string(),
            message: "float values must be finite".to_string(),
        }),
        _ => Ok(()),
    }
}
