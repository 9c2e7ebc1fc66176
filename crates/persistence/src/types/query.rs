//! Query options shared by every storage backend.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::filter::ResourceFilter;

/// Selection of the fields returned for each resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Projection {
    /// Only these fields are returned.
    Include(Vec<String>),
    /// Every field except these is returned.
    Exclude(Vec<String>),
}

impl Projection {
    /// Creates an include projection.
    pub fn include<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Projection::Include(fields.into_iter().map(Into::into).collect())
    }

    /// Creates an exclude projection.
    pub fn exclude<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Projection::Exclude(fields.into_iter().map(Into::into).collect())
    }

    /// Builds a projection from optional include and exclude lists.
    ///
    /// `include` takes precedence when both are present.
    pub fn from_parts(include: Option<Vec<String>>, exclude: Option<Vec<String>>) -> Option<Self> {
        match (include, exclude) {
            (Some(include), _) => Some(Projection::Include(include)),
            (None, Some(exclude)) => Some(Projection::Exclude(exclude)),
            (None, None) => None,
        }
    }

    /// Returns the listed fields.
    pub fn fields(&self) -> &[String] {
        match self {
            Projection::Include(fields) | Projection::Exclude(fields) => fields,
        }
    }

    /// Returns true for include projections.
    pub fn is_include(&self) -> bool {
        matches!(self, Projection::Include(_))
    }
}

/// Ordering of a sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending order.
    Asc,
    /// Descending order.
    Desc,
    /// Descending text-search relevance. Only meaningful with a `search`
    /// operation.
    Score,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "asc"),
            SortOrder::Desc => write!(f, "desc"),
            SortOrder::Score => write!(f, "score"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            "score" => Ok(SortOrder::Score),
            _ => Err(format!("unknown sort order: {}", s)),
        }
    }
}

/// Ordered list of sort keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    keys: Vec<(String, SortOrder)>,
}

impl Sort {
    /// Creates an empty sort (backend-natural order).
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a sort key.
    ///
    /// A field already in the sort keeps its first order; later keys on it
    /// are ignored.
    pub fn by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        let field = field.into();
        if !self.keys.iter().any(|(existing, _)| *existing == field) {
            self.keys.push((field, order));
        }
        self
    }

    /// Appends an ascending key.
    pub fn asc(self, field: impl Into<String>) -> Self {
        self.by(field, SortOrder::Asc)
    }

    /// Appends a descending key.
    pub fn desc(self, field: impl Into<String>) -> Self {
        self.by(field, SortOrder::Desc)
    }

    /// Appends a relevance key; `field` names the projected score.
    pub fn score(self, field: impl Into<String>) -> Self {
        self.by(field, SortOrder::Score)
    }

    /// Returns the sort keys in priority order.
    pub fn keys(&self) -> &[(String, SortOrder)] {
        &self.keys
    }

    /// Returns true if no key is set.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Returns the field of the first relevance key, if any.
    pub fn score_field(&self) -> Option<&str> {
        self.keys
            .iter()
            .find(|(_, order)| *order == SortOrder::Score)
            .map(|(field, _)| field.as_str())
    }
}

/// Options of a paginated `get` call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceQuery {
    /// Resources to match; `None` matches everything.
    pub filter: Option<ResourceFilter>,

    /// Fields to return; `None` returns whole resources.
    pub fields: Option<Projection>,

    /// Page size; `None` uses the backend default.
    pub limit: Option<u32>,

    /// Zero-based page index; `None` means the first page.
    pub page: Option<u32>,

    /// Sort keys.
    pub sort: Sort,
}

impl ResourceQuery {
    /// Creates a query matching every resource.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the filter.
    pub fn with_filter(mut self, filter: ResourceFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Sets the projection.
    pub fn with_fields(mut self, fields: Projection) -> Self {
        self.fields = Some(fields);
        self
    }

    /// Sets the page size.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the page index.
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Sets the sort keys.
    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = sort;
        self
    }

    /// Returns the page index, defaulting to the first page.
    pub fn page_index(&self) -> u32 {
        self.page.unwrap_or(0)
    }
}
