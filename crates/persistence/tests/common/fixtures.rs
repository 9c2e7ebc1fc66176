//! Test fixtures for persistence layer testing.
//!
//! This module provides predefined CMS resources for use in tests, along
//! with a builder for creating custom test data.

use serde_json::{Value, json};

/// A blog post fixture for testing.
#[derive(Debug, Clone)]
pub struct PostFixture {
    /// Post ID.
    pub id: String,
    /// Post title.
    pub title: String,
    /// Publication state.
    pub status: String,
    /// Tags.
    pub tags: Vec<String>,
    /// View counter.
    pub views: i64,
    /// Author name.
    pub author: Option<String>,
}

impl PostFixture {
    /// Creates a published post without tags.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            status: "published".to_string(),
            tags: vec![],
            views: 0,
            author: None,
        }
    }

    /// Sets the publication state.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Sets tags.
    pub fn with_tags(mut self, tags: Vec<&str>) -> Self {
        self.tags = tags.into_iter().map(String::from).collect();
        self
    }

    /// Sets the view counter.
    pub fn with_views(mut self, views: i64) -> Self {
        self.views = views;
        self
    }

    /// Sets the author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Builds the JSON resource.
    pub fn build(&self) -> Value {
        let mut post = json!({
            "id": self.id,
            "title": self.title,
            "status": self.status,
            "tags": self.tags,
            "views": self.views,
        });
        if let Some(author) = &self.author {
            post["meta"] = json!({"author": author});
        }
        post
    }
}

/// Five posts covering every field used by the tests.
pub fn sample_posts() -> Vec<Value> {
    vec![
        PostFixture::new("1", "Getting started with Rust")
            .with_tags(vec!["rust", "tutorial"])
            .with_views(120)
            .with_author("ada")
            .build(),
        PostFixture::new("2", "Async storage in Rust")
            .with_tags(vec!["rust", "async"])
            .with_views(80)
            .with_author("grace")
            .build(),
        PostFixture::new("3", "Draft: MongoDB indexes")
            .with_status("draft")
            .with_tags(vec!["mongodb"])
            .with_views(5)
            .build(),
        PostFixture::new("4", "Publishing workflows")
            .with_tags(vec!["cms"])
            .with_views(42)
            .with_author("ada")
            .build(),
        PostFixture::new("5", "Archived announcement")
            .with_status("archived")
            .with_views(0)
            .build(),
    ]
}

/// `count` minimal resources `{"id": "<n>", "rank": n}`.
pub fn numbered(count: usize) -> Vec<Value> {
    (0..count)
        .map(|n| json!({"id": n.to_string(), "rank": n}))
        .collect()
}

/// Returns the `id` of every resource, in order.
pub fn ids(resources: &[Value]) -> Vec<String> {
    resources
        .iter()
        .filter_map(|r| r["id"].as_str().map(String::from))
        .collect()
}
