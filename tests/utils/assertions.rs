//! Test assertion helpers - fluent API for verifying responses
#![allow(dead_code)] // Test utilities may not all be used in every test

use axum::http::StatusCode;
use serde_json::Value;

use super::actions::TestResponse;

// ============================================================================
// Assertion Helpers
// ============================================================================

pub struct ResponseAssertion<'a> {
    response: &'a TestResponse,
}

impl<'a> ResponseAssertion<'a> {
    pub fn of(response: &'a TestResponse) -> Self {
        Self { response }
    }

    pub fn has_status(self, expected: StatusCode) -> Self {
        assert_eq!(
            self.response.status, expected,
            "unexpected status, body: {}",
            self.response.body
        );
        self
    }

    /// Error responses carry `{"error": <message>}`
    pub fn has_error(self, expected: &str) -> Self {
        assert_eq!(
            self.response.body["error"], expected,
            "unexpected error body: {}",
            self.response.body
        );
        self
    }

    pub fn has_field(self, field: &str) -> Self {
        let value = &self.response.body[field];
        assert!(
            !value.is_null() && value != &Value::String(String::new()),
            "expected non-empty `{field}` in {}",
            self.response.body
        );
        self
    }

    /// For search results: the house names, in response order
    pub fn has_house_names(self, expected: &[&str]) -> Self {
        let names: Vec<&str> = self
            .response
            .body
            .as_array()
            .unwrap_or_else(|| panic!("expected an array, got {}", self.response.body))
            .iter()
            .map(|house| house["houseName"].as_str().unwrap())
            .collect();
        assert_eq!(names, expected);
        self
    }

    pub fn body(&self) -> &Value {
        &self.response.body
    }
}
