#![allow(dead_code)]

use axum::{
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`

use house_access::TOKEN_HEADER;

use super::setup::TestSetup;

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

// ============================================================================
// Action Helpers
// ============================================================================

impl TestSetup {
    /// Send one request through the full router
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(TOKEN_HEADER, token);
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        // Non-JSON bodies (health, preflight) come back as a string value
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Browser-style CORS preflight, never carries a token
    pub async fn send_preflight(&self, uri: &str, method: &str) -> TestResponse {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri(uri)
            .header("origin", "http://localhost:3000")
            .header("access-control-request-method", method)
            .header("access-control-request-headers", TOKEN_HEADER)
            .body(Body::empty())
            .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        TestResponse {
            status: response.status(),
            headers: response.headers().clone(),
            body: Value::Null,
        }
    }

    // ============================================================================
    // Convenience Action Methods
    // ============================================================================

    pub async fn signup(&self, email: &str, password: &str) -> TestResponse {
        self.send(
            Method::POST,
            "/users/signup",
            None,
            Some(json!({ "email": email, "name": "Tester", "password": password })),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.send(
            Method::POST,
            "/users/login",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await
    }

    pub async fn refresh(&self, refresh_token: &str) -> TestResponse {
        self.send(
            Method::POST,
            "/users/refresh",
            None,
            Some(json!({ "refresh_token": refresh_token })),
        )
        .await
    }

    /// Sign up, log in and hand back the access token
    pub async fn logged_in_token(&self) -> String {
        self.signup("a@x.com", "pw1").await;
        let login = self.login("a@x.com", "pw1").await;
        assert_eq!(login.status, StatusCode::OK, "login failed: {}", login.body);
        login.body["token"].as_str().unwrap().to_string()
    }

    pub async fn search_houses(&self, token: Option<&str>, pattern: &str) -> TestResponse {
        self.send(
            Method::GET,
            &format!("/houses?houseName={pattern}"),
            token,
            None,
        )
        .await
    }

    pub async fn create_house(
        &self,
        token: Option<&str>,
        name: &str,
        access_code: &str,
    ) -> TestResponse {
        self.send(
            Method::POST,
            "/houses",
            token,
            Some(json!({ "houseName": name, "accessCode": access_code, "houseNotes": "" })),
        )
        .await
    }

    pub async fn update_house(
        &self,
        token: Option<&str>,
        id: &str,
        name: &str,
        access_code: &str,
    ) -> TestResponse {
        self.send(
            Method::PUT,
            &format!("/houses/{id}"),
            token,
            Some(json!({ "houseName": name, "accessCode": access_code, "houseNotes": "" })),
        )
        .await
    }

    pub async fn delete_house(&self, token: Option<&str>, id: &str) -> TestResponse {
        self.send(Method::DELETE, &format!("/houses/{id}"), token, None)
            .await
    }
}
