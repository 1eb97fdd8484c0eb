use crate::assertion::model::Expectation;
use crate::case::model::TestCase;
use crate::http::HttpMethod;
use crate::run::service::{Runner, Session};
use serde_json::{json, Value};

impl Runner {
    pub(crate) async fn test_authentication_protection(&mut self) {
        self.reporter.section("Testing Authentication Protection");
        let endpoints = [
            (HttpMethod::GET, "/profile", None),
            (HttpMethod::POST, "/profile", Some(json!({"displayName": "Test"}))),
            (HttpMethod::GET, "/links", None),
            (
                HttpMethod::POST,
                "/links",
                Some(json!({"title": "Test", "url": "https://example.com"})),
            ),
        ];
        for (method, path, body) in endpoints {
            self.expect_unauthorized(method, path, body).await;
        }
    }

    pub(crate) async fn test_core_protection(&mut self) {
        self.reporter.section("Testing Authentication Protection");
        self.expect_unauthorized(HttpMethod::GET, "/profile", None).await;
        self.expect_unauthorized(HttpMethod::GET, "/links", None).await;
    }

    /// Sent without any session state; the target must answer 401.
    async fn expect_unauthorized(&mut self, method: HttpMethod, path: &str, body: Option<Value>) {
        let case = TestCase::builder()
            .name(format!("Auth Protection - {} {}", method, path))
            .method(method)
            .path(path)
            .maybe_body(body)
            .expectation(Expectation::status(401))
            .success_message("Correctly requires authentication")
            .build();
        self.record_case(Session::Anonymous, case).await;
    }
}
