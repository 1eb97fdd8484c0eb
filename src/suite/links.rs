use crate::assertion::model::{BodyAssertion, Expectation};
use crate::case::model::TestCase;
use crate::http::HttpMethod;
use crate::json_path::utils::first_string;
use crate::run::ledger::LinkLedger;
use crate::run::service::{Runner, Session};
use serde_json::{json, Value};

impl Runner {
    pub(crate) async fn test_link_crud_operations(&mut self, ledger: &mut LinkLedger) {
        self.reporter.section("Testing Link CRUD Operations");

        let case = TestCase::builder()
            .name("Create Link")
            .method(HttpMethod::POST)
            .path("/links")
            .body(json!({
                "title": "Test Link 1",
                "url": "https://example.com",
                "description": "This is a test link",
            }))
            .expectation(Expectation::status(200).body(BodyAssertion::exists("$.id")))
            .success_message("Link created")
            .build();
        if let Ok(response) = self.run_case(Session::Authenticated, case).await {
            if let Some(id) = first_string(response.body(), "$.id") {
                ledger.acquire(id);
            }
        }

        // A second link for the listing; not a case of its own.
        let second = json!({
            "title": "Test Link 2",
            "url": "https://github.com",
            "description": "Another test link",
        });
        if let Ok(response) = self
            .send(Session::Authenticated, HttpMethod::POST, "/links", Some(second))
            .await
        {
            if response.status_code == 200 {
                if let Some(id) = first_string(response.body(), "$.id") {
                    ledger.acquire(id);
                }
            }
        }

        let case = TestCase::builder()
            .name("Get Links")
            .method(HttpMethod::GET)
            .path("/links")
            .expectation(Expectation::status(200).body(BodyAssertion::length_at_least("$", 1)))
            .success_message("Retrieved links")
            .build();
        self.record_case(Session::Authenticated, case).await;

        if let Some(id) = ledger.first().map(str::to_string) {
            let case = TestCase::builder()
                .name("Update Link")
                .method(HttpMethod::PUT)
                .path(format!("/links/{}", id))
                .body(json!({
                    "title": "Updated Test Link",
                    "url": "https://updated-example.com",
                    "description": "Updated description",
                }))
                .expectation(
                    Expectation::status(200)
                        .body(BodyAssertion::equal_to("$.title", "Updated Test Link")),
                )
                .success_message("Link updated successfully")
                .build();
            self.record_case(Session::Authenticated, case).await;
        }

        let case = TestCase::builder()
            .name("Link Validation")
            .method(HttpMethod::POST)
            .path("/links")
            .body(json!({"title": "Invalid Link"}))
            .expectation(Expectation::status(400))
            .success_message("Correctly rejected invalid link data")
            .build();
        self.record_case(Session::Authenticated, case).await;

        self.test_link_lifecycle(ledger).await;
    }

    /// Create, see it listed, delete, see it gone.
    async fn test_link_lifecycle(&mut self, ledger: &mut LinkLedger) {
        let case = TestCase::builder()
            .name("Link Lifecycle - Create")
            .method(HttpMethod::POST)
            .path("/links")
            .body(json!({"title": "T", "url": "https://example.com"}))
            .expectation(Expectation::status(200).body(BodyAssertion::exists("$.id")))
            .success_message("Temporary link created")
            .build();
        let Ok(response) = self.run_case(Session::Authenticated, case).await else {
            return;
        };
        let Some(id) = first_string(response.body(), "$.id") else {
            return;
        };
        ledger.acquire(id.clone());

        let case = TestCase::builder()
            .name("Link Lifecycle - Listed")
            .method(HttpMethod::GET)
            .path("/links")
            .expectation(Expectation::status(200).body(BodyAssertion::includes("$[*].id", id.as_str())))
            .success_message("Temporary link is listed")
            .build();
        self.record_case(Session::Authenticated, case).await;

        let case = TestCase::builder()
            .name("Link Lifecycle - Delete")
            .method(HttpMethod::DELETE)
            .path(format!("/links/{}", id))
            .expectation(Expectation::status(200))
            .success_message("Temporary link deleted")
            .build();
        if self.run_case(Session::Authenticated, case).await.is_err() {
            return;
        }
        ledger.forget(&id);

        let case = TestCase::builder()
            .name("Link Lifecycle - Removed")
            .method(HttpMethod::GET)
            .path("/links")
            .expectation(
                Expectation::status(200)
                    .body(BodyAssertion::includes("$[*].id", Value::String(id)).negated()),
            )
            .success_message("Temporary link is no longer listed")
            .build();
        self.record_case(Session::Authenticated, case).await;
    }
}
