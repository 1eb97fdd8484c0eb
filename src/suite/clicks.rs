use crate::assertion::model::{BodyAssertion, Expectation, TestResult};
use crate::case::model::TestCase;
use crate::http::HttpMethod;
use crate::run::ledger::LinkLedger;
use crate::run::service::{Runner, Session};
use serde_json::json;

impl Runner {
    pub(crate) async fn test_click_tracking(&mut self, ledger: &mut LinkLedger) {
        self.reporter.section("Testing Click Tracking");

        match ledger.first().map(str::to_string) {
            Some(link_id) => {
                let case = TestCase::builder()
                    .name("Track Click")
                    .method(HttpMethod::POST)
                    .path("/track-click")
                    .body(json!({"linkId": link_id, "userId": self.user_id}))
                    .expectation(
                        Expectation::status(200).body(BodyAssertion::equal_to("$.success", true)),
                    )
                    .success_message("Click tracked")
                    .build();
                self.record_case(Session::Authenticated, case).await;
            }
            None => self.record(TestResult::from_error(
                "Track Click",
                "No links available for testing".to_string(),
            )),
        }

        // Unknown ids are accepted so clicks never fail for visitors.
        let case = TestCase::builder()
            .name("Invalid Link Click")
            .method(HttpMethod::POST)
            .path("/track-click")
            .body(json!({"linkId": "invalid-id"}))
            .expectation(Expectation::status(200).body(BodyAssertion::equal_to("$.success", true)))
            .success_message("Handled invalid link click")
            .build();
        self.record_case(Session::Authenticated, case).await;

        let case = TestCase::builder()
            .name("Missing Link ID")
            .method(HttpMethod::POST)
            .path("/track-click")
            .body(json!({}))
            .expectation(Expectation::status(400))
            .success_message("Correctly rejected missing link ID")
            .build();
        self.record_case(Session::Authenticated, case).await;
    }
}
