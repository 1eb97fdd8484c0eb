use crate::assertion::check::assert_outcome;
use crate::assertion::model::{BodyAssertion, Expectation, TestResult};
use crate::case::model::TestCase;
use crate::http::HttpMethod;
use crate::run::service::{Runner, Session};
use serde_json::json;

const UPDATED_DISPLAY_NAME: &str = "Updated Display Name";

impl Runner {
    pub(crate) async fn test_profile_management(&mut self) {
        self.reporter.section("Testing Profile Management");

        let case = TestCase::builder()
            .name("Get Profile")
            .method(HttpMethod::GET)
            .path("/profile")
            .expectation(Expectation::status(200).body(BodyAssertion::exists("$.username")))
            .success_message("Retrieved own profile")
            .build();
        self.record_case(Session::Authenticated, case).await;

        let case = TestCase::builder()
            .name("Update Profile")
            .method(HttpMethod::POST)
            .path("/profile")
            .body(json!({
                "displayName": UPDATED_DISPLAY_NAME,
                "bio": "This is my updated bio for testing",
                "avatarUrl": "https://example.com/avatar.jpg",
                "themeColor": "#3B82F6",
                "backgroundColor": "#F3F4F6",
            }))
            .expectation(
                Expectation::status(200)
                    .body(BodyAssertion::equal_to("$.display_name", UPDATED_DISPLAY_NAME)),
            )
            .success_message("Profile updated successfully")
            .build();
        self.record_case(Session::Authenticated, case).await;

        self.probe_username_uniqueness().await;
    }

    /// Tries to claim the probe username. Either outcome conforms: the name
    /// was free and is now ours, or it was taken and the target said so.
    async fn probe_username_uniqueness(&mut self) {
        let probe = self.config.probe_username.clone();
        let outcome = self
            .send(
                Session::Authenticated,
                HttpMethod::POST,
                "/profile",
                Some(json!({"username": probe})),
            )
            .await;
        let status = outcome.as_ref().map(|response| response.status_code).ok();
        let result = match status {
            Some(400) => {
                let expectation = Expectation::status(400).body(BodyAssertion::matches(
                    "$.error",
                    &self.config.expectations.duplicate_username_error,
                ));
                let checked = assert_outcome("Username Uniqueness Check", &outcome, &expectation);
                // Any other 400 is a failed update, not a failed uniqueness check.
                if checked.passed {
                    checked
                } else {
                    TestResult::from_error("Username Update", checked.message)
                }
            }
            _ => assert_outcome("Username Update", &outcome, &Expectation::status(200)),
        };
        if result.passed && status == Some(200) {
            self.user.username = probe;
        }
        self.record(result);
    }
}
