use crate::assertion::model::{BodyAssertion, Expectation};
use crate::case::model::TestCase;
use crate::config::SigninPolicy;
use crate::http::HttpMethod;
use crate::json_path::utils::first_string;
use crate::run::model::short_id;
use crate::run::service::{Runner, Session};
use serde_json::json;
use tracing::info;

impl Runner {
    pub(crate) async fn test_auth_signup(&mut self) {
        self.reporter.section("Testing Authentication - Signup");
        self.signup_fresh_user().await;

        let mut duplicate = self.user.signup_body();
        duplicate["email"] = json!(format!("another_{}@example.com", short_id()));
        let case = TestCase::builder()
            .name("Duplicate Username Prevention")
            .method(HttpMethod::POST)
            .path("/auth/signup")
            .body(duplicate)
            .expectation(Expectation::status(400).body(BodyAssertion::matches(
                "$.error",
                &self.config.expectations.duplicate_username_error,
            )))
            .success_message("Correctly rejected duplicate username")
            .build();
        self.record_case(Session::Authenticated, case).await;

        let case = TestCase::builder()
            .name("Missing Fields Validation")
            .method(HttpMethod::POST)
            .path("/auth/signup")
            .body(json!({"email": "test@example.com", "password": "password"}))
            .expectation(Expectation::status(400))
            .success_message("Correctly rejected incomplete data")
            .build();
        self.record_case(Session::Authenticated, case).await;
    }

    /// Registers the run's user and keeps whatever session the target hands back.
    pub(crate) async fn signup_fresh_user(&mut self) {
        let case = TestCase::builder()
            .name("User Signup")
            .method(HttpMethod::POST)
            .path("/auth/signup")
            .body(self.user.signup_body())
            .expectation(Expectation::status(200).body(BodyAssertion::exists("$.user.id")))
            .success_message("User created")
            .build();
        if let Ok(response) = self.run_case(Session::Authenticated, case).await {
            self.user_id = first_string(response.body(), "$.user.id");
            info!("signed up {} as {:?}", self.user.email, self.user_id);
            self.adopt_session_token(response.body());
        }
    }

    pub(crate) async fn test_auth_signin(&mut self) {
        self.reporter.section("Testing Authentication - Signin");
        let case = match &self.config.expectations.signin_policy {
            SigninPolicy::ConfirmationRequired { error_pattern } => TestCase::builder()
                .name("User Signin - Email Confirmation Required")
                .method(HttpMethod::POST)
                .path("/auth/signin")
                .body(self.user.signin_body())
                .expectation(
                    Expectation::status(400).body(BodyAssertion::matches("$.error", error_pattern)),
                )
                .success_message("Correctly requires email confirmation")
                .build(),
            SigninPolicy::Immediate => TestCase::builder()
                .name("User Signin")
                .method(HttpMethod::POST)
                .path("/auth/signin")
                .body(self.user.signin_body())
                .expectation(Expectation::status(200))
                .success_message("Signed in")
                .build(),
        };
        if let Ok(response) = self.run_case(Session::Authenticated, case).await {
            self.adopt_session_token(response.body());
        }

        let case = TestCase::builder()
            .name("Invalid Credentials")
            .method(HttpMethod::POST)
            .path("/auth/signin")
            .body(json!({"email": "nonexistent@gmail.com", "password": "wrongpassword"}))
            .expectation(Expectation::status(400))
            .success_message("Correctly rejected invalid credentials")
            .build();
        self.record_case(Session::Authenticated, case).await;
    }

    pub(crate) async fn test_signup_input_validation(&mut self) {
        self.reporter.section("Testing Input Validation");
        let case = TestCase::builder()
            .name("Input Validation")
            .method(HttpMethod::POST)
            .path("/auth/signup")
            .body(json!({"email": "invalid-email", "password": "123"}))
            .expectation(Expectation::status(400))
            .success_message("Correctly rejects invalid data")
            .build();
        self.record_case(Session::Anonymous, case).await;
    }

    pub(crate) async fn test_signout(&mut self) {
        self.reporter.section("Testing Authentication - Signout");
        let case = TestCase::builder()
            .name("User Signout")
            .method(HttpMethod::POST)
            .path("/auth/signout")
            .body(json!({}))
            .expectation(Expectation::status(200).body(BodyAssertion::equal_to("$.success", true)))
            .success_message("Successfully signed out")
            .build();
        self.record_case(Session::Authenticated, case).await;
    }
}
