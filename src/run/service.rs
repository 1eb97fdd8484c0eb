use crate::assertion::check::assert_outcome;
use crate::assertion::model::TestResult;
use crate::case::model::{CaseError, CaseOutcome, TestCase};
use crate::config::{ConfigError, RunnerConfig};
use crate::http::{ApiClient, HttpError, HttpMethod, HttpResult};
use crate::json_path::utils::first_string;
use crate::run::ledger::LinkLedger;
use crate::run::model::{RunSummary, TestUser};
use crate::run::report::Reporter;
use futures::FutureExt;
use serde_json::Value;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use tracing::{debug, error, info};

/// Which session a request goes out on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Session {
    /// Carries the cookies and token established by sign-up.
    Authenticated,
    /// Shares nothing with the authenticated session.
    Anonymous,
}

pub struct Runner {
    pub(crate) config: RunnerConfig,
    pub(crate) user: TestUser,
    pub(crate) user_id: Option<String>,
    pub(crate) reporter: Reporter,
    session: ApiClient,
    anonymous: ApiClient,
    summary: RunSummary,
    #[cfg(test)]
    fail_after_links: bool,
}

impl Runner {
    pub fn new(config: RunnerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let session = ApiClient::new(config.api_base()?, config.timeout)?;
        let anonymous = session.anonymous()?;
        let user = TestUser::generate(&config.email_domain);
        Ok(Runner {
            reporter: Reporter::new(config.quiet),
            config,
            user,
            user_id: None,
            session,
            anonymous,
            summary: RunSummary::default(),
            #[cfg(test)]
            fail_after_links: false,
        })
    }

    /// Every procedure in order, then cleanup of the links the run created.
    pub async fn run_all(mut self) -> RunSummary {
        self.reporter.banner(
            "Comprehensive backend testing for the link-in-bio platform",
            &self.config.base_url,
            &self.user.email,
        );
        let mut ledger = LinkLedger::new();
        let outcome = AssertUnwindSafe(self.run_procedures(&mut ledger))
            .catch_unwind()
            .await;
        if let Err(panic) = outcome {
            self.record_panic(panic);
        }

        self.reporter.section("Cleaning Up Test Data");
        let cleanup = ledger.release_all(&self.session).await;
        for id in &cleanup.deleted {
            self.reporter.cleanup(id, true);
        }
        for id in &cleanup.failed {
            self.reporter.cleanup(id, false);
        }
        self.summary.cleanup = cleanup;
        self.summary
    }

    /// The quick subset: sign-up, public lookup, anonymous access, input
    /// validation and CORS. Creates no links.
    pub async fn run_smoke(mut self) -> RunSummary {
        self.reporter.banner(
            "Focused backend testing for the link-in-bio platform",
            &self.config.base_url,
            &self.user.email,
        );
        let outcome = AssertUnwindSafe(self.run_smoke_procedures())
            .catch_unwind()
            .await;
        if let Err(panic) = outcome {
            self.record_panic(panic);
        }
        self.summary
    }

    async fn run_procedures(&mut self, ledger: &mut LinkLedger) {
        self.test_auth_signup().await;
        self.test_auth_signin().await;
        self.test_profile_management().await;
        self.test_link_crud_operations(ledger).await;
        #[cfg(test)]
        if self.fail_after_links {
            panic!("link bookkeeping went wrong");
        }
        self.test_public_profile_api().await;
        self.test_click_tracking(ledger).await;
        self.test_authentication_protection().await;
        self.test_cors_headers("/auth/signin").await;
        self.test_signout().await;
    }

    async fn run_smoke_procedures(&mut self) {
        self.reporter.section("User Signup");
        self.signup_fresh_user().await;
        self.test_public_profile_reachable().await;
        self.test_core_protection().await;
        self.test_signup_input_validation().await;
        self.test_cors_headers("/auth/signup").await;
    }

    /// Executes one test case, records its result and hands back the response
    /// only when the contract held.
    pub(crate) async fn run_case(&mut self, session: Session, case: TestCase) -> CaseOutcome {
        let outcome = self.client(session).execute(case.to_request()).await;
        let mut result = assert_outcome(&case.name, &outcome, &case.expectation);
        if let (true, Some(message)) = (result.passed, case.success_message) {
            result.message = message;
        }
        let passed = result.passed;
        let message = result.message.clone();
        self.record(result);
        match outcome {
            Err(err) => Err(CaseError::Transport(err)),
            Ok(_) if !passed => Err(CaseError::Contract(message)),
            Ok(response) => Ok(response),
        }
    }

    /// Like `run_case`, for callers that only need the result recorded.
    pub(crate) async fn record_case(&mut self, session: Session, case: TestCase) {
        if let Err(err) = self.run_case(session, case).await {
            debug!("case did not hold: {}", err);
        }
    }

    /// A request whose result is not recorded.
    pub(crate) async fn send(
        &self,
        session: Session,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
    ) -> Result<HttpResult<Value>, HttpError> {
        self.client(session).send(method, path, body).await
    }

    pub(crate) fn record(&mut self, result: TestResult) {
        self.reporter.result(&result);
        self.summary.record(result);
    }

    /// Uses `session.access_token` from an auth response for later
    /// authenticated calls, next to whatever cookies the target set.
    pub(crate) fn adopt_session_token(&mut self, body: &Value) {
        if let Some(token) = first_string(body, "$.session.access_token") {
            info!("adopting session token from auth response");
            self.session.set_bearer_token(token);
        }
    }

    fn client(&self, session: Session) -> &ApiClient {
        match session {
            Session::Authenticated => &self.session,
            Session::Anonymous => &self.anonymous,
        }
    }

    fn record_panic(&mut self, panic: Box<dyn Any + Send>) {
        let message = panic_message(panic.as_ref());
        error!("critical error during testing: {}", message);
        self.summary.record_critical(message);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
