use crate::assertion::model::TestResult;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct RunSummary {
    pub passed_count: usize,
    pub failed_count: usize,
    /// `"<test name>: <message>"` for every failed case, then any critical errors.
    pub messages: Vec<String>,
    pub results: Vec<TestResult>,
    pub critical_errors: Vec<String>,
    pub cleanup: CleanupReport,
}

impl RunSummary {
    #[cfg(test)]
    pub fn from_results(results: Vec<TestResult>) -> Self {
        results.into_iter().fold(RunSummary::default(), |mut summary, result| {
            summary.record(result);
            summary
        })
    }

    pub fn record(&mut self, result: TestResult) {
        if result.passed {
            self.passed_count += 1;
        } else {
            self.failed_count += 1;
            self.messages
                .push(format!("{}: {}", result.test_name, result.message));
        }
        self.results.push(result);
    }

    pub fn record_critical(&mut self, message: String) {
        self.messages.push(format!("Critical error: {}", message));
        self.critical_errors.push(message);
    }

    pub fn total(&self) -> usize {
        self.passed_count + self.failed_count
    }

    pub fn success_rate(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.passed_count as f64 / self.total() as f64 * 100.0
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed_count == 0 && self.critical_errors.is_empty()
    }
}

/// What happened to the links created during the run. Never counted as
/// test results.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub deleted: Vec<String>,
    pub failed: Vec<String>,
}

/// The account a run registers. Every run gets a fresh email and username.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TestUser {
    pub email: String,
    pub password: String,
    pub username: String,
    pub display_name: String,
}

impl TestUser {
    pub fn generate(email_domain: &str) -> Self {
        TestUser {
            email: format!("testuser{}@{}", short_id(), email_domain),
            password: "TestPassword123!".to_string(),
            username: format!("testuser{}", short_id()),
            display_name: "Test User Display".to_string(),
        }
    }

    pub fn signup_body(&self) -> Value {
        json!({
            "email": self.email,
            "password": self.password,
            "username": self.username,
            "displayName": self.display_name,
        })
    }

    pub fn signin_body(&self) -> Value {
        json!({
            "email": self.email,
            "password": self.password,
        })
    }
}

/// Eight hex characters of a v4 uuid.
pub fn short_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}
