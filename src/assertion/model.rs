use crate::json_path::model::Expression;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{Display, Formatter};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComparisonType {
    Exists,
    EqualTo,
    Includes,
    Matches,
    LengthAtLeast,
}

/// A check against the JSON body: the values selected by `expression`
/// compared with `expected`.
#[derive(Clone, Debug, PartialEq)]
pub struct BodyAssertion {
    pub expression: Expression,
    pub comparison_type: ComparisonType,
    pub expected: Value,
    pub negate: bool,
}

impl BodyAssertion {
    fn of(path: &str, comparison_type: ComparisonType, expected: Value) -> Self {
        BodyAssertion {
            expression: Expression::new(path),
            comparison_type,
            expected,
            negate: false,
        }
    }

    pub fn exists(path: &str) -> Self {
        Self::of(path, ComparisonType::Exists, Value::Null)
    }

    pub fn equal_to(path: &str, expected: impl Into<Value>) -> Self {
        Self::of(path, ComparisonType::EqualTo, expected.into())
    }

    /// Some selected value equals `expected`; numeric ids compare by their text.
    pub fn includes(path: &str, expected: impl Into<Value>) -> Self {
        Self::of(path, ComparisonType::Includes, expected.into())
    }

    /// `pattern` is a regular expression matched against the string at `path`.
    pub fn matches(path: &str, pattern: &str) -> Self {
        Self::of(path, ComparisonType::Matches, Value::String(pattern.to_string()))
    }

    pub fn length_at_least(path: &str, min: usize) -> Self {
        Self::of(path, ComparisonType::LengthAtLeast, Value::from(min))
    }

    pub fn negated(mut self) -> Self {
        self.negate = !self.negate;
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Validator {
    Body(BodyAssertion),
    HeaderPresent(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StatusExpectation {
    Exact(u16),
    OneOf(Vec<u16>),
}

impl StatusExpectation {
    pub fn accepts(&self, status_code: u16) -> bool {
        match self {
            StatusExpectation::Exact(code) => *code == status_code,
            StatusExpectation::OneOf(codes) => codes.contains(&status_code),
        }
    }
}

impl Display for StatusExpectation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusExpectation::Exact(code) => write!(f, "{}", code),
            StatusExpectation::OneOf(codes) => {
                let codes: Vec<String> = codes.iter().map(|c| c.to_string()).collect();
                write!(f, "{}", codes.join("/"))
            }
        }
    }
}

/// What a response must look like for a test case to pass.
#[derive(Clone, Debug, PartialEq)]
pub struct Expectation {
    pub status: StatusExpectation,
    pub validators: Vec<Validator>,
}

impl Expectation {
    pub fn status(code: u16) -> Self {
        Expectation {
            status: StatusExpectation::Exact(code),
            validators: vec![],
        }
    }

    pub fn one_of(codes: &[u16]) -> Self {
        Expectation {
            status: StatusExpectation::OneOf(codes.to_vec()),
            validators: vec![],
        }
    }

    pub fn body(mut self, assertion: BodyAssertion) -> Self {
        self.validators.push(Validator::Body(assertion));
        self
    }

    pub fn header(mut self, name: &str) -> Self {
        self.validators.push(Validator::HeaderPresent(name.to_string()));
        self
    }
}

#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug)]
pub struct TestResult {
    pub test_name: String,
    pub passed: bool,
    pub message: String,
}

impl TestResult {
    pub fn from_error(test_name: &str, message: String) -> Self {
        TestResult {
            test_name: test_name.to_string(),
            passed: false,
            message,
        }
    }

    pub fn of_success(test_name: &str, message: String) -> Self {
        TestResult {
            test_name: test_name.to_string(),
            passed: true,
            message,
        }
    }
}
