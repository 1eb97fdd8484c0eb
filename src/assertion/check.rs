use crate::assertion::model::{BodyAssertion, ComparisonType, Expectation, TestResult, Validator};
use crate::http::{HttpError, HttpResult};
use crate::json_path::utils::{as_string, evaluate_expression};
use regex::Regex;
use serde_json::Value;

pub fn assert_outcome(
    test_name: &str,
    outcome: &Result<HttpResult<Value>, HttpError>,
    expectation: &Expectation,
) -> TestResult {
    match outcome {
        Err(err) => TestResult::from_error(test_name, format!("Request failed: {}", err)),
        Ok(response) => match check_response(expectation, response) {
            Ok(()) => TestResult::of_success(test_name, format!("status {}", response.status_code)),
            Err(message) => TestResult::from_error(test_name, message),
        },
    }
}

/// Status first; validators only run once the status matched, and every
/// failing validator is reported.
pub fn check_response(expectation: &Expectation, response: &HttpResult<Value>) -> Result<(), String> {
    if !expectation.status.accepts(response.status_code) {
        let detail = response
            .error_message()
            .map(|message| format!(", error: {}", message))
            .unwrap_or_default();
        return Err(format!(
            "Expected {} status, got {}{}",
            expectation.status, response.status_code, detail
        ));
    }
    let failures: Vec<String> = expectation
        .validators
        .iter()
        .filter_map(|validator| check_validator(validator, response).err())
        .collect();
    if failures.is_empty() {
        Ok(())
    } else {
        Err(failures.join("; "))
    }
}

fn check_validator(validator: &Validator, response: &HttpResult<Value>) -> Result<(), String> {
    match validator {
        Validator::HeaderPresent(name) => {
            if response.headers.contains_key(name.as_str()) {
                Ok(())
            } else {
                Err(format!("missing header {}", name))
            }
        }
        Validator::Body(assertion) => check_body(assertion, response.body()),
    }
}

pub fn check_body(assertion: &BodyAssertion, body: &Value) -> Result<(), String> {
    let values = evaluate_expression(body, &assertion.expression)?;
    let holds = match assertion.comparison_type {
        ComparisonType::Exists => values.iter().any(|v| !v.is_null()),
        ComparisonType::EqualTo => values.first() == Some(&assertion.expected),
        ComparisonType::Includes => values.iter().any(|v| same_id(v, &assertion.expected)),
        ComparisonType::Matches => {
            let pattern = assertion.expected.as_str().unwrap_or_default();
            let regex = Regex::new(pattern)
                .map_err(|err| format!("invalid pattern {}: {}", pattern, err))?;
            values
                .iter()
                .any(|v| v.as_str().is_some_and(|s| regex.is_match(s)))
        }
        ComparisonType::LengthAtLeast => {
            let min = assertion.expected.as_u64().unwrap_or(0) as usize;
            values
                .first()
                .and_then(|v| v.as_array())
                .is_some_and(|items| items.len() >= min)
        }
    };
    if holds ^ assertion.negate {
        Ok(())
    } else {
        Err(describe_failure(assertion, &values))
    }
}

fn same_id(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(n), Value::String(s)) => n.to_string() == *s,
        _ => actual == expected,
    }
}

fn describe_failure(assertion: &BodyAssertion, values: &[Value]) -> String {
    let path = &assertion.expression.value;
    let not = if assertion.negate { "not " } else { "" };
    let actual = if values.is_empty() {
        "nothing".to_string()
    } else {
        as_string(values)
    };
    let expected = as_string(std::slice::from_ref(&assertion.expected));
    match assertion.comparison_type {
        ComparisonType::Exists => {
            if assertion.negate {
                format!("expected {} to be absent, but got {}", path, actual)
            } else {
                format!("{} is missing", path)
            }
        }
        ComparisonType::EqualTo => {
            format!("expected {} {}to equal {}, but got {}", path, not, expected, actual)
        }
        ComparisonType::Includes => {
            format!("expected {} {}to include {}, but got {}", path, not, expected, actual)
        }
        ComparisonType::Matches => {
            format!("expected {} {}to match /{}/, but got {}", path, not, expected, actual)
        }
        ComparisonType::LengthAtLeast => format!(
            "expected {} {}to be an array of at least {} items, but got {}",
            path, not, expected, actual
        ),
    }
}
