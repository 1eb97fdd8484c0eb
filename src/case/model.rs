use crate::assertion::model::Expectation;
use crate::http::{Endpoint, HttpError, HttpMethod, HttpRequest, HttpResult, ReqBody, ReqParam};
use bon::Builder;
use serde_json::Value;
use thiserror::Error;

/// One request and the contract its response must satisfy.
#[derive(Clone, Debug, Builder)]
pub struct TestCase {
    #[builder(into)]
    pub name: String,
    pub method: HttpMethod,
    #[builder(into)]
    pub path: String,
    pub body: Option<Value>,
    #[builder(default)]
    pub headers: Vec<ReqParam>,
    pub expectation: Expectation,
    #[builder(into)]
    pub success_message: Option<String>,
}

impl TestCase {
    pub fn to_request(&self) -> HttpRequest {
        let endpoint = Endpoint::new(self.method, self.path.clone(), self.headers.clone());
        let req_body = match &self.body {
            None => ReqBody::empty(),
            Some(body) => ReqBody::new(body.clone()),
        };
        HttpRequest::new(endpoint, req_body)
    }
}

#[derive(Error, Debug, Clone)]
pub enum CaseError {
    #[error("transport failure: {0}")]
    Transport(#[from] HttpError),
    #[error("contract mismatch: {0}")]
    Contract(String),
}

pub type CaseOutcome = Result<HttpResult<Value>, CaseError>;
