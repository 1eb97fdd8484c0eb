use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Method, RequestBuilder, Url};
use serde_json::Value;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Clone, Debug, PartialEq)]
pub struct ReqParam {
    pub key: String,
    pub value: String,
}

impl ReqParam {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        ReqParam {
            key: key.into(),
            value: value.into(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ReqBody {
    pub value: Option<Value>,
}

impl ReqBody {
    pub fn empty() -> Self {
        ReqBody { value: None }
    }

    pub fn new(value: Value) -> Self {
        Self { value: Some(value) }
    }
}

#[derive(Clone, Debug)]
pub struct Endpoint {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<ReqParam>,
}

impl Endpoint {
    pub fn new(method: HttpMethod, path: impl Into<String>, headers: Vec<ReqParam>) -> Endpoint {
        Endpoint {
            method,
            path: path.into(),
            headers,
        }
    }

    /// Joins the path onto the api base. The path is kept verbatim, trailing
    /// slashes included.
    pub fn to_url(&self, api_base: &str) -> Result<Url, HttpError> {
        let raw = format!("{}{}", api_base.trim_end_matches('/'), self.path);
        Url::parse(&raw).map_err(|err| HttpError::InvalidUrl(format!("{}: {}", raw, err)))
    }
}

#[derive(Clone, Debug)]
pub struct HttpRequest {
    pub endpoint: Endpoint,
    pub req_body: ReqBody,
}

impl HttpRequest {
    pub fn new(endpoint: Endpoint, req_body: ReqBody) -> HttpRequest {
        HttpRequest { endpoint, req_body }
    }
}

#[derive(Clone, Debug)]
pub struct ResBody<T> {
    pub value: T,
}

impl<T> ResBody<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }
}

#[derive(Clone, Debug)]
pub struct HttpResult<T> {
    pub res_body: ResBody<T>,
    pub status_code: u16,
    pub headers: HeaderMap,
}

impl<T> HttpResult<T> {
    pub fn new(res_body: ResBody<T>, status_code: u16, headers: HeaderMap) -> Self {
        Self {
            res_body,
            status_code,
            headers,
        }
    }

    pub fn body(&self) -> &T {
        &self.res_body.value
    }
}

impl HttpResult<Value> {
    /// The `error` field the target puts on failed responses, if any.
    pub fn error_message(&self) -> Option<String> {
        match self.body().get("error") {
            Some(Value::String(message)) => Some(message.clone()),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        }
    }
}

/// Transport-level failures. A response with any status code is not an
/// error at this layer.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum HttpError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("malformed response: {0}")]
    Body(String),
    #[error("invalid url {0}")]
    InvalidUrl(String),
    #[error("{0}")]
    Io(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    POST,
    GET,
    PUT,
    DELETE,
    OPTIONS,
}

impl Display for HttpMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            HttpMethod::POST => "POST",
            HttpMethod::GET => "GET",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::OPTIONS => "OPTIONS",
        };
        f.write_str(name)
    }
}

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::POST => Method::POST,
            HttpMethod::GET => Method::GET,
            HttpMethod::PUT => Method::PUT,
            HttpMethod::DELETE => Method::DELETE,
            HttpMethod::OPTIONS => Method::OPTIONS,
        }
    }
}

/// One session against the target: its own cookie store plus an optional
/// bearer token. Cloning shares the cookie store.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    api_base: String,
    timeout: Duration,
    bearer_token: Option<String>,
}

impl ApiClient {
    pub fn new(api_base: impl Into<String>, timeout: Duration) -> Result<Self, HttpError> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()
            .map_err(|err| HttpError::Io(err.to_string()))?;
        Ok(Self {
            client,
            api_base: api_base.into(),
            timeout,
            bearer_token: None,
        })
    }

    /// A new session against the same target that shares nothing with this one.
    pub fn anonymous(&self) -> Result<Self, HttpError> {
        Self::new(self.api_base.clone(), self.timeout)
    }

    pub fn set_bearer_token(&mut self, token: impl Into<String>) {
        self.bearer_token = Some(token.into());
    }

    #[cfg(test)]
    pub fn has_bearer_token(&self) -> bool {
        self.bearer_token.is_some()
    }

    pub async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
    ) -> Result<HttpResult<Value>, HttpError> {
        let req_body = body.map_or_else(ReqBody::empty, ReqBody::new);
        self.execute(HttpRequest::new(Endpoint::new(method, path, vec![]), req_body))
            .await
    }

    pub async fn execute(&self, request: HttpRequest) -> Result<HttpResult<Value>, HttpError> {
        let method = request.endpoint.method;
        let path = request.endpoint.path.clone();
        let req = self.build_reqwest(request)?;
        let response = req.send().await.map_err(|err| self.classify(err))?;
        let status_code = response.status();
        let headers = response.headers().clone();
        info!("{} {} -> {}", method, path, status_code);
        let text = response.text().await.map_err(|err| self.classify(err))?;
        Ok(HttpResult::new(
            ResBody::new(parse_body(&text)),
            status_code.as_u16(),
            headers,
        ))
    }

    fn build_reqwest(&self, request: HttpRequest) -> Result<RequestBuilder, HttpError> {
        let endpoint = request.endpoint;
        let url = endpoint.to_url(&self.api_base)?;
        info!("url: {}", url);

        let mut headers = HeaderMap::new();
        for header in &endpoint.headers {
            let name = HeaderName::from_bytes(header.key.as_bytes())
                .map_err(|err| HttpError::Io(format!("header {}: {}", header.key, err)))?;
            let value = HeaderValue::from_str(&header.value)
                .map_err(|err| HttpError::Io(format!("header {}: {}", header.key, err)))?;
            headers.insert(name, value);
        }
        if let Some(token) = &self.bearer_token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|err| HttpError::Io(format!("bearer token: {}", err)))?;
            headers.insert(AUTHORIZATION, value);
        }

        let mut req = self
            .client
            .request(endpoint.method.into(), url)
            .headers(headers);

        if let Some(body) = &request.req_body.value {
            info!("request body: {}", body);
            req = req.json(body);
        }
        Ok(req)
    }

    fn classify(&self, error: reqwest::Error) -> HttpError {
        warn!("http request failed: {}", error);
        if error.is_timeout() {
            HttpError::Timeout(self.timeout)
        } else if error.is_connect() {
            HttpError::Connect(error.to_string())
        } else if error.is_body() || error.is_decode() {
            HttpError::Body(error.to_string())
        } else {
            HttpError::Io(error.to_string())
        }
    }
}

/// Empty bodies become `null`; anything that is not JSON is kept as a string.
fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
