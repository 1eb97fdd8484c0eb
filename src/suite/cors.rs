use crate::assertion::model::Expectation;
use crate::case::model::TestCase;
use crate::http::{HttpMethod, ReqParam};
use crate::run::service::{Runner, Session};

impl Runner {
    /// Preflight against `path`; the three allow headers must all be present.
    pub(crate) async fn test_cors_headers(&mut self, path: &str) {
        self.reporter.section("Testing CORS Headers");
        let case = TestCase::builder()
            .name("CORS Headers")
            .method(HttpMethod::OPTIONS)
            .path(path)
            .headers(vec![
                ReqParam::new("Origin", self.config.origin.as_str()),
                ReqParam::new("Access-Control-Request-Method", "POST"),
                ReqParam::new("Access-Control-Request-Headers", "content-type"),
            ])
            .expectation(
                Expectation::status(200)
                    .header("Access-Control-Allow-Origin")
                    .header("Access-Control-Allow-Methods")
                    .header("Access-Control-Allow-Headers"),
            )
            .success_message("CORS headers present")
            .build();
        self.record_case(Session::Anonymous, case).await;
    }
}
