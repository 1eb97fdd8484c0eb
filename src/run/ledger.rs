use crate::http::{ApiClient, HttpMethod};
use crate::run::model::CleanupReport;
use tracing::{info, warn};

/// Links created during a run. Every acquired id is deleted by
/// `release_all`, which the runner calls on every exit path.
#[derive(Debug, Default)]
pub struct LinkLedger {
    ids: Vec<String>,
}

impl LinkLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&mut self, id: String) {
        info!("tracking created link {}", id);
        self.ids.push(id);
    }

    /// Stop tracking a link the run already deleted itself.
    pub fn forget(&mut self, id: &str) {
        self.ids.retain(|tracked| tracked != id);
    }

    pub fn first(&self) -> Option<&str> {
        self.ids.first().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// One delete attempt per link, no retries.
    pub async fn release_all(&mut self, client: &ApiClient) -> CleanupReport {
        let mut report = CleanupReport::default();
        for id in std::mem::take(&mut self.ids) {
            let path = format!("/links/{}", id);
            match client.send(HttpMethod::DELETE, &path, None).await {
                Ok(response) if response.status_code == 200 => {
                    info!("deleted link {}", id);
                    report.deleted.push(id);
                }
                Ok(response) => {
                    warn!(
                        "failed to delete link {}: status {}{}",
                        id,
                        response.status_code,
                        response
                            .error_message()
                            .map(|message| format!(", error: {}", message))
                            .unwrap_or_default()
                    );
                    report.failed.push(id);
                }
                Err(err) => {
                    warn!("failed to delete link {}: {}", id, err);
                    report.failed.push(id);
                }
            }
        }
        report
    }
}

impl Drop for LinkLedger {
    fn drop(&mut self) {
        if !self.is_empty() {
            warn!(
                "{} created links were never released: {:?}",
                self.ids.len(),
                self.ids
            );
        }
    }
}
