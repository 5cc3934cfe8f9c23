//! Fire-and-forget HTTP dispatch to the result-trigger endpoints.
//!
//! When a timer fires, the scheduler does not ingest in place. It POSTs to
//! the server's own trigger route, so scheduled and manual ingestions run
//! through exactly one code path and one auth surface. Failures are logged
//! and never retried; the manual triggers are the recovery path.

use paddock_core::TriggerKind;

const LOGGED_BODY_CHARS: usize = 600;

pub(super) struct Dispatcher {
    client: reqwest::Client,
    base_url: String,
    bearer: Option<String>,
}

impl Dispatcher {
    pub(super) fn new(base_url: String, bearer: Option<String>) -> Self {
        // No request deadline: the server side bounds the long pole with the
        // scraper timeout, so every trigger call terminates on its own.
        Self {
            client: reqwest::Client::new(),
            base_url,
            bearer,
        }
    }

    /// POST one trigger and log the outcome. The call lasts as long as the
    /// ingestion does (it shells out to the scraper on the server side).
    pub(super) async fn trigger(&self, kind: TriggerKind, season: i32, round: i32) {
        let url = format!(
            "{}/api/results/{kind}/{season}/{round}",
            self.base_url.trim_end_matches('/')
        );

        let mut request = self.client.post(&url);
        if let Some(token) = &self.bearer {
            request = request.bearer_auth(token);
        }

        match request.send().await {
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                if status.is_success() {
                    tracing::info!(%url, %status, "scheduler: trigger accepted");
                } else {
                    tracing::error!(
                        %url,
                        %status,
                        body = head(&body, LOGGED_BODY_CHARS),
                        "scheduler: trigger rejected"
                    );
                }
            }
            Err(error) => {
                tracing::error!(%url, %error, "scheduler: trigger request failed");
            }
        }
    }
}

/// First `max_chars` characters of `text`, cut on a char boundary.
fn head(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
