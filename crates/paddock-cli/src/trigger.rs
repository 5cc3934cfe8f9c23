//! Trigger command handler: fire one result ingestion by hand.

use paddock_core::{AppConfig, TriggerKind};

/// POST one trigger route on the running server and print the stored event.
///
/// Sends the first configured API key as the bearer token, the same
/// credential the scheduler's dispatcher uses.
///
/// # Errors
///
/// Returns an error if the request cannot be sent or the server answers
/// with a non-success status.
pub(crate) async fn run_trigger(
    config: &AppConfig,
    category: TriggerKind,
    year: i32,
    round: i32,
) -> anyhow::Result<()> {
    let url = format!(
        "{}/api/results/{category}/{year}/{round}",
        config.base_url.trim_end_matches('/')
    );

    let client = reqwest::Client::new();
    let mut request = client.post(&url);
    if let Some(token) = bearer_token() {
        request = request.bearer_auth(token);
    }

    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    if !status.is_success() {
        anyhow::bail!("trigger {url} failed with {status}: {body}");
    }

    println!("{status}");
    match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json["data"])?),
        Err(_) => println!("{body}"),
    }
    Ok(())
}

/// First key from `PADDOCK_API_KEYS`, if any are configured.
fn bearer_token() -> Option<String> {
    std::env::var("PADDOCK_API_KEYS")
        .ok()?
        .split(',')
        .map(str::trim)
        .find(|key| !key.is_empty())
        .map(str::to_string)
}
