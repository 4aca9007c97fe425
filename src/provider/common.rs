use std::time::Duration;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::{MAX_BACKOFF_SECS, MAX_RETRIES, ProvidersConfig};
use crate::error::{Result, ShabdkoshError};

/// Wait used when a loading or rate-limited response carries no hint
const DEFAULT_BACKOFF: Duration = Duration::from_secs(2);

/// Bounded retry for "still loading" and rate-limit responses
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub max_backoff: Duration,
}

impl RetryPolicy {
    /// Settings above the hard bounds are clamped
    pub fn from_config(config: &ProvidersConfig) -> Self {
        Self {
            max_retries: config.max_retries.min(MAX_RETRIES),
            max_backoff: Duration::from_secs(config.max_backoff_secs.min(MAX_BACKOFF_SECS)),
        }
    }

    pub fn backoff(&self, hint: Option<Duration>) -> Duration {
        hint.unwrap_or(DEFAULT_BACKOFF).min(self.max_backoff)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            max_backoff: Duration::from_secs(MAX_BACKOFF_SECS),
        }
    }
}

pub fn build_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(concat!("shabdkosh/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(ShabdkoshError::Http)
}

/// Request URLs can carry credentials, so they never reach logs or errors
pub fn redact(error: reqwest::Error) -> ShabdkoshError {
    ShabdkoshError::Http(error.without_url())
}

/// Hugging Face style loading payload: `{"error": "...loading", "estimated_time": 12.3}`
#[derive(Debug, Deserialize)]
struct LoadingHint {
    estimated_time: Option<f64>,
}

/// Send a request, retrying a bounded number of times on 429/503.
///
/// Returns `None` on network errors, timeouts, exhausted retries or any other
/// non-success status. Failures are logged here and never escalated.
pub async fn send_with_retry<F>(
    provider_id: &str,
    policy: &RetryPolicy,
    build: F,
) -> Option<Response>
where
    F: Fn() -> RequestBuilder,
{
    let mut attempt = 0;
    loop {
        let response = match build().send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                warn!("{} timed out: {}", provider_id, e.without_url());
                return None;
            }
            Err(e) => {
                warn!("{} request failed: {}", provider_id, e.without_url());
                return None;
            }
        };

        let status = response.status();
        if status.is_success() {
            return Some(response);
        }

        if status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::SERVICE_UNAVAILABLE {
            let header_hint = retry_after(&response);
            let body = response.text().await.unwrap_or_default();
            let hint = header_hint.or_else(|| estimated_time(&body));

            if attempt < policy.max_retries {
                let wait = policy.backoff(hint);
                info!(
                    "{} responded {} (retry {}/{}), waiting {:.1}s",
                    provider_id,
                    status,
                    attempt + 1,
                    policy.max_retries,
                    wait.as_secs_f64()
                );
                tokio::time::sleep(wait).await;
                attempt += 1;
                continue;
            }

            warn!("{} still unavailable after {} retries ({})", provider_id, attempt, status);
            return None;
        }

        let body = response.text().await.unwrap_or_default();
        warn!("{} returned {}: {}", provider_id, status, truncate(&body, 200));
        return None;
    }
}

fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

fn estimated_time(body: &str) -> Option<Duration> {
    serde_json::from_str::<LoadingHint>(body)
        .ok()
        .and_then(|hint| hint.estimated_time)
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map(Duration::from_secs_f64)
}

/// Read a JSON body into `T`, logging and swallowing shape mismatches
pub async fn read_json<T: serde::de::DeserializeOwned>(provider_id: &str, response: Response) -> Option<T> {
    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            warn!("{} failed to read response: {}", provider_id, e.without_url());
            return None;
        }
    };
    debug!("Raw {} response: {}", provider_id, truncate(&body, 500));

    match serde_json::from_str::<T>(&body) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!("{} returned an unexpected response shape: {}", provider_id, e);
            None
        }
    }
}

/// Strip one layer of matching quotes (ASCII or typographic)
pub fn strip_wrapping_quotes(text: &str) -> &str {
    let text = text.trim();
    for (open, close) in [('"', '"'), ('\'', '\''), ('“', '”'), ('‘', '’'), ('«', '»')] {
        if text.chars().count() >= 2 && text.starts_with(open) && text.ends_with(close) {
            let inner = &text[open.len_utf8()..text.len() - close.len_utf8()];
            return inner.trim();
        }
    }
    text
}

/// Remove a leading label such as `Translation:` (case-insensitive)
pub fn strip_label<'a>(text: &'a str, labels: &[&str]) -> &'a str {
    let text = text.trim();
    for label in labels {
        if text.len() >= label.len()
            && text.is_char_boundary(label.len())
            && text[..label.len()].eq_ignore_ascii_case(label)
        {
            return text[label.len()..].trim();
        }
    }
    text
}

/// Remove a markdown code fence wrapped around the whole text
pub fn remove_markdown_code_blocks(text: &str) -> &str {
    let text = text.trim();
    if text.starts_with("```") && text.ends_with("```") && text.len() >= 6 {
        let inner = &text[3..text.len() - 3];
        // Drop an info string such as ```text
        return match inner.split_once('\n') {
            Some((info, rest)) if !info.trim().contains(' ') => rest.trim(),
            _ => inner.trim(),
        };
    }
    if text.starts_with('`') && text.ends_with('`') && text.len() >= 2 {
        return text[1..text.len() - 1].trim();
    }
    text
}

/// First non-empty line of a multi-line answer
pub fn first_line(text: &str) -> &str {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("")
}

pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_wrapping_quotes() {
        assert_eq!(strip_wrapping_quotes("\"आम\""), "आम");
        assert_eq!(strip_wrapping_quotes("“আম”"), "আম");
        assert_eq!(strip_wrapping_quotes("'x'"), "x");
        assert_eq!(strip_wrapping_quotes("\""), "\"");
        assert_eq!(strip_wrapping_quotes("plain"), "plain");
    }

    #[test]
    fn test_strip_label() {
        assert_eq!(strip_label("Translation: आम", &["Translation:"]), "आम");
        assert_eq!(strip_label("translation:आम", &["Translation:"]), "आम");
        assert_eq!(strip_label("आम", &["Translation:"]), "आम");
    }

    #[test]
    fn test_remove_markdown_code_blocks() {
        assert_eq!(remove_markdown_code_blocks("```\nआम\n```"), "आम");
        assert_eq!(remove_markdown_code_blocks("```text\nआम\n```"), "आम");
        assert_eq!(remove_markdown_code_blocks("`आम`"), "आम");
    }

    #[test]
    fn test_backoff_is_capped() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(Some(Duration::from_secs(60))), Duration::from_secs(10));
        assert_eq!(policy.backoff(None), DEFAULT_BACKOFF);
    }

    #[test]
    fn test_policy_clamps_oversized_settings() {
        let mut config = crate::config::Config::default().providers;
        config.max_retries = 50;
        config.max_backoff_secs = 3600;

        let policy = RetryPolicy::from_config(&config);

        assert_eq!(policy.max_retries, 1);
        assert_eq!(policy.max_backoff, Duration::from_secs(10));
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_retries: 1,
            max_backoff: Duration::from_millis(10),
        }
    }

    #[tokio::test]
    async fn test_refused_connection_gives_none() {
        let url = test_support::closed_port().await;
        let client = build_client(5).unwrap();

        let response = send_with_retry("test", &fast_policy(), || client.get(&url)).await;

        assert!(response.is_none());
    }

    #[tokio::test]
    async fn test_timeout_gives_none() {
        let url = test_support::serve_silence(Duration::from_secs(5)).await;
        let client = build_client(1).unwrap();

        let response = send_with_retry("test", &fast_policy(), || client.get(&url)).await;

        assert!(response.is_none());
    }

    #[tokio::test]
    async fn test_rate_limit_is_retried_once() {
        let (url, server) = test_support::serve_sequence(vec![
            (429, r#"{"error":"Too many requests"}"#),
            (200, r#"{"ok":true}"#),
        ])
        .await;
        let client = build_client(5).unwrap();

        let response = send_with_retry("test", &fast_policy(), || client.get(&url)).await;

        assert_eq!(response.unwrap().status(), StatusCode::OK);
        assert_eq!(server.await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_loading_then_success_is_accepted() {
        let (url, server) = test_support::serve_sequence(vec![
            (503, r#"{"error":"Model is currently loading","estimated_time":20}"#),
            (200, r#"{"ok":true}"#),
        ])
        .await;
        let client = build_client(5).unwrap();

        let response = send_with_retry("test", &fast_policy(), || client.get(&url)).await;

        let body = response.unwrap().text().await.unwrap();
        assert_eq!(body, r#"{"ok":true}"#);
        assert_eq!(server.await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_failed_request_log_omits_url() {
        let url = format!("{}/translate?key=hunter2", test_support::closed_port().await);
        let client = build_client(5).unwrap();
        let (logs, _guard) = test_support::capture_logs();

        let response = send_with_retry("test", &fast_policy(), || client.get(&url)).await;

        assert!(response.is_none());
        let text = test_support::captured_text(&logs);
        assert!(text.contains("test request failed"));
        assert!(!text.contains("hunter2"));
    }

    #[test]
    fn test_estimated_time_hint() {
        let hint = estimated_time(r#"{"error":"Model is currently loading","estimated_time":3.5}"#);
        assert_eq!(hint, Some(Duration::from_secs_f64(3.5)));
        assert_eq!(estimated_time("not json"), None);
    }

    #[tokio::test]
    async fn test_retries_once_on_loading_then_gives_up() {
        let policy = RetryPolicy {
            max_retries: 1,
            max_backoff: Duration::from_millis(10),
        };
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            use tokio::io::{AsyncReadExt, AsyncWriteExt};
            let mut served = 0;
            while let Ok(Ok((mut socket, _))) =
                tokio::time::timeout(Duration::from_millis(500), listener.accept()).await
            {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let body = r#"{"estimated_time":30}"#;
                let response = format!(
                    "HTTP/1.1 503 Service Unavailable\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                socket.write_all(response.as_bytes()).await.unwrap();
                served += 1;
            }
            served
        });

        let client = build_client(5).unwrap();
        let url = format!("http://{}/translate", addr);
        let response = send_with_retry("test", &policy, || client.get(&url)).await;

        assert!(response.is_none());
        assert_eq!(server.await.unwrap(), 2);
    }
}
