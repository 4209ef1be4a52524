//! # Health Check
//!
//! Optional best-effort heartbeat: GETs a monitoring URL on a fixed interval.
//! Failures are only logged; message handling never depends on this task.

use anyhow::{Context, Result, bail};
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::domain::config::HealthCheckConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub fn spawn_health_check(config: HealthCheckConfig) -> JoinHandle<()> {
    tokio::spawn(async move {
        let client = reqwest::Client::new();
        let mut interval = tokio::time::interval(Duration::from_secs(config.interval_secs));
        tracing::info!(
            "Health check enabled: {} every {}s",
            config.url,
            config.interval_secs
        );
        loop {
            interval.tick().await;
            if let Err(e) = ping(&client, &config.url).await {
                tracing::warn!("{:#}", e);
            }
        }
    })
}

pub async fn ping(client: &reqwest::Client, url: &str) -> Result<()> {
    let response = client
        .get(url)
        .timeout(REQUEST_TIMEOUT)
        .send()
        .await
        .with_context(|| format!("Health check request to {url} failed"))?;

    let status = response.status();
    if !status.is_success() {
        bail!("Health check failed with status {} for {}", status, url);
    }
    tracing::debug!("Health check ok: {}", url);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves exactly one request with the given status line.
    async fn one_shot_server(status: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let response =
                format!("HTTP/1.1 {status}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
            let _ = socket.write_all(response.as_bytes()).await;
        });
        format!("http://{addr}/ping")
    }

    #[tokio::test]
    async fn test_ping_success() {
        let url = one_shot_server("200 OK").await;
        assert!(ping(&reqwest::Client::new(), &url).await.is_ok());
    }

    #[tokio::test]
    async fn test_ping_bad_status() {
        let url = one_shot_server("503 Service Unavailable").await;
        let err = ping(&reqwest::Client::new(), &url).await.unwrap_err();
        assert!(err.to_string().contains("503"));
    }
}
