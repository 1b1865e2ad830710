use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use channels::{render_all, ChannelKind, ChannelPayload};
use delivery::{
    ChannelEndpoints, DeliveryDispatcher, DeliveryError, DeliveryOutcome, DeliveryReport,
    HttpTransport, WebhookTransport,
};
use events::NotificationDocument;
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const TEAMS_URL: &str = "https://teams.example.test/hook";
const SLACK_URL: &str = "https://slack.example.test/hook";

// ---------------------------------------------------------------------------
// Fake transport
// ---------------------------------------------------------------------------

#[derive(Clone, Copy)]
enum Behaviour {
    Accept,
    Reject,
    Panic,
}

struct FakeTransport {
    teams: Behaviour,
    slack: Behaviour,
    posted: Mutex<Vec<(String, Value)>>,
}

impl FakeTransport {
    fn new(teams: Behaviour, slack: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            teams,
            slack,
            posted: Mutex::new(Vec::new()),
        })
    }

    fn posted_urls(&self) -> Vec<String> {
        let mut urls: Vec<_> = self
            .posted
            .lock()
            .unwrap()
            .iter()
            .map(|(u, _)| u.clone())
            .collect();
        urls.sort();
        urls
    }
}

#[async_trait]
impl WebhookTransport for FakeTransport {
    async fn post_json(&self, url: &str, body: &Value) -> Result<(), DeliveryError> {
        self.posted
            .lock()
            .unwrap()
            .push((url.to_string(), body.clone()));
        let behaviour = if url == TEAMS_URL { self.teams } else { self.slack };
        match behaviour {
            Behaviour::Accept => Ok(()),
            Behaviour::Reject => Err(DeliveryError::Status {
                status: 500,
                body: "boom".to_string(),
            }),
            Behaviour::Panic => panic!("transport exploded"),
        }
    }
}

fn payloads() -> Vec<ChannelPayload> {
    render_all(&NotificationDocument::new("🔄 Webhook Test Ping"))
}

fn both_endpoints() -> ChannelEndpoints {
    ChannelEndpoints::new()
        .with(ChannelKind::Teams, TEAMS_URL)
        .with(ChannelKind::Slack, SLACK_URL)
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

#[tokio::test]
async fn every_configured_channel_is_sent() {
    let transport = FakeTransport::new(Behaviour::Accept, Behaviour::Accept);
    let dispatcher = DeliveryDispatcher::new(transport.clone(), both_endpoints());

    let report = dispatcher.deliver(payloads()).await;

    assert_eq!(report.outcome(ChannelKind::Teams), Some(DeliveryOutcome::Sent));
    assert_eq!(report.outcome(ChannelKind::Slack), Some(DeliveryOutcome::Sent));
    assert_eq!(transport.posted_urls(), vec![SLACK_URL, TEAMS_URL]);
}

#[tokio::test]
async fn one_failing_channel_does_not_affect_the_other() {
    let transport = FakeTransport::new(Behaviour::Accept, Behaviour::Reject);
    let dispatcher = DeliveryDispatcher::new(transport, both_endpoints());

    let report = dispatcher.deliver(payloads()).await;

    assert_eq!(
        serde_json::to_value(&report).unwrap(),
        json!({ "teams": "sent", "slack": "failed" })
    );
}

#[tokio::test]
async fn unconfigured_channel_is_skipped_without_a_post() {
    let transport = FakeTransport::new(Behaviour::Accept, Behaviour::Accept);
    let endpoints = ChannelEndpoints::new()
        .with(ChannelKind::Teams, TEAMS_URL)
        .with(ChannelKind::Slack, "   ");
    let dispatcher = DeliveryDispatcher::new(transport.clone(), endpoints);

    let report = dispatcher.deliver(payloads()).await;

    assert_eq!(report.outcome(ChannelKind::Teams), Some(DeliveryOutcome::Sent));
    assert_eq!(report.outcome(ChannelKind::Slack), Some(DeliveryOutcome::Skipped));
    assert_eq!(transport.posted_urls(), vec![TEAMS_URL]);
}

#[tokio::test]
async fn panicking_delivery_is_recorded_as_failed() {
    let transport = FakeTransport::new(Behaviour::Panic, Behaviour::Accept);
    let dispatcher = DeliveryDispatcher::new(transport, both_endpoints());

    let report = dispatcher.deliver(payloads()).await;

    assert_eq!(report.outcome(ChannelKind::Teams), Some(DeliveryOutcome::Failed));
    assert_eq!(report.outcome(ChannelKind::Slack), Some(DeliveryOutcome::Sent));
}

#[tokio::test]
async fn nothing_configured_skips_everything() {
    let transport = FakeTransport::new(Behaviour::Accept, Behaviour::Accept);
    let dispatcher = DeliveryDispatcher::new(transport.clone(), ChannelEndpoints::new());

    let report = dispatcher.deliver(payloads()).await;

    assert_eq!(report, DeliveryReport::skipped_all());
    assert_eq!(report.count(DeliveryOutcome::Skipped), 2);
    assert!(transport.posted_urls().is_empty());
}

// ---------------------------------------------------------------------------
// HTTP transport
// ---------------------------------------------------------------------------

/// Accepts one connection and answers with `status`. Yields the raw request.
async fn respond_once(status: &'static str) -> (String, tokio::task::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                let content_length = head
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + content_length {
                    break;
                }
            }
        }
        let response =
            format!("HTTP/1.1 {status}\r\ncontent-length: 2\r\nconnection: close\r\n\r\nok");
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
        String::from_utf8_lossy(&buf).into_owned()
    });

    (format!("http://{addr}/hook"), handle)
}

fn http_transport() -> HttpTransport {
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    HttpTransport::with_client(client, Duration::from_secs(5))
}

#[tokio::test]
async fn http_transport_posts_json() {
    let (url, server) = respond_once("200 OK").await;

    http_transport()
        .post_json(&url, &json!({ "text": "hello" }))
        .await
        .unwrap();

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /hook HTTP/1.1"));
    assert!(request
        .to_lowercase()
        .contains("content-type: application/json"));
    assert!(request.ends_with(r#"{"text":"hello"}"#));
}

#[tokio::test]
async fn http_transport_reports_rejections() {
    let (url, _server) = respond_once("400 Bad Request").await;

    let err = http_transport()
        .post_json(&url, &json!({}))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        DeliveryError::Status {
            status: 400,
            body: "ok".to_string()
        }
    );
}
