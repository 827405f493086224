#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::{TimeZone, Utc};
use mail_transport::{MailTransport, Message, SendResponse};
use mailgun_drip_core::{
    config::CampaignConfig, Campaign, FixedClock, Scheduler, SchedulerOptions, ServerInfo, Template,
};
use mailgun_drip_server::{ServiceState, WebhookDeduplicator};
use serde_json::{json, Value};
use tokio::sync::Notify;

pub const NOW_SECS: i64 = 1_587_550_830;

/// Signature the transport double holds until [`RecordingTransport::release_forged`]
/// and then rejects.
pub const FORGED_SIGNATURE: &str = "FORGED_SIGNATURE";

/// Transport double recording what the receiver sends.
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<Message>>,
    reject_signatures: AtomicBool,
    fail_sends: AtomicBool,
    unsubscribed: Mutex<Vec<String>>,
    forged_gate: Notify,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> { Arc::new(Self::default()) }

    pub fn sent(&self) -> Vec<Message> { self.sent.lock().unwrap().clone() }

    pub fn unsubscribed(&self) -> Vec<String> { self.unsubscribed.lock().unwrap().clone() }

    pub fn reject_signatures(&self) { self.reject_signatures.store(true, Ordering::SeqCst); }

    pub fn fail_sends(&self, fail: bool) { self.fail_sends.store(fail, Ordering::SeqCst); }

    pub fn release_forged(&self) { self.forged_gate.notify_one(); }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn send_message(&self, message: &Message) -> Result<SendResponse, mail_transport::Error> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(mail_transport::Error::SendMessage {
                status: 500,
                message: "Fail".to_string(),
            });
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(SendResponse { id: "<1@mg.example.com>".to_string(), message: "Queued".to_string() })
    }

    async fn validate_webhook(&self, _timestamp: i64, _token: &str, signature: &str) -> bool {
        if signature == FORGED_SIGNATURE {
            self.forged_gate.notified().await;
            return false;
        }
        !self.reject_signatures.load(Ordering::SeqCst)
    }

    async fn unsubscribe(&self, address: &str) -> Result<bool, mail_transport::Error> {
        self.unsubscribed.lock().unwrap().push(address.to_string());
        Ok(true)
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub transport: Arc<RecordingTransport>,
}

pub fn campaign_config(initial_delay: bool) -> CampaignConfig {
    CampaignConfig {
        from: "fromemail@domain.com".to_string(),
        bcc: None,
        campaign: Campaign {
            templates: vec![
                Template::text("Email 1", "Email 1 text"),
                Template::text("Email 2", "Email 2 text"),
            ],
            delay: Some(120),
        },
        initial_delay,
    }
}

pub fn server_info() -> ServerInfo {
    ServerInfo {
        version: "0.1.0".to_string(),
        branch: "main".to_string(),
        commit_hash: "0000000".to_string(),
        mailgun_domain: "MOCK_DOMAIN".to_string(),
        validate_webhooks: true,
        start_time: Utc.with_ymd_and_hms(2020, 4, 22, 10, 0, 0).unwrap(),
    }
}

pub fn create_test_app(initial_delay: bool, dedup: bool) -> TestApp {
    let transport = RecordingTransport::new();
    let options = SchedulerOptions {
        api_key: Some("MOCK_API".to_string()),
        domain: Some("MOCK_DOMAIN".to_string()),
        validate_webhooks: true,
        ..SchedulerOptions::default()
    };
    let clock = FixedClock::new(Utc.with_ymd_and_hms(2020, 4, 22, 10, 20, 30).unwrap());
    let scheduler = Scheduler::with_transport(&options, transport.clone())
        .unwrap()
        .with_clock(Arc::new(clock));

    let deduplicator = dedup
        .then(|| Arc::new(WebhookDeduplicator::new(std::time::Duration::from_secs(3600))));
    let state = ServiceState::new(scheduler, campaign_config(initial_delay), deduplicator);

    let server = TestServer::new(mailgun_drip_server::router(state, server_info()))
        .expect("Failed to create test server");

    TestApp { server, transport }
}

pub fn webhook_payload(stage: Value) -> Value { signed_webhook_payload(stage, "MOCK_SIGNATURE") }

pub fn signed_webhook_payload(stage: Value, signature: &str) -> Value {
    json!({
        "signature": {
            "timestamp": "1500948491",
            "token": "MOCK_TOKEN",
            "signature": signature
        },
        "event-data": {
            "event": "delivered",
            "message": {
                "headers": {
                    "to": "toemail@example.com",
                    "from": "fromemail@example.com"
                }
            },
            "user-variables": {
                "stage": stage,
                "testvar1": "test value 1"
            }
        }
    })
}
