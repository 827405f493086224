#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use mail_transport::{MailTransport, Message, SendResponse};
use mailgun_drip_core::{
    Campaign, EmailParams, FixedClock, Scheduler, SchedulerOptions, Template, WebhookPayload,
};
use serde_json::{json, Value};

/// Transport double recording every message it is asked to send.
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<Message>>,
    reject_signatures: AtomicBool,
    validations: AtomicUsize,
    fail_next_send: Mutex<Option<String>>,
    fail_unsubscribe: AtomicBool,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> { Arc::new(Self::default()) }

    pub fn sent(&self) -> Vec<Message> { self.sent.lock().unwrap().clone() }

    pub fn send_count(&self) -> usize { self.sent.lock().unwrap().len() }

    pub fn validation_count(&self) -> usize { self.validations.load(Ordering::SeqCst) }

    pub fn reject_signatures(&self) { self.reject_signatures.store(true, Ordering::SeqCst); }

    pub fn fail_next_send(&self, message: &str) {
        *self.fail_next_send.lock().unwrap() = Some(message.to_string());
    }

    pub fn fail_unsubscribe(&self) { self.fail_unsubscribe.store(true, Ordering::SeqCst); }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn send_message(&self, message: &Message) -> Result<SendResponse, mail_transport::Error> {
        if let Some(message) = self.fail_next_send.lock().unwrap().take() {
            return Err(mail_transport::Error::SendMessage { status: 500, message });
        }

        let mut sent = self.sent.lock().unwrap();
        sent.push(message.clone());
        Ok(SendResponse {
            id: format!("<{}@mg.example.com>", sent.len()),
            message: "Queued. Thank you.".to_string(),
        })
    }

    async fn validate_webhook(&self, _timestamp: i64, _token: &str, _signature: &str) -> bool {
        let _ = self.validations.fetch_add(1, Ordering::SeqCst);
        !self.reject_signatures.load(Ordering::SeqCst)
    }

    async fn unsubscribe(&self, address: &str) -> Result<bool, mail_transport::Error> {
        if self.fail_unsubscribe.load(Ordering::SeqCst) {
            return Err(mail_transport::Error::Unsubscribe {
                address: address.to_string(),
                status: 401,
                message: "Forbidden".to_string(),
            });
        }
        Ok(true)
    }
}

/// 2020-04-22T10:20:30Z
pub fn now() -> DateTime<Utc> { Utc.with_ymd_and_hms(2020, 4, 22, 10, 20, 30).unwrap() }

pub const NOW_SECS: i64 = 1_587_550_830;

pub fn options(validate_webhooks: bool) -> SchedulerOptions {
    SchedulerOptions {
        api_key: Some("MOCK_API".to_string()),
        domain: Some("MOCK_DOMAIN".to_string()),
        validate_webhooks,
        ..SchedulerOptions::default()
    }
}

pub fn build_scheduler(transport: &Arc<RecordingTransport>, validate_webhooks: bool) -> Scheduler {
    let transport: Arc<dyn MailTransport> = transport.clone();
    Scheduler::with_transport(&options(validate_webhooks), transport)
        .unwrap()
        .with_clock(Arc::new(FixedClock::new(now())))
}

pub fn build_templates(total: usize) -> Vec<Template> {
    (0..total).map(|i| Template::text(format!("Test {i}"), format!("Sending text email {i}"))).collect()
}

pub fn build_email_params() -> EmailParams {
    EmailParams {
        to: "toemail@domain.com".to_string(),
        from: "fromemail@domain.com".to_string(),
        delay: Some(60),
        templates: build_templates(3),
        ..EmailParams::default()
    }
}

pub fn build_campaign(templates: usize, delay: u64) -> Campaign {
    Campaign { templates: build_templates(templates), delay: Some(delay) }
}

pub fn build_webhook_payload(stage: Value, custom_vars: &[(&str, Value)]) -> WebhookPayload {
    let mut user_variables = serde_json::Map::new();
    let _ = user_variables.insert("stage".to_string(), stage);
    for (key, value) in custom_vars {
        let _ = user_variables.insert((*key).to_string(), value.clone());
    }

    serde_json::from_value(json!({
        "signature": {
            "timestamp": "1500948491",
            "token": "MOCK_TOKEN",
            "signature": "MOCK_SIGNATURE"
        },
        "event-data": {
            "event": "delivered",
            "message": {
                "headers": {
                    "to": "toemail@example.com",
                    "from": "fromemail@example.com"
                }
            },
            "user-variables": user_variables
        }
    }))
    .unwrap()
}
