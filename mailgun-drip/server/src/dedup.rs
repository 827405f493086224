//! Suppression of redelivered webhooks.
//!
//! The provider retries a webhook until it sees a 2xx, so the same delivery
//! event can arrive more than once. Each event is reduced to a key and the
//! key is remembered for a fixed time; a second event with a live key is not
//! acted on.

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use mailgun_drip_core::WebhookPayload;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

#[derive(Debug)]
pub struct WebhookDeduplicator {
    ttl: Duration,
    seen: Mutex<HashMap<String, Instant>>,
}

impl WebhookDeduplicator {
    #[must_use]
    pub fn new(ttl: Duration) -> Self { Self { ttl, seen: Mutex::new(HashMap::new()) } }

    /// Identity of the delivery event behind `payload`.
    ///
    /// `None` when the payload lacks a part of the identity; such payloads are
    /// rejected by the scheduler anyway.
    #[must_use]
    pub fn key(payload: &WebhookPayload) -> Option<String> {
        let signature = payload.signature.as_ref()?;
        let event_data = payload.event_data.as_ref()?;
        let headers = event_data.headers()?;
        let stage = event_data.stage()?.to_string();

        let mut hasher = Sha256::new();
        for part in [
            headers.to.as_bytes(),
            stage.as_bytes(),
            signature.timestamp.as_bytes(),
            signature.token.as_bytes(),
        ] {
            hasher.update(part);
            hasher.update(b"|");
        }
        Some(hex::encode(hasher.finalize()))
    }

    /// Records `key`, returning `false` if it was already recorded and has
    /// not expired yet.
    pub async fn claim(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut seen = self.seen.lock().await;

        match seen.get(key) {
            Some(expires_at) if *expires_at > now => false,
            _ => {
                let _ = seen.insert(key.to_string(), now + self.ttl);
                true
            }
        }
    }

    /// Forgets `key` so a retry of a failed event is processed again.
    pub async fn release(&self, key: &str) { let _ = self.seen.lock().await.remove(key); }

    /// Drops expired keys, returning how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut seen = self.seen.lock().await;
        let before = seen.len();
        seen.retain(|_, expires_at| *expires_at > now);
        before - seen.len()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn payload(stage: &str, token: &str) -> WebhookPayload {
        serde_json::from_value(json!({
            "signature": { "timestamp": "1500948491", "token": token, "signature": "MOCK_SIGNATURE" },
            "event-data": {
                "message": {
                    "headers": { "to": "toemail@example.com", "from": "fromemail@example.com" }
                },
                "user-variables": { "stage": stage }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_key_identifies_delivery_event() {
        let key = WebhookDeduplicator::key(&payload("0", "MOCK_TOKEN")).unwrap();

        assert_eq!(key.len(), 64);
        assert_eq!(WebhookDeduplicator::key(&payload("0", "MOCK_TOKEN")), Some(key.clone()));
        assert_ne!(WebhookDeduplicator::key(&payload("1", "MOCK_TOKEN")), Some(key.clone()));
        assert_ne!(WebhookDeduplicator::key(&payload("0", "OTHER_TOKEN")), Some(key));
        assert_eq!(WebhookDeduplicator::key(&WebhookPayload::default()), None);
    }

    #[tokio::test]
    async fn test_claim_and_release() {
        let deduplicator = WebhookDeduplicator::new(Duration::from_secs(60));

        assert!(deduplicator.claim("event").await);
        assert!(!deduplicator.claim("event").await);

        deduplicator.release("event").await;
        assert!(deduplicator.claim("event").await);
    }

    #[tokio::test]
    async fn test_expired_keys_are_reclaimable_and_purged() {
        let deduplicator = WebhookDeduplicator::new(Duration::ZERO);

        assert!(deduplicator.claim("event").await);
        assert!(deduplicator.claim("event").await);
        assert_eq!(deduplicator.purge_expired().await, 1);
    }
}
