//! # Mail Transport Crate
//!
//! This crate provides the transport side of the drip scheduler: a small
//! trait describing what a transactional mail provider must offer, and a
//! Mailgun implementation of it.
//!
//! ## Features
//!
//! - Send pre-assembled messages as provider form fields
//! - Webhook signature verification (HMAC-SHA256)
//! - Unsubscribe an address
//! - Async/await support

mod error;
pub mod mailgun;
pub mod signature;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use error::Error;

/// An outbound message as an ordered set of provider fields.
///
/// Field names are passed to the provider verbatim, e.g. `to`, `subject`,
/// `o:deliverytime` or `v:stage`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Message(IndexMap<String, Value>);

impl Message {
    #[inline]
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Inserts a field, returning the previous value if the field was already
    /// present. Insertion order is preserved.
    pub fn insert<K, V>(&mut self, key: K, value: V) -> Option<Value>
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.0.insert(key.into(), value.into())
    }

    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> { self.0.get(key) }

    #[inline]
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool { self.0.contains_key(key) }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize { self.0.len() }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> { self.0.iter() }

    /// Encodes the message as `application/x-www-form-urlencoded` pairs.
    ///
    /// Strings are sent as-is, every other value is sent as its JSON text.
    #[must_use]
    pub fn to_form(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                };
                (key.clone(), value)
            })
            .collect()
    }
}

impl FromIterator<(String, Value)> for Message {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Response returned by the provider once a message has been queued.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SendResponse {
    /// Provider message identifier.
    #[serde(default)]
    pub id: String,

    /// Human readable status, e.g. `Queued. Thank you.`
    #[serde(default)]
    pub message: String,
}

/// Trait for transports that can deliver drip campaign messages.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Sends a message.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider could not be reached or rejected the
    /// message.
    async fn send_message(&self, message: &Message) -> Result<SendResponse, Error>;

    /// Verifies the signature block of an inbound webhook.
    async fn validate_webhook(&self, timestamp: i64, token: &str, signature: &str) -> bool;

    /// Removes `address` from future deliveries.
    ///
    /// # Errors
    ///
    /// Returns an error unless the provider answers with HTTP 200.
    async fn unsubscribe(&self, address: &str) -> Result<bool, Error>;
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_message_to_form_keeps_order_and_encodes_scalars() {
        let mut message = Message::new();
        drop(message.insert("to", "a@b.com"));
        drop(message.insert("subject", "Hello"));
        drop(message.insert("v:stage", 2));
        drop(message.insert("v:flag", true));

        assert_eq!(
            message.to_form(),
            vec![
                ("to".to_string(), "a@b.com".to_string()),
                ("subject".to_string(), "Hello".to_string()),
                ("v:stage".to_string(), "2".to_string()),
                ("v:flag".to_string(), "true".to_string()),
            ]
        );
    }

    #[test]
    fn test_message_insert_replaces_existing_field() {
        let mut message = Message::new();
        assert!(message.insert("v:stage", 0).is_none());
        assert_eq!(message.insert("v:stage", 1), Some(json!(0)));
        assert_eq!(message.get("v:stage"), Some(&json!(1)));
        assert_eq!(message.len(), 1);
    }

    #[test]
    fn test_message_serializes_as_plain_mapping() {
        let message: Message =
            vec![("to".to_string(), json!("a@b.com")), ("v:stage".to_string(), json!(0))]
                .into_iter()
                .collect();

        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({ "to": "a@b.com", "v:stage": 0 })
        );
    }
}
