//! Inbound Mailgun webhook payload.
//!
//! Only the parts the stage advancer reads are typed; every other field is
//! kept in the `extra` maps so the payload can be logged or echoed back.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::{serde_as, DefaultOnNull};

use crate::{model::CustomVars, stage, STAGE_KEY};

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct WebhookPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<Signature>,

    #[serde(rename = "event-data", default, skip_serializing_if = "Option::is_none")]
    pub event_data: Option<EventData>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Signature {
    pub timestamp: String,
    pub token: String,
    pub signature: String,
}

impl Signature {
    /// The signed timestamp as Unix seconds, `None` when it is not an integer.
    #[must_use]
    pub fn timestamp_secs(&self) -> Option<i64> { self.timestamp.trim().parse().ok() }
}

#[serde_as]
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<EventMessage>,

    #[serde(rename = "user-variables", default)]
    #[serde_as(as = "DefaultOnNull")]
    pub user_variables: IndexMap<String, Value>,

    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl EventData {
    /// The completed stage echoed back by the provider.
    #[must_use]
    pub fn stage(&self) -> Option<usize> {
        self.user_variables.get(STAGE_KEY).and_then(stage::parse_stage_marker)
    }

    /// Every user variable except the stage marker, in payload order.
    #[must_use]
    pub fn custom_vars(&self) -> CustomVars {
        self.user_variables
            .iter()
            .filter(|(key, _)| key.as_str() != STAGE_KEY)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    #[must_use]
    pub fn headers(&self) -> Option<&MessageHeaders> {
        self.message.as_ref().and_then(|message| message.headers.as_ref())
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<MessageHeaders>,

    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct MessageHeaders {
    pub to: String,

    pub from: String,

    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn payload() -> WebhookPayload {
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
                        "from": "fromemail@example.com",
                        "subject": "Test 0",
                        "message-id": "20200422102030.1.ABC@mg.example.com"
                    }
                },
                "user-variables": {
                    "stage": "0",
                    "testvar1": "test value 1",
                    "testvar2": 2
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_parse_webhook_payload() {
        let payload = payload();

        let signature = payload.signature.unwrap();
        assert_eq!(signature.timestamp_secs(), Some(1_500_948_491));

        let event_data = payload.event_data.unwrap();
        assert_eq!(event_data.stage(), Some(0));
        assert_eq!(event_data.extra.get("event"), Some(&json!("delivered")));

        let headers = event_data.headers().unwrap();
        assert_eq!(headers.to, "toemail@example.com");
        assert_eq!(headers.from, "fromemail@example.com");
        assert_eq!(headers.extra.get("subject"), Some(&json!("Test 0")));
    }

    #[test]
    fn test_custom_vars_exclude_stage_marker() {
        let event_data = payload().event_data.unwrap();
        let custom_vars = event_data.custom_vars();

        assert_eq!(custom_vars.len(), 2);
        assert!(!custom_vars.contains_key(STAGE_KEY));
        assert_eq!(custom_vars.get_index(0), Some((&"testvar1".to_string(), &json!("test value 1"))));
        assert_eq!(custom_vars.get_index(1), Some((&"testvar2".to_string(), &json!(2))));
    }

    #[test]
    fn test_missing_blocks_deserialize_as_none() {
        let payload: WebhookPayload = serde_json::from_value(json!({})).unwrap();
        assert!(payload.signature.is_none());
        assert!(payload.event_data.is_none());

        let event_data: EventData =
            serde_json::from_value(json!({ "user-variables": null })).unwrap();
        assert!(event_data.user_variables.is_empty());
        assert_eq!(event_data.stage(), None);
        assert!(event_data.headers().is_none());
    }

    #[test]
    fn test_invalid_signature_timestamp() {
        let signature = Signature {
            timestamp: "not-a-number".to_string(),
            token: String::new(),
            signature: String::new(),
        };
        assert_eq!(signature.timestamp_secs(), None);
    }
}
