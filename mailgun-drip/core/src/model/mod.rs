// input types of the scheduler. EX: Template, EmailParams, Campaign....
pub mod webhook;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::{serde_as, DisplayFromStr, PickFirst};

/// Caller supplied variables, re-emitted as `v:<key>` on every stage.
pub type CustomVars = IndexMap<String, Value>;

/// One email of the drip sequence. Subject and body are passed through
/// unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Template {
    pub subject: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

impl Template {
    #[must_use]
    pub fn text(subject: impl Into<String>, text: impl Into<String>) -> Self {
        Self { subject: subject.into(), text: Some(text.into()), html: None }
    }

    #[must_use]
    pub fn html(subject: impl Into<String>, html: impl Into<String>) -> Self {
        Self { subject: subject.into(), text: None, html: Some(html.into()) }
    }
}

/// Parameters of a `send` or `start` call.
#[serde_as]
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailParams {
    pub to: String,

    pub from: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bcc: Option<String>,

    pub templates: Vec<Template>,

    /// Seconds from now; the message is delivered immediately when absent.
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub delay: Option<u64>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub custom_vars: CustomVars,
}

/// The campaign definition handed to `handle_webhook`. Nothing is stored
/// between webhook calls, so every call receives it again.
#[serde_as]
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Campaign {
    #[serde(default)]
    pub templates: Vec<Template>,

    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub delay: Option<u64>,
}
