//! Assembly of the outbound message for one stage.

use chrono::{DateTime, Utc};
use mail_transport::Message;

use crate::{
    delay::compute_delivery_time,
    error::{Error, Result},
    model::{CustomVars, Template},
    DELIVERY_TIME_FIELD, STAGE_KEY, VARIABLE_PREFIX,
};

/// Everything needed to send one stage of a campaign.
#[derive(Clone, Copy, Debug)]
pub struct StageRequest<'a> {
    pub to: &'a str,
    pub from: &'a str,
    pub bcc: Option<&'a str>,
    pub templates: &'a [Template],
    pub stage: usize,
    pub delay: Option<u64>,
    pub custom_vars: &'a CustomVars,
}

/// Builds the provider message for `request.stage`.
///
/// # Errors
///
/// Returns an error if the stage does not index a template or the delay is
/// beyond the scheduling horizon.
pub fn build_stage_message(request: &StageRequest<'_>, now: DateTime<Utc>) -> Result<Message> {
    let StageRequest { to, from, bcc, templates, stage, delay, custom_vars } = *request;

    let template = templates
        .get(stage)
        .ok_or(Error::StageOutOfRange { stage, count: templates.len() })?;
    let delivery_time = delay.map(|delay| compute_delivery_time(now, delay)).transpose()?;

    Ok(MessageBuilder::new(to, from, &template.subject)
        .bcc(bcc)
        .body(template)
        .delivery_time(delivery_time)
        .custom_vars(custom_vars)
        .stage(stage)
        .build())
}

/// Starts from the required fields and adds optional ones only when they
/// carry a value.
#[derive(Debug)]
pub struct MessageBuilder {
    message: Message,
}

impl MessageBuilder {
    #[must_use]
    pub fn new(to: &str, from: &str, subject: &str) -> Self {
        let mut message = Message::new();
        let _ = message.insert("to", to);
        let _ = message.insert("from", from);
        let _ = message.insert("subject", subject);
        Self { message }
    }

    #[must_use]
    pub fn bcc(mut self, bcc: Option<&str>) -> Self {
        if let Some(bcc) = bcc.filter(|bcc| !bcc.is_empty()) {
            let _ = self.message.insert("bcc", bcc);
        }
        self
    }

    /// Adds whichever of `text` and `html` is non-empty.
    #[must_use]
    pub fn body(mut self, template: &Template) -> Self {
        for (field, body) in [("text", &template.text), ("html", &template.html)] {
            if let Some(body) = body.as_deref().filter(|body| !body.is_empty()) {
                let _ = self.message.insert(field, body);
            }
        }
        self
    }

    #[must_use]
    pub fn delivery_time(mut self, delivery_time: Option<String>) -> Self {
        if let Some(delivery_time) = delivery_time {
            let _ = self.message.insert(DELIVERY_TIME_FIELD, delivery_time);
        }
        self
    }

    #[must_use]
    pub fn custom_vars(mut self, custom_vars: &CustomVars) -> Self {
        for (key, value) in custom_vars {
            if key == STAGE_KEY {
                tracing::warn!("Ignoring custom variable `{key}`, it is reserved for the stage");
                continue;
            }
            let _ = self.message.insert(format!("{VARIABLE_PREFIX}{key}"), value.clone());
        }
        self
    }

    #[must_use]
    pub fn stage(mut self, stage: usize) -> Self {
        let _ = self.message.insert(format!("{VARIABLE_PREFIX}{STAGE_KEY}"), stage);
        self
    }

    #[must_use]
    pub fn build(self) -> Message { self.message }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn now() -> DateTime<Utc> { Utc.with_ymd_and_hms(2020, 4, 22, 10, 20, 30).unwrap() }

    fn templates() -> Vec<Template> {
        vec![Template::text("Test 0", "Sending html email 0"), Template::html("Test 1", "<p>1</p>")]
    }

    #[test]
    fn test_build_stage_message_with_delay() {
        let templates = templates();
        let custom_vars = CustomVars::new();
        let message = build_stage_message(
            &StageRequest {
                to: "a@b.com",
                from: "c@d.com",
                bcc: None,
                templates: &templates,
                stage: 0,
                delay: Some(60),
                custom_vars: &custom_vars,
            },
            now(),
        )
        .unwrap();

        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({
                "to": "a@b.com",
                "from": "c@d.com",
                "subject": "Test 0",
                "text": "Sending html email 0",
                "o:deliverytime": "1587550890",
                "v:stage": 0
            })
        );
    }

    #[test]
    fn test_build_stage_message_without_delay_has_no_delivery_time() {
        let templates = templates();
        let custom_vars = CustomVars::new();
        let message = build_stage_message(
            &StageRequest {
                to: "a@b.com",
                from: "c@d.com",
                bcc: Some("bcc@domain.com"),
                templates: &templates,
                stage: 1,
                delay: None,
                custom_vars: &custom_vars,
            },
            now(),
        )
        .unwrap();

        assert!(!message.contains_key(DELIVERY_TIME_FIELD));
        assert!(!message.contains_key("text"));
        assert_eq!(message.get("html"), Some(&json!("<p>1</p>")));
        assert_eq!(message.get("bcc"), Some(&json!("bcc@domain.com")));
        assert_eq!(message.get("v:stage"), Some(&json!(1)));
    }

    #[test]
    fn test_build_stage_message_zero_delay_sets_delivery_time() {
        let templates = templates();
        let custom_vars = CustomVars::new();
        let message = build_stage_message(
            &StageRequest {
                to: "a@b.com",
                from: "c@d.com",
                bcc: None,
                templates: &templates,
                stage: 0,
                delay: Some(0),
                custom_vars: &custom_vars,
            },
            now(),
        )
        .unwrap();

        assert_eq!(message.get(DELIVERY_TIME_FIELD), Some(&json!("1587550830")));
    }

    #[test]
    fn test_build_stage_message_rejects_out_of_range_stage() {
        let templates = templates();
        let custom_vars = CustomVars::new();
        let err = build_stage_message(
            &StageRequest {
                to: "a@b.com",
                from: "c@d.com",
                bcc: None,
                templates: &templates,
                stage: 2,
                delay: None,
                custom_vars: &custom_vars,
            },
            now(),
        )
        .unwrap_err();

        assert!(matches!(err, Error::StageOutOfRange { stage: 2, count: 2 }));
    }

    #[test]
    fn test_body_includes_both_parts_when_set() {
        let template = Template {
            subject: "Both".to_string(),
            text: Some("plain".to_string()),
            html: Some("<b>rich</b>".to_string()),
        };
        let message = MessageBuilder::new("a@b.com", "c@d.com", "Both").body(&template).build();

        assert_eq!(message.get("text"), Some(&json!("plain")));
        assert_eq!(message.get("html"), Some(&json!("<b>rich</b>")));
    }

    #[test]
    fn test_body_skips_empty_parts() {
        let template =
            Template { subject: "Empty".to_string(), text: Some(String::new()), html: None };
        let message = MessageBuilder::new("a@b.com", "c@d.com", "Empty").body(&template).build();

        assert!(!message.contains_key("text"));
        assert!(!message.contains_key("html"));
    }

    #[test]
    fn test_custom_vars_are_prefixed_and_stage_key_is_reserved() {
        let custom_vars: CustomVars = [
            ("testvar".to_string(), json!("test value")),
            (STAGE_KEY.to_string(), json!(7)),
            ("count".to_string(), json!(3)),
        ]
        .into_iter()
        .collect();

        let message = MessageBuilder::new("a@b.com", "c@d.com", "Test")
            .custom_vars(&custom_vars)
            .stage(1)
            .build();

        assert_eq!(message.get("v:testvar"), Some(&json!("test value")));
        assert_eq!(message.get("v:count"), Some(&json!(3)));
        assert_eq!(message.get("v:stage"), Some(&json!(1)));
    }
}
