//! Follow-up rules as the backend returns them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TaskError;

/// A scheduled follow-up message for a lead.
///
/// Every field is optional on the wire; absent fields decode to their
/// defaults rather than failing the whole payload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FollowUpRule {
    pub id: String,
    pub lead_id: Option<String>,
    pub thread_id: Option<String>,
    /// Messaging channel, e.g. `whatsapp` or `telegram`.
    pub provider: Option<String>,
    /// `SCHEDULED`, `SENT`, `CANCELLED` or `FAILED`.
    pub status: Option<String>,
    /// When the message is due, usually RFC 3339.
    pub scheduled_time: Option<String>,
    pub message: Option<String>,
    pub template: Option<FollowUpTemplate>,
    pub lead: Option<LeadRef>,
    /// Free-form client data. Title, description and priority live here.
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FollowUpTemplate {
    pub name: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LeadRef {
    pub id: Option<String>,
    pub name: Option<String>,
}

impl FollowUpRule {
    /// Metadata as a JSON object.
    ///
    /// Some clients store metadata as a JSON-encoded string; that form is
    /// decoded here. Anything that is not an object yields `None`.
    pub fn metadata_object(&self) -> Option<serde_json::Map<String, Value>> {
        match self.metadata.as_ref()? {
            Value::Object(map) => Some(map.clone()),
            Value::String(raw) => match serde_json::from_str(raw) {
                Ok(Value::Object(map)) => Some(map),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Decode follow-up rules from a backend response body.
///
/// Accepts a bare array, `{"data": [...]}` and `{"data": {"followUps": [...]}}`.
pub fn parse_follow_ups(json: &str) -> Result<Vec<FollowUpRule>, TaskError> {
    let value: Value = serde_json::from_str(json)?;
    let rules = extract_rules(value)?;
    Ok(serde_json::from_value(rules)?)
}

fn extract_rules(value: Value) -> Result<Value, TaskError> {
    match value {
        Value::Array(_) => Ok(value),
        Value::Object(mut root) => match root.remove("data") {
            Some(data @ Value::Array(_)) => Ok(data),
            Some(Value::Object(mut data)) => ["followUps", "followups", "items"]
                .into_iter()
                .find_map(|key| data.remove(key).filter(Value::is_array))
                .ok_or_else(|| {
                    TaskError::UnexpectedEnvelope("`data` holds no follow-up list".to_string())
                }),
            Some(other) => Err(TaskError::UnexpectedEnvelope(format!(
                "`data` is {}",
                kind(&other)
            ))),
            None => Err(TaskError::UnexpectedEnvelope(
                "object without `data`".to_string(),
            )),
        },
        other => Err(TaskError::UnexpectedEnvelope(format!(
            "top level is {}",
            kind(&other)
        ))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
