// src/message.rs
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Shown when the endpoint answers without any usable reply field.
pub const FALLBACK_REPLY: &str = "Sorry, I couldn't generate a reply right now.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(rename = "sessionId", default)]
    pub session_id: Option<String>,
}

/// Reply body of `POST /chatBot/message`.
///
/// Every field is optional so the client tolerates whichever shape the
/// endpoint chooses. [`ChatResponse::texts`] merges them in a fixed order.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
    #[serde(default, deserialize_with = "lenient_list", skip_serializing_if = "Option::is_none")]
    pub replies: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(
        rename = "sessionId",
        default,
        deserialize_with = "lenient_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub session_id: Option<String>,
}

impl ChatResponse {
    /// Reads any parsed body. Anything but an object carries no reply
    /// fields and yields the empty response.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(_) => serde_json::from_value(value).unwrap_or_default(),
            _ => Self::default(),
        }
    }

    /// One reply goes out as `reply`, several as `replies`, none as `{}`.
    pub fn from_replies(mut replies: Vec<String>) -> Self {
        match replies.len() {
            0 => Self::default(),
            1 => Self {
                reply: replies.pop(),
                ..Self::default()
            },
            _ => Self {
                replies: Some(replies),
                ..Self::default()
            },
        }
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// `reply`, then each of `replies`, then `text`.
    pub fn texts(&self) -> Vec<String> {
        let mut out = Vec::new();
        out.extend(self.reply.iter().cloned());
        if let Some(replies) = &self.replies {
            out.extend(replies.iter().cloned());
        }
        out.extend(self.text.iter().cloned());
        out
    }

    /// The bot messages this response turns into. Never empty.
    pub fn bot_texts(&self) -> Vec<String> {
        with_fallback(self.texts())
    }
}

pub fn with_fallback(texts: Vec<String>) -> Vec<String> {
    if texts.is_empty() {
        vec![FALLBACK_REPLY.to_string()]
    } else {
        texts
    }
}

/// A value the thread can show as text. Strings as-is, numbers in JSON
/// notation; booleans, arrays and objects have no text form.
fn display_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Like [`display_text`], but an empty string or a zero counts as absent.
fn present_text(value: Value) -> Option<String> {
    match &value {
        Value::String(s) if s.is_empty() => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        _ => display_text(value),
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(present_text(Value::deserialize(deserializer)?))
}

fn lenient_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => Some(items.into_iter().filter_map(display_text).collect()),
        _ => None,
    })
}

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> ChatResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn reply_then_replies_then_text() {
        let resp = parse(r#"{"text": "D", "replies": ["B", "C"], "reply": "A"}"#);
        assert_eq!(resp.bot_texts(), vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn reply_and_replies() {
        let resp = parse(r#"{"reply": "A", "replies": ["B", "C"]}"#);
        assert_eq!(resp.bot_texts(), vec!["A", "B", "C"]);
    }

    #[test]
    fn empty_body_falls_back() {
        assert_eq!(parse("{}").bot_texts(), vec![FALLBACK_REPLY]);
    }

    #[test]
    fn odd_shapes_are_ignored() {
        let resp = parse(r#"{"reply": "", "replies": "not a list", "text": 0}"#);
        assert!(resp.texts().is_empty());
        assert_eq!(resp.bot_texts(), vec![FALLBACK_REPLY]);

        let resp = parse(r#"{"reply": true, "text": {"nested": "x"}}"#);
        assert_eq!(resp.bot_texts(), vec![FALLBACK_REPLY]);

        let resp = parse(r#"{"replies": ["ok", 7, null, false, "fine"]}"#);
        assert_eq!(resp.texts(), vec!["ok", "7", "fine"]);
    }

    #[test]
    fn numeric_reply_is_shown() {
        let resp = parse(r#"{"reply": 42, "text": 1.5}"#);
        assert_eq!(resp.bot_texts(), vec!["42", "1.5"]);
    }

    #[test]
    fn non_object_bodies_fall_back() {
        for body in [r#""ok""#, "42", "true", "null", "[]", r#"["a"]"#] {
            let value: Value = serde_json::from_str(body).unwrap();
            assert_eq!(
                ChatResponse::from_value(value).bot_texts(),
                vec![FALLBACK_REPLY],
                "body {body}"
            );
        }
    }

    #[test]
    fn object_body_goes_through_the_lenient_fields() {
        let value = serde_json::json!({"reply": "A", "sessionId": 9, "replies": ["B"]});
        let resp = ChatResponse::from_value(value);
        assert_eq!(resp.texts(), vec!["A", "B"]);
        assert_eq!(resp.session_id, None);
    }

    #[test]
    fn unknown_fields_and_session_are_tolerated() {
        let resp = parse(r#"{"reply": "hi", "sessionId": "s_abc", "extra": true}"#);
        assert_eq!(resp.session_id.as_deref(), Some("s_abc"));
        assert_eq!(resp.texts(), vec!["hi"]);
    }

    #[test]
    fn from_replies_picks_shape() {
        let json = serde_json::to_value(ChatResponse::from_replies(vec!["one".into()])).unwrap();
        assert_eq!(json, serde_json::json!({"reply": "one"}));

        let json = serde_json::to_value(
            ChatResponse::from_replies(vec!["a".into(), "b".into()]).with_session("s_1"),
        )
        .unwrap();
        assert_eq!(json, serde_json::json!({"replies": ["a", "b"], "sessionId": "s_1"}));

        assert_eq!(ChatResponse::from_replies(vec![]), ChatResponse::default());
    }

    #[test]
    fn request_uses_camel_case_session() {
        let req: ChatRequest = serde_json::from_str(r#"{"message": "hi", "sessionId": null}"#).unwrap();
        assert_eq!(req.session_id, None);
        let json = serde_json::to_value(ChatRequest {
            message: "hi".into(),
            session_id: Some("s_x".into()),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"message": "hi", "sessionId": "s_x"}));
    }
}
