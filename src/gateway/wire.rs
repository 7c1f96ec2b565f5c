//! JSON shapes of the backend API. Timestamps cross the boundary as
//! ISO-8601 strings and become `DateTime<Utc>` on entry; the backend emits
//! both offset-carrying RFC 3339 values and naive local-less ones, so both
//! forms must parse.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

use super::GatewayError;
use crate::model::{Artifact, ArtifactKind, Conversation, ConversationSummary, Message, Role};

#[derive(Debug, Deserialize)]
pub struct ConversationWire {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub messages: Vec<MessageWire>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct MessageWire {
    pub id: String,
    pub role: String,
    pub content: String,
    pub timestamp: String,
    #[serde(default)]
    pub artifacts: Option<Vec<ArtifactWire>>,
}

#[derive(Debug, Deserialize)]
pub struct ArtifactWire {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SummaryWire {
    pub id: String,
    pub title: String,
    pub created_at: String,
    pub updated_at: String,
    pub message_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct SendResponseWire {
    pub conversation: ConversationWire,
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, GatewayError> {
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Ok(with_offset.with_timezone(&Utc));
    }
    // Naive values (no offset) are taken as UTC.
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|err| GatewayError::Payload(format!("bad timestamp {raw:?}: {err}")))
}

impl TryFrom<ConversationWire> for Conversation {
    type Error = GatewayError;

    fn try_from(wire: ConversationWire) -> Result<Self, GatewayError> {
        let messages = wire
            .messages
            .into_iter()
            .map(Message::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Conversation {
            id: wire.id,
            title: wire.title,
            messages,
            created_at: parse_timestamp(&wire.created_at)?,
            updated_at: parse_timestamp(&wire.updated_at)?,
        })
    }
}

impl TryFrom<MessageWire> for Message {
    type Error = GatewayError;

    fn try_from(wire: MessageWire) -> Result<Self, GatewayError> {
        let role = Role::from_wire(&wire.role)
            .ok_or_else(|| GatewayError::Payload(format!("unknown role {:?}", wire.role)))?;
        let artifacts = wire
            .artifacts
            .unwrap_or_default()
            .into_iter()
            .map(Artifact::from)
            .collect();
        Ok(Message {
            id: wire.id,
            role,
            content: wire.content,
            timestamp: parse_timestamp(&wire.timestamp)?,
            artifacts,
        })
    }
}

impl From<ArtifactWire> for Artifact {
    fn from(wire: ArtifactWire) -> Self {
        Artifact {
            id: wire.id,
            title: wire.title.filter(|t| !t.is_empty()),
            kind: ArtifactKind::from_wire(&wire.kind),
            content: wire.content,
            language: wire.language.filter(|l| !l.is_empty()),
        }
    }
}

impl TryFrom<SummaryWire> for ConversationSummary {
    type Error = GatewayError;

    fn try_from(wire: SummaryWire) -> Result<Self, GatewayError> {
        Ok(ConversationSummary {
            id: wire.id,
            title: wire.title,
            created_at: parse_timestamp(&wire.created_at)?,
            updated_at: parse_timestamp(&wire.updated_at)?,
            message_count: wire.message_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3339_and_naive_timestamps() {
        let with_offset = parse_timestamp("2024-05-01T10:30:00+02:00").expect("offset form");
        assert_eq!(with_offset.to_rfc3339(), "2024-05-01T08:30:00+00:00");

        let naive = parse_timestamp("2024-05-01T10:30:00.123456").expect("naive form");
        assert_eq!(naive.timestamp_subsec_micros(), 123456);

        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn decodes_a_full_conversation_payload() {
        let raw = r#"{
            "id": "conv-1",
            "title": "Fibonacci",
            "messages": [
                {
                    "id": "m1",
                    "role": "user",
                    "content": "show me code",
                    "timestamp": "2024-05-01T10:00:00"
                },
                {
                    "id": "m2",
                    "role": "assistant",
                    "content": "Here you go.",
                    "timestamp": "2024-05-01T10:00:05",
                    "artifacts": [
                        {
                            "id": "a1",
                            "title": "Example",
                            "type": "application/vnd.ant.code",
                            "content": "print(1)",
                            "language": "python"
                        }
                    ]
                }
            ],
            "created_at": "2024-05-01T09:59:00",
            "updated_at": "2024-05-01T10:00:05"
        }"#;

        let wire: ConversationWire = serde_json::from_str(raw).expect("payload should parse");
        let conversation = Conversation::try_from(wire).expect("payload should convert");

        assert_eq!(conversation.messages.len(), 2);
        assert_eq!(conversation.messages[0].role, Role::User);
        let artifact = &conversation.messages[1].artifacts[0];
        assert_eq!(artifact.kind, ArtifactKind::Code);
        assert_eq!(artifact.language.as_deref(), Some("python"));
    }

    #[test]
    fn empty_language_and_title_become_none() {
        let wire = ArtifactWire {
            id: "a1".to_string(),
            title: Some(String::new()),
            kind: "application/vnd.ant.code".to_string(),
            content: "x = 1".to_string(),
            language: Some(String::new()),
        };
        let artifact = Artifact::from(wire);
        assert_eq!(artifact.title, None);
        assert_eq!(artifact.language, None);
    }

    #[test]
    fn unknown_role_is_a_payload_error() {
        let wire = MessageWire {
            id: "m1".to_string(),
            role: "system".to_string(),
            content: String::new(),
            timestamp: "2024-05-01T10:00:00".to_string(),
            artifacts: None,
        };
        assert!(matches!(
            Message::try_from(wire),
            Err(GatewayError::Payload(_))
        ));
    }
}
