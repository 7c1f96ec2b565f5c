use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn from_wire(raw: &str) -> Option<Self> {
        match raw {
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            _ => None,
        }
    }

    pub fn wire_name(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// Content-kind tag of an artifact. The backend speaks MIME-like strings;
/// unknown tags are preserved verbatim so they survive a round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactKind {
    Code,
    Markdown,
    Html,
    Svg,
    Diagram,
    Other(String),
}

impl ArtifactKind {
    pub fn from_wire(raw: &str) -> Self {
        match raw {
            "application/vnd.ant.code" => ArtifactKind::Code,
            "text/markdown" => ArtifactKind::Markdown,
            "text/html" => ArtifactKind::Html,
            "image/svg+xml" => ArtifactKind::Svg,
            "application/vnd.ant.mermaid" => ArtifactKind::Diagram,
            other => ArtifactKind::Other(other.to_string()),
        }
    }

    pub fn wire_name(&self) -> &str {
        match self {
            ArtifactKind::Code => "application/vnd.ant.code",
            ArtifactKind::Markdown => "text/markdown",
            ArtifactKind::Html => "text/html",
            ArtifactKind::Svg => "image/svg+xml",
            ArtifactKind::Diagram => "application/vnd.ant.mermaid",
            ArtifactKind::Other(raw) => raw,
        }
    }
}

/// A typed block of generated content attached to an assistant message.
/// `content` is always UTF-8 text; `language` is only meaningful for code.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub id: String,
    pub title: Option<String>,
    pub kind: ArtifactKind,
    pub content: String,
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub artifacts: Vec<Artifact>,
}

impl Message {
    pub fn user(id: String, content: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            role: Role::User,
            content,
            timestamp,
            artifacts: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversationSummary {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub message_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_kind_maps_known_wire_tags() {
        assert_eq!(
            ArtifactKind::from_wire("application/vnd.ant.code"),
            ArtifactKind::Code
        );
        assert_eq!(ArtifactKind::from_wire("text/markdown"), ArtifactKind::Markdown);
        assert_eq!(ArtifactKind::from_wire("text/html"), ArtifactKind::Html);
        assert_eq!(ArtifactKind::from_wire("image/svg+xml"), ArtifactKind::Svg);
        assert_eq!(
            ArtifactKind::from_wire("application/vnd.ant.mermaid"),
            ArtifactKind::Diagram
        );
    }

    #[test]
    fn unknown_artifact_kind_survives_round_trip() {
        let kind = ArtifactKind::from_wire("application/x-custom");
        assert_eq!(kind, ArtifactKind::Other("application/x-custom".to_string()));
        assert_eq!(kind.wire_name(), "application/x-custom");
    }

    #[test]
    fn role_rejects_unknown_names() {
        assert_eq!(Role::from_wire("user"), Some(Role::User));
        assert_eq!(Role::from_wire("assistant"), Some(Role::Assistant));
        assert_eq!(Role::from_wire("system"), None);
    }
}
