//! In-memory gateway simulator. Seeds a demo conversation whose assistant
//! turn carries one artifact of each interesting kind, and synthesizes
//! replies to new messages so the client can run without a backend.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{ChatGateway, GatewayError, OutgoingFile, SendOutcome};
use crate::model::{
    Artifact, ArtifactKind, Conversation, ConversationSummary, Message, Role,
};

pub const DEMO_CONVERSATION_ID: &str = "demo-conversation";

pub struct MockGateway {
    conversations: Mutex<HashMap<String, Conversation>>,
}

impl MockGateway {
    pub fn new() -> Self {
        let demo = demo_conversation();
        let mut conversations = HashMap::new();
        conversations.insert(demo.id.clone(), demo);
        Self {
            conversations: Mutex::new(conversations),
        }
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatGateway for MockGateway {
    async fn get_conversation(&self, id: &str) -> Result<Conversation, GatewayError> {
        let conversations = self.conversations.lock().await;
        conversations
            .get(id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(id.to_string()))
    }

    async fn create_conversation(&self) -> Result<Conversation, GatewayError> {
        let now = Utc::now();
        let conversation = Conversation {
            id: Uuid::new_v4().to_string(),
            title: "New conversation".to_string(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        let mut conversations = self.conversations.lock().await;
        conversations.insert(conversation.id.clone(), conversation.clone());
        Ok(conversation)
    }

    async fn send_message(
        &self,
        conversation_id: &str,
        text: &str,
        _files: Vec<OutgoingFile>,
    ) -> Result<SendOutcome, GatewayError> {
        let mut conversations = self.conversations.lock().await;
        let conversation = conversations
            .get_mut(conversation_id)
            .ok_or_else(|| GatewayError::NotFound(conversation_id.to_string()))?;

        let now = Utc::now();
        conversation.messages.push(Message {
            id: Uuid::new_v4().to_string(),
            role: Role::User,
            content: text.to_string(),
            timestamp: now,
            artifacts: Vec::new(),
        });

        let reply = Message {
            id: Uuid::new_v4().to_string(),
            role: Role::Assistant,
            content: reply_text(text),
            timestamp: now,
            artifacts: reply_artifacts(text),
        };
        conversation.messages.push(reply);
        // Monotonic even if the clock steps backwards.
        conversation.updated_at = conversation.updated_at.max(now);

        if conversation.title == "New conversation" {
            if let Some(title) = derive_title(text) {
                conversation.title = title;
            }
        }

        Ok(SendOutcome {
            conversation: conversation.clone(),
        })
    }

    async fn list_conversations(&self) -> Result<Vec<ConversationSummary>, GatewayError> {
        let conversations = self.conversations.lock().await;
        let mut summaries: Vec<ConversationSummary> = conversations
            .values()
            .map(|c| ConversationSummary {
                id: c.id.clone(),
                title: c.title.clone(),
                created_at: c.created_at,
                updated_at: c.updated_at,
                message_count: c.messages.len(),
            })
            .collect();
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(summaries)
    }
}

fn reply_text(text: &str) -> String {
    let lower = text.to_lowercase();
    if lower.contains("hello") || lower.contains("hi") {
        return "Hello! How can I help you today?".to_string();
    }
    if lower.contains("code") || lower.contains("python") || lower.contains("javascript") {
        return "I'd be happy to help with your coding question. Here's an example \
                implementation in the attached artifact:"
            .to_string();
    }
    if lower.contains("math") || lower.contains("equation") {
        return "The solution can be expressed with the quadratic formula:\n\n\
                $$x = \\frac{-b \\pm \\sqrt{b^2 - 4ac}}{2a}$$\n\n\
                It solves any equation of the form $ax^2 + bx + c = 0$."
            .to_string();
    }
    "Thank you for your message. Here's what I can tell you:\n\n\
     1. The concept you're referring to has several interesting aspects\n\
     2. There are multiple approaches to address this\n\
     3. I can provide more specific information if you clarify your question"
        .to_string()
}

fn reply_artifacts(text: &str) -> Vec<Artifact> {
    let lower = text.to_lowercase();
    if lower.contains("python") {
        return vec![Artifact {
            id: Uuid::new_v4().to_string(),
            title: Some("Python Example".to_string()),
            kind: ArtifactKind::Code,
            content: PYTHON_SNIPPET.to_string(),
            language: Some("python".to_string()),
        }];
    }
    if lower.contains("code") || lower.contains("javascript") {
        return vec![Artifact {
            id: Uuid::new_v4().to_string(),
            title: Some("Code Example".to_string()),
            kind: ArtifactKind::Code,
            content: JAVASCRIPT_SNIPPET.to_string(),
            language: Some("javascript".to_string()),
        }];
    }
    Vec::new()
}

fn derive_title(text: &str) -> Option<String> {
    let words: Vec<&str> = text.split_whitespace().take(6).collect();
    if words.is_empty() {
        return None;
    }
    Some(words.join(" "))
}

fn demo_conversation() -> Conversation {
    let now = Utc::now();
    let start = now - Duration::minutes(60);
    Conversation {
        id: DEMO_CONVERSATION_ID.to_string(),
        title: "Fibonacci walk-through".to_string(),
        messages: vec![
            Message {
                id: Uuid::new_v4().to_string(),
                role: Role::User,
                content: "Can you show me how to calculate the Fibonacci sequence in Python?"
                    .to_string(),
                timestamp: start,
                artifacts: Vec::new(),
            },
            Message {
                id: Uuid::new_v4().to_string(),
                role: Role::Assistant,
                content: DEMO_REPLY.to_string(),
                timestamp: start + Duration::seconds(20),
                artifacts: vec![
                    Artifact {
                        id: "artifact-1".to_string(),
                        title: Some("Fibonacci Sequence in Python".to_string()),
                        kind: ArtifactKind::Code,
                        content: FIBONACCI_SNIPPET.to_string(),
                        language: Some("python".to_string()),
                    },
                    Artifact {
                        id: "artifact-2".to_string(),
                        title: Some("Mathematical Analysis".to_string()),
                        kind: ArtifactKind::Markdown,
                        content: GOLDEN_RATIO_NOTES.to_string(),
                        language: None,
                    },
                    Artifact {
                        id: "artifact-3".to_string(),
                        title: Some("Growth Visualization".to_string()),
                        kind: ArtifactKind::Svg,
                        content: FIBONACCI_SVG.to_string(),
                        language: None,
                    },
                ],
            },
        ],
        created_at: start,
        updated_at: start + Duration::seconds(20),
    }
}

const DEMO_REPLY: &str = "# Fibonacci Sequence\n\n\
The Fibonacci sequence starts with 0 and 1; every later term is the sum of the \
two before it.\n\n\
Mathematically: $F_0 = 0$, $F_1 = 1$, $F_n = F_{n-1} + F_{n-2}$ for $n > 1$.\n\n\
I've attached a Python implementation, a note on the sequence's relationship \
to the golden ratio, and a small visualization of its growth.";

const FIBONACCI_SNIPPET: &str = r#"def fibonacci(n):
    """Return the first n Fibonacci numbers."""
    if n <= 0:
        return []
    if n == 1:
        return [0]
    sequence = [0, 1]
    for i in range(2, n):
        sequence.append(sequence[i - 1] + sequence[i - 2])
    return sequence


if __name__ == "__main__":
    print(fibonacci(10))  # [0, 1, 1, 2, 3, 5, 8, 13, 21, 34]
"#;

const GOLDEN_RATIO_NOTES: &str = r#"# The Golden Ratio

As the sequence progresses, the ratio of consecutive terms approaches:

$$\lim_{n \to \infty} \frac{F_{n+1}}{F_n} = \phi = \frac{1 + \sqrt{5}}{2}$$

## Binet's Formula

The n-th term can be computed directly:

$$F_n = \frac{\phi^n - (1-\phi)^n}{\sqrt{5}}$$
"#;

// The markup contains `"#` sequences, hence the wider raw delimiter.
const FIBONACCI_SVG: &str = r##"<svg viewBox="0 0 320 140" xmlns="http://www.w3.org/2000/svg">
  <rect x="10" y="120" width="24" height="10" fill="#4299e1"/>
  <rect x="44" y="120" width="24" height="10" fill="#4299e1"/>
  <rect x="78" y="110" width="24" height="20" fill="#4299e1"/>
  <rect x="112" y="100" width="24" height="30" fill="#4299e1"/>
  <rect x="146" y="80" width="24" height="50" fill="#4299e1"/>
  <rect x="180" y="50" width="24" height="80" fill="#4299e1"/>
  <rect x="214" y="10" width="24" height="120" fill="#4299e1"/>
  <text x="10" y="138" font-size="9" font-family="sans-serif">0 1 1 2 3 5 8</text>
</svg>"##;

const PYTHON_SNIPPET: &str = r#"def greet(name):
    """A simple greeting function."""
    return f"Hello, {name}!"


if __name__ == "__main__":
    print(greet("World"))
"#;

const JAVASCRIPT_SNIPPET: &str = r#"function categorize(value) {
  if (value < 10) return 'low';
  if (value < 50) return 'medium';
  return 'high';
}

const sample = [5, 25, 75].map(categorize);
console.log(sample);
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seeded_conversation_is_fetchable() {
        let gateway = MockGateway::new();
        let conversation = gateway
            .get_conversation(DEMO_CONVERSATION_ID)
            .await
            .expect("demo conversation exists");
        assert_eq!(conversation.messages.len(), 2);
        assert_eq!(conversation.messages[1].artifacts.len(), 3);
    }

    #[tokio::test]
    async fn demo_svg_artifact_is_intact_markup() {
        let gateway = MockGateway::new();
        let conversation = gateway
            .get_conversation(DEMO_CONVERSATION_ID)
            .await
            .expect("demo conversation exists");
        let svg = &conversation.messages[1].artifacts[2];
        assert_eq!(svg.kind, ArtifactKind::Svg);
        assert!(svg.content.starts_with("<svg"));
        assert!(svg.content.trim_end().ends_with("</svg>"));
        assert!(svg.content.contains(r##"fill="#4299e1""##));
    }

    #[tokio::test]
    async fn missing_conversation_is_not_found() {
        let gateway = MockGateway::new();
        assert!(matches!(
            gateway.get_conversation("nope").await,
            Err(GatewayError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn send_appends_user_and_assistant_messages() {
        let gateway = MockGateway::new();
        let before = gateway
            .get_conversation(DEMO_CONVERSATION_ID)
            .await
            .expect("demo conversation exists");

        let outcome = gateway
            .send_message(DEMO_CONVERSATION_ID, "show me python code", Vec::new())
            .await
            .expect("send succeeds");

        let messages = &outcome.conversation.messages;
        assert_eq!(messages.len(), before.messages.len() + 2);
        assert_eq!(messages[messages.len() - 2].role, Role::User);
        let reply = &messages[messages.len() - 1];
        assert_eq!(reply.role, Role::Assistant);
        assert_eq!(reply.artifacts.len(), 1);
        assert_eq!(reply.artifacts[0].kind, ArtifactKind::Code);
        assert!(outcome.conversation.updated_at >= before.updated_at);
    }

    #[tokio::test]
    async fn created_conversation_shows_up_in_listing() {
        let gateway = MockGateway::new();
        let created = gateway.create_conversation().await.expect("create succeeds");
        let summaries = gateway.list_conversations().await.expect("list succeeds");
        assert_eq!(summaries.len(), 2);
        assert!(summaries.iter().any(|s| s.id == created.id));
        let demo = summaries
            .iter()
            .find(|s| s.id == DEMO_CONVERSATION_ID)
            .expect("demo listed");
        assert_eq!(demo.message_count, 2);
    }

    #[tokio::test]
    async fn first_exchange_titles_a_new_conversation() {
        let gateway = MockGateway::new();
        let created = gateway.create_conversation().await.expect("create succeeds");
        let outcome = gateway
            .send_message(&created.id, "explain ownership in rust please", Vec::new())
            .await
            .expect("send succeeds");
        assert_eq!(outcome.conversation.title, "explain ownership in rust please");
    }
}
