//! Backend boundary: one contract, two implementations (live HTTP client and
//! in-memory simulator), selected by configuration. All conversation state
//! the client ever holds enters through this module.

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{Conversation, ConversationSummary};

pub mod http;
pub mod mock;
mod wire;

pub use http::HttpGateway;
pub use mock::MockGateway;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("conversation not found: {0}")]
    NotFound(String),
    #[error("backend unreachable: {0}")]
    Transport(String),
    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed backend payload: {0}")]
    Payload(String),
}

/// File payload attached to an outgoing message.
#[derive(Debug, Clone)]
pub struct OutgoingFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Result of a send: the backend returns the full updated conversation, not a
/// delta, including both the stored user message and the assistant reply.
#[derive(Debug, Clone)]
pub struct SendOutcome {
    pub conversation: Conversation,
}

#[async_trait]
pub trait ChatGateway: Send + Sync {
    async fn get_conversation(&self, id: &str) -> Result<Conversation, GatewayError>;

    async fn create_conversation(&self) -> Result<Conversation, GatewayError>;

    async fn send_message(
        &self,
        conversation_id: &str,
        text: &str,
        files: Vec<OutgoingFile>,
    ) -> Result<SendOutcome, GatewayError>;

    async fn list_conversations(&self) -> Result<Vec<ConversationSummary>, GatewayError>;
}
