//! Owns the conversation and all mutations to it. The send path is split
//! into `begin_send` / `finish_send` so callers never hold the controller
//! across the gateway await; reconciliation is an explicit step keyed by a
//! monotonic request token, and only the latest in-flight send is applied.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{SessionPhase, SessionSnapshot, StagedFile};
use crate::gateway::{ChatGateway, GatewayError, OutgoingFile, SendOutcome};
use crate::model::{Conversation, ConversationSummary, Message};

pub struct SessionController {
    gateway: Arc<dyn ChatGateway>,
    /// Conversation to reopen on startup; an explicit input, not ambient
    /// state, so the controller is a function of its construction.
    initial_conversation: Option<String>,
    phase: SessionPhase,
    conversation: Option<Conversation>,
    recent: Vec<ConversationSummary>,
    staged: Vec<StagedFile>,
    send_seq: u64,
    inflight: Option<u64>,
    notice: Option<String>,
}

/// Everything a caller needs to carry a send across the gateway await and
/// hand back to `finish_send`.
#[derive(Debug)]
pub struct PendingSend {
    pub token: u64,
    pub conversation_id: String,
    pub provisional_id: String,
    pub text: String,
    pub files: Vec<OutgoingFile>,
}

#[derive(Debug, PartialEq)]
pub enum SendResolution {
    /// Blank input with nothing staged; no state change, no gateway call.
    Skipped,
    /// Authoritative conversation adopted; the optimistic entry is gone.
    Applied,
    /// Gateway rejected the send; the provisional message was retracted and
    /// the draft is returned so the UI can restore it.
    Reverted { draft: String },
    /// A newer send superseded this one; the response was discarded.
    Stale,
}

impl SessionController {
    pub fn new(gateway: Arc<dyn ChatGateway>, initial_conversation: Option<String>) -> Self {
        Self {
            gateway,
            initial_conversation,
            phase: SessionPhase::Uninitialized,
            conversation: None,
            recent: Vec::new(),
            staged: Vec::new(),
            send_seq: 0,
            inflight: None,
            notice: None,
        }
    }

    pub fn gateway(&self) -> Arc<dyn ChatGateway> {
        Arc::clone(&self.gateway)
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn conversation(&self) -> Option<&Conversation> {
        self.conversation.as_ref()
    }

    pub fn sending(&self) -> bool {
        self.inflight.is_some()
    }

    pub fn staged_files(&self) -> &[StagedFile] {
        &self.staged
    }

    /// Builds a UI snapshot, taking the pending notice with it.
    pub fn snapshot(&mut self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase.clone(),
            conversation: self.conversation.clone(),
            recent: self.recent.clone(),
            staged: self.staged.iter().map(StagedFile::info).collect(),
            sending: self.sending(),
            notice: self.notice.take(),
        }
    }

    /// Fetch the configured conversation if any, fall back to creating a
    /// fresh one, and only fail hard when creation fails too.
    pub async fn initialize(&mut self) {
        self.phase = SessionPhase::Loading;

        if let Some(id) = self.initial_conversation.clone() {
            match self.gateway.get_conversation(&id).await {
                Ok(conversation) => {
                    self.adopt(conversation);
                    self.refresh_recent().await;
                    return;
                }
                Err(err) => {
                    warn!(conversation = %id, "could not reopen conversation: {err}");
                }
            }
        }

        match self.gateway.create_conversation().await {
            Ok(conversation) => {
                self.adopt(conversation);
                self.refresh_recent().await;
            }
            Err(err) => {
                self.phase = SessionPhase::Failed(err.to_string());
            }
        }
    }

    /// Fresh conversation replacing all current state. On failure the old
    /// conversation stays and the error is surfaced as a notice.
    pub async fn create_new(&mut self) {
        match self.gateway.create_conversation().await {
            Ok(conversation) => {
                self.adopt(conversation);
                self.refresh_recent().await;
            }
            Err(err) => {
                self.notice = Some(format!("Could not create a new conversation: {err}"));
            }
        }
    }

    /// Switch to another known conversation from the recent list.
    pub async fn open(&mut self, id: &str) {
        match self.gateway.get_conversation(id).await {
            Ok(conversation) => self.adopt(conversation),
            Err(err) => {
                self.notice = Some(format!("Could not open conversation: {err}"));
            }
        }
    }

    pub async fn refresh_recent(&mut self) {
        match self.gateway.list_conversations().await {
            Ok(recent) => self.recent = recent,
            Err(err) => debug!("conversation listing unavailable: {err}"),
        }
    }

    /// Adopts a listing fetched by a caller that held no lock on the
    /// controller while the gateway call was in flight.
    pub fn apply_recent(&mut self, recent: Vec<ConversationSummary>) {
        self.recent = recent;
    }

    fn adopt(&mut self, conversation: Conversation) {
        self.conversation = Some(conversation);
        self.phase = SessionPhase::Ready;
        // Replacing the conversation releases every staged preview.
        self.staged.clear();
    }

    pub fn stage_file(&mut self, name: String, mime: String, payload: Vec<u8>) -> String {
        let id = Uuid::new_v4().to_string();
        self.staged
            .push(StagedFile::new(id.clone(), name, mime, payload));
        id
    }

    pub fn unstage_file(&mut self, id: &str) {
        // Removal drops the StagedFile, deleting its preview temp file.
        self.staged.retain(|file| file.id != id);
    }

    pub fn note_error(&mut self, message: impl Into<String>) {
        self.notice = Some(message.into());
    }

    /// Synchronous front half of a send: appends the provisional user
    /// message, drains the staged files, and issues a request token. Returns
    /// `None` (no state change) for blank input with nothing staged.
    pub fn begin_send(&mut self, text: &str) -> Option<PendingSend> {
        if text.trim().is_empty() && self.staged.is_empty() {
            return None;
        }
        let Some(conversation) = self.conversation.as_mut() else {
            self.notice = Some("No active conversation".to_string());
            return None;
        };

        let provisional_id = Uuid::new_v4().to_string();
        conversation.messages.push(Message::user(
            provisional_id.clone(),
            text.to_string(),
            Utc::now(),
        ));

        let files = std::mem::take(&mut self.staged)
            .into_iter()
            .map(StagedFile::into_outgoing)
            .collect();

        self.send_seq += 1;
        let token = self.send_seq;
        self.inflight = Some(token);

        Some(PendingSend {
            token,
            conversation_id: conversation.id.clone(),
            provisional_id,
            text: text.to_string(),
            files,
        })
    }

    /// Reconciliation step. Applies the authoritative snapshot on success,
    /// retracts exactly the provisional message on failure, and discards
    /// responses whose token a later send has superseded. The sending flag
    /// clears whenever the latest in-flight send resolves, on every path.
    pub fn finish_send(
        &mut self,
        pending: PendingSend,
        result: Result<SendOutcome, GatewayError>,
    ) -> SendResolution {
        if self.inflight != Some(pending.token) {
            // Only stale successes are discarded outright. A failed send
            // still retracts its provisional message; retraction is by id,
            // so ordering against the superseding send does not matter.
            if result.is_err() {
                self.retract(&pending.provisional_id);
            }
            debug!(token = pending.token, "discarding stale send response");
            return SendResolution::Stale;
        }
        self.inflight = None;

        match result {
            Ok(outcome) => {
                // Full replacement: the optimistic entry is superseded by
                // the gateway's conversation, never merged into it.
                self.conversation = Some(outcome.conversation);
                SendResolution::Applied
            }
            Err(err) => {
                self.retract(&pending.provisional_id);
                self.notice = Some(format!("Could not send message: {err}"));
                SendResolution::Reverted {
                    draft: pending.text,
                }
            }
        }
    }

    fn retract(&mut self, provisional_id: &str) {
        if let Some(conversation) = self.conversation.as_mut() {
            conversation
                .messages
                .retain(|message| message.id != provisional_id);
        }
    }

    /// Whole send in one call; used where holding the controller across the
    /// await is fine (tests, simple drivers).
    pub async fn send(&mut self, text: &str) -> SendResolution {
        let Some(pending) = self.begin_send(text) else {
            return SendResolution::Skipped;
        };
        let gateway = self.gateway();
        let result = gateway
            .send_message(&pending.conversation_id, &pending.text, pending.files.clone())
            .await;
        self.finish_send(pending, result)
    }
}
