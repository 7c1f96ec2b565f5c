use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::warn;

use crate::gateway::OutgoingFile;
use crate::model::{Conversation, ConversationSummary};

pub mod controller;
mod handle;

pub use controller::{SendResolution, SessionController};
pub use handle::SessionHandle;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionPhase {
    Uninitialized,
    Loading,
    Ready,
    /// Fetch and create both failed; shown as a blocking error screen.
    Failed(String),
}

/// Attachment staged for the next send. The preview handle is a named temp
/// file standing in for a browser object URL; dropping it deletes the file,
/// which is what "releasing the transient reference" means here.
#[derive(Debug)]
pub struct StagedFile {
    pub id: String,
    pub name: String,
    pub mime: String,
    pub size: u64,
    pub payload: Vec<u8>,
    preview: Option<NamedTempFile>,
}

impl StagedFile {
    pub fn new(id: String, name: String, mime: String, payload: Vec<u8>) -> Self {
        let preview = match write_preview(&payload) {
            Ok(file) => Some(file),
            Err(err) => {
                warn!(name = %name, "could not materialize preview file: {err}");
                None
            }
        };
        Self {
            id,
            name,
            mime,
            size: payload.len() as u64,
            payload,
            preview,
        }
    }

    pub fn preview_path(&self) -> Option<&Path> {
        self.preview.as_ref().map(|file| file.path())
    }

    /// Consumes the staged file into a wire payload, releasing the preview.
    pub fn into_outgoing(self) -> OutgoingFile {
        OutgoingFile {
            name: self.name,
            mime: self.mime,
            bytes: self.payload,
        }
    }

    pub fn info(&self) -> StagedFileInfo {
        StagedFileInfo {
            id: self.id.clone(),
            name: self.name.clone(),
            mime: self.mime.clone(),
            size: self.size,
        }
    }
}

fn write_preview(payload: &[u8]) -> std::io::Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(payload)?;
    Ok(file)
}

/// Cheap, cloneable description of a staged file for the UI.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedFileInfo {
    pub id: String,
    pub name: String,
    pub mime: String,
    pub size: u64,
}

/// Value snapshot of controller state handed to the UI thread. The renderer
/// layer only ever reads these; it never touches the controller directly.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub conversation: Option<Conversation>,
    pub recent: Vec<ConversationSummary>,
    pub staged: Vec<StagedFileInfo>,
    pub sending: bool,
    /// Transient user-visible notice (send failures and the like), taken
    /// from the controller when the snapshot is built.
    pub notice: Option<String>,
}

impl SessionSnapshot {
    pub fn empty() -> Self {
        Self {
            phase: SessionPhase::Uninitialized,
            conversation: None,
            recent: Vec::new(),
            staged: Vec::new(),
            sending: false,
            notice: None,
        }
    }
}
