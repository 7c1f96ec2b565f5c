//! Bridge between the egui thread and the controller living on the tokio
//! runtime. UI code calls the cloneable handle; every operation runs as a
//! spawned task, pushes a fresh snapshot over the event channel, and wakes
//! the UI with a repaint request.

use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::controller::{SendResolution, SessionController};
use crate::event::AppEvent;

#[derive(Clone)]
pub struct SessionHandle {
    controller: Arc<Mutex<SessionController>>,
    tx: Sender<AppEvent>,
    runtime: Handle,
    egui_ctx: egui::Context,
}

impl SessionHandle {
    pub fn new(
        controller: SessionController,
        tx: Sender<AppEvent>,
        runtime: Handle,
        egui_ctx: egui::Context,
    ) -> Self {
        Self {
            controller: Arc::new(Mutex::new(controller)),
            tx,
            runtime,
            egui_ctx,
        }
    }

    fn push_state(controller: &mut SessionController, tx: &Sender<AppEvent>, ctx: &egui::Context) {
        let _ = tx.send(AppEvent::State(controller.snapshot()));
        ctx.request_repaint();
    }

    pub fn initialize(&self) {
        let controller = Arc::clone(&self.controller);
        let tx = self.tx.clone();
        let ctx = self.egui_ctx.clone();
        self.runtime.spawn(async move {
            let mut guard = controller.lock().await;
            guard.initialize().await;
            Self::push_state(&mut guard, &tx, &ctx);
        });
    }

    pub fn create_new(&self) {
        let controller = Arc::clone(&self.controller);
        let tx = self.tx.clone();
        let ctx = self.egui_ctx.clone();
        self.runtime.spawn(async move {
            let mut guard = controller.lock().await;
            guard.create_new().await;
            Self::push_state(&mut guard, &tx, &ctx);
        });
    }

    pub fn open(&self, conversation_id: String) {
        let controller = Arc::clone(&self.controller);
        let tx = self.tx.clone();
        let ctx = self.egui_ctx.clone();
        self.runtime.spawn(async move {
            let mut guard = controller.lock().await;
            guard.open(&conversation_id).await;
            Self::push_state(&mut guard, &tx, &ctx);
        });
    }

    /// Optimistic send. The controller lock is released while the gateway
    /// call is in flight so a later send can issue a newer request token.
    pub fn send(&self, text: String) {
        let controller = Arc::clone(&self.controller);
        let tx = self.tx.clone();
        let ctx = self.egui_ctx.clone();
        self.runtime.spawn(async move {
            let (pending, gateway) = {
                let mut guard = controller.lock().await;
                let pending = guard.begin_send(&text);
                Self::push_state(&mut guard, &tx, &ctx);
                (pending, guard.gateway())
            };
            let Some(pending) = pending else {
                return;
            };

            let result = gateway
                .send_message(&pending.conversation_id, &pending.text, pending.files.clone())
                .await;

            {
                let mut guard = controller.lock().await;
                let resolution = guard.finish_send(pending, result);
                if let SendResolution::Reverted { draft } = resolution {
                    let _ = tx.send(AppEvent::RestoreDraft(draft));
                }
                Self::push_state(&mut guard, &tx, &ctx);
            }

            // The listing refresh is another gateway call, so it too runs
            // without the lock; a follow-up send never queues behind it.
            match gateway.list_conversations().await {
                Ok(recent) => {
                    let mut guard = controller.lock().await;
                    guard.apply_recent(recent);
                    Self::push_state(&mut guard, &tx, &ctx);
                }
                Err(err) => debug!("conversation listing unavailable: {err}"),
            }
        });
    }

    /// Stage a dropped file for the next send. Reads the payload off the UI
    /// thread; failures surface as a notice, never a crash.
    pub fn stage_path(&self, path: PathBuf) {
        let controller = Arc::clone(&self.controller);
        let tx = self.tx.clone();
        let ctx = self.egui_ctx.clone();
        self.runtime.spawn(async move {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "attachment".to_string());
            let mime = mime_guess::from_path(&path)
                .first_or_octet_stream()
                .essence_str()
                .to_string();

            let mut guard = controller.lock().await;
            match tokio::fs::read(&path).await {
                Ok(payload) => {
                    guard.stage_file(name, mime, payload);
                }
                Err(err) => {
                    warn!(path = %path.display(), "could not read dropped file: {err}");
                    guard.note_error(format!("Could not read {name}: {err}"));
                }
            }
            Self::push_state(&mut guard, &tx, &ctx);
        });
    }

    /// Stage an in-memory payload (drag-and-drop sources that carry bytes
    /// instead of a path).
    pub fn stage_bytes(&self, name: String, payload: Vec<u8>) {
        let controller = Arc::clone(&self.controller);
        let tx = self.tx.clone();
        let ctx = self.egui_ctx.clone();
        self.runtime.spawn(async move {
            let mime = mime_guess::from_path(&name)
                .first_or_octet_stream()
                .essence_str()
                .to_string();
            let mut guard = controller.lock().await;
            guard.stage_file(name, mime, payload);
            Self::push_state(&mut guard, &tx, &ctx);
        });
    }

    pub fn unstage(&self, file_id: String) {
        let controller = Arc::clone(&self.controller);
        let tx = self.tx.clone();
        let ctx = self.egui_ctx.clone();
        self.runtime.spawn(async move {
            let mut guard = controller.lock().await;
            guard.unstage_file(&file_id);
            Self::push_state(&mut guard, &tx, &ctx);
        });
    }
}
