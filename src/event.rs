use crate::session::SessionSnapshot;

#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Fresh value snapshot of the session controller's state.
    State(SessionSnapshot),
    /// A send failed; the retracted draft, offered back to the input box.
    RestoreDraft(String),
}
