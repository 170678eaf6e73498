use serde::Serialize;

/// Separator placed between context passages when they are shown as one block.
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Snapshot of everything a front-end needs to draw the client.
///
/// Plain data with no behaviour tied to any particular presentation; the
/// controller hands out a fresh copy on every `view()` call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViewModel {
    pub session_id: Option<String>,
    pub upload_busy: bool,
    pub query_busy: bool,
    pub answer: Option<String>,
    pub context: Vec<String>,
    pub show_context: bool,
    pub response_visible: bool,
    pub error: Option<String>,
}

impl ViewModel {
    pub fn has_session(&self) -> bool {
        self.session_id.is_some()
    }

    pub fn can_upload(&self) -> bool {
        !self.upload_busy
    }

    pub fn can_query(&self) -> bool {
        self.has_session() && !self.query_busy
    }

    pub fn context_visible(&self) -> bool {
        self.response_visible && self.show_context
    }

    pub fn context_text(&self) -> String {
        self.context.join(CONTEXT_SEPARATOR)
    }

    pub fn upload_status(&self) -> &'static str {
        if self.upload_busy {
            "Processing document..."
        } else if self.has_session() {
            "Document uploaded and processed successfully!"
        } else {
            "No document uploaded yet"
        }
    }
}
