use rag_client::ViewModel;

const NO_RESPONSE: &str = "No response yet. Please upload a document and ask a question.";

/// The response panel: answer, plus the context passages when the context
/// panel is visible.
pub fn render_response(view: &ViewModel) -> String {
    if !view.response_visible {
        return NO_RESPONSE.to_string();
    }

    let mut out = String::new();
    out.push_str("Answer:\n");
    out.push_str(view.answer.as_deref().unwrap_or_default());
    out.push('\n');

    if view.context_visible() {
        out.push_str("\n--- Context ---\n");
        out.push_str(&view.context_text());
        out.push('\n');
    }
    out
}

pub fn render_status(view: &ViewModel) -> String {
    let mut lines = vec![
        format!("Document: {}", view.upload_status()),
        format!("Session:  {}", view.session_id.as_deref().unwrap_or("-")),
        format!("Upload:   {}", busy_label(view.upload_busy)),
        format!("Query:    {}", busy_label(view.query_busy)),
        format!("Context:  {}", if view.show_context { "shown" } else { "hidden" }),
    ];
    if let Some(error) = &view.error {
        lines.push(format!("Last error: {}", error));
    }
    lines.join("\n")
}

fn busy_label(busy: bool) -> &'static str {
    if busy {
        "in progress"
    } else {
        "idle"
    }
}
