//! Prompt templates for the explain request and the continue-conversation hand-off.

use crate::core::page::{ContextOrigin, PageContext};

/// Max chars of context carried into a continue prompt built from a live capture.
pub const CONTINUE_CONTEXT_CHARS: usize = 500;

/// Short prompt asking for a 2-3 sentence explanation of the selection.
pub fn build_explain_prompt(ctx: &PageContext) -> String {
    let context = if ctx.context_text.is_empty() {
        "No context"
    } else {
        ctx.context_text.as_str()
    };
    format!(
        "Explain this selected text from a webpage in 2-3 sentences.

Page: {}
Context: {}
Selected: \"{}\"

Provide a brief, clear explanation focusing on what it means and why it's relevant to the page topic. Be concise.",
        ctx.title, context, ctx.selected_text
    )
}

/// Longer prompt that opens a discussion of the selection in a web chat.
///
/// A live capture carries only the first [`CONTINUE_CONTEXT_CHARS`] chars of context,
/// followed by "...". A cached capture carries the context that was sent with the explanation.
pub fn build_continue_prompt(ctx: &PageContext, origin: ContextOrigin) -> String {
    let context = if ctx.context_text.is_empty() {
        "No additional context".to_string()
    } else {
        match origin {
            ContextOrigin::Live => {
                let head: String = ctx
                    .context_text
                    .chars()
                    .take(CONTINUE_CONTEXT_CHARS)
                    .collect();
                format!("{}...", head)
            }
            ContextOrigin::Cached => ctx.context_text.clone(),
        }
    };
    format!(
        "I'm reading an article and would like to discuss this text in more detail:

Page: {}
URL: {}

Selected text: \"{}\"

Context: {}

Can you help me understand this better and discuss related concepts?",
        ctx.title, ctx.url, ctx.selected_text, context
    )
}
