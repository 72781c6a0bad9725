//! "Continue in AI chat": hand the continue prompt off to the provider's web chat.
//!
//! OpenAI's chat accepts the prompt in its URL. Claude's does not, so its chat page is opened
//! and the prompt is copied to the clipboard for pasting.

use crate::core::catalog::{self, ContinueMethod};

pub const CHATGPT_URL: &str = "https://chatgpt.com/";
pub const CLAUDE_CHAT_URL: &str = "https://claude.ai/chat";

#[derive(Debug, thiserror::Error)]
pub enum ContinueError {
    #[error("Failed to open {url}: {source}")]
    Open {
        url: String,
        source: opener::OpenError,
    },
}

/// Planned hand-off for one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handoff {
    OpenUrl(String),
    OpenAndCopy { url: String, prompt: String },
}

impl Handoff {
    pub fn url(&self) -> &str {
        match self {
            Handoff::OpenUrl(url) | Handoff::OpenAndCopy { url, .. } => url,
        }
    }
}

/// ChatGPT URL with the prompt prefilled.
pub fn chatgpt_url(prompt: &str) -> String {
    format!("{}?q={}", CHATGPT_URL, urlencoding::encode(prompt))
}

/// Plan the hand-off for `provider_id`. Unknown providers go to ChatGPT.
pub fn plan(provider_id: &str, prompt: &str) -> Handoff {
    match catalog::find(provider_id).map(|p| p.continue_method) {
        Some(ContinueMethod::Clipboard) => Handoff::OpenAndCopy {
            url: CLAUDE_CHAT_URL.to_string(),
            prompt: prompt.to_string(),
        },
        Some(ContinueMethod::Url) => Handoff::OpenUrl(chatgpt_url(prompt)),
        None => {
            log::warn!("No continue target for '{}', using ChatGPT", provider_id);
            Handoff::OpenUrl(chatgpt_url(prompt))
        }
    }
}

/// Side effects of a hand-off, behind a seam so plans can be executed in tests.
pub trait Desktop {
    fn open_url(&self, url: &str) -> Result<(), ContinueError>;
    /// Returns true when the text is on the clipboard.
    fn copy_text(&self, text: &str) -> bool;
}

/// The real desktop: default browser and system clipboard.
pub struct SystemDesktop;

impl Desktop for SystemDesktop {
    fn open_url(&self, url: &str) -> Result<(), ContinueError> {
        opener::open(url).map_err(|source| ContinueError::Open {
            url: url.to_string(),
            source,
        })
    }

    fn copy_text(&self, text: &str) -> bool {
        arboard::Clipboard::new()
            .and_then(|mut c| c.set_text(text.to_string()))
            .is_ok()
    }
}

/// Result of an executed hand-off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandoffReport {
    Opened,
    OpenedAndCopied,
    /// Page opened but the clipboard was unavailable; the user must copy the prompt manually.
    CopyFailed,
}

impl HandoffReport {
    /// User-facing notice, if any.
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            HandoffReport::Opened => None,
            HandoffReport::OpenedAndCopied => Some("Prompt copied to clipboard"),
            HandoffReport::CopyFailed => Some("Copy failed - please copy manually"),
        }
    }
}

/// Open the chat page and, for clipboard providers, copy the prompt.
pub fn execute(handoff: &Handoff, desktop: &dyn Desktop) -> Result<HandoffReport, ContinueError> {
    desktop.open_url(handoff.url())?;
    match handoff {
        Handoff::OpenUrl(_) => Ok(HandoffReport::Opened),
        Handoff::OpenAndCopy { prompt, .. } => {
            if desktop.copy_text(prompt) {
                Ok(HandoffReport::OpenedAndCopied)
            } else {
                log::warn!("Clipboard unavailable; prompt not copied");
                Ok(HandoffReport::CopyFailed)
            }
        }
    }
}
