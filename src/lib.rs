//! # enhance
//!
//! Explains text selected on a web page with an LLM (OpenAI or Anthropic), using the
//! surrounding page text as context. The library holds the extraction, prompt, provider, and
//! settings logic; the `enhance` binary wraps it in a CLI and a browser native messaging host.

pub mod core;
