pub mod app;
pub mod catalog;
pub mod cli;
pub mod confirm;
pub mod continuation;
pub mod llm;
pub mod message;
pub mod native_host;
pub mod page;
pub mod paths;
pub mod prompt;
pub mod settings;
pub mod trigger;
