//! Application run modes: logger init, explain, continue, context, native host.

use std::error::Error;

use enhance::core::continuation::{self, SystemDesktop};
use enhance::core::llm::Dispatcher;
use enhance::core::message::MessageHandler;
use enhance::core::page::{self, ContextOrigin, PageContext};
use enhance::core::settings::{SETTINGS_KEY, Settings, SettingsStore};
use enhance::core::{app, catalog, native_host, paths, prompt};

use crate::cli::{Args, PageArgs};

/// Width used when wrapping explanations for the terminal.
const WRAP_WIDTH: usize = 88;

/// Initialize env_logger. In host mode, writes to a file because stdout carries frames.
pub fn init_logger(args: &Args) {
    let log_level = args.log_level();
    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level));

    if args.is_host() {
        let log_path = paths::cache_dir().and_then(|d| {
            std::fs::create_dir_all(&d).ok()?;
            Some(d.join(format!("{}.log", app::NAME)))
        });
        if let Some(path) = log_path
            && let Ok(file) = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
        {
            logger.target(env_logger::Target::Pipe(Box::new(file)));
        }
    }
    let _ = logger.try_init();
}

/// Shared HTTP client for page fetches and provider calls.
pub fn http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().user_agent(app::user_agent()).build()
}

pub fn message_handler(client: reqwest::Client) -> Result<MessageHandler, Box<dyn Error>> {
    let store = SettingsStore::open_default()?;
    Ok(MessageHandler::new(store, Dispatcher::new(client)))
}

/// Load the page and capture the context of the selection with `settings`' length limit.
async fn capture(
    page_args: &PageArgs,
    settings: &Settings,
    client: &reqwest::Client,
) -> Result<PageContext, Box<dyn Error>> {
    let selection = page_args.selection();
    if selection.is_empty() {
        return Err("the selection is empty".into());
    }
    let source = page_args.source()?;
    let loaded = page::load(&source, client).await?;
    let ctx = PageContext::capture(
        &loaded.document,
        &loaded.url,
        &selection,
        settings.max_context_length,
    );
    log::info!(
        "Captured context: title={:?} context_len={}",
        ctx.title,
        ctx.context_text.chars().count()
    );
    if ctx.context_text.is_empty() {
        log::warn!("Selected text not found in page; sending without context");
    }
    Ok(ctx)
}

/// Run `explain`: capture, explain, print wrapped; optionally continue with the cached context.
pub async fn run_explain(page_args: &PageArgs, continue_chat: bool) -> Result<(), Box<dyn Error>> {
    let client = http_client()?;
    let handler = message_handler(client.clone())?;
    let settings = handler.store().get(SETTINGS_KEY)?;
    let ctx = capture(page_args, &settings, &client).await?;

    eprintln!("Getting explanation...");
    let explanation = handler.explain(&ctx, &settings).await?;
    println!("{}", textwrap::fill(&explanation, WRAP_WIDTH));

    if continue_chat {
        let prompt = prompt::build_continue_prompt(&ctx, ContextOrigin::Cached);
        hand_off(&settings.provider, &prompt)?;
    }
    Ok(())
}

/// Run `continue`: capture fresh context and open the provider's chat (or print the prompt).
pub async fn run_continue(page_args: &PageArgs, print: bool) -> Result<(), Box<dyn Error>> {
    let client = http_client()?;
    let store = SettingsStore::open_default()?;
    let settings = store.get(SETTINGS_KEY)?;
    let ctx = capture(page_args, &settings, &client).await?;
    let prompt = prompt::build_continue_prompt(&ctx, ContextOrigin::Live);

    if print {
        println!("{}", prompt);
        return Ok(());
    }
    hand_off(&settings.provider, &prompt)
}

fn hand_off(provider: &str, prompt: &str) -> Result<(), Box<dyn Error>> {
    let handoff = continuation::plan(provider, prompt);
    if let Some(info) = catalog::find(provider).and_then(|p| p.continue_info.as_deref()) {
        eprintln!("{}", info);
    }
    eprintln!("Opening {}", handoff.url().split('?').next().unwrap_or(""));
    let report = continuation::execute(&handoff, &SystemDesktop)?;
    if let Some(notice) = report.notice() {
        eprintln!("{}", notice);
    }
    Ok(())
}

/// Run `context`: print the captured context as JSON.
pub async fn run_context(page_args: &PageArgs) -> Result<(), Box<dyn Error>> {
    let client = http_client()?;
    let store = SettingsStore::open_default()?;
    let settings = store.get_stored(SETTINGS_KEY)?;
    let ctx = capture(page_args, &settings, &client).await?;
    println!("{}", serde_json::to_string_pretty(&ctx)?);
    Ok(())
}

/// Run `host`: serve native messages on stdin/stdout until the browser closes the pipe.
pub async fn run_host() -> Result<(), Box<dyn Error>> {
    let handler = message_handler(http_client()?)?;
    log::info!("Native host started (settings: {})", handler.store().path().display());
    let mut stdin = std::io::stdin().lock();
    let mut stdout = std::io::stdout().lock();
    native_host::serve(&handler, &mut stdin, &mut stdout).await?;
    Ok(())
}
