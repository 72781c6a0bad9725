//! CLI definitions: argument parsing, subcommands, and help text.

use std::path::PathBuf;

use clap::{ArgAction, Args as ClapArgs, Parser, Subcommand};
use clap_complete::Shell;

use enhance::core::page::{PageSource, Selection};
use enhance::core::settings::{SettingsChanges, TriggerKey};

pub use clap_complete::generate;

const AFTER_HELP: &str = "\
EXAMPLES:
  enhance explain --url https://example.com/post --selection \"quantum entanglement\"
  enhance explain --file page.html --selection \"borrow checker\" --continue
  curl -s https://example.com | enhance context - --selection \"Example\"
  enhance continue --file page.html --selection \"lifetimes\" --print
  enhance config set --provider anthropic --anthropic-key sk-ant-...
  enhance config test               Send a test request with the saved settings
  enhance models                    List providers and models
  enhance host                      Run as a browser native messaging host
  enhance completions bash          Generate bash completions
";

/// Command-line arguments for the application.
#[derive(Parser)]
#[command(
    author,
    version,
    about = "Explain selected text from a web page with an LLM",
    after_help = AFTER_HELP
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (use multiple times for debug)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Reduce log output (errors only)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Explain the selected text using its surrounding page context
    Explain {
        #[command(flatten)]
        page: PageArgs,
        /// Afterwards, continue the discussion in the provider's web chat
        #[arg(long = "continue")]
        continue_chat: bool,
    },
    /// Open the provider's web chat with a prompt about the selected text
    Continue {
        #[command(flatten)]
        page: PageArgs,
        /// Print the prompt instead of opening the chat
        #[arg(long)]
        print: bool,
    },
    /// Print the extracted page context as JSON (no network call to the provider)
    Context {
        #[command(flatten)]
        page: PageArgs,
    },
    /// Show, change, reset, or test settings
    Config {
        #[command(subcommand)]
        subcommand: Option<ConfigSubcommand>,
    },
    /// List providers and their models
    Models {
        /// Only list models of this provider (openai, anthropic)
        #[arg(long)]
        provider: Option<String>,
    },
    /// Serve explain requests over stdin/stdout as a browser native messaging host
    Host {
        /// Arguments passed by the browser (ignored)
        #[arg(hide = true, trailing_var_arg = true, allow_hyphen_values = true)]
        origin: Vec<String>,
    },
    /// Generate shell completion script
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        #[arg(value_parser = clap::value_parser!(Shell))]
        shell: Shell,
    },
}

/// Where the page comes from and what was selected in it.
#[derive(ClapArgs)]
pub struct PageArgs {
    /// Read the page from an HTML file
    #[arg(long, conflicts_with_all = ["url", "stdin"])]
    pub file: Option<PathBuf>,

    /// Fetch the page from a URL
    #[arg(long, conflicts_with = "stdin")]
    pub url: Option<String>,

    /// Read the page HTML from stdin ("-")
    #[arg(value_name = "-", value_parser = parse_stdin_marker)]
    pub stdin: Option<bool>,

    /// The selected text
    #[arg(short = 's', long)]
    pub selection: String,

    /// Which occurrence of the selected text was selected (0 = first)
    #[arg(long, default_value_t = 0)]
    pub occurrence: usize,
}

fn parse_stdin_marker(s: &str) -> Result<bool, String> {
    if s == "-" {
        Ok(true)
    } else {
        Err("expected '-' to read the page from stdin".to_string())
    }
}

impl PageArgs {
    /// Page source; errors when none of --file, --url, or - was given.
    pub fn source(&self) -> Result<PageSource, String> {
        if let Some(path) = &self.file {
            Ok(PageSource::File(path.clone()))
        } else if let Some(url) = &self.url {
            Ok(PageSource::Url(url.clone()))
        } else if self.stdin == Some(true) {
            Ok(PageSource::Stdin)
        } else {
            Err("no page given: use --file, --url, or - for stdin".to_string())
        }
    }

    pub fn selection(&self) -> Selection {
        Selection::new(&self.selection).with_occurrence(self.occurrence)
    }
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show the settings file, provider, model, limits, and API key status
    Show,
    /// Change settings (validated before saving)
    Set(SettingsArgs),
    /// Reset settings to defaults
    Reset {
        /// Do not ask for confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Send a test request; options override the saved settings for this test only
    Test(SettingsArgs),
}

/// Settings fields that can be changed or overridden.
#[derive(ClapArgs, Default)]
pub struct SettingsArgs {
    /// API provider (openai, anthropic)
    #[arg(long)]
    pub provider: Option<String>,
    /// Model id (see `enhance models`)
    #[arg(short = 'm', long)]
    pub model: Option<String>,
    /// Response length limit (50-500)
    #[arg(long)]
    pub max_tokens: Option<u32>,
    /// Max chars of page context sent with a request (200-10000)
    #[arg(long)]
    pub max_context_length: Option<usize>,
    /// Modifier key that triggers an explanation in the browser
    #[arg(long, value_enum)]
    pub trigger_key: Option<TriggerKey>,
    /// OpenAI API key ("" removes it)
    #[arg(long)]
    pub openai_key: Option<String>,
    /// Anthropic API key ("" removes it)
    #[arg(long)]
    pub anthropic_key: Option<String>,
}

impl SettingsArgs {
    pub fn changes(&self) -> SettingsChanges {
        let api_keys = [("openai", &self.openai_key), ("anthropic", &self.anthropic_key)]
            .into_iter()
            .filter_map(|(id, key)| key.as_ref().map(|k| (id.to_string(), k.clone())))
            .collect();
        SettingsChanges {
            provider: self.provider.clone(),
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            max_context_length: self.max_context_length,
            trigger_key: self.trigger_key,
            api_keys,
        }
    }
}

impl Args {
    /// Log level based on -v/-q flags: error, warn, info, or debug.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose >= 2 {
            "debug"
        } else if self.verbose >= 1 {
            "info"
        } else {
            "warn"
        }
    }

    /// Host mode: stdout carries protocol frames, so logs go to a file.
    pub fn is_host(&self) -> bool {
        matches!(self.command, Commands::Host { .. })
    }
}
