//! CLI module for LLMSwitch
//!
//! Command-line interface definitions and handlers for the LLMSwitch monitor.
//!
//! # Commands
//!
//! - `serve` - Start the dashboard file server
//! - `watch` - Live terminal view of models, GPUs and the debug log
//! - `models` / `gpu` - One-shot snapshot of a view
//! - `endpoint` / `interval` - Show or change persisted settings
//! - `debug` - Show, clear or export the debug log
//! - `load` / `unload` - Model lifecycle actions
//! - `config` - Configuration utilities (init)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! # Serve the dashboard with default config
//! llmswitch serve
//!
//! # Point the model view at another host and refresh every minute
//! llmswitch endpoint --models 192.168.1.20:11434
//! llmswitch interval 60
//!
//! # Generate shell completions
//! llmswitch completions bash > ~/.bash_completion.d/llmswitch
//! ```

pub mod completions;
pub mod config;
pub mod context;
pub mod debug;
pub mod gpu;
pub mod lifecycle;
pub mod models;
pub mod output;
pub mod serve;
pub mod settings;
pub mod watch;

pub use completions::handle_completions;
pub use config::handle_config_init;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// LLMSwitch - Ollama and GPU monitor
#[derive(Parser, Debug)]
#[command(
    name = "llmswitch",
    version,
    about = "Monitor Ollama models and GPU telemetry"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the dashboard and its /api/config endpoint
    Serve(ServeArgs),
    /// Watch both views live in the terminal
    Watch(WatchArgs),
    /// Show installed and running models
    Models(SnapshotArgs),
    /// Show GPU telemetry
    Gpu(SnapshotArgs),
    /// Show or change the monitored endpoints
    Endpoint(EndpointArgs),
    /// Show or change the auto-refresh interval
    Interval(IntervalArgs),
    /// Inspect the debug log
    #[command(subcommand)]
    Debug(DebugCommands),
    /// Load a model into memory
    Load(ModelActionArgs),
    /// Unload a running model
    Unload(ModelActionArgs),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "llmswitch.toml")]
    pub config: PathBuf,

    /// Override server port
    #[arg(short, long, env = "LLMSWITCH_PORT")]
    pub port: Option<u16>,

    /// Override server host
    #[arg(short = 'H', long, env = "LLMSWITCH_HOST")]
    pub host: Option<String>,

    /// Directory holding the dashboard files
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "LLMSWITCH_LOG_LEVEL")]
    pub log_level: Option<String>,
}

/// Options shared by every command that opens a monitor session.
#[derive(Args, Debug, Clone)]
pub struct MonitorArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "llmswitch.toml")]
    pub config: PathBuf,

    /// Override the persisted state file
    #[arg(long, env = "LLMSWITCH_STATE_FILE")]
    pub state_file: Option<PathBuf>,

    /// Override the dashboard server origin
    #[arg(long, env = "LLMSWITCH_ORIGIN")]
    pub origin: Option<String>,

    /// Skip fetching endpoint defaults from the dashboard server
    #[arg(long)]
    pub no_server_defaults: bool,

    /// Viewport width in pixels (derived from the terminal when omitted)
    #[arg(long)]
    pub width: Option<u32>,
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    #[command(flatten)]
    pub monitor: MonitorArgs,

    /// Number of debug entries shown under the views
    #[arg(long, default_value = "8")]
    pub debug_lines: usize,

    /// Only show debug entries at or above this level (all, info, warning, error)
    #[arg(long, default_value = "all")]
    pub debug_level: String,
}

#[derive(Args, Debug)]
pub struct SnapshotArgs {
    #[command(flatten)]
    pub monitor: MonitorArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct EndpointArgs {
    #[command(flatten)]
    pub monitor: MonitorArgs,

    /// New Ollama API base URL
    #[arg(short, long)]
    pub models: Option<String>,

    /// New GPU telemetry endpoint
    #[arg(short, long)]
    pub gpu: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct IntervalArgs {
    #[command(flatten)]
    pub monitor: MonitorArgs,

    /// New interval in seconds (5-300)
    #[arg(allow_negative_numbers = true)]
    pub seconds: Option<i64>,
}

#[derive(Subcommand, Debug)]
pub enum DebugCommands {
    /// Print the debug log, newest first
    Show(DebugShowArgs),
    /// Empty the debug log
    Clear(DebugClearArgs),
    /// Write the debug log to a timestamped text file
    Export(DebugExportArgs),
}

#[derive(Args, Debug)]
pub struct DebugShowArgs {
    #[command(flatten)]
    pub monitor: MonitorArgs,

    /// Minimum level (all, info, warning, error)
    #[arg(short, long, default_value = "all")]
    pub level: String,

    /// Maximum number of entries to print
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct DebugClearArgs {
    #[command(flatten)]
    pub monitor: MonitorArgs,
}

#[derive(Args, Debug)]
pub struct DebugExportArgs {
    #[command(flatten)]
    pub monitor: MonitorArgs,

    /// Directory to write the export into
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,
}

#[derive(Args, Debug)]
pub struct ModelActionArgs {
    #[command(flatten)]
    pub monitor: MonitorArgs,

    /// Model name as listed by `llmswitch models`
    pub model: String,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = "llmswitch.toml")]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
