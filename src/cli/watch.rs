//! Watch command: live terminal view over a monitor session
//!
//! Redraws whenever a view, the countdown or the debug log changes. Lines
//! typed on stdin are applied as session actions (see [`HELP`]).

use crate::cli::context::open_session;
use crate::cli::output::{format_countdown, format_debug_entries, format_view};
use crate::cli::WatchArgs;
use crate::debug::{export_file_name, ChannelSurface, DebugView, LevelFilter};
use crate::monitor::{MonitorSession, ViewState};
use chrono::Utc;
use colored::Colorize;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

const CLEAR_SCREEN: &str = "\x1B[2J\x1B[H";

pub const HELP: &str = "Commands: r(efresh)  i(nterval) <secs>  m(odels) <url>  g(pu) <url>  \
load <model>  stop <model>  w(idth) <px>  f(ilter) <level>  clear  export  q(uit)";

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchCommand {
    Refresh,
    Quit,
    Help,
    Interval(i64),
    ModelsEndpoint(String),
    GpuEndpoint(String),
    Load(String),
    Stop(String),
    Width(u32),
    Filter(LevelFilter),
    Clear,
    Export,
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<WatchCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let require = |what: &str| -> Result<String, String> {
        if rest.is_empty() {
            Err(format!("Missing {} for '{}'", what, verb))
        } else {
            Ok(rest.to_string())
        }
    };

    let command = match verb.to_lowercase().as_str() {
        "r" | "refresh" => WatchCommand::Refresh,
        "q" | "quit" | "exit" => WatchCommand::Quit,
        "h" | "help" | "?" => WatchCommand::Help,
        "i" | "interval" => WatchCommand::Interval(
            require("seconds")?
                .parse()
                .map_err(|_| format!("Not a number: {}", rest))?,
        ),
        "m" | "models" => WatchCommand::ModelsEndpoint(require("URL")?),
        "g" | "gpu" => WatchCommand::GpuEndpoint(require("URL")?),
        "load" => WatchCommand::Load(require("model")?),
        "stop" | "unload" => WatchCommand::Stop(require("model")?),
        "w" | "width" => WatchCommand::Width(
            require("width")?
                .parse()
                .map_err(|_| format!("Not a width: {}", rest))?,
        ),
        "f" | "filter" => WatchCommand::Filter(require("level")?.parse()?),
        "clear" => WatchCommand::Clear,
        "export" => WatchCommand::Export,
        other => return Err(format!("Unknown command: {} ({})", other, HELP)),
    };
    Ok(Some(command))
}

/// Compose the full screen.
pub fn render_screen(
    models: &ViewState,
    gpu: &ViewState,
    countdown: u32,
    debug: &DebugView,
    debug_lines: usize,
    status: Option<&str>,
) -> String {
    let mut screen = vec![
        format!("{}  {}", "LLMSwitch".bold(), format_countdown(countdown).dimmed()),
        String::new(),
        format_view("Models", models),
        String::new(),
        format_view("GPU Monitoring", gpu),
        String::new(),
        "Debug".bold().underline().to_string(),
    ];

    let shown: Vec<_> = debug.entries.iter().take(debug_lines).cloned().collect();
    screen.push(format_debug_entries(&shown));

    screen.push(String::new());
    match status {
        Some(message) => screen.push(message.to_string()),
        None => screen.push(HELP.dimmed().to_string()),
    }
    screen.join("\n")
}

/// Apply a command to the session. Returns a status line for the screen.
async fn apply_command(
    session: &MonitorSession,
    surface: &ChannelSurface,
    command: WatchCommand,
) -> String {
    match command {
        WatchCommand::Refresh => {
            session.refresh_now().await;
            "Refreshed".to_string()
        }
        WatchCommand::Help | WatchCommand::Quit => HELP.to_string(),
        WatchCommand::Interval(seconds) => match session.save_refresh_interval(seconds) {
            Ok(seconds) => format!("Auto-refresh every {} seconds", seconds),
            Err(e) => e.to_string().red().to_string(),
        },
        WatchCommand::ModelsEndpoint(url) => {
            if session.save_endpoints(Some(&url), None).await {
                format!("Models endpoint set to {}", url.trim())
            } else {
                "Models endpoint not saved".red().to_string()
            }
        }
        WatchCommand::GpuEndpoint(url) => {
            if session.save_endpoints(None, Some(&url)).await {
                format!("GPU endpoint set to {}", url.trim())
            } else {
                "GPU endpoint not saved".red().to_string()
            }
        }
        WatchCommand::Load(model) => match session.load_model(&model).await {
            Ok(()) => format!("Loaded {}", model),
            Err(e) => e.to_string().red().to_string(),
        },
        WatchCommand::Stop(model) => match session.stop_model(&model).await {
            Ok(_) => format!("Stopped {}", model),
            Err(e) => e.to_string().red().to_string(),
        },
        WatchCommand::Width(width) => {
            session.resize(width).await;
            format!("Viewport width {}px", width)
        }
        WatchCommand::Filter(filter) => {
            surface.set_filter(filter);
            session.sink().refresh_surface();
            "Debug filter updated".to_string()
        }
        WatchCommand::Clear => {
            session.sink().clear();
            "Debug log cleared".to_string()
        }
        WatchCommand::Export => {
            let path = export_file_name(Utc::now());
            match std::fs::write(&path, session.sink().export()) {
                Ok(()) => {
                    session.sink().info("Debug log exported");
                    format!("Debug log written to {}", path)
                }
                Err(e) => format!("Export failed: {}", e).red().to_string(),
            }
        }
    }
}

/// Main watch command handler
pub async fn run_watch(args: WatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let filter: LevelFilter = args.debug_level.parse()?;
    let session = open_session(&args.monitor).await?;

    let (surface, mut debug_rx) = ChannelSurface::new(filter);
    let surface = Arc::new(surface);
    session.sink().attach_surface(surface.clone());

    let mut models_rx = session.models().subscribe();
    let mut gpu_rx = session.gpu().subscribe();
    let mut countdown_rx = session.model_countdown();

    session.begin().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut status: Option<String> = None;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        let models = models_rx.borrow_and_update().clone();
        let gpu = gpu_rx.borrow_and_update().clone();
        let countdown = *countdown_rx.borrow_and_update();
        let debug = debug_rx.borrow_and_update().clone();
        let screen = render_screen(
            &models,
            &gpu,
            countdown,
            &debug,
            args.debug_lines,
            status.as_deref(),
        );
        println!("{}{}", CLEAR_SCREEN, screen);
        std::io::stdout().flush()?;

        tokio::select! {
            _ = &mut ctrl_c => break,
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => match parse_command(&line) {
                    Ok(Some(WatchCommand::Quit)) => break,
                    Ok(Some(command)) => {
                        status = Some(apply_command(&session, &surface, command).await);
                    }
                    Ok(None) => {}
                    Err(message) => status = Some(message.red().to_string()),
                },
                Ok(None) | Err(_) => stdin_open = false,
            },
            Ok(()) = models_rx.changed() => {}
            Ok(()) = gpu_rx.changed() => {}
            Ok(()) = countdown_rx.changed() => {}
            Ok(()) = debug_rx.changed() => {}
        }
    }

    session.sink().detach_surface();
    session.shutdown().await;
    println!();
    Ok(())
}
