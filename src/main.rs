//! CLI entry point for the batchget tool.

use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use batchget::{DownloadEngine, Downloader, HttpClient, RunConfig, output, prepare_destination};
use clap::{CommandFactory, Parser};
use tracing::{debug, error};

mod cli;
mod terminal;

use cli::{Args, normalize_go_style_flags};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse_from(normalize_go_style_flags(std::env::args_os()));

    if args.list_agents {
        output::write_agent_list(&mut io::stdout().lock())?;
        return Ok(ExitCode::SUCCESS);
    }

    if args.has_no_sources() {
        eprint!("{}", Args::command().render_help());
        return Ok(ExitCode::SUCCESS);
    }

    let no_color = terminal::no_color_env_requested() || terminal::is_dumb_terminal();
    terminal::init_tracing(terminal::default_log_level(args.verbose, args.quiet), no_color);
    debug!(?args, "CLI arguments parsed");

    let config = RunConfig::from_raw(args.to_raw_config());
    if config.random_user_agent
        && let Some(agent) = config.user_agent.as_deref()
    {
        output::report_user_agent(agent);
    }

    // Input paths are relative to the invocation directory, so open them before entering -dest.
    let input = config.sources.open().await;

    if let Err(e) = prepare_destination(&config.dest_dir) {
        error!(error = %e, "cannot use destination directory");
        return Ok(ExitCode::FAILURE);
    }

    let downloader = Downloader::new(HttpClient::new()?, ".")
        .with_user_agent(config.user_agent.clone())
        .with_overwrite(config.overwrite);
    let engine = DownloadEngine::new(config.connections, config.wait)
        .with_success_reports(config.report_success);

    let stats = engine.run(input, Arc::new(downloader)).await;

    debug!(dispatched = stats.dispatched(), "all transfers finished");

    Ok(ExitCode::SUCCESS)
}
