//! CLI argument definitions using clap derive macros.
//!
//! The tool accepts single-dash long flags (`-over`, `-dest=DIR`) alongside the
//! usual double-dash form; [`normalize_go_style_flags`] rewrites the former
//! before clap sees them.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;

use batchget::{DEFAULT_CONNECTIONS, RawConfig};

/// Long flag names that may also be written with a single dash.
const LONG_FLAGS: &[&str] = &[
    "over",
    "dest",
    "random-agent",
    "list-agents",
    "custom-agent",
    "wait",
    "random-wait",
    "input",
    "verbose",
    "quiet",
    "help",
    "version",
];

/// Download every URL from input files and arguments.
///
/// URLs are read line by line from each `-i` file in order, then from the
/// positional arguments, and downloaded into the destination directory with at
/// most `-c` transfers in flight.
#[derive(Parser, Debug)]
#[command(name = "batchget")]
#[command(author, version, about)]
#[command(override_usage = "batchget [FLAGS] [URL]...")]
#[allow(clippy::struct_excessive_bools)]
pub struct Args {
    /// Number of concurrent downloads (values below 1 mean 1)
    #[arg(short = 'c', value_name = "N", default_value_t = DEFAULT_CONNECTIONS, allow_negative_numbers = true)]
    pub connections: i64,

    /// Overwrite existing files instead of adding a numeric suffix
    #[arg(long = "over")]
    pub overwrite: bool,

    /// Destination directory, created if missing
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub dest: PathBuf,

    /// Use a random browser User-Agent for the whole run
    #[arg(long)]
    pub random_agent: bool,

    /// Print the built-in User-Agent list and exit
    #[arg(long)]
    pub list_agents: bool,

    /// Send this User-Agent (takes precedence over -random-agent)
    #[arg(long, value_name = "UA")]
    pub custom_agent: Option<String>,

    /// Seconds to wait between dispatching downloads
    #[arg(long, value_name = "SECS", default_value_t = 0, allow_negative_numbers = true)]
    pub wait: i64,

    /// Wait a random number of seconds between 0 and -wait
    #[arg(long)]
    pub random_wait: bool,

    /// File with one URL per line ("-" for stdin); may be repeated
    #[arg(short = 'i', long = "input", value_name = "FILE")]
    pub inputs: Vec<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors and skip per-download confirmations
    #[arg(short, long)]
    pub quiet: bool,

    /// URLs to download after the contents of every input file
    #[arg(value_name = "URL")]
    pub urls: Vec<String>,
}

impl Args {
    /// Hands the parsed values to the library for normalisation.
    pub fn to_raw_config(&self) -> RawConfig {
        RawConfig {
            connections: self.connections,
            overwrite: self.overwrite,
            dest_dir: self.dest.clone(),
            random_agent: self.random_agent,
            custom_agent: self.custom_agent.clone(),
            wait_secs: self.wait,
            random_wait: self.random_wait,
            input_files: self.inputs.clone(),
            urls: self.urls.clone(),
            quiet: self.quiet,
        }
    }

    /// True when neither input files nor positional URLs were given.
    pub fn has_no_sources(&self) -> bool {
        self.inputs.is_empty() && self.urls.is_empty()
    }
}

/// Rewrites `-name` and `-name=value` to `--name...` for every known long flag.
///
/// The program name and everything after a bare `--` are left untouched, as are
/// short flags and arguments that are not known flag names.
pub fn normalize_go_style_flags<I, S>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    let mut out = Vec::new();
    let mut positional_only = false;

    for (idx, arg) in args.into_iter().enumerate() {
        let arg = arg.into();
        if idx == 0 || positional_only {
            out.push(arg);
            continue;
        }
        if arg == "--" {
            positional_only = true;
            out.push(arg);
            continue;
        }
        out.push(normalize_flag(arg));
    }
    out
}

fn normalize_flag(arg: OsString) -> OsString {
    let Some(text) = arg.to_str() else {
        return arg;
    };
    let Some(rest) = text.strip_prefix('-') else {
        return arg;
    };
    if rest.starts_with('-') {
        return arg;
    }

    let name = rest.split_once('=').map_or(rest, |(name, _)| name);
    if LONG_FLAGS.contains(&name) {
        OsString::from(format!("-{text}"))
    } else {
        arg
    }
}
