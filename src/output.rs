//! User-facing output that is part of the tool's interface rather than logging.
//!
//! Success confirmations and the chosen random User-Agent go to stderr like
//! every other diagnostic; only the agent list printed by `-list-agents` goes
//! to stdout. None of these are affected by the log level.

use std::io::{self, Write};
use std::path::Path;

use crate::user_agent::BROWSER_USER_AGENTS;

/// Formats the two-line confirmation for a finished download.
#[must_use]
pub fn saved_message(url: &str, path: &Path) -> String {
    format!("{url}\n -> {}", path.display())
}

/// Writes the confirmation for a finished download to stderr.
///
/// Both lines go out in one locked write so concurrent tasks do not interleave them.
pub fn report_saved(url: &str, path: &Path) {
    let mut stderr = io::stderr().lock();
    let _ = writeln!(stderr, "{}", saved_message(url, path));
}

/// Formats the notice naming the randomly chosen User-Agent.
#[must_use]
pub fn user_agent_message(agent: &str) -> String {
    format!("used user-agent: {agent}")
}

/// Writes the randomly chosen User-Agent to stderr.
pub fn report_user_agent(agent: &str) {
    let mut stderr = io::stderr().lock();
    let _ = writeln!(stderr, "{}", user_agent_message(agent));
}

/// Writes the built-in User-Agent list, one per line.
///
/// # Errors
///
/// Returns the IO error if `out` cannot be written.
pub fn write_agent_list<W: Write>(out: &mut W) -> io::Result<()> {
    for agent in BROWSER_USER_AGENTS {
        writeln!(out, "{agent}")?;
    }
    out.flush()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_saved_message_has_url_then_arrow_line() {
        let msg = saved_message("https://example.com/a.zip", Path::new("/tmp/a.zip"));
        let lines: Vec<&str> = msg.lines().collect();
        assert_eq!(lines, vec!["https://example.com/a.zip", " -> /tmp/a.zip"]);
    }

    #[test]
    fn test_user_agent_message_names_agent() {
        assert_eq!(
            user_agent_message(BROWSER_USER_AGENTS[0]),
            format!("used user-agent: {}", BROWSER_USER_AGENTS[0])
        );
    }

    #[test]
    fn test_write_agent_list_one_per_line() {
        let mut buf = Vec::new();
        write_agent_list(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), BROWSER_USER_AGENTS.len());
        assert!(text.ends_with('\n'));
        for agent in BROWSER_USER_AGENTS {
            assert!(text.contains(agent));
        }
    }
}
