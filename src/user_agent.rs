//! User-Agent strings: the tool's own default and the built-in browser list.
//!
//! The browser list backs `-random-agent` and `-list-agents`; one entry is
//! picked per run, never per request.

use rand::seq::SliceRandom;

/// Browser User-Agents available to `-random-agent`.
pub const BROWSER_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (X11; Linux i686; rv:64.0) Gecko/20100101 Firefox/64.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/70.0.3538.77 Safari/537.36",
    "Mozilla/5.0 (Windows NT 6.1; WOW64; Trident/7.0; AS; rv:11.0) like Gecko",
];

/// Default User-Agent for requests without an override (identifies the tool).
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("batchget/{version}")
}

/// Picks one browser User-Agent uniformly at random.
#[must_use]
pub fn random_browser_agent<R: rand::Rng + ?Sized>(rng: &mut R) -> &'static str {
    BROWSER_USER_AGENTS
        .choose(rng)
        .copied()
        .unwrap_or(BROWSER_USER_AGENTS[0])
}

/// Chooses the User-Agent override for a run.
///
/// A non-empty custom agent wins; otherwise `random` picks from the browser
/// list; otherwise no override is sent.
#[must_use]
pub fn select_user_agent<R: rand::Rng + ?Sized>(
    custom: Option<&str>,
    random: bool,
    rng: &mut R,
) -> Option<String> {
    if let Some(custom) = custom.map(str::trim).filter(|c| !c.is_empty()) {
        return Some(custom.to_string());
    }
    random.then(|| random_browser_agent(rng).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_default_user_agent_contains_version() {
        let ua = default_user_agent();
        assert_eq!(
            ua.strip_prefix("batchget/"),
            Some(env!("CARGO_PKG_VERSION")),
            "unexpected default UA: {ua}"
        );
    }

    #[test]
    fn test_browser_list_is_not_empty() {
        assert!(!BROWSER_USER_AGENTS.is_empty());
        assert!(BROWSER_USER_AGENTS.iter().all(|ua| ua.starts_with("Mozilla/5.0")));
    }

    #[test]
    fn test_random_agent_comes_from_list() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let ua = random_browser_agent(&mut rng);
            assert!(BROWSER_USER_AGENTS.contains(&ua));
        }
    }

    #[test]
    fn test_custom_agent_takes_precedence_over_random() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            select_user_agent(Some("MyAgent/2.0"), true, &mut rng),
            Some("MyAgent/2.0".to_string())
        );
    }

    #[test]
    fn test_empty_custom_agent_falls_back_to_random() {
        let mut rng = StdRng::seed_from_u64(1);
        let ua = select_user_agent(Some("  "), true, &mut rng).unwrap_or_default();
        assert!(BROWSER_USER_AGENTS.contains(&ua.as_str()));
    }

    #[test]
    fn test_no_override_without_flags() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(select_user_agent(None, false, &mut rng), None);
        assert_eq!(select_user_agent(Some(""), false, &mut rng), None);
    }
}
