//! Subscription keyword filter.
//!
//! Keywords are joined into a single regex alternation. They are NOT escaped:
//! `p12.4` matches `p1234` as well as `p12.4`. An empty keyword list matches
//! every subscription name. Keywords are used exactly as given: a blank
//! keyword is an empty alternative, so `["a", ""]` matches every name too.
//! Trimming user input is the job of [`parse_keywords`].

use crate::error::FilterError;
use crate::models::Subscription;
use regex::Regex;

/// Pattern used when no keywords are given.
pub const MATCH_ALL: &str = ".*";

/// A compiled keyword filter. Immutable once built.
#[derive(Debug, Clone)]
pub struct SubscriptionFilter {
    keywords: Vec<String>,
    regex: Regex,
}

impl SubscriptionFilter {
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// Unanchored search: true if any keyword fragment occurs in `name`.
    pub fn is_match(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    /// Subscriptions whose display name matches, in input order.
    pub fn apply(&self, subscriptions: &[Subscription]) -> Vec<Subscription> {
        subscriptions
            .iter()
            .filter(|s| self.is_match(&s.name))
            .cloned()
            .collect()
    }
}

/// Split comma-separated free text into keywords, dropping blanks.
pub fn parse_keywords(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

/// Compile keywords into `k1|k2|...`, or [`MATCH_ALL`] when there are none.
pub fn compile<S: AsRef<str>>(keywords: &[S]) -> Result<SubscriptionFilter, FilterError> {
    let keywords: Vec<String> = keywords.iter().map(|k| k.as_ref().to_string()).collect();

    let pattern = if keywords.is_empty() {
        MATCH_ALL.to_string()
    } else {
        keywords.join("|")
    };

    let regex = Regex::new(&pattern).map_err(|source| FilterError::InvalidPattern {
        pattern: pattern.clone(),
        source,
    })?;
    log::debug!("subscription filter pattern='{pattern}'");

    Ok(SubscriptionFilter { keywords, regex })
}
