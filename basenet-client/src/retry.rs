//! Domain-keyed retry policies.

use crate::url::ParsedUrl;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Retry policy for one hostname.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RetryPolicy {
    /// Retry the same URL up to this many times.
    Count(u32),
    /// Retry once per origin, in order, keeping the original path and query.
    Origins(Vec<String>),
}

impl RetryPolicy {
    /// Decide what to do after attempt number `attempt` (0-based) failed.
    pub fn next(&self, attempt: u32, request_url: &str, parsed: &ParsedUrl) -> RetryDecision {
        match self {
            Self::Count(max) if attempt < *max => RetryDecision::Retry {
                url: request_url.to_string(),
            },
            Self::Origins(origins) => match origins.get(attempt as usize) {
                Some(origin) if !origin.is_empty() => RetryDecision::Retry {
                    url: format!("{}{}{}", origin, parsed.pathname(), parsed.search()),
                },
                _ => RetryDecision::GiveUp,
            },
            _ => RetryDecision::GiveUp,
        }
    }

    /// Upper bound on the number of retries this policy allows.
    pub fn max_retries(&self) -> u32 {
        match self {
            Self::Count(max) => *max,
            Self::Origins(origins) => u32::try_from(origins.len()).unwrap_or(u32::MAX),
        }
    }
}

/// Retry policies keyed by hostname.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RetryConfig {
    policies: HashMap<String, RetryPolicy>,
}

impl RetryConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Retry requests to `hostname` up to `max` times.
    pub fn count(mut self, hostname: impl Into<String>, max: u32) -> Self {
        self.policies.insert(hostname.into(), RetryPolicy::Count(max));
        self
    }

    /// Retry requests to `hostname` against each origin in turn.
    pub fn origins<I, S>(mut self, hostname: impl Into<String>, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let origins = origins.into_iter().map(Into::into).collect();
        self.policies
            .insert(hostname.into(), RetryPolicy::Origins(origins));
        self
    }

    /// Get the policy for `hostname`.
    pub fn policy_for(&self, hostname: Option<&str>) -> Option<&RetryPolicy> {
        hostname.and_then(|host| self.policies.get(host))
    }

    /// Check if no policies are configured.
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

/// Outcome of a retry decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Reissue the request against this URL.
    Retry {
        /// Fully built URL of the next attempt.
        url: String,
    },
    /// Stop and surface the failure.
    GiveUp,
}

/// Attempt counter of one logical request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryState {
    attempt: u32,
}

impl RetryState {
    /// Start at attempt 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current attempt number, which is also the retries made so far.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Decide the next step after the current attempt failed.
    ///
    /// `origin` is the parsed URL of the first attempt: the policy stays keyed
    /// by the original hostname even after rotating to another origin.
    /// Advances the counter when a retry is granted.
    pub fn on_failure(
        &mut self,
        config: Option<&RetryConfig>,
        request_url: &str,
        origin: &ParsedUrl,
    ) -> RetryDecision {
        let decision = config
            .and_then(|config| config.policy_for(origin.hostname()))
            .map(|policy| policy.next(self.attempt, request_url, origin))
            .unwrap_or(RetryDecision::GiveUp);

        if matches!(decision, RetryDecision::Retry { .. }) {
            self.attempt += 1;
        }

        decision
    }
}
