//! Rate limiter for login failures
//!
//! Tracks failed login attempts per client IP in a sliding window. Once an
//! address crosses the failure threshold it is blocked for a fixed duration;
//! a successful login resets its counter.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use crate::config::LoginRateLimitConfig;

/// Runtime configuration for the login rate limiter
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Failed attempts before an address is blocked
    pub max_failures: u32,

    /// How long a blocked address stays blocked
    pub block_duration: Duration,

    /// Window after which the failure count resets
    pub window_duration: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_failures: 10,
            block_duration: Duration::from_secs(300),
            window_duration: Duration::from_secs(600),
        }
    }
}

impl From<&LoginRateLimitConfig> for RateLimitConfig {
    fn from(cfg: &LoginRateLimitConfig) -> Self {
        Self {
            max_failures: cfg.max_failures,
            block_duration: Duration::from_secs(cfg.block_duration_secs),
            window_duration: Duration::from_secs(cfg.window_duration_secs),
        }
    }
}

#[derive(Debug, Clone)]
struct FailureEntry {
    count: u32,
    first_failure: Instant,
    blocked_at: Option<Instant>,
}

impl FailureEntry {
    fn new() -> Self {
        Self {
            count: 0,
            first_failure: Instant::now(),
            blocked_at: None,
        }
    }
}

/// Thread-safe per-IP failure tracker
pub struct RateLimiter {
    config: RateLimitConfig,
    entries: RwLock<HashMap<IpAddr, FailureEntry>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Record a failed login attempt; returns true if the IP is now blocked
    pub fn record_failure(&self, ip: IpAddr) -> bool {
        let mut entries = self.entries.write().unwrap();
        let now = Instant::now();

        let entry = entries.entry(ip).or_insert_with(FailureEntry::new);

        if let Some(blocked_at) = entry.blocked_at {
            if now.duration_since(blocked_at) >= self.config.block_duration {
                *entry = FailureEntry::new();
            } else {
                return true;
            }
        }

        if now.duration_since(entry.first_failure) >= self.config.window_duration {
            *entry = FailureEntry::new();
        }
        entry.count += 1;

        if entry.count >= self.config.max_failures {
            entry.blocked_at = Some(now);
            true
        } else {
            false
        }
    }

    /// Check whether an IP is currently blocked
    pub fn is_blocked(&self, ip: IpAddr) -> bool {
        let entries = self.entries.read().unwrap();

        if let Some(entry) = entries.get(&ip) {
            if let Some(blocked_at) = entry.blocked_at {
                return blocked_at.elapsed() < self.config.block_duration;
            }
        }

        false
    }

    /// Clear the failure record for an IP after a successful login
    pub fn reset(&self, ip: IpAddr) {
        self.entries.write().unwrap().remove(&ip);
    }

    /// Failures recorded in the current window
    pub fn failure_count(&self, ip: IpAddr) -> u32 {
        let entries = self.entries.read().unwrap();

        match entries.get(&ip) {
            Some(entry) if entry.first_failure.elapsed() < self.config.window_duration => {
                entry.count
            }
            _ => 0,
        }
    }
}
