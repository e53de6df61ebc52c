//! Boundary traits for testability
//!
//! The only ambient input of a build is the fingerprint salt. Abstracting it
//! keeps builds reproducible in tests while the real binary salts with the
//! wall clock.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

/// Source of the per-build fingerprint salt.
pub trait SaltSource: Send + Sync {
    /// Salt for the next build.
    fn next_salt(&self) -> u64;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Wall-clock salt: milliseconds since the Unix epoch.
#[derive(Debug, Default)]
pub struct SystemClockSalt;

impl SaltSource for SystemClockSalt {
    fn next_salt(&self) -> u64 {
        u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default()
    }
}

// ============================================================
// DETERMINISTIC IMPLEMENTATIONS
// ============================================================

/// Monotonically increasing build counter.
#[derive(Debug, Default)]
pub struct BuildCounterSalt {
    next: AtomicU64,
}

impl BuildCounterSalt {
    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }
}

impl SaltSource for BuildCounterSalt {
    fn next_salt(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

/// Same salt for every build.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedSalt(pub u64);

impl SaltSource for FixedSalt {
    fn next_salt(&self) -> u64 {
        self.0
    }
}
