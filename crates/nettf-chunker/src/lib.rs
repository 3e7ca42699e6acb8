#![deny(unsafe_code)]
#![deny(missing_docs)]

//! # Overview
//!
//! `nettf-chunker` implements the adaptive chunk-size controller: it tracks
//! a rolling average of recent per-chunk throughput and retunes
//! [`AdaptiveState::get_chunk_size`] from a five-tier speed table, so a
//! transfer converges on a read/write granularity that matches the observed
//! link rate without any out-of-band signaling between sender and receiver.
//!
//! # Design
//!
//! [`AdaptiveState`] tracks time with a logical clock advanced by the caller
//! through [`AdaptiveState::update`]'s `elapsed_seconds` argument rather than
//! reading the wall clock internally. The frame engine always calls
//! `update` with the real elapsed time of the chunk it just transferred, so
//! in production this behaves identically to a wall-clock implementation,
//! while tests can simulate an arbitrary sustained rate without sleeping for
//! `ADJUSTMENT_INTERVAL` seconds. See `DESIGN.md` for the recorded rationale.
//!
//! # Invariants
//!
//! - [`AdaptiveState::get_chunk_size`] always returns a value in
//!   `[MIN_CHUNK_SIZE, MAX_CHUNK_SIZE]`.
//! - A call to `update` with `elapsed_seconds <= 0.0` is discarded: no
//!   sample is recorded and no divide-by-zero or infinity can occur.
//! - An adjustment with zero recorded samples averages to `0 B/s`, which
//!   selects `MIN_CHUNK_SIZE` — an idle transfer starts down, not up.
//! - Tier boundaries are closed on the lower bound: a rate exactly at a
//!   boundary falls into the lower tier.

use std::time::Instant;

/// Minimum chunk size: 8 KiB.
pub const MIN_CHUNK_SIZE: u32 = 8 * 1024;
/// Maximum chunk size: 2 MiB.
pub const MAX_CHUNK_SIZE: u32 = 2 * 1024 * 1024;
/// Initial chunk size before any throughput has been observed: 64 KiB.
pub const INITIAL_CHUNK_SIZE: u32 = 64 * 1024;
/// Number of rolling speed samples retained.
pub const SAMPLE_COUNT: usize = 5;
/// Minimum logical seconds between two chunk-size recomputations.
pub const ADJUSTMENT_INTERVAL_SECS: f64 = 2.0;

const MB: f64 = 1024.0 * 1024.0;

/// Per-transfer adaptive chunk-size state.
///
/// Created once per logical transfer via [`AdaptiveState::new`], fed
/// throughput samples via [`AdaptiveState::update`] as chunks complete, and
/// consulted via [`AdaptiveState::get_chunk_size`] before each read/write.
#[derive(Debug)]
pub struct AdaptiveState {
    current_chunk_size: u32,
    samples: [f64; SAMPLE_COUNT],
    sample_count: usize,
    next_slot: usize,
    cumulative_bytes: u64,
    total_bytes: u64,
    elapsed_since_adjustment: f64,
    started_at: Instant,
}

impl AdaptiveState {
    /// Starts a new adaptive transfer of `total_bytes` total content.
    ///
    /// Sets `current_chunk_size` to [`INITIAL_CHUNK_SIZE`], clears the
    /// sample ring, and stamps the transfer start time.
    #[must_use]
    pub fn new(total_bytes: u64) -> Self {
        Self::with_initial_chunk_size(total_bytes, INITIAL_CHUNK_SIZE)
    }

    /// Starts a new adaptive transfer like [`AdaptiveState::new`], but seeds
    /// `current_chunk_size` from `initial_chunk_size` instead of
    /// [`INITIAL_CHUNK_SIZE`]. The value is clamped into
    /// `[MIN_CHUNK_SIZE, MAX_CHUNK_SIZE]`, so a misconfigured caller can
    /// never start outside the valid range.
    #[must_use]
    pub fn with_initial_chunk_size(total_bytes: u64, initial_chunk_size: u32) -> Self {
        Self {
            current_chunk_size: initial_chunk_size.clamp(MIN_CHUNK_SIZE, MAX_CHUNK_SIZE),
            samples: [0.0; SAMPLE_COUNT],
            sample_count: 0,
            next_slot: 0,
            cumulative_bytes: 0,
            total_bytes,
            elapsed_since_adjustment: 0.0,
            started_at: Instant::now(),
        }
    }

    /// Returns the chunk size to use for the next read/write, defensively
    /// clamped into `[MIN_CHUNK_SIZE, MAX_CHUNK_SIZE]`.
    #[must_use]
    pub fn get_chunk_size(&self) -> u32 {
        self.current_chunk_size
            .clamp(MIN_CHUNK_SIZE, MAX_CHUNK_SIZE)
    }

    /// Records that `bytes_done` bytes were transferred in `elapsed_seconds`
    /// seconds, and recomputes `current_chunk_size` if an adjustment
    /// interval has elapsed since the last recomputation.
    ///
    /// A non-positive `elapsed_seconds` discards the sample entirely: no
    /// ring slot is written, no adjustment clock advances.
    pub fn update(&mut self, bytes_done: u64, elapsed_seconds: f64) {
        if elapsed_seconds <= 0.0 {
            return;
        }

        let speed = bytes_done as f64 / elapsed_seconds;
        self.samples[self.next_slot] = speed;
        self.next_slot = (self.next_slot + 1) % SAMPLE_COUNT;
        self.sample_count = (self.sample_count + 1).min(SAMPLE_COUNT);
        self.cumulative_bytes = self.cumulative_bytes.saturating_add(bytes_done);
        self.elapsed_since_adjustment += elapsed_seconds;

        if self.elapsed_since_adjustment >= ADJUSTMENT_INTERVAL_SECS {
            self.current_chunk_size = tier_for_average(self.average_speed());
            self.elapsed_since_adjustment = 0.0;
        }
    }

    /// Clears the sample ring and the adjustment clock, but preserves
    /// `current_chunk_size`.
    pub fn reset(&mut self) {
        self.samples = [0.0; SAMPLE_COUNT];
        self.sample_count = 0;
        self.next_slot = 0;
        self.elapsed_since_adjustment = 0.0;
    }

    /// Average of the currently populated speed samples, in bytes/second.
    /// `0.0` when no samples have been recorded.
    #[must_use]
    pub fn average_speed(&self) -> f64 {
        if self.sample_count == 0 {
            return 0.0;
        }
        let sum: f64 = self.samples[..self.sample_count].iter().sum();
        sum / self.sample_count as f64
    }

    /// Total bytes this transfer was declared to carry, as passed to
    /// [`AdaptiveState::new`].
    #[must_use]
    pub const fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Cumulative bytes observed via [`AdaptiveState::update`] so far.
    #[must_use]
    pub const fn cumulative_bytes(&self) -> u64 {
        self.cumulative_bytes
    }

    /// Wall-clock time elapsed since [`AdaptiveState::new`] was called.
    #[must_use]
    pub fn elapsed_since_start(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }
}

/// Maps an average throughput (bytes/second) to the next chunk size using
/// the five-tier table from the specification. Boundaries are closed on the
/// lower tier: a value exactly at a boundary selects the higher tier it
/// opens, e.g. exactly `1 MB/s` selects the `< 10 MB/s` tier, not `< 1 MB/s`.
fn tier_for_average(average_bytes_per_sec: f64) -> u32 {
    if average_bytes_per_sec < MB {
        MIN_CHUNK_SIZE
    } else if average_bytes_per_sec < 10.0 * MB {
        64 * 1024
    } else if average_bytes_per_sec < 50.0 * MB {
        256 * 1024
    } else if average_bytes_per_sec < 100.0 * MB {
        1024 * 1024
    } else {
        MAX_CHUNK_SIZE
    }
}

#[cfg(test)]
mod tests;
