use super::*;

fn sustain(state: &mut AdaptiveState, bytes_per_second: f64, seconds: f64) {
    // Feed the controller one-second samples so the rolling average
    // converges on `bytes_per_second` well before the adjustment fires.
    let mut remaining = seconds;
    while remaining > 0.0 {
        let step = remaining.min(1.0);
        state.update((bytes_per_second * step) as u64, step);
        remaining -= step;
    }
}

#[test]
fn new_transfer_starts_at_initial_size() {
    let state = AdaptiveState::new(1024);
    assert_eq!(state.get_chunk_size(), INITIAL_CHUNK_SIZE);
    assert_eq!(state.total_bytes(), 1024);
    assert_eq!(state.cumulative_bytes(), 0);
}

/// Invariant 6: for any sequence of updates, MIN <= chunk size <= MAX.
#[test]
fn chunk_size_always_clamped() {
    let mut state = AdaptiveState::new(0);
    for rate in [0.0, 1.0, 1_000.0, 1_000_000.0, 1_000_000_000.0] {
        sustain(&mut state, rate, 3.0);
        let size = state.get_chunk_size();
        assert!(size >= MIN_CHUNK_SIZE);
        assert!(size <= MAX_CHUNK_SIZE);
    }
}

/// S7: sustained ~500 KB/s for >= ADJUSTMENT_INTERVAL seconds steps down to
/// MIN on the next `get_chunk_size()`.
#[test]
fn s7_sustained_low_rate_steps_down_to_min() {
    let mut state = AdaptiveState::new(10_000_000);
    sustain(&mut state, 500_000.0, 3.0);
    assert_eq!(state.get_chunk_size(), MIN_CHUNK_SIZE);
}

/// S8: sustained ~200 MB/s steps up to MAX.
#[test]
fn s8_sustained_high_rate_steps_up_to_max() {
    let mut state = AdaptiveState::new(10_000_000_000);
    sustain(&mut state, 200.0 * 1024.0 * 1024.0, 3.0);
    assert_eq!(state.get_chunk_size(), MAX_CHUNK_SIZE);
}

/// Invariant 5: sustained rate in tier T converges to tier-T size and stays
/// there under continued sampling at the same rate.
#[test]
fn adaptive_monotonicity_on_sustained_rate() {
    let mut state = AdaptiveState::new(0);
    sustain(&mut state, 20.0 * 1024.0 * 1024.0, 3.0); // falls in the <50MB/s tier
    assert_eq!(state.get_chunk_size(), 256 * 1024);

    sustain(&mut state, 20.0 * 1024.0 * 1024.0, 3.0);
    assert_eq!(state.get_chunk_size(), 256 * 1024);
}

#[test]
fn tier_boundaries_are_closed_on_the_lower_tier() {
    assert_eq!(tier_for_average(1.0 * MB - 1.0), MIN_CHUNK_SIZE);
    assert_eq!(tier_for_average(1.0 * MB), 64 * 1024);
    assert_eq!(tier_for_average(10.0 * MB), 256 * 1024);
    assert_eq!(tier_for_average(50.0 * MB), 1024 * 1024);
    assert_eq!(tier_for_average(100.0 * MB), MAX_CHUNK_SIZE);
}

#[test]
fn non_positive_elapsed_seconds_is_discarded() {
    let mut state = AdaptiveState::new(0);
    state.update(1_000_000, 0.0);
    state.update(1_000_000, -1.0);
    assert_eq!(state.sample_count, 0);
    assert_eq!(state.cumulative_bytes(), 0);
    // No adjustment should have fired either, since the clock never moved.
    assert_eq!(state.get_chunk_size(), INITIAL_CHUNK_SIZE);
}

#[test]
fn zero_samples_average_to_zero_and_select_min() {
    let state = AdaptiveState::new(0);
    assert_eq!(state.average_speed(), 0.0);
}

#[test]
fn an_interval_with_no_updates_selects_min_on_first_adjustment() {
    // The very first adjustment, with nothing recorded yet except a single
    // near-instant sample, should starve down rather than up.
    let mut state = AdaptiveState::new(0);
    state.update(1, 2.0);
    assert_eq!(state.get_chunk_size(), MIN_CHUNK_SIZE);
}

#[test]
fn sample_ring_overwrites_oldest_after_n_samples() {
    let mut state = AdaptiveState::new(0);
    for _ in 0..(SAMPLE_COUNT * 2) {
        state.update(1024, 1.0);
    }
    assert_eq!(state.sample_count, SAMPLE_COUNT);
}

#[test]
fn reset_preserves_chunk_size_but_clears_samples() {
    let mut state = AdaptiveState::new(0);
    sustain(&mut state, 200.0 * 1024.0 * 1024.0, 3.0);
    let size_before = state.get_chunk_size();
    assert_eq!(size_before, MAX_CHUNK_SIZE);

    state.reset();
    assert_eq!(state.get_chunk_size(), size_before);
    assert_eq!(state.average_speed(), 0.0);
    assert_eq!(state.sample_count, 0);
}

#[test]
fn cumulative_bytes_accumulates_across_updates() {
    let mut state = AdaptiveState::new(0);
    state.update(100, 1.0);
    state.update(200, 1.0);
    assert_eq!(state.cumulative_bytes(), 300);
}

#[test]
fn with_initial_chunk_size_seeds_the_requested_starting_size() {
    let state = AdaptiveState::with_initial_chunk_size(0, 128 * 1024);
    assert_eq!(state.get_chunk_size(), 128 * 1024);
}

#[test]
fn with_initial_chunk_size_clamps_an_out_of_range_request() {
    let too_small = AdaptiveState::with_initial_chunk_size(0, 1);
    assert_eq!(too_small.get_chunk_size(), MIN_CHUNK_SIZE);

    let too_large = AdaptiveState::with_initial_chunk_size(0, u32::MAX);
    assert_eq!(too_large.get_chunk_size(), MAX_CHUNK_SIZE);
}
