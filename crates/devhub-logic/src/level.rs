//! Level arithmetic. Converts cumulative XP to levels and back.
//!
//! Levels grow quadratically: reaching level `n + 1` takes `n² × 100` XP.
//!
//! ```
//! use devhub_logic::level::{level_for_xp, xp_threshold_for_level};
//!
//! assert_eq!(level_for_xp(0), 1);
//! assert_eq!(level_for_xp(150), 2);
//! assert_eq!(xp_threshold_for_level(1), 400);
//! ```
//!
//! # Progress bar floor
//!
//! [`progress_fraction`] measures from `level² × 100`, not from the XP at
//! which [`level_for_xp`] actually enters the level (`(level − 1)² × 100`).
//! Both formulas are kept exactly as the dashboard has always rendered them;
//! the bar therefore reads 0% for the whole first stretch of a level and is
//! clamped rather than going negative.

/// XP scale factor shared by every level formula.
pub const XP_PER_LEVEL_UNIT: u64 = 100;

/// Lowest level a user can hold.
pub const MIN_LEVEL: u32 = 1;

/// Level reached with `xp` total experience: `floor(sqrt(xp / 100)) + 1`.
///
/// Always at least [`MIN_LEVEL`] and non-decreasing in `xp`.
pub fn level_for_xp(xp: u64) -> u32 {
    let root = integer_sqrt(xp / XP_PER_LEVEL_UNIT);
    u32::try_from(root).unwrap_or(u32::MAX - 1) + 1
}

/// XP required to complete `level` and reach `level + 1`: `(level + 1)² × 100`.
///
/// Level 0 is treated as level 1.
pub fn xp_threshold_for_level(level: u32) -> u64 {
    let next = u64::from(level.max(MIN_LEVEL)) + 1;
    next.saturating_mul(next).saturating_mul(XP_PER_LEVEL_UNIT)
}

/// XP at which the progress bar for `level` starts: `level² × 100`.
pub fn level_start_xp(level: u32) -> u64 {
    let l = u64::from(level.max(MIN_LEVEL));
    l.saturating_mul(l).saturating_mul(XP_PER_LEVEL_UNIT)
}

/// Percentage (0.0–100.0) of the way from [`level_start_xp`] to
/// [`xp_threshold_for_level`].
///
/// Clamped at both ends so a stored level that disagrees with stored XP
/// still renders a sane bar.
pub fn progress_fraction(xp: u64, level: u32) -> f64 {
    let start = level_start_xp(level);
    let end = xp_threshold_for_level(level);
    if end <= start {
        return 100.0;
    }
    let progress = (xp as f64 - start as f64) / (end - start) as f64 * 100.0;
    progress.clamp(0.0, 100.0)
}

/// XP still missing before `xp` reaches the next-level threshold of `level`.
pub fn xp_to_next_level(xp: u64, level: u32) -> u64 {
    xp_threshold_for_level(level).saturating_sub(xp)
}

/// Clamp a raw numeric XP value (e.g. from a drifted document) to a valid total.
///
/// Negative and non-finite values become zero; fractions are truncated.
pub fn sanitize_xp(raw: f64) -> u64 {
    if !raw.is_finite() || raw <= 0.0 {
        return 0;
    }
    if raw >= u64::MAX as f64 {
        return u64::MAX;
    }
    raw as u64
}

/// Largest `r` with `r * r <= n`.
fn integer_sqrt(n: u64) -> u64 {
    if n < 2 {
        return n;
    }
    // Float estimate, then correct the rounding in either direction.
    let mut r = (n as f64).sqrt() as u64;
    while r.checked_mul(r).map_or(true, |sq| sq > n) {
        r -= 1;
    }
    while (r + 1).checked_mul(r + 1).is_some_and(|sq| sq <= n) {
        r += 1;
    }
    r
}
