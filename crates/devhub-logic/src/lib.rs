//! Pure progress logic for Dev Resources Hub.
//!
//! This crate contains the gamification rules that are independent of any
//! database, UI, or runtime. Functions take a plain [`snapshot::ProgressSnapshot`]
//! and return results, making them unit-testable and reusable by the web
//! backend, native tools and the headless harness alike.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`achievements`] | Which catalog entries a snapshot newly satisfies |
//! | [`activity`] | Activity kinds, events and per-kind XP rewards |
//! | [`catalog`] | Ordered achievement registry (18 built-in entries) |
//! | [`config`] | Reward and catalog overrides loaded from JSON |
//! | [`level`] | XP ↔ level arithmetic and progress-bar fraction |
//! | [`notices`] | Level-up, unlock and streak celebration messages |
//! | [`progress`] | `ProgressEngine`: activity and visit aggregation |
//! | [`snapshot`] | Per-user progress record and lenient decoding |
//! | [`streak`] | Consecutive-day visit streaks |

pub mod achievements;
pub mod activity;
pub mod catalog;
pub mod config;
pub mod level;
pub mod notices;
pub mod progress;
pub mod snapshot;
pub mod streak;

pub use activity::{ActivityEvent, ActivityKind};
pub use catalog::{AchievementDefinition, Catalog};
pub use progress::{ActivityOutcome, ProgressEngine, StreakOutcome};
pub use snapshot::ProgressSnapshot;
