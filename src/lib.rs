/*!
 * # verserecall
 *
 * Checks how closely a recalled passage matches its reference text and
 * plans when to rehearse it again.
 *
 * ## Features
 *
 * - Word-level comparison tolerant to small typos and known synonyms
 * - Highlighted rendering of correct, misspelled, missing and extra words
 * - Adaptive spaced repetition and fixed-frequency recurring schedules
 * - Practice history with pass/fail feedback
 * - SQLite persistence
 *
 * ## Architecture
 *
 * - `recall`: the scoring engine:
 *   - `recall::normalizer`: text to tokens
 *   - `recall::synonyms`: synonym dictionary
 *   - `recall::similarity`: token equivalence (exact, synonym, typo)
 *   - `recall::scorer`: greedy alignment and accuracy
 *   - `recall::highlight`: display sequences
 * - `rehearsal`: schedule records and the scheduler
 * - `practice`: attempt evaluation and history
 * - `store`: persistence traits plus memory and mock stores
 * - `database`: SQLite store
 * - `transcript`: speech-to-text boundary
 * - `app_config`: configuration management
 * - `app_controller`: wiring used by the binary
 * - `errors`: error types
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

pub mod app_config;
pub mod app_controller;
pub mod database;
pub mod errors;
pub mod practice;
pub mod recall;
pub mod rehearsal;
pub mod store;
pub mod transcript;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{AppError, ScheduleError, StoreError};
pub use practice::{PracticeOutcome, PracticeRecorder};
pub use recall::{compare, normalize, render, AligningScorer, ComparisonResult, SimilarityResolver};
pub use rehearsal::{due_today, upcoming, RehearsalSchedule, RehearsalScheduler, ScheduleRequest};
