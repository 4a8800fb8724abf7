/*!
 * Rehearsal scheduling.
 *
 * - `models`: schedule records, requests and write reports
 * - `frequency`: named recurrence presets
 * - `scheduler`: creation, completion and due-date queries
 */

pub mod frequency;
pub mod models;
pub mod scheduler;

pub use frequency::RehearsalFrequency;
pub use models::{
    CompletionReport, CompletionUpdate, RehearsalSchedule, ScheduleReport, ScheduleRequest, ScheduleStatus,
    WriteOutcome,
};
pub use scheduler::{due_today, upcoming, RehearsalScheduler};
