/*!
 * Practice sessions: evaluate a recall, give feedback, keep history.
 */

pub mod models;
pub mod recorder;

pub use models::{PracticeAttempt, PracticeOutcome, PracticeStats};
pub use recorder::{describe_mistakes, PracticeRecorder, DEFAULT_PASS_THRESHOLD};
