/*!
 * Application controller.
 *
 * Wires configuration, the store, the scorer, the scheduler and the
 * practice recorder together, and exposes the operations the CLI drives.
 */

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use std::path::Path;

use crate::app_config::Config;
use crate::database::Repository;
use crate::practice::{PracticeAttempt, PracticeOutcome, PracticeRecorder, PracticeStats};
use crate::recall::{highlight, normalize, AligningScorer, ComparisonResult, Highlight};
use crate::rehearsal::{CompletionReport, RehearsalScheduler, RehearsalSchedule, ScheduleReport, ScheduleRequest};
use crate::store::{AttemptStore, ScheduleStore};

/// Comparison together with its display sequence
#[derive(Debug, Clone)]
pub struct Comparison {
    pub result: ComparisonResult,
    pub highlights: Vec<Highlight>,
}

/// Outcome of rehearsing a scheduled passage
#[derive(Debug, Clone)]
pub struct RehearsalOutcome {
    pub practice: PracticeOutcome,
    pub attempt: PracticeAttempt,
    pub completion: CompletionReport,
}

/// Main application controller
pub struct Controller<S = Repository>
where
    S: ScheduleStore + AttemptStore + Clone,
{
    config: Config,
    scheduler: RehearsalScheduler<S>,
    recorder: PracticeRecorder<S>,
}

impl Controller<Repository> {
    /// Open the SQLite store named by the configuration, or the default one
    pub fn open(config: Config) -> Result<Self> {
        let repository = match &config.database.path {
            Some(path) => open_repository(path)?,
            None => Repository::new_default().context("Failed to open default database")?,
        };
        Self::with_store(config, repository)
    }

    /// Controller over an in-memory SQLite database
    pub fn new_for_test() -> Result<Self> {
        Self::with_store(Config::default(), Repository::new_in_memory()?)
    }
}

fn open_repository(path: &Path) -> Result<Repository> {
    let connection = crate::database::DatabaseConnection::open(path)
        .with_context(|| format!("Failed to open database: {}", path.display()))?;
    Ok(Repository::new(connection))
}

impl<S> Controller<S>
where
    S: ScheduleStore + AttemptStore + Clone,
{
    /// Create a controller over any store
    pub fn with_store(config: Config, store: S) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;

        let scorer = config.scoring.build_scorer();
        debug!(
            "Scorer ready: {} synonym entries, fuzzy threshold {}",
            scorer.resolver().synonyms().len(),
            scorer.fuzzy_threshold()
        );

        let scheduler = RehearsalScheduler::new(store.clone(), config.scheduling.clone());
        let recorder = PracticeRecorder::new(scorer, config.scoring.pass_threshold, store);

        Ok(Self {
            config,
            scheduler,
            recorder,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn scorer(&self) -> &AligningScorer {
        self.recorder.scorer()
    }

    pub fn scheduler(&self) -> &RehearsalScheduler<S> {
        &self.scheduler
    }

    pub fn recorder(&self) -> &PracticeRecorder<S> {
        &self.recorder
    }

    /// Score a recall and build its highlighted rendering
    pub fn compare(&self, candidate_text: &str, reference_text: &str) -> Comparison {
        let candidate = normalize(candidate_text);
        let reference = normalize(reference_text);
        let result = self.scorer().compare(&candidate, &reference);
        let highlights = highlight::render(&candidate, &reference, &result);
        Comparison { result, highlights }
    }

    /// Evaluate and record a free practice attempt
    pub async fn practice(
        &self,
        user_id: &str,
        verse_id: &str,
        candidate_text: &str,
        reference_text: &str,
        used_speech_input: bool,
        now: DateTime<Utc>,
    ) -> Result<(PracticeOutcome, PracticeAttempt)> {
        let result = self
            .recorder
            .practice(user_id, verse_id, candidate_text, reference_text, used_speech_input, now)
            .await
            .context("Failed to record practice attempt")?;
        Ok(result)
    }

    /// Rehearse a scheduled passage: score, record, and complete the schedule
    pub async fn rehearse(
        &self,
        schedule_id: &str,
        candidate_text: &str,
        reference_text: &str,
        used_speech_input: bool,
        now: DateTime<Utc>,
    ) -> Result<RehearsalOutcome> {
        let schedule = self
            .scheduler
            .store()
            .get_schedule(schedule_id)
            .await
            .context("Failed to load rehearsal")?
            .ok_or_else(|| crate::errors::ScheduleError::NotFound(schedule_id.to_string()))?;

        if schedule.completed {
            return Err(crate::errors::ScheduleError::AlreadyCompleted(schedule_id.to_string()).into());
        }

        let (practice, attempt) = self
            .practice(
                &schedule.user_id,
                &schedule.verse_id,
                candidate_text,
                reference_text,
                used_speech_input,
                now,
            )
            .await?;

        let completion = self
            .scheduler
            .complete_rehearsal(schedule_id, practice.comparison.accuracy, now)
            .await?;

        if !practice.passed {
            info!(
                "Rehearsal of '{}' scored {}%, below the {}% pass mark",
                schedule.reference,
                practice.comparison.accuracy,
                self.config.scoring.pass_threshold
            );
        }

        Ok(RehearsalOutcome {
            practice,
            attempt,
            completion,
        })
    }

    pub async fn schedule(&self, request: &ScheduleRequest, now: DateTime<Utc>) -> Result<ScheduleReport> {
        let report = self.scheduler.schedule_rehearsal(request, now).await?;
        if let Some(error) = report.failure() {
            warn!(
                "Only {}/{} rehearsals were stored: {}",
                report.written_ids().len(),
                report.planned,
                error
            );
        }
        Ok(report)
    }

    pub async fn complete(&self, schedule_id: &str, accuracy: u8, now: DateTime<Utc>) -> Result<CompletionReport> {
        Ok(self.scheduler.complete_rehearsal(schedule_id, accuracy, now).await?)
    }

    pub async fn due_today(&self, user_id: &str, now: DateTime<Utc>) -> Result<Vec<RehearsalSchedule>> {
        Ok(self.scheduler.due_today_for(user_id, now).await?)
    }

    pub async fn upcoming(&self, user_id: &str, now: DateTime<Utc>) -> Result<Vec<RehearsalSchedule>> {
        Ok(self.scheduler.upcoming_for(user_id, now).await?)
    }

    pub async fn list(&self, user_id: &str) -> Result<Vec<RehearsalSchedule>> {
        Ok(self.scheduler.list_schedules(user_id).await?)
    }

    pub async fn practice_stats(&self, user_id: &str, verse_id: &str) -> Result<PracticeStats> {
        Ok(self.recorder.practice_stats(user_id, verse_id).await?)
    }
}
