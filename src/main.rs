// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::too_many_arguments)]

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use verserecall::app_config::{Config, LogLevel};
use verserecall::app_controller::Controller;
use verserecall::recall::highlight;
use verserecall::rehearsal::{RehearsalFrequency, RehearsalSchedule, ScheduleRequest};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

/// CLI Wrapper for RehearsalFrequency to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliFrequency {
    Daily,
    EveryOtherDay,
    TwiceAWeek,
    Weekly,
    BiWeekly,
    Monthly,
}

impl From<CliFrequency> for RehearsalFrequency {
    fn from(cli_frequency: CliFrequency) -> Self {
        match cli_frequency {
            CliFrequency::Daily => RehearsalFrequency::Daily,
            CliFrequency::EveryOtherDay => RehearsalFrequency::EveryOtherDay,
            CliFrequency::TwiceAWeek => RehearsalFrequency::TwiceAWeek,
            CliFrequency::Weekly => RehearsalFrequency::Weekly,
            CliFrequency::BiWeekly => RehearsalFrequency::BiWeekly,
            CliFrequency::Monthly => RehearsalFrequency::Monthly,
        }
    }
}

/// Output style for comparisons
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Colored terminal output
    #[default]
    Text,
    /// Span markup with one class per category
    Markup,
    /// Comparison result as JSON
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compare a recalled passage against its reference text
    Compare {
        /// What the user recalled
        candidate: String,
        /// Canonical text
        reference: String,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Score and record a practice attempt
    Practice {
        #[arg(long)]
        verse: String,
        /// Canonical text
        #[arg(long)]
        reference: String,
        /// What the user recalled
        #[arg(long)]
        input: String,
        /// Mark the input as transcribed speech
        #[arg(long)]
        speech: bool,
    },

    /// Rehearse a scheduled passage and complete its schedule
    Rehearse {
        /// Schedule id
        id: String,
        #[arg(long)]
        reference: String,
        #[arg(long)]
        input: String,
        #[arg(long)]
        speech: bool,
    },

    /// Schedule rehearsals of a passage
    Schedule {
        #[arg(long)]
        verse: String,
        /// Display label, e.g. "John 3:16"
        #[arg(long)]
        label: String,
        /// Recur at a preset frequency
        #[arg(long, value_enum, conflicts_with = "every")]
        frequency: Option<CliFrequency>,
        /// Recur every N days
        #[arg(long)]
        every: Option<u32>,
        /// First rehearsal date (YYYY-MM-DD or RFC 3339)
        #[arg(long, value_parser = parse_date)]
        date: Option<DateTime<Utc>>,
        /// Schedule as a follow-up instead of a newly added passage
        #[arg(long)]
        follow_up: bool,
    },

    /// Complete a scheduled rehearsal with the accuracy reached
    Complete {
        /// Schedule id
        id: String,
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
        accuracy: u8,
    },

    /// Rehearsals due today
    Due,

    /// Rehearsals after now
    Upcoming,

    /// Every rehearsal of the user
    List,

    /// Practice history for a passage
    Stats {
        #[arg(long)]
        verse: String,
    },

    /// Show the recurrence presets
    Frequencies,

    /// Generate shell completions for verserecall
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// verserecall - check memorized passages and plan their rehearsal
#[derive(Parser, Debug)]
#[command(name = "verserecall")]
#[command(version)]
#[command(about = "Score recalled passages and schedule rehearsals")]
#[command(long_about = "verserecall compares a recalled passage with its reference word by word, \
tolerating small typos and known synonyms, and schedules future rehearsals.

EXAMPLES:
    verserecall compare \"the lord is my sheperd\" \"The LORD is my shepherd\"
    verserecall schedule --verse ps23-1 --label \"Psalm 23:1\"
    verserecall schedule --verse jn3-16 --label \"John 3:16\" --frequency weekly
    verserecall due
    verserecall complete <ID> --accuracy 95
    verserecall completions bash > verserecall.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. If the file doesn't
    exist, a default one is created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,

    /// SQLite database path, overrides the configuration
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// User whose rehearsals are managed
    #[arg(short, long, env = "VERSERECALL_USER", default_value = "local", global = true)]
    user: String,
}

struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }

    fn emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                Self::emoji_for_level(record.level()),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Accept a calendar date (midnight UTC) or a full RFC 3339 timestamp
fn parse_date(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|naive| naive.and_utc())
            .ok_or_else(|| format!("Invalid date: {}", value));
    }
    DateTime::parse_from_rfc3339(value)
        .map(|date| date.with_timezone(&Utc))
        .map_err(|e| format!("Invalid date '{}': {}", value, e))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Level is refined once the configuration is loaded
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "verserecall", &mut std::io::stdout());
            return Ok(());
        }
        Commands::Frequencies => {
            for frequency in RehearsalFrequency::ALL {
                println!("{}", frequency);
            }
            return Ok(());
        }
        _ => {}
    }

    let config = load_config(&cli)?;
    log::set_max_level(config.log_level.to_level_filter());

    if let Commands::Compare {
        candidate,
        reference,
        format,
    } = &cli.command
    {
        let controller = Controller::with_store(config, verserecall::store::MemoryStore::new())?;
        return print_comparison(&controller, candidate, reference, *format);
    }

    let controller = Controller::open(config)?;
    run_command(&controller, &cli.user, cli.command, Utc::now()).await
}

/// Load the configuration file and apply command-line overrides
fn load_config(cli: &CommandLineOptions) -> Result<Config> {
    let mut config = Config::load_or_create(&cli.config)?;

    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone().into();
    }
    if let Some(database) = &cli.database {
        config.database.path = Some(database.clone());
    }

    config.validate().context("Configuration validation failed")?;
    Ok(config)
}

async fn run_command(controller: &Controller, user: &str, command: Commands, now: DateTime<Utc>) -> Result<()> {
    match command {
        Commands::Practice {
            verse,
            reference,
            input,
            speech,
        } => {
            let (outcome, attempt) = controller.practice(user, &verse, &input, &reference, speech, now).await?;
            println!("{}", outcome.feedback);
            for mistake in &outcome.mistakes {
                println!("  - {}", mistake);
            }
            info!("Attempt {} recorded", attempt.id);
        }
        Commands::Rehearse {
            id,
            reference,
            input,
            speech,
        } => {
            let outcome = controller.rehearse(&id, &input, &reference, speech, now).await?;
            println!("{}", outcome.practice.feedback);
            for mistake in &outcome.practice.mistakes {
                println!("  - {}", mistake);
            }
            println!("Next rehearsal: {}", outcome.completion.next_rehearsal_date.format("%Y-%m-%d"));
            if outcome.completion.successor_failed() {
                return Err(anyhow!("Rehearsal completed but the next one could not be scheduled"));
            }
        }
        Commands::Schedule {
            verse,
            label,
            frequency,
            every,
            date,
            follow_up,
        } => {
            let mut request = ScheduleRequest::new(user, &verse, &label).initial(!follow_up);
            if let Some(date) = date {
                request = request.on(date);
            }
            if let Some(days) = frequency.map(|f| RehearsalFrequency::from(f).days()).or(every) {
                request = request.every(days);
            }

            let report = controller.schedule(&request, now).await?;
            for id in report.written_ids() {
                println!("{}", id);
            }
            if let Some(error) = report.failure() {
                return Err(anyhow!(
                    "Stored {}/{} rehearsals before failing: {}",
                    report.written_ids().len(),
                    report.planned,
                    error
                ));
            }
        }
        Commands::Complete { id, accuracy } => {
            let report = controller.complete(&id, accuracy, now).await?;
            println!(
                "Completed '{}' at {}%, next rehearsal {}",
                report.schedule.reference,
                accuracy,
                report.next_rehearsal_date.format("%Y-%m-%d")
            );
            if report.successor_failed() {
                return Err(anyhow!("Rehearsal completed but the next one could not be scheduled"));
            }
        }
        Commands::Due => print_schedules(&controller.due_today(user, now).await?),
        Commands::Upcoming => print_schedules(&controller.upcoming(user, now).await?),
        Commands::List => print_schedules(&controller.list(user).await?),
        Commands::Stats { verse } => {
            let stats = controller.practice_stats(user, &verse).await?;
            println!("Attempts: {} ({} passed)", stats.attempts, stats.passed);
            if let (Some(best), Some(last)) = (stats.best_score, stats.last_score) {
                println!("Best: {}%, last: {}%", best, last);
            }
            if let Some(when) = stats.last_practiced {
                println!("Last practiced: {}", when.format("%Y-%m-%d %H:%M"));
            }
        }
        Commands::Compare { .. } | Commands::Frequencies | Commands::Completions { .. } => {}
    }

    Ok(())
}

fn print_comparison<S>(controller: &Controller<S>, candidate: &str, reference: &str, format: OutputFormat) -> Result<()>
where
    S: verserecall::store::ScheduleStore + verserecall::store::AttemptStore + Clone,
{
    let comparison = controller.compare(candidate, reference);

    match format {
        OutputFormat::Text => {
            println!("{}", highlight::to_ansi(&comparison.highlights));
            println!("Accuracy: {}%", comparison.result.accuracy);
            for pair in &comparison.result.synonyms_used {
                println!("  synonym: {} for {}", pair.used, pair.reference);
            }
        }
        OutputFormat::Markup => println!("{}", highlight::to_markup(&comparison.highlights)),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&comparison.result).context("Failed to encode comparison")?
        ),
    }

    Ok(())
}

fn print_schedules(schedules: &[RehearsalSchedule]) {
    if schedules.is_empty() {
        println!("No rehearsals.");
        return;
    }
    for schedule in schedules {
        let recurrence = schedule
            .frequency_days
            .map(|days| format!("every {}d", days))
            .unwrap_or_else(|| "adaptive".to_string());
        println!(
            "{}  {}  {:<10} {:<12} {}",
            schedule.scheduled_date.format("%Y-%m-%d"),
            schedule.id,
            schedule.status(),
            recurrence,
            schedule.reference
        );
    }
}
