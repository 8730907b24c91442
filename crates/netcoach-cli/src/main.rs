//! netcoach CLI: study reports for exam coaches.

use std::path::PathBuf;
use std::process;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

mod commands;
mod config;

use commands::DataArgs;

#[derive(Parser)]
#[command(name = "netcoach", version, about = "Exam and study analytics for coaches")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score one exam, or list a student's exam history
    Exam {
        #[arg(long)]
        student: String,

        /// Exam id; omit to show the history of all exams
        #[arg(long)]
        exam: Option<String>,

        /// JSON file of topic results used to find weak topics
        #[arg(long)]
        topics: Option<PathBuf>,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Weak and strong lessons of a student over a period
    Analyze {
        #[arg(long)]
        student: String,

        /// First day (YYYY-MM-DD); defaults to seven days before --to
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Last day (YYYY-MM-DD); defaults to today
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Also save the analysis as JSON in the output directory
        #[arg(long)]
        save: bool,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Daily, weekly or monthly study report
    Report {
        /// daily, weekly or monthly
        kind: String,

        #[arg(long)]
        student: String,

        /// Any day inside the reported period (YYYY-MM-DD); defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Board file whose planned tasks count toward the daily report
        #[arg(long)]
        board: Option<PathBuf>,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Weekly summary across all students
    Coach {
        /// Any day inside the week (YYYY-MM-DD); defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Max students analyzed concurrently
        #[arg(long)]
        parallelism: Option<usize>,

        /// Also save the summary as JSON in the output directory
        #[arg(long)]
        save: bool,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Curriculum topic completion of a student
    Topics {
        #[arg(long)]
        student: String,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Compare two saved student analyses
    Compare {
        /// Earlier analysis JSON
        #[arg(long)]
        baseline: PathBuf,

        /// Later analysis JSON
        #[arg(long)]
        current: PathBuf,

        /// Exit code 1 if any lesson declined
        #[arg(long)]
        fail_on_decline: bool,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Check a dataset file for problems
    Validate {
        #[arg(long)]
        data: PathBuf,
    },

    /// Edit a weekly task board
    Plan {
        /// Board JSON file
        #[arg(long)]
        board: PathBuf,

        #[command(subcommand)]
        action: PlanAction,
    },

    /// Create starter config and sample dataset
    Init,
}

#[derive(clap::Args)]
struct CommonArgs {
    /// Dataset file (.json or .toml)
    #[arg(long)]
    data: Option<PathBuf>,

    /// Output format: text, json, markdown, html
    #[arg(long)]
    format: Option<String>,

    /// Write the report to this file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Config file path
    #[arg(long)]
    config: Option<PathBuf>,
}

impl CommonArgs {
    fn data_args(&self, parallelism: Option<usize>) -> DataArgs {
        DataArgs {
            data: self.data.clone(),
            config: self.config.clone(),
            parallelism,
        }
    }
}

#[derive(Subcommand)]
enum PlanAction {
    /// Create an empty board
    New {
        #[arg(long)]
        student: String,

        /// Any day of the planned week (YYYY-MM-DD); defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Add a task to the pool
    Add {
        #[arg(long)]
        task: String,

        #[arg(long)]
        title: String,

        #[arg(long)]
        lesson: Option<String>,

        #[arg(long, default_value = "0")]
        minutes: u32,
    },
    /// Place a pool task on a day
    Assign {
        #[arg(long)]
        task: String,

        #[arg(long)]
        day: String,
    },
    /// Move a placed task to another day
    Move {
        #[arg(long)]
        task: String,

        #[arg(long)]
        day: String,
    },
    /// Print the board
    Show,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("netcoach=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Exam {
            student,
            exam,
            topics,
            common,
        } => {
            commands::exam::execute(
                common.data_args(None),
                student,
                exam,
                topics,
                common.format,
                common.output,
            )
            .await
        }
        Commands::Analyze {
            student,
            from,
            to,
            save,
            common,
        } => {
            commands::analyze::execute(
                common.data_args(None),
                student,
                from,
                to,
                common.format,
                common.output,
                save,
            )
            .await
        }
        Commands::Report {
            kind,
            student,
            date,
            board,
            common,
        } => {
            commands::report::execute(
                common.data_args(None),
                kind,
                student,
                date,
                board,
                common.format,
                common.output,
            )
            .await
        }
        Commands::Coach {
            date,
            parallelism,
            save,
            common,
        } => {
            commands::coach::execute(
                common.data_args(parallelism),
                date,
                common.format,
                common.output,
                save,
            )
            .await
        }
        Commands::Topics { student, common } => {
            commands::topics::execute(
                common.data_args(None),
                student,
                common.format,
                common.output,
            )
            .await
        }
        Commands::Compare {
            baseline,
            current,
            fail_on_decline,
            format,
            config,
        } => commands::compare::execute(baseline, current, config, fail_on_decline, format),
        Commands::Validate { data } => commands::validate::execute(data),
        Commands::Plan { board, action } => match action {
            PlanAction::New { student, date } => commands::plan::create(&board, student, date),
            PlanAction::Add {
                task,
                title,
                lesson,
                minutes,
            } => commands::plan::add(&board, task, title, lesson, minutes),
            PlanAction::Assign { task, day } => commands::plan::assign(&board, &task, &day),
            PlanAction::Move { task, day } => commands::plan::move_task(&board, &task, &day),
            PlanAction::Show => commands::plan::show(&board),
        },
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
