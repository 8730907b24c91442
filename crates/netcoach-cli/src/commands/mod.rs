pub mod analyze;
pub mod coach;
pub mod compare;
pub mod exam;
pub mod init;
pub mod plan;
pub mod report;
pub mod topics;
pub mod validate;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use comfy_table::{Cell, Table};

use netcoach_core::engine::{EngineConfig, ReportEngine};
use netcoach_core::model::LessonStat;
use netcoach_core::source::DatasetSource;
use netcoach_report::{OutputFormat, Render};

use crate::config::{load_config_from, NetcoachConfig};

/// Options shared by every command that reads a dataset.
pub struct DataArgs {
    pub data: Option<PathBuf>,
    pub config: Option<PathBuf>,
    /// Overrides the configured parallelism.
    pub parallelism: Option<usize>,
}

/// Loaded config, the dataset it points at, and an engine over it.
pub struct Session {
    pub config: NetcoachConfig,
    pub source: Arc<DatasetSource>,
    pub engine: ReportEngine,
}

impl Session {
    pub fn open(args: &DataArgs) -> Result<Self> {
        let mut config = load_config_from(args.config.as_deref())?;
        if let Some(p) = args.parallelism {
            config.parallelism = p;
        }
        let data = args
            .data
            .clone()
            .or_else(|| config.data.clone())
            .context("no dataset given: pass --data or set `data` in netcoach.toml")?;
        let source = Arc::new(DatasetSource::from_path(&data)?);
        let engine = ReportEngine::new(
            source.clone(),
            EngineConfig {
                parallelism: config.parallelism,
                thresholds: config.thresholds,
            },
        );
        Ok(Self {
            config,
            source,
            engine,
        })
    }

    /// Explicit `--format`, or the configured default.
    pub fn format(&self, flag: Option<String>) -> String {
        flag.unwrap_or_else(|| self.config.default_format.clone())
    }

    /// Print or write `report`. `text` prints through `print_text`; other
    /// formats go to `output` when given, stdout otherwise. HTML colours
    /// follow the configured thresholds.
    pub fn emit<R: Render>(
        &self,
        report: &R,
        format: &str,
        output: Option<&Path>,
        print_text: impl FnOnce(&R),
    ) -> Result<()> {
        if format == "text" {
            if output.is_some() {
                anyhow::bail!(
                    "text output cannot be written to a file; pick json, markdown or html"
                );
            }
            print_text(report);
            return Ok(());
        }

        let format: OutputFormat = format.parse()?;
        let thresholds = self.engine.thresholds();
        match output {
            Some(path) => {
                netcoach_report::write_report(report, format, thresholds, path)?;
                println!("Wrote {format} report to {}", path.display());
            }
            None => println!("{}", netcoach_report::render(report, format, thresholds)?),
        }
        Ok(())
    }
}

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn percent(value: f64) -> String {
    format!("{value:.1}%")
}

pub fn lesson_table(stats: &[LessonStat]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Ders", "Çözülen", "Doğru", "Yanlış", "Başarı"]);
    for s in stats {
        table.add_row(vec![
            Cell::new(&s.lesson),
            Cell::new(s.total_solved),
            Cell::new(s.total_correct),
            Cell::new(s.total_wrong),
            Cell::new(percent(s.accuracy_rate)),
        ]);
    }
    table
}
