//! The `netcoach validate` command.

use std::path::PathBuf;

use anyhow::Result;

pub fn execute(data_path: PathBuf) -> Result<()> {
    let dataset = netcoach_core::parser::load_dataset(&data_path)?;

    println!(
        "Dataset: {} ({} students, {} exams, {} activities, {} tasks, {} topics)",
        data_path.display(),
        dataset.students.len(),
        dataset.exams.len(),
        dataset.activities.len(),
        dataset.tasks.len(),
        dataset.topics.len()
    );

    let warnings = netcoach_core::parser::validate_dataset(&dataset);
    for w in &warnings {
        let prefix = w
            .record_id
            .as_ref()
            .map(|id| format!("  [{id}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Dataset valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
