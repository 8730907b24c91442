//! The `netcoach init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("netcoach.toml").exists() {
        println!("netcoach.toml already exists, skipping.");
    } else {
        std::fs::write("netcoach.toml", SAMPLE_CONFIG)?;
        println!("Created netcoach.toml");
    }

    std::fs::create_dir_all("data")?;
    let sample_path = std::path::Path::new("data/sample.json");
    if sample_path.exists() {
        println!("data/sample.json already exists, skipping.");
    } else {
        std::fs::write(sample_path, SAMPLE_DATASET)?;
        println!("Created data/sample.json");
    }

    println!("\nNext steps:");
    println!("  1. Run: netcoach validate --data data/sample.json");
    println!("  2. Run: netcoach report weekly --student s1 --date 2024-03-13");
    println!("  3. Run: netcoach coach --date 2024-03-13");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# netcoach configuration

data = "data/sample.json"
parallelism = 4
output_dir = "./netcoach-reports"
# text, json, markdown or html
default_format = "text"

[thresholds]
# Lessons below this accuracy are weak.
weak_below = 60.0
# Lessons at or above this accuracy are strong.
strong_at_least = 80.0
min_weak_sample = 1
stable_epsilon = 0.0
"#;

const SAMPLE_DATASET: &str = include_str!("../../../../fixtures/sample.json");
