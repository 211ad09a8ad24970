/// Solar model training: fits a random-forest regressor for DC power from
/// plant weather sensor readings and saves it for the dashboard backend.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use campus_core::forest::{ForestParams, TreeParams};
use campus_core::solar_model::{
    load_training_set, SolarModel, SolarReading, FEATURE_COLUMNS, TARGET_COLUMN,
};

#[derive(Parser, Debug)]
#[command(name = "solar_model", about = "Train the DC power regression model")]
struct Args {
    /// Plant generation log (needs DC_POWER).
    #[arg(long, default_value = "data/Plant_1_Generation_Data.csv")]
    generation: PathBuf,

    /// Plant weather sensor log.
    #[arg(long, default_value = "data/Plant_1_Weather_Sensor_Data.csv")]
    weather: PathBuf,

    /// Output model file.
    #[arg(short, long, default_value = "models/solar_model.json")]
    output: PathBuf,

    #[arg(long, default_value = "100")]
    trees: usize,

    /// Maximum tree depth (unlimited when omitted).
    #[arg(long)]
    max_depth: Option<usize>,

    #[arg(long, default_value = "42")]
    seed: u64,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let data = load_training_set(&args.generation, &args.weather).with_context(|| {
        format!("loading {} and {}", args.generation.display(), args.weather.display())
    })?;
    eprintln!("Training samples: {}", data.len());
    if data.is_empty() {
        bail!("No complete rows to train on");
    }

    let params = ForestParams {
        n_trees: args.trees,
        seed: args.seed,
        tree: TreeParams { max_depth: args.max_depth, ..TreeParams::default() },
    };
    let model = SolarModel::train(&data, &params)?;

    // In-sample fit, for a quick sanity check.
    let targets = data.targets();
    let mean = targets.iter().sum::<f64>() / targets.len() as f64;
    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for (i, &y) in targets.iter().enumerate() {
        let row = data.row(i);
        let reading = SolarReading {
            ambient_temperature: row[0],
            module_temperature: row[1],
            irradiation: row[2],
        };
        let pred = model.predict(&reading)?;
        ss_res += (y - pred).powi(2);
        ss_tot += (y - mean).powi(2);
    }
    let r2 = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 1.0 };
    eprintln!("{} ~ {}: training R² = {r2:.4}", TARGET_COLUMN, FEATURE_COLUMNS.join(" + "));

    if let Some(dir) = args.output.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    model.save(&args.output)?;
    eprintln!("Saved {} trees to {}", model.n_trees(), args.output.display());

    Ok(())
}
