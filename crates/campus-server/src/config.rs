use std::path::PathBuf;

use clap::Parser;

pub const BUILDINGS_FILE: &str = "campus_osm_data.csv";
pub const GREEN_ZONES_FILE: &str = "green_zone_output.csv";

#[derive(Parser, Debug, Clone)]
#[command(name = "campus-server", about = "Campus smart-energy dashboard backend")]
pub struct Config {
    /// Port to listen on.
    #[arg(long, env = "CAMPUS_PORT", default_value = "5000")]
    pub port: u16,

    /// Directory holding the building table and the clustering output.
    #[arg(long, env = "CAMPUS_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Directory served for every path that is not an API route.
    #[arg(long, env = "CAMPUS_FRONTEND_DIR", default_value = "frontend")]
    pub frontend_dir: PathBuf,

    /// Trained solar model produced by the `solar_model` tool.
    #[arg(long, env = "CAMPUS_MODEL_PATH", default_value = "models/solar_model.json")]
    pub model_path: PathBuf,
}

impl Config {
    pub fn buildings_path(&self) -> PathBuf {
        self.data_dir.join(BUILDINGS_FILE)
    }

    pub fn green_zones_path(&self) -> PathBuf {
        self.data_dir.join(GREEN_ZONES_FILE)
    }

    pub fn address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}
