use std::{io::ErrorKind, sync::Arc};

use anyhow::{Context, Result};
use campus_core::{
    buildings::BuildingTable, green_zones::GreenZoneTable, solar_model::SolarModel, ModelError,
};
use tracing::{info, warn};

use super::config::Config;

/// Everything the handlers read. Loaded once at startup, never mutated.
pub struct AppState {
    pub config: Config,
    pub buildings: BuildingTable,
    pub green_zones: GreenZoneTable,
    pub solar_model: Option<SolarModel>,
}

impl AppState {
    pub fn new(
        config: Config,
        buildings: BuildingTable,
        green_zones: GreenZoneTable,
        solar_model: Option<SolarModel>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            buildings,
            green_zones,
            solar_model,
        })
    }

    pub fn load(config: Config) -> Result<Arc<Self>> {
        let buildings_path = config.buildings_path();
        let buildings = BuildingTable::load(&buildings_path)
            .with_context(|| format!("loading building table {}", buildings_path.display()))?;
        info!("Loaded {} buildings", buildings.len());

        let green_zones_path = config.green_zones_path();
        let green_zones = GreenZoneTable::load(&green_zones_path)
            .with_context(|| format!("loading green zones {}", green_zones_path.display()))?;
        info!("Loaded {} green-zone points", green_zones.len());

        let solar_model = load_model(&config)?;

        Ok(Self::new(config, buildings, green_zones, solar_model))
    }
}

/// The model is optional: it only exists once the training tool has run.
fn load_model(config: &Config) -> Result<Option<SolarModel>> {
    match SolarModel::load(&config.model_path) {
        Ok(model) => {
            info!(
                "Loaded solar model ({} trees, {} samples) from {}",
                model.n_trees(),
                model.n_samples,
                config.model_path.display()
            );
            Ok(Some(model))
        }
        Err(ModelError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
            warn!("Solar model {} not found, /predict_solar disabled", config.model_path.display());
            Ok(None)
        }
        Err(e) => Err(e).context("loading solar model"),
    }
}
