//! DC power regression trained on plant generation and weather sensor logs.
//!
//! The two logs are aligned row by row and truncated to the shorter one; rows
//! with any missing reading are dropped before training.

use std::fs::{self, File};
use std::path::Path;

use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{DataError, ModelError};
use crate::forest::{Dataset, ForestParams, RandomForest};

pub const FEATURE_COLUMNS: [&str; 3] = ["AMBIENT_TEMPERATURE", "MODULE_TEMPERATURE", "IRRADIATION"];
pub const TARGET_COLUMN: &str = "DC_POWER";

/// One weather sensor sample, in the model's feature order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolarReading {
    /// °C
    pub ambient_temperature: f64,
    /// °C
    pub module_temperature: f64,
    /// kW/m²
    pub irradiation: f64,
}

impl SolarReading {
    pub fn to_row(self) -> [f64; 3] {
        [self.ambient_temperature, self.module_temperature, self.irradiation]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolarModel {
    pub features: Vec<String>,
    pub target: String,
    pub n_samples: usize,
    pub params: ForestParams,
    forest: RandomForest,
}

/// Read the named columns; unparseable or empty cells become `None`.
fn read_columns(path: &Path, columns: &[&str]) -> Result<Vec<Vec<Option<f64>>>, DataError> {
    let file = File::open(path).map_err(|source| DataError::Io { path: path.to_path_buf(), source })?;
    let csv_err = |source| DataError::Csv { path: path.to_path_buf(), source };

    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(file);
    let headers = rdr.headers().map_err(csv_err)?.clone();
    let idx = columns
        .iter()
        .map(|col| {
            headers
                .iter()
                .position(|h| h.trim() == *col)
                .ok_or_else(|| DataError::MissingColumn { path: path.to_path_buf(), column: col.to_string() })
        })
        .collect::<Result<Vec<usize>, _>>()?;

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(csv_err)?;
        rows.push(
            idx.iter()
                .map(|&i| record.get(i).and_then(|v| v.trim().parse::<f64>().ok()))
                .collect(),
        );
    }
    Ok(rows)
}

/// Join generation and weather logs into a training set.
pub fn load_training_set(generation: &Path, weather: &Path) -> Result<Dataset, ModelError> {
    let targets = read_columns(generation, &[TARGET_COLUMN])?;
    let features = read_columns(weather, &FEATURE_COLUMNS)?;

    let aligned = targets.len().min(features.len());
    let mut data = Dataset::new(FEATURE_COLUMNS.len());
    let mut dropped = 0usize;

    for (target, row) in targets.iter().zip(&features) {
        let target = target[0];
        let row: Option<Vec<f64>> = row.iter().copied().collect();
        match (target, row) {
            (Some(y), Some(x)) if y.is_finite() && x.iter().all(|v| v.is_finite()) => {
                data.push(&x, y)?;
            }
            _ => dropped += 1,
        }
    }

    debug!("Aligned {aligned} rows, dropped {dropped} incomplete rows");
    Ok(data)
}

impl SolarModel {
    pub fn train(data: &Dataset, params: &ForestParams) -> Result<Self, ModelError> {
        if data.n_features() != FEATURE_COLUMNS.len() {
            return Err(ModelError::FeatureMismatch { expected: FEATURE_COLUMNS.len(), got: data.n_features() });
        }
        let forest = RandomForest::fit(data, params)?;
        info!("Trained {} trees on {} samples", forest.n_trees(), data.len());

        Ok(Self {
            features: FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect(),
            target: TARGET_COLUMN.to_string(),
            n_samples: data.len(),
            params: *params,
            forest,
        })
    }

    /// Predicted DC power for one reading.
    pub fn predict(&self, reading: &SolarReading) -> Result<f64, ModelError> {
        self.forest.predict(&reading.to_row())
    }

    pub fn n_trees(&self) -> usize {
        self.forest.n_trees()
    }

    pub fn save(&self, path: &Path) -> Result<(), ModelError> {
        let json = serde_json::to_string(self).map_err(|source| ModelError::Json { path: path.to_path_buf(), source })?;
        fs::write(path, json).map_err(|source| ModelError::Io { path: path.to_path_buf(), source })
    }

    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let text = fs::read_to_string(path).map_err(|source| ModelError::Io { path: path.to_path_buf(), source })?;
        let model: Self = serde_json::from_str(&text).map_err(|source| ModelError::Json { path: path.to_path_buf(), source })?;
        if model.forest.n_features() != FEATURE_COLUMNS.len() {
            return Err(ModelError::FeatureMismatch { expected: FEATURE_COLUMNS.len(), got: model.forest.n_features() });
        }
        model.forest.validate()?;
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use crate::forest::TreeParams;

    fn write(dir: &Path, name: &str, text: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        fs::write(&path, text).unwrap();
        path
    }

    fn plant_logs(dir: &Path) -> (std::path::PathBuf, std::path::PathBuf) {
        let mut gen = String::from("DATE_TIME,PLANT_ID,DC_POWER,AC_POWER\n");
        let mut weather = String::from("DATE_TIME,AMBIENT_TEMPERATURE,MODULE_TEMPERATURE,IRRADIATION\n");
        for i in 0..30 {
            let irr = i as f64 / 30.0;
            gen.push_str(&format!("t{i},1,{},0\n", irr * 1000.0));
            weather.push_str(&format!("t{i},25,{},{irr}\n", 25.0 + irr * 20.0));
        }
        // A blank generation reading, then a weather row past the end of the generation log.
        gen.push_str("t30,1,,0\n");
        weather.push_str("t30,25,30,0.5\n");
        weather.push_str("t31,25,30,0.5\n");
        (write(dir, "gen.csv", &gen), write(dir, "weather.csv", &weather))
    }

    #[test]
    fn training_set_aligns_and_drops_gaps() {
        let dir = tempfile::tempdir().unwrap();
        let (gen, weather) = plant_logs(dir.path());
        let data = load_training_set(&gen, &weather).unwrap();
        // Truncated to 31 aligned rows, then the blank one is dropped.
        assert_eq!(data.len(), 30);
        assert_eq!(data.n_features(), 3);
        assert_eq!(data.row(3), &[25.0, 27.0, 0.1]);
    }

    #[test]
    fn missing_feature_column_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let gen = write(dir.path(), "gen.csv", "DC_POWER\n1\n");
        let weather = write(dir.path(), "weather.csv", "AMBIENT_TEMPERATURE,IRRADIATION\n1,2\n");
        assert!(matches!(
            load_training_set(&gen, &weather),
            Err(ModelError::Data(DataError::MissingColumn { column, .. })) if column == "MODULE_TEMPERATURE"
        ));
    }

    #[test]
    fn trained_model_survives_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let (gen, weather) = plant_logs(dir.path());
        let data = load_training_set(&gen, &weather).unwrap();
        let params = ForestParams { n_trees: 10, seed: 42, tree: TreeParams::default() };
        let model = SolarModel::train(&data, &params).unwrap();

        let reading = SolarReading { ambient_temperature: 25.0, module_temperature: 35.0, irradiation: 0.5 };
        let before = model.predict(&reading).unwrap();
        assert!(before > 300.0 && before < 700.0, "prediction={before}");

        let path = dir.path().join("solar_model.json");
        model.save(&path).unwrap();
        let loaded = SolarModel::load(&path).unwrap();
        assert_eq!(loaded.n_trees(), 10);
        assert_eq!(loaded.n_samples, 30);
        assert_abs_diff_eq!(loaded.predict(&reading).unwrap(), before, epsilon = 1e-12);
        assert_eq!(loaded.features, FEATURE_COLUMNS);
        assert_eq!(loaded.params, params);
    }

    #[test]
    fn corrupt_model_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "solar_model.json", "{not json");
        assert!(matches!(SolarModel::load(&path), Err(ModelError::Json { .. })));
    }

    #[test]
    fn structurally_broken_model_is_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let header = r#""features":["AMBIENT_TEMPERATURE","MODULE_TEMPERATURE","IRRADIATION"],"target":"DC_POWER","n_samples":1,"params":{"n_trees":1,"seed":42,"tree":{"max_depth":null,"min_samples_split":2}}"#;
        let forests = [
            r#"{"n_features":3,"trees":[]}"#,
            r#"{"n_features":3,"trees":[{"nodes":[]}]}"#,
            r#"{"n_features":3,"trees":[{"nodes":[{"kind":"split","feature":5,"threshold":0.0,"left":1,"right":2},{"kind":"leaf","value":1.0},{"kind":"leaf","value":2.0}]}]}"#,
            r#"{"n_features":3,"trees":[{"nodes":[{"kind":"split","feature":0,"threshold":0.0,"left":0,"right":0}]}]}"#,
        ];
        for forest in forests {
            let path = write(dir.path(), "solar_model.json", &format!("{{{header},\"forest\":{forest}}}"));
            assert!(
                matches!(SolarModel::load(&path), Err(ModelError::InvalidModel { .. })),
                "accepted {forest}"
            );
        }
    }
}
