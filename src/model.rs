//! Regression model used for the "predicted" ground-state energy.
//!
//! The crate only depends on the [`EnergyPredictor`] contract. The concrete
//! [`RandomForest`] reads the flat node arrays of an exported tree ensemble
//! (`children_left`, `children_right`, `feature`, `threshold`, `value` per
//! tree, leaves marked by `children_left == -1`).

use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::physics::{analytic_energy, WellParameters};

/// Anything that maps feature vectors to scalar predictions.
pub trait EnergyPredictor: Send + Sync {
    /// Returns one prediction per row of `features`.
    fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<f64>, ModelError>;
}

/// Predicted ground-state energy (eV) for a well of `width` nm.
pub fn predict_ground_state(
    predictor: &dyn EnergyPredictor,
    width: f64,
) -> Result<f64, ModelError> {
    let out = predictor.predict(&[vec![width]])?;
    match out.as_slice() {
        [energy] => Ok(*energy),
        other => Err(ModelError::PredictionCount(other.len())),
    }
}

/// Analytic vs. predicted ground-state energy for one width, plus the analytic
/// energy of the selected level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnergyEstimate {
    pub width: f64,
    pub analytic_ground: f64,
    pub predicted_ground: f64,
    pub level: u32,
    pub analytic_level: f64,
}

impl EnergyEstimate {
    pub fn deviation(&self) -> f64 {
        self.predicted_ground - self.analytic_ground
    }

    pub fn relative_deviation(&self) -> f64 {
        self.deviation() / self.analytic_ground
    }
}

pub fn estimate_energy(
    params: WellParameters,
    predictor: &dyn EnergyPredictor,
) -> Result<EnergyEstimate, ModelError> {
    Ok(EnergyEstimate {
        width: params.width,
        analytic_ground: analytic_energy(params.width, 1)?,
        predicted_ground: predict_ground_state(predictor, params.width)?,
        level: params.level,
        analytic_level: analytic_energy(params.width, params.level)?,
    })
}

/// A single regression tree in flat-array form.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Tree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<f64>,
}

const LEAF: i64 = -1;

impl Tree {
    fn validate(&self, idx: usize, n_features: usize) -> Result<(), ModelError> {
        let n = self.children_left.len();
        if n == 0 {
            return Err(ModelError::Malformed(format!("tree {idx} has no nodes")));
        }
        let lens = [
            self.children_right.len(),
            self.feature.len(),
            self.threshold.len(),
            self.value.len(),
        ];
        if lens.iter().any(|&len| len != n) {
            return Err(ModelError::Malformed(format!(
                "tree {idx} has node arrays of unequal length"
            )));
        }

        for node in 0..n {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left == LEAF {
                continue;
            }
            // children always come after their parent, which rules out cycles
            let in_range = |c: i64| c > node as i64 && (c as usize) < n;
            if !in_range(left) || !in_range(right) {
                return Err(ModelError::Malformed(format!(
                    "tree {idx} node {node} has children ({left}, {right}) out of range"
                )));
            }
            let f = self.feature[node];
            if f < 0 || f as usize >= n_features {
                return Err(ModelError::Malformed(format!(
                    "tree {idx} node {node} splits on feature {f}"
                )));
            }
        }
        Ok(())
    }

    fn predict_one(&self, x: &[f64]) -> f64 {
        let mut node = 0;
        while self.children_left[node] != LEAF {
            let f = self.feature[node] as usize;
            node = if x[f] <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        self.value[node]
    }
}

/// Averaging ensemble of regression trees.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RandomForest {
    pub n_features: usize,
    pub trees: Vec<Tree>,
}

impl RandomForest {
    /// Parse and validate a forest from its JSON export.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ModelError> {
        let forest: RandomForest = serde_json::from_slice(bytes)?;
        forest.validate()?;
        Ok(forest)
    }

    pub fn from_path(path: &Path) -> Result<Self, ModelError> {
        let bytes = fs::read(path)?;
        Self::from_json(&bytes)
    }

    fn validate(&self) -> Result<(), ModelError> {
        if self.n_features == 0 {
            return Err(ModelError::Malformed("n_features must be at least 1".to_string()));
        }
        if self.trees.is_empty() {
            return Err(ModelError::Malformed("forest has no trees".to_string()));
        }
        for (idx, tree) in self.trees.iter().enumerate() {
            tree.validate(idx, self.n_features)?;
        }
        Ok(())
    }
}

impl EnergyPredictor for RandomForest {
    fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<f64>, ModelError> {
        features
            .iter()
            .map(|x| {
                if x.len() != self.n_features {
                    return Err(ModelError::FeatureCount {
                        expected: self.n_features,
                        got: x.len(),
                    });
                }
                let sum: f64 = self.trees.iter().map(|t| t.predict_one(x)).sum();
                Ok(sum / self.trees.len() as f64)
            })
            .collect()
    }
}

static MODEL: OnceCell<RandomForest> = OnceCell::new();

/// Process-wide model, loaded from `source` on the first call.
///
/// Later calls return the cached instance and ignore `source`. A source that
/// starts with `http://` or `https://` is downloaded into `data/models/` once
/// and read from disk afterwards.
pub async fn shared_model(source: &str) -> Result<&'static RandomForest, ModelError> {
    if let Some(model) = MODEL.get() {
        return Ok(model);
    }

    let path = resolve_source(source, &data_dir()).await?;
    let forest = RandomForest::from_path(&path)?;
    log::info!(
        "loaded model from {} ({} trees)",
        path.display(),
        forest.trees.len()
    );
    // a concurrent first call may have won the race; keep whichever landed
    Ok(MODEL.get_or_init(|| forest))
}

fn data_dir() -> PathBuf {
    PathBuf::from("data").join("models")
}

async fn resolve_source(source: &str, dir: &Path) -> Result<PathBuf, ModelError> {
    if !(source.starts_with("http://") || source.starts_with("https://")) {
        return Ok(PathBuf::from(source));
    }

    let filename = source
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or("model.json");
    let local_path = dir.join(filename);
    if !local_path.exists() {
        fs::create_dir_all(dir)?;
        log::info!("downloading model from {source}");
        download_to(source, &local_path).await?;
    }
    Ok(local_path)
}

async fn download_to(url: &str, path: &Path) -> Result<(), ModelError> {
    let bytes = reqwest::get(url)
        .await?
        .error_for_status()?
        .bytes()
        .await?;
    store_model(&bytes, path)
}

/// Write a downloaded model to `path` only if it parses as a valid forest.
///
/// Bytes land in a `.part` file first and are renamed into place, so a
/// truncated download never shows up at `path`.
fn store_model(bytes: &[u8], path: &Path) -> Result<(), ModelError> {
    RandomForest::from_json(bytes)?;
    let mut part = path.as_os_str().to_owned();
    part.push(".part");
    let part = PathBuf::from(part);
    fs::write(&part, bytes)?;
    fs::rename(&part, path)?;
    Ok(())
}
