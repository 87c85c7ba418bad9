//! Persistence for fitted models
//!
//! Trained models are written to disk as JSON with a format version and a
//! model kind tag, so the server can refuse files fitted by a different
//! trainer than the one it expects.

use crate::error::{ForecastError, Result};
use crate::models::gradient_boosting::TrainedGradientBoostingModel;
use crate::models::sarimax::TrainedSarimaxModel;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Current model file format version
pub const FORMAT_VERSION: u32 = 1;

/// A fitted model of either supported family
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "params")]
pub enum SavedModel {
    /// SARIMAX with exogenous regressors
    Sarimax(TrainedSarimaxModel),
    /// Gradient boosting with embedded scaler
    GradientBoosting(TrainedGradientBoostingModel),
}

#[derive(Debug, Serialize, Deserialize)]
struct ModelFile {
    format_version: u32,
    #[serde(flatten)]
    model: SavedModel,
}

/// Save a fitted model to a JSON file
pub fn save_model<P: AsRef<Path>>(path: P, model: &SavedModel) -> Result<()> {
    let file = ModelFile {
        format_version: FORMAT_VERSION,
        model: model.clone(),
    };
    let json = serde_json::to_string_pretty(&file)?;
    fs::write(path, json)?;
    Ok(())
}

/// Load a fitted model of either family from a JSON file
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<SavedModel> {
    let json = fs::read_to_string(&path).map_err(|e| {
        ForecastError::PersistError(format!(
            "Cannot read model file '{}': {}",
            path.as_ref().display(),
            e
        ))
    })?;

    let file: ModelFile = serde_json::from_str(&json)?;
    if file.format_version != FORMAT_VERSION {
        return Err(ForecastError::PersistError(format!(
            "Unsupported model format version {} (expected {})",
            file.format_version, FORMAT_VERSION
        )));
    }

    Ok(file.model)
}

/// Load a SARIMAX model, rejecting files of any other kind
pub fn load_sarimax<P: AsRef<Path>>(path: P) -> Result<TrainedSarimaxModel> {
    match load_model(path)? {
        SavedModel::Sarimax(model) => Ok(model),
        SavedModel::GradientBoosting(_) => Err(ForecastError::PersistError(
            "Model file contains a gradient boosting model, expected SARIMAX".to_string(),
        )),
    }
}

/// Load a gradient boosting model, rejecting files of any other kind
pub fn load_gradient_boosting<P: AsRef<Path>>(path: P) -> Result<TrainedGradientBoostingModel> {
    match load_model(path)? {
        SavedModel::GradientBoosting(model) => Ok(model),
        SavedModel::Sarimax(_) => Err(ForecastError::PersistError(
            "Model file contains a SARIMAX model, expected gradient boosting".to_string(),
        )),
    }
}
