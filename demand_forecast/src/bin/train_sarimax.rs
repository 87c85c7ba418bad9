//! Offline trainer for the SARIMAX demand model
//!
//! Fits SARIMAX(1,1,1)(1,1,1,7) with the five exogenous regressors on the
//! historical demand CSV and writes the fitted model as JSON for the HTTP
//! service to load.
//!
//! Usage: `train_sarimax [data_csv] [model_out]`

use demand_forecast::data::DataLoader;
use demand_forecast::error::Result;
use demand_forecast::metrics::forecast_accuracy;
use demand_forecast::models::sarimax::SarimaxModel;
use demand_forecast::models::{ForecastModel, TrainedForecastModel};
use demand_forecast::persist::{save_model, SavedModel};
use tracing::info;

const DEFAULT_DATA_PATH: &str = "data/water_ts_data.csv";
const DEFAULT_MODEL_PATH: &str = "models/sarimax_model.json";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let data_path = args.next().unwrap_or_else(|| DEFAULT_DATA_PATH.to_string());
    let model_path = args.next().unwrap_or_else(|| DEFAULT_MODEL_PATH.to_string());

    info!(data = %data_path, "Loading demand series");
    let data = DataLoader::from_csv(&data_path)?;
    info!(observations = data.len(), "Demand series loaded");

    let model = SarimaxModel::daily()?;
    info!(model = model.name(), "Fitting model");
    let trained = model.train(&data)?;

    // In-sample accuracy as a sanity check on the fit
    let fitted = trained.predict(&data)?;
    let accuracy = forecast_accuracy(fitted.values(), &data.demand_values())?;
    info!(mae = accuracy.mae, rmse = accuracy.rmse, "In-sample accuracy");

    save_model(&model_path, &SavedModel::Sarimax(trained))?;
    info!(path = %model_path, "SARIMAX model retrained and saved");

    Ok(())
}
