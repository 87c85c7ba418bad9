//! Offline trainer for the gradient boosting demand model
//!
//! Splits the historical demand CSV 80/20 in time, standardises the
//! features, fits the boosted trees on the training window and reports the
//! mean absolute error on the held-out window before saving the model.
//!
//! Usage: `train_gbm [data_csv] [model_out]`

use demand_forecast::data::DataLoader;
use demand_forecast::error::Result;
use demand_forecast::models::gradient_boosting::GradientBoostingModel;
use demand_forecast::models::{ForecastModel, TrainedForecastModel};
use demand_forecast::persist::{save_model, SavedModel};
use demand_forecast::utils::train_test_split;
use tracing::info;

const DEFAULT_DATA_PATH: &str = "data/water_data.csv";
const DEFAULT_MODEL_PATH: &str = "models/gbm_model.json";

/// Share of the series held out for evaluation
const TEST_RATIO: f64 = 0.2;

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
    let (train, test) = train_test_split(&data, TEST_RATIO)?;
    info!(
        train = train.len(),
        test = test.len(),
        "Split demand series"
    );

    let model = GradientBoostingModel::new();
    info!(model = model.name(), "Fitting model");
    let trained = model.train(&train)?;

    let predictions = trained.predict(&test)?;
    let mae = predictions.mean_absolute_error(&test.demand_values())?;
    info!(mae, "Held-out MAE");

    save_model(&model_path, &SavedModel::GradientBoosting(trained))?;
    info!(path = %model_path, "Model saved");

    Ok(())
}
