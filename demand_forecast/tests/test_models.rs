use chrono::{Duration, NaiveDate};
use demand_forecast::data::{CovariateFrame, DemandSeries};
use demand_forecast::models::gradient_boosting::GradientBoostingModel;
use demand_forecast::models::sarimax::SarimaxModel;
use demand_forecast::models::{ForecastModel, ForecastResult, TrainedForecastModel};
use demand_forecast::scenario::{Conditions, Scenario};

/// Synthetic daily demand with weekly seasonality and covariate effects
fn synthetic_series(days: usize) -> DemandSeries {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let dates: Vec<NaiveDate> = (0..days)
        .map(|i| start + Duration::days(i as i64))
        .collect();

    let mut demand = Vec::with_capacity(days);
    let mut temps = Vec::with_capacity(days);
    let mut rains = Vec::with_capacity(days);
    let mut festivals = Vec::with_capacity(days);
    let mut pops = Vec::with_capacity(days);
    let mut inds = Vec::with_capacity(days);

    for i in 0..days {
        let weekly = ((i % 7) as f64 / 7.0 * std::f64::consts::TAU).sin();
        let temp = 28.0 + 4.0 * weekly;
        let rain = if i % 5 == 0 { 12.0 } else { 2.0 };
        let festival = if i % 30 == 0 { 1.0 } else { 0.0 };
        let pop = 1.5 + i as f64 * 0.001;
        // Varying index; a constant column would be collinear with the
        // regression intercept
        let ind = 1.2 + ((i % 11) as f64) * 0.01;

        temps.push(temp);
        rains.push(rain);
        festivals.push(festival);
        pops.push(pop);
        inds.push(ind);
        // Deterministic noise keeps the series reproducible while leaving
        // structure the regression stage cannot explain
        let noise = ((i * 7919) % 13) as f64 * 0.4 - 2.4;
        demand.push(
            300.0 + 3.0 * temp - 1.5 * rain + 25.0 * festival + 40.0 * pop + 10.0 * ind
                + 8.0 * weekly
                + noise,
        );
    }

    let covariates = CovariateFrame::new(vec![temps, rains, festivals, pops, inds]).unwrap();
    DemandSeries::new(dates, demand, covariates).unwrap()
}

fn week_ahead_exog(horizon: usize) -> CovariateFrame {
    let conditions = Conditions {
        avg_temp: 28.0,
        rainfall: 2.0,
        population_index: 1.55,
        industrial_index: 1.2,
    };
    Scenario::baseline().project(&conditions, horizon).unwrap()
}

#[test]
fn test_sarimax_train_and_forecast() {
    let data = synthetic_series(90);
    let model = SarimaxModel::daily().unwrap();
    assert_eq!(model.name(), "SARIMAX(1,1,1)(1,1,1,7)");

    let trained = model.train(&data).unwrap();
    let forecast = trained.forecast(7, &week_ahead_exog(7)).unwrap();

    assert_eq!(forecast.horizon(), 7);
    assert_eq!(forecast.values().len(), 7);

    // Demand is non-negative and in the rough range of the training data
    for value in forecast.values() {
        assert!(value.is_finite());
        assert!(*value >= 0.0);
        assert!(*value < 1000.0, "implausible forecast: {value}");
    }

    // Intervals are present, ordered, and widen with the horizon
    let intervals = forecast.intervals().unwrap();
    assert_eq!(intervals.len(), 7);
    for (lower, upper) in intervals {
        assert!(lower <= upper);
    }
    let first_width = intervals[0].1 - intervals[0].0;
    let last_width = intervals[6].1 - intervals[6].0;
    assert!(last_width >= first_width);

    // Forecast dates continue from the training data
    let dates = forecast.dates().unwrap();
    assert_eq!(dates[0], NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
}

#[test]
fn test_sarimax_in_sample_predictions() {
    let data = synthetic_series(90);
    let trained = SarimaxModel::daily().unwrap().train(&data).unwrap();

    let predicted = trained.predict(&data).unwrap();
    assert_eq!(predicted.values().len(), data.len());

    let mae = predicted.mean_absolute_error(&data.demand_values()).unwrap();
    let mean = data.mean().unwrap();
    // One-step-ahead fit should be far better than a naive mean guess
    assert!(mae < mean * 0.2, "MAE {mae} too large for mean {mean}");
}

#[test]
fn test_sarimax_predict_distinguishes_other_series() {
    let data = synthetic_series(90);
    let trained = SarimaxModel::daily().unwrap().train(&data).unwrap();

    // A different series of the same length must not get the training
    // fitted values back
    let shifted_demand: Vec<f64> = data.demand_values().iter().map(|v| v + 100.0).collect();
    let other = DemandSeries::new(data.dates(), shifted_demand, data.covariates().unwrap()).unwrap();

    let fitted = trained.predict(&data).unwrap();
    let predicted = trained.predict(&other).unwrap();

    assert_eq!(predicted.values().len(), other.len());
    assert_ne!(predicted.values(), fitted.values());

    // The fallback is the exogenous regression, which stays near the
    // original demand level rather than tracking the +100 shift
    let mae_vs_shifted = predicted
        .mean_absolute_error(&other.demand_values())
        .unwrap();
    assert!(mae_vs_shifted > 50.0, "MAE {mae_vs_shifted}");
}

#[test]
fn test_sarimax_insufficient_data() {
    let data = synthetic_series(10);
    let result = SarimaxModel::daily().unwrap().train(&data);
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("Insufficient data"));
}

#[test]
fn test_sarimax_exog_must_match_horizon() {
    let data = synthetic_series(60);
    let trained = SarimaxModel::daily().unwrap().train(&data).unwrap();

    let result = trained.forecast(7, &week_ahead_exog(3));
    assert!(result.is_err());

    let result = trained.forecast(0, &week_ahead_exog(0));
    assert!(result.is_err());
}

#[test]
fn test_sarimax_parameter_validation() {
    assert!(SarimaxModel::new(0, 0, 0).is_err());
    assert!(SarimaxModel::new(1, 0, 0)
        .unwrap()
        .with_seasonal(1, 1, 1, 1)
        .is_err());
    assert!(SarimaxModel::new(1, 1, 1)
        .unwrap()
        .with_confidence_level(1.5)
        .is_err());
}

#[test]
fn test_gradient_boosting_learns_covariate_effect() {
    let data = synthetic_series(120);
    let model = GradientBoostingModel::new();
    let trained = model.train(&data).unwrap();

    let predicted = trained.predict(&data).unwrap();
    assert_eq!(predicted.values().len(), data.len());

    let mae = predicted.mean_absolute_error(&data.demand_values()).unwrap();
    let mean = data.mean().unwrap();
    assert!(mae < mean * 0.05, "MAE {mae} too large for mean {mean}");
}

#[test]
fn test_gradient_boosting_forecast_horizon() {
    let data = synthetic_series(60);
    let trained = GradientBoostingModel::new().train(&data).unwrap();

    let forecast = trained.forecast(5, &week_ahead_exog(5)).unwrap();
    assert_eq!(forecast.horizon(), 5);
    for value in forecast.values() {
        assert!(value.is_finite());
        assert!(*value >= 0.0);
    }

    // Same conditions every day, so the only variation is the month feature
    let spread = forecast
        .values()
        .iter()
        .fold((f64::MAX, f64::MIN), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
    assert!(spread.1 - spread.0 < 50.0);
}

#[test]
fn test_gradient_boosting_with_subsampling() {
    let data = synthetic_series(120);
    let model = GradientBoostingModel::new()
        .with_subsample(0.8)
        .unwrap()
        .with_seed(7);
    let trained = model.train(&data).unwrap();

    let predicted = trained.predict(&data).unwrap();
    let mae = predicted.mean_absolute_error(&data.demand_values()).unwrap();
    assert!(mae < data.mean().unwrap() * 0.1);
}

#[test]
fn test_forecast_result_operations() {
    let values = vec![505.0, 506.0, 507.0];
    let forecast = ForecastResult::new(values.clone(), 3).unwrap();

    assert_eq!(forecast.horizon(), 3);
    assert_eq!(forecast.values(), &values);
    assert!(forecast.intervals().is_none());

    let actual = vec![506.0, 507.0, 508.0];
    let mae = forecast.mean_absolute_error(&actual).unwrap();
    assert!((mae - 1.0).abs() < 1e-10);

    let mse = forecast.mean_squared_error(&actual).unwrap();
    assert!((mse - 1.0).abs() < 1e-10);

    // Length mismatches are rejected
    assert!(forecast.mean_absolute_error(&[1.0]).is_err());
    assert!(ForecastResult::new(vec![1.0, 2.0], 3).is_err());
    assert!(ForecastResult::new_with_intervals(vec![1.0], 1, vec![]).is_err());
}
