//! Gradient boosting regressor for daily water demand
//!
//! Boosted depth-limited regression trees on the exogenous covariates plus
//! the calendar month, with squared loss. Features are standardised before
//! training, matching the offline training pipeline.

use crate::data::{CovariateFrame, DemandSeries, EXOG_COLUMNS};
use crate::error::{ForecastError, Result};
use crate::models::{check_exog_horizon, ForecastModel, ForecastResult, TrainedForecastModel};
use chrono::{Datelike, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Number of features: the exogenous covariates plus the calendar month
const NUM_FEATURES: usize = EXOG_COLUMNS.len() + 1;

/// Minimum number of samples in a leaf
const MIN_SAMPLES_LEAF: usize = 2;

/// Standardises features to zero mean and unit variance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    means: Vec<f64>,
    stds: Vec<f64>,
}

impl StandardScaler {
    /// Fit the scaler to feature rows
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self> {
        if rows.is_empty() {
            return Err(ForecastError::DataError(
                "Cannot fit scaler on empty data".to_string(),
            ));
        }

        let num_features = rows[0].len();
        let n = rows.len() as f64;

        let mut means = vec![0.0; num_features];
        for row in rows {
            for (j, value) in row.iter().enumerate() {
                means[j] += value / n;
            }
        }

        let mut stds = vec![0.0; num_features];
        for row in rows {
            for (j, value) in row.iter().enumerate() {
                stds[j] += (value - means[j]).powi(2) / n;
            }
        }
        for std in &mut stds {
            *std = std.sqrt();
            // Constant features pass through unscaled
            if *std < 1e-12 {
                *std = 1.0;
            }
        }

        Ok(Self { means, stds })
    }

    /// Transform a single feature row
    pub fn transform(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.means.iter().zip(self.stds.iter()))
            .map(|(value, (mean, std))| (value - mean) / std)
            .collect()
    }
}

/// Node of a fitted regression tree
#[derive(Debug, Clone, Serialize, Deserialize)]
enum TreeNode {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    /// Fit a tree to the targets of the given sample indices
    fn fit(rows: &[Vec<f64>], targets: &[f64], indices: &[usize], depth: usize) -> Self {
        let mean = indices.iter().map(|&i| targets[i]).sum::<f64>() / indices.len() as f64;

        if depth == 0 || indices.len() < 2 * MIN_SAMPLES_LEAF {
            return TreeNode::Leaf { value: mean };
        }

        let Some((feature, threshold)) = best_split(rows, targets, indices) else {
            return TreeNode::Leaf { value: mean };
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .copied()
            .partition(|&i| rows[i][feature] <= threshold);

        if left_indices.len() < MIN_SAMPLES_LEAF || right_indices.len() < MIN_SAMPLES_LEAF {
            return TreeNode::Leaf { value: mean };
        }

        TreeNode::Split {
            feature,
            threshold,
            left: Box::new(TreeNode::fit(rows, targets, &left_indices, depth - 1)),
            right: Box::new(TreeNode::fit(rows, targets, &right_indices, depth - 1)),
        }
    }

    /// Score a single feature row
    fn predict(&self, row: &[f64]) -> f64 {
        match self {
            TreeNode::Leaf { value } => *value,
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if row[*feature] <= *threshold {
                    left.predict(row)
                } else {
                    right.predict(row)
                }
            }
        }
    }
}

/// Find the split with the largest squared-error reduction
fn best_split(rows: &[Vec<f64>], targets: &[f64], indices: &[usize]) -> Option<(usize, f64)> {
    let num_features = rows[indices[0]].len();
    let mut best: Option<(usize, f64, f64)> = None;

    for feature in 0..num_features {
        let mut sorted: Vec<usize> = indices.to_vec();
        sorted.sort_by(|&a, &b| {
            rows[a][feature]
                .partial_cmp(&rows[b][feature])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        // Running sums allow evaluating every split point in one pass
        let total_sum: f64 = sorted.iter().map(|&i| targets[i]).sum();
        let total_count = sorted.len() as f64;
        let mut left_sum = 0.0;

        for (k, &i) in sorted.iter().enumerate().take(sorted.len() - 1) {
            left_sum += targets[i];

            let value = rows[i][feature];
            let next_value = rows[sorted[k + 1]][feature];
            if (next_value - value).abs() < 1e-12 {
                continue;
            }

            let left_count = (k + 1) as f64;
            let right_count = total_count - left_count;
            let right_sum = total_sum - left_sum;

            // Variance reduction score; higher is better
            let score = left_sum.powi(2) / left_count + right_sum.powi(2) / right_count;

            if best.map_or(true, |(_, _, best_score)| score > best_score) {
                best = Some((feature, (value + next_value) / 2.0, score));
            }
        }
    }

    best.map(|(feature, threshold, _)| (feature, threshold))
}

/// Gradient boosting regressor specification
#[derive(Debug, Clone)]
pub struct GradientBoostingModel {
    /// Name of the model
    name: String,
    /// Number of boosting stages
    n_estimators: usize,
    /// Shrinkage applied to each stage
    learning_rate: f64,
    /// Maximum tree depth
    max_depth: usize,
    /// Fraction of rows drawn per stage
    subsample: f64,
    /// Seed for row subsampling
    seed: u64,
}

impl GradientBoostingModel {
    /// Create a gradient boosting model with the standard defaults
    /// (100 stages, learning rate 0.1, depth 3, no subsampling)
    pub fn new() -> Self {
        Self {
            name: "GradientBoosting".to_string(),
            n_estimators: 100,
            learning_rate: 0.1,
            max_depth: 3,
            subsample: 1.0,
            seed: 42,
        }
    }

    /// Set the number of boosting stages
    pub fn with_estimators(mut self, n_estimators: usize) -> Result<Self> {
        if n_estimators == 0 {
            return Err(ForecastError::InvalidParameter(
                "n_estimators must be at least 1".to_string(),
            ));
        }
        self.n_estimators = n_estimators;
        Ok(self)
    }

    /// Set the learning rate
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Result<Self> {
        if learning_rate <= 0.0 || learning_rate > 1.0 {
            return Err(ForecastError::InvalidParameter(
                "Learning rate must be in (0, 1]".to_string(),
            ));
        }
        self.learning_rate = learning_rate;
        Ok(self)
    }

    /// Set the maximum tree depth
    pub fn with_max_depth(mut self, max_depth: usize) -> Result<Self> {
        if max_depth == 0 {
            return Err(ForecastError::InvalidParameter(
                "Max depth must be at least 1".to_string(),
            ));
        }
        self.max_depth = max_depth;
        Ok(self)
    }

    /// Set the fraction of rows drawn per boosting stage
    pub fn with_subsample(mut self, subsample: f64) -> Result<Self> {
        if subsample <= 0.0 || subsample > 1.0 {
            return Err(ForecastError::InvalidParameter(
                "Subsample fraction must be in (0, 1]".to_string(),
            ));
        }
        self.subsample = subsample;
        Ok(self)
    }

    /// Set the seed used for row subsampling
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl Default for GradientBoostingModel {
    fn default() -> Self {
        Self::new()
    }
}

/// Trained gradient boosting model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedGradientBoostingModel {
    /// Name of the model
    name: String,
    /// Prediction of the constant base model
    base_prediction: f64,
    /// Shrinkage applied to each stage
    learning_rate: f64,
    /// Fitted boosting stages
    trees: Vec<TreeNode>,
    /// Feature scaler fitted on the training data
    scaler: StandardScaler,
    /// Last observed date of the training data
    last_date: Option<NaiveDate>,
    /// Calendar month of the last observation
    last_month: u32,
}

/// Build feature rows (covariates plus month) from a demand series
fn feature_rows(data: &DemandSeries) -> Result<Vec<Vec<f64>>> {
    let covariates = data.covariates()?;
    let months = data.months();
    if months.len() != covariates.len() {
        return Err(ForecastError::DataError(format!(
            "Months ({}) and covariates ({}) must have the same length",
            months.len(),
            covariates.len()
        )));
    }

    Ok(covariates
        .rows()
        .zip(months.iter())
        .map(|(row, month)| {
            let mut features = Vec::with_capacity(NUM_FEATURES);
            features.extend_from_slice(&row);
            features.push(*month as f64);
            features
        })
        .collect())
}

impl ForecastModel for GradientBoostingModel {
    type Trained = TrainedGradientBoostingModel;

    fn train(&self, data: &DemandSeries) -> Result<TrainedGradientBoostingModel> {
        let targets = data.demand_values();
        if targets.len() < 2 * MIN_SAMPLES_LEAF {
            return Err(ForecastError::ValidationError(format!(
                "Insufficient data for gradient boosting. Need at least {} observations, got {}.",
                2 * MIN_SAMPLES_LEAF,
                targets.len()
            )));
        }

        let raw_rows = feature_rows(data)?;
        let scaler = StandardScaler::fit(&raw_rows)?;
        let rows: Vec<Vec<f64>> = raw_rows.iter().map(|row| scaler.transform(row)).collect();

        let base_prediction = targets.iter().sum::<f64>() / targets.len() as f64;
        let mut predictions = vec![base_prediction; targets.len()];
        let mut residuals: Vec<f64> = targets
            .iter()
            .zip(predictions.iter())
            .map(|(y, p)| y - p)
            .collect();

        let mut rng = StdRng::seed_from_u64(self.seed);
        let all_indices: Vec<usize> = (0..targets.len()).collect();
        let sample_size =
            ((targets.len() as f64 * self.subsample).round() as usize).max(2 * MIN_SAMPLES_LEAF);

        let mut trees = Vec::with_capacity(self.n_estimators);
        for _ in 0..self.n_estimators {
            let indices = if self.subsample < 1.0 && sample_size < targets.len() {
                let mut sampled: Vec<usize> = all_indices
                    .choose_multiple(&mut rng, sample_size)
                    .copied()
                    .collect();
                sampled.sort_unstable();
                sampled
            } else {
                all_indices.clone()
            };

            let tree = TreeNode::fit(&rows, &residuals, &indices, self.max_depth);

            for (i, row) in rows.iter().enumerate() {
                predictions[i] += self.learning_rate * tree.predict(row);
                residuals[i] = targets[i] - predictions[i];
            }

            trees.push(tree);
        }

        let months = data.months();
        let last_month = months.last().copied().unwrap_or(1);

        Ok(TrainedGradientBoostingModel {
            name: self.name.clone(),
            base_prediction,
            learning_rate: self.learning_rate,
            trees,
            scaler,
            last_date: data.last_date().ok(),
            last_month,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedGradientBoostingModel {
    /// Score a raw (unscaled) feature row
    fn score(&self, raw_row: &[f64]) -> f64 {
        let row = self.scaler.transform(raw_row);
        self.base_prediction
            + self
                .trees
                .iter()
                .map(|tree| self.learning_rate * tree.predict(&row))
                .sum::<f64>()
    }

    /// Calendar month of the day `h` days after the training data ends
    fn future_month(&self, h: usize) -> u32 {
        match self.last_date {
            Some(last) => (last + chrono::Duration::days(h as i64)).month(),
            None => self.last_month,
        }
    }
}

impl TrainedForecastModel for TrainedGradientBoostingModel {
    fn forecast(&self, horizon: usize, exog: &CovariateFrame) -> Result<ForecastResult> {
        check_exog_horizon(horizon, exog)?;

        let values: Vec<f64> = exog
            .rows()
            .enumerate()
            .map(|(h, row)| {
                let mut features = Vec::with_capacity(NUM_FEATURES);
                features.extend_from_slice(&row);
                features.push(self.future_month(h + 1) as f64);
                self.score(&features).max(0.0)
            })
            .collect();

        let result = ForecastResult::new(values, horizon)?;
        match self.last_date {
            Some(last) => result.with_dates(
                (1..=horizon)
                    .map(|h| last + chrono::Duration::days(h as i64))
                    .collect(),
            ),
            None => Ok(result),
        }
    }

    fn predict(&self, data: &DemandSeries) -> Result<ForecastResult> {
        if data.is_empty() {
            return Err(ForecastError::DataError(
                "Empty demand series".to_string(),
            ));
        }

        let rows = feature_rows(data)?;
        let predictions: Vec<f64> = rows.iter().map(|row| self.score(row)).collect();
        let n = predictions.len();

        ForecastResult::new(predictions, n)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaler_standardises_features() {
        let rows = vec![vec![1.0, 10.0], vec![3.0, 10.0], vec![5.0, 10.0]];
        let scaler = StandardScaler::fit(&rows).unwrap();

        let transformed = scaler.transform(&[3.0, 10.0]);
        assert!(transformed[0].abs() < 1e-10);
        // Constant column passes through centred but unscaled
        assert!(transformed[1].abs() < 1e-10);
    }

    #[test]
    fn scaler_rejects_empty_input() {
        assert!(StandardScaler::fit(&[]).is_err());
    }

    #[test]
    fn tree_splits_on_informative_feature() {
        let rows = vec![
            vec![0.0, 5.0],
            vec![1.0, 5.0],
            vec![2.0, 5.0],
            vec![10.0, 5.0],
            vec![11.0, 5.0],
            vec![12.0, 5.0],
        ];
        let targets = vec![1.0, 1.0, 1.0, 9.0, 9.0, 9.0];
        let indices: Vec<usize> = (0..6).collect();

        let tree = TreeNode::fit(&rows, &targets, &indices, 2);

        assert!((tree.predict(&[1.0, 5.0]) - 1.0).abs() < 1e-10);
        assert!((tree.predict(&[11.0, 5.0]) - 9.0).abs() < 1e-10);
    }

    #[test]
    fn invalid_parameters_rejected() {
        assert!(GradientBoostingModel::new().with_estimators(0).is_err());
        assert!(GradientBoostingModel::new().with_learning_rate(0.0).is_err());
        assert!(GradientBoostingModel::new().with_max_depth(0).is_err());
        assert!(GradientBoostingModel::new().with_subsample(1.5).is_err());
    }
}
