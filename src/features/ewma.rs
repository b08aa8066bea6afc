//! Dynamic-window exponentially weighted moving average
//!
//! Smooths a per-period series for one entity (a team's efficiency in one
//! category) so that the value at period `i` only uses periods strictly
//! before `i`.
//!
//! # Algorithm
//!
//! ```text
//! L_0 = missing,  L_i = v_{i-1}
//! span_i  = w_i        if w_i > threshold
//!         = base_span  otherwise
//! alpha_i = 2 / (span_i + 1)
//! s_i = sum_{j<=i, L_j defined} (1 - alpha_i)^(i-j) L_j
//!     / sum_{j<=i, L_j defined} (1 - alpha_i)^(i-j)
//! ```
//!
//! The span is chosen per position, so late in a season (week above the
//! threshold) the decay slows and older games keep more weight. Missing
//! entries still advance the decay; they contribute no weight.

use std::collections::BTreeMap;

use crate::{GridironError, Period, Result};

/// Span used while the week is at or below the threshold
pub const DEFAULT_BASE_SPAN: u32 = 10;
/// Week after which the week number itself becomes the span
pub const DEFAULT_THRESHOLD: u32 = 10;

/// Smoothing parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EwmaParams {
    pub base_span: u32,
    pub threshold: u32,
}

impl Default for EwmaParams {
    fn default() -> Self {
        EwmaParams {
            base_span: DEFAULT_BASE_SPAN,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl EwmaParams {
    /// Create validated parameters; both must be positive
    pub fn new(base_span: u32, threshold: u32) -> Result<Self> {
        let params = EwmaParams {
            base_span,
            threshold,
        };
        params.validate()?;
        Ok(params)
    }

    fn validate(&self) -> Result<()> {
        if self.base_span == 0 {
            return Err(GridironError::InvalidInput(
                "base_span must be positive".to_string(),
            ));
        }
        if self.threshold == 0 {
            return Err(GridironError::InvalidInput(
                "threshold must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Span applied at a position with the given week
    pub fn span_for(&self, week: u32) -> u32 {
        if week > self.threshold {
            week
        } else {
            self.base_span
        }
    }

    /// Smoothing factor `2 / (span + 1)` for the given week
    pub fn alpha_for(&self, week: u32) -> f64 {
        2.0 / (self.span_for(week) as f64 + 1.0)
    }
}

/// One raw value for an entity in a period
#[derive(Debug, Clone, PartialEq)]
pub struct Observation<K> {
    pub entity: K,
    pub period: Period,
    pub raw_value: f64,
}

impl<K> Observation<K> {
    pub fn new(entity: K, period: Period, raw_value: f64) -> Self {
        Observation {
            entity,
            period,
            raw_value,
        }
    }
}

/// Smoothed values for one entity, aligned with its input observations
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothedSeries<K> {
    pub entity: K,
    pub periods: Vec<Period>,
    /// `None` where no earlier defined value exists
    pub values: Vec<Option<f64>>,
}

impl<K> SmoothedSeries<K> {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Smoothed value entering the given period
    pub fn get(&self, period: Period) -> Option<f64> {
        self.periods
            .binary_search(&period)
            .ok()
            .and_then(|idx| self.values[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = (Period, Option<f64>)> + '_ {
        self.periods.iter().copied().zip(self.values.iter().copied())
    }
}

/// Shift a raw series back by one period; non-finite values become missing
pub fn lagged(values: &[f64]) -> Vec<Option<f64>> {
    if values.is_empty() {
        return Vec::new();
    }
    std::iter::once(None)
        .chain(values[..values.len() - 1].iter().map(|&v| defined(v)))
        .collect()
}

fn defined(value: f64) -> Option<f64> {
    if value.is_finite() {
        Some(value)
    } else {
        None
    }
}

/// Closed-form adjusted EWMA of `series`, evaluated at its last position.
///
/// Weights decay by absolute position. When every defined value has
/// underflowed to zero weight (or `alpha == 1` with a trailing gap), the most
/// recent defined value is returned, which is the limit of the formula.
pub fn weighted_mean(series: &[Option<f64>], alpha: f64) -> Option<f64> {
    let decay = 1.0 - alpha;
    let mut weight = 1.0;
    let mut numerator = 0.0;
    let mut denominator = 0.0;
    let mut latest = None;

    for value in series.iter().rev() {
        if let Some(v) = *value {
            numerator += weight * v;
            denominator += weight;
            latest.get_or_insert(v);
        }
        weight *= decay;
    }

    if denominator > 0.0 {
        Some(numerator / denominator)
    } else {
        latest
    }
}

/// Running form of the adjusted EWMA: one forward pass that carries the
/// current average and its accumulated weight.
pub fn running_mean(series: &[Option<f64>], alpha: f64) -> Option<f64> {
    let decay = 1.0 - alpha;
    let mut average: Option<f64> = None;
    let mut old_weight = 0.0;

    for value in series {
        match (average, *value) {
            (Some(avg), observed) => {
                old_weight *= decay;
                if let Some(v) = observed {
                    average = Some((old_weight * avg + v) / (old_weight + 1.0));
                    old_weight += 1.0;
                }
            }
            (None, Some(v)) => {
                average = Some(v);
                old_weight = 1.0;
            }
            (None, None) => {}
        }
    }

    average
}

fn check_lengths(values: &[f64], weeks: &[u32]) -> Result<()> {
    if values.len() != weeks.len() {
        return Err(GridironError::InvalidInput(format!(
            "{} values but {} weeks",
            values.len(),
            weeks.len()
        )));
    }
    Ok(())
}

fn smooth_with(
    values: &[f64],
    weeks: &[u32],
    params: &EwmaParams,
    mean: fn(&[Option<f64>], f64) -> Option<f64>,
) -> Result<Vec<Option<f64>>> {
    params.validate()?;
    check_lengths(values, weeks)?;

    let lag = lagged(values);
    Ok(weeks
        .iter()
        .enumerate()
        .map(|(i, &week)| mean(&lag[..=i], params.alpha_for(week)))
        .collect())
}

/// Dynamic-window EWMA of the lagged series, one output per input.
///
/// `weeks[i]` selects the span at position `i`. Output position 0 is always
/// `None`.
pub fn dynamic_ewma(
    values: &[f64],
    weeks: &[u32],
    params: &EwmaParams,
) -> Result<Vec<Option<f64>>> {
    smooth_with(values, weeks, params, weighted_mean)
}

/// Same as [`dynamic_ewma`], computed with the running recurrence
pub fn dynamic_ewma_running(
    values: &[f64],
    weeks: &[u32],
    params: &EwmaParams,
) -> Result<Vec<Option<f64>>> {
    smooth_with(values, weeks, params, running_mean)
}

/// EWMA entering the period after the last value, using the span for
/// `next_week`. Every raw value is already in the past at that point.
pub fn forecast_next(values: &[f64], next_week: u32, params: &EwmaParams) -> Result<Option<f64>> {
    params.validate()?;
    let series: Vec<Option<f64>> = values.iter().map(|&v| defined(v)).collect();
    Ok(weighted_mean(&series, params.alpha_for(next_week)))
}

fn check_order<K>(observations: &[Observation<K>]) -> Result<()> {
    for pair in observations.windows(2) {
        if pair[1].period <= pair[0].period {
            return Err(GridironError::InvalidInput(format!(
                "observations not strictly increasing by period: {} followed by {}",
                pair[0].period, pair[1].period
            )));
        }
    }
    Ok(())
}

/// Smooth the observations of a single entity.
///
/// Fails if the observations are not strictly increasing by period or
/// belong to more than one entity. Returns `None` for empty input, since
/// there is no entity to tag the series with.
pub fn smooth_series<K: Clone + PartialEq>(
    observations: &[Observation<K>],
    params: &EwmaParams,
) -> Result<Option<SmoothedSeries<K>>> {
    params.validate()?;
    let Some(first) = observations.first() else {
        return Ok(None);
    };
    if observations.iter().any(|o| o.entity != first.entity) {
        return Err(GridironError::InvalidInput(
            "observations span more than one entity".to_string(),
        ));
    }
    check_order(observations)?;

    let values: Vec<f64> = observations.iter().map(|o| o.raw_value).collect();
    let weeks: Vec<u32> = observations.iter().map(|o| o.period.week).collect();

    Ok(Some(SmoothedSeries {
        entity: first.entity.clone(),
        periods: observations.iter().map(|o| o.period).collect(),
        values: dynamic_ewma(&values, &weeks, params)?,
    }))
}

/// Partition observations by entity and smooth each partition on its own.
///
/// Input order within an entity is preserved; entities may be interleaved.
pub fn smooth_by_entity<K: Clone + Ord>(
    observations: &[Observation<K>],
    params: &EwmaParams,
) -> Result<BTreeMap<K, SmoothedSeries<K>>> {
    params.validate()?;

    let mut partitions: BTreeMap<K, Vec<Observation<K>>> = BTreeMap::new();
    for obs in observations {
        partitions.entry(obs.entity.clone()).or_default().push(obs.clone());
    }

    let mut smoothed = BTreeMap::new();
    for (entity, group) in partitions {
        if let Some(series) = smooth_series(&group, params)? {
            smoothed.insert(entity, series);
        }
    }

    log::debug!(
        "Smoothed {} observations across {} entities",
        observations.len(),
        smoothed.len()
    );

    Ok(smoothed)
}
