//! Smoothed team efficiency
//!
//! Runs the dynamic-window EWMA independently for every (team, category)
//! series and answers lookups by period.

use std::collections::BTreeMap;

use crate::data::efficiency::{EfficiencyCategory, EntityKey};
use crate::features::ewma::{
    forecast_next, smooth_by_entity, EwmaParams, Observation, SmoothedSeries,
};
use crate::{Period, Result, TeamId};

/// Smoothed efficiency for every team and category
#[derive(Debug, Clone)]
pub struct TeamEfficiency {
    params: EwmaParams,
    series: BTreeMap<EntityKey, SmoothedSeries<EntityKey>>,
    /// Raw per-game values in period order, kept for forecasting
    raw: BTreeMap<EntityKey, Vec<(Period, f64)>>,
}

impl TeamEfficiency {
    pub fn compute(observations: &[Observation<EntityKey>], params: EwmaParams) -> Result<Self> {
        let series = smooth_by_entity(observations, &params)?;

        let mut raw: BTreeMap<EntityKey, Vec<(Period, f64)>> = BTreeMap::new();
        for obs in observations {
            raw.entry(obs.entity.clone())
                .or_default()
                .push((obs.period, obs.raw_value));
        }

        log::info!(
            "Smoothed {} team series (base span {}, threshold week {})",
            series.len(),
            params.base_span,
            params.threshold
        );

        Ok(TeamEfficiency {
            params,
            series,
            raw,
        })
    }

    /// Smoothed value entering `period`; `None` if unknown or not yet defined
    pub fn get(
        &self,
        team: &TeamId,
        category: EfficiencyCategory,
        period: Period,
    ) -> Option<f64> {
        self.series(team, category)?.get(period)
    }

    pub fn series(
        &self,
        team: &TeamId,
        category: EfficiencyCategory,
    ) -> Option<&SmoothedSeries<EntityKey>> {
        self.series.get(&EntityKey::new(team.clone(), category))
    }

    /// Value entering `period` for a game that need not be on record.
    ///
    /// Only games strictly before `period` are used; the span comes from
    /// `period.week`.
    pub fn forecast(
        &self,
        team: &TeamId,
        category: EfficiencyCategory,
        period: Period,
    ) -> Result<Option<f64>> {
        let Some(history) = self.raw.get(&EntityKey::new(team.clone(), category)) else {
            return Ok(None);
        };
        let played = history.partition_point(|(p, _)| *p < period);
        let values: Vec<f64> = history[..played].iter().map(|(_, v)| *v).collect();
        forecast_next(&values, period.week, &self.params)
    }

    /// Teams with at least one series
    pub fn teams(&self) -> Vec<&TeamId> {
        let mut teams: Vec<&TeamId> = self.series.keys().map(|k| &k.team).collect();
        teams.dedup();
        teams
    }

    /// Number of (team, category) series
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
