//! Game-level feature rows
//!
//! Joins smoothed team efficiency onto games by (team, period) and flattens
//! it into the fixed-width vector a classifier consumes.

use crate::data::efficiency::EfficiencyCategory;
use crate::data::games::Game;
use crate::features::team_efficiency::TeamEfficiency;
use crate::{Period, Result, TeamId};

const CATEGORY_COUNT: usize = EfficiencyCategory::ALL.len();

/// Number of features in a game row
pub const FEATURE_DIM: usize = 2 * CATEGORY_COUNT;

/// Features for one game, home team first
#[derive(Debug, Clone, PartialEq)]
pub struct GameFeatureRow {
    pub game_id: String,
    pub period: Period,
    pub home_team: TeamId,
    pub away_team: TeamId,
    /// `None` for games not yet played
    pub home_win: Option<bool>,
    /// Home categories in `EfficiencyCategory::ALL` order, then away
    pub features: [Option<f64>; FEATURE_DIM],
}

impl GameFeatureRow {
    pub const DIM: usize = FEATURE_DIM;

    /// Column names matching `to_vec`
    pub fn names() -> Vec<String> {
        ["home", "away"]
            .iter()
            .flat_map(|side| {
                EfficiencyCategory::ALL
                    .iter()
                    .map(move |c| format!("{}_{}", side, c.name()))
            })
            .collect()
    }

    fn side_by_side<F>(home: &TeamId, away: &TeamId, mut value: F) -> [Option<f64>; Self::DIM]
    where
        F: FnMut(&TeamId, EfficiencyCategory) -> Option<f64>,
    {
        let mut features = [None; Self::DIM];
        for (side, team) in [home, away].into_iter().enumerate() {
            for (i, &category) in EfficiencyCategory::ALL.iter().enumerate() {
                features[side * CATEGORY_COUNT + i] = value(team, category);
            }
        }
        features
    }

    /// Row for a game already on the schedule
    pub fn from_game(game: &Game, efficiency: &TeamEfficiency) -> Self {
        let features = Self::side_by_side(&game.home_team, &game.away_team, |team, category| {
            efficiency.get(team, category, game.period)
        });
        GameFeatureRow {
            game_id: game.game_id.clone(),
            period: game.period,
            home_team: game.home_team.clone(),
            away_team: game.away_team.clone(),
            home_win: game.home_win(),
            features,
        }
    }

    /// True when every feature is defined
    pub fn is_complete(&self) -> bool {
        self.features.iter().all(Option::is_some)
    }

    /// Flat feature vector, or `None` if any feature is missing
    pub fn to_vec(&self) -> Option<Vec<f64>> {
        self.features.iter().copied().collect()
    }
}

/// One row per game, in game order
pub fn build_feature_rows(games: &[Game], efficiency: &TeamEfficiency) -> Vec<GameFeatureRow> {
    games
        .iter()
        .map(|game| GameFeatureRow::from_game(game, efficiency))
        .collect()
}

/// Row for an unplayed matchup, from each team's forecast entering `period`.
///
/// Games on or after `period` are ignored, so a mid-season matchup sees the
/// same values as `GameFeatureRow::from_game`.
pub fn matchup_features(
    efficiency: &TeamEfficiency,
    home: &TeamId,
    away: &TeamId,
    period: Period,
) -> Result<GameFeatureRow> {
    let mut failure = None;
    let features = GameFeatureRow::side_by_side(home, away, |team, category| {
        match efficiency.forecast(team, category, period) {
            Ok(value) => value,
            Err(e) => {
                failure.get_or_insert(e);
                None
            }
        }
    });
    if let Some(e) = failure {
        return Err(e);
    }

    Ok(GameFeatureRow {
        game_id: format!("{}_{:02}_{}_{}", period.season, period.week, away, home),
        period,
        home_team: home.clone(),
        away_team: away.clone(),
        home_win: None,
        features,
    })
}

/// Complete, labelled rows ready for a classifier
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureMatrix {
    pub game_ids: Vec<String>,
    pub features: Vec<Vec<f64>>,
    pub labels: Vec<bool>,
}

impl FeatureMatrix {
    /// Keep rows with every feature defined and a known outcome
    pub fn from_rows(rows: &[GameFeatureRow]) -> Self {
        let mut matrix = FeatureMatrix::default();
        for row in rows {
            if let (Some(features), Some(label)) = (row.to_vec(), row.home_win) {
                matrix.game_ids.push(row.game_id.clone());
                matrix.features.push(features);
                matrix.labels.push(label);
            }
        }

        let dropped = rows.len() - matrix.len();
        if dropped > 0 {
            log::info!(
                "Dropped {} of {} games with missing features or no result",
                dropped,
                rows.len()
            );
        }
        matrix
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn dim(&self) -> usize {
        GameFeatureRow::DIM
    }

    /// Fraction of rows where the home team won
    pub fn home_win_rate(&self) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        let wins = self.labels.iter().filter(|&&w| w).count();
        Some(wins as f64 / self.len() as f64)
    }
}
