//! Feature dataset assembled from play-by-play data
//!
//! Runs the whole pipeline: plays → per-game efficiency → smoothed team
//! series → one feature row per game.

use std::ops::RangeInclusive;

use crate::data::efficiency::efficiency_observations;
use crate::data::games::{games_from_plays, Game};
use crate::data::plays::{load_plays, Play, PlayFilter};
use crate::features::game_features::{build_feature_rows, matchup_features};
use crate::features::{FeatureMatrix, GameFeatureRow, TeamEfficiency};
use crate::{Config, Period, Result, TeamId};

/// Games, smoothed efficiency and the feature rows joining them
#[derive(Debug, Clone)]
pub struct FeatureDataset {
    pub games: Vec<Game>,
    pub efficiency: TeamEfficiency,
    pub rows: Vec<GameFeatureRow>,
}

impl FeatureDataset {
    /// Build from plays already in memory
    pub fn from_plays(plays: &[Play], config: &Config) -> Result<Self> {
        let params = config.ewma_params()?;
        let filter = PlayFilter::from_config(&config.data);

        let observations = efficiency_observations(plays, &filter)?;
        let games = games_from_plays(plays, &filter)?;
        let efficiency = TeamEfficiency::compute(&observations, params)?;
        let rows = build_feature_rows(&games, &efficiency);

        log::info!(
            "Built {} feature rows ({} complete) from {} plays",
            rows.len(),
            rows.iter().filter(|r| r.is_complete()).count(),
            plays.len()
        );

        Ok(FeatureDataset {
            games,
            efficiency,
            rows,
        })
    }

    /// Load plays from `config.data.plays_path` and build
    pub fn load(config: &Config) -> Result<Self> {
        let plays = load_plays(&config.data.plays_path)?;
        Self::from_plays(&plays, config)
    }

    /// Rows for games strictly before `period`
    pub fn rows_before(&self, period: Period) -> Vec<&GameFeatureRow> {
        self.rows.iter().filter(|r| r.period < period).collect()
    }

    /// Classifier-ready matrix over every game
    pub fn matrix(&self) -> FeatureMatrix {
        FeatureMatrix::from_rows(&self.rows)
    }

    /// Classifier-ready matrix restricted to the given seasons
    pub fn matrix_for_seasons(&self, seasons: RangeInclusive<u16>) -> FeatureMatrix {
        let rows: Vec<GameFeatureRow> = self
            .rows
            .iter()
            .filter(|r| seasons.contains(&r.period.season))
            .cloned()
            .collect();
        FeatureMatrix::from_rows(&rows)
    }

    /// Features for a game that has not been played yet
    pub fn matchup(&self, home: &TeamId, away: &TeamId, period: Period) -> Result<GameFeatureRow> {
        matchup_features(&self.efficiency, home, away, period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::plays::read_plays;
    use crate::GridironError;

    /// Two teams meeting every week, KC passing well and DEN running well
    fn season_csv(weeks: u32) -> String {
        let mut csv = String::from(
            "game_id,season,week,season_type,home_team,away_team,posteam,defteam,\
             play_type,pass,rush,epa,result\n",
        );
        for week in 1..=weeks {
            let (home, away) = if week % 2 == 0 { ("KC", "DEN") } else { ("DEN", "KC") };
            let game_id = format!("2023_{:02}_{}_{}", week, away, home);
            let result = if home == "KC" { 10 } else { -3 };
            let sides = [("KC", "DEN", 0.4, -0.1), ("DEN", "KC", -0.2, 0.15)];
            for (team, opp, pass_epa, run_epa) in sides {
                csv.push_str(&format!(
                    "{},2023,{},REG,{},{},{},{},pass,1,0,{},{}\n",
                    game_id, week, home, away, team, opp, pass_epa, result
                ));
                csv.push_str(&format!(
                    "{},2023,{},REG,{},{},{},{},run,0,1,{},{}\n",
                    game_id, week, home, away, team, opp, run_epa, result
                ));
            }
        }
        csv
    }

    fn dataset(weeks: u32) -> FeatureDataset {
        let plays = read_plays(season_csv(weeks).as_bytes()).unwrap();
        FeatureDataset::from_plays(&plays, &Config::default()).unwrap()
    }

    #[test]
    fn test_pipeline_end_to_end() {
        let _ = env_logger::builder().is_test(true).try_init();
        let ds = dataset(14);

        assert_eq!(ds.games.len(), 14);
        assert_eq!(ds.rows.len(), 14);
        // 2 teams x 4 categories
        assert_eq!(ds.efficiency.len(), 8);

        let matrix = ds.matrix();
        // Week 1 has no history
        assert_eq!(matrix.len(), 13);
        assert_eq!(matrix.dim(), GameFeatureRow::DIM);

        // Week 2: KC home, every series is constant
        let week2 = &matrix.features[0];
        assert!((week2[0] - 0.4).abs() < 1e-12);
        assert!((week2[1] + 0.1).abs() < 1e-12);
        assert!((week2[2] + 0.2).abs() < 1e-12);
        assert!((week2[3] - 0.15).abs() < 1e-12);
        assert!((week2[4] + 0.2).abs() < 1e-12);
        assert!(matrix.labels[0]);
        assert!(!matrix.labels[1]);
    }

    #[test]
    fn test_season_and_period_filters() {
        let ds = dataset(6);
        assert_eq!(ds.rows_before(Period::new(2023, 4)).len(), 3);
        assert_eq!(ds.matrix_for_seasons(2023..=2023).len(), 5);
        assert!(ds.matrix_for_seasons(2019..=2022).is_empty());
    }

    #[test]
    fn test_matchup_after_last_game() {
        let ds = dataset(17);
        let row = ds
            .matchup(&TeamId::new("KC"), &TeamId::new("DEN"), Period::new(2023, 22))
            .unwrap();
        let features = row.to_vec().unwrap();
        assert!((features[0] - 0.4).abs() < 1e-12);
        assert!((features[7] + 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_config_surfaces() {
        let plays = read_plays(season_csv(2).as_bytes()).unwrap();
        let mut config = Config::default();
        config.ewma.threshold = 0;
        assert!(matches!(
            FeatureDataset::from_plays(&plays, &config),
            Err(GridironError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let mut config = Config::default();
        config.data.plays_path = "no/such/plays.csv".to_string();
        assert!(matches!(FeatureDataset::load(&config), Err(GridironError::Io(_))));
    }
}
