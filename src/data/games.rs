//! Game records derived from play-by-play data

use chrono::NaiveDate;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::data::plays::{Play, PlayFilter};
use crate::{GridironError, Period, Result, TeamId};

/// One game, taken from the first play seen for its `game_id`
#[derive(Debug, Clone, PartialEq)]
pub struct Game {
    pub game_id: String,
    pub period: Period,
    pub game_date: Option<NaiveDate>,
    pub home_team: TeamId,
    pub away_team: TeamId,
    pub home_score: Option<u16>,
    pub away_score: Option<u16>,
    /// Home score minus away score; `None` for unplayed games
    pub result: Option<i32>,
}

impl Game {
    fn from_play(play: &Play) -> Self {
        let result = play.result.or_else(|| match (play.home_score, play.away_score) {
            (Some(h), Some(a)) => Some(h as i32 - a as i32),
            _ => None,
        });
        Game {
            game_id: play.game_id.clone(),
            period: play.period(),
            game_date: play.game_date,
            home_team: play.home_team.clone(),
            away_team: play.away_team.clone(),
            home_score: play.home_score,
            away_score: play.away_score,
            result,
        }
    }

    /// Label for the classifier; a tie is not a home win
    pub fn home_win(&self) -> Option<bool> {
        self.result.map(|r| r > 0)
    }

    /// Returns the winning team, or None for a tie or unplayed game
    pub fn winner(&self) -> Option<&TeamId> {
        match self.result?.cmp(&0) {
            std::cmp::Ordering::Greater => Some(&self.home_team),
            std::cmp::Ordering::Less => Some(&self.away_team),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// One game per `game_id`, sorted by period then id
pub fn games_from_plays(plays: &[Play], filter: &PlayFilter) -> Result<Vec<Game>> {
    let mut games: BTreeMap<&str, Game> = BTreeMap::new();

    for play in plays.iter().filter(|p| filter.accepts(p)) {
        match games.entry(play.game_id.as_str()) {
            Entry::Vacant(slot) => {
                slot.insert(Game::from_play(play));
            }
            Entry::Occupied(slot) => {
                let game = slot.get();
                if game.home_team != play.home_team || game.away_team != play.away_team {
                    return Err(GridironError::InvalidInput(format!(
                        "game {} lists {} vs {} and {} vs {}",
                        play.game_id, game.away_team, game.home_team, play.away_team, play.home_team
                    )));
                }
            }
        }
    }

    let mut games: Vec<Game> = games.into_values().collect();
    games.sort_by(|a, b| (a.period, &a.game_id).cmp(&(b.period, &b.game_id)));
    log::debug!("Found {} games", games.len());
    Ok(games)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::plays::read_plays;
    use crate::data::plays::tests::SAMPLE_CSV;

    #[test]
    fn test_games_from_sample() {
        let plays = read_plays(SAMPLE_CSV.as_bytes()).unwrap();

        let regular = games_from_plays(&plays, &PlayFilter::default()).unwrap();
        assert_eq!(regular.len(), 1);
        let game = &regular[0];
        assert_eq!(game.home_team, TeamId::new("BUF"));
        assert_eq!(game.result, Some(-4));
        assert_eq!(game.home_win(), Some(false));
        assert_eq!(game.winner(), Some(&TeamId::new("KC")));

        let all = games_from_plays(
            &plays,
            &PlayFilter {
                regular_season_only: false,
            },
        )
        .unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].period, Period::new(2020, 20));
        assert_eq!(all[1].home_win(), Some(true));
    }

    #[test]
    fn test_result_from_scores_and_ties() {
        let csv = "\
game_id,season,week,home_team,away_team,home_score,away_score,result
b,2021,2,NE,NYJ,17,17,NA
a,2021,2,DAL,NYG,NA,NA,NA
c,2021,1,SF,LA,20,10,
";
        let plays = read_plays(csv.as_bytes()).unwrap();
        let games = games_from_plays(&plays, &PlayFilter::default()).unwrap();

        let ids: Vec<&str> = games.iter().map(|g| g.game_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);

        assert_eq!(games[0].result, Some(10));
        assert_eq!(games[1].home_win(), None);
        assert_eq!(games[2].home_win(), Some(false));
        assert_eq!(games[2].winner(), None);
    }

    #[test]
    fn test_conflicting_teams_rejected() {
        let csv = "\
game_id,season,week,home_team,away_team
g1,2021,2,NE,NYJ
g1,2021,2,NYJ,NE
";
        let plays = read_plays(csv.as_bytes()).unwrap();
        assert!(games_from_plays(&plays, &PlayFilter::default()).is_err());
    }
}
