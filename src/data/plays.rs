//! Play-by-play records
//!
//! Reads nflfastR-style play-by-play CSV. Only the columns used for
//! efficiency features are deserialized; the rest are ignored.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::{DataConfig, Period, Result, TeamId};

/// Part of the season a game belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeasonType {
    Preseason,
    Regular,
    Post,
}

impl SeasonType {
    /// Parse the `season_type` code used in play-by-play data
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "PRE" => Some(SeasonType::Preseason),
            "REG" => Some(SeasonType::Regular),
            "POST" => Some(SeasonType::Post),
            _ => None,
        }
    }
}

/// Play category used for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PlayKind {
    Pass,
    Run,
}

/// A single play
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Play {
    pub game_id: String,
    pub season: u16,
    pub week: u32,
    #[serde(default, deserialize_with = "optional_season")]
    pub season_type: Option<SeasonType>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub game_date: Option<NaiveDate>,
    pub home_team: TeamId,
    pub away_team: TeamId,
    #[serde(default, deserialize_with = "optional_team")]
    pub posteam: Option<TeamId>,
    #[serde(default, deserialize_with = "optional_team")]
    pub defteam: Option<TeamId>,
    #[serde(default, deserialize_with = "optional_text")]
    pub play_type: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub pass: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub rush: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub epa: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub home_score: Option<u16>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub away_score: Option<u16>,
    /// Final home score minus away score
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub result: Option<i32>,
}

/// Empty cells and R's "NA" are both missing
fn optional_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.is_empty() && s != "NA"))
}

fn optional_team<'de, D>(deserializer: D) -> std::result::Result<Option<TeamId>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_text(deserializer)?.map(TeamId))
}

/// Missing season types are allowed; unknown codes are an error
fn optional_season<'de, D>(deserializer: D) -> std::result::Result<Option<SeasonType>, D::Error>
where
    D: Deserializer<'de>,
{
    match optional_text(deserializer)? {
        None => Ok(None),
        Some(code) => SeasonType::from_code(&code)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown season type {:?}", code))),
    }
}

fn flag_set(flag: Option<f64>) -> bool {
    flag.map_or(false, |f| f == 1.0)
}

impl Play {
    pub fn period(&self) -> Period {
        Period::new(self.season, self.week)
    }

    /// Classify the play as a pass or run.
    ///
    /// Only `pass`, `run` and `no_play` rows are eligible. The `pass`/`rush`
    /// flags win over `play_type`, so a penalty-nullified dropback still
    /// counts as a pass; a `no_play` with neither flag is dropped.
    pub fn kind(&self) -> Option<PlayKind> {
        let play_type = self.play_type.as_deref()?;
        if !matches!(play_type, "pass" | "run" | "no_play") {
            return None;
        }
        if flag_set(self.pass) {
            return Some(PlayKind::Pass);
        }
        if flag_set(self.rush) {
            return Some(PlayKind::Run);
        }
        match play_type {
            "pass" => Some(PlayKind::Pass),
            "run" => Some(PlayKind::Run),
            _ => None,
        }
    }

    pub fn is_postseason(&self) -> bool {
        self.season_type == Some(SeasonType::Post)
    }
}

/// Which plays feed the features
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayFilter {
    pub regular_season_only: bool,
}

impl Default for PlayFilter {
    fn default() -> Self {
        PlayFilter {
            regular_season_only: true,
        }
    }
}

impl PlayFilter {
    pub fn from_config(config: &DataConfig) -> Self {
        PlayFilter {
            regular_season_only: config.regular_season_only,
        }
    }

    /// With `regular_season_only`, pre- and postseason plays are rejected;
    /// plays with no season type are kept
    pub fn accepts(&self, play: &Play) -> bool {
        match play.season_type {
            Some(SeasonType::Regular) | None => true,
            Some(_) => !self.regular_season_only,
        }
    }
}

/// Read plays from CSV with a header row
pub fn read_plays<R: Read>(reader: R) -> Result<Vec<Play>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut plays = Vec::new();
    for record in reader.deserialize() {
        plays.push(record?);
    }
    log::debug!("Read {} plays", plays.len());
    Ok(plays)
}

/// Load plays from a CSV file
pub fn load_plays<P: AsRef<Path>>(path: P) -> Result<Vec<Play>> {
    let path = path.as_ref();
    log::info!("Loading plays from {}", path.display());
    let file = File::open(path)?;
    read_plays(file)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const SAMPLE_CSV: &str = "\
play_id,game_id,season,week,season_type,game_date,home_team,away_team,posteam,defteam,\
play_type,pass,rush,epa,home_score,away_score,result,desc
1,2020_01_KC_BUF,2020,1,REG,2020-09-13,BUF,KC,NA,NA,kickoff,0,0,0.0,20,24,-4,kick
2,2020_01_KC_BUF,2020,1,REG,2020-09-13,BUF,KC,KC,BUF,pass,1,0,0.8,20,24,-4,pass deep
3,2020_01_KC_BUF,2020,1,REG,2020-09-13,BUF,KC,KC,BUF,run,0,1,-0.2,20,24,-4,run left
4,2020_01_KC_BUF,2020,1,REG,2020-09-13,BUF,KC,BUF,KC,no_play,1,0,-0.5,20,24,-4,penalty on dropback
5,2020_01_KC_BUF,2020,1,REG,2020-09-13,BUF,KC,BUF,KC,run,0,1,NA,20,24,-4,no epa
6,2020_01_KC_BUF,2020,1,REG,2020-09-13,BUF,KC,BUF,KC,no_play,0,0,0.1,20,24,-4,timeout
7,2020_20_KC_BUF,2020,20,POST,2021-01-24,KC,BUF,KC,BUF,pass,1,0,0.3,38,24,14,title game
";

    #[test]
    fn test_read_sample() {
        let plays = read_plays(SAMPLE_CSV.as_bytes()).unwrap();
        assert_eq!(plays.len(), 7);

        let kickoff = &plays[0];
        assert_eq!(kickoff.posteam, None);
        assert_eq!(kickoff.season_type, Some(SeasonType::Regular));
        assert_eq!(kickoff.game_date, NaiveDate::from_ymd_opt(2020, 9, 13));
        assert_eq!(kickoff.result, Some(-4));

        assert_eq!(plays[1].posteam, Some(TeamId::new("KC")));
        assert_eq!(plays[4].epa, None);
        assert!(plays[6].is_postseason());
        assert_eq!(plays[6].period(), Period::new(2020, 20));
    }

    #[test]
    fn test_play_kind() {
        let plays = read_plays(SAMPLE_CSV.as_bytes()).unwrap();
        assert_eq!(plays[0].kind(), None);
        assert_eq!(plays[1].kind(), Some(PlayKind::Pass));
        assert_eq!(plays[2].kind(), Some(PlayKind::Run));
        // Nullified dropback keeps its pass flag
        assert_eq!(plays[3].kind(), Some(PlayKind::Pass));
        assert_eq!(plays[5].kind(), None);
    }

    #[test]
    fn test_filter() {
        let plays = read_plays(SAMPLE_CSV.as_bytes()).unwrap();
        let regular = PlayFilter::default();
        let all = PlayFilter {
            regular_season_only: false,
        };
        assert!(regular.accepts(&plays[1]));
        assert!(!regular.accepts(&plays[6]));
        assert!(all.accepts(&plays[6]));
    }

    const SEASON_TYPE_CSV: &str = "\
game_id,season,week,season_type,home_team,away_team
2021_00_NYG_NYJ,2021,0,PRE,NYJ,NYG
2021_01_NYG_NYJ,2021,1,NA,NYJ,NYG
2021_01_DAL_TB,2021,1,,TB,DAL
";

    #[test]
    fn test_preseason_and_missing_season_type() {
        let plays = read_plays(SEASON_TYPE_CSV.as_bytes()).unwrap();
        assert_eq!(plays[0].season_type, Some(SeasonType::Preseason));
        assert_eq!(plays[1].season_type, None);
        assert_eq!(plays[2].season_type, None);

        let regular = PlayFilter::default();
        let all = PlayFilter {
            regular_season_only: false,
        };
        assert!(!regular.accepts(&plays[0]));
        assert!(all.accepts(&plays[0]));
        assert!(regular.accepts(&plays[1]));
        assert!(regular.accepts(&plays[2]));
    }

    #[test]
    fn test_unknown_season_type_rejected() {
        let csv = "game_id,season,week,season_type,home_team,away_team\n\
                   2021_01_NYG_NYJ,2021,1,EXH,NYJ,NYG\n";
        assert!(matches!(
            read_plays(csv.as_bytes()),
            Err(crate::GridironError::Csv(_))
        ));
        assert_eq!(SeasonType::from_code("EXH"), None);
    }

    #[test]
    fn test_missing_required_column() {
        let csv = "game_id,season\n2020_01_KC_BUF,2020\n";
        assert!(matches!(
            read_plays(csv.as_bytes()),
            Err(crate::GridironError::Csv(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            load_plays("does/not/exist.csv"),
            Err(crate::GridironError::Io(_))
        ));
    }
}
