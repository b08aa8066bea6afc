//! Per-game team efficiency
//!
//! Aggregates plays into mean EPA per play for each team, game and
//! category. These are the raw observations the EWMA smooths.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;

use crate::data::plays::{Play, PlayFilter, PlayKind};
use crate::features::Observation;
use crate::{GridironError, Period, Result, TeamId};

/// Statistical category a series belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EfficiencyCategory {
    PassOffense,
    RushOffense,
    PassDefense,
    RushDefense,
}

impl EfficiencyCategory {
    pub const ALL: [EfficiencyCategory; 4] = [
        EfficiencyCategory::PassOffense,
        EfficiencyCategory::RushOffense,
        EfficiencyCategory::PassDefense,
        EfficiencyCategory::RushDefense,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EfficiencyCategory::PassOffense => "pass_offense",
            EfficiencyCategory::RushOffense => "rush_offense",
            EfficiencyCategory::PassDefense => "pass_defense",
            EfficiencyCategory::RushDefense => "rush_defense",
        }
    }

    fn offense(kind: PlayKind) -> Self {
        match kind {
            PlayKind::Pass => EfficiencyCategory::PassOffense,
            PlayKind::Run => EfficiencyCategory::RushOffense,
        }
    }

    fn defense(kind: PlayKind) -> Self {
        match kind {
            PlayKind::Pass => EfficiencyCategory::PassDefense,
            PlayKind::Run => EfficiencyCategory::RushDefense,
        }
    }
}

impl fmt::Display for EfficiencyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Entity a smoothed series is keyed by: one team in one category
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityKey {
    pub team: TeamId,
    pub category: EfficiencyCategory,
}

impl EntityKey {
    pub fn new(team: TeamId, category: EfficiencyCategory) -> Self {
        EntityKey { team, category }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.team, self.category)
    }
}

#[derive(Debug)]
struct GameTotal<'a> {
    game_id: &'a str,
    epa_sum: f64,
    plays: usize,
}

impl GameTotal<'_> {
    fn mean(&self) -> f64 {
        self.epa_sum / self.plays as f64
    }
}

/// Mean EPA per play for every (team, category, game).
///
/// Output is ordered by entity, then period. Offense is credited to
/// `posteam`, defense to `defteam`. Fails if a team has two different games
/// in the same period.
pub fn efficiency_observations(
    plays: &[Play],
    filter: &PlayFilter,
) -> Result<Vec<Observation<EntityKey>>> {
    let mut totals: BTreeMap<(EntityKey, Period), GameTotal> = BTreeMap::new();
    let mut used = 0usize;

    for play in plays.iter().filter(|p| filter.accepts(p)) {
        let (Some(kind), Some(epa), Some(offense), Some(defense)) =
            (play.kind(), play.epa, play.posteam.as_ref(), play.defteam.as_ref())
        else {
            continue;
        };
        if !epa.is_finite() {
            continue;
        }
        used += 1;

        let credits = [
            EntityKey::new(offense.clone(), EfficiencyCategory::offense(kind)),
            EntityKey::new(defense.clone(), EfficiencyCategory::defense(kind)),
        ];
        for entity in credits {
            let total = match totals.entry((entity, play.period())) {
                Entry::Vacant(slot) => slot.insert(GameTotal {
                    game_id: &play.game_id,
                    epa_sum: 0.0,
                    plays: 0,
                }),
                Entry::Occupied(slot) => {
                    if slot.get().game_id != play.game_id {
                        return Err(GridironError::InvalidInput(format!(
                            "{} has games {} and {} in {}",
                            slot.key().0.team,
                            slot.get().game_id,
                            play.game_id,
                            play.period()
                        )));
                    }
                    slot.into_mut()
                }
            };
            total.epa_sum += epa;
            total.plays += 1;
        }
    }

    log::debug!(
        "Aggregated {} of {} plays into {} team-game observations",
        used,
        plays.len(),
        totals.len()
    );

    Ok(totals
        .into_iter()
        .map(|((entity, period), total)| Observation::new(entity, period, total.mean()))
        .collect())
}
