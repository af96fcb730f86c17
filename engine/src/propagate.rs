//! Pick propagation: fills every post-Round-of-64 slot from a flat map of picks.
//!
//! The output is a pure projection of `(skeleton, picks, field)`. Nothing is
//! patched in place, so a changed pick can never leave a stale team behind in a
//! later round. Missing or unresolvable picks simply leave a slot empty.

use crate::structure::{BuildResult, CHAMPIONSHIP_ID, FINAL_FOUR_IDS, build_bracket, regional_game_id};
use crate::{BracketTree, Game, PicksMap, Region, RegionPosition, RoundKind, Team, TournamentData};
use log::{debug, trace};
use serde::Serialize;

/// Elite 8 winners meet by quadrant, left side and right side.
const FINAL_FOUR_PAIRS: [(RegionPosition, RegionPosition); 2] = [
    (RegionPosition::TopLeft, RegionPosition::BottomLeft),
    (RegionPosition::TopRight, RegionPosition::BottomRight),
];

/// Return a new tree with every later-round slot derived from `picks`.
pub fn propagate(bracket: &BracketTree, picks: &PicksMap, data: &TournamentData) -> BracketTree {
    let regions = bracket
        .regions
        .iter()
        .map(|(position, games)| (*position, propagate_region(games, picks, data.region(*position))))
        .collect();

    let final_four = [
        final_four_game(&bracket.final_four[0], FINAL_FOUR_PAIRS[0], picks, data),
        final_four_game(&bracket.final_four[1], FINAL_FOUR_PAIRS[1], picks, data),
    ];

    let championship = Game {
        team1: picked_team(picks, FINAL_FOUR_IDS[0], |id| data.find_team(id)),
        team2: picked_team(picks, FINAL_FOUR_IDS[1], |id| data.find_team(id)),
        ..bracket.championship.clone()
    };

    let populated = BracketTree { regions, final_four, championship };
    debug!(
        "propagated {} picks, {} of {} games fully resolved",
        picks.len(),
        populated.games().filter(|g| g.is_resolved()).count(),
        populated.games().count()
    );
    populated
}

fn propagate_region(games: &[Game], picks: &PicksMap, roster: Option<&Region>) -> Vec<Game> {
    let resolve = |id: &str| roster.and_then(|r| r.find_team(id));

    games
        .iter()
        .map(|game| {
            // Round of 64 is seeded at build time and never derived.
            let (Some(position), Some(prev)) = (game.region, game.round.prev()) else {
                return game.clone();
            };
            let k = usize::from(game.game_number);
            // Game numbers are 1-based; a zero has no feeders.
            let Some(first) = (2 * k).checked_sub(1) else {
                return game.clone();
            };
            let feeder1 = regional_game_id(position, prev, first);
            let feeder2 = regional_game_id(position, prev, 2 * k);
            Game {
                team1: picked_team(picks, &feeder1, resolve),
                team2: picked_team(picks, &feeder2, resolve),
                ..game.clone()
            }
        })
        .collect()
}

fn final_four_game(
    game: &Game,
    (left, right): (RegionPosition, RegionPosition),
    picks: &PicksMap,
    data: &TournamentData,
) -> Game {
    let finalist = |position: RegionPosition| {
        let region = data.region(position)?;
        let elite8 = regional_game_id(position, RoundKind::Elite8, 1);
        let mut team = picked_team(picks, &elite8, |id| region.find_team(id))?;
        team.region = Some(region.name.clone());
        Some(team)
    };

    Game {
        team1: finalist(left),
        team2: finalist(right),
        ..game.clone()
    }
}

/// Look up the pick for `game_id` and resolve it to a team. Empty picks count as absent.
fn picked_team<'a>(
    picks: &PicksMap,
    game_id: &str,
    resolve: impl Fn(&str) -> Option<&'a Team>,
) -> Option<Team> {
    let team_id = picks.get(game_id).filter(|id| !id.is_empty())?;
    let team = resolve(team_id);
    if team.is_none() {
        trace!("{game_id}: pick {team_id} does not resolve, leaving slot TBD");
    }
    team.cloned()
}

// ---------------------------------------------------------------------------
// Read-only views over a populated bracket
// ---------------------------------------------------------------------------

/// A pick whose team is not in either slot of its game once earlier picks are applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StalePick {
    pub game_id: String,
    pub team_id: String,
}

/// Picks that contradict earlier picks. Only games with both slots resolved are
/// judged; a half-filled game could still receive the picked team.
pub fn stale_picks(populated: &BracketTree, picks: &PicksMap) -> Vec<StalePick> {
    populated
        .games()
        .filter(|game| game.is_resolved())
        .filter_map(|game| {
            let team_id = picks.get(&game.id).filter(|id| !id.is_empty())?;
            game.slot_team(team_id).is_none().then(|| StalePick {
                game_id: game.id.clone(),
                team_id: team_id.clone(),
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PickProgress {
    pub made: usize,
    pub total: usize,
}

impl PickProgress {
    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.made)
    }

    pub fn is_complete(&self) -> bool {
        self.made == self.total
    }
}

/// Count non-empty picks that target a real game. Stray keys are not counted.
pub fn pick_progress(bracket: &BracketTree, picks: &PicksMap) -> PickProgress {
    let made = bracket
        .game_ids()
        .filter(|id| picks.get(*id).is_some_and(|team| !team.is_empty()))
        .count();
    PickProgress { made, total: bracket.games().count() }
}

/// The picked champion, provided it actually sits in a championship slot.
pub fn picked_champion<'a>(populated: &'a BracketTree, picks: &PicksMap) -> Option<&'a Team> {
    let team_id = picks.get(CHAMPIONSHIP_ID)?;
    populated.championship.slot_team(team_id)
}

/// Autofill: the better seed wins every game, and team1 wins between equal seeds.
pub fn favorite_picks(data: &TournamentData) -> BuildResult<PicksMap> {
    let skeleton = build_bracket(data)?;
    let mut picks = PicksMap::new();

    for round in std::iter::successors(Some(RoundKind::RoundOf64), |r| r.next()) {
        let populated = propagate(&skeleton, &picks, data);
        let winners: Vec<(String, String)> = populated
            .games()
            .filter(|g| g.round == round)
            .filter_map(|g| favorite(g).map(|team| (g.id.clone(), team.id.clone())))
            .collect();
        picks.extend(winners);
    }

    Ok(picks)
}

fn favorite(game: &Game) -> Option<&Team> {
    match (&game.team1, &game.team2) {
        (Some(a), Some(b)) => Some(if b.seed < a.seed { b } else { a }),
        (a, b) => a.as_ref().or(b.as_ref()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> TournamentData {
        TournamentData::sample_2025().unwrap()
    }

    fn picks(entries: &[(&str, &str)]) -> PicksMap {
        entries.iter().map(|(g, t)| (g.to_string(), t.to_string())).collect()
    }

    fn slot_ids(game: &Game) -> (Option<&str>, Option<&str>) {
        (
            game.team1.as_ref().map(|t| t.id.as_str()),
            game.team2.as_ref().map(|t| t.id.as_str()),
        )
    }

    #[test]
    fn no_picks_leaves_later_rounds_empty() {
        let data = sample();
        let skeleton = build_bracket(&data).unwrap();
        let populated = propagate(&skeleton, &PicksMap::new(), &data);
        for game in populated.games().filter(|g| g.round != RoundKind::RoundOf64) {
            assert_eq!(slot_ids(game), (None, None), "{}", game.id);
        }
        assert_eq!(populated, skeleton);
    }

    #[test]
    fn first_two_picks_fill_first_round_of_32_game() {
        let data = sample();
        let skeleton = build_bracket(&data).unwrap();
        let picks = picks(&[("top-left-r64-1", "auburn"), ("top-left-r64-2", "creighton")]);
        let populated = propagate(&skeleton, &picks, &data);

        let r32 = populated.find_game("top-left-r32-1").unwrap();
        assert_eq!(slot_ids(r32), (Some("auburn"), Some("creighton")));

        let others = populated
            .games()
            .filter(|g| g.round == RoundKind::RoundOf32 && g.id != "top-left-r32-1");
        for game in others {
            assert_eq!(slot_ids(game), (None, None), "{}", game.id);
        }
    }

    #[test]
    fn single_feeder_pick_fills_one_slot() {
        let data = sample();
        let skeleton = build_bracket(&data).unwrap();
        let populated = propagate(&skeleton, &picks(&[("bottom-left-r64-4", "maryland")]), &data);
        let r32 = populated.find_game("bottom-left-r32-2").unwrap();
        assert_eq!(slot_ids(r32), (None, Some("maryland")));
    }

    #[test]
    fn round_of_64_is_unaffected_by_picks() {
        let data = sample();
        let skeleton = build_bracket(&data).unwrap();
        let populated = propagate(&skeleton, &picks(&[("top-left-r64-1", "alabama-state")]), &data);
        let before: Vec<_> = skeleton.games().filter(|g| g.round == RoundKind::RoundOf64).collect();
        let after: Vec<_> = populated.games().filter(|g| g.round == RoundKind::RoundOf64).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn picks_outside_the_region_roster_stay_tbd() {
        let data = sample();
        let skeleton = build_bracket(&data).unwrap();
        let picks = picks(&[("top-left-r64-1", "duke"), ("top-left-r64-2", "no-such-team")]);
        let populated = propagate(&skeleton, &picks, &data);
        assert_eq!(slot_ids(populated.find_game("top-left-r32-1").unwrap()), (None, None));
    }

    #[test]
    fn final_four_pairs_left_and_right_sides_and_stamps_region() {
        let data = sample();
        let skeleton = build_bracket(&data).unwrap();
        let picks = picks(&[
            ("top-left-e8-1", "auburn"),
            ("bottom-left-e8-1", "florida"),
            ("top-right-e8-1", "duke"),
            ("bottom-right-e8-1", "houston"),
        ]);
        let populated = propagate(&skeleton, &picks, &data);

        let [semi1, semi2] = &populated.final_four;
        assert_eq!(slot_ids(semi1), (Some("auburn"), Some("florida")));
        assert_eq!(slot_ids(semi2), (Some("duke"), Some("houston")));
        assert_eq!(semi1.team1.as_ref().and_then(|t| t.region.as_deref()), Some("South"));
        assert_eq!(semi2.team2.as_ref().and_then(|t| t.region.as_deref()), Some("Midwest"));
    }

    #[test]
    fn final_four_pairing_ignores_region_array_order() {
        let mut data = sample();
        data.regions.reverse();
        let skeleton = build_bracket(&data).unwrap();
        let picks = picks(&[("top-left-e8-1", "auburn"), ("bottom-left-e8-1", "florida")]);
        let populated = propagate(&skeleton, &picks, &data);
        assert_eq!(slot_ids(&populated.final_four[0]), (Some("auburn"), Some("florida")));
        assert_eq!(slot_ids(&populated.final_four[1]), (None, None));
    }

    #[test]
    fn championship_resolves_against_full_field() {
        let data = sample();
        let skeleton = build_bracket(&data).unwrap();
        let picks = picks(&[("final-four-1", "florida"), ("final-four-2", "houston")]);
        let populated = propagate(&skeleton, &picks, &data);
        assert_eq!(slot_ids(&populated.championship), (Some("florida"), Some("houston")));
    }

    #[test]
    fn propagation_is_idempotent() {
        let data = sample();
        let skeleton = build_bracket(&data).unwrap();
        let picks = picks(&[("top-right-r64-3", "oregon"), ("top-right-r64-4", "arizona")]);
        let once = propagate(&skeleton, &picks, &data);
        let twice = propagate(&skeleton, &picks, &data);
        assert_eq!(once, twice);
        // Feeding the output back in derives the same tree again.
        assert_eq!(propagate(&once, &picks, &data), once);
    }

    #[test]
    fn zero_game_number_leaves_game_untouched() {
        let data = sample();
        let json = serde_json::to_string(&build_bracket(&data).unwrap()).unwrap();
        let mut tree: BracketTree = serde_json::from_str(&json).unwrap();
        let game = tree
            .regions
            .get_mut(&RegionPosition::TopLeft)
            .and_then(|games| games.iter_mut().find(|g| g.id == "top-left-r32-1"))
            .unwrap();
        game.game_number = 0;
        let before = game.clone();

        let picks = favorite_picks(&data).unwrap();
        let populated = propagate(&tree, &picks, &data);
        assert_eq!(populated.find_game("top-left-r32-1"), Some(&before));
        assert!(populated.find_game("top-left-r32-2").unwrap().is_resolved());
    }

    #[test]
    fn changed_pick_leaves_no_stale_derived_slot() {
        let data = sample();
        let skeleton = build_bracket(&data).unwrap();
        let first = propagate(&skeleton, &picks(&[("top-left-r64-1", "auburn")]), &data);
        let second = propagate(&first, &picks(&[("top-left-r64-1", "alabama-state")]), &data);
        let r32 = second.find_game("top-left-r32-1").unwrap();
        assert_eq!(slot_ids(r32), (Some("alabama-state"), None));
    }

    #[test]
    fn stale_picks_flags_eliminated_teams() {
        let data = sample();
        let skeleton = build_bracket(&data).unwrap();
        let picks = picks(&[
            ("top-left-r64-1", "alabama-state"),
            ("top-left-r64-2", "creighton"),
            ("top-left-r32-1", "auburn"),
            ("top-left-r64-3", "louisville"),
        ]);
        let populated = propagate(&skeleton, &picks, &data);
        assert_eq!(
            stale_picks(&populated, &picks),
            vec![
                StalePick { game_id: "top-left-r64-3".into(), team_id: "louisville".into() },
                StalePick { game_id: "top-left-r32-1".into(), team_id: "auburn".into() },
            ]
        );
    }

    #[test]
    fn progress_counts_only_real_games() {
        let data = sample();
        let skeleton = build_bracket(&data).unwrap();
        let picks = picks(&[("top-left-r64-1", "auburn"), ("bogus-game", "duke"), ("championship", "")]);
        let progress = pick_progress(&skeleton, &picks);
        assert_eq!(progress, PickProgress { made: 1, total: 63 });
        assert_eq!(progress.remaining(), 62);
        assert!(!progress.is_complete());
    }

    #[test]
    fn favorite_picks_fill_every_game_by_seed() {
        let data = sample();
        let picks = favorite_picks(&data).unwrap();
        assert_eq!(picks.len(), 63);
        assert_eq!(picks.get("top-right-r64-2").map(String::as_str), Some("mississippi-state"));
        assert_eq!(picks.get("bottom-right-e8-1").map(String::as_str), Some("houston"));
        // Auburn and Florida are both 1 seeds; the top-left side is team1.
        assert_eq!(picks.get("final-four-1").map(String::as_str), Some("auburn"));
        assert_eq!(picks.get("championship").map(String::as_str), Some("auburn"));

        let populated = propagate(&build_bracket(&data).unwrap(), &picks, &data);
        assert!(populated.games().all(Game::is_resolved));
        assert!(stale_picks(&populated, &picks).is_empty());
    }

    #[test]
    fn picked_champion_requires_a_championship_slot() {
        let data = sample();
        let skeleton = build_bracket(&data).unwrap();
        let mut picks = picks(&[("final-four-1", "florida"), ("final-four-2", "houston"), ("championship", "florida")]);
        let populated = propagate(&skeleton, &picks, &data);
        assert_eq!(picked_champion(&populated, &picks).map(|t| t.name.as_str()), Some("Florida"));

        picks.insert("championship".into(), "duke".into());
        assert_eq!(picked_champion(&propagate(&skeleton, &picks, &data), &picks), None);
    }
}
