//! Builds the empty 63-game tree from a seeded field.

use crate::{
    BracketTree, Game, REGION_COUNT, Region, RegionPosition, RoundKind, TEAMS_PER_REGION,
    TournamentData,
};
use log::debug;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

pub const FINAL_FOUR_IDS: [&str; 2] = ["final-four-1", "final-four-2"];
pub const CHAMPIONSHIP_ID: &str = "championship";

pub type BuildResult<T> = Result<T, ConfigurationError>;

/// Malformed tournament data. Nothing downstream should run on a field that fails these checks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("Expected {expected} regions, found {found}")]
    RegionCount { expected: usize, found: usize },

    #[error("Region {region} must have exactly {expected} teams, found {found}")]
    RegionSize { region: String, expected: usize, found: usize },

    #[error("Region position {0} appears more than once")]
    DuplicatePosition(RegionPosition),

    #[error("Team {team_id} appears in both {first} and {second}")]
    DuplicateTeam { team_id: String, first: String, second: String },
}

/// Id of a regional game, e.g. `top-left-r32-1`. Only meaningful for the four
/// regional rounds; Final Four and Championship use the fixed ids above.
pub fn regional_game_id(position: RegionPosition, round: RoundKind, game_number: usize) -> String {
    let tag = round.tag().unwrap_or_default();
    format!("{position}-{tag}-{game_number}")
}

/// Build the skeleton bracket: Round of 64 seeded from roster order, every later slot empty.
pub fn build_bracket(data: &TournamentData) -> BuildResult<BracketTree> {
    check_field(data)?;

    let regions: BTreeMap<RegionPosition, Vec<Game>> = data
        .regions
        .iter()
        .map(|region| (region.position, build_region(region)))
        .collect();

    let final_four = [
        national_game(FINAL_FOUR_IDS[0], RoundKind::FinalFour, 1),
        national_game(FINAL_FOUR_IDS[1], RoundKind::FinalFour, 2),
    ];
    let championship = national_game(CHAMPIONSHIP_ID, RoundKind::Championship, 1);

    debug!("built bracket skeleton for {} regions", regions.len());

    Ok(BracketTree { regions, final_four, championship })
}

/// Build and flatten in one step: the 63 ids a complete submission must cover.
pub fn expected_game_ids(data: &TournamentData) -> BuildResult<Vec<String>> {
    let bracket = build_bracket(data)?;
    Ok(bracket.game_ids().map(str::to_owned).collect())
}

fn check_field(data: &TournamentData) -> BuildResult<()> {
    if data.regions.len() != REGION_COUNT {
        return Err(ConfigurationError::RegionCount {
            expected: REGION_COUNT,
            found: data.regions.len(),
        });
    }

    let mut seen_positions = Vec::with_capacity(REGION_COUNT);
    let mut seen_teams: HashMap<&str, &str> = HashMap::new();

    for region in &data.regions {
        if seen_positions.contains(&region.position) {
            return Err(ConfigurationError::DuplicatePosition(region.position));
        }
        seen_positions.push(region.position);

        if region.teams.len() != TEAMS_PER_REGION {
            return Err(ConfigurationError::RegionSize {
                region: region.name.clone(),
                expected: TEAMS_PER_REGION,
                found: region.teams.len(),
            });
        }

        for team in &region.teams {
            if let Some(first) = seen_teams.insert(team.id.as_str(), region.name.as_str()) {
                return Err(ConfigurationError::DuplicateTeam {
                    team_id: team.id.clone(),
                    first: first.to_owned(),
                    second: region.name.clone(),
                });
            }
        }
    }

    Ok(())
}

fn build_region(region: &Region) -> Vec<Game> {
    let mut games = Vec::with_capacity(crate::GAMES_PER_REGION);

    // Seeding pairs are fixed here and never revisited.
    for (k, pair) in region.teams.chunks_exact(2).enumerate() {
        games.push(Game {
            id: regional_game_id(region.position, RoundKind::RoundOf64, k + 1),
            round: RoundKind::RoundOf64,
            region: Some(region.position),
            game_number: (k + 1) as u8,
            team1: Some(pair[0].clone()),
            team2: Some(pair[1].clone()),
        });
    }

    for round in &RoundKind::REGIONAL[1..] {
        for n in 1..=round.games_per_region() {
            games.push(Game {
                id: regional_game_id(region.position, *round, n),
                round: *round,
                region: Some(region.position),
                game_number: n as u8,
                team1: None,
                team2: None,
            });
        }
    }

    games
}

fn national_game(id: &str, round: RoundKind, game_number: u8) -> Game {
    Game {
        id: id.to_owned(),
        round,
        region: None,
        game_number,
        team1: None,
        team2: None,
    }
}
