pub mod config;
pub mod propagate;
pub mod structure;
pub mod validate;

pub use config::SiteConfig;
pub use propagate::{
    PickProgress, StalePick, favorite_picks, pick_progress, picked_champion, propagate, stale_picks,
};
pub use structure::{BuildResult, ConfigurationError, build_bracket, expected_game_ids};
pub use validate::{ValidationResult, validate, validate_at};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const REGION_COUNT: usize = 4;
pub const TEAMS_PER_REGION: usize = 16;
/// 8 + 4 + 2 + 1 regional games.
pub const GAMES_PER_REGION: usize = 15;
/// 4 regions x 15, two semifinals, one final.
pub const TOTAL_GAMES: usize = REGION_COUNT * GAMES_PER_REGION + 2 + 1;

const SAMPLE_FIELD_JSON: &str = include_str!("../data/2025_field.json");

/// Winner picks keyed by game id. Ordered so reports come out the same every time.
pub type PicksMap = BTreeMap<String, String>;

// ---------------------------------------------------------------------------
// Reference data: supplied by the caller, only ever looked up
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub seed: u8,
    pub name: String,
    /// Region name, stamped on once the team reaches the Final Four.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

/// Quadrant of the printed bracket. Ordering follows the order regions are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegionPosition {
    TopLeft,
    BottomLeft,
    TopRight,
    BottomRight,
}

impl RegionPosition {
    pub const ALL: [RegionPosition; REGION_COUNT] = [
        RegionPosition::TopLeft,
        RegionPosition::BottomLeft,
        RegionPosition::TopRight,
        RegionPosition::BottomRight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RegionPosition::TopLeft => "top-left",
            RegionPosition::BottomLeft => "bottom-left",
            RegionPosition::TopRight => "top-right",
            RegionPosition::BottomRight => "bottom-right",
        }
    }
}

impl fmt::Display for RegionPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub position: RegionPosition,
    pub name: String, // "South", "West", "East", "Midwest"
    /// Teams at 2k / 2k+1 meet in Round of 64 game k+1.
    pub teams: Vec<Team>,
}

impl Region {
    pub fn find_team(&self, team_id: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == team_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentData {
    pub regions: Vec<Region>,
}

impl TournamentData {
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// The 2025 men's field, embedded for offline use and tests.
    pub fn sample_2025() -> serde_json::Result<Self> {
        Self::from_json_str(SAMPLE_FIELD_JSON)
    }

    pub fn region(&self, position: RegionPosition) -> Option<&Region> {
        self.regions.iter().find(|r| r.position == position)
    }

    /// Every team in the field, region by region.
    pub fn all_teams(&self) -> impl Iterator<Item = &Team> {
        self.regions.iter().flat_map(|r| r.teams.iter())
    }

    pub fn find_team(&self, team_id: &str) -> Option<&Team> {
        self.all_teams().find(|t| t.id == team_id)
    }
}

// ---------------------------------------------------------------------------
// Derived bracket: rebuilt on every call, never stored
// ---------------------------------------------------------------------------

/// Ordered from earliest to latest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RoundKind {
    #[serde(rename = "Round of 64")]
    RoundOf64,
    #[serde(rename = "Round of 32")]
    RoundOf32,
    #[serde(rename = "Sweet 16")]
    Sweet16,
    #[serde(rename = "Elite 8")]
    Elite8,
    #[serde(rename = "Final Four")]
    FinalFour,
    #[serde(rename = "Championship")]
    Championship,
}

impl RoundKind {
    /// Rounds played inside a single region, earliest first.
    pub const REGIONAL: [RoundKind; 4] = [
        RoundKind::RoundOf64,
        RoundKind::RoundOf32,
        RoundKind::Sweet16,
        RoundKind::Elite8,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RoundKind::RoundOf64 => "Round of 64",
            RoundKind::RoundOf32 => "Round of 32",
            RoundKind::Sweet16 => "Sweet 16",
            RoundKind::Elite8 => "Elite 8",
            RoundKind::FinalFour => "Final Four",
            RoundKind::Championship => "Championship",
        }
    }

    /// Short tag used in regional game ids. None for the national rounds.
    pub fn tag(&self) -> Option<&'static str> {
        match self {
            RoundKind::RoundOf64 => Some("r64"),
            RoundKind::RoundOf32 => Some("r32"),
            RoundKind::Sweet16 => Some("s16"),
            RoundKind::Elite8 => Some("e8"),
            RoundKind::FinalFour | RoundKind::Championship => None,
        }
    }

    /// Games this round holds within one region (0 for the national rounds).
    pub fn games_per_region(&self) -> usize {
        match self {
            RoundKind::RoundOf64 => 8,
            RoundKind::RoundOf32 => 4,
            RoundKind::Sweet16 => 2,
            RoundKind::Elite8 => 1,
            RoundKind::FinalFour | RoundKind::Championship => 0,
        }
    }

    pub fn prev(self) -> Option<Self> {
        match self {
            RoundKind::RoundOf64 => None,
            RoundKind::RoundOf32 => Some(RoundKind::RoundOf64),
            RoundKind::Sweet16 => Some(RoundKind::RoundOf32),
            RoundKind::Elite8 => Some(RoundKind::Sweet16),
            RoundKind::FinalFour => Some(RoundKind::Elite8),
            RoundKind::Championship => Some(RoundKind::FinalFour),
        }
    }

    pub fn next(self) -> Option<Self> {
        match self {
            RoundKind::RoundOf64 => Some(RoundKind::RoundOf32),
            RoundKind::RoundOf32 => Some(RoundKind::Sweet16),
            RoundKind::Sweet16 => Some(RoundKind::Elite8),
            RoundKind::Elite8 => Some(RoundKind::FinalFour),
            RoundKind::FinalFour => Some(RoundKind::Championship),
            RoundKind::Championship => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: String,
    pub round: RoundKind,
    /// None for Final Four and Championship.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<RegionPosition>,
    /// 1-based within the round (and region, for regional rounds).
    pub game_number: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team1: Option<Team>, // None = TBD
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team2: Option<Team>,
}

impl Game {
    pub fn is_resolved(&self) -> bool {
        self.team1.is_some() && self.team2.is_some()
    }

    /// The slot holding `team_id`, if either does.
    pub fn slot_team(&self, team_id: &str) -> Option<&Team> {
        [self.team1.as_ref(), self.team2.as_ref()]
            .into_iter()
            .flatten()
            .find(|t| t.id == team_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketTree {
    /// 15 games per region: R64 1-8, R32 1-4, S16 1-2, E8 1.
    pub regions: BTreeMap<RegionPosition, Vec<Game>>,
    pub final_four: [Game; 2],
    pub championship: Game,
}

impl BracketTree {
    /// All games in a fixed order: regions by position, then Final Four, then Championship.
    pub fn games(&self) -> impl Iterator<Item = &Game> {
        self.regions
            .values()
            .flatten()
            .chain(self.final_four.iter())
            .chain(std::iter::once(&self.championship))
    }

    pub fn game_ids(&self) -> impl Iterator<Item = &str> {
        self.games().map(|g| g.id.as_str())
    }

    pub fn find_game(&self, game_id: &str) -> Option<&Game> {
        self.games().find(|g| g.id == game_id)
    }

    pub fn region_games(&self, position: RegionPosition) -> &[Game] {
        self.regions.get(&position).map(Vec::as_slice).unwrap_or_default()
    }
}
