//! Submission checks. Every check runs, and the problems found accumulate, so one
//! call reports everything the entrant has to fix.

use crate::config::Deadline;
use crate::propagate::{propagate, stale_picks};
use crate::{BracketTree, PicksMap, RoundKind, SiteConfig, TournamentData, build_bracket};
use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Longest list of offending entries spelled out in a single message.
const MAX_LISTED: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    /// Worth telling the entrant about, but never grounds for rejection.
    pub warnings: Vec<String>,
}

/// Validate a submission as of right now.
pub fn validate(
    picks: &PicksMap,
    tie_breaker: Option<f64>,
    data: &TournamentData,
    config: &SiteConfig,
) -> ValidationResult {
    validate_at(picks, tie_breaker, data, config, Utc::now())
}

/// Validate a submission as of `now`.
pub fn validate_at(
    picks: &PicksMap,
    tie_breaker: Option<f64>,
    data: &TournamentData,
    config: &SiteConfig,
    now: DateTime<Utc>,
) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    check_submission_window(config, now, &mut errors, &mut warnings);
    check_tie_breaker(tie_breaker, config, &mut errors);

    match build_bracket(data) {
        Ok(bracket) => {
            check_completeness(&bracket, picks, &mut errors);
            check_team_existence(picks, data, &mut errors);
            check_region_membership(&bracket, picks, data, &mut errors);
            check_pick_ancestry(&bracket, picks, data, &mut warnings);
        }
        Err(e) => errors.push(format!("Tournament structure is invalid: {e}")),
    }

    debug!(
        "validated {} picks: {} errors, {} warnings",
        picks.len(),
        errors.len(),
        warnings.len()
    );

    ValidationResult {
        is_valid: errors.is_empty(),
        errors,
        warnings,
    }
}

fn check_submission_window(
    config: &SiteConfig,
    now: DateTime<Utc>,
    errors: &mut Vec<String>,
    warnings: &mut Vec<String>,
) {
    if config.submissions_stopped() {
        errors.push(config.stop_submit_message().to_owned());
    }

    match config.deadline() {
        Deadline::At(deadline) if now >= deadline => {
            errors.push(config.deadline_passed_message().to_owned());
        }
        Deadline::Unparseable(raw) => {
            warnings.push(format!("Submission deadline {raw:?} could not be read and was ignored"));
        }
        Deadline::At(_) | Deadline::Unset => {}
    }
}

fn check_tie_breaker(tie_breaker: Option<f64>, config: &SiteConfig, errors: &mut Vec<String>) {
    let (low, high) = config.tie_breaker_bounds();
    match tie_breaker {
        None => errors.push("Tie breaker is required".to_owned()),
        Some(value) if !value.is_finite() => errors.push("Tie breaker must be a number".to_owned()),
        Some(value) if value < low || value > high => {
            errors.push(format!("Tie breaker must be between {low} and {high}"));
        }
        Some(_) => {}
    }
}

fn check_completeness(bracket: &BracketTree, picks: &PicksMap, errors: &mut Vec<String>) {
    let total = bracket.games().count();
    let missing = bracket
        .game_ids()
        .filter(|id| picks.get(*id).is_none_or(|team| team.is_empty()))
        .count();
    if missing > 0 {
        errors.push(format!("Missing {missing} of {total} required picks"));
    }
}

fn check_team_existence(picks: &PicksMap, data: &TournamentData, errors: &mut Vec<String>) {
    let known: HashSet<&str> = data.all_teams().map(|t| t.id.as_str()).collect();
    let invalid: Vec<String> = picks
        .iter()
        .filter(|(_, team)| !team.is_empty() && !known.contains(team.as_str()))
        .map(|(game, team)| format!("{game}: {team}"))
        .collect();
    if !invalid.is_empty() {
        errors.push(format!("Invalid team ids: {}", summarize(&invalid)));
    }
}

/// Regional rounds after the first must be won by a team from that region.
/// Final Four and Championship picks are only held to "is a real team".
fn check_region_membership(
    bracket: &BracketTree,
    picks: &PicksMap,
    data: &TournamentData,
    errors: &mut Vec<String>,
) {
    for game in bracket.games().filter(|g| g.round != RoundKind::RoundOf64) {
        let Some(position) = game.region else {
            continue;
        };
        let Some(team) = picks.get(&game.id).and_then(|id| data.find_team(id)) else {
            continue;
        };
        let Some(region) = data.region(position) else {
            continue;
        };
        if region.find_team(&team.id).is_none() {
            errors.push(format!(
                "{} pick for {} ({}) is not in the {} region",
                game.round.label(),
                game.id,
                team.name,
                region.name
            ));
        }
    }
}

/// Stray keys and picks that skip over earlier picks. Reported, never rejected.
fn check_pick_ancestry(
    bracket: &BracketTree,
    picks: &PicksMap,
    data: &TournamentData,
    warnings: &mut Vec<String>,
) {
    let expected: HashSet<&str> = bracket.game_ids().collect();
    let unknown: Vec<String> = picks
        .keys()
        .filter(|id| !expected.contains(id.as_str()))
        .cloned()
        .collect();
    if !unknown.is_empty() {
        warnings.push(format!("Ignored picks for unknown games: {}", summarize(&unknown)));
    }

    let populated = propagate(bracket, picks, data);
    let stale: Vec<String> = stale_picks(&populated, picks)
        .into_iter()
        .filter_map(|pick| {
            let team = data.find_team(&pick.team_id)?;
            Some(format!("{} ({})", pick.game_id, team.name))
        })
        .collect();
    if !stale.is_empty() {
        warnings.push(format!(
            "Picks that do not follow from earlier-round picks: {}",
            summarize(&stale)
        ));
    }
}

fn summarize(items: &[String]) -> String {
    let shown = items.iter().take(MAX_LISTED).cloned().collect::<Vec<_>>().join(", ");
    match items.len().saturating_sub(MAX_LISTED) {
        0 => shown,
        rest => format!("{shown}, ...and {rest} more"),
    }
}
