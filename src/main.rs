mod cli;
mod sources;

use crate::cli::Command;
use bracket_engine::{
    BracketTree, PickProgress, Team, build_bracket, favorite_picks, pick_progress, picked_champion,
    propagate, validate,
};
use log::{info, warn};
use pico_args::Arguments;
use serde::Serialize;

/// `propagate` output: the filled-in tree plus how far along the entrant is.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PropagateReport<'a> {
    progress: PickProgress,
    #[serde(skip_serializing_if = "Option::is_none")]
    champion: Option<&'a Team>,
    bracket: &'a BracketTree,
}

fn main() -> anyhow::Result<()> {
    let command = match cli::parse(Arguments::from_env()) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{e}\n\n{}", cli::usage_text());
            std::process::exit(2);
        }
    };

    better_panic::install();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_target(false)
        .init();

    match command {
        Command::Help => println!("{}", cli::usage_text()),
        Command::Version => println!("pickem {}", env!("CARGO_PKG_VERSION")),
        Command::Build { tournament } => {
            let data = sources::load_tournament(tournament.as_deref())?;
            print_json(&build_bracket(&data)?)?;
        }
        Command::Favorites { tournament } => {
            let data = sources::load_tournament(tournament.as_deref())?;
            print_json(&favorite_picks(&data)?)?;
        }
        Command::Propagate { tournament, picks } => {
            let data = sources::load_tournament(tournament.as_deref())?;
            let picks = sources::load_picks(&picks)?;
            let skeleton = build_bracket(&data)?;
            let populated = propagate(&skeleton, &picks, &data);
            let progress = pick_progress(&populated, &picks);
            if progress.is_complete() {
                info!("all {} picks made", progress.total);
            } else {
                info!("{} of {} picks made, {} to go", progress.made, progress.total, progress.remaining());
            }
            print_json(&PropagateReport {
                progress,
                champion: picked_champion(&populated, &picks),
                bracket: &populated,
            })?;
        }
        Command::Validate { tournament, picks, tie_breaker, config } => {
            let data = sources::load_tournament(tournament.as_deref())?;
            let picks = sources::load_picks(&picks)?;
            let config = sources::load_site_config(config.as_deref())?;
            let result = validate(&picks, parse_tie_breaker(tie_breaker.as_deref()), &data, &config);
            print_json(&result)?;
            if !result.is_valid {
                warn!("submission rejected with {} errors", result.errors.len());
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

/// Anything present but non-numeric becomes NaN so the validator reports it.
fn parse_tie_breaker(raw: Option<&str>) -> Option<f64> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    Some(raw.parse::<f64>().unwrap_or(f64::NAN))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
