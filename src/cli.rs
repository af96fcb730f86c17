use anyhow::bail;
use pico_args::Arguments;
use std::path::PathBuf;

#[derive(Debug, PartialEq)]
pub enum Command {
    Help,
    Version,
    Build {
        tournament: Option<PathBuf>,
    },
    Favorites {
        tournament: Option<PathBuf>,
    },
    Propagate {
        tournament: Option<PathBuf>,
        picks: PathBuf,
    },
    Validate {
        tournament: Option<PathBuf>,
        picks: PathBuf,
        /// Kept raw so a non-numeric value reaches the validator instead of failing here.
        tie_breaker: Option<String>,
        config: Option<PathBuf>,
    },
}

pub fn parse(mut args: Arguments) -> anyhow::Result<Command> {
    // Help and version win over everything else on the line.
    if args.contains(["-h", "--help"]) {
        return Ok(Command::Help);
    }
    if args.contains(["-V", "--version"]) {
        return Ok(Command::Version);
    }

    let command = match args.subcommand()?.as_deref() {
        None => Command::Help,
        Some("build") => Command::Build {
            tournament: args.opt_value_from_str("--tournament")?,
        },
        Some("favorites") => Command::Favorites {
            tournament: args.opt_value_from_str("--tournament")?,
        },
        Some("propagate") => Command::Propagate {
            tournament: args.opt_value_from_str("--tournament")?,
            picks: args.value_from_str("--picks")?,
        },
        Some("validate") => Command::Validate {
            tournament: args.opt_value_from_str("--tournament")?,
            picks: args.value_from_str("--picks")?,
            tie_breaker: args.opt_value_from_str("--tie-breaker")?,
            config: args.opt_value_from_str("--config")?,
        },
        Some(other) => bail!("Unknown command: {other}"),
    };

    let rest = args.finish();
    if !rest.is_empty() {
        bail!("Unexpected arguments: {rest:?}");
    }

    Ok(command)
}

pub fn usage_text() -> &'static str {
    "pickem - build, fill in, and check 64-team tournament brackets

Usage:
  pickem build      [--tournament FILE]
  pickem favorites  [--tournament FILE]
  pickem propagate  --picks FILE [--tournament FILE]
  pickem validate   --picks FILE --tie-breaker N [--config FILE] [--tournament FILE]
  pickem --help
  pickem --version

Commands:
  build       Print the empty bracket for the field
  favorites   Print a complete set of picks where the better seed always wins
  propagate   Print the bracket with picks carried forward, plus progress
  validate    Check a submission; exits with status 1 when it is rejected

Environment:
  PICKEM_TOURNAMENT_JSON   Tournament field used when --tournament is omitted
                           (default: embedded 2025 field)
  PICKEM_SITE_CONFIG       Site config used when --config is omitted
  RUST_LOG                 Log filter, e.g. RUST_LOG=debug"
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    fn args(list: &[&str]) -> Arguments {
        Arguments::from_vec(list.iter().map(OsString::from).collect())
    }

    #[test]
    fn no_arguments_prints_help() {
        assert_eq!(parse(args(&[])).unwrap(), Command::Help);
    }

    #[test]
    fn help_wins_over_subcommand() {
        assert_eq!(parse(args(&["validate", "--help"])).unwrap(), Command::Help);
        assert_eq!(parse(args(&["-V"])).unwrap(), Command::Version);
    }

    #[test]
    fn validate_collects_all_options() {
        let command = parse(args(&[
            "validate",
            "--picks",
            "picks.json",
            "--tie-breaker",
            "abc",
            "--config",
            "site.json",
        ]))
        .unwrap();
        assert_eq!(
            command,
            Command::Validate {
                tournament: None,
                picks: PathBuf::from("picks.json"),
                tie_breaker: Some("abc".into()),
                config: Some(PathBuf::from("site.json")),
            }
        );
    }

    #[test]
    fn propagate_requires_picks() {
        assert!(parse(args(&["propagate", "--tournament", "field.json"])).is_err());
    }

    #[test]
    fn unknown_command_and_stray_arguments_are_rejected() {
        assert!(parse(args(&["score"])).is_err());
        assert!(parse(args(&["build", "extra"])).is_err());
    }
}
