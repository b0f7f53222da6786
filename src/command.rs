//! The `inspectet` command line:
//!
//! ```text
//! inspectet play [framesPerView N] [loopNumber M]
//! ```
//!
//! Keywords are matched case-insensitively and may come in any order.

use std::str::FromStr;

use crate::error::InspectError;
use crate::playback::PlayArgs;

const PREFIX: &str = "inspectet";

/// A parsed inspector command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InspectCommand {
    /// Play back the loaded alignment.
    Play(PlayArgs),
}

impl InspectCommand {
    /// Parse `line`, filling omitted keywords from `defaults`.
    ///
    /// # Errors
    ///
    /// Returns [`InspectError::Command`] for an unknown command or keyword, or
    /// a missing or non-integer value.
    pub fn parse_with(
        line: &str,
        defaults: PlayArgs,
    ) -> Result<Self, InspectError> {
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some(t) if t.eq_ignore_ascii_case(PREFIX) => {}
            Some(t) => {
                return Err(InspectError::Command(format!(
                    "unknown command {t:?}"
                )))
            }
            None => {
                return Err(InspectError::Command("empty command".to_owned()))
            }
        }
        match tokens.next() {
            Some(t) if t.eq_ignore_ascii_case("play") => {}
            Some(t) => {
                return Err(InspectError::Command(format!(
                    "unknown subcommand {t:?}, expected \"play\""
                )))
            }
            None => {
                return Err(InspectError::Command(
                    "missing subcommand, expected \"play\"".to_owned(),
                ))
            }
        }

        let mut args = defaults;
        while let Some(keyword) = tokens.next() {
            let slot = if keyword.eq_ignore_ascii_case("framesPerView") {
                &mut args.frames_per_view
            } else if keyword.eq_ignore_ascii_case("loopNumber") {
                &mut args.loop_number
            } else {
                return Err(InspectError::Command(format!(
                    "unknown keyword {keyword:?}"
                )));
            };
            let value = tokens.next().ok_or_else(|| {
                InspectError::Command(format!("{keyword} needs a value"))
            })?;
            *slot = value.parse().map_err(|_| {
                InspectError::Command(format!(
                    "{keyword} expects an integer, got {value:?}"
                ))
            })?;
        }
        Ok(Self::Play(args))
    }
}

impl FromStr for InspectCommand {
    type Err = InspectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_with(s, PlayArgs::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(frames_per_view: i64, loop_number: i64) -> InspectCommand {
        InspectCommand::Play(PlayArgs {
            frames_per_view,
            loop_number,
        })
    }

    #[test]
    fn defaults_apply() {
        assert_eq!(
            "inspectet play".parse::<InspectCommand>().unwrap(),
            play(10, 1)
        );
    }

    #[test]
    fn keywords_any_order_any_case() {
        let a: InspectCommand = "inspectet play framesPerView 5 loopNumber 3"
            .parse()
            .unwrap();
        let b: InspectCommand = "InspectET PLAY loopnumber 3 FRAMESPERVIEW 5"
            .parse()
            .unwrap();
        assert_eq!(a, play(5, 3));
        assert_eq!(a, b);
    }

    #[test]
    fn negative_values_parse_for_later_checks() {
        let cmd: InspectCommand =
            "inspectet play loopNumber 0".parse().unwrap();
        assert_eq!(cmd, play(10, 0));
        let cmd: InspectCommand =
            "inspectet play framesPerView -2".parse().unwrap();
        assert_eq!(cmd, play(-2, 1));
    }

    #[test]
    fn rejects_bad_input() {
        for line in [
            "",
            "inspect play",
            "inspectet",
            "inspectet stop",
            "inspectet play speed 2",
            "inspectet play loopNumber",
            "inspectet play loopNumber two",
            "inspectet play framesPerView 1.5",
        ] {
            assert!(
                matches!(
                    line.parse::<InspectCommand>(),
                    Err(InspectError::Command(_))
                ),
                "{line:?}"
            );
        }
    }

    #[test]
    fn custom_defaults() {
        let defaults = PlayArgs {
            frames_per_view: 2,
            loop_number: 4,
        };
        let cmd =
            InspectCommand::parse_with("inspectet play loopNumber 1", defaults)
                .unwrap();
        assert_eq!(cmd, play(2, 1));
    }
}
