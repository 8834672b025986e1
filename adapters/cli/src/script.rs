//! Scripted keyboard input for the player.

use std::collections::VecDeque;

use cubesnake_core::{StrategyKind, TurnCommand};
use thiserror::Error;

/// Key that leaves the player's course unchanged for one move.
const IDLE_KEY: char = '.';

/// Failure to interpret a key script.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum ScriptError {
    #[error("unknown key `{key}` at position {position}")]
    UnknownKey { key: char, position: usize },
}

/// One entry per player move; `None` means the move happens without input.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct KeyScript {
    steps: VecDeque<Option<TurnCommand>>,
}

impl KeyScript {
    /// Parses keys `w s a d e q 1 2` and the idle key `.`, ignoring whitespace.
    pub(crate) fn parse(keys: &str) -> Result<Self, ScriptError> {
        let steps = keys
            .chars()
            .enumerate()
            .filter(|(_, key)| !key.is_whitespace())
            .map(|(position, key)| {
                if key == IDLE_KEY {
                    return Ok(None);
                }
                turn_for_key(key)
                    .map(Some)
                    .ok_or(ScriptError::UnknownKey { key, position })
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { steps })
    }

    /// Takes the input for the next move, or `None` once the script ran out.
    pub(crate) fn next_step(&mut self) -> Option<Option<TurnCommand>> {
        self.steps.pop_front()
    }
}

fn turn_for_key(key: char) -> Option<TurnCommand> {
    let command = match key.to_ascii_lowercase() {
        'a' => TurnCommand::TurnLeft,
        'd' => TurnCommand::TurnRight,
        'w' => TurnCommand::PitchUp,
        's' => TurnCommand::PitchDown,
        'e' => TurnCommand::RollLeft,
        'q' => TurnCommand::RollRight,
        '1' => TurnCommand::SwitchStrategy(StrategyKind::GravityLocked),
        '2' => TurnCommand::SwitchStrategy(StrategyKind::FreeRoam),
        _ => return None,
    };
    Some(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_keys_and_idle_steps() {
        let mut script = KeyScript::parse("d . W 2").expect("valid script");
        assert_eq!(script.next_step(), Some(Some(TurnCommand::TurnRight)));
        assert_eq!(script.next_step(), Some(None));
        assert_eq!(script.next_step(), Some(Some(TurnCommand::PitchUp)));
        assert_eq!(
            script.next_step(),
            Some(Some(TurnCommand::SwitchStrategy(StrategyKind::FreeRoam)))
        );
        assert_eq!(script.next_step(), None);
    }

    #[test]
    fn reports_unknown_key_position() {
        assert_eq!(
            KeyScript::parse("ad x"),
            Err(ScriptError::UnknownKey {
                key: 'x',
                position: 3
            })
        );
    }
}
