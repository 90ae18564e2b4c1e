use jollof_persist::StepPosition;
use serde::{Deserialize, Serialize};

/// Movement requested by a cook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Next,
    Previous,
    Repeat,
}

/// Map free text to a direction; anything unrecognised repeats the step
pub fn parse_command(command: &str) -> Direction {
    let command = command.to_lowercase();
    if command.contains("next") {
        Direction::Next
    } else if command.contains("previous") || command.contains("back") {
        Direction::Previous
    } else {
        Direction::Repeat
    }
}

/// Words a chat message may follow its step keyword with
const COMMAND_TAIL: &[&str] = &["step", "please", "one", "again", "that"];

/// Read a chat message as a step command
///
/// Only short messages that lead with a keyword count ("next", "Back please",
/// "repeat that"); questions mentioning a keyword mid-sentence go to the
/// assistant.
pub fn step_command(message: &str) -> Option<Direction> {
    let lowered = message.to_lowercase();
    let mut words = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty());

    let direction = match words.next()? {
        "next" => Direction::Next,
        "previous" | "back" => Direction::Previous,
        "repeat" => Direction::Repeat,
        _ => return None,
    };
    words.all(|w| COMMAND_TAIL.contains(&w)).then_some(direction)
}

impl Direction {
    /// Position after applying this direction to a list of `len` steps
    ///
    /// The index never leaves `0..len`; passing the last step (or `next` on an
    /// empty list) sets `completed` instead.
    pub fn apply(self, position: StepPosition, len: usize) -> StepPosition {
        match self {
            Self::Next if position.completed => position,
            Self::Next if position.current_step + 1 < len => StepPosition {
                current_step: position.current_step + 1,
                completed: false,
            },
            Self::Next => StepPosition {
                current_step: position.current_step,
                completed: true,
            },
            Self::Previous if position.completed => StepPosition {
                current_step: position.current_step,
                completed: false,
            },
            Self::Previous => StepPosition {
                current_step: position.current_step.saturating_sub(1),
                completed: false,
            },
            Self::Repeat => position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(step: usize, completed: bool) -> StepPosition {
        StepPosition {
            current_step: step,
            completed,
        }
    }

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("Next step please"), Direction::Next);
        assert_eq!(parse_command("go BACK"), Direction::Previous);
        assert_eq!(parse_command("previous"), Direction::Previous);
        assert_eq!(parse_command("say that again"), Direction::Repeat);
        // first match wins
        assert_eq!(parse_command("next, not back"), Direction::Next);
    }

    #[test]
    fn test_next_reaches_completion_once() {
        let mut pos = StepPosition::start();
        let mut completions = 0;
        for _ in 0..6 {
            let next = Direction::Next.apply(pos, 3);
            if next.completed && !pos.completed {
                completions += 1;
            }
            assert!(next.current_step < 3);
            pos = next;
        }
        assert_eq!(completions, 1);
        assert_eq!(pos, at(2, true));
    }

    #[test]
    fn test_next_on_empty_steps_completes() {
        assert_eq!(Direction::Next.apply(StepPosition::start(), 0), at(0, true));
    }

    #[test]
    fn test_previous_never_underflows() {
        assert_eq!(Direction::Previous.apply(StepPosition::start(), 3), at(0, false));
        assert_eq!(Direction::Previous.apply(at(2, false), 3), at(1, false));
    }

    #[test]
    fn test_previous_after_completion_returns_to_last_step() {
        assert_eq!(Direction::Previous.apply(at(2, true), 3), at(2, false));
    }

    #[test]
    fn test_repeat_keeps_position() {
        assert_eq!(Direction::Repeat.apply(at(1, false), 3), at(1, false));
        assert_eq!(Direction::Repeat.apply(at(2, true), 3), at(2, true));
    }

    #[test]
    fn test_step_command_detection() {
        assert_eq!(step_command("next"), Some(Direction::Next));
        assert_eq!(step_command("  Next step, please!"), Some(Direction::Next));
        assert_eq!(step_command("Back"), Some(Direction::Previous));
        assert_eq!(step_command("previous step"), Some(Direction::Previous));
        assert_eq!(step_command("Repeat that"), Some(Direction::Repeat));
        assert_eq!(step_command("how much salt?"), None);
        assert_eq!(step_command(""), None);
    }

    #[test]
    fn test_questions_with_keywords_are_not_commands() {
        assert_eq!(step_command("Should I put the lid back on the pot?"), None);
        assert_eq!(step_command("What comes next after frying?"), None);
        assert_eq!(step_command("next time, which rice is best?"), None);
        assert_eq!(step_command("go back"), None);
    }
}
