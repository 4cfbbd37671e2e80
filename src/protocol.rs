use crate::debugger::DebugMode;
use crate::runtime::ExecutionResult;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Run lifecycle notifications as forwarded to a front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    Started,
    Paused,
    Resumed,
    LineHighlighted { line: u32 },
    Ended { result: ExecutionResult },
}

/// A command typed by the user while the run is paused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlCommand {
    /// Run until the next active breakpoint.
    Continue,
    /// Stop at the next pausable position.
    Step,
    Quit,
}

impl ControlCommand {
    /// The debug mode to resume in, or `None` for [`ControlCommand::Quit`].
    pub fn resume_mode(self) -> Option<DebugMode> {
        match self {
            ControlCommand::Continue => Some(DebugMode::Breakpoint),
            ControlCommand::Step => Some(DebugMode::StepOver),
            ControlCommand::Quit => None,
        }
    }
}

impl FromStr for ControlCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "c" | "continue" => Ok(ControlCommand::Continue),
            "s" | "step" | "" => Ok(ControlCommand::Step),
            "q" | "quit" => Ok(ControlCommand::Quit),
            other => Err(format!(
                "Unknown command '{}': expected c(ontinue), s(tep) or q(uit)",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_parse_commands() {
        assert_eq!("c".parse::<ControlCommand>(), Ok(ControlCommand::Continue));
        assert_eq!(" STEP \n".parse::<ControlCommand>(), Ok(ControlCommand::Step));
        assert_eq!("".parse::<ControlCommand>(), Ok(ControlCommand::Step));
        assert_eq!("quit".parse::<ControlCommand>(), Ok(ControlCommand::Quit));
        assert!("jump".parse::<ControlCommand>().is_err());
    }

    #[test]
    fn test_resume_modes() {
        assert_eq!(ControlCommand::Step.resume_mode(), Some(DebugMode::StepOver));
        assert_eq!(ControlCommand::Quit.resume_mode(), None);
    }

    #[test]
    fn test_event_serialization() {
        let json = serde_json::to_value(RunEvent::LineHighlighted { line: 3 }).unwrap();
        assert_eq!(json, serde_json::json!({"event": "line_highlighted", "line": 3}));

        let ended = RunEvent::Ended {
            result: ExecutionResult::normal(Duration::from_millis(2)),
        };
        let json = serde_json::to_value(ended).unwrap();
        assert_eq!(json["event"], "ended");
        assert_eq!(json["result"]["termination"], "normal");
    }
}
