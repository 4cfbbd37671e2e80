use serde::{Deserialize, Serialize};
use std::fmt;

/// How a run decides where it may pause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DebugMode {
    /// Waiting for a run to be started; never pauses.
    #[default]
    Stopped,
    /// Pause only on lines with an active breakpoint.
    Breakpoint,
    /// Pause at every pausable position.
    StepOver,
    /// Same pausing behavior as [`DebugMode::StepOver`].
    StepInto,
}

impl fmt::Display for DebugMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DebugMode::Stopped => "stopped",
            DebugMode::Breakpoint => "breakpoint",
            DebugMode::StepOver => "step-over",
            DebugMode::StepInto => "step-into",
        };
        write!(f, "{}", s)
    }
}

/// Active breakpoints, one flag per source line.
#[derive(Debug, Clone, Default)]
pub struct BreakpointTable {
    lines: Vec<bool>,
}

impl BreakpointTable {
    /// Create an empty table for a source of `line_count` lines.
    pub fn new(line_count: usize) -> Self {
        Self {
            lines: vec![false; line_count],
        }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Replace the active set. Lines outside the table are ignored.
    pub fn activate<I>(&mut self, lines: I)
    where
        I: IntoIterator<Item = u32>,
    {
        self.lines.iter_mut().for_each(|active| *active = false);
        for line in lines {
            if let Some(active) = self.lines.get_mut(line as usize) {
                *active = true;
            }
        }
    }

    /// Check if `line` has an active breakpoint
    pub fn is_active(&self, line: u32) -> bool {
        self.lines.get(line as usize).copied().unwrap_or(false)
    }

    /// List active lines in ascending order
    pub fn active_lines(&self) -> Vec<u32> {
        self.lines
            .iter()
            .enumerate()
            .filter(|(_, active)| **active)
            .map(|(line, _)| line as u32)
            .collect()
    }

    /// Clear all breakpoints
    pub fn clear(&mut self) {
        self.lines.iter_mut().for_each(|active| *active = false);
    }

    pub fn is_empty(&self) -> bool {
        !self.lines.iter().any(|active| *active)
    }

    /// Decide whether execution may pause at `line` under `mode`.
    pub fn should_pause(&self, mode: DebugMode, line: u32) -> bool {
        match mode {
            DebugMode::StepOver | DebugMode::StepInto => true,
            DebugMode::Breakpoint => self.is_active(line),
            DebugMode::Stopped => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activate_replaces_previous_set() {
        let mut table = BreakpointTable::new(10);
        table.activate([1, 2, 3]);
        table.activate([7]);
        assert_eq!(table.active_lines(), vec![7]);
    }

    #[test]
    fn test_out_of_range_lines_ignored() {
        let mut table = BreakpointTable::new(5);
        table.activate([2, 5, 99, u32::MAX]);
        assert_eq!(table.active_lines(), vec![2]);
        assert!(!table.is_active(99));
    }

    #[test]
    fn test_should_pause_by_mode() {
        let mut table = BreakpointTable::new(10);
        table.activate([3, 7]);

        assert!(table.should_pause(DebugMode::Breakpoint, 3));
        assert!(!table.should_pause(DebugMode::Breakpoint, 4));
        assert!(!table.should_pause(DebugMode::Breakpoint, 42));
        assert!(table.should_pause(DebugMode::StepOver, 4));
        assert!(!table.should_pause(DebugMode::Stopped, 3));
    }

    #[test]
    fn test_step_into_matches_step_over() {
        let table = BreakpointTable::new(3);
        for line in [0, 1, 2, 50] {
            assert_eq!(
                table.should_pause(DebugMode::StepInto, line),
                table.should_pause(DebugMode::StepOver, line)
            );
        }
    }

    #[test]
    fn test_clear() {
        let mut table = BreakpointTable::new(4);
        table.activate([0, 3]);
        assert!(!table.is_empty());
        table.clear();
        assert!(table.is_empty());
        assert_eq!(table.line_count(), 4);
    }
}
