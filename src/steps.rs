use colored::Colorize;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StepKey {
    Welcome,
    Business,
    Vision,
    Audience,
    Style,
    Additional,
    Summary,
}

impl StepKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepKey::Welcome => "welcome",
            StepKey::Business => "business",
            StepKey::Vision => "vision",
            StepKey::Audience => "audience",
            StepKey::Style => "style",
            StepKey::Additional => "additional",
            StepKey::Summary => "summary",
        }
    }
}

impl fmt::Display for StepKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Step {
    pub key: StepKey,
    pub label: &'static str,
    pub icon: &'static str,
}

pub const STEPS: [Step; 7] = [
    Step { key: StepKey::Welcome, label: "Welcome", icon: "✦" },
    Step { key: StepKey::Business, label: "Business", icon: "▣" },
    Step { key: StepKey::Vision, label: "Vision & values", icon: "◎" },
    Step { key: StepKey::Audience, label: "Audience", icon: "☺" },
    Step { key: StepKey::Style, label: "Design & style", icon: "◐" },
    Step { key: StepKey::Additional, label: "More info", icon: "ⓘ" },
    Step { key: StepKey::Summary, label: "Summary", icon: "≡" },
];

/// Ordered steps plus a cursor that never leaves `[0, len - 1]`.
///
/// Every successful move fires the `on_move` hook, which the terminal driver
/// uses to clear the screen so the new step starts at the top.
pub struct StepSequencer {
    steps: Vec<Step>,
    index: usize,
    on_move: Box<dyn FnMut()>,
}

impl StepSequencer {
    pub fn new(steps: Vec<Step>) -> Self {
        assert!(!steps.is_empty(), "a sequencer needs at least one step");
        Self {
            steps,
            index: 0,
            on_move: Box::new(|| {}),
        }
    }

    pub fn with_move_hook(mut self, hook: impl FnMut() + 'static) -> Self {
        self.on_move = Box::new(hook);
        self
    }

    pub fn advance(&mut self) -> bool {
        if self.index + 1 >= self.steps.len() {
            return false;
        }
        self.index += 1;
        (self.on_move)();
        true
    }

    pub fn retreat(&mut self) -> bool {
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        (self.on_move)();
        true
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn active(&self) -> &Step {
        &self.steps[self.index]
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    /// Fraction of the way through, for the progress bar. A single-step
    /// sequence counts as complete.
    pub fn completion_ratio(&self) -> f32 {
        if self.steps.len() <= 1 {
            return 1.0;
        }
        self.index as f32 / (self.steps.len() - 1) as f32
    }

    /// One-line stepper: finished steps get a check mark, the active step is
    /// highlighted, the rest are dimmed.
    pub fn progress_line(&self) -> String {
        self.steps
            .iter()
            .enumerate()
            .map(|(idx, step)| {
                if idx < self.index {
                    format!("✔ {}", step.label).cyan().to_string()
                } else if idx == self.index {
                    format!("{} {}", step.icon, step.label).cyan().bold().to_string()
                } else {
                    format!("{} {}", step.icon, step.label).dimmed().to_string()
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
    }
}

impl Default for StepSequencer {
    fn default() -> Self {
        Self::new(STEPS.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn cursor_stays_in_bounds() {
        let mut seq = StepSequencer::default();
        assert!(!seq.retreat());
        assert_eq!(seq.index(), 0);

        for _ in 0..20 {
            seq.advance();
            assert!(seq.index() < seq.len());
        }
        assert_eq!(seq.index(), seq.len() - 1);
        assert!(!seq.advance());
        assert_eq!(seq.active().key, StepKey::Summary);

        for _ in 0..20 {
            seq.retreat();
        }
        assert!(seq.is_first());
        assert_eq!(seq.active().key, StepKey::Welcome);
    }

    #[test]
    fn mixed_moves_never_escape_range() {
        let mut seq = StepSequencer::default();
        let moves = [true, true, false, true, true, true, true, true, true, false, false];
        for forward in moves.iter().cycle().take(200) {
            if *forward {
                seq.advance();
            } else {
                seq.retreat();
            }
            assert!(seq.index() <= seq.len() - 1);
        }
    }

    #[test]
    fn hook_fires_only_on_real_moves() {
        let moves = Rc::new(Cell::new(0));
        let counter = Rc::clone(&moves);
        let mut seq = StepSequencer::default().with_move_hook(move || counter.set(counter.get() + 1));

        seq.retreat();
        assert_eq!(moves.get(), 0);
        seq.advance();
        seq.advance();
        seq.retreat();
        assert_eq!(moves.get(), 3);
    }

    #[test]
    fn completion_ratio_spans_zero_to_one() {
        let mut seq = StepSequencer::default();
        assert_eq!(seq.completion_ratio(), 0.0);
        seq.advance();
        seq.advance();
        seq.advance();
        assert!((seq.completion_ratio() - 0.5).abs() < f32::EPSILON);
        while seq.advance() {}
        assert_eq!(seq.completion_ratio(), 1.0);

        let single = StepSequencer::new(vec![STEPS[0]]);
        assert_eq!(single.completion_ratio(), 1.0);
    }
}
