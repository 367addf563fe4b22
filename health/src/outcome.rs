use std::fmt;

/// Tri-state result of a single probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The precondition holds
    Pass,
    /// The precondition is violated
    Fail,
    /// The probe could not be evaluated (missing tool, unreadable source)
    Indeterminate,
}

impl Outcome {
    /// `Pass` when `value >= minimum`, `Fail` otherwise
    pub fn at_least(value: f64, minimum: f64) -> Self {
        if value >= minimum {
            Outcome::Pass
        } else {
            Outcome::Fail
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Outcome::Pass => "✅",
            Outcome::Fail => "❌",
            Outcome::Indeterminate => "⚠️ ",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Pass => "passed",
            Outcome::Fail => "failed",
            Outcome::Indeterminate => "warning",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
