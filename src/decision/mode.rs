//! Operating modes and verdicts.

use serde::{Deserialize, Serialize};

/// Operating mode selected by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Day,
    Night,
    /// Statistics only; never asserts pass or fail.
    Inspect,
}

impl Mode {
    #[inline]
    pub fn is_judging(self) -> bool {
        self != Mode::Inspect
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Mode::Day => "day",
            Mode::Night => "night",
            Mode::Inspect => "inspect",
        })
    }
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "day" => Ok(Mode::Day),
            "night" => Ok(Mode::Night),
            "inspect" => Ok(Mode::Inspect),
            other => Err(format!("unknown mode '{other}' (expected day, night or inspect)")),
        }
    }
}

/// Pass/fail outcome of a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Verdict {
    Ok,
    NotOk,
    /// Produced only in inspect mode.
    Inconclusive,
}

impl Verdict {
    /// Short mark stamped on captures and shown on the badge.
    pub fn mark(self) -> &'static str {
        match self {
            Verdict::Ok => "OK",
            Verdict::NotOk => "NG?",
            Verdict::Inconclusive => "DBG",
        }
    }

    #[inline]
    pub fn is_ok(self) -> bool {
        self == Verdict::Ok
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mark())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parse() {
        assert_eq!("Night".parse::<Mode>(), Ok(Mode::Night));
        assert!("dusk".parse::<Mode>().is_err());
        assert!(!Mode::Inspect.is_judging());
    }

    #[test]
    fn test_marks() {
        assert_eq!(Verdict::Ok.to_string(), "OK");
        assert_eq!(Verdict::NotOk.mark(), "NG?");
        assert_eq!(Verdict::Inconclusive.mark(), "DBG");
    }
}
