//! Text control protocol.
//!
//! Three verbs, case-insensitive, whitespace separated:
//!
//! ```text
//! PAUSE
//! SPEED <float>
//! SEEK [+|-||]<frames>
//! ```
//!
//! A seek without a sign is absolute; `+` and `-` are relative to the
//! playhead and `|` counts back from the live end of the index.

use replay_core::{ReplayError, Result};
use replay_media::SeekMode;
use std::fmt;
use std::str::FromStr;

/// Where to seek, in frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeekTarget {
    pub amount: u64,
    pub mode: SeekMode,
}

impl SeekTarget {
    pub fn absolute(amount: u64) -> Self {
        Self {
            amount,
            mode: SeekMode::Absolute,
        }
    }

    pub fn from_end(amount: u64) -> Self {
        Self {
            amount,
            mode: SeekMode::FromEnd,
        }
    }

    /// Parse the argument of a `SEEK` command.
    pub fn parse(arg: &str) -> Result<Self> {
        let (mode, digits) = match arg.chars().next() {
            Some('+') => (SeekMode::RelativeForward, &arg[1..]),
            Some('-') => (SeekMode::RelativeBackward, &arg[1..]),
            Some('|') => (SeekMode::FromEnd, &arg[1..]),
            _ => (SeekMode::Absolute, arg),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid(format!("Bad seek position '{}'", arg)));
        }
        let amount = digits
            .parse()
            .map_err(|_| invalid(format!("Seek position '{}' out of range", arg)))?;
        Ok(Self { amount, mode })
    }

    /// Parse a start position given at construction: absolute or from-end only.
    pub fn parse_start(arg: &str) -> Result<Self> {
        let target = Self::parse(arg)?;
        match target.mode {
            SeekMode::Absolute | SeekMode::FromEnd => Ok(target),
            _ => Err(invalid(format!(
                "Start position '{}' must be absolute or from the end",
                arg
            ))),
        }
    }
}

impl fmt::Display for SeekTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = match self.mode {
            SeekMode::Absolute => "",
            SeekMode::RelativeForward => "+",
            SeekMode::RelativeBackward => "-",
            SeekMode::FromEnd => "|",
        };
        write!(f, "{}{}", sign, self.amount)
    }
}

/// A parsed control command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReplayCommand {
    Pause,
    Speed(f64),
    Seek(SeekTarget),
}

impl FromStr for ReplayCommand {
    type Err = ReplayError;

    fn from_str(line: &str) -> Result<Self> {
        let mut tokens = line.split_whitespace();
        let verb = tokens
            .next()
            .ok_or_else(|| invalid("Empty command".to_string()))?;
        let arg = tokens.next();
        if tokens.next().is_some() {
            return Err(invalid(format!("Trailing arguments in '{}'", line.trim())));
        }

        if verb.eq_ignore_ascii_case("PAUSE") {
            return match arg {
                None => Ok(Self::Pause),
                Some(_) => Err(invalid("PAUSE takes no argument".to_string())),
            };
        }

        if verb.eq_ignore_ascii_case("SPEED") {
            let value = arg.ok_or_else(|| invalid("SPEED needs a value".to_string()))?;
            if !value
                .bytes()
                .all(|b| b.is_ascii_digit() || b == b'.' || b == b'-')
            {
                return Err(invalid(format!("Bad speed '{}'", value)));
            }
            let speed: f64 = value
                .parse()
                .map_err(|_| invalid(format!("Bad speed '{}'", value)))?;
            return Ok(Self::Speed(speed));
        }

        if verb.eq_ignore_ascii_case("SEEK") {
            let value = arg.ok_or_else(|| invalid("SEEK needs a position".to_string()))?;
            return SeekTarget::parse(value).map(Self::Seek);
        }

        Err(invalid(format!("Unknown command '{}'", verb)))
    }
}

impl fmt::Display for ReplayCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pause => f.write_str("PAUSE"),
            Self::Speed(speed) => write!(f, "SPEED {}", speed),
            Self::Seek(target) => write!(f, "SEEK {}", target),
        }
    }
}

fn invalid(msg: String) -> ReplayError {
    ReplayError::InvalidArgument(msg)
}
