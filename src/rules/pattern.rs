//! Compilation of rule patterns.
//!
//! Rule files hold JavaScript regular expressions, so patterns are compiled
//! with `regress`, an ECMAScript engine: look-around, backreferences and the
//! ASCII-only `\d`/`\w`/`\b` behave the way rule authors expect. Flag letters
//! follow JavaScript too:
//!
//! | flag | meaning                                     |
//! |------|---------------------------------------------|
//! | `i`  | case-insensitive                            |
//! | `m`  | `^`/`$` match at line boundaries            |
//! | `s`  | `.` matches `\n`                            |
//! | `u`  | Unicode mode                                |
//! | `g`  | global; meaningless for a single test       |
//! | `y`  | sticky; the match must start at offset 0    |
//!
//! Unknown or repeated flags are rejected.

use regress::Regex;
use thiserror::Error;

/// Errors compiling a rule pattern.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("Invalid flags supplied to RegExp constructor '{flags}'")]
    InvalidFlags { flags: String },

    #[error("Invalid regular expression: /{pattern}/: {source}")]
    Syntax {
        pattern: String,
        #[source]
        source: regress::Error,
    },
}

/// A compiled rule pattern.
#[derive(Debug, Clone)]
pub struct RulePattern {
    regex: Regex,
    sticky: bool,
}

#[derive(Debug, Default)]
struct Flags {
    /// Letters handed to the engine.
    engine: String,
    sticky: bool,
}

impl Flags {
    fn parse(flags: &str) -> Result<Self, PatternError> {
        let invalid = || PatternError::InvalidFlags {
            flags: flags.to_string(),
        };

        let mut seen = String::new();
        let mut parsed = Flags::default();
        for flag in flags.chars() {
            if seen.contains(flag) {
                return Err(invalid());
            }
            seen.push(flag);
            match flag {
                'i' | 'm' | 's' | 'u' => parsed.engine.push(flag),
                'y' => parsed.sticky = true,
                'g' => {}
                _ => return Err(invalid()),
            }
        }
        Ok(parsed)
    }
}

impl RulePattern {
    /// Compiles `pattern` with optional JavaScript-style `flags`.
    pub fn compile(pattern: &str, flags: Option<&str>) -> Result<Self, PatternError> {
        let flags = Flags::parse(flags.unwrap_or_default())?;

        let regex = Regex::with_flags(pattern, flags.engine.as_str()).map_err(|source| {
            PatternError::Syntax {
                pattern: pattern.to_string(),
                source,
            }
        })?;

        Ok(RulePattern {
            regex,
            sticky: flags.sticky,
        })
    }

    /// Returns true if the pattern matches `haystack`: anywhere, or at the
    /// very start for sticky patterns.
    pub fn is_match(&self, haystack: &str) -> bool {
        // Matches are leftmost, so a sticky match exists iff the first one
        // starts at 0.
        self.regex
            .find(haystack)
            .is_some_and(|m| !self.sticky || m.start() == 0)
    }
}
