use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which persistent PATH a change targets.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    User,
    System,
}

impl Scope {
    /// Lookup order when looking for a persistent default.
    pub const ALL: [Scope; 2] = [Scope::User, Scope::System];

    pub fn as_str(self) -> &'static str {
        match self {
            Scope::User => "user",
            Scope::System => "system",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Scope::User),
            "system" | "machine" => Ok(Scope::System),
            other => Err(format!("unknown scope: {other}")),
        }
    }
}
