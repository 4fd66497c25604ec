use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which list the shell currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[default]
    History,
    Screenshots,
}

impl View {
    pub fn as_str(&self) -> &'static str {
        match self {
            View::History => "history",
            View::Screenshots => "screenshots",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for View {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "history" => Ok(View::History),
            "screenshots" => Ok(View::Screenshots),
            other => Err(format!("unknown view: {}", other)),
        }
    }
}
