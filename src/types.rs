/// Shared types used across the codebase

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Coarse account role, stored as "0" / "1" / "2" by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classify {
    Admin,
    Partner,
    Store,
}

impl Classify {
    pub fn code(&self) -> &'static str {
        match self {
            Classify::Admin => "0",
            Classify::Partner => "1",
            Classify::Store => "2",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Classify::Admin => "admin",
            Classify::Partner => "partner",
            Classify::Store => "store",
        }
    }
}

impl FromStr for Classify {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "0" | "admin" => Ok(Classify::Admin),
            "1" | "partner" => Ok(Classify::Partner),
            "2" | "store" => Ok(Classify::Store),
            other => Err(format!("unknown classify code '{}'", other)),
        }
    }
}

impl fmt::Display for Classify {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for Classify {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for Classify {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Partner tier code `p1`..`p12` (`p0` is accepted for headquarters accounts)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rate(u8);

impl Rate {
    pub const MAX_TIER: u8 = 12;

    pub fn new(tier: u8) -> Option<Self> {
        (tier <= Self::MAX_TIER).then_some(Self(tier))
    }

    pub fn tier(&self) -> u8 {
        self.0
    }

    /// Human label for the two named tiers; deeper tiers are shown by code
    pub fn label(&self) -> String {
        match self.0 {
            1 => "distributor".to_string(),
            2 => "agency".to_string(),
            n => format!("p{}", n),
        }
    }
}

impl FromStr for Rate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .trim()
            .strip_prefix('p')
            .ok_or_else(|| format!("rate '{}' must look like p1..p12", s))?;
        let tier: u8 = digits
            .parse()
            .map_err(|_| format!("rate '{}' must look like p1..p12", s))?;
        Rate::new(tier).ok_or_else(|| format!("rate '{}' is beyond p{}", s, Self::MAX_TIER))
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

impl Serialize for Rate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
