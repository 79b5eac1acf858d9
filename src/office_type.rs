//! Office kind inferred from the office name.
//!
//! No kind is stored; names are matched against a few substrings, which is an
//! approximation ("Township" also matches the township/town patterns, a city
//! "Building Department" also matches the state patterns).

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfficeType {
    County,
    City,
    State,
    Township,
}

impl OfficeType {
    pub const ALL: [OfficeType; 4] = [
        OfficeType::County,
        OfficeType::City,
        OfficeType::State,
        OfficeType::Township,
    ];

    /// Lowercase name substrings indicating this kind.
    pub fn patterns(&self) -> &'static [&'static str] {
        match self {
            OfficeType::County => &["county", "co."],
            OfficeType::City => &["city", "municipal"],
            OfficeType::State => &["state", "department"],
            OfficeType::Township => &["township", "town"],
        }
    }

    /// Parses a query value; `None` for "all" or anything unknown.
    pub fn parse_filter(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "county" => Some(OfficeType::County),
            "city" => Some(OfficeType::City),
            "state" => Some(OfficeType::State),
            "township" => Some(OfficeType::Township),
            _ => None,
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.patterns().iter().any(|p| name.contains(p))
    }

    /// First kind, in declaration order, whose patterns match `name`.
    pub fn classify(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.matches(name))
    }
}
