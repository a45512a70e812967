//! Spending categories attached to transactions after extraction

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    #[serde(rename = "food")]
    Food,
    #[serde(rename = "groceries")]
    Groceries,
    #[serde(rename = "shopping")]
    Shopping,
    #[serde(rename = "transport")]
    Transport,
    #[serde(rename = "bills")]
    Bills,
    #[serde(rename = "entertainment")]
    Entertainment,
    #[serde(rename = "health")]
    Health,
    #[serde(rename = "education")]
    Education,
    #[serde(rename = "transfer")]
    Transfer,
    #[serde(rename = "income")]
    Income,
    #[serde(rename = "other")]
    Other,
}

impl Category {
    pub const ALL: [Category; 11] = [
        Category::Food,
        Category::Groceries,
        Category::Shopping,
        Category::Transport,
        Category::Bills,
        Category::Entertainment,
        Category::Health,
        Category::Education,
        Category::Transfer,
        Category::Income,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "food",
            Category::Groceries => "groceries",
            Category::Shopping => "shopping",
            Category::Transport => "transport",
            Category::Bills => "bills",
            Category::Entertainment => "entertainment",
            Category::Health => "health",
            Category::Education => "education",
            Category::Transfer => "transfer",
            Category::Income => "income",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown category: {}", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for Category {
    type Err = UnknownCategory;

    /// Case-insensitive; tolerates surrounding quotes and punctuation
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cleaned = s
            .trim()
            .trim_matches(|c: char| !c.is_ascii_alphanumeric())
            .to_ascii_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == cleaned)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_lenient() {
        assert_eq!("Food".parse::<Category>(), Ok(Category::Food));
        assert_eq!(" \"groceries\". ".parse::<Category>(), Ok(Category::Groceries));
        assert!("rent".parse::<Category>().is_err());
    }

    #[test]
    fn test_display_round_trips_through_from_str() {
        for c in Category::ALL {
            assert_eq!(c.to_string().parse::<Category>(), Ok(c));
        }
    }
}
