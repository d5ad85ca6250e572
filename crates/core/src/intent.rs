use serde::{Deserialize, Serialize};

/// Coarse query intent, matched against an article's `Category`.
///
/// `Unknown` is a first-class value, not an error: both the ML and
/// keyword classifiers fall back to it when confidence is too low to
/// act on (see spec §4.2 / §9 Open Question 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Policy,
    Procedure,
    Reference,
    Unknown,
}

impl Intent {
    /// The article category this intent should prefer, if any.
    pub fn preferred_category(self) -> Option<Category> {
        match self {
            Intent::Policy => Some(Category::Policy),
            Intent::Procedure => Some(Category::Procedure),
            Intent::Reference => Some(Category::Reference),
            Intent::Unknown => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Intent::Policy => "policy",
            Intent::Procedure => "procedure",
            Intent::Reference => "reference",
            Intent::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Article category. `Other` preserves whatever label the store has
/// without forcing every deployment into the three intent buckets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Policy,
    Procedure,
    Reference,
    Other(String),
}

impl Category {
    pub fn as_str(&self) -> &str {
        match self {
            Category::Policy => "policy",
            Category::Procedure => "procedure",
            Category::Reference => "reference",
            Category::Other(s) => s.as_str(),
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "policy" => Category::Policy,
            "procedure" => Category::Procedure,
            "reference" => Category::Reference,
            other => Category::Other(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_has_no_preferred_category() {
        assert_eq!(Intent::Unknown.preferred_category(), None);
    }

    #[test]
    fn category_round_trips_known_labels() {
        assert_eq!(Category::from_str("policy"), Category::Policy);
        assert_eq!(Category::from_str("widget"), Category::Other("widget".into()));
    }
}
