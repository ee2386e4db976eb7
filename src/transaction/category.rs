//! The closed set of categories a transaction can belong to.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// Whether a transaction earned or spent money.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Income.
    Ganho,
    /// Expense.
    Gasto,
}

impl Category {
    /// Every category, used when an operation must touch all of them.
    pub const ALL: [Category; 2] = [Category::Ganho, Category::Gasto];

    /// The name stored in the database and the index store keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Ganho => "ganho",
            Category::Gasto => "gasto",
        }
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ganho" => Ok(Category::Ganho),
            "gasto" => Ok(Category::Gasto),
            other => Err(Error::InvalidCategory(other.to_owned())),
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
