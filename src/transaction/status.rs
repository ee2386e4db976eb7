//! Payment status of a transaction.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// Whether a transaction has been settled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// Paid. New transactions are paid unless stated otherwise.
    #[default]
    Pago,
    /// Pending.
    Pendente,
    /// Late.
    Atrasado,
}

impl Status {
    /// The name stored in the database and the index store.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pago => "Pago",
            Status::Pendente => "Pendente",
            Status::Atrasado => "Atrasado",
        }
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pago" => Ok(Status::Pago),
            "Pendente" => Ok(Status::Pendente),
            "Atrasado" => Ok(Status::Atrasado),
            other => Err(Error::InvalidStatus(other.to_owned())),
        }
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
