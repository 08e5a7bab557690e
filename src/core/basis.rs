use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::core::errors::ParameterError;

/// Encoding basis of a qubit.
///
/// BB84 uses two conjugate bases:
/// - Rectilinear (`+`): $|0\rangle, |1\rangle$
/// - Diagonal (`x`): $|+\rangle, |-\rangle$
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Basis {
    #[serde(rename = "+")]
    Rectilinear,
    #[serde(rename = "x")]
    Diagonal,
}

impl Basis {
    /// Both bases, in symbol order.
    pub const ALL: [Basis; 2] = [Basis::Rectilinear, Basis::Diagonal];

    /// The conventional one-character symbol.
    pub fn symbol(self) -> char {
        match self {
            Basis::Rectilinear => '+',
            Basis::Diagonal => 'x',
        }
    }
}

impl fmt::Display for Basis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl TryFrom<char> for Basis {
    type Error = ParameterError;

    fn try_from(symbol: char) -> Result<Self, Self::Error> {
        match symbol {
            '+' => Ok(Basis::Rectilinear),
            'x' => Ok(Basis::Diagonal),
            other => Err(ParameterError::InvalidBasis(other.to_string())),
        }
    }
}

impl FromStr for Basis {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Basis::try_from(c),
            _ => Err(ParameterError::InvalidBasis(s.to_string())),
        }
    }
}
