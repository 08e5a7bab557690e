//! Per-qubit transcript of a BB84 run, for timeline visualizations.

use serde::Serialize;

use crate::core::Basis;

/// What Eve saw and resent for one qubit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Interception {
    /// Basis Eve measured in, and resent in.
    pub basis: Basis,
    /// Bit Eve measured, and resent.
    pub bit: u8,
}

/// One transmitted qubit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QubitEvent {
    pub index: usize,
    pub alice_bit: u8,
    pub alice_basis: Basis,
    pub bob_basis: Basis,
    pub bob_bit: u8,
    pub matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eve: Option<Interception>,
}

impl QubitEvent {
    /// Display label, counting from one.
    pub fn label(&self) -> String {
        format!("Qubit {}", self.index + 1)
    }
}

/// The first few qubit events of a single run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Transcript {
    events: Vec<QubitEvent>,
}

impl Transcript {
    pub(crate) fn new(events: Vec<QubitEvent>) -> Self {
        Self { events }
    }

    pub fn events(&self) -> &[QubitEvent] {
        &self.events
    }

    pub fn iter(&self) -> std::slice::Iter<'_, QubitEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of recorded qubits whose bases agreed.
    pub fn matched_count(&self) -> usize {
        self.events.iter().filter(|e| e.matched).count()
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a QubitEvent;
    type IntoIter = std::slice::Iter<'a, QubitEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
