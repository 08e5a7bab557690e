//! Simulation parameters and protocol tunables.
//!
//! `SimulationParams` describes one run (how many qubits, whether Eve is on
//! the line). `ProtocolConfig` holds the protocol constants; its defaults are
//! the standard BB84 settings used throughout the crate.

use serde::{Deserialize, Serialize};

use crate::core::errors::ParameterError;

/// Default minimum number of qubits per run.
pub const MIN_QUBITS: usize = 10;
/// Default QBER threshold; a run is secure only strictly below it.
pub const SECURITY_THRESHOLD: f64 = 0.15;
/// Default divisor for the error-estimation sample (a quarter of sifted bits).
pub const SAMPLE_DIVISOR: usize = 4;
/// Default number of leading qubits kept in the transcript.
pub const TRANSCRIPT_WINDOW: usize = 20;

/// Protocol constants for a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Error rates at or above this value mark the channel insecure.
    pub security_threshold: f64,
    /// Sample size is `max(1, sifted / sample_divisor)`.
    pub sample_divisor: usize,
    /// Number of leading qubits recorded in the transcript.
    pub transcript_window: usize,
    /// Smallest accepted qubit count.
    pub min_qubits: usize,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            security_threshold: SECURITY_THRESHOLD,
            sample_divisor: SAMPLE_DIVISOR,
            transcript_window: TRANSCRIPT_WINDOW,
            min_qubits: MIN_QUBITS,
        }
    }
}

impl ProtocolConfig {
    /// Rejects values that would make the protocol meaningless.
    pub fn validate(&self) -> Result<(), ParameterError> {
        let t = self.security_threshold;
        if !(t > 0.0 && t <= 1.0) {
            return Err(ParameterError::InvalidThreshold(t));
        }
        for (name, value) in [
            ("sample_divisor", self.sample_divisor),
            ("transcript_window", self.transcript_window),
            ("min_qubits", self.min_qubits),
        ] {
            if value == 0 {
                return Err(ParameterError::ZeroConfigValue { name });
            }
        }
        Ok(())
    }

    /// Number of sifted positions sacrificed for error estimation.
    pub fn sample_size(&self, sifted: usize) -> usize {
        (sifted / self.sample_divisor).max(1)
    }

    /// Security verdict for an estimated error rate.
    pub fn is_secure(&self, error_rate: f64) -> bool {
        error_rate < self.security_threshold
    }
}

/// Parameters of a single simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawParams")]
pub struct SimulationParams {
    qubit_count: usize,
    eavesdropping: bool,
}

impl SimulationParams {
    /// Validated parameters using the default minimum qubit count.
    pub fn new(qubit_count: usize, eavesdropping: bool) -> Result<Self, ParameterError> {
        Self::with_minimum(qubit_count, eavesdropping, MIN_QUBITS)
    }

    /// Validated parameters against an explicit minimum qubit count.
    pub fn with_minimum(
        qubit_count: usize,
        eavesdropping: bool,
        min_qubits: usize,
    ) -> Result<Self, ParameterError> {
        if qubit_count < min_qubits {
            return Err(ParameterError::TooFewQubits {
                got: qubit_count,
                min: min_qubits,
            });
        }
        Ok(Self {
            qubit_count,
            eavesdropping,
        })
    }

    /// Parses untyped input, e.g. form fields or environment values.
    ///
    /// The count must be a non-negative integer and the flag must read
    /// `true` or `false`; anything else is rejected.
    pub fn parse(qubit_count: &str, eavesdropping: &str) -> Result<Self, ParameterError> {
        let count = qubit_count
            .trim()
            .parse::<usize>()
            .map_err(|_| ParameterError::InvalidQubitCount(qubit_count.to_string()))?;
        let flag = eavesdropping
            .trim()
            .parse::<bool>()
            .map_err(|_| ParameterError::InvalidFlag(eavesdropping.to_string()))?;

        Self::new(count, flag)
    }

    pub fn qubit_count(&self) -> usize {
        self.qubit_count
    }

    pub fn eavesdropping(&self) -> bool {
        self.eavesdropping
    }
}

/// Unvalidated wire form of `SimulationParams`.
#[derive(Deserialize)]
struct RawParams {
    qubit_count: usize,
    eavesdropping: bool,
}

impl TryFrom<RawParams> for SimulationParams {
    type Error = ParameterError;

    fn try_from(raw: RawParams) -> Result<Self, Self::Error> {
        Self::new(raw.qubit_count, raw.eavesdropping)
    }
}
