use std::fmt;

use thiserror::Error;

/// Invalid input to the engine: construction parameters, configuration,
/// or values handed to the measurement model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    #[error("Number of qubits must be at least {min}, got {got}")]
    TooFewQubits { got: usize, min: usize },

    #[error("Number of qubits must be a non-negative integer, got {0:?}")]
    InvalidQubitCount(String),

    #[error("Eavesdropping must be a boolean value, got {0:?}")]
    InvalidFlag(String),

    #[error("Bit value must be 0 or 1, got {0}")]
    InvalidBit(u8),

    #[error("Invalid basis {0:?}, expected '+' or 'x'")]
    InvalidBasis(String),

    #[error("Security threshold must be in (0, 1], got {0}")]
    InvalidThreshold(f64),

    #[error("{name} must be at least 1")]
    ZeroConfigValue { name: &'static str },

    #[error("Sample position {index} out of range for {len} sifted bits")]
    SampleOutOfRange { index: usize, len: usize },

    #[error("Duplicate sample position: {0}")]
    DuplicateSample(usize),

    #[error("Sequence length mismatch: expected {expected}, got {got}")]
    LengthMismatch { expected: usize, got: usize },
}

/// Pipeline stage a failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Transmission,
    Sifting,
    Estimation,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Transmission => "transmission",
            Self::Sifting => "sifting",
            Self::Estimation => "error estimation",
        };
        f.write_str(name)
    }
}

/// Failure of a simulation run. A run either yields a complete result or
/// one of these, never a partial result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(#[from] ParameterError),

    #[error("empty sift set: no positions where Alice's and Bob's bases agree")]
    EmptySiftSet,

    #[error("Error during {stage}: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: ParameterError,
    },

    #[error("No simulation has been run yet")]
    NotSimulated,
}

impl SimulationError {
    /// The stage a wrapped failure came from, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

/// Attaches stage context to a fallible stage operation.
pub(crate) trait InStage<T> {
    fn in_stage(self, stage: Stage) -> Result<T, SimulationError>;
}

impl<T> InStage<T> for Result<T, ParameterError> {
    fn in_stage(self, stage: Stage) -> Result<T, SimulationError> {
        self.map_err(|source| SimulationError::Stage { stage, source })
    }
}
