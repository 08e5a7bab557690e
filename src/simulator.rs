use rand_chacha::ChaCha20Rng;

use crate::config::{ProtocolConfig, SimulationParams};
use crate::core::errors::{ParameterError, SimulationError};
use crate::protocols::bb84::{self, RunResult};
use crate::protocols::qkd::transcript::Transcript;
use crate::sampler::{RngSampler, Sampler};

/// Stateful front end over [`bb84::run`].
///
/// Holds the run parameters, the protocol configuration and its own sampler.
/// Every call to [`simulate`](Self::simulate) draws fresh randomness and
/// replaces the transcript of the previous run.
#[derive(Debug, Clone)]
pub struct Bb84Simulator<S = RngSampler<ChaCha20Rng>> {
    params: SimulationParams,
    config: ProtocolConfig,
    sampler: S,
    transcript: Option<Transcript>,
}

impl Bb84Simulator {
    /// Creates a simulator with an independently keyed ChaCha20 sampler.
    pub fn new(qubit_count: usize, eavesdropping: bool) -> Result<Self, ParameterError> {
        let params = SimulationParams::new(qubit_count, eavesdropping)?;
        Ok(Self::with_sampler(params, RngSampler::from_entropy()))
    }

    /// Creates a reproducible simulator: same seed, same results.
    pub fn seeded(
        qubit_count: usize,
        eavesdropping: bool,
        seed: u64,
    ) -> Result<Self, ParameterError> {
        let params = SimulationParams::new(qubit_count, eavesdropping)?;
        Ok(Self::with_sampler(params, RngSampler::seeded(seed)))
    }
}

impl<S: Sampler> Bb84Simulator<S> {
    /// Creates a simulator drawing from `sampler`.
    pub fn with_sampler(params: SimulationParams, sampler: S) -> Self {
        Self {
            params,
            config: ProtocolConfig::default(),
            sampler,
            transcript: None,
        }
    }

    /// Replaces the protocol configuration.
    pub fn with_config(mut self, config: ProtocolConfig) -> Result<Self, ParameterError> {
        config.validate()?;
        SimulationParams::with_minimum(
            self.params.qubit_count(),
            self.params.eavesdropping(),
            config.min_qubits,
        )?;
        self.config = config;
        Ok(self)
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    /// Runs the full protocol once.
    ///
    /// On failure the previous transcript is discarded as well, so a
    /// transcript is only ever available for the last successful run.
    pub fn simulate(&mut self) -> Result<RunResult, SimulationError> {
        self.transcript = None;
        let run = bb84::run(&self.params, &self.config, &mut self.sampler)?;
        self.transcript = Some(run.transcript);
        Ok(run.result)
    }

    /// Transcript of the last successful run.
    pub fn transcript(&self) -> Result<&Transcript, SimulationError> {
        self.transcript.as_ref().ok_or(SimulationError::NotSimulated)
    }
}
