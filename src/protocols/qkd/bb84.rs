//! BB84 Quantum Key Distribution Protocol.
//!
//! Bennett and Brassard's 1984 protocol. Alice encodes random bits in random
//! bases, Bob measures in random bases, and both keep only the positions where
//! their bases agreed. A random quarter of that sifted key is published to
//! estimate the error rate; the rest becomes the key if the error rate is low
//! enough.
//!
//! An intercept-resend eavesdropper measures every qubit in a basis of her
//! own choosing and resends it in that basis, which corrupts about a quarter
//! of the sifted bits.

use serde::Serialize;
use tracing::{debug, info, trace};

use crate::config::{ProtocolConfig, SimulationParams};
use crate::core::errors::{InStage, ParameterError, SimulationError, Stage};
use crate::core::{Basis, measure_all};
use crate::protocols::qkd::transcript::{Interception, QubitEvent, Transcript};
use crate::sampler::Sampler;

/// BB84 results
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunResult {
    /// Number of qubits Alice sent.
    pub total_qubits: usize,
    /// Number of positions where Alice's and Bob's bases matched.
    pub sifted_bits: usize,
    /// Number of sifted positions published for error estimation.
    pub sample_size: usize,
    /// Number of sampled positions where Alice and Bob disagree.
    pub sample_errors: usize,
    /// `sample_errors / sample_size`, in [0, 1].
    pub error_rate: f64,
    /// Length of the derived key, whether or not it is released.
    pub final_key_length: usize,
    /// The key as a string of '0'/'1', present only when `secure`.
    pub final_key: Option<String>,
    /// Error rate strictly below the security threshold.
    pub secure: bool,
}

impl RunResult {
    /// Zero and one counts of the released key.
    pub fn key_composition(&self) -> Option<KeyComposition> {
        let key = self.final_key.as_deref()?;
        let ones = key.bytes().filter(|&b| b == b'1').count();
        Some(KeyComposition {
            zeros: key.len() - ones,
            ones,
        })
    }
}

/// Bit balance of a final key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KeyComposition {
    pub zeros: usize,
    pub ones: usize,
}

impl KeyComposition {
    /// Fraction of zero bits, 0 for an empty key.
    pub fn zero_ratio(&self) -> f64 {
        let total = self.zeros + self.ones;
        if total == 0 {
            0.0
        } else {
            self.zeros as f64 / total as f64
        }
    }

    /// Fraction of one bits, 0 for an empty key.
    pub fn one_ratio(&self) -> f64 {
        let total = self.zeros + self.ones;
        if total == 0 {
            0.0
        } else {
            self.ones as f64 / total as f64
        }
    }
}

/// Result record plus the transcript of the same run.
#[derive(Debug, Clone, PartialEq)]
pub struct Bb84Run {
    pub result: RunResult,
    pub transcript: Transcript,
}

/// Alice's prepared qubits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub bits: Vec<u8>,
    pub bases: Vec<Basis>,
}

/// Eve's measurement record. She resends `bits[i]` encoded in `bases[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interceptor {
    pub bases: Vec<Basis>,
    pub bits: Vec<u8>,
}

/// Alice's and Bob's bits at the positions where their bases agreed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiftedKey {
    /// Original qubit index of each sifted position.
    pub positions: Vec<usize>,
    pub alice: Vec<u8>,
    pub bob: Vec<u8>,
}

impl SiftedKey {
    pub fn len(&self) -> usize {
        self.alice.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alice.is_empty()
    }
}

/// Outcome of the published error check.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorEstimate {
    /// Sampled positions within the sifted key (not original qubit indices).
    pub sample: Vec<usize>,
    pub errors: usize,
    pub error_rate: f64,
}

/// Draws `n` uniformly random bits.
pub fn generate_random_bits<S: Sampler + ?Sized>(sampler: &mut S, n: usize) -> Vec<u8> {
    (0..n).map(|_| sampler.random_bit()).collect()
}

/// Draws `n` uniformly random bases.
pub fn generate_random_bases<S: Sampler + ?Sized>(sampler: &mut S, n: usize) -> Vec<Basis> {
    (0..n).map(|_| sampler.random_basis()).collect()
}

/// Eve measures each of Alice's qubits in `eve_bases`.
///
/// What she sends on is a fresh qubit carrying her own outcome in her own
/// basis, not Alice's original.
pub fn intercept_resend<S: Sampler + ?Sized>(
    sampler: &mut S,
    source: &Source,
    eve_bases: Vec<Basis>,
) -> Result<Interceptor, ParameterError> {
    let bits = measure_all(sampler, &source.bits, &source.bases, &eve_bases)?;
    Ok(Interceptor {
        bases: eve_bases,
        bits,
    })
}

/// Bob measures whatever arrives on the line: Alice's qubits directly, or
/// Eve's resent qubits when she is present.
pub fn transmit<S: Sampler + ?Sized>(
    sampler: &mut S,
    source: &Source,
    eve: Option<&Interceptor>,
    bob_bases: &[Basis],
) -> Result<Vec<u8>, ParameterError> {
    match eve {
        Some(eve) => measure_all(sampler, &eve.bits, &eve.bases, bob_bases),
        None => measure_all(sampler, &source.bits, &source.bases, bob_bases),
    }
}

/// Keeps the positions where Alice's and Bob's bases agree.
pub fn sift(
    source: &Source,
    bob_bases: &[Basis],
    bob_bits: &[u8],
) -> Result<SiftedKey, SimulationError> {
    let n = source.bits.len();
    for len in [source.bases.len(), bob_bases.len(), bob_bits.len()] {
        if len != n {
            return Err(SimulationError::Stage {
                stage: Stage::Sifting,
                source: ParameterError::LengthMismatch {
                    expected: n,
                    got: len,
                },
            });
        }
    }

    let positions: Vec<usize> = (0..n)
        .filter(|&i| source.bases[i] == bob_bases[i])
        .collect();

    if positions.is_empty() {
        return Err(SimulationError::EmptySiftSet);
    }

    let alice = positions.iter().map(|&i| source.bits[i]).collect();
    let bob = positions.iter().map(|&i| bob_bits[i]).collect();

    Ok(SiftedKey {
        positions,
        alice,
        bob,
    })
}

/// Publishes a random sample of the sifted key and counts disagreements.
pub fn estimate_error<S: Sampler + ?Sized>(
    sampler: &mut S,
    sifted: &SiftedKey,
    config: &ProtocolConfig,
) -> Result<ErrorEstimate, ParameterError> {
    let len = sifted.len();
    let sample_size = config.sample_size(len);
    let sample = sampler.sample_positions(len, sample_size);

    let mut seen = vec![false; len];
    for &p in &sample {
        let slot = seen
            .get_mut(p)
            .ok_or(ParameterError::SampleOutOfRange { index: p, len })?;
        if *slot {
            return Err(ParameterError::DuplicateSample(p));
        }
        *slot = true;
    }
    if sample.len() != sample_size {
        return Err(ParameterError::LengthMismatch {
            expected: sample_size,
            got: sample.len(),
        });
    }

    let errors = sample
        .iter()
        .filter(|&&p| sifted.alice[p] != sifted.bob[p])
        .count();
    let error_rate = errors as f64 / sample_size as f64;

    Ok(ErrorEstimate {
        sample,
        errors,
        error_rate,
    })
}

/// Alice's sifted bits with every sampled position removed, in order.
pub fn derive_key(sifted: &SiftedKey, sample: &[usize]) -> Vec<u8> {
    let mut published = vec![false; sifted.len()];
    for &p in sample {
        if let Some(slot) = published.get_mut(p) {
            *slot = true;
        }
    }

    sifted
        .alice
        .iter()
        .zip(&published)
        .filter(|&(_, &used)| !used)
        .map(|(&bit, _)| bit)
        .collect()
}

/// Renders key bits as a '0'/'1' string.
pub fn key_to_string(bits: &[u8]) -> String {
    bits.iter().map(|&b| if b == 0 { '0' } else { '1' }).collect()
}

/// Builds the transcript of the first `window` qubits.
///
/// Every sequence must hold one entry per qubit Alice sent; `run` only
/// calls this after transmission has checked the lengths.
fn record(
    source: &Source,
    eve: Option<&Interceptor>,
    bob_bases: &[Basis],
    bob_bits: &[u8],
    window: usize,
) -> Transcript {
    let shown = window.min(source.bits.len());
    let events = (0..shown)
        .map(|i| QubitEvent {
            index: i,
            alice_bit: source.bits[i],
            alice_basis: source.bases[i],
            bob_basis: bob_bases[i],
            bob_bit: bob_bits[i],
            matched: source.bases[i] == bob_bases[i],
            eve: eve.map(|e| Interception {
                basis: e.bases[i],
                bit: e.bits[i],
            }),
        })
        .collect();

    Transcript::new(events)
}

/// Runs the BB84 protocol once.
///
/// Random draws happen in a fixed order: Alice's bits, Alice's bases, Bob's
/// bases, Eve's bases (if present), Eve's measurements, Bob's measurements,
/// then the error-check sample. A seeded sampler therefore reproduces a run
/// exactly.
///
/// # Arguments
///
/// * `params` - Qubit count and whether Eve intercepts.
/// * `config` - Protocol constants (threshold, sample divisor, window).
/// * `sampler` - Source of every random draw.
///
/// # Returns
///
/// The `RunResult` and `Transcript`, or the first error encountered.
pub fn run<S: Sampler + ?Sized>(
    params: &SimulationParams,
    config: &ProtocolConfig,
    sampler: &mut S,
) -> Result<Bb84Run, SimulationError> {
    config.validate()?;
    let n = params.qubit_count();
    if n < config.min_qubits {
        return Err(ParameterError::TooFewQubits {
            got: n,
            min: config.min_qubits,
        }
        .into());
    }

    // Alice prepares qubits, Bob (and Eve) pick bases
    let source = Source {
        bits: generate_random_bits(sampler, n),
        bases: generate_random_bases(sampler, n),
    };
    let bob_bases = generate_random_bases(sampler, n);
    let eve_bases = params
        .eavesdropping()
        .then(|| generate_random_bases(sampler, n));
    debug!(
        qubits = n,
        eavesdropping = params.eavesdropping(),
        "source generated"
    );

    // Transmission
    let eve = eve_bases
        .map(|bases| intercept_resend(sampler, &source, bases))
        .transpose()
        .in_stage(Stage::Transmission)?;
    if eve.is_some() {
        trace!(intercepted = n, "eve resent qubits");
    }
    let bob_bits = transmit(sampler, &source, eve.as_ref(), &bob_bases)
        .in_stage(Stage::Transmission)?;

    let transcript = record(
        &source,
        eve.as_ref(),
        &bob_bases,
        &bob_bits,
        config.transcript_window,
    );

    // Sifting stage
    let sifted = sift(&source, &bob_bases, &bob_bits)?;
    debug!(sifted = sifted.len(), "bases reconciled");

    // Error estimation and key derivation
    let estimate = estimate_error(sampler, &sifted, config).in_stage(Stage::Estimation)?;
    let key = derive_key(&sifted, &estimate.sample);
    let secure = config.is_secure(estimate.error_rate);
    debug!(
        sampled = estimate.sample.len(),
        errors = estimate.errors,
        key_length = key.len(),
        "error rate estimated"
    );

    let result = RunResult {
        total_qubits: n,
        sifted_bits: sifted.len(),
        sample_size: estimate.sample.len(),
        sample_errors: estimate.errors,
        error_rate: estimate.error_rate,
        final_key_length: key.len(),
        final_key: secure.then(|| key_to_string(&key)),
        secure,
    };
    info!(
        qubits = result.total_qubits,
        sifted = result.sifted_bits,
        error_rate = result.error_rate,
        secure = result.secure,
        "bb84 run complete"
    );

    Ok(Bb84Run { result, transcript })
}
