//! BB84 quantum key distribution simulator.
//!
//! Alice sends randomly encoded bits to Bob, optionally through an
//! intercept-resend eavesdropper, and both sides sift, estimate the error rate
//! and derive a key only when the channel looks clean.
//!
//! ```no_run
//! use qkd_bb84::Bb84Simulator;
//!
//! let mut sim = Bb84Simulator::new(1000, true)?;
//! let result = sim.simulate()?;
//! if !result.secure {
//!     assert!(result.final_key.is_none());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
mod core;
pub mod protocols;
mod sampler;
mod simulator;

pub use crate::config::{ProtocolConfig, SimulationParams};
pub use crate::core::{Basis, check_bit, errors, measure, measure_all};
pub use crate::protocols::bb84::{Bb84Run, KeyComposition, RunResult};
pub use crate::protocols::qkd::transcript::{Interception, QubitEvent, Transcript};
pub use crate::sampler::{RngSampler, Sampler};
pub use crate::simulator::Bb84Simulator;
