//! Quantum Key Distribution (QKD) Protocols.
//!
//! - **BB84**: prepare-and-measure key distribution over two conjugate bases,
//!   with an optional intercept-resend eavesdropper.

pub mod bb84;
pub mod transcript;
