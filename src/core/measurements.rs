use crate::core::Basis;
use crate::core::errors::ParameterError;
use crate::sampler::Sampler;

/// Checks that `bit` lies in {0, 1}.
pub fn check_bit(bit: u8) -> Result<u8, ParameterError> {
    if bit > 1 {
        return Err(ParameterError::InvalidBit(bit));
    }
    Ok(bit)
}

/// Measures a qubit prepared as `bit` in `send_basis` using `measure_basis`.
///
/// - Matching bases: the prepared bit is recovered exactly.
/// - Conjugate bases: the state collapses to a uniformly random outcome,
///   drawn fresh from `sampler` on every call.
///
/// The same model serves every hop (Alice to Bob, Alice to Eve, Eve to Bob).
pub fn measure<S: Sampler + ?Sized>(
    sampler: &mut S,
    bit: u8,
    send_basis: Basis,
    measure_basis: Basis,
) -> Result<u8, ParameterError> {
    let bit = check_bit(bit)?;

    if send_basis == measure_basis {
        Ok(bit)
    } else {
        Ok(sampler.random_bit())
    }
}

/// Measures every qubit of a transmission, position by position.
///
/// All three slices must have the same length.
pub fn measure_all<S: Sampler + ?Sized>(
    sampler: &mut S,
    bits: &[u8],
    send_bases: &[Basis],
    measure_bases: &[Basis],
) -> Result<Vec<u8>, ParameterError> {
    for len in [send_bases.len(), measure_bases.len()] {
        if len != bits.len() {
            return Err(ParameterError::LengthMismatch {
                expected: bits.len(),
                got: len,
            });
        }
    }

    bits.iter()
        .zip(send_bases)
        .zip(measure_bases)
        .map(|((&bit, &send), &meas)| measure(sampler, bit, send, meas))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::RngSampler;

    #[test]
    fn matching_basis_is_deterministic() {
        let mut sampler = RngSampler::seeded(11);
        for basis in Basis::ALL {
            for bit in [0, 1] {
                for _ in 0..100 {
                    assert_eq!(measure(&mut sampler, bit, basis, basis), Ok(bit));
                }
            }
        }
    }

    #[test]
    fn wrong_basis_is_uniform() {
        let mut sampler = RngSampler::seeded(12);
        let trials = 10_000;

        for bit in [0, 1] {
            let ones: usize = (0..trials)
                .map(|_| {
                    measure(&mut sampler, bit, Basis::Rectilinear, Basis::Diagonal).unwrap()
                        as usize
                })
                .sum();
            let ratio = ones as f64 / trials as f64;
            assert!((ratio - 0.5).abs() < 0.05, "ratio of ones was {ratio}");
        }
    }

    #[test]
    fn wrong_basis_draws_fresh_values() {
        let mut sampler = RngSampler::seeded(13);
        let outcomes: Vec<u8> = (0..64)
            .map(|_| measure(&mut sampler, 0, Basis::Diagonal, Basis::Rectilinear).unwrap())
            .collect();
        assert!(outcomes.contains(&0));
        assert!(outcomes.contains(&1));
    }

    #[test]
    fn bit_outside_domain_is_rejected() {
        let mut sampler = RngSampler::seeded(14);
        assert_eq!(
            measure(&mut sampler, 2, Basis::Rectilinear, Basis::Rectilinear),
            Err(ParameterError::InvalidBit(2))
        );
    }

    #[test]
    fn measure_all_checks_lengths() {
        let mut sampler = RngSampler::seeded(15);
        let err = measure_all(
            &mut sampler,
            &[0, 1],
            &[Basis::Rectilinear],
            &[Basis::Diagonal; 2],
        );
        assert_eq!(
            err,
            Err(ParameterError::LengthMismatch {
                expected: 2,
                got: 1
            })
        );
    }
}
