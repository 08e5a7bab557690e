//! Property-based tests for the simulator and its pipeline stages.

use proptest::prelude::*;
use qkd_bb84::errors::SimulationError;
use qkd_bb84::protocols::bb84::{
    self, Source, derive_key, estimate_error, generate_random_bases, generate_random_bits,
    intercept_resend, key_to_string, sift, transmit,
};
use qkd_bb84::{Bb84Simulator, ProtocolConfig, RngSampler, SimulationParams};

#[test]
fn prop_run_result_invariants() {
    proptest!(ProptestConfig::with_cases(64), |(
        seed in any::<u64>(),
        qubits in 10usize..800,
        eavesdropping in any::<bool>(),
    )| {
        let mut sim = Bb84Simulator::seeded(qubits, eavesdropping, seed).unwrap();
        let result = match sim.simulate() {
            Ok(result) => result,
            Err(SimulationError::EmptySiftSet) => return Ok(()),
            Err(other) => return Err(TestCaseError::fail(other.to_string())),
        };

        prop_assert_eq!(result.total_qubits, qubits);
        prop_assert!(result.sifted_bits >= 1 && result.sifted_bits <= qubits);
        prop_assert!((0.0..=1.0).contains(&result.error_rate));
        prop_assert_eq!(result.secure, result.error_rate < 0.15);
        prop_assert_eq!(result.final_key.is_some(), result.secure);
        prop_assert_eq!(result.sample_size, (result.sifted_bits / 4).max(1));
        prop_assert_eq!(result.final_key_length, result.sifted_bits - result.sample_size);
        if let Some(key) = &result.final_key {
            prop_assert_eq!(key.len(), result.final_key_length);
        }

        let transcript = sim.transcript().unwrap();
        prop_assert_eq!(transcript.len(), qubits.min(20));
        for (i, event) in transcript.iter().enumerate() {
            prop_assert_eq!(event.index, i);
            prop_assert_eq!(event.matched, event.alice_basis == event.bob_basis);
            prop_assert_eq!(event.eve.is_some(), eavesdropping);
            if !eavesdropping && event.matched {
                prop_assert_eq!(event.alice_bit, event.bob_bit);
            }
            if let Some(eve) = event.eve {
                if eve.basis == event.alice_basis {
                    prop_assert_eq!(eve.bit, event.alice_bit);
                }
                if eve.basis == event.bob_basis {
                    prop_assert_eq!(event.bob_bit, eve.bit);
                }
            }
        }
    });
}

#[test]
fn prop_clean_channel_is_always_secure() {
    proptest!(ProptestConfig::with_cases(64), |(seed in any::<u64>(), qubits in 40usize..800)| {
        let mut sim = Bb84Simulator::seeded(qubits, false, seed).unwrap();
        let result = sim.simulate().unwrap();

        prop_assert_eq!(result.error_rate, 0.0);
        prop_assert!(result.secure);
        prop_assert!(result.final_key.is_some());
    });
}

#[test]
fn prop_same_seed_same_run() {
    proptest!(ProptestConfig::with_cases(32), |(
        seed in any::<u64>(),
        qubits in 10usize..400,
        eavesdropping in any::<bool>(),
    )| {
        let mut outcomes = Vec::new();
        for _ in 0..2 {
            let mut sim = Bb84Simulator::seeded(qubits, eavesdropping, seed).unwrap();
            let result = sim.simulate();
            let transcript = sim.transcript().ok().cloned();
            outcomes.push((result, transcript));
        }

        // PROPERTY: Determinism - same seed produces identical results
        prop_assert_eq!(&outcomes[0], &outcomes[1]);
    });
}

#[test]
fn prop_final_key_excludes_sampled_positions() {
    proptest!(ProptestConfig::with_cases(64), |(
        seed in any::<u64>(),
        qubits in 10usize..600,
        eavesdropping in any::<bool>(),
    )| {
        // Drive the stages by hand in the engine's draw order.
        let mut sampler = RngSampler::seeded(seed);
        let source = Source {
            bits: generate_random_bits(&mut sampler, qubits),
            bases: generate_random_bases(&mut sampler, qubits),
        };
        let bob_bases = generate_random_bases(&mut sampler, qubits);
        let eve = if eavesdropping {
            let eve_bases = generate_random_bases(&mut sampler, qubits);
            Some(intercept_resend(&mut sampler, &source, eve_bases).unwrap())
        } else {
            None
        };
        let bob_bits = transmit(&mut sampler, &source, eve.as_ref(), &bob_bases).unwrap();

        let Ok(sifted) = sift(&source, &bob_bases, &bob_bits) else {
            return Ok(());
        };
        prop_assert!(sifted.positions.iter().all(|&i| source.bases[i] == bob_bases[i]));

        let config = ProtocolConfig::default();
        let estimate = estimate_error(&mut sampler, &sifted, &config).unwrap();
        let key = derive_key(&sifted, &estimate.sample);

        // Sample positions index the sifted key, never the raw qubit stream.
        prop_assert!(estimate.sample.iter().all(|&p| p < sifted.len()));
        let contributing: Vec<usize> = (0..sifted.len())
            .filter(|p| !estimate.sample.contains(p))
            .collect();
        for p in &estimate.sample {
            prop_assert!(!contributing.contains(p));
        }
        let expected: Vec<u8> = contributing.iter().map(|&p| sifted.alice[p]).collect();
        prop_assert_eq!(&key, &expected);

        // The packaged run must agree with the hand-driven stages.
        let params = SimulationParams::new(qubits, eavesdropping).unwrap();
        let run = bb84::run(&params, &config, &mut RngSampler::seeded(seed)).unwrap();
        prop_assert_eq!(run.result.sifted_bits, sifted.len());
        prop_assert_eq!(run.result.sample_errors, estimate.errors);
        prop_assert_eq!(run.result.final_key_length, key.len());
        if run.result.secure {
            prop_assert_eq!(run.result.final_key, Some(key_to_string(&key)));
        }
    });
}
