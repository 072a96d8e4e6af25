use toffoli_tune::prelude::*;
use toffoli_tune::cost::run_all_inputs;
use toffoli_tune::simulate::output_probabilities;

fn assert_almost_eq(a: f64, b: f64, prec: i32) {
    let mult = 10.0f64.powi(prec);
    let (a, b) = (a * mult, b * mult);
    let (a, b) = (a.round(), b.round());
    assert_eq!(a / mult, b / mult);
}

// https://en.wikipedia.org/wiki/Quantum_logic_gate#Toffoli_(CCNOT)_gate
fn truth_table() -> Vec<((usize, usize, usize), (usize, usize, usize))> {
    vec![
        ((0, 0, 0), (0, 0, 0)),
        ((0, 0, 1), (0, 0, 1)),
        ((0, 1, 0), (0, 1, 0)),
        ((0, 1, 1), (0, 1, 1)),
        ((1, 0, 0), (1, 0, 0)),
        ((1, 0, 1), (1, 0, 1)),
        ((1, 1, 0), (1, 1, 1)),
        ((1, 1, 1), (1, 1, 0)),
    ]
}

fn check_truth_table(circuit: &Circuit) -> TuneResult<()> {
    for ((a, b, c), (x, y, z)) in truth_table() {
        // qubit i reads bit i of the input
        let input = a | (b << 1) | (c << 2);
        let probs = output_probabilities(circuit, input, SimulationMode::Exact)?;

        // labels list qubit 0 first
        let expected = format!("{}{}{}", x, y, z);
        let p = probs.get(&expected).copied().unwrap_or(0.0);
        assert_almost_eq(p, 1.0, 10);
    }
    Ok(())
}

#[test]
fn test_toffoli() -> TuneResult<()> {
    check_truth_table(&toffoli())
}

#[test]
fn test_decomposed_toffoli() -> TuneResult<()> {
    let decomposed = toffoli().decompose();
    assert!(decomposed.instructions().iter().all(|i| i.qubits().len() <= 2));
    check_truth_table(&decomposed)
}

#[test]
fn test_ideal_outputs_are_deterministic() -> TuneResult<()> {
    let counts = run_all_inputs(&toffoli(), SimulationMode::Exact)?;
    assert_eq!(counts.len(), 8);
    for probs in counts.values() {
        assert_eq!(probs.len(), 1);
        assert_eq!(probs.values().sum::<f64>(), 1.0);
    }
    Ok(())
}

#[test]
fn test_shots_match_truth_table() -> TuneResult<()> {
    let mode = SimulationMode::Shots {
        shots: 256,
        seed: Some(1),
    };
    let probs = output_probabilities(&toffoli(), 0b011, mode)?;
    assert_eq!(probs.get("111"), Some(&1.0));
    Ok(())
}
