use std::f64::consts::PI;

use toffoli_tune::prelude::*;

fn small_search(seed: u64) -> DifferentialEvolutionOptions {
    DifferentialEvolutionOptions {
        max_iterations: 15,
        popsize: 2,
        seed: Some(seed),
        ..Default::default()
    }
}

#[test]
fn test_known_solution() -> TuneResult<()> {
    // H then Tdg on the target recovers the textbook network.
    let angles = TaskAngles::from([PI / 2.0, 0.0, PI, 0.0, 0.0, 7.0 * PI / 4.0]);
    let circuit = task_circuit(&angles);
    assert!(operator_equiv(&circuit, &toffoli())?);
    for cost in CostFunction::ALL {
        let c = cost.evaluate(&angles, SimulationMode::Exact)?;
        assert!(c.abs() < 1e-9, "{} = {}", cost, c);
    }
    Ok(())
}

#[test]
fn test_search_improves_on_initial_population() -> TuneResult<()> {
    let result = differential_evolution(
        |x: &[f64]| CostFunction::TraceOverlap.evaluate(x, SimulationMode::Exact),
        &TaskAngles::search_bounds(),
        &small_search(3),
    )?;
    assert_eq!(result.x.len(), 6);
    assert!(result.history.windows(2).all(|w| w[1] <= w[0]));
    assert_eq!(result.fun, *result.history.last().unwrap());
    assert!(result.fun <= result.history[0]);
    for (x, (lo, hi)) in result.x.iter().zip(TaskAngles::search_bounds()) {
        assert!(lo <= *x && *x <= hi);
    }
    Ok(())
}

#[test]
fn test_optimize_angles_and_time() -> TuneResult<()> {
    let config = Config {
        optimizer: small_search(5),
        cost_functions: vec![CostFunction::TraceNorm, CostFunction::CountComparison],
        ..Default::default()
    };
    let runs = optimize_angles_and_time(&config)?;
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].cost_function, CostFunction::TraceNorm);
    assert_eq!(runs[1].cost_function, CostFunction::CountComparison);
    for run in &runs {
        assert_eq!(run.cost, run.result.fun);
        assert!(run.result.nit <= 15);
        assert_eq!(run.result.nfev, 12 * (run.result.nit + 1));
        run.is_toffoli_equivalent()?;
    }

    let json = serde_json::to_string(&runs)?;
    let back: Vec<TuningRun> = serde_json::from_str(&json)?;
    assert_eq!(back.len(), 2);
    assert_eq!(back[1].cost_function, CostFunction::CountComparison);
    assert_eq!(back[0].result.nit, runs[0].result.nit);
    Ok(())
}

#[test]
fn test_seeded_runs_repeat() -> TuneResult<()> {
    let search = || {
        differential_evolution(
            |x: &[f64]| CostFunction::Frobenius.evaluate(x, SimulationMode::Exact),
            &TaskAngles::search_bounds(),
            &small_search(9),
        )
    };
    let (a, b) = (search()?, search()?);
    assert_eq!(a.x, b.x);
    assert_eq!(a.nit, b.nit);
    Ok(())
}
