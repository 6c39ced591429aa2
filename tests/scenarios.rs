use u_facility::bvns::{BvnsConfig, BvnsRunner, InitMode, LocalSearchMode, Termination};
use u_facility::evaluation::{check_solution, Evaluator};
use u_facility::io::parse_orlib;
use u_facility::matrix::Matrix;
use u_facility::models::{Instance, OpenSet};
use u_facility::transport::{solve, TransportMode};
use u_facility::CflpError;

const INIT_MODES: [InitMode; 3] = [InitMode::Random, InitMode::CheapestFirst, InitMode::Rvns];
const TRANSPORT_MODES: [TransportMode; 3] =
    [TransportMode::LeastCost, TransportMode::Vogel, TransportMode::Modi];

/// SplitMix64, so generated instances do not depend on the RNG backend.
struct SplitMix(u64);

impl SplitMix {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    fn below(&mut self, lo: u64, hi: u64) -> u64 {
        lo + self.next() % (hi - lo)
    }
}

/// Capacity exactly matches demand, the regime Vogel's method targets.
fn balanced_instance(rng: &mut SplitMix) -> Instance {
    let facilities = rng.below(2, 7) as usize;
    let customers = rng.below(2, 9) as usize;
    let demands: Vec<f64> = (0..customers).map(|_| rng.below(1, 16) as f64).collect();
    let total: f64 = demands.iter().sum();
    let raw: Vec<f64> = (0..facilities).map(|_| rng.below(1, 16) as f64).collect();
    let raw_sum: f64 = raw.iter().sum();
    let capacities: Vec<f64> = raw.iter().map(|x| x * total / raw_sum).collect();
    let costs: Vec<Vec<f64>> = (0..facilities)
        .map(|_| (0..customers).map(|_| rng.below(1, 21) as f64).collect())
        .collect();
    Instance::from_rows(demands, capacities, vec![0.0; facilities], costs).expect("valid")
}

#[test]
fn two_facilities_needed_for_demand() {
    let inst = Instance::from_rows(
        vec![8.0, 8.0],
        vec![10.0, 10.0],
        vec![5.0, 5.0],
        vec![vec![1.0, 1.0], vec![1.0, 1.0]],
    )
    .expect("valid");

    for init in INIT_MODES {
        for transport in TRANSPORT_MODES {
            let config = BvnsConfig::default()
                .with_init_mode(init)
                .with_transport_mode(transport)
                .with_max_iterations(15)
                .with_seed(11);
            let result = BvnsRunner::run(&inst, &config).expect("feasible");
            assert_eq!(result.best.open_set(), &OpenSet::all_open(2));
            assert!(
                (result.best_cost() - 26.0).abs() < 1e-9,
                "{init:?}/{transport:?}: {}",
                result.best_cost()
            );
        }
    }
}

#[test]
fn single_tight_facility_costs_only_its_opening() {
    let inst = Instance::from_rows(
        vec![3.0, 7.0],
        vec![10.0],
        vec![42.0],
        vec![vec![0.0, 0.0]],
    )
    .expect("valid");
    for init in INIT_MODES {
        let config = BvnsConfig::default().with_init_mode(init).with_seed(4);
        let result = BvnsRunner::run(&inst, &config).expect("feasible");
        assert_eq!(result.best_cost(), 42.0);
        assert_eq!(result.best.transport_cost(), 0.0);
        // Every shake closes the only facility.
        assert_eq!(result.rejected_moves, result.iterations);
    }
}

#[test]
fn insufficient_total_capacity_has_no_feasible_start() {
    let inst = Instance::from_rows(
        vec![12.0, 12.0, 12.0],
        vec![10.0, 10.0, 10.0],
        vec![1.0, 2.0, 3.0],
        vec![vec![1.0; 3], vec![2.0; 3], vec![3.0; 3]],
    )
    .expect("valid");
    for init in INIT_MODES {
        let config = BvnsConfig::default().with_init_mode(init).with_seed(0);
        let err = BvnsRunner::run(&inst, &config).unwrap_err();
        assert!(matches!(err, CflpError::NoFeasibleStart { .. }), "{init:?}: {err}");
    }
}

#[test]
fn mismatched_dimensions_are_rejected() {
    let err = Instance::from_rows(
        vec![1.0, 2.0],
        vec![5.0, 5.0],
        vec![1.0],
        vec![vec![1.0, 1.0], vec![1.0, 1.0]],
    )
    .unwrap_err();
    assert!(matches!(
        err,
        CflpError::DimensionMismatch {
            expected: 2,
            found: 1,
            ..
        }
    ));

    let err = Instance::new(vec![1.0, 2.0, 3.0], vec![5.0], vec![1.0], Matrix::new(1, 2))
        .unwrap_err();
    assert!(matches!(err, CflpError::DimensionMismatch { .. }));
}

#[test]
fn vogel_beats_greedy_on_balanced_instances() {
    let mut rng = SplitMix(2024);
    let mut vogel_total = 0.0;
    let mut greedy_total = 0.0;
    for _ in 0..300 {
        let inst = balanced_instance(&mut rng);
        let open = OpenSet::all_open(inst.num_facilities());
        let greedy = solve(&inst, &open, TransportMode::LeastCost).expect("balanced");
        let vogel = solve(&inst, &open, TransportMode::Vogel).expect("balanced");
        let modi = solve(&inst, &open, TransportMode::Modi).expect("balanced");
        assert!(modi.cost <= greedy.cost + 1e-6);
        assert!(modi.cost <= vogel.cost + 1e-6);
        vogel_total += vogel.cost;
        greedy_total += greedy.cost;
    }
    assert!(
        vogel_total < greedy_total,
        "vogel {vogel_total} vs greedy {greedy_total}"
    );
}

#[test]
fn orlib_instance_end_to_end() {
    // Warehouse 2 is cheap to open but far; 0 and 1 split the customers.
    let text = "\
3 4
20 30
20 30
40 5
5
5 25 50
5
5 25 50
5
25 5 50
5
25 5 50
";
    let inst = parse_orlib(text).expect("well-formed");
    let config = BvnsConfig::default()
        .with_local_search_mode(LocalSearchMode::FirstImprovement)
        .with_transport_mode(TransportMode::Modi)
        .with_max_iterations(30)
        .with_seed(99);
    let result = BvnsRunner::run(&inst, &config).expect("feasible");
    assert_eq!(result.termination, Termination::IterationCap);

    // {2} = 5 + 200, {0} = 30 + 60, {0,1} = 60 + 20, {0,2} = 35 + 10 + 50.
    assert_eq!(
        result.best.open_set().open_indices().collect::<Vec<_>>(),
        vec![0, 1]
    );
    assert!((result.best_cost() - 80.0).abs() < 1e-9);
    assert!(check_solution(
        result.best.open_set(),
        result.best.flows(),
        inst.capacities(),
        inst.demands()
    ));
}

#[test]
fn restarts_return_verified_solution() {
    let mut rng = SplitMix(7);
    let base = balanced_instance(&mut rng);
    let inst = Instance::new(
        base.demands().to_vec(),
        base.capacities().iter().map(|b| b * 1.5).collect(),
        (0..base.num_facilities()).map(|i| 10.0 * (i + 1) as f64).collect(),
        base.costs().clone(),
    )
    .expect("valid");

    let config = BvnsConfig::default().with_max_iterations(10);
    let result = BvnsRunner::run_restarts(&inst, &config, &[1, 2, 3]).expect("feasible");
    assert!([1, 2, 3].contains(&result.seed));
    assert!(Evaluator::new(&inst, config.transport_mode).verify(&result.best));
    let total_flow: f64 = result.best.assignments().iter().map(|&(_, _, a)| a).sum();
    assert!((total_flow - inst.total_demand()).abs() < 1e-6);
}
