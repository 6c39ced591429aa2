use anyhow::{anyhow, bail, Context, Result};
use clap::{arg, ArgMatches, Command};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use u_facility::bvns::{
    BvnsConfig, BvnsResult, BvnsRunner, InitMode, LocalSearchMode, ShakingMode, StoppingRule,
};
use u_facility::io::read_orlib;
use u_facility::models::Instance;
use u_facility::transport::TransportMode;

fn cli() -> Command {
    Command::new("cflp-bvns")
        .about("Solves a capacitated facility location instance with Basic VNS")
        .arg(
            arg!(<INSTANCE> "Path to an OR-Library capacitated warehouse file")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            arg!(--"k-min" [K_MIN] "Smallest shaking neighborhood")
                .default_value("1")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            arg!(--"k-max" [K_MAX] "Largest shaking neighborhood")
                .default_value("3")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            arg!(--"t-max" [T_MAX] "Iteration cap (0 = unlimited)")
                .default_value("40")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            arg!(--time [SECONDS] "Wall-clock budget in seconds")
                .value_parser(clap::value_parser!(f64)),
        )
        .arg(arg!(--seed [SEED] "RNG seed").value_parser(clap::value_parser!(u64)))
        .arg(
            arg!(--init [MODE] "Initial solution strategy")
                .default_value("rvns")
                .value_parser(["random", "cheapest", "rvns"]),
        )
        .arg(
            arg!(--shaking [MODE] "Shaking strategy")
                .default_value("uniform")
                .value_parser(["uniform", "cost", "capacity"]),
        )
        .arg(
            arg!(--"local-search" [MODE] "Local search strategy")
                .default_value("best")
                .value_parser(["best", "first"]),
        )
        .arg(
            arg!(--transport [MODE] "Transportation subproblem solver")
                .default_value("vogel")
                .value_parser(["least-cost", "vogel", "modi"]),
        )
        .arg(
            arg!(--stagnation [ITERS] "Stop after this many non-improving iterations")
                .value_parser(clap::value_parser!(usize))
                .conflicts_with("sweeps"),
        )
        .arg(
            arg!(--sweeps [SWEEPS] "Stop after this many full neighborhood sweeps without improvement")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            arg!(--restarts [N] "Independent runs with seeds seed..seed+N")
                .default_value("1")
                .value_parser(clap::value_parser!(usize)),
        )
}

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(&cli().get_matches()) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<()> {
    let path = matches
        .get_one::<PathBuf>("INSTANCE")
        .ok_or_else(|| anyhow!("missing instance path"))?;
    let instance =
        read_orlib(path).with_context(|| format!("failed to load {}", path.display()))?;

    let config = build_config(matches)?;
    let restarts = *matches.get_one::<usize>("restarts").unwrap_or(&1);
    if restarts == 0 {
        bail!("--restarts must be at least 1");
    }

    let started = Instant::now();
    let result = if restarts == 1 {
        BvnsRunner::run(&instance, &config)?
    } else {
        let base = config.seed.unwrap_or_else(rand::random);
        let seeds: Vec<u64> = (0..restarts as u64).map(|r| base.wrapping_add(r)).collect();
        BvnsRunner::run_restarts(&instance, &config, &seeds)?
    };

    print_report(path, &instance, &config, &result, restarts, started.elapsed());
    Ok(())
}

fn build_config(matches: &ArgMatches) -> Result<BvnsConfig> {
    let init = match str_arg(matches, "init")? {
        "random" => InitMode::Random,
        "cheapest" => InitMode::CheapestFirst,
        _ => InitMode::Rvns,
    };
    let shaking = match str_arg(matches, "shaking")? {
        "cost" => ShakingMode::CostBiased,
        "capacity" => ShakingMode::CapacityBiased,
        _ => ShakingMode::Uniform,
    };
    let local_search = match str_arg(matches, "local-search")? {
        "first" => LocalSearchMode::FirstImprovement,
        _ => LocalSearchMode::BestImprovement,
    };
    let transport = match str_arg(matches, "transport")? {
        "least-cost" => TransportMode::LeastCost,
        "modi" => TransportMode::Modi,
        _ => TransportMode::Vogel,
    };
    let stopping = match (
        matches.get_one::<usize>("stagnation"),
        matches.get_one::<usize>("sweeps"),
    ) {
        (Some(&max_no_improve), _) => StoppingRule::Stagnation { max_no_improve },
        (None, Some(&max_sweeps)) => StoppingRule::Sweeps { max_sweeps },
        (None, None) => StoppingRule::Budget,
    };

    let mut config = BvnsConfig::default()
        .with_neighborhoods(usize_arg(matches, "k-min")?, usize_arg(matches, "k-max")?)
        .with_max_iterations(usize_arg(matches, "t-max")?)
        .with_init_mode(init)
        .with_shaking_mode(shaking)
        .with_local_search_mode(local_search)
        .with_transport_mode(transport)
        .with_stopping(stopping);

    if let Some(&seconds) = matches.get_one::<f64>("time") {
        if !seconds.is_finite() || seconds < 0.0 {
            bail!("--time must be a non-negative number of seconds");
        }
        config = config.with_time_budget(Duration::from_secs_f64(seconds));
    }
    if let Some(&seed) = matches.get_one::<u64>("seed") {
        config = config.with_seed(seed);
    }

    config.validate().map_err(|msg| anyhow!(msg))?;
    Ok(config)
}

fn usize_arg(matches: &ArgMatches, name: &str) -> Result<usize> {
    matches
        .get_one::<usize>(name)
        .copied()
        .ok_or_else(|| anyhow!("missing --{name}"))
}

fn str_arg<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("missing --{name}"))
}

fn print_report(
    path: &Path,
    instance: &Instance,
    config: &BvnsConfig,
    result: &BvnsResult,
    restarts: usize,
    wall: Duration,
) {
    let best = &result.best;
    let open: Vec<String> = best.open_set().open_indices().map(|i| i.to_string()).collect();

    println!("instance          {}", path.display());
    println!(
        "size              {} facilities x {} customers",
        instance.num_facilities(),
        instance.num_customers()
    );
    println!(
        "parameters        k={}..{} t_max={} init={:?} shaking={:?} ls={:?} transport={:?} stopping={:?}",
        config.k_min,
        config.k_max,
        config.max_iterations,
        config.init_mode,
        config.shaking_mode,
        config.local_search_mode,
        config.transport_mode,
        config.stopping,
    );
    println!("seed              {} (restarts: {})", result.seed, restarts);
    println!("initial objective {:.4}", result.initial_objective);
    println!("objective         {:.4}", best.objective());
    println!("  opening cost    {:.4}", best.opening_cost());
    println!("  transport cost  {:.4}", best.transport_cost());
    println!("open facilities   [{}]", open.join(", "));
    println!(
        "iterations        {} (improvements {}, best at {}, rejected {})",
        result.iterations, result.improvements, result.best_iteration, result.rejected_moves
    );
    println!("termination       {:?}", result.termination);
    println!("elapsed           {:.3}s", wall.as_secs_f64());
}
