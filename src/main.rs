//! Command line front end: solve an instance file or generate a random one.

use clap::{Args, Parser, Subcommand};
use gls_vrp::config::SearchConfig;
use gls_vrp::error::Result;
use gls_vrp::instance::Instance;
use gls_vrp::osrm::OsrmClient;
use gls_vrp::presenter::{render_polylines, save_geojson, to_geojson, StraightLinePresenter};
use gls_vrp::problem::CostMatrix;
use gls_vrp::provider::{CostMatrixProvider, HaversineProvider, Metric, StaticMatrixProvider};
use gls_vrp::utils::{format_duration, print_plan_summary, print_route_map, save_report};
use gls_vrp::RoutingEngine;
use log::info;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "gls-vrp", version, about = "Fleet routing with exact stops per vehicle")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Optimise the routes of an instance file
    Solve(SolveArgs),
    /// Write a reproducible random instance
    Generate(GenerateArgs),
}

#[derive(Args)]
struct SolveArgs {
    /// Instance JSON file
    #[arg(long)]
    instance: PathBuf,
    /// Cost matrix JSON file (array of rows), instead of querying a provider
    #[arg(long, conflicts_with = "osrm")]
    matrix: Option<PathBuf>,
    /// OSRM base URL, e.g. http://osrm:5000; great-circle distances are used otherwise
    #[arg(long)]
    osrm: Option<String>,
    /// OSRM routing profile
    #[arg(long, default_value = "driving")]
    profile: String,
    #[arg(long, value_enum, default_value_t = Metric::Distance)]
    metric: Metric,
    /// Improvement time limit in seconds
    #[arg(long, default_value_t = 30)]
    time_limit: u64,
    /// Share of an arc's cost added to its penalty per penalty round
    #[arg(long, default_value_t = 0.1)]
    penalty_factor: f64,
    #[arg(long)]
    max_iterations: Option<u64>,
    /// Evaluate inter-route moves in parallel
    #[arg(long)]
    parallel: bool,
    #[arg(long, default_value = "./output")]
    output_dir: PathBuf,
    /// Print an ASCII map of the routes
    #[arg(long)]
    map: bool,
}

#[derive(Args)]
struct GenerateArgs {
    #[arg(long, default_value_t = 20)]
    stops: usize,
    #[arg(long, default_value_t = 5)]
    vehicles: usize,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    #[arg(long)]
    output: PathBuf,
}

fn solve(args: SolveArgs) -> Result<()> {
    let instance = Instance::from_file(&args.instance)?;
    info!(
        "Loaded instance {} with {} stops and {} vehicles",
        instance.name,
        instance.stops.len(),
        instance.vehicles
    );

    let osrm = args
        .osrm
        .as_ref()
        .map(|url| OsrmClient::new(url.as_str()).map(|client| client.with_profile(&args.profile)))
        .transpose()?;

    let coordinates = instance.coordinates();
    let matrix = match (&args.matrix, &osrm) {
        (Some(path), _) => {
            let matrix: CostMatrix = serde_json::from_reader(BufReader::new(File::open(path)?))?;
            StaticMatrixProvider { matrix }.get_matrix(&coordinates, args.metric)?
        }
        (None, Some(client)) => client.get_matrix(&coordinates, args.metric)?,
        (None, None) => HaversineProvider::default().get_matrix(&coordinates, args.metric)?,
    };
    let model = instance.build_model(matrix)?;

    let config = SearchConfig::new()
        .with_time_limit(Duration::from_secs(args.time_limit))
        .with_penalty_factor(args.penalty_factor)
        .with_parallel(args.parallel);
    let config = match args.max_iterations {
        Some(iterations) => config.with_max_iterations(iterations),
        None => config,
    };

    let mut engine = RoutingEngine::new(model, config);
    engine.run()?;
    let plan = engine.extract()?;

    info!("Search completed in {}", format_duration(engine.run_time));
    if let Some(statistics) = &engine.statistics {
        info!("{}", statistics.format());
    }
    print_plan_summary(&plan);

    fs::create_dir_all(&args.output_dir)?;
    let report_path = args.output_dir.join("vrp_routes.csv");
    save_report(&plan, &report_path)?;
    println!("saved: {}", report_path.display());

    let polylines = match &osrm {
        Some(client) => render_polylines(&engine.model, &plan, client),
        None => render_polylines(&engine.model, &plan, &StraightLinePresenter),
    };
    let geojson_path = args.output_dir.join("vrp_solution.geojson");
    save_geojson(&to_geojson(&engine.model, &plan, &polylines), &geojson_path)?;
    println!("saved: {}", geojson_path.display());

    if args.map {
        print_route_map(&plan, &engine.model);
    }

    Ok(())
}

fn generate(args: GenerateArgs) -> Result<()> {
    let instance = Instance::random(args.stops, args.vehicles, args.seed)?;
    instance.save(&args.output)?;
    println!("saved: {}", args.output.display());
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Solve(args) => solve(args),
        Command::Generate(args) => generate(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}
