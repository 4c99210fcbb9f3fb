//! Microgrid environment entry point: CLI wiring and config-driven evaluation run.

use std::path::{Path, PathBuf};
use std::process;

use microgrid_env::config::ScenarioConfig;
use microgrid_env::io::export::{export_csv, export_json};
use microgrid_env::logging::init_tracing;
use microgrid_env::sim::env::GridEnv;
use microgrid_env::sim::kpi::EpisodeReport;
use microgrid_env::sim::policy::{IdlePolicy, PeakShavingPolicy};
use microgrid_env::sim::rollout::{Episode, run_episode};
use microgrid_env::sim::series::TimeSeries;

/// Parsed CLI arguments.
struct CliArgs {
    data_path: Option<PathBuf>,
    scenario_path: Option<PathBuf>,
    preset: Option<String>,
    seed_override: Option<u64>,
    steps_override: Option<usize>,
    policy_override: Option<String>,
    telemetry_out: Option<PathBuf>,
    json_out: Option<PathBuf>,
    verbose: bool,
}

fn print_help() {
    eprintln!("microgrid-env: battery-in-the-loop microgrid environment");
    eprintln!();
    eprintln!("Usage: microgrid-env --data <csv> [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --data <path>            Exogenous time series (CSV with header)");
    eprintln!("  --scenario <path>        Load scenario from TOML config file");
    eprintln!(
        "  --preset <name>          Use a built-in preset ({})",
        ScenarioConfig::PRESETS.join(", ")
    );
    eprintln!("  --seed <u64>             Override episode start seed");
    eprintln!("  --steps <n>              Override evaluation step budget");
    eprintln!(
        "  --policy <name>          Override policy ({})",
        ScenarioConfig::POLICIES.join(", ")
    );
    eprintln!("  --telemetry-out <path>   Export step records to CSV");
    eprintln!("  --json-out <path>        Export step records as a JSON trace");
    eprintln!("  --verbose                Log every step");
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the baseline preset is used.");
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("error: {message}");
    process::exit(1);
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        data_path: None,
        scenario_path: None,
        preset: None,
        seed_override: None,
        steps_override: None,
        policy_override: None,
        telemetry_out: None,
        json_out: None,
        verbose: false,
    };

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        let mut value = || {
            i += 1;
            args.get(i)
                .cloned()
                .unwrap_or_else(|| fail(format!("{flag} requires an argument")))
        };
        match flag {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--data" => cli.data_path = Some(PathBuf::from(value())),
            "--scenario" => cli.scenario_path = Some(PathBuf::from(value())),
            "--preset" => cli.preset = Some(value()),
            "--seed" => {
                let raw = value();
                match raw.parse::<u64>() {
                    Ok(s) => cli.seed_override = Some(s),
                    Err(_) => fail(format!("--seed value \"{raw}\" is not a valid u64")),
                }
            }
            "--steps" => {
                let raw = value();
                match raw.parse::<usize>() {
                    Ok(n) if n > 0 => cli.steps_override = Some(n),
                    _ => fail(format!("--steps value \"{raw}\" is not a positive integer")),
                }
            }
            "--policy" => cli.policy_override = Some(value()),
            "--telemetry-out" => cli.telemetry_out = Some(PathBuf::from(value())),
            "--json-out" => cli.json_out = Some(PathBuf::from(value())),
            "--verbose" | "-v" => cli.verbose = true,
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    if cli.scenario_path.is_some() && cli.preset.is_some() {
        fail("--scenario and --preset are mutually exclusive; choose one source");
    }

    cli
}

/// Loads the scenario from `--scenario`, then `--preset`, then the baseline default.
fn load_scenario(cli: &CliArgs) -> ScenarioConfig {
    let mut scenario = if let Some(ref path) = cli.scenario_path {
        ScenarioConfig::from_toml_file(path).unwrap_or_else(|e| fail(e))
    } else if let Some(ref name) = cli.preset {
        ScenarioConfig::from_preset(name).unwrap_or_else(|e| fail(e))
    } else {
        ScenarioConfig::baseline()
    };

    if let Some(seed) = cli.seed_override {
        scenario.simulation.seed = seed;
    }
    if let Some(steps) = cli.steps_override {
        scenario.simulation.episode_steps = steps;
    }
    if let Some(ref policy) = cli.policy_override {
        scenario.policy.name = policy.clone();
    }

    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }
    scenario
}

/// Runs one evaluation episode with the configured policy.
fn run_evaluation(cfg: &ScenarioConfig, env: &mut GridEnv) -> Episode {
    let seed = Some(cfg.simulation.seed);
    let steps = cfg.simulation.episode_steps;

    if cfg.policy.name == "peak_shaving" {
        let mut policy = PeakShavingPolicy::new(cfg.battery.max_rate, cfg.policy.smoothing);
        run_episode(env, &mut policy, seed, steps)
    } else {
        run_episode(env, &mut IdlePolicy, seed, steps)
    }
}

fn main() {
    let cli = parse_args();
    init_tracing(cli.verbose);

    let Some(data_path) = cli.data_path.as_deref() else {
        print_help();
        fail("--data is required");
    };

    let scenario = load_scenario(&cli);

    let series = TimeSeries::from_csv_path(data_path, &scenario.data).unwrap_or_else(|e| fail(e));
    let mut env = GridEnv::new(series, scenario.build_battery(), scenario.env_options())
        .unwrap_or_else(|e| fail(e));

    let episode = run_evaluation(&scenario, &mut env);
    let report = EpisodeReport::from_records(
        &episode.records,
        scenario.simulation.step_hours,
        scenario.battery.capacity,
    );

    println!(
        "policy={} start_row={} ({})",
        episode.policy,
        episode.start,
        env.series()[episode.start].timestamp
    );
    println!("\n{report}");

    if let Some(ref path) = cli.telemetry_out {
        write_or_fail(path, "CSV", |p| export_csv(&episode.records, p));
    }
    if let Some(ref path) = cli.json_out {
        write_or_fail(path, "JSON", |p| export_json(&episode.records, p));
    }
}

fn write_or_fail(path: &Path, kind: &str, write: impl FnOnce(&Path) -> std::io::Result<()>) {
    if let Err(e) = write(path) {
        fail(format!("failed to write {kind}: {e}"));
    }
    eprintln!("{kind} telemetry written to {}", path.display());
}
