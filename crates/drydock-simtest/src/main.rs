//! Dry-Dock Headless Scenario Harness
//!
//! Drives generated stations and hulks through the scheduler and checks
//! the orchestration invariants tick by tick. Runs entirely in-process on
//! the sandbox world.
//!
//! Usage:
//!   cargo run -p drydock-simtest
//!   cargo run -p drydock-simtest -- --verbose --seed 42
//!   cargo run -p drydock-simtest -- --config dock.json

use std::collections::BTreeSet;

use env_logger::{Builder, Target};
use log::LevelFilter;
use rand::rngs::StdRng;
use rand::SeedableRng;

use drydock_logic::assembly::{Assembly, AssemblySettings, DockMode, Platform};
use drydock_logic::config::DockConfig;
use drydock_logic::events::DockEvent;
use drydock_logic::geometry::Vec3;
use drydock_logic::ids::AssemblyId;
use drydock_logic::scheduler::DockCommand;
use drydock_logic::world::DockWorld;
use drydock_world::engine::DockEngine;
use drydock_world::generation::{build_station, generate_hulk, HulkConfig, HulkLayout, StationConfig, StationLayout};

const STEP: f32 = 0.5;
const HULK_ORIGIN: Vec3 = Vec3::new(2.5, 7.5, -2.5);

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

impl TestResult {
    fn new(name: &str, passed: bool, detail: String) -> Self {
        Self {
            name: name.into(),
            passed,
            detail,
        }
    }
}

struct Options {
    verbose: bool,
    seed: u64,
    config_path: Option<String>,
}

fn parse_args() -> Options {
    let mut options = Options {
        verbose: false,
        seed: 7,
        config_path: None,
    };
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--verbose" => options.verbose = true,
            "--seed" => {
                if let Some(seed) = args.next().and_then(|s| s.parse().ok()) {
                    options.seed = seed;
                }
            }
            "--config" => options.config_path = args.next(),
            other => eprintln!("ignoring unknown argument {}", other),
        }
    }
    options
}

fn init_logger(verbose: bool) {
    if std::env::var("RUST_LOG").is_ok() {
        env_logger::init();
        return;
    }
    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Warn };
    Builder::new()
        .target(Target::Stdout)
        .filter_level(LevelFilter::Warn)
        .filter_module("drydock_logic", level)
        .filter_module("drydock_world", level)
        .init();
}

fn main() {
    let options = parse_args();
    init_logger(options.verbose);
    println!("=== Dry-Dock Scenario Harness (seed {}) ===\n", options.seed);

    let mut results = Vec::new();

    // 1. Configuration
    let config = load_config(&options, &mut results).unwrap_or_default();
    if options.verbose {
        if let Ok(json) = serde_json::to_string_pretty(&config) {
            println!("{}\n", json);
        }
    }

    // 2. Station layout
    results.extend(validate_station(options.verbose));

    // 3. Grinding a derelict
    results.extend(validate_grind_hulk(&config, options.seed, options.verbose));

    // 4. Repairing a docked hulk
    results.extend(validate_weld_hulk(&config, options.seed, options.verbose));

    // 5. Lifecycle
    results.extend(validate_lifecycle(&config, options.seed));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || options.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!("\n=== RESULT: {}/{} passed, {} failed ===", passed, total, failed);

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── Scene helpers ───────────────────────────────────────────────────────

struct Scene {
    engine: DockEngine,
    station: StationLayout,
    hulk: HulkLayout,
    dock: AssemblyId,
}

fn scene(config: &DockConfig, seed: u64) -> Option<Scene> {
    let mut engine = DockEngine::new(config.clone());
    let station = build_station(&mut engine.world, Vec3::ZERO, &StationConfig::default())?;
    let mut rng = StdRng::seed_from_u64(seed);
    let hulk = generate_hulk(&mut engine.world, HULK_ORIGIN, &HulkConfig::default(), &mut rng)?;
    for tool in &station.tools {
        engine.switch_tool(*tool, true);
    }
    let dock = engine
        .add_dock(
            station.anchor,
            station.bay,
            &station.tools,
            Platform::Station,
            AssemblySettings::default(),
        )
        .ok()?;
    engine.update(0.0);
    Some(Scene {
        engine,
        station,
        hulk,
        dock,
    })
}

/// A target bound to two slots at once, if any.
fn shared_target(asm: &Assembly) -> Option<String> {
    let mut seen = BTreeSet::new();
    for tool in asm.tools() {
        for target in tool.slots().iter().flatten() {
            if !seen.insert(*target) {
                return Some(format!("{} held by two slots", target));
            }
        }
    }
    None
}

fn health(engine: &DockEngine, blocks: &[drydock_logic::ids::BlockKey]) -> f32 {
    blocks
        .iter()
        .filter_map(|key| engine.world.block(*key))
        .map(|info| info.integrity)
        .sum()
}

// ── 1. Configuration ────────────────────────────────────────────────────

fn load_config(options: &Options, results: &mut Vec<TestResult>) -> Option<DockConfig> {
    println!("--- Configuration ---");

    let defaults = DockConfig::default();
    let issues = defaults.validate();
    results.push(TestResult::new(
        "config_defaults_valid",
        issues.is_empty(),
        format!("{} issues", issues.len()),
    ));

    let broken = DockConfig {
        weld_rate: 0.0,
        max_beams: 0,
        ..DockConfig::default()
    };
    let issues = broken.validate();
    results.push(TestResult::new(
        "config_rejects_bad_values",
        issues.len() >= 2,
        format!("{:?}", issues),
    ));

    let path = options.config_path.as_ref()?;
    let loaded = std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|json| DockConfig::from_json_str(&json).map_err(|e| e.to_string()));
    match loaded {
        Ok(config) => {
            results.push(TestResult::new("config_file", true, format!("loaded {}", path)));
            Some(config)
        }
        Err(e) => {
            results.push(TestResult::new("config_file", false, e));
            None
        }
    }
}

// ── 2. Station ──────────────────────────────────────────────────────────

fn validate_station(_verbose: bool) -> Vec<TestResult> {
    println!("--- Station ---");
    let mut results = Vec::new();
    let mut engine = DockEngine::new(DockConfig::default());
    let Some(station) = build_station(&mut engine.world, Vec3::ZERO, &StationConfig::default()) else {
        results.push(TestResult::new("station_build", false, "generator failed".into()));
        return results;
    };

    let linked = station
        .tools
        .iter()
        .all(|tool| engine.world.conveyor_connected(*tool, station.cargo));
    results.push(TestResult::new(
        "station_tools_on_conveyor",
        linked,
        format!("{} tools", station.tools.len()),
    ));

    let rail_outside = engine
        .world
        .container_bounds(station.anchor)
        .map(|rail| !station.bay.contains_box(&rail))
        .unwrap_or(false);
    results.push(TestResult::new(
        "station_rail_outside_bay",
        rail_outside,
        "anchor never inside its own bay".into(),
    ));

    let too_few = engine.add_dock(
        station.anchor,
        station.bay,
        &station.tools[..1],
        Platform::Station,
        AssemblySettings::default(),
    );
    results.push(TestResult::new(
        "station_single_tool_rejected",
        too_few.is_err(),
        format!("{:?}", too_few),
    ));
    results
}

// ── 3. Grind ────────────────────────────────────────────────────────────

fn validate_grind_hulk(config: &DockConfig, seed: u64, verbose: bool) -> Vec<TestResult> {
    println!("--- Grind ---");
    let mut results = Vec::new();
    let Some(mut s) = scene(config, seed) else {
        results.push(TestResult::new("grind_scene", false, "scene generation failed".into()));
        return results;
    };

    let found = s
        .engine
        .assembly(s.dock)
        .map(|asm| asm.candidates().contains(&s.hulk.container))
        .unwrap_or(false);
    results.push(TestResult::new("grind_scan_finds_hulk", found, format!("{}", s.hulk.container)));

    let blocks = s.engine.world.block_count(s.hulk.container);
    let cmd = s.engine.command(s.dock, DockCommand::Grind);
    results.push(TestResult::new("grind_command_accepted", cmd.is_ok(), format!("{:?}", cmd)));

    let mut violation = None;
    let mut peak_power: f32 = 0.0;
    let mut ticks = 0;
    while ticks < 2000 {
        s.engine.update(STEP);
        ticks += 1;
        let Some(asm) = s.engine.assembly(s.dock) else { break };
        if violation.is_none() {
            violation = shared_target(asm);
        }
        peak_power = peak_power.max(asm.total_power());
        if asm.work_mode().is_none() {
            break;
        }
    }

    results.push(TestResult::new(
        "grind_no_shared_targets",
        violation.is_none(),
        violation.unwrap_or_else(|| format!("{} ticks clean", ticks)),
    ));

    let gone = !s.engine.world.container_alive(s.hulk.container);
    results.push(TestResult::new(
        "grind_dismantles_hulk",
        gone,
        format!("{} blocks in {} ticks", blocks, ticks),
    ));

    let salvage: u32 = s
        .station
        .tools
        .iter()
        .map(|tool| s.engine.world.inventory(*tool).values().sum::<u32>())
        .sum();
    results.push(TestResult::new(
        "grind_collects_salvage",
        salvage > 0,
        format!("{} items in tool inventories", salvage),
    ));

    let idle = config.power.idle * s.station.tools.len() as f32;
    results.push(TestResult::new(
        "grind_power_rises_with_beams",
        peak_power > idle,
        format!("peak {:.4} MW vs idle {:.4} MW", peak_power, idle),
    ));

    let settled = s
        .engine
        .assembly(s.dock)
        .map(|asm| asm.mode() == DockMode::Disabled && asm.occupied_slots() == 0)
        .unwrap_or(false);
    results.push(TestResult::new(
        "grind_disables_when_done",
        settled,
        "mode Disabled, no slot held".into(),
    ));

    if verbose {
        if let Some(asm) = s.engine.assembly(s.dock) {
            println!("{}", asm.status());
        }
    }
    results
}

// ── 4. Weld ─────────────────────────────────────────────────────────────

fn validate_weld_hulk(config: &DockConfig, seed: u64, verbose: bool) -> Vec<TestResult> {
    println!("--- Weld ---");
    let mut results = Vec::new();
    let Some(mut s) = scene(config, seed) else {
        results.push(TestResult::new("weld_scene", false, "scene generation failed".into()));
        return results;
    };

    let docked = s.engine.world.dock(s.station.connector, s.hulk.connector);
    results.push(TestResult::new("weld_hulk_docked", docked, "connectors joined".into()));

    let before = health(&s.engine, &s.hulk.damaged);
    let cmd = s.engine.command(s.dock, DockCommand::Weld);
    results.push(TestResult::new("weld_command_accepted", cmd.is_ok(), format!("{:?}", cmd)));

    let reachable = s
        .engine
        .assembly(s.dock)
        .map(|asm| asm.reachable_cargo().contains(&s.hulk.cargo))
        .unwrap_or(false);
    results.push(TestResult::new(
        "weld_hulk_cargo_reachable",
        reachable,
        "activation reconciles cargo".into(),
    ));

    let mut violation = None;
    for _ in 0..600 {
        s.engine.update(STEP);
        let Some(asm) = s.engine.assembly(s.dock) else { break };
        if violation.is_none() {
            violation = shared_target(asm);
        }
        if asm.work_mode().is_none() {
            break;
        }
    }
    results.push(TestResult::new(
        "weld_no_shared_targets",
        violation.is_none(),
        violation.unwrap_or_else(|| "clean".into()),
    ));

    let after = health(&s.engine, &s.hulk.damaged);
    results.push(TestResult::new(
        "weld_repairs_damage",
        s.hulk.damaged.is_empty() || after > before,
        format!("{:.1} → {:.1} over {} damaged blocks", before, after, s.hulk.damaged.len()),
    ));

    let events = s.engine.drain_events();
    let assigned = events
        .iter()
        .filter(|e| matches!(e, DockEvent::SlotAssigned { .. }))
        .count();
    let cleared = events
        .iter()
        .filter(|e| matches!(e, DockEvent::SlotCleared { .. }))
        .count();
    results.push(TestResult::new(
        "weld_slot_events_balance",
        cleared <= assigned,
        format!("{} assigned, {} cleared", assigned, cleared),
    ));

    if verbose {
        if let Some(asm) = s.engine.assembly(s.dock) {
            println!("{}", asm.status());
        }
    }
    results
}

// ── 5. Lifecycle ────────────────────────────────────────────────────────

fn validate_lifecycle(config: &DockConfig, seed: u64) -> Vec<TestResult> {
    println!("--- Lifecycle ---");
    let mut results = Vec::new();
    let Some(mut s) = scene(config, seed) else {
        results.push(TestResult::new("lifecycle_scene", false, "scene generation failed".into()));
        return results;
    };

    let _ = s.engine.command(s.dock, DockCommand::Grind);
    s.engine.update(STEP);
    let _ = s.engine.command(s.dock, DockCommand::Disable);
    let refused = s.engine.command(s.dock, DockCommand::Weld);
    results.push(TestResult::new(
        "lifecycle_activate_refused_while_pending",
        refused.is_err(),
        format!("{:?}", refused),
    ));

    s.engine.update(STEP);
    let cleared = s
        .engine
        .assembly(s.dock)
        .map(|asm| asm.occupied_slots() == 0 && asm.pool().is_empty())
        .unwrap_or(false);
    results.push(TestResult::new(
        "lifecycle_disable_clears_work",
        cleared,
        "slots and pool empty after commit".into(),
    ));

    s.engine.world.destroy(s.station.anchor);
    s.engine.update(STEP);
    let gone = s.engine.assembly(s.dock).is_none();
    results.push(TestResult::new(
        "lifecycle_lost_anchor_unregisters",
        gone,
        "registry pruned".into(),
    ));

    s.engine.shutdown();
    results.push(TestResult::new(
        "lifecycle_shutdown",
        !s.engine.scheduler.is_running(),
        "session stopped".into(),
    ));
    results
}
