//! # Coilform CLI
//!
//! Command-line front end for spring design files (`.spd`).
//!
//! ```text
//! springcalc init front.spd --designer "Jane" --code RS-001
//! springcalc analyze front.spd --json
//! springcalc check front.spd
//! springcalc calibrate front.spd --samples rig_run_07.json --record
//! springcalc fea-request front.spd --mesh fine
//! ```
//!
//! Set `RUST_LOG` or pass `-v` for pipeline tracing on stderr.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use spring_core::analysis::{analyze, calibrate_design, SpringAnalysis};
use spring_core::calculations::calibration::CalibrationResult;
use spring_core::calculations::rules::{worst_severity, Severity};
use spring_core::design::{SpringDesign, TestRecord};
use spring_core::errors::{SpringError, SpringResult};
use spring_core::fea::{FeaJobRequest, MeshLevel};
use spring_core::file_io::{
    load_design_with_lock_check, load_experimental_data, save_design, update_design, DesignLock,
};
use spring_core::materials::MaterialModel;
use spring_core::validation::validate;

#[derive(Parser)]
#[command(name = "springcalc", version, about = "Variable-geometry helical spring calculator")]
struct Cli {
    /// Debug-level tracing on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a new design file with default laws
    Init {
        path: PathBuf,
        #[arg(long, default_value = "designer")]
        designer: String,
        #[arg(long, default_value = "RS-001")]
        code: String,
        /// Material preset, e.g. "SAE 9254"
        #[arg(long)]
        material: Option<String>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Run the full analysis pipeline
    Analyze {
        path: PathBuf,
        /// Print the full analysis as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validation and design rules only; exits non-zero on errors
    Check { path: PathBuf },
    /// Calibrate the design against measured force-deflection data
    Calibrate {
        path: PathBuf,
        /// JSON file with the test-rig samples
        #[arg(long)]
        samples: PathBuf,
        #[arg(long, default_value = "test run")]
        label: String,
        /// Store the samples as a test record in the design file
        #[arg(long)]
        record: bool,
        #[arg(long)]
        json: bool,
    },
    /// Print a structural solver job request for the design
    FeaRequest {
        path: PathBuf,
        #[arg(long, value_enum, default_value_t = MeshArg::Medium)]
        mesh: MeshArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum MeshArg {
    Coarse,
    Medium,
    Fine,
}

impl From<MeshArg> for MeshLevel {
    fn from(mesh: MeshArg) -> Self {
        match mesh {
            MeshArg::Coarse => MeshLevel::Coarse,
            MeshArg::Medium => MeshLevel::Medium,
            MeshArg::Fine => MeshLevel::Fine,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli.command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            if e.is_recoverable() {
                eprintln!("The design is open elsewhere; retry once the lock is released.");
            }
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!();
                eprintln!("Error JSON:");
                eprintln!("{}", json);
            }
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// `Ok(false)` means the command ran but the design did not pass.
fn run(command: Command) -> SpringResult<bool> {
    match command {
        Command::Init { path, designer, code, material, force } => {
            init(&path, designer, code, material, force)
        }
        Command::Analyze { path, json } => {
            let design = open(&path)?;
            let analysis = analyze(&design)?;
            if json {
                print_json(&analysis)?;
            } else {
                print_analysis(&design, &analysis);
            }
            Ok(analysis.passes())
        }
        Command::Check { path } => check(&path),
        Command::Calibrate { path, samples, label, record, json } => {
            calibrate(&path, &samples, label, record, json)
        }
        Command::FeaRequest { path, mesh } => {
            let design = open(&path)?;
            let analysis = analyze(&design)?;
            let request = FeaJobRequest::from_analysis(&design, &analysis, mesh.into())?;
            print_json(&request)?;
            Ok(true)
        }
    }
}

fn init(
    path: &Path,
    designer: String,
    code: String,
    material: Option<String>,
    force: bool,
) -> SpringResult<bool> {
    if path.exists() && !force {
        return Err(SpringError::file_error(
            "create",
            path.display().to_string(),
            "file exists; pass --force to overwrite",
        ));
    }
    let mut design = SpringDesign::new(designer, code);
    if let Some(name) = material {
        design.material = MaterialModel::from_preset(&name)?;
    }
    let _lock = DesignLock::acquire(path, design.meta.designer.clone())?;
    save_design(&design, path)?;
    info!(path = %path.display(), id = %design.id, "Design created");
    println!("Created {} ({})", path.display(), design.meta.design_code);
    Ok(true)
}

/// Load a design, warning when someone else holds the edit lock.
fn open(path: &Path) -> SpringResult<SpringDesign> {
    let (design, holder) = load_design_with_lock_check(path)?;
    if let Some(holder) = holder {
        warn!(
            user = %holder.user_id,
            machine = %holder.machine,
            "Design is open for editing elsewhere"
        );
    }
    Ok(design)
}

fn check(path: &Path) -> SpringResult<bool> {
    let design = open(path)?;
    let report = validate(&design);

    banner("DESIGN CHECK");
    println!();
    println!("Validation:");
    for issue in &report.errors {
        println!("  [ERROR] {}: {}", issue.field, issue.message);
    }
    for issue in &report.warnings {
        println!("  [WARN]  {}: {}", issue.field, issue.message);
    }
    if report.errors.is_empty() && report.warnings.is_empty() {
        println!("  {} no issues", status_icon(true));
    }
    if !report.is_valid() {
        println!();
        result_line(false, "validation");
        return Ok(false);
    }

    let analysis = analyze(&design)?;
    println!();
    print_findings(&analysis);
    println!();
    result_line(analysis.passes(), "design rules");
    Ok(analysis.passes())
}

fn calibrate(
    path: &Path,
    samples: &Path,
    label: String,
    record: bool,
    json: bool,
) -> SpringResult<bool> {
    let data = load_experimental_data(samples)?;

    if record {
        let result = update_design(path, whoami(), |design| {
            let analysis = analyze(design)?;
            let result = calibrate_design(design, &analysis, label.clone(), data.clone())?;
            let id = design.add_test_record(TestRecord::new(label, data));
            info!(record = %id, "Test record stored");
            Ok(result)
        })?;
        report_calibration(&result, json)?;
        return Ok(true);
    }

    let design = open(path)?;
    let analysis = analyze(&design)?;
    let result = calibrate_design(&design, &analysis, label, data)?;
    report_calibration(&result, json)?;
    Ok(true)
}

/// Lock holder name: the login user, falling back to a generic label.
fn whoami() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "springcalc".to_string())
}

fn report_calibration(result: &CalibrationResult, json: bool) -> SpringResult<()> {
    if json {
        return print_json(result);
    }

    banner("CALIBRATION RESULTS");
    println!();
    println!("Fit:");
    println!("  Rate:        {:.2} N/mm (R² = {:.4})", result.fit.slope, result.fit.r_squared);
    println!("  Deviation:   {:+.1}% vs theory", result.deviation.spring_rate_deviation_pct);
    println!("  Nonlinear:   {:.3}", result.deviation.nonlinearity_index);
    if let Some(h) = result.deviation.hysteresis_n {
        println!("  Hysteresis:  {:.1} N", h);
    }
    println!();
    println!("Effective parameters:");
    println!("  k ratio:     {:.4}", result.effective.stiffness_ratio);
    println!("  d:           {:.3} mm", result.effective.wire_diameter);
    println!("  D:           {:.2} mm", result.effective.mean_diameter);
    println!("  Na:          {:.2}", result.effective.active_coils);
    println!("  G:           {:.0} MPa", result.effective.shear_modulus);
    println!();
    for issue in &result.issues {
        println!("  [WARN] {}", issue);
    }
    for rec in &result.recommendations {
        println!("  - {}", rec);
    }
    println!();
    println!("═══════════════════════════════════════");
    println!("  QUALITY: {:?} (confidence {:.0}%)", result.quality, result.confidence * 100.0);
    println!("═══════════════════════════════════════");
    Ok(())
}

fn print_analysis(design: &SpringDesign, analysis: &SpringAnalysis) {
    let geometry = &analysis.geometry;

    banner("SPRING ANALYSIS RESULTS");
    println!();
    println!("Design: {} ({})", design.meta.design_code, design.material.name);
    println!();
    println!("Geometry:");
    println!("  Free length:   {:.2} mm", geometry.free_length);
    println!("  Solid height:  {:.2} mm", geometry.solid_height);
    println!("  Wire length:   {:.1} mm", geometry.wire_length);
    println!("  Mass:          {:.3} kg", geometry.mass_kg);
    println!("  Active turns:  {:.2}", geometry.active_turns);
    println!(
        "  Spring index:  {:.2} .. {:.2}",
        geometry.min_spring_index, geometry.max_spring_index
    );
    println!();
    println!("Stiffness:");
    println!("  Initial rate:  {:.2} N/mm", analysis.initial_rate);
    println!("  Travel:        {:.2} mm", analysis.curve.travel_to_solid);
    println!(
        "  F({:.1} mm) =   {:.0} N",
        analysis.reference_deflection, analysis.reference_force
    );

    for point in analysis.ride.iter().chain(analysis.bump.iter()) {
        println!(
            "  {:<5} x={:.1} mm  F={:.0} N  k={:.2} N/mm  τ={:.0} MPa",
            point.label, point.deflection, point.force, point.stiffness, point.shear_stress
        );
    }

    if let Some(fatigue) = &analysis.fatigue {
        println!();
        println!("Fatigue:");
        println!(
            "  τm / τa:       {:.0} / {:.0} MPa",
            fatigue.mean_stress, fatigue.alternating_stress
        );
        println!(
            "  Utilization:   {:.2} {}",
            fatigue.utilization,
            status_icon(fatigue.utilization <= 1.0)
        );
        println!("  Life:          {}", fatigue.life.display_name());
    }

    println!();
    print_findings(analysis);
    println!();
    result_line(analysis.passes(), "design rules");
}

fn print_findings(analysis: &SpringAnalysis) {
    println!("Design rules:");
    for finding in &analysis.findings {
        let tag = match finding.severity {
            Severity::Ok => "[OK]   ",
            Severity::Warning => "[WARN] ",
            Severity::Error => "[FAIL] ",
        };
        println!("  {} {:<20} {}", tag, finding.id, finding.message);
    }
    if worst_severity(&analysis.findings) == Severity::Warning {
        println!("  (warnings do not fail the design)");
    }
}

fn print_json<T: Serialize>(value: &T) -> SpringResult<()> {
    let json = serde_json::to_string_pretty(value).map_err(SpringError::serialization)?;
    println!("{}", json);
    Ok(())
}

fn banner(title: &str) {
    println!("═══════════════════════════════════════");
    println!("  {}", title);
    println!("═══════════════════════════════════════");
}

fn result_line(pass: bool, governs: &str) {
    println!("═══════════════════════════════════════");
    println!("  RESULT: {} ({})", if pass { "PASS" } else { "FAIL" }, governs);
    println!("═══════════════════════════════════════");
}

fn status_icon(pass: bool) -> &'static str {
    if pass { "[OK]" } else { "[FAIL]" }
}
