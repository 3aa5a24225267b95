//! CLI driver: program manifest(s) → (java | matches)
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;
use tracing::warn;

use crate::codegen::JavaBackend;
use crate::error::SilverError;
use crate::ir::GeneratedType;
use crate::manifest::Manifest;
use crate::model::{InterfaceDescriptor, ProgramModel};
use crate::program::Program;
use crate::report::PassReport;
use crate::synth::{self, DEFAULT_SUFFIX, SynthOptions, Synthesizer};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// generate interface implementations that expose precomputed sets of matching types
#[derive(Parser, Debug)]
#[command(name = "silver")]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// generate Java implementation sources
    Java(JavaOut),
    /// print what every target method would select, as JSON
    Matches(MatchesOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// JSON Pointer to the manifest within each document (e.g. /units/0)
    #[arg(long)]
    json_pointer: Option<String>,

    /// One or more program manifests. May be literal paths or quoted glob patterns.
    /// Each file is an independent compilation unit.
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(Args, Debug, Clone)]
struct TargetSettings {
    /// target interface (qualified name); repeatable. Defaults to the manifest's
    /// `targets`, then to every declared interface annotated `org.silver.Silver`
    #[arg(long = "interface")]
    interfaces: Vec<String>,

    /// appended to the interface name to name the implementation
    #[arg(long, default_value = DEFAULT_SUFFIX)]
    suffix: String,
}

#[derive(clap::Parser, Debug)]
struct JavaOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    target_settings: TargetSettings,

    /// output source root (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct MatchesOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    target_settings: TargetSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

/// One loaded compilation unit.
struct Unit {
    origin: String,
    manifest: Manifest,
    program: Program,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load_units(&self) -> anyhow::Result<Vec<Unit>> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;
        let mut units = Vec::with_capacity(source_paths.len());
        for source_path in source_paths {
            let origin = source_path.to_string_lossy().to_string();
            let source = std::fs::read_to_string(&source_path)
                .with_context(|| format!("failed to read source file ({origin})"))?;
            let manifest = match self.json_pointer.as_ref() {
                None => Manifest::parse(&source, &origin)?,
                Some(pointer) => {
                    let document = serde_json::from_str::<serde_json::Value>(&source)
                        .with_context(|| format!("failed to parse JSON source file ({origin})"))?;
                    let Some(selected) = document.pointer(pointer) else {
                        bail!("JSON pointer {pointer} selects nothing in {origin}");
                    };
                    Manifest::from_value(selected.clone(), &origin)?
                }
            };
            let program = manifest.to_program()?;
            units.push(Unit { origin, manifest, program });
        }
        Ok(units)
    }
}

impl TargetSettings {
    fn options(&self) -> SynthOptions {
        SynthOptions { suffix: self.suffix.clone() }
    }

    fn targets(&self, unit: &Unit) -> Vec<String> {
        if !self.interfaces.is_empty() {
            return self.interfaces.clone();
        }
        if !unit.manifest.targets.is_empty() {
            return unit.manifest.targets.clone();
        }
        unit.program
            .marked_interfaces()
            .into_iter()
            .map(|ty| unit.program.qualified_name(ty).to_string())
            .collect()
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> anyhow::Result<()> {
        match &self.cmd {
            Command::Java(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(());
                }
                let options = target.target_settings.options();
                let mut backend = JavaBackend::new();
                let mut failed = 0;
                for unit in target.input_settings.load_units()? {
                    let names = target.target_settings.targets(&unit);
                    failed += generate_unit(&unit, &names, &options, &mut backend);
                }

                if let Some(out) = target.out.as_ref() {
                    let written = backend
                        .write_to(out)
                        .with_context(|| format!("failed to write sources under {}", out.display()))?;
                    for path in written {
                        eprintln!("{} {}", "wrote".green(), path.display());
                    }
                } else {
                    for (_, unit) in backend.units() {
                        println!("{}", unit.source);
                    }
                }
                finish(failed)
            }
            Command::Matches(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(());
                }
                let options = target.target_settings.options();
                let mut reports = Vec::new();
                let mut failed = 0;
                for unit in target.input_settings.load_units()? {
                    let names = target.target_settings.targets(&unit);
                    failed += report_unit(&unit, &names, &options, &mut reports);
                }

                let json = serde_json::to_string_pretty(&reports)?;
                if let Some(out) = target.out.as_ref() {
                    if let Some(parent) = out.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(out, &json)
                        .with_context(|| format!("failed to write {}", out.display()))?;
                } else {
                    println!("{json}");
                }
                finish(failed)
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// PASSES
// ————————————————————————————————————————————————————————————————————————————

/// Describes every target in parallel, then emits in target order.
/// Returns the number of failed targets.
fn generate_unit(unit: &Unit, names: &[String], options: &SynthOptions, backend: &mut JavaBackend) -> usize {
    let roots = unit.program.roots();
    let synth = Synthesizer::new(&unit.program, &roots, options);
    let described: Vec<(&String, Result<GeneratedType, SilverError>)> = names
        .par_iter()
        .map(|name| (name, resolve_target(&unit.program, name).and_then(|iface| synth.describe(&iface))))
        .collect();

    let mut failed = 0;
    for (name, result) in described {
        match result.and_then(|generated| synth::emit(&generated, backend).map(|_| generated)) {
            Ok(generated) => {
                eprintln!("{} {} → {}", "generated".green(), name, generated.qualified_name());
            }
            Err(error) => {
                failed += 1;
                report_failure(&unit.origin, name, &error);
            }
        }
    }
    failed
}

fn report_unit(unit: &Unit, names: &[String], options: &SynthOptions, reports: &mut Vec<PassReport>) -> usize {
    let roots = unit.program.roots();
    let synth = Synthesizer::new(&unit.program, &roots, options);
    let results: Vec<(&String, Result<PassReport, SilverError>)> = names
        .par_iter()
        .map(|name| {
            let report = resolve_target(&unit.program, name).map(|iface| {
                let members = synth.members(&iface);
                PassReport::new(&unit.program, &iface, synth.generated_name(&iface), &members)
            });
            (name, report)
        })
        .collect();

    let mut failed = 0;
    for (name, result) in results {
        match result {
            Ok(report) => reports.push(report),
            Err(error) => {
                failed += 1;
                report_failure(&unit.origin, name, &error);
            }
        }
    }
    failed
}

fn resolve_target(program: &Program, name: &str) -> Result<InterfaceDescriptor, SilverError> {
    let ty = program.lookup(name).ok_or_else(|| SilverError::UnknownType { name: name.to_string() })?;
    program.interface(ty).ok_or_else(|| SilverError::NotAnInterface { name: name.to_string() })
}

fn report_failure(origin: &str, name: &str, error: &SilverError) {
    warn!(origin, interface = name, %error, "generation pass failed");
    eprintln!("{} {name} ({origin}): {error}", "failed".red());
}

fn finish(failed: usize) -> anyhow::Result<()> {
    if failed > 0 {
        bail!("{failed} target(s) failed");
    }
    Ok(())
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn resolve_file_path_patterns<I>(patterns: I) -> anyhow::Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{' ))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                // Pattern was explicitly a glob but matched nothing -> surface as an error
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
