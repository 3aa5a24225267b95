//! Golden-fixture runner.
//!
//! Each case lives in `<fixtures>/<case>/`:
//! - `program.json`: the program manifest
//! - `expected/*.java`: sources the generator must emit, byte for byte
//! - `case.json` (optional): `{ "suffix": "...", "expect_errors": ["DuplicateGeneratedType"] }`
//!
//! usage: dev-test-runner [FIXTURES_DIR] [CASE_FILTER_REGEX]
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use silver::SilverError;
use silver::codegen::JavaBackend;
use silver::manifest::Manifest;
use silver::model::ProgramModel;
use silver::synth::{SynthOptions, Synthesizer};

static TRAILING_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+(\r?\n)").unwrap());

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct CaseSettings {
    #[serde(default)]
    suffix: Option<String>,
    #[serde(default)]
    expect_errors: Vec<String>,
}

fn normalize(src: &str) -> String {
    TRAILING_WS.replace_all(src, "$1").replace("\r\n", "\n")
}

fn error_kind(error: &SilverError) -> &'static str {
    match error {
        SilverError::DuplicateGeneratedType { .. } => "DuplicateGeneratedType",
        SilverError::DuplicateDeclaration { .. } => "DuplicateDeclaration",
        SilverError::UnknownType { .. } => "UnknownType",
        SilverError::NotAnInterface { .. } => "NotAnInterface",
        SilverError::Manifest { .. } => "Manifest",
        SilverError::Io(_) => "Io",
    }
}

fn run_case(dir: &Path) -> Result<(), String> {
    let settings = match std::fs::read_to_string(dir.join("case.json")) {
        Ok(src) => serde_json::from_str::<CaseSettings>(&src).map_err(|e| format!("case.json: {e}"))?,
        Err(_) => CaseSettings::default(),
    };
    let manifest = Manifest::load(&dir.join("program.json")).map_err(|e| e.to_string())?;
    let program = manifest.to_program().map_err(|e| e.to_string())?;

    let targets: Vec<String> = if manifest.targets.is_empty() {
        program.marked_interfaces().into_iter().map(|t| program.qualified_name(t).to_string()).collect()
    } else {
        manifest.targets.clone()
    };

    let mut options = SynthOptions::default();
    if let Some(suffix) = settings.suffix {
        options.suffix = suffix;
    }
    let roots = program.roots();
    let synth = Synthesizer::new(&program, &roots, &options);
    let mut backend = JavaBackend::new();
    let mut errors = Vec::new();
    for name in &targets {
        let Some(iface) = program.lookup(name).and_then(|t| program.interface(t)) else {
            return Err(format!("target {name} is not a declared interface"));
        };
        if let Err(error) = synth.synthesize(&iface, &mut backend) {
            errors.push(error_kind(&error).to_string());
        }
    }
    if errors != settings.expect_errors {
        return Err(format!("errors {errors:?}, expected {:?}", settings.expect_errors));
    }

    let mut expected_files: Vec<PathBuf> = match std::fs::read_dir(dir.join("expected")) {
        Ok(entries) => entries.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
        Err(_) => Vec::new(),
    };
    expected_files.sort();
    if expected_files.len() != backend.len() {
        return Err(format!("emitted {} unit(s), expected {}", backend.len(), expected_files.len()));
    }
    for path in expected_files {
        let file_name = path.file_name().map(|f| f.to_string_lossy().to_string()).unwrap_or_default();
        let Some((_, unit)) = backend.units().find(|(_, u)| format!("{}.java", u.simple_name) == file_name) else {
            return Err(format!("nothing emitted for {file_name}"));
        };
        let expected = std::fs::read_to_string(&path).map_err(|e| format!("{file_name}: {e}"))?;
        if normalize(&expected) != normalize(&unit.source) {
            return Err(format!("{file_name} differs:\n--- expected\n{expected}\n--- actual\n{}", unit.source));
        }
    }
    Ok(())
}

fn main() {
    let mut args = std::env::args().skip(1);
    let root = PathBuf::from(args.next().unwrap_or_else(|| "fixtures".to_string()));
    let filter = match args.next().map(|f| Regex::new(&f)) {
        Some(Ok(rx)) => Some(rx),
        Some(Err(error)) => {
            eprintln!("❌ invalid filter: {error}");
            std::process::exit(2);
        }
        None => None,
    };

    let mut cases: Vec<PathBuf> = match std::fs::read_dir(&root) {
        Ok(entries) => entries.filter_map(|e| e.ok()).map(|e| e.path()).filter(|p| p.is_dir()).collect(),
        Err(error) => {
            eprintln!("❌ cannot read {}: {error}", root.display());
            std::process::exit(2);
        }
    };
    cases.sort();

    let mut failed = 0;
    for case in cases {
        let name = case.file_name().map(|f| f.to_string_lossy().to_string()).unwrap_or_default();
        if filter.as_ref().is_some_and(|rx| !rx.is_match(&name)) {
            continue;
        }
        match run_case(&case) {
            Ok(()) => eprintln!("✅ {name}"),
            Err(error) => {
                failed += 1;
                eprintln!("❌ {name}: {error}");
            }
        }
    }
    if failed > 0 {
        std::process::exit(1);
    }
}
