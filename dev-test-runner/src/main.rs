//! Compiles every form under `samples/` against every built-in binding and
//! checks that output is stable across runs and that the default payload
//! lists every field.
use std::path::{Path, PathBuf};

use colored::Colorize;
use config_gui_gen::logging::{init_logging, LoggingConfig};
use config_gui_gen::{compile, lower, parser, CompileOptions, Registry};

fn samples_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("samples")
}

fn sample_files() -> Vec<PathBuf> {
    let mut files = std::fs::read_dir(samples_dir())
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .map(|e| e.path())
                .filter(|p| p.extension().is_some_and(|ext| ext == "html"))
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    files.sort();
    files
}

fn run_sample(path: &Path, registry: &Registry) -> Result<usize, String> {
    let source = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    let spec = parser::parse_str(&source).map_err(|e| e.to_string())?;

    let payload = lower::default_payload(&spec);
    let keys = payload.as_object().map(|o| o.len()).unwrap_or_default();
    if keys != lower::fields(&spec).len() {
        return Err(format!("default payload has {keys} key(s), form has {} field(s)", lower::fields(&spec).len()));
    }

    let mut checked = 0;
    for descriptor in registry.iter() {
        let options = CompileOptions {
            language: descriptor.language.clone(),
            module: descriptor.module.clone(),
            ..CompileOptions::default()
        };
        let first = compile(&source, &options, registry).map_err(|e| e.to_string())?.render();
        let second = compile(&source, &options, registry).map_err(|e| e.to_string())?.render();
        if first != second {
            return Err(format!("{}/{}: output differs between runs", descriptor.language, descriptor.module));
        }
        log::debug!("{}: {}/{} ok", path.display(), descriptor.language, descriptor.module);
        checked += 1;
    }
    Ok(checked)
}

fn main() {
    init_logging(LoggingConfig::default());
    let registry = Registry::builtin();
    let files = sample_files();
    if files.is_empty() {
        eprintln!("{} no samples found in {}", "error:".red().bold(), samples_dir().display());
        std::process::exit(1);
    }

    let mut failed = 0;
    for path in &files {
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        match run_sample(path, &registry) {
            Ok(bindings) => println!("{} {name} ({bindings} binding(s))", "PASS".green().bold()),
            Err(message) => {
                failed += 1;
                println!("{} {name}: {message}", "FAIL".red().bold());
            }
        }
    }

    println!();
    println!("{} sample(s), {} failed", files.len(), failed);
    if failed > 0 {
        std::process::exit(1);
    }
}
