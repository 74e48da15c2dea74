//! Command line front end: generate | model | defaults | check | bindings
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use crate::binding::Registry;
use crate::codegen::{EmitOptions, DEFAULT_DATA_NAME, DEFAULT_WINDOW_NAME};
use crate::CompileOptions;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// code generator for ConfigData and ConfigWindow in GUI softwares
#[derive(Parser, Debug)]
#[command(name = "config-gui-gen", version)]
pub struct CommandLineInterface {
    /// more log output (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// compile a form into ConfigData/ConfigWindow source
    Generate(GenerateOut),
    /// parse a form and print its model as JSON
    Model(ModelOut),
    /// print the config file a fresh install would write
    Defaults(ModelOut),
    /// parse one or more forms and report errors
    Check(CheckIn),
    /// list supported languages and modules
    Bindings(RegistrySettings),
}

#[derive(Args, Debug, Clone)]
struct RegistrySettings {
    /// JSON file with extra binding descriptors
    #[arg(long)]
    bindings: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct GenerateOut {
    /// input file path (*.html)
    #[arg(short, long)]
    input: PathBuf,

    /// output file path (*.py)
    #[arg(short, long)]
    output: PathBuf,

    /// write ConfigData to this file instead of the output file
    #[arg(long)]
    data_out: Option<PathBuf>,

    /// class name of ConfigData
    #[arg(long = "data-name", visible_alias = "dn", default_value = DEFAULT_DATA_NAME)]
    data_name: String,

    /// class name of ConfigWindow
    #[arg(long = "window-name", visible_alias = "wn", default_value = DEFAULT_WINDOW_NAME)]
    window_name: String,

    /// language of code
    #[arg(short, long, default_value = "Python3")]
    language: String,

    /// module name of GUI software
    #[arg(short, long, default_value = "PyQt5")]
    module: String,

    /// overwrite existing output files
    #[arg(long, default_value_t = false)]
    force: bool,

    #[command(flatten)]
    registry: RegistrySettings,
}

#[derive(Args, Debug, Clone)]
struct ModelOut {
    /// input file path (*.html)
    #[arg(short, long)]
    input: PathBuf,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct CheckIn {
    /// literal paths or quoted glob patterns
    #[arg(num_args = 1.., required = true)]
    inputs: Vec<String>,

    /// language of code
    #[arg(short, long, default_value = "Python3")]
    language: String,

    /// module name of GUI software
    #[arg(short, long, default_value = "PyQt5")]
    module: String,

    #[command(flatten)]
    registry: RegistrySettings,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl RegistrySettings {
    fn load(&self) -> Result<Registry> {
        let mut registry = Registry::builtin();
        if let Some(path) = &self.bindings {
            registry.load_file(path)?;
        }
        Ok(registry)
    }
}

impl GenerateOut {
    fn run(&self) -> Result<()> {
        let registry = self.registry.load()?;

        let input = absolute(&self.input)?;
        let output = absolute(&self.output)?;
        let data_out = self.data_out.as_deref().map(absolute).transpose()?;
        if !input.exists() {
            bail!("input file \"{}\" not found", input.display());
        }
        if data_out.as_ref() == Some(&output) {
            bail!("--data-out and --output both point to \"{}\"", output.display());
        }
        for out in std::iter::once(&output).chain(data_out.as_ref()) {
            self.check_destination(out)?;
        }

        let data_module = match &data_out {
            None => None,
            Some(path) => Some(
                path.file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .with_context(|| format!("cannot derive a module name from \"{}\"", path.display()))?,
            ),
        };
        let options = CompileOptions {
            language: self.language.clone(),
            module: self.module.clone(),
            emit: EmitOptions {
                data_name: self.data_name.clone(),
                window_name: self.window_name.clone(),
                data_module,
            },
        };

        let emitted = crate::compile_file(&input, &options, &registry)?;
        match &data_out {
            None => crate::write_output(&output, &emitted.render())?,
            Some(data_path) => {
                let (data_src, window_src) = emitted.sources();
                crate::write_output(data_path, &data_src)?;
                if let Err(error) = crate::write_output(&output, &window_src) {
                    // never leave a data module without its dialog
                    if let Err(cleanup) = std::fs::remove_file(data_path) {
                        log::warn!("could not remove {}: {cleanup}", data_path.display());
                    }
                    return Err(error.into());
                }
            }
        }
        eprintln!("{} {}", "generated".green().bold(), output.display());
        Ok(())
    }

    fn check_destination(&self, out: &Path) -> Result<()> {
        if let Some(dir) = out.parent() {
            if !dir.exists() {
                bail!("output file directory \"{}\" not found", dir.display());
            }
        }
        if out.exists() && !self.force {
            bail!("output file \"{}\" already exists (use --force to overwrite)", out.display());
        }
        Ok(())
    }
}

impl ModelOut {
    fn run(&self, render: impl FnOnce(&crate::FormSpec) -> Result<String>) -> Result<()> {
        let source = std::fs::read_to_string(&self.input)
            .with_context(|| format!("failed to read \"{}\"", self.input.display()))?;
        let spec = crate::parser::parse_str(&source)
            .with_context(|| format!("invalid form \"{}\"", self.input.display()))?;
        let json_src = render(&spec)?;
        if let Some(out) = self.out.as_ref() {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)?;
            }
            crate::write_output(out, &json_src)?;
        } else {
            println!("{json_src}");
        }
        Ok(())
    }
}

impl CheckIn {
    /// Runs everything `generate` would, short of writing files.
    fn run(&self) -> Result<()> {
        let registry = self.registry.load()?;
        let emitter = registry.resolve(&self.language, &self.module)?.emitter();
        let paths = resolve_file_path_patterns(&self.inputs)?;
        let mut failed = 0usize;
        for path in &paths {
            let result = std::fs::read_to_string(path).map_err(anyhow::Error::from).and_then(|src| {
                let spec = crate::parser::parse_str(&src)?;
                crate::emit_spec(&spec, emitter.as_ref(), &EmitOptions::default())?;
                Ok(spec)
            });
            match result {
                Ok(spec) => {
                    let fields = crate::lower::fields(&spec).len();
                    println!("{} {} ({fields} field(s))", "ok".green().bold(), path.display());
                }
                Err(error) => {
                    failed += 1;
                    println!("{} {}: {error}", "error".red().bold(), path.display());
                }
            }
        }
        if failed > 0 {
            bail!("{failed} of {} form(s) failed", paths.len());
        }
        Ok(())
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn verbosity(&self) -> u8 {
        self.verbose
    }

    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Generate(target) => target.run(),
            Command::Model(target) => target.run(|spec| Ok(serde_json::to_string_pretty(spec)?)),
            Command::Defaults(target) => {
                target.run(|spec| Ok(serde_json::to_string_pretty(&crate::lower::default_payload(spec))?))
            }
            Command::Check(target) => target.run(),
            Command::Bindings(settings) => {
                let registry = settings.load()?;
                println!("Supported languages and modules:");
                for (language, modules) in registry.languages() {
                    println!("  {}", language.to_uppercase());
                    for module in modules {
                        println!("    {}", module.to_uppercase());
                    }
                }
                Ok(())
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).with_context(|| format!("cannot resolve \"{}\"", path.display()))
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'['))
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
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
