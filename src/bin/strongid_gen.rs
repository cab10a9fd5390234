//! strongid-gen: runs the identifier generators over a compilation manifest.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use log::info;
use strongid_codegen::config::ROOT_NAMESPACE_PROPERTY;
use strongid_codegen::prelude::*;
use strongid_symbols::parse_manifest;

/// Generates value converters and persistence-context wiring for
/// strongly-typed identifiers.
#[derive(Parser, Debug)]
#[command(name = "strongid-gen")]
#[command(version)]
#[command(about = "Generates value converters and context wiring for strongly-typed identifiers")]
struct Cli {
    /// Compilation manifest (TOML)
    #[arg(value_name = "MANIFEST")]
    manifest: PathBuf,

    /// Generator configuration (TOML); defaults apply when omitted
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory to write artifacts to; artifacts are printed when omitted
    #[arg(long, value_name = "DIR")]
    out: Option<PathBuf>,

    /// Which entry points to run
    #[arg(long, value_enum, default_value_t = GeneratorChoice::All)]
    generator: GeneratorChoice,

    /// Overrides the manifest's root namespace build property
    #[arg(long, value_name = "NAMESPACE")]
    root_namespace: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum GeneratorChoice {
    /// Converters next to each identifier plus context wiring
    Wiring,
    /// Converters under the root namespace
    Converters,
    #[default]
    All,
}

fn generators(choice: GeneratorChoice, config: &GeneratorConfig) -> Vec<Box<dyn SourceGenerator>> {
    let wiring = || Box::new(ContextWiringGenerator::new(config.clone())) as Box<dyn SourceGenerator>;
    let converters = || Box::new(ValueConverterGenerator::new(config.clone())) as Box<dyn SourceGenerator>;
    match choice {
        GeneratorChoice::Wiring => vec![wiring()],
        GeneratorChoice::Converters => vec![converters()],
        GeneratorChoice::All => vec![wiring(), converters()],
    }
}

fn run(cli: Cli) -> anyhow::Result<bool> {
    let mut manifest = parse_manifest(&cli.manifest)
        .with_context(|| format!("Failed to load manifest '{}'", cli.manifest.display()))?;
    let config = match &cli.config {
        Some(path) => GeneratorConfig::load(path)
            .with_context(|| format!("Failed to load configuration '{}'", path.display()))?,
        None => GeneratorConfig::default(),
    };

    let mut properties = BuildProperties::from(std::mem::take(&mut manifest.build_properties));
    if let Some(root_namespace) = cli.root_namespace {
        properties = properties.with(ROOT_NAMESPACE_PROPERTY, root_namespace);
    }
    let compilation = manifest.into_compilation();
    let context = GeneratorContext::new(&compilation, &properties);

    let mut memory = MemorySink::new();
    let mut directory = match &cli.out {
        Some(dir) => Some(
            DirectorySink::create(dir).with_context(|| format!("Failed to create '{}'", dir.display()))?,
        ),
        None => None,
    };

    let mut succeeded = true;
    for generator in generators(cli.generator, &config) {
        let sink: &mut dyn ArtifactSink = match directory.as_mut() {
            Some(directory) => directory,
            None => &mut memory,
        };
        let outcome = run_generator(generator.as_ref(), &context, sink)
            .with_context(|| format!("Failed to commit artifacts of {}", generator.name()))?;
        match &outcome {
            PassOutcome::Completed { artifacts } => info!("{}: {artifacts} artifacts", generator.name()),
            PassOutcome::Cancelled { artifacts } => info!("{}: cancelled after {artifacts} artifacts", generator.name()),
            PassOutcome::Failed(report) => {
                eprintln!("{} failed: {}", generator.name(), report.message);
                succeeded = false;
            }
        }
    }

    match directory {
        Some(directory) => println!("Wrote {} artifacts to {}", directory.written(), directory.dir().display()),
        None => {
            for artifact in memory.artifacts() {
                println!("// ==> {}", artifact.hint_name);
                println!("{}", artifact.text);
            }
        }
    }
    Ok(succeeded)
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
