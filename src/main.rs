mod logging;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::info;

use specver::check::{ReportFormatter, check};
use specver::component::{Component, FileReview, review_files};
use specver::config::{Config, log_path, parse_targets};
use specver::parser::{SpecMetadata, SpecParser};
use specver::version::cache::{ArtifactCache, ArtifactStore, download_artifact};
use specver::version::checker::{VersionChecker, overall_version, per_target_versions};
use specver::version::ordering::VersionString;
use specver::version::target::{ComponentSource, TargetId};
use specver::version::targets::RubyGemsRegistry;
use specver::version::tree::{TreeOptions, dependency_versions};

#[derive(Parser)]
#[command(name = "specver")]
#[command(version, about = "Reconcile RPM spec versions against upstream and downstream sources")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Comma separated targets to query (gem,koji,fedora,git,yum,bodhi,errata,upstream)
    #[arg(long, global = true)]
    targets: Option<String>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Report dependencies downstream cannot satisfy and what to update them to
    Check(CheckArgs),

    /// Show the versions every target knows of a component
    Versions {
        name: String,

        /// Also show versions of every dependency
        #[arg(long)]
        recursive: bool,
    },

    /// Parse a spec file and print its metadata and file review as JSON
    Parse {
        file: PathBuf,

        /// Print the re-rendered spec instead of JSON
        #[arg(long)]
        render: bool,
    },

    /// Download a component artifact through the local cache
    Fetch { name: String, version: String },
}

#[derive(Args)]
struct CheckArgs {
    /// Check the dependencies of a spec file
    #[arg(long, required_unless_present = "gem", conflicts_with = "gem")]
    spec: Option<PathBuf>,

    /// Check the dependencies of an upstream gem
    #[arg(long)]
    gem: Option<String>,

    /// Include development dependencies
    #[arg(long)]
    devel_deps: bool,

    /// Only check direct dependencies
    #[arg(long)]
    no_recursive: bool,
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    config.apply_process_env()?;

    if let Some(targets) = &cli.targets {
        config.targets.enabled = parse_targets(targets)?;
    }
    if let Command::Check(args) = &cli.command {
        config.devel_deps |= args.devel_deps;
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let _guard = logging::init(&log_path(), cli.verbose)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli, config))
}

async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    let color = !cli.no_color;

    match cli.command {
        Command::Check(args) => run_check(&config, &args, color).await,
        Command::Versions { name, recursive } => run_versions(&config, &name, recursive).await,
        Command::Parse { file, render } => run_parse(&config, &file, render),
        Command::Fetch { name, version } => run_fetch(&config, &name, &version).await,
    }
}

async fn run_check(config: &Config, args: &CheckArgs, color: bool) -> anyhow::Result<()> {
    let registry = RubyGemsRegistry::new(&config.sources.rubygems_url);

    let root = match (&args.spec, &args.gem) {
        (Some(path), _) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read spec file {}", path.display()))?;
            let meta = SpecParser::new(&config.spec).parse(&content);
            Component::from_spec(&meta, &config.spec.capability)
        }
        (None, Some(name)) => registry
            .retrieve(name)
            .await
            .with_context(|| format!("Failed to retrieve {}", name))?,
        (None, None) => anyhow::bail!("either --spec or --gem is required"),
    };
    info!("Checking dependencies of {}", root.name);

    let options = TreeOptions {
        recursive: !args.no_recursive,
        dev_deps: config.devel_deps,
    };
    let checker = VersionChecker::from_config(config);
    let recs = check(&checker, &registry, &registry, &root, options).await;

    let formatter = ReportFormatter::new(color);
    formatter.write_report(&mut std::io::stdout().lock(), &recs)?;
    Ok(())
}

fn join_versions(versions: &[VersionString]) -> String {
    versions
        .iter()
        .map(VersionString::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

async fn run_versions(config: &Config, name: &str, recursive: bool) -> anyhow::Result<()> {
    let checker = VersionChecker::from_config(config);

    if recursive {
        let registry = RubyGemsRegistry::new(&config.sources.rubygems_url);
        let root = registry
            .retrieve(name)
            .await
            .with_context(|| format!("Failed to retrieve {}", name))?;
        let options = TreeOptions {
            recursive: true,
            dev_deps: config.devel_deps,
        };

        for (component, result) in dependency_versions(&checker, &registry, &root, options).await {
            println!("{}: {}", component, overall_version(&result));
            for (target, versions) in &result {
                println!("  {}: {}", target, join_versions(versions));
            }
        }
        return Ok(());
    }

    let observer = |target: TargetId, name: &str, versions: &[VersionString]| {
        info!("{} answered for {}: {}", target, name, join_versions(versions));
    };
    let result = checker.versions_for(name, Some(&observer)).await;

    for (target, versions) in &result {
        println!("{}: {}", target, join_versions(versions));
    }
    for (target, version) in per_target_versions(&result) {
        println!("{} version: {}", target, version);
    }
    println!("version: {}", overall_version(&result));
    Ok(())
}

#[derive(Serialize)]
struct ParseOutput<'a> {
    #[serde(flatten)]
    metadata: &'a SpecMetadata,
    /// Packages whose `%files` list ignorable or unmarked documentation files
    file_review: IndexMap<String, FileReview>,
}

fn run_parse(config: &Config, file: &Path, render: bool) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read spec file {}", file.display()))?;
    let meta = SpecParser::new(&config.spec).parse(&content);

    if render {
        print!("{}", meta.to_document());
    } else {
        let output = ParseOutput {
            metadata: &meta,
            file_review: review_files(&meta),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    }
    Ok(())
}

async fn run_fetch(config: &Config, name: &str, version: &str) -> anyhow::Result<()> {
    let cache = ArtifactCache::new(&config.cache_dir())?;
    let registry = RubyGemsRegistry::new(&config.sources.rubygems_url);

    let bytes = download_artifact(&cache, &registry, name, version).await?;
    info!("{}-{} is {} bytes", name, version, bytes.len());
    println!("{}", cache.path_for(name, version).display());
    Ok(())
}
