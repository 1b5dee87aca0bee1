use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use mta_rust_cppmap_core::{
    format_functions, format_project, ConfigFile, FunctionScanner, OutputFormat, Priority,
    ProjectScanner, ScanConfig,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cppmap")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Map the build topology and key header functions of C++ projects")]
#[command(long_about = "A Rust-based tool that gives a quick structural overview of a C++ \
    project without compiling it. `project` reads CMakeLists.txt and groups headers into \
    modules by directory; `functions` lists the functions declared in a header tree, \
    ranked into priority tiers by name.\n\n\
    All analysis is regex based and works on any text, including code that does not build.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Summarize build targets, modules and external dependencies
    Project {
        /// Project root directory
        root: PathBuf,

        #[command(flatten)]
        common: CommonArgs,
    },
    /// List function declarations found in a header directory
    Functions {
        /// Header directory to scan
        include_dir: PathBuf,

        /// Only show these tiers (comma separated, e.g. P0,P1)
        #[arg(long, value_delimiter = ',')]
        priority: Vec<String>,

        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args)]
pub struct CommonArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormatArg::Text)]
    pub format: OutputFormatArg,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Config file (defaults to <dir>/.cppmap.toml when present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Additional ignore patterns (glob style)
    #[arg(long, action = clap::ArgAction::Append)]
    pub ignore: Vec<String>,

    /// Apply the .gitignore found in the scanned directory
    #[arg(long)]
    pub gitignore: bool,

    /// Follow symbolic links while walking directories
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Parallel threads for the function scan (1 = sequential, 0 = auto)
    #[arg(long)]
    pub threads: Option<usize>,

    /// Show verbose progress and debug logs
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(ValueEnum, Clone, Debug)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Text,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Yaml => OutputFormat::Yaml,
            OutputFormatArg::Text => OutputFormat::Text,
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Defaults, then the config file, then command line flags
fn build_config(dir: &Path, common: &CommonArgs) -> anyhow::Result<ScanConfig> {
    let file = match &common.config {
        Some(path) => Some(
            ConfigFile::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
        ),
        None => ConfigFile::discover(dir)?,
    };

    let mut config = ScanConfig::new(dir.to_path_buf());
    if let Some(file) = file {
        config = config.with_file(file);
    }

    let mut ignore = config.ignore_patterns.clone();
    ignore.extend(common.ignore.iter().cloned());
    config = config.with_ignore_patterns(ignore);

    if common.gitignore {
        config = config.with_respect_gitignore(true);
    }
    if common.follow_symlinks {
        config = config.with_follow_symlinks(true);
    }
    if let Some(threads) = common.threads {
        config = config.with_threads(threads);
    }

    Ok(config)
}

fn parse_priorities(values: &[String]) -> anyhow::Result<Vec<Priority>> {
    values
        .iter()
        .map(|v| {
            Priority::parse(v)
                .with_context(|| format!("Unknown priority '{}' (expected P0, P1, P2 or P3)", v))
        })
        .collect()
}

fn spinner(verbose: bool, message: &'static str) -> Option<ProgressBar> {
    if !verbose {
        return None;
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message);
    Some(pb)
}

fn write_output(output: &str, path: Option<&Path>, verbose: bool) -> anyhow::Result<()> {
    if let Some(path) = path {
        fs::write(path, output)
            .with_context(|| format!("Failed to write output to {}", path.display()))?;
        if verbose {
            eprintln!("Output written to: {}", path.display());
        }
    } else {
        println!("{}", output);
    }
    Ok(())
}

fn run_project(root: &Path, common: &CommonArgs) -> anyhow::Result<()> {
    if !root.is_dir() {
        bail!("Directory does not exist: {}", root.display());
    }

    let config = build_config(root, common)?;
    let pb = spinner(common.verbose, "Analyzing project...");

    let scanner = ProjectScanner::new(config)?;
    let info = scanner.scan()?;

    if let Some(ref pb) = pb {
        pb.finish_with_message(format!(
            "Scanned {} files in {}ms",
            info.metadata.files_scanned, info.metadata.scan_duration_ms
        ));
    }

    let output = format_project(&info, common.format.clone().into())?;
    write_output(&output, common.output.as_deref(), common.verbose)
}

fn run_functions(include_dir: &Path, priority: &[String], common: &CommonArgs) -> anyhow::Result<()> {
    if !include_dir.is_dir() {
        bail!("Directory does not exist: {}", include_dir.display());
    }

    let priorities = parse_priorities(priority)?;
    let config = build_config(include_dir, common)?;
    let pb = spinner(common.verbose, "Scanning headers...");

    let scanner = FunctionScanner::new(config)?;
    let report = scanner.scan()?;

    if let Some(ref pb) = pb {
        pb.finish_with_message(format!(
            "Found {} functions in {} files ({}ms)",
            report.stats.total, report.metadata.files_scanned, report.metadata.scan_duration_ms
        ));
    }

    let report = if priorities.is_empty() {
        report
    } else {
        report.filter_to_priorities(&priorities)
    };

    let output = format_functions(&report, common.format.clone().into())?;
    write_output(&output, common.output.as_deref(), common.verbose)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Command::Project { root, common } => {
            init_logging(common.verbose);
            run_project(root, common)
        }
        Command::Functions {
            include_dir,
            priority,
            common,
        } => {
            init_logging(common.verbose);
            run_functions(include_dir, priority, common)
        }
    }
}
