//! ddc CLI
//!
//! Command-line tool for compiling designer CSV tables to JSON and protocol
//! code catalogs to Java, C#, Godot and Lua constants.

use clap::{Parser, Subcommand, ValueEnum};
use ddc_core::{
    run_protocols, run_tables, BoolPolicy, BuildManifest, DuplicatePolicy, EmptyInputPolicy,
    FileOrder, JsonStyle, ProtocolOptions, ProtocolReport, TableMode, TableOptions, TableReport,
    Target,
};
use log::debug;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ddc")]
#[command(about = "Data definition compiler for designer tables and protocol codes", long_about = None)]
#[command(version)]
struct Cli {
    /// Log per-row and per-entry detail
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile CSV tables into JSON documents
    Tables {
        /// Directory containing the CSV tables
        #[arg(short, long)]
        input_dir: PathBuf,

        /// Directory for the JSON documents
        #[arg(short, long)]
        output_dir: PathBuf,

        /// Table layout
        #[arg(short, long, value_enum, default_value_t = ModeArg::Keyed)]
        mode: ModeArg,

        /// Source text encoding
        #[arg(short, long, default_value = "utf-8")]
        encoding: String,

        /// CSV field delimiter
        #[arg(short, long, default_value_t = ',')]
        delimiter: char,

        /// File-name delimiter before the output name (default '@' keyed, '#' list)
        #[arg(short, long)]
        format: Option<String>,

        /// JSON layout
        #[arg(long, value_enum, default_value_t = StyleArg::Compact)]
        style: StyleArg,

        /// Read bool cells as true/false instead of non-empty/empty
        #[arg(long)]
        strict_bool: bool,

        /// Compile files sorted by name instead of directory order
        #[arg(long)]
        sorted: bool,

        /// Succeed when no tables are found
        #[arg(long)]
        allow_empty: bool,
    },

    /// Compile protocol definitions into constant declarations
    Protocol {
        /// Directory containing the JSON definition files
        #[arg(short, long)]
        input_dir: PathBuf,

        /// Directory for the generated files
        #[arg(short, long)]
        output_dir: PathBuf,

        /// Source text encoding
        #[arg(short, long, default_value = "utf-8")]
        encoding: String,

        /// Name of the generated class/table, also the file stem
        #[arg(short, long, default_value = ddc_core::emitter::DEFAULT_WRAPPER)]
        name: String,

        /// Banner comment text
        #[arg(long, default_value = ddc_core::emitter::DEFAULT_BANNER)]
        banner: String,

        /// Targets to emit (java, csharp, godot, lua); all when omitted
        #[arg(short, long = "target")]
        targets: Vec<Target>,

        /// Load files sorted by name instead of directory order
        #[arg(long)]
        sorted: bool,

        /// Succeed when no definition files are found
        #[arg(long)]
        allow_empty: bool,

        /// Fail instead of warning when a symbol name repeats
        #[arg(long)]
        deny_duplicates: bool,
    },

    /// Run every job in a build manifest
    Build {
        /// Path to manifest file (JSON)
        #[arg(short, long)]
        manifest: PathBuf,
    },

    /// Create a build manifest template
    InitManifest {
        /// Output path for the manifest file
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Keyed,
    List,
}

#[derive(Clone, Copy, ValueEnum)]
enum StyleArg {
    Compact,
    Spaced,
    Pretty,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stdout)
        .format_timestamp(None)
        .init();
}

fn run(command: Commands) -> ddc_core::Result<()> {
    match command {
        Commands::Tables {
            input_dir,
            output_dir,
            mode,
            encoding,
            delimiter,
            format,
            style,
            strict_bool,
            sorted,
            allow_empty,
        } => {
            let options = TableOptions {
                mode: match mode {
                    ModeArg::Keyed => TableMode::Keyed,
                    ModeArg::List => TableMode::List,
                },
                name_delimiter: format,
                delimiter,
                encoding,
                style: match style {
                    StyleArg::Compact => JsonStyle::Compact,
                    StyleArg::Spaced => JsonStyle::Spaced,
                    StyleArg::Pretty => JsonStyle::Pretty,
                },
                bools: if strict_bool {
                    BoolPolicy::Strict
                } else {
                    BoolPolicy::Truthy
                },
                order: file_order(sorted),
                empty_input: empty_input(allow_empty),
            };
            cmd_tables(&input_dir, &output_dir, &options)
        }
        Commands::Protocol {
            input_dir,
            output_dir,
            encoding,
            name,
            banner,
            targets,
            sorted,
            allow_empty,
            deny_duplicates,
        } => {
            let options = ProtocolOptions {
                name,
                banner,
                targets: if targets.is_empty() {
                    Target::ALL.to_vec()
                } else {
                    targets
                },
                encoding,
                order: file_order(sorted),
                empty_input: empty_input(allow_empty),
                duplicates: if deny_duplicates {
                    DuplicatePolicy::Reject
                } else {
                    DuplicatePolicy::Warn
                },
            };
            cmd_protocol(&input_dir, &output_dir, &options)
        }
        Commands::Build { manifest } => cmd_build(&manifest),
        Commands::InitManifest { output } => cmd_init_manifest(&output),
    }
}

fn file_order(sorted: bool) -> FileOrder {
    if sorted {
        FileOrder::Name
    } else {
        FileOrder::Listing
    }
}

fn empty_input(allow: bool) -> EmptyInputPolicy {
    if allow {
        EmptyInputPolicy::Allow
    } else {
        EmptyInputPolicy::Fail
    }
}

fn cmd_tables(input_dir: &Path, output_dir: &Path, options: &TableOptions) -> ddc_core::Result<()> {
    println!("Input: {}", input_dir.display());
    println!("Output: {}", output_dir.display());

    let report = run_tables(input_dir, output_dir, options)?;
    print_table_report(&report);
    Ok(())
}

fn cmd_protocol(input_dir: &Path, output_dir: &Path, options: &ProtocolOptions) -> ddc_core::Result<()> {
    println!("Input: {}", input_dir.display());
    println!("Output: {}", output_dir.display());

    let report = run_protocols(input_dir, output_dir, options)?;
    print_protocol_report(&report);
    Ok(())
}

fn print_table_report(report: &TableReport) {
    println!();
    println!(
        "Tables: {} written, {} skipped",
        report.written.len(),
        report.skipped.len()
    );
    for table in &report.written {
        println!("  {} -> {} ({} records)", table.source.display(), table.output.display(), table.records);
    }
    for table in &report.skipped {
        println!("  {} skipped: {}", table.source.display(), table.reason);
    }
}

fn print_protocol_report(report: &ProtocolReport) {
    println!();
    println!("Protocols: {} constants, {} files", report.entries, report.written.len());
    for path in &report.written {
        println!("  - {}", path.display());
    }
}

fn cmd_build(manifest_path: &Path) -> ddc_core::Result<()> {
    let manifest = BuildManifest::load(manifest_path)?;
    println!("Running manifest with {} job(s)", manifest.job_count());

    let mut errors = Vec::new();

    for job in &manifest.tables {
        println!();
        println!("Tables: {} -> {}", job.input_dir.display(), job.output_dir.display());
        debug!("table options: {:?}", job.options);
        match run_tables(&job.input_dir, &job.output_dir, &job.options) {
            Ok(report) => print_table_report(&report),
            Err(e) => errors.push((job.input_dir.clone(), e.to_string())),
        }
    }

    for job in &manifest.protocols {
        println!();
        println!("Protocols: {} -> {}", job.input_dir.display(), job.output_dir.display());
        debug!("protocol options: {:?}", job.options);
        match run_protocols(&job.input_dir, &job.output_dir, &job.options) {
            Ok(report) => print_protocol_report(&report),
            Err(e) => errors.push((job.input_dir.clone(), e.to_string())),
        }
    }

    if !errors.is_empty() {
        eprintln!("\nErrors ({}):", errors.len());
        for (path, err) in &errors {
            eprintln!("  {}: {}", path.display(), err);
        }
        std::process::exit(1);
    }

    println!();
    println!("Build complete");
    Ok(())
}

fn cmd_init_manifest(output: &Path) -> ddc_core::Result<()> {
    BuildManifest::template().save(output)?;
    println!("Created manifest: {}", output.display());
    println!();
    println!("Edit the file to configure your jobs, then run:");
    println!("  ddc build --manifest {}", output.display());

    Ok(())
}
