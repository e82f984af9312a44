//! cyclekit command-line front end.
//!
//! One binary over the library's jobs:
//! 1. **config:** Print preset configuration documents, or validate one.
//! 2. **trace:** Basic-block and pipeline-view reports from a commit trace database.
//! 3. **gcpt:** Checkpoint partition lists, run bookkeeping and cycle merging.

use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::EnvFilter;

use cyclekit_core::checkpoint::{self, Manifest};
use cyclekit_core::config::{SchedulerLayout, SchedulerPreset, SystemConfig, TargetIsa};
use cyclekit_core::trace::perfcct::{self, PerfCctOptions};
use cyclekit_core::trace::{self, GapMode, Platform, Tool, TraceQuery, bbl};

#[derive(Parser, Debug)]
#[command(
    name = "cyclekit",
    author,
    version,
    about = "Configuration, trace and checkpoint tooling for a cycle-accurate RISC-V simulator",
    long_about = "Configuration, trace and checkpoint tooling for a cycle-accurate RISC-V simulator.\n\nExamples:\n  cyclekit config show --scheduler ecore\n  cyclekit config check system.json\n  cyclekit trace cct.db --tool perfcct --start-pc 0x80000000 --end-pc 0x80000040\n  cyclekit gcpt list --manifest zebra.json --benchmark mcf"
)]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace). `RUST_LOG` overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print or validate configuration documents.
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Report on a commit trace database.
    Trace(TraceArgs),

    /// Manage checkpoint partitions.
    #[command(subcommand)]
    Gcpt(GcptCommand),
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print a configuration document as JSON.
    Show {
        /// Scheduler preset; replaces the scheduler of `--file` when both are given.
        #[arg(long)]
        scheduler: Option<SchedulerPreset>,

        /// Start from this document instead of the defaults.
        #[arg(long)]
        file: Option<PathBuf>,

        /// Target instruction set of the default document.
        #[arg(long, value_enum, default_value_t = TargetArg::Riscv)]
        target: TargetArg,
    },

    /// Load and validate a document, then summarise the elaborated scheduler.
    Check {
        /// Configuration document.
        file: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TargetArg {
    Riscv,
    X86,
    Arm,
}

impl From<TargetArg> for TargetIsa {
    fn from(arg: TargetArg) -> Self {
        match arg {
            TargetArg::Riscv => Self::Riscv,
            TargetArg::X86 => Self::X86,
            TargetArg::Arm => Self::Arm,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PlatformArg {
    Gem5,
    Rtl,
}

impl From<PlatformArg> for Platform {
    fn from(arg: PlatformArg) -> Self {
        match arg {
            PlatformArg::Gem5 => Self::Gem5,
            PlatformArg::Rtl => Self::Rtl,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ToolArg {
    Bbl,
    Perfcct,
}

impl From<ToolArg> for Tool {
    fn from(arg: ToolArg) -> Self {
        match arg {
            ToolArg::Bbl => Self::Bbl,
            ToolArg::Perfcct => Self::Perfcct,
        }
    }
}

fn parse_pc(text: &str) -> std::result::Result<u64, String> {
    perfcct::parse_pc(text).map_err(|e| format!("{e}"))
}

#[derive(Args, Debug)]
struct TraceArgs {
    /// SQLite database holding `LifeTimeCommitTrace`.
    sqldb: PathBuf,

    /// Ticks per clock cycle.
    #[arg(short, long, default_value_t = trace::db::DEFAULT_PERIOD)]
    period: u64,

    /// Trace producer; `rtl` forces a period of 1 and disassembles raw encodings.
    #[arg(short = 'P', long, value_enum, default_value_t = PlatformArg::Gem5)]
    platform: PlatformArg,

    /// First commit clock to analyze.
    #[arg(short, long, default_value_t = 0)]
    start_clock: u64,

    /// Last commit clock to analyze.
    #[arg(short, long)]
    end_clock: Option<u64>,

    /// Maximum number of instructions to analyze.
    #[arg(short, long)]
    num_insts: Option<u64>,

    /// Report per-stage differences between consecutive instructions.
    #[arg(long, conflicts_with = "inner_gap")]
    inter_gap: bool,

    /// Report differences between consecutive stages of each instruction.
    #[arg(long)]
    inner_gap: bool,

    /// Report to produce.
    #[arg(long, value_enum, default_value_t = ToolArg::Bbl)]
    tool: ToolArg,

    /// PCs to mark in the pipeline view.
    #[arg(long, num_args = 1.., value_parser = parse_pc)]
    attention_pc: Vec<u64>,

    /// Lowest PC in the pipeline view.
    #[arg(long, default_value = "0x0", value_parser = parse_pc)]
    start_pc: u64,

    /// Highest PC in the pipeline view.
    #[arg(long, default_value = "0xffffffffffffffff", value_parser = parse_pc)]
    end_pc: u64,

    /// Print only attention PCs.
    #[arg(long)]
    only_attention: bool,

    /// Hide the progress bar.
    #[arg(long)]
    no_progress: bool,
}

#[derive(Args, Debug)]
struct BenchArgs {
    /// Manifest (JSON) naming the trees, core count and benchmarks.
    #[arg(long)]
    manifest: PathBuf,

    /// Benchmark name from the manifest.
    #[arg(long)]
    benchmark: String,
}

#[derive(Subcommand, Debug)]
enum GcptCommand {
    /// Write the list of partitions that still have work.
    List {
        #[command(flatten)]
        bench: BenchArgs,
    },

    /// Record how many intervals each partition of a run produced.
    LineCount {
        #[command(flatten)]
        bench: BenchArgs,

        /// Run number.
        #[arg(long)]
        run_id: u32,

        /// Cycle output tree; defaults to `<gem5_home>/output/cycles`.
        #[arg(long)]
        cycles_dir: Option<PathBuf>,

        /// Run bookkeeping tree; defaults to `<gem5_home>/util/zebra/run_info`.
        #[arg(long)]
        run_info_dir: Option<PathBuf>,
    },

    /// Merge the cycle outputs of all runs into `cycle.txt`.
    Merge {
        #[command(flatten)]
        bench: BenchArgs,

        /// Cycle output tree; defaults to `<gem5_home>/output/cycles`.
        #[arg(long)]
        cycles_dir: Option<PathBuf>,
    },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Config(cmd) => cmd_config(cmd),
        Commands::Trace(args) => cmd_trace(&args),
        Commands::Gcpt(cmd) => cmd_gcpt(cmd),
    }
}

fn cmd_config(cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show {
            scheduler,
            file,
            target,
        } => {
            let mut config = match &file {
                Some(path) => SystemConfig::load(path)?,
                None => SystemConfig::new(target.into(), SchedulerPreset::default()),
            };
            if let Some(preset) = scheduler {
                config = config.with_scheduler(preset);
            }
            println!("{}", config.to_json_pretty()?);
        }
        ConfigCommand::Check { file } => {
            let config = SystemConfig::load(&file)?;
            let layout = config
                .validate()
                .with_context(|| format!("{} is not a valid configuration", file.display()))?;
            let mut out = BufWriter::new(io::stdout().lock());
            write_layout(&mut out, &layout)?;
            for (level, pf) in config.prefetchers()? {
                writeln!(out, "prefetcher {level}: {}", pf.kind)?;
            }
            out.flush()?;
        }
    }
    Ok(())
}

fn write_layout(out: &mut impl Write, layout: &SchedulerLayout) -> io::Result<()> {
    writeln!(
        out,
        "{} issue queues, {} out ports, {} register-file read ports",
        layout.iqs.len(),
        layout.combined_fus,
        layout.rf_type_port_count
    )?;
    for iq in &layout.iqs {
        let ops: Vec<String> = iq.op_classes.iter().map(ToString::to_string).collect();
        writeln!(
            out,
            "  {:8} ports {} stages {} {}: {}",
            iq.name,
            iq.int_claims.len(),
            iq.issue_stages,
            if iq.shared_selector { "shared" } else { "split" },
            ops.join(" ")
        )?;
        let wakes = layout.wakes(&iq.name);
        if !wakes.is_empty() {
            writeln!(out, "           wakes {}", wakes.join(" "))?;
        }
    }
    for warning in &layout.warnings {
        writeln!(out, "warning: {warning}")?;
    }
    Ok(())
}

fn progress_bar(label: &'static str) -> Result<ProgressBar> {
    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] {msg} [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})",
    )?
    .progress_chars("#-");
    Ok(ProgressBar::new(0).with_style(style).with_message(label))
}

fn cmd_trace(args: &TraceArgs) -> Result<()> {
    let mode = GapMode::from_flags(args.inter_gap, args.inner_gap)?;
    let query = TraceQuery {
        start_clock: args.start_clock,
        end_clock: args.end_clock,
        period: args.period,
        platform: args.platform.into(),
        limit: args.num_insts,
    };

    let bar = if args.no_progress {
        None
    } else {
        Some(progress_bar("Reading DB")?)
    };
    let analysis = trace::analyze(&args.sqldb, &query, mode, bar.as_ref())
        .with_context(|| format!("reading {}", args.sqldb.display()))?;
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    let mut out = BufWriter::new(io::stdout().lock());
    match Tool::from(args.tool) {
        Tool::Bbl => bbl::write_report(&mut out, &analysis)?,
        Tool::Perfcct => {
            let options = PerfCctOptions {
                start_pc: args.start_pc,
                end_pc: args.end_pc,
                attention_pcs: args.attention_pc.clone(),
                only_attention: args.only_attention,
            };
            perfcct::write_report(&mut out, &analysis.entries, &options)?;
        }
    }
    out.flush()?;
    Ok(())
}

fn load_manifest(bench: &BenchArgs) -> Result<Manifest> {
    let manifest = Manifest::load(&bench.manifest)
        .with_context(|| format!("loading manifest {}", bench.manifest.display()))?;
    let _ = manifest.benchmark(&bench.benchmark)?;
    Ok(manifest)
}

fn cmd_gcpt(cmd: GcptCommand) -> Result<()> {
    match cmd {
        GcptCommand::List { bench } => {
            let manifest = load_manifest(&bench)?;
            let list = checkpoint::gen_gcpt_list(&manifest, &bench.benchmark)?;
            println!(
                "{}: {} of {} partitions pending, written to {}",
                bench.benchmark,
                list.entries.len(),
                list.partitions,
                list.output.display()
            );
        }
        GcptCommand::LineCount {
            bench,
            run_id,
            cycles_dir,
            run_info_dir,
        } => {
            let manifest = load_manifest(&bench)?;
            let cycles = cycles_dir.unwrap_or_else(|| manifest.cycles_dir());
            let run_info = run_info_dir.unwrap_or_else(|| manifest.run_info_dir());
            let counts =
                checkpoint::line_count(&manifest, &bench.benchmark, run_id, &cycles, &run_info)?;
            info!("recorded {} partition counts", counts.len());
        }
        GcptCommand::Merge { bench, cycles_dir } => {
            let manifest = load_manifest(&bench)?;
            let cycles = cycles_dir.unwrap_or_else(|| manifest.cycles_dir());
            let summary = merge(&manifest, &bench.benchmark, &cycles)?;
            println!("total_line_count: {}", summary.total);
        }
    }
    Ok(())
}

fn merge(manifest: &Manifest, bench: &str, cycles: &Path) -> Result<checkpoint::MergeSummary> {
    let summary = checkpoint::merge_cycles(manifest, bench, cycles)
        .with_context(|| format!("merging cycles of {bench}"))?;
    for (part, lines) in summary.per_part.iter().enumerate() {
        println!("==> part_id: {} line_count: {lines}", part + 1);
    }
    Ok(summary)
}
