use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use gsa::index::{BuildOptions, IndexMethod, OccLayout};
use gsa::map::{self, MapOpt};
use gsa::search::SearchMethod;

#[derive(Parser, Debug)]
#[command(name = "gsa", author, version, about = "Genome scale read search with FM-index backward search", arg_required_else_help = true)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Preprocess a genome and store the index next to it
    Preprocess {
        /// Genome to preprocess (FASTA file)
        genome: PathBuf,
        /// Preprocessing to run
        #[arg(value_enum)]
        method: PreprocessMethod,
        /// Store the O table sampled every N positions instead of densely
        #[arg(long = "sampled-occ", value_name = "N")]
        sampled_occ: Option<usize>,
        #[arg(short = 't', long = "threads", default_value_t = 1)]
        threads: usize,
    },
    /// Search genome for reads
    Search {
        /// Genome to search in (FASTA file)
        genome: PathBuf,
        /// Reads to search for (FASTQ file)
        reads: PathBuf,
        /// File to write results in (stdout if omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
        #[command(flatten)]
        common: SearchArgs,
        #[command(subcommand)]
        kind: SearchKind,
    },
}

#[derive(Args, Debug)]
struct SearchArgs {
    /// Use an index built with --sampled-occ N
    #[arg(long = "sampled-occ", value_name = "N", global = true)]
    sampled_occ: Option<usize>,
    #[arg(short = 't', long = "threads", default_value_t = 1, global = true)]
    threads: usize,
}

#[derive(Subcommand, Debug)]
enum SearchKind {
    /// Run an exact pattern matching algorithm
    Exact {
        #[arg(value_enum)]
        algorithm: ExactAlgorithm,
    },
    /// Run an approximative pattern matching algorithm
    Approx {
        #[arg(value_enum)]
        algorithm: ApproxAlgorithm,
        /// Maximum number of edits
        #[arg(short = 'e', long = "edits", default_value_t = 1)]
        edits: usize,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PreprocessMethod {
    /// BWT for exact matching
    ExactBwt,
    /// BWT for approximative matching
    ApproxBwt,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ExactAlgorithm {
    Naive,
    Kmp,
    Border,
    Bmh,
    /// Burrows-Wheeler FM-index search
    Bwt,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ApproxAlgorithm {
    /// Burrows-Wheeler FM-index search
    Bwt,
}

fn occ_layout(sampled: Option<usize>) -> OccLayout {
    match sampled {
        Some(block) => OccLayout::Sampled { block },
        None => OccLayout::Dense,
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.command {
        Commands::Preprocess { genome, method, sampled_occ, threads } => {
            let method = match method {
                PreprocessMethod::ExactBwt => IndexMethod::ExactBwt,
                PreprocessMethod::ApproxBwt => IndexMethod::ApproxBwt,
            };
            run_preprocess(&genome, BuildOptions { method, occ: occ_layout(sampled_occ) }, threads)
        }
        Commands::Search { genome, reads, out, common, kind } => {
            let (method, edits) = match kind {
                SearchKind::Exact { algorithm } => {
                    let method = match algorithm {
                        ExactAlgorithm::Naive => SearchMethod::Naive,
                        ExactAlgorithm::Kmp => SearchMethod::Kmp,
                        ExactAlgorithm::Border => SearchMethod::Border,
                        ExactAlgorithm::Bmh => SearchMethod::Bmh,
                        ExactAlgorithm::Bwt => SearchMethod::BwtExact,
                    };
                    (method, 0)
                }
                SearchKind::Approx { algorithm: ApproxAlgorithm::Bwt, edits } => (SearchMethod::BwtApprox, edits),
            };
            let opt = MapOpt { method, edits, occ: occ_layout(common.sampled_occ), threads: common.threads };
            run_search(&genome, &reads, out.as_deref(), opt)
        }
    }
}

fn run_preprocess(genome: &std::path::Path, opts: BuildOptions, threads: usize) -> Result<()> {
    let path = map::preprocess(genome, &opts, threads)
        .with_context(|| format!("preprocessing '{}' failed", genome.display()))?;
    tracing::info!(path = %path.display(), "index saved");
    Ok(())
}

fn run_search(genome: &std::path::Path, reads: &std::path::Path, out: Option<&std::path::Path>, opt: MapOpt) -> Result<()> {
    let mut out_box: Box<dyn std::io::Write> = if let Some(p) = out {
        let f = std::fs::File::create(p)
            .with_context(|| format!("cannot create output file '{}'", p.display()))?;
        Box::new(std::io::BufWriter::new(f))
    } else {
        Box::new(std::io::BufWriter::new(std::io::stdout()))
    };
    map::map_reads(genome, reads, &mut out_box, &opt)?;
    Ok(())
}
