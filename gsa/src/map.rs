//! 预处理与 read 比对的驱动流程，供命令行使用。

use anyhow::{bail, Context, Result};
use rayon::prelude::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

use crate::index::{cache, BuildOptions, FmTables, OccLayout};
use crate::io::fasta::read_genome;
use crate::io::fastq::FastqReader;
use crate::io::sam;
use crate::search::{SearchMethod, Searcher};

#[derive(Debug, Clone, Copy)]
pub struct MapOpt {
    pub method: SearchMethod,
    /// 近似搜索允许的最大编辑数
    pub edits: usize,
    pub occ: OccLayout,
    pub threads: usize,
}

impl Default for MapOpt {
    fn default() -> Self {
        Self { method: SearchMethod::BwtExact, edits: 0, occ: OccLayout::Dense, threads: 1 }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MapStats {
    pub reads: usize,
    pub hits: usize,
}

fn thread_pool(threads: usize) -> Result<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .context("cannot start worker threads")
}

fn build_all(genome: &[(String, Vec<u8>)], opts: &BuildOptions) -> Result<Vec<(String, FmTables)>> {
    genome
        .par_iter()
        .map(|(name, seq)| {
            let tables = FmTables::build(seq, opts)
                .with_context(|| format!("cannot index sequence '{}'", name))?;
            Ok((name.clone(), tables))
        })
        .collect()
}

/// 预处理整个基因组并写入缓存，返回缓存路径。
/// 缓存文件已存在且不可写时在构建之前就失败。
pub fn preprocess(genome_path: &Path, opts: &BuildOptions, threads: usize) -> Result<PathBuf> {
    let tag = opts.method_tag();
    cache::check_writable(&cache::cache_path(genome_path, &tag))?;

    let genome = read_genome(genome_path)?;
    if genome.is_empty() {
        bail!("FASTA file '{}' contains no sequences", genome_path.display());
    }

    let start = Instant::now();
    let tables = thread_pool(threads)?.install(|| build_all(&genome, opts))?;
    debug!(elapsed_ms = start.elapsed().as_millis() as u64, "preprocessing done");

    let path = cache::store(genome_path, &tag, &tables)?;
    Ok(path)
}

/// 有缓存就读缓存，否则在内存中现算（不写缓存）。
pub fn load_or_build(genome_path: &Path, opts: &BuildOptions) -> Result<Vec<(String, FmTables)>> {
    if let Some(tables) = cache::load(genome_path, &opts.method_tag())? {
        return Ok(tables);
    }
    info!(genome = %genome_path.display(), method = %opts.method_tag(), "no index cache, building tables in memory");
    let genome = read_genome(genome_path)?;
    build_all(&genome, opts)
}

enum Reference {
    Text(Vec<(String, Vec<u8>)>),
    Tables(Vec<(String, FmTables)>),
}

impl Reference {
    fn searchers(&self, opt: &MapOpt) -> Vec<(&str, Searcher<'_>)> {
        match self {
            Reference::Text(genome) => genome
                .iter()
                .filter_map(|(name, seq)| Some((name.as_str(), Searcher::online(opt.method, seq)?)))
                .collect(),
            Reference::Tables(genome) => genome
                .iter()
                .filter_map(|(name, t)| Some((name.as_str(), Searcher::indexed(opt.method, t, opt.edits)?)))
                .collect(),
        }
    }
}

/// 把 reads 比对到基因组，按 read、再按染色体的顺序写出 simple-SAM。
pub fn map_reads<W: Write>(genome_path: &Path, reads_path: &Path, out: &mut W, opt: &MapOpt) -> Result<MapStats> {
    let pool = thread_pool(opt.threads)?;

    let reference = match opt.method.index_method() {
        Some(method) => {
            let opts = BuildOptions { method, occ: opt.occ };
            Reference::Tables(pool.install(|| load_or_build(genome_path, &opts))?)
        }
        None => Reference::Text(read_genome(genome_path)?),
    };
    let searchers = reference.searchers(opt);

    let fq = std::fs::File::open(reads_path)
        .with_context(|| format!("cannot open reads file '{}'", reads_path.display()))?;
    let mut reader = FastqReader::new(std::io::BufReader::new(fq));

    let mut stats = MapStats::default();
    let start = Instant::now();
    while let Some(rec) = reader.next_record()? {
        stats.reads += 1;
        let per_chrom: Vec<_> = pool.install(|| {
            searchers
                .par_iter()
                .map(|(chrom, searcher)| (*chrom, searcher.hits(&rec.seq)))
                .collect()
        });
        for (chrom, hits) in per_chrom {
            for hit in hits {
                sam::write_record(out, &rec.name, chrom, hit.position, &hit.cigar.to_sam(), &rec.seq)?;
                stats.hits += 1;
            }
        }
    }
    out.flush()?;

    info!(
        reads = stats.reads,
        hits = stats.hits,
        method = %opt.method,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "mapping done"
    );
    Ok(stats)
}
