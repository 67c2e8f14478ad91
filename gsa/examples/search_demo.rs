//! 最小示例：构建 FM 索引并做精确/近似搜索
//!
//! 运行: cargo run --example search_demo

use gsa::index::{BuildOptions, FmTables, IndexMethod};
use gsa::search::{approx_hits, exact_hits};

fn main() -> anyhow::Result<()> {
    let reference = b"ACGTACGTTAGCCGATAGCTTACGGATCCA";
    let tables = FmTables::build(reference, &BuildOptions::new(IndexMethod::ApproxBwt))?;

    let mut positions: Vec<usize> = exact_hits(&tables, b"ACGT").collect();
    positions.sort_unstable();
    println!("exact ACGT -> {:?}", positions);

    for (pos, cigar) in approx_hits(&tables, b"TAGCTA", 1) {
        println!("approx TAGCTA -> pos={} cigar={} ({})", pos, cigar, cigar.to_sam());
    }
    Ok(())
}
