//! "simple SAM" 输出：只写本工具用到的列。

use std::io::{self, Write};

/// 写一条命中：read 名、染色体名、1-based 位置、CIGAR、read 序列，以制表符分隔。
pub fn write_record<W: Write>(
    out: &mut W,
    read_name: &str,
    chrom: &str,
    pos: usize,
    cigar: &str,
    read: &[u8],
) -> io::Result<()> {
    writeln!(
        out,
        "{}\t{}\t{}\t{}\t{}",
        read_name,
        chrom,
        pos + 1,
        cigar,
        String::from_utf8_lossy(read),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_is_tab_separated_and_one_based() {
        let mut out = Vec::new();
        write_record(&mut out, "read7", "chr2", 0, "4M", b"acgt").unwrap();
        assert_eq!(out, b"read7\tchr2\t1\t4M\tacgt\n");
    }
}
