use anyhow::{Context, Result};
use std::io::BufRead;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct FastaRecord {
    pub name: String,
    pub seq: Vec<u8>,
}

/// 流式 FASTA 读取：`>` 行的第一个空白分隔字段作为名字，
/// 序列行去掉空白后拼接，大小写保持不变。
pub struct FastaReader<R: BufRead> {
    reader: R,
    buf: String,
    done: bool,
    peek_header: Option<String>,
}

impl<R: BufRead> FastaReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: String::new(),
            done: false,
            peek_header: None,
        }
    }

    pub fn next_record(&mut self) -> Result<Option<FastaRecord>> {
        if self.done {
            return Ok(None);
        }

        // Find header line
        let header = if let Some(h) = self.peek_header.take() {
            h
        } else {
            loop {
                self.buf.clear();
                let n = self.reader.read_line(&mut self.buf)?;
                if n == 0 {
                    self.done = true;
                    return Ok(None);
                }
                if let Some(rest) = self.buf.strip_prefix('>') {
                    break rest.trim().to_string();
                }
            }
        };
        let name = header.split_whitespace().next().unwrap_or("").to_string();

        // Read sequence lines
        let mut seq: Vec<u8> = Vec::new();
        loop {
            self.buf.clear();
            let n = self.reader.read_line(&mut self.buf)?;
            if n == 0 {
                self.done = true;
                break;
            }
            if let Some(rest) = self.buf.strip_prefix('>') {
                self.peek_header = Some(rest.trim().to_string());
                break;
            }
            seq.extend(self.buf.bytes().filter(|b| !b.is_ascii_whitespace()));
        }

        Ok(Some(FastaRecord { name, seq }))
    }
}

/// 读取整个基因组，按文件中的顺序返回 (染色体名, 序列)。
pub fn read_genome(path: &Path) -> Result<Vec<(String, Vec<u8>)>> {
    let fh = std::fs::File::open(path)
        .with_context(|| format!("cannot open genome file '{}'", path.display()))?;
    let mut reader = FastaReader::new(std::io::BufReader::new(fh));
    let mut genome = Vec::new();
    while let Some(rec) = reader.next_record()? {
        genome.push((rec.name, rec.seq));
    }
    Ok(genome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parse_simple_fasta() {
        let data = b">chr1 first\nACgTNN\n>chr2\nAAA\n";
        let mut r = FastaReader::new(Cursor::new(&data[..]));

        let r1 = r.next_record().unwrap().unwrap();
        assert_eq!(r1.name, "chr1");
        assert_eq!(r1.seq, b"ACgTNN");

        let r2 = r.next_record().unwrap().unwrap();
        assert_eq!(r2.name, "chr2");
        assert_eq!(r2.seq, b"AAA");

        assert!(r.next_record().unwrap().is_none());
    }

    #[test]
    fn parse_fasta_with_crlf_and_whitespace() {
        let data = b">chr1 desc\r\nac g t n\r\n acgt\r\n>chr2 \r\n N N N \r\n";
        let mut r = FastaReader::new(Cursor::new(&data[..]));

        let r1 = r.next_record().unwrap().unwrap();
        assert_eq!(r1.name, "chr1");
        assert_eq!(r1.seq, b"acgtnacgt");

        let r2 = r.next_record().unwrap().unwrap();
        assert_eq!(r2.name, "chr2");
        assert_eq!(r2.seq, b"NNN");

        assert!(r.next_record().unwrap().is_none());
    }

    #[test]
    fn parse_fasta_with_leading_junk() {
        let data = b"\n\nignored\n>chr1\nacgt\n";
        let mut r = FastaReader::new(Cursor::new(&data[..]));

        let r1 = r.next_record().unwrap().unwrap();
        assert_eq!(r1.name, "chr1");
        assert_eq!(r1.seq, b"acgt");

        assert!(r.next_record().unwrap().is_none());
    }
}
