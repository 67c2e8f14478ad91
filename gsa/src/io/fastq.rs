use anyhow::{anyhow, Result};
use std::io::BufRead;

#[derive(Debug, Clone)]
pub struct FastqRecord {
    pub name: String,
    pub seq: Vec<u8>,
}

/// 读取 "simple FASTQ"：`@name` 行后跟一行序列。
/// 标准四行格式同样接受，`+` 行与质量行被跳过。
pub struct FastqReader<R: BufRead> {
    reader: R,
    buf: String,
    peek: Option<String>,
    done: bool,
}

impl<R: BufRead> FastqReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, buf: String::new(), peek: None, done: false }
    }

    fn next_line(&mut self) -> Result<Option<String>> {
        if let Some(line) = self.peek.take() {
            return Ok(Some(line));
        }
        self.buf.clear();
        if self.reader.read_line(&mut self.buf)? == 0 {
            return Ok(None);
        }
        Ok(Some(self.buf.trim_end().to_string()))
    }

    pub fn next_record(&mut self) -> Result<Option<FastqRecord>> {
        if self.done { return Ok(None); }

        // header line starting with '@', blank lines skipped
        let header = loop {
            match self.next_line()? {
                None => { self.done = true; return Ok(None); }
                Some(line) if line.is_empty() => continue,
                Some(line) => break line,
            }
        };
        let name = header
            .strip_prefix('@')
            .ok_or_else(|| anyhow!("FASTQ header not starting with '@': {}", header))?
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_string();

        // sequence line
        let seq = self
            .next_line()?
            .ok_or_else(|| anyhow!("unexpected EOF after header '{}'", name))?
            .into_bytes();

        // optional plus + quality lines
        match self.next_line()? {
            Some(line) if line.starts_with('+') => {
                let qual = self
                    .next_line()?
                    .ok_or_else(|| anyhow!("missing quality line for '{}'", name))?;
                if qual.len() != seq.len() {
                    return Err(anyhow!("seq/qual length mismatch for '{}'", name));
                }
            }
            Some(line) => self.peek = Some(line),
            None => self.done = true,
        }

        Ok(Some(FastqRecord { name, seq }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parse_simple_fastq() {
        let data = b"@read0\nacgt\n@read1 extra\nggcc\n";
        let mut r = FastqReader::new(Cursor::new(&data[..]));
        let r0 = r.next_record().unwrap().unwrap();
        assert_eq!(r0.name, "read0");
        assert_eq!(r0.seq, b"acgt");
        let r1 = r.next_record().unwrap().unwrap();
        assert_eq!(r1.name, "read1");
        assert_eq!(r1.seq, b"ggcc");
        assert!(r.next_record().unwrap().is_none());
    }

    #[test]
    fn parse_four_line_fastq() {
        let data = b"@r1\nACGT\n+\n@@@@\n@r2\nTT\n+r2\nII\n";
        let mut r = FastqReader::new(Cursor::new(&data[..]));
        let r1 = r.next_record().unwrap().unwrap();
        assert_eq!(r1.name, "r1");
        assert_eq!(r1.seq, b"ACGT");
        let r2 = r.next_record().unwrap().unwrap();
        assert_eq!(r2.name, "r2");
        assert_eq!(r2.seq, b"TT");
        assert!(r.next_record().unwrap().is_none());
    }

    #[test]
    fn rejects_missing_header() {
        let data = b"acgt\n";
        let mut r = FastqReader::new(Cursor::new(&data[..]));
        assert!(r.next_record().is_err());
    }

    #[test]
    fn rejects_quality_length_mismatch() {
        let data = b"@r1\nACGT\n+\nII\n";
        let mut r = FastqReader::new(Cursor::new(&data[..]));
        assert!(r.next_record().is_err());
    }
}
