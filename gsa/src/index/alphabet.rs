use serde::{Deserialize, Serialize};

use crate::error::{GsaError, Result};

/// 哨兵编码，小于所有真实符号。
pub const SENTINEL: u8 = 0;

/// 序列字母表：出现过的字节按升序编码为 1..sigma，0 预留为哨兵 $。
///
/// 编码只依赖于符号集合本身，因此同一输入在不同运行之间得到相同的编码。
/// 序列化时只保存符号表，反序列化时重建查找表并校验。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct Alphabet {
    /// symbols[code - 1] = 原始字节
    symbols: Vec<u8>,
    /// 字节 -> 编码，0 表示不在字母表中
    codes: [u8; 256],
}

impl Alphabet {
    /// 扫描整条序列，为每个出现的字节分配编码。
    pub fn build(seq: &[u8]) -> Result<Self> {
        let mut seen = [false; 256];
        for &b in seq {
            seen[b as usize] = true;
        }
        let symbols: Vec<u8> = (0..=255u8).filter(|&b| seen[b as usize]).collect();
        Self::from_symbols(symbols)
    }

    fn from_symbols(symbols: Vec<u8>) -> Result<Self> {
        if symbols.len() > u8::MAX as usize {
            return Err(GsaError::AlphabetTooLarge(symbols.len()));
        }
        let mut codes = [0u8; 256];
        for (i, &b) in symbols.iter().enumerate() {
            codes[b as usize] = (i + 1) as u8;
        }
        Ok(Self { symbols, codes })
    }

    /// 构建字母表并返回带哨兵的编码序列。
    pub fn mapped_with_sentinel(seq: &[u8]) -> Result<(Vec<u8>, Self)> {
        let alpha = Self::build(seq)?;
        let mapped = alpha.map(seq)?;
        Ok((mapped, alpha))
    }

    /// 编码总数（含哨兵），即 C/O 表的行数。
    #[inline]
    pub fn sigma(&self) -> usize {
        self.symbols.len() + 1
    }

    #[inline]
    pub fn code(&self, b: u8) -> Option<u8> {
        match self.codes[b as usize] {
            0 => None,
            c => Some(c),
        }
    }

    /// 编码序列并在末尾追加哨兵。
    pub fn map(&self, seq: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(seq.len() + 1);
        self.map_into(seq, &mut out)?;
        out.push(SENTINEL);
        Ok(out)
    }

    /// 编码查询模式，不追加哨兵。
    pub fn map_pattern(&self, pattern: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(pattern.len());
        self.map_into(pattern, &mut out)?;
        Ok(out)
    }

    fn map_into(&self, seq: &[u8], out: &mut Vec<u8>) -> Result<()> {
        for (offset, &b) in seq.iter().enumerate() {
            let code = self.code(b).ok_or(GsaError::UnknownSymbol {
                symbol: b as char,
                offset,
            })?;
            out.push(code);
        }
        Ok(())
    }

    /// `map` 的逆映射，哨兵被跳过。
    pub fn revmap(&self, codes: &[u8]) -> Vec<u8> {
        codes
            .iter()
            .filter(|&&c| c != SENTINEL)
            .map(|&c| self.symbols[c as usize - 1])
            .collect()
    }
}

// 反序列化失败由缓存读取方补上文件路径，这里只给出原因
impl TryFrom<Vec<u8>> for Alphabet {
    type Error = String;

    fn try_from(symbols: Vec<u8>) -> std::result::Result<Self, String> {
        // 符号表必须严格升序，否则编码不是双射
        if symbols.windows(2).any(|w| w[0] >= w[1]) {
            return Err("alphabet symbols are not strictly increasing".to_string());
        }
        Self::from_symbols(symbols).map_err(|e| e.to_string())
    }
}

impl From<Alphabet> for Vec<u8> {
    fn from(alpha: Alphabet) -> Self {
        alpha.symbols
    }
}
