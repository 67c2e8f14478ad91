use std::fmt;

/// 单步编辑操作，方向以参考序列为准（与 SAM 一致）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditOp {
    /// 模式与参考各消耗一个相同符号
    Match,
    /// 模式与参考各消耗一个不同符号
    Mismatch,
    /// 只消耗模式符号（read 中多出的碱基）
    Insertion,
    /// 只消耗参考符号（read 中缺失的碱基）
    Deletion,
}

impl EditOp {
    /// 扩展 CIGAR 字符
    pub fn symbol(self) -> char {
        match self {
            EditOp::Match => '=',
            EditOp::Mismatch => 'X',
            EditOp::Insertion => 'I',
            EditOp::Deletion => 'D',
        }
    }

    /// SAM 基本 CIGAR 字符，匹配与错配都写作 M
    pub fn sam_symbol(self) -> char {
        match self {
            EditOp::Match | EditOp::Mismatch => 'M',
            op => op.symbol(),
        }
    }

    #[inline]
    pub fn is_edit(self) -> bool {
        self != EditOp::Match
    }
}

/// 游程编码的对齐描述，按参考序列从左到右排列。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Cigar {
    runs: Vec<(u32, EditOp)>,
}

impl Cigar {
    pub fn from_ops<I: IntoIterator<Item = EditOp>>(ops: I) -> Self {
        let mut runs: Vec<(u32, EditOp)> = Vec::new();
        for op in ops {
            match runs.last_mut() {
                Some((len, last)) if *last == op => *len += 1,
                _ => runs.push((1, op)),
            }
        }
        Self { runs }
    }

    /// 长度为 len 的完全匹配
    pub fn all_match(len: usize) -> Self {
        if len == 0 {
            return Self::default();
        }
        Self { runs: vec![(len as u32, EditOp::Match)] }
    }

    pub fn runs(&self) -> &[(u32, EditOp)] {
        &self.runs
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// 错配 + 插入 + 删除的总数
    pub fn edit_count(&self) -> usize {
        self.runs
            .iter()
            .filter(|(_, op)| op.is_edit())
            .map(|&(len, _)| len as usize)
            .sum()
    }

    /// 消耗的模式（read）长度
    pub fn query_len(&self) -> usize {
        self.runs
            .iter()
            .filter(|(_, op)| *op != EditOp::Deletion)
            .map(|&(len, _)| len as usize)
            .sum()
    }

    /// 合并相邻的 =/X 为 M，得到 SAM 基本 CIGAR
    pub fn to_sam(&self) -> String {
        let mut out = String::new();
        let mut pending: Option<(u32, char)> = None;
        for &(len, op) in &self.runs {
            let sym = op.sam_symbol();
            pending = match pending {
                Some((plen, psym)) if psym == sym => Some((plen + len, sym)),
                Some((plen, psym)) => {
                    out.push_str(&format!("{}{}", plen, psym));
                    Some((len, sym))
                }
                None => Some((len, sym)),
            };
        }
        if let Some((plen, psym)) = pending {
            out.push_str(&format!("{}{}", plen, psym));
        }
        out
    }
}

impl fmt::Display for Cigar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &(len, op) in &self.runs {
            write!(f, "{}{}", len, op.symbol())?;
        }
        Ok(())
    }
}
