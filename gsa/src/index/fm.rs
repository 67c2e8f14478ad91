use serde::{Deserialize, Serialize};
use tracing::debug;

use super::alphabet::Alphabet;
use super::{bwt, sa, BuildOptions, IndexMethod, OccLayout};
use crate::error::{GsaError, Result};

/// C 表：`c[a]` = BWT 中编码严格小于 a 的符号个数，长度 sigma + 1。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CTable {
    c: Vec<u32>,
}

impl CTable {
    pub fn build(bwt: &[u8], sigma: usize) -> Self {
        let mut freq = vec![0u32; sigma];
        for &ch in bwt {
            freq[ch as usize] += 1;
        }
        let mut c = Vec::with_capacity(sigma + 1);
        let mut acc = 0u32;
        c.push(acc);
        for f in freq {
            acc += f;
            c.push(acc);
        }
        Self { c }
    }

    #[inline]
    pub fn get(&self, a: u8) -> usize {
        self.c[a as usize] as usize
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.c
    }
}

/// 稠密 O 表：每个编码一行，每行 n + 1 列，`O[a][i]` = BWT[0..i) 中 a 的个数。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenseOcc {
    cols: u32,
    /// 行优先展平：data[a * cols + i]
    data: Vec<u32>,
}

impl DenseOcc {
    pub fn build(bwt: &[u8], sigma: usize) -> Self {
        let cols = bwt.len() + 1;
        let mut data = vec![0u32; sigma * cols];
        for (a, row) in data.chunks_exact_mut(cols).enumerate() {
            let mut count = 0u32;
            for (i, &ch) in bwt.iter().enumerate() {
                if ch as usize == a {
                    count += 1;
                }
                row[i + 1] = count;
            }
        }
        Self { cols: cols as u32, data }
    }

    #[inline]
    pub fn rank(&self, a: u8, pos: usize) -> usize {
        self.data[a as usize * self.cols as usize + pos] as usize
    }
}

/// 分块采样 O 表：每块起点存一份累计计数，块内顺扫补偿。
/// 需要保留 BWT 本身，空间约为稠密表的 1/block。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampledOcc {
    sigma: u32,
    block: u32,
    bwt: Vec<u8>,
    /// occ_samples[block_id * sigma + a]
    samples: Vec<u32>,
}

impl SampledOcc {
    pub fn build(bwt: &[u8], sigma: usize, block: usize) -> Self {
        let block = block.max(1);
        let n = bwt.len();
        let num_blocks = if n == 0 { 0 } else { (n + block - 1) / block };
        let mut samples = vec![0u32; num_blocks * sigma];
        let mut running = vec![0u32; sigma];
        for bi in 0..num_blocks {
            samples[bi * sigma..(bi + 1) * sigma].copy_from_slice(&running);
            let end = ((bi + 1) * block).min(n);
            for &ch in &bwt[bi * block..end] {
                running[ch as usize] += 1;
            }
        }
        Self {
            sigma: sigma as u32,
            block: block as u32,
            bwt: bwt.to_vec(),
            samples,
        }
    }

    #[inline]
    pub fn rank(&self, a: u8, pos: usize) -> usize {
        // 返回 BWT[0..pos) 中 a 的出现次数
        if pos == 0 {
            return 0;
        }
        let block = self.block as usize;
        let bi = (pos - 1) / block;
        let base = self.samples[bi * self.sigma as usize + a as usize] as usize;
        let add = self.bwt[bi * block..pos].iter().filter(|&&ch| ch == a).count();
        base + add
    }
}

/// O 表的两种存储形式，查询语义完全一致。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OccTable {
    Dense(DenseOcc),
    Sampled(SampledOcc),
}

impl OccTable {
    pub fn build(bwt: &[u8], sigma: usize, layout: OccLayout) -> Self {
        match layout {
            OccLayout::Dense => OccTable::Dense(DenseOcc::build(bwt, sigma)),
            OccLayout::Sampled { block } => OccTable::Sampled(SampledOcc::build(bwt, sigma, block)),
        }
    }

    #[inline]
    pub fn rank(&self, a: u8, pos: usize) -> usize {
        match self {
            OccTable::Dense(o) => o.rank(a, pos),
            OccTable::Sampled(o) => o.rank(a, pos),
        }
    }

    /// 列数，即 BWT 长度 + 1
    fn cols(&self) -> usize {
        match self {
            OccTable::Dense(o) => o.cols as usize,
            OccTable::Sampled(o) => o.bwt.len() + 1,
        }
    }

    fn check_shape(&self, sigma: usize, n: usize) -> std::result::Result<(), String> {
        if self.cols() != n + 1 {
            return Err(format!("O table has {} columns, expected {}", self.cols(), n + 1));
        }
        match self {
            OccTable::Dense(o) if o.data.len() != sigma * (n + 1) => {
                Err(format!("dense O table holds {} entries, expected {}", o.data.len(), sigma * (n + 1)))
            }
            OccTable::Sampled(o) => {
                let block = o.block as usize;
                let num_blocks = if n == 0 || block == 0 { 0 } else { (n + block - 1) / block };
                if o.block == 0 || o.sigma as usize != sigma || o.samples.len() != num_blocks * sigma {
                    Err("sampled O table shape does not match its alphabet".to_string())
                } else if o.bwt.iter().any(|&ch| ch as usize >= sigma) {
                    Err("sampled O table BWT holds codes outside the alphabet".to_string())
                } else {
                    Ok(())
                }
            }
            _ => Ok(()),
        }
    }

    /// 检查计数本身：每行从 0 开始、每列恰好一个符号加 1、行末与 C 表一致。
    /// 调用前须已通过 `check_shape`。
    fn check_counts(&self, c: &[u32]) -> std::result::Result<(), String> {
        match self {
            OccTable::Dense(o) => {
                let cols = o.cols as usize;
                let rows: Vec<&[u32]> = o.data.chunks_exact(cols).collect();
                for (a, row) in rows.iter().enumerate() {
                    if row[0] != 0 || row[cols - 1] != c[a + 1] - c[a] {
                        return Err(format!("O table row {} does not match the C table", a));
                    }
                }
                for i in 0..cols - 1 {
                    let mut stepped = 0;
                    for row in &rows {
                        match row[i + 1].checked_sub(row[i]) {
                            Some(0) => {}
                            Some(1) => stepped += 1,
                            _ => return Err(format!("O table column {} is not a prefix count", i + 1)),
                        }
                    }
                    if stepped != 1 {
                        return Err(format!("O table column {} is not a prefix count", i + 1));
                    }
                }
                Ok(())
            }
            OccTable::Sampled(o) => {
                let sigma = o.sigma as usize;
                let mut freq = vec![0u32; sigma];
                for &ch in &o.bwt {
                    freq[ch as usize] += 1;
                }
                if (0..sigma).any(|a| freq[a] != c[a + 1] - c[a]) {
                    return Err("sampled O table BWT does not match the C table".to_string());
                }
                if SampledOcc::build(&o.bwt, sigma, o.block as usize).samples != o.samples {
                    return Err("sampled O table samples do not match its BWT".to_string());
                }
                Ok(())
            }
        }
    }
}

/// 单条参考序列的全部派生表。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FmTables {
    pub alphabet: Alphabet,
    pub sa: Vec<u32>,
    pub c: CTable,
    pub o: OccTable,
    /// 反向序列 BWT 的 O 表，仅近似搜索的预处理构建，用于计算编辑下界
    pub ro: Option<OccTable>,
}

impl FmTables {
    pub fn build(seq: &[u8], opts: &BuildOptions) -> Result<Self> {
        if seq.len() >= u32::MAX as usize - 1 {
            return Err(GsaError::SequenceTooLong(seq.len()));
        }
        let (text, alphabet) = Alphabet::mapped_with_sentinel(seq)?;
        let sigma = alphabet.sigma();

        let sa_arr = sa::build_sa(&text, sigma);
        let bwt_arr = bwt::build_bwt(&text, &sa_arr);
        let c = CTable::build(&bwt_arr, sigma);
        let o = OccTable::build(&bwt_arr, sigma, opts.occ);

        let ro = match opts.method {
            IndexMethod::ExactBwt => None,
            IndexMethod::ApproxBwt => {
                let mut rev: Vec<u8> = text[..text.len() - 1].iter().rev().copied().collect();
                rev.push(super::alphabet::SENTINEL);
                let rsa = sa::build_sa(&rev, sigma);
                let rbwt = bwt::build_bwt(&rev, &rsa);
                Some(OccTable::build(&rbwt, sigma, opts.occ))
            }
        };

        debug!(len = seq.len(), sigma, method = %opts.method_tag(), "built FM tables");
        Ok(Self { alphabet, sa: sa_arr, c, o, ro })
    }

    /// 带哨兵的序列长度 n
    #[inline]
    pub fn len(&self) -> usize {
        self.sa.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sa.is_empty()
    }

    /// 在区间 [l, r) 前扩展字符 a 后的新区间
    #[inline]
    pub fn rank_range(&self, a: u8, l: usize, r: usize) -> (usize, usize) {
        let c0 = self.c.get(a);
        (c0 + self.o.rank(a, l), c0 + self.o.rank(a, r))
    }

    /// 与 `rank_range` 相同，但作用在反向序列的 O 表上
    #[inline]
    pub fn rev_rank_range(&self, a: u8, l: usize, r: usize) -> Option<(usize, usize)> {
        let ro = self.ro.as_ref()?;
        let c0 = self.c.get(a);
        Some((c0 + ro.rank(a, l), c0 + ro.rank(a, r)))
    }

    /// 检查各表尺寸与计数彼此一致，用于拒绝损坏的缓存。
    /// 通过检查的表上，任何查询得到的区间都落在 [0, n] 内。
    pub(crate) fn validate(&self) -> std::result::Result<(), String> {
        let n = self.sa.len();
        let sigma = self.alphabet.sigma();
        if n == 0 {
            return Err("empty suffix array".to_string());
        }
        let mut seen = vec![false; n];
        for &p in &self.sa {
            match seen.get_mut(p as usize) {
                Some(slot) if !*slot => *slot = true,
                Some(_) => return Err(format!("suffix array repeats position {}", p)),
                None => return Err("suffix array entry out of range".to_string()),
            }
        }
        let c = self.c.as_slice();
        if c.len() != sigma + 1 || c[sigma] as usize != n || c.windows(2).any(|w| w[0] > w[1]) {
            return Err("C table does not match the alphabet".to_string());
        }
        self.o.check_shape(sigma, n)?;
        self.o.check_counts(c)?;
        if let Some(ro) = &self.ro {
            // 反向序列的符号频数相同，共用 C 表
            ro.check_shape(sigma, n)?;
            ro.check_counts(c)?;
        }
        Ok(())
    }
}
