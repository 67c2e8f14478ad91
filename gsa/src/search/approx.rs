//! 有编辑上限的近似反向搜索。
//!
//! 深度优先遍历 (区间, 剩余模式, 剩余编辑数, 已走过的操作) 状态，
//! 状态不可变地压入显式栈，每个栈帧独立，没有共享的可变搜索状态。
//! 表中带有反向 O 表时，先按 BWA 的做法计算每个模式前缀的编辑下界 D，
//! 剩余编辑数小于下界的状态直接剪掉；该下界是严格的，不会丢失命中。

use crate::index::fm::FmTables;

use super::cigar::{Cigar, EditOp};

#[derive(Debug, Clone)]
struct Frame {
    l: usize,
    r: usize,
    /// 尚未处理的模式前缀长度，即 pattern[..i]
    i: usize,
    budget: usize,
    /// 从右到左累积的操作
    ops: Vec<EditOp>,
}

impl Frame {
    fn step(&self, l: usize, r: usize, i: usize, budget: usize, op: EditOp) -> Self {
        let mut ops = Vec::with_capacity(self.ops.len() + 1);
        ops.extend_from_slice(&self.ops);
        ops.push(op);
        Self { l, r, i, budget, ops }
    }
}

/// 近似搜索结果的惰性迭代器，产出 (参考位置, CIGAR)。
///
/// 不同编辑路径到达同一位置时会分别产出，不做去重。
pub struct ApproxHits<'a> {
    tables: &'a FmTables,
    pattern: Vec<u8>,
    /// lower[i] = 对齐 pattern[..i] 至少需要的编辑数
    lower: Vec<usize>,
    stack: Vec<Frame>,
    /// 当前正在展开的命中区间：(下一个排名, 区间右端, CIGAR)
    pending: Option<(usize, usize, Cigar)>,
}

/// 在 `tables` 上搜索最多 `max_edits` 次编辑的所有对齐。
pub fn approx_hits<'a>(tables: &'a FmTables, pattern: &[u8], max_edits: usize) -> ApproxHits<'a> {
    ApproxHits::new(tables, pattern, max_edits, true)
}

impl<'a> ApproxHits<'a> {
    /// `prune` 为 false 时不使用编辑下界，仅用于对照测试。
    pub fn new(tables: &'a FmTables, pattern: &[u8], max_edits: usize, prune: bool) -> Self {
        let mut hits = Self {
            tables,
            pattern: Vec::new(),
            lower: Vec::new(),
            stack: Vec::new(),
            pending: None,
        };
        // 模式含字母表外的符号：不可能命中
        let Ok(pattern) = tables.alphabet.map_pattern(pattern) else {
            return hits;
        };
        if tables.is_empty() {
            return hits;
        }
        hits.lower = if prune {
            lower_bounds(tables, &pattern)
        } else {
            vec![0; pattern.len() + 1]
        };
        hits.stack.push(Frame {
            l: 0,
            r: tables.len(),
            i: pattern.len(),
            budget: max_edits,
            ops: Vec::new(),
        });
        hits.pattern = pattern;
        hits
    }

    fn expand(&mut self, f: Frame) {
        if f.i == 0 {
            let cigar = Cigar::from_ops(f.ops.iter().rev().copied());
            self.pending = Some((f.l, f.r, cigar));
            return;
        }
        if f.budget < self.lower[f.i] {
            return;
        }

        let next = self.pattern[f.i - 1];
        let has_budget = f.budget > 0;

        // 插入：只消耗模式符号，区间不变
        if has_budget {
            self.stack.push(f.step(f.l, f.r, f.i - 1, f.budget - 1, EditOp::Insertion));
        }

        for a in 1..self.tables.alphabet.sigma() as u8 {
            let (l, r) = self.tables.rank_range(a, f.l, f.r);
            if l >= r {
                continue;
            }
            // 删除：只消耗参考符号
            if has_budget {
                self.stack.push(f.step(l, r, f.i, f.budget - 1, EditOp::Deletion));
            }
            if a == next {
                self.stack.push(f.step(l, r, f.i - 1, f.budget, EditOp::Match));
            } else if has_budget {
                self.stack.push(f.step(l, r, f.i - 1, f.budget - 1, EditOp::Mismatch));
            }
        }
    }
}

impl Iterator for ApproxHits<'_> {
    type Item = (usize, Cigar);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((k, r, cigar)) = &mut self.pending {
                if *k < *r {
                    let pos = self.tables.sa[*k] as usize;
                    *k += 1;
                    return Some((pos, cigar.clone()));
                }
                self.pending = None;
            }
            let frame = self.stack.pop()?;
            self.expand(frame);
        }
    }
}

/// 计算 D 数组：从左到右在反向序列的索引上延伸当前片段，
/// 一旦片段不再是参考的子串就计一次编辑并重新开始。
/// 没有反向 O 表时下界全为 0。
fn lower_bounds(tables: &FmTables, pattern: &[u8]) -> Vec<usize> {
    let mut lower = vec![0usize; pattern.len() + 1];
    if tables.ro.is_none() {
        return lower;
    }
    let n = tables.len();
    let (mut l, mut r) = (0usize, n);
    let mut z = 0usize;
    for (j, &a) in pattern.iter().enumerate() {
        match tables.rev_rank_range(a, l, r) {
            Some((nl, nr)) if nl < nr => {
                l = nl;
                r = nr;
            }
            _ => {
                z += 1;
                l = 0;
                r = n;
            }
        }
        lower[j + 1] = z;
    }
    lower
}
