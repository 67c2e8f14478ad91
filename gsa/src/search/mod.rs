//! 搜索算法的统一入口。
//!
//! 所有算法构成一个封闭的枚举，在配置阶段选定，
//! 通过 [`Searcher::hits`] 这一种能力对外提供。

pub mod approx;
pub mod backward;
pub mod cigar;
pub mod exact;

use std::fmt;

use crate::index::{FmTables, IndexMethod};

pub use approx::{approx_hits, ApproxHits};
pub use backward::{backward_search, exact_hits};
pub use cigar::{Cigar, EditOp};

/// 可选的搜索算法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchMethod {
    Naive,
    Kmp,
    Border,
    Bmh,
    /// FM 索引精确反向搜索
    BwtExact,
    /// FM 索引有编辑上限的近似反向搜索
    BwtApprox,
}

impl SearchMethod {
    pub const ALL: [SearchMethod; 6] = [
        SearchMethod::Naive,
        SearchMethod::Kmp,
        SearchMethod::Border,
        SearchMethod::Bmh,
        SearchMethod::BwtExact,
        SearchMethod::BwtApprox,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SearchMethod::Naive => "naive",
            SearchMethod::Kmp => "kmp",
            SearchMethod::Border => "border",
            SearchMethod::Bmh => "bmh",
            SearchMethod::BwtExact => "exact-bwt",
            SearchMethod::BwtApprox => "approx-bwt",
        }
    }

    /// 需要的预处理方式；在线算法返回 None
    pub fn index_method(self) -> Option<IndexMethod> {
        match self {
            SearchMethod::BwtExact => Some(IndexMethod::ExactBwt),
            SearchMethod::BwtApprox => Some(IndexMethod::ApproxBwt),
            _ => None,
        }
    }
}

impl fmt::Display for SearchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 一次命中：参考序列上的 0-based 起点与对齐描述
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Hit {
    pub position: usize,
    pub cigar: Cigar,
}

/// 绑定了一条参考序列（原文或其 FM 表）的搜索器。
#[derive(Debug, Clone, Copy)]
pub enum Searcher<'a> {
    Naive(&'a [u8]),
    Kmp(&'a [u8]),
    Border(&'a [u8]),
    Bmh(&'a [u8]),
    BwtExact(&'a FmTables),
    BwtApprox { tables: &'a FmTables, max_edits: usize },
}

impl<'a> Searcher<'a> {
    /// 在线算法的搜索器；BWT 方法需要表，返回 None
    pub fn online(method: SearchMethod, text: &'a [u8]) -> Option<Self> {
        match method {
            SearchMethod::Naive => Some(Searcher::Naive(text)),
            SearchMethod::Kmp => Some(Searcher::Kmp(text)),
            SearchMethod::Border => Some(Searcher::Border(text)),
            SearchMethod::Bmh => Some(Searcher::Bmh(text)),
            SearchMethod::BwtExact | SearchMethod::BwtApprox => None,
        }
    }

    /// BWT 方法的搜索器；`max_edits` 只对近似搜索有意义
    pub fn indexed(method: SearchMethod, tables: &'a FmTables, max_edits: usize) -> Option<Self> {
        match method {
            SearchMethod::BwtExact => Some(Searcher::BwtExact(tables)),
            SearchMethod::BwtApprox => Some(Searcher::BwtApprox { tables, max_edits }),
            _ => None,
        }
    }

    /// 所有命中。精确算法的 CIGAR 为整段匹配。
    pub fn hits(&self, pattern: &[u8]) -> Vec<Hit> {
        let full_match = |positions: Vec<usize>| -> Vec<Hit> {
            positions
                .into_iter()
                .map(|position| Hit { position, cigar: Cigar::all_match(pattern.len()) })
                .collect()
        };
        match *self {
            Searcher::Naive(text) => full_match(exact::naive(text, pattern)),
            Searcher::Kmp(text) => full_match(exact::kmp(text, pattern)),
            Searcher::Border(text) => full_match(exact::border(text, pattern)),
            Searcher::Bmh(text) => full_match(exact::bmh(text, pattern)),
            Searcher::BwtExact(tables) => full_match(exact_hits(tables, pattern).collect()),
            Searcher::BwtApprox { tables, max_edits } => approx_hits(tables, pattern, max_edits)
                .map(|(position, cigar)| Hit { position, cigar })
                .collect(),
        }
    }
}
