pub mod alphabet;
pub mod bwt;
pub mod cache;
pub mod fm;
pub mod sa;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use alphabet::Alphabet;
pub use fm::{CTable, FmTables, OccTable};

/// 预处理方式，决定缓存键以及表的组成。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexMethod {
    /// 精确搜索：Alphabet + SA + C + O
    ExactBwt,
    /// 近似搜索：额外保存反向序列的 O 表
    ApproxBwt,
}

impl IndexMethod {
    pub fn tag(self) -> &'static str {
        match self {
            IndexMethod::ExactBwt => "exact-bwt",
            IndexMethod::ApproxBwt => "approx-bwt",
        }
    }
}

impl fmt::Display for IndexMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// O 表存储形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OccLayout {
    /// 每个位置都存计数，O(1) 查询
    #[default]
    Dense,
    /// 每 `block` 个位置采样一次，查询时块内顺扫
    Sampled { block: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    pub method: IndexMethod,
    pub occ: OccLayout,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self { method: IndexMethod::ExactBwt, occ: OccLayout::Dense }
    }
}

impl BuildOptions {
    pub fn new(method: IndexMethod) -> Self {
        Self { method, ..Self::default() }
    }

    /// 缓存键中的方法标签；不同的表布局不会共用同一个缓存文件。
    pub fn method_tag(&self) -> String {
        match self.occ {
            OccLayout::Dense => self.method.tag().to_string(),
            OccLayout::Sampled { block } => format!("{}-occ{}", self.method.tag(), block),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_tags_do_not_collide() {
        let tags = [
            BuildOptions::new(IndexMethod::ExactBwt).method_tag(),
            BuildOptions::new(IndexMethod::ApproxBwt).method_tag(),
            BuildOptions { method: IndexMethod::ExactBwt, occ: OccLayout::Sampled { block: 64 } }.method_tag(),
            BuildOptions { method: IndexMethod::ApproxBwt, occ: OccLayout::Sampled { block: 64 } }.method_tag(),
        ];
        for i in 0..tags.len() {
            for j in i + 1..tags.len() {
                assert_ne!(tags[i], tags[j]);
            }
        }
        assert_eq!(tags[0], "exact-bwt");
        assert_eq!(tags[3], "approx-bwt-occ64");
    }
}
