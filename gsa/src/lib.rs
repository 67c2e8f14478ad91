//! # gsa
//!
//! 基于 Burrows-Wheeler 变换 / FM 索引的短序列搜索引擎。
//!
//! 给定参考序列（一条或多条染色体）和一组 read，报告每个 read 精确出现的所有位置，
//! 或在给定编辑数内近似出现的所有位置（附带 CIGAR）。
//!
//! - **索引构建**：字母表映射、SA-IS 后缀数组、BWT、C 表与 O 表
//! - **搜索**：精确反向搜索、有编辑上限的近似反向搜索，以及若干在线精确匹配算法
//! - **缓存**：按 (参考文件, 方法) 持久化预处理结果，带版本校验
//!
//! ## 快速示例
//!
//! ```rust
//! use gsa::index::{BuildOptions, FmTables, IndexMethod};
//! use gsa::search::{approx_hits, exact_hits};
//!
//! let tables = FmTables::build(b"acgtacgt", &BuildOptions::new(IndexMethod::ApproxBwt)).unwrap();
//!
//! let mut positions: Vec<usize> = exact_hits(&tables, b"acgt").collect();
//! positions.sort_unstable();
//! assert_eq!(positions, vec![0, 4]);
//!
//! // 最多一次编辑
//! for (pos, cigar) in approx_hits(&tables, b"act", 1) {
//!     println!("{} {}", pos, cigar);
//! }
//! ```
//!
//! ## 模块说明
//!
//! - [`index`] — 字母表、后缀数组、BWT、C/O 表与索引缓存
//! - [`search`] — 反向搜索（精确/近似）、在线匹配算法、CIGAR
//! - [`io`] — FASTA / FASTQ 读取与 simple-SAM 输出
//! - [`map`] — 预处理与 read 比对流程

pub mod error;
pub mod index;
pub mod io;
pub mod map;
pub mod search;

pub use error::{GsaError, Result};
