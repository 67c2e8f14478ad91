use std::path::PathBuf;

use thiserror::Error;

/// 库层的结构化错误。
///
/// 只有索引缓存的读写错误会向上传播为致命错误；
/// `UnknownSymbol` 在搜索入口处被转换为"零命中"。
#[derive(Debug, Error)]
pub enum GsaError {
    #[error("symbol {symbol:?} at offset {offset} is not in the alphabet")]
    UnknownSymbol { symbol: char, offset: usize },

    #[error("sequence uses {0} distinct symbols, more than the 255 codes available")]
    AlphabetTooLarge(usize),

    #[error("sequence of length {0} is too long to index with 32-bit positions")]
    SequenceTooLong(usize),

    #[error("cannot read index cache '{}': {reason}", path.display())]
    Unreadable { path: PathBuf, reason: String },

    #[error("cannot write index cache '{}': {reason}", path.display())]
    Unwritable { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, GsaError>;
