use crate::index::fm::FmTables;

/// 反向搜索精确匹配，pat 为编码后的模式（不含哨兵）。
/// 返回后缀排名区间 [l, r)；模式不出现时返回 None。空模式得到 [0, n)。
pub fn backward_search(tables: &FmTables, pat: &[u8]) -> Option<(usize, usize)> {
    if tables.is_empty() {
        return None;
    }
    let mut l = 0usize;
    let mut r = tables.len();
    for &a in pat.iter().rev() {
        let (nl, nr) = tables.rank_range(a, l, r);
        if nl >= nr {
            return None;
        }
        l = nl;
        r = nr;
    }
    Some((l, r))
}

/// 对原始（未编码）模式做精确搜索，按后缀排名顺序返回参考位置。
/// 模式含字母表外的符号时不可能命中，直接返回空。
pub fn exact_hits<'a>(tables: &'a FmTables, pattern: &[u8]) -> impl Iterator<Item = usize> + 'a {
    let (l, r) = tables
        .alphabet
        .map_pattern(pattern)
        .ok()
        .and_then(|pat| backward_search(tables, &pat))
        .unwrap_or((0, 0));
    tables.sa[l..r].iter().map(|&p| p as usize)
}
