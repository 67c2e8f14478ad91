//! 不需要预处理参考序列的在线精确匹配算法。
//! 空模式在每个偏移 0..=len(text) 处都匹配，与 BWT 搜索的约定一致。

fn empty_matches(text: &[u8]) -> Vec<usize> {
    (0..=text.len()).collect()
}

/// 逐位置比较，O(nm)
pub fn naive(text: &[u8], pat: &[u8]) -> Vec<usize> {
    if pat.is_empty() {
        return empty_matches(text);
    }
    if pat.len() > text.len() {
        return Vec::new();
    }
    (0..=text.len() - pat.len())
        .filter(|&i| &text[i..i + pat.len()] == pat)
        .collect()
}

/// 严格边界数组：ba[j] 为 pat[..=j] 的最长真边界长度，
/// 且边界之后的字符与 pat[j + 1] 不同（最后一位除外）。
pub fn strict_border_array(pat: &[u8]) -> Vec<usize> {
    let m = pat.len();
    let mut ba = vec![0usize; m];
    for j in 1..m {
        let mut b = ba[j - 1];
        while b > 0 && pat[j] != pat[b] {
            b = ba[b - 1];
        }
        ba[j] = if pat[j] == pat[b] { b + 1 } else { 0 };
    }
    for j in 0..m.saturating_sub(1) {
        if ba[j] > 0 && pat[ba[j]] == pat[j + 1] {
            ba[j] = ba[ba[j] - 1];
        }
    }
    ba
}

/// 基于边界数组扫描文本，维护当前匹配的模式前缀长度
pub fn border(text: &[u8], pat: &[u8]) -> Vec<usize> {
    if pat.is_empty() {
        return empty_matches(text);
    }
    let m = pat.len();
    let ba = strict_border_array(pat);
    let mut hits = Vec::new();
    let mut b = 0usize;
    for (i, &x) in text.iter().enumerate() {
        while b > 0 && pat[b] != x {
            b = ba[b - 1];
        }
        if pat[b] == x {
            b += 1;
        }
        if b == m {
            hits.push(i + 1 - m);
            b = ba[b - 1];
        }
    }
    hits
}

/// Knuth-Morris-Pratt
pub fn kmp(text: &[u8], pat: &[u8]) -> Vec<usize> {
    if pat.is_empty() {
        return empty_matches(text);
    }
    let (n, m) = (text.len(), pat.len());
    let ba = strict_border_array(pat);
    let mut hits = Vec::new();
    let (mut i, mut j) = (0usize, 0usize);
    while i < n {
        while i < n && j < m && text[i] == pat[j] {
            i += 1;
            j += 1;
        }
        if j == m {
            hits.push(i - m);
        }
        if j == 0 {
            i += 1;
        } else {
            j = ba[j - 1];
        }
    }
    hits
}

/// Boyer-Moore-Horspool，只用坏字符规则
pub fn bmh(text: &[u8], pat: &[u8]) -> Vec<usize> {
    if pat.is_empty() {
        return empty_matches(text);
    }
    let (n, m) = (text.len(), pat.len());
    let mut shift = [m; 256];
    for (k, &c) in pat[..m - 1].iter().enumerate() {
        shift[c as usize] = m - 1 - k;
    }
    let mut hits = Vec::new();
    let mut i = 0usize;
    while i + m <= n {
        if text[i..i + m].iter().rev().eq(pat.iter().rev()) {
            hits.push(i);
        }
        i += shift[text[i + m - 1] as usize];
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    type Matcher = fn(&[u8], &[u8]) -> Vec<usize>;
    const MATCHERS: [(&str, Matcher); 4] = [("naive", naive), ("border", border), ("kmp", kmp), ("bmh", bmh)];

    #[test]
    fn border_array_examples() {
        assert_eq!(strict_border_array(b"aaba"), vec![0, 1, 0, 1]);
        assert_eq!(strict_border_array(b"abab"), vec![0, 0, 0, 2]);
        assert!(strict_border_array(b"").is_empty());
    }

    #[test]
    fn all_matchers_agree_with_naive() {
        let cases: [(&[u8], &[u8]); 8] = [
            (b"acgtacgt", b"acgt"),
            (b"aaaaaa", b"aa"),
            (b"abababab", b"abab"),
            (b"mississippi", b"issi"),
            (b"mississippi", b"ppi"),
            (b"acgt", b"acgta"),
            (b"", b"a"),
            (b"aabaabaab", b"aab"),
        ];
        for (text, pat) in cases {
            let expected = naive(text, pat);
            for (name, f) in MATCHERS {
                assert_eq!(f(text, pat), expected, "{} on {:?}/{:?}", name, text, pat);
            }
        }
        assert_eq!(naive(b"acgtacgt", b"acgt"), vec![0, 4]);
    }

    #[test]
    fn empty_pattern_matches_everywhere() {
        for (name, f) in MATCHERS {
            assert_eq!(f(b"aaaa", b""), vec![0, 1, 2, 3, 4], "{}", name);
        }
    }
}
