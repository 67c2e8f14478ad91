/// 根据后缀数组构建 BWT：`bwt[i]` 是排名为 i 的后缀前面的那个符号。
/// 对于从位置 0 开始的后缀，回绕到文本末尾（即哨兵）。
pub fn build_bwt(text: &[u8], sa: &[u32]) -> Vec<u8> {
    let n = text.len();
    if n == 0 {
        return Vec::new();
    }
    debug_assert_eq!(sa.len(), n);
    let mut bwt = Vec::with_capacity(n);
    for &p in sa {
        let i = p as usize;
        let prev = if i == 0 { text[n - 1] } else { text[i - 1] };
        bwt.push(prev);
    }
    bwt
}
