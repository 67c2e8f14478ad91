//! 后缀数组构建：SA-IS 诱导排序，线性时间。
//!
//! 输入为数值化文本，末尾必须是唯一的、严格最小的哨兵 0。
//! 归约后的子问题同样以唯一最小名字结尾，因此递归时前置条件保持成立。

const EMPTY: u32 = u32::MAX;

/// 构建后缀数组。`text` 中的编码须小于 `sigma`，且以唯一哨兵 0 结尾。
pub fn build_sa(text: &[u8], sigma: usize) -> Vec<u32> {
    if text.is_empty() {
        return Vec::new();
    }
    assert!(
        text[text.len() - 1] == 0 && text[..text.len() - 1].iter().all(|&c| c != 0),
        "text must end with exactly one sentinel"
    );
    let wide: Vec<u32> = text.iter().map(|&c| c as u32).collect();
    let sa = sais(&wide, sigma);
    debug_assert_eq!(sa[0] as usize, text.len() - 1);
    sa
}

fn sais(text: &[u32], sigma: usize) -> Vec<u32> {
    let n = text.len();
    if n == 1 {
        return vec![0];
    }

    let stype = classify(text);

    // 第一轮：LMS 位置放到桶尾（桶内顺序任意），诱导得到排好序的 LMS 子串
    let mut sa = vec![EMPTY; n];
    let mut tails = bucket_tails(text, sigma);
    for i in 1..n {
        if is_lms(&stype, i) {
            let c = text[i] as usize;
            tails[c] -= 1;
            sa[tails[c] as usize] = i as u32;
        }
    }
    induce(text, &mut sa, &stype, sigma);

    // 为 LMS 子串命名，相同子串同名
    let mut names = vec![EMPTY; n];
    let mut name = 0u32;
    let mut prev: Option<usize> = None;
    for &p in &sa {
        let p = p as usize;
        if !is_lms(&stype, p) {
            continue;
        }
        if let Some(q) = prev {
            if !lms_substrings_equal(text, &stype, q, p) {
                name += 1;
            }
        }
        names[p] = name;
        prev = Some(p);
    }

    let lms_positions: Vec<u32> = (1..n).filter(|&i| is_lms(&stype, i)).map(|i| i as u32).collect();
    let reduced: Vec<u32> = lms_positions.iter().map(|&p| names[p as usize]).collect();

    let reduced_sa = if name as usize + 1 == reduced.len() {
        // 名字互不相同，直接得到排序
        let mut rsa = vec![0u32; reduced.len()];
        for (i, &r) in reduced.iter().enumerate() {
            rsa[r as usize] = i as u32;
        }
        rsa
    } else {
        sais(&reduced, name as usize + 1)
    };

    // 第二轮：按真实顺序放置 LMS 后缀，再次诱导
    sa.fill(EMPTY);
    let mut tails = bucket_tails(text, sigma);
    for &r in reduced_sa.iter().rev() {
        let p = lms_positions[r as usize];
        let c = text[p as usize] as usize;
        tails[c] -= 1;
        sa[tails[c] as usize] = p;
    }
    induce(text, &mut sa, &stype, sigma);
    sa
}

/// true 为 S 型，false 为 L 型。末位（哨兵）为 S 型。
fn classify(text: &[u32]) -> Vec<bool> {
    let n = text.len();
    let mut stype = vec![false; n];
    stype[n - 1] = true;
    for i in (0..n - 1).rev() {
        stype[i] = text[i] < text[i + 1] || (text[i] == text[i + 1] && stype[i + 1]);
    }
    stype
}

#[inline]
fn is_lms(stype: &[bool], i: usize) -> bool {
    i > 0 && i < stype.len() && stype[i] && !stype[i - 1]
}

fn bucket_sizes(text: &[u32], sigma: usize) -> Vec<u32> {
    let mut sizes = vec![0u32; sigma];
    for &c in text {
        sizes[c as usize] += 1;
    }
    sizes
}

fn bucket_heads(text: &[u32], sigma: usize) -> Vec<u32> {
    let mut acc = 0u32;
    bucket_sizes(text, sigma)
        .into_iter()
        .map(|s| {
            let head = acc;
            acc += s;
            head
        })
        .collect()
}

fn bucket_tails(text: &[u32], sigma: usize) -> Vec<u32> {
    let mut acc = 0u32;
    bucket_sizes(text, sigma)
        .into_iter()
        .map(|s| {
            acc += s;
            acc
        })
        .collect()
}

fn induce(text: &[u32], sa: &mut [u32], stype: &[bool], sigma: usize) {
    let n = text.len();

    // L 型：从左到右，放到桶头
    let mut heads = bucket_heads(text, sigma);
    for i in 0..n {
        let j = sa[i];
        if j == EMPTY || j == 0 {
            continue;
        }
        let k = j as usize - 1;
        if !stype[k] {
            let c = text[k] as usize;
            sa[heads[c] as usize] = k as u32;
            heads[c] += 1;
        }
    }

    // S 型：从右到左，放到桶尾
    let mut tails = bucket_tails(text, sigma);
    for i in (0..n).rev() {
        let j = sa[i];
        if j == EMPTY || j == 0 {
            continue;
        }
        let k = j as usize - 1;
        if stype[k] {
            let c = text[k] as usize;
            tails[c] -= 1;
            sa[tails[c] as usize] = k as u32;
        }
    }
}

/// 比较分别从 a、b 开始、到下一个 LMS 位置（含）为止的两个 LMS 子串。
fn lms_substrings_equal(text: &[u32], stype: &[bool], a: usize, b: usize) -> bool {
    let n = text.len();
    // 哨兵子串是唯一的
    if a == n - 1 || b == n - 1 {
        return a == b;
    }
    let mut d = 0usize;
    loop {
        if text[a + d] != text[b + d] || stype[a + d] != stype[b + d] {
            return false;
        }
        if d > 0 && (is_lms(stype, a + d) || is_lms(stype, b + d)) {
            return true;
        }
        d += 1;
    }
}
