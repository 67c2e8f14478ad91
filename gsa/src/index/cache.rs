//! 预处理结果的磁盘缓存。
//!
//! 每个 (参考文件, 方法) 对应一个文件 `<reference>.<method_tag>`，内容为
//! bincode 编码的定长头部 + 按染色体排列的表集合。读取时校验魔数、版本、
//! 方法标签以及各表的尺寸与计数，任何不一致都报告为 `Unreadable`。

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use bincode::Options;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::fm::FmTables;
use crate::error::{GsaError, Result};

pub const MAGIC: [u8; 8] = *b"GSAIDX\0\0";
pub const VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    magic: [u8; 8],
    version: u32,
    method: String,
    /// RFC 3339 构建时间，仅供查看
    created: String,
}

/// 定长整数编码；读取时以文件大小为上限，损坏的长度前缀不会触发巨量分配。
fn codec() -> impl Options {
    bincode::DefaultOptions::new().with_fixint_encoding()
}

/// 一个缓存文件的全部内容：按参考文件中的顺序排列的 (染色体名, 表)。
pub type CachedGenome = Vec<(String, FmTables)>;

/// 由参考文件路径和方法标签确定缓存路径。
pub fn cache_path(reference: &Path, method_tag: &str) -> PathBuf {
    let mut name = reference.as_os_str().to_owned();
    name.push(".");
    name.push(method_tag);
    PathBuf::from(name)
}

/// 读取缓存。文件不存在时返回 `Ok(None)`。
pub fn load(reference: &Path, method_tag: &str) -> Result<Option<CachedGenome>> {
    let path = cache_path(reference, method_tag);
    let unreadable = |reason: String| GsaError::Unreadable { path: path.clone(), reason };
    match fs::metadata(&path) {
        Ok(_) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!(path = %path.display(), "index cache miss");
            return Ok(None);
        }
        Err(e) => return Err(unreadable(e.to_string())),
    }

    let f = File::open(&path).map_err(|e| unreadable(e.to_string()))?;
    let limit = f.metadata().map_err(|e| unreadable(e.to_string()))?.len();
    let mut reader = BufReader::new(f);

    let header: Header = codec()
        .with_limit(limit)
        .deserialize_from(&mut reader)
        .map_err(|e| unreadable(e.to_string()))?;
    if header.magic != MAGIC {
        return Err(unreadable("not an index cache file".to_string()));
    }
    if header.version != VERSION {
        return Err(unreadable(format!("unsupported cache version {} (expected {})", header.version, VERSION)));
    }
    if header.method != method_tag {
        return Err(unreadable(format!("cache built by '{}', expected '{}'", header.method, method_tag)));
    }

    let genome: CachedGenome = codec()
        .with_limit(limit)
        .deserialize_from(&mut reader)
        .map_err(|e| unreadable(e.to_string()))?;
    let mut rest = [0u8; 1];
    match reader.read(&mut rest) {
        Ok(0) => {}
        Ok(_) => return Err(unreadable("trailing bytes after index data".to_string())),
        Err(e) => return Err(unreadable(e.to_string())),
    }
    for (name, tables) in &genome {
        tables
            .validate()
            .map_err(|reason| unreadable(format!("sequence '{}': {}", name, reason)))?;
    }

    info!(path = %path.display(), created = %header.created, sequences = genome.len(), "index cache hit");
    Ok(Some(genome))
}

/// 若缓存路径上已有文件且不可写，则报错；不会覆盖只读文件。
pub fn check_writable(path: &Path) -> Result<()> {
    let unwritable = |reason: String| GsaError::Unwritable { path: path.to_path_buf(), reason };
    match fs::metadata(path) {
        Ok(meta) if meta.permissions().readonly() => Err(unwritable("file exists and is read-only".to_string())),
        Ok(meta) if !meta.is_file() => Err(unwritable("path exists and is not a regular file".to_string())),
        Ok(_) => fs::OpenOptions::new()
            .write(true)
            .open(path)
            .map(drop)
            .map_err(|e| unwritable(e.to_string())),
        Err(_) => Ok(()),
    }
}

/// 写入过程中使用的同目录临时文件
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

fn write_cache(path: &Path, header: &Header, genome: &[(String, FmTables)]) -> std::result::Result<(), String> {
    let f = File::create(path).map_err(|e| e.to_string())?;
    let mut writer = BufWriter::new(f);
    codec().serialize_into(&mut writer, header).map_err(|e| e.to_string())?;
    codec().serialize_into(&mut writer, genome).map_err(|e| e.to_string())?;
    let f = writer.into_inner().map_err(|e| e.to_string())?;
    f.sync_all().map_err(|e| e.to_string())
}

/// 写入缓存，返回写入的路径。
///
/// 先写同目录下的临时文件再改名覆盖，写入中途失败时原有缓存保持不变。
pub fn store(reference: &Path, method_tag: &str, genome: &[(String, FmTables)]) -> Result<PathBuf> {
    let path = cache_path(reference, method_tag);
    check_writable(&path)?;
    let unwritable = |reason: String| GsaError::Unwritable { path: path.clone(), reason };

    let header = Header {
        magic: MAGIC,
        version: VERSION,
        method: method_tag.to_string(),
        created: chrono::Utc::now().to_rfc3339(),
    };

    let staging = staging_path(&path);
    if let Err(reason) = write_cache(&staging, &header, genome) {
        let _ = fs::remove_file(&staging);
        return Err(unwritable(reason));
    }
    if let Err(e) = fs::rename(&staging, &path) {
        let _ = fs::remove_file(&staging);
        return Err(unwritable(e.to_string()));
    }

    info!(path = %path.display(), sequences = genome.len(), "index cache stored");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{BuildOptions, IndexMethod, OccLayout};
    use tempfile::tempdir;

    fn genome(method: IndexMethod, occ: OccLayout) -> CachedGenome {
        let opts = BuildOptions { method, occ };
        vec![
            ("chr1".to_string(), FmTables::build(b"acgtacgtgattaca", &opts).unwrap()),
            ("chr2".to_string(), FmTables::build(b"ttttgggccca", &opts).unwrap()),
        ]
    }

    #[test]
    fn cache_path_appends_method_tag() {
        let p = cache_path(Path::new("/data/genome.fa"), "exact-bwt");
        assert_eq!(p, PathBuf::from("/data/genome.fa.exact-bwt"));
    }

    #[test]
    fn load_missing_is_none() {
        let dir = tempdir().unwrap();
        let reference = dir.path().join("genome.fa");
        assert!(load(&reference, "exact-bwt").unwrap().is_none());
    }

    #[test]
    fn store_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let reference = dir.path().join("genome.fa");
        for (method, occ) in [
            (IndexMethod::ExactBwt, OccLayout::Dense),
            (IndexMethod::ApproxBwt, OccLayout::Dense),
            (IndexMethod::ExactBwt, OccLayout::Sampled { block: 4 }),
        ] {
            let tag = BuildOptions { method, occ }.method_tag();
            let g = genome(method, occ);
            let path = store(&reference, &tag, &g).unwrap();
            assert!(path.exists());
            let back = load(&reference, &tag).unwrap().unwrap();
            assert_eq!(back, g);
        }
    }

    #[test]
    fn truncated_cache_is_unreadable() {
        let dir = tempdir().unwrap();
        let reference = dir.path().join("genome.fa");
        let path = store(&reference, "exact-bwt", &genome(IndexMethod::ExactBwt, OccLayout::Dense)).unwrap();
        let len = fs::metadata(&path).unwrap().len();
        let f = fs::OpenOptions::new().write(true).open(&path).unwrap();
        f.set_len(len - 5).unwrap();
        drop(f);
        assert!(matches!(load(&reference, "exact-bwt"), Err(GsaError::Unreadable { .. })));
    }

    #[test]
    fn version_mismatch_is_unreadable() {
        let dir = tempdir().unwrap();
        let reference = dir.path().join("genome.fa");
        let path = store(&reference, "exact-bwt", &genome(IndexMethod::ExactBwt, OccLayout::Dense)).unwrap();
        let mut bytes = fs::read(&path).unwrap();
        // version 紧跟 8 字节魔数
        bytes[8..12].copy_from_slice(&99u32.to_le_bytes());
        fs::write(&path, bytes).unwrap();
        match load(&reference, "exact-bwt") {
            Err(GsaError::Unreadable { reason, .. }) => assert!(reason.contains("version")),
            other => panic!("unexpected {:?}", other.map(|g| g.map(|g| g.len()))),
        }
    }

    #[test]
    fn garbage_file_is_unreadable() {
        let dir = tempdir().unwrap();
        let reference = dir.path().join("genome.fa");
        fs::write(cache_path(&reference, "exact-bwt"), b"definitely not an index").unwrap();
        assert!(matches!(load(&reference, "exact-bwt"), Err(GsaError::Unreadable { .. })));
    }

    #[test]
    fn method_mismatch_is_unreadable() {
        let dir = tempdir().unwrap();
        let reference = dir.path().join("genome.fa");
        let path = store(&reference, "exact-bwt", &genome(IndexMethod::ExactBwt, OccLayout::Dense)).unwrap();
        fs::rename(&path, cache_path(&reference, "approx-bwt")).unwrap();
        assert!(matches!(load(&reference, "approx-bwt"), Err(GsaError::Unreadable { .. })));
    }

    #[test]
    fn corrupt_occ_entry_is_unreadable() {
        let dir = tempdir().unwrap();
        let reference = dir.path().join("genome.fa");
        let opts = BuildOptions::default();
        let g = vec![("chr1".to_string(), FmTables::build(b"acgt", &opts).unwrap())];
        let path = store(&reference, "exact-bwt", &g).unwrap();

        // 文件末尾是 ro 的 None 标记，其前 4 字节是稠密 O 表的最后一项
        let mut bytes = fs::read(&path).unwrap();
        let len = bytes.len();
        bytes[len - 5..len - 1].copy_from_slice(&1000u32.to_le_bytes());
        fs::write(&path, bytes).unwrap();

        match load(&reference, "exact-bwt") {
            Err(GsaError::Unreadable { reason, .. }) => assert!(reason.contains("chr1"), "{}", reason),
            other => panic!("unexpected {:?}", other.map(|g| g.map(|g| g.len()))),
        }
    }

    #[test]
    fn failed_store_keeps_previous_cache() {
        let dir = tempdir().unwrap();
        let reference = dir.path().join("genome.fa");
        let g = genome(IndexMethod::ExactBwt, OccLayout::Dense);
        let path = store(&reference, "exact-bwt", &g).unwrap();
        assert!(!staging_path(&path).exists());

        // 临时文件位置被目录占据，写入失败
        fs::create_dir(staging_path(&path)).unwrap();
        let res = store(&reference, "exact-bwt", &g[..1]);
        assert!(matches!(res, Err(GsaError::Unwritable { .. })));
        assert_eq!(load(&reference, "exact-bwt").unwrap().unwrap(), g);
    }

    #[cfg(unix)]
    #[test]
    fn cache_in_unlistable_dir_is_not_a_miss() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let locked = dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        let reference = locked.join("genome.fa");
        store(&reference, "exact-bwt", &genome(IndexMethod::ExactBwt, OccLayout::Dense)).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // root 不受目录权限限制，此时 stat 仍会成功
        let stat_blocked = fs::metadata(cache_path(&reference, "exact-bwt")).is_err();
        let res = load(&reference, "exact-bwt");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        if stat_blocked {
            assert!(matches!(res, Err(GsaError::Unreadable { .. })));
        } else {
            assert!(res.unwrap().is_some());
        }
    }

    #[test]
    fn read_only_cache_is_not_overwritten() {
        let dir = tempdir().unwrap();
        let reference = dir.path().join("genome.fa");
        let path = cache_path(&reference, "exact-bwt");
        fs::write(&path, b"keep me").unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_readonly(true);
        fs::set_permissions(&path, perms).unwrap();

        let res = store(&reference, "exact-bwt", &genome(IndexMethod::ExactBwt, OccLayout::Dense));
        assert!(matches!(res, Err(GsaError::Unwritable { .. })));
        assert_eq!(fs::read(&path).unwrap(), b"keep me");
    }
}
