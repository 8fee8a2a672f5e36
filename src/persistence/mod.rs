//! セッションの保存・再開
//!
//! 形式は `assembler_common::snapshot`。書き込みは一時ファイル経由で置き換えるため、
//! 失敗しても既存ファイルが中途半端な内容になることはない。

mod autosave;

pub use autosave::Autosave;

use crate::error::{AssemblerError, Result};
use assembler_common::{snapshot, Session, SNAPSHOT_EXTENSION};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub fn is_snapshot(path: &Path) -> bool {
    path.extension()
        .map(|e| e == SNAPSHOT_EXTENSION)
        .unwrap_or(false)
}

/// 拡張子がなければ `.assm-save` を付ける
pub fn snapshot_path(path: &Path) -> PathBuf {
    if path.extension().is_none() {
        path.with_extension(SNAPSHOT_EXTENSION)
    } else {
        path.to_path_buf()
    }
}

/// セッションを指定パスへ保存し、実際の保存先を返す
pub fn save_session(session: &Session, path: &Path) -> Result<PathBuf> {
    let path = snapshot_path(path);
    let bytes = snapshot::serialize(session)?;

    write_atomic(&path, &bytes).map_err(|e| {
        AssemblerError::Persistence(format!("{} に保存できません: {}", path.display(), e))
    })?;

    tracing::info!(path = %path.display(), items = session.len(), "session saved");
    Ok(path)
}

/// 保存済みセッションを読み込む
pub fn load_session(path: &Path) -> Result<Session> {
    let bytes = fs::read(path).map_err(|e| {
        AssemblerError::Persistence(format!("{} を読み込めません: {}", path.display(), e))
    })?;

    let session = snapshot::deserialize(&bytes).map_err(|e| {
        AssemblerError::Persistence(format!("{} は有効な保存ファイルではありません: {}", path.display(), e))
    })?;

    tracing::info!(
        path = %path.display(),
        cursor = session.cursor(),
        items = session.len(),
        "session loaded"
    );
    Ok(session)
}

/// 一時ファイルに書いてから置き換える
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "ファイル名がありません"))?;
    let mut tmp_name = file_name.to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, bytes)?;
    if let Err(e) = fs::rename(&tmp_path, path) {
        fs::remove_file(&tmp_path).ok();
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assembler_common::OrderLine;
    use tempfile::tempdir;

    fn session() -> Session {
        Session::new(
            vec![OrderLine::new("Bolt", 2, "B-1", "", "")],
            "label",
            "/data/order.xlsx",
        )
    }

    #[test]
    fn test_snapshot_path_adds_extension() {
        assert_eq!(snapshot_path(Path::new("run")), PathBuf::from("run.assm-save"));
        assert_eq!(snapshot_path(Path::new("run.json")), PathBuf::from("run.json"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().expect("Failed to create temp dir");
        let saved = save_session(&session(), &dir.path().join("morning")).unwrap();

        assert!(is_snapshot(&saved));
        assert_eq!(load_session(&saved).unwrap(), session());
        // 一時ファイルは残らない
        assert!(!dir.path().join("morning.assm-save.tmp").exists());
    }

    #[test]
    fn test_load_missing_is_persistence_error() {
        let dir = tempdir().expect("Failed to create temp dir");
        let err = load_session(&dir.path().join("none.assm-save")).unwrap_err();
        assert!(matches!(err, AssemblerError::Persistence(_)));
    }

    #[test]
    fn test_load_corrupted_is_persistence_error() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("broken.assm-save");
        fs::write(&path, "{ invalid json }").unwrap();

        let err = load_session(&path).unwrap_err();
        assert!(matches!(err, AssemblerError::Persistence(_)));
    }
}
