//! 自動保存
//!
//! 状態を変える操作のたびに固定の場所へ書き出す。書き込み失敗（IO）は
//! 作業を止めないよう握りつぶし、ログにだけ残す。

use super::write_atomic;
use crate::error::Result;
use assembler_common::{snapshot, Session};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Autosave {
    path: PathBuf,
}

impl Autosave {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// 自動保存があれば読み込む
    pub fn load(&self) -> Result<Option<Session>> {
        if !self.exists() {
            return Ok(None);
        }
        super::load_session(&self.path).map(Some)
    }

    /// ベストエフォートで書き出す。IO失敗は Ok(()) を返す。
    pub fn record(&self, session: &Session) -> Result<()> {
        let bytes = snapshot::serialize(session)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                if let Err(e) = fs::create_dir_all(parent) {
                    tracing::warn!(path = %self.path.display(), error = %e, "autosave skipped");
                    return Ok(());
                }
            }
        }

        match write_atomic(&self.path, &bytes) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "autosaved"),
            Err(e) => tracing::warn!(path = %self.path.display(), error = %e, "autosave failed"),
        }
        Ok(())
    }

    /// 自動保存を削除。存在しなければ false。
    pub fn clear(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        fs::remove_file(&self.path)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assembler_common::OrderLine;
    use tempfile::tempdir;

    fn session() -> Session {
        Session::new(
            vec![
                OrderLine::new("Bolt", 2, "B-1", "", ""),
                OrderLine::new("Nut", 1, "N-1", "", ""),
            ],
            "label",
            "order.xlsx",
        )
    }

    #[test]
    fn test_record_load_clear() {
        let dir = tempdir().expect("Failed to create temp dir");
        let autosave = Autosave::new(dir.path().join("nested").join("autosave.assm-save"));
        assert!(!autosave.exists());
        assert!(autosave.load().unwrap().is_none());

        let mut s = session();
        s.collect().unwrap();
        autosave.record(&s).unwrap();

        assert!(autosave.exists());
        assert_eq!(autosave.load().unwrap(), Some(s));

        assert!(autosave.clear().unwrap());
        assert!(!autosave.clear().unwrap());
    }

    #[test]
    fn test_unwritable_location_is_swallowed() {
        let dir = tempdir().expect("Failed to create temp dir");
        let blocker = dir.path().join("file");
        fs::write(&blocker, "not a directory").unwrap();

        let autosave = Autosave::new(blocker.join("autosave.assm-save"));
        assert!(autosave.record(&session()).is_ok());
        assert!(!autosave.exists());
    }
}
