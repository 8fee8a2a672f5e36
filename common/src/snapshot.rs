//! セッションのスナップショット形式
//!
//! 手動保存・再開・自動保存で共通のJSON形式。
//! `{ "version": 1, "session": { ... } }`

use crate::error::{Error, Result};
use crate::session::Session;
use serde::{Deserialize, Serialize};

/// 保存ファイルの拡張子
pub const SNAPSHOT_EXTENSION: &str = "assm-save";

/// 現在のスナップショット形式バージョン
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    session: &'a Session,
}

#[derive(Deserialize)]
struct SnapshotOwned {
    version: u32,
    session: Session,
}

/// セッションをスナップショットへ変換
pub fn serialize(session: &Session) -> Result<Vec<u8>> {
    let snapshot = SnapshotRef {
        version: SNAPSHOT_VERSION,
        session,
    };
    Ok(serde_json::to_vec_pretty(&snapshot)?)
}

/// スナップショットからセッションを復元（バージョン・構造チェック付き）
pub fn deserialize(bytes: &[u8]) -> Result<Session> {
    let snapshot: SnapshotOwned = serde_json::from_slice(bytes)?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(Error::Snapshot(format!(
            "unsupported snapshot version {} (expected {})",
            snapshot.version, SNAPSHOT_VERSION
        )));
    }
    snapshot.session.validate()?;
    Ok(snapshot.session)
}
