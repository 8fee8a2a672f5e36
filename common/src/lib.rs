//! Offline Assembler Common Library
//!
//! フロントエンド（CLI・GUI）で共有される組立セッションの中核:
//! データモデル、状態機械、レポート集計、スナップショット形式

pub mod types;
pub mod error;
pub mod session;
pub mod report;
pub mod snapshot;
pub mod export;

pub use types::{ItemStatus, OrderLine, WorkItem};
pub use error::{Error, Result};
pub use session::{Progress, ReviewRow, Session};
pub use report::{CompletionMode, PackedRecord, Report};
pub use snapshot::{SNAPSHOT_EXTENSION, SNAPSHOT_VERSION};
