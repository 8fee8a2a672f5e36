//! 最終レポートの集計
//!
//! セッションから箱詰め記録と差異メモを導出する。

use crate::error::{Error, Result};
use crate::session::Session;
use crate::types::ItemStatus;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 箱詰め記録
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackedRecord {
    #[serde(rename = "box")]
    pub box_number: u32,
    pub article: String,
    pub name: String,
    pub quantity: u32,
    pub barcode: String,
}

/// 集計結果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub packed: Vec<PackedRecord>,
    pub discrepancies: Vec<String>,
}

impl Report {
    pub fn is_empty(&self) -> bool {
        self.packed.is_empty() && self.discrepancies.is_empty()
    }

    /// 箱番号の昇順で記録をまとめる（箱内は取込順）
    pub fn boxes(&self) -> BTreeMap<u32, Vec<&PackedRecord>> {
        let mut boxes: BTreeMap<u32, Vec<&PackedRecord>> = BTreeMap::new();
        for record in &self.packed {
            boxes.entry(record.box_number).or_default().push(record);
        }
        boxes
    }
}

/// レポート生成モード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletionMode {
    /// 全件処理済みで終了
    #[default]
    Natural,
    /// 中間レポート（未処理分は出力後に pending へ戻す）
    Intermediate,
    /// 早期終了（未処理分をスキップ扱いで確定）
    FinishEarly,
}

impl CompletionMode {
    pub fn forces_skips(&self) -> bool {
        matches!(self, CompletionMode::Intermediate | CompletionMode::FinishEarly)
    }

    pub fn finishes(&self) -> bool {
        !matches!(self, CompletionMode::Intermediate)
    }
}

/// セッションからレポートを導出（セッションは変更しない）
pub fn reduce(session: &Session) -> Result<Report> {
    let mut report = Report::default();

    for item in session.items() {
        let counts_as_packed = matches!(
            item.status,
            ItemStatus::Collected | ItemStatus::QuantityChanged
        );
        if counts_as_packed && item.collected_quantity > 0 {
            report.packed.push(PackedRecord {
                box_number: item.box_number,
                article: item.line.article.clone(),
                name: item.line.name.clone(),
                quantity: item.collected_quantity,
                barcode: item.line.barcode.clone(),
            });
        }

        match item.status {
            ItemStatus::Skipped => report.discrepancies.push(format!(
                "skipped: {} - {} units",
                item.line.identifier(),
                item.line.quantity
            )),
            // 数量0への変更も「変更」として記録する
            ItemStatus::QuantityChanged if item.collected_quantity != item.line.quantity => {
                report.discrepancies.push(format!(
                    "changed: {} was {}, became {}",
                    item.line.identifier(),
                    item.line.quantity,
                    item.collected_quantity
                ))
            }
            _ => {}
        }
    }

    if report.is_empty() {
        return Err(Error::EmptyReport);
    }
    Ok(report)
}

/// モードに従って未処理分を確定させてからレポートを導出する。
///
/// 戻り値の `Vec<usize>` は強制スキップした項目。失敗時は強制スキップを戻し、
/// セッションは呼び出し前の状態のまま。`Intermediate` では出力後に
/// 呼び出し側が `Session::restore_pending` で戻す。
pub fn prepare(session: &mut Session, mode: CompletionMode) -> Result<(Report, Vec<usize>)> {
    let forced = if mode.forces_skips() {
        session.force_complete()
    } else {
        Vec::new()
    };

    match reduce(session) {
        Ok(report) => Ok((report, forced)),
        Err(e) => {
            session.restore_pending(&forced);
            Err(e)
        }
    }
}
