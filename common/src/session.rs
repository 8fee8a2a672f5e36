//! 組立セッションの状態機械
//!
//! 作業項目の並び（取込順、並べ替えなし）、カーソル、現在の箱番号を保持する。
//! 作業項目の変更はすべてこのモジュールの遷移操作を通す。
//!
//! カーソルは `items.len()` で終端（全件処理済み）を表す。

use crate::error::{Error, Result};
use crate::types::{ItemStatus, OrderLine, WorkItem};
use serde::{Deserialize, Serialize};

/// 組立セッション
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    items: Vec<WorkItem>,
    cursor: usize,
    current_box: u32,
    #[serde(default)]
    shipment_label: String,
    #[serde(default)]
    source_path: String,
    #[serde(default)]
    output_directory: Option<String>,
}

/// 進捗情報
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// 現在位置（1始まり、終端なら total）
    pub position: usize,
    pub total: usize,
    /// pending 以外の件数
    pub resolved: usize,
    pub current_box: u32,
}

/// 確認一覧の1行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRow {
    pub index: usize,
    pub status: ItemStatus,
    pub location: String,
    pub planned: u32,
    pub collected: u32,
    pub box_label: String,
    pub is_current: bool,
}

impl Session {
    /// 取込結果から新規セッションを作成（全件 pending、カーソル0、箱1）
    pub fn new(
        lines: Vec<OrderLine>,
        shipment_label: impl Into<String>,
        source_path: impl Into<String>,
    ) -> Self {
        Self {
            items: lines.into_iter().map(WorkItem::new).collect(),
            cursor: 0,
            current_box: 1,
            shipment_label: shipment_label.into(),
            source_path: source_path.into(),
            output_directory: None,
        }
    }

    pub fn items(&self) -> &[WorkItem] {
        &self.items
    }

    pub fn item(&self, index: usize) -> Option<&WorkItem> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current_box(&self) -> u32 {
        self.current_box
    }

    pub fn shipment_label(&self) -> &str {
        &self.shipment_label
    }

    pub fn source_path(&self) -> &str {
        &self.source_path
    }

    pub fn output_directory(&self) -> Option<&str> {
        self.output_directory.as_deref()
    }

    pub fn set_output_directory(&mut self, dir: impl Into<String>) {
        self.output_directory = Some(dir.into());
    }

    /// カーソルが指す作業項目
    pub fn current(&self) -> Option<&WorkItem> {
        self.items.get(self.cursor)
    }

    /// カーソルが終端を越えたか
    pub fn is_complete(&self) -> bool {
        self.cursor >= self.items.len()
    }

    /// 現在の項目を全数集めて現在の箱に入れる
    pub fn collect(&mut self) -> Result<()> {
        let index = self.require_current()?;
        let box_number = self.current_box;
        self.items[index].mark_collected(box_number);
        self.advance_cursor();
        Ok(())
    }

    /// 現在の項目をスキップ
    pub fn skip(&mut self) -> Result<()> {
        let index = self.require_current()?;
        self.items[index].mark_skipped();
        self.advance_cursor();
        Ok(())
    }

    /// 現在の項目の数量・箱を変更
    pub fn adjust_current(&mut self, new_quantity: i64, new_box: i64) -> Result<()> {
        let index = self.require_current()?;
        self.adjust_quantity(index, new_quantity, new_box)
    }

    /// 任意の項目の数量・箱を変更する。
    ///
    /// カーソル位置の項目なら現在の箱を `new_box` に切り替えて次へ進む。
    /// それ以外（確認一覧からの編集）ではカーソルは動かさない。
    pub fn adjust_quantity(&mut self, index: usize, new_quantity: i64, new_box: i64) -> Result<()> {
        let (quantity, box_number) = validate_adjustment(new_quantity, new_box)?;
        if index >= self.items.len() {
            return Err(Error::ItemOutOfRange {
                index,
                len: self.items.len(),
            });
        }

        self.items[index].mark_changed(quantity, box_number);

        if index == self.cursor {
            self.current_box = box_number;
            self.advance_cursor();
        }
        Ok(())
    }

    /// 次の箱へ
    pub fn advance_box(&mut self) -> Result<()> {
        self.current_box = self.current_box.checked_add(1).ok_or_else(|| {
            Error::InvalidInput(format!("box number {} is the last one", self.current_box))
        })?;
        Ok(())
    }

    /// 未処理の項目をすべてスキップ扱いにし、対象のインデックスを返す
    pub fn force_complete(&mut self) -> Vec<usize> {
        let mut forced = Vec::new();
        for (index, item) in self.items.iter_mut().enumerate() {
            if item.status.is_pending() {
                item.mark_skipped();
                forced.push(index);
            }
        }
        self.cursor = self.items.len();
        forced
    }

    /// `force_complete` でスキップ扱いにした項目を pending に戻す。
    ///
    /// その後に編集された項目（skipped かつ数量0 以外）はそのまま残す。
    pub fn restore_pending(&mut self, forced: &[usize]) {
        for &index in forced {
            if let Some(item) = self.items.get_mut(index) {
                if item.status == ItemStatus::Skipped && item.collected_quantity == 0 {
                    item.reset_pending();
                }
            }
        }
        // カーソルより前は常に処理済みなので、先頭の pending が元の位置
        self.cursor = 0;
        self.seek_pending();
    }

    pub fn progress(&self) -> Progress {
        let total = self.items.len();
        Progress {
            position: if self.is_complete() { total } else { self.cursor + 1 },
            total,
            resolved: self
                .items
                .iter()
                .filter(|item| !item.status.is_pending())
                .count(),
            current_box: self.current_box,
        }
    }

    pub fn review_rows(&self) -> Vec<ReviewRow> {
        self.items
            .iter()
            .enumerate()
            .map(|(index, item)| ReviewRow {
                index,
                status: item.status,
                location: item.line.location.clone(),
                planned: item.line.quantity,
                collected: item.collected_quantity,
                box_label: item.box_label(),
                is_current: index == self.cursor,
            })
            .collect()
    }

    /// 復元したセッションの構造チェック
    pub fn validate(&self) -> Result<()> {
        if self.cursor > self.items.len() {
            return Err(Error::Snapshot(format!(
                "cursor {} is beyond {} items",
                self.cursor,
                self.items.len()
            )));
        }
        if self.current_box == 0 {
            return Err(Error::Snapshot("current box must be >= 1".into()));
        }
        if let Some(index) = self.items.iter().position(|item| item.line.quantity == 0) {
            return Err(Error::Snapshot(format!(
                "item {} has zero planned quantity",
                index
            )));
        }
        if let Some(index) = self.items.iter().position(|item| {
            item.status.is_pending() && (item.collected_quantity != 0 || item.box_number != 0)
        }) {
            return Err(Error::Snapshot(format!(
                "pending item {} already has a quantity or box",
                index
            )));
        }
        Ok(())
    }

    fn require_current(&self) -> Result<usize> {
        if self.is_complete() {
            Err(Error::NoCurrentItem)
        } else {
            Ok(self.cursor)
        }
    }

    fn advance_cursor(&mut self) {
        self.cursor += 1;
        self.seek_pending();
    }

    // カーソル位置から次の pending まで進める（なければ終端）
    fn seek_pending(&mut self) {
        while self.cursor < self.items.len() && !self.items[self.cursor].status.is_pending() {
            self.cursor += 1;
        }
    }
}

/// 数量・箱番号の入力チェック
pub fn validate_adjustment(new_quantity: i64, new_box: i64) -> Result<(u32, u32)> {
    if new_quantity < 0 {
        return Err(Error::InvalidInput(format!(
            "quantity must be >= 0, got {}",
            new_quantity
        )));
    }
    if new_box < 1 {
        return Err(Error::InvalidInput(format!(
            "box number must be >= 1, got {}",
            new_box
        )));
    }
    let quantity = u32::try_from(new_quantity)
        .map_err(|_| Error::InvalidInput(format!("quantity {} is too large", new_quantity)))?;
    let box_number = u32::try_from(new_box)
        .map_err(|_| Error::InvalidInput(format!("box number {} is too large", new_box)))?;
    Ok((quantity, box_number))
}

/// テキスト入力を整数として解釈（数字以外は InvalidInput）
pub fn parse_number(input: &str) -> Result<i64> {
    let trimmed = input.trim();
    trimmed
        .parse::<i64>()
        .map_err(|_| Error::InvalidInput(format!("'{}' is not a whole number", trimmed)))
}
