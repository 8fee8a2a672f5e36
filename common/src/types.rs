//! 組立セッションの型定義
//!
//! 取込アダプタとフロントエンドで共有される型:
//! - OrderLine: 注文表の1行（取込後は不変）
//! - ItemStatus: 作業項目の状態
//! - WorkItem: 注文行 + ピッキング進捗

use serde::{Deserialize, Serialize};

/// 品番が空のときの表示値
pub const UNKNOWN_ARTICLE: &str = "?";

/// 注文行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    /// 商品名（空でない）
    pub name: String,

    /// ピッキング予定数量（> 0）
    pub quantity: u32,

    /// 品番（空なら "?"）
    pub article: String,

    /// 棚番・ロケーション
    #[serde(default)]
    pub location: String,

    /// バーコード
    #[serde(default)]
    pub barcode: String,
}

impl OrderLine {
    pub fn new(
        name: impl Into<String>,
        quantity: u32,
        article: impl Into<String>,
        location: impl Into<String>,
        barcode: impl Into<String>,
    ) -> Self {
        let article = article.into();
        let article = if article.trim().is_empty() {
            UNKNOWN_ARTICLE.to_string()
        } else {
            article.trim().to_string()
        };

        Self {
            name: name.into().trim().to_string(),
            quantity,
            article,
            location: location.into().trim().to_string(),
            barcode: barcode.into().trim().to_string(),
        }
    }

    /// レポート用の識別子（バーコード優先、なければ品番）
    pub fn identifier(&self) -> String {
        if self.barcode.is_empty() {
            format!("article: {}", self.article)
        } else {
            self.barcode.clone()
        }
    }
}

/// 作業項目の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    #[default]
    Pending,
    Collected,
    Skipped,
    QuantityChanged,
}

impl ItemStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, ItemStatus::Pending)
    }

    /// 一覧表示用の短いラベル
    pub fn label(&self) -> &'static str {
        match self {
            ItemStatus::Pending => "pending",
            ItemStatus::Collected => "collected",
            ItemStatus::Skipped => "skipped",
            ItemStatus::QuantityChanged => "changed",
        }
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 作業項目（注文行1件につき1件）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItem {
    #[serde(flatten)]
    pub line: OrderLine,

    #[serde(default)]
    pub status: ItemStatus,

    /// 実際に集めた数量
    #[serde(default)]
    pub collected_quantity: u32,

    /// 箱番号（0 = 未割当）
    #[serde(default, rename = "box")]
    pub box_number: u32,
}

impl WorkItem {
    pub fn new(line: OrderLine) -> Self {
        Self {
            line,
            status: ItemStatus::Pending,
            collected_quantity: 0,
            box_number: 0,
        }
    }

    /// バーコード末尾4桁（先頭のドットは除去）
    pub fn barcode_tail(&self) -> &str {
        let barcode = self.line.barcode.as_str();
        let tail = match barcode.char_indices().rev().nth(3) {
            Some((idx, _)) => &barcode[idx..],
            None => barcode,
        };
        tail.trim_start_matches('.')
    }

    /// 箱番号の表示（未割当は "-"）
    pub fn box_label(&self) -> String {
        if self.box_number == 0 {
            "-".to_string()
        } else {
            self.box_number.to_string()
        }
    }

    pub(crate) fn mark_collected(&mut self, box_number: u32) {
        self.status = ItemStatus::Collected;
        self.collected_quantity = self.line.quantity;
        self.box_number = box_number;
    }

    pub(crate) fn mark_skipped(&mut self) {
        self.status = ItemStatus::Skipped;
        self.collected_quantity = 0;
        self.box_number = 0;
    }

    pub(crate) fn mark_changed(&mut self, quantity: u32, box_number: u32) {
        self.status = ItemStatus::QuantityChanged;
        self.collected_quantity = quantity;
        self.box_number = box_number;
    }

    pub(crate) fn reset_pending(&mut self) {
        self.status = ItemStatus::Pending;
        self.collected_quantity = 0;
        self.box_number = 0;
    }
}
