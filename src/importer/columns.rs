//! 見出し行の列解決
//!
//! 論理列（商品名・数量・品番・棚番・バーコード）を見出しテキストから探す。
//! 比較は前後空白を除いた小文字の完全一致。

/// 論理列
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Name,
    Quantity,
    Article,
    Location,
    Barcode,
}

pub const REQUIRED_COLUMNS: [Column; 3] = [Column::Name, Column::Quantity, Column::Article];

impl Column {
    /// 見出しとして認める表記
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Column::Name => &["наименование товара", "наименование", "название", "name", "product name"],
            Column::Quantity => &["количество", "кол-во", "qty", "quantity"],
            Column::Article => &["артикул", "article", "sku"],
            Column::Location => &["ячейка", "место", "location", "bin"],
            Column::Barcode => &["штрихкод", "штрих-код", "barcode"],
        }
    }

    /// エラーメッセージ用の代表名
    pub fn display_name(&self) -> &'static str {
        match self {
            Column::Name => "Наименование товара",
            Column::Quantity => "Количество",
            Column::Article => "Артикул",
            Column::Location => "Ячейка",
            Column::Barcode => "Штрихкод",
        }
    }

    pub fn matches(&self, header: &str) -> bool {
        let normalized = header.trim().to_lowercase();
        !normalized.is_empty() && self.aliases().iter().any(|a| *a == normalized)
    }
}

/// 解決済みの列インデックス
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    pub name: Option<usize>,
    pub quantity: Option<usize>,
    pub article: Option<usize>,
    pub location: Option<usize>,
    pub barcode: Option<usize>,
}

impl ColumnMap {
    /// 見出しセル列から解決（同じ論理列が複数あれば最初を採用）
    pub fn resolve<S: AsRef<str>>(headers: &[S]) -> Self {
        let mut map = ColumnMap::default();
        for (idx, header) in headers.iter().enumerate() {
            let header = header.as_ref();
            for column in [
                Column::Name,
                Column::Quantity,
                Column::Article,
                Column::Location,
                Column::Barcode,
            ] {
                if column.matches(header) {
                    let slot = map.slot_mut(column);
                    if slot.is_none() {
                        *slot = Some(idx);
                    }
                }
            }
        }
        map
    }

    pub fn get(&self, column: Column) -> Option<usize> {
        match column {
            Column::Name => self.name,
            Column::Quantity => self.quantity,
            Column::Article => self.article,
            Column::Location => self.location,
            Column::Barcode => self.barcode,
        }
    }

    fn slot_mut(&mut self, column: Column) -> &mut Option<usize> {
        match column {
            Column::Name => &mut self.name,
            Column::Quantity => &mut self.quantity,
            Column::Article => &mut self.article,
            Column::Location => &mut self.location,
            Column::Barcode => &mut self.barcode,
        }
    }

    /// 見つからない必須列
    pub fn missing_required(&self) -> Vec<Column> {
        REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|c| self.get(*c).is_none())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_required().is_empty()
    }
}
