//! 注文表の取込
//!
//! スプレッドシートの先頭シートを読み、見出し行を探して注文行へ変換する。

mod columns;
mod shipment;

pub use columns::{Column, ColumnMap, REQUIRED_COLUMNS};
pub use shipment::shipment_label;

use crate::error::{AssemblerError, Result};
use assembler_common::{OrderLine, Session};
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;

/// 取込対象の拡張子
pub const ORDER_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "ods"];

/// 見出し行の指定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderRow {
    /// 先頭から指定行数の範囲で自動検出
    Detect { scan_rows: usize },
    /// シート上の行番号（1始まり）
    Fixed(usize),
}

/// 取込結果
#[derive(Debug, Clone)]
pub struct ImportedOrder {
    pub lines: Vec<OrderLine>,
    pub shipment_label: String,
}

impl ImportedOrder {
    pub fn into_session(self, source_path: &Path) -> Session {
        let source = source_path
            .canonicalize()
            .unwrap_or_else(|_| source_path.to_path_buf());
        Session::new(
            self.lines,
            self.shipment_label,
            source.to_string_lossy().to_string(),
        )
    }
}

pub fn is_order_sheet(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| ORDER_EXTENSIONS.iter().any(|x| x.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

/// 注文表ファイルを読み込む
pub fn import_order(path: &Path, header: HeaderRow) -> Result<ImportedOrder> {
    if !path.exists() {
        return Err(AssemblerError::Import(format!(
            "ファイルが見つかりません: {}",
            path.display()
        )));
    }

    let mut workbook = open_workbook_auto(path)
        .map_err(|e| AssemblerError::Import(format!("ファイルを開けません: {}", e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AssemblerError::Import("シートがありません".into()))?
        .map_err(|e| AssemblerError::Import(format!("シート読み込みエラー: {}", e)))?;

    // Range は最初の使用セルから始まるので、固定行指定はシート上の位置に合わせる
    let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);
    let header = match header {
        HeaderRow::Fixed(row) if row >= 1 => {
            let sheet_index = row - 1;
            if sheet_index < first_row {
                return Err(AssemblerError::Import(format!(
                    "見出し行 {} は空行です",
                    row
                )));
            }
            HeaderRow::Fixed(sheet_index - first_row + 1)
        }
        other => other,
    };

    let rows: Vec<Vec<Data>> = range.rows().map(|r| r.to_vec()).collect();
    let now = chrono::Local::now().naive_local();

    let order = parse_rows(&rows, header, now)?;
    tracing::info!(
        path = %path.display(),
        lines = order.lines.len(),
        label = %order.shipment_label,
        "order sheet imported"
    );
    Ok(order)
}

/// シートの行データから注文行を作る
pub fn parse_rows(
    rows: &[Vec<Data>],
    header: HeaderRow,
    now: chrono::NaiveDateTime,
) -> Result<ImportedOrder> {
    if rows.is_empty() {
        return Err(AssemblerError::Import("シートが空です".into()));
    }

    let (header_index, columns) = locate_header(rows, header)?;
    tracing::debug!(header_row = header_index + 1, ?columns, "header resolved");

    let first_row_text = rows[0]
        .iter()
        .filter_map(cell_string)
        .collect::<Vec<_>>()
        .join(" ");
    let shipment_label = shipment_label(&first_row_text, now);

    let mut lines = Vec::new();
    for (offset, row) in rows.iter().enumerate().skip(header_index + 1) {
        match parse_line(row, &columns) {
            Some(line) => lines.push(line),
            None => tracing::debug!(row = offset + 1, "row skipped"),
        }
    }

    if lines.is_empty() {
        return Err(AssemblerError::Import(
            "ピッキング対象の行がありません（数量 > 0 の行なし）".into(),
        ));
    }

    Ok(ImportedOrder {
        lines,
        shipment_label,
    })
}

fn locate_header(rows: &[Vec<Data>], header: HeaderRow) -> Result<(usize, ColumnMap)> {
    let resolve = |row: &Vec<Data>| {
        let headers: Vec<String> = row
            .iter()
            .map(|c| cell_string(c).unwrap_or_default())
            .collect();
        ColumnMap::resolve(&headers)
    };

    let (index, map) = match header {
        HeaderRow::Fixed(row) => {
            let index = row.saturating_sub(1);
            let cells = rows.get(index).ok_or_else(|| {
                AssemblerError::Import(format!("見出し行 {} がシートにありません", row))
            })?;
            (index, resolve(cells))
        }
        HeaderRow::Detect { scan_rows } => {
            let mut best: Option<(usize, ColumnMap)> = None;
            for (index, row) in rows.iter().enumerate().take(scan_rows.max(1)) {
                let map = resolve(row);
                if map.is_complete() {
                    return Ok((index, map));
                }
                let better = best
                    .as_ref()
                    .map(|(_, b)| map.missing_required().len() < b.missing_required().len())
                    .unwrap_or(true);
                if better {
                    best = Some((index, map));
                }
            }
            best.unwrap_or_else(|| (0, ColumnMap::default()))
        }
    };

    let missing = map.missing_required();
    if !missing.is_empty() {
        let names: Vec<&str> = missing.iter().map(|c| c.display_name()).collect();
        return Err(AssemblerError::Import(format!(
            "必須列がありません: {}",
            names.join(", ")
        )));
    }
    Ok((index, map))
}

fn parse_line(row: &[Data], columns: &ColumnMap) -> Option<OrderLine> {
    let text = |column: Column| {
        columns
            .get(column)
            .and_then(|idx| row.get(idx))
            .and_then(cell_string)
            .unwrap_or_default()
    };

    let name = text(Column::Name);
    if name.is_empty() {
        return None;
    }

    let quantity = columns
        .get(Column::Quantity)
        .and_then(|idx| row.get(idx))
        .and_then(cell_quantity)?;
    if quantity <= 0 {
        return None;
    }
    let quantity = u32::try_from(quantity).ok()?;

    Some(OrderLine::new(
        name,
        quantity,
        text(Column::Article),
        text(Column::Location),
        text(Column::Barcode),
    ))
}

fn cell_string(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::Empty => return None,
        Data::String(s) => s.trim().to_string(),
        Data::Float(v) => format!("{v}"),
        Data::Int(v) => format!("{v}"),
        Data::Bool(v) => v.to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
        other => format!("{other:?}"),
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

// 小数は切り捨て
fn cell_quantity(cell: &Data) -> Option<i64> {
    match cell {
        Data::Int(v) => Some(*v),
        Data::Float(v) if v.is_finite() => Some(v.trunc() as i64),
        Data::String(s) => {
            let s = s.trim().replace(',', ".");
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|v| v.is_finite()).map(|v| v.trunc() as i64))
        }
        _ => None,
    }
}
