//! レポートExcel生成（共通ライブラリ）
//!
//! シート「Assembly result」: 出荷ラベル、差異メモ、箱ごとのブロックを横並び
//! シート「Packing list」: 箱詰め記録の一覧

use crate::report::{PackedRecord, Report};
use rust_xlsxwriter::*;

/// 1行目の出荷ラベルを結合する列数
const LABEL_MERGE_COLS: u16 = 10;
/// 箱ブロックの列数（数量・品番・バーコード）
const BOX_BLOCK_COLS: u16 = 3;
/// 箱ブロックの間隔（ブロック + 空列1）
const BOX_BLOCK_STRIDE: u16 = BOX_BLOCK_COLS + 1;

pub const SUMMARY_SHEET_NAME: &str = "Assembly result";
pub const PACKING_SHEET_NAME: &str = "Packing list";

/// 箱ブロックの開始行（0始まり）
///
/// 差異がある場合: 見出し(2行目) + メモ件数 + 空行の後。ない場合は4行目。
pub fn box_blocks_start_row(discrepancy_count: usize) -> u32 {
    if discrepancy_count == 0 {
        3
    } else {
        2 + discrepancy_count as u32 + 2
    }
}

/// 箱ブロックの開始列（0始まり）
pub fn box_block_column(block_index: usize) -> u16 {
    block_index as u16 * BOX_BLOCK_STRIDE
}

/// レポートExcelをバッファに生成
pub fn generate_report_buffer(report: &Report, shipment_label: &str) -> Result<Vec<u8>, String> {
    if report.is_empty() {
        return Err("書き込むデータがありません".to_string());
    }

    let mut workbook = Workbook::new();

    write_summary_sheet(workbook.add_worksheet(), report, shipment_label)?;
    write_packing_sheet(workbook.add_worksheet(), &report.packed)?;

    workbook
        .save_to_buffer()
        .map_err(|e| format!("Excel保存エラー: {}", e))
}

fn write_summary_sheet(
    worksheet: &mut Worksheet,
    report: &Report,
    shipment_label: &str,
) -> Result<(), String> {
    let label_format = Format::new().set_bold().set_font_size(12.0);
    let heading_format = Format::new().set_bold().set_font_color(Color::RGB(0xC00000));
    let box_header_format = Format::new()
        .set_bold()
        .set_align(FormatAlign::Center)
        .set_background_color(Color::RGB(0xF5F5F5))
        .set_border(FormatBorder::Thin);
    let column_header_format = Format::new()
        .set_bold()
        .set_font_size(9.0)
        .set_font_color(Color::RGB(0x555555))
        .set_border(FormatBorder::Hair);

    worksheet
        .set_name(SUMMARY_SHEET_NAME)
        .map_err(|e| format!("シート名設定エラー: {}", e))?;

    worksheet
        .merge_range(0, 0, 0, LABEL_MERGE_COLS - 1, shipment_label, &label_format)
        .map_err(|e| format!("ラベル書き込みエラー: {}", e))?;

    if !report.discrepancies.is_empty() {
        worksheet
            .write_string_with_format(2, 0, "Discrepancies:", &heading_format)
            .map_err(|e| format!("差異見出し書き込みエラー: {}", e))?;
        for (i, note) in report.discrepancies.iter().enumerate() {
            worksheet
                .write_string(3 + i as u32, 0, note)
                .map_err(|e| format!("差異書き込みエラー: {}", e))?;
        }
    }

    let start_row = box_blocks_start_row(report.discrepancies.len());

    for (block_index, (box_number, records)) in report.boxes().into_iter().enumerate() {
        let col = box_block_column(block_index);

        worksheet
            .merge_range(
                start_row,
                col,
                start_row,
                col + BOX_BLOCK_COLS - 1,
                &format!("Box #{}", box_number),
                &box_header_format,
            )
            .map_err(|e| format!("箱見出しマージエラー: {}", e))?;

        for (offset, title) in ["Qty", "Article", "Barcode"].iter().enumerate() {
            worksheet
                .write_string_with_format(start_row + 1, col + offset as u16, *title, &column_header_format)
                .map_err(|e| format!("列見出し書き込みエラー: {}", e))?;
        }

        for (i, record) in records.iter().enumerate() {
            let row = start_row + 2 + i as u32;
            worksheet
                .write_number(row, col, record.quantity)
                .map_err(|e| format!("数量書き込みエラー: {}", e))?;
            worksheet
                .write_string(row, col + 1, &record.article)
                .map_err(|e| format!("品番書き込みエラー: {}", e))?;
            worksheet
                .write_string(row, col + 2, &record.barcode)
                .map_err(|e| format!("バーコード書き込みエラー: {}", e))?;
        }

        worksheet
            .set_column_width(col + 1, 16)
            .map_err(|e| format!("列幅設定エラー: {}", e))?;
        worksheet
            .set_column_width(col + 2, 18)
            .map_err(|e| format!("列幅設定エラー: {}", e))?;
    }

    Ok(())
}

fn write_packing_sheet(worksheet: &mut Worksheet, packed: &[PackedRecord]) -> Result<(), String> {
    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xF5F5F5))
        .set_border(FormatBorder::Thin);

    worksheet
        .set_name(PACKING_SHEET_NAME)
        .map_err(|e| format!("シート名設定エラー: {}", e))?;

    let headers = ["Box", "Article", "Name", "Quantity", "Barcode"];
    let widths = [10, 20, 40, 12, 25];
    for (col, (title, width)) in headers.iter().zip(widths).enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, *title, &header_format)
            .map_err(|e| format!("見出し書き込みエラー: {}", e))?;
        worksheet
            .set_column_width(col as u16, width)
            .map_err(|e| format!("列幅設定エラー: {}", e))?;
    }

    for (i, record) in packed.iter().enumerate() {
        let row = 1 + i as u32;
        worksheet
            .write_number(row, 0, record.box_number)
            .map_err(|e| format!("箱番号書き込みエラー: {}", e))?;
        worksheet
            .write_string(row, 1, &record.article)
            .map_err(|e| format!("品番書き込みエラー: {}", e))?;
        worksheet
            .write_string(row, 2, &record.name)
            .map_err(|e| format!("商品名書き込みエラー: {}", e))?;
        worksheet
            .write_number(row, 3, record.quantity)
            .map_err(|e| format!("数量書き込みエラー: {}", e))?;
        worksheet
            .write_string(row, 4, &record.barcode)
            .map_err(|e| format!("バーコード書き込みエラー: {}", e))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(box_number: u32, article: &str) -> PackedRecord {
        PackedRecord {
            box_number,
            article: article.to_string(),
            name: format!("item {}", article),
            quantity: 2,
            barcode: String::new(),
        }
    }

    #[test]
    fn test_box_layout_positions() {
        assert_eq!(box_blocks_start_row(0), 3);
        assert_eq!(box_blocks_start_row(2), 6);
        assert_eq!(box_block_column(0), 0);
        assert_eq!(box_block_column(2), 8);
    }

    #[test]
    fn test_generate_buffer() {
        let report = Report {
            packed: vec![record(2, "A"), record(1, "B"), record(2, "C")],
            discrepancies: vec!["skipped: article: D - 1 units".to_string()],
        };
        let buffer = generate_report_buffer(&report, "Отгрузка №1 от 01-01-2024").unwrap();
        // xlsx は zip
        assert!(buffer.starts_with(b"PK"));
    }

    #[test]
    fn test_discrepancies_only() {
        let report = Report {
            packed: vec![],
            discrepancies: vec!["skipped: 4600 - 3 units".to_string()],
        };
        assert!(generate_report_buffer(&report, "").is_ok());
    }

    #[test]
    fn test_empty_report_rejected() {
        assert!(generate_report_buffer(&Report::default(), "label").is_err());
    }
}
