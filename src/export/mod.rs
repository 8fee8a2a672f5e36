//! レポートファイル出力
//!
//! 箱ごとの記録と差異メモを `<元ファイル名>_assembly_<日時>.xlsx` に書き出す。

use crate::error::{AssemblerError, Result};
use crate::persistence::write_atomic;
use assembler_common::export::excel_core;
use assembler_common::Report;
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

/// 出力ファイル名
pub fn report_file_name(source_path: &str, now: NaiveDateTime) -> String {
    let stem = Path::new(source_path)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("order");
    format!("{}_assembly_{}.xlsx", stem, now.format("%Y-%m-%d_%H-%M"))
}

// 同じ分に複数回出力した場合は連番を付ける
fn unique_path(output_dir: &Path, file_name: &str) -> PathBuf {
    let candidate = output_dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let stem = file_name.trim_end_matches(".xlsx");
    (2..)
        .map(|n| output_dir.join(format!("{}_{}.xlsx", stem, n)))
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}

/// レポートを書き出し、出力ファイルの絶対パスを返す
pub fn write_report(
    report: &Report,
    shipment_label: &str,
    source_path: &str,
    output_dir: &Path,
) -> Result<PathBuf> {
    if report.is_empty() {
        return Err(AssemblerError::Export("書き込むデータがありません".into()));
    }
    if !output_dir.is_dir() {
        return Err(AssemblerError::Export(format!(
            "出力フォルダがありません: {}",
            output_dir.display()
        )));
    }

    let buffer = excel_core::generate_report_buffer(report, shipment_label)
        .map_err(AssemblerError::Export)?;

    let now = chrono::Local::now().naive_local();
    let output_path = unique_path(output_dir, &report_file_name(source_path, now));

    write_atomic(&output_path, &buffer).map_err(|e| {
        AssemblerError::Export(format!("{} に書き込めません: {}", output_path.display(), e))
    })?;

    let output_path = output_path.canonicalize().unwrap_or(output_path);
    tracing::info!(
        path = %output_path.display(),
        packed = report.packed.len(),
        discrepancies = report.discrepancies.len(),
        "report written"
    );
    Ok(output_path)
}
