//! 組立作業の通しテスト
//!
//! 取込 → 操作 → 自動保存 → レポート出力 → Excel読み戻し

use assembler_common::report::CompletionMode;
use assembler_common::{ItemStatus, OrderLine, Session};
use calamine::{open_workbook_auto, Data, Reader};
use offline_assembler::assembly::Assembly;
use offline_assembler::config::Config;
use offline_assembler::error::AssemblerError;
use offline_assembler::persistence::{self, Autosave};
use std::path::Path;
use tempfile::tempdir;

fn order_session(dir: &Path) -> Session {
    Session::new(
        vec![
            OrderLine::new("Bolt", 5, "B-1", "A1", "4600001"),
            OrderLine::new("Nut", 3, "N-1", "A2", "4600002"),
            OrderLine::new("Washer", 2, "W-1", "A3", ""),
        ],
        "Отгрузка №7 от 01-03-2024",
        dir.join("order.xlsx").to_string_lossy().to_string(),
    )
}

fn config_for(dir: &Path) -> Config {
    Config {
        output_directory: Some(dir.to_string_lossy().to_string()),
        ..Config::default()
    }
}

fn sheet_rows(path: &Path, sheet: &str) -> Vec<Vec<Data>> {
    let mut workbook = open_workbook_auto(path).expect("Failed to open report");
    let range = workbook.worksheet_range(sheet).expect("Sheet missing");
    range.rows().map(|r| r.to_vec()).collect()
}

/// 集品・箱替え・数量変更・スキップの後に自然終了
#[test]
fn test_full_walkthrough_writes_report() {
    let dir = tempdir().expect("Failed to create temp dir");
    let autosave = Autosave::new(dir.path().join("autosave.assm-save"));
    let config = config_for(dir.path());

    let mut assembly = Assembly::start(order_session(dir.path()), Some(autosave.clone())).unwrap();
    assembly.collect().unwrap();
    assembly.advance_box().unwrap();
    assembly.adjust_current(2, 2).unwrap();
    assembly.skip().unwrap();
    assert!(assembly.session().is_complete());

    let outcome = assembly.generate_report(CompletionMode::Natural, &config).unwrap();
    assert!(outcome.finished);
    assert!(outcome.path.exists());
    assert!(outcome
        .path
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("order_assembly_"));
    assert_eq!(
        outcome.report.discrepancies,
        vec![
            "changed: 4600002 was 3, became 2".to_string(),
            "skipped: article: W-1 - 2 units".to_string(),
        ]
    );
    // 終了したので自動保存は消える
    assert!(!autosave.exists());

    let packing = sheet_rows(&outcome.path, "Packing list");
    assert_eq!(packing.len(), 3);
    assert_eq!(packing[1][0], Data::Float(1.0));
    assert_eq!(packing[1][1], Data::String("B-1".into()));
    assert_eq!(packing[1][3], Data::Float(5.0));
    assert_eq!(packing[2][0], Data::Float(2.0));
    assert_eq!(packing[2][3], Data::Float(2.0));

    let summary = sheet_rows(&outcome.path, "Assembly result");
    assert_eq!(summary[0][0], Data::String("Отгрузка №7 от 01-03-2024".into()));
    assert_eq!(summary[2][0], Data::String("Discrepancies:".into()));
}

/// 早期終了: 未処理の項目はスキップとして確定
#[test]
fn test_finish_early() {
    let dir = tempdir().expect("Failed to create temp dir");
    let autosave = Autosave::new(dir.path().join("autosave.assm-save"));
    let config = config_for(dir.path());

    let mut assembly = Assembly::start(order_session(dir.path()), Some(autosave.clone())).unwrap();
    assembly.collect().unwrap();

    let outcome = assembly.generate_report(CompletionMode::FinishEarly, &config).unwrap();
    assert_eq!(outcome.report.packed.len(), 1);
    assert_eq!(outcome.report.discrepancies.len(), 2);
    assert!(assembly.session().is_complete());
    assert_eq!(assembly.session().item(2).unwrap().status, ItemStatus::Skipped);
    assert!(!autosave.exists());
}

/// 中間レポート後も作業を続けられる
#[test]
fn test_intermediate_report_keeps_session_resumable() {
    let dir = tempdir().expect("Failed to create temp dir");
    let autosave = Autosave::new(dir.path().join("autosave.assm-save"));
    let config = config_for(dir.path());

    let mut assembly = Assembly::start(order_session(dir.path()), Some(autosave.clone())).unwrap();
    assembly.collect().unwrap();
    let before = assembly.session().clone();

    let outcome = assembly.generate_report(CompletionMode::Intermediate, &config).unwrap();
    assert!(!outcome.finished);
    assert_eq!(outcome.report.discrepancies.len(), 2);
    assert_eq!(assembly.session(), &before);

    // 自動保存にも戻した状態が残る
    assert_eq!(autosave.load().unwrap(), Some(before));
}

/// 範囲外の数量変更は状態を変えない
#[test]
fn test_invalid_adjustment_leaves_state() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut assembly = Assembly::start(order_session(dir.path()), None).unwrap();
    let before = assembly.session().clone();

    let err = assembly.adjust_current(-1, 1).unwrap_err();
    assert!(err.is_invalid_input());
    let err = assembly.adjust_current(2, 0).unwrap_err();
    assert!(err.is_invalid_input());
    let err = assembly.adjust_item(10, 1, 1).unwrap_err();
    assert!(matches!(
        err,
        AssemblerError::Common(assembler_common::Error::ItemOutOfRange { .. })
    ));

    assert_eq!(assembly.session(), &before);
}

/// 中断して自動保存から再開
#[test]
fn test_resume_from_autosave() {
    let dir = tempdir().expect("Failed to create temp dir");
    let autosave = Autosave::new(dir.path().join("autosave.assm-save"));

    let mut assembly = Assembly::start(order_session(dir.path()), Some(autosave.clone())).unwrap();
    assembly.collect().unwrap();
    assembly.advance_box().unwrap();
    let interrupted = assembly.into_session();

    let resumed = autosave.load().unwrap().expect("autosave missing");
    assert_eq!(resumed, interrupted);
    assert_eq!(resumed.cursor(), 1);
    assert_eq!(resumed.current_box(), 2);
}

/// 明示保存したファイルからも再開できる
#[test]
fn test_save_and_load_snapshot() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut assembly = Assembly::start(order_session(dir.path()), None).unwrap();
    assembly.skip().unwrap();

    let saved = assembly.save_to(&dir.path().join("shift1")).unwrap();
    assert_eq!(saved.extension().unwrap(), "assm-save");

    let loaded = persistence::load_session(&saved).unwrap();
    assert_eq!(&loaded, assembly.session());
}

/// 出力フォルダがなければ失敗し、セッションは変わらない
#[test]
fn test_export_failure_rolls_back() {
    let dir = tempdir().expect("Failed to create temp dir");
    let config = config_for(&dir.path().join("missing"));

    let mut assembly = Assembly::start(order_session(dir.path()), None).unwrap();
    assembly.collect().unwrap();
    let before = assembly.session().clone();

    let result = assembly.generate_report(CompletionMode::FinishEarly, &config);
    assert!(matches!(result, Err(AssemblerError::Export(_))));
    assert_eq!(assembly.session(), &before);
}
