//! 対話式の組立作業
//!
//! 現在の項目を表示し、1文字コマンドで集品・スキップ・数量変更などを行う。

use super::{Assembly, ReportOutcome};
use crate::config::Config;
use crate::error::{AssemblerError, Result};
use assembler_common::report::CompletionMode;
use assembler_common::session::parse_number;
use assembler_common::{Session, WorkItem};
use dialoguer::{Confirm, Input};
use std::path::PathBuf;

/// 対話アクション
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyAction {
    /// 全数集めて現在の箱へ
    Collect,
    /// この項目をスキップ
    Skip,
    /// 数量・箱を変更
    Edit,
    /// 次の箱へ
    NextBox,
    /// 確認一覧を表示
    Review,
    /// 一覧の項目を編集（0始まり）
    ReviewEdit(usize),
    /// セッションをファイルに保存
    Save,
    /// 中間レポート
    Intermediate,
    /// 早期終了
    FinishEarly,
    /// 自動保存を残して終了
    Quit,
    Help,
}

const HELP: &str =
    "操作: [Enter/c]集品 [s]スキップ [e]数量変更 [b]次の箱 [l]一覧 [r 番号]一覧から編集 [w]保存 [i]中間レポート [f]早期終了 [q]中断";

/// 入力文字列をアクションへ変換（一覧番号は1始まりで入力）
pub fn parse_action(input: &str) -> Option<AssemblyAction> {
    let trimmed = input.trim();
    let mut parts = trimmed.split_whitespace();
    let command = parts.next().unwrap_or("");

    match command {
        "" | "c" => Some(AssemblyAction::Collect),
        "s" => Some(AssemblyAction::Skip),
        "e" => Some(AssemblyAction::Edit),
        "b" => Some(AssemblyAction::NextBox),
        "l" => Some(AssemblyAction::Review),
        "r" => parts
            .next()
            .and_then(|n| n.parse::<usize>().ok())
            .filter(|n| *n >= 1)
            .map(|n| AssemblyAction::ReviewEdit(n - 1)),
        "w" => Some(AssemblyAction::Save),
        "i" => Some(AssemblyAction::Intermediate),
        "f" => Some(AssemblyAction::FinishEarly),
        "q" | "Q" => Some(AssemblyAction::Quit),
        "h" | "?" => Some(AssemblyAction::Help),
        _ => None,
    }
}

/// 現在の項目を表示
pub fn print_current(session: &Session) {
    let progress = session.progress();
    match session.current() {
        Some(item) => {
            println!(
                "[{}/{}] 箱 №{}",
                progress.position, progress.total, progress.current_box
            );
            println!(
                "  棚: {}",
                if item.line.location.is_empty() { "---" } else { item.line.location.as_str() }
            );
            println!("  商品: {}", item.line.name);
            println!(
                "  バーコード: {}",
                if item.barcode_tail().is_empty() { "----" } else { item.barcode_tail() }
            );
            println!("  数量: {}\n", item.line.quantity);
        }
        None => println!("✓ 全{}件を処理しました", progress.total),
    }
}

/// 確認一覧を表示
pub fn print_review(session: &Session) {
    println!("{:>4}  {:<10} {:<10} {:>6} {:>6} {:>5}", "No", "状態", "棚", "予定", "実績", "箱");
    for row in session.review_rows() {
        println!(
            "{}{:>3}  {:<10} {:<10} {:>6} {:>6} {:>5}",
            if row.is_current { '>' } else { ' ' },
            row.index + 1,
            row.status.label(),
            if row.location.is_empty() { "-" } else { row.location.as_str() },
            row.planned,
            row.collected,
            row.box_label
        );
    }
    println!();
}

/// レポート出力結果を表示
pub fn print_outcome(outcome: &ReportOutcome) {
    println!("✔ レポート出力: {}", outcome.path.display());
    println!("  箱詰め記録: {}件", outcome.report.packed.len());
    if !outcome.report.discrepancies.is_empty() {
        println!("  差異:");
        for note in &outcome.report.discrepancies {
            println!("    - {}", note);
        }
    }
}

/// 対話式で組立作業を進める
pub fn run_interactive(assembly: &mut Assembly, config: &Config) -> Result<()> {
    println!("📦 {}", assembly.session().shipment_label());
    println!("---");
    println!("{}", HELP);
    println!("---\n");

    let mut report_failed = false;

    loop {
        if assembly.session().is_complete() && !report_failed {
            match assembly.generate_report(CompletionMode::Natural, config) {
                Ok(outcome) => {
                    println!("\n✅ 組立完了");
                    print_outcome(&outcome);
                    return Ok(());
                }
                Err(e) => {
                    println!("⚠ {}", e);
                    report_failed = true;
                }
            }
        }

        print_current(assembly.session());

        let input = prompt_text("操作", "")?;
        let action = match parse_action(&input) {
            Some(action) => action,
            None => {
                println!("⚠ 不明な操作です: {}\n{}\n", input.trim(), HELP);
                continue;
            }
        };

        match handle_action(assembly, config, action) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Finished(outcome)) => {
                println!("\n✅ 組立終了");
                print_outcome(&outcome);
                return Ok(());
            }
            Ok(Flow::Quit) => {
                if let Some(autosave) = assembly.autosave() {
                    println!("中断しました。自動保存: {}", autosave.path().display());
                }
                return Ok(());
            }
            Err(e @ AssemblerError::Prompt(_)) => return Err(e),
            Err(e) => println!("⚠ {}\n", e),
        }
    }
}

enum Flow {
    Continue,
    Finished(ReportOutcome),
    Quit,
}

fn handle_action(assembly: &mut Assembly, config: &Config, action: AssemblyAction) -> Result<Flow> {
    match action {
        AssemblyAction::Collect => assembly.collect()?,
        AssemblyAction::Skip => {
            assembly.skip()?;
            println!("  → スキップ\n");
        }
        AssemblyAction::Edit => {
            let (default_qty, default_box) = match assembly.session().current() {
                Some(item) => (item.line.quantity, assembly.session().current_box()),
                None => return Err(assembler_common::Error::NoCurrentItem.into()),
            };
            edit_until_valid(
                || prompt_adjustment(default_qty, default_box),
                |qty, box_number| assembly.adjust_current(qty, box_number),
            )?;
        }
        AssemblyAction::NextBox => {
            assembly.advance_box()?;
            println!("  → 箱 №{} を開始\n", assembly.session().current_box());
        }
        AssemblyAction::Review => print_review(assembly.session()),
        AssemblyAction::ReviewEdit(index) => {
            let item = assembly.session().item(index).ok_or(
                assembler_common::Error::ItemOutOfRange {
                    index,
                    len: assembly.session().len(),
                },
            )?;
            let (default_qty, default_box) = review_defaults(item, assembly.session().current_box());
            println!("  編集: {}", item.line.name);
            edit_until_valid(
                || prompt_adjustment(default_qty, default_box),
                |qty, box_number| assembly.adjust_item(index, qty, box_number),
            )?;
        }
        AssemblyAction::Save => {
            let default = default_save_path(assembly.session(), config);
            let input = prompt_text("保存先", &default.to_string_lossy())?;
            let path = assembly.save_to(&PathBuf::from(input.trim()))?;
            println!("✔ 保存しました: {}\n", path.display());
        }
        AssemblyAction::Intermediate => {
            if confirm("未処理の項目を未集品として中間レポートを出力しますか？")? {
                let outcome = assembly.generate_report(CompletionMode::Intermediate, config)?;
                print_outcome(&outcome);
                println!();
            }
        }
        AssemblyAction::FinishEarly => {
            if confirm("未処理の項目を未集品として組立を終了しますか？")? {
                let outcome = assembly.generate_report(CompletionMode::FinishEarly, config)?;
                return Ok(Flow::Finished(outcome));
            }
        }
        AssemblyAction::Quit => return Ok(Flow::Quit),
        AssemblyAction::Help => println!("{}\n", HELP),
    }
    Ok(Flow::Continue)
}

/// 範囲外の値なら入力し直させる（その間、状態は変わらない）。
///
/// 適用できたら true、空入力でキャンセルしたら false。
fn edit_until_valid<P, A>(mut prompt: P, mut apply: A) -> Result<bool>
where
    P: FnMut() -> Result<Option<(i64, i64)>>,
    A: FnMut(i64, i64) -> Result<()>,
{
    loop {
        let Some((qty, box_number)) = prompt()? else {
            return Ok(false);
        };
        match apply(qty, box_number) {
            Ok(()) => return Ok(true),
            Err(e) if e.is_invalid_input() => println!("⚠ {}", e),
            Err(e) => return Err(e),
        }
    }
}

fn review_defaults(item: &WorkItem, current_box: u32) -> (u32, u32) {
    let qty = if item.status.is_pending() {
        item.line.quantity
    } else {
        item.collected_quantity
    };
    let box_number = if item.box_number == 0 { current_box } else { item.box_number };
    (qty, box_number)
}

fn default_save_path(session: &Session, config: &Config) -> PathBuf {
    let dir = config.resolve_output_directory(session.output_directory(), session.source_path());
    let stem = std::path::Path::new(session.source_path())
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("session");
    crate::persistence::snapshot_path(&dir.join(stem))
}

/// 数量と箱番号を入力。空入力でキャンセル（None）。
fn prompt_adjustment(default_qty: u32, default_box: u32) -> Result<Option<(i64, i64)>> {
    let qty = match prompt_number("新しい数量", default_qty)? {
        Some(v) => v,
        None => return Ok(None),
    };
    let box_number = match prompt_number("箱番号", default_box)? {
        Some(v) => v,
        None => return Ok(None),
    };
    Ok(Some((qty, box_number)))
}

fn prompt_number(prompt: &str, default: u32) -> Result<Option<i64>> {
    loop {
        let input = prompt_text(&format!("{} (空でキャンセル)", prompt), &default.to_string())?;
        if input.trim().is_empty() {
            return Ok(None);
        }
        match parse_number(&input) {
            Ok(v) => return Ok(Some(v)),
            Err(e) => println!("⚠ {}", e),
        }
    }
}

fn prompt_text(prompt: &str, initial: &str) -> Result<String> {
    Input::<String>::new()
        .with_prompt(prompt)
        .with_initial_text(initial)
        .allow_empty(true)
        .interact_text()
        .map_err(|e| AssemblerError::Prompt(e.to_string()))
}

pub fn confirm(prompt: &str) -> Result<bool> {
    Confirm::new()
        .with_prompt(prompt)
        .default(true)
        .interact()
        .map_err(|e| AssemblerError::Prompt(e.to_string()))
}
