//! 組立作業の進行
//!
//! セッションを所有し、状態を変える操作のたびに自動保存する。
//! レポート出力時の強制スキップと、その取り消しもここで扱う。

pub mod interactive;

use crate::config::Config;
use crate::error::{AssemblerError, Result};
use crate::export;
use crate::persistence::{self, Autosave};
use assembler_common::report::{self, CompletionMode, Report};
use assembler_common::Session;
use std::path::{Path, PathBuf};

/// レポート出力結果
#[derive(Debug, Clone)]
pub struct ReportOutcome {
    pub path: PathBuf,
    pub report: Report,
    /// セッションを終了したか（中間レポートなら false）
    pub finished: bool,
}

#[derive(Debug)]
pub struct Assembly {
    session: Session,
    autosave: Option<Autosave>,
}

impl Assembly {
    /// 作業を開始（開始時点の状態も自動保存する）
    pub fn start(session: Session, autosave: Option<Autosave>) -> Result<Self> {
        let assembly = Self { session, autosave };
        assembly.record()?;
        Ok(assembly)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn into_session(self) -> Session {
        self.session
    }

    pub fn autosave(&self) -> Option<&Autosave> {
        self.autosave.as_ref()
    }

    pub fn collect(&mut self) -> Result<()> {
        self.session.collect()?;
        tracing::debug!(cursor = self.session.cursor(), "collected");
        self.record()
    }

    pub fn skip(&mut self) -> Result<()> {
        self.session.skip()?;
        tracing::debug!(cursor = self.session.cursor(), "skipped");
        self.record()
    }

    pub fn adjust_current(&mut self, quantity: i64, box_number: i64) -> Result<()> {
        self.session.adjust_current(quantity, box_number)?;
        tracing::debug!(quantity, box_number, "current item adjusted");
        self.record()
    }

    /// 確認一覧からの編集
    pub fn adjust_item(&mut self, index: usize, quantity: i64, box_number: i64) -> Result<()> {
        self.session.adjust_quantity(index, quantity, box_number)?;
        tracing::debug!(index, quantity, box_number, "item adjusted");
        self.record()
    }

    pub fn advance_box(&mut self) -> Result<()> {
        self.session.advance_box()?;
        tracing::debug!(current_box = self.session.current_box(), "next box");
        self.record()
    }

    pub fn set_output_directory(&mut self, dir: &Path) -> Result<()> {
        self.session
            .set_output_directory(dir.to_string_lossy().to_string());
        self.record()
    }

    /// 指定パスへ手動保存
    pub fn save_to(&self, path: &Path) -> Result<PathBuf> {
        persistence::save_session(&self.session, path)
    }

    /// レポートを出力する。
    ///
    /// 失敗時（差異なし・書き込み失敗）はセッションを変更しない。
    /// 終了モードで成功した場合は自動保存を削除する。
    pub fn generate_report(&mut self, mode: CompletionMode, config: &Config) -> Result<ReportOutcome> {
        if mode == CompletionMode::Natural && !self.session.is_complete() {
            return Err(AssemblerError::Export(
                "未処理の項目があります。早期終了か中間レポートを選んでください".into(),
            ));
        }

        let output_dir = config.resolve_output_directory(
            self.session.output_directory(),
            self.session.source_path(),
        );

        let (report, forced) = report::prepare(&mut self.session, mode)?;

        let written = export::write_report(
            &report,
            self.session.shipment_label(),
            self.session.source_path(),
            &output_dir,
        );
        let path = match written {
            Ok(path) => path,
            Err(e) => {
                self.session.restore_pending(&forced);
                return Err(e);
            }
        };

        if mode.finishes() {
            self.discard_autosave();
        } else {
            self.session.restore_pending(&forced);
            self.record()?;
        }

        Ok(ReportOutcome {
            path,
            report,
            finished: mode.finishes(),
        })
    }

    /// 自動保存を削除（失敗はログのみ）
    pub fn discard_autosave(&self) {
        if let Some(autosave) = &self.autosave {
            if let Err(e) = autosave.clear() {
                tracing::warn!(path = %autosave.path().display(), error = %e, "autosave not removed");
            }
        }
    }

    fn record(&self) -> Result<()> {
        match &self.autosave {
            Some(autosave) => autosave.record(&self.session),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assembler_common::{ItemStatus, OrderLine};
    use tempfile::tempdir;

    fn session(source: &Path) -> Session {
        Session::new(
            vec![
                OrderLine::new("Bolt", 5, "B-1", "A1", "460001"),
                OrderLine::new("Nut", 3, "N-2", "A2", ""),
            ],
            "label",
            source.to_string_lossy().to_string(),
        )
    }

    #[test]
    fn test_every_transition_autosaves() {
        let dir = tempdir().expect("Failed to create temp dir");
        let autosave = Autosave::new(dir.path().join("auto.assm-save"));
        let mut assembly = Assembly::start(session(&dir.path().join("o.xlsx")), Some(autosave.clone())).unwrap();
        assert!(autosave.exists());

        assembly.collect().unwrap();
        assert_eq!(autosave.load().unwrap().as_ref(), Some(assembly.session()));

        assembly.advance_box().unwrap();
        assert_eq!(autosave.load().unwrap().unwrap().current_box(), 2);

        assembly.adjust_item(1, 1, 4).unwrap();
        assert_eq!(autosave.load().unwrap().as_ref(), Some(assembly.session()));
    }

    #[test]
    fn test_collect_survives_unwritable_autosave() {
        let dir = tempdir().expect("Failed to create temp dir");
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();
        let autosave = Autosave::new(blocker.join("auto.assm-save"));

        let mut assembly = Assembly::start(session(&dir.path().join("o.xlsx")), Some(autosave.clone())).unwrap();
        assembly.collect().unwrap();

        assert_eq!(assembly.session().item(0).unwrap().status, ItemStatus::Collected);
        assert_eq!(assembly.session().cursor(), 1);
        assert!(!autosave.exists());
    }

    #[test]
    fn test_invalid_adjust_does_not_autosave_changes() {
        let dir = tempdir().expect("Failed to create temp dir");
        let autosave = Autosave::new(dir.path().join("auto.assm-save"));
        let mut assembly = Assembly::start(session(&dir.path().join("o.xlsx")), Some(autosave.clone())).unwrap();

        let err = assembly.adjust_current(-1, 1).unwrap_err();
        assert!(err.is_invalid_input());
        assert_eq!(autosave.load().unwrap().unwrap().cursor(), 0);
    }

    #[test]
    fn test_intermediate_report_keeps_walk_open() {
        let dir = tempdir().expect("Failed to create temp dir");
        let autosave = Autosave::new(dir.path().join("auto.assm-save"));
        let mut assembly = Assembly::start(session(&dir.path().join("o.xlsx")), Some(autosave.clone())).unwrap();
        assembly.collect().unwrap();

        let outcome = assembly
            .generate_report(CompletionMode::Intermediate, &Config::default())
            .unwrap();

        assert!(!outcome.finished);
        assert!(outcome.path.exists());
        assert_eq!(outcome.report.discrepancies.len(), 1);
        assert_eq!(assembly.session().item(1).unwrap().status, ItemStatus::Pending);
        assert!(!assembly.session().is_complete());
        assert!(autosave.exists());
    }

    #[test]
    fn test_finish_early_clears_autosave() {
        let dir = tempdir().expect("Failed to create temp dir");
        let autosave = Autosave::new(dir.path().join("auto.assm-save"));
        let mut assembly = Assembly::start(session(&dir.path().join("o.xlsx")), Some(autosave.clone())).unwrap();

        let outcome = assembly
            .generate_report(CompletionMode::FinishEarly, &Config::default())
            .unwrap();

        assert!(outcome.finished);
        assert_eq!(outcome.report.discrepancies.len(), 2);
        assert!(!autosave.exists());
    }

    #[test]
    fn test_failed_export_restores_session() {
        let dir = tempdir().expect("Failed to create temp dir");
        let mut assembly = Assembly::start(session(&dir.path().join("o.xlsx")), None).unwrap();
        assembly
            .set_output_directory(&dir.path().join("missing"))
            .unwrap();
        let before = assembly.session().clone();

        let err = assembly
            .generate_report(CompletionMode::FinishEarly, &Config::default())
            .unwrap_err();

        assert!(matches!(err, AssemblerError::Export(_)));
        assert_eq!(assembly.session(), &before);
    }

    #[test]
    fn test_natural_mode_requires_complete_walk() {
        let dir = tempdir().expect("Failed to create temp dir");
        let mut assembly = Assembly::start(session(&dir.path().join("o.xlsx")), None).unwrap();

        assert!(assembly
            .generate_report(CompletionMode::Natural, &Config::default())
            .is_err());
    }
}
