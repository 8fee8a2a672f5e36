use crate::error::{AssemblerError, Result};
use crate::importer::is_order_sheet;
use crate::persistence::is_snapshot;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// 注文表
    OrderSheet,
    /// 保存済みセッション
    SavedSession,
}

impl SourceKind {
    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::OrderSheet => "注文表",
            SourceKind::SavedSession => "保存",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub file_name: String,
    pub kind: SourceKind,
}

/// フォルダ直下の注文表と保存セッションを列挙
pub fn scan_folder(folder: &Path) -> Result<Vec<SourceFile>> {
    if !folder.is_dir() {
        return Err(AssemblerError::FileNotFound(folder.display().to_string()));
    }

    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .max_depth(1)  // 直下のみ（再帰しない）
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        // Excelの一時ファイル（~$xxx.xlsx）は除外
        if file_name.starts_with("~$") {
            continue;
        }

        let kind = if is_snapshot(path) {
            SourceKind::SavedSession
        } else if is_order_sheet(path) {
            SourceKind::OrderSheet
        } else {
            continue;
        };

        files.push(SourceFile {
            path: path.to_path_buf(),
            file_name,
            kind,
        });
    }

    // ファイル名でソート
    files.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};

    #[test]
    fn test_scan_folder_not_found() {
        let result = scan_folder(Path::new("/nonexistent/folder"));
        assert!(matches!(result, Err(AssemblerError::FileNotFound(_))));
    }

    #[test]
    fn test_scan_folder_kinds_and_order() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");

        File::create(dir.path().join("c.xlsx")).unwrap();
        File::create(dir.path().join("a.assm-save")).unwrap();
        File::create(dir.path().join("b.ods")).unwrap();
        File::create(dir.path().join("~$c.xlsx")).unwrap();
        File::create(dir.path().join("notes.txt")).unwrap();
        fs::create_dir(dir.path().join("sub.xlsx")).unwrap();

        let result = scan_folder(dir.path()).unwrap();
        let names: Vec<&str> = result.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.assm-save", "b.ods", "c.xlsx"]);
        assert_eq!(result[0].kind, SourceKind::SavedSession);
        assert_eq!(result[2].kind, SourceKind::OrderSheet);
    }
}
