use crate::error::{AssemblerError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 自動保存先を上書きする環境変数
pub const AUTOSAVE_ENV: &str = "OFFLINE_ASSEMBLER_AUTOSAVE";

const AUTOSAVE_FILE_NAME: &str = "autosave.assm-save";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input_directory: Option<String>,
    pub output_directory: Option<String>,
    pub autosave_path: Option<String>,
    /// 見出し行を探す先頭行数
    pub header_scan_rows: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default_config())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| AssemblerError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("offline-assembler"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    fn default_config() -> Self {
        Self {
            input_directory: None,
            output_directory: None,
            autosave_path: None,
            header_scan_rows: 20,
        }
    }

    /// 自動保存ファイルの場所（環境変数 > 設定 > 既定）
    pub fn autosave_path(&self) -> Result<PathBuf> {
        if let Ok(path) = std::env::var(AUTOSAVE_ENV) {
            if !path.trim().is_empty() {
                return Ok(PathBuf::from(path));
            }
        }

        if let Some(path) = &self.autosave_path {
            return Ok(PathBuf::from(path));
        }

        Ok(Self::config_dir()?.join(AUTOSAVE_FILE_NAME))
    }

    /// レポート出力先（セッション指定 > 設定 > 注文表と同じフォルダ）
    pub fn resolve_output_directory(&self, session_dir: Option<&str>, source_path: &str) -> PathBuf {
        if let Some(dir) = session_dir.filter(|d| !d.trim().is_empty()) {
            return PathBuf::from(dir);
        }
        if let Some(dir) = self.output_directory.as_deref().filter(|d| !d.trim().is_empty()) {
            return PathBuf::from(dir);
        }
        Path::new(source_path)
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn set_input_directory(&mut self, dir: String) -> Result<()> {
        self.input_directory = Some(dir);
        self.save()
    }

    pub fn set_output_directory(&mut self, dir: String) -> Result<()> {
        self.output_directory = Some(dir);
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_directory_precedence() {
        let mut config = Config::default();
        assert_eq!(
            config.resolve_output_directory(None, "/data/orders/list.xlsx"),
            PathBuf::from("/data/orders")
        );
        assert_eq!(
            config.resolve_output_directory(None, "list.xlsx"),
            PathBuf::from(".")
        );

        config.output_directory = Some("/reports".into());
        assert_eq!(
            config.resolve_output_directory(None, "/data/orders/list.xlsx"),
            PathBuf::from("/reports")
        );
        assert_eq!(
            config.resolve_output_directory(Some("/chosen"), "/data/orders/list.xlsx"),
            PathBuf::from("/chosen")
        );
    }

    #[test]
    fn test_partial_config_file_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"output_directory": "/out"}"#).unwrap();
        assert_eq!(config.header_scan_rows, 20);
        assert!(config.input_directory.is_none());
        assert_eq!(config.output_directory.as_deref(), Some("/out"));
    }
}
