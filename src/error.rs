use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssemblerError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("注文表の読み込みに失敗: {0}")]
    Import(String),

    #[error("セッション保存/読み込みエラー: {0}")]
    Persistence(String),

    #[error("レポート出力エラー: {0}")]
    Export(String),

    #[error("入力エラー: {0}")]
    Prompt(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] assembler_common::Error),
}

impl AssemblerError {
    /// 入力し直せば回復できるエラーか
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, AssemblerError::Common(assembler_common::Error::InvalidInput(_)))
    }
}

pub type Result<T> = std::result::Result<T, AssemblerError>;
