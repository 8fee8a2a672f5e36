use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "offline-assembler")]
#[command(about = "倉庫ピッキング・箱詰め作業ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 注文表（または保存済みセッション）から組立を開始
    Assemble {
        /// 注文表 (.xlsx/.xls/.xlsm/.ods) または .assm-save ファイル
        #[arg(required = true)]
        input: PathBuf,

        /// レポート出力先ディレクトリ
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// ヘッダー行（1始まり、省略時は自動検出）
        #[arg(long)]
        header_row: Option<usize>,
    },

    /// 自動保存から組立を再開
    Resume,

    /// 注文表を読み込んで内容を表示（セッションは作らない）
    Inspect {
        /// 注文表ファイル
        #[arg(required = true)]
        input: PathBuf,

        /// ヘッダー行（1始まり、省略時は自動検出）
        #[arg(long)]
        header_row: Option<usize>,
    },

    /// 保存済みセッションからレポートを出力
    Report {
        /// .assm-save ファイル
        #[arg(required = true)]
        snapshot: PathBuf,

        /// レポート出力先ディレクトリ
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// 中間レポート（未処理の項目は保存ファイル上で未処理のまま）
        #[arg(long)]
        intermediate: bool,
    },

    /// フォルダ内の注文表・保存ファイルを一覧表示
    List {
        /// 対象フォルダ（省略時は設定の入力フォルダ、なければカレント）
        folder: Option<PathBuf>,
    },

    /// 設定を管理
    Config {
        /// 入力フォルダを設定
        #[arg(long)]
        set_input_dir: Option<String>,

        /// 出力フォルダを設定
        #[arg(long)]
        set_output_dir: Option<String>,

        /// 現在の設定を表示
        #[arg(long)]
        show: bool,
    },

    /// 自動保存を管理
    Autosave {
        /// 自動保存の情報を表示
        #[arg(long)]
        info: bool,

        /// 自動保存を削除
        #[arg(long)]
        clear: bool,
    },
}
