//! ログ初期化
//!
//! 進捗表示は標準出力（println!）、診断ログは tracing で標準エラーへ。

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// フィルタを指定する環境変数
pub const LOG_ENV: &str = "ASSEMBLER_LOG";

pub fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            "offline_assembler=debug,info"
        } else {
            "offline_assembler=info,warn"
        })
    });

    // 二重初期化（テスト等）は無視
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .try_init();
}
