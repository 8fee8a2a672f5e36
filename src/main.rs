use clap::Parser;
use offline_assembler::assembly::{interactive, Assembly};
use offline_assembler::persistence::{self, Autosave};
use offline_assembler::{cli, config, error, importer, logging, scanner};
use assembler_common::report::CompletionMode;
use assembler_common::Session;
use cli::{Cli, Commands};
use config::Config;
use error::{AssemblerError, Result};
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Assemble { input, output_dir, header_row } => {
            println!("📦 offline-assembler - 組立\n");

            let autosave = Autosave::new(config.autosave_path()?);
            if autosave.exists() {
                if interactive::confirm("前回の作業が自動保存されています。再開しますか？")? {
                    return resume(&config, autosave, output_dir.as_deref());
                }
                autosave.clear()?;
            }

            let session = open_session(&input, header_row, &config)?;
            run(&config, session, autosave, output_dir.as_deref())?;
        }

        Commands::Resume => {
            let autosave = Autosave::new(config.autosave_path()?);
            resume(&config, autosave, None)?;
        }

        Commands::Inspect { input, header_row } => {
            let session = open_session(&input, header_row, &config)?;
            let progress = session.progress();
            println!("📦 {}", session.shipment_label());
            println!("  元ファイル: {}", session.source_path());
            println!(
                "  進捗: {}/{}（処理済み {}件）  箱 №{}\n",
                progress.position, progress.total, progress.resolved, progress.current_box
            );
            interactive::print_review(&session);
            if !session.is_complete() {
                interactive::print_current(&session);
            }
        }

        Commands::Report { snapshot, output_dir, intermediate } => {
            println!("📄 offline-assembler - レポート出力\n");

            let mut session = persistence::load_session(&snapshot)?;
            if let Some(dir) = output_dir {
                session.set_output_directory(dir.to_string_lossy().to_string());
            }
            let mode = if intermediate {
                CompletionMode::Intermediate
            } else if session.is_complete() {
                CompletionMode::Natural
            } else {
                CompletionMode::FinishEarly
            };

            let mut assembly = Assembly::start(session, None)?;
            let outcome = assembly.generate_report(mode, &config)?;
            interactive::print_outcome(&outcome);
            println!("\n✅ 出力完了");
        }

        Commands::List { folder } => {
            let folder = folder
                .or_else(|| config.input_directory.as_ref().map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from("."));
            let files = scanner::scan_folder(&folder)?;

            if files.is_empty() {
                println!("対象ファイルがありません: {}", folder.display());
            } else {
                println!("{} ({}件)", folder.display(), files.len());
                for file in &files {
                    println!("  [{}] {}", file.kind.label(), file.file_name);
                }
            }
        }

        Commands::Config { set_input_dir, set_output_dir, show } => {
            let mut config = config;

            if let Some(dir) = set_input_dir {
                config.set_input_directory(dir)?;
                println!("✔ 入力フォルダを設定しました");
            }

            if let Some(dir) = set_output_dir {
                config.set_output_directory(dir)?;
                println!("✔ 出力フォルダを設定しました");
            }

            if show {
                println!("設定:");
                println!("  入力フォルダ: {}", config.input_directory.as_deref().unwrap_or("未設定"));
                println!("  出力フォルダ: {}", config.output_directory.as_deref().unwrap_or("未設定"));
                println!("  自動保存: {}", config.autosave_path()?.display());
                println!("  見出し検出行数: {}", config.header_scan_rows);
            }
        }

        Commands::Autosave { info, clear } => {
            let autosave = Autosave::new(config.autosave_path()?);

            if info || !clear {
                if autosave.exists() {
                    println!("自動保存:");
                    println!("  パス: {}", autosave.path().display());
                    match autosave.load() {
                        Ok(Some(session)) => {
                            let progress = session.progress();
                            println!("  出荷: {}", session.shipment_label());
                            println!("  進捗: {}/{}", progress.resolved, progress.total);
                        }
                        Ok(None) => {}
                        Err(e) => println!("  読み込みエラー: {}", e),
                    }
                } else {
                    println!("自動保存ファイルが存在しません: {}", autosave.path().display());
                }
            }

            if clear {
                match autosave.clear() {
                    Ok(true) => println!("✔ 自動保存を削除しました: {}", autosave.path().display()),
                    Ok(false) => println!("自動保存ファイルが存在しません"),
                    Err(e) => println!("自動保存削除エラー: {}", e),
                }
            }
        }
    }

    Ok(())
}

/// 注文表または保存済みセッションを開く
fn open_session(input: &Path, header_row: Option<usize>, config: &Config) -> Result<Session> {
    if persistence::is_snapshot(input) {
        return persistence::load_session(input);
    }

    let header = match header_row {
        Some(row) => importer::HeaderRow::Fixed(row),
        None => importer::HeaderRow::Detect { scan_rows: config.header_scan_rows },
    };
    let order = importer::import_order(input, header)?;
    println!("✔ {}件の注文行を読み込みました", order.lines.len());
    Ok(order.into_session(input))
}

fn resume(config: &Config, autosave: Autosave, output_dir: Option<&Path>) -> Result<()> {
    let session = autosave.load()?.ok_or_else(|| {
        AssemblerError::Persistence(format!(
            "自動保存ファイルが存在しません: {}",
            autosave.path().display()
        ))
    })?;
    println!("✔ 自動保存から再開します\n");
    run(config, session, autosave, output_dir)
}

fn run(config: &Config, session: Session, autosave: Autosave, output_dir: Option<&Path>) -> Result<()> {
    let mut assembly = Assembly::start(session, Some(autosave))?;
    if let Some(dir) = output_dir {
        assembly.set_output_directory(dir)?;
    }
    interactive::run_interactive(&mut assembly, config)
}
