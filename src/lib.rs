//! offline-assembler: 注文表を読み込み、箱詰めしながら集品し、結果をExcelに出力する

pub mod assembly;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod importer;
pub mod logging;
pub mod persistence;
pub mod scanner;
