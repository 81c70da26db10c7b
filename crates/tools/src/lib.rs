//! 分類実験の集計ツール群
//!
//! `summarize` バイナリが使う設定ファイル読み込み、レポート出力先、
//! テキストレポートとプロットの組み立てを提供する。

pub mod common;
pub mod config;
pub mod summary;
