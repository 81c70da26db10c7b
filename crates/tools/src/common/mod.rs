//! ツール共通のユーティリティ

pub mod io;
