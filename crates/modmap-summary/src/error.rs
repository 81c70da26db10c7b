//! 集計処理のエラー型

use std::path::PathBuf;

use crate::loader::TopN;
use crate::run::ParseRunIdError;

/// 集計中に発生するエラー
///
/// `MissingField` 以外はすべて致命的で、呼び出し全体を中断する。
#[derive(thiserror::Error, Debug)]
pub enum SummaryError {
    /// ディレクトリ名に `-k=<int>` が含まれない
    #[error("malformed run directory name {}: {source}", .path.display())]
    MalformedRunName {
        path: PathBuf,
        #[source]
        source: ParseRunIdError,
    },

    /// 同じ (family, k) に解決されるディレクトリが複数ある
    #[error("duplicate run for family `{family}` at k={k}: {} and {}", .first.display(), .second.display())]
    DuplicateRun {
        family: String,
        k: u32,
        first: PathBuf,
        second: PathBuf,
    },

    /// metadata.json や確定済み distance のファイルが存在しない
    #[error("missing file: {}", .path.display())]
    MissingFile { path: PathBuf },

    /// 分類器レコードに top-N が存在しない（集計ではスキップ扱い）
    #[error(transparent)]
    MissingField(#[from] MissingField),

    /// JSON パースエラー
    #[error("failed to parse {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// ファイル I/O エラー
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// ディレクトリ走査エラー
    #[error(transparent)]
    Walk(#[from] walkdir::Error),
}

/// 分類器が指定深さの順位付き予測を出していない
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("classifier `{classifier}` has no {top_n} accuracy")]
pub struct MissingField {
    pub classifier: String,
    pub top_n: TopN,
}

/// 集計処理の Result 型
pub type SummaryResult<T> = Result<T, SummaryError>;
