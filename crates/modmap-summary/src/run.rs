//! ランディレクトリの列挙と `-k=<int>` の解析

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use walkdir::WalkDir;

use crate::error::{SummaryError, SummaryResult};

static K_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-k=([0-9]+)").expect("invalid K_TOKEN_RE pattern"));

/// 1回の実行を識別する (family, k) の組
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RunId {
    /// `-k=<int>` をすべて取り除いたディレクトリ名
    pub family_name: String,
    pub k: u32,
}

/// ランディレクトリ名の解析エラー
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseRunIdError {
    #[error("no `-k=<int>` token")]
    MissingKToken,

    #[error("invalid k value `{0}` (must be a positive integer)")]
    InvalidK(String),
}

impl FromStr for RunId {
    type Err = ParseRunIdError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let caps = K_TOKEN_RE.captures(name).ok_or(ParseRunIdError::MissingKToken)?;
        let raw = caps.get(1).map_or("", |m| m.as_str());
        let k = raw
            .parse::<u32>()
            .ok()
            .filter(|&k| k > 0)
            .ok_or_else(|| ParseRunIdError::InvalidK(raw.to_owned()))?;
        let family_name = K_TOKEN_RE.replace_all(name, "").into_owned();
        Ok(Self { family_name, k })
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (k={})", self.family_name, self.k)
    }
}

/// 走査で見つかったランディレクトリ
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunDir {
    pub id: RunId,
    pub path: PathBuf,
}

/// `root` 直下のサブディレクトリを `RunDir` として列挙する。
///
/// ファイルは無視する。ディレクトリへのシンボリックリンクは辿り、リンク切れは無視する。
/// 列挙順はファイル名順だが、集計結果は順序に依存しない。
pub fn locate_runs(root: &Path) -> impl Iterator<Item = SummaryResult<RunDir>> + use<> {
    WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            // `Path::is_dir` はリンク先を見る
            Ok(entry) if entry.path().is_dir() => Some(run_dir_from_path(entry.into_path())),
            Ok(_) => None,
            Err(e) => Some(Err(SummaryError::from(e))),
        })
}

fn run_dir_from_path(path: PathBuf) -> SummaryResult<RunDir> {
    let name = path.file_name().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    match name.parse::<RunId>() {
        Ok(id) => Ok(RunDir { id, path }),
        Err(source) => Err(SummaryError::MalformedRunName { path, source }),
    }
}
