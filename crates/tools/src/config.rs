//! summarize の設定ファイル（TOML）
//!
//! ```toml
//! known_classifiers = ["linear-svm", "lda"]
//!
//! [plot]
//! program = "wolframscript"
//! script = "scripts/make_plots.wls"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use modmap_summary::PlotCommand;
use modmap_summary::classifiers::KNOWN_CLASSIFIERS;
use modmap_summary::plot::{DEFAULT_PLOT_PROGRAM, DEFAULT_PLOT_SCRIPT};

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct SummarizeConfig {
    /// 「実行されなかった分類器」の判定に使う分類器名
    pub known_classifiers: Vec<String>,
    pub plot: PlotConfig,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PlotConfig {
    pub program: String,
    pub script: PathBuf,
}

impl Default for SummarizeConfig {
    fn default() -> Self {
        Self {
            known_classifiers: KNOWN_CLASSIFIERS.iter().map(|s| (*s).to_owned()).collect(),
            plot: PlotConfig::default(),
        }
    }
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_PLOT_PROGRAM.to_owned(),
            script: PathBuf::from(DEFAULT_PLOT_SCRIPT),
        }
    }
}

impl PlotConfig {
    pub fn command(&self) -> PlotCommand {
        PlotCommand {
            program: self.program.clone(),
            script: self.script.clone(),
        }
    }
}

impl SummarizeConfig {
    /// 設定ファイルを読む。`None` なら既定値。
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text =
            std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}
