//! 外部プロットスクリプトの呼び出し
//!
//! 最良候補のファイルパスと出力先を JSON にまとめ、base64 で1引数として渡す。

use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;

use crate::family::Family;
use crate::loader::TopN;

/// これより多いクラス数ではプロットを生成しない
pub const MAX_PLOT_CLASSES: usize = 9;

pub const DEFAULT_PLOT_PROGRAM: &str = "wolframscript";
pub const DEFAULT_PLOT_SCRIPT: &str = "scripts/make_plots.wls";

#[derive(thiserror::Error, Debug)]
pub enum PlotError {
    #[error("failed to create plot directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode plot request: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` exited with {status}")]
    Failed { program: String, status: ExitStatus },
}

/// プロットスクリプトへ渡す設定
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlotRequest {
    pub accuracy_type: String,
    pub classifier_name: String,
    pub metadata_file: PathBuf,
    pub classification_file: PathBuf,
    pub mds_file: PathBuf,
    pub output_file: PathBuf,
    pub svg_output_file: PathBuf,
    pub png_output_file: PathBuf,
}

impl PlotRequest {
    /// `<output_dir>/<family>-k=<k>-<distance>-<classifier>` を出力ファイル名の基底にする。
    pub fn for_family(family: &Family, top_n: TopN, output_dir: &Path) -> Option<Self> {
        let best = family.best_overall()?;
        let c = &best.candidate;
        let base = format!("{}-k={}-{}-{}", family.name(), c.k, c.distance, c.classifier);
        let with_suffix = |suffix: &str| output_dir.join(format!("{base}{suffix}"));
        Some(Self {
            accuracy_type: top_n.key(),
            classifier_name: c.classifier.clone(),
            metadata_file: best.metadata_file.clone(),
            classification_file: best.classification_file.clone(),
            mds_file: best.mds_file.clone(),
            output_file: with_suffix("-plots.nb"),
            svg_output_file: with_suffix("-plot2d.svg"),
            png_output_file: with_suffix("-plot2d.png"),
        })
    }

    pub fn encode(&self) -> Result<String, PlotError> {
        Ok(STANDARD.encode(serde_json::to_vec(self)?))
    }
}

/// プロット結果
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlotOutcome {
    Plotted,
    SkippedTooManyClasses(usize),
    /// 最良候補が無い
    NothingToPlot,
}

/// プロットプログラムの起動方法
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlotCommand {
    pub program: String,
    pub script: PathBuf,
}

impl Default for PlotCommand {
    fn default() -> Self {
        Self {
            program: DEFAULT_PLOT_PROGRAM.to_owned(),
            script: PathBuf::from(DEFAULT_PLOT_SCRIPT),
        }
    }
}

impl PlotCommand {
    pub fn run(&self, request: &PlotRequest) -> Result<(), PlotError> {
        let encoded = request.encode()?;
        log::debug!("running {} {} for {}", self.program, self.script.display(), request.classifier_name);
        let status = Command::new(&self.program).arg(&self.script).arg(encoded).status().map_err(|source| {
            PlotError::Spawn {
                program: self.program.clone(),
                source,
            }
        })?;
        if !status.success() {
            return Err(PlotError::Failed {
                program: self.program.clone(),
                status,
            });
        }
        Ok(())
    }

    /// `<plot_root>/<basename(job_dir)>/` にファミリーのプロットを生成する。
    pub fn plot_family(
        &self,
        family: &Family,
        top_n: TopN,
        job_dir: &Path,
        plot_root: &Path,
    ) -> Result<PlotOutcome, PlotError> {
        let num_classes = family.class_count();
        if num_classes > MAX_PLOT_CLASSES {
            return Ok(PlotOutcome::SkippedTooManyClasses(num_classes));
        }
        let output_dir = match job_dir.file_name() {
            Some(name) => plot_root.join(name),
            None => plot_root.to_path_buf(),
        };
        let Some(request) = PlotRequest::for_family(family, top_n, &output_dir) else {
            return Ok(PlotOutcome::NothingToPlot);
        };
        std::fs::create_dir_all(&output_dir).map_err(|source| PlotError::CreateDir {
            path: output_dir.clone(),
            source,
        })?;
        self.run(&request)?;
        Ok(PlotOutcome::Plotted)
    }
}
