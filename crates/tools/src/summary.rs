//! テキストレポートとプロット生成の組み立て

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;

use modmap_summary::plot::MAX_PLOT_CLASSES;
use modmap_summary::report::{ReportOptions, reportable, text};
use modmap_summary::{Families, Family, PlotCommand, PlotOutcome, TopN};

/// プロットの出力先
#[derive(Clone, Debug)]
pub struct PlotTarget {
    pub command: PlotCommand,
    /// ユーザーが指定したままのジョブディレクトリ（basename を出力先に使う）
    pub job_dir: PathBuf,
    pub plot_root: PathBuf,
}

/// `job_dir` の basename を決める。`.` などで名前が無い場合だけ実パスから取る。
pub fn plot_job_dir(job_dir: &Path) -> std::io::Result<PathBuf> {
    if job_dir.file_name().is_some() {
        return Ok(job_dir.to_path_buf());
    }
    job_dir.canonicalize()
}

/// 各ファミリーの表、プロット、区切り線、最後にリーダーボードを書く。
pub fn write_text<W: Write>(
    out: &mut W,
    families: &Families,
    opts: &ReportOptions<'_>,
    plot: Option<&PlotTarget>,
) -> Result<()> {
    for family in reportable(families, opts.top_n) {
        text::render_family(out, family, opts)?;
        if let Some(target) = plot {
            plot_family(target, family, opts.top_n, Some(&mut *out as &mut dyn Write))?;
        }
        text::render_separator(out)?;
    }
    text::render_leaderboard(out, families, opts)?;
    Ok(())
}

/// プロット生成。失敗してもログに残すだけで集計結果の出力は続ける。
///
/// クラス数超過の警告は `out` があればそこへ、無ければログへ出す。
pub fn plot_family(target: &PlotTarget, family: &Family, top_n: TopN, out: Option<&mut dyn Write>) -> Result<()> {
    match target.command.plot_family(family, top_n, &target.job_dir, &target.plot_root) {
        Ok(PlotOutcome::Plotted) => {
            log::info!("{}: plots written under {}", family.name(), target.plot_root.display())
        }
        Ok(PlotOutcome::SkippedTooManyClasses(n)) => {
            let msg = format!(
                "Warning: skipping plot generation because there are too many classes ({n} > {MAX_PLOT_CLASSES})"
            );
            match out {
                Some(out) => writeln!(out, "{msg}")?,
                None => log::warn!("{}: {msg}", family.name()),
            }
        }
        Ok(PlotOutcome::NothingToPlot) => {}
        Err(e) => log::warn!("{}: plot generation failed: {e}", family.name()),
    }
    Ok(())
}
