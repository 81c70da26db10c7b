/// 分類実験ランの集計ツール
///
/// 使い方:
///   # ジョブディレクトリ直下の `<family>-k=<int>` を集計して表を出力
///   summarize results/job1
///
///   # top-3 精度で比較し、最良候補のプロットも生成
///   summarize results/job1 plots/ --top-n 3
///
///   # JSON出力モード（gzip圧縮してファイルへ）
///   summarize results/job1 --json --output summary.json.gz
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;

use modmap_summary::report::{ReportOptions, json, reportable};
use modmap_summary::{TopN, aggregate};
use tools::common::io::open_report_sink;
use tools::config::SummarizeConfig;
use tools::summary::{PlotTarget, plot_family, plot_job_dir, write_text};

#[derive(Parser, Debug)]
#[command(author, version, about = "分類実験の結果を集計し、最良の classifier / distance / k を表示する")]
struct Cli {
    /// `<family>-k=<int>` 形式のランディレクトリを含むジョブディレクトリ
    job_dir: PathBuf,

    /// プロット出力先（指定時のみ外部スクリプトでプロットを生成）
    plot_output_dir: Option<PathBuf>,

    /// 比較に使う top-N 精度（既定: 1）
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    top_n: u32,

    /// JSON出力モード
    #[arg(long)]
    json: bool,

    /// 出力先ファイル（省略時または `-` で標準出力、`.gz` なら圧縮）
    #[arg(long)]
    output: Option<PathBuf>,

    /// 設定ファイル（TOML）
    #[arg(long)]
    config: Option<PathBuf>,

    /// 集計スレッド数（0 = rayon 既定）
    #[arg(long, default_value_t = 0)]
    threads: usize,

    /// プロットプログラム（設定ファイルより優先）
    #[arg(long)]
    plot_program: Option<String>,

    /// プロットスクリプト（設定ファイルより優先）
    #[arg(long)]
    plot_script: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    if !cli.job_dir.is_dir() {
        bail!("job directory does not exist: {}", cli.job_dir.display());
    }
    if let Some(dir) = &cli.plot_output_dir {
        if !dir.is_dir() {
            bail!("plot output directory does not exist: {}", dir.display());
        }
    }
    let top_n = TopN::new(cli.top_n).context("--top-n must be >= 1")?;

    let config = SummarizeConfig::load(cli.config.as_deref())?;
    let mut plot_command = config.plot.command();
    if let Some(program) = &cli.plot_program {
        plot_command.program = program.clone();
    }
    if let Some(script) = &cli.plot_script {
        plot_command.script = script.clone();
    }
    let plot_target = match &cli.plot_output_dir {
        Some(plot_root) => Some(PlotTarget {
            command: plot_command,
            job_dir: plot_job_dir(&cli.job_dir)
                .with_context(|| format!("failed to resolve {}", cli.job_dir.display()))?,
            plot_root: plot_root.clone(),
        }),
        None => None,
    };
    let known: Vec<&str> = config.known_classifiers.iter().map(String::as_str).collect();
    let opts = ReportOptions::new(top_n, &known);

    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new().num_threads(cli.threads).build_global().unwrap_or_else(|e| {
            log::warn!("failed to set thread count: {e}");
        });
    }

    let families = aggregate(&cli.job_dir, top_n)
        .with_context(|| format!("failed to summarize {}", cli.job_dir.display()))?;

    let mut out = open_report_sink(cli.output.as_deref()).context("failed to open output")?;
    if cli.json {
        let report = json::build_report(&families, &opts);
        serde_json::to_writer_pretty(&mut out, &report)?;
        writeln!(out)?;
    } else {
        write_text(&mut out, &families, &opts, plot_target.as_ref())?;
    }
    out.close().context("failed to finish output")?;

    if cli.json {
        if let Some(target) = &plot_target {
            // JSON モードでもプロットは生成する（警告はログのみ）
            for family in reportable(&families, top_n) {
                plot_family(target, family, top_n, None)?;
            }
        }
    }
    Ok(())
}
