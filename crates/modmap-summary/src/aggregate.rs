//! ランディレクトリ群をファミリー単位に畳み込む

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::path::Path;

use rayon::prelude::*;

use crate::error::{SummaryError, SummaryResult};
use crate::family::Family;
use crate::loader::{self, TopN};
use crate::natural::NaturalKey;
use crate::run::{RunDir, locate_runs};

/// ファミリー名（自然順）→ 集計結果
pub type Families = BTreeMap<NaturalKey, Family>;

/// `root` 以下の全ランを集計する。
///
/// ファミリーごとの畳み込みは rayon で並列に行う。ラン内の走査順は
/// distance の確定順・分類器名の辞書順、ラン間は k の昇順で固定しているため、
/// ディレクトリの列挙順によらず結果は同じになる。
pub fn aggregate(root: &Path, top_n: TopN) -> SummaryResult<Families> {
    let grouped = group_runs(locate_runs(root))?;
    log::info!("found {} experiment families under {}", grouped.len(), root.display());

    let folded: Vec<Option<Family>> = grouped
        .into_par_iter()
        .map(|(_, runs)| fold_family(&runs, top_n))
        .collect::<SummaryResult<_>>()?;

    Ok(folded
        .into_iter()
        .flatten()
        .map(|family| (NaturalKey::from(family.name()), family))
        .collect())
}

/// ランをファミリー名ごとにまとめ、各ファミリー内を k の昇順に並べる。
///
/// 同じ (family, k) が2つあれば `DuplicateRun`。
pub fn group_runs(
    runs: impl IntoIterator<Item = SummaryResult<RunDir>>,
) -> SummaryResult<BTreeMap<String, Vec<RunDir>>> {
    let mut by_family: BTreeMap<String, BTreeMap<u32, RunDir>> = BTreeMap::new();
    for run in runs {
        let run = run?;
        let slot = by_family.entry(run.id.family_name.clone()).or_default();
        match slot.entry(run.id.k) {
            Entry::Vacant(v) => {
                v.insert(run);
            }
            Entry::Occupied(o) => {
                let (first, second) = if o.get().path <= run.path {
                    (o.get().path.clone(), run.path)
                } else {
                    (run.path, o.get().path.clone())
                };
                return Err(SummaryError::DuplicateRun {
                    family: run.id.family_name,
                    k: run.id.k,
                    first,
                    second,
                });
            }
        }
    }
    Ok(by_family.into_iter().map(|(name, runs)| (name, runs.into_values().collect())).collect())
}

/// 1ファミリー分のランを順に畳み込む。
///
/// 最初のランの metadata と distance 一覧でファミリーを初期化し、以降のランは
/// 同じ distance のファイルを必ず持つ必要がある。ランが無ければ `None`。
pub fn fold_family(runs: &[RunDir], top_n: TopN) -> SummaryResult<Option<Family>> {
    let Some(first) = runs.first() else {
        return Ok(None);
    };
    let mut family = init_family(first)?;

    for run in runs {
        log::debug!("loading {}", run.path.display());
        let results = loader::load_run(run, family.distance_names())?;
        family.observe_run(&results, top_n);
    }

    if family.best_overall().is_none() {
        log::warn!("{}: no classifier produced a {top_n} accuracy", family.name());
    }
    Ok(Some(family))
}

fn init_family(first: &RunDir) -> SummaryResult<Family> {
    let metadata = loader::load_metadata(&first.path)?;
    let classes = loader::class_histogram(&metadata);
    let distances = loader::discover_distances(&first.path)?;
    log::debug!(
        "{}: {} classes, distances [{}] (from {})",
        first.id.family_name,
        classes.len(),
        distances.join(", "),
        first.path.display()
    );
    Ok(Family::new(first.id.family_name.clone(), classes, distances))
}
