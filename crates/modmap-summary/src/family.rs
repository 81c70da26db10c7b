//! 実験ファミリー単位の集計状態

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use crate::loader::{self, RunResults, TopN};
use crate::select::{Candidate, SelectionRule};

/// 全体最良候補と、その観測元のファイル・混同行列
#[derive(Clone, Debug, PartialEq)]
pub struct BestRun {
    pub candidate: Candidate,
    pub metadata_file: PathBuf,
    pub classification_file: PathBuf,
    pub mds_file: PathBuf,
    pub confusion_matrix: Vec<Vec<f64>>,
    pub class_order: Vec<String>,
}

/// 分類器の実行状況
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Participation {
    /// 全 (k, distance) で精度を出した
    pub always: Vec<String>,
    /// 1回以上だが全てではない
    pub sometimes: Vec<String>,
    /// 既知の分類器のうち一度も精度を出さなかった
    pub never: Vec<String>,
}

/// k だけが異なるランの集まり
#[derive(Clone, Debug, PartialEq)]
pub struct Family {
    name: String,
    classes: BTreeMap<String, usize>,
    distance_names: Vec<String>,
    ks_seen: BTreeSet<u32>,
    classifier_run_counts: BTreeMap<String, usize>,
    best_overall: Option<BestRun>,
    best_by_k_and_distance: BTreeMap<String, BTreeMap<u32, Candidate>>,
    best_classifiers_snapshot: BTreeMap<String, BTreeMap<String, f64>>,
}

impl Family {
    /// 最初のランから確定したクラス分布と distance 一覧で初期化する。
    pub fn new(name: impl Into<String>, classes: BTreeMap<String, usize>, distance_names: Vec<String>) -> Self {
        let best_by_k_and_distance =
            distance_names.iter().map(|d| (d.clone(), BTreeMap::new())).collect();
        Self {
            name: name.into(),
            classes,
            distance_names,
            ks_seen: BTreeSet::new(),
            classifier_run_counts: BTreeMap::new(),
            best_overall: None,
            best_by_k_and_distance,
            best_classifiers_snapshot: BTreeMap::new(),
        }
    }

    /// 1ラン分の結果を畳み込む。top-N を持たない分類器は数えない。
    pub fn observe_run(&mut self, run: &RunResults, top_n: TopN) {
        self.ks_seen.insert(run.k);

        for (distance, results) in &run.by_distance {
            for (classifier, record) in results {
                let view = match record.top_n(classifier, top_n) {
                    Ok(view) => view,
                    Err(missing) => {
                        log::trace!("{}: k={} {distance}: {missing}", self.name, run.k);
                        continue;
                    }
                };

                *self.classifier_run_counts.entry(classifier.clone()).or_insert(0) += 1;

                let candidate = Candidate {
                    accuracy: view.accuracy,
                    k: run.k,
                    distance: distance.clone(),
                    classifier: classifier.clone(),
                };

                let current = self.best_overall.as_ref().map(|b| &b.candidate);
                if SelectionRule::Global.consider(current, &candidate).is_replace() {
                    self.best_overall = Some(BestRun {
                        candidate: candidate.clone(),
                        metadata_file: loader::metadata_path(&run.run_dir),
                        classification_file: loader::classification_path(&run.run_dir, distance),
                        mds_file: loader::mds_path(&run.run_dir, distance),
                        confusion_matrix: view.confusion_matrix.map(<[_]>::to_vec).unwrap_or_default(),
                        class_order: view.classes.map(<[_]>::to_vec).unwrap_or_default(),
                    });
                    self.best_classifiers_snapshot = snapshot(run, top_n);
                }

                let by_k = self.best_by_k_and_distance.entry(distance.clone()).or_default();
                if SelectionRule::PerKDistance.consider(by_k.get(&run.k), &candidate).is_replace() {
                    by_k.insert(run.k, candidate);
                }
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub fn distance_names(&self) -> &[String] {
        &self.distance_names
    }

    pub fn ks_seen(&self) -> &BTreeSet<u32> {
        &self.ks_seen
    }

    pub fn classifier_run_counts(&self) -> &BTreeMap<String, usize> {
        &self.classifier_run_counts
    }

    pub fn best_overall(&self) -> Option<&BestRun> {
        self.best_overall.as_ref()
    }

    pub fn best_for(&self, distance: &str, k: u32) -> Option<&Candidate> {
        self.best_by_k_and_distance.get(distance)?.get(&k)
    }

    /// 全体最良が得られた k での distance → 分類器 → 精度（割合）
    pub fn best_classifiers_snapshot(&self) -> &BTreeMap<String, BTreeMap<String, f64>> {
        &self.best_classifiers_snapshot
    }

    /// 全 (k, distance) の組数
    pub fn expected_runs(&self) -> usize {
        self.ks_seen.len() * self.distance_names.len()
    }

    /// クラス数が top-N 以下なら top-N 精度に意味がないので出力しない
    pub fn is_reportable(&self, top_n: TopN) -> bool {
        self.class_count() > top_n.get() as usize && self.best_overall.is_some()
    }

    /// 表示用のクラス順。最良レコードの `classes` 順、無ければラベル順。
    pub fn class_display_order(&self) -> Vec<(&str, usize)> {
        let count = |label: &str| self.classes.get(label).copied().unwrap_or(0);
        match self.best_overall.as_ref().filter(|b| !b.class_order.is_empty()) {
            Some(best) => best.class_order.iter().map(|c| (c.as_str(), count(c))).collect(),
            None => self.classes.iter().map(|(c, n)| (c.as_str(), *n)).collect(),
        }
    }

    pub fn participation<S: AsRef<str>>(&self, known_classifiers: &[S]) -> Participation {
        let expected = self.expected_runs();
        let mut result = Participation::default();
        for (classifier, &count) in &self.classifier_run_counts {
            if count == expected {
                result.always.push(classifier.clone());
            } else {
                result.sometimes.push(classifier.clone());
            }
        }
        let ran: BTreeSet<&str> = self.classifier_run_counts.keys().map(String::as_str).collect();
        let never: BTreeSet<&str> =
            known_classifiers.iter().map(AsRef::<str>::as_ref).filter(|c| !ran.contains(c)).collect();
        result.never = never.into_iter().map(str::to_owned).collect();
        result
    }
}

fn snapshot(run: &RunResults, top_n: TopN) -> BTreeMap<String, BTreeMap<String, f64>> {
    run.by_distance
        .iter()
        .map(|(distance, results)| {
            let accuracies = results
                .iter()
                .filter_map(|(classifier, record)| {
                    record.top_n(classifier, top_n).ok().map(|v| (classifier.clone(), v.accuracy))
                })
                .collect();
            (distance.clone(), accuracies)
        })
        .collect()
}
