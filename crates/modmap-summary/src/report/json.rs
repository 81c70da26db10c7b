//! JSON 形式のレポート

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use super::{LeaderboardEntry, ReportOptions, leaderboard, reportable};
use crate::aggregate::Families;
use crate::family::Family;
use crate::loader::TopN;

#[derive(Debug, Serialize)]
pub struct JsonReport {
    pub accuracy_type: String,
    pub top_n: TopN,
    pub experiments: Vec<JsonExperiment>,
    pub summary: Vec<LeaderboardEntry>,
}

#[derive(Debug, Serialize)]
pub struct JsonExperiment {
    pub name: String,
    pub ks: Vec<u32>,
    pub distances: Vec<String>,
    pub classifiers: JsonParticipation,
    pub classes: Vec<JsonClass>,
    pub best: JsonBest,
    pub best_by_k: Vec<JsonBestByK>,
    /// 最良 k における distance → 分類器 → 精度（百分率）
    pub classifiers_at_best_k: BTreeMap<String, BTreeMap<String, f64>>,
}

#[derive(Debug, Serialize)]
pub struct JsonParticipation {
    pub always: Vec<String>,
    pub sometimes: Vec<String>,
    pub never: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct JsonClass {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct JsonBest {
    pub accuracy: f64,
    pub k: u32,
    pub distance: String,
    pub classifier: String,
    pub confusion_matrix: Vec<Vec<f64>>,
    pub metadata_file: PathBuf,
    pub classification_file: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct JsonBestByK {
    pub k: u32,
    /// distance → 最良分類器（順位付き結果が無ければ null）
    pub distances: BTreeMap<String, Option<JsonCell>>,
}

#[derive(Debug, Serialize)]
pub struct JsonCell {
    pub accuracy: f64,
    pub classifier: String,
}

pub fn build_report(families: &Families, opts: &ReportOptions<'_>) -> JsonReport {
    JsonReport {
        accuracy_type: opts.top_n.key(),
        top_n: opts.top_n,
        experiments: reportable(families, opts.top_n).filter_map(|f| experiment(f, opts)).collect(),
        summary: leaderboard(families, opts.top_n),
    }
}

fn experiment(family: &Family, opts: &ReportOptions<'_>) -> Option<JsonExperiment> {
    let best = family.best_overall()?;
    let participation = family.participation(opts.known_classifiers);

    let best_by_k = family
        .ks_seen()
        .iter()
        .map(|&k| JsonBestByK {
            k,
            distances: family
                .distance_names()
                .iter()
                .map(|d| {
                    let cell = family.best_for(d, k).map(|c| JsonCell {
                        accuracy: c.percent(),
                        classifier: c.classifier.clone(),
                    });
                    (d.clone(), cell)
                })
                .collect(),
        })
        .collect();

    let classifiers_at_best_k = family
        .best_classifiers_snapshot()
        .iter()
        .map(|(d, by_c)| (d.clone(), by_c.iter().map(|(c, acc)| (c.clone(), acc * 100.0)).collect()))
        .collect();

    Some(JsonExperiment {
        name: family.name().to_owned(),
        ks: family.ks_seen().iter().copied().collect(),
        distances: family.distance_names().to_vec(),
        classifiers: JsonParticipation {
            always: participation.always,
            sometimes: participation.sometimes,
            never: participation.never,
        },
        classes: family
            .class_display_order()
            .into_iter()
            .map(|(label, count)| JsonClass {
                label: label.to_owned(),
                count,
            })
            .collect(),
        best: JsonBest {
            accuracy: best.candidate.percent(),
            k: best.candidate.k,
            distance: best.candidate.distance.clone(),
            classifier: best.candidate.classifier.clone(),
            confusion_matrix: best.confusion_matrix.clone(),
            metadata_file: best.metadata_file.clone(),
            classification_file: best.classification_file.clone(),
        },
        best_by_k,
        classifiers_at_best_k,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{ClassificationResults, ClassifierRecord, RunResults};
    use crate::natural::NaturalKey;

    #[test]
    fn report_serializes_best_and_empty_cells() {
        let classes = [("A".to_owned(), 4), ("B".to_owned(), 4)].into_iter().collect();
        let mut fam = Family::new("exp", classes, vec!["d1".to_owned()]);
        let res: ClassificationResults =
            [("svm".to_owned(), ClassifierRecord::with_accuracy(TopN::ONE, 0.75))].into_iter().collect();
        fam.observe_run(
            &RunResults {
                k: 2,
                run_dir: PathBuf::from("/r/exp-k=2"),
                by_distance: vec![("d1".to_owned(), res)],
            },
            TopN::ONE,
        );
        fam.observe_run(
            &RunResults {
                k: 6,
                run_dir: PathBuf::from("/r/exp-k=6"),
                by_distance: vec![("d1".to_owned(), ClassificationResults::new())],
            },
            TopN::ONE,
        );
        let mut families = Families::new();
        families.insert(NaturalKey::from("exp"), fam);

        let known = ["svm"];
        let report = build_report(&families, &ReportOptions::new(TopN::ONE, &known));
        let value = serde_json::to_value(&report).expect("serialize");

        assert_eq!(value["accuracy_type"], "top1");
        assert_eq!(value["top_n"], 1);
        let exp = &value["experiments"][0];
        assert_eq!(exp["best"]["accuracy"], 75.0);
        assert_eq!(exp["best"]["k"], 2);
        assert_eq!(exp["best_by_k"][1]["k"], 6);
        assert!(exp["best_by_k"][1]["distances"]["d1"].is_null());
        assert_eq!(exp["classifiers"]["sometimes"][0], "svm");
        assert_eq!(value["summary"][0]["run_info"], "k=2, d1, svm");
    }
}
