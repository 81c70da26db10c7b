//! ディスク上のランディレクトリを使った集計の結合テスト

use std::fs;
use std::path::{Path, PathBuf};

use modmap_summary::report::leaderboard;
use modmap_summary::{RunDir, RunId, SummaryError, TopN, aggregate, fold_family};
use serde_json::json;

/// 1ランディレクトリを作る。`results` は distance → JSON。
fn write_run(root: &Path, name: &str, groups: &[&str], results: &[(&str, serde_json::Value)]) -> PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(&dir).expect("mkdir");
    let metadata: Vec<_> = groups.iter().map(|g| json!({ "id": format!("seq-{g}"), "group": g })).collect();
    fs::write(dir.join("metadata.json"), serde_json::to_vec(&metadata).expect("json")).expect("write");
    for (distance, value) in results {
        fs::write(dir.join(format!("classification-{distance}.json")), value.to_string()).expect("write");
    }
    dir
}

fn top1(acc: f64) -> serde_json::Value {
    json!({ "top1": { "accuracy": acc, "confusion_matrix": [[1, 0], [0, 1]], "classes": ["B", "A"] } })
}

fn run_dir(path: PathBuf) -> RunDir {
    let name = path.file_name().and_then(|n| n.to_str()).expect("utf8 name").to_owned();
    RunDir {
        id: name.parse::<RunId>().expect("valid run name"),
        path,
    }
}

#[test]
fn single_run_selects_the_best_classifier() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write_run(
        tmp.path(),
        "exp-k=5",
        &["A", "B", "A"],
        &[("dist1", json!({ "knn": top1(0.80), "svm": top1(0.95) }))],
    );

    let families = aggregate(tmp.path(), TopN::ONE).expect("aggregate failed");
    let family = families.values().next().expect("one family");
    let best = family.best_overall().expect("best");

    assert!((best.candidate.percent() - 95.0).abs() < 1e-9);
    assert_eq!(best.candidate.k, 5);
    assert_eq!(best.candidate.distance, "dist1");
    assert_eq!(best.candidate.classifier, "svm");
    assert_eq!(best.class_order, vec!["B", "A"]);
    assert_eq!(family.class_display_order(), vec![("B", 1), ("A", 2)]);
}

#[test]
fn equal_accuracy_prefers_smaller_k_in_any_order() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let groups = ["A", "B", "C"];
    let k7 = write_run(tmp.path(), "exp-k=7", &groups, &[("d", json!({ "svm": top1(0.9) }))]);
    let k3 = write_run(tmp.path(), "exp-k=3", &groups, &[("d", json!({ "lda": top1(0.9) }))]);

    for runs in [vec![run_dir(k3.clone()), run_dir(k7.clone())], vec![run_dir(k7.clone()), run_dir(k3.clone())]] {
        let family = fold_family(&runs, TopN::ONE).expect("fold").expect("family");
        let best = family.best_overall().expect("best");
        assert_eq!(best.candidate.k, 3);
        assert_eq!(best.candidate.classifier, "lda");
    }
}

#[test]
fn fold_is_invariant_under_run_order() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let groups = ["A", "B", "C", "D"];
    let paths = vec![
        write_run(
            tmp.path(),
            "exp-k=2",
            &groups,
            &[("d1", json!({ "svm": top1(0.5), "knn": top1(0.7) })), ("d2", json!({ "svm": top1(0.7) }))],
        ),
        write_run(
            tmp.path(),
            "exp-k=4",
            &groups,
            &[("d1", json!({ "svm": top1(0.8), "knn": {} })), ("d2", json!({ "svm": top1(0.8), "lda": top1(0.6) }))],
        ),
        write_run(
            tmp.path(),
            "exp-k=6",
            &groups,
            &[("d1", json!({ "svm": top1(0.8) })), ("d2", json!({ "svm": top1(0.3), "knn": top1(0.8) }))],
        ),
    ];

    let orders = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];
    let folded: Vec<_> = orders
        .iter()
        .map(|order| {
            let runs: Vec<RunDir> = order.iter().map(|&i| run_dir(paths[i].clone())).collect();
            fold_family(&runs, TopN::ONE).expect("fold").expect("family")
        })
        .collect();

    for family in &folded[1..] {
        assert_eq!(family, &folded[0]);
    }

    let family = &folded[0];
    let best = family.best_overall().expect("best");
    assert_eq!((best.candidate.k, best.candidate.distance.as_str(), best.candidate.classifier.as_str()), (4, "d1", "svm"));
    assert_eq!(family.classifier_run_counts().get("svm"), Some(&6));
    assert_eq!(family.classifier_run_counts().get("knn"), Some(&2));
    assert_eq!(family.classifier_run_counts().get("lda"), Some(&1));
    assert_eq!(family.best_for("d2", 6).map(|c| c.classifier.as_str()), Some("knn"));
}

#[test]
fn missing_top_n_never_counts() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write_run(
        tmp.path(),
        "exp-k=2",
        &["A", "B", "C", "D"],
        &[(
            "d",
            json!({
                "svm": { "top1": { "accuracy": 0.9 } },
                "lda": { "top1": { "accuracy": 0.4 }, "top3": { "accuracy": 0.8 } }
            }),
        )],
    );

    let top3 = TopN::new(3).expect("non-zero");
    let families = aggregate(tmp.path(), top3).expect("aggregate failed");
    let family = families.values().next().expect("family");
    assert_eq!(family.classifier_run_counts().get("svm"), None);
    assert_eq!(family.classifier_run_counts().get("lda"), Some(&1));
    assert_eq!(family.best_overall().map(|b| b.candidate.classifier.as_str()), Some("lda"));

    let participation = family.participation(&["svm", "lda"]);
    assert_eq!(participation.always, vec!["lda"]);
    assert_eq!(participation.never, vec!["svm"]);
}

#[test]
fn zero_padded_top_n_keys_are_not_the_configured_field() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write_run(
        tmp.path(),
        "exp-k=1",
        &["A", "B"],
        &[(
            "d",
            json!({
                "svm": { "top01": { "accuracy": 0.5 } },
                "knn": { "top01": { "accuracy": 0.9 }, "top1": { "accuracy": 0.3 } }
            }),
        )],
    );

    let families = aggregate(tmp.path(), TopN::ONE).expect("aggregate failed");
    let family = families.values().next().expect("family");
    assert_eq!(family.classifier_run_counts().get("svm"), None);
    assert_eq!(family.classifier_run_counts().get("knn"), Some(&1));
    let best = family.best_overall().expect("best");
    assert_eq!(best.candidate.classifier, "knn");
    assert!((best.candidate.accuracy - 0.3).abs() < 1e-12);
}

#[test]
fn families_come_out_in_natural_order() {
    let tmp = tempfile::tempdir().expect("tempdir");
    for name in ["exp2-k=1", "exp10-k=1", "exp1-k=1"] {
        write_run(tmp.path(), name, &["A", "B"], &[("d", json!({ "svm": top1(0.5) }))]);
    }
    fs::write(tmp.path().join("README-k=1.txt"), "not a run").expect("write");

    let families = aggregate(tmp.path(), TopN::ONE).expect("aggregate failed");
    let names: Vec<&str> = families.keys().map(|k| k.as_str()).collect();
    assert_eq!(names, vec!["exp1", "exp2", "exp10"]);
}

#[test]
fn families_with_too_few_classes_are_left_out() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write_run(tmp.path(), "pair-k=1", &["A", "B"], &[("d", json!({ "svm": top1(0.9) }))]);
    write_run(tmp.path(), "triple-k=1", &["A", "B", "C"], &[("d", json!({ "svm": top1(0.6) }))]);

    let families = aggregate(tmp.path(), TopN::new(2).expect("non-zero")).expect("aggregate failed");
    assert_eq!(families.len(), 2);
    let board = leaderboard(&families, TopN::new(2).expect("non-zero"));
    let names: Vec<&str> = board.iter().map(|e| e.experiment.as_str()).collect();
    assert_eq!(names, vec!["triple"]);
}

#[test]
fn malformed_run_name_aborts() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write_run(tmp.path(), "exp-k=1", &["A", "B"], &[("d", json!({}))]);
    fs::create_dir(tmp.path().join("exp-final")).expect("mkdir");

    match aggregate(tmp.path(), TopN::ONE) {
        Err(SummaryError::MalformedRunName { path, .. }) => assert!(path.ends_with("exp-final")),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn missing_established_distance_file_aborts() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write_run(tmp.path(), "exp-k=1", &["A", "B"], &[("d1", json!({})), ("d2", json!({}))]);
    write_run(tmp.path(), "exp-k=2", &["A", "B"], &[("d1", json!({}))]);

    match aggregate(tmp.path(), TopN::ONE) {
        Err(SummaryError::MissingFile { path }) => {
            assert!(path.ends_with("exp-k=2/classification-d2.json"));
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn missing_metadata_aborts() {
    let tmp = tempfile::tempdir().expect("tempdir");
    fs::create_dir(tmp.path().join("exp-k=1")).expect("mkdir");

    assert!(matches!(aggregate(tmp.path(), TopN::ONE), Err(SummaryError::MissingFile { .. })));
}
