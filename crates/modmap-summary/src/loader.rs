//! metadata.json / classification-<distance>.json の読み込み

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{MissingField, SummaryError, SummaryResult};
use crate::natural::natural_cmp;
use crate::run::RunDir;

pub const METADATA_FILE: &str = "metadata.json";
const CLASSIFICATION_PREFIX: &str = "classification-";
const CLASSIFICATION_SUFFIX: &str = ".json";

pub fn metadata_path(run_dir: &Path) -> PathBuf {
    run_dir.join(METADATA_FILE)
}

pub fn classification_path(run_dir: &Path, distance: &str) -> PathBuf {
    run_dir.join(format!("{CLASSIFICATION_PREFIX}{distance}{CLASSIFICATION_SUFFIX}"))
}

/// プロット用の MDS 座標ファイル（集計では読まない）
pub fn mds_path(run_dir: &Path, distance: &str) -> PathBuf {
    run_dir.join(format!("mds10-{distance}.json"))
}

/// どの top-N 精度で比較するか（N >= 1）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TopN(NonZeroU32);

impl TopN {
    pub const ONE: TopN = TopN(NonZeroU32::MIN);

    pub fn new(n: u32) -> Option<Self> {
        NonZeroU32::new(n).map(Self)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }

    /// 結果 JSON 上のキー名（`top3` など）
    pub fn key(self) -> String {
        format!("top{}", self.0)
    }

    fn from_key(key: &str) -> Option<Self> {
        let digits = key.strip_prefix("top")?;
        // `top01` は `top1` とは別のキー
        if digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse::<u32>().ok().and_then(Self::new)
    }
}

impl Default for TopN {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for TopN {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "top{}", self.0)
    }
}

/// metadata.json の1サンプル
#[derive(Clone, Debug, Deserialize)]
pub struct SampleMetadata {
    pub group: String,
}

/// `top<N>` サブレコード
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct RankedAccuracy {
    /// 0.0〜1.0 の割合
    pub accuracy: f64,
    #[serde(default)]
    pub confusion_matrix: Option<Vec<Vec<f64>>>,
    #[serde(default)]
    pub classes: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct RawClassifierRecord {
    #[serde(default)]
    confusion_matrix: Option<Vec<Vec<f64>>>,
    #[serde(default)]
    classes: Option<Vec<String>>,
    #[serde(flatten)]
    rest: BTreeMap<String, serde_json::Value>,
}

/// 1分類器の結果レコード
///
/// `top<N>` キーのみを型付きで保持し、その他のキーは捨てる。
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(try_from = "RawClassifierRecord")]
pub struct ClassifierRecord {
    ranked: BTreeMap<TopN, RankedAccuracy>,
    confusion_matrix: Option<Vec<Vec<f64>>>,
    classes: Option<Vec<String>>,
}

impl TryFrom<RawClassifierRecord> for ClassifierRecord {
    type Error = serde_json::Error;

    fn try_from(raw: RawClassifierRecord) -> Result<Self, Self::Error> {
        let mut ranked = BTreeMap::new();
        for (key, value) in raw.rest {
            if let Some(top_n) = TopN::from_key(&key) {
                ranked.insert(top_n, serde_json::from_value(value)?);
            }
        }
        Ok(Self {
            ranked,
            confusion_matrix: raw.confusion_matrix,
            classes: raw.classes,
        })
    }
}

/// top-N で見た分類器結果
#[derive(Clone, Copy, Debug)]
pub struct RankedView<'a> {
    pub accuracy: f64,
    /// サブレコード優先、無ければレコード直下の値
    pub confusion_matrix: Option<&'a [Vec<f64>]>,
    pub classes: Option<&'a [String]>,
}

impl ClassifierRecord {
    #[cfg(test)]
    pub(crate) fn with_accuracy(top_n: TopN, accuracy: f64) -> Self {
        let mut ranked = BTreeMap::new();
        ranked.insert(
            top_n,
            RankedAccuracy {
                accuracy,
                confusion_matrix: None,
                classes: None,
            },
        );
        Self {
            ranked,
            ..Self::default()
        }
    }

    /// `top<N>` を引く。無ければ `MissingField`。
    pub fn top_n(&self, classifier: &str, top_n: TopN) -> Result<RankedView<'_>, MissingField> {
        let ranked = self.ranked.get(&top_n).ok_or_else(|| MissingField {
            classifier: classifier.to_owned(),
            top_n,
        })?;
        Ok(RankedView {
            accuracy: ranked.accuracy,
            confusion_matrix: ranked.confusion_matrix.as_deref().or(self.confusion_matrix.as_deref()),
            classes: ranked.classes.as_deref().or(self.classes.as_deref()),
        })
    }
}

/// classification-<distance>.json の中身。分類器名の辞書順で走査される。
pub type ClassificationResults = BTreeMap<String, ClassifierRecord>;

/// 1ランの全 distance の結果（distance 順は family の確定順）
#[derive(Clone, Debug)]
pub struct RunResults {
    pub k: u32,
    pub run_dir: PathBuf,
    pub by_distance: Vec<(String, ClassificationResults)>,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> SummaryResult<T> {
    let file = File::open(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            SummaryError::MissingFile {
                path: path.to_path_buf(),
            }
        } else {
            SummaryError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| SummaryError::Json {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_metadata(run_dir: &Path) -> SummaryResult<Vec<SampleMetadata>> {
    read_json(&metadata_path(run_dir))
}

/// group ラベルごとのサンプル数
pub fn class_histogram(samples: &[SampleMetadata]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for sample in samples {
        *counts.entry(sample.group.clone()).or_insert(0) += 1;
    }
    counts
}

/// `classification-<distance>.json` から distance 名を自然順で列挙する。
pub fn discover_distances(run_dir: &Path) -> SummaryResult<Vec<String>> {
    let io_err = |source| SummaryError::Io {
        path: run_dir.to_path_buf(),
        source,
    };
    let mut distances = Vec::new();
    for entry in std::fs::read_dir(run_dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        let Some(distance) = name
            .strip_prefix(CLASSIFICATION_PREFIX)
            .and_then(|rest| rest.strip_suffix(CLASSIFICATION_SUFFIX))
        else {
            continue;
        };
        if entry.path().is_file() {
            distances.push(distance.to_owned());
        }
    }
    distances.sort_by(|a, b| natural_cmp(a, b));
    Ok(distances)
}

pub fn load_classification(run_dir: &Path, distance: &str) -> SummaryResult<ClassificationResults> {
    read_json(&classification_path(run_dir, distance))
}

/// 確定済みの distance をすべて読み込む。1つでも欠ければ `MissingFile`。
pub fn load_run(run: &RunDir, distances: &[String]) -> SummaryResult<RunResults> {
    let mut by_distance = Vec::with_capacity(distances.len());
    for distance in distances {
        by_distance.push((distance.clone(), load_classification(&run.path, distance)?));
    }
    Ok(RunResults {
        k: run.id.k,
        run_dir: run.path.clone(),
        by_distance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn top(n: u32) -> TopN {
        TopN::new(n).expect("non-zero")
    }

    #[test]
    fn top_n_key_roundtrip() {
        assert_eq!(top(3).key(), "top3");
        assert_eq!(TopN::from_key("top12"), Some(top(12)));
        assert_eq!(TopN::from_key("top"), None);
        assert_eq!(TopN::from_key("top0"), None);
        assert_eq!(TopN::from_key("top01"), None);
        assert_eq!(TopN::from_key("top003"), None);
        assert_eq!(TopN::from_key("top10"), Some(top(10)));
        assert_eq!(TopN::from_key("top-1"), None);
        assert_eq!(TopN::from_key("topology"), None);
        assert_eq!(TopN::default(), top(1));
    }

    #[test]
    fn record_lookup_prefers_sub_record_fields() {
        let json = r#"{
            "top1": {"accuracy": 0.5, "confusion_matrix": [[1, 0], [0, 1]], "classes": ["b", "a"]},
            "top3": {"accuracy": 0.9},
            "confusion_matrix": [[2, 2], [2, 2]],
            "classes": ["a", "b"],
            "training_time": 1.25
        }"#;
        let record: ClassifierRecord = serde_json::from_str(json).expect("parse failed");

        let view = record.top_n("svm", top(1)).expect("top1 present");
        assert_eq!(view.accuracy, 0.5);
        assert_eq!(view.classes, Some(&["b".to_owned(), "a".to_owned()][..]));
        assert_eq!(view.confusion_matrix.map(|m| m[0][0]), Some(1.0));

        let view = record.top_n("svm", top(3)).expect("top3 present");
        assert_eq!(view.classes, Some(&["a".to_owned(), "b".to_owned()][..]));
        assert_eq!(view.confusion_matrix.map(|m| m[0][0]), Some(2.0));

        let err = record.top_n("svm", top(2)).expect_err("top2 missing");
        assert_eq!(err.classifier, "svm");
        assert_eq!(err.top_n, top(2));
    }

    #[test]
    fn malformed_sub_record_is_a_parse_error() {
        let json = r#"{"top1": {"acc": 0.5}}"#;
        assert!(serde_json::from_str::<ClassifierRecord>(json).is_err());
    }

    #[test]
    fn discover_and_load_run_files() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let dir = tmp.path();
        std::fs::write(dir.join("metadata.json"), r#"[{"group":"A"},{"group":"B"},{"group":"A"}]"#)
            .expect("write");
        std::fs::write(dir.join("classification-manhattan.json"), r#"{"svm":{"top1":{"accuracy":0.7}}}"#)
            .expect("write");
        std::fs::write(dir.join("classification-dssim10.json"), "{}").expect("write");
        std::fs::write(dir.join("classification-dssim2.json"), "{}").expect("write");
        std::fs::write(dir.join("mds10-manhattan.json"), "[]").expect("write");
        std::fs::create_dir(dir.join("classification-bogus.json")).expect("mkdir");

        let distances = discover_distances(dir).expect("discover failed");
        assert_eq!(distances, vec!["dssim2", "dssim10", "manhattan"]);

        let histogram = class_histogram(&load_metadata(dir).expect("metadata"));
        assert_eq!(histogram.get("A"), Some(&2));
        assert_eq!(histogram.get("B"), Some(&1));

        let results = load_classification(dir, "manhattan").expect("classification");
        assert_eq!(results["svm"].top_n("svm", TopN::ONE).expect("top1").accuracy, 0.7);
    }

    #[test]
    fn missing_and_malformed_files_are_fatal() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let dir = tmp.path();
        match load_metadata(dir) {
            Err(SummaryError::MissingFile { path }) => assert!(path.ends_with("metadata.json")),
            other => panic!("unexpected: {other:?}"),
        }
        std::fs::write(dir.join("classification-x.json"), "{not json").expect("write");
        assert!(matches!(load_classification(dir, "x"), Err(SummaryError::Json { .. })));
    }
}
