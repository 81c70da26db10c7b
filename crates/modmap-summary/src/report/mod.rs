//! 集計結果の出力（テキスト表 / JSON）

pub mod json;
pub mod table;
pub mod text;

use serde::Serialize;

use crate::aggregate::Families;
use crate::family::Family;
use crate::loader::TopN;

/// 出力時の設定
#[derive(Clone, Copy, Debug)]
pub struct ReportOptions<'a> {
    pub top_n: TopN,
    /// 「実行されなかった分類器」を求めるための既知の分類器一覧
    pub known_classifiers: &'a [&'a str],
}

impl<'a> ReportOptions<'a> {
    pub fn new(top_n: TopN, known_classifiers: &'a [&'a str]) -> Self {
        Self {
            top_n,
            known_classifiers,
        }
    }
}

/// 出力対象のファミリー（自然順）。クラス数が top-N 以下のものは除く。
pub fn reportable(families: &Families, top_n: TopN) -> impl Iterator<Item = &Family> {
    families.values().filter(move |f| f.is_reportable(top_n))
}

/// リーダーボードの1行
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub experiment: String,
    /// 百分率
    pub best_accuracy: f64,
    /// `k=5, manhattan, linear-svm` 形式
    pub run_info: String,
}

pub fn leaderboard(families: &Families, top_n: TopN) -> Vec<LeaderboardEntry> {
    reportable(families, top_n)
        .filter_map(|family| {
            let best = &family.best_overall()?.candidate;
            Some(LeaderboardEntry {
                experiment: family.name().to_owned(),
                best_accuracy: best.percent(),
                run_info: format!("k={}, {}, {}", best.k, best.distance, best.classifier),
            })
        })
        .collect()
}
