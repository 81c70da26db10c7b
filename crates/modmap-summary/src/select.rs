//! 最良候補の選択規則

use serde::Serialize;

/// (k, distance, classifier) の1観測
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Candidate {
    /// 0.0〜1.0 の割合。比較は割合のまま行い、表示時のみ百分率にする。
    pub accuracy: f64,
    pub k: u32,
    pub distance: String,
    pub classifier: String,
}

impl Candidate {
    pub fn percent(&self) -> f64 {
        self.accuracy * 100.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Keep,
    Replace,
}

impl Decision {
    pub fn is_replace(self) -> bool {
        self == Decision::Replace
    }
}

/// 現在の最良候補を置き換えるかの判定規則
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionRule {
    /// 精度が高い方、同精度なら k が小さい方
    Global,
    /// 精度が真に高い場合のみ置き換える（同精度は先着優先）
    PerKDistance,
}

impl SelectionRule {
    pub fn consider(self, current: Option<&Candidate>, candidate: &Candidate) -> Decision {
        let Some(current) = current else {
            return Decision::Replace;
        };
        let better = match self {
            SelectionRule::Global => {
                candidate.accuracy > current.accuracy
                    || (candidate.accuracy == current.accuracy && candidate.k < current.k)
            }
            SelectionRule::PerKDistance => candidate.accuracy > current.accuracy,
        };
        if better {
            Decision::Replace
        } else {
            Decision::Keep
        }
    }
}
