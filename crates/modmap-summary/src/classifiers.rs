//! パイプラインが実行しうる分類器の一覧

/// 「実行されなかった分類器」の判定に使う既定の分類器名
pub const KNOWN_CLASSIFIERS: &[&str] = &[
    "10-nearest-neighbors",
    "nearest-centroid-mean",
    "nearest-centroid-median",
    "logistic-regression",
    "linear-svm",
    "quadratic-svm",
    "cubic-svm",
    "sgd",
    "decision-tree",
    "random-forest",
    "adaboost",
    "gaussian-naive-bayes",
    "lda",
    "qda",
    "multilayer-perceptron",
];
