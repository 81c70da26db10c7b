//! 分類実験の結果集計ライブラリ
//!
//! `<family>-k=<int>` 形式のランディレクトリ群を走査し、ファミリーごとに
//! 最良の (k, distance, classifier) を選んで表形式で出力する。
//!
//! ```text
//! locate_runs → load_run → Family::observe_run → report
//! ```

pub mod aggregate;
pub mod classifiers;
pub mod error;
pub mod family;
pub mod loader;
pub mod natural;
pub mod plot;
pub mod report;
pub mod run;
pub mod select;

pub use aggregate::{Families, aggregate, fold_family, group_runs};
pub use error::{MissingField, SummaryError, SummaryResult};
pub use family::{BestRun, Family, Participation};
pub use loader::TopN;
pub use natural::{NaturalKey, natural_cmp};
pub use plot::{PlotCommand, PlotError, PlotOutcome, PlotRequest};
pub use report::ReportOptions;
pub use run::{ParseRunIdError, RunDir, RunId, locate_runs};
pub use select::{Candidate, Decision, SelectionRule};
