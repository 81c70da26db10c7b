//! テキスト形式のレポート出力

use std::io::{self, Write};

use super::table::{Cell, Table};
use super::{ReportOptions, leaderboard};
use crate::aggregate::Families;
use crate::family::Family;

pub const SEPARATOR_WIDTH: usize = 80;

/// 1ファミリー分のレポート（区切り線は含まない）
pub fn render_family<W: Write>(out: &mut W, family: &Family, opts: &ReportOptions<'_>) -> io::Result<()> {
    let Some(best) = family.best_overall() else {
        return Ok(());
    };

    writeln!(out)?;
    writeln!(out, "Experiment: {}", family.name())?;
    writeln!(out)?;

    let participation = family.participation(opts.known_classifiers);
    writeln!(out, "These classifiers ran every time: [{}]", participation.always.join(", "))?;
    writeln!(out, "These classifiers ran sometimes but not always: [{}]", participation.sometimes.join(", "))?;
    writeln!(out, "These classifiers did not run: [{}]", participation.never.join(", "))?;
    writeln!(out)?;

    writeln!(out, "Classes:")?;
    for (label, count) in family.class_display_order() {
        writeln!(out, "{label} ({count})")?;
    }
    writeln!(out)?;

    let c = &best.candidate;
    writeln!(out, "Best accuracy: {:.2}% (k={}, {}, {})", c.percent(), c.k, c.distance, c.classifier)?;
    writeln!(out, "Confusion matrix:")?;
    let mut matrix = Table::without_headers();
    for row in &best.confusion_matrix {
        matrix.push_row(row.iter().copied().map(Cell::number).collect());
    }
    writeln!(out, "{}", matrix.render())?;
    writeln!(out)?;

    writeln!(out, "Best classifier by k:")?;
    writeln!(out, "{}", best_by_k_table(family).render())?;
    writeln!(out)?;

    writeln!(out, "Classifiers for k={}:", c.k)?;
    writeln!(out, "{}", classifiers_at_best_k_table(family).render())?;
    writeln!(out)?;
    Ok(())
}

pub fn render_separator<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", "=".repeat(SEPARATOR_WIDTH))
}

/// ファミリー横断の最良結果一覧
pub fn render_leaderboard<W: Write>(out: &mut W, families: &Families, opts: &ReportOptions<'_>) -> io::Result<()> {
    let mut table = Table::new(["experiment", "best accuracy", "run info"]);
    for entry in leaderboard(families, opts.top_n) {
        table.push_row(vec![
            Cell::text(entry.experiment),
            Cell::Float(entry.best_accuracy),
            Cell::text(entry.run_info),
        ]);
    }
    writeln!(out)?;
    writeln!(out, "Experiment summary:")?;
    writeln!(out, "{}", table.render())?;
    writeln!(out)?;
    Ok(())
}

/// 出力対象の全ファミリーとリーダーボード（プロット無し）
pub fn render_summary<W: Write>(out: &mut W, families: &Families, opts: &ReportOptions<'_>) -> io::Result<()> {
    for family in super::reportable(families, opts.top_n) {
        render_family(out, family, opts)?;
        render_separator(out)?;
    }
    render_leaderboard(out, families, opts)
}

fn best_by_k_table(family: &Family) -> Table {
    let headers = std::iter::once("k".to_owned()).chain(
        family
            .distance_names()
            .iter()
            .flat_map(|d| [format!("{d}-accuracy"), format!("{d}-classifier")]),
    );
    let mut table = Table::new(headers);
    for &k in family.ks_seen() {
        let mut row = vec![Cell::Int(i64::from(k))];
        for distance in family.distance_names() {
            match family.best_for(distance, k) {
                Some(best) => {
                    row.push(Cell::Float(best.percent()));
                    row.push(Cell::text(best.classifier.clone()));
                }
                None => {
                    row.push(Cell::na());
                    row.push(Cell::na());
                }
            }
        }
        table.push_row(row);
    }
    table
}

fn classifiers_at_best_k_table(family: &Family) -> Table {
    let snapshot = family.best_classifiers_snapshot();
    let headers = std::iter::once("classifier".to_owned()).chain(family.distance_names().iter().cloned());
    let mut table = Table::new(headers);
    let classifiers: std::collections::BTreeSet<&String> = snapshot.values().flat_map(|m| m.keys()).collect();
    for classifier in classifiers {
        let mut row = vec![Cell::text(classifier.clone())];
        for distance in family.distance_names() {
            match snapshot.get(distance).and_then(|m| m.get(classifier)) {
                Some(acc) => row.push(Cell::Float(acc * 100.0)),
                None => row.push(Cell::na()),
            }
        }
        table.push_row(row);
    }
    table
}
