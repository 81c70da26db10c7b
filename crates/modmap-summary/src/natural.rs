//! 自然順ソート（"exp2" < "exp10"）

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

/// 文字列を「テキスト, 数字列, テキスト, 数字列, ...」の交互列として比較する。
///
/// 数字列は値で比較し（先頭ゼロは無視）、テキストはコードポイント順で比較する。
/// キーとして等しい場合（"a01" と "a1" など）は元の文字列で比較するため全順序になる。
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut lhs = Segments::new(a);
    let mut rhs = Segments::new(b);
    loop {
        match (lhs.next(), rhs.next()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ord = if lhs.in_digits() {
                    cmp_digits(x, y)
                } else {
                    x.cmp(y)
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

/// 数字列の値比較。桁数に上限がないよう文字列のまま比較する。
fn cmp_digits(x: &str, y: &str) -> Ordering {
    let x = x.trim_start_matches('0');
    let y = y.trim_start_matches('0');
    x.len().cmp(&y.len()).then_with(|| x.cmp(y))
}

/// 交互セグメントのイテレータ。
///
/// 常にテキストから始まる（数字始まりなら空テキストを先に返す）ので、
/// 2つの文字列の同じ位置のセグメントは必ず同じ種類になる。
struct Segments<'a> {
    rest: &'a str,
    index: usize,
    done: bool,
}

impl<'a> Segments<'a> {
    fn new(s: &'a str) -> Self {
        Self {
            rest: s,
            index: 0,
            done: false,
        }
    }

    /// 直前に返したセグメントが数字列か
    fn in_digits(&self) -> bool {
        self.index % 2 == 0
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.done {
            return None;
        }
        let want_digits = self.index % 2 == 1;
        let end = self
            .rest
            .find(|c: char| c.is_ascii_digit() != want_digits)
            .unwrap_or(self.rest.len());
        let (seg, rest) = self.rest.split_at(end);
        self.rest = rest;
        self.index += 1;
        if self.rest.is_empty() {
            self.done = true;
        }
        Some(seg)
    }
}

/// 自然順で並ぶ文字列キー（ファミリー名に使う）
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct NaturalKey(String);

impl NaturalKey {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NaturalKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl Ord for NaturalKey {
    fn cmp(&self, other: &Self) -> Ordering {
        natural_cmp(&self.0, &other.0)
    }
}

impl PartialOrd for NaturalKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for NaturalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
