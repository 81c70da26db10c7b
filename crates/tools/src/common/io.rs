//! レポート出力先（標準出力 / ファイル / gzip）

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// レポートの書き込み先。
///
/// gzip はストリーム終端の書き込みで失敗し得るため、最後に必ず `close()` を呼ぶ。
#[must_use = "call .close() to propagate compression/IO errors"]
pub enum ReportSink {
    Stdout(io::StdoutLock<'static>),
    File(BufWriter<File>),
    Gz(flate2::write::GzEncoder<BufWriter<File>>),
}

impl Write for ReportSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            ReportSink::Stdout(s) => s.write(buf),
            ReportSink::File(f) => f.write(buf),
            ReportSink::Gz(e) => e.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            ReportSink::Stdout(s) => s.flush(),
            ReportSink::File(f) => f.flush(),
            ReportSink::Gz(e) => e.flush(),
        }
    }
}

impl ReportSink {
    /// ストリームを確定させる。
    pub fn close(self) -> io::Result<()> {
        match self {
            ReportSink::Stdout(mut s) => s.flush(),
            ReportSink::File(f) => {
                let mut file = f.into_inner().map_err(|e| e.into_error())?;
                file.flush()
            }
            ReportSink::Gz(e) => {
                let mut w = e.finish()?;
                w.flush()
            }
        }
    }
}

/// `None` または `-` は標準出力、拡張子 `.gz` は gzip 圧縮で開く。
pub fn open_report_sink(path: Option<&Path>) -> io::Result<ReportSink> {
    let Some(p) = path.filter(|p| p.as_os_str() != "-") else {
        return Ok(ReportSink::Stdout(io::stdout().lock()));
    };
    let ext = p.extension().and_then(|e| e.to_str()).unwrap_or_default().to_ascii_lowercase();
    let f = BufWriter::new(File::create(p)?);
    if ext == "gz" {
        return Ok(ReportSink::Gz(flate2::write::GzEncoder::new(f, flate2::Compression::default())));
    }
    Ok(ReportSink::File(f))
}
