use serde::Serialize;
use std::io::{self, Write};

use crate::config::{OutputFormat, ReportLevel};
use crate::models::{Entry, Status};

/// 输出器 - 把比较记录按格式写到输出流
pub struct Reporter<W: Write> {
    out: W,
    format: OutputFormat,
    level: ReportLevel,
    written: usize,
}

/// JSON 行格式
#[derive(Debug, Serialize)]
struct JsonEntry<'a> {
    status: Status,
    path: &'a str,
    is_dir: bool,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, format: OutputFormat, level: ReportLevel) -> Self {
        Self {
            out,
            format,
            level,
            written: 0,
        }
    }

    /// 输出一条记录；不在报告级别内的记录被忽略
    pub fn report(&mut self, entry: &Entry) -> io::Result<()> {
        if !self.level.includes(entry.status) {
            return Ok(());
        }

        match self.format {
            OutputFormat::Text => writeln!(self.out, "{}", entry)?,
            OutputFormat::Json => {
                let path = entry.display_path();
                let line = JsonEntry {
                    status: entry.status,
                    path: &path,
                    is_dir: entry.is_dir,
                };
                serde_json::to_writer(&mut self.out, &line)?;
                writeln!(self.out)?;
            }
        }

        self.written += 1;
        Ok(())
    }

    /// 已输出的行数
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn finish(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RelativePath;
    use std::path::{Path, MAIN_SEPARATOR};

    fn entries() -> Vec<Entry> {
        vec![
            Entry::file(Status::Ok, RelativePath::from_stripped(Path::new("ok.txt"))),
            Entry::file(Status::Newer, RelativePath::from_stripped(Path::new("newer.txt"))),
            Entry::file(Status::Changed, RelativePath::from_stripped(Path::new("a.txt"))),
            Entry::missing_dir(RelativePath::from_stripped(Path::new("sub"))),
        ]
    }

    fn render(format: OutputFormat, level: ReportLevel) -> String {
        let mut reporter = Reporter::new(Vec::new(), format, level);
        for entry in entries() {
            reporter.report(&entry).unwrap();
        }
        String::from_utf8(reporter.finish().unwrap()).unwrap()
    }

    #[test]
    fn test_text_issues_only() {
        let expected = format!("CHA\t{sep}a.txt\nMIS\t{sep}sub{sep}\n", sep = MAIN_SEPARATOR);
        assert_eq!(render(OutputFormat::Text, ReportLevel::Issues), expected);
    }

    #[test]
    fn test_text_all_levels() {
        let output = render(OutputFormat::Text, ReportLevel::All);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], format!("OK \t{}ok.txt", MAIN_SEPARATOR));
        assert_eq!(lines[1], format!("OKN\t{}newer.txt", MAIN_SEPARATOR));

        let newer = render(OutputFormat::Text, ReportLevel::Newer);
        assert_eq!(newer.lines().count(), 3);
    }

    #[test]
    fn test_written_counts_reported_lines() {
        let mut reporter = Reporter::new(Vec::new(), OutputFormat::Text, ReportLevel::Newer);
        for entry in entries() {
            reporter.report(&entry).unwrap();
        }
        // OK 不在 Newer 级别内
        assert_eq!(reporter.written(), 3);
    }

    #[test]
    fn test_json_lines() {
        let output = render(OutputFormat::Json, ReportLevel::Issues);
        let lines: Vec<serde_json::Value> = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["status"], "CHA");
        assert_eq!(lines[0]["is_dir"], false);
        assert_eq!(lines[1]["status"], "MIS");
        assert_eq!(lines[1]["path"], format!("{sep}sub{sep}", sep = MAIN_SEPARATOR));
        assert_eq!(lines[1]["is_dir"], true);
    }
}
