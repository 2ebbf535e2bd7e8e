use std::io::Write;

use anyhow::{Context, Result};

use crate::period::ReportPeriod;
use crate::report::Report;

/// Consoleにレポートを表示するためのtrait。
pub trait ConsolePresenter {
    /// 集計期間を表示する。
    fn show_period(&mut self, period: &ReportPeriod) -> Result<()>;

    /// レポートの合計時間とプロジェクトごとの内訳を表示する。
    ///
    /// # Arguments
    ///
    /// * `report` - 表示するレポート
    fn show_report(&mut self, report: &Report) -> Result<()>;
}

/// レポートをプレーンテキストで表示する。
pub struct ConsolePlainText<'a, W: Write> {
    writer: &'a mut W,
}

impl<'a, W: Write> ConsolePlainText<'a, W> {
    /// 新しい`ConsolePlainText`を返す。
    pub fn new(writer: &'a mut W) -> Self {
        Self { writer }
    }
}

impl<'a, W: Write> ConsolePresenter for ConsolePlainText<'a, W> {
    fn show_period(&mut self, period: &ReportPeriod) -> Result<()> {
        writeln!(self.writer, "{}", period)
            .with_context(|| format!("Failed to write period: {}", period))
    }

    // 1行目に合計秒数、切り捨てた時間、時間(小数)をそれぞれ100倍した値と並べて表示し、
    // 以降にプロジェクト名と日付ごとの秒数を表示する。
    fn show_report(&mut self, report: &Report) -> Result<()> {
        writeln!(
            self.writer,
            "{} {:.0} {:.0} {:.2} {:.2}",
            report.total_seconds,
            report.floor_hours(),
            report.floor_hours() * 100.0,
            report.total_hours(),
            report.total_hours() * 100.0
        )
        .context("Failed to write report total")?;

        for project in &report.projects {
            writeln!(self.writer, "{}", project.label)
                .with_context(|| format!("Failed to write project: {}", project.label))?;
            for date in &project.dates {
                writeln!(self.writer, "{} {}", date.date, date.seconds)
                    .with_context(|| format!("Failed to write date entry: {:?}", date))?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rstest::rstest;

    use super::ConsolePlainText;
    use super::ConsolePresenter;
    use crate::period::ReportPeriod;
    use crate::report::{DateEntry, Entity, Report};

    #[test]
    fn test_show_period() {
        let period =
            ReportPeriod::resolve(NaiveDate::from_ymd_opt(2021, 12, 26).unwrap()).unwrap();
        let mut writer = Vec::new();
        let mut presenter = ConsolePlainText::new(&mut writer);

        presenter.show_period(&period).unwrap();

        assert_eq!(String::from_utf8(writer).unwrap(), "2021-12-25 2022-01-09\n");
    }

    #[rstest]
    #[case::zero(0, "0 0 0 0.00 0.00\n")]
    #[case::half_hour(5400, "5400 1 100 1.50 150.00\n")]
    #[case::just_under_hour(3599, "3599 0 0 1.00 99.97\n")]
    #[case::many_hours(289_800, "289800 80 8000 80.50 8050.00\n")]
    fn test_show_report_total(#[case] total_seconds: i64, #[case] expected: &str) {
        let report = Report {
            total_seconds,
            projects: vec![],
        };
        let mut writer = Vec::new();
        let mut presenter = ConsolePlainText::new(&mut writer);

        presenter.show_report(&report).unwrap();

        assert_eq!(String::from_utf8(writer).unwrap(), expected);
    }

    #[test]
    fn test_show_report_projects() {
        let report = Report {
            total_seconds: 9000,
            projects: vec![
                Entity {
                    id: 1,
                    label: "project1".to_string(),
                    dates: vec![
                        DateEntry {
                            date: "2021-02-10".to_string(),
                            seconds: 3600,
                        },
                        DateEntry {
                            date: "2021-02-11".to_string(),
                            seconds: 1800,
                        },
                    ],
                },
                Entity {
                    id: 2,
                    label: "project2".to_string(),
                    dates: vec![DateEntry {
                        date: "2021-02-12".to_string(),
                        seconds: 3600,
                    }],
                },
                Entity {
                    id: 3,
                    label: "project3".to_string(),
                    dates: vec![],
                },
            ],
        };
        let mut writer = Vec::new();
        let mut presenter = ConsolePlainText::new(&mut writer);

        presenter.show_report(&report).unwrap();

        assert_eq!(
            String::from_utf8(writer).unwrap(),
            [
                "9000 2 200 2.50 250.00",
                "project1",
                "2021-02-10 3600",
                "2021-02-11 1800",
                "project2",
                "2021-02-12 3600",
                "project3",
                "",
            ]
            .join("\n")
        );
    }
}
