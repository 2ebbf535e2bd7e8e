use std::fmt;

use anyhow::{Context, Result};
use chrono::{Datelike, Months, NaiveDate};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// レポートの集計期間。
///
/// 期間は「当月10日〜当月24日」または「当月25日〜翌月9日」のいずれかになる。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReportPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReportPeriod {
    /// 指定された日付が含まれる集計期間を返す。
    ///
    /// - 10日〜24日: 当月10日〜当月24日
    /// - 1日〜9日: 前月25日〜当月9日
    /// - 25日〜月末: 当月25日〜翌月9日
    ///
    /// 月の加減算で年を跨ぐ場合は年も合わせて繰り上げ・繰り下げる。
    ///
    /// # Arguments
    ///
    /// * `date` - 集計期間を求める基準日
    ///
    /// # Examples
    ///
    /// ```
    /// let date = NaiveDate::from_ymd_opt(2021, 1, 5).unwrap();
    /// let period = ReportPeriod::resolve(date).unwrap();
    /// assert_eq!(period.start_date(), "2020-12-25");
    /// assert_eq!(period.end_date(), "2021-01-09");
    /// ```
    pub fn resolve(date: NaiveDate) -> Result<Self> {
        let (start, end) = match date.day() {
            10..=24 => (
                date.with_day(10).context("Failed to set day")?,
                date.with_day(24).context("Failed to set day")?,
            ),
            1..=9 => (
                date.with_day(25)
                    .context("Failed to set day")?
                    .checked_sub_months(Months::new(1))
                    .context("Failed to subtract month")?,
                date.with_day(9).context("Failed to set day")?,
            ),
            _ => (
                date.with_day(25).context("Failed to set day")?,
                date.with_day(9)
                    .context("Failed to set day")?
                    .checked_add_months(Months::new(1))
                    .context("Failed to add month")?,
            ),
        };

        Ok(Self { start, end })
    }

    /// 開始日を`YYYY-MM-DD`形式で返す。
    pub fn start_date(&self) -> String {
        self.start.format(DATE_FORMAT).to_string()
    }

    /// 終了日を`YYYY-MM-DD`形式で返す。
    pub fn end_date(&self) -> String {
        self.end.format(DATE_FORMAT).to_string()
    }
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.start_date(), self.end_date())
    }
}
