use crate::period::ReportPeriod;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// 日付ごとの作業時間。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DateEntry {
    pub date: String,
    pub seconds: i64,
}

/// プロジェクトまたはワーカー。
///
/// `dates`はレポートのプロジェクト別内訳でのみ利用する。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entity {
    pub id: i64,
    pub label: String,
    pub dates: Vec<DateEntry>,
}

/// ユーザーが参照可能なプロジェクトとワーカーの一覧。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterSet {
    pub projects: Vec<Entity>,
    pub workers: Vec<Entity>,
}

/// 集計期間の作業時間レポート。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Report {
    pub total_seconds: i64,
    pub projects: Vec<Entity>,
}

impl Report {
    /// 合計時間を時間単位で返す。
    pub fn total_hours(&self) -> f64 {
        self.total_seconds as f64 / SECONDS_PER_HOUR
    }

    /// 合計時間を時間単位で切り捨てて返す。
    pub fn floor_hours(&self) -> f64 {
        self.total_hours().floor()
    }
}

/// 集計期間とその期間のレポートの組。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeriodReport {
    pub period: ReportPeriod,
    pub report: Report,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::Report;

    #[rstest]
    #[case::zero(0, 0.0, 0.0)]
    #[case::exact_hour(7200, 2.0, 2.0)]
    #[case::half_hour(5400, 1.5, 1.0)]
    #[case::just_under_hour(3599, 3599.0 / 3600.0, 0.0)]
    fn test_hours(#[case] total_seconds: i64, #[case] total: f64, #[case] floor: f64) {
        let report = Report {
            total_seconds,
            projects: vec![],
        };

        assert_eq!(report.total_hours(), total);
        assert_eq!(report.floor_hours(), floor);
    }
}
