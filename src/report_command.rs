use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::info;

use crate::console::ConsolePresenter;
use crate::period::ReportPeriod;
use crate::report::PeriodReport;
use crate::tracker::{Credentials, TrackerRepository};

/// 集計期間のレポートを出力するための引数。
#[derive(Debug, clap::Args)]
pub struct ReportArgs {
    #[clap(long = "email", env = "EMAIL", help = "Email address used to sign in")]
    email: String,

    #[clap(
        long = "password",
        env = "PASSWORD",
        hide_env_values = true,
        help = "Password used to sign in"
    )]
    password: String,

    #[clap(
        short = 'd',
        long = "date",
        env = "DATE",
        help = "Date in the format YYYY-MM-DD whose pay period is reported",
        parse(try_from_str = parse_date),
    )]
    date: NaiveDate,
}

impl ReportArgs {
    fn credentials(&self) -> Credentials {
        Credentials {
            email: self.email.clone(),
            password: self.password.clone(),
        }
    }
}

pub struct ReportCommand<'a, T: TrackerRepository> {
    tracker: &'a T,
}

impl<'a, T: TrackerRepository> ReportCommand<'a, T> {
    /// 新しい`ReportCommand`を返す。
    ///
    /// # Arguments
    /// * `tracker` - Tracker APIと通信するためのリポジトリ
    pub fn new(tracker: &'a T) -> Self {
        Self { tracker }
    }

    /// 指定された日付を含む集計期間のレポートを取得する。
    ///
    /// 認証、フィルタ取得、集計期間の算出、レポート取得の順に実行し、
    /// いずれかが失敗した時点でエラーを返す。
    /// 集計期間はレポート取得の前に表示する。
    ///
    /// # Arguments
    ///
    /// * `args` - 認証情報と基準日
    /// * `presenter` - 集計期間を表示するためのpresenter
    pub async fn run<P: ConsolePresenter>(
        &self,
        args: ReportArgs,
        presenter: &mut P,
    ) -> Result<PeriodReport> {
        let token = self
            .tracker
            .authenticate(&args.credentials())
            .await
            .context("Failed to get access token")?;
        info!("Access token retrieved successfully.");

        let filters = self
            .tracker
            .read_filters(&token)
            .await
            .context("Failed to retrieve filters")?;

        let period = ReportPeriod::resolve(args.date)
            .with_context(|| format!("Failed to resolve period for {}", args.date))?;
        info!("Start date: {}, End date: {}", period.start, period.end);
        presenter
            .show_period(&period)
            .context("Failed to show period")?;

        let report = self
            .tracker
            .read_report(&token, &filters, &period)
            .await
            .with_context(|| format!("Failed to retrieve report for {}", period))?;
        info!("Report retrieved successfully.");

        Ok(PeriodReport { period, report })
    }
}

/// 日付をパースする。
fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Failed to parse date: {}", s))
}
