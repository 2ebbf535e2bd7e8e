use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;

mod console;
mod period;
mod report;
mod report_command;
mod tracker;

use console::{ConsolePlainText, ConsolePresenter};
use report_command::{ReportArgs, ReportCommand};
use tracker::TrackerClient;

const DEFAULT_TRACKER_URL: &str = "https://tracker-api.toptal.com";

/// 集計期間の作業時間レポートを取得するためのCLIアプリケーション。
///
/// # Examples
/// ```
/// $ EMAIL=user@example.com PASSWORD=secret DATE=2021-02-11 cargo run
/// $ cargo run -- --email user@example.com --password secret --date 2021-02-11 -v
/// ```
#[derive(Debug, Parser)]
#[clap(version, about)]
struct Args {
    #[clap(flatten)]
    report: ReportArgs,

    #[clap(
        long = "base-url",
        env = "TRACKER_URL",
        default_value = DEFAULT_TRACKER_URL,
        help = "Base URL of the tracker API"
    )]
    base_url: String,

    #[clap(
        short = 'v',
        long = "verbose",
        parse(from_occurrences),
        help = "Increases log verbosity (-v: info, -vv: debug)"
    )]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logger(args.verbose)?;

    let client = TrackerClient::new(&args.base_url).context("Failed to new tracker client")?;
    let mut stdout = io::stdout();
    let mut presenter = ConsolePlainText::new(&mut stdout);

    let command = ReportCommand::new(&client);
    let period_report = command.run(args.report, &mut presenter).await?;
    presenter.show_report(&period_report.report)?;

    Ok(())
}

/// ログの出力先を標準エラー出力に設定する。
///
/// 標準出力はレポートの表示にのみ利用する。
fn init_logger(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    let colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{} {}] {}",
                colors.color(record.level()),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(io::stderr())
        .apply()
        .context("Failed to initialize logger")?;

    Ok(())
}
