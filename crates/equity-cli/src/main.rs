//! 종목 지표 파이프라인 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # AAPL 분석 후 파일로 내보내기
//! equity analyze --ticker AAPL --output out/AAPL.json
//!
//! # 설정 파일 지정, 결과는 stdout
//! equity analyze -t 005930.KS -c config.yaml
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use equity_cli::{analyze, AnalyzeConfig};
use equity_core::{
    init_logging, ticker_span, AppConfig, ConfigOrigin, LogConfig, DEFAULT_CONFIG_PATH,
};
use equity_data::YahooMarketDataSource;
use tracing::{error, info, warn, Instrument};

#[derive(Parser)]
#[command(name = "equity")]
#[command(about = "Equity metrics CLI - 가격/재무 병합, 이동평균 크로스 감지", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 종목 데이터를 조회해 지표와 신호를 계산하고 저장/내보내기
    Analyze {
        /// 종목 코드/심볼 (예: AAPL, 005930.KS)
        #[arg(short, long)]
        ticker: String,

        /// 출력 JSON 경로 (지정하지 않으면 stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 설정 파일 경로
        #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            ticker,
            output,
            config,
        } => {
            let (settings, origin) = AppConfig::load_or_default(&config)?;

            init_logging(LogConfig::from_settings(&settings.logging))?;
            if let ConfigOrigin::Defaults { missing } = &origin {
                warn!(path = %missing.display(), "설정 파일이 없어 기본값을 사용합니다");
            }

            let source = YahooMarketDataSource::new()?
                .with_invalid_bar_policy(settings.data_settings.invalid_bar_policy);
            let analyze_config = AnalyzeConfig {
                ticker: ticker.clone(),
                output,
                settings,
            };

            match analyze(&analyze_config, &source)
                .instrument(ticker_span!("analyze", ticker))
                .await
            {
                Ok(summary) => {
                    info!(
                        ticker = %summary.ticker,
                        rows = summary.rows,
                        signals = summary.signals,
                        skipped_bars = summary.skipped_bars,
                        persisted = summary.persisted,
                        "분석 완료"
                    );
                }
                Err(e) => {
                    error!(ticker = %ticker, "Analyze failed: {:#}", e);
                    return Err(e);
                }
            }
        }
    }

    Ok(())
}
