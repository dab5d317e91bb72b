//! 설정 관리.
//!
//! YAML 설정 파일과 `EQUITY__SECTION__KEY` 환경 변수에서 설정을 로드합니다.
//! 최상위 섹션이 없으면 해당 섹션 전체가 기본값이 되고, 섹션 안에서 빠진 키는
//! 그 키의 기본값을 사용합니다.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{EquityError, EquityResult};

/// 기본 설정 파일 경로.
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// 환경 변수 오버라이드 접두사.
const ENV_PREFIX: &str = "EQUITY";

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// 데이터베이스 설정
    pub database: DatabaseConfig,
    /// 로깅 설정
    pub logging: LoggingConfig,
    /// 데이터 수집/지표 설정
    pub data_settings: DataSettings,
}

/// 데이터베이스 설정.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite 파일 경로
    pub path: String,
    /// 저장 실패 시 실행을 중단할지 여부
    pub fail_on_error: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "financial_data.db".to_string(),
            fail_on_error: false,
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨 (대소문자 무시)
    pub level: String,
    /// 출력 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// 유효하지 않은 가격 바 처리 정책.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidBarPolicy {
    /// 실행 전체를 입력 에러로 중단
    #[default]
    Abort,
    /// 경고 후 해당 바만 제외
    Skip,
}

/// 데이터 수집 및 지표 계산 설정.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DataSettings {
    /// 조회 기간 (예: "5y", "1y", "6mo")
    pub historical_period: String,
    /// 이보다 적은 일봉이 조회되면 경고
    pub min_trading_days_for_sma: usize,
    /// 단기 이동평균 윈도우
    pub sma_short_window: usize,
    /// 장기 이동평균 윈도우
    pub sma_long_window: usize,
    /// 52주 고가 계산 윈도우 (거래일)
    pub lookback_trading_days_for_52w: usize,
    /// 최대 조회 시도 횟수
    pub max_retries: u32,
    /// 재시도 대기 기본 단위 (초)
    pub retry_backoff_secs: f64,
    /// 유효하지 않은 가격 바 처리 정책
    pub invalid_bar_policy: InvalidBarPolicy,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            historical_period: "5y".to_string(),
            min_trading_days_for_sma: 200,
            sma_short_window: 50,
            sma_long_window: 200,
            lookback_trading_days_for_52w: 252,
            max_retries: 3,
            retry_backoff_secs: 1.0,
            invalid_bar_policy: InvalidBarPolicy::Abort,
        }
    }
}

impl DataSettings {
    /// 재시도 대기 기본 단위를 `Duration`으로 반환합니다.
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_secs_f64(self.retry_backoff_secs.max(0.0))
    }
}

/// 설정을 어디서 가져왔는지 나타냅니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    /// 설정 파일에서 로드
    File(PathBuf),
    /// 파일이 없어 기본값 사용
    Defaults {
        /// 찾지 못한 파일 경로
        missing: PathBuf,
    },
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일을 읽을 수 없거나 형식이 잘못되면 에러를 반환합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> EquityResult<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).format(config::FileFormat::Yaml))
            .add_source(env_source())
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// 파일이 있으면 로드하고, 없으면 기본값(환경 변수 오버라이드 포함)을 사용합니다.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> EquityResult<(Self, ConfigOrigin)> {
        let path = path.as_ref();
        if path.exists() {
            return Ok((Self::load(path)?, ConfigOrigin::File(path.to_path_buf())));
        }

        let settings = config::Config::builder().add_source(env_source()).build()?;
        let config: Self = settings.try_deserialize()?;
        config.validate()?;

        Ok((
            config,
            ConfigOrigin::Defaults {
                missing: path.to_path_buf(),
            },
        ))
    }

    /// 설정 값의 유효성을 검사합니다.
    pub fn validate(&self) -> EquityResult<()> {
        let ds = &self.data_settings;

        let windows = [
            ("sma_short_window", ds.sma_short_window),
            ("sma_long_window", ds.sma_long_window),
            ("lookback_trading_days_for_52w", ds.lookback_trading_days_for_52w),
        ];
        for (name, value) in windows {
            if value == 0 {
                return Err(EquityError::Config(format!(
                    "data_settings.{} must be >= 1",
                    name
                )));
            }
        }

        if ds.max_retries == 0 {
            return Err(EquityError::Config(
                "data_settings.max_retries must be >= 1".to_string(),
            ));
        }

        if !ds.retry_backoff_secs.is_finite() || ds.retry_backoff_secs < 0.0 {
            return Err(EquityError::Config(format!(
                "data_settings.retry_backoff_secs must be a non-negative number, got {}",
                ds.retry_backoff_secs
            )));
        }

        if ds.historical_period.trim().is_empty() {
            return Err(EquityError::Config(
                "data_settings.historical_period must not be empty".to_string(),
            ));
        }

        if self.database.path.trim().is_empty() {
            return Err(EquityError::Config("database.path must not be empty".to_string()));
        }

        Ok(())
    }
}

fn env_source() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".yaml")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_values() {
        let config = AppConfig::default();

        assert_eq!(config.database.path, "financial_data.db");
        assert!(!config.database.fail_on_error);
        assert_eq!(config.logging.level, "INFO");
        assert_eq!(config.data_settings.historical_period, "5y");
        assert_eq!(config.data_settings.sma_short_window, 50);
        assert_eq!(config.data_settings.sma_long_window, 200);
        assert_eq!(config.data_settings.lookback_trading_days_for_52w, 252);
        assert_eq!(config.data_settings.max_retries, 3);
        assert_eq!(config.data_settings.invalid_bar_policy, InvalidBarPolicy::Abort);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let file = write_config(
            "data_settings:\n  sma_short_window: 20\n  invalid_bar_policy: skip\n",
        );
        let config = AppConfig::load(file.path()).unwrap();

        assert_eq!(config.data_settings.sma_short_window, 20);
        assert_eq!(config.data_settings.sma_long_window, 200);
        assert_eq!(config.data_settings.invalid_bar_policy, InvalidBarPolicy::Skip);
        assert_eq!(config.database, DatabaseConfig::default());
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");

        let (config, origin) = AppConfig::load_or_default(&missing).unwrap();

        assert_eq!(config.data_settings, DataSettings::default());
        assert_eq!(origin, ConfigOrigin::Defaults { missing });
    }

    #[test]
    fn test_path_without_extension_loads_as_yaml() {
        let mut file = tempfile::Builder::new()
            .suffix(".conf")
            .tempfile()
            .unwrap();
        file.write_all(b"database:\n  path: custom.db\n").unwrap();

        let config = AppConfig::load(file.path()).unwrap();

        assert_eq!(config.database.path, "custom.db");
        assert_eq!(config.data_settings, DataSettings::default());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let file = write_config("data_settings: [unclosed\n");
        assert!(AppConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_zero_window_rejected() {
        let file = write_config("data_settings:\n  sma_long_window: 0\n");
        let err = AppConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("sma_long_window"));
    }

    #[test]
    fn test_zero_retries_rejected() {
        let mut config = AppConfig::default();
        config.data_settings.max_retries = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_retry_backoff_duration() {
        let settings = DataSettings {
            retry_backoff_secs: 1.5,
            ..Default::default()
        };
        assert_eq!(settings.retry_backoff(), Duration::from_millis(1500));
    }
}
