use crate::assessment::UnitSystem;
use crate::consolidation::{PolicySpec, DEFAULT_UNMATCHED_PRIORITY};
use std::env;
use std::fmt;

/// Distinguishes runtime behavior for different stages of the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub assessment: AssessmentConfig,
    pub consolidation: ConsolidationConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let unit_system = match env::var("ASSESSMENT_UNIT_SYSTEM") {
            Ok(raw) => raw
                .parse::<UnitSystem>()
                .map_err(|_| ConfigError::InvalidUnitSystem(raw))?,
            Err(_) => UnitSystem::default(),
        };

        let strategy =
            env::var("CONSOLIDATION_STRATEGY").unwrap_or_else(|_| "priority".to_string());
        let default_priority = match env::var("CONSOLIDATION_DEFAULT_PRIORITY") {
            Ok(raw) => raw
                .trim()
                .parse::<i32>()
                .map_err(|_| ConfigError::InvalidDefaultPriority(raw))?,
            Err(_) => DEFAULT_UNMATCHED_PRIORITY,
        };

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            assessment: AssessmentConfig { unit_system },
            consolidation: ConsolidationConfig {
                strategy,
                default_priority,
            },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

/// Evaluation defaults applied when a caller does not say otherwise.
#[derive(Debug, Clone)]
pub struct AssessmentConfig {
    pub unit_system: UnitSystem,
}

/// Conflict resolution defaults.
#[derive(Debug, Clone)]
pub struct ConsolidationConfig {
    pub strategy: String,
    pub default_priority: i32,
}

impl ConsolidationConfig {
    pub fn policy_spec(&self) -> PolicySpec {
        PolicySpec::new(self.strategy.clone())
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidUnitSystem(String),
    InvalidDefaultPriority(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidUnitSystem(value) => {
                write!(f, "ASSESSMENT_UNIT_SYSTEM must be IP or SI, found '{value}'")
            }
            ConfigError::InvalidDefaultPriority(value) => write!(
                f,
                "CONSOLIDATION_DEFAULT_PRIORITY must be an integer, found '{value}'"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
