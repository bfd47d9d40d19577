use crate::*;
use regex::Regex;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ValidationError {
    #[error("Brokerage name is required")]
    MissingBrokerageName,

    #[error("Invalid version format: {0}. Must be in format X.Y.Z (e.g., 1.0.0)")]
    InvalidVersionFormat(String),

    #[error("trading.max_order_quantity must be a positive integer")]
    InvalidMaxOrderQuantity,

    #[error("trading.price_tick must be a positive number, got: {0}")]
    InvalidPriceTick(f64),

    #[error("fees.{field} must be non-negative, got: {value}")]
    NegativeFeeRate { field: String, value: f64 },

    #[error("matching.event_channel_capacity must be a positive integer")]
    InvalidChannelCapacity,

    #[error("Unresolved environment variable in field '{field}'")]
    UnresolvedEnvVar { field: String },
}

#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, field: &str, message: &str) {
        self.warnings.push(ValidationWarning {
            field: field.to_string(),
            message: message.to_string(),
        });
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

pub fn validate_config(config: &BrokerageConfig) -> ValidationReport {
    let mut report = ValidationReport::new();

    validate_brokerage(&config.brokerage, &mut report);
    validate_trading(&config.trading, &mut report);
    validate_fees(&config.fees, &mut report);
    validate_matching(&config.matching, &mut report);

    report
}

fn validate_brokerage(info: &BrokerageInfo, report: &mut ValidationReport) {
    if info.name.is_empty() {
        report.add_error(ValidationError::MissingBrokerageName);
    }

    if has_unresolved_env_vars(&info.name) {
        report.add_error(ValidationError::UnresolvedEnvVar {
            field: "brokerage.name".to_string(),
        });
    }

    let version_regex = Regex::new(r"^\d+\.\d+\.\d+$").unwrap();
    if !version_regex.is_match(&info.version) {
        report.add_error(ValidationError::InvalidVersionFormat(info.version.clone()));
    }
}

fn validate_trading(trading: &TradingConfig, report: &mut ValidationReport) {
    if trading.max_order_quantity == 0 {
        report.add_error(ValidationError::InvalidMaxOrderQuantity);
    }

    if trading.price_tick <= 0.0 || !trading.price_tick.is_finite() {
        report.add_error(ValidationError::InvalidPriceTick(trading.price_tick));
    }
}

fn validate_fees(fees: &FeeConfig, report: &mut ValidationReport) {
    for (field, value) in [
        ("commission_rate", fees.commission_rate),
        ("commission_min", fees.commission_min),
        ("sell_tax_rate", fees.sell_tax_rate),
    ] {
        if value < 0.0 || !value.is_finite() {
            report.add_error(ValidationError::NegativeFeeRate {
                field: field.to_string(),
                value,
            });
        }
    }

    if fees.commission_min == 0.0 {
        report.add_warning(
            "fees.commission_min",
            "Commission floor of zero means tiny trades settle without a minimum charge",
        );
    }
}

fn validate_matching(matching: &MatchingConfig, report: &mut ValidationReport) {
    if matching.event_channel_capacity == 0 {
        report.add_error(ValidationError::InvalidChannelCapacity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = generate_default_config();
        let report = validate_config(&config);
        assert!(report.is_valid(), "errors: {:?}", report.errors);
    }

    #[test]
    fn test_negative_rate_rejected() {
        let mut config = generate_default_config();
        config.fees.sell_tax_rate = -0.1;

        let report = validate_config(&config);
        assert!(!report.is_valid());
        assert!(report
            .errors
            .iter()
            .any(|e| matches!(e, ValidationError::NegativeFeeRate { .. })));
    }

    #[test]
    fn test_zero_commission_floor_warns() {
        let mut config = generate_default_config();
        config.fees.commission_min = 0.0;

        let report = validate_config(&config);
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_bad_version_rejected() {
        let mut config = generate_default_config();
        config.brokerage.version = "one".to_string();

        let report = validate_config(&config);
        assert!(!report.is_valid());
    }
}
