use thiserror::Error;

use super::ResourceType;

const BINARY_UNITS: [(&str, u32); 6] = [("Ei", 6), ("Pi", 5), ("Ti", 4), ("Gi", 3), ("Mi", 2), ("Ki", 1)];
const DECIMAL_UNITS: [(&str, i32); 6] = [("E", 18), ("P", 15), ("T", 12), ("G", 9), ("M", 6), ("k", 3)];

#[derive(Error, Debug, PartialEq)]
pub enum QuantityError {
    #[error("empty quantity")]
    Empty,
    #[error("invalid quantity {0}")]
    Invalid(String),
}

/// Renders a numeric value the way the API server expects it for the given resource.
///
/// CPU is expressed in cores and rendered as truncated millicores. Memory is expressed in bytes and
/// rendered with the largest binary suffix that represents it exactly.
pub fn format(resource_type: &ResourceType, value: f64) -> String {
    match resource_type {
        ResourceType::Cpu => format!("{}m", (value * 1000.0).trunc() as i64),
        ResourceType::Memory => format_bytes(value),
        ResourceType::Other(_) => value.to_string(),
    }
}

fn format_bytes(value: f64) -> String {
    if !value.is_finite() || value <= 0.0 {
        return "0".to_owned();
    }
    let bytes = value.ceil() as u64;
    for (suffix, power) in BINARY_UNITS {
        let unit = 1024_u64.pow(power);
        if bytes % unit == 0 {
            return format!("{}{suffix}", bytes / unit);
        }
    }
    bytes.to_string()
}

pub fn parse_quantity(quantity: &str) -> Result<f64, QuantityError> {
    let quantity = quantity.trim();
    if quantity.is_empty() {
        return Err(QuantityError::Empty);
    }

    let value = parse_scaled(quantity).ok_or_else(|| QuantityError::Invalid(quantity.to_owned()))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(QuantityError::Invalid(quantity.to_owned()))
    }
}

fn parse_scaled(quantity: &str) -> Option<f64> {
    let number = |digits: &str| digits.parse::<f64>().ok();

    for (suffix, power) in BINARY_UNITS {
        if let Some(digits) = quantity.strip_suffix(suffix) {
            return number(digits).map(|value| value * 1024_f64.powi(power as i32));
        }
    }
    for (suffix, exponent) in DECIMAL_UNITS {
        if let Some(digits) = quantity.strip_suffix(suffix) {
            return number(digits).map(|value| value * 10_f64.powi(exponent));
        }
    }
    if let Some(digits) = quantity.strip_suffix('m') {
        return number(digits).map(|value| value / 1000.0);
    }
    number(quantity)
}
