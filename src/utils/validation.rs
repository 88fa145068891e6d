use crate::utils::error::{LocationError, PayloadStorageError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// 將定位字串解析為可傳輸的絕對 URL。
///
/// 除了 URL 語法之外也檢查 scheme：傳輸層只會發出 HTTP 請求，
/// `ftp://`、`s3://` 等其他 scheme 無法服務，因此在連線前就以 `InvalidLocation` 拒絕。
pub fn parse_location(location: &str) -> Result<Url> {
    let invalid = |reason: LocationError| PayloadStorageError::InvalidLocation {
        location: location.to_string(),
        reason,
    };

    let url = Url::parse(location).map_err(|e| invalid(e.into()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(invalid(LocationError::UnsupportedScheme(scheme.to_string()))),
    }
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(PayloadStorageError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(PayloadStorageError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}
