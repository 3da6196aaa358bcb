use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::club::dates;

/// Validierungsregeln für Eingabefelder
pub const MIN_DISTANCE_KM: f64 = 0.1;
pub const MAX_DISTANCE_KM: f64 = 100.0;
pub const MIN_NAME_LEN: usize = 1;
pub const MAX_NAME_LEN: usize = 50;

static PACE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,2}:\d{2}$").expect("valid pace pattern"));
static TIME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{2}:\d{2}$").expect("valid time pattern"));

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("name must be between {MIN_NAME_LEN} and {MAX_NAME_LEN} characters")]
    Name,
    #[error("distance must be between {MIN_DISTANCE_KM} and {MAX_DISTANCE_KM} km")]
    Distance,
    #[error("pace must be in M:SS format")]
    Pace,
    #[error("date must be a valid YYYY-MM-DD date")]
    Date,
    #[error("time must be in HH:MM format")]
    Time,
    #[error("title must not be empty")]
    Title,
    #[error("target distance must be positive")]
    TargetKm,
    #[error("reward must not be empty")]
    Reward,
}

pub fn member_name(name: &str) -> Result<(), ValidationError> {
    let len = name.trim().chars().count();
    if (MIN_NAME_LEN..=MAX_NAME_LEN).contains(&len) {
        Ok(())
    } else {
        Err(ValidationError::Name)
    }
}

pub fn distance(km: f64) -> Result<(), ValidationError> {
    if km.is_finite() && (MIN_DISTANCE_KM..=MAX_DISTANCE_KM).contains(&km) {
        Ok(())
    } else {
        Err(ValidationError::Distance)
    }
}

pub fn pace(pace: &str) -> Result<(), ValidationError> {
    if PACE_PATTERN.is_match(pace) {
        Ok(())
    } else {
        Err(ValidationError::Pace)
    }
}

pub fn date(date: &str) -> Result<(), ValidationError> {
    if dates::parse_date(date).is_some() {
        Ok(())
    } else {
        Err(ValidationError::Date)
    }
}

pub fn time(time: &str) -> Result<(), ValidationError> {
    if TIME_PATTERN.is_match(time) {
        Ok(())
    } else {
        Err(ValidationError::Time)
    }
}

pub fn title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        Err(ValidationError::Title)
    } else {
        Ok(())
    }
}

pub fn target_km(km: f64) -> Result<(), ValidationError> {
    if km.is_finite() && km > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::TargetKm)
    }
}

pub fn reward(reward: &str) -> Result<(), ValidationError> {
    if reward.trim().is_empty() {
        Err(ValidationError::Reward)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_length_bounds() {
        assert!(member_name("김철수").is_ok());
        assert!(member_name("").is_err());
        assert!(member_name("   ").is_err());
        assert!(member_name(&"x".repeat(51)).is_err());
        assert!(member_name(&"x".repeat(50)).is_ok());
    }

    #[test]
    fn distance_bounds() {
        assert!(distance(5.2).is_ok());
        assert!(distance(0.1).is_ok());
        assert!(distance(100.0).is_ok());
        assert!(distance(0.05).is_err());
        assert!(distance(150.0).is_err());
        assert!(distance(f64::NAN).is_err());
    }

    #[test]
    fn pace_format() {
        assert!(pace("5:30").is_ok());
        assert!(pace("12:05").is_ok());
        assert!(pace("5:3").is_err());
        assert!(pace("fast").is_err());
    }

    #[test]
    fn date_format() {
        assert!(date("2025-03-15").is_ok());
        assert!(date("2025-02-30").is_err());
        assert!(date("15.03.2025").is_err());
    }

    #[test]
    fn time_format() {
        assert!(time("06:30").is_ok());
        assert!(time("6:30").is_err());
        assert!(time("25:99").is_ok()); // shape check only
    }
}
