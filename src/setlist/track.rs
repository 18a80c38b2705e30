//! Track and target duration types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SetlistError};

const SECONDS_PER_HOUR: f64 = 3600.0;

/// A playable track as seen by the fitter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Display name, e.g. "Song - Artist A, Artist B"
    pub name: String,
    /// Length in whole seconds
    pub duration_secs: u64,
    /// Cover image URL, if the source has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Track {
    pub fn new(name: impl Into<String>, duration_secs: u64, image_url: Option<String>) -> Self {
        Self {
            name: name.into(),
            duration_secs,
            image_url: image_url.filter(|u| !u.is_empty()),
        }
    }
}

/// Desired total playback time, always positive and finite
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetDuration {
    hours: f64,
}

impl TargetDuration {
    /// Validate a target given in hours
    pub fn from_hours(hours: f64) -> Result<Self> {
        if !hours.is_finite() || hours <= 0.0 {
            return Err(SetlistError::InvalidTarget(format!(
                "expected a positive number of hours, got {}",
                hours
            )));
        }
        Ok(Self { hours })
    }

    pub fn hours(&self) -> f64 {
        self.hours
    }

    /// Target in seconds (may be fractional)
    pub fn as_seconds(&self) -> f64 {
        self.hours * SECONDS_PER_HOUR
    }
}

impl FromStr for TargetDuration {
    type Err = SetlistError;

    fn from_str(s: &str) -> Result<Self> {
        let hours: f64 = s
            .trim()
            .parse()
            .map_err(|_| SetlistError::InvalidTarget(format!("'{}' is not a number", s)))?;
        Self::from_hours(hours)
    }
}

impl fmt::Display for TargetDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hours = format!("{:.2}", self.hours);
        let hours = hours.trim_end_matches('0').trim_end_matches('.');
        write!(f, "{}h", hours)
    }
}
