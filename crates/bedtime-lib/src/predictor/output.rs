//! Bedtime derivation and display formatting
//!
//! Turns a predicted sleep duration into a bedtime (wake time minus the
//! prediction) and renders it as the title/message pair shown to the user.

use crate::error::PredictorError;
use crate::models::{DisplayResult, SECONDS_PER_DAY};
use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const SUCCESS_TITLE: &str = "Your ideal bedtime is...";
pub const ERROR_TITLE: &str = "Error";
pub const ERROR_MESSAGE: &str = "Sorry, there was a problem calculating your bedtime.";

/// Short time-of-day style used for the bedtime message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeStyle {
    /// `23:00`
    #[default]
    #[serde(rename = "24h")]
    TwentyFourHour,
    /// `11:00 PM`
    #[serde(rename = "12h")]
    TwelveHour,
}

impl TimeStyle {
    fn pattern(&self) -> &'static str {
        match self {
            TimeStyle::TwentyFourHour => "%H:%M",
            TimeStyle::TwelveHour => "%-I:%M %p",
        }
    }
}

impl FromStr for TimeStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "24h" | "24" => Ok(TimeStyle::TwentyFourHour),
            "12h" | "12" => Ok(TimeStyle::TwelveHour),
            other => Err(format!("unknown time style '{}', expected 24h or 12h", other)),
        }
    }
}

impl fmt::Display for TimeStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeStyle::TwentyFourHour => f.write_str("24h"),
            TimeStyle::TwelveHour => f.write_str("12h"),
        }
    }
}

/// A bedtime relative to the wake-up it was derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bedtime {
    pub time: NaiveTime,
    /// 1 when the bedtime falls on the day before the wake-up
    pub days_before_wake: i64,
}

impl Bedtime {
    pub fn format(&self, style: TimeStyle) -> String {
        self.time.format(style.pattern()).to_string()
    }
}

/// `wake - predicted_sleep_hours`, with the prediction rounded to whole seconds
pub fn derive_bedtime(wake: NaiveTime, predicted_sleep_hours: f64) -> Bedtime {
    let day = SECONDS_PER_DAY as i64;
    let wake_secs = wake.num_seconds_from_midnight() as i64;
    // float-to-int casts saturate, so absurd predictions cannot overflow here
    let sleep_secs = (predicted_sleep_hours * 3600.0).round() as i64;
    let bed_secs = wake_secs.saturating_sub(sleep_secs);

    let time = NaiveTime::from_num_seconds_from_midnight_opt(bed_secs.rem_euclid(day) as u32, 0)
        .unwrap_or_default();

    Bedtime {
        time,
        days_before_wake: -bed_secs.div_euclid(day),
    }
}

impl DisplayResult {
    pub fn bedtime(bedtime: &Bedtime, style: TimeStyle) -> Self {
        Self {
            title: SUCCESS_TITLE.to_string(),
            message: bedtime.format(style),
        }
    }

    /// The one message shown for every failure cause
    pub fn error() -> Self {
        Self {
            title: ERROR_TITLE.to_string(),
            message: ERROR_MESSAGE.to_string(),
        }
    }

    pub fn from_result(result: &Result<Bedtime, PredictorError>, style: TimeStyle) -> Self {
        match result {
            Ok(bedtime) => Self::bedtime(bedtime, style),
            Err(_) => Self::error(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.title == ERROR_TITLE
    }
}

/// Label for a sleep amount: `1 hour`, `8.25 hours`
pub fn sleep_label(hours: f64) -> String {
    if hours == 1.0 {
        "1 hour".to_string()
    } else {
        format!("{} hours", hours)
    }
}

/// Label for a coffee amount: `1 cup`, `3 cups`
pub fn coffee_label(cups: u32) -> String {
    if cups == 1 {
        "1 cup".to_string()
    } else {
        format!("{} cups", cups)
    }
}
