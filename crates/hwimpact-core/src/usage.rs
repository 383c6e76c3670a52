//! Usage pattern of a device

use crate::attribute::{Attr, AttributeValue};
use serde::{Deserialize, Serialize};

/// A share of the use time spent at one load level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkloadTime {
    /// Percentage of the use time, 0..=100
    pub time_percentage: f64,
    /// Percentage of the maximum power draw, 0..=100
    pub load_percentage: f64,
}

/// Where and how long a device is used
///
/// `time_workload` is a percentage of the maximum power draw; `use_time_ratio`
/// is the share of each hour the device is powered on. When `workload_time`
/// lists periods, their time-weighted load replaces `time_workload`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageConfiguration {
    /// Country or region code of the electrical mix
    #[serde(default)]
    pub usage_location: Attr<String>,
    #[serde(default)]
    pub hours_life_time: Attr<f64>,
    #[serde(default)]
    pub use_time_ratio: Attr<f64>,
    #[serde(default)]
    pub time_workload: Attr<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub workload_time: Vec<WorkloadTime>,
    /// Measured average power, W. Replaces the component power model.
    #[serde(default)]
    pub avg_power: Attr<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archetype: Option<String>,
}

impl UsageConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.usage_location = Some(AttributeValue::input(location.into()));
        self
    }

    pub fn with_hours_life_time(mut self, hours: f64) -> Self {
        self.hours_life_time = Some(AttributeValue::input(hours));
        self
    }

    pub fn with_use_time_ratio(mut self, ratio: f64) -> Self {
        self.use_time_ratio = Some(AttributeValue::input(ratio));
        self
    }

    pub fn with_time_workload(mut self, percent: f64) -> Self {
        self.time_workload = Some(AttributeValue::input(percent));
        self
    }

    /// Add a period of `time_percentage` % of the use time at `load_percentage` %
    pub fn with_workload_time(mut self, time_percentage: f64, load_percentage: f64) -> Self {
        self.workload_time.push(WorkloadTime {
            time_percentage,
            load_percentage,
        });
        self
    }

    /// Time-weighted load of the listed periods, in percent. Time the periods
    /// do not cover counts as idle.
    pub fn weighted_workload(&self) -> Option<f64> {
        if self.workload_time.is_empty() {
            return None;
        }
        Some(
            self.workload_time
                .iter()
                .map(|p| p.time_percentage * p.load_percentage / 100.0)
                .sum(),
        )
    }

    /// Sum of the periods' time percentages
    pub fn workload_time_percentage(&self) -> f64 {
        self.workload_time.iter().map(|p| p.time_percentage).sum()
    }

    pub fn with_avg_power(mut self, watts: f64) -> Self {
        self.avg_power = Some(AttributeValue::input(watts));
        self
    }

    /// Resolved location code, if any
    pub fn location(&self) -> Option<&str> {
        self.usage_location.as_ref().map(|l| l.value.as_str())
    }
}
