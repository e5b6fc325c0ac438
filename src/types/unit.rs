use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The temperature unit every computed output is expressed in.
///
/// The archive stores degrees Celsius; a catalog is converted once at ingestion
/// and never holds mixed units afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    Celsius,
    #[default]
    Fahrenheit,
}

pub fn celsius_to_fahrenheit(value: f64) -> f64 {
    value * (9.0 / 5.0) + 32.0
}

pub fn fahrenheit_to_celsius(value: f64) -> f64 {
    (5.0 / 9.0) * (value - 32.0)
}

impl TemperatureUnit {
    pub fn symbol(self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "C",
            TemperatureUnit::Fahrenheit => "F",
        }
    }

    /// Converts `value`, expressed in `self`, into `target`. NaN stays NaN.
    pub fn convert(self, value: f64, target: TemperatureUnit) -> f64 {
        match (self, target) {
            (TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit) => celsius_to_fahrenheit(value),
            (TemperatureUnit::Fahrenheit, TemperatureUnit::Celsius) => fahrenheit_to_celsius(value),
            _ => value,
        }
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "°{}", self.symbol())
    }
}

impl FromStr for TemperatureUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "c" | "celsius" => Ok(TemperatureUnit::Celsius),
            "f" | "fahrenheit" => Ok(TemperatureUnit::Fahrenheit),
            other => Err(format!("unknown temperature unit '{other}'")),
        }
    }
}
