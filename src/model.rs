// Model of the data read in this app

use core::fmt::{self, Write};

use heapless::{String, Vec};

/// Wall-clock registers in the RTC's native order:
/// seconds, minutes, hours, weekday, day of month, month, year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClockFields(pub [u16; 7]);

impl ClockFields {
    pub const SECONDS: usize = 0;
    pub const MINUTES: usize = 1;
    pub const HOURS: usize = 2;
    pub const WEEKDAY: usize = 3;
    pub const DAY: usize = 4;
    pub const MONTH: usize = 5;
    pub const YEAR: usize = 6;

    pub const fn new(
        seconds: u16,
        minutes: u16,
        hours: u16,
        weekday: u16,
        day: u16,
        month: u16,
        year: u16,
    ) -> Self {
        Self([seconds, minutes, hours, weekday, day, month, year])
    }

    pub fn seconds(&self) -> u16 {
        self.0[Self::SECONDS]
    }

    pub fn minutes(&self) -> u16 {
        self.0[Self::MINUTES]
    }

    pub fn hours(&self) -> u16 {
        self.0[Self::HOURS]
    }

    pub fn weekday(&self) -> u16 {
        self.0[Self::WEEKDAY]
    }

    pub fn day(&self) -> u16 {
        self.0[Self::DAY]
    }

    pub fn month(&self) -> u16 {
        self.0[Self::MONTH]
    }

    pub fn year(&self) -> u16 {
        self.0[Self::YEAR]
    }

    /// `HH:MM:SS`
    pub fn time_string(&self) -> String<8> {
        let mut out = String::new();
        let _ = write!(
            out,
            "{:02}:{:02}:{:02}",
            self.hours() % 100,
            self.minutes() % 100,
            self.seconds() % 100
        );
        out
    }

    /// `DD/MM/YYYY`
    pub fn date_string(&self) -> String<10> {
        let mut out = String::new();
        let _ = write!(
            out,
            "{:02}/{:02}/{:04}",
            self.day() % 100,
            self.month() % 100,
            self.year() % 10_000
        );
        out
    }
}

/// One reading of the temperature/pressure/humidity sensor.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EnvReading {
    pub temperature_c: f32,
    /// Native sensor unit (Pa).
    pub pressure_pa: f32,
    pub humidity_percent: f32,
}

impl EnvReading {
    pub fn pressure_hpa(&self) -> f32 {
        self.pressure_pa / 100.0
    }

    /// Barometric altitude against the given sea-level pressure.
    pub fn altitude_m(&self, sea_level_hpa: f32) -> f32 {
        44330.0 * (1.0 - libm::powf(self.pressure_hpa() / sea_level_hpa, 0.1903))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AirQuality {
    /// UBA air quality index, 1 (excellent) to 5 (unhealthy).
    pub aqi: u8,
    pub tvoc_ppb: u16,
    pub eco2_ppm: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatingMode {
    DeepSleep,
    Idle,
    Standard,
}

/// JEDEC identification of the serial flash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashId {
    pub manufacturer: u8,
    pub memory_type: u8,
    pub capacity: u8,
}

impl FlashId {
    pub fn from_bytes(bytes: [u8; 3]) -> Self {
        Self {
            manufacturer: bytes[0],
            memory_type: bytes[1],
            capacity: bytes[2],
        }
    }

    /// A floating bus reads back all zeros or all ones.
    pub fn is_blank(&self) -> bool {
        let raw = [self.manufacturer, self.memory_type, self.capacity];
        raw == [0x00; 3] || raw == [0xFF; 3]
    }

    /// Size in bytes encoded by the capacity code (2^n).
    pub fn capacity_bytes(&self) -> Option<u32> {
        if self.is_blank() || self.capacity >= 32 {
            None
        } else {
            Some(1u32 << self.capacity)
        }
    }
}

/// Fits `-f32::MAX` printed with two decimals.
pub const VALUE_LEN: usize = 48;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    Float(f32),
    Int(u32),
}

impl fmt::Display for MetricValue {
    /// Floats print with up to two decimals and never fewer than one.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            MetricValue::Int(value) => write!(f, "{}", value),
            MetricValue::Float(value) => {
                let value = if libm::roundf(value * 100.0) == 0.0 { 0.0 } else { value };
                let mut text: String<VALUE_LEN> = String::new();
                write!(text, "{:.2}", value).map_err(|_| fmt::Error)?;
                while text.ends_with('0') && !text.as_str()[..text.len() - 1].ends_with('.') {
                    text.pop();
                }
                f.write_str(&text)
            }
        }
    }
}

/// A label and the value drawn next to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricLine {
    pub label: &'static str,
    pub value: MetricValue,
}

impl MetricLine {
    pub const fn float(label: &'static str, value: f32) -> Self {
        Self {
            label,
            value: MetricValue::Float(value),
        }
    }

    pub const fn int(label: &'static str, value: u32) -> Self {
        Self {
            label,
            value: MetricValue::Int(value),
        }
    }

    pub fn value_string(&self) -> String<VALUE_LEN> {
        let mut out = String::new();
        let _ = write!(out, "{}", self.value);
        out
    }

    /// `label value`, as read off the panel.
    pub fn text(&self) -> String<64> {
        let mut out = String::new();
        let _ = write!(out, "{} {}", self.label, self.value);
        out
    }
}

pub const MAX_METRIC_LINES: usize = 7;

/// Everything one refresh cycle shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    pub time: Option<ClockFields>,
    pub environment: EnvReading,
    pub air_quality: Option<AirQuality>,
    pub sea_level_hpa: f32,
}

impl Snapshot {
    pub fn altitude_m(&self) -> f32 {
        self.environment.altitude_m(self.sea_level_hpa)
    }

    pub fn metric_lines(&self) -> Vec<MetricLine, MAX_METRIC_LINES> {
        let env = &self.environment;
        let mut lines = Vec::new();
        let _ = lines.push(MetricLine::float("Temp[C]:", env.temperature_c));
        let _ = lines.push(MetricLine::float("Pre[hPa]:", env.pressure_hpa()));
        let _ = lines.push(MetricLine::float("Alt[m]:", self.altitude_m()));
        let _ = lines.push(MetricLine::float("Hum[%]:", env.humidity_percent));

        if let Some(air) = self.air_quality {
            let _ = lines.push(MetricLine::int("AQI[-]:", air.aqi.into()));
            let _ = lines.push(MetricLine::int("TVOC[ppb]:", air.tvoc_ppb.into()));
            let _ = lines.push(MetricLine::int("ECO2[ppm]:", air.eco2_ppm.into()));
        }

        lines
    }
}
