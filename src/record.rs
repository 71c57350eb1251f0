//! One line of serial echo per refresh cycle, in the format the host-side
//! logger ingests: `HH:MM:SS,temp,pressure,altitude,humidity,aqi,tvoc,eco2,`

use core::fmt::Write;

use heapless::String;

use crate::model::{AirQuality, ClockFields, Snapshot};

/// Room for four floats at full `f32` range plus the time and air fields.
pub const RECORD_LEN: usize = 224;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeOfDay {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
}

impl TimeOfDay {
    pub fn from_clock(time: &ClockFields) -> Self {
        Self {
            hours: (time.hours() % 100) as u8,
            minutes: (time.minutes() % 100) as u8,
            seconds: (time.seconds() % 100) as u8,
        }
    }

    pub fn seconds_of_day(&self) -> u32 {
        u32::from(self.hours) * 3600 + u32::from(self.minutes) * 60 + u32::from(self.seconds)
    }

    /// Digits are required at positions 0, 1, 3, 4, 6 and 7; the
    /// separators are not checked.
    fn parse(field: &str) -> Option<Self> {
        let bytes = field.as_bytes();
        if bytes.len() < 8 {
            return None;
        }
        let pair = |at: usize| -> Option<u8> {
            let (tens, ones) = (bytes[at], bytes[at + 1]);
            if tens.is_ascii_digit() && ones.is_ascii_digit() {
                Some((tens - b'0') * 10 + (ones - b'0'))
            } else {
                None
            }
        };
        Some(Self {
            hours: pair(0)?,
            minutes: pair(3)?,
            seconds: pair(6)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadingRecord {
    /// `None` when the clock is not shown; printed as `--:--:--`.
    pub time: Option<TimeOfDay>,
    pub temperature_c: f32,
    pub pressure_hpa: f32,
    pub altitude_m: f32,
    pub humidity_percent: f32,
    /// `None` leaves the three air-quality fields empty.
    pub air_quality: Option<AirQuality>,
}

impl ReadingRecord {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            time: snapshot.time.as_ref().map(TimeOfDay::from_clock),
            temperature_c: snapshot.environment.temperature_c,
            pressure_hpa: snapshot.environment.pressure_hpa(),
            altitude_m: snapshot.altitude_m(),
            humidity_percent: snapshot.environment.humidity_percent,
            air_quality: snapshot.air_quality,
        }
    }

    pub fn to_line(&self) -> String<RECORD_LEN> {
        let mut line = String::new();
        let _ = match self.time {
            Some(t) => write!(line, "{:02}:{:02}:{:02},", t.hours, t.minutes, t.seconds),
            None => line.write_str("--:--:--,"),
        };
        let _ = write!(
            line,
            "{:.2},{:.2},{:.2},{:.2},",
            self.temperature_c, self.pressure_hpa, self.altitude_m, self.humidity_percent
        );
        let _ = match self.air_quality {
            Some(air) => write!(line, "{},{},{},", air.aqi, air.tvoc_ppb, air.eco2_ppm),
            None => line.write_str(",,,"),
        };
        line
    }

    /// Decode a line the way the host logger does.
    ///
    /// The host strips whitespace and then always drops the last character,
    /// which is the trailing comma on a well-formed record. Returns `None`
    /// unless the time field is valid and not midnight, which the host uses
    /// as its "no timestamp" marker. Numeric fields that are missing or
    /// malformed read as zero.
    pub fn parse(line: &str) -> Option<Self> {
        let mut chars = line.trim().chars();
        chars.next_back();
        let mut fields = chars.as_str().split(',');

        let time = TimeOfDay::parse(fields.next()?)?;
        if time.seconds_of_day() == 0 {
            return None;
        }

        let mut float = || {
            fields
                .next()
                .and_then(|f| f.trim().parse::<f32>().ok())
                .unwrap_or(0.0)
        };
        let temperature_c = float();
        let pressure_hpa = float();
        let altitude_m = float();
        let humidity_percent = float();

        let rest: heapless::Vec<&str, 3> = fields.take(3).collect();
        let air_quality = if rest.iter().all(|f| f.trim().is_empty()) {
            None
        } else {
            let int = |at: usize| {
                rest.get(at)
                    .and_then(|f| f.trim().parse::<u16>().ok())
                    .unwrap_or(0)
            };
            Some(AirQuality {
                aqi: u8::try_from(int(0)).unwrap_or(0),
                tvoc_ppb: int(1),
                eco2_ppm: int(2),
            })
        };

        Some(Self {
            time: Some(time),
            temperature_c,
            pressure_hpa,
            altitude_m,
            humidity_percent,
            air_quality,
        })
    }

    /// Dedupe key used by the host: two records in the same second are one.
    pub fn seconds_of_day(&self) -> Option<u32> {
        self.time.map(|t| t.seconds_of_day())
    }
}
