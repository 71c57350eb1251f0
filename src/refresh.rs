//! The steady-state loop: sample every sensor, redraw the panel, echo on
//! the serial line, sleep.

use core::fmt::Write;

use embedded_graphics::pixelcolor::BinaryColor;
use heapless::String;

use crate::config::{EchoMode, VALUE_COLUMN};
use crate::display::{TextSize, render_clock_row, render_metric_line};
use crate::error::DeviceError;
use crate::model::{AirQuality, ClockFields, EnvReading, Snapshot};
use crate::record::ReadingRecord;
use crate::station::Station;

/// What carries over from one refresh cycle to the next.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RefreshState {
    pub previous_aqi: Option<u8>,
    /// Set when the last recorded AQI differs from the one before it.
    pub aqi_changed: bool,
    pub last_environment: EnvReading,
    pub last_air_quality: AirQuality,
    pub last_time: ClockFields,
}

impl RefreshState {
    /// Store this cycle's AQI and report whether it moved.
    pub fn record_aqi(&mut self, aqi: u8) -> bool {
        self.aqi_changed = self.previous_aqi != Some(aqi);
        self.previous_aqi = Some(aqi);
        self.aqi_changed
    }
}

impl Station<'_> {
    /// Read every enabled device. A failed read leaves the previous value
    /// in place (zeros before the first good one).
    pub fn sample(&mut self) -> Snapshot {
        let state = &mut self.state;

        if self.config.show_clock {
            match self.devices.clock.now() {
                Ok(time) => state.last_time = time,
                Err(e) => log::trace!("clock read failed, keeping last time: {}", e),
            }
        }

        match self.devices.environment.measure() {
            Ok(reading) => state.last_environment = reading,
            Err(e) => log::trace!("environment read failed, keeping last reading: {}", e),
        }

        if self.config.air_quality {
            match self.devices.air_quality.read() {
                Ok(air) => state.last_air_quality = air,
                Err(e) => log::trace!("air quality read failed, keeping last reading: {}", e),
            }
            state.record_aqi(state.last_air_quality.aqi);
        }

        Snapshot {
            time: self.config.show_clock.then_some(state.last_time),
            environment: state.last_environment,
            air_quality: self.config.air_quality.then_some(state.last_air_quality),
            sea_level_hpa: self.config.sea_level_hpa,
        }
    }

    /// One full iteration without the trailing sleep.
    pub fn refresh_cycle(&mut self) -> Snapshot {
        let snapshot = self.sample();

        if let Err(e) = self.render(&snapshot) {
            log::trace!("panel update failed: {}", e);
        }
        self.echo(&snapshot);
        snapshot
    }

    pub fn run_cycles(&mut self, count: u32) {
        for _ in 0..count {
            self.refresh_cycle();
            self.devices.delay.delay_ms(self.config.refresh_interval_ms);
        }
    }

    pub fn run(&mut self) -> ! {
        log::info!("refreshing every {} ms", self.config.refresh_interval_ms);
        loop {
            self.refresh_cycle();
            self.devices.delay.delay_ms(self.config.refresh_interval_ms);
        }
    }

    /// Draw as many rows as the panel holds; lines past the bottom edge are
    /// skipped.
    fn render(&mut self, snapshot: &Snapshot) -> Result<(), DeviceError> {
        let panel = &mut *self.devices.panel;
        let console = &mut self.console;

        console.set_cursor(0, 0);
        console.set_text_size(TextSize::Small);
        console.set_colors(BinaryColor::On, None);

        let mut rows = (panel.size().height / TextSize::Small.line_height()) as usize;
        if let Some(time) = snapshot.time.as_ref().filter(|_| rows > 0) {
            render_clock_row(panel, console, time)?;
            rows -= 1;
        }

        for (row, line) in snapshot.metric_lines().iter().enumerate() {
            log::debug!("{} {}", line.label, line.value);
            if row < rows {
                render_metric_line(panel, console, line, VALUE_COLUMN)?;
            }
        }

        panel.flush()
    }

    fn echo(&mut self, snapshot: &Snapshot) {
        if self.config.echo == EchoMode::Off {
            return;
        }

        let serial = &mut *self.devices.serial;
        let record = ReadingRecord::from_snapshot(snapshot);
        if let Err(e) = serial.write_line(&record.to_line()) {
            log::trace!("echo failed: {}", e);
        }

        if self.config.echo == EchoMode::CsvAndAqiChanges && self.state.aqi_changed {
            if let Some(air) = snapshot.air_quality {
                let mut line: String<16> = String::new();
                let _ = write!(line, "AQI: {}", air.aqi);
                let _ = serial.write_line(&line);
            }
        }
    }
}
