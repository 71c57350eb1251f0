//! Power-on sequence: bring every device up with bounded retries, set the
//! clock, probe the flash and give the operator a short window to open the
//! configuration terminal.

use core::fmt::Write;

use heapless::String;

use crate::config::ClockSync;
use crate::display::TextSize;
use crate::error::{BootError, DeviceError};
use crate::gate::{self, GateOutcome};
use crate::model::{FlashId, OperatingMode};
use crate::station::{DeviceStatus, Devices, Station};

/// What boot found, for logging and the hardware self-test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootReport {
    pub clock: DeviceStatus,
    pub panel: DeviceStatus,
    pub environment: DeviceStatus,
    pub air_quality: DeviceStatus,
    pub flash: Option<FlashId>,
    /// `None` when nobody pressed a key during the countdown.
    pub gate: Option<GateOutcome>,
}

impl<'a> Station<'a> {
    pub fn boot(&mut self) -> Result<BootReport, BootError> {
        log::info!("boot: bringing up devices");

        let clock = self.begin_with_retries("clock", |d| d.clock.begin());

        let panel = self.begin_with_retries("display", |d| d.panel.begin());
        match panel {
            DeviceStatus::Unavailable { attempts } if self.config.halt_on_display_failure => {
                log::error!("display unavailable, halting");
                return Err(BootError::DisplayUnavailable { attempts });
            }
            DeviceStatus::Ready { .. } => {
                let display = &mut *self.devices.panel;
                if let Err(e) = display.clear().and_then(|_| display.flush()) {
                    log::warn!("could not blank display: {}", e);
                }
                let visible = display.size().height / TextSize::Small.line_height();
                let needed = self.config.layout_rows();
                if needed > visible {
                    log::warn!("display: {} rows fit, last {} hidden", visible, needed - visible);
                }
            }
            _ => {}
        }

        let environment = self.begin_with_retries("environment", |d| d.environment.begin());

        let air_quality = if self.config.air_quality {
            self.begin_with_retries("air quality", |d| d.air_quality.begin())
        } else {
            log::info!("air quality: disabled");
            DeviceStatus::Disabled
        };

        self.sync_clock();
        if air_quality != DeviceStatus::Disabled {
            self.configure_air_quality();
        }

        let flash = self.probe_flash();
        let gate = self.offer_gate();

        log::info!("boot: done");
        Ok(BootReport {
            clock,
            panel,
            environment,
            air_quality,
            flash,
            gate,
        })
    }

    /// Call `begin` until it succeeds or `boot_max_retries + 1` attempts
    /// have failed. Waits between attempts, never after the last one.
    fn begin_with_retries<F>(&mut self, name: &'static str, mut begin: F) -> DeviceStatus
    where
        F: FnMut(&mut Devices<'a>) -> Result<(), DeviceError>,
    {
        let max_attempts = u16::from(self.config.boot_max_retries) + 1;
        let mut attempts = 0;
        loop {
            attempts += 1;
            match begin(&mut self.devices) {
                Ok(()) => {
                    log::info!("{}: ready ({} attempt(s))", name, attempts);
                    return DeviceStatus::Ready { attempts };
                }
                Err(e) if attempts < max_attempts => {
                    log::debug!("{}: attempt {}/{} failed: {}", name, attempts, max_attempts, e);
                    self.devices.delay.delay_ms(self.config.boot_retry_delay_ms);
                }
                Err(e) => {
                    log::warn!("{}: unavailable after {} attempts: {}", name, attempts, e);
                    return DeviceStatus::Unavailable { attempts };
                }
            }
        }
    }

    fn sync_clock(&mut self) {
        let clock = &mut *self.devices.clock;

        let write = match self.config.clock_sync {
            ClockSync::Always => true,
            ClockSync::IfHalted => clock.is_halted().unwrap_or_else(|e| {
                log::warn!("clock: halt flag unreadable: {}", e);
                false
            }),
            ClockSync::Never => false,
        };

        if write {
            let time = &self.config.initial_time;
            match clock.set_time(time) {
                Ok(()) => log::info!(
                    "clock: set to {} {}",
                    time.time_string(),
                    time.date_string()
                ),
                Err(e) => log::warn!("clock: set failed: {}", e),
            }
        }

        if let Err(e) = clock.start() {
            log::warn!("clock: start failed: {}", e);
        }
    }

    /// Standard mode plus compensation from one live environmental reading.
    fn configure_air_quality(&mut self) {
        if let Err(e) = self.devices.air_quality.set_mode(OperatingMode::Standard) {
            log::warn!("air quality: mode change failed: {}", e);
        }

        match self.devices.environment.measure() {
            Ok(reading) => {
                self.state.last_environment = reading;
                if let Err(e) = self
                    .devices
                    .air_quality
                    .set_compensation(reading.temperature_c, reading.humidity_percent)
                {
                    log::warn!("air quality: compensation failed: {}", e);
                }
            }
            Err(e) => log::warn!("air quality: no reading for compensation: {}", e),
        }
    }

    fn probe_flash(&mut self) -> Option<FlashId> {
        match self.devices.flash.read_id() {
            Ok(id) if id.is_blank() => {
                log::warn!("flash: no device answered");
                None
            }
            Ok(id) => {
                log::info!(
                    "flash: manufacturer 0x{:02X}, type 0x{:02X}, capacity 0x{:02X} ({:?} bytes)",
                    id.manufacturer,
                    id.memory_type,
                    id.capacity,
                    id.capacity_bytes()
                );
                Some(id)
            }
            Err(e) => {
                log::warn!("flash: {}", e);
                None
            }
        }
    }

    /// Count down on the serial line; any byte received opens the terminal.
    /// Bytes already waiting are left for the terminal, so they start the
    /// command line.
    fn offer_gate(&mut self) -> Option<GateOutcome> {
        for remaining in (1..=self.config.gate_countdown_ticks).rev() {
            let mut prompt: String<40> = String::new();
            let _ = write!(prompt, "Press any key to configure ({})", remaining);
            let _ = self.devices.serial.write_line(&prompt);

            self.devices.delay.delay_ms(self.config.gate_tick_ms);

            if self.devices.serial.read_ready() {
                let outcome = self.run_gate();
                log::info!("terminal closed: {:?}", outcome);
                return Some(outcome);
            }
        }
        None
    }

    pub fn run_gate(&mut self) -> GateOutcome {
        gate::run(
            &mut *self.devices.serial,
            &mut *self.devices.delay,
            self.config.gate_poll_ms,
        )
    }
}
