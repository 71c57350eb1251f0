//! Station configuration.
//!
//! Fixed wiring and layout values are plain constants. Everything an operator
//! might reasonably want to change per build lives in [`StationConfig`].

use log::LevelFilter;

use crate::model::ClockFields;

// =============================================================================
// Serial Transport
// =============================================================================

/// Baud rate of the operator serial line.
pub const SERIAL_BAUD: u32 = 9600;

/// Longest command line the gate keeps. Further characters are dropped.
pub const MAX_COMMAND_LEN: usize = 15;

// =============================================================================
// Bus Addresses
// =============================================================================

pub const SCREEN_ADDRESS: u8 = 0x3C;
pub const BME280_ADDRESS: u8 = 0x76;
pub const DS1307_ADDRESS: u8 = 0x68;
pub const ENS160_ADDRESS: u8 = 0x53;

// =============================================================================
// Timing
// =============================================================================

/// Sleep between two refresh cycles.
pub const REFRESH_INTERVAL_MS: u32 = 500;

/// Retries after the first failed `begin` of a device.
pub const BOOT_MAX_RETRIES: u8 = 5;

/// Pause between two `begin` attempts.
pub const BOOT_RETRY_DELAY_MS: u32 = 500;

/// Seconds the boot countdown waits for operator input.
pub const GATE_COUNTDOWN_TICKS: u8 = 3;
pub const GATE_TICK_MS: u32 = 1000;

/// Poll period while the gate waits for a line.
pub const GATE_POLL_MS: u32 = 10;

// =============================================================================
// Measurement
// =============================================================================

/// Reference pressure for the altitude estimate.
pub const SEA_LEVEL_HPA: f32 = 1013.25;

// =============================================================================
// Display Layout
// =============================================================================

/// Column where every metric value starts.
pub const VALUE_COLUMN: i32 = 90;

/// Width of the area cleared before a value is redrawn.
pub const VALUE_CLEAR_WIDTH: u32 = 50;

/// Panel geometry. The earliest boards carried the 32 px tall variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelSize {
    Size128x64,
    Size128x32,
}

/// What to do with the RTC registers at boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockSync {
    /// Overwrite the clock with the configured timestamp on every boot.
    Always,
    /// Only write the timestamp when the oscillator reports it was halted.
    IfHalted,
    /// Keep whatever the battery-backed registers hold.
    Never,
}

/// Metric echo on the serial line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EchoMode {
    Off,
    /// One CSV record per refresh cycle.
    Csv,
    /// CSV record plus an `AQI` line whenever the index changed.
    CsvAndAqiChanges,
}

#[derive(Debug, Clone, Copy)]
pub struct StationConfig {
    pub refresh_interval_ms: u32,
    pub boot_max_retries: u8,
    pub boot_retry_delay_ms: u32,
    pub gate_countdown_ticks: u8,
    pub gate_tick_ms: u32,
    pub gate_poll_ms: u32,
    pub sea_level_hpa: f32,
    pub clock_sync: ClockSync,
    pub initial_time: ClockFields,
    pub echo: EchoMode,
    pub show_clock: bool,
    pub air_quality: bool,
    pub halt_on_display_failure: bool,
    pub panel: PanelSize,
    pub log_level: LevelFilter,
}

impl StationConfig {
    /// Text rows the full layout needs: the clock row, four environmental
    /// lines and three air-quality lines when enabled.
    pub fn layout_rows(&self) -> u32 {
        u32::from(self.show_clock) + 4 + if self.air_quality { 3 } else { 0 }
    }
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: REFRESH_INTERVAL_MS,
            boot_max_retries: BOOT_MAX_RETRIES,
            boot_retry_delay_ms: BOOT_RETRY_DELAY_MS,
            gate_countdown_ticks: GATE_COUNTDOWN_TICKS,
            gate_tick_ms: GATE_TICK_MS,
            gate_poll_ms: GATE_POLL_MS,
            sea_level_hpa: SEA_LEVEL_HPA,
            clock_sync: ClockSync::Always,
            // 01/01/2024 00:00:00, a Monday
            initial_time: ClockFields::new(0, 0, 0, 1, 1, 1, 2024),
            echo: EchoMode::Csv,
            show_clock: true,
            air_quality: true,
            halt_on_display_failure: false,
            panel: PanelSize::Size128x64,
            log_level: LevelFilter::Info,
        }
    }
}
