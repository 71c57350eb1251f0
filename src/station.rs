//! The station context: every device handle plus the state that survives
//! from boot into the refresh loop.

use embedded_hal::delay::DelayNs;

use crate::config::StationConfig;
use crate::display::Console;
use crate::refresh::RefreshState;
use crate::traits::{AirQualitySensor, Clock, EnvironmentSensor, FlashMemory, Panel, SerialPort};

/// Borrowed device handles. The board owns the drivers; the station only
/// drives them.
pub struct Devices<'a> {
    pub clock: &'a mut dyn Clock,
    pub panel: &'a mut dyn Panel,
    pub environment: &'a mut dyn EnvironmentSensor,
    pub air_quality: &'a mut dyn AirQualitySensor,
    pub flash: &'a mut dyn FlashMemory,
    pub serial: &'a mut dyn SerialPort,
    pub delay: &'a mut dyn DelayNs,
}

/// Outcome of a device's bounded `begin` loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceStatus {
    Ready { attempts: u16 },
    /// Every attempt failed; the device is still polled, its values are
    /// whatever it returns.
    Unavailable { attempts: u16 },
    /// Switched off in the configuration, never touched.
    Disabled,
}

impl DeviceStatus {
    pub fn is_ready(self) -> bool {
        matches!(self, DeviceStatus::Ready { .. })
    }
}

pub struct Station<'a> {
    pub(crate) devices: Devices<'a>,
    pub(crate) config: StationConfig,
    pub(crate) console: Console,
    pub(crate) state: RefreshState,
}

impl<'a> Station<'a> {
    pub fn new(devices: Devices<'a>, config: StationConfig) -> Self {
        Self {
            devices,
            config,
            console: Console::new(),
            state: RefreshState::default(),
        }
    }
}
