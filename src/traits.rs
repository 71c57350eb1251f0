//! Hardware abstraction traits
//!
//! Every device the station talks to sits behind one of these. They are
//! object safe so the [`Station`](crate::station::Station) can hold them as
//! `&mut dyn` without a generic parameter per device.

use embedded_graphics::{
    pixelcolor::BinaryColor,
    prelude::{Point, Size},
    primitives::Rectangle,
};

use crate::display::TextSize;
use crate::error::DeviceError;
use crate::model::{AirQuality, ClockFields, EnvReading, FlashId, OperatingMode};

/// Temperature, pressure and humidity sensor
pub trait EnvironmentSensor {
    /// Probe and configure the sensor
    fn begin(&mut self) -> Result<(), DeviceError>;

    /// Take one measurement
    fn measure(&mut self) -> Result<EnvReading, DeviceError>;
}

/// Metal-oxide air quality sensor
pub trait AirQualitySensor {
    fn begin(&mut self) -> Result<(), DeviceError>;

    fn set_mode(&mut self, mode: OperatingMode) -> Result<(), DeviceError>;

    /// Ambient conditions used for on-chip compensation
    fn set_compensation(&mut self, temperature_c: f32, humidity_percent: f32)
    -> Result<(), DeviceError>;

    fn read(&mut self) -> Result<AirQuality, DeviceError>;
}

/// Battery backed real-time clock
pub trait Clock {
    fn begin(&mut self) -> Result<(), DeviceError>;

    /// True when the oscillator was stopped, i.e. the time is not trustworthy
    fn is_halted(&mut self) -> Result<bool, DeviceError>;

    fn set_time(&mut self, time: &ClockFields) -> Result<(), DeviceError>;

    /// Start the oscillator
    fn start(&mut self) -> Result<(), DeviceError>;

    fn now(&mut self) -> Result<ClockFields, DeviceError>;
}

/// Serial NOR flash, only ever asked who it is
pub trait FlashMemory {
    fn read_id(&mut self) -> Result<FlashId, DeviceError>;
}

/// Byte-oriented serial line
pub trait SerialPort {
    fn write(&mut self, bytes: &[u8]) -> Result<(), DeviceError>;

    /// True when at least one byte can be read without blocking
    fn read_ready(&mut self) -> bool;

    /// Next received byte, if any
    fn read_byte(&mut self) -> Option<u8>;

    fn write_str(&mut self, text: &str) -> Result<(), DeviceError> {
        self.write(text.as_bytes())
    }

    fn write_line(&mut self, text: &str) -> Result<(), DeviceError> {
        self.write(text.as_bytes())?;
        self.write(b"\r\n")
    }
}

/// Monochrome display with an off-screen buffer
pub trait Panel {
    /// Initialize the display
    fn begin(&mut self) -> Result<(), DeviceError>;

    fn size(&self) -> Size;

    /// Clear the buffer
    fn clear(&mut self) -> Result<(), DeviceError>;

    fn fill_rect(&mut self, area: Rectangle, color: BinaryColor) -> Result<(), DeviceError>;

    /// Draw text with its top-left corner at `origin`
    fn draw_text(
        &mut self,
        text: &str,
        origin: Point,
        size: TextSize,
        foreground: BinaryColor,
        background: Option<BinaryColor>,
    ) -> Result<(), DeviceError>;

    /// Push the buffer to the physical panel
    fn flush(&mut self) -> Result<(), DeviceError>;
}
