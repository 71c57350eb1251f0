//! Host-side stand-ins for the station's devices.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use embedded_graphics::{
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::Rectangle,
};
use embedded_hal::delay::DelayNs;

use crate::config::{EchoMode, StationConfig};
use crate::display::{Framebuffer, TextSize};
use crate::error::DeviceError;
use crate::model::{AirQuality, ClockFields, EnvReading, FlashId, OperatingMode};
use crate::station::{Devices, Station};
use crate::traits::{AirQualitySensor, Clock, EnvironmentSensor, FlashMemory, Panel, SerialPort};

/// Virtual time in nanoseconds, shared between the delay and the devices.
pub type SharedTime = Rc<Cell<u64>>;

pub fn shared_time() -> SharedTime {
    Rc::new(Cell::new(0))
}

/// Names of devices in the order their `begin` was called.
pub type CallLog = Rc<RefCell<Vec<&'static str>>>;

pub fn millis(time: &SharedTime) -> u64 {
    time.get() / 1_000_000
}

/// Delay that only advances virtual time.
pub struct FakeDelay {
    pub time: SharedTime,
    pub delays_ms: Vec<u32>,
}

impl FakeDelay {
    pub fn new(time: SharedTime) -> Self {
        Self {
            time,
            delays_ms: Vec::new(),
        }
    }
}

impl DelayNs for FakeDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.time.set(self.time.get() + u64::from(ns));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delays_ms.push(ms);
        self.time.set(self.time.get() + u64::from(ms) * 1_000_000);
    }
}

/// Counts `begin` calls and fails the first `failures` of them.
#[derive(Debug, Default)]
pub struct BeginScript {
    pub failures: usize,
    pub calls: usize,
}

impl BeginScript {
    pub fn succeed_after(failures: usize) -> Self {
        Self { failures, calls: 0 }
    }

    pub fn never() -> Self {
        Self::succeed_after(usize::MAX)
    }

    fn attempt(&mut self, device: &'static str, log: &CallLog) -> Result<(), DeviceError> {
        log.borrow_mut().push(device);
        self.calls += 1;
        if self.calls > self.failures {
            Ok(())
        } else {
            Err(DeviceError::NotDetected { device })
        }
    }
}

/// 128x64 pixel buffer.
pub struct Raster {
    pixels: [[bool; 128]; 64],
    height: u32,
}

impl Raster {
    fn new(height: u32) -> Self {
        Self {
            pixels: [[false; 128]; 64],
            height,
        }
    }
}

impl OriginDimensions for Raster {
    fn size(&self) -> Size {
        Size::new(128, self.height)
    }
}

impl DrawTarget for Raster {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if (0..128).contains(&point.x) && (0..self.height as i32).contains(&point.y) {
                self.pixels[point.y as usize][point.x as usize] = color.is_on();
            }
        }
        Ok(())
    }
}

impl Framebuffer for Raster {
    fn init_panel(&mut self) -> Result<(), DeviceError> {
        Ok(())
    }

    fn flush_panel(&mut self) -> Result<(), DeviceError> {
        Ok(())
    }
}

/// Panel that rasterises like the real one and logs every call.
pub struct TestPanel {
    raster: Raster,
    ops: Vec<String>,
    pub begin: BeginScript,
    pub log: CallLog,
    pub time: SharedTime,
    pub flushes_ms: Vec<u64>,
}

impl TestPanel {
    pub fn new() -> Self {
        Self::with_time(shared_time())
    }

    pub fn with_time(time: SharedTime) -> Self {
        Self::with_height(time, 64)
    }

    /// A 128 px wide panel `height` px tall, at most 64.
    pub fn with_height(time: SharedTime, height: u32) -> Self {
        Self {
            raster: Raster::new(height.min(64)),
            ops: Vec::new(),
            begin: BeginScript::default(),
            log: CallLog::default(),
            time,
            flushes_ms: Vec::new(),
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.raster.pixels[y][x]
    }

    pub fn pixels_equal(&self, other: &TestPanel) -> bool {
        self.raster.pixels == other.raster.pixels
    }

    pub fn take_ops(&mut self) -> Vec<String> {
        std::mem::take(&mut self.ops)
    }

    /// Text drawn since the last `take_ops`, in draw order.
    pub fn texts(&self) -> Vec<String> {
        self.ops
            .iter()
            .filter_map(|op| op.strip_prefix("text "))
            .filter_map(|op| op.split_once(' ').map(|(_, text)| text.to_string()))
            .collect()
    }
}

fn color_name(color: BinaryColor) -> &'static str {
    if color.is_on() { "on" } else { "off" }
}

impl Panel for TestPanel {
    fn begin(&mut self) -> Result<(), DeviceError> {
        self.begin
            .attempt("panel", &self.log)
            .map_err(|_| DeviceError::Display)
    }

    fn size(&self) -> Size {
        Panel::size(&self.raster)
    }

    fn clear(&mut self) -> Result<(), DeviceError> {
        self.ops.push("clear".to_string());
        Panel::clear(&mut self.raster)
    }

    fn fill_rect(&mut self, area: Rectangle, color: BinaryColor) -> Result<(), DeviceError> {
        self.ops.push(format!(
            "fill {},{} {}x{} {}",
            area.top_left.x,
            area.top_left.y,
            area.size.width,
            area.size.height,
            color_name(color)
        ));
        self.raster.fill_rect(area, color)
    }

    fn draw_text(
        &mut self,
        text: &str,
        origin: Point,
        size: TextSize,
        foreground: BinaryColor,
        background: Option<BinaryColor>,
    ) -> Result<(), DeviceError> {
        self.ops.push(format!("text {},{} {}", origin.x, origin.y, text));
        self.raster
            .draw_text(text, origin, size, foreground, background)
    }

    fn flush(&mut self) -> Result<(), DeviceError> {
        self.ops.push("flush".to_string());
        self.flushes_ms.push(millis(&self.time));
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeEnvironment {
    pub begin: BeginScript,
    pub log: CallLog,
    pub readings: VecDeque<Result<EnvReading, DeviceError>>,
    pub measure_calls: usize,
}

impl FakeEnvironment {
    pub fn reading(temperature_c: f32, pressure_pa: f32, humidity_percent: f32) -> Self {
        Self {
            readings: VecDeque::from([Ok(EnvReading {
                temperature_c,
                pressure_pa,
                humidity_percent,
            })]),
            ..Default::default()
        }
    }
}

impl EnvironmentSensor for FakeEnvironment {
    fn begin(&mut self) -> Result<(), DeviceError> {
        self.begin.attempt("environment", &self.log)
    }

    /// Pops scripted readings; the last one repeats forever.
    fn measure(&mut self) -> Result<EnvReading, DeviceError> {
        self.measure_calls += 1;
        match self.readings.len() {
            0 => Err(DeviceError::Bus {
                device: "environment",
            }),
            1 => self.readings[0],
            _ => self.readings.pop_front().unwrap(),
        }
    }
}

#[derive(Default)]
pub struct FakeAirQuality {
    pub begin: BeginScript,
    pub log: CallLog,
    pub mode: Option<OperatingMode>,
    pub compensation: Option<(f32, f32)>,
    pub readings: VecDeque<AirQuality>,
}

impl FakeAirQuality {
    pub fn with_aqi(values: &[u8]) -> Self {
        Self {
            readings: values
                .iter()
                .map(|&aqi| AirQuality {
                    aqi,
                    tvoc_ppb: 100,
                    eco2_ppm: 450,
                })
                .collect(),
            ..Default::default()
        }
    }
}

impl AirQualitySensor for FakeAirQuality {
    fn begin(&mut self) -> Result<(), DeviceError> {
        self.begin.attempt("air quality", &self.log)
    }

    fn set_mode(&mut self, mode: OperatingMode) -> Result<(), DeviceError> {
        self.mode = Some(mode);
        Ok(())
    }

    fn set_compensation(
        &mut self,
        temperature_c: f32,
        humidity_percent: f32,
    ) -> Result<(), DeviceError> {
        self.compensation = Some((temperature_c, humidity_percent));
        Ok(())
    }

    fn read(&mut self) -> Result<AirQuality, DeviceError> {
        match self.readings.len() {
            0 => Ok(AirQuality::default()),
            1 => Ok(self.readings[0]),
            _ => Ok(self.readings.pop_front().unwrap()),
        }
    }
}

#[derive(Default)]
pub struct FakeClock {
    pub begin: BeginScript,
    pub log: CallLog,
    pub halted: bool,
    pub time: ClockFields,
    pub writes: Vec<ClockFields>,
    pub started: bool,
}

impl Clock for FakeClock {
    fn begin(&mut self) -> Result<(), DeviceError> {
        self.begin.attempt("clock", &self.log)
    }

    fn is_halted(&mut self) -> Result<bool, DeviceError> {
        Ok(self.halted)
    }

    fn set_time(&mut self, time: &ClockFields) -> Result<(), DeviceError> {
        self.writes.push(*time);
        self.time = *time;
        Ok(())
    }

    fn start(&mut self) -> Result<(), DeviceError> {
        self.started = true;
        self.halted = false;
        Ok(())
    }

    fn now(&mut self) -> Result<ClockFields, DeviceError> {
        Ok(self.time)
    }
}

pub struct FakeFlash {
    pub id: Result<FlashId, DeviceError>,
}

impl Default for FakeFlash {
    fn default() -> Self {
        Self {
            id: Ok(FlashId::from_bytes([0xEF, 0x40, 0x18])),
        }
    }
}

impl FlashMemory for FakeFlash {
    fn read_id(&mut self) -> Result<FlashId, DeviceError> {
        self.id
    }
}

/// Serial line whose input bytes arrive at scheduled virtual times.
pub struct FakeSerial {
    pub time: SharedTime,
    incoming: VecDeque<(u64, u8)>,
    pub output: Vec<u8>,
}

impl FakeSerial {
    pub fn new(time: SharedTime) -> Self {
        Self {
            time,
            incoming: VecDeque::new(),
            output: Vec::new(),
        }
    }

    pub fn send_at(&mut self, at_ms: u64, text: &str) {
        self.incoming
            .extend(text.bytes().map(|byte| (at_ms * 1_000_000, byte)));
    }

    pub fn send(&mut self, text: &str) {
        self.send_at(0, text);
    }

    pub fn output_text(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }
}

impl SerialPort for FakeSerial {
    fn write(&mut self, bytes: &[u8]) -> Result<(), DeviceError> {
        self.output.extend_from_slice(bytes);
        Ok(())
    }

    fn read_ready(&mut self) -> bool {
        self.incoming
            .front()
            .is_some_and(|(at, _)| *at <= self.time.get())
    }

    fn read_byte(&mut self) -> Option<u8> {
        if self.read_ready() {
            self.incoming.pop_front().map(|(_, byte)| byte)
        } else {
            None
        }
    }
}

/// Register-file I2C device: the first written byte selects the register,
/// following bytes are written or read with auto-increment.
pub struct FakeI2c {
    pub address: u8,
    pub registers: [u8; 256],
    pub present: bool,
    pub writes: Vec<Vec<u8>>,
    pointer: u8,
}

impl FakeI2c {
    pub fn new(address: u8) -> Self {
        Self {
            address,
            registers: [0; 256],
            present: true,
            writes: Vec::new(),
            pointer: 0,
        }
    }
}

impl embedded_hal::i2c::ErrorType for FakeI2c {
    type Error = embedded_hal::i2c::ErrorKind;
}

impl embedded_hal::i2c::I2c for FakeI2c {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [embedded_hal::i2c::Operation<'_>],
    ) -> Result<(), Self::Error> {
        use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource, Operation};

        if !self.present || address != self.address {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }

        for operation in operations {
            match operation {
                Operation::Write(bytes) => {
                    self.writes.push(bytes.to_vec());
                    if let Some((&register, data)) = bytes.split_first() {
                        self.pointer = register;
                        for &byte in data {
                            self.registers[usize::from(self.pointer)] = byte;
                            self.pointer = self.pointer.wrapping_add(1);
                        }
                    }
                }
                Operation::Read(buffer) => {
                    for byte in buffer.iter_mut() {
                        *byte = self.registers[usize::from(self.pointer)];
                        self.pointer = self.pointer.wrapping_add(1);
                    }
                }
            }
        }
        Ok(())
    }
}

/// SPI device that records what was sent and answers reads with `reply`.
pub struct FakeSpi {
    pub sent: Vec<u8>,
    pub reply: Vec<u8>,
}

impl embedded_hal::spi::ErrorType for FakeSpi {
    type Error = embedded_hal::spi::ErrorKind;
}

impl embedded_hal::spi::SpiDevice for FakeSpi {
    fn transaction(
        &mut self,
        operations: &mut [embedded_hal::spi::Operation<'_, u8>],
    ) -> Result<(), Self::Error> {
        use embedded_hal::spi::Operation;

        let mut reply = self.reply.iter().copied();
        for operation in operations {
            match operation {
                Operation::Write(bytes) => self.sent.extend_from_slice(bytes),
                Operation::Read(buffer) => {
                    for byte in buffer.iter_mut() {
                        *byte = reply.next().unwrap_or(0xFF);
                    }
                }
                Operation::Transfer(read, write) => {
                    self.sent.extend_from_slice(write);
                    for byte in read.iter_mut() {
                        *byte = reply.next().unwrap_or(0xFF);
                    }
                }
                Operation::TransferInPlace(buffer) => {
                    self.sent.extend_from_slice(buffer);
                    for byte in buffer.iter_mut() {
                        *byte = reply.next().unwrap_or(0xFF);
                    }
                }
                Operation::DelayNs(_) => {}
            }
        }
        Ok(())
    }
}

/// Every fake device on one virtual clock, lent to a [`Station`].
pub struct Rig {
    pub time: SharedTime,
    pub clock: FakeClock,
    pub panel: TestPanel,
    pub environment: FakeEnvironment,
    pub air_quality: FakeAirQuality,
    pub flash: FakeFlash,
    pub serial: FakeSerial,
    pub delay: FakeDelay,
    /// `begin` calls across the clock, panel and both sensors.
    pub calls: CallLog,
}

impl Rig {
    pub fn new() -> Self {
        Self::with_panel_height(64)
    }

    pub fn with_panel_height(height: u32) -> Self {
        let time = shared_time();
        let calls = CallLog::default();
        let mut rig = Self {
            clock: FakeClock::default(),
            panel: TestPanel::with_height(time.clone(), height),
            environment: FakeEnvironment::reading(21.3, 101_325.0, 45.2),
            air_quality: FakeAirQuality::with_aqi(&[1]),
            flash: FakeFlash::default(),
            serial: FakeSerial::new(time.clone()),
            delay: FakeDelay::new(time.clone()),
            time,
            calls,
        };
        rig.clock.log = rig.calls.clone();
        rig.panel.log = rig.calls.clone();
        rig.environment.log = rig.calls.clone();
        rig.air_quality.log = rig.calls.clone();
        rig
    }

    pub fn station(&mut self, config: StationConfig) -> Station<'_> {
        Station::new(
            Devices {
                clock: &mut self.clock,
                panel: &mut self.panel,
                environment: &mut self.environment,
                air_quality: &mut self.air_quality,
                flash: &mut self.flash,
                serial: &mut self.serial,
                delay: &mut self.delay,
            },
            config,
        )
    }
}

/// Defaults with no countdown, no echo and only the environmental lines.
pub fn quick_config() -> StationConfig {
    StationConfig {
        gate_countdown_ticks: 0,
        echo: EchoMode::Off,
        show_clock: false,
        air_quality: false,
        ..StationConfig::default()
    }
}
