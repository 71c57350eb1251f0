//! ESP32-S3 board wiring. Only built for the xtensa target.

use core::cell::RefCell;

use embedded_hal_bus::{i2c::RefCellDevice, spi::ExclusiveDevice};
use esp_hal::gpio::AnyPin;
use esp_hal::{
    Blocking,
    delay::Delay,
    gpio::{Level, Output, OutputConfig},
    i2c::master::{Config as I2cConfig, I2c},
    peripherals::{I2C0, SPI2, UART0},
    spi::{
        Mode,
        master::{Config as SpiConfig, Spi},
    },
    time::Rate,
    uart::{Config as UartConfig, Uart},
};

use crate::config::SERIAL_BAUD;
use crate::drivers::SpiFlash;
use crate::error::DeviceError;
use crate::traits::SerialPort;

const I2C_FREQ_KHZ: u32 = 400;
const SPI_FREQ_MHZ: u32 = 10;

/// I2C0 shared by the RTC, both sensors and the panel.
pub type SharedI2c<'a> = RefCell<I2c<'a, Blocking>>;
pub type I2cDevice<'a> = RefCellDevice<'a, I2c<'a, Blocking>>;

pub type FlashDevice<'a> = ExclusiveDevice<Spi<'a, Blocking>, Output<'a>, Delay>;

pub fn shared_i2c<'a, SDA, SCL>(i2c_periph: I2C0<'a>, sda: SDA, scl: SCL) -> SharedI2c<'a>
where
    SDA: Into<AnyPin<'a>>,
    SCL: Into<AnyPin<'a>>,
{
    let i2c = I2c::new(
        i2c_periph,
        I2cConfig::default().with_frequency(Rate::from_khz(I2C_FREQ_KHZ)),
    )
    .unwrap()
    .with_sda(sda.into())
    .with_scl(scl.into());

    RefCell::new(i2c)
}

pub fn flash<'a, SCK, MISO, MOSI, CS>(
    spi_periph: SPI2<'a>,
    sck_gpio: SCK,
    miso_gpio: MISO,
    mosi_gpio: MOSI,
    cs_gpio: CS,
) -> SpiFlash<FlashDevice<'a>>
where
    SCK: Into<AnyPin<'a>>,
    MISO: Into<AnyPin<'a>>,
    MOSI: Into<AnyPin<'a>>,
    CS: Into<AnyPin<'a>>,
{
    let spi_bus = Spi::new(
        spi_periph,
        SpiConfig::default()
            .with_frequency(Rate::from_mhz(SPI_FREQ_MHZ))
            .with_mode(Mode::_0),
    )
    .unwrap()
    .with_sck(sck_gpio.into())
    .with_miso(miso_gpio.into())
    .with_mosi(mosi_gpio.into());

    let cs = Output::new(cs_gpio.into(), Level::High, OutputConfig::default());
    let spi = ExclusiveDevice::new(spi_bus, cs, Delay::new()).unwrap();

    SpiFlash::new(spi)
}

/// UART0, the line the operator's terminal is plugged into.
pub struct UartSerial<'a> {
    uart: Uart<'a, Blocking>,
}

impl<'a> UartSerial<'a> {
    pub fn new<RX, TX>(uart_periph: UART0<'a>, rx: RX, tx: TX) -> Self
    where
        RX: Into<AnyPin<'a>>,
        TX: Into<AnyPin<'a>>,
    {
        let uart = Uart::new(
            uart_periph,
            UartConfig::default().with_baudrate(SERIAL_BAUD),
        )
        .unwrap()
        .with_rx(rx.into())
        .with_tx(tx.into());

        Self { uart }
    }
}

impl SerialPort for UartSerial<'_> {
    fn write(&mut self, mut bytes: &[u8]) -> Result<(), DeviceError> {
        while !bytes.is_empty() {
            let written = self.uart.write(bytes).map_err(|e| {
                log::debug!("uart write failed: {:?}", e);
                DeviceError::Serial
            })?;
            bytes = &bytes[written..];
        }
        self.uart.flush().map_err(|_| DeviceError::Serial)
    }

    fn read_ready(&mut self) -> bool {
        self.uart.read_ready()
    }

    fn read_byte(&mut self) -> Option<u8> {
        if !self.uart.read_ready() {
            return None;
        }
        let mut byte = [0u8];
        match self.uart.read(&mut byte) {
            Ok(1) => Some(byte[0]),
            Ok(_) => None,
            Err(e) => {
                log::trace!("uart read failed: {:?}", e);
                None
            }
        }
    }
}
