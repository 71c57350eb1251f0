//! Register-level drivers for the station's devices.
//!
//! All of them are generic over the `embedded-hal` 1.0 bus traits, so the same
//! code runs against the ESP32-S3 peripherals and the host test doubles.

pub mod bme280;
pub mod ds1307;
pub mod ens160;
pub mod spi_flash;
pub mod ssd1306;

pub use self::bme280::Bme280Sensor;
pub use self::ds1307::Ds1307;
pub use self::ens160::Ens160;
pub use self::spi_flash::SpiFlash;
