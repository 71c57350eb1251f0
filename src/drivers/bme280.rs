use ::bme280::i2c::BME280;
use embedded_hal::{delay::DelayNs, i2c::I2c};

use crate::error::DeviceError;
use crate::model::EnvReading;
use crate::traits::EnvironmentSensor;

const DEVICE: &str = "BME280";

/// Bosch BME280 over I2C.
pub struct Bme280Sensor<I2C, D> {
    sensor: BME280<I2C>,
    delay: D,
}

impl<I2C: I2c, D: DelayNs> Bme280Sensor<I2C, D> {
    pub fn new(i2c: I2C, address: u8, delay: D) -> Self {
        Self {
            sensor: BME280::new(i2c, address),
            delay,
        }
    }
}

impl<I2C: I2c, D: DelayNs> EnvironmentSensor for Bme280Sensor<I2C, D> {
    fn begin(&mut self) -> Result<(), DeviceError> {
        self.sensor.init(&mut self.delay).map_err(|e| {
            log::debug!("BME280 init failed: {:?}", e);
            DeviceError::NotDetected { device: DEVICE }
        })
    }

    fn measure(&mut self) -> Result<EnvReading, DeviceError> {
        let measurement = self.sensor.measure(&mut self.delay).map_err(|e| {
            log::debug!("BME280 measurement failed: {:?}", e);
            DeviceError::Bus { device: DEVICE }
        })?;

        Ok(EnvReading {
            temperature_c: measurement.temperature,
            pressure_pa: measurement.pressure,
            humidity_percent: measurement.humidity,
        })
    }
}
