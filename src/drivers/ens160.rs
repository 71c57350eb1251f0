use embedded_hal::i2c::I2c;

use crate::error::DeviceError;
use crate::model::{AirQuality, OperatingMode};
use crate::traits::AirQualitySensor;

const DEVICE: &str = "ENS160";

const REG_PART_ID: u8 = 0x00;
const REG_OPMODE: u8 = 0x10;
/// TEMP_IN (0x13) and RH_IN (0x15) are contiguous and written in one go
const REG_TEMP_IN: u8 = 0x13;
/// DATA_AQI, DATA_TVOC (2 bytes) and DATA_ECO2 (2 bytes)
const REG_DATA_AQI: u8 = 0x21;

const PART_ID: u16 = 0x0160;

/// Kelvin scaled by 64 for TEMP_IN, %RH scaled by 512 for RH_IN.
fn encode_compensation(temperature_c: f32, humidity_percent: f32) -> [u8; 4] {
    let kelvin = ((temperature_c + 273.15) * 64.0).clamp(0.0, u16::MAX as f32) as u16;
    let humidity = (humidity_percent.clamp(0.0, 100.0) * 512.0) as u16;
    let [t0, t1] = kelvin.to_le_bytes();
    let [h0, h1] = humidity.to_le_bytes();
    [t0, t1, h0, h1]
}

/// ScioSense ENS160 metal-oxide gas sensor over I2C.
pub struct Ens160<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> Ens160<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    fn read_registers<const N: usize>(&mut self, register: u8) -> Result<[u8; N], DeviceError> {
        let mut buf = [0u8; N];
        self.i2c
            .write_read(self.address, &[register], &mut buf)
            .map_err(|e| {
                log::debug!("ENS160 read of 0x{:02X} failed: {:?}", register, e);
                DeviceError::Bus { device: DEVICE }
            })?;
        Ok(buf)
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), DeviceError> {
        self.i2c.write(self.address, bytes).map_err(|e| {
            log::debug!("ENS160 write failed: {:?}", e);
            DeviceError::Bus { device: DEVICE }
        })
    }
}

impl<I2C: I2c> AirQualitySensor for Ens160<I2C> {
    fn begin(&mut self) -> Result<(), DeviceError> {
        let id = self
            .read_registers::<2>(REG_PART_ID)
            .map_err(|_| DeviceError::NotDetected { device: DEVICE })?;
        let part = u16::from_le_bytes(id);
        if part != PART_ID {
            return Err(DeviceError::UnexpectedId {
                device: DEVICE,
                found: part,
            });
        }
        Ok(())
    }

    fn set_mode(&mut self, mode: OperatingMode) -> Result<(), DeviceError> {
        let code = match mode {
            OperatingMode::DeepSleep => 0x00,
            OperatingMode::Idle => 0x01,
            OperatingMode::Standard => 0x02,
        };
        self.write(&[REG_OPMODE, code])
    }

    fn set_compensation(
        &mut self,
        temperature_c: f32,
        humidity_percent: f32,
    ) -> Result<(), DeviceError> {
        let [t0, t1, h0, h1] = encode_compensation(temperature_c, humidity_percent);
        self.write(&[REG_TEMP_IN, t0, t1, h0, h1])
    }

    fn read(&mut self) -> Result<AirQuality, DeviceError> {
        let data = self.read_registers::<5>(REG_DATA_AQI)?;
        Ok(AirQuality {
            aqi: data[0] & 0x07,
            tvoc_ppb: u16::from_le_bytes([data[1], data[2]]),
            eco2_ppm: u16::from_le_bytes([data[3], data[4]]),
        })
    }
}
