use embedded_hal::i2c::I2c;

use crate::error::DeviceError;
use crate::model::ClockFields;
use crate::traits::Clock;

const DEVICE: &str = "DS1307";

const REG_SECONDS: u8 = 0x00;

/// Clock halt flag, bit 7 of the seconds register
const CLOCK_HALT: u8 = 0x80;
const HOUR_12H_MODE: u8 = 0x40;
const HOUR_PM: u8 = 0x20;

fn from_bcd(value: u8) -> u16 {
    u16::from((value >> 4) * 10 + (value & 0x0F))
}

fn to_bcd(value: u16) -> u8 {
    let value = (value % 100) as u8;
    ((value / 10) << 4) | (value % 10)
}

/// Decode the seven time registers, oldest DS1307 quirks included.
fn decode(regs: [u8; 7]) -> ClockFields {
    let hours = if regs[2] & HOUR_12H_MODE != 0 {
        let hour = from_bcd(regs[2] & 0x1F) % 12;
        if regs[2] & HOUR_PM != 0 { hour + 12 } else { hour }
    } else {
        from_bcd(regs[2] & 0x3F)
    };

    ClockFields::new(
        from_bcd(regs[0] & 0x7F),
        from_bcd(regs[1] & 0x7F),
        hours,
        u16::from(regs[3] & 0x07),
        from_bcd(regs[4] & 0x3F),
        from_bcd(regs[5] & 0x1F),
        2000 + from_bcd(regs[6]),
    )
}

/// DS1307 battery backed real-time clock. Times are kept in 24 h mode and
/// years are stored as an offset from 2000.
pub struct Ds1307<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> Ds1307<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    fn read_seconds_register(&mut self) -> Result<u8, DeviceError> {
        let mut value = [0u8; 1];
        self.i2c
            .write_read(self.address, &[REG_SECONDS], &mut value)
            .map_err(|e| {
                log::debug!("DS1307 read failed: {:?}", e);
                DeviceError::Bus { device: DEVICE }
            })?;
        Ok(value[0])
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), DeviceError> {
        self.i2c.write(self.address, bytes).map_err(|e| {
            log::debug!("DS1307 write failed: {:?}", e);
            DeviceError::Bus { device: DEVICE }
        })
    }
}

impl<I2C: I2c> Clock for Ds1307<I2C> {
    fn begin(&mut self) -> Result<(), DeviceError> {
        self.read_seconds_register()
            .map(|_| ())
            .map_err(|_| DeviceError::NotDetected { device: DEVICE })
    }

    fn is_halted(&mut self) -> Result<bool, DeviceError> {
        Ok(self.read_seconds_register()? & CLOCK_HALT != 0)
    }

    /// Writes all seven registers; the halt flag keeps its current state.
    fn set_time(&mut self, time: &ClockFields) -> Result<(), DeviceError> {
        let halt = if self.is_halted()? { CLOCK_HALT } else { 0 };
        let frame = [
            REG_SECONDS,
            to_bcd(time.seconds()) | halt,
            to_bcd(time.minutes()),
            to_bcd(time.hours()),
            time.weekday().clamp(1, 7) as u8,
            to_bcd(time.day()),
            to_bcd(time.month()),
            to_bcd(time.year().saturating_sub(2000)),
        ];
        self.write(&frame)
    }

    fn start(&mut self) -> Result<(), DeviceError> {
        let seconds = self.read_seconds_register()?;
        if seconds & CLOCK_HALT != 0 {
            self.write(&[REG_SECONDS, seconds & !CLOCK_HALT])?;
        }
        Ok(())
    }

    fn now(&mut self) -> Result<ClockFields, DeviceError> {
        let mut regs = [0u8; 7];
        self.i2c
            .write_read(self.address, &[REG_SECONDS], &mut regs)
            .map_err(|e| {
                log::debug!("DS1307 time read failed: {:?}", e);
                DeviceError::Bus { device: DEVICE }
            })?;
        Ok(decode(regs))
    }
}
