use embedded_hal::spi::{Operation, SpiDevice};

use crate::error::DeviceError;
use crate::model::FlashId;
use crate::traits::FlashMemory;

const READ_JEDEC_ID: u8 = 0x9F;

/// SPI NOR flash, used only to report its JEDEC identity at boot.
pub struct SpiFlash<SPI> {
    spi: SPI,
}

impl<SPI: SpiDevice> SpiFlash<SPI> {
    pub fn new(spi: SPI) -> Self {
        Self { spi }
    }
}

impl<SPI: SpiDevice> FlashMemory for SpiFlash<SPI> {
    fn read_id(&mut self) -> Result<FlashId, DeviceError> {
        let mut id = [0u8; 3];
        self.spi
            .transaction(&mut [Operation::Write(&[READ_JEDEC_ID]), Operation::Read(&mut id)])
            .map_err(|e| {
                log::debug!("flash JEDEC read failed: {:?}", e);
                DeviceError::Bus { device: "flash" }
            })?;
        Ok(FlashId::from_bytes(id))
    }
}
