use ::ssd1306::{
    Ssd1306,
    mode::{BufferedGraphicsMode, DisplayConfig},
    prelude::{DisplaySize, WriteOnlyDataCommand},
};

use crate::display::Framebuffer;
use crate::error::DeviceError;

impl<DI, SIZE> Framebuffer for Ssd1306<DI, SIZE, BufferedGraphicsMode<SIZE>>
where
    DI: WriteOnlyDataCommand,
    SIZE: DisplaySize,
{
    fn init_panel(&mut self) -> Result<(), DeviceError> {
        self.init().map_err(|e| {
            log::debug!("SSD1306 init failed: {:?}", e);
            DeviceError::Display
        })
    }

    fn flush_panel(&mut self) -> Result<(), DeviceError> {
        self.flush().map_err(|e| {
            log::debug!("SSD1306 flush failed: {:?}", e);
            DeviceError::Display
        })
    }
}
