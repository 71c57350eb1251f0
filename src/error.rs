use thiserror_no_std::Error;

/// Failure reported by a device adapter.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceError {
    #[error("{device}: bus transfer failed")]
    Bus { device: &'static str },
    #[error("{device}: not detected")]
    NotDetected { device: &'static str },
    #[error("{device}: unexpected identity 0x{found:04X}")]
    UnexpectedId { device: &'static str, found: u16 },
    #[error("display operation failed")]
    Display,
    #[error("serial write failed")]
    Serial,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootError {
    #[error("display unavailable after {attempts} attempts")]
    DisplayUnavailable { attempts: u16 },
}
