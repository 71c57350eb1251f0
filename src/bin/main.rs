#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};
use esp_backtrace as _;
use esp_hal::{delay::Delay, timer::timg::TimerGroup};
use ssd1306::{I2CDisplayInterface, Ssd1306, prelude::*};

use roomstation::{
    config::{
        BME280_ADDRESS, DS1307_ADDRESS, ENS160_ADDRESS, PanelSize, SCREEN_ADDRESS, StationConfig,
    },
    drivers::{Bme280Sensor, Ds1307, Ens160},
    hardware::{self, UartSerial},
    station::{Devices, Station},
    traits::Panel,
};

esp_bootloader_esp_idf::esp_app_desc!();

#[esp_rtos::main]
async fn main(_spawner: Spawner) {
    let config = StationConfig::default();
    esp_println::logger::init_logger(config.log_level);
    let peripherals = esp_hal::init(esp_hal::Config::default());

    log::info!("=== RoomStation ===");

    // Initialize RTOS timer for embassy
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let i2c_bus = hardware::shared_i2c(peripherals.I2C0, peripherals.GPIO8, peripherals.GPIO9);

    let mut clock = Ds1307::new(hardware::I2cDevice::new(&i2c_bus), DS1307_ADDRESS);
    let mut environment = Bme280Sensor::new(
        hardware::I2cDevice::new(&i2c_bus),
        BME280_ADDRESS,
        Delay::new(),
    );
    let mut air_quality = Ens160::new(hardware::I2cDevice::new(&i2c_bus), ENS160_ADDRESS);
    let mut flash = hardware::flash(
        peripherals.SPI2,
        peripherals.GPIO13,
        peripherals.GPIO12,
        peripherals.GPIO11,
        peripherals.GPIO10,
    );
    let mut serial = UartSerial::new(peripherals.UART0, peripherals.GPIO44, peripherals.GPIO43);
    let mut delay = Delay::new();

    let interface = I2CDisplayInterface::new_custom_address(
        hardware::I2cDevice::new(&i2c_bus),
        SCREEN_ADDRESS,
    );
    let mut panel_64;
    let mut panel_32;
    let panel: &mut dyn Panel = match config.panel {
        PanelSize::Size128x64 => {
            panel_64 = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
                .into_buffered_graphics_mode();
            &mut panel_64
        }
        PanelSize::Size128x32 => {
            panel_32 = Ssd1306::new(interface, DisplaySize128x32, DisplayRotation::Rotate0)
                .into_buffered_graphics_mode();
            &mut panel_32
        }
    };

    let devices = Devices {
        clock: &mut clock,
        panel,
        environment: &mut environment,
        air_quality: &mut air_quality,
        flash: &mut flash,
        serial: &mut serial,
        delay: &mut delay,
    };
    let mut station = Station::new(devices, config);

    if let Err(e) = station.boot() {
        log::error!("boot failed: {}", e);
        loop {
            Timer::after(Duration::from_secs(1)).await;
        }
    }

    station.run()
}
