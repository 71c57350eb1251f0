#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};
use embedded_graphics::{pixelcolor::BinaryColor, prelude::Point};
use esp_backtrace as _;
use esp_hal::{delay::Delay, timer::timg::TimerGroup};
use ssd1306::{I2CDisplayInterface, Ssd1306, prelude::*};

use roomstation::{
    config::{BME280_ADDRESS, DS1307_ADDRESS, ENS160_ADDRESS, SCREEN_ADDRESS},
    display::TextSize,
    drivers::{Bme280Sensor, Ds1307, Ens160},
    hardware::{self, I2cDevice, SharedI2c},
    model::{AirQuality, ClockFields, EnvReading, OperatingMode, Snapshot},
    record::ReadingRecord,
    traits::{AirQualitySensor, Clock, EnvironmentSensor, FlashMemory, Panel},
};

esp_bootloader_esp_idf::esp_app_desc!();

// Test result tracking
struct TestResults {
    passed: u32,
    failed: u32,
    total: u32,
}

impl TestResults {
    fn new() -> Self {
        Self {
            passed: 0,
            failed: 0,
            total: 0,
        }
    }

    fn assert(&mut self, condition: bool, test_name: &str) {
        self.total += 1;
        if condition {
            self.passed += 1;
            esp_println::println!("  ✓ {}", test_name);
        } else {
            self.failed += 1;
            esp_println::println!("  ✗ {} FAILED", test_name);
        }
    }

    fn assert_eq<T: PartialEq + core::fmt::Debug>(&mut self, left: T, right: T, test_name: &str) {
        self.total += 1;
        if left == right {
            self.passed += 1;
            esp_println::println!("  ✓ {}", test_name);
        } else {
            self.failed += 1;
            esp_println::println!("  ✗ {} FAILED: {:?} != {:?}", test_name, left, right);
        }
    }

    fn assert_ok<T, E: core::fmt::Display>(
        &mut self,
        result: Result<T, E>,
        test_name: &str,
    ) -> Option<T> {
        self.total += 1;
        match result {
            Ok(value) => {
                self.passed += 1;
                esp_println::println!("  ✓ {}", test_name);
                Some(value)
            }
            Err(e) => {
                self.failed += 1;
                esp_println::println!("  ✗ {} FAILED: {}", test_name, e);
                None
            }
        }
    }

    fn print_summary(&self) {
        esp_println::println!("\n==========================================");
        esp_println::println!("Test Summary:");
        esp_println::println!("  Total:  {}", self.total);
        esp_println::println!("  Passed: {}", self.passed);
        esp_println::println!("  Failed: {}", self.failed);
        if self.failed == 0 {
            esp_println::println!("\n✓ ALL TESTS PASSED!");
        } else {
            esp_println::println!("\n✗ SOME TESTS FAILED");
        }
        esp_println::println!("==========================================");
    }
}

fn test_record_format(results: &mut TestResults) {
    esp_println::println!("\n[TEST] Record Format");

    let snapshot = Snapshot {
        time: None,
        environment: EnvReading {
            temperature_c: 21.3,
            pressure_pa: 101_325.0,
            humidity_percent: 45.2,
        },
        air_quality: None,
        sea_level_hpa: 1013.25,
    };

    let lines = snapshot.metric_lines();
    results.assert_eq(lines[0].text().as_str(), "Temp[C]: 21.3", "temperature line");
    results.assert_eq(lines[1].text().as_str(), "Pre[hPa]: 1013.25", "pressure line");
    results.assert_eq(lines[2].text().as_str(), "Alt[m]: 0.0", "altitude line");

    let line = ReadingRecord::from_snapshot(&snapshot).to_line();
    results.assert(line.ends_with(",,,,"), "record without air quality");
    results.assert(ReadingRecord::parse(&line).is_none(), "host skips untimed record");

    let timed = Snapshot {
        time: Some(ClockFields::new(7, 5, 21, 3, 16, 10, 2026)),
        air_quality: Some(AirQuality {
            aqi: 2,
            tvoc_ppb: 120,
            eco2_ppm: 640,
        }),
        ..snapshot
    };
    let record = ReadingRecord::from_snapshot(&timed);
    let parsed = ReadingRecord::parse(&record.to_line());
    results.assert_eq(
        parsed.map(|r| r.air_quality),
        Some(record.air_quality),
        "host reads air quality back",
    );
    results.assert_eq(
        parsed.and_then(|r| r.seconds_of_day()),
        Some(21 * 3600 + 5 * 60 + 7),
        "host dedupe key",
    );
}

async fn test_clock(results: &mut TestResults, bus: &SharedI2c<'_>) {
    esp_println::println!("\n[TEST] DS1307 Clock");

    let mut clock = Ds1307::new(I2cDevice::new(bus), DS1307_ADDRESS);
    if results.assert_ok(clock.begin(), "clock detected").is_none() {
        return;
    }
    let _ = clock.start();

    let first = results.assert_ok(clock.now(), "read time");
    Timer::after(Duration::from_millis(1_100)).await;
    let second = results.assert_ok(clock.now(), "read time again");

    if let (Some(first), Some(second)) = (first, second) {
        esp_println::println!(
            "    {} {} -> {}",
            first.date_string(),
            first.time_string(),
            second.time_string()
        );
        results.assert(first != second, "clock is ticking");
        results.assert(second.month() >= 1 && second.month() <= 12, "month in range");
    }
}

async fn test_environment(results: &mut TestResults, bus: &SharedI2c<'_>) {
    esp_println::println!("\n[TEST] BME280 Sensor");

    let mut sensor = Bme280Sensor::new(I2cDevice::new(bus), BME280_ADDRESS, Delay::new());
    if results.assert_ok(sensor.begin(), "BME280 initialization").is_none() {
        return;
    }

    esp_println::println!("  Reading environment (5 samples)...");
    let mut samples = heapless::Vec::<EnvReading, 5>::new();
    for i in 0..5 {
        Timer::after(Duration::from_millis(100)).await;
        match sensor.measure() {
            Ok(reading) => {
                esp_println::println!(
                    "    Sample {}: {:.2}°C {:.2} hPa {:.2} %",
                    i + 1,
                    reading.temperature_c,
                    reading.pressure_hpa(),
                    reading.humidity_percent
                );
                let _ = samples.push(reading);
            }
            Err(e) => esp_println::println!("    Failed to read: {}", e),
        }
    }

    results.assert_eq(samples.len(), 5, "collected 5 samples");
    for reading in samples.iter() {
        results.assert(
            reading.temperature_c > -40.0 && reading.temperature_c < 85.0,
            "temperature in valid range",
        );
        results.assert(
            reading.pressure_hpa() > 300.0 && reading.pressure_hpa() < 1100.0,
            "pressure in valid range",
        );
        results.assert(
            (0.0..=100.0).contains(&reading.humidity_percent),
            "humidity in valid range",
        );
    }
}

async fn test_air_quality(results: &mut TestResults, bus: &SharedI2c<'_>) {
    esp_println::println!("\n[TEST] ENS160 Sensor");

    let mut sensor = Ens160::new(I2cDevice::new(bus), ENS160_ADDRESS);
    if results.assert_ok(sensor.begin(), "ENS160 part id").is_none() {
        return;
    }
    results.assert_ok(sensor.set_mode(OperatingMode::Standard), "standard mode");
    results.assert_ok(sensor.set_compensation(25.0, 50.0), "compensation");

    Timer::after(Duration::from_secs(2)).await;
    if let Some(air) = results.assert_ok(sensor.read(), "read data") {
        esp_println::println!(
            "    AQI {} TVOC {} ppb eCO2 {} ppm",
            air.aqi,
            air.tvoc_ppb,
            air.eco2_ppm
        );
        results.assert(air.aqi <= 5, "AQI in range");
    }
}

fn test_flash(results: &mut TestResults, flash: &mut dyn FlashMemory) {
    esp_println::println!("\n[TEST] SPI Flash");

    if let Some(id) = results.assert_ok(flash.read_id(), "JEDEC read") {
        esp_println::println!(
            "    Manufacturer 0x{:02X} type 0x{:02X} capacity 0x{:02X}",
            id.manufacturer,
            id.memory_type,
            id.capacity
        );
        results.assert(!id.is_blank(), "flash answered");
    }
}

fn test_panel(results: &mut TestResults, panel: &mut dyn Panel) {
    esp_println::println!("\n[TEST] SSD1306 Panel");

    if results.assert_ok(panel.begin(), "panel init").is_none() {
        return;
    }
    results.assert_ok(panel.clear(), "clear");
    results.assert_ok(
        panel.draw_text(
            "self test",
            Point::zero(),
            TextSize::Large,
            BinaryColor::On,
            None,
        ),
        "draw text",
    );
    results.assert_ok(panel.flush(), "flush");
}

#[esp_rtos::main]
async fn main(_spawner: Spawner) {
    esp_println::logger::init_logger_from_env();
    let peripherals = esp_hal::init(esp_hal::Config::default());

    esp_println::println!("\n==========================================");
    esp_println::println!("=== Hardware Unit Test Runner ===");
    esp_println::println!("==========================================");

    let mut results = TestResults::new();

    // Run tests that don't need hardware
    test_record_format(&mut results);

    // Initialize RTOS timer for embassy (this consumes TIMG0)
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let bus = hardware::shared_i2c(peripherals.I2C0, peripherals.GPIO8, peripherals.GPIO9);

    test_clock(&mut results, &bus).await;
    test_environment(&mut results, &bus).await;
    test_air_quality(&mut results, &bus).await;

    let mut flash = hardware::flash(
        peripherals.SPI2,
        peripherals.GPIO13,
        peripherals.GPIO12,
        peripherals.GPIO11,
        peripherals.GPIO10,
    );
    test_flash(&mut results, &mut flash);

    let interface = I2CDisplayInterface::new_custom_address(I2cDevice::new(&bus), SCREEN_ADDRESS);
    let mut panel = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
        .into_buffered_graphics_mode();
    test_panel(&mut results, &mut panel);

    // Print summary
    results.print_summary();

    esp_println::println!("\nTest run complete. Looping...");
    loop {
        Timer::after(Duration::from_millis(1000)).await;
    }
}
