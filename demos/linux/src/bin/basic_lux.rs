//! Basic lux reading example
//!
//! This example demonstrates how to:
//! - Initialize the XYC-ALS21C sensor
//! - Configure gain and integration time by hand
//! - Read lux and the raw count behind it
//! - Handle not-ready and out-of-range readings

use als21c::{Als21c, Error, Gain};
use embedded_hal::delay::DelayNs;

// This example uses linux-embedded-hal for demonstration
// Replace with your platform's I2C implementation
#[cfg(target_os = "linux")]
use linux_embedded_hal::{Delay, I2cdev};

#[cfg(target_os = "linux")]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let i2c = I2cdev::new("/dev/i2c-1")?;
    let mut delay = Delay;
    let mut sensor = Als21c::new(i2c);

    println!("XYC-ALS21C Basic Lux Reading Example");
    println!("====================================");

    println!("Initializing sensor...");
    sensor.initialize()?;
    println!("Product ID: 0x{:04X}", sensor.product_id()?);

    // 16x gain, about 50 ms integration, 100 ms pause between measurements
    sensor.set_gain(Gain::Gain16x)?;
    sensor.set_integration_time(50)?;
    sensor.set_wait_time(100)?;
    sensor.enable(true)?;

    let period = sensor.delay_millis();
    println!("Measurement period: {} ms", period);
    println!();
    println!("{:>12} {:>6}", "lux", "count");

    let mut error_count = 0;
    loop {
        delay.delay_ms(period);

        match sensor.measure() {
            Ok(lux) => {
                error_count = 0;
                println!("{:>12.2} {:>6}", lux.as_f32(), sensor.read_raw().unwrap_or_default());
            }
            Err(Error::NotReady) => {}
            Err(Error::Saturation) | Err(Error::Overflow) => println!("{:>12}", "over range"),
            Err(e) => {
                error_count += 1;
                println!("Error reading sensor: {:?}", e);
                if error_count > 5 {
                    println!("Too many errors, attempting to reinitialize sensor...");
                    sensor.initialize()?;
                    sensor.enable(true)?;
                    error_count = 0;
                }
            }
        }
    }
}

#[cfg(not(target_os = "linux"))]
fn main() {
    println!("This example requires Linux with I2C support.");
    println!("Replace linux-embedded-hal with your platform's HAL to run it elsewhere.");
}
