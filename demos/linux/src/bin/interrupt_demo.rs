//! Threshold interrupt example
//!
//! This example demonstrates how to:
//! - Set low and high count thresholds
//! - Require several consecutive out-of-window readings (persistence)
//! - Poll and clear the interrupt flags
//!
//! The INT pin of the sensor can be wired to a GPIO instead of polling.

use als21c::Als21c;
use embedded_hal::delay::DelayNs;

#[cfg(target_os = "linux")]
use linux_embedded_hal::{Delay, I2cdev};

#[cfg(target_os = "linux")]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let i2c = I2cdev::new("/dev/i2c-1")?;
    let mut delay = Delay;
    let mut sensor = Als21c::new(i2c);

    println!("XYC-ALS21C Interrupt Demo");
    println!("=========================");

    sensor.initialize()?;
    sensor.set_integration_time(100)?;

    // Window around the current light level
    sensor.enable(true)?;
    delay.delay_ms(sensor.delay_millis());
    let baseline = sensor.read_raw()?;
    let low = baseline / 2;
    let high = baseline.saturating_mul(2).max(low + 1);
    println!("Baseline count {}, window {}..{}", baseline, low, high);

    sensor.set_low_threshold(low)?;
    sensor.set_high_threshold(high)?;
    sensor.set_persistence(3)?;
    sensor.clear_interrupt()?;
    sensor.enable_interrupt(true)?;

    println!("Waiting for the light level to leave the window... (Ctrl+C to exit)");
    let mut events = 0;
    loop {
        delay.delay_ms(sensor.delay_millis());

        if sensor.interrupt_status()? {
            events += 1;
            let count = sensor.read_raw().unwrap_or_default();
            let direction = if count < low { "below" } else { "above" };
            println!("Interrupt #{}: count {} {} window", events, count, direction);
            sensor.clear_interrupt()?;
        }
    }
}

#[cfg(not(target_os = "linux"))]
fn main() {
    println!("This example requires Linux with I2C support.");
}
