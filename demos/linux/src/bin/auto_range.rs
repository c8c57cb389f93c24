//! Automatic ranging example
//!
//! The driver moves gain and integration time one step per measurement until
//! the count sits in the middle of the counter range. Cover and uncover the
//! sensor to watch it follow.

use als21c::{Als21c, Error};
use embedded_hal::delay::DelayNs;

#[cfg(target_os = "linux")]
use linux_embedded_hal::{Delay, I2cdev};

#[cfg(target_os = "linux")]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let i2c = I2cdev::new("/dev/i2c-1")?;
    let mut delay = Delay;
    let mut sensor = Als21c::new(i2c);

    println!("XYC-ALS21C Auto Range Example");
    println!("=============================");

    sensor.initialize()?;
    sensor.set_auto_range(true)?;
    sensor.enable(true)?;

    println!("{:>6} {:>6} {:>5} {:>12}", "gain", "itime", "conv", "lux");
    loop {
        // the period changes with every integration time step
        delay.delay_ms(sensor.delay_millis());

        let state = *sensor.state();
        let reading = sensor.measure();
        let settings = format!(
            "{:>5}x {:>5}T {:>5}",
            state.gain(),
            state.int_time.cycles(),
            state.als_conv + 1
        );

        match reading {
            Ok(lux) => println!("{} {:>12.2}", settings, lux.as_f32()),
            Err(Error::NotReady) => {}
            Err(Error::Saturation) => println!("{} {:>12}", settings, "saturated"),
            Err(Error::Overflow) => println!("{} {:>12}", settings, "overflow"),
            Err(e) => return Err(e.into()),
        }
    }
}

#[cfg(not(target_os = "linux"))]
fn main() {
    println!("This example requires Linux with I2C support.");
}
