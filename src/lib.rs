//! # XYC-ALS21C Ambient Light Sensor Driver
//!
//! This is a platform-agnostic Rust driver for the NEWOPT XYC-ALS21C ambient light sensor,
//! built using the [`embedded-hal`] traits for I2C communication.
//!
//! The XYC-ALS21C is a digital ambient light sensor that provides:
//! - A single ALS channel with a 16-bit counter
//! - Programmable gain (1x to 256x, doubled with the second photodiode)
//! - Programmable integration time (1.17ms to 1.2s)
//! - Programmable wait time between measurements
//! - Interrupt support with thresholds and persistence
//! - I2C interface (address 0x38)
//!
//! ## Features
//!
//! - **Lux calculation** in integer math from a calibration table
//! - **Automatic ranging** of gain and integration time
//! - **Typed register model** mirroring every field of the device
//! - **Interrupt configuration** with thresholds and persistence
//! - **`defmt` support** with the `defmt-03` feature
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use als21c::{Als21c, Error};
//!
//! # fn main() {
//! # let i2c = embedded_hal_mock::eh1::i2c::Mock::new(&[]);
//! let mut sensor = Als21c::new(i2c);
//!
//! // Verify the product id and reset the sensor
//! sensor.initialize().unwrap();
//!
//! // Let the driver pick gain and integration time
//! sensor.set_auto_range(true).unwrap();
//! sensor.enable(true).unwrap();
//!
//! // Wait sensor.delay_millis() between readings
//! match sensor.measure() {
//!     Ok(lux) => {
//!         let _whole_lux = lux.lux();
//!     }
//!     // Too early, or out of range: the next reading uses new settings
//!     Err(Error::NotReady) | Err(Error::Saturation) | Err(Error::Overflow) => {}
//!     Err(_) => {}
//! }
//! # }
//! ```
//!
//! [`embedded-hal`]: https://crates.io/crates/embedded-hal

#![no_std]
#![deny(missing_docs)]

pub mod auto_range;
pub mod ll;
pub mod lux;
pub mod registers;

use embedded_hal::i2c::I2c;

pub use auto_range::Adjustment;
pub use ll::{DeviceInterface, DeviceInterfaceError, RegisterTransport, I2C_ADDRESS};
pub use lux::Lux;
pub use registers::{
    DecodeError, DeviceState, Gain, IntegrationTime, PackedRegister, Register, PRODUCT_ID,
};

use registers::{MAX_ALS_CONV, MAX_PERSISTENCE, MAX_WTIME, MAX_WTIME_UNIT};

/// All possible errors in this crate
#[derive(Debug)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum Error<E> {
    /// Register interface (bus) error
    Interface(E),
    /// The product id register does not hold the expected value
    DeviceNotFound {
        /// Expected product id
        expected: u16,
        /// Found product id
        found: u16,
    },
    /// Measurement requested before the conversion completed
    NotReady,
    /// Measurement requested on a driver that was configured but never
    /// initialized or reset
    NotInitialized,
    /// Analog front end overrange (amplifier, comparator)
    Saturation,
    /// Digital counter overrange
    Overflow,
    /// Invalid configuration parameter
    InvalidConfig(&'static str),
    /// A register held a code no field value maps to
    InvalidRegisterValue {
        /// Register read
        register: Register,
        /// Value found
        value: u8,
    },
}

impl<E: core::fmt::Debug> core::fmt::Display for Error<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl<E: core::fmt::Debug> core::error::Error for Error<E> {}

impl<E> From<DecodeError> for Error<E> {
    fn from(err: DecodeError) -> Self {
        Error::InvalidRegisterValue {
            register: err.register.register(),
            value: err.value,
        }
    }
}

/// Raw content of every register, as returned by [`Als21c::dump_registers`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct RegisterDump {
    /// SYSM_CTRL
    pub sysm_ctrl: u8,
    /// INT_CTRL
    pub int_ctrl: u8,
    /// INT_FLAG
    pub int_flag: u8,
    /// WAIT_TIME
    pub wait_time: u8,
    /// ALS_GAIN
    pub als_gain: u8,
    /// ALS_TIME
    pub als_time: u8,
    /// PERSISTENCE
    pub persistence: u8,
    /// ALS_THRES_L
    pub als_thres_l: u16,
    /// ALS_THRES_H
    pub als_thres_h: u16,
    /// DATA_STATUS
    pub data_status: u8,
    /// ALS_DATA
    pub als_data: u16,
    /// PROD_ID
    pub prod_id: u16,
}

/// High-level XYC-ALS21C driver
///
/// The driver owns the register transport and a [`DeviceState`] mirroring the
/// device registers. Every setter updates the mirror and writes the whole
/// affected register.
pub struct Als21c<T> {
    transport: T,
    // Device state tracking
    state: DeviceState,
    initialized: bool,
    configured: bool,
}

impl<I2C> Als21c<DeviceInterface<I2C>>
where
    I2C: I2c,
{
    /// Create a new XYC-ALS21C driver instance on an I2C bus
    pub fn new(i2c: I2C) -> Self {
        Self::with_transport(DeviceInterface { i2c })
    }

    /// Destroy the driver and return the I2C interface
    pub fn destroy(self) -> I2C {
        self.transport.i2c
    }
}

impl<T, E> Als21c<T>
where
    T: RegisterTransport<Error = E>,
{
    /// Create a driver on top of any register transport
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            state: DeviceState::zeroed(),
            initialized: false,
            configured: false,
        }
    }

    /// Destroy the driver and return the transport
    pub fn release(self) -> T {
        self.transport
    }

    /// Current software view of the device registers
    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    /// True once [`Als21c::initialize`] or [`Als21c::reset`] succeeded
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Verify the product id and reset the sensor to its default settings
    pub fn initialize(&mut self) -> Result<(), Error<E>> {
        let found = self.product_id()?;
        if found != PRODUCT_ID {
            #[cfg(feature = "defmt-03")]
            defmt::warn!("unexpected product id {=u16:#x}", found);
            return Err(Error::DeviceNotFound {
                expected: PRODUCT_ID,
                found,
            });
        }

        self.reset()
    }

    /// Software reset.
    ///
    /// Pulses SWRST and brings the software state to the default settings:
    /// interrupt enabled, 4x gain, 4T integration, persistence 1. Gain and
    /// integration time are written explicitly so the device matches.
    /// Auto ranging is switched off.
    pub fn reset(&mut self) -> Result<(), Error<E>> {
        self.state = DeviceState::zeroed();
        self.state.swrst = true;
        self.write_packed(PackedRegister::SysmCtrl)?;
        self.state = DeviceState::power_on_defaults();
        self.write_packed(PackedRegister::AlsGain)?;
        self.write_packed(PackedRegister::AlsTime)?;
        self.initialized = true;

        #[cfg(feature = "defmt-03")]
        defmt::trace!("software reset");
        Ok(())
    }

    /// Stop measurements and disable interrupts
    pub fn shutdown(&mut self) -> Result<(), Error<E>> {
        self.state.en_als = false;
        self.state.en_once = false;
        self.write_packed(PackedRegister::SysmCtrl)?;
        self.state.en_aint = false;
        self.write_packed(PackedRegister::IntCtrl)
    }

    /// Enable or disable continuous measurement
    pub fn enable(&mut self, enable: bool) -> Result<(), Error<E>> {
        self.state.en_als = enable;
        self.write_packed(PackedRegister::SysmCtrl)
    }

    /// Request a single measurement
    pub fn enable_once(&mut self, enable: bool) -> Result<(), Error<E>> {
        self.state.en_once = enable;
        self.write_packed(PackedRegister::SysmCtrl)
    }

    /// Set the analog gain
    pub fn set_gain(&mut self, gain: Gain) -> Result<(), Error<E>> {
        self.state.pga_als = gain;
        self.write_packed(PackedRegister::AlsGain)
    }

    /// Select the second photodiode, doubling the effective gain
    pub fn set_photodiode_doubling(&mut self, enable: bool) -> Result<(), Error<E>> {
        self.state.pd_sel = enable;
        self.write_packed(PackedRegister::AlsGain)
    }

    /// Set the integration time and the number of conversions minus one
    /// (`0..=15`)
    pub fn set_integration(
        &mut self,
        int_time: IntegrationTime,
        als_conv: u8,
    ) -> Result<(), Error<E>> {
        if als_conv > MAX_ALS_CONV {
            return Err(Error::InvalidConfig("als_conv out of range"));
        }
        self.state.int_time = int_time;
        self.state.als_conv = als_conv;
        self.write_packed(PackedRegister::AlsTime)
    }

    /// Set the integration time in milliseconds.
    ///
    /// Picks the shortest base time whose 16 conversions cover the request.
    /// Requests longer than 64T × 16 (about 1.2 s) are capped.
    pub fn set_integration_time(&mut self, millis: u16) -> Result<(), Error<E>> {
        // 487 / 416 = 1.17 ms per cycle
        let count = millis as u32 * 416 / 487;

        let (int_time, als_conv) = match count {
            0 => (IntegrationTime::T1, 0),
            1..=16 => (IntegrationTime::T1, count - 1),
            17..=64 => (IntegrationTime::T4, count / 4 - 1),
            65..=256 => (IntegrationTime::T16, count / 16 - 1),
            257..=1024 => (IntegrationTime::T64, count / 64 - 1),
            _ => (IntegrationTime::T64, MAX_ALS_CONV as u32),
        };

        self.set_integration(int_time, als_conv as u8)
    }

    /// Set the wait time between two measurements in milliseconds.
    ///
    /// Zero switches waiting off. Requests above 4096 ms are capped.
    pub fn set_wait_time(&mut self, millis: u16) -> Result<(), Error<E>> {
        let (unit, wtime) = match millis {
            0..=8 => (0, 0),
            9..=512 => (0, millis / 8 - 1),
            513..=1024 => (1, millis / 16 - 1),
            1025..=2048 => (2, millis / 32 - 1),
            2049..=4096 => (3, millis / 64 - 1),
            _ => (MAX_WTIME_UNIT, MAX_WTIME as u16),
        };
        self.state.wtime_unit = unit;
        self.state.wtime = wtime as u8;
        self.write_packed(PackedRegister::WaitTime)?;

        self.state.en_wait = millis != 0;
        self.write_packed(PackedRegister::SysmCtrl)
    }

    /// Time in milliseconds between two measurements with the current
    /// settings: integration time plus wait time, if enabled
    pub fn delay_millis(&self) -> u32 {
        self.state.delay_millis()
    }

    /// Enable or disable automatic gain and integration time selection.
    ///
    /// Enabling starts from the least sensitive setting (1x, 1T, one
    /// conversion) so the first reading does not saturate.
    pub fn set_auto_range(&mut self, enable: bool) -> Result<(), Error<E>> {
        if enable {
            self.set_gain(Gain::Gain1x)?;
            self.set_integration(IntegrationTime::T1, 0)?;
        }
        self.state.auto_lux = enable;
        Ok(())
    }

    /// True if automatic ranging is enabled
    pub fn auto_range_enabled(&self) -> bool {
        self.state.auto_lux
    }

    /// Read the raw ALS count
    pub fn read_raw(&mut self) -> Result<u16, Error<E>> {
        self.read_packed(PackedRegister::DataStatus)?;
        if !self.state.data_ready {
            return Err(Error::NotReady);
        }
        if self.state.saturated() {
            return Err(Error::Saturation);
        }
        self.read_u16(Register::AlsData)
    }

    /// Read the ambient light level.
    ///
    /// A driver that has not touched the device yet is initialized first.
    /// One that was configured without [`Als21c::initialize`] or
    /// [`Als21c::reset`] fails with [`Error::NotInitialized`], since the
    /// software state cannot be trusted to match the device.
    ///
    /// With auto ranging enabled every call may move gain or integration time
    /// by one step for the next measurement, also when an error is returned.
    pub fn measure(&mut self) -> Result<Lux, Error<E>> {
        if !self.initialized {
            if self.configured {
                return Err(Error::NotInitialized);
            }
            self.initialize()?;
        }

        self.read_packed(PackedRegister::DataStatus)?;
        if !self.state.data_ready {
            return Err(Error::NotReady);
        }

        let max_count = self.state.max_count();
        if self.state.saturated() {
            self.auto_range(0, max_count, true)?;
            return Err(Error::Saturation);
        }

        let count = self.read_u16(Register::AlsData)?;
        // status and data are separate transfers, saturation may have started in between
        self.read_packed(PackedRegister::DataStatus)?;
        let saturated = self.state.saturated();

        let lux = lux::count_to_lux(count, &self.state);

        #[cfg(feature = "defmt-03")]
        defmt::trace!(
            "count {} of {}, gain {}, cycles {}, lux {}",
            count,
            max_count,
            self.state.gain(),
            self.state.integration_cycles(),
            lux.lux()
        );

        self.auto_range(count as u32, max_count, saturated)?;

        if saturated {
            Err(Error::Saturation)
        } else if count as u32 >= max_count {
            Err(Error::Overflow)
        } else {
            Ok(lux)
        }
    }

    /// Enable or disable the ALS interrupt
    pub fn enable_interrupt(&mut self, enable: bool) -> Result<(), Error<E>> {
        self.state.en_aint = enable;
        self.write_packed(PackedRegister::IntCtrl)
    }

    /// When enabled, measurements wait until the interrupt is cleared
    pub fn enable_als_sync(&mut self, enable: bool) -> Result<(), Error<E>> {
        self.state.als_sync = enable;
        self.write_packed(PackedRegister::IntCtrl)
    }

    /// True if a power-on or ALS interrupt is pending
    pub fn interrupt_status(&mut self) -> Result<bool, Error<E>> {
        self.read_packed(PackedRegister::IntFlag)?;
        Ok(self.state.int_por || self.state.int_als)
    }

    /// Clear all pending interrupts
    pub fn clear_interrupt(&mut self) -> Result<(), Error<E>> {
        self.write_u8(Register::IntFlag, 0)?;
        self.state.int_por = false;
        self.state.data_flag = false;
        self.state.int_als = false;
        Ok(())
    }

    /// Set the number of consecutive measurements outside the thresholds
    /// needed to raise an interrupt, capped at 15.
    ///
    /// With zero every measurement raises an interrupt.
    pub fn set_persistence(&mut self, persistence: u8) -> Result<(), Error<E>> {
        self.state.prs_als = persistence.min(MAX_PERSISTENCE);
        self.write_packed(PackedRegister::Persistence)
    }

    /// Set the interrupt source selection (`0..=15`)
    pub fn set_interrupt_source(&mut self, source: u8) -> Result<(), Error<E>> {
        if source > 0x0F {
            return Err(Error::InvalidConfig("int_src out of range"));
        }
        self.state.int_src = source;
        self.write_packed(PackedRegister::Persistence)
    }

    /// Set the count below which an interrupt is raised
    pub fn set_low_threshold(&mut self, value: u16) -> Result<(), Error<E>> {
        self.write_u16(Register::AlsThresL, value)
    }

    /// Set the count above which an interrupt is raised
    pub fn set_high_threshold(&mut self, value: u16) -> Result<(), Error<E>> {
        self.write_u16(Register::AlsThresH, value)
    }

    /// Read the product id
    pub fn product_id(&mut self) -> Result<u16, Error<E>> {
        self.read_u16(Register::ProdId)
    }

    /// Read every register
    pub fn dump_registers(&mut self) -> Result<RegisterDump, Error<E>> {
        Ok(RegisterDump {
            sysm_ctrl: self.read_u8(Register::SysmCtrl)?,
            int_ctrl: self.read_u8(Register::IntCtrl)?,
            int_flag: self.read_u8(Register::IntFlag)?,
            wait_time: self.read_u8(Register::WaitTime)?,
            als_gain: self.read_u8(Register::AlsGain)?,
            als_time: self.read_u8(Register::AlsTime)?,
            persistence: self.read_u8(Register::Persistence)?,
            als_thres_l: self.read_u16(Register::AlsThresL)?,
            als_thres_h: self.read_u16(Register::AlsThresH)?,
            data_status: self.read_u8(Register::DataStatus)?,
            als_data: self.read_u16(Register::AlsData)?,
            prod_id: self.read_u16(Register::ProdId)?,
        })
    }

    fn auto_range(
        &mut self,
        count: u32,
        max_count: u32,
        saturated: bool,
    ) -> Result<(), Error<E>> {
        if !self.state.auto_lux {
            return Ok(());
        }
        let Some(adjustment) = auto_range::adjust(count, max_count, saturated, &self.state) else {
            return Ok(());
        };

        #[cfg(feature = "defmt-03")]
        defmt::debug!(
            "auto range: count {} of {}, saturated {}, {}",
            count,
            max_count,
            saturated,
            adjustment
        );

        adjustment.apply(&mut self.state);
        match adjustment {
            Adjustment::Integration(..) => self.write_packed(PackedRegister::AlsTime),
            Adjustment::Gain(_) => self.write_packed(PackedRegister::AlsGain),
        }
    }

    // Helper methods for register access
    fn write_packed(&mut self, register: PackedRegister) -> Result<(), Error<E>> {
        let value = registers::encode(&self.state, register);
        self.write_u8(register.register(), value)
    }

    fn read_packed(&mut self, register: PackedRegister) -> Result<(), Error<E>> {
        let value = self.read_u8(register.register())?;
        registers::decode(value, register, &mut self.state)?;
        Ok(())
    }

    fn read_u8(&mut self, register: Register) -> Result<u8, Error<E>> {
        self.transport
            .read8(register.into())
            .map_err(Error::Interface)
    }

    fn read_u16(&mut self, register: Register) -> Result<u16, Error<E>> {
        self.transport
            .read16(register.into())
            .map_err(Error::Interface)
    }

    fn write_u8(&mut self, register: Register, value: u8) -> Result<(), Error<E>> {
        self.configured = true;
        self.transport
            .write8(register.into(), value)
            .map_err(Error::Interface)
    }

    fn write_u16(&mut self, register: Register, value: u16) -> Result<(), Error<E>> {
        self.configured = true;
        self.transport
            .write16(register.into(), value)
            .map_err(Error::Interface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lux::LUX_256;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
    extern crate std;
    use std::vec;
    use std::vec::Vec;

    type Sensor = Als21c<DeviceInterface<I2cMock>>;

    fn read8(register: u8, value: u8) -> I2cTransaction {
        I2cTransaction::write_read(I2C_ADDRESS, vec![register], vec![value])
    }

    fn read16(register: u8, value: u16) -> I2cTransaction {
        I2cTransaction::write_read(I2C_ADDRESS, vec![register], value.to_le_bytes().to_vec())
    }

    fn write8(register: u8, value: u8) -> I2cTransaction {
        I2cTransaction::write(I2C_ADDRESS, vec![register, value])
    }

    fn reset_transactions() -> Vec<I2cTransaction> {
        vec![write8(0x00, 0x80), write8(0x04, 0x01), write8(0x05, 0x01)]
    }

    fn init_transactions() -> Vec<I2cTransaction> {
        let mut transactions = vec![read16(0xBC, PRODUCT_ID)];
        transactions.extend(reset_transactions());
        transactions
    }

    fn measure_transactions(status: u8, count: u16, status_after: u8) -> Vec<I2cTransaction> {
        vec![read8(0x17, status), read16(0x1E, count), read8(0x17, status_after)]
    }

    fn initialized_sensor(expectations: &[I2cTransaction]) -> Sensor {
        let mut all = init_transactions();
        all.extend_from_slice(expectations);
        let mut sensor = Als21c::new(I2cMock::new(&all));
        sensor.initialize().unwrap();
        sensor
    }

    fn finish(sensor: Sensor) {
        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[test]
    fn test_device_creation() {
        let expectations = [];
        let i2c = I2cMock::new(&expectations);
        let sensor = Als21c::new(i2c);
        assert!(!sensor.is_initialized());
        assert_eq!(*sensor.state(), DeviceState::zeroed());
        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[test]
    fn test_with_transport_and_release() {
        let expectations = init_transactions();
        let transport = DeviceInterface {
            i2c: I2cMock::new(&expectations),
        };
        let mut sensor = Als21c::with_transport(transport);
        sensor.initialize().unwrap();

        let mut transport = sensor.release();
        transport.i2c.done();
    }

    #[test]
    fn test_initialize_resets_to_defaults() {
        let sensor = initialized_sensor(&[]);
        assert!(sensor.is_initialized());
        assert_eq!(*sensor.state(), DeviceState::power_on_defaults());
        assert_eq!(sensor.state().pga_als, Gain::Gain4x);
        assert_eq!(sensor.state().int_time, IntegrationTime::T4);
        finish(sensor);
    }

    #[test]
    fn test_initialize_rejects_unknown_product() {
        let expectations = [read16(0xBC, 0x1234)];
        let mut sensor = Als21c::new(I2cMock::new(&expectations));

        let result = sensor.initialize();
        assert!(matches!(
            result,
            Err(Error::DeviceNotFound {
                expected: PRODUCT_ID,
                found: 0x1234
            })
        ));
        assert!(!sensor.is_initialized());
        finish(sensor);
    }

    #[test]
    fn test_measure_initializes_first() {
        let mut expectations = init_transactions();
        expectations.extend(measure_transactions(0x80, 100, 0x80));
        let mut sensor = Als21c::new(I2cMock::new(&expectations));

        assert!(sensor.measure().is_ok());
        assert!(sensor.is_initialized());
        finish(sensor);
    }

    #[test]
    fn test_measure_keeps_configuration_made_without_initialize() {
        let expectations = [write8(0x04, 0x00), write8(0x05, 0x00), write8(0x00, 0x01)];
        let mut sensor = Als21c::new(I2cMock::new(&expectations));

        sensor.set_auto_range(true).unwrap();
        sensor.enable(true).unwrap();
        assert!(matches!(sensor.measure(), Err(Error::NotInitialized)));
        assert!(!sensor.is_initialized());
        assert!(sensor.auto_range_enabled());
        assert!(sensor.state().en_als);
        assert_eq!(sensor.state().pga_als, Gain::Gain1x);
        finish(sensor);
    }

    #[test]
    fn test_reset_counts_as_initialization() {
        let mut expectations = reset_transactions();
        expectations.push(write8(0x04, 0x02));
        expectations.push(read8(0x17, 0x00));
        let mut sensor = Als21c::new(I2cMock::new(&expectations));

        sensor.reset().unwrap();
        assert!(sensor.is_initialized());
        sensor.set_gain(Gain::Gain16x).unwrap();
        // no second reset: the status read follows directly
        assert!(matches!(sensor.measure(), Err(Error::NotReady)));
        assert_eq!(sensor.state().pga_als, Gain::Gain16x);
        finish(sensor);
    }

    #[test]
    fn test_reset_writes_default_gain_and_timing() {
        let mut sensor = Als21c::new(I2cMock::new(&reset_transactions()));

        sensor.reset().unwrap();
        assert_eq!(sensor.state().int_time, IntegrationTime::T4);
        assert_eq!(sensor.state().max_count(), 4095);
        finish(sensor);
    }

    #[test]
    fn test_measure_zero_count_is_zero_lux() {
        let mut sensor = initialized_sensor(&measure_transactions(0x80, 0, 0x80));
        assert_eq!(sensor.measure().unwrap(), Lux::from_scaled(0));
        finish(sensor);
    }

    #[test]
    fn test_measure_not_ready() {
        let mut sensor = initialized_sensor(&[read8(0x17, 0x00)]);
        assert!(matches!(sensor.measure(), Err(Error::NotReady)));
        finish(sensor);
    }

    #[test]
    fn test_measure_saturation_before_count() {
        let mut sensor = initialized_sensor(&[read8(0x17, 0x82)]);
        assert!(matches!(sensor.measure(), Err(Error::Saturation)));
        finish(sensor);
    }

    #[test]
    fn test_measure_saturation_after_count() {
        let mut sensor = initialized_sensor(&measure_transactions(0x80, 1000, 0x81));
        assert!(matches!(sensor.measure(), Err(Error::Saturation)));
        finish(sensor);
    }

    #[test]
    fn test_measure_overflow_at_max_count() {
        // 4x gain, 4T, one conversion: max count 4095
        let mut sensor = initialized_sensor(&measure_transactions(0x80, 4095, 0x80));
        assert_eq!(sensor.state().max_count(), 4095);
        assert!(matches!(sensor.measure(), Err(Error::Overflow)));
        finish(sensor);
    }

    #[test]
    fn test_measure_below_max_count() {
        let mut sensor = initialized_sensor(&measure_transactions(0x80, 4094, 0x80));
        let lux = sensor.measure().unwrap();
        // 256 * 4094 / 16 = 65504: index 255, past the table
        assert_eq!(lux.scaled(), LUX_256[LUX_256.len() - 1]);
        finish(sensor);
    }

    #[test]
    fn test_measure_worked_example() {
        let mut expectations = vec![write8(0x05, 0x02)];
        expectations.extend(measure_transactions(0x80, 8000, 0x80));
        let mut sensor = initialized_sensor(&expectations);

        sensor.set_integration(IntegrationTime::T16, 0).unwrap();
        let lux = sensor.measure().unwrap();
        assert_eq!(lux.scaled(), LUX_256[125]);
        assert_eq!(lux.lux(), LUX_256[125] / 256);
        finish(sensor);
    }

    #[test]
    fn test_read_raw() {
        let mut sensor = initialized_sensor(&[read8(0x17, 0x80), read16(0x1E, 0x1234)]);
        assert_eq!(sensor.read_raw().unwrap(), 0x1234);
        finish(sensor);
    }

    #[test]
    fn test_read_raw_saturated() {
        let mut sensor = initialized_sensor(&[read8(0x17, 0x81)]);
        assert!(matches!(sensor.read_raw(), Err(Error::Saturation)));
        finish(sensor);
    }

    #[test]
    fn test_auto_range_enable_starts_conservative() {
        let mut sensor = initialized_sensor(&[write8(0x04, 0x00), write8(0x05, 0x00)]);
        sensor.set_auto_range(true).unwrap();
        assert!(sensor.auto_range_enabled());
        assert_eq!(sensor.state().pga_als, Gain::Gain1x);
        assert_eq!(sensor.state().int_time, IntegrationTime::T1);
        assert_eq!(sensor.state().als_conv, 0);
        finish(sensor);
    }

    #[test]
    fn test_auto_range_stays_off_when_enable_fails() {
        let expectations =
            [I2cTransaction::write(I2C_ADDRESS, vec![0x04, 0x00]).with_error(ErrorKind::Other)];
        let mut sensor = initialized_sensor(&expectations);

        assert!(matches!(
            sensor.set_auto_range(true),
            Err(Error::Interface(DeviceInterfaceError::I2c(ErrorKind::Other)))
        ));
        assert!(!sensor.auto_range_enabled());
        finish(sensor);
    }

    #[test]
    fn test_auto_range_raises_gain_in_the_dark() {
        let mut expectations = vec![write8(0x04, 0x00), write8(0x05, 0x00)];
        expectations.extend(measure_transactions(0x80, 10, 0x80));
        expectations.push(write8(0x04, 0x01));
        let mut sensor = initialized_sensor(&expectations);

        sensor.set_auto_range(true).unwrap();
        // computed with the settings the count was taken with: 1x, 1T
        assert_eq!(sensor.measure().unwrap().scaled(), LUX_256[10]);
        assert_eq!(sensor.state().pga_als, Gain::Gain4x);
        finish(sensor);
    }

    #[test]
    fn test_auto_range_in_band_does_nothing() {
        let mut expectations = vec![write8(0x04, 0x00), write8(0x05, 0x00)];
        expectations.extend(measure_transactions(0x80, 130, 0x80));
        let mut sensor = initialized_sensor(&expectations);

        sensor.set_auto_range(true).unwrap();
        assert_eq!(sensor.measure().unwrap().scaled(), LUX_256[130]);
        assert_eq!(sensor.state().pga_als, Gain::Gain1x);
        finish(sensor);
    }

    #[test]
    fn test_auto_range_lowers_gain_on_overflow() {
        let mut expectations = vec![write8(0x04, 0x00), write8(0x05, 0x00), write8(0x04, 0x02)];
        expectations.extend(measure_transactions(0x80, 1023, 0x80));
        expectations.push(write8(0x04, 0x01));
        let mut sensor = initialized_sensor(&expectations);

        sensor.set_auto_range(true).unwrap();
        sensor.set_gain(Gain::Gain16x).unwrap();
        assert!(matches!(sensor.measure(), Err(Error::Overflow)));
        assert_eq!(sensor.state().pga_als, Gain::Gain4x);
        finish(sensor);
    }

    #[test]
    fn test_auto_range_shortens_integration_on_saturation() {
        let expectations = [
            write8(0x04, 0x00),
            write8(0x05, 0x00),
            write8(0x05, 0x21),
            read8(0x17, 0x82),
            write8(0x05, 0x11),
        ];
        let mut sensor = initialized_sensor(&expectations);

        sensor.set_auto_range(true).unwrap();
        sensor.set_integration(IntegrationTime::T4, 2).unwrap();
        assert!(matches!(sensor.measure(), Err(Error::Saturation)));
        assert_eq!(sensor.state().als_conv, 1);
        finish(sensor);
    }

    #[test]
    fn test_set_integration_time_millis() {
        let expectations = [
            write8(0x05, 0xD0), // 17 ms: count 14, 1T x 14
            write8(0x05, 0x91), // 50 ms: count 42, 4T x 10
            write8(0x05, 0xC3), // 1000 ms: count 854, 64T x 13
            write8(0x05, 0xF3), // 5000 ms: capped at 64T x 16
            write8(0x05, 0x00), // 0 ms
        ];
        let mut sensor = initialized_sensor(&expectations);

        sensor.set_integration_time(17).unwrap();
        assert_eq!(sensor.state().int_time, IntegrationTime::T1);
        assert_eq!(sensor.state().als_conv, 13);
        sensor.set_integration_time(50).unwrap();
        assert_eq!(sensor.state().int_time, IntegrationTime::T4);
        assert_eq!(sensor.state().als_conv, 9);
        sensor.set_integration_time(1000).unwrap();
        sensor.set_integration_time(5000).unwrap();
        sensor.set_integration_time(0).unwrap();
        finish(sensor);
    }

    #[test]
    fn test_set_integration_rejects_out_of_range() {
        let mut sensor = initialized_sensor(&[]);
        assert!(matches!(
            sensor.set_integration(IntegrationTime::T4, 16),
            Err(Error::InvalidConfig(_))
        ));
        assert_eq!(sensor.state().als_conv, 0);
        finish(sensor);
    }

    #[test]
    fn test_set_wait_time() {
        let expectations = [
            write8(0x03, 0x0B),
            write8(0x00, 0x40),
            write8(0x03, 0xED),
            write8(0x00, 0x40),
            write8(0x03, 0xFF),
            write8(0x00, 0x40),
            write8(0x03, 0x00),
            write8(0x00, 0x00),
        ];
        let mut sensor = initialized_sensor(&expectations);

        // 4T, one conversion: ceil(487 * 4 / 417)
        assert_eq!(sensor.delay_millis(), 5);
        sensor.set_wait_time(100).unwrap();
        assert_eq!(sensor.delay_millis(), 5 + 8 * 12);
        sensor.set_wait_time(3000).unwrap();
        assert_eq!(sensor.state().wtime_unit, 3);
        assert_eq!(sensor.state().wtime, 45);
        sensor.set_wait_time(u16::MAX).unwrap();
        assert_eq!(sensor.state().wtime, 63);
        sensor.set_wait_time(0).unwrap();
        assert!(!sensor.state().en_wait);
        assert_eq!(sensor.delay_millis(), 5);
        finish(sensor);
    }

    #[test]
    fn test_enable_and_shutdown() {
        let expectations = [
            write8(0x00, 0x01),
            write8(0x00, 0x03),
            write8(0x00, 0x00),
            write8(0x01, 0x00),
        ];
        let mut sensor = initialized_sensor(&expectations);

        sensor.enable(true).unwrap();
        sensor.enable_once(true).unwrap();
        sensor.shutdown().unwrap();
        assert!(!sensor.state().en_als);
        assert!(!sensor.state().en_aint);
        // untouched by shutdown
        assert_eq!(sensor.state().pga_als, Gain::Gain4x);
        finish(sensor);
    }

    #[test]
    fn test_gain_and_photodiode() {
        let expectations = [write8(0x04, 0x08), write8(0x04, 0x88)];
        let mut sensor = initialized_sensor(&expectations);

        sensor.set_gain(Gain::Gain256x).unwrap();
        sensor.set_photodiode_doubling(true).unwrap();
        assert_eq!(sensor.state().gain(), 512);
        finish(sensor);
    }

    #[test]
    fn test_interrupt_configuration() {
        let expectations = [
            write8(0x01, 0x11),
            write8(0x01, 0x10),
            read8(0x02, 0x81),
            write8(0x02, 0x00),
            read8(0x02, 0x40),
        ];
        let mut sensor = initialized_sensor(&expectations);

        sensor.enable_als_sync(true).unwrap();
        sensor.enable_interrupt(false).unwrap();
        assert!(sensor.interrupt_status().unwrap());
        sensor.clear_interrupt().unwrap();
        assert!(!sensor.state().int_por);
        // data flag alone is not an interrupt
        assert!(!sensor.interrupt_status().unwrap());
        finish(sensor);
    }

    #[test]
    fn test_persistence_and_thresholds() {
        let expectations = [
            write8(0x0B, 0x0F),
            write8(0x0B, 0x3F),
            I2cTransaction::write(I2C_ADDRESS, vec![0x0C, 0x34, 0x12]),
            I2cTransaction::write(I2C_ADDRESS, vec![0x0E, 0xFF, 0xEE]),
        ];
        let mut sensor = initialized_sensor(&expectations);

        sensor.set_persistence(20).unwrap();
        assert_eq!(sensor.state().prs_als, 15);
        sensor.set_interrupt_source(3).unwrap();
        assert!(matches!(
            sensor.set_interrupt_source(16),
            Err(Error::InvalidConfig(_))
        ));
        sensor.set_low_threshold(0x1234).unwrap();
        sensor.set_high_threshold(0xEEFF).unwrap();
        finish(sensor);
    }

    #[test]
    fn test_dump_registers() {
        let expectations = [
            read8(0x00, 0x01),
            read8(0x01, 0x01),
            read8(0x02, 0x00),
            read8(0x03, 0x00),
            read8(0x04, 0x01),
            read8(0x05, 0x01),
            read8(0x0B, 0x01),
            read16(0x0C, 0x0000),
            read16(0x0E, 0xFFFF),
            read8(0x17, 0x80),
            read16(0x1E, 0x0400),
            read16(0xBC, PRODUCT_ID),
        ];
        let mut sensor = Als21c::new(I2cMock::new(&expectations));

        let dump = sensor.dump_registers().unwrap();
        assert_eq!(dump.als_gain, 0x01);
        assert_eq!(dump.als_thres_h, 0xFFFF);
        assert_eq!(dump.als_data, 0x0400);
        assert_eq!(dump.prod_id, PRODUCT_ID);
        finish(sensor);
    }

    #[test]
    fn test_bus_error_is_reported() {
        let expectations = [I2cTransaction::write_read(I2C_ADDRESS, vec![0x17], vec![0x00])
            .with_error(ErrorKind::Other)];
        let mut sensor = initialized_sensor(&expectations);

        assert!(matches!(
            sensor.measure(),
            Err(Error::Interface(DeviceInterfaceError::I2c(ErrorKind::Other)))
        ));
        finish(sensor);
    }
}
