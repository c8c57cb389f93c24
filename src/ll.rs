//! Low-level register and interface definitions for the XYC-ALS21C

use embedded_hal::i2c::I2c;

/// I2C address of the XYC-ALS21C
pub const I2C_ADDRESS: u8 = 0x38;

/// Device interface error types
#[derive(Debug)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum DeviceInterfaceError<I2cError> {
    /// I2C communication error
    I2c(I2cError),
}

/// Register transport used by the driver.
///
/// Four primitives addressed to the fixed device address: byte and word
/// reads and writes. Words travel little-endian, low byte first. Any type
/// implementing [`device_driver::RegisterInterface`] with `u8` addresses gets
/// this trait for free, so the driver can sit on top of [`DeviceInterface`]
/// or on any other register interface (bridges, test doubles).
pub trait RegisterTransport {
    /// Error raised by the underlying bus
    type Error;

    /// Read one byte from `register`
    fn read8(&mut self, register: u8) -> Result<u8, Self::Error>;

    /// Read a little-endian word starting at `register`
    fn read16(&mut self, register: u8) -> Result<u16, Self::Error>;

    /// Write one byte to `register`
    fn write8(&mut self, register: u8, value: u8) -> Result<(), Self::Error>;

    /// Write a little-endian word starting at `register`
    fn write16(&mut self, register: u8, value: u16) -> Result<(), Self::Error>;
}

impl<T> RegisterTransport for T
where
    T: device_driver::RegisterInterface<AddressType = u8>,
{
    type Error = T::Error;

    fn read8(&mut self, register: u8) -> Result<u8, Self::Error> {
        let mut buffer = [0u8; 1];
        self.read_register(register, 8, &mut buffer)?;
        Ok(buffer[0])
    }

    fn read16(&mut self, register: u8) -> Result<u16, Self::Error> {
        let mut buffer = [0u8; 2];
        self.read_register(register, 16, &mut buffer)?;
        Ok(u16::from_le_bytes(buffer))
    }

    fn write8(&mut self, register: u8, value: u8) -> Result<(), Self::Error> {
        self.write_register(register, 8, &[value])
    }

    fn write16(&mut self, register: u8, value: u16) -> Result<(), Self::Error> {
        self.write_register(register, 16, &value.to_le_bytes())
    }
}

/// Device interface implementation
#[derive(Debug)]
pub struct DeviceInterface<I2c> {
    /// The I2C interface
    pub i2c: I2c,
}

impl<I2cTrait: I2c> device_driver::RegisterInterface for DeviceInterface<I2cTrait> {
    type AddressType = u8;
    type Error = DeviceInterfaceError<I2cTrait::Error>;

    fn read_register(
        &mut self,
        address: Self::AddressType,
        _size_bits: u32,
        data: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.i2c
            .write_read(I2C_ADDRESS, &[address], data)
            .map_err(DeviceInterfaceError::I2c)
    }

    fn write_register(
        &mut self,
        address: Self::AddressType,
        _size_bits: u32,
        data: &[u8],
    ) -> Result<(), Self::Error> {
        // Widest register is 16 bits (2 bytes) + 1 address byte = 3 bytes
        let mut buf = [0u8; 3];
        buf[0] = address;
        let len = data.len().min(2);
        buf[1..1 + len].copy_from_slice(&data[..len]);
        self.i2c
            .write(I2C_ADDRESS, &buf[..1 + len])
            .map_err(DeviceInterfaceError::I2c)
    }
}
