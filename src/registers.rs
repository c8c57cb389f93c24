//! Register map, field enumerations and the packed register codec

/// Product identifier reported by the PROD_ID register
pub const PRODUCT_ID: u16 = 0x0021;

/// Register addresses of the XYC-ALS21C
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[repr(u8)]
pub enum Register {
    /// System control: reset, enables, wait gate
    SysmCtrl = 0x00,
    /// Interrupt control
    IntCtrl = 0x01,
    /// Interrupt flags
    IntFlag = 0x02,
    /// Wait time between measurements
    WaitTime = 0x03,
    /// Photodiode selection and amplifier gain
    AlsGain = 0x04,
    /// Integration time and number of conversions
    AlsTime = 0x05,
    /// Interrupt source and persistence
    Persistence = 0x0B,
    /// Low interrupt threshold (16 bit)
    AlsThresL = 0x0C,
    /// High interrupt threshold (16 bit)
    AlsThresH = 0x0E,
    /// Data ready and saturation flags
    DataStatus = 0x17,
    /// Raw ALS count (16 bit)
    AlsData = 0x1E,
    /// Product identifier (16 bit)
    ProdId = 0xBC,
}

impl From<Register> for u8 {
    #[inline]
    fn from(r: Register) -> Self {
        r as u8
    }
}

/// Programmable gain amplifier setting (`pga_als`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum Gain {
    /// 1x gain
    Gain1x = 0x00,
    /// 4x gain
    Gain4x = 0x01,
    /// 16x gain
    Gain16x = 0x02,
    /// 64x gain
    Gain64x = 0x04,
    /// 256x gain
    Gain256x = 0x08,
}

impl Gain {
    /// Amplification factor of this setting
    pub const fn multiplier(self) -> u32 {
        match self {
            Gain::Gain1x => 1,
            Gain::Gain4x => 4,
            Gain::Gain16x => 16,
            Gain::Gain64x => 64,
            Gain::Gain256x => 256,
        }
    }

    /// Next higher gain, `None` at 256x
    pub const fn step_up(self) -> Option<Self> {
        match self {
            Gain::Gain1x => Some(Gain::Gain4x),
            Gain::Gain4x => Some(Gain::Gain16x),
            Gain::Gain16x => Some(Gain::Gain64x),
            Gain::Gain64x => Some(Gain::Gain256x),
            Gain::Gain256x => None,
        }
    }

    /// Next lower gain, `None` at 1x
    pub const fn step_down(self) -> Option<Self> {
        match self {
            Gain::Gain1x => None,
            Gain::Gain4x => Some(Gain::Gain1x),
            Gain::Gain16x => Some(Gain::Gain4x),
            Gain::Gain64x => Some(Gain::Gain16x),
            Gain::Gain256x => Some(Gain::Gain64x),
        }
    }
}

impl From<Gain> for u8 {
    fn from(v: Gain) -> Self {
        v as u8
    }
}

impl TryFrom<u8> for Gain {
    type Error = ();

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        match bits {
            0x00 => Ok(Self::Gain1x),
            0x01 => Ok(Self::Gain4x),
            0x02 => Ok(Self::Gain16x),
            0x04 => Ok(Self::Gain64x),
            0x08 => Ok(Self::Gain256x),
            _ => Err(()),
        }
    }
}

/// Base integration time (`int_time`), in units of T ≈ 1.17 ms
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum IntegrationTime {
    /// 1T, ~1.17 ms
    T1 = 0x0,
    /// 4T, ~4.7 ms
    T4 = 0x1,
    /// 16T, ~18.7 ms
    T16 = 0x2,
    /// 64T, ~74.7 ms
    T64 = 0x3,
}

impl IntegrationTime {
    /// Number of base cycles per conversion
    pub const fn cycles(self) -> u32 {
        match self {
            IntegrationTime::T1 => 1,
            IntegrationTime::T4 => 4,
            IntegrationTime::T16 => 16,
            IntegrationTime::T64 => 64,
        }
    }

    /// Next longer integration time, `None` at 64T
    pub const fn step_up(self) -> Option<Self> {
        match self {
            IntegrationTime::T1 => Some(IntegrationTime::T4),
            IntegrationTime::T4 => Some(IntegrationTime::T16),
            IntegrationTime::T16 => Some(IntegrationTime::T64),
            IntegrationTime::T64 => None,
        }
    }

    /// Next shorter integration time, `None` at 1T
    pub const fn step_down(self) -> Option<Self> {
        match self {
            IntegrationTime::T1 => None,
            IntegrationTime::T4 => Some(IntegrationTime::T1),
            IntegrationTime::T16 => Some(IntegrationTime::T4),
            IntegrationTime::T64 => Some(IntegrationTime::T16),
        }
    }
}

impl From<IntegrationTime> for u8 {
    fn from(v: IntegrationTime) -> Self {
        v as u8
    }
}

impl TryFrom<u8> for IntegrationTime {
    type Error = ();

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        match bits {
            0x0 => Ok(Self::T1),
            0x1 => Ok(Self::T4),
            0x2 => Ok(Self::T16),
            0x3 => Ok(Self::T64),
            _ => Err(()),
        }
    }
}

/// Largest `als_conv` value (16 conversions)
pub const MAX_ALS_CONV: u8 = 15;
/// Largest `wtime` value
pub const MAX_WTIME: u8 = 63;
/// Largest `wtime_unit` value (64 ms unit)
pub const MAX_WTIME_UNIT: u8 = 3;
/// Largest persistence count
pub const MAX_PERSISTENCE: u8 = 15;

/// Software mirror of every register field of the device.
///
/// Control fields are written by the driver, status fields are refreshed by
/// reading the corresponding register before they are used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct DeviceState {
    /// Software reset pulse
    pub swrst: bool,
    /// Continuous ALS measurement enabled
    pub en_als: bool,
    /// Single ALS measurement requested
    pub en_once: bool,
    /// Wait time between measurements enabled
    pub en_wait: bool,
    /// Fast reset
    pub en_frst: bool,
    /// Automatic gain and integration adjustment (software only)
    pub auto_lux: bool,

    /// Amplifier gain
    pub pga_als: Gain,
    /// Photodiode selection, doubles the effective gain
    pub pd_sel: bool,
    /// Base integration time
    pub int_time: IntegrationTime,
    /// Number of integration cycles minus one, `0..=15`
    pub als_conv: u8,

    /// Wait time unit: 8, 16, 32 or 64 ms for `0..=3`
    pub wtime_unit: u8,
    /// Wait time in units minus one, `0..=63`
    pub wtime: u8,

    /// Consecutive out-of-threshold measurements before an interrupt
    pub prs_als: u8,
    /// Interrupt source selection
    pub int_src: u8,
    /// Hold measurements until the interrupt is cleared
    pub als_sync: bool,
    /// ALS interrupt enabled
    pub en_aint: bool,

    /// Conversion completed
    pub data_ready: bool,
    /// Analog saturation of the ALS channel
    pub saturation_als: bool,
    /// Analog saturation of the comparator
    pub saturation_comp: bool,
    /// Power-on-reset interrupt pending
    pub int_por: bool,
    /// ALS threshold interrupt pending
    pub int_als: bool,
    /// Data flag
    pub data_flag: bool,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl DeviceState {
    /// State with every field cleared, the lowest code for each enumeration
    pub const fn zeroed() -> Self {
        Self {
            swrst: false,
            en_als: false,
            en_once: false,
            en_wait: false,
            en_frst: false,
            auto_lux: false,
            pga_als: Gain::Gain1x,
            pd_sel: false,
            int_time: IntegrationTime::T1,
            als_conv: 0,
            wtime_unit: 0,
            wtime: 0,
            prs_als: 0,
            int_src: 0,
            als_sync: false,
            en_aint: false,
            data_ready: false,
            saturation_als: false,
            saturation_comp: false,
            int_por: false,
            int_als: false,
            data_flag: false,
        }
    }

    /// State the device is in after a software reset
    pub const fn power_on_defaults() -> Self {
        let mut state = Self::zeroed();
        state.en_aint = true;
        state.pga_als = Gain::Gain4x;
        state.int_time = IntegrationTime::T4;
        state.prs_als = 1;
        state
    }

    /// Effective gain, including the photodiode doubling
    pub const fn gain(&self) -> u32 {
        let gain = self.pga_als.multiplier();
        if self.pd_sel {
            gain * 2
        } else {
            gain
        }
    }

    /// Total integration cycles: `itime_cycles × (als_conv + 1)`
    pub const fn integration_cycles(&self) -> u32 {
        self.int_time.cycles() * (self.als_conv as u32 + 1)
    }

    /// Largest count the digital counter can report with the current timing
    pub const fn max_count(&self) -> u32 {
        let max = 1024 * self.integration_cycles() - 1;
        if max > 0xFFFF {
            0xFFFF
        } else {
            max
        }
    }

    /// Any of the analog saturation flags is set
    pub const fn saturated(&self) -> bool {
        self.saturation_als || self.saturation_comp
    }

    /// Time in milliseconds between two measurements: integration plus
    /// optional wait
    pub const fn delay_millis(&self) -> u32 {
        let mut millis = (487 * self.integration_cycles() + 416) / 417;
        if self.en_wait {
            let unit = 8u32 << self.wtime_unit;
            millis += unit * (self.wtime as u32 + 1);
        }
        millis
    }
}

/// Registers whose content is packed from [`DeviceState`] fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum PackedRegister {
    /// SYSM_CTRL
    SysmCtrl,
    /// INT_CTRL
    IntCtrl,
    /// INT_FLAG
    IntFlag,
    /// WAIT_TIME
    WaitTime,
    /// ALS_GAIN
    AlsGain,
    /// ALS_TIME
    AlsTime,
    /// PERSISTENCE
    Persistence,
    /// DATA_STATUS
    DataStatus,
}

impl PackedRegister {
    /// Every packed register
    pub const ALL: [PackedRegister; 8] = [
        PackedRegister::SysmCtrl,
        PackedRegister::IntCtrl,
        PackedRegister::IntFlag,
        PackedRegister::WaitTime,
        PackedRegister::AlsGain,
        PackedRegister::AlsTime,
        PackedRegister::Persistence,
        PackedRegister::DataStatus,
    ];

    /// Bus address of the register
    pub const fn register(self) -> Register {
        match self {
            PackedRegister::SysmCtrl => Register::SysmCtrl,
            PackedRegister::IntCtrl => Register::IntCtrl,
            PackedRegister::IntFlag => Register::IntFlag,
            PackedRegister::WaitTime => Register::WaitTime,
            PackedRegister::AlsGain => Register::AlsGain,
            PackedRegister::AlsTime => Register::AlsTime,
            PackedRegister::Persistence => Register::Persistence,
            PackedRegister::DataStatus => Register::DataStatus,
        }
    }
}

/// A register byte carried a code no field enumeration knows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct DecodeError {
    /// Register being decoded
    pub register: PackedRegister,
    /// Offending byte
    pub value: u8,
}

#[inline]
const fn bit(value: bool, n: u8) -> u8 {
    (value as u8) << n
}

#[inline]
const fn is_set(byte: u8, n: u8) -> bool {
    (byte >> n) & 0x1 != 0
}

/// Pack the fields of `register` into its byte layout
pub fn encode(state: &DeviceState, register: PackedRegister) -> u8 {
    match register {
        // SWRST:7 | EN_WAIT:6 | EN_FRST:5 | Reserved:4:2 | EN_ONCE:1 | EN_ALS:0
        PackedRegister::SysmCtrl => {
            bit(state.swrst, 7)
                | bit(state.en_wait, 6)
                | bit(state.en_frst, 5)
                | bit(state.en_once, 1)
                | bit(state.en_als, 0)
        }
        // Reserved:7:5 | ALS_SYNC:4 | Reserved:3:1 | EN_AINT:0
        PackedRegister::IntCtrl => bit(state.als_sync, 4) | bit(state.en_aint, 0),
        // INT_POR:7 | DATA_FLAG:6 | Reserved:5:1 | INT_ALS:0
        PackedRegister::IntFlag => {
            bit(state.int_por, 7) | bit(state.data_flag, 6) | bit(state.int_als, 0)
        }
        // WTIME_UNIT:7:6 | WTIME:5:0
        PackedRegister::WaitTime => (state.wtime_unit & 0x03) << 6 | (state.wtime & 0x3F),
        // PD_SEL:7 | Reserved:6:4 | PGA_ALS:3:0
        PackedRegister::AlsGain => bit(state.pd_sel, 7) | u8::from(state.pga_als),
        // ALS_CONV:7:4 | INT_TIME:3:0
        PackedRegister::AlsTime => (state.als_conv & 0x0F) << 4 | u8::from(state.int_time),
        // INT_SRC:7:4 | PRS_ALS:3:0
        PackedRegister::Persistence => (state.int_src & 0x0F) << 4 | (state.prs_als & 0x0F),
        // DATA_READY:7 | Reserved:6:2 | SATURATION_ALS:1 | SATURATION_COMP:0
        PackedRegister::DataStatus => {
            bit(state.data_ready, 7)
                | bit(state.saturation_als, 1)
                | bit(state.saturation_comp, 0)
        }
    }
}

/// Unpack `value` into the fields of `register`.
///
/// Only the fields of that register are touched. On error the state is left
/// unchanged.
pub fn decode(
    value: u8,
    register: PackedRegister,
    state: &mut DeviceState,
) -> Result<(), DecodeError> {
    let invalid = DecodeError { register, value };
    match register {
        PackedRegister::SysmCtrl => {
            state.swrst = is_set(value, 7);
            state.en_wait = is_set(value, 6);
            state.en_frst = is_set(value, 5);
            state.en_once = is_set(value, 1);
            state.en_als = is_set(value, 0);
        }
        PackedRegister::IntCtrl => {
            state.als_sync = is_set(value, 4);
            state.en_aint = is_set(value, 0);
        }
        PackedRegister::IntFlag => {
            state.int_por = is_set(value, 7);
            state.data_flag = is_set(value, 6);
            state.int_als = is_set(value, 0);
        }
        PackedRegister::WaitTime => {
            state.wtime_unit = value >> 6;
            state.wtime = value & 0x3F;
        }
        PackedRegister::AlsGain => {
            state.pga_als = Gain::try_from(value & 0x0F).map_err(|_| invalid)?;
            state.pd_sel = is_set(value, 7);
        }
        PackedRegister::AlsTime => {
            state.int_time = IntegrationTime::try_from(value & 0x0F).map_err(|_| invalid)?;
            state.als_conv = value >> 4;
        }
        PackedRegister::Persistence => {
            state.int_src = value >> 4;
            state.prs_als = value & 0x0F;
        }
        PackedRegister::DataStatus => {
            state.data_ready = is_set(value, 7);
            state.saturation_als = is_set(value, 1);
            state.saturation_comp = is_set(value, 0);
        }
    }
    Ok(())
}
