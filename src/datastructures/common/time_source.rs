/// What the time values in a PTP instance are derived from
///
/// This enum encodes the root source of a clock's time, whether that is the
/// clock itself or the source of the grandmaster it is synchronized to.
///
/// For more details see *IEEE1588-2019 section 7.6.2.8*.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimeSource {
    /// The time is derived from an atomic clock
    AtomicClock,
    /// The time is derived from a global navigation satellite system
    Gnss,
    /// The time is derived from a terrestrial radio signal
    TerrestrialRadio,
    /// The time is derived from a serial time code
    SerialTimeCode,
    /// The time is derived from another PTP network
    Ptp,
    /// The time is derived from NTP
    Ntp,
    /// The time was set by hand
    HandSet,
    /// The time is derived from some other source
    Other,
    /// The time is derived from the internal oscillator
    InternalOscillator,
    /// Use of a profile specific value
    ProfileSpecific(u8),
    /// Reserved value
    Reserved,
}

impl TimeSource {
    pub fn to_primitive(self) -> u8 {
        match self {
            Self::AtomicClock => 0x10,
            Self::Gnss => 0x20,
            Self::TerrestrialRadio => 0x30,
            Self::SerialTimeCode => 0x39,
            Self::Ptp => 0x40,
            Self::Ntp => 0x50,
            Self::HandSet => 0x60,
            Self::Other => 0x90,
            Self::InternalOscillator => 0xa0,
            Self::ProfileSpecific(value) => 0xf0 + value,
            Self::Reserved => 0xff,
        }
    }

    pub fn from_primitive(value: u8) -> Self {
        match value {
            0x10 => Self::AtomicClock,
            0x20 => Self::Gnss,
            0x30 => Self::TerrestrialRadio,
            0x39 => Self::SerialTimeCode,
            0x40 => Self::Ptp,
            0x50 => Self::Ntp,
            0x60 => Self::HandSet,
            0x90 => Self::Other,
            0xa0 => Self::InternalOscillator,
            0xf0..=0xfe => Self::ProfileSpecific(value - 0xf0),
            _ => Self::Reserved,
        }
    }
}

impl Default for TimeSource {
    fn default() -> Self {
        Self::InternalOscillator
    }
}
