mod get_sdr;
pub use get_sdr::GetDeviceSdr;

pub mod record;

pub mod event_reading_type_code;

mod sensor_type;
pub use sensor_type::SensorType;

mod units;
pub use units::Unit;

/// The ID of an SDR record, as used when iterating the SDR repository of
/// a device.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(u16);

impl RecordId {
    pub const FIRST: Self = Self(0);
    pub const LAST: Self = Self(0xFFFF);

    pub fn new_raw(value: u16) -> Self {
        Self(value)
    }

    pub fn is_first(&self) -> bool {
        self.0 == Self::FIRST.0
    }

    pub fn is_last(&self) -> bool {
        self.0 == Self::LAST.0
    }

    pub fn value(&self) -> u16 {
        self.0
    }
}
