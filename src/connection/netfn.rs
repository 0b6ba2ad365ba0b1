/// The network function code carried by an IPMI message, identifying the
/// family of command it belongs to.
#[derive(Debug, Clone, Copy, PartialEq)]
#[allow(missing_docs)]
pub enum NetFn {
    /// Chassis/application/device commands (netfn 0x06/0x07).
    App,
    /// SDR repository and FRU inventory commands (netfn 0x0A/0x0B).
    Storage,
    /// Sensor and event commands (netfn 0x04/0x05).
    SensorEvent,
    /// PICMG/ATCA vendor commands (netfn 0x2C/0x2D).
    Picmg,
    /// AMC/RTM vendor raw commands (netfn 0x34/0x35).
    VendorRaw,
    /// Any other netfn, carried through unmodified.
    Unknown(u8),
}

impl From<u8> for NetFn {
    fn from(value: u8) -> Self {
        match value {
            0x06 | 0x07 => Self::App,
            0x0A | 0x0B => Self::Storage,
            0x04 | 0x05 => Self::SensorEvent,
            0x2C | 0x2D => Self::Picmg,
            0x34 | 0x35 => Self::VendorRaw,
            v => Self::Unknown(v),
        }
    }
}

impl NetFn {
    /// The raw netfn byte as it appears in a request message.
    pub fn request_value(&self) -> u8 {
        match self {
            NetFn::App => 0x06,
            NetFn::Storage => 0x0A,
            NetFn::SensorEvent => 0x04,
            NetFn::Picmg => 0x2C,
            NetFn::VendorRaw => 0x34,
            NetFn::Unknown(v) => {
                if v % 2 == 1 {
                    v - 1
                } else {
                    *v
                }
            }
        }
    }

    /// The raw netfn byte as it appears in a response message.
    pub fn response_value(&self) -> u8 {
        match self {
            NetFn::App => 0x07,
            NetFn::Storage => 0x0B,
            NetFn::SensorEvent => 0x05,
            NetFn::Picmg => 0x2D,
            NetFn::VendorRaw => 0x35,
            NetFn::Unknown(v) => {
                if v % 2 == 0 {
                    v + 1
                } else {
                    *v
                }
            }
        }
    }
}
