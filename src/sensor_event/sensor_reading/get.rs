use crate::connection::{IpmiCommand, Message, NetFn};

use super::RawSensorReading;

impl RawSensorReading {
    pub(crate) fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < 2 {
            return None;
        }

        let reading = data[0];

        // Bit indicates that all event messages are enabled => must negate result
        let all_event_messages_disabled = (data[1] & 0x80) != 0x80;

        // Bit indicates that sensor scanning is enabled => must negate result
        let scanning_disabled = (data[1] & 0x40) != 0x40;

        let reading_or_state_unavailable = (data[1] & 0x20) == 0x20;

        let offset_data_1 = data.get(2).copied();
        let offset_data_2 = data.get(3).copied();

        Some(Self {
            reading,
            all_event_messages_disabled,
            scanning_disabled,
            reading_or_state_unavailable,
            offset_data_1,
            offset_data_2,
        })
    }

    pub fn reading(&self) -> Option<u8> {
        if self.reading_or_state_unavailable {
            None
        } else {
            Some(self.reading)
        }
    }

    pub fn all_event_messages_disabled(&self) -> bool {
        self.all_event_messages_disabled
    }

    pub fn scanning_disabled(&self) -> bool {
        self.scanning_disabled
    }
}

/// The `Get Sensor Reading` command, addressed against whatever target
/// is currently open on the connection.
pub struct GetSensorReading {
    sensor_number: u8,
}

impl GetSensorReading {
    pub fn new(sensor_number: u8) -> Self {
        Self { sensor_number }
    }
}

impl From<GetSensorReading> for Message {
    fn from(value: GetSensorReading) -> Self {
        Message::new_request(NetFn::SensorEvent, 0x2D, vec![value.sensor_number])
    }
}

impl IpmiCommand for GetSensorReading {
    type Output = RawSensorReading;

    type Error = ();

    fn parse_success_response(data: &[u8]) -> Result<Self::Output, Self::Error> {
        RawSensorReading::parse(data).ok_or(())
    }
}
