use std::num::NonZeroU16;

use crate::connection::{IpmiCommand, Message, NetFn};

use super::{record::Record, RecordId};

/// The `Get SDR` command: fetches a single SDR record, in full, from a
/// device's SDR repository.
///
/// A `reservation_id` is only required when reading a record in multiple
/// partial reads; this implementation always requests the full record in
/// one go, so `reservation_id` is accepted but unused on the wire besides
/// being echoed back to satisfy controllers that require a reservation.
#[derive(Debug, Clone, Copy)]
pub struct GetDeviceSdr {
    reservation_id: Option<NonZeroU16>,
    record_id: RecordId,
}

impl GetDeviceSdr {
    pub fn new(reservation_id: Option<NonZeroU16>, record_id: RecordId) -> Self {
        Self {
            reservation_id,
            record_id,
        }
    }
}

impl From<GetDeviceSdr> for Message {
    fn from(value: GetDeviceSdr) -> Self {
        let mut data = vec![0u8; 6];

        data[0..2].copy_from_slice(
            &value
                .reservation_id
                .map(NonZeroU16::get)
                .unwrap_or(0)
                .to_le_bytes(),
        );

        data[2..4].copy_from_slice(&value.record_id.value().to_le_bytes());
        // Offset into record: always 0, we always read the whole thing.
        data[4] = 0;
        // Bytes to read: 0xFF means "all of it".
        data[5] = 0xFF;

        Message::new_request(NetFn::Storage, 0x23, data)
    }
}

/// A parsed SDR entry together with the ID of the next record in the
/// repository, as returned by [`GetDeviceSdr`].
#[derive(Debug, Clone)]
pub struct RecordInfo {
    pub next_entry: RecordId,
    pub record: Record,
}

/// Errors that can occur while parsing the response to a [`GetDeviceSdr`]
/// command.
///
/// The second element, when present, is the next record ID that iteration
/// should resume from: this lets a caller treat a single malformed record
/// as recoverable instead of aborting the whole scan.
#[derive(Debug, Clone, Copy)]
pub enum GetSdrError {
    NotEnoughData,
    MalformedRecord,
}

impl IpmiCommand for GetDeviceSdr {
    type Output = RecordInfo;

    type Error = (GetSdrError, Option<RecordId>);

    fn parse_success_response(data: &[u8]) -> Result<Self::Output, Self::Error> {
        if data.len() < 3 {
            return Err((GetSdrError::NotEnoughData, None));
        }

        let next_entry = RecordId::new_raw(u16::from_le_bytes([data[0], data[1]]));
        let record_data = &data[2..];

        match Record::parse(record_data) {
            Some(record) => Ok(RecordInfo { next_entry, record }),
            None => Err((GetSdrError::MalformedRecord, Some(next_entry))),
        }
    }
}
