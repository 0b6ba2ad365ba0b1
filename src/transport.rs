//! Thin adapter binding the generic IPMI command layer to one shelf
//! manager host, re-addressable to any IPMB target on that shelf.

use std::net::ToSocketAddrs;

use crate::app::GetDeviceId;
use crate::connection::impls::rmcp::Rmcp;
use crate::connection::CompletionErrorCode;
use crate::sensor_event::sensor_reading::GetSensorReading;
use crate::storage::fru::{GetFruInventoryAreaInfo, ProductInfoArea, ReadFruData};
use crate::storage::sdr::record::Record as SdrRecord;
use crate::{app::DeviceId, storage::sdr::GetDeviceSdr, Ipmi, IpmiError};

/// Errors surfaced across the transport boundary. Local to a single
/// operation; never escalated beyond the caller.
#[derive(Debug)]
pub enum TransportError {
    CompletionCodeError(CompletionErrorCode),
    Timeout,
    Transport(String),
}

impl<E: std::fmt::Debug, P> From<IpmiError<E, P>> for TransportError {
    fn from(value: IpmiError<E, P>) -> Self {
        match value {
            IpmiError::Failed {
                completion_code, ..
            } => TransportError::CompletionCodeError(completion_code),
            IpmiError::Command {
                completion_code: Some(cc),
                ..
            } => TransportError::CompletionCodeError(cc),
            other => TransportError::Transport(format!("{other:?}")),
        }
    }
}

impl From<std::io::Error> for TransportError {
    fn from(value: std::io::Error) -> Self {
        if value.kind() == std::io::ErrorKind::WouldBlock
            || value.kind() == std::io::ErrorKind::TimedOut
        {
            TransportError::Timeout
        } else {
            TransportError::Transport(value.to_string())
        }
    }
}

/// The result of a raw sensor reading: `None` when the reading is
/// currently unavailable (e.g. sensor disabled), `Some(raw)` otherwise.
#[derive(Debug, Clone, Copy)]
pub struct SensorReadingStates {
    pub all_event_messages_disabled: bool,
    pub scanning_disabled: bool,
}

/// A single-session IPMI/RMCP transport bound to one shelf manager host,
/// re-targetable to any IPMB address on that shelf.
///
/// The IPMI session is serial: only one target may be open at a time, and
/// callers must re-open before addressing a different target.
pub struct Transport {
    host: String,
    port: u16,
    ipmi: Option<Ipmi<Rmcp>>,
    active_ipmb: i32,
}

impl Transport {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ipmi: None,
            active_ipmb: -1,
        }
    }

    /// The IPMB address this transport is currently addressing, or `-1`
    /// if no target is open.
    pub fn active_target(&self) -> i32 {
        self.active_ipmb
    }

    /// Tear down any existing session and establish a new RMCP session
    /// targeting `ipmb_address`.
    pub fn open_target(&mut self, ipmb_address: u8) -> Result<(), TransportError> {
        self.ipmi = None;
        self.active_ipmb = -1;

        let remote = (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|e| TransportError::Transport(e.to_string()))?
            .next()
            .ok_or_else(|| TransportError::Transport("could not resolve host".into()))?;

        let mut conn = Rmcp::new(remote)?;
        conn.retarget(ipmb_address);

        self.ipmi = Some(Ipmi::new(conn));
        self.active_ipmb = ipmb_address as i32;

        Ok(())
    }

    pub fn close(&mut self) {
        self.ipmi = None;
        self.active_ipmb = -1;
    }

    fn ipmi_mut(&mut self) -> Result<&mut Ipmi<Rmcp>, TransportError> {
        self.ipmi
            .as_mut()
            .ok_or_else(|| TransportError::Transport("no target open".into()))
    }

    pub fn get_device_id(&mut self) -> Result<DeviceId, TransportError> {
        Ok(self.ipmi_mut()?.send_recv(GetDeviceId)?)
    }

    /// Lazily iterate every SDR entry visible at the currently open
    /// target.
    pub fn iter_sdr(&mut self) -> Result<impl Iterator<Item = SdrRecord> + '_, TransportError> {
        Ok(self.ipmi_mut()?.sdrs())
    }

    /// Read a raw sensor reading by SDR sensor number.
    pub fn get_sensor_reading(
        &mut self,
        number: u8,
    ) -> Result<(Option<u8>, SensorReadingStates), TransportError> {
        let reading = self.ipmi_mut()?.send_recv(GetSensorReading::new(number))?;

        Ok((
            reading.reading(),
            SensorReadingStates {
                all_event_messages_disabled: reading.all_event_messages_disabled(),
                scanning_disabled: reading.scanning_disabled(),
            },
        ))
    }

    /// PICMG `Get Fan Level` (netfn 0x2C, cmd 0x0E).
    pub fn get_fan_level(&mut self, fru_id: u8) -> Result<u8, TransportError> {
        let data = self.raw_command(0, crate::connection::NetFn::Picmg, &[0x0E, fru_id])?;
        data.first()
            .copied()
            .ok_or_else(|| TransportError::Transport("empty fan level response".into()))
    }

    /// PICMG `Get Fan Speed Properties` (netfn 0x2C, cmd 0x0D).
    pub fn get_fan_speed_properties(&mut self, fru_id: u8) -> Result<(u8, u8), TransportError> {
        let data = self.raw_command(0, crate::connection::NetFn::Picmg, &[0x0D, fru_id])?;

        if data.len() < 2 {
            return Err(TransportError::Transport(
                "short fan speed properties response".into(),
            ));
        }

        // Byte layout: [min_level, max_level, ..other PICMG fields].
        Ok((data[0], data[1]))
    }

    /// Read and concatenate an entire FRU device's raw inventory area,
    /// then decode its product-info area.
    pub fn get_fru_product_info_area(
        &mut self,
        fru_id: u8,
    ) -> Result<ProductInfoArea, TransportError> {
        let info = self
            .ipmi_mut()?
            .send_recv(GetFruInventoryAreaInfo { fru_device_id: fru_id })?;

        let mut data = Vec::with_capacity(info.size_bytes as usize);
        let mut offset = 0u16;

        while (offset as usize) < info.size_bytes as usize {
            let remaining = info.size_bytes - offset;
            let count = remaining.min(16) as u8;

            let chunk = self.ipmi_mut()?.send_recv(ReadFruData {
                fru_device_id: fru_id,
                offset,
                count,
            })?;

            if chunk.is_empty() {
                break;
            }

            offset += chunk.len() as u16;
            data.extend(chunk);
        }

        crate::storage::fru::parse_product_info_area(&data)
            .ok_or_else(|| TransportError::Transport("malformed FRU product-info area".into()))
    }

    /// Probe for a device's presence at `bay` and return its ID as a
    /// lowercase hex string, or an empty string if the bay is unoccupied
    /// (a non-fatal, common condition).
    pub fn probe_device_id(&mut self, bay: u8) -> String {
        match self.raw_command(0, crate::connection::NetFn::VendorRaw, &[0x05, bay]) {
            Ok(data) => data.iter().map(|b| format!("{b:02x}")).collect(),
            Err(_) => String::new(),
        }
    }

    /// Read a full AMC EEPROM dump (10 16-byte slices) at `bay`.
    pub fn read_amc_eeprom(&mut self, bay: u8) -> Result<Vec<u8>, TransportError> {
        let mut dump = Vec::with_capacity(160);

        for j in 0..10u8 {
            let slice = self.raw_command(
                0,
                crate::connection::NetFn::VendorRaw,
                &[0xFC, bay, j * 16, 16],
            )?;
            dump.extend(slice);
        }

        Ok(dump)
    }

    /// Read a full RTM EEPROM dump (16 16-byte slices). The `bay` argument
    /// is unused on the wire and fixed to `0`.
    pub fn read_rtm_eeprom(&mut self) -> Result<Vec<u8>, TransportError> {
        let mut dump = Vec::with_capacity(256);

        for j in 0..16u8 {
            let slice = self.raw_command(
                0,
                crate::connection::NetFn::VendorRaw,
                &[0x0B, 0, j * 16, 16],
            )?;
            dump.extend(slice);
        }

        Ok(dump)
    }

    /// Issue a vendor/OEM raw command. `data[0]` of the response is the
    /// completion code; `Ok` is only returned for completion `0x00`.
    pub fn raw_command(
        &mut self,
        lun: u8,
        netfn: crate::connection::NetFn,
        payload: &[u8],
    ) -> Result<Vec<u8>, TransportError> {
        let _ = lun;
        let ipmi = self.ipmi_mut()?;

        let cmd = RawCommand {
            netfn,
            cmd: payload[0],
            data: payload[1..].to_vec(),
        };

        Ok(ipmi.send_recv(cmd)?)
    }
}

struct RawCommand {
    netfn: crate::connection::NetFn,
    cmd: u8,
    data: Vec<u8>,
}

impl From<RawCommand> for crate::connection::Message {
    fn from(value: RawCommand) -> Self {
        crate::connection::Message::new_request(value.netfn, value.cmd, value.data)
    }
}

impl crate::connection::IpmiCommand for RawCommand {
    type Output = Vec<u8>;
    type Error = ();

    fn parse_success_response(data: &[u8]) -> Result<Self::Output, Self::Error> {
        Ok(data.to_vec())
    }
}
