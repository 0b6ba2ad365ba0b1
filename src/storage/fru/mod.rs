//! FRU (Field Replaceable Unit) inventory commands and the binary layout of
//! the common header / product-info area, per the IPMI FRU Information
//! Storage Definition.

use crate::connection::{IpmiCommand, Message, NetFn};

/// `Get FRU Inventory Area Info` (storage, cmd `0x10`).
#[derive(Debug, Clone, Copy)]
pub struct GetFruInventoryAreaInfo {
    pub fru_device_id: u8,
}

#[derive(Debug, Clone, Copy)]
pub struct FruInventoryAreaInfo {
    pub size_bytes: u16,
    pub access_by_words: bool,
}

impl From<GetFruInventoryAreaInfo> for Message {
    fn from(value: GetFruInventoryAreaInfo) -> Self {
        Message::new_request(NetFn::Storage, 0x10, vec![value.fru_device_id])
    }
}

impl IpmiCommand for GetFruInventoryAreaInfo {
    type Output = FruInventoryAreaInfo;
    type Error = ();

    fn parse_success_response(data: &[u8]) -> Result<Self::Output, Self::Error> {
        if data.len() < 3 {
            return Err(());
        }

        Ok(FruInventoryAreaInfo {
            size_bytes: u16::from_le_bytes([data[0], data[1]]),
            access_by_words: (data[2] & 0x1) == 0x1,
        })
    }
}

/// `Read FRU Data` (storage, cmd `0x11`). Reads up to `count` bytes
/// starting at `offset` from the device's FRU inventory area.
#[derive(Debug, Clone, Copy)]
pub struct ReadFruData {
    pub fru_device_id: u8,
    pub offset: u16,
    pub count: u8,
}

impl From<ReadFruData> for Message {
    fn from(value: ReadFruData) -> Self {
        let offset = value.offset.to_le_bytes();
        Message::new_request(
            NetFn::Storage,
            0x11,
            vec![value.fru_device_id, offset[0], offset[1], value.count],
        )
    }
}

impl IpmiCommand for ReadFruData {
    type Output = Vec<u8>;
    type Error = ();

    fn parse_success_response(data: &[u8]) -> Result<Self::Output, Self::Error> {
        if data.is_empty() {
            return Err(());
        }

        let count_returned = data[0] as usize;
        let payload = &data[1..];

        if payload.len() < count_returned {
            return Err(());
        }

        Ok(payload[..count_returned].to_vec())
    }
}

/// A single decoded type/length-encoded field from a product-info area.
#[derive(Debug, Clone)]
pub struct FruDataField {
    pub value: Vec<u8>,
}

/// The product-info area of a FRU's inventory, as defined by the common
/// header's `product_info_offset`.
#[derive(Debug, Clone)]
pub struct ProductInfoArea {
    pub manufacturer: FruDataField,
    pub name: FruDataField,
    pub part_number: FruDataField,
    pub version: FruDataField,
    pub serial_number: FruDataField,
    pub asset_tag: FruDataField,
    pub fru_file_id: FruDataField,
}

impl ProductInfoArea {
    /// Enumerate the named fields of this area, in the order they appear
    /// on the wire.
    pub fn fields(&self) -> [(&'static str, &FruDataField); 7] {
        [
            ("manufacturer", &self.manufacturer),
            ("name", &self.name),
            ("part_number", &self.part_number),
            ("version", &self.version),
            ("serial_number", &self.serial_number),
            ("asset_tag", &self.asset_tag),
            ("fru_file_id", &self.fru_file_id),
        ]
    }
}

/// The common header of a FRU inventory area.
#[derive(Debug, Clone, Copy)]
struct CommonHeader {
    product_info_offset: usize,
}

impl CommonHeader {
    fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < 8 {
            return None;
        }

        // Offsets in the common header are expressed in multiples of 8 bytes.
        Some(Self {
            product_info_offset: data[4] as usize * 8,
        })
    }
}

fn read_type_length_field(data: &[u8], cursor: &mut usize) -> Option<Vec<u8>> {
    let type_length = *data.get(*cursor)?;
    *cursor += 1;

    // 0xC1 is the "no more fields" marker.
    if type_length == 0xC1 {
        return None;
    }

    let len = (type_length & 0x3F) as usize;
    let field = data.get(*cursor..*cursor + len)?.to_vec();
    *cursor += len;

    Some(field)
}

/// Parse a full FRU inventory dump (as concatenated from repeated
/// [`ReadFruData`] reads) into its product-info area.
pub fn parse_product_info_area(data: &[u8]) -> Option<ProductInfoArea> {
    let header = CommonHeader::parse(data)?;

    if header.product_info_offset == 0 {
        return None;
    }

    let area = data.get(header.product_info_offset..)?;

    if area.len() < 3 {
        return None;
    }

    // area[0] = format version, area[1] = area length in 8-byte multiples,
    // area[2] = language code.
    let mut cursor = 3;

    let manufacturer = read_type_length_field(area, &mut cursor).unwrap_or_default();
    let name = read_type_length_field(area, &mut cursor).unwrap_or_default();
    let part_number = read_type_length_field(area, &mut cursor).unwrap_or_default();
    let version = read_type_length_field(area, &mut cursor).unwrap_or_default();
    let serial_number = read_type_length_field(area, &mut cursor).unwrap_or_default();
    let asset_tag = read_type_length_field(area, &mut cursor).unwrap_or_default();
    let fru_file_id = read_type_length_field(area, &mut cursor).unwrap_or_default();

    Some(ProductInfoArea {
        manufacturer: FruDataField { value: manufacturer },
        name: FruDataField { value: name },
        part_number: FruDataField { value: part_number },
        version: FruDataField { value: version },
        serial_number: FruDataField { value: serial_number },
        asset_tag: FruDataField { value: asset_tag },
        fru_file_id: FruDataField { value: fru_file_id },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_product_info_area() {
        let mut data = vec![0u8; 16];
        // common header: product info offset at byte 2 of 8-byte units (offset 16)
        data[4] = 2;
        data.extend_from_slice(&[
            0x01, // format version
            0x00, // area length placeholder
            0x00, // language code
            0xC5, b'A', b'c', b'm', b'e', // manufacturer "Acme" (type=11, len=5)
            0xC1, // name: empty -> end marker terminates remaining fields
        ]);

        let area = parse_product_info_area(&data).unwrap();
        assert_eq!(area.manufacturer.value, b"Acme");
        assert!(area.name.value.is_empty());
    }
}
