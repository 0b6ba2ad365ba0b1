//! Pure decoders for FRU inventory data: product-info areas (read via the
//! storage netfn) and AMC/RTM EEPROM dumps (read via vendor raw commands).
//!
//! Nothing in this module touches the network; callers acquire the raw
//! bytes through [`crate::transport::Transport`] and hand them here.

use std::collections::BTreeMap;

use crate::storage::fru::ProductInfoArea;

/// A decoded FRU field, keyed by its tree-facing name.
pub type FieldMap = BTreeMap<String, String>;

/// Decode a [`ProductInfoArea`] into display-ready named fields.
///
/// Field names have spaces rewritten to `_`; the literal name `name` is
/// rewritten to `Name` to avoid colliding with a container's own name
/// attribute (I4). `serial_number` is rendered as lowercase hex with no
/// separator; every other field is trimmed of ASCII whitespace and decoded
/// as Latin-1.
pub fn decode_product_info_area(area: &ProductInfoArea) -> FieldMap {
    let mut fields = FieldMap::new();

    for (name, field) in area.fields() {
        let key = rename_field(name);

        let value = if name == "serial_number" {
            hex_lower(&field.value)
        } else {
            latin1_trimmed(&field.value)
        };

        fields.insert(key, value);
    }

    fields
}

fn rename_field(name: &str) -> String {
    let renamed = name.replace(' ', "_");

    if renamed == "name" {
        "Name".to_string()
    } else {
        renamed
    }
}

fn hex_lower(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn latin1_trimmed(bytes: &[u8]) -> String {
    let s: String = bytes.iter().map(|&b| b as char).collect();
    s.trim_matches(|c: char| c.is_ascii_whitespace()).to_string()
}

/// One entry of an EEPROM field map: the tree-facing name, the byte that
/// terminates the field, the number of bytes to skip after the marker
/// before starting the next field, and how to render the extracted bytes.
pub struct EepromField {
    pub name: &'static str,
    pub marker: u8,
    pub step: usize,
    pub format: EepromFormat,
}

/// How an extracted EEPROM byte range is rendered to a string.
#[derive(Clone, Copy)]
pub enum EepromFormat {
    /// Each byte is interpreted directly as a character.
    Char,
    /// Each byte is rendered as two lowercase hex digits.
    Hex2,
}

/// Field map for an AMC EEPROM dump, in declared order.
pub const AMC_FIELDS: &[EepromField] = &[
    EepromField {
        name: "Product_Mfg_Name",
        marker: 0xC0,
        step: 2,
        format: EepromFormat::Char,
    },
    EepromField {
        name: "Product_Part_Number",
        marker: 0xC3,
        step: 1,
        format: EepromFormat::Char,
    },
    EepromField {
        name: "Product_Version",
        marker: 0x08,
        step: 1,
        format: EepromFormat::Char,
    },
    EepromField {
        name: "Product_Serial_No",
        marker: 0xE0,
        step: 1,
        format: EepromFormat::Hex2,
    },
    EepromField {
        name: "Product_Asset_Tag",
        marker: 0x00,
        step: 1,
        format: EepromFormat::Char,
    },
];

/// Field map for an RTM EEPROM dump: the AMC fields plus `Product_Name`
/// inserted between the manufacturer name and the part number.
pub const RTM_FIELDS: &[EepromField] = &[
    EepromField {
        name: "Product_Mfg_Name",
        marker: 0xD3,
        step: 1,
        format: EepromFormat::Char,
    },
    EepromField {
        name: "Product_Name",
        marker: 0xD1,
        step: 1,
        format: EepromFormat::Char,
    },
    EepromField {
        name: "Product_Part_Number",
        marker: 0xC3,
        step: 1,
        format: EepromFormat::Char,
    },
    EepromField {
        name: "Product_Version",
        marker: 0x08,
        step: 1,
        format: EepromFormat::Char,
    },
    EepromField {
        name: "Product_Serial_No",
        marker: 0xE0,
        step: 1,
        format: EepromFormat::Hex2,
    },
    EepromField {
        name: "Product_Asset_Tag",
        marker: 0x00,
        step: 1,
        format: EepromFormat::Char,
    },
];

/// The cursor starting offset for an AMC EEPROM dump.
pub const AMC_START_CURSOR: usize = 0x4C;
/// The cursor starting offset for an RTM EEPROM dump.
pub const RTM_START_CURSOR: usize = 0x74;

/// Walk `fields` over `dump` starting at `start_cursor`, emitting one
/// decoded string per field found. A field whose marker never occurs at or
/// after the current cursor is omitted, and the cursor does not advance
/// for it — the remaining fields are attempted from the same position.
pub fn decode_eeprom(dump: &[u8], fields: &[EepromField], start_cursor: usize) -> FieldMap {
    let mut out = FieldMap::new();
    let mut s1 = start_cursor;

    for field in fields {
        let Some(marker_pos) = find_marker(dump, s1, field.marker) else {
            continue;
        };

        let slice = &dump[s1..marker_pos];
        let value = match field.format {
            EepromFormat::Char => slice.iter().map(|&b| b as char).collect(),
            EepromFormat::Hex2 => hex_lower(slice),
        };

        out.insert(field.name.to_string(), value);
        s1 = marker_pos + field.step;
    }

    out
}

fn find_marker(dump: &[u8], from: usize, marker: u8) -> Option<usize> {
    dump.get(from..)?
        .iter()
        .position(|&b| b == marker)
        .map(|offset| from + offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::fru::FruDataField;

    #[test]
    fn renames_name_field_and_hexes_serial() {
        let area = ProductInfoArea {
            manufacturer: FruDataField {
                value: b"  Acme ".to_vec(),
            },
            name: FruDataField {
                value: b"Widget".to_vec(),
            },
            part_number: FruDataField { value: vec![] },
            version: FruDataField { value: vec![] },
            serial_number: FruDataField {
                value: vec![0x12, 0x34, 0x56],
            },
            asset_tag: FruDataField { value: vec![] },
            fru_file_id: FruDataField { value: vec![] },
        };

        let fields = decode_product_info_area(&area);

        assert_eq!(fields.get("manufacturer").unwrap(), "Acme");
        assert_eq!(fields.get("Name").unwrap(), "Widget");
        assert!(!fields.contains_key("name"));
        assert_eq!(fields.get("serial_number").unwrap(), "123456");
    }

    #[test]
    fn decodes_amc_eeprom_field_map() {
        let mut dump = vec![0u8; AMC_START_CURSOR];
        dump.extend_from_slice(b"Acme Inc");
        dump.push(0xC0);
        dump.push(0); // step 2: skip one byte after the marker
        dump.extend_from_slice(b"PN-1234");
        dump.push(0xC3);
        dump.extend_from_slice(b"v1.0");
        dump.push(0x08);
        dump.extend_from_slice(&[0xAB, 0xCD]);
        dump.push(0xE0);
        dump.extend_from_slice(b"TAG42");
        dump.push(0x00);

        let fields = decode_eeprom(&dump, AMC_FIELDS, AMC_START_CURSOR);

        assert_eq!(fields.get("Product_Mfg_Name").unwrap(), "Acme Inc");
        assert_eq!(fields.get("Product_Part_Number").unwrap(), "PN-1234");
        assert_eq!(fields.get("Product_Version").unwrap(), "v1.0");
        assert_eq!(fields.get("Product_Serial_No").unwrap(), "abcd");
        assert_eq!(fields.get("Product_Asset_Tag").unwrap(), "TAG42");
    }

    #[test]
    fn missing_marker_is_skipped_without_advancing_cursor() {
        let mut dump = vec![0u8; AMC_START_CURSOR];
        dump.extend_from_slice(b"Acme");
        dump.push(0xC3); // Product_Part_Number's marker, but Mfg_Name's (0xC0) never appears
        dump.extend_from_slice(b"PN-1");
        dump.push(0x08);

        let fields = decode_eeprom(&dump, AMC_FIELDS, AMC_START_CURSOR);

        assert!(!fields.contains_key("Product_Mfg_Name"));
        assert_eq!(fields.get("Product_Part_Number").unwrap(), "Acme");
    }
}
