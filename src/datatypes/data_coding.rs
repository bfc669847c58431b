// ABOUTME: SMPP data_coding scheme values used by submit paths and the short
// ABOUTME: message layer to select text encodings and capacity limits

/// data_coding values from SMPP v3.4 Section 5.2.19.
///
/// Values the library does not model explicitly round-trip through `Other`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum DataCoding {
    /// SMSC default alphabet, GSM 03.38 (0x00)
    #[default]
    Default,
    /// IA5/ASCII (0x01)
    Ia5,
    /// 8-bit binary (0x02; 0x04 decodes here as well)
    Binary,
    /// ISO-8859-1 (0x03)
    Latin1,
    /// ISO-8859-5 Cyrillic (0x06)
    Cyrillic,
    /// ISO-8859-8 Latin/Hebrew (0x07)
    LatinHebrew,
    /// UCS-2, UTF-16BE on the wire (0x08)
    Ucs2,
    /// Any other raw data_coding octet
    Other(u8),
}

impl DataCoding {
    pub fn from_byte(value: u8) -> Self {
        match value {
            0x00 => DataCoding::Default,
            0x01 => DataCoding::Ia5,
            0x02 | 0x04 => DataCoding::Binary,
            0x03 => DataCoding::Latin1,
            0x06 => DataCoding::Cyrillic,
            0x07 => DataCoding::LatinHebrew,
            0x08 => DataCoding::Ucs2,
            other => DataCoding::Other(other),
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            DataCoding::Default => 0x00,
            DataCoding::Ia5 => 0x01,
            DataCoding::Binary => 0x02,
            DataCoding::Latin1 => 0x03,
            DataCoding::Cyrillic => 0x06,
            DataCoding::LatinHebrew => 0x07,
            DataCoding::Ucs2 => 0x08,
            DataCoding::Other(value) => value,
        }
    }

    /// True for the codings that carry GSM 03.38 septets.
    pub fn is_gsm(self) -> bool {
        matches!(self, DataCoding::Default)
    }
}

impl From<u8> for DataCoding {
    fn from(value: u8) -> Self {
        Self::from_byte(value)
    }
}

impl From<DataCoding> for u8 {
    fn from(coding: DataCoding) -> Self {
        coding.to_byte()
    }
}
