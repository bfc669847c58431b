//! Short message helpers: text encoding selection, GSM 03.38 translation,
//! 7-bit packing and multipart splitting with UDH concatenation headers.
//!
//! [`split_short_message`] is the usual entry point when submitting text of
//! arbitrary length; each returned part goes out as the short_message of its
//! own submit_sm, with the returned esm_class and data_coding applied.

pub mod gsm0338;

use std::sync::atomic::{AtomicU8, Ordering};

use thiserror::Error;

use crate::datatypes::DataCoding;

/// Single-part and multipart capacity per coding, in the unit the coding
/// counts (septets for GSM, octets otherwise). The multipart figures leave
/// room for the 6-octet concatenation UDH.
const GSM_SINGLE_MAX: usize = 160;
const GSM_PART_MAX: usize = 153;
const OCTET_SINGLE_MAX: usize = 140;
const OCTET_PART_MAX: usize = 134;

/// Rolling reference for concatenated message sets.
static CONCAT_REF: AtomicU8 = AtomicU8::new(0);

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SmError {
    #[error(transparent)]
    Gsm(#[from] gsm0338::Gsm0338Error),
    #[error("character {0:?} is outside ISO-8859-1")]
    NotLatin1(char),
    #[error("data_coding {0:#04x} is not supported for text input")]
    UnsupportedCoding(u8),
    #[error("byte {0:#04x} exceeds the 7-bit range")]
    NotASeptet(u8),
    #[error("message would split into {0} parts; a UDH reference numbers at most 255")]
    TooManyParts(usize),
}

/// Payload handed to the short message layer: text to be encoded, or bytes
/// that are already in their wire encoding and pass through untouched.
#[derive(Clone, Copy, Debug)]
pub enum SmContent<'a> {
    Text(&'a str),
    Bytes(&'a [u8]),
}

impl<'a> From<&'a str> for SmContent<'a> {
    fn from(text: &'a str) -> Self {
        SmContent::Text(text)
    }
}

impl<'a> From<&'a [u8]> for SmContent<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        SmContent::Bytes(bytes)
    }
}

/// Result of [`split_short_message`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitMessage {
    /// 0x00 for a single part, 0x40 (UDH indicator) when parts carry a UDH.
    pub esm_class: u8,
    /// The coding actually used, after any UCS-2 fallback.
    pub data_coding: DataCoding,
    /// Wire-ready short_message payloads, UDH included when multipart.
    pub parts: Vec<Vec<u8>>,
}

/// Pack GSM septet values LSB-first into octets.
///
/// Packing N septets yields ceil(7N/8) octets; any input byte above 0x7F is
/// rejected.
///
/// ```
/// use smpp_esme::sm::pack_7bit;
/// assert_eq!(pack_7bit(b"7bit").unwrap(), [0x37, 0x71, 0x9A, 0x0E]);
/// ```
pub fn pack_7bit(septets: &[u8]) -> Result<Vec<u8>, SmError> {
    let mut out = vec![0u8; (septets.len() * 7 + 7) / 8];
    for (i, &septet) in septets.iter().enumerate() {
        if septet > 0x7F {
            return Err(SmError::NotASeptet(septet));
        }
        let bit = i * 7;
        let spread = (septet as u16) << (bit % 8);
        out[bit / 8] |= spread as u8;
        if spread > 0xFF {
            out[bit / 8 + 1] |= (spread >> 8) as u8;
        }
    }
    Ok(out)
}

/// Unpack `count` septets from an LSB-first packed octet string. The inverse
/// of [`pack_7bit`]; the septet count comes from an external length such as
/// the UDL field.
pub fn unpack_7bit(packed: &[u8], count: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        let bit = i * 7;
        let index = bit / 8;
        if index >= packed.len() {
            break;
        }
        let mut value = (packed[index] as u16) >> (bit % 8);
        if index + 1 < packed.len() {
            value |= (packed[index + 1] as u16) << (8 - bit % 8);
        }
        out.push((value & 0x7F) as u8);
    }
    out
}

/// Encode a short message in the requested coding.
///
/// Byte content passes through untouched together with the requested coding.
/// Text requested as `DATA_CODING_DEFAULT` that the GSM 03.38 alphabet cannot
/// express falls back to UCS-2; the effective coding is returned alongside
/// the bytes.
pub fn encode_short_message(
    content: SmContent<'_>,
    coding: DataCoding,
) -> Result<(Vec<u8>, DataCoding), SmError> {
    let text = match content {
        SmContent::Bytes(bytes) => return Ok((bytes.to_vec(), coding)),
        SmContent::Text(text) => text,
    };
    match coding {
        DataCoding::Default => match gsm0338::encode(text) {
            Ok(data) => Ok((data, DataCoding::Default)),
            Err(_) => Ok((encode_ucs2(text), DataCoding::Ucs2)),
        },
        DataCoding::Latin1 => Ok((encode_latin1(text)?, DataCoding::Latin1)),
        DataCoding::Ucs2 => Ok((encode_ucs2(text), DataCoding::Ucs2)),
        other => Err(SmError::UnsupportedCoding(other.to_byte())),
    }
}

/// Encode a message and split it into submittable parts.
///
/// A message within the single-part limit of its coding comes back as one
/// part with esm_class 0. A longer message is split on character boundaries
/// (a GSM escape pair or a UTF-16 surrogate pair never straddles two parts)
/// and each part is prefixed with a 6-octet concatenation UDH sharing one
/// reference number; esm_class has the UDH indicator bit set.
pub fn split_short_message(
    content: SmContent<'_>,
    coding: DataCoding,
) -> Result<SplitMessage, SmError> {
    let (data_coding, units) = match content {
        SmContent::Bytes(bytes) => {
            let chunk_units = bytes.iter().map(|&b| vec![b]).collect();
            (coding, chunk_units)
        }
        SmContent::Text(text) => encode_units(text, coding)?,
    };

    let (single_max, part_max) = if data_coding.is_gsm() {
        (GSM_SINGLE_MAX, GSM_PART_MAX)
    } else {
        (OCTET_SINGLE_MAX, OCTET_PART_MAX)
    };

    let total: usize = units.iter().map(Vec::len).sum();
    if total <= single_max {
        let mut single = Vec::with_capacity(total);
        for unit in units {
            single.extend_from_slice(&unit);
        }
        return Ok(SplitMessage {
            esm_class: 0x00,
            data_coding,
            parts: vec![single],
        });
    }

    let mut chunks: Vec<Vec<u8>> = Vec::new();
    let mut current: Vec<u8> = Vec::with_capacity(part_max);
    for unit in units {
        if current.len() + unit.len() > part_max {
            chunks.push(std::mem::take(&mut current));
        }
        current.extend_from_slice(&unit);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    if chunks.len() > 255 {
        return Err(SmError::TooManyParts(chunks.len()));
    }

    let reference = CONCAT_REF.fetch_add(1, Ordering::Relaxed);
    let total_parts = chunks.len() as u8;
    let parts = chunks
        .into_iter()
        .enumerate()
        .map(|(index, chunk)| {
            let mut part = Vec::with_capacity(6 + chunk.len());
            part.extend_from_slice(&[0x05, 0x00, 0x03, reference, total_parts, index as u8 + 1]);
            part.extend_from_slice(&chunk);
            part
        })
        .collect();

    Ok(SplitMessage {
        esm_class: 0x40,
        data_coding,
        parts,
    })
}

/// Per-character encoded units in the effective coding; units are the atoms
/// splitting may never break apart.
fn encode_units(
    text: &str,
    coding: DataCoding,
) -> Result<(DataCoding, Vec<Vec<u8>>), SmError> {
    match coding {
        DataCoding::Default => {
            if gsm0338::is_representable(text) {
                let units = text
                    .chars()
                    .map(|c| {
                        // is_representable vouched for every character
                        gsm0338::encode(&c.to_string()).unwrap_or_default()
                    })
                    .collect();
                Ok((DataCoding::Default, units))
            } else {
                Ok((DataCoding::Ucs2, ucs2_units(text)))
            }
        }
        DataCoding::Latin1 => {
            let units = text
                .chars()
                .map(|c| {
                    let code = c as u32;
                    if code > 0xFF {
                        Err(SmError::NotLatin1(c))
                    } else {
                        Ok(vec![code as u8])
                    }
                })
                .collect::<Result<_, _>>()?;
            Ok((DataCoding::Latin1, units))
        }
        DataCoding::Ucs2 => Ok((DataCoding::Ucs2, ucs2_units(text))),
        other => Err(SmError::UnsupportedCoding(other.to_byte())),
    }
}

fn ucs2_units(text: &str) -> Vec<Vec<u8>> {
    text.chars()
        .map(|c| {
            let mut buf = [0u16; 2];
            c.encode_utf16(&mut buf)
                .iter()
                .flat_map(|unit| unit.to_be_bytes())
                .collect()
        })
        .collect()
}

fn encode_ucs2(text: &str) -> Vec<u8> {
    text.encode_utf16()
        .flat_map(|unit| unit.to_be_bytes())
        .collect()
}

fn encode_latin1(text: &str) -> Result<Vec<u8>, SmError> {
    text.chars()
        .map(|c| {
            let code = c as u32;
            if code > 0xFF {
                Err(SmError::NotLatin1(c))
            } else {
                Ok(code as u8)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // 89 characters
    const MSG_SHORT: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit. \
                             Suspendisse mi lacus massa nunc.";
    // 7 characters, none of them in GSM 03.38
    const MSG_SHORT_UNICODE: &str = "可輸入英文單字";
    // 203 characters
    const MSG_LONG: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit. Nunc \
                            lobortis faucibus ante, eget tristique nibh. Mauris feugiat \
                            rutrum nisl et dignissim. Suspendisse quam nulla, vulputate \
                            vel mi sit amet nunc.";

    #[test]
    fn pack_7bit_reference_value() {
        assert_eq!(pack_7bit(b"7bit").unwrap(), [0x37, 0x71, 0x9A, 0x0E]);
    }

    #[test]
    fn pack_7bit_rejects_high_bytes() {
        assert_eq!(pack_7bit(&[0x80]), Err(SmError::NotASeptet(0x80)));
    }

    #[test]
    fn pack_unpack_roundtrip() {
        let cases: &[&[u8]] = &[
            b"",
            b"a",
            b"7bit",
            b"hello world",
            &[0x00, 0x7F, 0x01, 0x7E, 0x02],
            b"exactly8chr",
        ];
        for &case in cases {
            let packed = pack_7bit(case).unwrap();
            assert_eq!(packed.len(), (case.len() * 7 + 7) / 8);
            assert_eq!(unpack_7bit(&packed, case.len()), case, "case {case:?}");
        }
    }

    #[test]
    fn encode_gsm_passthrough_and_fallback() {
        let (data, coding) =
            encode_short_message(SmContent::Text("abc"), DataCoding::Default).unwrap();
        assert_eq!(data, b"abc");
        assert_eq!(coding, DataCoding::Default);

        let (data, coding) =
            encode_short_message(SmContent::Text("€"), DataCoding::Default).unwrap();
        assert_eq!(data, [0x20, 0xAC]);
        assert_eq!(coding, DataCoding::Ucs2);
    }

    #[test]
    fn encode_bytes_pass_through() {
        let payload = [0x01u8, 0x80, 0xFF];
        let (data, coding) =
            encode_short_message(SmContent::Bytes(&payload), DataCoding::Binary).unwrap();
        assert_eq!(data, payload);
        assert_eq!(coding, DataCoding::Binary);
    }

    #[test]
    fn latin1_failure_is_an_error() {
        assert_eq!(
            encode_short_message(SmContent::Text("€"), DataCoding::Latin1),
            Err(SmError::NotLatin1('€'))
        );
    }

    #[test]
    fn split_short_gsm() {
        let split = split_short_message(SmContent::Text(MSG_SHORT), DataCoding::Default).unwrap();
        assert_eq!(split.esm_class, 0x00);
        assert_eq!(split.data_coding, DataCoding::Default);
        assert_eq!(split.parts.len(), 1);
        assert_eq!(split.parts[0].len(), 89);
    }

    #[test]
    fn split_short_latin1() {
        let split = split_short_message(SmContent::Text(MSG_SHORT), DataCoding::Latin1).unwrap();
        assert_eq!(split.esm_class, 0x00);
        assert_eq!(split.data_coding, DataCoding::Latin1);
        assert_eq!(split.parts.len(), 1);
    }

    #[test]
    fn split_short_ucs2() {
        let split = split_short_message(SmContent::Text(MSG_SHORT), DataCoding::Ucs2).unwrap();
        assert_eq!(split.esm_class, 0x40);
        assert_eq!(split.data_coding, DataCoding::Ucs2);
        assert_eq!(split.parts.len(), 2);
    }

    #[test]
    fn split_short_gsm_falls_back_to_ucs2() {
        let split =
            split_short_message(SmContent::Text(MSG_SHORT_UNICODE), DataCoding::Default).unwrap();
        assert_eq!(split.esm_class, 0x00);
        assert_eq!(split.data_coding, DataCoding::Ucs2);
        assert_eq!(split.parts.len(), 1);
        assert_eq!(split.parts[0].len(), 14);
    }

    #[test]
    fn split_long_gsm() {
        let split = split_short_message(SmContent::Text(MSG_LONG), DataCoding::Default).unwrap();
        assert_eq!(split.esm_class, 0x40);
        assert_eq!(split.data_coding, DataCoding::Default);
        assert_eq!(split.parts.len(), 2);
        assert_eq!(split.parts[0].len(), 6 + 153);
        assert_eq!(split.parts[1].len(), 6 + 50);
    }

    #[test]
    fn split_long_ucs2() {
        let split = split_short_message(SmContent::Text(MSG_LONG), DataCoding::Ucs2).unwrap();
        assert_eq!(split.esm_class, 0x40);
        assert_eq!(split.parts.len(), 4);
    }

    #[test]
    fn udh_is_consistent_across_parts() {
        let split = split_short_message(SmContent::Text(MSG_LONG), DataCoding::Ucs2).unwrap();
        let reference = split.parts[0][3];
        for (index, part) in split.parts.iter().enumerate() {
            assert_eq!(part[0], 0x05);
            assert_eq!(part[1], 0x00);
            assert_eq!(part[2], 0x03);
            assert_eq!(part[3], reference);
            assert_eq!(part[4], split.parts.len() as u8);
            assert_eq!(part[5], index as u8 + 1);
        }
    }

    #[test]
    fn concatenated_payloads_reassemble() {
        let split = split_short_message(SmContent::Text(MSG_LONG), DataCoding::Default).unwrap();
        let mut reassembled = Vec::new();
        for part in &split.parts {
            reassembled.extend_from_slice(&part[6..]);
        }
        assert_eq!(gsm0338::decode(&reassembled).unwrap(), MSG_LONG);
    }

    #[test]
    fn escape_pairs_never_straddle_parts() {
        // every character costs two septets, so an odd capacity boundary
        // must move rather than split a pair
        let text = "€".repeat(100); // 200 septets
        let split = split_short_message(SmContent::Text(text.as_str()), DataCoding::Default).unwrap();
        assert_eq!(split.esm_class, 0x40);
        assert_eq!(split.parts.len(), 2);
        // 153 is odd; a part may carry at most 152 septets of escape pairs
        assert_eq!(split.parts[0].len() - 6, 152);
        for part in &split.parts {
            let payload = &part[6..];
            assert_eq!(payload.len() % 2, 0);
            gsm0338::decode(payload).unwrap();
        }
    }

    #[test]
    fn byte_payloads_split_on_byte_boundaries() {
        let payload = vec![0xAB; 300];
        let split = split_short_message(SmContent::Bytes(&payload), DataCoding::Ucs2).unwrap();
        assert_eq!(split.esm_class, 0x40);
        assert_eq!(split.data_coding, DataCoding::Ucs2);
        assert_eq!(split.parts.len(), 3);
        assert_eq!(split.parts[0].len() - 6, 134);
        assert_eq!(split.parts[2].len() - 6, 300 - 2 * 134);
    }
}
