use crate::error::{DecodeError, DecodeResult};
use crate::parser::stream::{encode_latin1, RecordStream};
use crate::types::{RawHeader, Scales, HEADER_SIZE};
use std::io::Read;

const TITLE_LEN: usize = 112;
const ID_LEN: usize = 8;
const LOG_NAME_LEN: usize = 80;
const ENG_UNITS_LEN: usize = 8;
const PAD_AFTER_START_EV: usize = 12;
const PAD_TAIL: usize = 6;

/// Decode the fixed 304-byte header record
pub fn decode_header(bytes: &[u8; HEADER_SIZE]) -> DecodeResult<RawHeader> {
    let mut stream = RecordStream::new(bytes);

    let title = stream.read_text::<TITLE_LEN>()?;
    let scales = Scales {
        raw_zero: stream.read_f32()?,
        raw_full: stream.read_f32()?,
        eng_zero: stream.read_f32()?,
        eng_full: stream.read_f32()?,
    };
    let id = stream.read_text::<ID_LEN>()?;
    let file_kind = stream.read_u16()?;
    let version = stream.read_u16()?;
    let start_ev_no = stream.read_i64()?;
    stream.skip(PAD_AFTER_START_EV)?;
    let log_name = stream.read_text::<LOG_NAME_LEN>()?;
    let mode = stream.read_u32()?;
    let area = stream.read_u16()?;
    let privilege = stream.read_u16()?;
    let file_type = stream.read_u16()?;
    let sample_period = stream.read_u32()?;
    let eng_units = stream.read_text::<ENG_UNITS_LEN>()?;
    let format = stream.read_u32()?;
    let start_time = stream.read_u64()?;
    let end_time = stream.read_u64()?;
    let data_length = stream.read_u32()?;
    let file_pointer = stream.read_u32()?;
    let end_ev_no = stream.read_i64()?;
    stream.skip(PAD_TAIL)?;
    debug_assert_eq!(stream.remaining(), 0);

    Ok(RawHeader {
        title,
        scales,
        id,
        file_kind,
        version,
        start_ev_no,
        log_name,
        mode,
        area,
        privilege,
        file_type,
        sample_period,
        eng_units,
        format,
        start_time,
        end_time,
        data_length,
        file_pointer,
        end_ev_no,
    })
}

/// Decode a header from the start of a byte slice
pub fn decode_header_slice(data: &[u8]) -> DecodeResult<RawHeader> {
    let record: &[u8; HEADER_SIZE] = data
        .get(..HEADER_SIZE)
        .and_then(|head| head.try_into().ok())
        .ok_or(DecodeError::Truncated {
            expected: HEADER_SIZE,
            actual: data.len(),
        })?;
    decode_header(record)
}

/// Read and decode the header from a reader positioned at offset 0.
///
/// On success the reader is left at the first sample.
pub fn read_header<R: Read>(reader: &mut R) -> DecodeResult<RawHeader> {
    let mut record = [0u8; HEADER_SIZE];
    let filled = read_full(reader, &mut record)?;
    if filled < HEADER_SIZE {
        return Err(DecodeError::Truncated {
            expected: HEADER_SIZE,
            actual: filled,
        });
    }
    decode_header(&record)
}

/// Fill `buf` from `reader` until it is full or the reader is exhausted.
/// Returns the number of bytes read.
pub(crate) fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

impl RawHeader {
    /// Encode into the on-disk layout. Padding bytes are written as zero.
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        let mut pos = 0;

        let mut put = |bytes: &[u8], pos: &mut usize| {
            out[*pos..*pos + bytes.len()].copy_from_slice(bytes);
            *pos += bytes.len();
        };

        let mut text = [0u8; TITLE_LEN];
        encode_latin1(&self.title, &mut text);
        put(&text, &mut pos);
        put(&self.scales.raw_zero.to_le_bytes(), &mut pos);
        put(&self.scales.raw_full.to_le_bytes(), &mut pos);
        put(&self.scales.eng_zero.to_le_bytes(), &mut pos);
        put(&self.scales.eng_full.to_le_bytes(), &mut pos);
        let mut text = [0u8; ID_LEN];
        encode_latin1(&self.id, &mut text);
        put(&text, &mut pos);
        put(&self.file_kind.to_le_bytes(), &mut pos);
        put(&self.version.to_le_bytes(), &mut pos);
        put(&self.start_ev_no.to_le_bytes(), &mut pos);
        put(&[0u8; PAD_AFTER_START_EV], &mut pos);
        let mut text = [0u8; LOG_NAME_LEN];
        encode_latin1(&self.log_name, &mut text);
        put(&text, &mut pos);
        put(&self.mode.to_le_bytes(), &mut pos);
        put(&self.area.to_le_bytes(), &mut pos);
        put(&self.privilege.to_le_bytes(), &mut pos);
        put(&self.file_type.to_le_bytes(), &mut pos);
        put(&self.sample_period.to_le_bytes(), &mut pos);
        let mut text = [0u8; ENG_UNITS_LEN];
        encode_latin1(&self.eng_units, &mut text);
        put(&text, &mut pos);
        put(&self.format.to_le_bytes(), &mut pos);
        put(&self.start_time.to_le_bytes(), &mut pos);
        put(&self.end_time.to_le_bytes(), &mut pos);
        put(&self.data_length.to_le_bytes(), &mut pos);
        put(&self.file_pointer.to_le_bytes(), &mut pos);
        put(&self.end_ev_no.to_le_bytes(), &mut pos);
        put(&[0u8; PAD_TAIL], &mut pos);
        debug_assert_eq!(pos, HEADER_SIZE);

        out
    }
}
