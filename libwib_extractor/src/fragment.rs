use byteorder::{LittleEndian, ReadBytesExt};
use std::fmt::Display;
use std::io::Cursor;

use super::constants::{FRAGMENT_HEADER_MAGIC, FRAGMENT_HEADER_SIZE};
use super::error::FragmentError;

/// The kind of readout a Fragment carries, as encoded in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentType {
    Unknown,
    TpcData,
    PdsData,
    TriggerPrimitives,
    TriggerActivities,
    TriggerCandidates,
    HardwareSignal,
    Other(u32),
}

impl From<u32> for FragmentType {
    fn from(value: u32) -> Self {
        match value {
            0 => Self::Unknown,
            1 => Self::TpcData,
            2 => Self::PdsData,
            3 => Self::TriggerPrimitives,
            4 => Self::TriggerActivities,
            5 => Self::TriggerCandidates,
            6 => Self::HardwareSignal,
            v => Self::Other(v),
        }
    }
}

impl Display for FragmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "Unknown"),
            Self::TpcData => write!(f, "TPCData"),
            Self::PdsData => write!(f, "PDSData"),
            Self::TriggerPrimitives => write!(f, "TriggerPrimitives"),
            Self::TriggerActivities => write!(f, "TriggerActivities"),
            Self::TriggerCandidates => write!(f, "TriggerCandidates"),
            Self::HardwareSignal => write!(f, "HardwareSignal"),
            Self::Other(v) => write!(f, "Other({v})"),
        }
    }
}

/// Identifies which piece of the detector produced a Fragment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ElementID {
    pub system_type: u32,
    pub region_id: u16,
    pub element_id: u32,
}

/// The fixed-layout header at the front of every Fragment.
///
/// All fields are little-endian. The header occupies [`FRAGMENT_HEADER_SIZE`] bytes
/// including the alignment padding around the element id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FragmentHeader {
    pub marker: u32,
    pub version: u32,
    pub size: u64,
    pub trigger_number: u64,
    pub trigger_timestamp: u64,
    pub window_begin: u64,
    pub window_end: u64,
    pub run_number: u32,
    pub error_bits: u32,
    pub fragment_type: u32,
    pub sequence_number: u16,
    pub element: ElementID,
}

impl TryFrom<&[u8]> for FragmentHeader {
    type Error = FragmentError;

    fn try_from(buffer: &[u8]) -> Result<Self, Self::Error> {
        if buffer.len() < FRAGMENT_HEADER_SIZE {
            return Err(FragmentError::BufferTooSmall(buffer.len()));
        }
        let mut cursor = Cursor::new(buffer);
        let mut header = FragmentHeader {
            marker: cursor.read_u32::<LittleEndian>()?,
            version: cursor.read_u32::<LittleEndian>()?,
            size: cursor.read_u64::<LittleEndian>()?,
            trigger_number: cursor.read_u64::<LittleEndian>()?,
            trigger_timestamp: cursor.read_u64::<LittleEndian>()?,
            window_begin: cursor.read_u64::<LittleEndian>()?,
            window_end: cursor.read_u64::<LittleEndian>()?,
            run_number: cursor.read_u32::<LittleEndian>()?,
            error_bits: cursor.read_u32::<LittleEndian>()?,
            fragment_type: cursor.read_u32::<LittleEndian>()?,
            sequence_number: cursor.read_u16::<LittleEndian>()?,
            ..Default::default()
        };
        cursor.read_u16::<LittleEndian>()?; // unused
        header.element.system_type = cursor.read_u32::<LittleEndian>()?;
        header.element.region_id = cursor.read_u16::<LittleEndian>()?;
        cursor.read_u16::<LittleEndian>()?; // padding
        header.element.element_id = cursor.read_u32::<LittleEndian>()?;

        if header.marker != FRAGMENT_HEADER_MAGIC {
            spdlog::warn!(
                "Fragment header marker {:#010x} does not match expected {:#010x}",
                header.marker,
                FRAGMENT_HEADER_MAGIC
            );
        }
        Ok(header)
    }
}

impl FragmentHeader {
    /// Size of the header in bytes
    pub const fn sizeof() -> usize {
        FRAGMENT_HEADER_SIZE
    }

    /// Number of payload bytes the header claims follow it. A size below the header is 0.
    pub fn payload_size(&self) -> usize {
        (self.size as usize).saturating_sub(Self::sizeof())
    }
}

/// One detector readout unit from a trigger record: a header and the raw payload behind it.
///
/// The Fragment owns the complete byte buffer (header included) as read from the file.
#[derive(Debug, Clone)]
pub struct Fragment {
    pub header: FragmentHeader,
    bytes: Vec<u8>,
}

impl TryFrom<Vec<u8>> for Fragment {
    type Error = FragmentError;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        let header = FragmentHeader::try_from(bytes.as_slice())?;
        Ok(Self { header, bytes })
    }
}

impl Fragment {
    pub fn get_header(&self) -> &FragmentHeader {
        &self.header
    }

    pub fn get_run_number(&self) -> u32 {
        self.header.run_number
    }

    pub fn get_trigger_number(&self) -> u64 {
        self.header.trigger_number
    }

    pub fn get_trigger_timestamp(&self) -> u64 {
        self.header.trigger_timestamp
    }

    pub fn get_window_begin(&self) -> u64 {
        self.header.window_begin
    }

    pub fn get_window_end(&self) -> u64 {
        self.header.window_end
    }

    pub fn get_fragment_type(&self) -> FragmentType {
        FragmentType::from(self.header.fragment_type)
    }

    pub fn get_fragment_type_code(&self) -> u32 {
        self.header.fragment_type
    }

    pub fn get_element_id(&self) -> &ElementID {
        &self.header.element
    }

    /// Total fragment size in bytes as recorded in the header (header included)
    pub fn get_size(&self) -> u64 {
        self.header.size
    }

    /// Get the payload following the header, starting `offset` bytes in.
    pub fn get_data(&self, offset: usize) -> Result<&[u8], FragmentError> {
        let payload = &self.bytes[FRAGMENT_HEADER_SIZE..];
        if offset > payload.len() {
            return Err(FragmentError::OffsetOutOfRange(offset, payload.len()));
        }
        Ok(&payload[offset..])
    }

    /// Number of complete frames of `frame_size` bytes behind the header.
    ///
    /// Trailing bytes that do not fill a whole frame are ignored.
    pub fn get_frame_count(&self, frame_size: usize) -> usize {
        self.get_header().payload_size() / frame_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::FragmentBuilder;

    #[test]
    fn test_parse_header() {
        let bytes = FragmentBuilder::new()
            .run_number(11918)
            .trigger_number(336)
            .trigger_timestamp(1_000_000)
            .window(999_000, 1_001_000)
            .fragment_type(1)
            .payload(vec![0xAB; 32])
            .build();
        let frag = match Fragment::try_from(bytes) {
            Ok(f) => f,
            Err(e) => panic!("{e}"),
        };
        assert_eq!(frag.header.marker, FRAGMENT_HEADER_MAGIC);
        assert_eq!(frag.get_run_number(), 11918);
        assert_eq!(frag.get_trigger_number(), 336);
        assert_eq!(frag.get_trigger_timestamp(), 1_000_000);
        assert_eq!(frag.get_window_begin(), 999_000);
        assert_eq!(frag.get_window_end(), 1_001_000);
        assert_eq!(frag.get_fragment_type(), FragmentType::TpcData);
        assert_eq!(frag.get_fragment_type_code(), 1);
        assert_eq!(frag.get_size(), (FRAGMENT_HEADER_SIZE + 32) as u64);
        assert_eq!(frag.get_element_id().element_id, 0);
    }

    #[test]
    fn test_short_buffer() {
        match Fragment::try_from(vec![0u8; FRAGMENT_HEADER_SIZE - 1]) {
            Err(FragmentError::BufferTooSmall(n)) => assert_eq!(n, FRAGMENT_HEADER_SIZE - 1),
            _ => panic!(),
        }
    }

    #[test]
    fn test_get_data_offsets() {
        let payload: Vec<u8> = (0..10).collect();
        let frag = Fragment::try_from(FragmentBuilder::new().payload(payload).build()).unwrap();
        assert_eq!(frag.get_data(0).unwrap(), &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert_eq!(frag.get_data(7).unwrap(), &[7, 8, 9]);
        assert!(frag.get_data(10).unwrap().is_empty());
        assert!(matches!(
            frag.get_data(11),
            Err(FragmentError::OffsetOutOfRange(11, 10))
        ));
    }

    #[test]
    fn test_frame_count_drops_remainder() {
        let frame_size = 464;
        for extra in [0, 1, 463] {
            let payload = vec![0u8; 3 * frame_size + extra];
            let frag = Fragment::try_from(FragmentBuilder::new().payload(payload).build()).unwrap();
            let count = frag.get_frame_count(frame_size);
            let payload_size = frag.get_header().payload_size();
            assert_eq!(payload_size, 3 * frame_size + extra);
            assert_eq!(count, 3);
            assert!(count * frame_size <= payload_size);
            assert!(payload_size < (count + 1) * frame_size);
        }
    }

    #[test]
    fn test_frame_count_size_below_header() {
        let mut bytes = FragmentBuilder::new().build();
        bytes[8..16].copy_from_slice(&10u64.to_le_bytes()); // size smaller than the header
        let frag = Fragment::try_from(bytes).unwrap();
        assert_eq!(frag.get_header().payload_size(), 0);
        assert_eq!(frag.get_frame_count(464), 0);
    }

    #[test]
    fn test_unknown_type_code() {
        let frag =
            Fragment::try_from(FragmentBuilder::new().fragment_type(42).build()).unwrap();
        assert_eq!(frag.get_fragment_type(), FragmentType::Other(42));
        assert_eq!(frag.get_fragment_type().to_string(), "Other(42)");
    }
}
