use byteorder::{ByteOrder, LittleEndian};

use super::constants::*;
use super::error::WibFrameError;

/// Where the two pieces of a 12-bit sample sit inside a COLDATA segment.
///
/// Each segment is three 32-bit words holding 4 channels from each of two ADCs. A sample
/// is split into a low piece (`lo_width` bits) and a high piece (the remaining bits).
#[derive(Debug, Clone, Copy)]
pub(crate) struct SamplePiece {
    pub lo_word: usize,
    pub lo_shift: u32,
    pub lo_width: u32,
    pub hi_word: usize,
    pub hi_shift: u32,
}

const fn piece(
    lo_word: usize,
    lo_shift: u32,
    lo_width: u32,
    hi_word: usize,
    hi_shift: u32,
) -> SamplePiece {
    SamplePiece {
        lo_word,
        lo_shift,
        lo_width,
        hi_word,
        hi_shift,
    }
}

// [adc parity][channel % 4]
const SEGMENT_LAYOUT: [[SamplePiece; 4]; 2] = [
    [
        piece(0, 0, 8, 0, 16),
        piece(0, 20, 4, 1, 0),
        piece(1, 16, 8, 2, 0),
        piece(2, 4, 4, 2, 16),
    ],
    [
        piece(0, 8, 8, 0, 24),
        piece(0, 28, 4, 1, 8),
        piece(1, 24, 8, 2, 8),
        piece(2, 12, 4, 2, 24),
    ],
];

/// Locate a channel inside the frame: byte offset of its segment and the bit layout.
pub(crate) fn sample_location(channel: usize) -> (usize, SamplePiece) {
    let block = channel / CHANNELS_PER_BLOCK;
    let adc = (channel % CHANNELS_PER_BLOCK) / CHANNELS_PER_ADC;
    let adc_channel = channel % CHANNELS_PER_ADC;
    let segment = (adc / 2) * 2 + adc_channel / 4;
    let offset = WIB_HEADER_SIZE
        + block * COLDATA_BLOCK_SIZE
        + COLDATA_HEADER_SIZE
        + segment * COLDATA_SEGMENT_SIZE;
    (offset, SEGMENT_LAYOUT[adc % 2][adc_channel % 4])
}

/// The decoded WIB header found at the start of every frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WibHeader {
    pub sof: u8,
    pub version: u8,
    pub fiber_no: u8,
    pub crate_no: u8,
    pub slot_no: u8,
    pub mm: bool,
    pub oos: bool,
    pub wib_errors: u16,
    pub timestamp_1: u32,
    pub timestamp_2: u16,
    pub wib_counter: u16,
    pub z: bool,
}

impl WibHeader {
    fn from_words(words: [u32; 4]) -> Self {
        Self {
            sof: (words[0] & 0xFF) as u8,
            version: ((words[0] >> 8) & 0x1F) as u8,
            fiber_no: ((words[0] >> 13) & 0x7) as u8,
            crate_no: ((words[0] >> 16) & 0x1F) as u8,
            slot_no: ((words[0] >> 21) & 0x7) as u8,
            mm: (words[1] & 0x1) != 0,
            oos: ((words[1] >> 1) & 0x1) != 0,
            wib_errors: (words[1] >> 16) as u16,
            timestamp_1: words[2],
            timestamp_2: (words[3] & 0xFFFF) as u16,
            wib_counter: ((words[3] >> 16) & 0x7FFF) as u16,
            z: (words[3] >> 31) != 0,
        }
    }

    /// The 64-bit frame timestamp. When the z flag is clear the WIB counter fills the top bits.
    pub fn get_timestamp(&self) -> u64 {
        let mut ts = self.timestamp_1 as u64 | ((self.timestamp_2 as u64) << 32);
        if !self.z {
            ts |= (self.wib_counter as u64) << 48;
        }
        ts
    }
}

/// A read-only view of one WIB frame: a single sampling tick of 256 channels.
///
/// The view borrows the fragment payload; every accessor reads at a fixed offset which was
/// bounds checked when the view was created.
#[derive(Debug, Clone, Copy)]
pub struct WibFrame<'a> {
    bytes: &'a [u8],
}

impl<'a> WibFrame<'a> {
    /// Create a view over the first [`WIB_FRAME_SIZE`] bytes of the buffer
    pub fn new(buffer: &'a [u8]) -> Result<Self, WibFrameError> {
        if buffer.len() < WIB_FRAME_SIZE {
            return Err(WibFrameError::Truncated(buffer.len()));
        }
        Ok(Self {
            bytes: &buffer[..WIB_FRAME_SIZE],
        })
    }

    pub const fn sizeof() -> usize {
        WIB_FRAME_SIZE
    }

    fn word(&self, offset: usize) -> u32 {
        LittleEndian::read_u32(&self.bytes[offset..offset + 4])
    }

    pub fn get_wib_header(&self) -> WibHeader {
        WibHeader::from_words([self.word(0), self.word(4), self.word(8), self.word(12)])
    }

    pub fn get_timestamp(&self) -> u64 {
        self.get_wib_header().get_timestamp()
    }

    /// Get the 12-bit ADC sample for a channel in 0..256
    pub fn get_channel(&self, channel: usize) -> Result<u16, WibFrameError> {
        if channel >= NUMBER_OF_CHANNELS {
            return Err(WibFrameError::BadChannel(channel));
        }
        Ok(self.read_sample(channel))
    }

    /// All 256 samples, ordered by channel index
    pub fn get_channels(&self) -> [u16; NUMBER_OF_CHANNELS] {
        let mut samples = [0u16; NUMBER_OF_CHANNELS];
        for (channel, sample) in samples.iter_mut().enumerate() {
            *sample = self.read_sample(channel);
        }
        samples
    }

    fn read_sample(&self, channel: usize) -> u16 {
        let (offset, piece) = sample_location(channel);
        let lo_word = self.word(offset + piece.lo_word * 4);
        let hi_word = self.word(offset + piece.hi_word * 4);
        let hi_width = 12 - piece.lo_width;
        let lo = (lo_word >> piece.lo_shift) & ((1 << piece.lo_width) - 1);
        let hi = (hi_word >> piece.hi_shift) & ((1 << hi_width) - 1);
        ((lo | (hi << piece.lo_width)) as u16) & ADC_MASK
    }
}
