// Builders for synthetic fragments and frames used by the unit tests
use super::constants::*;
use super::wib_frame::sample_location;

#[derive(Debug, Clone)]
pub struct WibFrameBuilder {
    bytes: Vec<u8>,
}

impl WibFrameBuilder {
    pub fn new() -> Self {
        Self {
            bytes: vec![0u8; WIB_FRAME_SIZE],
        }
    }

    fn or_word(&mut self, offset: usize, value: u32) {
        let mut word = [0u8; 4];
        word.copy_from_slice(&self.bytes[offset..offset + 4]);
        let merged = u32::from_le_bytes(word) | value;
        self.bytes[offset..offset + 4].copy_from_slice(&merged.to_le_bytes());
    }

    pub fn hardware(mut self, crate_no: u8, slot_no: u8, fiber_no: u8) -> Self {
        let word = ((fiber_no as u32 & 0x7) << 13)
            | ((crate_no as u32 & 0x1F) << 16)
            | ((slot_no as u32 & 0x7) << 21);
        self.or_word(0, word);
        self
    }

    /// Timestamps are written with the z flag set, so only the low 48 bits survive
    pub fn timestamp(mut self, ts: u64) -> Self {
        self.or_word(8, (ts & 0xFFFF_FFFF) as u32);
        self.or_word(12, ((ts >> 32) & 0xFFFF) as u32 | (1 << 31));
        self
    }

    pub fn channel(mut self, channel: usize, value: u16) -> Self {
        let (offset, piece) = sample_location(channel);
        let value = (value & ADC_MASK) as u32;
        let lo = value & ((1 << piece.lo_width) - 1);
        let hi = value >> piece.lo_width;
        self.or_word(offset + piece.lo_word * 4, lo << piece.lo_shift);
        self.or_word(offset + piece.hi_word * 4, hi << piece.hi_shift);
        self
    }

    pub fn all_channels(mut self, value: u16) -> Self {
        for channel in 0..NUMBER_OF_CHANNELS {
            self = self.channel(channel, value);
        }
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

#[derive(Debug, Clone)]
pub struct FragmentBuilder {
    run_number: u32,
    trigger_number: u64,
    trigger_timestamp: u64,
    window: (u64, u64),
    fragment_type: u32,
    payload: Vec<u8>,
}

impl FragmentBuilder {
    pub fn new() -> Self {
        Self {
            run_number: 0,
            trigger_number: 0,
            trigger_timestamp: 0,
            window: (0, 0),
            fragment_type: 1,
            payload: Vec::new(),
        }
    }

    pub fn run_number(mut self, run_number: u32) -> Self {
        self.run_number = run_number;
        self
    }

    pub fn trigger_number(mut self, trigger_number: u64) -> Self {
        self.trigger_number = trigger_number;
        self
    }

    pub fn trigger_timestamp(mut self, trigger_timestamp: u64) -> Self {
        self.trigger_timestamp = trigger_timestamp;
        self
    }

    pub fn window(mut self, begin: u64, end: u64) -> Self {
        self.window = (begin, end);
        self
    }

    pub fn fragment_type(mut self, fragment_type: u32) -> Self {
        self.fragment_type = fragment_type;
        self
    }

    pub fn payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = payload;
        self
    }

    pub fn frames(mut self, frames: Vec<Vec<u8>>) -> Self {
        self.payload = frames.concat();
        self
    }

    pub fn build(self) -> Vec<u8> {
        let size = (FRAGMENT_HEADER_SIZE + self.payload.len()) as u64;
        let mut bytes = Vec::with_capacity(size as usize);
        bytes.extend_from_slice(&FRAGMENT_HEADER_MAGIC.to_le_bytes());
        bytes.extend_from_slice(&2u32.to_le_bytes()); // version
        bytes.extend_from_slice(&size.to_le_bytes());
        bytes.extend_from_slice(&self.trigger_number.to_le_bytes());
        bytes.extend_from_slice(&self.trigger_timestamp.to_le_bytes());
        bytes.extend_from_slice(&self.window.0.to_le_bytes());
        bytes.extend_from_slice(&self.window.1.to_le_bytes());
        bytes.extend_from_slice(&self.run_number.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes()); // error bits
        bytes.extend_from_slice(&self.fragment_type.to_le_bytes());
        bytes.extend_from_slice(&0u16.to_le_bytes()); // sequence number
        bytes.extend_from_slice(&0xFFFFu16.to_le_bytes()); // unused
        bytes.resize(FRAGMENT_HEADER_SIZE, 0); // element id and padding
        bytes.extend_from_slice(&self.payload);
        bytes
    }
}
