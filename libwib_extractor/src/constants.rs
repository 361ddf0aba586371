// Fragment header
pub const FRAGMENT_HEADER_MAGIC: u32 = 0x11112222;
pub const FRAGMENT_HEADER_SIZE: usize = 80; // bytes, including tail padding

// WIB frame
pub const WIB_FRAME_SIZE: usize = 464; // bytes, 116 32-bit words
pub const WIB_HEADER_SIZE: usize = 16;
pub const COLDATA_HEADER_SIZE: usize = 16;
pub const COLDATA_SEGMENT_SIZE: usize = 12;
pub const SEGMENTS_PER_BLOCK: usize = 8;
pub const COLDATA_BLOCK_SIZE: usize =
    COLDATA_HEADER_SIZE + SEGMENTS_PER_BLOCK * COLDATA_SEGMENT_SIZE;
pub const BLOCKS_PER_FRAME: usize = 4;
pub const CHANNELS_PER_BLOCK: usize = 64;
pub const CHANNELS_PER_ADC: usize = 8;
pub const NUMBER_OF_CHANNELS: usize = BLOCKS_PER_FRAME * CHANNELS_PER_BLOCK; // 256
pub const ADC_MASK: u16 = 0x0FFF; // 12-bit samples

// Trigger record layout inside the HDF5 file
pub const TRIGGER_RECORD_PREFIX: &str = "TriggerRecord";
pub const TRIGGER_RECORD_HEADER: &str = "TriggerRecordHeader";

// Defaults
pub const DEFAULT_MAX_TRIGGER_RECORDS: usize = 100;
pub const DEFAULT_PROGRESS_INTERVAL: usize = 1000;
pub const DEFAULT_GEOMETRY: &str = "SyntheticColdboxChannelMap";

// Slots whose fibers are cabled crossed
pub const SWAPPED_FIBER_SLOTS: [u8; 2] = [2, 3];
