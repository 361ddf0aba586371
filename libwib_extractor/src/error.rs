use std::path::PathBuf;
use thiserror::Error;

use super::constants::*;

#[derive(Debug, Error)]
pub enum FragmentError {
    #[error("Failed to parse buffer into Fragment: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Fragment buffer of {0} bytes is smaller than the fragment header ({size} bytes)", size=FRAGMENT_HEADER_SIZE)]
    BufferTooSmall(usize),
    #[error("Requested fragment data at offset {0} but the payload is only {1} bytes")]
    OffsetOutOfRange(usize, usize),
}

#[derive(Debug, Clone, Error)]
pub enum WibFrameError {
    #[error("WibFrame requires {size} bytes but only {0} were available", size=WIB_FRAME_SIZE)]
    Truncated(usize),
    #[error("Invalid channel {0} requested from WibFrame; expected 0..{n}", n=NUMBER_OF_CHANNELS)]
    BadChannel(usize),
}

#[derive(Debug, Error)]
pub enum DaqDecoderError {
    #[error("Could not open DAQ file because file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("DaqDecoder failed due to HDF5 error: {0}")]
    HDF5Error(#[from] hdf5::Error),
    #[error("DaqDecoder has no dataset named {0}")]
    NoSuchDataset(String),
    #[error("DaqDecoder found dataset {0} with {1} byte elements, fragments must be stored as single bytes")]
    BadElementType(String, usize),
    #[error("DaqDecoder failed to parse a fragment: {0}")]
    FragmentError(#[from] FragmentError),
}

#[derive(Debug, Error)]
pub enum ChannelMapError {
    #[error("ChannelMap failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("ChannelMap failed to parse an integer: {0}")]
    ParsingError(#[from] std::num::ParseIntError),
    #[error("ChannelMap was given a file with the incorrect format at line {0}; most likely the number of columns is incorrect")]
    BadFileFormat(usize),
    #[error("No channel map is bundled for geometry {0}")]
    UnknownGeometry(String),
}

#[derive(Debug, Clone, Error)]
pub enum RemapError {
    #[error("No offline channel is mapped to hardware -- Crate: {0}, Slot: {1}, Fiber: {2}, Channel: {3}")]
    UnmappedChannel(u8, u8, u8, u8),
    #[error("Fiber {1} in slot {0} has no entry in the fiber swap table")]
    BadSwappedFiber(u8, u8),
}

#[derive(Debug, Clone, Error)]
pub enum TableError {
    #[error("Dataset {0} has {1} timestamps but {2} rows of ADC data")]
    ShapeMismatch(String, usize, usize),
    #[error("Dataset {0} has {1} columns but {2} labels")]
    LabelMismatch(String, usize, usize),
    #[error("Cannot outer join on timestamp index: dataset {0} repeats timestamp {1}")]
    DuplicateTimestamp(String, u64),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration as file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("Config failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Config failed to parse YAML: {0}")]
    ParsingError(#[from] serde_yaml::Error),
}

#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("Processor failed due to DaqDecoder error: {0}")]
    DecoderError(#[from] DaqDecoderError),
    #[error("Processor failed due to Fragment error: {0}")]
    FragmentError(#[from] FragmentError),
    #[error("Processor failed due to WibFrame error: {0}")]
    FrameError(#[from] WibFrameError),
    #[error("Processor failed due to ChannelMap error: {0}")]
    MapError(#[from] ChannelMapError),
    #[error("Processor failed due to channel remapping error: {0}")]
    RemapError(#[from] RemapError),
    #[error("Processor failed due to Table error: {0}")]
    TableError(#[from] TableError),
    #[error("Processor failed due to Config error: {0}")]
    ConfigError(#[from] ConfigError),
}
