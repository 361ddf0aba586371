//! # wib_extractor
//!
//! wib_extractor pulls the raw TPC readout of a single trigger record out of an HDF5 raw
//! data file written by the DAQ, decodes the WIB frames it contains into per-channel ADC
//! time series, and relabels every channel by its offline channel number. The result is a
//! single table indexed by frame timestamp with one column per offline channel.
//!
//! ## Installation
//!
//! The only method of install is from source.
//!
//! ### HDF5
//!
//! Before building and running wib_extractor, HDF5 must be installed. Typically this will
//! be installed using a package manager (homebrew, apt, etc), and the Rust libraries will
//! auto detect the location of the HDF install. If HDF5 lives somewhere custom, write the
//! following snippet into the file `.cargo/config.toml` in the repository:
//!
//! ```toml
//! [env]
//! HDF5_DIR="/path/to/my/hdf5/install/"
//!
//! [build]
//! rustflags="-C link-args=-Wl,-rpath,/path/to/my/hdf5/install/lib"
//! ```
//!
//! ### Building & Install
//!
//! To build and install the CLI use `cargo install --path ./wib_extractor_cli` from the top
//! level repository.
//!
//! ## Configuration
//!
//! The extractor is driven by a YAML configuration file:
//!
//! ```yml
//! raw_file: np02_bde_coldbox_run011918_0002_20211029T122926.hdf5
//! trigger_number: 336
//! max_trigger_records: 100
//! geometry: SyntheticColdboxChannelMap
//! channel_map_path: null
//! progress_interval: 1000
//! ```
//!
//! - `raw_file`: the HDF5 raw data file
//! - `trigger_number`: the trigger record to extract
//! - `max_trigger_records`: only the first N trigger records of the file are indexed
//! - `geometry`: name of the bundled channel map to use
//! - `channel_map_path`: optional CSV channel map which overrides the bundled one
//! - `progress_interval`: log a progress tick every N decoded frames
//!
//! ### Channel Map Format
//!
//! The channel map is a CSV file with a header line. The columns are as follows:
//!
//! ```csv
//! crate,slot,fiber,channel,offline
//! ```
//!
//! Crate, slot, and fiber locate the WIB link, channel is the index in the WIB frame
//! (0-255) and offline is the offline channel number.
//!
//! ## Raw Data Format
//!
//! ```text
//! raw.hdf5
//! TriggerRecord#####
//! |---- TriggerRecordHeader(dset)
//! |---- TPC
//! |    |---- APA###
//! |    |    |---- Link##(dset) - fragment header + WIB frames
//! ```
//!
//! Each fragment is an 80 byte header followed by 464 byte WIB frames. Any trailing bytes
//! which do not form a full frame are ignored.
//!
//! ## Output
//!
//! Columns are labeled by offline channel zero padded to four digits and sorted by label.
//! Links that do not share timestamps are outer joined; missing entries are None.
pub mod channel_map;
pub mod config;
pub mod constants;
pub mod daq_decoder;
pub mod error;
pub mod fragment;
pub mod hardware_id;
pub mod process;
pub mod remapper;
pub mod selector;
pub mod table;
pub mod wib_frame;

#[cfg(test)]
pub(crate) mod test_utils;
