// The channel map translates a WIB hardware address into an offline channel number:
// [crate, slot, fiber, channel] -> offline
// Offline channels are what the rest of the world uses to talk about the detector,
// so every column we produce is labeled with one.
use std::fs::File;
use std::io::Read;
use std::path::Path;

use fxhash::FxHashMap;

use super::error::ChannelMapError;
use super::hardware_id::{generate_uuid, HardwareID};

const ENTRIES_PER_LINE: usize = 5; //Number of elements in a single row in the CSV file

/// Load a bundled map by geometry name.
///
/// The only bundled geometry is a synthetic linear layout (crate 4, slots 0-3, fibers 1-2) for
/// tests and dry runs; real detector maps must be given as a file.
fn load_bundled_map(geometry: &str) -> Option<&'static str> {
    match geometry {
        "SyntheticColdboxChannelMap" => {
            Some(include_str!("data/synthetic_coldbox_channel_map.csv"))
        }
        _ => None,
    }
}

/// ChannelMap contains the mapping of WIB hardware identifiers (crate, slot, fiber, channel) to offline channel number.
///
/// This depends on the detector geometry, so ChannelMap reads in a CSV file where each row contains 5 elements. The first four are the
/// hardware identifiers (in the order listed previously) and the fifth is the offline channel.
#[derive(Debug, Clone, Default)]
pub struct ChannelMap {
    map: FxHashMap<u64, u32>,
}

impl ChannelMap {
    /// Create a new ChannelMap
    /// If the path is None, we load the map bundled for the given geometry
    pub fn new(geometry: &str, path: Option<&Path>) -> Result<Self, ChannelMapError> {
        let mut contents = String::new();
        if let Some(p) = path {
            let mut file = File::open(p)?;
            file.read_to_string(&mut contents)?;
        } else {
            contents = load_bundled_map(geometry)
                .ok_or_else(|| ChannelMapError::UnknownGeometry(geometry.to_string()))?
                .to_string();
            spdlog::warn!(
                "No channel map path given, using the bundled {} map. Offline channels will not match a real detector!",
                geometry
            );
        }
        Self::from_csv(&contents)
    }

    /// Parse the CSV contents of a map. The first line is a header and is skipped.
    pub fn from_csv(contents: &str) -> Result<Self, ChannelMapError> {
        let mut cm = ChannelMap::default();

        let mut lines = contents.lines().enumerate();
        lines.next(); // Skip the header
        for (line_number, line) in lines {
            if line.trim().is_empty() {
                continue;
            }
            let entries: Vec<&str> = line.split_terminator(",").map(str::trim).collect();
            if entries.len() != ENTRIES_PER_LINE {
                return Err(ChannelMapError::BadFileFormat(line_number + 1));
            }

            let crate_no: u8 = entries[0].parse()?;
            let slot_no: u8 = entries[1].parse()?;
            let fiber_no: u8 = entries[2].parse()?;
            let channel: u8 = entries[3].parse()?;
            let offline: u32 = entries[4].parse()?;

            cm.map
                .insert(generate_uuid(crate_no, slot_no, fiber_no, channel), offline);
        }

        Ok(cm)
    }

    /// Get the offline channel for a given set of hardware identifiers.
    ///
    /// If returns None the identifiers given do not exist in the map
    pub fn get_offline_channel(&self, hw_id: &HardwareID) -> Option<u32> {
        self.map.get(&hw_id.uuid()).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
