use std::hash::Hash;

/// HardwareID is the full hardware address of a single readout channel.
///
/// Crate, slot and fiber locate the WIB link, channel is the index inside the frame (0..256).
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct HardwareID {
    pub crate_no: u8,
    pub slot_no: u8,
    pub fiber_no: u8,
    pub channel: u8,
}

impl HardwareID {
    /// Construct a new hardware ID
    pub fn new(crate_no: u8, slot_no: u8, fiber_no: u8, channel: u8) -> Self {
        HardwareID {
            crate_no,
            slot_no,
            fiber_no,
            channel,
        }
    }

    pub fn uuid(&self) -> u64 {
        generate_uuid(self.crate_no, self.slot_no, self.fiber_no, self.channel)
    }
}

impl Hash for HardwareID {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.uuid().hash(state)
    }
}

/// Generate a unique id number for a given hardware location
///
/// Each field gets its own byte, so the id is unique over the full u8 range of every field.
pub fn generate_uuid(crate_no: u8, slot_no: u8, fiber_no: u8, channel: u8) -> u64 {
    (channel as u64)
        | (fiber_no as u64) << 8
        | (slot_no as u64) << 16
        | (crate_no as u64) << 24
}
