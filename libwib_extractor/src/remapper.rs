use super::channel_map::ChannelMap;
use super::constants::{NUMBER_OF_CHANNELS, SWAPPED_FIBER_SLOTS};
use super::error::RemapError;
use super::hardware_id::HardwareID;
use super::wib_frame::WibHeader;

/// The fiber number to use for map lookups.
///
/// Slots 2 and 3 have their two fibers cabled crossed, so fiber 1 reads as 2 and 2 as 1.
/// Every other slot is taken as is.
pub fn effective_fiber(slot_no: u8, fiber_no: u8) -> Result<u8, RemapError> {
    if !SWAPPED_FIBER_SLOTS.contains(&slot_no) {
        return Ok(fiber_no);
    }
    match fiber_no {
        1 => Ok(2),
        2 => Ok(1),
        _ => Err(RemapError::BadSwappedFiber(slot_no, fiber_no)),
    }
}

/// Resolve the offline channel of every channel index in a WIB link.
///
/// The result is index-aligned with the frame channels (0..256). Any channel missing from
/// the map fails the whole link.
pub fn resolve_offline_channels(
    map: &ChannelMap,
    header: &WibHeader,
) -> Result<Vec<u32>, RemapError> {
    let fiber_no = effective_fiber(header.slot_no, header.fiber_no)?;
    (0..NUMBER_OF_CHANNELS)
        .map(|channel| {
            let hw_id = HardwareID::new(header.crate_no, header.slot_no, fiber_no, channel as u8);
            map.get_offline_channel(&hw_id).ok_or(RemapError::UnmappedChannel(
                hw_id.crate_no,
                hw_id.slot_no,
                hw_id.fiber_no,
                hw_id.channel,
            ))
        })
        .collect()
}
