use ndarray::{Array1, Array2};

use super::channel_map::ChannelMap;
use super::config::Config;
use super::constants::NUMBER_OF_CHANNELS;
use super::daq_decoder::{DaqDecoder, FragmentSource};
use super::error::ProcessorError;
use super::fragment::Fragment;
use super::remapper::resolve_offline_channels;
use super::selector::select_fragment_datasets;
use super::table::{DatasetTable, TriggerTable};
use super::wib_frame::{WibFrame, WibHeader};

/// The frames of one fragment unpacked into flat arrays
#[derive(Debug, Clone)]
pub struct DecodedFragment {
    /// WIB header of the first frame; the hardware address is the same for every frame
    pub header: WibHeader,
    pub timestamps: Array1<u64>,
    pub adcs: Array2<u16>,
}

/// Decode every complete WIB frame in a fragment.
///
/// Returns None if the fragment does not hold a single complete frame.
pub fn decode_fragment(
    fragment: &Fragment,
    progress_interval: usize,
) -> Result<Option<DecodedFragment>, ProcessorError> {
    let frame_size = WibFrame::sizeof();
    let n_frames = fragment.get_frame_count(frame_size);
    if n_frames == 0 {
        return Ok(None);
    }

    let header = WibFrame::new(fragment.get_data(0)?)?.get_wib_header();
    let mut timestamps = Array1::<u64>::zeros(n_frames);
    let mut adcs = Array2::<u16>::zeros((n_frames, NUMBER_OF_CHANNELS));
    for i in 0..n_frames {
        if progress_interval > 0 && i % progress_interval == 0 {
            spdlog::debug!("Decoding frame {} of {}", i, n_frames);
        }
        let frame = WibFrame::new(fragment.get_data(i * frame_size)?)?;
        timestamps[i] = frame.get_timestamp();
        for (dst, src) in adcs.row_mut(i).iter_mut().zip(frame.get_channels()) {
            *dst = src;
        }
    }

    Ok(Some(DecodedFragment {
        header,
        timestamps,
        adcs,
    }))
}

fn log_fragment_info(path: &str, fragment: &Fragment) {
    spdlog::info!("Inspecting {}", path);
    spdlog::info!("Run number     : {}", fragment.get_run_number());
    spdlog::info!("Trigger number : {}", fragment.get_trigger_number());
    spdlog::info!("Trigger TS     : {}", fragment.get_trigger_timestamp());
    spdlog::info!("Window begin   : {}", fragment.get_window_begin());
    spdlog::info!("Window end     : {}", fragment.get_window_end());
    spdlog::info!("Fragment type  : {}", fragment.get_fragment_type());
    spdlog::info!("Fragment code  : {}", fragment.get_fragment_type_code());
    spdlog::info!(
        "Size           : {} ({})",
        fragment.get_size(),
        human_bytes::human_bytes(fragment.get_size() as f64)
    );
}

/// Build the table for a single fragment dataset.
///
/// Returns None (with a warning) if the fragment has no complete frames, since there is no
/// WIB header to take the hardware address from.
pub fn build_dataset_table<S: FragmentSource>(
    source: &S,
    path: &str,
    map: &ChannelMap,
    progress_interval: usize,
) -> Result<Option<DatasetTable>, ProcessorError> {
    let fragment = source.get_fragment(path)?;
    log_fragment_info(path, &fragment);

    let n_frames = fragment.get_frame_count(WibFrame::sizeof());
    spdlog::info!(
        "Number of WIB frames: {} ({} payload bytes, {} bytes per frame)",
        n_frames,
        fragment.get_header().payload_size(),
        WibFrame::sizeof()
    );

    let decoded = match decode_fragment(&fragment, progress_interval)? {
        Some(d) => d,
        None => {
            spdlog::warn!("Fragment {} holds no complete WIB frames, skipping...", path);
            return Ok(None);
        }
    };

    spdlog::info!(
        "crate: {}, slot: {}, fiber: {}",
        decoded.header.crate_no,
        decoded.header.slot_no,
        decoded.header.fiber_no
    );
    let offline_channels = resolve_offline_channels(map, &decoded.header)?;

    let table = DatasetTable::new(path, decoded.timestamps, &offline_channels, decoded.adcs)?;
    spdlog::debug!("Built dataset table:\n{}", table);
    Ok(Some(table))
}

/// Extract one trigger record from a fragment source into a single table.
///
/// If no dataset matches the trigger number an empty table is returned.
pub fn extract_trigger_record<S: FragmentSource>(
    source: &S,
    map: &ChannelMap,
    trigger_number: u64,
    progress_interval: usize,
) -> Result<TriggerTable, ProcessorError> {
    let tr_datasets = select_fragment_datasets(source.get_datasets(), trigger_number);
    spdlog::info!("{} found: {:?}", tr_datasets.len(), tr_datasets);
    if tr_datasets.is_empty() {
        spdlog::warn!(
            "No datasets found for trigger record {}! Returning an empty table.",
            trigger_number
        );
        return Ok(TriggerTable::default());
    }

    let mut tables = Vec::with_capacity(tr_datasets.len());
    for path in tr_datasets.iter() {
        if let Some(table) = build_dataset_table(source, path, map, progress_interval)? {
            tables.push(table);
        }
    }

    Ok(TriggerTable::concat(&tables)?)
}

/// The main entry point of the extractor.
///
/// Opens the raw file and channel map named in the config and extracts the requested trigger record.
pub fn process(config: &Config) -> Result<TriggerTable, ProcessorError> {
    let map = ChannelMap::new(&config.geometry, config.channel_map_path.as_deref())?;
    let decoder = DaqDecoder::new(&config.raw_file, config.max_trigger_records)?;
    spdlog::info!(
        "Extracting trigger record {} from {}...",
        config.trigger_number,
        decoder.get_file_path().to_string_lossy()
    );
    let table = extract_trigger_record(
        &decoder,
        &map,
        config.trigger_number,
        config.progress_interval,
    )?;
    spdlog::info!(
        "Trigger record {} extracted: {} rows x {} columns",
        config.trigger_number,
        table.n_rows(),
        table.n_columns()
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::WIB_FRAME_SIZE;
    use crate::error::{DaqDecoderError, RemapError};
    use crate::test_utils::{FragmentBuilder, WibFrameBuilder};
    use fxhash::FxHashMap;

    #[derive(Default)]
    struct MemorySource {
        datasets: Vec<String>,
        fragments: FxHashMap<String, Vec<u8>>,
    }

    impl MemorySource {
        fn add(&mut self, path: &str, bytes: Vec<u8>) {
            self.datasets.push(path.to_string());
            self.fragments.insert(path.to_string(), bytes);
        }
    }

    impl FragmentSource for MemorySource {
        fn get_datasets(&self) -> &[String] {
            &self.datasets
        }

        fn get_fragment(&self, path: &str) -> Result<Fragment, DaqDecoderError> {
            match self.fragments.get(path) {
                Some(bytes) => Ok(Fragment::try_from(bytes.clone())?),
                None => Err(DaqDecoderError::NoSuchDataset(path.to_string())),
            }
        }
    }

    fn link_fragment(slot: u8, fiber: u8, timestamps: &[u64], value: u16) -> Vec<u8> {
        let frames = timestamps
            .iter()
            .map(|ts| {
                WibFrameBuilder::new()
                    .hardware(4, slot, fiber)
                    .timestamp(*ts)
                    .all_channels(value)
                    .build()
            })
            .collect();
        FragmentBuilder::new().trigger_number(336).frames(frames).build()
    }

    fn default_map() -> ChannelMap {
        ChannelMap::new("SyntheticColdboxChannelMap", None).unwrap()
    }

    #[test]
    fn test_single_link_constant_frames() {
        let mut source = MemorySource::default();
        source.add(
            "//TriggerRecord00336/TPC/APA000/Link00",
            link_fragment(1, 1, &[10, 11, 12], 0x5A5),
        );
        let table = extract_trigger_record(&source, &default_map(), 336, 1000).unwrap();
        assert_eq!(table.n_rows(), 3);
        assert_eq!(table.n_columns(), NUMBER_OF_CHANNELS);
        assert_eq!(table.index(), &[10, 11, 12]);
        assert!(table.labels().iter().all(|l| l.len() == 4));
        assert_eq!(table.labels()[0], "0512");
        assert_eq!(table.labels()[255], "0767");
        assert!(table.data().iter().all(|v| *v == Some(0x5A5)));
    }

    #[test]
    fn test_swapped_slot_labels() {
        let mut source = MemorySource::default();
        source.add(
            "//TriggerRecord00336/TPC/APA000/Link00",
            link_fragment(2, 1, &[1], 0),
        );
        let table = extract_trigger_record(&source, &default_map(), 336, 0).unwrap();
        // slot 2 fiber 1 is looked up as fiber 2
        assert_eq!(table.labels()[0], "1280");
    }

    #[test]
    fn test_disjoint_links_outer_join() {
        let mut source = MemorySource::default();
        source.add(
            "//TriggerRecord00336/TPC/APA000/Link00",
            link_fragment(0, 1, &[1, 2], 100),
        );
        source.add(
            "//TriggerRecord00336/TPC/APA000/Link01",
            link_fragment(0, 2, &[3, 4], 200),
        );
        let table = extract_trigger_record(&source, &default_map(), 336, 1000).unwrap();
        assert_eq!(table.n_rows(), 4);
        assert_eq!(table.n_columns(), 2 * NUMBER_OF_CHANNELS);
        assert_eq!(table.index(), &[1, 2, 3, 4]);
        assert_eq!(table.value(1, "0000"), Some(100));
        assert_eq!(table.value(1, "0256"), None);
        assert_eq!(table.value(4, "0256"), Some(200));
        assert_eq!(table.value(4, "0000"), None);
        let mut sorted = table.labels().to_vec();
        sorted.sort();
        assert_eq!(table.labels(), sorted.as_slice());
    }

    #[test]
    fn test_partial_trailing_frame_dropped() {
        let frames = vec![
            WibFrameBuilder::new().timestamp(5).build(),
            WibFrameBuilder::new().timestamp(6).build(),
            vec![0xFF; WIB_FRAME_SIZE - 1],
        ];
        let bytes = FragmentBuilder::new().frames(frames).build();
        let fragment = Fragment::try_from(bytes).unwrap();
        let decoded = decode_fragment(&fragment, 1).unwrap().unwrap();
        assert_eq!(decoded.timestamps.to_vec(), vec![5, 6]);
        assert_eq!(decoded.adcs.nrows(), 2);
    }

    #[test]
    fn test_empty_fragment_skipped() {
        let mut source = MemorySource::default();
        source.add(
            "//TriggerRecord00336/TPC/APA000/Link00",
            FragmentBuilder::new().build(),
        );
        source.add(
            "//TriggerRecord00336/TPC/APA000/Link01",
            link_fragment(0, 1, &[1], 3),
        );
        let table = extract_trigger_record(&source, &default_map(), 336, 1000).unwrap();
        assert_eq!(table.n_columns(), NUMBER_OF_CHANNELS);
        assert_eq!(table.n_rows(), 1);
    }

    #[test]
    fn test_no_matching_datasets() {
        let mut source = MemorySource::default();
        source.add("//TriggerRecord00336/TriggerRecordHeader", vec![0u8; 4]);
        source.add(
            "//TriggerRecord00337/TPC/APA000/Link00",
            link_fragment(0, 1, &[1], 3),
        );
        let table = extract_trigger_record(&source, &default_map(), 336, 1000).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_unmapped_link_is_fatal() {
        let mut source = MemorySource::default();
        source.add(
            "//TriggerRecord00336/TPC/APA000/Link00",
            link_fragment(0, 5, &[1], 3),
        );
        match extract_trigger_record(&source, &default_map(), 336, 1000) {
            Err(ProcessorError::RemapError(RemapError::UnmappedChannel(4, 0, 5, 0))) => (),
            _ => panic!(),
        }
    }

    #[test]
    fn test_process_from_hdf5() {
        let dir = tempfile::tempdir().unwrap();
        let raw_file = dir.path().join("raw.hdf5");
        {
            let file = hdf5::File::create(&raw_file).unwrap();
            let apa = file
                .create_group("TriggerRecord00336")
                .unwrap()
                .create_group("TPC")
                .unwrap()
                .create_group("APA000")
                .unwrap();
            apa.new_dataset_builder()
                .with_data(link_fragment(3, 2, &[20, 21], 7).as_slice())
                .create("Link00")
                .unwrap();
        }
        let config = Config {
            raw_file,
            trigger_number: 336,
            ..Default::default()
        };
        let table = process(&config).unwrap();
        assert_eq!(table.index(), &[20, 21]);
        // slot 3 fiber 2 is looked up as fiber 1: (3 * 2 + 0) * 256
        assert_eq!(table.labels()[0], "1536");
        assert_eq!(table.value(21, "1791"), Some(7));
    }
}
