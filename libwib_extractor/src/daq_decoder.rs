use hdf5::types::{IntSize, TypeDescriptor};
use hdf5::{File, Group};
use std::path::{Path, PathBuf};

use super::constants::TRIGGER_RECORD_PREFIX;
use super::error::DaqDecoderError;
use super::fragment::Fragment;

/// Anything which can list fragment datasets and hand out Fragments by dataset path.
pub trait FragmentSource {
    /// Full paths of every fragment dataset, in file order
    fn get_datasets(&self) -> &[String];
    /// Read and parse the fragment stored at a dataset path
    fn get_fragment(&self, path: &str) -> Result<Fragment, DaqDecoderError>;
}

/// DaqDecoder wraps an HDF5 raw data file written by the DAQ.
///
/// The file holds one group per trigger record (`TriggerRecord#####`), below which each
/// fragment is stored as a 1-D byte dataset. The dataset listing is built once at
/// construction, visiting at most `max_trigger_records` trigger records in name order.
#[derive(Debug)]
pub struct DaqDecoder {
    file: File,
    file_path: PathBuf,
    trigger_records: Vec<String>,
    datasets: Vec<String>,
}

impl DaqDecoder {
    /// Open a DAQ file and index its datasets
    pub fn new(path: &Path, max_trigger_records: usize) -> Result<Self, DaqDecoderError> {
        if !path.exists() {
            return Err(DaqDecoderError::BadFilePath(path.to_path_buf()));
        }
        let file = File::open(path)?;

        let mut trigger_records: Vec<String> = file
            .member_names()?
            .into_iter()
            .filter(|name| name.starts_with(TRIGGER_RECORD_PREFIX))
            .collect();
        trigger_records.sort();
        trigger_records.truncate(max_trigger_records);

        let mut datasets = Vec::new();
        for record in trigger_records.iter() {
            collect_datasets(&file.group(record)?, &mut datasets)?;
        }
        spdlog::info!(
            "Indexed {} datasets across {} trigger records in {}",
            datasets.len(),
            trigger_records.len(),
            path.to_string_lossy()
        );

        Ok(Self {
            file,
            file_path: path.to_path_buf(),
            trigger_records,
            datasets,
        })
    }

    pub fn get_file_path(&self) -> &Path {
        &self.file_path
    }

    /// The trigger numbers of the indexed trigger records
    pub fn get_trigger_numbers(&self) -> Vec<u64> {
        self.trigger_records
            .iter()
            .filter_map(|name| name[TRIGGER_RECORD_PREFIX.len()..].parse().ok())
            .collect()
    }
}

impl FragmentSource for DaqDecoder {
    fn get_datasets(&self) -> &[String] {
        &self.datasets
    }

    fn get_fragment(&self, path: &str) -> Result<Fragment, DaqDecoderError> {
        let h5_path = format!("/{}", path.trim_start_matches('/'));
        let dataset = self
            .file
            .dataset(&h5_path)
            .map_err(|_| DaqDecoderError::NoSuchDataset(path.to_string()))?;
        // The DAQ writes fragments as native char, which is signed. Read in the stored
        // signedness so HDF5 does not clamp bytes >= 0x80.
        let dtype = dataset.dtype()?;
        let bytes: Vec<u8> = match dtype.to_descriptor()? {
            TypeDescriptor::Integer(IntSize::U1) => dataset
                .read_raw::<i8>()?
                .into_iter()
                .map(|b| b as u8)
                .collect(),
            TypeDescriptor::Unsigned(IntSize::U1) => dataset.read_raw::<u8>()?,
            _ => {
                return Err(DaqDecoderError::BadElementType(
                    path.to_string(),
                    dtype.size(),
                ))
            }
        };
        Ok(Fragment::try_from(bytes)?)
    }
}

/// Walk a group depth first, datasets before subgroups, recording full dataset paths
fn collect_datasets(group: &Group, datasets: &mut Vec<String>) -> Result<(), DaqDecoderError> {
    let mut members = group.datasets()?;
    members.sort_by_key(|d| d.name());
    datasets.extend(members.iter().map(|d| d.name()));

    let mut subgroups = group.groups()?;
    subgroups.sort_by_key(|g| g.name());
    for subgroup in subgroups.iter() {
        collect_datasets(subgroup, datasets)?;
    }
    Ok(())
}
