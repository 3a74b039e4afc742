//! Design-report persistence. Reports are written as pretty JSON for
//! hand-inspection or MessagePack for bulk runs; loading tries JSON first
//! and falls back to MessagePack, so callers never need to know which
//! flavour a file is.

use rmp_serde::{decode, encode};
use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::PathBuf,
};
use thiserror::Error;

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::optimize::design::NetworkDesign;
use crate::params::ChannelConstants;

#[derive(Debug, Error)]
pub enum ReportFileError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    JsonError(#[from] serde_json::Error),
    #[error(transparent)]
    RmpWriteError(#[from] encode::Error),
    #[error(transparent)]
    RmpReadError(#[from] decode::Error),
}

/// Enough provenance to reproduce the numbers in a report: the tool
/// version and the channel calibration they were computed with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportIdentity {
    pub tool_version: String,
    pub constants: ChannelConstants,
}

impl ReportIdentity {
    pub fn current(constants: &ChannelConstants) -> Self {
        Self {
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            constants: constants.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignReport {
    pub design: NetworkDesign,
    pub identity: ReportIdentity,
}

pub fn load_report(path: PathBuf) -> Result<DesignReport, ReportFileError> {
    load_file(path)
}

pub fn write_report(
    path: PathBuf,
    report: &DesignReport,
    use_rmp: bool,
) -> Result<(), ReportFileError> {
    write_file(path, report, use_rmp)
}

pub fn load_file<T>(path: PathBuf) -> Result<T, ReportFileError>
where
    T: DeserializeOwned,
{
    use serde_json::error::Category;

    let file = File::open(&path)?;
    let buf_reader = BufReader::new(file);

    let json_result: Result<T, _> = serde_json::from_reader(buf_reader);

    json_result.or_else(|err| match err.classify() {
        Category::Io | Category::Eof => Err(err.into()),
        _ => {
            let file = File::open(path)?;
            let buf_reader = BufReader::new(file);
            let res: Result<T, _> = decode::from_read(buf_reader);
            res.map_err(|x| x.into())
        }
    })
}

pub fn write_file<T>(path: PathBuf, object: &T, use_rmp: bool) -> Result<(), ReportFileError>
where
    T: Serialize,
{
    let file = File::create(path)?;
    let mut buf = BufWriter::new(file);

    if use_rmp {
        encode::write(&mut buf, object)?;
    } else {
        serde_json::to_writer_pretty(buf, object)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimize::design::{DesignRequirements, design_network};
    use crate::params::LinkLimits;

    fn sample_report() -> DesignReport {
        let constants = ChannelConstants::default();
        let design = design_network(
            &constants,
            &LinkLimits::default(),
            &DesignRequirements::default(),
        )
        .unwrap();

        DesignReport {
            design,
            identity: ReportIdentity::current(&constants),
        }
    }

    #[test]
    fn round_trips_through_json() {
        let report = sample_report();
        let path = std::env::temp_dir().join("uvnet_report_json_test.json");

        write_report(path.clone(), &report, false).unwrap();
        let loaded = load_report(path.clone()).unwrap();
        std::fs::remove_file(path).ok();

        assert_eq!(loaded.design.required_nodes, report.design.required_nodes);
        assert_eq!(loaded.identity.tool_version, report.identity.tool_version);
    }

    #[test]
    fn round_trips_through_msgpack() {
        let report = sample_report();
        let path = std::env::temp_dir().join("uvnet_report_rmp_test.rmp");

        write_report(path.clone(), &report, true).unwrap();
        // The loader detects the format without being told.
        let loaded = load_report(path.clone()).unwrap();
        std::fs::remove_file(path).ok();

        assert_eq!(loaded.design.required_nodes, report.design.required_nodes);
        assert_eq!(
            loaded.identity.constants.xi_base,
            report.identity.constants.xi_base
        );
    }

    #[test]
    fn missing_file_surfaces_the_io_error() {
        let missing = PathBuf::from("/definitely/not/here/uvnet.json");
        assert!(matches!(
            load_report(missing),
            Err(ReportFileError::IoError(_))
        ));
    }
}
