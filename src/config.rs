use crate::err::CoreError;
use crate::format::TagFormat;

/// The tag of a [`ScanConfiguration`], without the `CustomScan` payload.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ScanMode {
    FullScan,
    ComfortScan,
    CustomScan,
}

/// Picks which formats a scan probes for.
///
/// `FullScan` and `ComfortScan` resolve their target formats from the
/// process-wide [`priority`](crate::priority) tables at scan time.
/// `CustomScan` carries its own ordered, deduplication-preserving list of
/// formats, defensively copied so that callers cannot mutate it afterward.
#[derive(Clone, Debug)]
pub enum ScanConfiguration {
    FullScan,
    ComfortScan,
    CustomScan(Vec<TagFormat>),
}

impl ScanConfiguration {
    pub fn full_scan() -> ScanConfiguration {
        ScanConfiguration::FullScan
    }

    pub fn comfort_scan() -> ScanConfiguration {
        ScanConfiguration::ComfortScan
    }

    /// Builds a custom scan over `formats`.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidArgument`] if `formats` is empty.
    pub fn custom_scan(formats: Vec<TagFormat>) -> Result<ScanConfiguration, CoreError> {
        if formats.is_empty() {
            return Err(CoreError::InvalidArgument(
                "custom_scan requires a non-empty format list",
            ));
        }

        Ok(ScanConfiguration::CustomScan(formats))
    }

    pub fn mode(&self) -> ScanMode {
        match self {
            ScanConfiguration::FullScan => ScanMode::FullScan,
            ScanConfiguration::ComfortScan => ScanMode::ComfortScan,
            ScanConfiguration::CustomScan(_) => ScanMode::CustomScan,
        }
    }

    /// The configured formats for a `CustomScan`, or an empty slice otherwise.
    pub fn custom_formats(&self) -> &[TagFormat] {
        match self {
            ScanConfiguration::CustomScan(formats) => formats,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_scan_rejects_empty_list() {
        assert!(ScanConfiguration::custom_scan(Vec::new()).is_err());
    }

    #[test]
    fn custom_scan_preserves_order_and_duplicates() {
        let formats = vec![TagFormat::Id3v23, TagFormat::ApeV2, TagFormat::Id3v23];
        let config = ScanConfiguration::custom_scan(formats.clone()).unwrap();

        assert_eq!(config.mode(), ScanMode::CustomScan);
        assert_eq!(config.custom_formats(), formats.as_slice());
    }

    #[test]
    fn non_custom_modes_have_no_custom_formats() {
        assert!(ScanConfiguration::full_scan().custom_formats().is_empty());
        assert!(ScanConfiguration::comfort_scan().custom_formats().is_empty());
    }
}
