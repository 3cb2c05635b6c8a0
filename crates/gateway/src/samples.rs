//! Bundled demo images and the channel settings each one is segmented with.

use schema::SegmentForm;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Primary channel per sample index. Secondary is 3 (blue nuclei) whenever
/// the primary is 2 (green cytoplasm), otherwise 0.
pub const PRIMARY_CHANNELS: [u8; 23] = [
    2, 0, 2, 0, 2, 0, 2, 0, 0, 2, 0, 2, 0, 0, 0, 0, 2, 0, 2, 0, 2, 0, 0,
];

pub const SAMPLE_NETWORK: &str = "cyto";
pub const SAMPLE_DIAMETER: &str = "30";

/// Plots returned by `/results`, in reply order.
pub const RESULT_OUTPUTS: &str = "outline_plot,overlay_plot,flow_plot,img_plot";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SampleEntry {
    pub index: usize,
    pub chan1: u8,
    pub chan2: u8,
}

impl SampleEntry {
    pub fn new(index: usize) -> Option<Self> {
        let chan1 = *PRIMARY_CHANNELS.get(index)?;
        let chan2 = if chan1 == 2 { 3 } else { 0 };
        Some(Self {
            index,
            chan1,
            chan2,
        })
    }

    pub fn filename(&self) -> String {
        format!("img{:02}.png", self.index)
    }

    /// Request settings used when segmenting this sample.
    pub fn form(&self) -> SegmentForm {
        SegmentForm {
            net: Some(SAMPLE_NETWORK.to_string()),
            diam: Some(SAMPLE_DIAMETER.to_string()),
            chan1: Some(self.chan1.to_string()),
            chan2: Some(self.chan2.to_string()),
            outputs: Some(RESULT_OUTPUTS.to_string()),
            ..SegmentForm::default()
        }
    }
}

/// One row of the `GET /` index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogItem {
    pub filename: String,
    pub chan1: u8,
    pub chan2: u8,
    pub network: &'static str,
}

#[derive(Debug, Clone)]
pub struct SampleCatalog {
    dir: PathBuf,
}

impl SampleCatalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn entries(&self) -> Vec<CatalogItem> {
        (0..PRIMARY_CHANNELS.len())
            .filter_map(SampleEntry::new)
            .map(|entry| CatalogItem {
                filename: entry.filename(),
                chan1: entry.chan1,
                chan2: entry.chan2,
                network: SAMPLE_NETWORK,
            })
            .collect()
    }

    /// Look up a sample by its exact file name (`img%02d.png`).
    pub fn get(&self, filename: &str) -> Option<SampleEntry> {
        let digits = filename.strip_prefix("img")?.strip_suffix(".png")?;
        if digits.len() != 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        SampleEntry::new(digits.parse().ok()?)
    }

    pub fn path(&self, entry: &SampleEntry) -> PathBuf {
        self.dir.join(entry.filename())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secondary_follows_primary() {
        let entry = SampleEntry::new(0).unwrap();
        assert_eq!((entry.chan1, entry.chan2), (2, 3));
        let entry = SampleEntry::new(1).unwrap();
        assert_eq!((entry.chan1, entry.chan2), (0, 0));
        assert!(SampleEntry::new(PRIMARY_CHANNELS.len()).is_none());
    }

    #[test]
    fn test_get_parses_file_names() {
        let catalog = SampleCatalog::new("samples");
        assert_eq!(catalog.get("img09.png").map(|e| e.index), Some(9));
        assert_eq!(catalog.get("img22.png").map(|e| e.chan1), Some(0));
        assert!(catalog.get("img23.png").is_none());
        assert!(catalog.get("img9.png").is_none());
        assert!(catalog.get("img+1.png").is_none());
        assert!(catalog.get("img01.jpg").is_none());
        assert!(catalog.get("user").is_none());
        assert_eq!(
            catalog.path(&SampleEntry::new(4).unwrap()),
            PathBuf::from("samples/img04.png")
        );
    }

    #[test]
    fn test_entries_cover_table() {
        let entries = SampleCatalog::new("samples").entries();
        assert_eq!(entries.len(), PRIMARY_CHANNELS.len());
        assert_eq!(entries[2].filename, "img02.png");
        assert_eq!(entries[2].network, "cyto");
    }

    #[test]
    fn test_form_uses_catalog_settings() {
        let form = SampleEntry::new(16).unwrap().form();
        assert_eq!(form.net.as_deref(), Some("cyto"));
        assert_eq!(form.diam.as_deref(), Some("30"));
        assert_eq!(form.chan1.as_deref(), Some("2"));
        assert_eq!(form.chan2.as_deref(), Some("3"));
        assert!(form.input.is_none());
    }
}
