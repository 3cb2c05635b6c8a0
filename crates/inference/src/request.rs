use crate::error::SegmentError;
use preprocess::{Channels, Network, RescaleFactor};
use schema::{OutputKind, SegmentForm, parse_flag, parse_output_kinds};

/// Resolved per-request configuration. Built once, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentationConfig {
    pub network: Network,
    pub rescale: RescaleFactor,
    /// Raw channel fields; resolved against the decoded image later.
    pub primary_channel: Option<String>,
    pub secondary_channel: Option<String>,
    pub invert: bool,
    pub keep_size: bool,
    pub outputs: Vec<OutputKind>,
}

impl SegmentationConfig {
    /// Build the configuration from form fields.
    ///
    /// Only an unknown network name is an error; every other malformed field
    /// falls back to its default.
    pub fn from_form(form: &SegmentForm) -> Result<Self, SegmentError> {
        let network = match form.net.as_deref().map(str::trim) {
            None | Some("") => Network::default(),
            Some(name) => name.parse()?,
        };

        Ok(Self {
            network,
            rescale: RescaleFactor::resolve(network, form.diam.as_deref()),
            primary_channel: form.chan1.clone(),
            secondary_channel: form.chan2.clone(),
            invert: parse_flag(form.invert.as_deref()),
            keep_size: parse_flag(form.keep_size.as_deref()),
            outputs: parse_output_kinds(form.outputs.as_deref()),
        })
    }

    pub fn channels(&self, image_channels: usize) -> Channels {
        Channels::resolve(
            self.primary_channel.as_deref(),
            self.secondary_channel.as_deref(),
            image_channels,
            self.network,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(fields: &[(&str, &str)]) -> SegmentForm {
        let mut form = SegmentForm::default();
        for &(key, value) in fields {
            let value = Some(value.to_string());
            match key {
                "net" => form.net = value,
                "diam" => form.diam = value,
                "chan1" => form.chan1 = value,
                "chan2" => form.chan2 = value,
                "invert" => form.invert = value,
                "keep_size" => form.keep_size = value,
                "outputs" => form.outputs = value,
                other => panic!("unexpected field {other}"),
            }
        }
        form
    }

    #[test]
    fn test_defaults_from_empty_form() {
        let config = SegmentationConfig::from_form(&SegmentForm::default()).unwrap();
        assert_eq!(config.network, Network::Cyto);
        assert_eq!(config.rescale, RescaleFactor::IDENTITY);
        assert!(!config.invert);
        assert!(!config.keep_size);
        assert_eq!(config.outputs, vec![OutputKind::Mask]);
    }

    #[test]
    fn test_fields_are_resolved() {
        let config = SegmentationConfig::from_form(&form(&[
            ("net", "Nuclei"),
            ("diam", "15"),
            ("invert", "true"),
            ("keep_size", "1"),
            ("outputs", "geojson,img"),
        ]))
        .unwrap();

        assert_eq!(config.network, Network::Nuclei);
        assert!(config.rescale.value() > 1.0);
        assert!(config.invert);
        assert!(config.keep_size);
        assert_eq!(config.outputs, vec![OutputKind::Geojson, OutputKind::Img]);
    }

    #[test]
    fn test_unknown_network_rejected() {
        let err = SegmentationConfig::from_form(&form(&[("net", "tissuenet")])).unwrap_err();
        assert!(matches!(err, SegmentError::InvalidRequest(_)));
    }

    #[test]
    fn test_bad_diameter_falls_back() {
        for diam in ["abc", "0", "-3", "NaN", "30"] {
            let config = SegmentationConfig::from_form(&form(&[("diam", diam)])).unwrap();
            assert_eq!(config.rescale, RescaleFactor::IDENTITY, "diam = {diam}");
        }
    }

    #[test]
    fn test_channels_follow_image_and_network() {
        let config =
            SegmentationConfig::from_form(&form(&[("chan1", "2"), ("chan2", "3")])).unwrap();
        assert_eq!(config.channels(3), Channels::new(2, 3));
        assert_eq!(config.channels(1), Channels::GRAYSCALE);

        let config = SegmentationConfig::from_form(&form(&[
            ("net", "nuclei"),
            ("chan1", "2"),
            ("chan2", "3"),
        ]))
        .unwrap();
        assert_eq!(config.channels(3), Channels::new(2, 0));

        let config =
            SegmentationConfig::from_form(&form(&[("chan1", "7"), ("chan2", "x")])).unwrap();
        assert_eq!(config.channels(3), Channels::new(0, 0));
    }
}
