use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Pretrained segmentation networks served by the model registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Network {
    /// Cytoplasm network; accepts a secondary (nuclear) channel.
    #[default]
    Cyto,
    /// Nuclei network; single-channel only.
    Nuclei,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown network `{0}` (expected `cyto` or `nuclei`)")]
pub struct UnknownNetwork(pub String);

impl Network {
    pub const ALL: [Network; 2] = [Network::Cyto, Network::Nuclei];

    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Cyto => "cyto",
            Network::Nuclei => "nuclei",
        }
    }

    /// Mean object diameter (pixels) the network was trained at.
    pub fn mean_diameter(&self) -> f32 {
        match self {
            Network::Cyto => 27.0,
            Network::Nuclei => 15.0,
        }
    }

    /// Requested diameter that maps to a rescale factor of exactly 1.0.
    pub fn native_diameter(&self) -> f32 {
        self.mean_diameter() / crate::rescale::DIAMETER_SCALE
    }

    pub fn supports_second_channel(&self) -> bool {
        matches!(self, Network::Cyto)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = UnknownNetwork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cyto" => Ok(Network::Cyto),
            "nuclei" => Ok(Network::Nuclei),
            _ => Err(UnknownNetwork(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_network_names() {
        assert_eq!("cyto".parse::<Network>().unwrap(), Network::Cyto);
        assert_eq!(" Nuclei ".parse::<Network>().unwrap(), Network::Nuclei);
        assert_eq!(
            "cyto2".parse::<Network>().unwrap_err(),
            UnknownNetwork("cyto2".to_string())
        );
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for network in Network::ALL {
            assert_eq!(network.to_string().parse::<Network>().unwrap(), network);
        }
    }

    #[test]
    fn test_only_cyto_takes_second_channel() {
        assert!(Network::Cyto.supports_second_channel());
        assert!(!Network::Nuclei.supports_second_channel());
    }
}
