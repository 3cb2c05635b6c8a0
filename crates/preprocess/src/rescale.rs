//! Requested object diameter → rescale factor applied before inference.

use crate::network::Network;

/// Diameter that means "use the network's native scale".
pub const DEFAULT_DIAMETER: f32 = 30.0;

/// Upper bound on the rescale factor; bounds the cost of tiny diameters.
pub const MAX_RESCALE: f32 = 2.0;

/// `√π / 2`: converts a requested diameter to the training-set convention.
pub(crate) const DIAMETER_SCALE: f32 = 0.886_226_9;

/// Multiplicative scale applied to the image before inference, in `(0, 2.0]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct RescaleFactor(f32);

impl RescaleFactor {
    pub const IDENTITY: RescaleFactor = RescaleFactor(1.0);

    pub fn value(&self) -> f32 {
        self.0
    }

    /// Resolve the factor for `network` from the raw diameter field.
    ///
    /// Total: a missing, non-numeric, non-finite or non-positive diameter
    /// resolves to [`RescaleFactor::IDENTITY`], as does the sentinel
    /// [`DEFAULT_DIAMETER`].
    pub fn resolve(network: Network, diameter: Option<&str>) -> Self {
        let Some(diameter) = diameter.and_then(|raw| raw.trim().parse::<f32>().ok()) else {
            return Self::IDENTITY;
        };
        Self::from_diameter(network, diameter)
    }

    pub fn from_diameter(network: Network, diameter: f32) -> Self {
        if diameter == DEFAULT_DIAMETER || !diameter.is_finite() || diameter <= 0.0 {
            return Self::IDENTITY;
        }

        let factor = network.mean_diameter() / (diameter * DIAMETER_SCALE);
        if !factor.is_finite() || factor <= 0.0 {
            tracing::debug!(%network, diameter, "Degenerate rescale factor, using 1.0");
            return Self::IDENTITY;
        }

        RescaleFactor(factor.min(MAX_RESCALE))
    }
}

impl Default for RescaleFactor {
    fn default() -> Self {
        Self::IDENTITY
    }
}
