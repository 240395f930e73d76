//! Prominence-weighted colour blending.
//!
//! A cell's colour is the weighted arithmetic mean of its contributing
//! flower colours, channel by channel, with the weight taken from each
//! record's prominence category.

use bloom_map_flora_models::{FlowerColor, Prominence};

/// Per-category blend weights.
///
/// Passed into the blender at construction instead of living in a
/// global table; the defaults are the production weighting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendWeights {
    /// Weight for [`Prominence::Low`].
    pub low: f64,
    /// Weight for [`Prominence::Med`].
    pub med: f64,
    /// Weight for [`Prominence::High`].
    pub high: f64,
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self {
            low: 1.0,
            med: 2.0,
            high: 3.0,
        }
    }
}

impl BlendWeights {
    /// Weight applied to a record with the given prominence.
    #[must_use]
    pub const fn weight(&self, prominence: Prominence) -> f64 {
        match prominence {
            Prominence::Low => self.low,
            Prominence::Med => self.med,
            Prominence::High => self.high,
        }
    }
}

/// Blends flower colours by prominence weight.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProminenceBlender {
    weights: BlendWeights,
}

impl ProminenceBlender {
    /// Creates a blender with the given weight configuration.
    #[must_use]
    pub const fn new(weights: BlendWeights) -> Self {
        Self { weights }
    }

    /// Computes the weighted arithmetic mean of each RGB channel,
    /// truncated to an integer before re-encoding.
    ///
    /// Returns `None` when there is nothing to blend — an empty input or
    /// a zero total weight. Callers must skip the cell rather than emit
    /// a degenerate colour.
    #[must_use]
    pub fn blend(&self, entries: &[(FlowerColor, Prominence)]) -> Option<FlowerColor> {
        let mut total_weight = 0.0;
        let (mut r, mut g, mut b) = (0.0, 0.0, 0.0);

        for &(colour, prominence) in entries {
            let weight = self.weights.weight(prominence);
            r += f64::from(colour.r) * weight;
            g += f64::from(colour.g) * weight;
            b += f64::from(colour.b) * weight;
            total_weight += weight;
        }

        if total_weight <= 0.0 {
            return None;
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let channel = |sum: f64| (sum / total_weight) as u8;

        Some(FlowerColor::rgb(channel(r), channel(g), channel(b)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: FlowerColor = FlowerColor::rgb(0xff, 0x00, 0x00);
    const BLUE: FlowerColor = FlowerColor::rgb(0x00, 0x00, 0xff);

    #[test]
    fn blends_weighted_average_with_truncation() {
        let blender = ProminenceBlender::default();

        // (3*255 + 1*0) / 4 = 191 red, (3*0 + 1*255) / 4 = 63 blue.
        let blended = blender
            .blend(&[(RED, Prominence::High), (BLUE, Prominence::Low)])
            .unwrap();

        assert_eq!(blended.to_string(), "#bf003f");
    }

    #[test]
    fn blend_is_order_independent() {
        let blender = ProminenceBlender::default();
        let forward = blender.blend(&[(RED, Prominence::High), (BLUE, Prominence::Low)]);
        let reversed = blender.blend(&[(BLUE, Prominence::Low), (RED, Prominence::High)]);
        assert_eq!(forward, reversed);
    }

    #[test]
    fn single_entry_is_identity() {
        let blender = ProminenceBlender::default();
        let colour = FlowerColor::rgb(0x12, 0x34, 0x56);
        assert_eq!(blender.blend(&[(colour, Prominence::Med)]), Some(colour));
    }

    #[test]
    fn empty_input_blends_to_none() {
        assert_eq!(ProminenceBlender::default().blend(&[]), None);
    }

    #[test]
    fn zero_total_weight_blends_to_none() {
        let blender = ProminenceBlender::new(BlendWeights {
            low: 0.0,
            med: 0.0,
            high: 0.0,
        });
        assert_eq!(blender.blend(&[(RED, Prominence::High)]), None);
    }

    #[test]
    fn custom_weights_shift_the_mean() {
        let blender = ProminenceBlender::new(BlendWeights {
            low: 1.0,
            med: 1.0,
            high: 9.0,
        });

        // (9*255 + 1*0) / 10 = 229.5, truncated to 229.
        let blended = blender
            .blend(&[(RED, Prominence::High), (BLUE, Prominence::Low)])
            .unwrap();

        assert_eq!(blended.r, 229);
        assert_eq!(blended.b, 25);
    }
}
