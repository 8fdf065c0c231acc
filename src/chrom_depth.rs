//! Per-chromosome depth ceilings used to keep scoring out of pathological regions
//!

/// Maximum-depth filter derived from expected chromosome depth
///
/// The filter is built from the per-chromosome mean depth estimates of the normal sample, scaled
/// by a model-specific factor. An empty depth table disables the filter.
///
#[derive(Clone, Debug, Default)]
pub struct ChromDepthFilter {
    max_depth: Vec<f64>,
}

impl ChromDepthFilter {
    pub fn new(chrom_mean_depth: &[f64], max_depth_factor: f64) -> Self {
        assert!(max_depth_factor > 0.);
        Self {
            max_depth: chrom_mean_depth
                .iter()
                .map(|x| x * max_depth_factor)
                .collect(),
        }
    }

    /// A filter with no depth table, which disables all depth-based gating
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        !self.max_depth.is_empty()
    }

    pub fn max_depth(&self, chrom_index: usize) -> f64 {
        self.max_depth[chrom_index]
    }
}
