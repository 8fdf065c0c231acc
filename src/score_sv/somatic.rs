//! Somatic tumor/normal quality model
//!

use std::collections::BTreeSet;

use super::{SVScoreInfo, MAX_DEPTH_FILTER_LABEL};
use crate::breakpoint::SVCandidate;
use crate::chrom_depth::ChromDepthFilter;

/// Quality score asserted for candidates passing all somatic evidence checks
const NONZERO_SOMATIC_SCORE: u32 = 60;

/// Minimum tumor/normal evidence ratio required whenever the normal shows any alt evidence
const MIN_TUMOR_NORMAL_EVIDENCE_RATIO: f64 = 9.;

/// Settings for the somatic quality model
///
#[derive(Clone, Debug)]
pub struct SomaticScoreSettings {
    /// Scale on expected chromosome depth defining the maximum-depth filter
    pub max_depth_factor: f64,
}

impl Default for SomaticScoreSettings {
    fn default() -> Self {
        Self {
            max_depth_factor: 3.0,
        }
    }
}

/// Quality summary from the somatic model
///
#[derive(Clone, Debug, Default)]
pub struct SomaticScoreInfo {
    /// Phred confidence that the SV is somatic, currently all-or-nothing
    pub somatic_score: u32,

    pub filters: BTreeSet<String>,
}

/// True when the normal count is nonzero and the tumor/normal count ratio falls below the
/// required evidence ratio
fn is_tumor_normal_ratio_veto(tumor_count: usize, normal_count: usize) -> bool {
    (normal_count > 0)
        && ((tumor_count as f64 / normal_count as f64) < MIN_TUMOR_NORMAL_EVIDENCE_RATIO)
}

/// Score somatic specific components
///
pub(super) fn score_somatic_sv(
    sv: &SVCandidate,
    depth_filter: &ChromDepthFilter,
    base_info: &SVScoreInfo,
) -> SomaticScoreInfo {
    let mut somatic_info = SomaticScoreInfo::default();

    let normal = &base_info.normal;
    let tumor = &base_info.tumor;

    //
    // compute qualities
    //
    let mut is_nonzero_somatic_quality = true;

    // first check for substantial support in the normal:
    if normal.alt_allele.confident_spanning_pair_count > 1 {
        is_nonzero_somatic_quality = false;
    }
    if normal.alt_allele.confident_split_read_count > 5 {
        is_nonzero_somatic_quality = false;
    }

    if is_nonzero_somatic_quality {
        let low_pair_support = tumor.alt_allele.confident_spanning_pair_count < 6;
        let low_split_support = tumor.alt_allele.confident_split_read_count < 6;
        let low_single_support = (tumor.alt_allele.bp1_span_read_count < 14)
            || (tumor.alt_allele.bp2_span_read_count < 14);
        let high_single_contam = (normal.alt_allele.bp1_span_read_count > 1)
            || (normal.alt_allele.bp2_span_read_count > 1);

        // allow single-location read support to rescue an SV only if the evidence looks
        // very good:
        if (low_pair_support && low_split_support) && (low_single_support || high_single_contam) {
            is_nonzero_somatic_quality = false;
        }
    }

    if is_nonzero_somatic_quality {
        if is_tumor_normal_ratio_veto(
            tumor.alt_allele.confident_spanning_pair_count,
            normal.alt_allele.confident_spanning_pair_count,
        ) {
            is_nonzero_somatic_quality = false;
        }
        if is_tumor_normal_ratio_veto(
            tumor.alt_allele.bp1_span_read_count,
            normal.alt_allele.bp1_span_read_count,
        ) {
            is_nonzero_somatic_quality = false;
        }
        if is_tumor_normal_ratio_veto(
            tumor.alt_allele.bp2_span_read_count,
            normal.alt_allele.bp2_span_read_count,
        ) {
            is_nonzero_somatic_quality = false;
        }
    }

    {
        // there needs to be some ref support in the normal as well:
        let normal_ref_pair_support = normal.ref_allele.confident_spanning_pair_count > 6;
        let normal_ref_split_support = normal.ref_allele.confident_split_read_count > 6;

        if !(normal_ref_pair_support || normal_ref_split_support) {
            is_nonzero_somatic_quality = false;
        }
    }

    if is_nonzero_somatic_quality {
        somatic_info.somatic_score = NONZERO_SOMATIC_SCORE;
    }

    //
    // apply filters
    //
    if depth_filter.is_enabled() {
        // mark the max depth filter if either breakend exceeds the chromosome ceiling:
        if base_info.bp1_max_depth as f64 > depth_filter.max_depth(sv.bp1.segment.chrom_index) {
            somatic_info
                .filters
                .insert(MAX_DEPTH_FILTER_LABEL.to_string());
        } else if base_info.bp2_max_depth as f64
            > depth_filter.max_depth(sv.bp2.segment.chrom_index)
        {
            somatic_info
                .filters
                .insert(MAX_DEPTH_FILTER_LABEL.to_string());
        }
    }

    somatic_info
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breakpoint::{Breakend, BreakendState};
    use crate::genome_segment::GenomeSegment;

    fn get_test_sv() -> SVCandidate {
        SVCandidate {
            bp1: Breakend {
                segment: GenomeSegment::from_parts(0, 1000, 1001),
                state: BreakendState::RightOpen,
            },
            bp2: Breakend {
                segment: GenomeSegment::from_parts(0, 2000, 2001),
                state: BreakendState::LeftOpen,
            },
            is_precise: true,
        }
    }

    /// Base score record with clean tumor alt support and normal ref support
    fn get_somatic_pass_score_info() -> SVScoreInfo {
        let mut base_info = SVScoreInfo::default();
        base_info.tumor.alt_allele.confident_spanning_pair_count = 20;
        base_info.normal.ref_allele.confident_spanning_pair_count = 10;
        base_info
    }

    #[test]
    fn test_score_somatic_sv_pass() {
        let base_info = get_somatic_pass_score_info();
        let depth_filter = ChromDepthFilter::new(&[100.0], 3.0);

        let somatic_info = score_somatic_sv(&get_test_sv(), &depth_filter, &base_info);

        assert_eq!(somatic_info.somatic_score, 60);
        assert!(somatic_info.filters.is_empty());
    }

    /// Alt pair observations in the normal veto the somatic call
    #[test]
    fn test_score_somatic_sv_normal_contamination() {
        let mut base_info = get_somatic_pass_score_info();
        base_info.normal.alt_allele.confident_spanning_pair_count = 3;

        let depth_filter = ChromDepthFilter::disabled();
        let somatic_info = score_somatic_sv(&get_test_sv(), &depth_filter, &base_info);

        assert_eq!(somatic_info.somatic_score, 0);
    }

    #[test]
    fn test_score_somatic_sv_tumor_normal_ratio() {
        let mut base_info = get_somatic_pass_score_info();

        // one normal alt pair is tolerated when the tumor/normal ratio is high enough:
        base_info.normal.alt_allele.confident_spanning_pair_count = 1;
        base_info.tumor.alt_allele.confident_spanning_pair_count = 20;
        let depth_filter = ChromDepthFilter::disabled();
        let somatic_info = score_somatic_sv(&get_test_sv(), &depth_filter, &base_info);
        assert_eq!(somatic_info.somatic_score, 60);

        // the same normal evidence vetoes a weaker tumor signal:
        base_info.tumor.alt_allele.confident_spanning_pair_count = 8;
        let somatic_info = score_somatic_sv(&get_test_sv(), &depth_filter, &base_info);
        assert_eq!(somatic_info.somatic_score, 0);
    }

    #[test]
    fn test_score_somatic_sv_requires_normal_ref_support() {
        let mut base_info = get_somatic_pass_score_info();
        base_info.normal.ref_allele.confident_spanning_pair_count = 0;

        let depth_filter = ChromDepthFilter::disabled();
        let somatic_info = score_somatic_sv(&get_test_sv(), &depth_filter, &base_info);

        assert_eq!(somatic_info.somatic_score, 0);

        // confident normal ref split reads restore the call:
        base_info.normal.ref_allele.confident_split_read_count = 10;
        let somatic_info = score_somatic_sv(&get_test_sv(), &depth_filter, &base_info);
        assert_eq!(somatic_info.somatic_score, 60);
    }

    #[test]
    fn test_score_somatic_sv_low_tumor_support() {
        // weak tumor pair and split support falls back to the single-location evidence test,
        // which also fails here:
        let mut base_info = get_somatic_pass_score_info();
        base_info.tumor.alt_allele.confident_spanning_pair_count = 3;
        base_info.tumor.alt_allele.confident_split_read_count = 3;
        base_info.tumor.alt_allele.bp1_span_read_count = 5;
        base_info.tumor.alt_allele.bp2_span_read_count = 5;

        let depth_filter = ChromDepthFilter::disabled();
        let somatic_info = score_somatic_sv(&get_test_sv(), &depth_filter, &base_info);

        assert_eq!(somatic_info.somatic_score, 0);
    }

    #[test]
    fn test_score_somatic_sv_max_depth_filter() {
        let base_info = {
            let mut x = get_somatic_pass_score_info();
            x.bp2_max_depth = 500;
            x
        };
        let depth_filter = ChromDepthFilter::new(&[100.0], 3.0);

        let somatic_info = score_somatic_sv(&get_test_sv(), &depth_filter, &base_info);

        assert_eq!(somatic_info.somatic_score, 60);
        assert!(somatic_info.filters.contains(MAX_DEPTH_FILTER_LABEL));
    }
}
