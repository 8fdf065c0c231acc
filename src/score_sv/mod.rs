//! Scoring pipeline for SV candidates
//!
//! For each candidate the pipeline estimates breakend depth, gathers spanning-pair and
//! split-read evidence per fragment, summarizes the evidence into conservative per-sample
//! counts, and scores the diploid germline model plus (for tumor/normal runs) the somatic
//! model.
//!

mod breakend_depth;
mod diploid;
mod somatic;
mod split_support;
mod support_summary;

use rust_htslib::bam;
use simple_error::{bail, SimpleResult};

use crate::breakpoint::{SVAlignmentInfo, SVCandidate};
use crate::chrom_depth::ChromDepthFilter;
use crate::pair_support::SpanningPairScorer;
use crate::read_scanner::ReadScanner;
use crate::sv_evidence::SVEvidence;

pub use self::diploid::{
    DiploidScoreInfo, DiploidScoreSettings, DiploidScoreSettingsDeriv, Genotype,
};
pub use self::somatic::{SomaticScoreInfo, SomaticScoreSettings};

/// Filter label marking calls at loci exceeding the chromosome depth ceiling
pub const MAX_DEPTH_FILTER_LABEL: &str = "MaxDepth";

/// Filter label marking diploid calls with low genotype quality
pub const MIN_GT_FILTER_LABEL: &str = "MinGQ";

/// Supporting read counts for one allele in one sample
///
#[derive(Clone, Debug, Default)]
pub struct SampleAlleleCounts {
    /// Count of reads where the split alignment posterior strongly favors this allele
    pub confident_split_read_count: usize,

    /// Count of anchored fragments where the insert-size likelihood strongly favors this allele
    pub confident_spanning_pair_count: usize,

    /// Count of reads consistent with this allele spanning breakend1 alone
    pub bp1_span_read_count: usize,

    /// Count of reads consistent with this allele spanning breakend2 alone
    pub bp2_span_read_count: usize,

    /// Count of reads with split support for this allele at either breakend
    pub split_read_count: usize,

    /// Sum of per-read split evidence weights
    pub split_read_evidence: f32,

    /// Sum of squared MAPQ over split-supporting reads during accumulation, replaced by the
    /// root-mean-square at finalization
    pub split_read_map_q: f32,
}

/// Per-allele evidence counts for one sample
#[derive(Clone, Debug, Default)]
pub struct SampleScoreInfo {
    pub ref_allele: SampleAlleleCounts,
    pub alt_allele: SampleAlleleCounts,
}

/// Model-neutral evidence summary for one SV candidate
///
#[derive(Clone, Debug, Default)]
pub struct SVScoreInfo {
    pub bp1_max_depth: u32,
    pub bp2_max_depth: u32,
    pub normal: SampleScoreInfo,
    pub tumor: SampleScoreInfo,
}

impl SVScoreInfo {
    pub fn sample_mut(&mut self, is_tumor: bool) -> &mut SampleScoreInfo {
        if is_tumor {
            &mut self.tumor
        } else {
            &mut self.normal
        }
    }
}

/// Full scoring output for one SV candidate
///
/// The record is owned by the caller and reset by the pipeline at the start of every scoring
/// pass.
///
#[derive(Clone, Debug, Default)]
pub struct ModelScoreInfo {
    pub base: SVScoreInfo,
    pub diploid: DiploidScoreInfo,

    /// Defined only when somatic scoring was requested
    pub somatic: Option<SomaticScoreInfo>,
}

impl ModelScoreInfo {
    pub fn clear(&mut self) {
        *self = Default::default();
    }
}

/// Check scoring model settings for internally consistent values
///
pub fn validate_score_settings(
    diploid_settings: &DiploidScoreSettings,
    somatic_settings: &SomaticScoreSettings,
) -> SimpleResult<()> {
    if diploid_settings.sv_prior <= 0. || diploid_settings.sv_prior >= 1. {
        bail!(
            "Diploid SV prior must fall in (0,1), observed: {}",
            diploid_settings.sv_prior
        );
    }
    if diploid_settings.max_depth_factor <= 0. {
        bail!(
            "Diploid max depth factor must be positive, observed: {}",
            diploid_settings.max_depth_factor
        );
    }
    if somatic_settings.max_depth_factor <= 0. {
        bail!(
            "Somatic max depth factor must be positive, observed: {}",
            somatic_settings.max_depth_factor
        );
    }
    Ok(())
}

/// Scoring engine for SV candidates over one normal sample and up to one tumor sample
///
/// The scorer owns one indexed reader per input alignment file for its lifetime, and reuses
/// them across candidates via region fetches.
///
pub struct SVScorer {
    is_alignment_tumor: Vec<bool>,
    diploid_settings: DiploidScoreSettings,
    diploid_deriv: DiploidScoreSettingsDeriv,
    diploid_depth_filter: ChromDepthFilter,
    somatic_depth_filter: ChromDepthFilter,
    read_scanner: ReadScanner,
    bam_readers: Vec<bam::IndexedReader>,
}

impl SVScorer {
    /// # Arguments
    ///
    /// * `chrom_mean_depth` - Expected depth per chromosome in the normal sample, used to build
    ///   the per-model maximum-depth filters. Depth filtering is disabled when this is None.
    ///
    pub fn new(
        bam_filenames: &[&str],
        is_alignment_tumor: &[bool],
        chrom_mean_depth: Option<&[f64]>,
        diploid_settings: DiploidScoreSettings,
        somatic_settings: SomaticScoreSettings,
        read_scanner: ReadScanner,
    ) -> Self {
        assert!(!bam_filenames.is_empty());
        assert_eq!(bam_filenames.len(), is_alignment_tumor.len());

        let diploid_depth_filter = match chrom_mean_depth {
            Some(x) => ChromDepthFilter::new(x, diploid_settings.max_depth_factor),
            None => ChromDepthFilter::disabled(),
        };
        let somatic_depth_filter = match chrom_mean_depth {
            Some(x) => ChromDepthFilter::new(x, somatic_settings.max_depth_factor),
            None => ChromDepthFilter::disabled(),
        };
        let diploid_deriv = DiploidScoreSettingsDeriv::new(&diploid_settings);

        let bam_readers = bam_filenames
            .iter()
            .map(|x| bam::IndexedReader::from_path(x).unwrap())
            .collect();

        Self {
            is_alignment_tumor: is_alignment_tumor.to_vec(),
            diploid_settings,
            diploid_deriv,
            diploid_depth_filter,
            somatic_depth_filter,
            read_scanner,
            bam_readers,
        }
    }

    /// Score one SV candidate
    ///
    /// # Arguments
    ///
    /// * `pair_scorer` - Collaborator filling spanning-pair fragment evidence for the candidate
    ///
    /// * `align_info` - Junction alignment context, required for precise candidates
    ///
    /// * `is_somatic` - Run the somatic tumor/normal model in addition to the diploid model
    ///
    /// * `model_score_info` - Caller-owned output record, reset at entry
    ///
    pub fn score_sv(
        &mut self,
        pair_scorer: &mut dyn SpanningPairScorer,
        align_info: Option<&SVAlignmentInfo>,
        sv: &SVCandidate,
        is_somatic: bool,
        model_score_info: &mut ModelScoreInfo,
    ) {
        model_score_info.clear();

        let mut evidence = SVEvidence::default();

        {
            let base_info = &mut model_score_info.base;

            // get breakend center depth estimates:
            base_info.bp1_max_depth = self.get_breakend_max_mapped_depth(&sv.bp1);
            base_info.bp2_max_depth = self.get_breakend_max_mapped_depth(&sv.bp2);

            // count the paired-read fragments supporting the ref and alt alleles in each sample:
            pair_scorer.score_pair_support(sv, base_info, &mut evidence);

            // count the split reads supporting the ref and alt alleles in each sample:
            self.get_sv_split_read_support(align_info, sv, base_info, &mut evidence);

            // derive the conservative per-sample support counts shared by all models:
            support_summary::get_sv_support_summary(&evidence, base_info);
        }

        // score components specific to the diploid-germline model:
        model_score_info.diploid = diploid::score_diploid_sv(
            &self.diploid_settings,
            &self.diploid_deriv,
            sv,
            &self.diploid_depth_filter,
            &evidence,
            &model_score_info.base,
        );

        // score components specific to the somatic model:
        if is_somatic {
            model_score_info.somatic = Some(somatic::score_somatic_sv(
                sv,
                &self.somatic_depth_filter,
                &model_score_info.base,
            ));
        }
    }
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

    fn get_test_evidence() -> SVEvidence {
        let mut evidence = SVEvidence::default();
        for fragment_index in 0..4 {
            let fragev = evidence
                .normal
                .entry(format!("frag{fragment_index}"))
                .or_default();
            fragev.read1.is_scanned = true;
            fragev.read1.is_anchored = true;
            fragev.read2.is_scanned = true;
            fragev.read2.is_anchored = true;
            fragev.alt_allele.bp1.is_fragment_support = true;
            fragev.alt_allele.bp1.frag_length_prob = 0.8;
            fragev.ref_allele.bp1.is_fragment_support = true;
            fragev.ref_allele.bp1.frag_length_prob = 1e-3;
        }
        evidence
    }

    /// Repeating all model stages on fixed evidence must reproduce identical results
    #[test]
    fn test_model_scoring_is_deterministic() {
        let sv = get_test_sv();
        let evidence = get_test_evidence();
        let diploid_settings = DiploidScoreSettings::default();
        let deriv = DiploidScoreSettingsDeriv::new(&diploid_settings);
        let depth_filter = ChromDepthFilter::disabled();

        let run_models = || {
            let mut base_info = SVScoreInfo::default();
            support_summary::get_sv_support_summary(&evidence, &mut base_info);
            let diploid_info = diploid::score_diploid_sv(
                &diploid_settings,
                &deriv,
                &sv,
                &depth_filter,
                &evidence,
                &base_info,
            );
            let somatic_info = somatic::score_somatic_sv(&sv, &depth_filter, &base_info);
            (base_info, diploid_info, somatic_info)
        };

        let (base1, diploid1, somatic1) = run_models();
        let (base2, diploid2, somatic2) = run_models();

        assert_eq!(
            base1.normal.alt_allele.confident_spanning_pair_count,
            base2.normal.alt_allele.confident_spanning_pair_count
        );
        assert_eq!(diploid1.gt, diploid2.gt);
        assert_eq!(diploid1.alt_score, diploid2.alt_score);
        assert_eq!(diploid1.gt_score, diploid2.gt_score);
        assert_eq!(somatic1.somatic_score, somatic2.somatic_score);
    }

    /// An imprecise candidate carries no split-read work, but the diploid model still runs
    /// from its spanning-pair evidence
    #[test]
    fn test_imprecise_candidate_scores_from_pair_evidence() {
        let mut sv = get_test_sv();
        sv.is_precise = false;

        let evidence = get_test_evidence();
        let diploid_settings = DiploidScoreSettings::default();
        let deriv = DiploidScoreSettingsDeriv::new(&diploid_settings);
        let depth_filter = ChromDepthFilter::disabled();

        let mut base_info = SVScoreInfo::default();
        support_summary::get_sv_support_summary(&evidence, &mut base_info);
        let diploid_info = diploid::score_diploid_sv(
            &diploid_settings,
            &deriv,
            &sv,
            &depth_filter,
            &evidence,
            &base_info,
        );

        assert_eq!(base_info.normal.alt_allele.split_read_count, 0);
        assert_eq!(base_info.normal.ref_allele.split_read_count, 0);
        assert_eq!(diploid_info.gt, Genotype::Hom);
        assert!(diploid_info.alt_score > 0);
    }

    /// With no evidence at all the candidate scores as reference with a zero alt score
    #[test]
    fn test_no_evidence_scores_zero() {
        let sv = get_test_sv();
        let evidence = SVEvidence::default();
        let diploid_settings = DiploidScoreSettings::default();
        let deriv = DiploidScoreSettingsDeriv::new(&diploid_settings);
        let depth_filter = ChromDepthFilter::disabled();

        let mut base_info = SVScoreInfo::default();
        support_summary::get_sv_support_summary(&evidence, &mut base_info);
        let diploid_info = diploid::score_diploid_sv(
            &diploid_settings,
            &deriv,
            &sv,
            &depth_filter,
            &evidence,
            &base_info,
        );

        assert_eq!(diploid_info.gt, Genotype::Ref);
        assert_eq!(diploid_info.alt_score, 0);
    }

    #[test]
    fn test_validate_score_settings() {
        let diploid_settings = DiploidScoreSettings::default();
        let somatic_settings = SomaticScoreSettings::default();
        assert!(validate_score_settings(&diploid_settings, &somatic_settings).is_ok());

        let bad_settings = DiploidScoreSettings {
            sv_prior: 0.,
            ..Default::default()
        };
        assert!(validate_score_settings(&bad_settings, &somatic_settings).is_err());
    }
}
