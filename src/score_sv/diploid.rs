//! Diploid germline quality model
//!

use std::collections::BTreeSet;

use strum::EnumCount;

use super::support_summary::get_spanning_pair_allele_lhood;
use super::{SVScoreInfo, MAX_DEPTH_FILTER_LABEL, MIN_GT_FILTER_LABEL};
use crate::breakpoint::SVCandidate;
use crate::chrom_depth::ChromDepthFilter;
use crate::prob_utils::{error_prob_to_qphred, get_complement_prob, normalize_ln_distro};
use crate::sv_evidence::{AlleleEvidence, SVEvidence};

/// Prior probability that an observed spanning fragment is an artifact rather than a true
/// ligation product
const CHIMERA_PROB: f64 = 1e-3;

/// Diploid genotypes over the ref and alt alleles
///
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, strum::EnumCount, strum::FromRepr)]
pub enum Genotype {
    #[default]
    Ref,
    Het,
    Hom,
}

/// Fraction of fragments expected from the alt allele under each genotype
const GENOTYPE_ALT_FRACTION: [f64; Genotype::COUNT] = [0.0, 0.5, 1.0];

/// Settings for the diploid germline quality model
///
#[derive(Clone, Debug)]
pub struct DiploidScoreSettings {
    /// Prior probability of a heterozygous SV at a given locus
    pub sv_prior: f64,

    /// Minimum alt score a call must reach before any filters are marked on it
    pub min_output_alt_score: i32,

    /// Calls with genotype quality below this value receive the MinGQ filter label
    pub min_gt_score_filter: i32,

    /// Scale on expected chromosome depth defining the maximum-depth filter
    pub max_depth_factor: f64,
}

impl Default for DiploidScoreSettings {
    fn default() -> Self {
        Self {
            sv_prior: 1e-5,
            min_output_alt_score: 10,
            min_gt_score_filter: 15,
            max_depth_factor: 3.0,
        }
    }
}

/// Values derived from DiploidScoreSettings once per run
///
#[derive(Clone, Debug)]
pub struct DiploidScoreSettingsDeriv {
    /// ln prior over the three genotypes
    pub ln_prior: [f64; Genotype::COUNT],
}

impl DiploidScoreSettingsDeriv {
    pub fn new(settings: &DiploidScoreSettings) -> Self {
        let het_prior = settings.sv_prior;
        let hom_prior = settings.sv_prior / 2.;
        Self {
            ln_prior: [
                (1. - (het_prior + hom_prior)).ln(),
                het_prior.ln(),
                hom_prior.ln(),
            ],
        }
    }

    /// A flat genotype prior, under which the posterior reflects the data term alone
    pub fn uniform() -> Self {
        Self {
            ln_prior: [(1f64 / Genotype::COUNT as f64).ln(); Genotype::COUNT],
        }
    }
}

/// Quality summary from the diploid germline model
///
#[derive(Clone, Debug, Default)]
pub struct DiploidScoreInfo {
    pub gt: Genotype,

    /// Phred confidence that the genotype is not homozygous reference
    pub alt_score: i32,

    /// Phred confidence in the called genotype
    pub gt_score: i32,

    pub filters: BTreeSet<String>,
}

/// Pair likelihood of one allele for one fragment, mixed with the chimera prior
fn get_fragment_pair_allele_lhood(allele: &AlleleEvidence) -> f64 {
    let frag_prob = get_spanning_pair_allele_lhood(allele);
    (1. - CHIMERA_PROB) * frag_prob + CHIMERA_PROB
}

/// Score diploid germline specific components
///
pub(super) fn score_diploid_sv(
    settings: &DiploidScoreSettings,
    deriv: &DiploidScoreSettingsDeriv,
    sv: &SVCandidate,
    depth_filter: &ChromDepthFilter,
    evidence: &SVEvidence,
    base_info: &SVScoreInfo,
) -> DiploidScoreInfo {
    let mut diploid_info = DiploidScoreInfo::default();

    //
    // compute qualities
    //
    let mut loglhood = [0f64; Genotype::COUNT];
    for fragev in evidence.normal.values() {
        // high-quality spanning support relies on read1 and read2 mapping well:
        if !(fragev.read1.is_observed_anchor() && fragev.read2.is_observed_anchor()) {
            continue;
        }

        // only add to the likelihood if the fragment supports at least one allele:
        if !fragev.is_any_pair_support() {
            continue;
        }

        let ref_frag_lhood = get_fragment_pair_allele_lhood(&fragev.ref_allele);
        let alt_frag_lhood = get_fragment_pair_allele_lhood(&fragev.alt_allele);

        /* Split alignments stay out of the genotype likelihood until a read mismapping rate
         * is worked into the model, so only spanning pairs contribute here:
         *
         * increment_split_read_lhood(fragev, true, &mut ref_split_lhood, &mut alt_split_lhood);
         * increment_split_read_lhood(fragev, false, &mut ref_split_lhood, &mut alt_split_lhood);
         */

        for (gt_index, gt_loglhood) in loglhood.iter_mut().enumerate() {
            let alt_frac = GENOTYPE_ALT_FRACTION[gt_index];
            *gt_loglhood += (ref_frag_lhood * (1. - alt_frac) + alt_frag_lhood * alt_frac).ln();
        }
    }

    let mut pprob = [0f64; Genotype::COUNT];
    for gt_index in 0..Genotype::COUNT {
        pprob[gt_index] = loglhood[gt_index] + deriv.ln_prior[gt_index];
    }

    let max_gt_index = normalize_ln_distro(&mut pprob).unwrap();

    diploid_info.gt = Genotype::from_repr(max_gt_index).unwrap();
    diploid_info.alt_score = error_prob_to_qphred(pprob[Genotype::Ref as usize]);
    diploid_info.gt_score = error_prob_to_qphred(get_complement_prob(&pprob, max_gt_index));

    //
    // apply filters
    //
    if diploid_info.alt_score >= settings.min_output_alt_score {
        if depth_filter.is_enabled() {
            // mark the max depth filter if either breakend exceeds the chromosome ceiling:
            if base_info.bp1_max_depth as f64 > depth_filter.max_depth(sv.bp1.segment.chrom_index)
            {
                diploid_info
                    .filters
                    .insert(MAX_DEPTH_FILTER_LABEL.to_string());
            } else if base_info.bp2_max_depth as f64
                > depth_filter.max_depth(sv.bp2.segment.chrom_index)
            {
                diploid_info
                    .filters
                    .insert(MAX_DEPTH_FILTER_LABEL.to_string());
            }
        }

        if diploid_info.gt_score < settings.min_gt_score_filter {
            diploid_info
                .filters
                .insert(MIN_GT_FILTER_LABEL.to_string());
        }
    }

    diploid_info
}
