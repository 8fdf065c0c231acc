//! Conservative per-sample support counts derived from fragment evidence
//!

use super::{SVScoreInfo, SampleScoreInfo};
use crate::prob_utils::ln_pair_to_prob;
use crate::sv_evidence::{AlleleEvidence, FragmentEvidence, FragmentEvidenceStore, SVEvidence};

/// Posterior probability a read's split alignment must reach on the winning allele before the
/// read is counted as confident support
const SPLIT_SUPPORT_PROB: f64 = 0.999;

/// Fraction of the pair likelihood mass the winning allele must hold before the fragment is
/// counted as confident spanning support
const PAIR_SUPPORT_PROB: f64 = 0.9;

/// Count one read side toward the confident split-read support of the allele its alignment
/// posterior strongly favors
///
fn add_conservative_split_read_support(
    fragev: &FragmentEvidence,
    is_read1: bool,
    sample_info: &mut SampleScoreInfo,
) {
    // only consider reads where at least one allele and one breakend is confident, in the
    // absence of a noise state in the model:
    if !fragev.is_any_split_support_for_read(is_read1) {
        return;
    }

    let alt_ln_lhood = fragev
        .alt_allele
        .bp1
        .read(is_read1)
        .split_ln_lhood
        .max(fragev.alt_allele.bp2.read(is_read1).split_ln_lhood);

    let ref_ln_lhood = fragev
        .ref_allele
        .bp1
        .read(is_read1)
        .split_ln_lhood
        .max(fragev.ref_allele.bp2.read(is_read1).split_ln_lhood);

    if alt_ln_lhood > ref_ln_lhood {
        let (_, alt_prob) = ln_pair_to_prob(ref_ln_lhood, alt_ln_lhood);
        if alt_prob > SPLIT_SUPPORT_PROB {
            sample_info.alt_allele.confident_split_read_count += 1;
        }
    } else {
        let (_, ref_prob) = ln_pair_to_prob(alt_ln_lhood, ref_ln_lhood);
        if ref_prob > SPLIT_SUPPORT_PROB {
            sample_info.ref_allele.confident_split_read_count += 1;
        }
    }
}

/// Insert-size likelihood of an allele, taken over both breakends
///
pub(super) fn get_spanning_pair_allele_lhood(allele: &AlleleEvidence) -> f64 {
    let mut frag_prob = 0f64;
    if allele.bp1.is_fragment_support {
        frag_prob = allele.bp1.frag_length_prob as f64;
    }
    if allele.bp2.is_fragment_support {
        frag_prob = frag_prob.max(allele.bp2.frag_length_prob as f64);
    }
    frag_prob
}

/// Count one fragment toward the confident spanning-pair support of the allele its insert-size
/// likelihood strongly favors
///
fn add_conservative_spanning_pair_support(
    fragment_id: &str,
    fragev: &FragmentEvidence,
    sample_info: &mut SampleScoreInfo,
) {
    if !fragev.is_any_pair_support() {
        return;
    }

    // high-quality spanning support relies on read1 and read2 mapping well:
    if !(fragev.read1.is_observed_anchor() && fragev.read2.is_observed_anchor()) {
        return;
    }

    let alt_lhood = get_spanning_pair_allele_lhood(&fragev.alt_allele);
    let ref_lhood = get_spanning_pair_allele_lhood(&fragev.ref_allele);

    assert!(alt_lhood >= 0.);
    assert!(ref_lhood >= 0.);
    if alt_lhood <= 0. && ref_lhood <= 0. {
        panic!(
            "Spanning likelihood is zero for all alleles in fragment {fragment_id}: {fragev:?}"
        );
    }

    let sum = alt_lhood + ref_lhood;
    if alt_lhood > ref_lhood {
        if (alt_lhood / sum) > PAIR_SUPPORT_PROB {
            sample_info.alt_allele.confident_spanning_pair_count += 1;
        }
    } else if (ref_lhood / sum) > PAIR_SUPPORT_PROB {
        sample_info.ref_allele.confident_spanning_pair_count += 1;
    }
}

fn get_sample_counts(fragment_store: &FragmentEvidenceStore, sample_info: &mut SampleScoreInfo) {
    for (fragment_id, fragev) in fragment_store.iter() {
        // evaluate read1 and read2 from this fragment:
        add_conservative_split_read_support(fragev, true, sample_info);
        add_conservative_split_read_support(fragev, false, sample_info);

        add_conservative_spanning_pair_support(fragment_id, fragev, sample_info);
    }
}

/// Conservative count of reads and fragments which strongly support a single allele, i.e. where
/// P(allele | observation) is high
///
pub(super) fn get_sv_support_summary(evidence: &SVEvidence, base_info: &mut SVScoreInfo) {
    get_sample_counts(&evidence.normal, &mut base_info.normal);
    get_sample_counts(&evidence.tumor, &mut base_info.tumor);
}
