//! Spanning-pair evidence contract
//!
//! The pair-support algorithm itself lives with the candidate generator, which already tracks the
//! read pairs crossing each junction. The scoring pipeline only depends on the contract below.
//!

use crate::breakpoint::SVCandidate;
use crate::score_sv::SVScoreInfo;
use crate::sv_evidence::SVEvidence;

/// Minimum distance a fragment must extend past the breakend on each side before its insert size
/// is considered informative for pair support
pub const MIN_FRAG_SUPPORT: i64 = 50;

/// Collaborator filling spanning-pair evidence for one SV candidate
///
/// Implementations own whatever candidate-set read data they need. For every observed fragment in
/// every sample the scorer is expected to:
///
/// * set `is_scanned`/`is_anchored` on each observed read of the fragment,
/// * set `is_fragment_support` and `frag_length_prob` on each supported (allele, breakend)
///   evidence cell,
/// * increment `bp1_span_read_count`/`bp2_span_read_count` on the supported allele counts.
///
pub trait SpanningPairScorer {
    fn score_pair_support(
        &mut self,
        sv: &SVCandidate,
        base_info: &mut SVScoreInfo,
        evidence: &mut SVEvidence,
    );
}
