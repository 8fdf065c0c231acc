use std::fmt;

use crate::genome_segment::GenomeSegment;

/// Orientation of a breakend
///
/// 'RightOpen' means that the genome to the left of the breakend is locally anchored and joins
/// whatever lies on the other side of the junction. A 'RightOpen' breakend would correspond to the
/// left side of a simple deletion.
///
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BreakendState {
    Unknown,
    RightOpen,
    LeftOpen,
    Complex,
}

/// A single breakend, half of a candidate structural variant junction
///
#[derive(Clone, Eq, PartialEq)]
pub struct Breakend {
    /// The segment range represents the uncertainty in the breakend location for an imprecise
    /// candidate, or breakend homology once a contig assembly has resolved the junction to
    /// single-base accuracy.
    ///
    pub segment: GenomeSegment,
    pub state: BreakendState,
}

impl Breakend {
    pub fn center_pos(&self) -> i64 {
        self.segment.range.center()
    }
}

impl fmt::Debug for Breakend {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Breakend: {:?} state: {:?}", self.segment, self.state)
    }
}

/// A candidate structural variant expressed as an ordered breakend pair
///
#[derive(Clone, Debug)]
pub struct SVCandidate {
    pub bp1: Breakend,
    pub bp2: Breakend,

    /// True when a contig assembly exists for the junction, enabling split-read scoring
    pub is_precise: bool,
}

/// Contig and reference scoring sequences for one breakend of a precise SV
///
/// All sequences are uppercase ASCII nucleotides. The offsets mark the position in each sequence
/// immediately before the junction.
///
#[derive(Clone, Debug)]
pub struct BreakendScoringSeqs {
    pub contig_seq: Vec<u8>,
    pub contig_offset: usize,
    pub ref_seq: Vec<u8>,
    pub ref_offset: usize,
}

/// Junction alignment context for a precise SV, used to test reads for split-read support
///
#[derive(Clone, Debug)]
pub struct SVAlignmentInfo {
    pub bp1: BreakendScoringSeqs,
    pub bp2: BreakendScoringSeqs,
}
