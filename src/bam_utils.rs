//! Utilities for alignment record processing shared by the scoring pipeline
//!

use rust_htslib::bam::{self, record::Cigar};

use crate::genome_segment::GenomeSegment;

/// Check if the alignment record should be filtered from split-read scoring
///
/// Duplicate, secondary and supplementary alignments are excluded so that each fragment is
/// observed at most once per read side.
///
pub fn filter_out_scoring_record(record: &bam::Record) -> bool {
    record.is_quality_check_failed()
        || record.is_duplicate()
        || record.is_secondary()
        || record.is_supplementary()
}

/// True for CIGAR segments aligning read to reference (M/=/X)
pub fn is_alignment_match(c: &Cigar) -> bool {
    matches!(c, Cigar::Match(_) | Cigar::Equal(_) | Cigar::Diff(_))
}

fn get_cigarseg_ref_offset(c: &Cigar) -> i64 {
    use Cigar::*;
    match c {
        Match(len) | Equal(len) | Diff(len) | Del(len) | RefSkip(len) => *len as i64,
        _ => 0,
    }
}

/// A utility method to track ref positions while iterating through a cigar string
pub fn update_ref_pos(c: &Cigar, ref_pos: &mut i64) {
    *ref_pos += get_cigarseg_ref_offset(c);
}

/// Set the reader's region to the given genome segment
pub fn bam_fetch_segment(bam_reader: &mut bam::IndexedReader, target_segment: &GenomeSegment) {
    bam_reader
        .fetch(bam::FetchDefinition::Region(
            target_segment.chrom_index as i32,
            target_segment.range.start,
            target_segment.range.end,
        ))
        .unwrap();
}
