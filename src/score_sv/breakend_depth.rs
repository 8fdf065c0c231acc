//! Short-range pileup depth estimation around SV breakends
//!

use rust_htslib::bam::{self, Read};
use unwrap::unwrap;

use super::SVScorer;
use crate::bam_utils::{bam_fetch_segment, is_alignment_match, update_ref_pos};
use crate::breakpoint::Breakend;
use crate::genome_segment::GenomeSegment;

/// Flank size on each side of the breakend center defining the depth estimation window
const DEPTH_WINDOW_FLANK_SIZE: i64 = 50;

/// Add one alignment record to the short-range pileup depth estimate
///
/// Only read bases aligned through match segments contribute. Soft-clipped, inserted and deleted
/// bases are not counted, while deletions still advance the reference cursor.
///
/// # Arguments
///
/// * `begin_pos` - Reference begin position of the range covered by the depth array
///
pub(super) fn add_read_to_depth_est(record: &bam::Record, begin_pos: i64, depth: &mut [u32]) {
    let end_pos = begin_pos + depth.len() as i64;

    let mut ref_pos = record.pos();
    for c in record.cigar().iter() {
        if ref_pos >= end_pos {
            return;
        }
        if is_alignment_match(c) {
            let seg_start = std::cmp::max(ref_pos, begin_pos);
            let seg_end = std::cmp::min(ref_pos + c.len() as i64, end_pos);
            for pos in seg_start..seg_end {
                depth[(pos - begin_pos) as usize] += 1;
            }
        }
        update_ref_pos(c, &mut ref_pos);
    }
}

impl SVScorer {
    /// Maximum mapped read depth over a small window around the breakend center
    ///
    /// The pileup is taken from the normal sample. Filtration is reduced to mapped reads only,
    /// duplicates included, so the result stays comparable to the upstream chromosome depth
    /// estimates.
    ///
    pub(super) fn get_breakend_max_mapped_depth(&mut self, bp: &Breakend) -> u32 {
        let center_pos = bp.center_pos();
        let search_segment = GenomeSegment::from_parts(
            bp.segment.chrom_index,
            std::cmp::max(center_pos - DEPTH_WINDOW_FLANK_SIZE, 0),
            center_pos + DEPTH_WINDOW_FLANK_SIZE,
        );

        let mut depth = vec![0u32; search_segment.range.size() as usize];

        let mut is_normal_found = false;
        for (bam_index, bam_reader) in self.bam_readers.iter_mut().enumerate() {
            if self.is_alignment_tumor[bam_index] {
                continue;
            }

            bam_fetch_segment(bam_reader, &search_segment);
            let mut record = bam::Record::new();
            while let Some(r) = bam_reader.read(&mut record) {
                unwrap!(r, "Failed to parse alignment record");

                if record.is_unmapped() {
                    continue;
                }
                if record.pos() >= search_segment.range.end {
                    break;
                }

                add_read_to_depth_est(&record, search_segment.range.start, &mut depth);
            }

            is_normal_found = true;
            break;
        }

        assert!(
            is_normal_found,
            "No normal sample alignment file available for breakend depth estimation"
        );

        depth.iter().copied().max().unwrap_or(0)
    }
}
