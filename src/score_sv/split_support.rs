//! Split-read evidence collection over SV breakend regions
//!

use log::debug;
use rust_htslib::bam::{self, Read};
use unwrap::unwrap;

use super::{SVScoreInfo, SVScorer, SampleAlleleCounts, SampleScoreInfo};
use crate::bam_utils::{bam_fetch_segment, filter_out_scoring_record};
use crate::breakpoint::{Breakend, SVAlignmentInfo, SVCandidate};
use crate::chrom_depth::ChromDepthFilter;
use crate::read_scanner::ReadScanner;
use crate::split_read_align::{align_split_read, SplitReadAlignment};
use crate::sv_evidence::{FragmentEvidenceStore, SVEvidence, SplitReadSupport};

/// Multiple of the chromosome max-depth ceiling above which split-read scoring is skipped
const MAX_DEPTH_SPLIT_READ_FACTOR: f64 = 2.0;

/// Record the split alignment results from one read against one allele's junction templates
///
/// The alignment log-likelihood is recorded on both breakend cells unconditionally, so that
/// allele likelihood comparisons stay defined for reads without junction support.
///
fn increment_allele_evidence(
    bp1_sr: &SplitReadAlignment,
    bp2_sr: &SplitReadAlignment,
    read_mapq: u32,
    allele_counts: &mut SampleAlleleCounts,
    bp1_support: &mut SplitReadSupport,
    bp2_support: &mut SplitReadSupport,
) {
    let mut bp1_evidence = 0f32;
    let mut bp2_evidence = 0f32;

    if bp1_sr.has_evidence {
        bp1_evidence = bp1_sr.evidence;
        bp1_support.is_split_support = true;
        bp1_support.split_evidence = bp1_evidence;
    }
    bp1_support.split_ln_lhood = bp1_sr.align_ln_lhood;

    if bp2_sr.has_evidence {
        bp2_evidence = bp2_sr.evidence;
        bp2_support.is_split_support = true;
        bp2_support.split_evidence = bp2_evidence;
    }
    bp2_support.split_ln_lhood = bp2_sr.align_ln_lhood;

    if bp1_sr.has_evidence || bp2_sr.has_evidence {
        allele_counts.split_read_count += 1;
        allele_counts.split_read_evidence += bp1_evidence.max(bp2_evidence);
        allele_counts.split_read_map_q += (read_mapq * read_mapq) as f32;
    }
}

/// Evaluate one alignment record for split support of both alleles at both breakends
///
pub(super) fn process_split_read_record(
    record: &bam::Record,
    align_info: &SVAlignmentInfo,
    read_scanner: &ReadScanner,
    fragment_store: &mut FragmentEvidenceStore,
    sample_info: &mut SampleScoreInfo,
) {
    let read_seq = record.seq().as_bytes();
    let read_quals = record.qual();
    let read_mapq = record.mapq() as u32;
    let is_read1 = record.is_first_in_template();

    let qname = std::str::from_utf8(record.qname()).unwrap().to_string();
    let fragment = fragment_store.entry(qname).or_default();

    // baseline observation state for this read side:
    {
        let read_ev = fragment.read_mut(is_read1);
        read_ev.is_scanned = true;
        read_ev.is_anchored = read_scanner.is_anchored_read(record);
    }

    // Both breakend hypotheses are evaluated together, the only difference breakend1 vs
    // breakend2 makes is where in the alignment file the read was found. A read already
    // evaluated from the other breakend region is skipped here:
    if fragment.alt_allele.bp1.read(is_read1).is_split_evaluated {
        return;
    }
    fragment.alt_allele.bp1.read_mut(is_read1).is_split_evaluated = true;
    fragment.alt_allele.bp2.read_mut(is_read1).is_split_evaluated = true;
    fragment.ref_allele.bp1.read_mut(is_read1).is_split_evaluated = true;
    fragment.ref_allele.bp2.read_mut(is_read1).is_split_evaluated = true;

    // align the read to the junction contig:
    let bp1_contig_sr = align_split_read(
        &read_seq,
        read_quals,
        &align_info.bp1.contig_seq,
        align_info.bp1.contig_offset,
    );
    let bp2_contig_sr = align_split_read(
        &read_seq,
        read_quals,
        &align_info.bp2.contig_seq,
        align_info.bp2.contig_offset,
    );

    // align the read to the reference junction regions:
    let bp1_ref_sr = align_split_read(
        &read_seq,
        read_quals,
        &align_info.bp1.ref_seq,
        align_info.bp1.ref_offset,
    );
    let bp2_ref_sr = align_split_read(
        &read_seq,
        read_quals,
        &align_info.bp2.ref_seq,
        align_info.bp2.ref_offset,
    );

    {
        let allele_ev = &mut fragment.alt_allele;
        increment_allele_evidence(
            &bp1_contig_sr,
            &bp2_contig_sr,
            read_mapq,
            &mut sample_info.alt_allele,
            allele_ev.bp1.read_mut(is_read1),
            allele_ev.bp2.read_mut(is_read1),
        );
    }
    {
        let allele_ev = &mut fragment.ref_allele;
        increment_allele_evidence(
            &bp1_ref_sr,
            &bp2_ref_sr,
            read_mapq,
            &mut sample_info.ref_allele,
            allele_ev.bp1.read_mut(is_read1),
            allele_ev.bp2.read_mut(is_read1),
        );
    }
}

/// Scan all reads over one breakend region for split support
///
fn score_split_reads(
    bam_reader: &mut bam::IndexedReader,
    bp: &Breakend,
    align_info: &SVAlignmentInfo,
    read_scanner: &ReadScanner,
    fragment_store: &mut FragmentEvidenceStore,
    sample_info: &mut SampleScoreInfo,
) {
    bam_fetch_segment(bam_reader, &bp.segment);
    let mut record = bam::Record::new();
    while let Some(r) = bam_reader.read(&mut record) {
        unwrap!(r, "Failed to parse alignment record");

        if filter_out_scoring_record(&record) {
            continue;
        }

        process_split_read_record(&record, align_info, read_scanner, fragment_store, sample_info);
    }
}

/// Return rms given sum of squares
fn finish_rms(sum_sqr: f32, count: usize) -> f32 {
    if count == 0 {
        return 0.;
    }
    (sum_sqr / count as f32).sqrt()
}

/// Make final split read computations after the region scans are finished
///
pub(super) fn finish_sample_split_read_data(sample_info: &mut SampleScoreInfo) {
    let alt = &mut sample_info.alt_allele;
    alt.split_read_map_q = finish_rms(alt.split_read_map_q, alt.split_read_count);

    let ref_allele = &mut sample_info.ref_allele;
    ref_allele.split_read_map_q = finish_rms(ref_allele.split_read_map_q, ref_allele.split_read_count);
}

impl SVScorer {
    /// Count the split reads supporting the ref and alt alleles in each sample
    ///
    /// Split-read scoring only runs when the candidate is precise (a junction contig exists)
    /// and neither breakend sits in a region deep enough to blow out the read map.
    ///
    pub(super) fn get_sv_split_read_support(
        &mut self,
        align_info: Option<&SVAlignmentInfo>,
        sv: &SVCandidate,
        base_info: &mut SVScoreInfo,
        evidence: &mut SVEvidence,
    ) {
        let is_skip_sr_search_depth = is_skip_split_read_depth(
            &self.diploid_depth_filter,
            &self.somatic_depth_filter,
            sv,
            base_info,
        );

        if !sv.is_precise || is_skip_sr_search_depth {
            debug!(
                "Skipping split-read scoring for candidate {:?} / {:?}",
                sv.bp1, sv.bp2
            );
            return;
        }

        let align_info = align_info.expect("Missing junction alignment context for precise SV");

        let read_scanner = &self.read_scanner;
        for (bam_index, bam_reader) in self.bam_readers.iter_mut().enumerate() {
            let is_tumor = self.is_alignment_tumor[bam_index];
            let sample_info = base_info.sample_mut(is_tumor);
            let fragment_store = evidence.sample_mut(is_tumor);

            // The breakend regions are scanned in (bp1, bp2) order, so that repeat observations
            // of the same read from the second region are suppressed:
            score_split_reads(
                bam_reader,
                &sv.bp1,
                align_info,
                read_scanner,
                fragment_store,
                sample_info,
            );
            score_split_reads(
                bam_reader,
                &sv.bp2,
                align_info,
                read_scanner,
                fragment_store,
                sample_info,
            );
        }

        finish_sample_split_read_data(&mut base_info.tumor);
        finish_sample_split_read_data(&mut base_info.normal);
    }
}

/// True when either breakend's observed depth is far enough above the chromosome ceiling to
/// skip split-read analysis
///
pub(super) fn is_skip_split_read_depth(
    diploid_depth_filter: &ChromDepthFilter,
    somatic_depth_filter: &ChromDepthFilter,
    sv: &SVCandidate,
    base_info: &SVScoreInfo,
) -> bool {
    if !(diploid_depth_filter.is_enabled() && somatic_depth_filter.is_enabled()) {
        return false;
    }

    let bp1_max_max_depth = diploid_depth_filter
        .max_depth(sv.bp1.segment.chrom_index)
        .max(somatic_depth_filter.max_depth(sv.bp1.segment.chrom_index));
    let bp2_max_max_depth = diploid_depth_filter
        .max_depth(sv.bp2.segment.chrom_index)
        .max(somatic_depth_filter.max_depth(sv.bp2.segment.chrom_index));

    (base_info.bp1_max_depth as f64 > MAX_DEPTH_SPLIT_READ_FACTOR * bp1_max_max_depth)
        || (base_info.bp2_max_depth as f64 > MAX_DEPTH_SPLIT_READ_FACTOR * bp2_max_max_depth)
}
