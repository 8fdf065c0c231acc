//! > **Structural variant scoring for paired tumor/normal and diploid germline calling**
//!
//! This library scores proposed SV junctions against indexed alignment files: it extracts
//! spanning-pair and split-read evidence per fragment in each sample, summarizes the evidence
//! into conservative allele support counts, and emits genotype and somatic qualities with
//! filter labels.
//!

pub mod bam_utils;
pub mod breakpoint;
pub mod chrom_depth;
pub mod genome_segment;
pub mod pair_support;
pub mod prob_utils;
pub mod read_scanner;
pub mod score_sv;
pub mod split_read_align;
pub mod sv_evidence;
