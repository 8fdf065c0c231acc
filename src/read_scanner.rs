//! Read anchoring policy shared by the evidence scanners
//!

use rust_htslib::bam;

use crate::bam_utils::filter_out_scoring_record;

/// Mapping-quality policy used to decide which reads are trusted as positional evidence
///
#[derive(Clone, Debug)]
pub struct ReadScanner {
    min_mapq: u32,
}

impl ReadScanner {
    pub fn new(min_mapq: u32) -> Self {
        Self { min_mapq }
    }

    pub fn min_mapq(&self) -> u32 {
        self.min_mapq
    }

    /// True if the record mapping is strong enough to anchor its fragment at this locus
    pub fn is_anchored_read(&self, record: &bam::Record) -> bool {
        (!filter_out_scoring_record(record)) && (record.mapq() as u32 >= self.min_mapq)
    }
}

impl Default for ReadScanner {
    fn default() -> Self {
        Self { min_mapq: 15 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_htslib::bam::{header, Header, HeaderView};

    fn get_test_header() -> HeaderView {
        let mut _header = Header::new();
        _header.push_record(
            header::HeaderRecord::new(b"SQ")
                .push_tag(b"SN", "chr1")
                .push_tag(b"LN", 10000000),
        );
        HeaderView::from_header(&_header)
    }

    #[test]
    fn test_is_anchored_read() {
        let header = get_test_header();
        let scanner = ReadScanner::new(15);
        assert_eq!(scanner.min_mapq(), 15);

        let sam_line =
            b"qname\t0\tchr1\t10\t60\t20M\t*\t0\t0\tACGCCGTATCGTCTCGAGGA\tDDDDDEEEEEDDDDDEEEEE";
        let rec = bam::Record::from_sam(&header, sam_line).unwrap();
        assert!(scanner.is_anchored_read(&rec));

        let sam_line =
            b"qname\t0\tchr1\t10\t5\t20M\t*\t0\t0\tACGCCGTATCGTCTCGAGGA\tDDDDDEEEEEDDDDDEEEEE";
        let rec = bam::Record::from_sam(&header, sam_line).unwrap();
        assert!(!scanner.is_anchored_read(&rec));
    }
}
