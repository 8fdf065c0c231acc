//! Per-fragment evidence tracking for one SV candidate
//!
//! Evidence is accumulated per sample into a map keyed on fragment id, so that split-read and
//! spanning-pair observations of the same fragment are reconciled before any counting or
//! genotyping is done.
//!

use std::collections::BTreeMap;

/// Split alignment support from one read of a fragment, for one allele at one breakend
///
#[derive(Clone, Debug, Default)]
pub struct SplitReadSupport {
    /// True once the read has been tested against the allele junction sequences
    ///
    /// This is always set for all four (allele x breakend) cells of a read at the same time, so
    /// that a read re-observed from the second breakend region is not evaluated twice.
    ///
    pub is_split_evaluated: bool,

    pub is_split_support: bool,
    pub split_evidence: f32,
    pub split_ln_lhood: f64,
}

/// Fragment-pair and split-read evidence for one allele at one breakend
///
#[derive(Clone, Debug, Default)]
pub struct AlleleBreakendEvidence {
    pub read1: SplitReadSupport,
    pub read2: SplitReadSupport,

    /// True if the fragment insert size and orientation are consistent with this allele's breakend
    pub is_fragment_support: bool,

    /// Likelihood of the observed insert size under this allele's fragment length distribution
    pub frag_length_prob: f32,
}

impl AlleleBreakendEvidence {
    pub fn read(&self, is_read1: bool) -> &SplitReadSupport {
        if is_read1 {
            &self.read1
        } else {
            &self.read2
        }
    }

    pub fn read_mut(&mut self, is_read1: bool) -> &mut SplitReadSupport {
        if is_read1 {
            &mut self.read1
        } else {
            &mut self.read2
        }
    }
}

/// Evidence for one allele over both breakends of the junction
///
#[derive(Clone, Debug, Default)]
pub struct AlleleEvidence {
    pub bp1: AlleleBreakendEvidence,
    pub bp2: AlleleBreakendEvidence,
}

/// Mapping state of one read of a fragment
///
#[derive(Clone, Debug, Default)]
pub struct ReadEvidence {
    /// True once the read has been observed in any scoring scan
    pub is_scanned: bool,

    /// True if the read mapping meets the anchoring MAPQ floor
    pub is_anchored: bool,
}

impl ReadEvidence {
    /// An observed anchor is a read we have actually seen, mapped well enough to trust as
    /// positional evidence
    ///
    pub fn is_observed_anchor(&self) -> bool {
        self.is_scanned && self.is_anchored
    }
}

/// All evidence from one fragment for one SV candidate
///
#[derive(Clone, Debug, Default)]
pub struct FragmentEvidence {
    pub read1: ReadEvidence,
    pub read2: ReadEvidence,
    pub ref_allele: AlleleEvidence,
    pub alt_allele: AlleleEvidence,
}

impl FragmentEvidence {
    pub fn read_mut(&mut self, is_read1: bool) -> &mut ReadEvidence {
        if is_read1 {
            &mut self.read1
        } else {
            &mut self.read2
        }
    }

    /// True if the given read side shows split support for any allele at any breakend
    pub fn is_any_split_support_for_read(&self, is_read1: bool) -> bool {
        self.ref_allele.bp1.read(is_read1).is_split_support
            || self.ref_allele.bp2.read(is_read1).is_split_support
            || self.alt_allele.bp1.read(is_read1).is_split_support
            || self.alt_allele.bp2.read(is_read1).is_split_support
    }

    /// True if the fragment pair supports any allele at any breakend
    pub fn is_any_pair_support(&self) -> bool {
        self.ref_allele.bp1.is_fragment_support
            || self.ref_allele.bp2.is_fragment_support
            || self.alt_allele.bp1.is_fragment_support
            || self.alt_allele.bp2.is_fragment_support
    }
}

/// Map from fragment id to the fragment's evidence record
///
/// An ordered map is used so that all downstream likelihood accumulation is deterministic.
///
pub type FragmentEvidenceStore = BTreeMap<String, FragmentEvidence>;

/// Fragment evidence for all samples over one SV candidate
///
#[derive(Clone, Debug, Default)]
pub struct SVEvidence {
    pub normal: FragmentEvidenceStore,
    pub tumor: FragmentEvidenceStore,
}

impl SVEvidence {
    pub fn sample_mut(&mut self, is_tumor: bool) -> &mut FragmentEvidenceStore {
        if is_tumor {
            &mut self.tumor
        } else {
            &mut self.normal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_any_split_support_for_read() {
        let mut fragev = FragmentEvidence::default();
        assert!(!fragev.is_any_split_support_for_read(true));

        fragev.alt_allele.bp2.read1.is_split_support = true;
        assert!(fragev.is_any_split_support_for_read(true));
        assert!(!fragev.is_any_split_support_for_read(false));
    }

    #[test]
    fn test_is_any_pair_support() {
        let mut fragev = FragmentEvidence::default();
        assert!(!fragev.is_any_pair_support());

        fragev.ref_allele.bp1.is_fragment_support = true;
        assert!(fragev.is_any_pair_support());
    }

    #[test]
    fn test_store_lookup_or_insert() {
        let mut store = FragmentEvidenceStore::new();
        store.entry("frag1".to_string()).or_default();
        store
            .entry("frag1".to_string())
            .or_default()
            .read1
            .is_scanned = true;

        assert_eq!(store.len(), 1);
        assert!(store.get("frag1").unwrap().read1.is_scanned);
    }
}
