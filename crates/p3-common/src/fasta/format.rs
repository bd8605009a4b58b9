//! FASTA text formatting

use super::record::{FeatureRecord, GenomeRecord};

/// Number of sequence characters per FASTA line
pub const FASTA_LINE_WIDTH: usize = 60;

/// Break sequence text into lines of `width` characters joined by `\n`.
///
/// Existing whitespace is kept as is and counted like any other character.
/// No trailing newline is added. A width of zero returns the text unchanged.
pub fn wrap(sequence: &str, width: usize) -> String {
    if width == 0 {
        return sequence.to_string();
    }

    let mut wrapped = String::with_capacity(sequence.len() + sequence.len() / width);
    for (i, c) in sequence.chars().enumerate() {
        if i > 0 && i % width == 0 {
            wrapped.push('\n');
        }
        wrapped.push(c);
    }
    wrapped
}

/// Format a genome sequence as
/// `>accession   description   [genome_name]` followed by the wrapped sequence.
pub fn format_genome_record(record: &GenomeRecord) -> String {
    format!(
        ">{}   {}   [{}]\n{}\n",
        record.accession.as_deref().unwrap_or_default(),
        record.description.as_deref().unwrap_or_default(),
        record.display_name(),
        wrap(record.sequence.as_deref().unwrap_or_default(), FASTA_LINE_WIDTH)
    )
}

/// Format a feature as `>patric_id|feature_id product` followed by the wrapped
/// sequence. An unresolved sequence leaves the body line empty.
pub fn format_feature_record(record: &FeatureRecord) -> String {
    format!(
        ">{}|{} {}\n{}\n",
        record.patric_id.as_deref().unwrap_or_default(),
        record.feature_id.as_deref().unwrap_or_default(),
        record.product.as_deref().unwrap_or_default(),
        wrap(record.sequence.as_deref().unwrap_or_default(), FASTA_LINE_WIDTH)
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn genome() -> GenomeRecord {
        GenomeRecord {
            accession: Some("NC_000962".to_string()),
            description: Some("Mycobacterium tuberculosis H37Rv, complete genome.".to_string()),
            genome_name: Some("Mycobacterium tuberculosis H37Rv".to_string()),
            genome_id: Some("83332.12".to_string()),
            sequence: Some("TTGACCGATGACCCCGGTTC".to_string()),
        }
    }

    fn feature() -> FeatureRecord {
        FeatureRecord {
            patric_id: Some("fig|83332.12.peg.1".to_string()),
            feature_id: Some("PATRIC.83332.12.NC_000962.CDS.1.1524.fwd".to_string()),
            product: Some("Chromosomal replication initiator protein DnaA".to_string()),
            na_sequence_md5: Some("5eb63bbbe01eeed093cb22bb8f5acdc3".to_string()),
            sequence: Some("ATGACCGATGACCCCGGTTCAGGC".to_string()),
        }
    }

    #[test]
    fn test_wrap_short_sequence() {
        assert_eq!(wrap("ACGT", 60), "ACGT");
    }

    #[test]
    fn test_wrap_exact_width() {
        let seq = "A".repeat(60);
        assert_eq!(wrap(&seq, 60), seq);
    }

    #[test]
    fn test_wrap_one_past_width() {
        let seq = format!("{}C", "A".repeat(60));
        assert_eq!(wrap(&seq, 60), format!("{}\nC", "A".repeat(60)));
    }

    #[test]
    fn test_wrap_multiple_lines() {
        let seq = "ACGT".repeat(40);
        let wrapped = wrap(&seq, FASTA_LINE_WIDTH);
        let lines: Vec<&str> = wrapped.split('\n').collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].len(), 60);
        assert_eq!(lines[1].len(), 60);
        assert_eq!(lines[2].len(), 40);
    }

    #[test]
    fn test_wrap_empty() {
        assert_eq!(wrap("", 60), "");
    }

    #[test]
    fn test_wrap_zero_width() {
        assert_eq!(wrap("ACGT", 0), "ACGT");
    }

    #[test]
    fn test_genome_header() {
        let fasta = format_genome_record(&genome());
        assert_eq!(
            fasta,
            ">NC_000962   Mycobacterium tuberculosis H37Rv, complete genome.   \
             [Mycobacterium tuberculosis H37Rv]\nTTGACCGATGACCCCGGTTC\n"
        );
    }

    #[test]
    fn test_genome_header_falls_back_to_id() {
        let record = GenomeRecord {
            genome_name: None,
            ..genome()
        };
        let fasta = format_genome_record(&record);
        assert!(fasta.starts_with(">NC_000962   Mycobacterium tuberculosis H37Rv, complete genome.   [83332.12]\n"));
    }

    #[test]
    fn test_genome_long_sequence_is_wrapped() {
        let record = GenomeRecord {
            sequence: Some("G".repeat(130)),
            ..genome()
        };
        let fasta = format_genome_record(&record);
        let body: Vec<&str> = fasta.lines().skip(1).collect();
        assert_eq!(body, vec!["G".repeat(60), "G".repeat(60), "G".repeat(10)]);
        assert!(fasta.ends_with("GGGGGGGGGG\n"));
        assert!(!fasta.ends_with("\n\n"));
    }

    #[test]
    fn test_feature_header() {
        let fasta = format_feature_record(&feature());
        assert_eq!(
            fasta,
            ">fig|83332.12.peg.1|PATRIC.83332.12.NC_000962.CDS.1.1524.fwd \
             Chromosomal replication initiator protein DnaA\nATGACCGATGACCCCGGTTCAGGC\n"
        );
    }

    #[test]
    fn test_feature_without_sequence_has_empty_body() {
        let record = FeatureRecord {
            sequence: None,
            ..feature()
        };
        let fasta = format_feature_record(&record);
        assert!(fasta.ends_with(" Chromosomal replication initiator protein DnaA\n\n"));
        assert!(!fasta.contains("undefined"));
    }

    #[test]
    fn test_feature_missing_fields_format_empty() {
        let fasta = format_feature_record(&FeatureRecord::default());
        assert_eq!(fasta, ">| \n\n");
    }

    proptest! {
        #[test]
        fn prop_wrap_round_trip(sequence in "[ACGTN]{0,500}") {
            let wrapped = wrap(&sequence, FASTA_LINE_WIDTH);
            prop_assert_eq!(wrapped.replace('\n', ""), sequence);
        }

        #[test]
        fn prop_wrap_line_lengths(sequence in "[ACGT]{1,500}") {
            let wrapped = wrap(&sequence, FASTA_LINE_WIDTH);
            let lines: Vec<&str> = wrapped.split('\n').collect();
            let last = lines.len() - 1;
            for (i, line) in lines.iter().enumerate() {
                if i < last {
                    prop_assert_eq!(line.len(), FASTA_LINE_WIDTH);
                } else {
                    prop_assert!(!line.is_empty() && line.len() <= FASTA_LINE_WIDTH);
                }
            }
        }
    }
}
