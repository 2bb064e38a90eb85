//! Variant ingestion: VCF records of one sample become indel events (input
//! of the synchronizer) and per-allele variant calls (input of the display
//! lists).
use std::collections::BTreeSet;
use std::fs::File;

use metagen_core::config::GenomeConfig;
use metagen_core::models::ProjectChromosomes;
use metagen_lists::{GenomeWideList, build_genome_wide};
use metagen_tabix::{REGION_END_UNBOUNDED, TabixReader, VcfHeader, VcfRecord};

use crate::errors::{Result, ShiftError};
use crate::registry::ShiftRegistry;
use crate::synchronizer::{GenomeEvents, IndelEvent, IndelKind};
use crate::variant::{DisplayPolicy, Variant, VariantDisplayList, VariantDisplayListBuilder, VariantType};

/// Which allele of a diploid genotype a call belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlleleSlot {
    First = 0,
    Second = 1,
}

impl AlleleSlot {
    pub const ALL: [AlleleSlot; 2] = [AlleleSlot::First, AlleleSlot::Second];

    fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(AlleleSlot::First),
            1 => Some(AlleleSlot::Second),
            _ => None,
        }
    }
}

/// One allele of one sample, in reference coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantCall {
    pub chromosome: usize,
    pub slot: AlleleSlot,
    pub variant_type: VariantType,
    /// Zero-based reference position of the first affected base. For an
    /// insertion, the first reference base after the inserted sequence.
    pub position: u32,
    /// Affected reference bases (substitutions, deletions, no-calls) or
    /// inserted bases.
    pub length: u32,
    pub reference: String,
    pub alternative: String,
    pub score: Option<f32>,
    pub filtered: bool,
}

/// What one sample brings to a project.
#[derive(Debug, Clone, PartialEq)]
pub struct GenomeCalls {
    pub events: GenomeEvents,
    pub calls: Vec<VariantCall>,
}

/// Shape of an allele against the reference, `None` for what cannot be placed.
fn classify(reference: &str, alternative: &str) -> Option<(VariantType, u32, u32)> {
    if alternative.is_empty()
        || alternative == "*"
        || alternative == "."
        || alternative.starts_with('<')
        || alternative.contains(['[', ']'])
    {
        return None;
    }
    let (ref_len, alt_len) = (reference.len() as u32, alternative.len() as u32);
    match ref_len.cmp(&alt_len) {
        std::cmp::Ordering::Equal => Some((VariantType::Snp, 0, ref_len)),
        // offsets are relative to POS - 1, the padding base counted in
        std::cmp::Ordering::Less => Some((VariantType::Insertion, ref_len, alt_len - ref_len)),
        std::cmp::Ordering::Greater => Some((VariantType::Deletion, alt_len, ref_len - alt_len)),
    }
}

fn indel_event(chromosome: usize, record: &VcfRecord, allele: usize) -> Option<IndelEvent> {
    let alternative = record.allele(allele)?;
    let (variant_type, offset, length) = classify(&record.reference, alternative)?;
    // offset counts the shared bases, the anchor is the last of them
    let anchor = (record.pos.checked_sub(1)? + offset).checked_sub(1)?;
    let kind = match variant_type {
        VariantType::Insertion => IndelKind::Insertion,
        VariantType::Deletion => IndelKind::Deletion,
        _ => return None,
    };
    Some(IndelEvent {
        chromosome,
        anchor,
        length,
        kind,
    })
}

fn variant_call(chromosome: usize, slot: AlleleSlot, record: &VcfRecord, allele: Option<usize>) -> Option<VariantCall> {
    let base = record.pos.checked_sub(1)?;
    let (variant_type, position, length, alternative) = match allele {
        None => (VariantType::NoCall, base, record.reference.len() as u32, ".".to_string()),
        Some(0) => return None,
        Some(allele) => {
            let alternative = record.allele(allele)?;
            let (variant_type, offset, length) = classify(&record.reference, alternative)?;
            (variant_type, base + offset, length, alternative.to_string())
        }
    };
    Some(VariantCall {
        chromosome,
        slot,
        variant_type,
        position,
        length: length.max(1),
        reference: record.reference.clone(),
        alternative,
        score: record.qual,
        filtered: record.is_filtered(),
    })
}

///
/// Collect the events and calls of sample column `sample` from `records`.
///
/// The first alternative allele of each genotype drives the genome's
/// coordinate shifts. Records on chromosomes missing from the registry are
/// skipped with a warning.
///
pub fn collect_genome<I>(name: &str, sample: usize, records: I, chromosomes: &ProjectChromosomes) -> GenomeCalls
where
    I: IntoIterator<Item = VcfRecord>,
{
    let mut events = Vec::new();
    let mut calls = Vec::new();
    let mut skipped = BTreeSet::new();

    for record in records {
        let Some(chromosome) = chromosomes.index_of(&record.chrom) else {
            if skipped.insert(record.chrom.clone()) {
                log::warn!("{name}: skipping records on unknown chromosome {}", record.chrom);
            }
            continue;
        };
        if record.pos == 0 {
            log::warn!("{name}: skipping record at position 0 on {}", record.chrom);
            continue;
        }
        let Some(genotype) = record.genotype(sample) else {
            continue;
        };

        if let Some(event) = genotype
            .first_alternative()
            .and_then(|allele| indel_event(chromosome, &record, allele))
        {
            events.push(event);
        }
        for (i, allele) in genotype.alleles.iter().enumerate() {
            let Some(slot) = AlleleSlot::from_index(i) else {
                break;
            };
            calls.extend(variant_call(chromosome, slot, &record, *allele));
        }
    }

    log::debug!("{name}: {} indels, {} variant calls", events.len(), calls.len());
    GenomeCalls {
        events: GenomeEvents::new(name, events),
        calls,
    }
}

///
/// Read the calls of one configured genome from its bgzipped, tabix indexed
/// VCF, one region query per chromosome of the registry.
///
/// Malformed lines are logged and skipped; I/O and index failures abort.
///
pub fn read_genome(genome: &GenomeConfig, chromosomes: &ProjectChromosomes) -> Result<GenomeCalls> {
    let mut reader: TabixReader<File> = TabixReader::open(&genome.vcf)?;
    let header = VcfHeader::from_lines(&reader.header_lines()?)?;
    let sample = header
        .sample_index(genome.sample())
        .ok_or_else(|| ShiftError::UnknownSample {
            sample: genome.sample().to_string(),
            file: genome.vcf.display().to_string(),
        })?;

    let mut records = Vec::new();
    for chromosome in chromosomes {
        let tid = reader.chr_to_tid(&chromosome.name);
        if tid < 0 {
            continue;
        }
        for line in reader.query(tid, 0, REGION_END_UNBOUNDED)? {
            let line = line?;
            match VcfRecord::parse(&line) {
                Ok(record) => records.push(record),
                Err(e) => log::warn!("{}: skipping malformed line: {e}", genome.vcf.display()),
            }
        }
    }

    log::info!("read {} records of {} from {}", records.len(), genome.name, genome.vcf.display());
    Ok(collect_genome(&genome.name, sample, records, chromosomes))
}

/// Meta-genome placement of a call of `genome`.
fn place(registry: &ShiftRegistry, genome: &str, call: VariantCall) -> Result<Variant> {
    let reference = registry.table(registry.reference_name(), call.chromosome)?;
    let (meta_start, meta_stop) = match call.variant_type {
        VariantType::Insertion => {
            // inserted bases fill the start of the gap opened before `position`
            let gap_stop = reference.to_meta(call.position);
            let gap_start = match call.position {
                0 => 0,
                p => reference.to_meta(p - 1) + 1,
            };
            let width = call.length.min(gap_stop - gap_start).max(1);
            (gap_start, gap_start + width)
        }
        _ => reference.to_meta_range(call.position, call.position + call.length),
    };
    let native_start = registry
        .to_native(genome, call.chromosome, meta_start)?
        .position();

    Ok(Variant {
        variant_type: call.variant_type,
        reference_position: call.position,
        native_start,
        meta_start,
        meta_stop,
        reference: call.reference,
        alternative: call.alternative,
        length: call.length,
        score: call.score,
        filtered: call.filtered,
        display: DisplayPolicy::Show,
    })
}

///
/// Place the calls of `genome` in the meta-genome and build its two allele
/// lists, chromosome-parallel.
///
pub fn build_allele_lists(
    registry: &ShiftRegistry,
    genome: &str,
    calls: Vec<VariantCall>,
    threads: usize,
) -> Result<[GenomeWideList<VariantDisplayList>; 2]> {
    let chromosome_count = registry.chromosomes().len();
    let mut rows: [Vec<Vec<Variant>>; 2] = [
        (0..chromosome_count).map(|_| Vec::new()).collect(),
        (0..chromosome_count).map(|_| Vec::new()).collect(),
    ];
    for call in calls {
        let (slot, chromosome) = (call.slot as usize, call.chromosome);
        let variant = place(registry, genome, call)?;
        rows[slot][chromosome].push(variant);
    }

    let [first, second] = rows;
    Ok([
        build_genome_wide(first, VariantDisplayListBuilder::default, threads)?,
        build_genome_wide(second, VariantDisplayListBuilder::default, threads)?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    use metagen_core::models::Chromosome;
    use metagen_lists::IntervalView;

    use crate::synchronizer::synchronize;

    fn record(chrom: &str, pos: u32, reference: &str, alternatives: &str, gt: &str) -> VcfRecord {
        VcfRecord::parse(&format!("{chrom}\t{pos}\t.\t{reference}\t{alternatives}\t50\tPASS\t.\tGT\t{gt}")).unwrap()
    }

    #[fixture]
    fn chromosomes() -> ProjectChromosomes {
        ProjectChromosomes::new(vec![Chromosome::new("chr1", 1_000)]).unwrap()
    }

    #[rstest]
    #[case("A", "G", Some((VariantType::Snp, 0, 1)))]
    #[case("AC", "GT", Some((VariantType::Snp, 0, 2)))]
    #[case("A", "ATTT", Some((VariantType::Insertion, 1, 3)))]
    #[case("ATTT", "A", Some((VariantType::Deletion, 1, 3)))]
    #[case("A", "<DEL>", None)]
    #[case("A", "*", None)]
    #[case("A", "A[chr2:10[", None)]
    fn test_classify(#[case] reference: &str, #[case] alternative: &str, #[case] expected: Option<(VariantType, u32, u32)>) {
        assert_eq!(classify(reference, alternative), expected);
    }

    #[rstest]
    fn test_collect_genome(chromosomes: ProjectChromosomes) {
        let records = vec![
            // POS 10 is reference base 9, insertion anchored on it
            record("chr1", 10, "A", "ATT", "0|1"),
            record("chr1", 20, "ACGT", "A", "1/1"),
            record("chr1", 30, "C", "G,T", "2|1"),
            record("chr1", 40, "C", "G", "./."),
            record("chrUn", 5, "C", "G", "1|1"),
            record("chr1", 50, "C", "G", "0|0"),
        ];
        let calls = collect_genome("A", 0, records, &chromosomes);

        assert_eq!(
            calls.events.events,
            vec![IndelEvent::insertion(0, 9, 2), IndelEvent::deletion(0, 19, 3)]
        );
        let summary: Vec<_> = calls
            .calls
            .iter()
            .map(|c| (c.slot, c.variant_type, c.position, c.length, c.alternative.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (AlleleSlot::Second, VariantType::Insertion, 10, 2, "ATT"),
                (AlleleSlot::First, VariantType::Deletion, 20, 3, "A"),
                (AlleleSlot::Second, VariantType::Deletion, 20, 3, "A"),
                (AlleleSlot::First, VariantType::Snp, 29, 1, "T"),
                (AlleleSlot::Second, VariantType::Snp, 29, 1, "G"),
                (AlleleSlot::First, VariantType::NoCall, 39, 1, "."),
                (AlleleSlot::Second, VariantType::NoCall, 39, 1, "."),
            ]
        );
    }

    #[rstest]
    fn test_position_zero_is_skipped(chromosomes: ProjectChromosomes) {
        let records = vec![
            record("chr1", 0, "A", "ATT", "1|1"),
            record("chr1", 0, "C", "G", "1|1"),
            record("chr1", 5, "C", "G", "0|1"),
        ];
        let calls = collect_genome("A", 0, records, &chromosomes);
        assert!(calls.events.events.is_empty());
        assert_eq!(
            calls.calls.iter().map(|c| (c.slot, c.position)).collect::<Vec<_>>(),
            vec![(AlleleSlot::Second, 4)]
        );
        assert_eq!(indel_event(0, &record("chr1", 0, "A", "ATT", "1|1"), 1), None);
    }

    #[rstest]
    fn test_allele_lists(chromosomes: ProjectChromosomes) {
        let a = collect_genome(
            "A",
            0,
            vec![
                record("chr1", 10, "A", "ATT", "1|0"),
                record("chr1", 20, "ACGT", "A", "0|1"),
                record("chr1", 100, "C", "G", "1|1"),
            ],
            &chromosomes,
        );
        let b = collect_genome("B", 0, vec![record("chr1", 10, "A", "ATTTT", "1|1")], &chromosomes);
        let registry = synchronize(&chromosomes, "ref", vec![a.events, b.events], 1).unwrap();
        // one gap of 4 bases before reference base 10
        assert_eq!(registry.meta_length(0), Some(1_004));

        let [first, second] = build_allele_lists(&registry, "A", a.calls, 2).unwrap();
        let insertion = first[0].variant(0).unwrap();
        assert_eq!(insertion.variant_type, VariantType::Insertion);
        assert_eq!((insertion.meta_start, insertion.meta_stop), (10, 12));
        assert_eq!(insertion.native_start, 10);

        let deletion = second[0].variant(0).unwrap();
        assert_eq!(deletion.variant_type, VariantType::Deletion);
        assert_eq!((deletion.meta_start, deletion.meta_stop), (24, 27));
        // A's own deletion is a gap of A, snapped to its next base
        assert_eq!(deletion.native_start, 19 + 2 + 1);

        let snp = first[0].variant(1).unwrap();
        assert_eq!((snp.meta_start, snp.meta_stop), (103, 104));
        assert_eq!(snp.native_start, 99 + 2 - 3);
        assert_eq!(second[0].len(), 2);
    }
}
