//! Readers turning BED-like text files into genome-wide lists.
use std::collections::BTreeSet;
use std::io::BufRead;
use std::path::Path;

use anyhow::{Context, Result};
use rayon::prelude::*;

use metagen_core::config::ProjectConfig;
use metagen_core::models::{ListLayout, ProjectChromosomes, ScorePrecision, ScoredInterval};
use metagen_core::utils::get_dynamic_reader;

use crate::errors::ListBuildError;
use crate::gene::{Exon, Gene, GeneList, GeneListBuilder, Strand};
use crate::genome_wide::{GenomeWideList, build_genome_wide};
use crate::repeat::{RepeatFamilyList, RepeatFamilyListBuilder, RepeatRecord};
use crate::scored::{ScoredIntervalList, ScoredListBuilder};

/// Maps native positions of one genome into the meta-genome.
pub trait CoordinateTranslator: Sync {
    fn to_meta(&self, chromosome: usize, position: u32) -> u32;
}

/// How scored lists get built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListOptions {
    pub layout: ListLayout,
    pub precision: ScorePrecision,
    /// Worker count, 0 lets the pool decide.
    pub threads: usize,
}

impl From<&ProjectConfig> for ListOptions {
    fn from(config: &ProjectConfig) -> Self {
        ListOptions {
            layout: config.list_layout(),
            precision: config.score_precision(),
            threads: config.threads(),
        }
    }
}

/// Tab separated fields of a data line, `None` for headers and comments.
fn data_fields(line: &str) -> Option<Vec<&str>> {
    let line = line.trim_end();
    if line.is_empty() || line.starts_with('#') || line.starts_with("track") || line.starts_with("browser") {
        return None;
    }
    Some(line.split('\t').collect())
}

fn parse_column<T: std::str::FromStr>(fields: &[&str], column: usize, line_number: usize) -> Result<T> {
    fields
        .get(column)
        .and_then(|field| field.trim().parse::<T>().ok())
        .ok_or_else(|| {
            ListBuildError::Parse(format!("line {line_number}: missing or invalid column {}", column + 1)).into()
        })
}

///
/// Read the data lines of a BED-like file into per-chromosome rows.
///
/// Lines on chromosomes missing from the registry are skipped, with one
/// warning per chromosome name.
///
fn read_rows<R, T, F>(reader: R, chromosomes: &ProjectChromosomes, mut parse: F) -> Result<Vec<Vec<T>>>
where
    R: BufRead,
    F: FnMut(&[&str], usize) -> Result<T>,
{
    let mut rows: Vec<Vec<T>> = (0..chromosomes.len()).map(|_| Vec::new()).collect();
    let mut skipped = BTreeSet::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let Some(fields) = data_fields(&line) else {
            continue;
        };
        let line_number = i + 1;
        match chromosomes.index_of(fields[0]) {
            Some(chromosome) => rows[chromosome].push(parse(&fields, line_number)?),
            None => {
                skipped.insert(fields[0].to_string());
            }
        }
    }

    for name in skipped {
        log::warn!("skipped lines on unknown chromosome {name}");
    }
    Ok(rows)
}

/// Read `chrom start stop score` lines, sorted by start within each chromosome.
pub fn read_bedgraph<R: BufRead>(reader: R, chromosomes: &ProjectChromosomes) -> Result<Vec<Vec<ScoredInterval>>> {
    let mut rows = read_rows(reader, chromosomes, |fields, line_number| {
        let start = parse_column(fields, 1, line_number)?;
        let stop = parse_column(fields, 2, line_number)?;
        if stop <= start {
            return Err(anyhow::Error::from(ListBuildError::InvalidInterval { start, stop })
                .context(format!("line {line_number}")));
        }
        Ok(ScoredInterval::new(start, stop, parse_column(fields, 3, line_number)?))
    })?;
    for intervals in rows.iter_mut() {
        intervals.sort_by_key(|interval| interval.start);
    }
    Ok(rows)
}

/// Read `chrom start stop family` lines, kept in file order.
pub fn read_repeats<R: BufRead>(reader: R, chromosomes: &ProjectChromosomes) -> Result<Vec<Vec<RepeatRecord>>> {
    read_rows(reader, chromosomes, |fields, line_number| {
        let family: String = parse_column(fields, 3, line_number)?;
        Ok(RepeatRecord::new(
            parse_column(fields, 1, line_number)?,
            parse_column(fields, 2, line_number)?,
            family,
        ))
    })
}

fn parse_list(field: &str, line_number: usize) -> Result<Vec<u32>> {
    field
        .split(',')
        .filter(|value| !value.is_empty())
        .map(|value| {
            value
                .parse::<u32>()
                .map_err(|_| ListBuildError::Parse(format!("line {line_number}: invalid block list {field}")).into())
        })
        .collect()
}

fn parse_gene(fields: &[&str], line_number: usize) -> Result<Gene> {
    let start: u32 = parse_column(fields, 1, line_number)?;
    let stop: u32 = parse_column(fields, 2, line_number)?;
    let name: String = parse_column(fields, 3, line_number)?;
    let strand = match fields.get(5) {
        Some(symbol) => symbol.parse::<Strand>()?,
        None => Strand::Unknown,
    };

    let mut gene = Gene::new(name, strand, start, stop);
    gene.score = fields.get(4).and_then(|score| score.parse::<f32>().ok());

    if fields.len() >= 8 {
        gene.utr5_bound = parse_column(fields, 6, line_number)?;
        gene.utr3_bound = parse_column(fields, 7, line_number)?;
    }
    if fields.len() >= 12 {
        let sizes = parse_list(fields[10], line_number)?;
        let offsets = parse_list(fields[11], line_number)?;
        if sizes.len() != offsets.len() {
            return Err(ListBuildError::LengthMismatch {
                expected: offsets.len(),
                found: sizes.len(),
            }
            .into());
        }
        gene.exons = offsets
            .iter()
            .zip(&sizes)
            .map(|(&offset, &size)| Exon {
                start: start + offset,
                stop: start + offset + size,
                score: None,
            })
            .collect();
    }
    Ok(gene)
}

/// Read BED6 or BED12 gene annotations.
pub fn read_genes<R: BufRead>(reader: R, chromosomes: &ProjectChromosomes) -> Result<Vec<Vec<Gene>>> {
    read_rows(reader, chromosomes, parse_gene)
}

/// Move every interval into meta-genome coordinates.
pub fn translate_rows(rows: &mut [Vec<ScoredInterval>], translator: &dyn CoordinateTranslator) {
    rows.par_iter_mut().enumerate().for_each(|(chromosome, intervals)| {
        for interval in intervals.iter_mut() {
            let start = translator.to_meta(chromosome, interval.start);
            // empty intervals stay empty
            let stop = match interval.stop > interval.start {
                true => translator.to_meta(chromosome, interval.stop - 1) + 1,
                false => start,
            };
            interval.start = start;
            interval.stop = stop;
        }
    });
}

///
/// Load a bedGraph file into a genome-wide scored list.
///
/// # Arguments
/// - path: bedGraph file, optionally gzipped
/// - chromosomes: project chromosome registry
/// - options: list layout, score precision and worker count
/// - translator: when given, intervals are placed in meta-genome coordinates
///
pub fn load_interval_list<P: AsRef<Path>>(
    path: P,
    chromosomes: &ProjectChromosomes,
    options: &ListOptions,
    translator: Option<&dyn CoordinateTranslator>,
) -> Result<GenomeWideList<ScoredIntervalList>> {
    let path = path.as_ref();
    let reader = get_dynamic_reader(path)?;
    let mut rows =
        read_bedgraph(reader, chromosomes).with_context(|| format!("Failed to read {}", path.display()))?;

    if let Some(translator) = translator {
        translate_rows(&mut rows, translator);
    }

    let ListOptions {
        layout,
        precision,
        threads,
    } = *options;
    build_genome_wide(rows, || ScoredListBuilder::new(layout, precision), threads)
        .with_context(|| format!("Failed to build interval list from {}", path.display()))
}

pub fn load_repeat_list<P: AsRef<Path>>(
    path: P,
    chromosomes: &ProjectChromosomes,
    threads: usize,
) -> Result<GenomeWideList<RepeatFamilyList>> {
    let path = path.as_ref();
    let rows = read_repeats(get_dynamic_reader(path)?, chromosomes)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    build_genome_wide(rows, RepeatFamilyListBuilder::default, threads)
        .with_context(|| format!("Failed to build repeat list from {}", path.display()))
}

pub fn load_gene_list<P: AsRef<Path>>(
    path: P,
    chromosomes: &ProjectChromosomes,
    threads: usize,
) -> Result<GenomeWideList<GeneList>> {
    let path = path.as_ref();
    let rows = read_genes(get_dynamic_reader(path)?, chromosomes)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    build_genome_wide(rows, GeneListBuilder::default, threads)
        .with_context(|| format!("Failed to build gene list from {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    use metagen_core::models::Chromosome;

    use crate::view::IntervalView;

    #[fixture]
    fn chromosomes() -> ProjectChromosomes {
        ProjectChromosomes::new(vec![Chromosome::new("chr1", 10_000), Chromosome::new("chr2", 5_000)]).unwrap()
    }

    const BEDGRAPH: &str = "track type=bedGraph\n\
        chr2\t0\t100\t1.5\n\
        chr1\t200\t300\t2\n\
        chr1\t0\t100\t4\n\
        chrUn\t0\t10\t1\n";

    /// Shifts every position at or after `from` by `by`.
    struct Shift {
        from: u32,
        by: u32,
    }

    impl CoordinateTranslator for Shift {
        fn to_meta(&self, _chromosome: usize, position: u32) -> u32 {
            match position >= self.from {
                true => position + self.by,
                false => position,
            }
        }
    }

    #[rstest]
    fn test_read_bedgraph(chromosomes: ProjectChromosomes) {
        let rows = read_bedgraph(BEDGRAPH.as_bytes(), &chromosomes).unwrap();
        assert_eq!(
            rows[0],
            vec![ScoredInterval::new(0, 100, 4.0), ScoredInterval::new(200, 300, 2.0)]
        );
        assert_eq!(rows[1], vec![ScoredInterval::new(0, 100, 1.5)]);
    }

    #[rstest]
    fn test_bad_score_is_an_error(chromosomes: ProjectChromosomes) {
        let result = read_bedgraph("chr1\t0\t10\thigh\n".as_bytes(), &chromosomes);
        assert!(result.is_err());
    }

    #[rstest]
    #[case("chr1\t0\t0\t1.5\n")]
    #[case("chr1\t50\t10\t1.5\n")]
    fn test_empty_or_reversed_row_is_an_error(chromosomes: ProjectChromosomes, #[case] line: &str) {
        let error = read_bedgraph(line.as_bytes(), &chromosomes).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<ListBuildError>(),
            Some(ListBuildError::InvalidInterval { .. })
        ));
    }

    #[rstest]
    fn test_translate_empty_interval() {
        let mut rows = vec![vec![ScoredInterval::new(0, 0, 1.0), ScoredInterval::new(130, 130, 1.0)]];
        translate_rows(&mut rows, &Shift { from: 120, by: 10 });
        assert_eq!(
            rows[0],
            vec![ScoredInterval::new(0, 0, 1.0), ScoredInterval::new(140, 140, 1.0)]
        );
    }

    #[rstest]
    fn test_translate_rows() {
        let mut rows = vec![vec![ScoredInterval::new(0, 100, 1.0), ScoredInterval::new(150, 200, 1.0)]];
        translate_rows(&mut rows, &Shift { from: 120, by: 10 });
        assert_eq!(
            rows[0],
            vec![ScoredInterval::new(0, 100, 1.0), ScoredInterval::new(160, 210, 1.0)]
        );
    }

    #[rstest]
    fn test_load_interval_list_in_meta_coordinates(chromosomes: ProjectChromosomes) {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("signal.bedGraph");
        std::fs::write(&path, BEDGRAPH).unwrap();

        let options = ListOptions {
            layout: ListLayout::Dense,
            precision: ScorePrecision::Full,
            threads: 2,
        };
        let lists = load_interval_list(&path, &chromosomes, &options, Some(&Shift { from: 150, by: 50 })).unwrap();

        assert_eq!(lists.len(), 2);
        assert_eq!(lists[0].score_at_position(260), Some(2.0));
        assert_eq!(lists[0].score_at_position(210), Some(0.0));
        assert_eq!(lists[0].stop_at(lists[0].len() - 1), 350);
    }

    #[rstest]
    fn test_load_repeats(chromosomes: ProjectChromosomes) {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("repeats.bed");
        std::fs::write(&path, "chr1\t500\t600\tAlu\nchr1\t10\t20\tL1\nchr1\t5\t8\tAlu\n").unwrap();

        let lists = load_repeat_list(&path, &chromosomes, 1).unwrap();
        let names: Vec<&str> = lists[0].families().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["Alu", "L1"]);
        assert!(lists[1].is_empty());
    }

    #[rstest]
    fn test_read_bed12_gene(chromosomes: ProjectChromosomes) {
        let line = "chr1\t1000\t2000\tGENE1\t7.5\t-\t1100\t1900\t0\t2\t100,300,\t0,700,\n";
        let rows = read_genes(line.as_bytes(), &chromosomes).unwrap();
        let gene = &rows[0][0];
        assert_eq!(gene.strand, Strand::Reverse);
        assert_eq!(gene.score, Some(7.5));
        assert_eq!((gene.utr5_bound, gene.utr3_bound), (1100, 1900));
        assert_eq!(
            gene.exons.iter().map(|e| (e.start, e.stop)).collect::<Vec<_>>(),
            vec![(1000, 1100), (1700, 2000)]
        );
    }

    #[rstest]
    fn test_read_bed6_gene(chromosomes: ProjectChromosomes) {
        let rows = read_genes("chr2\t10\t20\tG\t.\t+\n".as_bytes(), &chromosomes).unwrap();
        let gene = &rows[1][0];
        assert_eq!(gene.score, None);
        assert_eq!(gene.exons.len(), 1);
    }
}
