//! Bulk loading of words from line-oriented sources.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use regex::Regex;
use tracing::{debug, info};

use crate::error::LoadError;
use crate::node::letters;
use crate::trie::Trie;

/// How lines are turned into words.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Keep only words matching this expression.
    pub filter: Option<Regex>,
    /// Skip words outside `a`-`z` instead of failing the load.
    pub lenient: bool,
    /// Lowercase ASCII letters before validating.
    pub fold_case: bool,
}

/// Counters describing a finished load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub lines: usize,
    pub inserted: usize,
    pub duplicates: usize,
    pub filtered: usize,
    pub rejected: usize,
}

/// Reads every word from `reader`, one per line.
///
/// Blank lines are skipped. In lenient mode words with unsupported
/// characters are counted as rejected; otherwise the first one fails the read.
pub fn read_words<R: BufRead>(
    reader: R,
    options: &LoadOptions,
) -> Result<(Vec<String>, LoadReport), LoadError> {
    let mut words = Vec::new();
    let mut report = LoadReport::default();

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|source| LoadError::Read {
            line: line_no,
            source,
        })?;
        report.lines += 1;

        let word = line.trim();
        if word.is_empty() {
            continue;
        }
        let word = if options.fold_case {
            word.to_ascii_lowercase()
        } else {
            word.to_string()
        };

        if let Some(filter) = &options.filter {
            if !filter.is_match(&word) {
                report.filtered += 1;
                continue;
            }
        }

        if let Err(source) = letters(&word) {
            if options.lenient {
                debug!(line = line_no, %word, "skipping unsupported word");
                report.rejected += 1;
                continue;
            }
            return Err(LoadError::InvalidWord {
                line: line_no,
                word,
                source,
            });
        }

        words.push(word);
    }

    Ok((words, report))
}

/// Loads every word from `reader` into `trie`.
///
/// Nothing is inserted unless the whole source was read and validated.
pub fn load_reader<R: BufRead>(
    trie: &mut Trie,
    reader: R,
    options: &LoadOptions,
) -> Result<LoadReport, LoadError> {
    let (words, mut report) = read_words(reader, options)?;
    let total = words.len();

    // read_words only returns words that passed validation.
    let inserted = words
        .iter()
        .filter_map(|word| letters(word).ok())
        .filter(|key| trie.insert(key))
        .count();

    report.inserted = inserted;
    report.duplicates = total - inserted;
    info!(
        lines = report.lines,
        inserted = report.inserted,
        duplicates = report.duplicates,
        filtered = report.filtered,
        rejected = report.rejected,
        "loaded words"
    );
    Ok(report)
}

/// Loads the word list at `path` into `trie`.
pub fn load_file(
    trie: &mut Trie,
    path: &Path,
    options: &LoadOptions,
) -> Result<LoadReport, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "reading word list");
    load_reader(trie, BufReader::new(file), options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrieError;
    use std::io::{Cursor, Write};

    const WORDS: &str = "cat\ncar\n\n  dog  \ncat\n";

    #[test]
    fn reads_trimmed_non_blank_lines() {
        let (words, report) = read_words(Cursor::new(WORDS), &LoadOptions::default()).unwrap();
        assert_eq!(words, vec!["cat", "car", "dog", "cat"]);
        assert_eq!(report.lines, 5);
    }

    #[test]
    fn load_reader_counts_duplicates() {
        let mut trie = Trie::new();
        let report = load_reader(&mut trie, Cursor::new(WORDS), &LoadOptions::default()).unwrap();
        assert_eq!(report.inserted, 3);
        assert_eq!(report.duplicates, 1);
        assert_eq!(trie.len(), 3);
    }

    #[test]
    fn strict_load_fails_without_touching_trie() {
        let mut trie = Trie::new();
        trie.add("emu").unwrap();

        let err = load_reader(
            &mut trie,
            Cursor::new("cat\nDog\nfox\n"),
            &LoadOptions::default(),
        )
        .unwrap_err();
        match err {
            LoadError::InvalidWord { line, word, source } => {
                assert_eq!(line, 2);
                assert_eq!(word, "Dog");
                assert_eq!(
                    source,
                    TrieError::UnsupportedCharacter {
                        character: 'D',
                        position: 0
                    }
                );
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(trie.keys(), vec!["emu".to_string()]);
    }

    #[test]
    fn lenient_load_skips_bad_words() {
        let options = LoadOptions {
            lenient: true,
            ..LoadOptions::default()
        };
        let mut trie = Trie::new();
        let report = load_reader(&mut trie, Cursor::new("cat\nit's\nDog\nfox\n"), &options).unwrap();
        assert_eq!(report.rejected, 2);
        assert_eq!(report.inserted, 2);
        assert!(trie.contains("fox"));
    }

    #[test]
    fn fold_case_lowercases_before_validation() {
        let options = LoadOptions {
            fold_case: true,
            ..LoadOptions::default()
        };
        let (words, _) = read_words(Cursor::new("Dog\nCAT\n"), &options).unwrap();
        assert_eq!(words, vec!["dog", "cat"]);
    }

    #[test]
    fn filter_keeps_matching_words() {
        let options = LoadOptions {
            filter: Some(Regex::new("^c").unwrap()),
            ..LoadOptions::default()
        };
        let (words, report) = read_words(Cursor::new(WORDS), &options).unwrap();
        assert_eq!(words, vec!["cat", "car", "cat"]);
        assert_eq!(report.filtered, 1);
    }

    #[test]
    fn load_file_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "algorithm\nlogarithm\nrhythm").unwrap();

        let mut trie = Trie::new();
        let report = load_file(&mut trie, file.path(), &LoadOptions::default()).unwrap();
        assert_eq!(report.inserted, 3);
        assert_eq!(
            trie.fuzzy_search("lgrm").unwrap(),
            vec!["algorithm".to_string(), "logarithm".to_string()]
        );
    }

    #[test]
    fn missing_file_is_an_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.txt");

        let mut trie = Trie::new();
        trie.add("cat").unwrap();
        let err = load_file(&mut trie, &path, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::Open { .. }));
        assert_eq!(trie.len(), 1);
    }

    #[test]
    fn invalid_utf8_is_a_read_error() {
        let bytes: &[u8] = b"cat\n\xff\xfe\n";
        let err = read_words(Cursor::new(bytes), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::Read { line: 2, .. }));
    }
}
