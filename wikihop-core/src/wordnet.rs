//! Offline lexical oracle over the WordNet 3.x database files.
//!
//! Loads the noun and verb index, data and exception files from a `dict/`
//! directory and answers word lookups and Wu-Palmer relatedness queries over
//! the hypernym hierarchy. Adjectives and adverbs carry no hypernym tree and
//! are not loaded.

use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::info;
use wikihop_engine::LexicalOracle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Pos {
    Noun,
    Verb,
}

impl Pos {
    fn tag(self) -> &'static str {
        match self {
            Pos::Noun => "noun",
            Pos::Verb => "verb",
        }
    }
}

// Suffix detachment rules, (strip, replace) per part of speech.
const NOUN_SUFFIXES: &[(&str, &str)] = &[
    ("ses", "s"),
    ("xes", "x"),
    ("zes", "z"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("ies", "y"),
    ("men", "man"),
    ("s", ""),
];
const VERB_SUFFIXES: &[(&str, &str)] = &[
    ("ies", "y"),
    ("es", "e"),
    ("es", ""),
    ("ed", "e"),
    ("ed", ""),
    ("ing", "e"),
    ("ing", ""),
    ("s", ""),
];

/// One part of speech worth of the database.
#[derive(Debug)]
struct PosDb {
    // lemma -> most frequent synset offset
    index: HashMap<String, u32>,
    // synset offset -> hypernym synset offsets
    hypernyms: HashMap<u32, Vec<u32>>,
    // synset offset -> depth below the taxonomy root, roots at 1
    depths: HashMap<u32, u32>,
    // irregular inflection -> base form
    exceptions: HashMap<String, String>,
}

impl PosDb {
    fn load(dict_dir: &Path, pos: Pos) -> Result<Self> {
        let index = parse_index(dict_dir, pos)?;
        let hypernyms = parse_data(dict_dir, pos)?;
        let exceptions = parse_exceptions(dict_dir, pos)?;
        let depths = compute_depths(&hypernyms);

        Ok(Self {
            index,
            hypernyms,
            depths,
            exceptions,
        })
    }

    /// Minimal hop count from `offset` to every hypernym ancestor,
    /// including itself at zero hops.
    fn ancestors(&self, offset: u32) -> HashMap<u32, u32> {
        let mut hops = HashMap::new();
        let mut frontier = vec![(offset, 0u32)];
        while let Some((current, distance)) = frontier.pop() {
            match hops.get(&current) {
                Some(&known) if known <= distance => continue,
                _ => {}
            }
            hops.insert(current, distance);
            if let Some(parents) = self.hypernyms.get(&current) {
                for parent in parents {
                    frontier.push((*parent, distance + 1));
                }
            }
        }
        hops
    }
}

/// The loaded lexical database. One instance serves a whole search; lookups
/// are read-only and cheap.
#[derive(Debug)]
pub struct WordNet {
    noun: PosDb,
    verb: PosDb,
}

impl WordNet {
    /// Load the database files from a WordNet `dict/` directory.
    pub fn load(dict_dir: impl AsRef<Path>) -> Result<Self> {
        let dict_dir = dict_dir.as_ref();
        if !dict_dir.is_dir() {
            bail!("WordNet directory not found: {}", dict_dir.display());
        }

        let noun = PosDb::load(dict_dir, Pos::Noun)
            .with_context(|| format!("loading noun database from {}", dict_dir.display()))?;
        let verb = PosDb::load(dict_dir, Pos::Verb)
            .with_context(|| format!("loading verb database from {}", dict_dir.display()))?;

        info!(
            "Loaded WordNet: {} noun lemmas, {} verb lemmas",
            noun.index.len(),
            verb.index.len()
        );
        Ok(Self { noun, verb })
    }

    /// Resolve a word to its synset, nouns preferred over verbs.
    fn synset_of(&self, word: &str) -> Option<(Pos, u32)> {
        let word = word.to_lowercase();
        if let Some(offset) = lookup_in(&self.noun, &word, NOUN_SUFFIXES) {
            return Some((Pos::Noun, offset));
        }
        lookup_in(&self.verb, &word, VERB_SUFFIXES).map(|offset| (Pos::Verb, offset))
    }

    /// Whether the word resolves to any synset.
    pub fn contains(&self, word: &str) -> bool {
        self.synset_of(word).is_some()
    }

    /// Wu-Palmer relatedness of two words over the hypernym hierarchy.
    ///
    /// `None` when either word is unknown or the two synsets share no common
    /// subsumer (different parts of speech, or disjoint taxonomies).
    /// Identical synsets score 1.0; everything else lands in (0, 1).
    pub fn wu_palmer(&self, a: &str, b: &str) -> Option<f32> {
        let (pos_a, syn_a) = self.synset_of(a)?;
        let (pos_b, syn_b) = self.synset_of(b)?;
        if pos_a != pos_b {
            return None;
        }
        if syn_a == syn_b {
            return Some(1.0);
        }

        let db = match pos_a {
            Pos::Noun => &self.noun,
            Pos::Verb => &self.verb,
        };

        let up_a = db.ancestors(syn_a);
        let up_b = db.ancestors(syn_b);

        // Deepest common subsumer wins.
        let (lcs, hops_a, hops_b) = up_a
            .iter()
            .filter_map(|(ancestor, hops_a)| {
                up_b.get(ancestor).map(|hops_b| (*ancestor, *hops_a, *hops_b))
            })
            .max_by_key(|(ancestor, _, _)| db.depths.get(ancestor).copied().unwrap_or(0))?;

        let lcs_depth = db.depths.get(&lcs).copied().unwrap_or(1) as f32;
        Some(2.0 * lcs_depth / (2.0 * lcs_depth + hops_a as f32 + hops_b as f32))
    }
}

impl LexicalOracle for WordNet {
    fn knows(&self, word: &str) -> bool {
        self.contains(word)
    }

    fn relatedness(&self, a: &str, b: &str) -> Option<f32> {
        self.wu_palmer(a, b)
    }
}

fn lookup_in(db: &PosDb, word: &str, suffixes: &[(&str, &str)]) -> Option<u32> {
    if let Some(offset) = db.index.get(word) {
        return Some(*offset);
    }
    if let Some(base) = db.exceptions.get(word) {
        if let Some(offset) = db.index.get(base) {
            return Some(*offset);
        }
    }
    for (suffix, replacement) in suffixes {
        if let Some(stem) = word.strip_suffix(suffix) {
            let candidate = format!("{}{}", stem, replacement);
            if candidate.is_empty() {
                continue;
            }
            if let Some(offset) = db.index.get(&candidate) {
                return Some(*offset);
            }
        }
    }
    None
}

/// License header lines in every database file start with two spaces.
fn data_lines(content: &str) -> impl Iterator<Item = &str> {
    content
        .lines()
        .filter(|line| !line.starts_with("  ") && !line.trim().is_empty())
}

fn parse_index(dict_dir: &Path, pos: Pos) -> Result<HashMap<String, u32>> {
    let path = dict_dir.join(format!("index.{}", pos.tag()));
    let content = fs::read_to_string(&path)
        .with_context(|| format!("reading {}", path.display()))?;

    let mut index = HashMap::new();
    for line in data_lines(&content) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        // lemma pos synset_cnt p_cnt [ptr...] sense_cnt tagsense_cnt offset...
        if fields.len() < 7 {
            continue;
        }
        let p_cnt: usize = fields[3]
            .parse()
            .with_context(|| format!("bad pointer count in {}: {:?}", path.display(), line))?;
        let Some(first_offset) = fields.get(6 + p_cnt) else {
            continue;
        };
        let offset: u32 = first_offset
            .parse()
            .with_context(|| format!("bad synset offset in {}: {:?}", path.display(), line))?;
        index.insert(fields[0].to_string(), offset);
    }
    Ok(index)
}

fn parse_data(dict_dir: &Path, pos: Pos) -> Result<HashMap<u32, Vec<u32>>> {
    let path = dict_dir.join(format!("data.{}", pos.tag()));
    let content = fs::read_to_string(&path)
        .with_context(|| format!("reading {}", path.display()))?;

    let mut hypernyms: HashMap<u32, Vec<u32>> = HashMap::new();
    for line in data_lines(&content) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        // offset lex_filenum ss_type w_cnt (word lex_id)... p_cnt (ptr)...
        if fields.len() < 5 {
            continue;
        }
        let offset: u32 = fields[0]
            .parse()
            .with_context(|| format!("bad synset offset in {}: {:?}", path.display(), line))?;
        // The word count is hexadecimal, unlike every other count.
        let w_cnt = usize::from_str_radix(fields[3], 16)
            .with_context(|| format!("bad word count in {}: {:?}", path.display(), line))?;

        let p_cnt_at = 4 + 2 * w_cnt;
        let Some(p_cnt_field) = fields.get(p_cnt_at) else {
            continue;
        };
        let p_cnt: usize = p_cnt_field
            .parse()
            .with_context(|| format!("bad pointer count in {}: {:?}", path.display(), line))?;

        let parents = hypernyms.entry(offset).or_default();
        for i in 0..p_cnt {
            let ptr_at = p_cnt_at + 1 + 4 * i;
            let (Some(symbol), Some(target)) = (fields.get(ptr_at), fields.get(ptr_at + 1)) else {
                break;
            };
            // `@` is a hypernym, `@i` an instance hypernym.
            if *symbol == "@" || *symbol == "@i" {
                let target: u32 = target.parse().with_context(|| {
                    format!("bad hypernym offset in {}: {:?}", path.display(), line)
                })?;
                parents.push(target);
            }
        }
    }
    Ok(hypernyms)
}

fn parse_exceptions(dict_dir: &Path, pos: Pos) -> Result<HashMap<String, String>> {
    let path = dict_dir.join(format!("{}.exc", pos.tag()));
    let content = fs::read_to_string(&path)
        .with_context(|| format!("reading {}", path.display()))?;

    let mut exceptions = HashMap::new();
    for line in data_lines(&content) {
        let mut fields = line.split_whitespace();
        if let (Some(inflected), Some(base)) = (fields.next(), fields.next()) {
            exceptions.insert(inflected.to_string(), base.to_string());
        }
    }
    Ok(exceptions)
}

/// Depth of every synset below its taxonomy root, roots at 1. Iterative so
/// deep hierarchies cannot overflow the stack.
fn compute_depths(hypernyms: &HashMap<u32, Vec<u32>>) -> HashMap<u32, u32> {
    let mut depths: HashMap<u32, u32> = HashMap::new();

    for &start in hypernyms.keys() {
        if depths.contains_key(&start) {
            continue;
        }
        let mut stack = vec![start];
        while let Some(&current) = stack.last() {
            if depths.contains_key(&current) {
                stack.pop();
                continue;
            }
            let parents = hypernyms.get(&current).map(Vec::as_slice).unwrap_or(&[]);
            let unresolved: Vec<u32> = parents
                .iter()
                .copied()
                .filter(|p| !depths.contains_key(p) && !stack.contains(p))
                .collect();
            if unresolved.is_empty() {
                let depth = parents
                    .iter()
                    .filter_map(|p| depths.get(p))
                    .max()
                    .map(|d| d + 1)
                    .unwrap_or(1);
                depths.insert(current, depth);
                stack.pop();
            } else {
                stack.extend(unresolved);
            }
        }
    }
    depths
}
