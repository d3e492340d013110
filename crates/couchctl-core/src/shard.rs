use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Shard-range key (hex interval like `00000000-1fffffff`) to the ordered
/// list of owning node hostnames. BTreeMap keeps ranges sorted by key,
/// which is the order codes are assigned in.
pub type ShardMap = BTreeMap<String, Vec<String>>;

/// ASCII punctuation, the tail of the display-code alphabet.
const PUNCTUATION: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// Single-character display codes for shard ranges, plus the database's
/// replication factor.
#[derive(Debug, Clone)]
pub struct ShardTable {
    codes: BTreeMap<String, char>,
    nvalue: usize,
}

impl ShardTable {
    /// Assign each sorted shard range a unique code from
    /// `[a-z, A-Z, 0-9, punctuation]`. More ranges than codes is fatal.
    ///
    /// The replication factor comes from the first range's owner list and
    /// every other range must agree; a mismatch means the service handed
    /// back an inconsistent shard map.
    pub fn build(shards: &ShardMap) -> Result<Self> {
        let alphabet = code_alphabet();
        if shards.len() > alphabet.len() {
            return Err(Error::CapacityExceeded {
                count: shards.len(),
                max: alphabet.len(),
            });
        }

        let mut nvalue = None;
        let mut codes = BTreeMap::new();
        for ((range, owners), code) in shards.iter().zip(alphabet) {
            match nvalue {
                None => nvalue = Some(owners.len()),
                Some(n) if n != owners.len() => {
                    return Err(Error::MalformedResponse {
                        context: "shard map".into(),
                        detail: format!(
                            "range {} has {} replicas, expected {}",
                            range,
                            owners.len(),
                            n
                        ),
                    });
                }
                Some(_) => {}
            }
            codes.insert(range.clone(), code);
        }

        Ok(Self {
            codes,
            nvalue: nvalue.unwrap_or(0),
        })
    }

    /// Number of distinct shard ranges (Q).
    pub fn unique_shards(&self) -> usize {
        self.codes.len()
    }

    /// Replication factor (N): copies of each shard across nodes.
    pub fn replication_factor(&self) -> usize {
        self.nvalue
    }

    pub fn code_for(&self, range: &str) -> Option<char> {
        self.codes.get(range).copied()
    }

    /// Sorted (range, code) pairs for the legend listing.
    pub fn legend(&self) -> impl Iterator<Item = (&str, char)> {
        self.codes.iter().map(|(r, c)| (r.as_str(), *c))
    }
}

fn code_alphabet() -> Vec<char> {
    ('a'..='z')
        .chain('A'..='Z')
        .chain('0'..='9')
        .chain(PUNCTUATION.chars())
        .collect()
}

/// How many leading hex chars of a range key to show in the per-node
/// table: enough to disambiguate at the database's shard count.
pub fn range_trim(unique_shards: usize) -> usize {
    if unique_shards < 16 {
        1
    } else if unique_shards < 256 {
        2
    } else {
        3
    }
}
