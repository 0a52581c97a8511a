//! Line-oriented CIDR lists.
//!
//! One entry per line. Blank lines and lines starting with `#` are ignored, a leading `!`
//! removes the entry instead of adding it, and a bare address stands for a single host:
//!
//! ```text
//! # office
//! 10.0.0.0/16
//! !10.0.13.0/24
//! 2001:db8::1
//! ```

use crate::models::{parse_ip, Cidr, CidrError};
use crate::set::IpSet;
use colored::Colorize;
use std::io::BufRead;

/// One parsed line of a CIDR list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    Insert(Cidr),
    Remove(Cidr),
}

impl Entry {
    /// Parse one line. Returns `Ok(None)` for blank lines and comments.
    pub fn parse(line: &str) -> Result<Option<Entry>, CidrError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        match line.strip_prefix('!') {
            Some(net) => Ok(Some(Entry::Remove(parse_net(net)?))),
            None => Ok(Some(Entry::Insert(parse_net(line)?))),
        }
    }

    pub fn apply(self, set: &mut IpSet) {
        match self {
            Entry::Insert(net) => set.insert_net(net),
            Entry::Remove(net) => set.remove_net(&net),
        }
    }
}

fn parse_net(text: &str) -> Result<Cidr, CidrError> {
    let text = text.trim();
    if text.contains('/') {
        Cidr::new(text)
    } else {
        parse_ip(text).map(Cidr::host)
    }
}

/// What [`load`] did with the lines it read.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadStats {
    pub inserted: usize,
    pub removed: usize,
    pub skipped: usize,
}

/// Apply every line of `reader` to `set`, in order. Lines that don't parse are logged and
/// skipped; read errors are returned.
///
/// # Arguments
/// * `reader` - Source of the CIDR list
/// * `source` - Name used in log lines, e.g. the file name
/// * `set` - Set the entries are applied to
pub fn load<R: BufRead>(reader: R, source: &str, set: &mut IpSet) -> std::io::Result<LoadStats> {
    let mut stats = LoadStats::default();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        match Entry::parse(&line) {
            Ok(None) => {}
            Ok(Some(entry)) => {
                match entry {
                    Entry::Insert(_) => stats.inserted += 1,
                    Entry::Remove(_) => stats.removed += 1,
                }
                entry.apply(set);
            }
            Err(e) => {
                stats.skipped += 1;
                log::warn!("{} {source}:{}: {e}", "skipped".red(), index + 1);
            }
        }
    }
    log::info!(
        "{source}: {} inserted, {} removed, {} skipped",
        stats.inserted,
        stats.removed,
        stats.skipped
    );
    Ok(stats)
}
