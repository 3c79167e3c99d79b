//! Lookup-table loading from CSV: (dstport, protocol) -> tag.

use csv::ReaderBuilder;
use flowtag_core::{decode_latin1, Error, LookupKey, LookupTable};
use std::io::Read;

/// A data row that could not be turned into a table entry. Reported through
/// the caller's diagnostic callback; never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// 1-based line number in the source file (the header is line 1).
    pub line: u64,
    pub reason: String,
}

/// Load a lookup table from CSV. Header names are matched case-insensitively
/// after trimming and extra columns are ignored. Rows whose port field does
/// not parse (or that are too short) are skipped through `diag`. Duplicate
/// keys: last row wins.
pub fn load_lookup_table<R: Read>(
    reader: R,
    mut diag: impl FnMut(&SkippedRow),
) -> Result<LookupTable, Error> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers: Vec<String> = rdr
        .byte_headers()?
        .iter()
        .map(|h| decode_latin1(h).trim().to_lowercase())
        .collect();
    let position = |name: &str| headers.iter().position(|h| h == name);
    let (port_ix, proto_ix, tag_ix) =
        match (position("dstport"), position("protocol"), position("tag")) {
            (Some(p), Some(pr), Some(t)) => (p, pr, t),
            (p, pr, t) => {
                let missing = [("dstport", p), ("protocol", pr), ("tag", t)]
                    .into_iter()
                    .filter(|(_, ix)| ix.is_none())
                    .map(|(name, _)| name.to_string())
                    .collect();
                return Err(Error::Schema { missing });
            }
        };
    let last_ix = port_ix.max(proto_ix).max(tag_ix);

    let mut table = LookupTable::new();
    for record in rdr.byte_records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        if record.len() <= last_ix {
            diag(&SkippedRow {
                line,
                reason: format!("expected at least {} fields, got {}", last_ix + 1, record.len()),
            });
            continue;
        }
        let cell = |ix: usize| decode_latin1(record.get(ix).unwrap_or(b""));
        let port_raw = cell(port_ix);
        let port = match port_raw.trim().parse::<u16>() {
            Ok(p) => p,
            Err(e) => {
                diag(&SkippedRow {
                    line,
                    reason: format!("bad dstport {:?}: {}", port_raw.trim(), e),
                });
                continue;
            }
        };
        let protocol = cell(proto_ix).trim().to_lowercase();
        let tag = cell(tag_ix).trim().to_string();
        table.insert(LookupKey { port, protocol }, tag);
    }
    Ok(table)
}
