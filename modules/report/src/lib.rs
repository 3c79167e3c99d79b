//! CSV emission for the two aggregate reports.

use csv::Writer;
use flowtag_core::{Error, LookupKey, OrderedCounts};
use std::io::Write;

/// Write the per-tag report: `Tag,Count` rows in first-seen order, with the
/// untagged total as an explicit trailing row (present even when zero).
pub fn write_tag_report<W: Write>(
    writer: W,
    tag_counts: &OrderedCounts<String>,
    untagged: u64,
) -> Result<(), Error> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(["Tag", "Count"])?;
    for (tag, count) in tag_counts.iter() {
        wtr.write_record([tag.as_str(), count.to_string().as_str()])?;
    }
    wtr.write_record(["Untagged", untagged.to_string().as_str()])?;
    wtr.flush()?;
    Ok(())
}

/// Write the per-(port, protocol) report: `Port,Protocol,Count` rows in
/// first-seen order.
pub fn write_port_protocol_report<W: Write>(
    writer: W,
    counts: &OrderedCounts<LookupKey>,
) -> Result<(), Error> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(["Port", "Protocol", "Count"])?;
    for (key, count) in counts.iter() {
        wtr.write_record([
            key.port.to_string().as_str(),
            key.protocol.as_str(),
            count.to_string().as_str(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
