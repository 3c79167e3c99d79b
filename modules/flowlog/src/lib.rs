//! Flow-log scanning: line parsing plus single-pass aggregation.

use flowtag_core::{decode_latin1, Error, LookupKey, LookupTable, OrderedCounts};
use std::io::{BufRead, BufReader, Read};

/// Minimum whitespace-separated fields for a line to count as a flow record.
/// The destination port and protocol code sit at fixed positions 5 and 7;
/// anything shorter is not a record and is silently dropped.
const MIN_FIELDS: usize = 12;
const DSTPORT_FIELD: usize = 5;
const PROTOCOL_FIELD: usize = 7;

/// Map a flow-log protocol code to a protocol name. Deliberately restricted:
/// everything that is not TCP or UDP is bucketed as icmp.
pub fn protocol_name(code: &str) -> &'static str {
    match code {
        "6" => "tcp",
        "17" => "udp",
        _ => "icmp",
    }
}

/// One well-formed flow record: the only two fields classification needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowRecord {
    pub port: u16,
    pub protocol: &'static str,
}

/// Parse one raw line. Lines with fewer than `MIN_FIELDS` fields yield
/// `Ok(None)`; a malformed destination-port field on a long-enough line is
/// corrupt input and fails the run.
pub fn parse_line(line: &str, line_no: u64) -> Result<Option<FlowRecord>, Error> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < MIN_FIELDS {
        return Ok(None);
    }
    let port = fields[DSTPORT_FIELD].parse::<u16>().map_err(|_| Error::DstPortField {
        line: line_no,
        value: fields[DSTPORT_FIELD].to_string(),
    })?;
    Ok(Some(FlowRecord { port, protocol: protocol_name(fields[PROTOCOL_FIELD]) }))
}

/// Tallies accumulated over one scan of a flow log.
#[derive(Debug, Default)]
pub struct FlowTallies {
    pub tag_counts: OrderedCounts<String>,
    pub port_protocol_counts: OrderedCounts<LookupKey>,
    pub untagged: u64,
}

/// Scan a flow log against a lookup table, one line at a time. Every
/// well-formed record bumps the port/protocol tally; the tag tally only moves
/// on a lookup hit, with misses counted as untagged.
pub fn scan_flow_log<R: Read>(reader: R, table: &LookupTable) -> Result<FlowTallies, Error> {
    let mut reader = BufReader::new(reader);
    let mut tallies = FlowTallies::default();
    let mut buf = Vec::new();
    let mut line_no = 0u64;
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line_no += 1;
        let line = decode_latin1(&buf);
        let Some(record) = parse_line(&line, line_no)? else {
            continue;
        };
        let key = LookupKey::new(record.port, record.protocol);
        match table.tag_for(&key) {
            Some(tag) => tallies.tag_counts.bump(tag.to_string()),
            None => tallies.untagged += 1,
        }
        tallies.port_protocol_counts.bump(key);
    }
    Ok(tallies)
}

#[cfg(test)]
mod tests {
    use super::*;

    // 14-field line shaped like a v2 flow record; positions 5 and 7 carry the
    // destination port and protocol code.
    fn log_line(port: &str, code: &str) -> String {
        format!(
            "2 123456789012 eni-0a1b2c3d 10.0.1.10 198.51.100.2 {port} 49153 {code} 25 20000 1620140761 1620140821 ACCEPT OK"
        )
    }

    fn table() -> LookupTable {
        let mut t = LookupTable::new();
        t.insert(LookupKey::new(80, "tcp"), "web".to_string());
        t.insert(LookupKey::new(53, "udp"), "dns".to_string());
        t
    }

    #[test]
    fn protocol_mapping_is_exact() {
        assert_eq!(protocol_name("6"), "tcp");
        assert_eq!(protocol_name("17"), "udp");
        assert_eq!(protocol_name("1"), "icmp");
        assert_eq!(protocol_name("47"), "icmp");
        assert_eq!(protocol_name(""), "icmp");
    }

    #[test]
    fn parses_port_and_protocol_positions() {
        let rec = parse_line(&log_line("443", "6"), 1).unwrap().unwrap();
        assert_eq!(rec, FlowRecord { port: 443, protocol: "tcp" });
    }

    #[test]
    fn short_line_is_silently_skipped() {
        assert_eq!(parse_line("2 123456789012 eni-0a1b2c3d", 1).unwrap(), None);
        assert_eq!(parse_line("", 2).unwrap(), None);
        // 11 fields: one short of a record
        let eleven = log_line("80", "6").split_whitespace().take(11).collect::<Vec<_>>().join(" ");
        assert_eq!(parse_line(&eleven, 3).unwrap(), None);
    }

    #[test]
    fn twelve_fields_is_enough() {
        let twelve = log_line("80", "6").split_whitespace().take(12).collect::<Vec<_>>().join(" ");
        let rec = parse_line(&twelve, 1).unwrap().unwrap();
        assert_eq!(rec.port, 80);
    }

    #[test]
    fn bad_port_field_is_fatal() {
        match parse_line(&log_line("notaport", "6"), 7) {
            Err(Error::DstPortField { line, value }) => {
                assert_eq!(line, 7);
                assert_eq!(value, "notaport");
            }
            other => panic!("expected port field error, got {:?}", other),
        }
    }

    #[test]
    fn scan_tags_and_counts_every_record() {
        let log = [
            log_line("80", "6"),
            log_line("53", "17"),
            log_line("22", "6"),
            "too short to be a record".to_string(),
        ]
        .join("\n");
        let tallies = scan_flow_log(log.as_bytes(), &table()).unwrap();

        assert_eq!(tallies.tag_counts.get(&"web".to_string()), 1);
        assert_eq!(tallies.tag_counts.get(&"dns".to_string()), 1);
        assert_eq!(tallies.untagged, 1);
        assert_eq!(tallies.port_protocol_counts.get(&LookupKey::new(80, "tcp")), 1);
        assert_eq!(tallies.port_protocol_counts.get(&LookupKey::new(53, "udp")), 1);
        assert_eq!(tallies.port_protocol_counts.get(&LookupKey::new(22, "tcp")), 1);
        assert_eq!(tallies.port_protocol_counts.len(), 3);
    }

    #[test]
    fn tagged_plus_untagged_equals_pair_total() {
        let log = [
            log_line("80", "6"),
            log_line("80", "6"),
            log_line("53", "17"),
            log_line("22", "6"),
            log_line("9999", "17"),
        ]
        .join("\n");
        let tallies = scan_flow_log(log.as_bytes(), &table()).unwrap();
        assert_eq!(
            tallies.tag_counts.total() + tallies.untagged,
            tallies.port_protocol_counts.total()
        );
        assert_eq!(tallies.port_protocol_counts.total(), 5);
    }

    #[test]
    fn scan_propagates_bad_port_with_line_number() {
        let log = [log_line("80", "6"), log_line("oops", "6")].join("\n");
        match scan_flow_log(log.as_bytes(), &table()) {
            Err(Error::DstPortField { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected port field error, got {:?}", other),
        }
    }

    #[test]
    fn pair_order_is_first_seen() {
        let log = [log_line("22", "6"), log_line("80", "6"), log_line("22", "6")].join("\n");
        let tallies = scan_flow_log(log.as_bytes(), &table()).unwrap();
        let pairs: Vec<LookupKey> =
            tallies.port_protocol_counts.iter().map(|(k, _)| k.clone()).collect();
        assert_eq!(pairs, vec![LookupKey::new(22, "tcp"), LookupKey::new(80, "tcp")]);
    }
}
