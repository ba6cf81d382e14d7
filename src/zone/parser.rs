use tracing::trace;

use super::Zone;

/// Where the parser currently is while walking the config line by line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    /// Between zone blocks
    Outside,
    /// Inside a `zone "..." {` block
    InZone,
    /// Inside the `masters {` sub-block of a zone
    InMasters,
}

/// Line-oriented parser for the nameserver zone config dialect.
///
/// The grammar is forgiving on purpose: lines that match no pattern for the
/// current state are skipped, and a zone block cut off by end of input is
/// still returned with whatever fields were seen. Hand-edited or partially
/// written config files must not make the daemon give up.
pub struct ZoneConfigParser {
    state: ParserState,
    current: Option<Zone>,
    /// Line number, kept for trace output
    line_number: usize,
}

impl ZoneConfigParser {
    pub fn new() -> Self {
        Self {
            state: ParserState::Outside,
            current: None,
            line_number: 0,
        }
    }

    /// Parse config contents into the zones they declare, in file order.
    pub fn parse(&mut self, contents: &str) -> Vec<Zone> {
        self.state = ParserState::Outside;
        self.current = None;
        self.line_number = 0;

        let mut zones = Vec::new();
        for line in contents.lines() {
            self.line_number += 1;
            trace!("parsing line {}: {}", self.line_number, line);

            match self.state {
                ParserState::Outside => {
                    if let Some(name) = zone_open(line) {
                        self.current = Some(Zone {
                            name,
                            ..Default::default()
                        });
                        self.state = ParserState::InZone;
                    }
                }
                ParserState::InZone => {
                    // A zone-open line in here matches no pattern and is
                    // skipped; nested zone blocks are not part of the grammar.
                    if is_block_close(line) {
                        if let Some(zone) = self.current.take() {
                            zones.push(zone);
                        }
                        self.state = ParserState::Outside;
                    } else if is_masters_open(line) {
                        self.state = ParserState::InMasters;
                    } else if let Some(file) = file_declaration(line) {
                        if let Some(zone) = self.current.as_mut() {
                            zone.file = file;
                        }
                    }
                }
                ParserState::InMasters => {
                    if is_block_close(line) {
                        self.state = ParserState::InZone;
                    } else if let Some(addr) = address_token(line) {
                        if let Some(zone) = self.current.as_mut() {
                            zone.masters.push(addr);
                        }
                    }
                }
            }
        }

        // Input ended inside a block: keep the partial zone.
        if let Some(zone) = self.current.take() {
            zones.push(zone);
        }

        zones
    }
}

impl Default for ZoneConfigParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Text between the first pair of double quotes in `s`.
fn quoted(s: &str) -> Option<&str> {
    let start = s.find('"')? + 1;
    let end = start + s[start..].find('"')?;
    Some(&s[start..end])
}

/// `zone "<name>" {` opens a zone block.
fn zone_open(line: &str) -> Option<String> {
    let rest = line.trim_start().strip_prefix("zone ")?;
    let name = quoted(rest)?;
    if name.is_empty() {
        return None;
    }

    // The open brace has to follow the quoted name.
    let after = &rest[rest.find('"')? + name.len() + 2..];
    after.contains('{').then(|| name.trim().to_string())
}

/// `};` closes the innermost open block.
fn is_block_close(line: &str) -> bool {
    line.contains("};")
}

/// `masters {` opens the masters sub-block.
fn is_masters_open(line: &str) -> bool {
    line.contains("masters {")
}

/// `file "<path>";` declares the zone data file.
fn file_declaration(line: &str) -> Option<String> {
    let rest = &line[line.find("file ")? + 5..];
    let path = quoted(rest)?;
    if path.is_empty() {
        return None;
    }

    let after = &rest[rest.find('"')? + path.len() + 2..];
    after
        .trim_start()
        .starts_with(';')
        .then(|| path.trim().to_string())
}

/// `<token>;` inside a masters block is one master address.
fn address_token(line: &str) -> Option<String> {
    let token = line.split_whitespace().find(|t| t.ends_with(';'))?;
    let addr = token.trim_end_matches(';');
    (!addr.is_empty()).then(|| addr.to_string())
}
