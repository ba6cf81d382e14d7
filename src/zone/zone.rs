use std::fmt;

/// One slave zone entry in the nameserver zone config.
///
/// Cloning is the only way a zone leaves a store, so callers never hold a
/// reference into store-internal state.
#[derive(Debug, Clone, Default)]
pub struct Zone {
    /// Fully qualified domain name, without the trailing root dot
    pub name: String,
    /// Master servers the zone is transferred from
    pub masters: Vec<String>,
    /// Path of the local zone data file
    pub file: String,
}

impl Zone {
    pub fn new(name: String, masters: Vec<String>, file: String) -> Self {
        Self {
            name,
            masters,
            file,
        }
    }

    /// A zone can be written out as a working slave declaration only when
    /// all three fields are filled in.
    pub fn is_valid(&self) -> bool {
        !(self.name.is_empty() || self.masters.is_empty() || self.file.is_empty())
    }
}

/// Master order and duplicates carry no meaning, so the master lists are
/// compared as sets. Name and file compare verbatim.
impl PartialEq for Zone {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.file == other.file
            && self.masters.iter().all(|m| other.masters.contains(m))
            && other.masters.iter().all(|m| self.masters.contains(m))
    }
}

impl Eq for Zone {}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "zone{{name: '{}', masters: [{}], file: '{}'}}",
            self.name,
            self.masters.join(", "),
            self.file
        )
    }
}
