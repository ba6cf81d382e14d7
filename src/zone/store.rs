use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use tracing::debug;

use super::{Zone, ZoneConfigParser};
use crate::error::{Result, SyncError};

/// In-memory model of the nameserver zone config file.
///
/// The file on disk is the source of truth. A store is loaded, mutated and
/// written back within a single update cycle; nothing is cached across
/// requests.
#[derive(Debug, Default)]
pub struct ZoneConfigStore {
    /// Zones keyed by zone name. The sorted map keeps serialization order
    /// stable across runs.
    zones: BTreeMap<String, Zone>,
}

impl ZoneConfigStore {
    pub fn new() -> Self {
        Self {
            zones: BTreeMap::new(),
        }
    }

    /// Load zone declarations from `path`, replacing the current contents
    /// of the store.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SyncError::NotFound(path.display().to_string()));
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| SyncError::Read(format!("{}: {}", path.display(), e)))?;

        self.zones.clear();
        let mut parser = ZoneConfigParser::new();
        for zone in parser.parse(&contents) {
            self.zones.insert(zone.name.clone(), zone);
        }

        debug!("loaded {} zones from {}", self.zones.len(), path.display());
        Ok(())
    }

    /// Serialize all zones and write them to `path`, replacing whatever
    /// file was there.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_config_string())
            .map_err(|e| SyncError::Write(format!("{}: {}", path.display(), e)))?;

        debug!("wrote {} zones to {}", self.zones.len(), path.display());
        Ok(())
    }

    /// Render the zone collection in the nameserver config dialect, in
    /// zone name order.
    ///
    /// Keywords, quoting and layout are the interoperability contract with
    /// the nameserver's own config loader; every zone is written as a
    /// slave declaration.
    pub fn to_config_string(&self) -> String {
        let mut out = String::new();
        for zone in self.zones.values() {
            let _ = writeln!(out, "zone \"{}\" {{", zone.name);
            out.push_str("        type slave;\n");
            out.push_str("        masters {\n");
            for master in &zone.masters {
                let _ = writeln!(out, "                {};", master);
            }
            out.push_str("                };\n");
            let _ = writeln!(out, "        file \"{}\";", zone.file);
            out.push_str("};\n");
        }
        out
    }

    /// Insert `zone`, replacing any existing entry with the same name.
    ///
    /// No validity check happens here; callers decide what is worth
    /// storing.
    pub fn add_zone(&mut self, zone: Zone) {
        self.zones.insert(zone.name.clone(), zone);
    }

    /// Drop the entry with `zone`'s name. No-op when it is not present.
    pub fn remove_zone(&mut self, zone: &Zone) {
        self.zones.remove(&zone.name);
    }

    /// Copy of the named zone, if present. The store never hands out
    /// references into its own map.
    pub fn get_zone(&self, name: &str) -> Option<Zone> {
        self.zones.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Two stores are equivalent when every zone in one has an equal zone
    /// in the other, checked in both directions.
    pub fn equivalent(&self, other: &ZoneConfigStore) -> bool {
        self.covered_by(other) && other.covered_by(self)
    }

    fn covered_by(&self, other: &ZoneConfigStore) -> bool {
        self.zones
            .values()
            .all(|zone| other.zones.values().any(|o| zone == o))
    }
}

/// One line per zone, used for debug logging.
impl fmt::Display for ZoneConfigStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for zone in self.zones.values() {
            writeln!(f, "{}", zone)?;
        }
        Ok(())
    }
}
