use std::net::{IpAddr, SocketAddr};
use std::path::Path;

use hickory_proto::op::{Message, OpCode};
use hickory_proto::rr::RecordType;
use tracing::debug;

use crate::zone::Zone;

/// Turns decoded NOTIFY messages into slave zone descriptions.
pub struct NotifyDispatcher {
    /// Remote addresses allowed to send NOTIFY. An address not on the list
    /// means the packet is dropped, so an empty list denies everything.
    allowed_remotes: Vec<IpAddr>,
}

impl NotifyDispatcher {
    pub fn new(allowed_remotes: Vec<IpAddr>) -> Self {
        Self { allowed_remotes }
    }

    /// Whether packets from `ip` may be processed at all.
    pub fn remote_allowed(&self, ip: IpAddr) -> bool {
        self.allowed_remotes.contains(&ip)
    }

    /// Derive a slave zone from a NOTIFY message.
    ///
    /// Returns `None` for anything that is not a NOTIFY carrying an SOA
    /// record in its first answer. That is a normal filtering outcome, not
    /// an error. On success the sender becomes the zone's only master and
    /// the zone data file lands under `zonefiles_path` as `<domain>.host`.
    ///
    /// Pure extraction: no store access, no I/O.
    pub fn extract_zone(
        &self,
        msg: &Message,
        sender: SocketAddr,
        zonefiles_path: &Path,
    ) -> Option<Zone> {
        if msg.op_code() != OpCode::Notify {
            return None;
        }

        let answer = msg.answers().first()?;
        if answer.record_type() != RecordType::SOA {
            return None;
        }

        let owner = answer.name().to_string();
        let domain = owner.trim_end_matches('.');
        let file = zonefiles_path.join(format!("{domain}.host"));

        let zone = Zone::new(
            domain.to_string(),
            vec![sender.ip().to_string()],
            file.to_string_lossy().into_owned(),
        );
        debug!("extracted {} from notify sent by {}", zone, sender);
        Some(zone)
    }
}
