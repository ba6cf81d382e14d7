use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use hickory_proto::op::Message;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::HandlerConfig;
use crate::error::{Result, SyncError};
use crate::notify::NotifyDispatcher;
use crate::zone::ZoneConfigStore;

/// Handler kinds the update pipeline knows how to drive, resolved from the
/// raw `type` tag in the handler config.
enum HandlerKind<'a> {
    /// BIND style nameserver: rewrite its slave zone config file
    Bind {
        config_file: &'a Path,
        zonefiles_path: &'a Path,
    },
}

impl<'a> HandlerKind<'a> {
    fn resolve(config: &'a HandlerConfig) -> Result<Self> {
        match config.kind.as_str() {
            "bind" => Ok(HandlerKind::Bind {
                config_file: &config.config_file,
                zonefiles_path: &config.zonefiles_path,
            }),
            other => Err(SyncError::NoSuchHandlerType(other.to_string())),
        }
    }
}

/// Applies one NOTIFY to a configured nameserver.
pub struct UpdateHandler {
    dispatcher: NotifyDispatcher,
    /// One lock per zone config file, so concurrent NOTIFYs cannot
    /// interleave a load-modify-save cycle on the same file. Updates for
    /// different files run in parallel.
    file_locks: DashMap<PathBuf, Arc<Mutex<()>>>,
}

impl UpdateHandler {
    pub fn new(dispatcher: NotifyDispatcher) -> Self {
        Self {
            dispatcher,
            file_locks: DashMap::new(),
        }
    }

    pub fn dispatcher(&self) -> &NotifyDispatcher {
        &self.dispatcher
    }

    /// Run one update cycle for `config`.
    ///
    /// A message that turns out not to be an actionable NOTIFY is a
    /// successful no-op. Unknown handler type tags fail with
    /// [`SyncError::NoSuchHandlerType`].
    pub async fn handle(
        &self,
        config: &HandlerConfig,
        msg: &Message,
        sender: SocketAddr,
    ) -> Result<()> {
        match HandlerKind::resolve(config)? {
            HandlerKind::Bind {
                config_file,
                zonefiles_path,
            } => {
                self.handle_bind(config_file, zonefiles_path, msg, sender)
                    .await
            }
        }
    }

    async fn handle_bind(
        &self,
        config_file: &Path,
        zonefiles_path: &Path,
        msg: &Message,
        sender: SocketAddr,
    ) -> Result<()> {
        let Some(zone) = self.dispatcher.extract_zone(msg, sender, zonefiles_path) else {
            return Ok(());
        };
        debug!("updating {} with {}", config_file.display(), zone);

        let lock = self.config_file_lock(config_file);
        let _guard = lock.lock().await;

        let mut store = ZoneConfigStore::new();
        match store.load(config_file) {
            Ok(()) => {}
            Err(SyncError::NotFound(_)) => {
                // First NOTIFY against a fresh setup: the config file does
                // not exist yet and is created by the save below.
                warn!(
                    "zone config {} does not exist yet, starting empty",
                    config_file.display()
                );
            }
            Err(e) => return Err(e),
        }
        debug!("current slave zones:\n{}", store);

        store.add_zone(zone);
        store.save(config_file)
    }

    fn config_file_lock(&self, config_file: &Path) -> Arc<Mutex<()>> {
        self.file_locks
            .entry(config_file.to_path_buf())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
