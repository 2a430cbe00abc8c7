//! # Print Session
//!
//! The print action: routes the current [`PrinterConfig`] either to the BLE
//! printer or to the OS print surface, and applies the config changes that
//! linking and failed prints imply.
//!
//! ```text
//! print ─┬─ use_bluetooth ──► encode ──► BleTransport::send ──► Done
//!        │                                     │
//!        │                                     └─ failure: use_bluetooth = false (persisted)
//!        └─ otherwise ──────► render preview ──► PrintSurface
//! ```
//!
//! All methods take `&mut self`, so two prints can never overlap.

use tracing::{info, warn};

use crate::document::{self, PrinterConfig};
use crate::error::{ReciboError, StoreError};
use crate::ir::TextEncoding;
use crate::preview::{self, PrintSurface};
use crate::printer::PrinterProfile;
use crate::store::ConfigStore;
use crate::transport::{BleTransport, Central};

/// How a print was delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintOutcome {
    /// Sent to the linked printer.
    Bluetooth { bytes: usize },
    /// Handed to the OS print surface.
    Surface,
}

pub struct PrintSession<C: Central> {
    config: PrinterConfig,
    transport: BleTransport<C>,
    store: Option<ConfigStore>,
    encoding: TextEncoding,
}

impl<C: Central> PrintSession<C> {
    pub fn new(config: PrinterConfig, transport: BleTransport<C>) -> Self {
        Self {
            config,
            transport,
            store: None,
            encoding: TextEncoding::default(),
        }
    }

    /// Persist link and routing changes to `store`.
    pub fn with_store(mut self, store: ConfigStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn config(&self) -> &PrinterConfig {
        &self.config
    }

    /// Edit the document before printing. Edits made here are not persisted.
    pub fn config_mut(&mut self) -> &mut PrinterConfig {
        &mut self.config
    }

    pub fn transport(&self) -> &BleTransport<C> {
        &self.transport
    }

    /// Discover a printer and remember it.
    ///
    /// On success the printer's name is recorded, Bluetooth routing is
    /// turned on and both are persisted. If discovery or the save fails,
    /// neither the session nor the file changes.
    pub async fn link(&mut self) -> Result<Option<String>, ReciboError> {
        let handle = self.transport.linker().link().await?;
        let name = handle.name().map(str::to_string);

        self.persist(|stored| stored.mark_linked(name.clone()))?;
        self.config.mark_linked(name.clone());
        self.transport.adopt(handle);

        info!(name = name.as_deref().unwrap_or("<unnamed>"), "Printer linked");
        Ok(name)
    }

    /// Forget the linked printer and go back to the OS print path.
    pub fn unlink(&mut self) -> Result<(), ReciboError> {
        self.persist(|stored| {
            stored.use_bluetooth = false;
            stored.linked_printer_name = None;
        })?;
        self.transport.forget();
        self.config.use_bluetooth = false;
        self.config.linked_printer_name = None;
        Ok(())
    }

    /// Print the current config.
    pub async fn print(&mut self, surface: &mut dyn PrintSurface) -> Result<PrintOutcome, ReciboError> {
        if !self.config.use_bluetooth {
            let text = preview::render_preview(&self.config, &PrinterProfile::BLE_58MM);
            surface.present(&text)?;
            info!("Receipt sent to print surface");
            return Ok(PrintOutcome::Surface);
        }

        let bytes = document::encode_with(&self.config, self.encoding);
        let linked_name = self.config.linked_printer_name.as_deref();
        match self.transport.send(&bytes, linked_name).await {
            Ok(()) => Ok(PrintOutcome::Bluetooth { bytes: bytes.len() }),
            Err(e) => {
                // The next attempt should go through linking again.
                self.config.use_bluetooth = false;
                if let Err(store_err) = self.persist(|stored| stored.use_bluetooth = false) {
                    warn!(error = %store_err, "Failed to persist Bluetooth routing change");
                }
                Err(e.into())
            }
        }
    }

    /// Apply `mutate` to the stored config and save it.
    ///
    /// Only the fields `mutate` touches change on disk; one-off document
    /// edits made through `config_mut` stay in memory.
    fn persist(&self, mutate: impl FnOnce(&mut PrinterConfig)) -> Result<(), StoreError> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        let mut stored = store.load();
        mutate(&mut stored);
        store.save(&stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{LinkError, PRINTER_OFFLINE_MESSAGE, TransportError};
    use crate::preview::WriterSurface;
    use crate::transport::memory::{MemoryCentral, MemoryDevice};
    use crate::transport::{DeviceLinker, TransportOptions};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn session_with(central: MemoryCentral, config: PrinterConfig) -> PrintSession<MemoryCentral> {
        let transport = BleTransport::new(DeviceLinker::new(central), TransportOptions::default());
        PrintSession::new(config, transport)
    }

    fn linked_config() -> PrinterConfig {
        PrinterConfig {
            content: "Hello".into(),
            use_bluetooth: true,
            linked_printer_name: Some("MPT-II".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_link_records_and_persists() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::new(dir.path().join("settings.json"));
        let central = MemoryCentral::new().with_device(MemoryDevice::printer("MPT-II"));
        let mut session = session_with(central, PrinterConfig::default()).with_store(store.clone());

        let name = session.link().await.unwrap();
        assert_eq!(name.as_deref(), Some("MPT-II"));
        assert!(session.config().use_bluetooth);
        assert!(session.transport().handle().is_some());

        let stored = store.load();
        assert!(stored.use_bluetooth);
        assert_eq!(stored.linked_printer_name.as_deref(), Some("MPT-II"));
    }

    #[tokio::test]
    async fn test_link_failure_leaves_config_untouched() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::new(dir.path().join("settings.json"));
        let central = MemoryCentral::new()
            .with_device(MemoryDevice::printer("MPT-II"))
            .cancelling();
        let mut session = session_with(central, PrinterConfig::default()).with_store(store.clone());

        let err = session.link().await.unwrap_err();
        assert!(matches!(err, ReciboError::Link(_)));
        assert_eq!(session.config(), &PrinterConfig::default());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_link_save_failure_leaves_session_unlinked() {
        let dir = TempDir::new().unwrap();
        // A regular file where the settings directory should be.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let store = ConfigStore::new(blocker.join("settings.json"));
        let central = MemoryCentral::new().with_device(MemoryDevice::printer("MPT-II"));
        let mut session = session_with(central, PrinterConfig::default()).with_store(store);

        let err = session.link().await.unwrap_err();
        assert!(matches!(err, ReciboError::Store(_)));
        assert_eq!(session.config(), &PrinterConfig::default());
        assert!(session.transport().handle().is_none());
    }

    #[tokio::test]
    async fn test_missing_adapter_disables_bluetooth() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::new(dir.path().join("settings.json"));
        store.save(&linked_config()).unwrap();

        let mut session =
            session_with(MemoryCentral::unavailable(), store.load()).with_store(store.clone());
        let mut surface = WriterSurface::new(Vec::new());

        let err = session.print(&mut surface).await.unwrap_err();
        assert!(matches!(
            err,
            ReciboError::Transport(TransportError::Relink(LinkError::Unavailable(_)))
        ));
        assert_eq!(err.user_message(), PRINTER_OFFLINE_MESSAGE);
        assert!(!session.config().use_bluetooth);
        assert!(!store.load().use_bluetooth);
        assert!(surface.into_inner().is_empty());
    }

    #[tokio::test]
    async fn test_bluetooth_print_sends_encoded_receipt() {
        let printer = MemoryDevice::printer("MPT-II");
        let central = MemoryCentral::new().with_device(printer.clone());
        let config = linked_config();
        let mut session = session_with(central, config.clone());
        let mut surface = WriterSurface::new(Vec::new());

        let outcome = session.print(&mut surface).await.unwrap();
        let expected = document::encode(&config);
        assert_eq!(outcome, PrintOutcome::Bluetooth { bytes: expected.len() });
        assert_eq!(printer.written(), expected);
        assert!(surface.into_inner().is_empty());
    }

    #[tokio::test]
    async fn test_failed_print_disables_bluetooth() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::new(dir.path().join("settings.json"));
        store.save(&linked_config()).unwrap();

        let central =
            MemoryCentral::new().with_device(MemoryDevice::printer("MPT-II").failing_write_at(1));
        let mut session = session_with(central, store.load()).with_store(store.clone());
        let mut surface = WriterSurface::new(Vec::new());

        let err = session.print(&mut surface).await.unwrap_err();
        assert_eq!(err.user_message(), PRINTER_OFFLINE_MESSAGE);
        assert!(!session.config().use_bluetooth);

        let stored = store.load();
        assert!(!stored.use_bluetooth);
        // The name stays so the printer can be re-found later.
        assert_eq!(stored.linked_printer_name.as_deref(), Some("MPT-II"));
    }

    #[tokio::test]
    async fn test_one_off_edits_are_not_persisted() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::new(dir.path().join("settings.json"));
        store.save(&linked_config()).unwrap();

        let central = MemoryCentral::new().with_device(MemoryDevice::printer("Other"));
        let mut session = session_with(central, store.load()).with_store(store.clone());
        session.config_mut().content = "temporary".into();

        assert!(session.print(&mut WriterSurface::new(Vec::new())).await.is_err());
        assert_eq!(store.load().content, "Hello");
    }

    #[tokio::test]
    async fn test_surface_print() {
        let config = PrinterConfig {
            content: "Hello".into(),
            ..Default::default()
        };
        let mut session = session_with(MemoryCentral::new(), config.clone());
        let mut surface = WriterSurface::new(Vec::new());

        let outcome = session.print(&mut surface).await.unwrap();
        assert_eq!(outcome, PrintOutcome::Surface);
        let printed = String::from_utf8(surface.into_inner()).unwrap();
        assert_eq!(printed, preview::render_preview(&config, &PrinterProfile::BLE_58MM));
    }

    #[tokio::test]
    async fn test_unlink() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::new(dir.path().join("settings.json"));
        store.save(&linked_config()).unwrap();

        let mut session =
            session_with(MemoryCentral::new(), store.load()).with_store(store.clone());
        session.unlink().unwrap();

        assert!(!session.config().use_bluetooth);
        assert!(session.config().linked_printer_name.is_none());
        assert!(store.load().linked_printer_name.is_none());
    }
}
