//! Telemetry client facade
//!
//! [`TelemetryClient`] owns a region and everything discovered about its
//! layout. Layout discovery runs once, eagerly, in the constructor; value
//! reads go back to the region bytes on every call.

use std::sync::OnceLock;

use serde_yaml_ng::Value as YamlValue;
use tracing::{debug, info};

use crate::config::ClientOptions;
use crate::region::SharedRegion;
use crate::schema::{BufferSet, RegionLayout, SessionDocument, VariableCatalog, VariableDescriptor};
use crate::types::{Snapshot, SnapshotEntry, Value};
use crate::{Result, TelemetryError};


/// Read-only client over a telemetry region.
///
/// `R` is anything that lends the region bytes: the live [`SharedRegion`]
/// or an in-memory buffer.
///
/// ```rust,no_run
/// use pitlane::TelemetryClient;
///
/// fn main() -> pitlane::Result<()> {
///     let client = TelemetryClient::connect()?;
///     if let Some(speed) = client.telemetry("Speed")? {
///         println!("Speed: {}", speed);
///     }
///     println!("Track: {:?}", client.session("WeekendInfo_TrackName")?);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct TelemetryClient<R = SharedRegion> {
    region: R,
    options: ClientOptions,
    layout: RegionLayout,
    catalog: VariableCatalog,
    buffers: BufferSet,
    session: OnceLock<SessionDocument>,
}

impl TelemetryClient<SharedRegion> {
    /// Open the simulator's region with default options.
    pub fn connect() -> Result<Self> {
        Self::connect_with(ClientOptions::default())
    }

    /// Open the region named in `options`.
    pub fn connect_with(options: ClientOptions) -> Result<Self> {
        info!(name = %options.region_name, size = options.region_size, "Opening telemetry region");
        let region = SharedRegion::open(&options.region_name, options.region_size)?;
        Self::with_options(region, options)
    }
}

impl<R: AsRef<[u8]>> TelemetryClient<R> {
    /// Build a client over `region` with default options.
    pub fn new(region: R) -> Result<Self> {
        Self::with_options(region, ClientOptions::default())
    }

    /// Build a client, discovering the layout of `region`.
    ///
    /// Any layout failure here is final for this region: reopen it to retry.
    pub fn with_options(region: R, options: ClientOptions) -> Result<Self> {
        let bytes = region.as_ref();
        let layout = RegionLayout::discover(bytes)?;
        let catalog = VariableCatalog::parse(bytes, layout.header_start)?;
        let buffers = BufferSet::resolve(bytes)?;

        info!(
            variables = catalog.len(),
            document_end = layout.document_end,
            header_start = layout.header_start,
            "Telemetry layout ready"
        );

        Ok(Self { region, options, layout, catalog, buffers, session: OnceLock::new() })
    }

    fn bytes(&self) -> &[u8] {
        self.region.as_ref()
    }

    pub fn region(&self) -> &R {
        &self.region
    }

    /// Mutable access to the region bytes.
    ///
    /// The layout is not rediscovered: only value bytes and session text may
    /// change. Call [`refresh_session`](Self::refresh_session) after rewriting
    /// the session text.
    pub fn region_mut(&mut self) -> &mut R {
        &mut self.region
    }

    /// Give the region back, dropping all discovered layout.
    pub fn into_region(self) -> R {
        self.region
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn layout(&self) -> &RegionLayout {
        &self.layout
    }

    pub fn catalog(&self) -> &VariableCatalog {
        &self.catalog
    }

    pub fn buffers(&self) -> &BufferSet {
        &self.buffers
    }

    /// Descriptor of a telemetry variable.
    pub fn variable(&self, key: &str) -> Result<&VariableDescriptor> {
        self.catalog
            .get(key)
            .ok_or_else(|| TelemetryError::UnknownVariable { name: key.to_string() })
    }

    /// Current value of a telemetry variable.
    ///
    /// `Ok(None)` means every buffer holds zero bytes for the variable: either
    /// nothing has been written yet or the value is zero.
    pub fn telemetry(&self, key: &str) -> Result<Option<Value>> {
        let descriptor = self.variable(key)?;
        self.buffers.read_value_with(self.bytes(), descriptor, self.options.buffer_selection)
    }

    /// Telemetry variable names, sorted.
    pub fn telemetry_keys(&self) -> Vec<String> {
        self.catalog.names()
    }

    /// The decoded session document, decoded on first use.
    pub fn session_document(&self) -> Result<&SessionDocument> {
        if let Some(document) = self.session.get() {
            return Ok(document);
        }

        let document =
            SessionDocument::read(self.bytes(), &self.layout.document, self.options.flatten_session)?;
        Ok(self.session.get_or_init(|| document))
    }

    /// Value of a session key.
    ///
    /// Keys are `_`-joined paths unless flattening is disabled in [`ClientOptions`].
    pub fn session(&self, key: &str) -> Result<YamlValue> {
        self.session_document()?
            .get(key)
            .cloned()
            .ok_or_else(|| TelemetryError::UnknownSessionKey { key: key.to_string() })
    }

    /// Session keys, sorted.
    pub fn session_keys(&self) -> Result<Vec<String>> {
        Ok(self.session_document()?.keys().cloned().collect())
    }

    /// Drop the cached session document so the next lookup decodes it again.
    pub fn refresh_session(&mut self) {
        if self.session.take().is_some() {
            debug!("Session document invalidated");
        }
    }

    /// Every session key and every telemetry variable with its current value.
    ///
    /// Telemetry variables shadow session keys with the same name.
    pub fn snapshot(&self) -> Result<Snapshot> {
        let mut snapshot = Snapshot::new();

        for (key, value) in self.session_document()?.iter() {
            snapshot.insert(key.clone(), SnapshotEntry::Session(value.clone()));
        }

        for descriptor in self.catalog.iter() {
            let value = self.buffers.read_value_with(
                self.bytes(),
                descriptor,
                self.options.buffer_selection,
            )?;
            snapshot.insert(descriptor.name.clone(), SnapshotEntry::from(value));
        }

        debug!(entries = snapshot.len(), "Built snapshot");
        Ok(snapshot)
    }
}
