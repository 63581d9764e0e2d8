//! Patch file format and operations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use flowgraph_core::{
    Arg, EventQueue, PortId, Router, TableGenerator, TableHandle, TableRequest, Voice,
    activate_always_on,
};

use crate::error::ConfigError;

/// A name-or-number argument as written in a patch file.
///
/// Instruments and ports may be addressed either way: `sink = "Master"` or
/// `sink = 20`, `inlet = "in"` or `inlet = 1`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ArgConfig {
    /// Numeric argument.
    Number(f64),
    /// Literal name.
    Text(String),
}

impl ArgConfig {
    /// Converts to the router's argument type.
    pub fn to_arg(&self) -> Arg {
        match self {
            ArgConfig::Number(n) => Arg::Number(*n),
            ArgConfig::Text(s) => Arg::Str(s.clone()),
        }
    }
}

impl From<&str> for ArgConfig {
    fn from(s: &str) -> Self {
        ArgConfig::Text(s.to_string())
    }
}

impl From<f64> for ArgConfig {
    fn from(n: f64) -> Self {
        ArgConfig::Number(n)
    }
}

impl fmt::Display for ArgConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_arg().to_name())
    }
}

/// One `source:outlet → sink:inlet` declaration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectionConfig {
    /// Instrument owning the outlet.
    pub source: ArgConfig,
    /// Outlet name on the source instrument.
    pub outlet: ArgConfig,
    /// Instrument owning the inlet.
    pub sink: ArgConfig,
    /// Inlet name on the sink instrument.
    pub inlet: ArgConfig,
}

impl ConnectionConfig {
    /// Creates a connection declaration.
    pub fn new(
        source: impl Into<ArgConfig>,
        outlet: impl Into<ArgConfig>,
        sink: impl Into<ArgConfig>,
        inlet: impl Into<ArgConfig>,
    ) -> Self {
        Self {
            source: source.into(),
            outlet: outlet.into(),
            sink: sink.into(),
            inlet: inlet.into(),
        }
    }

    /// Canonical outlet identifier.
    pub fn source_id(&self) -> PortId {
        PortId::from_args(&self.source.to_arg(), &self.outlet.to_arg())
    }

    /// Canonical inlet identifier.
    pub fn sink_id(&self) -> PortId {
        PortId::from_args(&self.sink.to_arg(), &self.inlet.to_arg())
    }
}

/// An instrument activated for the whole run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlwaysOnConfig {
    /// Instrument name, or a number to reuse the activating voice's identity.
    pub instrument: ArgConfig,

    /// Extra parameter fields appended to the note-on.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<f64>,
}

impl AlwaysOnConfig {
    /// Creates an activation with no extra fields.
    pub fn new(instrument: impl Into<ArgConfig>) -> Self {
        Self {
            instrument: instrument.into(),
            params: Vec::new(),
        }
    }

    /// Sets the extra parameter fields.
    pub fn with_params(mut self, params: impl IntoIterator<Item = f64>) -> Self {
        self.params = params.into_iter().collect();
        self
    }
}

/// A shared table to build during the header phase.
///
/// `file` is the string argument accepted by sample-loading generators; when
/// present every entry of `args` follows it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableConfig {
    /// Requested table number (`0` lets the engine choose).
    #[serde(default)]
    pub number: f64,

    /// Table size.
    pub size: f64,

    /// Generator number.
    #[serde(rename = "gen")]
    pub generator: f64,

    /// String argument for sample-loading generators.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Numeric generator arguments.
    #[serde(default)]
    pub args: Vec<f64>,
}

impl TableConfig {
    /// Creates a numeric table declaration.
    pub fn new(size: f64, generator: f64, args: impl IntoIterator<Item = f64>) -> Self {
        Self {
            number: 0.0,
            size,
            generator,
            file: None,
            args: args.into_iter().collect(),
        }
    }

    /// Builds the router request for this table.
    pub fn to_request(&self) -> TableRequest {
        let (arg, extra) = match (&self.file, self.args.split_first()) {
            (Some(file), _) => (Arg::Str(file.clone()), self.args.as_slice()),
            (None, Some((first, rest))) => (Arg::Number(*first), rest),
            (None, None) => (Arg::Number(0.0), &[][..]),
        };
        TableRequest::new(self.number, self.size, self.generator, arg)
            .with_extra(extra.iter().copied())
    }
}

/// Patch file: the header phase of one engine run.
///
/// # TOML Format
///
/// ```toml
/// name = "Mixer"
/// block_size = 32
///
/// [[connections]]
/// source = "Reverb"
/// outlet = "out"
/// sink = "Master"
/// inlet = "in"
///
/// [[always_on]]
/// instrument = "Master"
/// params = [0.5]
///
/// [[tables]]
/// size = 8192
/// gen = 10
/// args = [1.0]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patch {
    /// Name of the patch.
    pub name: String,

    /// Optional description of the patch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Samples per control cycle (defaults to 32).
    #[serde(default = "default_block_size")]
    pub block_size: u32,

    /// Connection declarations, in declaration order.
    #[serde(default)]
    pub connections: Vec<ConnectionConfig>,

    /// Instruments activated for the whole run.
    #[serde(default)]
    pub always_on: Vec<AlwaysOnConfig>,

    /// Shared tables.
    #[serde(default)]
    pub tables: Vec<TableConfig>,
}

fn default_block_size() -> u32 {
    32
}

impl Patch {
    /// Create a new empty patch.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            block_size: default_block_size(),
            connections: Vec::new(),
            always_on: Vec::new(),
            tables: Vec::new(),
        }
    }

    /// Create a patch with a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the block size.
    pub fn with_block_size(mut self, block_size: u32) -> Self {
        self.block_size = block_size;
        self
    }

    /// Add a connection declaration.
    pub fn with_connection(mut self, connection: ConnectionConfig) -> Self {
        self.connections.push(connection);
        self
    }

    /// Add an always-on instrument.
    pub fn with_always_on(mut self, always_on: AlwaysOnConfig) -> Self {
        self.always_on.push(always_on);
        self
    }

    /// Add a shared table.
    pub fn with_table(mut self, table: TableConfig) -> Self {
        self.tables.push(table);
        self
    }

    /// Load a patch from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let patch: Patch = toml::from_str(&content)?;
        Ok(patch)
    }

    /// Load a patch from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the patch to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the patch to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Declares every connection on `router`, then activates every always-on
    /// instrument through `queue`, both in file order.
    ///
    /// `activating` is the voice running the header; numeric always-on
    /// instruments take its identity.
    pub fn apply<Q>(
        &self,
        router: &Router,
        activating: &Voice,
        queue: &mut Q,
    ) -> Result<(), ConfigError>
    where
        Q: EventQueue + ?Sized,
    {
        for connection in &self.connections {
            router.connect(
                &connection.source.to_arg(),
                &connection.outlet.to_arg(),
                &connection.sink.to_arg(),
                &connection.inlet.to_arg(),
            );
        }
        for always_on in &self.always_on {
            activate_always_on(
                &always_on.instrument.to_arg(),
                activating,
                &always_on.params,
                &mut *queue,
            )?;
        }
        Ok(())
    }

    /// Builds every table through the router's memoizer, in file order.
    ///
    /// Identical declarations resolve to the same handle.
    pub fn build_tables(
        &self,
        router: &Router,
        generator: &mut dyn TableGenerator,
    ) -> Result<Vec<TableHandle>, ConfigError> {
        self.tables
            .iter()
            .map(|table| Ok(router.table_once(&table.to_request(), &mut *generator)?))
            .collect()
    }

    /// Sink identifier and source identifier of every connection, in order.
    pub fn routes(&self) -> Vec<(PortId, PortId)> {
        self.connections
            .iter()
            .map(|c| (c.sink_id(), c.source_id()))
            .collect()
    }
}

impl Default for Patch {
    fn default() -> Self {
        Self::new("Untitled")
    }
}
