//! Observable events
//!
//! Events are explicit and typed. Only build-time work (loading, parsing,
//! validating, compiling) and command-level buffer checks emit events; the
//! pack/unpack hot path never does.

use std::fmt;

use super::logger::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A schema file was read from disk
    SchemaLoaded,
    /// Schema text was parsed
    SchemaParsed,
    /// A schema passed validation
    SchemaValidated,
    /// A schema failed parsing or validation
    SchemaRejected,
    /// A codec table was built
    CodecsCompiled,
    /// Configuration loaded
    ConfigLoaded,
    /// A buffer passed layout verification
    BufferVerified,
    /// A buffer failed layout verification
    BufferRejected,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::SchemaLoaded => "SCHEMA_LOADED",
            Event::SchemaParsed => "SCHEMA_PARSED",
            Event::SchemaValidated => "SCHEMA_VALIDATED",
            Event::SchemaRejected => "SCHEMA_REJECTED",
            Event::CodecsCompiled => "CODECS_COMPILED",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::BufferVerified => "BUFFER_VERIFIED",
            Event::BufferRejected => "BUFFER_REJECTED",
        }
    }

    /// Severity this event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::SchemaRejected | Event::BufferRejected => Severity::Warn,
            Event::SchemaParsed => Severity::Trace,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
