//! Commands for the content import.

use lathi_core::command::Command;
use uuid::Uuid;

/// Command to import a YAML content pack.
#[derive(Debug, Clone)]
pub struct ImportContentPack {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Where the pack was read from, for logging.
    pub origin: String,
    /// The pack's YAML text.
    pub source: String,
}

impl Command for ImportContentPack {
    fn command_type(&self) -> &'static str {
        "content.import_content_pack"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
