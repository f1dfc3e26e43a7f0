use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, debug_span, error, info, warn};

use super::block::{BlockScan, CLOSING_LINE, append_block, remove_blocks, scan_blocks};
use crate::error::{GuardError, GuardResult};
use crate::helpers::read_optional;
use crate::settings::Configuration;

/// A file guarded by a block in the access-control document
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    CredentialFile,
    DebugLog,
    EnvFile,
}

impl Resource {
    pub const ALL: [Resource; 3] = [
        Resource::CredentialFile,
        Resource::DebugLog,
        Resource::EnvFile,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            Resource::CredentialFile => ".htpasswd",
            Resource::DebugLog => "debug.log",
            Resource::EnvFile => ".env",
        }
    }

    /// Comment line opening the block, unique per resource
    pub fn marker(self) -> &'static str {
        match self {
            Resource::CredentialFile => "# Protect .htpasswd",
            Resource::DebugLog => "# Protect debug.log",
            Resource::EnvFile => "# Protect .env",
        }
    }

    /// Whether the block belongs in the document for this configuration
    pub fn is_guarded(self, config: &Configuration) -> bool {
        match self {
            Resource::CredentialFile => config.protection_enabled,
            Resource::DebugLog => config.guards_log(),
            Resource::EnvFile => config.guards_env(),
        }
    }

    /// Block text, marker line through the closing line
    pub fn render_block(self, credential_path: &Path) -> String {
        let rules = match self {
            Resource::CredentialFile => {
                "    Order Allow,Deny\n    Deny from all\n".to_string()
            }
            Resource::DebugLog | Resource::EnvFile => format!(
                "    AuthType Basic\n    AuthName \"Restricted Access\"\n    AuthUserFile {}\n    Require valid-user\n",
                credential_path.display()
            ),
        };
        format!(
            "{}\n<Files \"{}\">\n{rules}{CLOSING_LINE}\n",
            self.marker(),
            self.file_name()
        )
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// What a reconcile pass did to one block
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessOutcome {
    /// No access-control document to edit
    DocumentMissing,
    Added,
    /// Block wanted and already there
    Present,
    Removed,
    /// Block unwanted and not there
    Absent,
    Malformed,
    Failed,
}

impl fmt::Display for AccessOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AccessOutcome::DocumentMissing => "document missing",
            AccessOutcome::Added => "added",
            AccessOutcome::Present => "present",
            AccessOutcome::Removed => "removed",
            AccessOutcome::Absent => "absent",
            AccessOutcome::Malformed => "malformed",
            AccessOutcome::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Keeps the block of one resource in or out of the access-control document
#[derive(Clone, Debug)]
pub struct AccessRule {
    resource: Resource,
    credential_path: PathBuf,
}

impl AccessRule {
    pub fn new(resource: Resource, credential_path: impl Into<PathBuf>) -> Self {
        Self {
            resource,
            credential_path: credential_path.into(),
        }
    }

    pub fn resource(&self) -> Resource {
        self.resource
    }

    /// Add the block when `wanted`, remove it otherwise. Failures are
    /// logged and reported through the outcome.
    pub fn reconcile(&self, wanted: bool, document_path: &Path) -> AccessOutcome {
        let marker = self.resource.marker();
        let _span = debug_span!("access rule", marker, path = ?document_path).entered();
        match self.apply(wanted, document_path) {
            Ok(outcome) => {
                match outcome {
                    AccessOutcome::Added => info!("access block added"),
                    AccessOutcome::Removed => info!("access block removed"),
                    AccessOutcome::DocumentMissing => debug!("no access document, skipped"),
                    _ => {}
                }
                outcome
            }
            Err(err @ GuardError::MalformedBlock { .. }) => {
                warn!(%err, "access document left untouched");
                AccessOutcome::Malformed
            }
            Err(err) => {
                error!(%err, "failed to update access document");
                AccessOutcome::Failed
            }
        }
    }

    fn apply(&self, wanted: bool, document_path: &Path) -> GuardResult<AccessOutcome> {
        let Some(document) = read_optional(document_path)? else {
            return Ok(AccessOutcome::DocumentMissing);
        };
        let marker = self.resource.marker();
        match (wanted, scan_blocks(&document, marker)) {
            (_, BlockScan::Malformed { .. }) => Err(GuardError::MalformedBlock {
                marker,
                path: document_path.to_path_buf(),
            }),
            (true, BlockScan::Found(_)) => Ok(AccessOutcome::Present),
            (true, BlockScan::Absent) => {
                let block = self.resource.render_block(&self.credential_path);
                fs::write(document_path, append_block(&document, &block))?;
                Ok(AccessOutcome::Added)
            }
            (false, BlockScan::Found(spans)) => {
                fs::write(document_path, remove_blocks(&document, &spans))?;
                Ok(AccessOutcome::Removed)
            }
            (false, BlockScan::Absent) => Ok(AccessOutcome::Absent),
        }
    }
}
