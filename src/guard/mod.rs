mod access;
mod block;
mod credential;
mod reconcile;

pub use access::{AccessOutcome, AccessRule, Resource};
pub use block::{BlockScan, BlockSpan, CLOSING_LINE, append_block, remove_blocks, scan_blocks};
pub use credential::{BCRYPT_COST, CredentialFile, CredentialOutcome};
pub use reconcile::{
    ACCESS_DOCUMENT_NAME, CREDENTIAL_FILE_NAME, ReconcileReport, Reconciler, RuleReport,
};
