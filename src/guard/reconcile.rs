use std::path::{self, Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info_span};

use super::access::{AccessOutcome, AccessRule, Resource};
use super::credential::{CredentialFile, CredentialOutcome};
use crate::settings::Configuration;

pub const CREDENTIAL_FILE_NAME: &str = ".htpasswd";
pub const ACCESS_DOCUMENT_NAME: &str = ".htaccess";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct RuleReport {
    pub resource: Resource,
    pub outcome: AccessOutcome,
}

/// Outcome of one pass over both files
#[derive(Clone, Debug)]
pub struct ReconcileReport {
    pub credential: CredentialOutcome,
    pub rules: Vec<RuleReport>,
    pub finished_at: DateTime<Utc>,
}

impl ReconcileReport {
    pub fn rule(&self, resource: Resource) -> Option<AccessOutcome> {
        self.rules
            .iter()
            .find(|r| r.resource == resource)
            .map(|r| r.outcome)
    }
}

/// Runs the credential file and the access rules against a configuration
#[derive(Debug)]
pub struct Reconciler {
    credential: CredentialFile,
    rules: Vec<AccessRule>,
    document_path: PathBuf,
    lock: Mutex<()>,
}

impl Reconciler {
    /// Manage `.htpasswd` and `.htaccess` under `root`
    pub fn new(root: &Path) -> Self {
        let root = path::absolute(root).unwrap_or_else(|_| root.to_path_buf());
        let credential_path = root.join(CREDENTIAL_FILE_NAME);
        let rules = Resource::ALL
            .into_iter()
            .map(|resource| AccessRule::new(resource, &credential_path))
            .collect();
        Self {
            credential: CredentialFile::new(credential_path),
            rules,
            document_path: root.join(ACCESS_DOCUMENT_NAME),
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.credential = self.credential.with_cost(cost);
        self
    }

    pub fn credential_file(&self) -> &CredentialFile {
        &self.credential
    }

    pub fn document_path(&self) -> &Path {
        &self.document_path
    }

    /// One blocking pass; concurrent callers in this process take turns
    pub fn run(&self, config: &Configuration) -> ReconcileReport {
        let _guard = self.lock.lock();
        let _span = info_span!("reconcile").entered();
        let credential = self.credential.reconcile(config);
        let rules = self
            .rules
            .iter()
            .map(|rule| {
                let resource = rule.resource();
                let outcome = rule.reconcile(resource.is_guarded(config), &self.document_path);
                RuleReport { resource, outcome }
            })
            .collect();
        let report = ReconcileReport {
            credential,
            rules,
            finished_at: Utc::now(),
        };
        debug!(credential = %report.credential, "reconcile finished");
        report
    }
}
