use std::io::Write;
use std::path::{Path, PathBuf};

use crate::domain::EventPayload;

const RULE: &str = "============================================================";

/// The request a publish would send, with the token redacted.
pub fn render_preview(endpoint: &str, payload: &EventPayload) -> String {
    let body = serde_json::to_string_pretty(payload).unwrap_or_else(|e| format!("<unserializable payload: {}>", e));

    let mut out = String::new();
    out.push_str(RULE);
    out.push_str("\nAPI call preview\n");
    out.push_str(RULE);
    out.push_str(&format!("\nPOST {}\n\n", endpoint));
    out.push_str("Headers:\n");
    out.push_str("  Authorization: Bearer <redacted>\n");
    out.push_str("  Content-Type: application/json\n\n");
    out.push_str("Body:\n");
    out.push_str(&body);
    out.push('\n');
    out
}

/// Collects preview blocks of one batch into a single file.
#[derive(Debug, Clone)]
pub struct PreviewWriter {
    path: PathBuf,
}

impl PreviewWriter {
    /// Start a fresh preview file, replacing any earlier run's.
    pub fn create(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        std::fs::write(&path, "")?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, block: &str) -> std::io::Result<()> {
        let mut file = std::fs::OpenOptions::new().append(true).create(true).open(&self.path)?;
        writeln!(file, "{}", block)
    }
}
