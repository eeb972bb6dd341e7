//! Bulk codespace cleanup.

use std::io::Write;

use crate::error::Result;
use crate::registry::{Registry, SandboxHandle};
use crate::status::StatusLine;

/// Deletes every codespace the registry lists.
///
/// Each deletion is independent: a failure is reported and the loop
/// moves on to the remaining entries. The final summary reports the
/// attempted count, not confirmed successes.
pub fn delete_all<R, W>(registry: &R, status: &StatusLine<W>) -> Result<()>
where
    R: Registry + ?Sized,
    W: Write,
{
    status.set("🔍 Finding all codespaces...");
    let names = registry.list_all_names()?;

    if names.is_empty() {
        status.finish("✅ No codespaces found to delete");
        return Ok(());
    }

    status.set(&format!("🗑️  Deleting {} codespace(s)...", names.len()));

    for (i, name) in names.iter().enumerate() {
        status.set(&format!(
            "🗑️  Deleting codespace {}/{}: {}...",
            i + 1,
            names.len(),
            name
        ));

        if let Err(e) = registry.delete(&SandboxHandle::new(name)) {
            status.finish(&format!("⚠️  Failed to delete {}: {}", name, e));
            tracing::warn!(codespace = %name, error = %e, "bulk delete failed for one codespace");
        }
    }

    status.finish(&format!("✅ Deleted {} codespace(s)", names.len()));
    Ok(())
}
