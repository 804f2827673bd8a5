//! Job identifiers.

use uuid::Uuid;

/// Generate a fresh random job identifier.
///
/// Identifiers are UUID v4 strings, so two admissions never collide even
/// when issued concurrently from different processes.
///
/// # Example
/// ```
/// use slotgate::generate_job_id;
///
/// let id = generate_job_id();
/// assert!(!id.is_empty());
/// assert_ne!(id, generate_job_id());
/// ```
pub fn generate_job_id() -> String {
    Uuid::new_v4().to_string()
}

/// Resolve the identifier a job is admitted under.
///
/// A non-empty supplied identifier is honored as-is; a missing or empty one
/// is replaced with a generated identifier.
pub(crate) fn effective_job_id(supplied: Option<&str>) -> String {
    match supplied {
        Some(id) if !id.is_empty() => id.to_owned(),
        _ => generate_job_id(),
    }
}
