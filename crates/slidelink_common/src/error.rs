// --- File: crates/slidelink_common/src/error.rs ---

/// A trait for converting errors to HTTP status codes.
///
/// Error enums across the workspace implement this so the handlers can map
/// a typed protocol error onto the wire contract in one place, instead of
/// re-deriving status codes at every call site.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}
