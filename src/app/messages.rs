//! Messages from background analysis passes to the main UI thread

/// Outcome of one background analysis pass.
pub enum BackgroundMessage {
    /// The pass published a new occurrence snapshot and repainted.
    PassComplete { occurrences: usize },
    /// The pass was abandoned; the previous snapshot is still in place.
    PassFailed(String),
    /// A background task panicked.
    Error(String),
}
