/// Hard ceiling on any size estimate (500 MB). An estimate above this is a
/// configuration error, not a recoverable condition.
pub const DEFAULT_MAX_ESTIMATED_SIZE: usize = 500 * 1024 * 1024;

/// Knobs of the serializer.
#[derive(Debug, Clone)]
pub struct SerializerSettings {
    /// Upper bound accepted from the size estimator.
    pub max_estimated_size: usize,
    /// Path prefix of the merge endpoint emitted as the composite `Html`
    /// property.
    pub merge_endpoint: String,
}

impl Default for SerializerSettings {
    fn default() -> Self {
        Self {
            max_estimated_size: DEFAULT_MAX_ESTIMATED_SIZE,
            merge_endpoint: "/sc/htmlmerger".to_owned(),
        }
    }
}
