/// Alias for `Result<T, SimError>`.
pub type SimResult<T> = Result<T, SimError>;

/// Errors produced inside the simulation.
///
/// None of these escape the tick loop: the orchestrator logs them and falls
/// back to an empty or unchanged state.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// The configuration file could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[source] serde_json::Error),

    /// A fixed fairy style outside 1-8 was requested.
    #[error("fairy style {0} is out of range (expected 1-8)")]
    StyleOutOfRange(i64),

    /// A named fairy style or box limit was not recognized.
    #[error("unrecognized setting value: \"{0}\"")]
    UnknownSetting(String),

    /// Saved companion state did not match the named schema.
    #[error("saved companion state is not valid {schema} data: {source}")]
    Persistence {
        /// Which schema was attempted.
        schema: &'static str,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },
}
