/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while building core values from untrusted input.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A tile coordinate could not be parsed.
    #[error("invalid tile \"{0}\": expected X,Y")]
    InvalidTile(String),

    /// A calendar date is outside the supported range.
    #[error("invalid date: day {day} of {season} (days run 1-{max})")]
    InvalidDate {
        /// The rejected day of the month.
        day: u32,
        /// The season the day was given for.
        season: crate::date::Season,
        /// The last valid day of a season.
        max: u32,
    },

    /// A season name was not recognized.
    #[error("unknown season: {0}")]
    UnknownSeason(String),
}
