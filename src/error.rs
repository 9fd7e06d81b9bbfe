use thiserror::Error;

/// Errors surfaced by the public collision entry points.
///
/// These all indicate caller bugs; degenerate geometry during normal play
/// (zero overlap, zero mass, empty worlds) is handled with documented
/// fallbacks and never reaches this type.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CollideError {
    /// The source argument resolved to no bodies at all.
    #[error("collision source resolved to no bodies")]
    EmptySource,
    /// A body handle was stale or never valid.
    #[error("unknown or destroyed body handle")]
    UnknownBody,
    /// A group id was never issued by this world.
    #[error("unknown group id")]
    UnknownGroup,
}
