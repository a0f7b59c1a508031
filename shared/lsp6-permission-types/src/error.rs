/// Errors raised while decoding a compact bytes array.
///
/// Kept apart from "deny" outcomes: a malformed allow-list is reported as such and is never
/// treated as an empty one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// A length prefix (or its element) runs past the end of the input.
    #[error("compact bytes array truncated at offset {offset}")]
    Truncated { offset: usize },
    /// An element declared a zero length.
    #[error("zero-length element at offset {offset}")]
    EmptyElement { offset: usize },
    /// An element does not have the width its codec requires.
    #[error("invalid element length {len} at offset {offset}")]
    InvalidElementLength { offset: usize, len: usize },
    /// The element is too long to be described by a 2-byte length prefix.
    #[error("element of {len} bytes does not fit a 2-byte length prefix")]
    ElementTooLong { len: usize },
}
