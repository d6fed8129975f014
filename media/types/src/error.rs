/*!
    Error types for the media playback crate ecosystem.
*/

use std::fmt;

/**
    Error type shared across the ecosystem.

    Every failure is terminal for its scope — there are no retries. Stream
    scoped errors (`DecodeSubmit`, `DecodeReceive`) end the owning stream;
    the rest end the whole session. [`Error::Eof`] is control flow rather
    than failure: the source reports it when the container is exhausted.
*/
#[derive(Debug)]
pub enum Error {
    /// I/O error (file not found, permissions, ...)
    Io(std::io::Error),
    /// The media source cannot be opened
    Open { message: String },
    /// The source opened but its streams cannot be described
    StreamInfo { message: String },
    /// No decoder exists for a stream's codec
    DecoderNotFound { message: String },
    /// The decode unit rejected a submitted packet
    DecodeSubmit { message: String },
    /// The decode unit failed while producing frames
    DecodeReceive { message: String },
    /// The source failed mid-stream
    Read { message: String },
    /// A scale/convert or resample operation failed
    Convert { message: String },
    /// End of stream — the normal termination signal
    Eof,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Open { message } => write!(f, "cannot open source: {message}"),
            Self::StreamInfo { message } => write!(f, "cannot read stream info: {message}"),
            Self::DecoderNotFound { message } => write!(f, "no decoder: {message}"),
            Self::DecodeSubmit { message } => write!(f, "decode submit failed: {message}"),
            Self::DecodeReceive { message } => write!(f, "decode receive failed: {message}"),
            Self::Read { message } => write!(f, "read failed: {message}"),
            Self::Convert { message } => write!(f, "conversion failed: {message}"),
            Self::Eof => write!(f, "end of stream"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl Error {
    /// Create an [`Error::Open`] with the given message.
    pub fn open(message: impl Into<String>) -> Self {
        Self::Open {
            message: message.into(),
        }
    }

    /// Create an [`Error::StreamInfo`] with the given message.
    pub fn stream_info(message: impl Into<String>) -> Self {
        Self::StreamInfo {
            message: message.into(),
        }
    }

    /// Create an [`Error::DecoderNotFound`] with the given message.
    pub fn decoder_not_found(message: impl Into<String>) -> Self {
        Self::DecoderNotFound {
            message: message.into(),
        }
    }

    /// Create an [`Error::DecodeSubmit`] with the given message.
    pub fn decode_submit(message: impl Into<String>) -> Self {
        Self::DecodeSubmit {
            message: message.into(),
        }
    }

    /// Create an [`Error::DecodeReceive`] with the given message.
    pub fn decode_receive(message: impl Into<String>) -> Self {
        Self::DecodeReceive {
            message: message.into(),
        }
    }

    /// Create an [`Error::Read`] with the given message.
    pub fn read(message: impl Into<String>) -> Self {
        Self::Read {
            message: message.into(),
        }
    }

    /// Create an [`Error::Convert`] with the given message.
    pub fn convert(message: impl Into<String>) -> Self {
        Self::Convert {
            message: message.into(),
        }
    }

    /// Returns true for the end-of-stream signal.
    pub fn is_eof(&self) -> bool {
        matches!(self, Self::Eof)
    }
}

/**
    Result type alias for the media playback crate ecosystem.
*/
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(
            format!("{}", Error::open("no such file")),
            "cannot open source: no such file"
        );
        assert_eq!(
            format!("{}", Error::decode_submit("bad packet")),
            "decode submit failed: bad packet"
        );
        assert_eq!(format!("{}", Error::Eof), "end of stream");
    }

    #[test]
    fn error_is_eof() {
        assert!(Error::Eof.is_eof());
        assert!(!Error::read("truncated").is_eof());
    }

    #[test]
    fn error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let e: Error = io.into();
        assert!(matches!(e, Error::Io(_)));
        assert!(std::error::Error::source(&e).is_some());
    }
}
