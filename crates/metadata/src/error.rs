use std::io;

/// Broad classification of a metadata operation failure, independent of the
/// underlying platform's errno numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataErrorKind {
    /// The path does not exist.
    NotFound,
    /// The caller lacked permission for the operation.
    Permission,
    /// The platform or build does not implement this capability.
    Unsupported,
    /// The arguments passed to the operation were invalid.
    InvalidArgument,
    /// Any other I/O failure.
    Io,
}

/// A metadata adapter failure, carrying both a [`MetadataErrorKind`] and the
/// originating `errno`-equivalent when one is available.
#[derive(Debug, thiserror::Error)]
#[error("{operation}: {source}")]
pub struct MetadataError {
    kind: MetadataErrorKind,
    operation: &'static str,
    #[source]
    source: io::Error,
}

impl MetadataError {
    /// Builds an error from a raw I/O failure, classifying it by `io::ErrorKind`.
    #[must_use]
    pub fn from_io(operation: &'static str, source: io::Error) -> Self {
        let kind = match source.kind() {
            io::ErrorKind::NotFound => MetadataErrorKind::NotFound,
            io::ErrorKind::PermissionDenied => MetadataErrorKind::Permission,
            io::ErrorKind::InvalidInput | io::ErrorKind::InvalidData => {
                MetadataErrorKind::InvalidArgument
            }
            io::ErrorKind::Unsupported => MetadataErrorKind::Unsupported,
            _ => MetadataErrorKind::Io,
        };
        Self {
            kind,
            operation,
            source,
        }
    }

    /// Builds an `Unsupported` error for a capability this build or platform
    /// does not implement.
    #[must_use]
    pub fn unsupported(operation: &'static str) -> Self {
        Self {
            kind: MetadataErrorKind::Unsupported,
            operation,
            source: io::Error::from(io::ErrorKind::Unsupported),
        }
    }

    /// The error's broad classification.
    #[must_use]
    pub fn kind(&self) -> MetadataErrorKind {
        self.kind
    }

    /// Whether this error is an `EPERM`-class permission failure. The
    /// metadata writer tolerates these during ownership restoration.
    #[must_use]
    pub fn is_permission(&self) -> bool {
        self.kind == MetadataErrorKind::Permission
            || self.source.raw_os_error() == Some(libc::EPERM)
    }
}
