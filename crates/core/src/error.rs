//! The shared error taxonomy (spec §7) every crate above `metadata`,
//! `checksums`, `platform`, and `fast_io` converts its own typed error into.
//!
//! The driver needs one enum to decide exit codes and `ignore`-policy
//! continuation against, rather than matching on each subsystem's own error
//! type; `Error`/`ErrorKind` is that enum. Subsystem errors still carry their
//! original message as `#[source]`.

use std::path::PathBuf;

use crate::exit_code::ExitCode;

/// The kind of failure, independent of which subsystem raised it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A source or destination path no longer exists during a syscall.
    NotFound,
    /// A name collision in the ordered map or on filesystem creation.
    Exists,
    /// Owner, mode, ACL, or xattr apply refused by the kernel.
    Permission,
    /// The platform lacks the requested capability.
    Unsupported,
    /// A digest output buffer was too small.
    BufferTooSmall,
    /// A malformed size/digest spec or missing positional argument.
    InvalidArgument,
    /// A read/write/seek failure mid-copy.
    Io,
    /// A comparator invariant violation; should be impossible.
    Internal,
}

impl ErrorKind {
    /// The exit code this kind maps to when it reaches the top-level driver.
    #[must_use]
    pub const fn exit_code(self) -> ExitCode {
        match self {
            Self::NotFound | Self::Exists => ExitCode::FileSelect,
            Self::Permission | Self::Io => ExitCode::FileIo,
            Self::Unsupported => ExitCode::Unsupported,
            Self::BufferTooSmall | Self::InvalidArgument => ExitCode::Syntax,
            Self::Internal => ExitCode::Internal,
        }
    }
}

/// A replication-engine failure, tagged with the node path it occurred on
/// when one is known.
#[derive(Debug, thiserror::Error)]
#[error("{}{source}", path.as_ref().map(|p| format!("{}: ", p.display())).unwrap_or_default())]
pub struct Error {
    kind: ErrorKind,
    path: Option<PathBuf>,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl Error {
    /// Builds an error from `kind`, an optional offending `path`, and the
    /// underlying cause.
    pub fn new(
        kind: ErrorKind,
        path: Option<PathBuf>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            path,
            source: Box::new(source),
        }
    }

    /// Returns `self` with `path` attached, overwriting any path already
    /// carried. Used by callers that catch a subsystem error converted via
    /// `From` (which carries no path of its own) and know which node it
    /// occurred on.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// An [`ErrorKind::Internal`] error carrying a static message, for
    /// comparator invariant violations that should be unreachable.
    #[must_use]
    pub fn internal(message: &'static str) -> Self {
        Self {
            kind: ErrorKind::Internal,
            path: None,
            source: Box::new(InternalMessage(message)),
        }
    }

    /// This error's kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The offending path, if one is known.
    #[must_use]
    pub fn path(&self) -> Option<&std::path::Path> {
        self.path.as_deref()
    }

    /// The exit code this error maps to.
    #[must_use]
    pub const fn exit_code(&self) -> ExitCode {
        self.kind.exit_code()
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct InternalMessage(&'static str);

impl From<metadata::MetadataError> for Error {
    fn from(err: metadata::MetadataError) -> Self {
        let kind = match err.kind() {
            metadata::MetadataErrorKind::NotFound => ErrorKind::NotFound,
            metadata::MetadataErrorKind::Permission => ErrorKind::Permission,
            metadata::MetadataErrorKind::Unsupported => ErrorKind::Unsupported,
            metadata::MetadataErrorKind::InvalidArgument => ErrorKind::InvalidArgument,
            metadata::MetadataErrorKind::Io => ErrorKind::Io,
        };
        Self::new(kind, None, err)
    }
}

impl From<platform::PlatformError> for Error {
    fn from(err: platform::PlatformError) -> Self {
        Self::new(ErrorKind::Io, None, err)
    }
}

impl From<checksums::digest::DigestError> for Error {
    fn from(err: checksums::digest::DigestError) -> Self {
        let kind = match err {
            checksums::digest::DigestError::Unsupported => ErrorKind::Unsupported,
            checksums::digest::DigestError::BufferTooSmall { .. } => ErrorKind::BufferTooSmall,
            checksums::digest::DigestError::InvalidState => ErrorKind::Internal,
        };
        Self::new(kind, None, err)
    }
}

impl From<fast_io::CopyError> for Error {
    fn from(err: fast_io::CopyError) -> Self {
        let path = match &err {
            fast_io::CopyError::Read { path, .. } | fast_io::CopyError::Write { path, .. } => {
                Some(path.clone())
            }
        };
        Self::new(ErrorKind::Io, path, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_error_maps_to_internal_exit_code() {
        let err = Error::internal("comparator produced an impossible mask");
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.exit_code(), ExitCode::Internal);
    }

    #[test]
    fn metadata_not_found_maps_to_file_select() {
        let metadata_err = metadata::MetadataError::from_io(
            "lstat",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        let err: Error = metadata_err.into();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.exit_code(), ExitCode::FileSelect);
    }

    #[test]
    fn digest_buffer_too_small_maps_to_syntax() {
        let err: Error = checksums::digest::DigestError::BufferTooSmall {
            needed: 32,
            got: 16,
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::BufferTooSmall);
        assert_eq!(err.exit_code(), ExitCode::Syntax);
    }

    #[test]
    fn error_display_includes_path_when_present() {
        let err = Error::new(
            ErrorKind::Io,
            Some(PathBuf::from("/tmp/example")),
            std::io::Error::new(std::io::ErrorKind::Other, "boom"),
        );
        assert!(err.to_string().starts_with("/tmp/example: "));
    }
}
