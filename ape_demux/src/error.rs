//! Contains the errors that can arise while reading an APE stream
//!
//! The primary error is [`ApeError`]. The type of error is determined by [`ErrorKind`],
//! which can be extended at any time.

use std::collections::TryReserveError;
use std::fmt::{Debug, Display, Formatter};

/// Alias for `Result<T, ApeError>`
pub type Result<T> = std::result::Result<T, ApeError>;

/// The types of errors that can occur
#[derive(Debug)]
#[non_exhaustive]
pub enum ErrorKind {
	// File format related errors
	/// The stream does not start with the `"MAC "` magic
	UnknownFormat,
	/// The MAC header declares a version outside the supported range (3800..=3990)
	UnsupportedVersion(u16),

	// File data related errors
	/// The descriptor/header region ended before all mandatory fields could be read
	TruncatedHeader,
	/// The seek table ended before one offset per frame could be read
	TruncatedSeekTable,
	/// Expected the data to be a different size than provided
	///
	/// This occurs when the size of an item is written as one value, but that size is either too
	/// big or small to be valid within the bounds of that item.
	SizeMismatch,
	/// Attempting to read an abnormally large amount of data
	TooMuchData,
	/// Errors that occur while decoding the stream
	Decoding(&'static str),

	// Conversions for external errors
	/// Represents all cases of [`std::io::Error`].
	Io(std::io::Error),
	/// Failure to allocate enough memory
	Alloc(TryReserveError),
}

/// Errors that could occur within `ape_demux`
pub struct ApeError {
	pub(crate) kind: ErrorKind,
}

impl ApeError {
	/// Create an `ApeError` from an [`ErrorKind`]
	///
	/// # Examples
	///
	/// ```rust
	/// use ape_demux::error::{ApeError, ErrorKind};
	///
	/// let unknown_format = ApeError::new(ErrorKind::UnknownFormat);
	/// ```
	#[must_use]
	pub const fn new(kind: ErrorKind) -> Self {
		Self { kind }
	}

	/// Returns the [`ErrorKind`]
	///
	/// # Examples
	///
	/// ```rust
	/// use ape_demux::error::{ApeError, ErrorKind};
	///
	/// let unknown_format = ApeError::new(ErrorKind::UnknownFormat);
	/// if let ErrorKind::UnknownFormat = unknown_format.kind() {
	/// 	println!("What's the format?");
	/// }
	/// ```
	pub fn kind(&self) -> &ErrorKind {
		&self.kind
	}
}

impl std::error::Error for ApeError {}

impl Debug for ApeError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{:?}", self.kind)
	}
}

impl From<std::io::Error> for ApeError {
	fn from(input: std::io::Error) -> Self {
		Self {
			kind: ErrorKind::Io(input),
		}
	}
}

impl From<TryReserveError> for ApeError {
	fn from(input: TryReserveError) -> Self {
		Self {
			kind: ErrorKind::Alloc(input),
		}
	}
}

impl Display for ApeError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self.kind {
			// Conversions
			ErrorKind::Io(ref err) => write!(f, "{err}"),
			ErrorKind::Alloc(ref err) => write!(f, "{err}"),

			ErrorKind::UnknownFormat => {
				write!(f, "No supported format could be determined from the provided file")
			},
			ErrorKind::UnsupportedVersion(version) => write!(
				f,
				"Unsupported file version - {}.{:02}",
				version / 1000,
				(version % 1000) / 10
			),
			ErrorKind::TruncatedHeader => write!(
				f,
				"Not enough data left in reader to finish the MAC header"
			),
			ErrorKind::TruncatedSeekTable => write!(
				f,
				"Not enough data left in reader to finish the seek table"
			),
			ErrorKind::SizeMismatch => write!(
				f,
				"Encountered an invalid item size, either too big or too small to be valid"
			),
			ErrorKind::TooMuchData => write!(
				f,
				"Attempted to read an abnormally large amount of data"
			),
			ErrorKind::Decoding(message) => write!(f, "APE: {message}"),
		}
	}
}
