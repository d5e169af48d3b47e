//! Format detection for APE streams

/// The magic bytes at the start of every MAC container
pub const APE_MAGIC: [u8; 4] = *b"MAC ";

/// The MIME type reported for APE audio
pub const APE_MIME_TYPE: &str = "audio/ape";

/// The fixed confidence score reported for a successful sniff
pub const SNIFF_CONFIDENCE: f32 = 0.2;

/// A successful content sniff
#[derive(Copy, Clone, Debug, PartialEq)]
#[non_exhaustive]
pub struct SniffResult {
	/// The MIME type of the matched stream ([`APE_MIME_TYPE`])
	pub mime_type: &'static str,
	/// The confidence of the match ([`SNIFF_CONFIDENCE`])
	pub confidence: f32,
}

/// Attempt to detect an APE stream from its first bytes
///
/// The magic bytes `"MAC "` are the sole signal used to select this parser; no
/// other content is inspected.
///
/// # Examples
///
/// ```rust
/// use ape_demux::probe::sniff;
///
/// assert!(sniff(b"MAC \x96\x0f").is_some());
/// assert!(sniff(b"fLaC").is_none());
/// ```
pub fn sniff(header: &[u8]) -> Option<SniffResult> {
	if header.len() < APE_MAGIC.len() || header[..APE_MAGIC.len()] != APE_MAGIC {
		return None;
	}

	Some(SniffResult {
		mime_type: APE_MIME_TYPE,
		confidence: SNIFF_CONFIDENCE,
	})
}
