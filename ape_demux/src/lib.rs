//! Parse and demux Monkey's Audio (APE) containers.
//!
//! This crate reads the MAC header/descriptor region of an APE file,
//! reconstructs the per-frame layout table from the stored seek table,
//! resolves seek times to frame indices, and extracts the trailing APE tag.
//! It produces framed, *undecoded* byte ranges plus timing metadata. Turning
//! frame bytes into PCM is a downstream decoder's job.
//!
//! Both header layouts found in the wild are supported: the legacy layout
//! (versions 3800–3979) and the descriptor-based layout introduced with 3980.
//!
//! # Examples
//!
//! ## Opening a file
//!
//! ```rust,no_run
//! # fn main() -> ape_demux::error::Result<()> {
//! let ape = ape_demux::read_from_path("music.ape")?;
//!
//! let info = ape.stream_info();
//! println!(
//! 	"{}Hz, {} channels, {} bits, {}us",
//! 	info.sample_rate(),
//! 	info.channels(),
//! 	info.bits_per_sample(),
//! 	ape.duration_us()
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Demuxing frames
//!
//! ```rust,no_run
//! # fn main() -> ape_demux::error::Result<()> {
//! use std::fs::File;
//!
//! let ape = ape_demux::read_from_path("music.ape")?;
//!
//! let mut reader = ape.frame_reader(File::open("music.ape")?);
//! reader.seek(30_000_000); // 30 seconds in
//!
//! while let Some(frame) = reader.next_frame()? {
//! 	// 8-byte (nblocks, skip) header followed by the raw frame payload
//! 	println!("frame {} @ {}us: {} bytes", frame.index(), frame.pts_us(), frame.data().len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod demux;
pub mod error;
pub mod frames;
pub mod header;
pub mod probe;
pub mod tag;

mod file;
mod macros;
mod util;

pub use file::ApeFile;

use crate::config::ParseOptions;
use crate::error::Result;

use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

/// Parses an APE stream from a reader with default [`ParseOptions`]
///
/// See [`ApeFile::read_from`].
///
/// # Errors
///
/// See [`ApeFile::read_from`]
pub fn read_from<R>(reader: &mut R) -> Result<ApeFile>
where
	R: Read + Seek,
{
	ApeFile::read_from(reader, ParseOptions::new())
}

/// Opens and parses the APE file at `path` with default [`ParseOptions`]
///
/// # Errors
///
/// * The file cannot be opened
/// * See [`ApeFile::read_from`]
pub fn read_from_path(path: impl AsRef<Path>) -> Result<ApeFile> {
	let mut file = File::open(path)?;

	read_from(&mut file)
}
