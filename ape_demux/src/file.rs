//! The opened file and its track-level metadata

use crate::config::ParseOptions;
use crate::demux::FrameReader;
use crate::error::Result;
use crate::frames::{BLOCKS_PER_PTS_TICK, FrameTable, PTS_TICK_US};
use crate::header::{self, StreamInfo};
use crate::macros::err;
use crate::probe;
use crate::tag::{self, ApeTag};

use std::io::{Read, Seek, SeekFrom};
use std::sync::Arc;

/// An opened APE file
///
/// Holds the normalized stream parameters, the frame layout table, and any
/// recognized tag items. All of it is read-only once built; the frame table is
/// shared with every [`FrameReader`] handed out by [`frame_reader`](ApeFile::frame_reader).
pub struct ApeFile {
	stream_info: StreamInfo,
	frames: Arc<FrameTable>,
	tag: Option<ApeTag>,
}

impl ApeFile {
	/// Parses an APE stream from a reader
	///
	/// A failure while reading the header or seek table aborts the open
	/// entirely; a file that parses half-way produces no [`ApeFile`] at all.
	/// Tag extraction is best-effort and never fails the open.
	///
	/// # Errors
	///
	/// * The reader does not start with the `"MAC "` magic
	/// * The header or seek table is truncated or invalid
	pub fn read_from<R>(data: &mut R, options: ParseOptions) -> Result<ApeFile>
	where
		R: Read + Seek,
	{
		let mut magic = [0; 4];
		data.seek(SeekFrom::Start(0))?;
		data.read_exact(&mut magic)?;

		if probe::sniff(&magic).is_none() {
			err!(UnknownFormat);
		}

		let stream_info = header::read_stream_info(data)?;

		let frames = if options.read_properties {
			FrameTable::build(data, &stream_info)?
		} else {
			FrameTable::default()
		};

		// Tags are cosmetic; a failed scan must not cost us an otherwise
		// valid stream
		let tag = if options.read_tags {
			match tag::read_ape_tag(data, options) {
				Ok(tag) => tag,
				Err(e) => {
					log::warn!("APE: Skipping unreadable tag: {e}");
					None
				},
			}
		} else {
			None
		};

		Ok(ApeFile {
			stream_info,
			frames: Arc::new(frames),
			tag,
		})
	}

	/// The normalized stream parameters
	pub fn stream_info(&self) -> &StreamInfo {
		&self.stream_info
	}

	/// The frame layout table
	pub fn frame_table(&self) -> &FrameTable {
		&self.frames
	}

	/// The recognized tag items, if a tag was found
	pub fn tag(&self) -> Option<&ApeTag> {
		self.tag.as_ref()
	}

	/// The MIME type of the stream, always [`probe::APE_MIME_TYPE`]
	pub fn mime_type(&self) -> &'static str {
		probe::APE_MIME_TYPE
	}

	/// Total duration of the stream in microseconds
	pub fn duration_us(&self) -> u64 {
		let info = &self.stream_info;
		let total_blocks = u64::from(info.total_frames - 1) * u64::from(info.blocks_per_frame)
			+ u64::from(info.final_frame_blocks);

		(total_blocks / u64::from(BLOCKS_PER_PTS_TICK)) * PTS_TICK_US
	}

	/// The size of the largest frame payload, for sizing downstream buffers
	///
	/// Demuxed frames carry an additional 8-byte synthetic header on top of
	/// this.
	pub fn max_frame_size(&self) -> u32 {
		self.frames.max_frame_size()
	}

	/// The opaque 6-byte extension block a downstream decoder needs
	///
	/// `(version, compression type, format flags)` as three little-endian
	/// `u16`s.
	pub fn extradata(&self) -> [u8; 6] {
		let info = &self.stream_info;

		let mut extradata = [0; 6];
		extradata[0..2].copy_from_slice(&info.version.to_le_bytes());
		extradata[2..4].copy_from_slice(&info.compression_type.to_le_bytes());
		extradata[4..6].copy_from_slice(&info.format_flags.to_le_bytes());

		extradata
	}

	/// Creates a sequential frame reader over `reader`
	///
	/// Each reader shares this file's frame table and carries its own cursor,
	/// so multiple readers can demux the same file concurrently as long as each
	/// brings its own reader.
	pub fn frame_reader<R>(&self, reader: R) -> FrameReader<R>
	where
		R: Read + Seek,
	{
		FrameReader::new(Arc::clone(&self.frames), reader)
	}
}
