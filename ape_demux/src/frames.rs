//! Frame layout reconstruction
//!
//! APE stores one raw byte offset per frame in a seek table right after the
//! header region. Everything else about a frame's layout has to be derived:
//! its size comes from the distance to the next offset, its timestamp from the
//! fixed block count per frame, and its `skip` value from the 4-byte alignment
//! of the offset relative to frame 0. The derived table is built once at open
//! time and is immutable afterwards.

use crate::error::{ApeError, ErrorKind, Result};
use crate::header::StreamInfo;
use crate::macros::{err, try_vec};
use crate::util::io::SeekStreamLen;

use std::io::{Read, Seek, SeekFrom};

use byteorder::{LittleEndian, ReadBytesExt};

/// Number of audio blocks per presentation timestamp tick
pub const BLOCKS_PER_PTS_TICK: u32 = 4608;

/// Microseconds per presentation timestamp tick
pub const PTS_TICK_US: u64 = 100_000;

/// The layout of a single frame within the stream
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[non_exhaustive]
pub struct FrameEntry {
	pub(crate) pos: u64,
	pub(crate) size: u32,
	pub(crate) nblocks: u32,
	pub(crate) skip: u32,
	pub(crate) pts: u64,
}

impl FrameEntry {
	/// Absolute byte offset of the frame data, aligned down to a 4-byte boundary
	pub fn pos(&self) -> u64 {
		self.pos
	}

	/// Byte size of the frame data, always a multiple of 4
	pub fn size(&self) -> u32 {
		self.size
	}

	/// Number of audio blocks encoded in this frame
	pub fn nblocks(&self) -> u32 {
		self.nblocks
	}

	/// Bytes to drop from the start of the frame data (0..=3); the true frame
	/// start is `skip` bytes into the aligned position
	pub fn skip(&self) -> u32 {
		self.skip
	}

	/// Presentation timestamp in ticks of [`BLOCKS_PER_PTS_TICK`] blocks
	pub fn pts(&self) -> u64 {
		self.pts
	}

	/// Presentation timestamp in microseconds
	pub fn pts_us(&self) -> u64 {
		self.pts * PTS_TICK_US
	}
}

/// The per-frame layout table of an opened APE stream, ordered by frame index
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameTable {
	pub(crate) entries: Vec<FrameEntry>,
}

impl FrameTable {
	/// Reads the seek table and derives the full frame layout
	pub(crate) fn build<R>(data: &mut R, info: &StreamInfo) -> Result<FrameTable>
	where
		R: Read + Seek,
	{
		let total_frames = info.total_frames as usize;

		let seek_table = read_seek_table(data, info)?;
		if total_frames > 1 && seek_table.len() < total_frames {
			err!(TruncatedSeekTable);
		}

		let mut entries = Vec::new();
		entries
			.try_reserve_exact(total_frames)
			.map_err(ApeError::from)?;

		let first_pos = u64::from(info.descriptor_len)
			+ u64::from(info.header_len)
			+ u64::from(info.seek_table_len)
			+ u64::from(info.wav_header_len);

		entries.push(FrameEntry {
			pos: first_pos,
			size: 0,
			nblocks: info.blocks_per_frame,
			skip: 0,
			pts: 0,
		});

		let pts_per_frame = u64::from(info.blocks_per_frame / BLOCKS_PER_PTS_TICK);

		for i in 1..total_frames {
			let pos = u64::from(seek_table[i]);
			let prev = entries[i - 1];

			// A non-increasing offset would produce a negative frame size
			if pos <= prev.pos {
				err!(SizeMismatch);
			}

			entries[i - 1].size = (pos - prev.pos) as u32;
			entries.push(FrameEntry {
				pos,
				size: 0,
				nblocks: info.blocks_per_frame,
				skip: ((pos - first_pos) & 3) as u32,
				pts: prev.pts + pts_per_frame,
			});
		}

		// The final frame has no following offset; its size spans the remainder
		// of the audio data, with `final_frame_blocks * 8` as the fallback when
		// the stream length gives a nonsensical answer
		let file_len = data.stream_len_hack()?;
		let last = total_frames - 1;

		let mut final_size = 0i64;
		if file_len > 0 {
			final_size =
				file_len as i64 - entries[last].pos as i64 - i64::from(info.wav_tail_len);
			final_size -= final_size & 3;
		}
		if final_size <= 0 {
			final_size = i64::from(info.final_frame_blocks) * 8;
		}

		entries[last].size = final_size as u32;
		entries[last].nblocks = info.final_frame_blocks;

		// Align each frame to the 4-byte boundary preceding its seek table
		// offset; the dropped bytes are announced to the decoder via `skip`
		for entry in &mut entries {
			if entry.skip != 0 {
				entry.pos -= u64::from(entry.skip);
				entry.size += entry.skip;
			}
			entry.size = (entry.size + 3) & !3;
		}

		Ok(FrameTable { entries })
	}

	/// Number of frames in the table
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether the table contains any frames
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// The layout of frame `index`, if it exists
	pub fn get(&self, index: usize) -> Option<&FrameEntry> {
		self.entries.get(index)
	}

	/// Iterate the table in playback order
	pub fn iter(&self) -> std::slice::Iter<'_, FrameEntry> {
		self.entries.iter()
	}

	/// The size of the largest frame, for sizing read buffers
	pub fn max_frame_size(&self) -> u32 {
		self.entries.iter().map(|entry| entry.size).max().unwrap_or(0)
	}

	/// Resolves a seek time to a frame index
	///
	/// Returns the index of the first frame presented at or after `time_us`.
	/// If the target lies beyond the last frame, the returned index is one past
	/// the end of the table, which a [`FrameReader`](crate::demux::FrameReader)
	/// treats as end of stream.
	///
	/// Timestamps increase monotonically with the frame index, so a binary
	/// search is sufficient.
	pub fn frame_for_time(&self, time_us: u64) -> usize {
		self.entries
			.partition_point(|entry| entry.pts_us() < time_us)
	}
}

fn read_seek_table<R>(data: &mut R, info: &StreamInfo) -> Result<Vec<u32>>
where
	R: Read + Seek,
{
	if info.seek_table_len == 0 {
		return Ok(Vec::new());
	}

	let mut seek_table = try_vec![0u32; (info.seek_table_len / 4) as usize];

	data.seek(SeekFrom::Start(info.seek_table_offset))?;
	data.read_u32_into::<LittleEndian>(&mut seek_table)
		.map_err(|_| ApeError::new(ErrorKind::TruncatedSeekTable))?;

	Ok(seek_table)
}
