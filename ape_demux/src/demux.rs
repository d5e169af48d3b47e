//! Sequential frame reading
//!
//! A [`FrameReader`] walks the frame table in playback order, handing out one
//! undecoded frame per call. The frame table itself is shared and read-only;
//! the reader's only state is its cursor, so any number of readers can demux
//! the same opened file independently.

use crate::error::Result;
use crate::frames::FrameTable;
use crate::macros::try_vec;

use std::io::{ErrorKind as IoErrorKind, Read, Seek, SeekFrom};
use std::sync::Arc;

/// Size of the synthetic header prepended to every demuxed frame
pub const FRAME_HEADER_SIZE: usize = 8;

/// A single demuxed frame
///
/// The payload is prefixed with an 8-byte synthetic header carrying
/// `(nblocks, skip)` as two little-endian `u32`s, the per-frame parameters a
/// downstream decoder needs alongside the raw bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
	data: Vec<u8>,
	pts_us: u64,
	index: usize,
}

impl Frame {
	/// The synthetic header followed by the raw frame payload
	pub fn data(&self) -> &[u8] {
		&self.data
	}

	/// Consumes the frame, returning its composed buffer
	pub fn into_data(self) -> Vec<u8> {
		self.data
	}

	/// Presentation timestamp in microseconds
	pub fn pts_us(&self) -> u64 {
		self.pts_us
	}

	/// Index of this frame in the frame table
	pub fn index(&self) -> usize {
		self.index
	}
}

/// A stateful sequential reader over the frame table
///
/// Created through [`ApeFile::frame_reader`](crate::ApeFile::frame_reader).
/// The cursor starts at frame 0 and advances by one per successful read;
/// sharing a reader across threads requires external synchronization.
pub struct FrameReader<R> {
	reader: R,
	frames: Arc<FrameTable>,
	current_frame: usize,
}

impl<R> FrameReader<R>
where
	R: Read + Seek,
{
	pub(crate) fn new(frames: Arc<FrameTable>, reader: R) -> Self {
		Self {
			reader,
			frames,
			current_frame: 0,
		}
	}

	/// The index of the frame the next read will return
	pub fn current_frame(&self) -> usize {
		self.current_frame
	}

	/// Moves the cursor to the first frame presented at or after `time_us`
	///
	/// Seeking beyond the last frame parks the cursor at end of stream.
	pub fn seek(&mut self, time_us: u64) {
		self.current_frame = self.frames.frame_for_time(time_us);
	}

	/// Reads the frame under the cursor and advances
	///
	/// Returns `Ok(None)` at end of stream. A frame that extends past the end
	/// of the reader also ends the stream rather than failing it: a truncated
	/// trailing frame should not invalidate everything before it.
	pub fn next_frame(&mut self) -> Result<Option<Frame>> {
		let Some(entry) = self.frames.get(self.current_frame).copied() else {
			return Ok(None);
		};

		let mut data = try_vec![0; FRAME_HEADER_SIZE + entry.size() as usize];
		data[..4].copy_from_slice(&entry.nblocks().to_le_bytes());
		data[4..8].copy_from_slice(&entry.skip().to_le_bytes());

		self.reader.seek(SeekFrom::Start(entry.pos()))?;
		if let Err(e) = self.reader.read_exact(&mut data[FRAME_HEADER_SIZE..]) {
			if e.kind() != IoErrorKind::UnexpectedEof {
				return Err(e.into());
			}

			log::warn!(
				"APE: Frame {} extends past the end of the stream, ending early",
				self.current_frame
			);
			self.current_frame = self.frames.len();
			return Ok(None);
		}

		let frame = Frame {
			data,
			pts_us: entry.pts_us(),
			index: self.current_frame,
		};
		self.current_frame += 1;

		Ok(Some(frame))
	}

	/// Reads one frame, optionally seeking first
	///
	/// Equivalent to [`seek`](FrameReader::seek) (when a time is given)
	/// followed by [`next_frame`](FrameReader::next_frame).
	pub fn read_frame(&mut self, seek_to_us: Option<u64>) -> Result<Option<Frame>> {
		if let Some(time_us) = seek_to_us {
			self.seek(time_us);
		}

		self.next_frame()
	}
}

#[cfg(test)]
mod tests {
	use super::{FRAME_HEADER_SIZE, FrameReader};
	use crate::frames::{FrameEntry, FrameTable};

	use std::io::Cursor;
	use std::sync::Arc;

	// Two 8-byte frames at offsets 16 and 24, one pts tick apart
	fn table() -> Arc<FrameTable> {
		Arc::new(FrameTable {
			entries: vec![
				FrameEntry { pos: 16, size: 8, nblocks: 9216, skip: 0, pts: 0 },
				FrameEntry { pos: 24, size: 8, nblocks: 4608, skip: 3, pts: 2 },
			],
		})
	}

	fn source(len: usize) -> Cursor<Vec<u8>> {
		Cursor::new((0..len).map(|b| b as u8).collect())
	}

	#[test_log::test]
	fn frames_carry_synthetic_headers() {
		let mut reader = FrameReader::new(table(), source(32));

		let frame = reader.next_frame().unwrap().unwrap();
		assert_eq!(frame.index(), 0);
		assert_eq!(frame.pts_us(), 0);
		assert_eq!(&frame.data()[..4], 9216u32.to_le_bytes());
		assert_eq!(&frame.data()[4..8], 0u32.to_le_bytes());
		assert_eq!(&frame.data()[FRAME_HEADER_SIZE..], &[16, 17, 18, 19, 20, 21, 22, 23]);

		let frame = reader.next_frame().unwrap().unwrap();
		assert_eq!(frame.index(), 1);
		assert_eq!(frame.pts_us(), 200_000);
		assert_eq!(&frame.data()[..4], 4608u32.to_le_bytes());
		assert_eq!(&frame.data()[4..8], 3u32.to_le_bytes());

		assert!(reader.next_frame().unwrap().is_none());
		assert!(reader.next_frame().unwrap().is_none());
	}

	#[test_log::test]
	fn short_read_ends_the_stream() {
		// The second frame wants bytes [24, 32), but the source stops at 28
		let mut reader = FrameReader::new(table(), source(28));

		assert!(reader.next_frame().unwrap().is_some());
		assert!(reader.next_frame().unwrap().is_none());
		assert_eq!(reader.current_frame(), 2);
	}

	#[test_log::test]
	fn seek_moves_the_cursor() {
		let mut reader = FrameReader::new(table(), source(32));

		reader.seek(200_000);
		assert_eq!(reader.current_frame(), 1);

		let frame = reader.read_frame(None).unwrap().unwrap();
		assert_eq!(frame.index(), 1);

		// Past the end parks at end of stream
		let frame = reader.read_frame(Some(u64::MAX)).unwrap();
		assert!(frame.is_none());

		// A rewind makes the stream readable again
		let frame = reader.read_frame(Some(0)).unwrap().unwrap();
		assert_eq!(frame.index(), 0);
	}
}
