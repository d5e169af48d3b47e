//! MAC header parsing
//!
//! The header region of an APE file comes in two incompatible layouts: versions
//! 3980 and later carry a fixed descriptor declaring the length of every section,
//! while older versions pack everything into a single flag-dependent header.
//! Both are normalized into a [`StreamInfo`].

use crate::error::{ApeError, ErrorKind, Result};
use crate::macros::{decode_err, err, try_vec};

use std::io::{Read, Seek, SeekFrom};

use byteorder::{LittleEndian, ReadBytesExt};

pub(crate) const APE_MIN_VERSION: u16 = 3800;
pub(crate) const APE_MAX_VERSION: u16 = 3990;

// Format flag bits, pre-3980 layout
const MAC_FLAG_8_BIT: u16 = 1;
const MAC_FLAG_HAS_PEAK_LEVEL: u16 = 4;
const MAC_FLAG_24_BIT: u16 = 8;
const MAC_FLAG_HAS_SEEK_ELEMENTS: u16 = 16;
const MAC_FLAG_CREATE_WAV_HEADER: u16 = 32;

/// Normalized MAC stream parameters
///
/// Built once at open time and immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[non_exhaustive]
pub struct StreamInfo {
	pub(crate) version: u16,
	pub(crate) compression_type: u16,
	pub(crate) format_flags: u16,
	pub(crate) blocks_per_frame: u32,
	pub(crate) final_frame_blocks: u32,
	pub(crate) total_frames: u32,
	pub(crate) bits_per_sample: u16,
	pub(crate) channels: u16,
	pub(crate) sample_rate: u32,

	// Section geometry, used to locate the seek table and frame 0
	pub(crate) descriptor_len: u32,
	pub(crate) header_len: u32,
	pub(crate) seek_table_len: u32,
	pub(crate) wav_header_len: u32,
	pub(crate) wav_tail_len: u32,
	/// Absolute file offset of the seek table
	pub(crate) seek_table_offset: u64,
}

impl StreamInfo {
	/// MAC stream version (3800..=3990)
	pub fn version(&self) -> u16 {
		self.version
	}

	/// Compression type/level
	pub fn compression_type(&self) -> u16 {
		self.compression_type
	}

	/// Raw format flag bits
	pub fn format_flags(&self) -> u16 {
		self.format_flags
	}

	/// Number of audio blocks in every frame but the last
	pub fn blocks_per_frame(&self) -> u32 {
		self.blocks_per_frame
	}

	/// Number of audio blocks in the final frame
	pub fn final_frame_blocks(&self) -> u32 {
		self.final_frame_blocks
	}

	/// Total number of frames in the stream
	pub fn total_frames(&self) -> u32 {
		self.total_frames
	}

	/// Bits per sample
	pub fn bits_per_sample(&self) -> u16 {
		self.bits_per_sample
	}

	/// Channel count
	pub fn channels(&self) -> u16 {
		self.channels
	}

	/// Sample rate (Hz)
	pub fn sample_rate(&self) -> u32 {
		self.sample_rate
	}
}

/// Reads the descriptor (3980+) and header region into a [`StreamInfo`]
///
/// The reader is expected to be positioned anywhere; all reads are absolute.
pub(crate) fn read_stream_info<R>(data: &mut R) -> Result<StreamInfo>
where
	R: Read + Seek,
{
	data.seek(SeekFrom::Start(4))?;

	let version = data
		.read_u16::<LittleEndian>()
		.map_err(|_| decode_err!("Unable to read MAC stream version"))?;

	if !(APE_MIN_VERSION..=APE_MAX_VERSION).contains(&version) {
		err!(UnsupportedVersion(version));
	}

	// Header layout differs between versions
	let info = if version >= 3980 {
		header_gt_3980(data, version)?
	} else {
		header_lt_3980(data, version)?
	};

	verify(&info)?;

	log::debug!(
		"APE: version {}, {} frames, {} blocks/frame, {}Hz/{}ch/{}bit",
		info.version,
		info.total_frames,
		info.blocks_per_frame,
		info.sample_rate,
		info.channels,
		info.bits_per_sample
	);

	Ok(info)
}

fn header_gt_3980<R>(data: &mut R, version: u16) -> Result<StreamInfo>
where
	R: Read + Seek,
{
	// The descriptor declares the length of every section that follows
	let mut descriptor = [0; 46];
	data.read_exact(&mut descriptor)
		.map_err(|_| ApeError::new(ErrorKind::TruncatedHeader))?;

	let mut info = StreamInfo {
		version,
		descriptor_len: u32::from_le_bytes(
			descriptor[2..6].try_into().unwrap(), // Infallible
		),
		header_len: u32::from_le_bytes(descriptor[6..10].try_into().unwrap()),
		seek_table_len: u32::from_le_bytes(descriptor[10..14].try_into().unwrap()),
		wav_header_len: u32::from_le_bytes(descriptor[14..18].try_into().unwrap()),
		wav_tail_len: u32::from_le_bytes(descriptor[26..30].try_into().unwrap()),
		..StreamInfo::default()
	};

	// The header fields span 24 bytes; a shorter declared length cannot hold them
	if info.header_len < 24 {
		err!(TruncatedHeader);
	}

	data.seek(SeekFrom::Start(u64::from(info.descriptor_len)))?;

	let mut header = try_vec![0; info.header_len as usize];
	data.read_exact(&mut header)
		.map_err(|_| ApeError::new(ErrorKind::TruncatedHeader))?;

	info.compression_type = u16::from_le_bytes(header[0..2].try_into().unwrap());
	info.format_flags = u16::from_le_bytes(header[2..4].try_into().unwrap());
	info.blocks_per_frame = u32::from_le_bytes(header[4..8].try_into().unwrap());
	info.final_frame_blocks = u32::from_le_bytes(header[8..12].try_into().unwrap());
	info.total_frames = u32::from_le_bytes(header[12..16].try_into().unwrap());
	info.bits_per_sample = u16::from_le_bytes(header[16..18].try_into().unwrap());
	info.channels = u16::from_le_bytes(header[18..20].try_into().unwrap());
	info.sample_rate = u32::from_le_bytes(header[20..24].try_into().unwrap());

	info.seek_table_offset = u64::from(info.descriptor_len) + u64::from(info.header_len);

	Ok(info)
}

fn header_lt_3980<R>(data: &mut R, version: u16) -> Result<StreamInfo>
where
	R: Read,
{
	// Versions < 3980 don't have a descriptor. The 34 bytes after the version
	// cover the fixed fields plus the two optional trailing fields.
	let mut header = [0; 34];
	data.read_exact(&mut header)
		.map_err(|_| ApeError::new(ErrorKind::TruncatedHeader))?;

	let mut info = StreamInfo {
		version,
		descriptor_len: 0,
		header_len: 32,
		compression_type: u16::from_le_bytes(header[0..2].try_into().unwrap()),
		format_flags: u16::from_le_bytes(header[2..4].try_into().unwrap()),
		channels: u16::from_le_bytes(header[4..6].try_into().unwrap()),
		sample_rate: u32::from_le_bytes(header[6..10].try_into().unwrap()),
		wav_header_len: u32::from_le_bytes(header[10..14].try_into().unwrap()),
		wav_tail_len: u32::from_le_bytes(header[14..18].try_into().unwrap()),
		total_frames: u32::from_le_bytes(header[18..22].try_into().unwrap()),
		final_frame_blocks: u32::from_le_bytes(header[22..26].try_into().unwrap()),
		..StreamInfo::default()
	};

	let has_peak_level = info.format_flags & MAC_FLAG_HAS_PEAK_LEVEL != 0;
	if has_peak_level {
		info.header_len += 4;
	}

	if info.format_flags & MAC_FLAG_HAS_SEEK_ELEMENTS != 0 {
		// The stored value is a count of 32-bit seek elements, and its position
		// depends on whether the peak level field was present before it
		let seek_elements = if has_peak_level {
			u32::from_le_bytes(header[30..34].try_into().unwrap())
		} else {
			u32::from_le_bytes(header[26..30].try_into().unwrap())
		};

		info.seek_table_len = seek_elements.saturating_mul(4);
		info.header_len += 4;
	} else {
		info.seek_table_len = info.total_frames.saturating_mul(4);
	}

	if info.format_flags & MAC_FLAG_8_BIT != 0 {
		info.bits_per_sample = 8;
	} else if info.format_flags & MAC_FLAG_24_BIT != 0 {
		info.bits_per_sample = 24;
	} else {
		info.bits_per_sample = 16;
	}

	info.blocks_per_frame = match version {
		_ if version >= 3950 => 73728 * 4,
		_ if version >= 3900 || (version >= 3800 && info.compression_type >= 4000) => 73728,
		_ => 9216,
	};

	// The header region starts after the 6-byte magic/version preamble
	info.seek_table_offset = 6 + u64::from(info.header_len);
	if info.format_flags & MAC_FLAG_CREATE_WAV_HEADER != 0 {
		info.seek_table_offset += u64::from(info.wav_header_len);
	}

	Ok(info)
}

/// Verifies the channel count falls within the format's limits, and we have some audio frames to work with.
fn verify(info: &StreamInfo) -> Result<()> {
	if !(1..=32).contains(&info.channels) {
		decode_err!(@BAIL "File has an invalid channel count (must be between 1 and 32 inclusive)");
	}

	if info.total_frames == 0 {
		decode_err!(@BAIL "File contains no frames");
	}

	if info.blocks_per_frame == 0 {
		decode_err!(@BAIL "File has an invalid block count per frame");
	}

	Ok(())
}
