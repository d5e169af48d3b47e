//! APE tag extraction
//!
//! APE tags live at the end of the file: a 32-byte footer (and usually a
//! matching 32-byte header) bracketing a list of length-prefixed key/value
//! items. Only a small fixed set of text items is retained; everything else,
//! including binary items, is skipped. Tags are cosmetic, so nothing in here
//! is a hard error -- a file without a recognizable tag simply yields `None`.

use crate::config::ParseOptions;
use crate::error::Result;
use crate::macros::try_vec;
use crate::util::io::SeekStreamLen;

use std::io::{Read, Seek, SeekFrom};

pub(crate) const APE_PREAMBLE: [u8; 8] = *b"APETAGEX";

/// The tag footer (and optional header) are each exactly 32 bytes
const PREAMBLE_BLOCK_SIZE: u64 = 32;

/// The recognized text items of an APE tag
///
/// Unrecognized keys are discarded while scanning; a field is `None` when the
/// tag carried no item under that key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct ApeTag {
	/// Value of the `Title` item
	pub title: Option<String>,
	/// Value of the `Artist` item
	pub artist: Option<String>,
	/// Value of the `Album` item
	pub album: Option<String>,
	/// Value of the `Year` item
	pub year: Option<String>,
}

impl ApeTag {
	/// Whether any recognized item was found
	pub fn is_empty(&self) -> bool {
		self.title.is_none() && self.artist.is_none() && self.album.is_none() && self.year.is_none()
	}
}

/// Searches the tail of the reader for an APE tag and extracts its recognized items
///
/// The backward preamble scan is bounded by [`ParseOptions::max_tag_search`];
/// a file with no preamble in that window yields `Ok(None)`.
pub(crate) fn read_ape_tag<R>(data: &mut R, options: ParseOptions) -> Result<Option<ApeTag>>
where
	R: Read + Seek,
{
	let file_len = data.stream_len_hack()?;
	if file_len <= PREAMBLE_BLOCK_SIZE {
		return Ok(None);
	}

	// The earliest possible preamble position is scanned last; position 0 is
	// never scanned since that is the MAC header itself
	let scan_top = file_len - PREAMBLE_BLOCK_SIZE - 1;
	let scan_floor = scan_top.saturating_sub(options.max_tag_search).max(1);
	if scan_top < scan_floor {
		return Ok(None);
	}

	// One read covers every candidate position in [scan_floor, scan_top]
	let window_len = (scan_top - scan_floor) as usize + APE_PREAMBLE.len();
	let mut window = try_vec![0; window_len];

	data.seek(SeekFrom::Start(scan_floor))?;
	data.read_exact(&mut window)?;

	let Some(relative_start) = window
		.windows(APE_PREAMBLE.len())
		.rposition(|candidate| candidate == APE_PREAMBLE)
	else {
		log::warn!("APE: No tag preamble found within the last {} bytes", options.max_tag_search);
		return Ok(None);
	};

	let tag_start = scan_floor + relative_start as u64;
	let tag_size = (file_len - tag_start) as usize;

	let mut tag_data = try_vec![0; tag_size];
	data.seek(SeekFrom::Start(tag_start))?;
	data.read_exact(&mut tag_data)?;

	Ok(Some(parse_items(&tag_data)))
}

/// Walks the items following a 32-byte preamble block
///
/// Every offset is validated against the buffer before use; a malformed item
/// ends the walk with whatever was recognized up to that point.
fn parse_items(tag_data: &[u8]) -> ApeTag {
	let mut tag = ApeTag::default();

	let item_count = u32::from_le_bytes(
		tag_data[16..20].try_into().unwrap(), // Infallible, the preamble block is 33+ bytes
	);

	let mut position = PREAMBLE_BLOCK_SIZE as usize;
	for _ in 0..item_count {
		// Value length (4) + item flags (4)
		let Some(value_length_raw) = tag_data.get(position..position + 4) else {
			break;
		};
		let value_length = u32::from_le_bytes(
			value_length_raw.try_into().unwrap(), // Infallible
		) as usize;
		position += 8;

		// The key runs up to a NUL terminator
		let Some(key_length) = tag_data
			.get(position..)
			.and_then(|rest| rest.iter().position(|&b| b == 0))
		else {
			break;
		};
		let key = &tag_data[position..position + key_length];

		let value_start = position + key_length + 1;
		let Some(value) = value_start
			.checked_add(value_length)
			.and_then(|value_end| tag_data.get(value_start..value_end))
		else {
			break;
		};
		position = value_start + value_length;

		// Binary or otherwise non-UTF-8 values can't populate the recognized fields
		let Ok(value) = std::str::from_utf8(value) else {
			continue;
		};

		match key {
			b"Title" => tag.title = Some(value.to_owned()),
			b"Artist" => tag.artist = Some(value.to_owned()),
			b"Album" => tag.album = Some(value.to_owned()),
			b"Year" => tag.year = Some(value.to_owned()),
			_ => {},
		}
	}

	tag
}
