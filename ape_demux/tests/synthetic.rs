//! End-to-end tests against synthetic APE files built in memory

use ape_demux::config::ParseOptions;
use ape_demux::error::ErrorKind;
use ape_demux::{ApeFile, read_from, read_from_path};

use std::io::{self, Cursor, Read, Seek, SeekFrom, Write as _};

fn put_u16(buf: &mut [u8], offset: usize, value: u16) {
	buf[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

fn put_u32(buf: &mut [u8], offset: usize, value: u32) {
	buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

fn tag_preamble(item_count: u32, tag_size: u32) -> Vec<u8> {
	let mut block = vec![0u8; 32];
	block[..8].copy_from_slice(b"APETAGEX");
	put_u32(&mut block, 8, 2000);
	put_u32(&mut block, 12, tag_size);
	put_u32(&mut block, 16, item_count);

	block
}

fn tag_item(key: &str, value: &str) -> Vec<u8> {
	let mut item = Vec::new();
	item.extend_from_slice(&(value.len() as u32).to_le_bytes());
	item.extend_from_slice(&0u32.to_le_bytes());
	item.extend_from_slice(key.as_bytes());
	item.push(0);
	item.extend_from_slice(value.as_bytes());

	item
}

// A header + items + footer APEv2 tag with a Title and an Artist, 99 bytes total
fn ape_tag() -> Vec<u8> {
	let mut items = tag_item("Title", "Foo");
	items.extend_from_slice(&tag_item("Artist", "Bar"));

	let tag_size = (items.len() + 32) as u32;

	let mut tag = tag_preamble(2, tag_size);
	tag.extend_from_slice(&items);
	tag.extend_from_slice(&tag_preamble(2, tag_size));

	tag
}

// A version-3980 file: 52-byte descriptor, 24-byte header, 3-entry seek
// table, three frames at offsets 88/100/116 (12, 16, and 20 bytes), and an
// APE tag declared as wav-tail data so it stays out of the final frame.
fn synthetic_file() -> Vec<u8> {
	let tag = ape_tag();

	let mut data = vec![0u8; 88];
	data[..4].copy_from_slice(b"MAC ");
	put_u16(&mut data, 4, 3980);

	// Descriptor (fields start at offset 8)
	put_u32(&mut data, 8, 52); // descriptor length
	put_u32(&mut data, 12, 24); // header length
	put_u32(&mut data, 16, 12); // seek table length
	put_u32(&mut data, 20, 0); // wav header length
	put_u32(&mut data, 32, tag.len() as u32); // wav tail length

	// Header
	put_u16(&mut data, 52, 2000); // compression type
	put_u16(&mut data, 54, 0); // format flags
	put_u32(&mut data, 56, 9216); // blocks per frame
	put_u32(&mut data, 60, 4608); // final frame blocks
	put_u32(&mut data, 64, 3); // total frames
	put_u16(&mut data, 68, 16); // bits per sample
	put_u16(&mut data, 70, 2); // channels
	put_u32(&mut data, 72, 44100); // sample rate

	// Seek table
	put_u32(&mut data, 76, 88);
	put_u32(&mut data, 80, 100);
	put_u32(&mut data, 84, 116);

	// Frame payloads, recognizable per frame
	data.extend(std::iter::repeat_n(0xF0, 12));
	data.extend(std::iter::repeat_n(0xF1, 16));
	data.extend(std::iter::repeat_n(0xF2, 20));

	data.extend_from_slice(&tag);

	data
}

fn open(data: Vec<u8>) -> ape_demux::error::Result<ApeFile> {
	read_from(&mut Cursor::new(data))
}

#[test]
fn stream_properties() {
	let ape = open(synthetic_file()).unwrap();
	let info = ape.stream_info();

	assert_eq!(info.version(), 3980);
	assert_eq!(info.compression_type(), 2000);
	assert_eq!(info.channels(), 2);
	assert_eq!(info.sample_rate(), 44100);
	assert_eq!(info.bits_per_sample(), 16);
	assert_eq!(info.total_frames(), 3);

	assert_eq!(ape.mime_type(), "audio/ape");
	// (2 * 9216 + 4608) blocks at 4608 blocks per 100ms tick
	assert_eq!(ape.duration_us(), 500_000);
	assert_eq!(ape.max_frame_size(), 20);
	assert_eq!(ape.extradata(), [0x8C, 0x0F, 0xD0, 0x07, 0x00, 0x00]);
}

#[test]
fn frame_table_tiles_the_audio_data() {
	let ape = open(synthetic_file()).unwrap();
	let table = ape.frame_table();

	assert_eq!(table.len(), 3);

	let mut previous_end = None;
	for entry in table.iter() {
		assert_eq!(entry.size() % 4, 0);
		assert!(entry.skip() <= 3);

		if let Some(end) = previous_end {
			assert_eq!(entry.pos() + u64::from(entry.skip()), end);
		}
		previous_end = Some(entry.pos() + u64::from(entry.size()));
	}
}

#[test]
fn demuxing_yields_every_frame() {
	let data = synthetic_file();
	let ape = open(data.clone()).unwrap();

	let mut reader = ape.frame_reader(Cursor::new(data.clone()));

	let expected = [(0u64, 12usize, 0xF0u8, 9216u32), (200_000, 16, 0xF1, 9216), (400_000, 20, 0xF2, 4608)];
	for (index, (pts_us, size, fill, nblocks)) in expected.iter().enumerate() {
		let frame = reader.next_frame().unwrap().unwrap();

		assert_eq!(frame.index(), index);
		assert_eq!(frame.pts_us(), *pts_us);
		assert_eq!(frame.data().len(), 8 + size);
		assert_eq!(&frame.data()[..4], nblocks.to_le_bytes());
		assert_eq!(&frame.data()[4..8], 0u32.to_le_bytes());
		assert!(frame.data()[8..].iter().all(|b| b == fill));
	}

	assert!(reader.next_frame().unwrap().is_none());
}

#[test]
fn seeking_lands_on_the_covering_frame() {
	let data = synthetic_file();
	let ape = open(data.clone()).unwrap();

	let mut reader = ape.frame_reader(Cursor::new(data));

	let frame = reader.read_frame(Some(350_000)).unwrap().unwrap();
	assert_eq!(frame.index(), 2);
	assert_eq!(frame.pts_us(), 400_000);

	// Next read runs off the end
	assert!(reader.next_frame().unwrap().is_none());

	// Independent readers don't share cursors
	let mut other = ape.frame_reader(Cursor::new(synthetic_file()));
	assert_eq!(other.next_frame().unwrap().unwrap().index(), 0);
}

#[test]
fn tags_are_extracted() {
	let ape = open(synthetic_file()).unwrap();
	let tag = ape.tag().unwrap();

	assert_eq!(tag.title.as_deref(), Some("Foo"));
	assert_eq!(tag.artist.as_deref(), Some("Bar"));
	assert_eq!(tag.album, None);
	assert_eq!(tag.year, None);
}

#[test]
fn tag_reading_can_be_disabled() {
	let mut reader = Cursor::new(synthetic_file());
	let ape = ApeFile::read_from(&mut reader, ParseOptions::new().read_tags(false)).unwrap();

	assert!(ape.tag().is_none());
	assert_eq!(ape.frame_table().len(), 3);
}

// A reader that serves everything below `readable_end` but refuses to read
// past it, as a drive with a bad sector near the end of the file would
struct TailFailingReader {
	inner: Cursor<Vec<u8>>,
	readable_end: u64,
}

impl Read for TailFailingReader {
	fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
		if self.inner.position() + buf.len() as u64 > self.readable_end {
			return Err(io::Error::new(io::ErrorKind::PermissionDenied, "tail read failed"));
		}

		self.inner.read(buf)
	}
}

impl Seek for TailFailingReader {
	fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
		self.inner.seek(pos)
	}
}

#[test]
fn unreadable_tag_does_not_abort_the_open() {
	// Everything up to the end of the seek table is readable; the tag scan at
	// the tail hits an I/O error and must be given up on, not propagated
	let mut reader = TailFailingReader {
		inner: Cursor::new(synthetic_file()),
		readable_end: 88,
	};

	let ape = ApeFile::read_from(&mut reader, ParseOptions::new()).unwrap();

	assert!(ape.tag().is_none());
	assert_eq!(ape.stream_info().total_frames(), 3);
	assert_eq!(ape.frame_table().len(), 3);
}

#[test]
fn unknown_magic_is_rejected() {
	let mut data = synthetic_file();
	data[..4].copy_from_slice(b"fLaC");

	match open(data) {
		Err(e) => assert!(matches!(e.kind(), ErrorKind::UnknownFormat)),
		Ok(_) => panic!("non-MAC data should not open"),
	}
}

#[test]
fn truncated_seek_table_aborts_the_open() {
	let mut data = synthetic_file();
	data.truncate(82); // mid seek table

	match open(data) {
		Err(e) => assert!(matches!(e.kind(), ErrorKind::TruncatedSeekTable)),
		Ok(_) => panic!("a truncated file should not open"),
	}
}

#[test]
fn truncated_final_frame_degrades_to_end_of_stream() {
	let mut data = synthetic_file();
	// Keep the layout intact but hand the reader a source that ends mid-frame 2
	let ape = open(data.clone()).unwrap();
	data.truncate(120);

	let mut reader = ape.frame_reader(Cursor::new(data));
	assert!(reader.next_frame().unwrap().is_some());
	assert!(reader.next_frame().unwrap().is_some());
	assert!(reader.next_frame().unwrap().is_none());
}

#[test]
fn read_from_a_path() {
	let mut file = tempfile::NamedTempFile::new().unwrap();
	file.write_all(&synthetic_file()).unwrap();
	file.flush().unwrap();

	let ape = read_from_path(file.path()).unwrap();
	assert_eq!(ape.stream_info().total_frames(), 3);
	assert_eq!(ape.tag().unwrap().title.as_deref(), Some("Foo"));
}
