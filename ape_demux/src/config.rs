//! Options to control how a file is parsed

/// Options to control how an APE file is parsed
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct ParseOptions {
	pub(crate) read_properties: bool,
	pub(crate) read_tags: bool,
	pub(crate) max_tag_search: u64,
}

impl Default for ParseOptions {
	/// The default implementation for `ParseOptions`
	///
	/// The defaults are as follows:
	///
	/// ```rust,ignore
	/// ParseOptions {
	/// 	read_properties: true,
	/// 	read_tags: true,
	/// 	max_tag_search: 65536,
	/// }
	/// ```
	fn default() -> Self {
		Self::new()
	}
}

impl ParseOptions {
	/// Default number of bytes searched backwards for an APE tag preamble
	pub const DEFAULT_MAX_TAG_SEARCH: u64 = 65536;

	/// Creates a new `ParseOptions`, alias for `Default` implementation
	///
	/// See also: [`ParseOptions::default`]
	///
	/// # Examples
	///
	/// ```rust
	/// use ape_demux::config::ParseOptions;
	///
	/// let parsing_options = ParseOptions::new();
	/// ```
	#[must_use]
	pub const fn new() -> Self {
		Self {
			read_properties: true,
			read_tags: true,
			max_tag_search: Self::DEFAULT_MAX_TAG_SEARCH,
		}
	}

	/// Whether or not to build the frame layout table
	///
	/// Skipping it leaves the opened file with no demuxable frames, which only makes
	/// sense when the caller is interested in tags alone.
	///
	/// # Examples
	///
	/// ```rust
	/// use ape_demux::config::ParseOptions;
	///
	/// // By default, `read_properties` is enabled. Here, we don't want to read them.
	/// let parsing_options = ParseOptions::new().read_properties(false);
	/// ```
	pub fn read_properties(&mut self, read_properties: bool) -> Self {
		self.read_properties = read_properties;
		*self
	}

	/// Whether or not to search for an APE tag at the end of the file
	///
	/// # Examples
	///
	/// ```rust
	/// use ape_demux::config::ParseOptions;
	///
	/// // By default, `read_tags` is enabled. Here, we don't want to read them.
	/// let parsing_options = ParseOptions::new().read_tags(false);
	/// ```
	pub fn read_tags(&mut self, read_tags: bool) -> Self {
		self.read_tags = read_tags;
		*self
	}

	/// The number of bytes to search backwards for an APE tag preamble
	///
	/// The tag scan walks backwards from the end of the file looking for `"APETAGEX"`.
	/// Without a bound, a file with no tag would be scanned in its entirety, so the
	/// scan gives up after this many bytes and reports no tags.
	///
	/// # Examples
	///
	/// ```rust
	/// use ape_demux::config::ParseOptions;
	///
	/// // Only look at the last 1024 bytes of the file
	/// let parsing_options = ParseOptions::new().max_tag_search(1024);
	/// ```
	pub fn max_tag_search(&mut self, max_tag_search: u64) -> Self {
		self.max_tag_search = max_tag_search;
		*self
	}
}
