use crate::error::Result;
use crate::macros::err;

/// The hard cap on any single length-prefixed allocation.
///
/// Seek tables, tag buffers, and frame payloads are all sized by fields read
/// from the file, which cannot be trusted. Anything larger than this is
/// rejected with `ErrorKind::TooMuchData` before touching the allocator.
pub(crate) const ALLOCATION_LIMIT: usize = 16 * 1024 * 1024;

/// Creates a `Vec` of the specified length, containing copies of `element`.
///
/// This should be used through [`try_vec!`](crate::macros::try_vec)
pub(crate) fn fallible_vec_from_element<T>(element: T, expected_size: usize) -> Result<Vec<T>>
where
	T: Clone,
{
	if expected_size > ALLOCATION_LIMIT {
		err!(TooMuchData);
	}

	let mut v = Vec::new();
	v.try_reserve_exact(expected_size)?;
	v.resize(expected_size, element);

	Ok(v)
}
