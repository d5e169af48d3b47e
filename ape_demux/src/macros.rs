macro_rules! try_vec {
	($elem:expr; $size:expr) => {{ $crate::util::alloc::fallible_vec_from_element($elem, $size)? }};
}

// Shorthand for return Err(ApeError::new(ErrorKind::Foo))
//
// Usage:
// - err!(Variant)        -> return Err(ApeError::new(ErrorKind::Variant))
// - err!(Variant(value)) -> return Err(ApeError::new(ErrorKind::Variant(value)))
macro_rules! err {
	($variant:ident) => {
		return Err(crate::error::ApeError::new(
			crate::error::ErrorKind::$variant,
		))
	};
	($variant:ident($value:expr)) => {
		return Err(crate::error::ApeError::new(
			crate::error::ErrorKind::$variant($value),
		))
	};
}

// Shorthand for ApeError::new(ErrorKind::Decoding("Message"))
//
// Usage:
//
// - decode_err!(Message)
//
// or bail:
//
// - decode_err!(@BAIL Message)
macro_rules! decode_err {
	($reason:literal) => {
		crate::error::ApeError::new(crate::error::ErrorKind::Decoding($reason))
	};
	(@BAIL $reason:literal) => {
		return Err(decode_err!($reason))
	};
}

pub(crate) use {decode_err, err, try_vec};
