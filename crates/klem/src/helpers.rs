//! Small helper functions and types used throughout the crate.

pub(crate) mod linear_transform;

use crate::{IntVal, NonZeroIntVal};

/// Integer division that rounds towards positive infinity.
pub(crate) fn div_ceil(a: IntVal, b: NonZeroIntVal) -> IntVal {
	let b = b.get();
	let d = a / b;
	let r = a % b;
	if (r > 0 && b > 0) || (r < 0 && b < 0) {
		d + 1
	} else {
		d
	}
}

/// Integer division that rounds towards negative infinity.
pub(crate) fn div_floor(a: IntVal, b: NonZeroIntVal) -> IntVal {
	let b = b.get();
	let d = a / b;
	let r = a % b;
	if (r > 0 && b < 0) || (r < 0 && b > 0) {
		d - 1
	} else {
		d
	}
}
