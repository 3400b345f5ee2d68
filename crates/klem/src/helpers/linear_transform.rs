//! Methods to perform linear transformations.

use std::ops::{Add, Mul, Neg};

use crate::{
	helpers::{div_ceil, div_floor},
	solver::engine::int_var::IntCondition,
	IntVal, NonZeroIntVal,
};

/// The multiplicative identity as a non-zero value.
const ONE: NonZeroIntVal = match NonZeroIntVal::new(1) {
	Some(one) => one,
	None => unreachable!(),
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// An integer linear transformation of a discrete value.
///
/// The transformation will take a discrete value `x` and transform it to `scale
/// * x + offset`. The transformation can also be reversed.
pub(crate) struct LinearTransform {
	/// The multiplicative scale.
	pub(crate) scale: NonZeroIntVal,
	/// The additive offset.
	pub(crate) offset: IntVal,
}

impl LinearTransform {
	/// Creates a new linear transformation with the given offset and no scale.
	pub(crate) fn offset(offset: IntVal) -> Self {
		Self { scale: ONE, offset }
	}

	/// Return whether the scale applied by the linear transformation is positive.
	pub(crate) fn positive_scale(&self) -> bool {
		self.scale.get() > 0
	}

	/// Returns whether a value remains an integer after reversing the transformation.
	pub(crate) fn rev_remains_integer(&self, val: IntVal) -> bool {
		(val - self.offset) % self.scale.get() == 0
	}

	/// Perform the reverse linear transformation on a value.
	pub(crate) fn rev_transform(&self, val: IntVal) -> IntVal {
		(val - self.offset) / self.scale.get()
	}

	/// Perform the reverse linear tranformation for an [`IntCondition`].
	///
	/// Note that this performs the correct rounding to maintain the meaning of
	/// the condition.
	///
	/// If an (in)equality is requested on a value that is not reachable by the
	/// transformation, then a boolean `Err` is returned with whether the
	/// condition implicitly holds.
	pub(crate) fn rev_transform_cond(&self, cond: IntCondition) -> Result<IntCondition, bool> {
		let s = self.scale;
		let o = self.offset;
		match cond {
			IntCondition::Eq(i) => {
				if self.rev_remains_integer(i) {
					Ok(IntCondition::Eq(self.rev_transform(i)))
				} else {
					Err(false)
				}
			}
			IntCondition::NotEq(i) => {
				if self.rev_remains_integer(i) {
					Ok(IntCondition::NotEq(self.rev_transform(i)))
				} else {
					Err(true)
				}
			}
			// s * x + o >= i === x >= ceil((i - o) / s) when s > 0
			IntCondition::GreaterEq(i) if self.positive_scale() => {
				Ok(IntCondition::GreaterEq(div_ceil(i - o, s)))
			}
			// s * x + o >= i === x <= floor((i - o) / s) when s < 0
			IntCondition::GreaterEq(i) => Ok(IntCondition::Less(div_floor(i - o, s) + 1)),
			// s * x + o < i === x < ceil((i - o) / s) when s > 0
			IntCondition::Less(i) if self.positive_scale() => {
				Ok(IntCondition::Less(div_ceil(i - o, s)))
			}
			// s * x + o < i === x > floor((i - o) / s) when s < 0
			IntCondition::Less(i) => Ok(IntCondition::GreaterEq(div_floor(i - o, s) + 1)),
		}
	}

	/// Creates a new linear transformation with the given scale and no offset.
	pub(crate) fn scaled(scale: NonZeroIntVal) -> Self {
		Self { scale, offset: 0 }
	}

	/// Perform the linear transformation on a value.
	pub(crate) fn transform(&self, val: IntVal) -> IntVal {
		(val * self.scale.get()) + self.offset
	}
}

impl Add<IntVal> for LinearTransform {
	type Output = Self;

	fn add(self, rhs: IntVal) -> Self::Output {
		LinearTransform {
			scale: self.scale,
			offset: self.offset + rhs,
		}
	}
}

impl Default for LinearTransform {
	fn default() -> Self {
		Self::offset(0)
	}
}

impl Mul<NonZeroIntVal> for LinearTransform {
	type Output = Self;

	fn mul(self, rhs: NonZeroIntVal) -> Self::Output {
		LinearTransform {
			scale: self.scale.saturating_mul(rhs),
			offset: self.offset * rhs.get(),
		}
	}
}

impl Neg for LinearTransform {
	type Output = Self;

	fn neg(self) -> Self::Output {
		Self {
			scale: -self.scale,
			offset: -self.offset,
		}
	}
}

#[cfg(test)]
mod tests {
	use crate::{
		helpers::linear_transform::LinearTransform, solver::engine::int_var::IntCondition,
		NonZeroIntVal,
	};

	#[test]
	fn test_rev_transform_cond() {
		// 2x + 1
		let t = LinearTransform::scaled(NonZeroIntVal::new(2).unwrap()) + 1;
		assert_eq!(t.transform(3), 7);
		assert_eq!(t.rev_transform_cond(IntCondition::Eq(7)), Ok(IntCondition::Eq(3)));
		assert_eq!(t.rev_transform_cond(IntCondition::Eq(6)), Err(false));
		assert_eq!(t.rev_transform_cond(IntCondition::NotEq(6)), Err(true));
		// 2x + 1 >= 6 === x >= 3
		assert_eq!(
			t.rev_transform_cond(IntCondition::GreaterEq(6)),
			Ok(IntCondition::GreaterEq(3))
		);
		// 2x + 1 < 6 === x < 3
		assert_eq!(
			t.rev_transform_cond(IntCondition::Less(6)),
			Ok(IntCondition::Less(3))
		);

		// -x + 2
		let t = -LinearTransform::offset(-2);
		assert_eq!(t.transform(5), -3);
		// -x + 2 >= 0 === x <= 2
		assert_eq!(
			t.rev_transform_cond(IntCondition::GreaterEq(0)),
			Ok(IntCondition::Less(3))
		);
		// -x + 2 < 0 === x > 2
		assert_eq!(
			t.rev_transform_cond(IntCondition::Less(0)),
			Ok(IntCondition::GreaterEq(3))
		);

		// -3x
		let t = LinearTransform::scaled(NonZeroIntVal::new(-3).unwrap());
		// -3x >= -7 === x <= 2
		assert_eq!(
			t.rev_transform_cond(IntCondition::GreaterEq(-7)),
			Ok(IntCondition::Less(3))
		);
		// -3x < -7 === x >= 3
		assert_eq!(
			t.rev_transform_cond(IntCondition::Less(-7)),
			Ok(IntCondition::GreaterEq(3))
		);
	}
}
