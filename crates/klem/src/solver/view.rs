//! The view module contains the types that are used to reference integer
//! variables in the solver, either directly, or through a linear
//! transformation.

use std::ops::{Add, Mul, Neg};

use crate::{
	helpers::linear_transform::LinearTransform,
	solver::{engine::int_var::IntVarRef, value::NonZeroIntVal},
	IntVal,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
/// A reference to an integer value in the solver.
///
/// An integer view can be used to inspect and change the domain of the integer
/// variable it refers to, transforming values as required.
pub struct IntView(pub(crate) IntViewInner);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
/// The internal representation of [`IntView`].
///
/// Note that this representation is not meant to be exposed to the user.
pub(crate) enum IntViewInner {
	/// (Raw) Integer Variable
	/// Reference to location in the Engine's State
	VarRef(IntVarRef),
	/// Constant Integer Value
	Const(IntVal),
	/// Linear View of an Integer Variable
	Linear {
		/// Linear transformation on the integer value of the variable.
		transformer: LinearTransform,
		/// Reference to an integer variable.
		var: IntVarRef,
	},
}

impl IntView {
	/// Returns the index of the integer variable underlying the view, or `None`
	/// if the view is a constant.
	pub fn var_index(&self) -> Option<usize> {
		match self.0 {
			IntViewInner::VarRef(v) | IntViewInner::Linear { var: v, .. } => Some(v.into()),
			IntViewInner::Const(_) => None,
		}
	}
}

impl Add<IntVal> for IntView {
	type Output = Self;

	fn add(self, rhs: IntVal) -> Self::Output {
		Self(match self.0 {
			IntViewInner::VarRef(var) => IntViewInner::Linear {
				transformer: LinearTransform::offset(rhs),
				var,
			},
			IntViewInner::Const(i) => IntViewInner::Const(i + rhs),
			IntViewInner::Linear { transformer, var } => IntViewInner::Linear {
				transformer: transformer + rhs,
				var,
			},
		})
	}
}

impl From<IntVal> for IntView {
	fn from(value: IntVal) -> Self {
		Self(IntViewInner::Const(value))
	}
}

impl Mul<NonZeroIntVal> for IntView {
	type Output = Self;

	fn mul(self, rhs: NonZeroIntVal) -> Self::Output {
		Self(match self.0 {
			IntViewInner::VarRef(iv) => IntViewInner::Linear {
				transformer: LinearTransform::scaled(rhs),
				var: iv,
			},
			IntViewInner::Const(c) => IntViewInner::Const(c * rhs.get()),
			IntViewInner::Linear { transformer, var } => IntViewInner::Linear {
				transformer: transformer * rhs,
				var,
			},
		})
	}
}

impl Neg for IntView {
	type Output = Self;

	fn neg(self) -> Self::Output {
		Self(match self.0 {
			IntViewInner::VarRef(var) => IntViewInner::Linear {
				transformer: -LinearTransform::default(),
				var,
			},
			IntViewInner::Const(i) => IntViewInner::Const(-i),
			IntViewInner::Linear { transformer, var } => IntViewInner::Linear {
				transformer: -transformer,
				var,
			},
		})
	}
}

#[cfg(test)]
mod tests {
	use rangelist::RangeList;

	use crate::{actions::InspectionActions, IntView, NonZeroIntVal, Solver, SolverError};

	#[test]
	fn test_linear_view_inspection() {
		let mut slv = Solver::default();
		let x = slv
			.new_int_var(RangeList::from_iter([1..=2, 4..=4]))
			.unwrap();
		let y = -(x * NonZeroIntVal::new(2).unwrap()) + 1;

		assert_eq!(slv.get_int_bounds(y), (-7, -1));
		assert_eq!(slv.get_int_values(y), vec![-7, -3, -1]);
		assert_eq!(slv.get_int_size(y), 3);
		assert!(slv.check_int_in_domain(y, -3));
		assert!(!slv.check_int_in_domain(y, -5));
		assert!(!slv.check_int_in_domain(y, -2));
		assert_eq!(x.var_index(), y.var_index());
		assert_eq!(IntView::from(3).var_index(), None);
	}

	#[test]
	fn test_linear_view_mutation() {
		let mut slv = Solver::default();
		let x = slv.new_int_var((0..=9).into()).unwrap();
		let y = -x + 10;

		// 10 - x >= 4 === x <= 6
		slv.set_int_lower_bound(y, 4).unwrap();
		assert_eq!(slv.get_int_upper_bound(x), 6);
		// 10 - x <= 8 === x >= 2
		slv.set_int_upper_bound(y, 8).unwrap();
		assert_eq!(slv.get_int_lower_bound(x), 2);
		slv.set_int_not_eq(y, 5).unwrap();
		assert!(!slv.check_int_in_domain(x, 5));

		let z = x * NonZeroIntVal::new(3).unwrap();
		// Values not reachable by the view are never part of its domain
		slv.set_int_not_eq(z, 7).unwrap();
		assert_eq!(slv.get_int_values(x), vec![2, 3, 4, 6]);
		assert!(matches!(
			slv.set_int_val(z, 7),
			Err(SolverError::Inconsistent(_))
		));
	}

	#[test]
	fn test_constant_view() {
		let mut slv = Solver::default();
		let c = IntView::from(4);
		assert_eq!(slv.get_int_val(c), Some(4));
		slv.set_int_lower_bound(c, 4).unwrap();
		slv.set_int_not_eq(c, 3).unwrap();
		assert!(matches!(
			slv.set_int_upper_bound(c, 3),
			Err(SolverError::Inconsistent(_))
		));
	}
}
