//! Module containing methods for making search decisions in the solver.

use std::fmt::{self, Debug};

use crate::{
	actions::InspectionActions,
	search::Decision,
	solver::{
		engine::int_var::IntCondition,
		view::{IntView, IntViewInner},
	},
	IntVal, Solver,
};

/// A trait for making search decisions in the solver.
///
/// Closures taking a reference to the [`Solver`] and returning a list of
/// [`Decision`]s implement this trait.
pub trait Brancher {
	/// Return the alternatives that split the current search node, in the order
	/// in which they must be explored.
	///
	/// An empty list signals that the brancher has no more decisions to make,
	/// i.e., that the current node is a solution.
	fn branch(&mut self, slv: &Solver) -> Vec<Decision>;
}

/// Type alias to represent a [`Brancher`] contained in a [`Box`], as used by
/// [`SeqBrancher`].
pub type BoxedBrancher = Box<dyn Brancher>;

#[derive(Clone, Debug, PartialEq, Eq)]
/// General brancher for integer variables that makes search decision by
/// following a given [`VariableSelection`] and [`ValueSelection`] strategy.
pub struct IntBrancher {
	/// Integer variables to be branched on.
	vars: Vec<IntView>,
	/// [`VariableSelection`] strategy used to select the next decision variable
	/// to branch on.
	var_sel: VariableSelection,
	/// [`ValueSelection`] strategy used to select the way in which to branch on
	/// the selected decision variable.
	val_sel: ValueSelection,
}

/// A brancher that sequentially applies a list of branchers: it only makes a
/// decision using a brancher when all branchers before it are exhausted.
pub struct SeqBrancher {
	/// Branchers in the order in which they are used.
	branchers: Vec<BoxedBrancher>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Strategy for limiting the domain of a selected decision variable as part of
/// a search decision.
pub enum ValueSelection {
	/// Set the decision variable to its current upper bound value, or exclude it
	/// on backtracking.
	IndomainMax,
	/// Set the decision variable to its current lower bound value, or exclude it
	/// on backtracking.
	IndomainMin,
	/// Exclude the current upper bound value from the domain of the decision
	/// variable, or set the variable to it on backtracking.
	OutdomainMax,
	/// Exclude the current lower bound value from the domain of the decision
	/// variable, or set the variable to it on backtracking.
	OutdomainMin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Strategy of selecting the next decision variable from a list to make a
/// search decision.
pub enum VariableSelection {
	/// Select the unfixed decision variable with the largest remaining domain
	/// size, using the order of the variables in case of a tie.
	AntiFirstFail,
	/// Select the unfixed decision variable with the smallest remaining domain
	/// size, using the order of the variables in case of a tie.
	FirstFail,
	/// Select the first unfixed decision variable in the list.
	InputOrder,
	/// Select the unfixed decision variable with the largest upper bound, using
	/// the order of the variables in case of a tie.
	Largest,
	/// Select the unfixed decision variable with the smallest lower bound, using
	/// the order of the variables in case of a tie.
	Smallest,
}

impl<F: FnMut(&Solver) -> Vec<Decision>> Brancher for F {
	fn branch(&mut self, slv: &Solver) -> Vec<Decision> {
		self(slv)
	}
}

impl IntBrancher {
	/// Create a new [`IntBrancher`] over the given variables.
	///
	/// Constant views are never branched on and are removed.
	pub fn new(vars: Vec<IntView>, var_sel: VariableSelection, val_sel: ValueSelection) -> Self {
		let vars = vars
			.into_iter()
			.filter(|v| !matches!(v.0, IntViewInner::Const(_)))
			.collect();
		Self {
			vars,
			var_sel,
			val_sel,
		}
	}

	/// Select the variable to branch on, if any of the variables is unfixed.
	fn select(&self, slv: &Solver) -> Option<IntView> {
		let score = |var| -> IntVal {
			match self.var_sel {
				VariableSelection::AntiFirstFail | VariableSelection::FirstFail => {
					slv.get_int_size(var) as IntVal
				}
				VariableSelection::InputOrder => 0,
				VariableSelection::Largest => slv.get_int_upper_bound(var),
				VariableSelection::Smallest => slv.get_int_lower_bound(var),
			}
		};
		let is_better = |incumbent_score, new_score| match self.var_sel {
			VariableSelection::AntiFirstFail | VariableSelection::Largest => {
				incumbent_score < new_score
			}
			VariableSelection::FirstFail | VariableSelection::Smallest => {
				incumbent_score > new_score
			}
			VariableSelection::InputOrder => false,
		};

		let mut selection: Option<(IntView, IntVal)> = None;
		for &var in self.vars.iter().filter(|&&v| !slv.is_fixed(v)) {
			let new_score = score(var);
			match selection {
				Some((_, sel_score)) if !is_better(sel_score, new_score) => {}
				_ => selection = Some((var, new_score)),
			}
			if self.var_sel == VariableSelection::InputOrder {
				break;
			}
		}
		selection.map(|(var, _)| var)
	}
}

impl Brancher for IntBrancher {
	fn branch(&mut self, slv: &Solver) -> Vec<Decision> {
		let Some(var) = self.select(slv) else {
			return Vec::new();
		};
		let (lb, ub) = slv.get_int_bounds(var);
		let (left, right) = match self.val_sel {
			ValueSelection::IndomainMin => (IntCondition::Eq(lb), IntCondition::NotEq(lb)),
			ValueSelection::IndomainMax => (IntCondition::Eq(ub), IntCondition::NotEq(ub)),
			ValueSelection::OutdomainMin => {
				(IntCondition::GreaterEq(lb + 1), IntCondition::Less(lb + 1))
			}
			ValueSelection::OutdomainMax => (IntCondition::Less(ub), IntCondition::GreaterEq(ub)),
		};
		vec![
			Decision {
				var,
				condition: left,
			},
			Decision {
				var,
				condition: right,
			},
		]
	}
}

impl SeqBrancher {
	/// Create a new [`SeqBrancher`] using the given branchers in order.
	pub fn new(branchers: Vec<BoxedBrancher>) -> Self {
		Self { branchers }
	}
}

impl Brancher for SeqBrancher {
	fn branch(&mut self, slv: &Solver) -> Vec<Decision> {
		for b in &mut self.branchers {
			let alternatives = b.branch(slv);
			if !alternatives.is_empty() {
				return alternatives;
			}
		}
		Vec::new()
	}
}

impl Debug for SeqBrancher {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SeqBrancher")
			.field("branchers", &self.branchers.len())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use crate::{
		actions::InspectionActions,
		branchers::{Brancher, IntBrancher, SeqBrancher, ValueSelection, VariableSelection},
		IntCondition, Solver,
	};

	#[test]
	fn test_variable_selection() {
		let mut slv = Solver::default();
		let a = slv.new_int_var((0..=5).into()).unwrap();
		let b = slv.new_int_var((2..=3).into()).unwrap();
		let c = slv.new_int_var((-1..=9).into()).unwrap();
		let d = slv.new_int_var((4..=4).into()).unwrap();

		let selected = |var_sel| {
			let mut brancher =
				IntBrancher::new(vec![d, a, b, c], var_sel, ValueSelection::IndomainMin);
			brancher.branch(&slv)[0].var
		};
		assert_eq!(selected(VariableSelection::InputOrder), a);
		assert_eq!(selected(VariableSelection::FirstFail), b);
		assert_eq!(selected(VariableSelection::AntiFirstFail), c);
		assert_eq!(selected(VariableSelection::Smallest), c);
		assert_eq!(selected(VariableSelection::Largest), c);
	}

	#[test]
	fn test_value_selection() {
		let mut slv = Solver::default();
		let a = slv.new_int_var((1..=5).into()).unwrap();

		let conditions = |val_sel| {
			let mut brancher = IntBrancher::new(vec![a], VariableSelection::InputOrder, val_sel);
			brancher
				.branch(&slv)
				.into_iter()
				.map(|d| d.condition)
				.collect::<Vec<_>>()
		};
		assert_eq!(
			conditions(ValueSelection::IndomainMin),
			vec![IntCondition::Eq(1), IntCondition::NotEq(1)]
		);
		assert_eq!(
			conditions(ValueSelection::IndomainMax),
			vec![IntCondition::Eq(5), IntCondition::NotEq(5)]
		);
		assert_eq!(
			conditions(ValueSelection::OutdomainMin),
			vec![IntCondition::GreaterEq(2), IntCondition::Less(2)]
		);
		assert_eq!(
			conditions(ValueSelection::OutdomainMax),
			vec![IntCondition::Less(5), IntCondition::GreaterEq(5)]
		);
	}

	#[test]
	fn test_sequential_branching() {
		let mut slv = Solver::default();
		let a = slv.new_int_var((0..=1).into()).unwrap();
		let b = slv.new_int_var((0..=1).into()).unwrap();

		let mut brancher = SeqBrancher::new(vec![
			Box::new(IntBrancher::new(
				vec![a],
				VariableSelection::InputOrder,
				ValueSelection::IndomainMin,
			)),
			Box::new(IntBrancher::new(
				vec![b],
				VariableSelection::InputOrder,
				ValueSelection::IndomainMax,
			)),
		]);
		assert_eq!(brancher.branch(&slv)[0].var, a);
		slv.set_int_val(a, 0).unwrap();
		let alternatives = brancher.branch(&slv);
		assert_eq!(alternatives[0].var, b);
		assert_eq!(alternatives[0].condition, IntCondition::Eq(1));
		slv.set_int_val(b, 1).unwrap();
		assert!(brancher.branch(&slv).is_empty());
		assert!(slv.is_fixed(a) && slv.is_fixed(b));
	}
}
