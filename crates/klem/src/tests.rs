//! Helpers for testing the solver, and tests of the interaction between the
//! different parts of the solver.

use std::{cell::Cell, ops::RangeInclusive, rc::Rc};

use expect_test::{expect, Expect};
use itertools::Itertools;
use tracing_test::traced_test;

use crate::{
	actions::{InspectionActions, PropagationActions, TrailingActions},
	all_different_int,
	branchers::{IntBrancher, ValueSelection, VariableSelection},
	not_equal_int,
	search::DepthFirstSearch,
	DomainRepresentation, EngineStatus, Inconsistency, IntSetVal, IntVal, IntView, NonZeroIntVal,
	Solver, SolverConfiguration, SolverError,
};

impl Solver {
	/// Find all solutions for the given variables, and check them (in sorted
	/// order) against the expected output.
	pub(crate) fn expect_solutions(&mut self, vars: &[IntView], expect: Expect) {
		let mut solutions: Vec<Vec<_>> = Vec::new();
		let mut search = DepthFirstSearch::new(IntBrancher::new(
			vars.to_vec(),
			VariableSelection::InputOrder,
			ValueSelection::IndomainMin,
		));
		let stats = search
			.solve(self, |slv| {
				solutions.push(vars.iter().map(|&v| slv.get_int_val(v).unwrap()).collect());
			})
			.unwrap();
		assert!(stats.completed());
		solutions.sort();
		let solutions = solutions
			.into_iter()
			.map(|sol| sol.into_iter().format(", ").to_string())
			.join("\n");
		expect.assert_eq(&solutions);
	}
}

/// Create a solver with `n` variables that represent the column of a queen on
/// each row of an `n` by `n` chess board, where no queen attacks another.
fn queens(n: i64, config: SolverConfiguration) -> (Solver, Vec<IntView>) {
	let mut slv = Solver::with_configuration(config);
	let q = (0..n)
		.map(|_| slv.new_int_var((0..=n - 1).into()).unwrap())
		.collect_vec();
	let _ = slv.post(all_different_int(q.clone())).unwrap();
	for (i, j) in (0..n as usize).tuple_combinations() {
		let d = (j - i) as i64;
		let _ = slv.post(not_equal_int(q[i], q[j] + d)).unwrap();
		let _ = slv.post(not_equal_int(q[i], q[j] + -d)).unwrap();
	}
	(slv, q)
}

#[test]
#[traced_test]
fn test_queens() {
	for repr in [DomainRepresentation::SparseSet, DomainRepresentation::BitSet] {
		let config = SolverConfiguration::default().with_domain_representation(repr);
		let (mut slv, q) = queens(8, config);
		let mut search = DepthFirstSearch::new(IntBrancher::new(
			q,
			VariableSelection::FirstFail,
			ValueSelection::IndomainMin,
		));
		let stats = search.solve(&mut slv, |_| {}).unwrap();
		assert_eq!(stats.solutions(), 92);
		assert!(stats.completed());
		assert!(stats.failures() > 0);
	}
}

#[test]
#[traced_test]
fn test_small_queens() {
	let (mut slv, q) = queens(5, SolverConfiguration::default());
	slv.set_int_val(q[0], 0).unwrap();
	slv.expect_solutions(
		&q,
		expect![[r#"
		0, 2, 4, 1, 3
		0, 3, 1, 4, 2"#]],
	);
}

#[test]
#[traced_test]
fn test_restore_after_failure() {
	let mut slv = Solver::default();
	let x = slv.new_int_var((0..=5).into()).unwrap();
	let vars = (0..3)
		.map(|_| slv.new_int_var((4..=5).into()).unwrap())
		.collect_vec();
	let _ = slv.post(all_different_int(vars.clone())).unwrap();
	let y = vars[0];

	let m0 = slv.save_state();
	slv.set_int_val(x, 2).unwrap();
	slv.fixpoint().unwrap();
	let m1 = slv.save_state();
	slv.set_int_not_eq(y, 4).unwrap();
	assert_eq!(slv.status(), EngineStatus::Pending);
	assert!(matches!(slv.fixpoint(), Err(SolverError::Inconsistent(_))));
	assert_eq!(slv.status(), EngineStatus::Failed);
	assert_eq!(slv.set_int_val(x, 3), Err(SolverError::RestoreRequired));
	assert_eq!(slv.fixpoint(), Err(SolverError::RestoreRequired));

	slv.restore_state(m1);
	assert_eq!(slv.status(), EngineStatus::Stable);
	assert_eq!(slv.get_int_values(y), vec![4, 5]);
	assert_eq!(slv.get_int_val(x), Some(2));
	// Restoring to the current state, or a later state, has no effect
	slv.restore_state(m1);
	assert_eq!(slv.get_int_val(x), Some(2));

	slv.restore_state(m0);
	assert_eq!(slv.get_int_bounds(x), (0, 5));
	slv.restore_state(m1);
	assert_eq!(slv.get_int_bounds(x), (0, 5));
	assert_eq!(slv.propagation_statistics().failures(), 1);
}

#[test]
#[traced_test]
fn test_mark_saved_in_failed_state() {
	let mut slv = Solver::default();
	let vars = (0..3)
		.map(|_| slv.new_int_var((1..=3).into()).unwrap())
		.collect_vec();
	let _ = slv.post(all_different_int(vars.clone())).unwrap();

	let m0 = slv.save_state();
	slv.set_int_val(vars[0], 1).unwrap();
	slv.set_int_val(vars[1], 1).unwrap();
	assert!(slv.fixpoint().is_err());
	let failed = slv.save_state();
	slv.restore_state(failed);
	assert_eq!(slv.status(), EngineStatus::Failed);
	assert_eq!(slv.fixpoint(), Err(SolverError::RestoreRequired));

	slv.restore_state(m0);
	assert_eq!(slv.status(), EngineStatus::Stable);
	// The failure is not restored when the trail is already before the mark
	slv.restore_state(failed);
	assert_eq!(slv.status(), EngineStatus::Stable);
	assert_eq!(slv.get_int_bounds(vars[0]), (1, 3));
}

#[test]
#[traced_test]
fn test_extreme_upper_bound() {
	let mut slv = Solver::default();
	let x = slv.new_int_var((-2..=2).into()).unwrap();
	slv.set_int_upper_bound(x, IntVal::MAX).unwrap();
	slv.set_int_upper_bound(x + 3, IntVal::MAX).unwrap();
	assert_eq!(slv.get_int_bounds(x), (-2, 2));
	assert_eq!(slv.status(), EngineStatus::Stable);

	let mark = slv.save_state();
	slv.set_int_upper_bound(x, 0).unwrap();
	assert_eq!(slv.get_int_bounds(x), (-2, 0));
	slv.restore_state(mark);

	slv.when_fixed(x, move |ctx| ctx.set_int_upper_bound(x, IntVal::MAX));
	slv.set_int_val(x, 1).unwrap();
	slv.fixpoint().unwrap();
	assert_eq!(slv.get_int_val(x), Some(1));
}

#[test]
#[traced_test]
fn test_fixpoint_is_idempotent() {
	let (mut slv, q) = queens(6, SolverConfiguration::default());
	slv.set_int_val(q[2], 1).unwrap();
	slv.fixpoint().unwrap();
	let mark = slv.save_state();
	let domains = q.iter().map(|&v| slv.get_int_values(v)).collect_vec();
	let runs = slv.propagation_statistics().propagations();

	slv.fixpoint().unwrap();
	assert_eq!(slv.save_state(), mark);
	assert_eq!(q.iter().map(|&v| slv.get_int_values(v)).collect_vec(), domains);
	assert_eq!(slv.propagation_statistics().propagations(), runs);
	assert_eq!(slv.status(), EngineStatus::Stable);
}

#[test]
#[traced_test]
fn test_domain_events() {
	for repr in [DomainRepresentation::SparseSet, DomainRepresentation::BitSet] {
		let mut slv = Solver::default();
		let x = slv.new_int_var_with((0..=9).into(), repr).unwrap();
		let counters: [Rc<Cell<u32>>; 3] = Default::default();
		let [fixed, bounds, domain] = counters.clone();
		slv.when_fixed(x, move |_| {
			fixed.set(fixed.get() + 1);
			Ok(())
		});
		slv.when_bounds_change(x, move |_| {
			bounds.set(bounds.get() + 1);
			Ok(())
		});
		slv.when_domain_change(x, move |_| {
			domain.set(domain.get() + 1);
			Ok(())
		});
		let counts = || counters.iter().map(|c| c.get()).collect_vec();

		// Removing a value that is not in the domain
		let mark = slv.save_state();
		slv.set_int_lower_bound(x, 0).unwrap();
		slv.set_int_not_eq(x, 10).unwrap();
		slv.fixpoint().unwrap();
		assert_eq!(counts(), vec![0, 0, 0]);
		assert_eq!(slv.save_state(), mark);

		// Removing a value in the middle
		slv.set_int_not_eq(x, 4).unwrap();
		slv.fixpoint().unwrap();
		assert_eq!(counts(), vec![0, 0, 1]);

		// Binding through a single assignment
		let before_bind = slv.save_state();
		slv.set_int_val(x, 7).unwrap();
		slv.fixpoint().unwrap();
		assert_eq!(counts(), vec![1, 1, 2]);

		// Binding through bounds
		slv.restore_state(before_bind);
		slv.set_int_lower_bound(x, 9).unwrap();
		slv.fixpoint().unwrap();
		assert_eq!(counts(), vec![2, 2, 3]);
	}
}

#[test]
#[traced_test]
fn test_constant_view_reactions_never_fire() {
	let mut slv = Solver::default();
	let fired = Rc::new(Cell::new(false));
	let f = Rc::clone(&fired);
	slv.when_fixed(IntView::from(3), move |_| {
		f.set(true);
		Ok(())
	});
	slv.fixpoint().unwrap();
	assert!(!fired.get());
	assert_eq!(slv.init_statistics().propagators(), 1);
}

#[test]
#[traced_test]
fn test_reaction_inconsistency() {
	let mut slv = Solver::default();
	let x = slv.new_int_var((0..=3).into()).unwrap();
	let y = slv.new_int_var((0..=3).into()).unwrap();
	// Reject every assignment of x that is larger than the upper bound of y
	slv.when_fixed(x, move |ctx| {
		let val = ctx.get_int_val(x).unwrap_or_default();
		if val > ctx.get_int_upper_bound(y) {
			Err(Inconsistency::Violated)
		} else {
			Ok(())
		}
	});

	let mark = slv.save_state();
	slv.set_int_upper_bound(y, 1).unwrap();
	slv.set_int_val(x, 2).unwrap();
	assert_eq!(
		slv.fixpoint(),
		Err(SolverError::Inconsistent(Inconsistency::Violated))
	);
	assert!(logs_contain("propagation failure"));
	slv.restore_state(mark);
	slv.set_int_val(x, 2).unwrap();
	slv.fixpoint().unwrap();
}

#[test]
#[traced_test]
fn test_trailed_values() {
	let mut slv = Solver::default();
	let i = slv.new_trailed_int(5);
	let b = slv.new_trailed_bool(false);
	let mark = slv.save_state();
	assert_eq!(slv.set_trailed_int(i, 8), 5);
	assert!(!slv.set_trailed_bool(b, true));
	assert_eq!(slv.get_trailed_int(i), 8);
	assert!(slv.get_trailed_bool(b));
	slv.restore_state(mark);
	assert_eq!(slv.get_trailed_int(i), 5);
	assert!(!slv.get_trailed_bool(b));
}

#[test]
#[traced_test]
fn test_variable_creation() {
	let config = SolverConfiguration::default().with_max_domain_span(100);
	let mut slv = Solver::with_configuration(config);
	let empty: IntSetVal = Vec::<RangeInclusive<IntVal>>::new().into_iter().collect();
	assert_eq!(slv.new_int_var(empty), Err(SolverError::EmptyDomain));
	assert_eq!(
		slv.new_int_var((0..=100).into()),
		Err(SolverError::DomainTooLarge { span: 101, max: 100 })
	);
	let x = slv.new_int_var((-5..=94).into()).unwrap();
	assert_eq!(slv.get_int_size(x * NonZeroIntVal::new(-3).unwrap()), 100);
	assert_eq!(slv.init_statistics().int_vars(), 1);
	assert!(logs_contain("create integer variable"));
}
