//! The `naive` lowering method: one auxiliary variable per cube, one
//! activator tying them together, per §4.6's dedicated bullet — kept as
//! its own closed-form clause count rather than routed through the
//! generic [`super::Expr`] estimator, so the estimate here is exact, not
//! a proxy.

use crate::error;
use crate::sat::{SatLit, SatSolver};
use crate::struct_engine::StructEngine;
use crate::types::AssignList;

pub(super) fn lower<S: SatSolver>(engine: &mut StructEngine<S>, cover: &[AssignList]) -> error::Result<SatLit> {
    let mut disjuncts = Vec::with_capacity(cover.len());
    for cube in cover {
        let a_i = engine.solver_mut().new_variable(false);
        for assign in cube.iter() {
            let lit = engine.checked_literal(*assign)?;
            engine.solver_mut().add_clause(&[-a_i, lit]);
        }
        disjuncts.push(a_i);
    }

    let a = engine.solver_mut().new_variable(true);
    let mut top = Vec::with_capacity(disjuncts.len() + 1);
    top.push(-a);
    top.extend(disjuncts);
    engine.solver_mut().add_clause(&top);
    Ok(a)
}

/// Σ|Cᵢ|+1 clauses, Σ2|Cᵢ|+|cover|+1 literals, exactly [`lower`]'s own
/// output.
pub(super) fn estimate(cover: &[AssignList]) -> error::Result<(usize, usize)> {
    let sum_arity: usize = cover.iter().map(|c| c.len()).sum();
    let clauses = sum_arity + 1;
    let literals = 2 * sum_arity + cover.len() + 1;
    Ok((clauses, literals))
}
