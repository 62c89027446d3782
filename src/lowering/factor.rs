//! The `factor` lowering method: same `Expr` target as `cover`, but with
//! a greedy single-literal kernel extraction pass first, so a literal
//! shared by several cubes is Tseitin-encoded once instead of once per
//! cube. A full Quine-McCluskey-style algebraic factoring (co-kernels
//! over multi-literal divisors) is out of scope here; the greedy
//! most-frequent-literal pass already captures the common case of a
//! shared side-input across a cover's cubes.

use std::collections::HashMap;

use crate::error;
use crate::sat::{SatLit, SatSolver};
use crate::struct_engine::StructEngine;
use crate::types::AssignList;

use super::Expr;

pub(super) fn lower<S: SatSolver>(engine: &mut StructEngine<S>, cover: &[AssignList]) -> error::Result<SatLit> {
    let expr = super::cover_to_expr(engine, cover)?;
    let factored = factor_expr(expr);
    super::encode_expr(engine, &factored)
}

pub(super) fn factor_expr(expr: Expr) -> Expr {
    match expr {
        Expr::Or(children) => {
            let terms: Vec<Vec<SatLit>> = children.into_iter().map(expr_to_lits).collect();
            Expr::Or(factor_terms(terms))
        }
        other => other,
    }
}

fn expr_to_lits(e: Expr) -> Vec<SatLit> {
    match e {
        Expr::And(lits) => lits
            .into_iter()
            .map(|l| match l {
                Expr::Lit(x) => x,
                _ => unreachable!("cover_to_expr only ever builds flat literal ANDs"),
            })
            .collect(),
        Expr::Lit(x) => vec![x],
        _ => unreachable!("cover_to_expr only ever builds Or-of-And-of-Lit"),
    }
}

/// Picks the literal shared by the most terms (at least two); factors
/// it out of those terms into `lit ∧ (rest of the grouped terms,
/// recursively factored)`, and recurses on whatever terms didn't share
/// it. Terminates because each recursive call strictly shrinks the
/// term list it's given.
fn factor_terms(terms: Vec<Vec<SatLit>>) -> Vec<Expr> {
    let mut freq: HashMap<SatLit, usize> = HashMap::new();
    for t in &terms {
        for &l in t {
            *freq.entry(l).or_insert(0) += 1;
        }
    }
    let best = freq
        .iter()
        .filter(|&(_, &c)| c >= 2)
        .max_by_key(|&(_, &c)| c)
        .map(|(&l, _)| l);

    match best {
        None => terms.into_iter().map(and_of).collect(),
        Some(lit) => {
            let mut with_lit = Vec::new();
            let mut without_lit = Vec::new();
            for t in terms {
                if t.contains(&lit) {
                    with_lit.push(t.into_iter().filter(|&x| x != lit).collect());
                } else {
                    without_lit.push(t);
                }
            }
            let mut result = vec![Expr::And(vec![Expr::Lit(lit), or_of(factor_terms(with_lit))])];
            result.extend(factor_terms(without_lit));
            result
        }
    }
}

fn and_of(lits: Vec<SatLit>) -> Expr {
    match lits.len() {
        0 => Expr::Const(true),
        1 => Expr::Lit(lits[0]),
        _ => Expr::And(lits.into_iter().map(Expr::Lit).collect()),
    }
}

fn or_of(exprs: Vec<Expr>) -> Expr {
    if exprs.len() == 1 {
        exprs.into_iter().next().expect("len checked above")
    } else {
        Expr::Or(exprs)
    }
}
