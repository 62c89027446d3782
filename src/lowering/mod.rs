//! Condition-to-CNF lowering: turns a `DetCond`'s cover into a single
//! activator literal a caller can assume to force the FFR's propagation
//! condition, by one of four materializing strategies, plus a
//! structural size estimator used to pick between them without paying
//! for materialization.

mod aig;
mod bdd;
mod cover;
mod factor;
mod naive;

use itertools::Itertools;

use crate::error::{self, DtpgError};
use crate::sat::{SatLit, SatSolver};
use crate::struct_engine::StructEngine;
use crate::types::{Assign, AssignList, DetCond};

/// Which of the four materializing strategies (plus the legacy,
/// estimation-only `Bdd`) to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LowerMethod {
    Naive,
    Cover,
    Factor,
    Aig,
    Bdd,
}

impl LowerMethod {
    pub fn parse(s: &str) -> error::Result<Self> {
        match s {
            "naive" => Ok(LowerMethod::Naive),
            "cover" => Ok(LowerMethod::Cover),
            "factor" => Ok(LowerMethod::Factor),
            "aig" => Ok(LowerMethod::Aig),
            "bdd" => Ok(LowerMethod::Bdd),
            other => Err(DtpgError::InvalidOption {
                key: "method",
                detail: format!("unknown lowering method {other:?}"),
            }),
        }
    }
}

/// A small Boolean expression tree over already-allocated SAT literals.
/// The shared intermediate form for `cover`/`factor` lowering and for
/// the generic size estimator; `aig`/`bdd` build their own structures
/// since they estimate and materialize differently.
#[derive(Debug, Clone)]
pub enum Expr {
    Const(bool),
    Lit(SatLit),
    And(Vec<Expr>),
    Or(Vec<Expr>),
}

/// Builds the flat sum-of-products `Expr` for a cover: one `And` of
/// literals per cube, `Or`-ed together. Duplicate cubes are dropped —
/// the "locally-compacted variable set" §4.6 asks the `cover` method to
/// start from.
fn cover_to_expr<S: SatSolver>(engine: &mut StructEngine<S>, cover: &[AssignList]) -> error::Result<Expr> {
    let mut cubes = Vec::with_capacity(cover.len());
    for cube in cover {
        let mut lits = Vec::with_capacity(cube.len());
        for a in cube.iter() {
            lits.push(engine.checked_literal(*a)?);
        }
        lits.sort_unstable();
        cubes.push(lits);
    }
    let disjuncts = cubes
        .into_iter()
        .unique()
        .map(|lits| Expr::And(lits.into_iter().map(Expr::Lit).collect()))
        .collect();
    Ok(Expr::Or(disjuncts))
}

/// Recursively Tseitin-encodes `expr`, returning a literal equivalent to
/// it. Every compound node gets its own fresh, non-decision variable
/// whose defining clauses only assert the forward direction (`node ⇒
/// children`): the lowering pipeline only ever *asserts* the returned
/// literal as an assumption to force the expression true, it never
/// needs to derive the node's truth from its children, so the reverse
/// direction is never built. This is the Rust-general form of exactly
/// what the naive method's `aᵢ → ℓ` clauses and `a → OR aᵢ` clause do;
/// `cover`/`factor` reuse it over whatever `Expr` shape they hand it,
/// matching the "AND nodes fold into the parent's clause" instruction —
/// an `And`'s own clause is the one linking it to its parent, not a
/// separate reverse-iff pair.
fn encode_expr<S: SatSolver>(engine: &mut StructEngine<S>, expr: &Expr) -> error::Result<SatLit> {
    match expr {
        Expr::Const(false) => Err(DtpgError::ImpossibleState(
            "encode_expr called on a constant-0 expression".into(),
        )),
        Expr::Const(true) => {
            let v = engine.solver_mut().new_variable(false);
            engine.solver_mut().add_clause(&[v]);
            Ok(v)
        }
        Expr::Lit(l) => Ok(*l),
        Expr::And(children) => {
            let lits = children
                .iter()
                .map(|c| encode_expr(engine, c))
                .collect::<error::Result<Vec<_>>>()?;
            let v = engine.solver_mut().new_variable(false);
            for l in lits {
                engine.solver_mut().add_clause(&[-v, l]);
            }
            Ok(v)
        }
        Expr::Or(children) => {
            let lits = children
                .iter()
                .map(|c| encode_expr(engine, c))
                .collect::<error::Result<Vec<_>>>()?;
            let v = engine.solver_mut().new_variable(true);
            let mut clause = vec![-v];
            clause.extend(lits);
            engine.solver_mut().add_clause(&clause);
            Ok(v)
        }
    }
}

/// The generic structural size estimator from §4.6, shared by
/// `cover`/`factor`. Deliberately a heuristic proxy for comparing
/// methods, not a literal prediction of `encode_expr`'s own clause
/// count — the spec only asks that it be monotone in the cover (adding
/// a cube never decreases it), which this satisfies by construction
/// since every rule only ever adds.
fn estimate_expr(expr: &Expr) -> error::Result<(usize, usize, usize)> {
    match expr {
        Expr::Const(true) | Expr::Lit(_) => Ok((0, 0, 1)),
        Expr::Const(false) => Err(DtpgError::ImpossibleState(
            "calc_cnf_size estimated a constant-0 expression".into(),
        )),
        Expr::And(children) => {
            let mut clauses = 0;
            let mut literals = 0;
            let mut arity = 0;
            for c in children {
                let (cc, cl, ca) = estimate_expr(c)?;
                clauses += cc;
                literals += cl;
                arity += ca;
            }
            Ok((clauses, literals, arity))
        }
        Expr::Or(children) => {
            let n = children.len();
            let mut clauses = 0;
            let mut literals = 0;
            for c in children {
                let (cc, cl, ca) = estimate_expr(c)?;
                clauses += cc;
                literals += cl;
                if ca > 1 {
                    clauses += ca;
                    literals += 2 * ca;
                }
            }
            clauses += 1;
            literals += n + 1;
            Ok((clauses, literals, 1))
        }
    }
}

/// Lowers one `DetCond` into an assumption list: the mandatory literals
/// followed by a single activator literal that forces the cover true.
/// `Overflow`/`Undetected` DetConds have no cover and are a caller
/// contract violation to lower (§7 kind 5, folded into `ImpossibleState`
/// per the design notes).
pub fn lower<S: SatSolver>(
    engine: &mut StructEngine<S>,
    cond: &DetCond,
    method: LowerMethod,
    rewrite: bool,
) -> error::Result<Vec<SatLit>> {
    let (mandatory, cover) = match cond {
        DetCond::Detected { mandatory, cover } => (mandatory, cover),
        DetCond::PartialDetected { mandatory, cover, .. } => (mandatory, cover),
        DetCond::Overflow { .. } | DetCond::Undetected => {
            return Err(DtpgError::ImpossibleState(
                "lower called on a DetCond with no cover".into(),
            ));
        }
    };
    if cover.is_empty() {
        return Err(DtpgError::ImpossibleState(
            "lower called on a DetCond whose cover is empty".into(),
        ));
    }

    let mut assumptions: Vec<SatLit> = Vec::with_capacity(mandatory.len() + 1);
    for a in mandatory.iter() {
        assumptions.push(engine.checked_literal(*a)?);
    }

    let activator = match method {
        LowerMethod::Naive => naive::lower(engine, cover)?,
        LowerMethod::Cover => cover::lower(engine, cover)?,
        LowerMethod::Factor => factor::lower(engine, cover)?,
        LowerMethod::Aig => aig::lower(engine, cover, rewrite)?,
        LowerMethod::Bdd => {
            return Err(DtpgError::ImpossibleState(
                "bdd is a legacy size-estimation-only method; it cannot materialize clauses".into(),
            ));
        }
    };
    assumptions.push(activator);
    Ok(assumptions)
}

/// Estimates total CNF size (clauses, literals) across a list of
/// DetConds under the given method, without installing any clauses or
/// touching a solver. `Overflow`/`Undetected` entries contribute zero —
/// they have no cover to estimate.
pub fn calc_cnf_size(cond_list: &[DetCond], method: LowerMethod) -> error::Result<(usize, usize)> {
    let mut clauses = 0usize;
    let mut literals = 0usize;
    for cond in cond_list {
        let cover = match cond {
            DetCond::Detected { cover, .. } => cover,
            DetCond::PartialDetected { cover, .. } => cover,
            DetCond::Overflow { .. } | DetCond::Undetected => continue,
        };
        let (c, l) = cover_size(cover, method)?;
        clauses += c;
        literals += l;
    }
    Ok((clauses, literals))
}

fn cover_size(cover: &[AssignList], method: LowerMethod) -> error::Result<(usize, usize)> {
    if cover.is_empty() {
        return Ok((0, 0));
    }
    match method {
        LowerMethod::Naive => naive::estimate(cover),
        LowerMethod::Cover => {
            let expr = literal_expr(cover);
            let (c, l, _) = estimate_expr(&expr)?;
            Ok((c, l))
        }
        LowerMethod::Factor => {
            let expr = factor::factor_expr(literal_expr(cover));
            let (c, l, _) = estimate_expr(&expr)?;
            Ok((c, l))
        }
        LowerMethod::Aig => aig::estimate(cover),
        LowerMethod::Bdd => bdd::estimate(cover),
    }
}

/// A solver-free stand-in for [`cover_to_expr`]: the size estimator
/// never touches a solver, so its leaves are synthetic literals derived
/// from `(node, frame)` rather than real `SatLit`s allocated by an
/// engine.
fn literal_expr(cover: &[AssignList]) -> Expr {
    let disjuncts = cover
        .iter()
        .map(|cube| {
            let mut lits: Vec<SatLit> = cube.iter().map(synthetic_lit).collect();
            lits.sort_unstable();
            lits
        })
        .unique()
        .map(|lits| Expr::And(lits.into_iter().map(Expr::Lit).collect()))
        .collect();
    Expr::Or(disjuncts)
}

/// A deterministic, collision-free (within one cube list) literal stand-in
/// for an `Assign`, used only where no real solver is present.
pub(super) fn synthetic_lit(a: &Assign) -> SatLit {
    let base = (a.node().index() as i64) * 4 + (a.frame() as i64) * 2 + 1;
    let base = base as SatLit;
    if a.value() {
        base
    } else {
        -base
    }
}

pub(super) fn synthetic_lits(cube: &AssignList) -> Vec<SatLit> {
    cube.iter().map(synthetic_lit).collect()
}
