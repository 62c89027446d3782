//! The `cover` lowering method: the cover as a flat sum-of-products
//! `Expr` over a locally-compacted (deduplicated, sorted) literal set,
//! Tseitin-encoded by the shared [`super::encode_expr`].

use crate::error;
use crate::sat::{SatLit, SatSolver};
use crate::struct_engine::StructEngine;
use crate::types::AssignList;

pub(super) fn lower<S: SatSolver>(engine: &mut StructEngine<S>, cover: &[AssignList]) -> error::Result<SatLit> {
    let expr = super::cover_to_expr(engine, cover)?;
    super::encode_expr(engine, &expr)
}
