//! The gym resources. Every resource gets the same five routes.

pub mod assinaturas;
pub mod membros;
pub mod planos;
