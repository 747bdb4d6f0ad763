//! Entity schemas of the gym: what gets stored, what can be created and what can be patched.

mod assinatura;
mod membro;
mod patch;
mod plano;

pub use assinatura::{Assinatura, AssinaturaPatch, NewAssinatura};
pub use membro::{Membro, MembroPatch, NewMembro};
pub use patch::Patch;
pub use plano::{NewPlano, Plano, PlanoPatch};
pub(crate) use patch::{check_patch_max_chars, check_patch_not_null};
