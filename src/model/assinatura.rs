use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use super::patch::{check_id_matches, check_patch_not_null, Patch};

/// A subscription links one member to one plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Assinatura {
    pub id_assinatura: i32,
    pub ativo: bool,
    /// Naive timestamp, serialized as `2023-11-07T10:00:00`.
    pub data_ativacao: NaiveDateTime,
    pub id_membro: i32,
    pub id_plano: i32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewAssinatura {
    pub ativo: bool,
    pub data_ativacao: NaiveDateTime,
    pub id_membro: i32,
    pub id_plano: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssinaturaPatch {
    #[serde(default)]
    pub id_assinatura: Option<i32>,
    #[serde(default)]
    pub ativo: Patch<bool>,
    #[serde(default)]
    pub data_ativacao: Patch<NaiveDateTime>,
    #[serde(default)]
    pub id_membro: Patch<i32>,
    #[serde(default)]
    pub id_plano: Patch<i32>,
}

impl AssinaturaPatch {
    pub fn validate_for(&self, id_assinatura: i32) -> Result<(), ValidationErrors> {
        let mut errors = self.validate().err().unwrap_or_else(ValidationErrors::new);
        check_id_matches(&mut errors, "id_assinatura", self.id_assinatura, id_assinatura);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn apply(self, current: Assinatura) -> Assinatura {
        Assinatura {
            id_assinatura: current.id_assinatura,
            ativo: self.ativo.apply_to(current.ativo),
            data_ativacao: self.data_ativacao.apply_to(current.data_ativacao),
            id_membro: self.id_membro.apply_to(current.id_membro),
            id_plano: self.id_plano.apply_to(current.id_plano),
        }
    }
}

impl Validate for AssinaturaPatch {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_patch_not_null(&mut errors, "ativo", &self.ativo);
        check_patch_not_null(&mut errors, "data_ativacao", &self.data_ativacao);
        check_patch_not_null(&mut errors, "id_membro", &self.id_membro);
        check_patch_not_null(&mut errors, "id_plano", &self.id_plano);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
