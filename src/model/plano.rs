use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use super::patch::{check_id_matches, check_patch_max_chars, check_patch_not_null, Patch};

/// Stored gym plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Plano {
    pub id_plano: i32,
    pub nome: String,
    /// Monthly price in BRL, e.g. `50.99`.
    pub preco: f64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewPlano {
    #[validate(length(max = 25, code = "max_length"))]
    pub nome: String,
    pub preco: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlanoPatch {
    #[serde(default)]
    pub id_plano: Option<i32>,
    #[serde(default)]
    pub nome: Patch<String>,
    #[serde(default)]
    pub preco: Patch<f64>,
}

impl PlanoPatch {
    pub fn validate_for(&self, id_plano: i32) -> Result<(), ValidationErrors> {
        let mut errors = self.validate().err().unwrap_or_else(ValidationErrors::new);
        check_id_matches(&mut errors, "id_plano", self.id_plano, id_plano);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn apply(self, current: Plano) -> Plano {
        Plano {
            id_plano: current.id_plano,
            nome: self.nome.apply_to(current.nome),
            preco: self.preco.apply_to(current.preco),
        }
    }
}

impl Validate for PlanoPatch {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_patch_not_null(&mut errors, "nome", &self.nome);
        check_patch_max_chars(&mut errors, "nome", &self.nome, 25);
        check_patch_not_null(&mut errors, "preco", &self.preco);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
