use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use super::patch::{check_id_matches, check_patch_max_chars, check_patch_not_null, Patch};

/// Stored member, as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Membro {
    pub id_membro: i32,
    pub nome: String,
    pub sobrenome: Option<String>,
    /// Phone number with the area code, e.g. `11912345678`.
    pub celular: Option<i64>,
}

/// Payload for creating a member. The id is assigned by the database.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewMembro {
    #[validate(length(max = 25, code = "max_length"))]
    pub nome: String,
    #[validate(length(max = 25, code = "max_length"))]
    pub sobrenome: Option<String>,
    pub celular: Option<i64>,
}

/// Partial update of a member, only the fields present in the body get written.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MembroPatch {
    #[serde(default)]
    pub id_membro: Option<i32>,
    #[serde(default)]
    pub nome: Patch<String>,
    #[serde(default)]
    pub sobrenome: Patch<String>,
    #[serde(default)]
    pub celular: Patch<i64>,
}

impl MembroPatch {
    /// Validates the patch against the id taken from the request path.
    pub fn validate_for(&self, id_membro: i32) -> Result<(), ValidationErrors> {
        let mut errors = self.validate().err().unwrap_or_else(ValidationErrors::new);
        check_id_matches(&mut errors, "id_membro", self.id_membro, id_membro);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn apply(self, current: Membro) -> Membro {
        Membro {
            id_membro: current.id_membro,
            nome: self.nome.apply_to(current.nome),
            sobrenome: self.sobrenome.apply_to_nullable(current.sobrenome),
            celular: self.celular.apply_to_nullable(current.celular),
        }
    }
}

impl Validate for MembroPatch {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_patch_not_null(&mut errors, "nome", &self.nome);
        check_patch_max_chars(&mut errors, "nome", &self.nome, 25);
        check_patch_max_chars(&mut errors, "sobrenome", &self.sobrenome, 25);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

// ###################################
// ->   TESTS
// ###################################
#[cfg(test)]
mod tests {
    use super::*;
    use claims::{assert_err, assert_ok};
    use fake::{faker::name::en::FirstName, Fake};
    use rand::{rngs::StdRng, SeedableRng};

    fn stored() -> Membro {
        Membro {
            id_membro: 7,
            nome: "Joao".to_string(),
            sobrenome: Some("Macedo".to_string()),
            celular: Some(11912345678),
        }
    }

    fn patch(json: serde_json::Value) -> MembroPatch {
        serde_json::from_value(json).expect("valid patch json")
    }

    #[test]
    fn new_membro_nome_longer_than_25_rejected() {
        let membro = NewMembro {
            nome: "a".repeat(26),
            sobrenome: None,
            celular: None,
        };
        let errors = membro.validate().unwrap_err();
        let field_errors = errors.field_errors();
        let nome_errors = field_errors.get("nome").expect("nome should be reported");
        assert_eq!(nome_errors[0].code, "max_length");
    }

    #[test]
    fn new_membro_sobrenome_longer_than_25_rejected() {
        let membro = NewMembro {
            nome: "Joao".to_string(),
            sobrenome: Some("b".repeat(26)),
            celular: None,
        };
        assert_err!(membro.validate());
    }

    #[test]
    fn new_membro_25_chars_is_valid() {
        let membro = NewMembro {
            nome: "é".repeat(25),
            sobrenome: None,
            celular: Some(0),
        };
        assert_ok!(membro.validate());
    }

    #[derive(Debug, Clone)]
    struct FirstNameFixture(pub String);

    impl quickcheck::Arbitrary for FirstNameFixture {
        fn arbitrary(g: &mut quickcheck::Gen) -> Self {
            let mut rng = StdRng::seed_from_u64(u64::arbitrary(g));
            Self(FirstName().fake_with_rng(&mut rng))
        }
    }

    #[quickcheck_macros::quickcheck]
    fn new_membro_realistic_first_names_are_valid(nome: FirstNameFixture) -> bool {
        NewMembro {
            nome: nome.0,
            sobrenome: None,
            celular: None,
        }
        .validate()
        .is_ok()
    }

    #[test]
    fn patch_missing_fields_leave_stored_values_unchanged() {
        let updated = patch(serde_json::json!({ "id_membro": 7, "nome": "New" })).apply(stored());

        assert_eq!(updated.nome, "New");
        assert_eq!(updated.sobrenome.as_deref(), Some("Macedo"));
        assert_eq!(updated.celular, Some(11912345678));
    }

    #[test]
    fn patch_zero_celular_overwrites_stored_value() {
        let updated = patch(serde_json::json!({ "celular": 0 })).apply(stored());
        assert_eq!(updated.celular, Some(0));
    }

    #[test]
    fn patch_empty_sobrenome_overwrites_stored_value() {
        let updated = patch(serde_json::json!({ "sobrenome": "" })).apply(stored());
        assert_eq!(updated.sobrenome.as_deref(), Some(""));
    }

    #[test]
    fn patch_null_clears_nullable_fields() {
        let updated =
            patch(serde_json::json!({ "sobrenome": null, "celular": null })).apply(stored());
        assert_eq!(updated.sobrenome, None);
        assert_eq!(updated.celular, None);
    }

    #[test]
    fn patch_never_changes_the_id() {
        let updated = patch(serde_json::json!({ "id_membro": 99 })).apply(stored());
        assert_eq!(updated.id_membro, 7);
    }

    #[test]
    fn patch_null_nome_rejected() {
        let p = patch(serde_json::json!({ "nome": null }));
        assert_err!(p.validate_for(7));
    }

    #[test]
    fn patch_mismatched_id_rejected() {
        let p = patch(serde_json::json!({ "id_membro": 8, "nome": "New" }));
        let errors = p.validate_for(7).unwrap_err();
        assert!(errors.field_errors().contains_key("id_membro"));
    }

    #[test]
    fn patch_matching_or_absent_id_accepted() {
        assert_ok!(patch(serde_json::json!({ "id_membro": 7 })).validate_for(7));
        assert_ok!(patch(serde_json::json!({ "nome": "Ana" })).validate_for(7));
    }
}
