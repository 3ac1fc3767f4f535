//! Code representation

use crate::domain::{Catalog, InvariantError};

/// Report every definition whose code is not an integer
pub fn check(catalog: &Catalog) -> Vec<InvariantError> {
    catalog
        .definitions()
        .filter(|definition| !definition.code().is_integer())
        .map(|definition| {
            tracing::debug!(
                "{} has a {} code: {}",
                definition.qualname(),
                definition.code().kind(),
                definition.code()
            );
            InvariantError::TypeMismatch {
                qualname: definition.qualname().to_string(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CatalogModule, CodeValue, ViolationDefinition};
    use rstest::rstest;

    #[rstest]
    #[case(CodeValue::Float(1.0))]
    #[case(CodeValue::Text("1".to_string()))]
    #[case(CodeValue::Boolean(true))]
    fn test_non_integer_code_reported(#[case] code: CodeValue) {
        let mut module = CatalogModule::new("naming");
        module.violations.push(ViolationDefinition::new(0, "a", "Good"));
        module
            .violations
            .push(ViolationDefinition::declared(code, "b", "Bad", true));

        assert_eq!(
            check(&Catalog::new(vec![module])),
            vec![InvariantError::TypeMismatch {
                qualname: "Bad".to_string()
            }]
        );
    }

    #[test]
    fn test_code_above_i64_is_an_integer() {
        let mut module = CatalogModule::new("naming");
        module.violations.push(ViolationDefinition::declared(
            CodeValue::Unsigned(u64::MAX),
            "big",
            "Big",
            true,
        ));

        assert!(check(&Catalog::new(vec![module])).is_empty());
    }
}
