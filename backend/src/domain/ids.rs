//! Integer identifier newtypes for database-assigned keys.

macro_rules! define_numeric_id {
    ($(#[$outer:meta])* $name:ident) => {
        $(#[$outer])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw identifier.
            #[must_use]
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Raw identifier value.
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<i64>().map(Self)
            }
        }
    };
}

define_numeric_id! {
    /// Identifier of a [`crate::domain::Tag`].
    TagId
}

define_numeric_id! {
    /// Identifier of an [`crate::domain::Ingredient`].
    IngredientId
}

define_numeric_id! {
    /// Identifier of a [`crate::domain::Recipe`].
    RecipeId
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1", 1)]
    #[case(" 42 ", 42)]
    fn parses_trimmed_integers(#[case] raw: &str, #[case] expected: i64) {
        assert_eq!(raw.parse::<TagId>().expect("valid id").get(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("abc")]
    #[case("1.5")]
    fn rejects_non_integers(#[case] raw: &str) {
        assert!(raw.parse::<RecipeId>().is_err());
    }

    #[rstest]
    fn serialises_as_bare_number() {
        let value = serde_json::to_value(IngredientId::new(7)).expect("serialises");
        assert_eq!(value, serde_json::json!(7));
    }
}
