/// Generates case-insensitive `FromStr` and a `Display` that prints the
/// primary clap name for a `ValueEnum` type.
#[macro_export]
macro_rules! impl_value_enum_text {
    ($enum_type:ty, $error_reason:expr) => {
        impl std::str::FromStr for $enum_type {
            type Err = $crate::primitives::ConfigError;

            fn from_str(s: &str) -> Result<Self, $crate::primitives::ConfigError> {
                for variant in <Self as clap::ValueEnum>::value_variants() {
                    if let Some(possible_value) = clap::ValueEnum::to_possible_value(variant) {
                        if possible_value.matches(s.trim(), true) {
                            return Ok(*variant);
                        }
                    }
                }

                Err($crate::primitives::ConfigError::ParseError {
                    value: s.to_string(),
                    reason: $error_reason.to_string(),
                })
            }
        }

        impl std::fmt::Display for $enum_type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match clap::ValueEnum::to_possible_value(self) {
                    Some(value) => f.write_str(value.get_name()),
                    None => write!(f, "{:?}", self),
                }
            }
        }
    };
}

pub(crate) use impl_value_enum_text;
