use serde::{Deserialize, Serialize};

use super::ModelError;

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(AbnormalStatus {
    Low => "low",
    Normal => "normal",
    High => "high",
});

str_enum!(Audience {
    Doctor => "doctor",
    Patient => "patient",
});

str_enum!(BandSource {
    Supplied => "supplied",
    ReferenceTable => "reference_table",
    ExternalLookup => "external_lookup",
    Synthesized => "synthesized",
});

str_enum!(TrendDirection {
    Rising => "rising",
    Falling => "falling",
    Stable => "stable",
});

impl AbnormalStatus {
    /// True for `low` and `high`.
    pub fn is_abnormal(&self) -> bool {
        !matches!(self, Self::Normal)
    }

    /// Title-cased label for badges and table cells.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Normal => "Normal",
            Self::High => "High",
        }
    }
}
