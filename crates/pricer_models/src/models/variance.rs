//! Variance floor policies for the discretised Heston variance process.

/// How a possibly negative Euler variance is treated.
///
/// Every step applies [`effective`](Self::effective) to obtain the variance
/// fed into the diffusion and drift terms, and [`carry`](Self::carry) to the
/// updated value before it is stored for the next step.
///
/// | Policy           | `effective(v)` | `carry(v)` |
/// |------------------|----------------|------------|
/// | `FullTruncation` | `max(v, 0)`    | `v`        |
/// | `Reflection`     | `|v|`          | `|v|`      |
/// | `Absorption`     | `max(v, 0)`    | `max(v, 0)`|
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum VarianceFloor {
    /// Truncate inside the coefficients, keep the raw state.
    #[default]
    FullTruncation,
    /// Reflect negative values at zero.
    Reflection,
    /// Clamp the stored state at zero.
    Absorption,
}

impl VarianceFloor {
    /// Variance used inside the step coefficients.
    #[inline]
    pub fn effective(self, v: f64) -> f64 {
        match self {
            Self::FullTruncation | Self::Absorption => v.max(0.0),
            Self::Reflection => v.abs(),
        }
    }

    /// Variance carried to the next step.
    #[inline]
    pub fn carry(self, v: f64) -> f64 {
        match self {
            Self::FullTruncation => v,
            Self::Reflection => v.abs(),
            Self::Absorption => v.max(0.0),
        }
    }

    /// Short lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::FullTruncation => "full_truncation",
            Self::Reflection => "reflection",
            Self::Absorption => "absorption",
        }
    }
}

impl std::fmt::Display for VarianceFloor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for VarianceFloor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "full_truncation" | "truncation" => Ok(Self::FullTruncation),
            "reflection" => Ok(Self::Reflection),
            "absorption" => Ok(Self::Absorption),
            other => Err(format!("unknown variance floor '{}'", other)),
        }
    }
}
