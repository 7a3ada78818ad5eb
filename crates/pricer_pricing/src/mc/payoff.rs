//! European vanilla payoffs evaluated on terminal prices.

/// Payoff type for European vanilla options.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PayoffType {
    /// `max(S_T - K, 0)`
    #[default]
    Call,
    /// `max(K - S_T, 0)`
    Put,
}

impl PayoffType {
    /// Payoff at terminal price `terminal` for strike `strike`.
    ///
    /// ```rust
    /// use pricer_pricing::mc::PayoffType;
    ///
    /// assert_eq!(PayoffType::Call.evaluate(2.5, 2.0), 0.5);
    /// assert_eq!(PayoffType::Put.evaluate(2.5, 2.0), 0.0);
    /// ```
    #[inline]
    pub fn evaluate(self, terminal: f64, strike: f64) -> f64 {
        match self {
            Self::Call => (terminal - strike).max(0.0),
            Self::Put => (strike - terminal).max(0.0),
        }
    }
}

impl std::fmt::Display for PayoffType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Call => f.write_str("call"),
            Self::Put => f.write_str("put"),
        }
    }
}

impl std::str::FromStr for PayoffType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "call" => Ok(Self::Call),
            "put" => Ok(Self::Put),
            other => Err(format!("unknown payoff '{}'", other)),
        }
    }
}
