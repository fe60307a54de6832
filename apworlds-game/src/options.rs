use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug, Formatter};
use std::marker::PhantomData;

/// Static description of an integer option.
pub trait RangeSpec {
    const DISPLAY_NAME: &'static str;
    const RANGE_START: i64;
    const RANGE_END: i64;
    const DEFAULT: i64;
}

/// A player-chosen value of an integer option, always within its declared range.
#[derive(Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64", bound = "S: RangeSpec")]
pub struct Range<S> {
    value: i64,
    spec: PhantomData<fn() -> S>,
}

impl<S: RangeSpec> Range<S> {
    pub fn new(value: i64) -> Result<Self> {
        ensure!(
            (S::RANGE_START..=S::RANGE_END).contains(&value),
            "{} must be between {} and {}, got {value}",
            S::DISPLAY_NAME,
            S::RANGE_START,
            S::RANGE_END
        );
        Ok(Range {
            value,
            spec: PhantomData,
        })
    }

    pub fn clamped(value: i64) -> Self {
        Range {
            value: value.clamp(S::RANGE_START, S::RANGE_END),
            spec: PhantomData,
        }
    }

    pub fn value(&self) -> i64 {
        self.value
    }
}

impl<S: RangeSpec> Default for Range<S> {
    fn default() -> Self {
        Range {
            value: S::DEFAULT,
            spec: PhantomData,
        }
    }
}

impl<S> Clone for Range<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for Range<S> {}

impl<S> PartialEq for Range<S> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<S> Eq for Range<S> {}

impl<S: RangeSpec> Debug for Range<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", S::DISPLAY_NAME, self.value)
    }
}

impl<S: RangeSpec> TryFrom<i64> for Range<S> {
    type Error = anyhow::Error;

    fn try_from(value: i64) -> Result<Self> {
        Range::new(value)
    }
}

impl<S> From<Range<S>> for i64 {
    fn from(r: Range<S>) -> i64 {
        r.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Amount;

    impl RangeSpec for Amount {
        const DISPLAY_NAME: &'static str = "Amount";
        const RANGE_START: i64 = 5;
        const RANGE_END: i64 = 100;
        const DEFAULT: i64 = 20;
    }

    #[test]
    fn test_range_bounds() {
        assert_eq!(Range::<Amount>::default().value(), 20);
        assert_eq!(Range::<Amount>::new(5).unwrap().value(), 5);
        assert_eq!(Range::<Amount>::new(100).unwrap().value(), 100);
        assert!(Range::<Amount>::new(4).is_err());
        assert!(Range::<Amount>::new(101).is_err());
        assert_eq!(Range::<Amount>::clamped(1000).value(), 100);
        assert_eq!(Range::<Amount>::clamped(-3).value(), 5);
    }

    #[test]
    fn test_range_serde() {
        let r: Range<Amount> = serde_json::from_str("42").unwrap();
        assert_eq!(r.value(), 42);
        assert_eq!(serde_json::to_string(&r).unwrap(), "42");
        let err = serde_json::from_str::<Range<Amount>>("3").unwrap_err();
        assert!(err.to_string().contains("Amount must be between 5 and 100"));
    }
}
