//! Year specification parsing for pipeline runs.
//!
//! A year specification selects which processing years a run covers:
//! a single year (`"2019"`), an inclusive range (`"2019-2021"`), or an
//! explicit comma-separated list (`"2019,2020,2022"`). The expanded
//! sequence is always ascending with duplicates removed.

use thiserror::Error;

/// Errors from parsing a year specification string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum YearSpecError {
    #[error("empty year specification")]
    Empty,
    #[error("invalid year '{0}'")]
    InvalidYear(String),
    #[error("invalid year range '{0}': expected START-END with START <= END")]
    InvalidRange(String),
}

/// An expanded, ordered set of processing years.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearSpec {
    years: Vec<i32>,
}

impl YearSpec {
    /// Parse a year specification string.
    ///
    /// # Example
    ///
    /// ```rust
    /// use dtw_core::years::YearSpec;
    ///
    /// let spec = YearSpec::parse("2019-2021").unwrap();
    /// assert_eq!(spec.years(), &[2019, 2020, 2021]);
    /// ```
    pub fn parse(spec: &str) -> Result<Self, YearSpecError> {
        let spec = spec.trim();
        if spec.is_empty() {
            return Err(YearSpecError::Empty);
        }

        let mut years: Vec<i32> = if let Some((start, end)) = spec.split_once('-') {
            let start: i32 = parse_year(start)?;
            let end: i32 = parse_year(end)?;
            if start > end {
                return Err(YearSpecError::InvalidRange(spec.to_string()));
            }
            (start..=end).collect()
        } else if spec.contains(',') {
            spec.split(',')
                .map(parse_year)
                .collect::<Result<Vec<_>, _>>()?
        } else {
            vec![parse_year(spec)?]
        };

        years.sort_unstable();
        years.dedup();
        Ok(Self { years })
    }

    /// The expanded years, ascending, without duplicates.
    pub fn years(&self) -> &[i32] {
        &self.years
    }
}

impl IntoIterator for YearSpec {
    type Item = i32;
    type IntoIter = std::vec::IntoIter<i32>;

    fn into_iter(self) -> Self::IntoIter {
        self.years.into_iter()
    }
}

fn parse_year(s: &str) -> Result<i32, YearSpecError> {
    let s = s.trim();
    s.parse::<i32>()
        .map_err(|_| YearSpecError::InvalidYear(s.to_string()))
}
