use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use serde::Deserialize;

use super::error::{CalcError, CalcResult, require_non_negative};
use super::types::{
    AdjustDirection, InflationParameters, InflationResult, InflationYearEntry,
    MAX_INFLATION_SPAN_YEARS,
};

pub const DEFAULT_FALLBACK_RATE_PCT: f64 = 2.0;

// UK CPI annual average rate, percent.
const UK_CPI: &[(i32, f64)] = &[
    (1989, 5.2),
    (1990, 7.0),
    (1991, 7.5),
    (1992, 4.3),
    (1993, 2.5),
    (1994, 2.0),
    (1995, 2.6),
    (1996, 2.5),
    (1997, 1.8),
    (1998, 1.6),
    (1999, 1.3),
    (2000, 0.8),
    (2001, 1.2),
    (2002, 1.3),
    (2003, 1.4),
    (2004, 1.3),
    (2005, 2.1),
    (2006, 2.3),
    (2007, 2.3),
    (2008, 3.6),
    (2009, 2.2),
    (2010, 3.3),
    (2011, 4.5),
    (2012, 2.8),
    (2013, 2.6),
    (2014, 1.5),
    (2015, 0.0),
    (2016, 0.7),
    (2017, 2.7),
    (2018, 2.5),
    (2019, 1.8),
    (2020, 0.9),
    (2021, 2.6),
    (2022, 9.1),
    (2023, 7.3),
    (2024, 2.5),
];

/// Annual inflation rates by calendar year.
///
/// Years inside the supported range that have no entry use the fallback rate.
#[derive(Debug, Clone, PartialEq)]
pub struct InflationSeries {
    rates: BTreeMap<i32, f64>,
    fallback_rate_pct: f64,
    supported: RangeInclusive<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TableFile {
    #[serde(default = "default_fallback")]
    fallback_rate: f64,
    rates: BTreeMap<i32, f64>,
    first_year: Option<i32>,
    last_year: Option<i32>,
}

fn default_fallback() -> f64 {
    DEFAULT_FALLBACK_RATE_PCT
}

impl InflationSeries {
    pub fn new(rates: BTreeMap<i32, f64>, fallback_rate_pct: f64) -> CalcResult<Self> {
        let (Some(first), Some(last)) = (
            rates.keys().next().copied(),
            rates.keys().next_back().copied(),
        ) else {
            return Err(CalcError::InvalidTable(
                "at least one year is required".to_string(),
            ));
        };
        for (year, rate) in &rates {
            if !rate.is_finite() || *rate <= -100.0 {
                return Err(CalcError::InvalidTable(format!(
                    "rate for {year} must be a finite number > -100"
                )));
            }
        }
        if !fallback_rate_pct.is_finite() || fallback_rate_pct <= -100.0 {
            return Err(CalcError::InvalidTable(
                "fallback rate must be a finite number > -100".to_string(),
            ));
        }

        check_span(first, last)?;
        Ok(Self {
            rates,
            fallback_rate_pct,
            supported: first..=last,
        })
    }

    pub fn uk_cpi() -> Self {
        Self {
            rates: UK_CPI.iter().copied().collect(),
            fallback_rate_pct: DEFAULT_FALLBACK_RATE_PCT,
            supported: 1989..=2024,
        }
    }

    pub fn from_json(json: &str) -> CalcResult<Self> {
        let file: TableFile =
            serde_json::from_str(json).map_err(|e| CalcError::InvalidTable(e.to_string()))?;
        let series = Self::new(file.rates, file.fallback_rate)?;
        match (file.first_year, file.last_year) {
            (None, None) => Ok(series),
            (first, last) => {
                let first = first.unwrap_or(*series.supported.start());
                let last = last.unwrap_or(*series.supported.end());
                series.with_supported_years(first, last)
            }
        }
    }

    pub fn with_supported_years(mut self, first: i32, last: i32) -> CalcResult<Self> {
        if last < first {
            return Err(CalcError::InvalidTable(format!(
                "supported range {first}..={last} is empty"
            )));
        }
        check_span(first, last)?;
        self.supported = first..=last;
        Ok(self)
    }

    pub fn rate_for(&self, year: i32) -> f64 {
        self.rates
            .get(&year)
            .copied()
            .unwrap_or(self.fallback_rate_pct)
    }

    pub fn fallback_rate_pct(&self) -> f64 {
        self.fallback_rate_pct
    }

    pub fn supported_years(&self) -> RangeInclusive<i32> {
        self.supported.clone()
    }

    fn check_year(&self, field: &'static str, year: i32) -> CalcResult<()> {
        if self.supported.contains(&year) {
            Ok(())
        } else {
            Err(CalcError::invalid(
                field,
                format!(
                    "{year} is outside the supported range {}-{}",
                    self.supported.start(),
                    self.supported.end()
                ),
            ))
        }
    }
}

fn check_span(first: i32, last: i32) -> CalcResult<()> {
    if i64::from(last) - i64::from(first) > i64::from(MAX_INFLATION_SPAN_YEARS) {
        return Err(CalcError::InvalidTable(format!(
            "supported range {first}..={last} spans more than {MAX_INFLATION_SPAN_YEARS} years"
        )));
    }
    Ok(())
}

impl Default for InflationSeries {
    fn default() -> Self {
        Self::uk_cpi()
    }
}

pub fn adjust_for_inflation(
    series: &InflationSeries,
    params: &InflationParameters,
) -> CalcResult<InflationResult> {
    require_non_negative("amount", params.amount)?;
    series.check_year("start year", params.start_year)?;
    series.check_year("end year", params.end_year)?;
    if params.end_year < params.start_year {
        return Err(CalcError::invalid(
            "end year",
            "must not be before the start year",
        ));
    }

    // Price level at each year relative to the start year.
    let span = params.end_year - params.start_year;
    let mut factors = Vec::with_capacity(usize::try_from(span).map_or(1, |s| s + 1));
    let mut factor = 1.0;
    for year in params.start_year..params.end_year {
        factors.push((year, factor, series.rate_for(year)));
        factor *= 1.0 + series.rate_for(year) / 100.0;
    }
    factors.push((params.end_year, factor, 0.0));
    let cumulative = factor;

    let (base, adjusted) = match params.direction {
        AdjustDirection::Grow => (params.amount, params.amount * cumulative),
        AdjustDirection::Deflate => (params.amount / cumulative, params.amount / cumulative),
    };
    let years = factors
        .into_iter()
        .map(|(year, factor, rate_pct)| InflationYearEntry {
            year,
            amount: base * factor,
            rate_pct,
        })
        .collect();

    let average_annual_rate_pct = if span == 0 {
        0.0
    } else {
        (cumulative.powf(1.0 / span as f64) - 1.0) * 100.0
    };
    let percentage_change = match params.direction {
        AdjustDirection::Grow => (cumulative - 1.0) * 100.0,
        AdjustDirection::Deflate => (1.0 / cumulative - 1.0) * 100.0,
    };

    Ok(InflationResult {
        original_amount: params.amount,
        adjusted_amount: adjusted,
        percentage_change,
        average_annual_rate_pct,
        years,
    })
}
