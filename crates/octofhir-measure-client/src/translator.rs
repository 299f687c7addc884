//! Translation of a FHIR MeasureReport into a [`QueryResultStatistic`].

use crate::resource::{DecodeError, MeasureReport, Stratifier};
use crate::statistic::{QueryResultStatistic, Stratification, Stratum};

/// Pagination is not modelled: a statistic always spans one page.
const NUMBER_OF_PAGES: u32 = 1;
const REQUEST_ID: &str = "1";

/// Builds the statistic from the first group of `report`.
///
/// Only the first group is read. Stratifiers and their strata are emitted
/// once each, in the order they appear in the report.
pub fn translate_report(report: &MeasureReport) -> Result<QueryResultStatistic, DecodeError> {
    let group = report.first_group()?;
    let total_size = group.first_population()?.count()?;

    let stratification = group
        .stratifier
        .iter()
        .map(translate_stratifier)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(QueryResultStatistic {
        total_size,
        number_of_pages: NUMBER_OF_PAGES,
        request_id: REQUEST_ID.to_string(),
        stratification,
    })
}

fn translate_stratifier(stratifier: &Stratifier) -> Result<Stratification, DecodeError> {
    let strata = stratifier
        .stratum
        .iter()
        .map(|entry| -> Result<Stratum, DecodeError> {
            Ok(Stratum {
                label: entry.label().to_string(),
                count: entry.first_population()?.count()?,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Stratification {
        title: stratifier.title().to_string(),
        strata,
    })
}
