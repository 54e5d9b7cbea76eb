//! Record analysis

use crate::config::ReportConfig;
use crate::decode::{extract_path, extract_string};
use crate::error::{Error, Result};
use crate::types::JsonValue;
use std::collections::BTreeMap;
use std::fmt;

/// A record singled out by its price
#[derive(Debug, Clone, PartialEq)]
pub struct PricedRecord {
    pub id: String,
    pub name: String,
    pub price: f64,
}

/// Summary of a record collection
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// Number of records analyzed
    pub total: usize,
    /// Records per category, sorted by category name
    pub category_counts: BTreeMap<String, usize>,
    /// Highest priced record in `max_price_category`; first one wins a tie
    pub most_expensive: Option<PricedRecord>,
    /// Mean price in `average_price_category`, `None` when it has no priced record
    pub average_price: Option<f64>,
    max_price_category: String,
    average_price_category: String,
    currency: String,
}

impl Report {
    /// Category searched for the most expensive record
    pub fn max_price_category(&self) -> &str {
        &self.max_price_category
    }

    /// Category the mean price is computed over
    pub fn average_price_category(&self) -> &str {
        &self.average_price_category
    }
}

/// Analyze a collection of records
///
/// Records without a category are counted in `total` only; records without a
/// numeric price are skipped by the price statistics. A record that is not a
/// JSON object is an error.
pub fn analyze<'a, I>(records: I, config: &ReportConfig) -> Result<Report>
where
    I: IntoIterator<Item = &'a JsonValue>,
{
    let mut total = 0;
    let mut category_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut most_expensive: Option<PricedRecord> = None;
    let mut price_sum = 0.0;
    let mut priced = 0usize;

    for record in records {
        total += 1;
        if !record.is_object() {
            return Err(Error::report(format!(
                "record #{total} is not a JSON object"
            )));
        }

        let Some(category) = extract_string(record, &config.category_field) else {
            continue;
        };
        *category_counts.entry(category.clone()).or_default() += 1;

        let Some(price) = extract_path(record, &config.price_field).and_then(JsonValue::as_f64)
        else {
            continue;
        };

        if category == config.max_price_category
            && most_expensive.as_ref().map_or(true, |best| price > best.price)
        {
            most_expensive = Some(PricedRecord {
                id: extract_string(record, &config.id_field).unwrap_or_default(),
                name: extract_string(record, &config.name_field).unwrap_or_default(),
                price,
            });
        }

        if category == config.average_price_category {
            price_sum += price;
            priced += 1;
        }
    }

    let average_price = (priced > 0).then(|| price_sum / priced as f64);

    Ok(Report {
        total,
        category_counts,
        most_expensive,
        average_price,
        max_price_category: config.max_price_category.clone(),
        average_price_category: config.average_price_category.clone(),
        currency: config.currency.clone(),
    })
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Analysis Results:")?;
        writeln!(f, "1. Total number of products: {}", self.total)?;
        writeln!(f, "2. Number of products in each category:")?;
        for (category, count) in &self.category_counts {
            writeln!(f, "   - {category}: {count}")?;
        }

        match &self.most_expensive {
            Some(best) => writeln!(
                f,
                "3. Most expensive product in the {} category: ID: {}, Name: {}, Price: {}",
                self.max_price_category, best.id, best.name, best.price
            )?,
            None => writeln!(
                f,
                "3. No products found in the {} category.",
                self.max_price_category
            )?,
        }

        match self.average_price {
            Some(mean) => write!(
                f,
                "4. Average price of products in the '{}' category: {:.2} {}",
                self.average_price_category, mean, self.currency
            ),
            None => write!(
                f,
                "4. No products found in the '{}' category.",
                self.average_price_category
            ),
        }
    }
}
