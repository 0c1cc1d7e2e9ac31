use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{CalendarDate, ValidationError};

/// One daily quotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPricePoint")]
pub struct PricePoint {
    date: CalendarDate,
    price: Decimal,
}

impl PricePoint {
    pub fn new(date: CalendarDate, price: Decimal) -> Result<Self, ValidationError> {
        if price <= Decimal::ZERO {
            return Err(ValidationError::NonPositivePrice { date });
        }
        Ok(Self { date, price })
    }

    pub const fn date(&self) -> CalendarDate {
        self.date
    }

    pub const fn price(&self) -> Decimal {
        self.price
    }
}

#[derive(Deserialize)]
struct RawPricePoint {
    date: CalendarDate,
    price: Decimal,
}

impl TryFrom<RawPricePoint> for PricePoint {
    type Error = ValidationError;

    fn try_from(value: RawPricePoint) -> Result<Self, Self::Error> {
        Self::new(value.date, value.price)
    }
}

/// Chronological price series with strictly increasing dates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PricePoint>", into = "Vec<PricePoint>")]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Result<Self, ValidationError> {
        for pair in points.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(ValidationError::UnorderedSeries {
                    previous: pair[0].date,
                    next: pair[1].date,
                });
            }
        }
        Ok(Self { points })
    }

    pub const fn empty() -> Self {
        Self { points: Vec::new() }
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn into_points(self) -> Vec<PricePoint> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    pub fn get(&self, index: usize) -> Option<&PricePoint> {
        self.points.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PricePoint> {
        self.points.iter()
    }
}

impl TryFrom<Vec<PricePoint>> for PriceSeries {
    type Error = ValidationError;

    fn try_from(value: Vec<PricePoint>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PriceSeries> for Vec<PricePoint> {
    fn from(value: PriceSeries) -> Self {
        value.points
    }
}

impl<'a> IntoIterator for &'a PriceSeries {
    type Item = &'a PricePoint;
    type IntoIter = std::slice::Iter<'a, PricePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
