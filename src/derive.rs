use log::info;

use crate::{
    data::Value,
    dataset::Dataset,
    error::Result,
    schema::ColumnType,
};

pub const ACRES_PLANTED: &str = "acres_planted";
pub const ACRES_HARVESTED: &str = "acres_harvested";
pub const TONS_HARVESTED: &str = "tons_harvested";
pub const US_DOLLARS_HARVESTED: &str = "us_dollars_harvested";
pub const PERCENT_MATURITY: &str = "percent_maturity";

pub const ACRES_UNHARVESTED: &str = "acres_unharvested";
pub const YIELD_TONS_PER_ACRE: &str = "yield_tons_per_acre";
pub const PRICE_PER_TON: &str = "price_per_ton";
pub const TONS_NEVER_HARVESTED: &str = "tons_never_harvested";

/// Loss figures for one row. Plain IEEE-754 arithmetic: a zero divisor gives
/// `inf` or `NaN`, which is kept as-is. A missing input leaves every figure
/// that depends on it missing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LossFigures {
    pub acres_unharvested: Option<f64>,
    pub yield_tons_per_acre: Option<f64>,
    pub price_per_ton: Option<f64>,
    pub tons_never_harvested: Option<f64>,
}

impl LossFigures {
    pub fn compute(
        acres_planted: Option<f64>,
        acres_harvested: Option<f64>,
        tons_harvested: Option<f64>,
        us_dollars_harvested: Option<f64>,
        percent_maturity: Option<f64>,
    ) -> Self {
        let acres_unharvested = lift2(acres_planted, acres_harvested, |p, h| p - h);
        let yield_tons_per_acre = lift2(tons_harvested, acres_harvested, |t, h| t / h);
        let price_per_ton = lift2(us_dollars_harvested, tons_harvested, |d, t| d / t);
        let tons_never_harvested = lift2(
            lift2(acres_unharvested, yield_tons_per_acre, |u, y| u * y),
            percent_maturity,
            |uy, m| uy * m,
        );
        Self {
            acres_unharvested,
            yield_tons_per_acre,
            price_per_ton,
            tons_never_harvested,
        }
    }
}

fn lift2(a: Option<f64>, b: Option<f64>, op: impl Fn(f64, f64) -> f64) -> Option<f64> {
    Some(op(a?, b?))
}

/// Appends `acres_unharvested`, `yield_tons_per_acre`, `price_per_ton` and
/// `tons_never_harvested` as float columns.
pub fn derive_loss_fields(mut dataset: Dataset) -> Result<Dataset> {
    info!("Calculating \"tons never harvested\".");
    let planted = dataset.require_column(ACRES_PLANTED)?;
    let harvested = dataset.require_column(ACRES_HARVESTED)?;
    let tons = dataset.require_column(TONS_HARVESTED)?;
    let dollars = dataset.require_column(US_DOLLARS_HARVESTED)?;
    let maturity = dataset.require_column(PERCENT_MATURITY)?;

    let figures = dataset
        .rows()
        .iter()
        .map(|row| {
            let num = |idx: usize| row[idx].as_ref().and_then(Value::as_f64);
            LossFigures::compute(
                num(planted),
                num(harvested),
                num(tons),
                num(dollars),
                num(maturity),
            )
        })
        .collect::<Vec<_>>();

    let column = |pick: fn(&LossFigures) -> Option<f64>| {
        figures
            .iter()
            .map(|f| pick(f).map(Value::Float))
            .collect::<Vec<_>>()
    };
    let unharvested = column(|f| f.acres_unharvested);
    let yield_per_acre = column(|f| f.yield_tons_per_acre);
    let price = column(|f| f.price_per_ton);
    let never = column(|f| f.tons_never_harvested);

    dataset.push_column(ACRES_UNHARVESTED, ColumnType::Float, unharvested);
    dataset.push_column(YIELD_TONS_PER_ACRE, ColumnType::Float, yield_per_acre);
    dataset.push_column(PRICE_PER_TON, ColumnType::Float, price);
    dataset.push_column(TONS_NEVER_HARVESTED, ColumnType::Float, never);
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnMeta;

    fn compute(p: f64, h: f64, t: f64, d: f64, m: f64) -> LossFigures {
        LossFigures::compute(Some(p), Some(h), Some(t), Some(d), Some(m))
    }

    #[test]
    fn fully_harvested_field_loses_nothing() {
        let figures = compute(8900.0, 8900.0, 1100.0, 4_467_000.0, 0.5);
        assert_eq!(figures.acres_unharvested, Some(0.0));
        assert!(figures.tons_never_harvested.unwrap().abs() < 1e-9);
    }

    #[test]
    fn price_per_ton_divides_dollars_by_tons() {
        let figures = compute(175_000.0, 172_000.0, 309_600.0, 121_982_000.0, 0.5);
        assert!((figures.price_per_ton.unwrap() - 393.998_708).abs() < 1e-3);
        assert!((figures.tons_never_harvested.unwrap() - 2700.0).abs() < 1e-6);
    }

    #[test]
    fn zero_divisors_produce_non_finite_values() {
        let figures = compute(10.0, 0.0, 5.0, 100.0, 0.5);
        assert!(figures.yield_tons_per_acre.unwrap().is_infinite());
        assert!(figures.tons_never_harvested.unwrap().is_infinite());

        let empty = compute(10.0, 0.0, 0.0, 0.0, 0.5);
        assert!(empty.yield_tons_per_acre.unwrap().is_nan());
        assert!(empty.price_per_ton.unwrap().is_nan());
        assert!(empty.tons_never_harvested.unwrap().is_nan());
    }

    #[test]
    fn missing_input_leaves_dependents_missing() {
        let figures = LossFigures::compute(Some(10.0), Some(5.0), None, Some(100.0), Some(0.5));
        assert_eq!(figures.acres_unharvested, Some(5.0));
        assert_eq!(figures.yield_tons_per_acre, None);
        assert_eq!(figures.price_per_ton, None);
        assert_eq!(figures.tons_never_harvested, None);
    }

    #[test]
    fn derive_appends_four_float_columns() {
        let dataset = Dataset::new(
            [
                ACRES_PLANTED,
                ACRES_HARVESTED,
                US_DOLLARS_HARVESTED,
                TONS_HARVESTED,
                PERCENT_MATURITY,
            ]
            .iter()
            .map(|name| ColumnMeta::new(*name, ColumnType::Float))
            .collect(),
            vec![
                [175_000.0, 172_000.0, 121_982_000.0, 309_600.0, 0.5]
                    .iter()
                    .map(|v| Some(Value::Float(*v)))
                    .collect(),
            ],
        );
        let derived = derive_loss_fields(dataset).unwrap();
        assert_eq!(
            &derived.headers()[5..],
            &[
                ACRES_UNHARVESTED,
                YIELD_TONS_PER_ACRE,
                PRICE_PER_TON,
                TONS_NEVER_HARVESTED
            ]
        );
        assert_eq!(
            derived.value(0, ACRES_UNHARVESTED),
            Some(&Value::Float(3000.0))
        );
    }
}
