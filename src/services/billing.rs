//! Cálculo de importes de facturación
//!
//! Aritmética decimal exacta para líneas, facturas GST y facturas sin GST.
//! Los controladores llaman a estas funciones antes de escribir en el
//! repositorio; nada se recalcula al leer.

use rust_decimal::Decimal;

use crate::models::gst::GstRate;
use crate::models::gst_bill::GstBillLine;
use crate::utils::errors::{validation_error, AppError, AppResult};

/// Prefijo de numeración para facturas GST
pub const GST_INVOICE_PREFIX: &str = "GST";
/// Prefijo de numeración para facturas sin GST
pub const NON_GST_INVOICE_PREFIX: &str = "INV";

/// Importes derivados de una línea
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineAmounts {
    pub actual_amount: Decimal,
    pub gst_amount: Decimal,
    pub total_amount: Decimal,
}

/// Totales de una factura GST
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GstInvoiceTotals {
    pub gst: Decimal,
    pub total_amount: Decimal,
}

fn too_large(field: &'static str) -> AppError {
    validation_error(field, "Amount is too large")
}

/// quantity × rate
pub fn line_amount(quantity: i32, rate: Decimal) -> AppResult<Decimal> {
    Decimal::from(quantity)
        .checked_mul(rate)
        .ok_or_else(|| too_large("rate"))
}

/// actual = q × r, gst = actual × g / 100, total = actual + gst
pub fn compute_line(quantity: i32, rate: Decimal, gst_percent: GstRate) -> AppResult<LineAmounts> {
    let actual_amount = line_amount(quantity, rate)?;
    let gst_amount = actual_amount
        .checked_mul(gst_percent.as_decimal())
        .ok_or_else(|| too_large("rate"))?
        / Decimal::ONE_HUNDRED;
    let total_amount = actual_amount
        .checked_add(gst_amount)
        .ok_or_else(|| too_large("rate"))?;
    Ok(LineAmounts {
        actual_amount,
        gst_amount,
        total_amount,
    })
}

fn checked_sum<I>(values: I, field: &'static str) -> AppResult<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, value| acc.checked_add(value))
        .ok_or_else(|| too_large(field))
}

pub fn gst_invoice_totals(lines: &[GstBillLine], mechanic_charge: Decimal) -> AppResult<GstInvoiceTotals> {
    let gst = checked_sum(lines.iter().map(|l| l.gst_amount), "lines")?;
    let lines_total = checked_sum(lines.iter().map(|l| l.total_amount), "lines")?;
    let total_amount = lines_total
        .checked_add(mechanic_charge)
        .ok_or_else(|| too_large("mechanic_charge"))?;
    Ok(GstInvoiceTotals { gst, total_amount })
}

pub fn non_gst_total<I>(item_amounts: I, mechanic_charge: Decimal) -> AppResult<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    checked_sum(item_amounts, "item_ids")?
        .checked_add(mechanic_charge)
        .ok_or_else(|| too_large("mechanic_charge"))
}

/// GST-000001, INV-000042, ...
pub fn format_invoice_no(prefix: &str, sequence: u64) -> String {
    format!("{}-{:06}", prefix, sequence)
}

/// Siguiente número libre a partir de los números ya emitidos con ese prefijo
pub fn next_invoice_no<'a, I>(prefix: &str, existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let marker = format!("{}-", prefix);
    let highest = existing
        .into_iter()
        .filter_map(|no| no.strip_prefix(marker.as_str()))
        .filter_map(|seq| seq.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    format_invoice_no(prefix, highest + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    fn line(quantity: i32, rate: &str, gst: u8) -> GstBillLine {
        let amounts = compute_line(quantity, dec(rate), GstRate::new(gst).unwrap()).unwrap();
        GstBillLine {
            item_id: None,
            description: "Part".to_string(),
            hsn_code: None,
            quantity,
            rate: dec(rate),
            gst_percent: GstRate::new(gst).unwrap(),
            actual_amount: amounts.actual_amount,
            gst_amount: amounts.gst_amount,
            total_amount: amounts.total_amount,
        }
    }

    #[test]
    fn test_line_math() {
        let amounts = compute_line(3, dec("199.99"), GstRate::new(18).unwrap()).unwrap();
        assert_eq!(amounts.actual_amount, dec("599.97"));
        assert_eq!(amounts.gst_amount, dec("107.9946"));
        assert_eq!(amounts.total_amount, dec("707.9646"));
    }

    #[test]
    fn test_zero_rate_line_has_no_gst() {
        let amounts = compute_line(2, dec("50"), GstRate::ZERO).unwrap();
        assert_eq!(amounts.gst_amount, Decimal::ZERO);
        assert_eq!(amounts.total_amount, dec("100"));
    }

    #[test]
    fn test_line_amounts_are_never_negative() {
        for rate in GstRate::ALLOWED {
            for quantity in [1, 7, 1000] {
                let amounts = compute_line(quantity, dec("0.01"), GstRate::new(rate).unwrap()).unwrap();
                assert!(amounts.actual_amount >= Decimal::ZERO);
                assert!(amounts.gst_amount >= Decimal::ZERO);
                assert_eq!(amounts.total_amount, amounts.actual_amount + amounts.gst_amount);
            }
        }
    }

    #[test]
    fn test_gst_invoice_totals() {
        let lines = vec![line(1, "1000", 18), line(2, "250", 28)];
        let totals = gst_invoice_totals(&lines, dec("300")).unwrap();
        assert_eq!(totals.gst, dec("320"));
        assert_eq!(totals.total_amount, dec("2120"));
    }

    #[test]
    fn test_non_gst_total_adds_mechanic_charge() {
        let total = non_gst_total(vec![dec("1801.00"), dec("99.50")], dec("500")).unwrap();
        assert_eq!(total, dec("2400.50"));
        assert_eq!(non_gst_total(Vec::new(), Decimal::ZERO).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_overflow_is_a_validation_error() {
        assert!(matches!(
            compute_line(2, Decimal::MAX, GstRate::new(18).unwrap()),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            compute_line(1, Decimal::MAX, GstRate::new(28).unwrap()),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            non_gst_total(vec![Decimal::MAX, Decimal::ONE], Decimal::ZERO),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            non_gst_total(vec![Decimal::MAX], Decimal::ONE),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_next_invoice_no_skips_foreign_numbers() {
        assert_eq!(next_invoice_no(GST_INVOICE_PREFIX, Vec::<&str>::new()), "GST-000001");
        let existing = ["GST-000002", "GST-000010", "MANUAL-77", "INV-000500"];
        assert_eq!(next_invoice_no(GST_INVOICE_PREFIX, existing), "GST-000011");
        assert_eq!(next_invoice_no(NON_GST_INVOICE_PREFIX, existing), "INV-000501");
    }
}
