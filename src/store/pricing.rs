//! Price arithmetic shared by orders and carts.
//!
//! Amounts are whole units of the base currency held in `i64`. Discounts are
//! applied with integer division, which truncates toward zero.

use super::{StoreError, StoreResult};

/// A requested `(product, quantity)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineItem {
    pub product_id: i64,
    pub num: i32,
}

/// A priced line used to compute totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricedLine {
    pub num: i32,
    pub origin_price: i64,
    pub price: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub total_price: i64,
    pub final_price: i64,
}

/// Collapses repeated products into one line, summing quantities and keeping
/// the position of the first occurrence.
pub fn merge_line_items(items: &[LineItem]) -> StoreResult<Vec<LineItem>> {
    let mut merged: Vec<LineItem> = Vec::with_capacity(items.len());
    for item in items {
        if item.num <= 0 {
            return Err(StoreError::invalid(format!(
                "quantity for product {} must be greater than 0",
                item.product_id
            )));
        }
        match merged.iter_mut().find(|m| m.product_id == item.product_id) {
            Some(existing) => {
                existing.num = existing
                    .num
                    .checked_add(item.num)
                    .ok_or_else(|| StoreError::invalid("quantity is too large"))?;
            }
            None => merged.push(*item),
        }
    }
    Ok(merged)
}

pub fn sum_lines<I>(lines: I) -> StoreResult<Totals>
where
    I: IntoIterator<Item = PricedLine>,
{
    let overflow = || StoreError::invalid("price total is too large");
    let mut totals = Totals::default();
    for line in lines {
        let num = i64::from(line.num);
        let origin = num.checked_mul(line.origin_price).ok_or_else(overflow)?;
        let discounted = num.checked_mul(line.price).ok_or_else(overflow)?;
        totals.total_price = totals.total_price.checked_add(origin).ok_or_else(overflow)?;
        totals.final_price = totals.final_price.checked_add(discounted).ok_or_else(overflow)?;
    }
    Ok(totals)
}

/// `final_price * (100 - percent) / 100`, truncated toward zero.
pub fn apply_discount(final_price: i64, percent: i32) -> i64 {
    let keep = 100 - i64::from(percent.clamp(0, 100));
    final_price.saturating_mul(keep) / 100
}

pub fn totals_with_coupon(totals: Totals, percent: Option<i32>) -> Totals {
    match percent {
        Some(percent) => Totals {
            total_price: totals.total_price,
            final_price: apply_discount(totals.final_price, percent),
        },
        None => totals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(num: i32, origin_price: i64, price: i64) -> PricedLine {
        PricedLine {
            num,
            origin_price,
            price,
        }
    }

    #[test]
    fn order_with_ten_percent_coupon() {
        let totals = sum_lines([line(2, 100, 90), line(3, 50, 40)]).unwrap();
        assert_eq!(totals.total_price, 350);
        assert_eq!(totals.final_price, 300);

        let discounted = totals_with_coupon(totals, Some(10));
        assert_eq!(discounted.total_price, 350);
        assert_eq!(discounted.final_price, 270);
    }

    #[test]
    fn discount_truncates_toward_zero() {
        assert_eq!(apply_discount(90, 10), 81);
        assert_eq!(apply_discount(99, 15), 84);
        assert_eq!(apply_discount(1, 50), 0);
        assert_eq!(apply_discount(100, 100), 0);
    }

    #[test]
    fn no_coupon_keeps_final_price() {
        let totals = sum_lines([line(1, 100, 90)]).unwrap();
        assert_eq!(totals_with_coupon(totals, None).final_price, 90);
    }

    #[test]
    fn duplicate_products_are_merged_in_first_seen_order() {
        let merged = merge_line_items(&[
            LineItem { product_id: 7, num: 1 },
            LineItem { product_id: 3, num: 2 },
            LineItem { product_id: 7, num: 4 },
        ])
        .unwrap();
        assert_eq!(
            merged,
            vec![
                LineItem { product_id: 7, num: 5 },
                LineItem { product_id: 3, num: 2 },
            ]
        );
    }

    #[test]
    fn non_positive_quantity_is_rejected() {
        let err = merge_line_items(&[LineItem { product_id: 1, num: 0 }]).unwrap_err();
        assert_eq!(err.kind(), crate::store::ErrorKind::CheckViolation);
    }

    #[test]
    fn overflowing_totals_are_rejected() {
        let err = sum_lines([line(i32::MAX, i64::MAX, 1)]).unwrap_err();
        assert_eq!(err.kind(), crate::store::ErrorKind::CheckViolation);
    }
}
