//! Sale-cost pricing over the catalog.

use crate::discount::DiscountPercent;
use crate::product::Product;

/// Sale value of one catalog line: `quantity × price`, discounted when the
/// product is on promotion.
pub fn sale_value(product: &Product, discount: DiscountPercent) -> f64 {
    let unit_price = if product.on_promotion {
        product.price * discount.multiplier()
    } else {
        product.price
    };
    f64::from(product.quantity) * unit_price
}

/// Aggregate sale cost of the given products, discounting only promoted ones.
pub fn discounted_sale_cost<'a>(
    products: impl IntoIterator<Item = &'a Product>,
    discount: DiscountPercent,
) -> f64 {
    products.into_iter().map(|p| sale_value(p, discount)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(price: f64, quantity: u32, on_promotion: bool) -> Product {
        Product {
            price,
            quantity,
            on_promotion,
            ..Product::default()
        }
    }

    fn pct(p: f64) -> DiscountPercent {
        DiscountPercent::new(p).unwrap()
    }

    #[test]
    fn discount_applies_only_to_promoted_products() {
        let products = [line(100.0, 5, false), line(200.0, 3, true)];
        let cost = discounted_sale_cost(&products, pct(10.0));
        assert!((cost - (5.0 * 100.0 + 3.0 * 200.0 * 0.9)).abs() < 0.01);
        assert!((cost - 1040.0).abs() < 0.01);
    }

    #[test]
    fn empty_catalog_costs_nothing() {
        assert_eq!(discounted_sale_cost(&Vec::<Product>::new(), pct(50.0)), 0.0);
    }

    #[test]
    fn full_discount_zeroes_promoted_lines() {
        assert_eq!(sale_value(&line(80.0, 4, true), pct(100.0)), 0.0);
        assert_eq!(sale_value(&line(80.0, 4, false), pct(100.0)), 320.0);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn arb_line() -> impl Strategy<Value = Product> {
            (0.0f64..1_000.0, 0u32..500, any::<bool>())
                .prop_map(|(price, quantity, promo)| line(price, quantity, promo))
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: a zero discount yields the undiscounted stock value.
            #[test]
            fn zero_discount_is_plain_stock_value(
                products in prop::collection::vec(arb_line(), 0..30)
            ) {
                let plain: f64 = products.iter().map(|p| f64::from(p.quantity) * p.price).sum();
                let cost = discounted_sale_cost(&products, DiscountPercent::ZERO);
                prop_assert!((cost - plain).abs() < 1e-6);
            }

            /// Property: a larger discount never increases the sale cost.
            #[test]
            fn cost_is_non_increasing_in_discount(
                products in prop::collection::vec(arb_line(), 0..30),
                a in 0.0f64..=100.0,
                b in 0.0f64..=100.0,
            ) {
                let (low, high) = if a <= b { (a, b) } else { (b, a) };
                let at_low = discounted_sale_cost(&products, pct(low));
                let at_high = discounted_sale_cost(&products, pct(high));
                prop_assert!(at_high <= at_low + 1e-6);
            }
        }
    }
}
