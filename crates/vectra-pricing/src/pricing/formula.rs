//! Lotação pricing formula
//!
//! ```text
//! Revenue     = weight_t × price_per_ton + invoice × (freight% + GRIS% + TSO%)
//! Taxes       = ICMS + PIS/COFINS (3.65%)
//! Margin      = Revenue - (Operational + Taxes)
//! Net margin  = Margin × 0.85
//! ```
//!
//! Pure functions of the input and the values returned by the lookups.
//! The operand order below is part of the contract: results are compared
//! bit for bit across calls.

use vectra_common::{
    QuotationInput, QuotationResult, Tariff, TollSource, COFINS_RATE, NET_MARGIN_FACTOR, PIS_COFINS_RATE,
    PIS_RATE, VIABILITY_THRESHOLD_PERCENT,
};

/// Toll figure resolved by the engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedToll {
    pub value: f64,
    pub source: TollSource,
}

impl ResolvedToll {
    pub fn informed(value: f64) -> Self {
        Self {
            value,
            source: TollSource::Informed,
        }
    }

    pub fn estimated(value: f64) -> Self {
        Self {
            value,
            source: TollSource::Estimated,
        }
    }

    /// Estimator unavailable: counted as zero
    pub fn fallback() -> Self {
        Self {
            value: 0.0,
            source: TollSource::Fallback,
        }
    }
}

/// The four tariff-derived revenue terms
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TariffRevenue {
    pub weight_freight: f64,
    pub freight_value: f64,
    pub gris: f64,
    pub tso: f64,
}

impl TariffRevenue {
    pub fn compute(weight_kg: f64, invoice_value: f64, tariff: &Tariff) -> Self {
        let weight_ton = weight_kg / 1000.0;
        Self {
            weight_freight: weight_ton * tariff.price_per_ton,
            freight_value: invoice_value * (tariff.freight_value_percent / 100.0),
            gris: invoice_value * (tariff.gris_percent / 100.0),
            tso: invoice_value * (tariff.tso_percent / 100.0),
        }
    }

    pub fn total(&self) -> f64 {
        self.weight_freight + self.freight_value + self.gris + self.tso
    }
}

/// Itemized taxes over revenue
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaxBreakdown {
    pub icms_value: f64,
    pub pis_value: f64,
    pub cofins_value: f64,
    /// Combined figure computed from the 3.65% rate, not from `pis + cofins`
    pub pis_cofins_value: f64,
}

impl TaxBreakdown {
    pub fn compute(revenue: f64, icms_rate: f64) -> Self {
        Self {
            icms_value: revenue * (icms_rate / 100.0),
            pis_value: revenue * PIS_RATE,
            cofins_value: revenue * COFINS_RATE,
            pis_cofins_value: revenue * PIS_COFINS_RATE,
        }
    }

    /// ICMS + combined PIS/COFINS
    pub fn total(&self) -> f64 {
        self.icms_value + self.pis_cofins_value
    }
}

/// Freight revenue: tariff-derived in table mode, informed otherwise
pub fn revenue(input: &QuotationInput, tariff: Option<&Tariff>) -> f64 {
    match (input.use_table, tariff) {
        (true, Some(tariff)) => TariffRevenue::compute(input.weight_kg, input.invoice_value, tariff).total(),
        _ => input.informed_freight.unwrap_or(0.0),
    }
}

/// Loading + unloading + equipment rent + toll
pub fn operational_costs(input: &QuotationInput, toll_value: f64) -> f64 {
    input.loading_cost.unwrap_or(0.0)
        + input.unloading_cost.unwrap_or(0.0)
        + input.equipment_rent.unwrap_or(0.0)
        + toll_value
}

/// Gross margin as a percentage of revenue; 0 when there is no revenue
pub fn margin_percent(margin_value: f64, revenue: f64) -> f64 {
    if revenue > 0.0 {
        (margin_value / revenue) * 100.0
    } else {
        0.0
    }
}

pub fn is_viable(gross_margin_percent: f64) -> bool {
    gross_margin_percent >= VIABILITY_THRESHOLD_PERCENT
}

/// Price a quotation from already-resolved lookup values
pub fn price(input: &QuotationInput, tariff: Option<&Tariff>, icms_rate: f64, toll: ResolvedToll) -> QuotationResult {
    let revenue = revenue(input, tariff);
    let total_operational_costs = operational_costs(input, toll.value);

    let taxes = TaxBreakdown::compute(revenue, icms_rate);
    let total_taxes = taxes.total();

    let total_costs = total_operational_costs + total_taxes;
    let gross_margin_value = revenue - total_costs;
    let gross_margin_percent = margin_percent(gross_margin_value, revenue);

    QuotationResult {
        revenue,
        calculated_revenue: revenue,
        adjusted_revenue: revenue,
        final_freight: revenue,
        tax_base: revenue,
        total_operational_costs,
        toll_value: toll.value,
        toll_source: toll.source,
        icms_rate,
        icms_value: taxes.icms_value,
        pis_value: taxes.pis_value,
        cofins_value: taxes.cofins_value,
        pis_cofins_value: taxes.pis_cofins_value,
        total_taxes,
        total_costs,
        gross_margin_value,
        gross_margin_percent,
        is_viable: is_viable(gross_margin_percent),
        net_margin: gross_margin_value * NET_MARGIN_FACTOR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPSILON: f64 = 1e-9;

    fn reference_tariff() -> Tariff {
        Tariff::new(101.0, 500.0, 85.2, 0.4, 0.2, 0.1)
    }

    fn truck_input() -> QuotationInput {
        QuotationInput::new("SP", "RJ", 300.0, 12_000.0, 50_000.0).with_vehicle_type("truck")
    }

    #[test]
    fn test_reference_scenario() {
        let tariff = reference_tariff();
        let result = price(&truck_input(), Some(&tariff), 12.0, ResolvedToll::informed(0.0));

        assert!((result.revenue - 1372.4).abs() < EPSILON);
        assert!((result.icms_value - 164.688).abs() < EPSILON);
        assert!((result.pis_cofins_value - 50.1926).abs() < EPSILON);
        assert!((result.total_costs - 214.8806).abs() < EPSILON);
        assert!((result.gross_margin_value - 1157.5194).abs() < EPSILON);
        assert!((result.gross_margin_percent - 84.342).abs() < 1e-3);
        assert!(result.is_viable);
        assert!((result.net_margin - 1157.5194 * 0.85).abs() < EPSILON);
    }

    #[test]
    fn test_itemized_and_combined_pis_cofins_are_both_reported() {
        let taxes = TaxBreakdown::compute(1000.0, 12.0);
        assert!((taxes.pis_value - 6.5).abs() < EPSILON);
        assert!((taxes.cofins_value - 30.0).abs() < EPSILON);
        assert!((taxes.pis_cofins_value - 36.5).abs() < EPSILON);
        assert!((taxes.total() - 156.5).abs() < EPSILON);
    }

    #[test]
    fn test_manual_mode_uses_informed_freight() {
        let input = truck_input().with_informed_freight(1000.0);
        // a tariff handed in by mistake is ignored outside table mode
        let result = price(&input, Some(&reference_tariff()), 12.0, ResolvedToll::informed(0.0));
        assert_eq!(result.revenue, 1000.0);
    }

    #[test]
    fn test_zero_revenue_is_not_viable() {
        let mut input = truck_input().with_operational_costs(100.0, 50.0, 0.0);
        input.use_table = false;
        let result = price(&input, None, 12.0, ResolvedToll::fallback());

        assert_eq!(result.revenue, 0.0);
        assert_eq!(result.gross_margin_percent, 0.0);
        assert!(!result.is_viable);
        assert_eq!(result.gross_margin_value, -150.0);
    }

    #[test]
    fn test_toll_counts_as_operational_cost() {
        let input = truck_input()
            .with_informed_freight(2000.0)
            .with_operational_costs(100.0, 80.0, 20.0);
        let result = price(&input, None, 12.0, ResolvedToll::estimated(75.0));

        assert_eq!(result.total_operational_costs, 275.0);
        assert_eq!(result.toll_value, 75.0);
        assert_eq!(result.toll_source, TollSource::Estimated);
    }

    #[test]
    fn test_viability_threshold_is_inclusive() {
        assert!(is_viable(10.0));
        assert!(!is_viable(9.999_999));
    }

    proptest! {
        #[test]
        fn prop_table_revenue_is_sum_of_terms(
            weight in 1.0f64..60_000.0,
            invoice in 1.0f64..2_000_000.0,
            price_per_ton in 0.0f64..500.0,
            fv in 0.0f64..5.0,
            gris in 0.0f64..5.0,
            tso in 0.0f64..5.0,
        ) {
            let tariff = Tariff::new(0.0, 5000.0, price_per_ton, fv, gris, tso);
            let input = QuotationInput::new("SP", "MG", 400.0, weight, invoice);
            let result = price(&input, Some(&tariff), 12.0, ResolvedToll::informed(0.0));

            let expected = (weight / 1000.0) * price_per_ton
                + invoice * (fv / 100.0)
                + invoice * (gris / 100.0)
                + invoice * (tso / 100.0);
            prop_assert_eq!(result.revenue, expected);
        }

        #[test]
        fn prop_viability_matches_threshold(
            freight in 0.0f64..100_000.0,
            loading in 0.0f64..50_000.0,
            toll in 0.0f64..5_000.0,
            icms in 0.0f64..25.0,
        ) {
            let input = QuotationInput::new("SP", "MG", 400.0, 1000.0, 1000.0)
                .with_informed_freight(freight)
                .with_operational_costs(loading, 0.0, 0.0);
            let result = price(&input, None, icms, ResolvedToll::informed(toll));

            prop_assert_eq!(result.is_viable, result.gross_margin_percent >= 10.0);
            if result.revenue == 0.0 {
                prop_assert_eq!(result.gross_margin_percent, 0.0);
            }
        }

        #[test]
        fn prop_pricing_is_deterministic(
            freight in 0.0f64..100_000.0,
            icms in 0.0f64..25.0,
        ) {
            let input = QuotationInput::new("RS", "BA", 2000.0, 1000.0, 1000.0)
                .with_informed_freight(freight);
            let first = price(&input, None, icms, ResolvedToll::fallback());
            let second = price(&input, None, icms, ResolvedToll::fallback());

            prop_assert_eq!(first.net_margin.to_bits(), second.net_margin.to_bits());
            prop_assert_eq!(first, second);
        }
    }
}
