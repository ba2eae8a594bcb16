use landed_core::{
    ExchangeRateSnapshot, ParameterField, ParameterSet, ValidationError, Violation, ViolationKind,
};
use serde::{Deserialize, Serialize};

/// Insurable value is CFR plus a 10% margin.
pub const INSURABLE_VALUE_FACTOR: f64 = 1.10;

/// Longest projection between the cost reference year and the quotation year.
pub const MAX_ESCALATION_YEARS: i64 = 100;

fn escalation_years(p: &ParameterSet) -> i64 {
    i64::from(p.quotation_year) - i64::from(p.current_year)
}

/// Every value the landed-cost pipeline produces, one field per step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    // factory
    pub update_factor: f64,
    pub escalated_cost_eur: f64,
    pub net_factory_cost_eur_exw: f64,
    pub applied_eur_usd: f64,
    pub factory_cost_usd_exw: f64,

    // freight and insurance
    pub origin_costs_usd: f64,
    pub freight_handling_usd: f64,
    pub cfr_usd: f64,
    pub insurance_base_usd: f64,
    pub insurance_premium_usd: f64,
    pub cif_usd: f64,

    // import
    pub effective_duty_pct: f64,
    pub duty_usd: f64,
    pub import_vat_base_usd: f64,
    pub import_vat_usd: f64,
    pub other_import_costs_usd: f64,
    pub national_transport_usd: f64,
    pub landed_cost_usd: f64,

    // local currency and sale
    pub applied_usd_local: f64,
    pub landed_cost_local: f64,
    pub margin_local: f64,
    pub net_sale_price_local: f64,
    pub sale_vat_local: f64,
    pub final_sale_price_local: f64,
}

impl CalculationResult {
    fn steps(&self) -> [(&'static str, f64); 24] {
        [
            ("updateFactor", self.update_factor),
            ("escalatedCostEur", self.escalated_cost_eur),
            ("netFactoryCostEurExw", self.net_factory_cost_eur_exw),
            ("appliedEurUsd", self.applied_eur_usd),
            ("factoryCostUsdExw", self.factory_cost_usd_exw),
            ("originCostsUsd", self.origin_costs_usd),
            ("freightHandlingUsd", self.freight_handling_usd),
            ("cfrUsd", self.cfr_usd),
            ("insuranceBaseUsd", self.insurance_base_usd),
            ("insurancePremiumUsd", self.insurance_premium_usd),
            ("cifUsd", self.cif_usd),
            ("effectiveDutyPct", self.effective_duty_pct),
            ("dutyUsd", self.duty_usd),
            ("importVatBaseUsd", self.import_vat_base_usd),
            ("importVatUsd", self.import_vat_usd),
            ("otherImportCostsUsd", self.other_import_costs_usd),
            ("nationalTransportUsd", self.national_transport_usd),
            ("landedCostUsd", self.landed_cost_usd),
            ("appliedUsdLocal", self.applied_usd_local),
            ("landedCostLocal", self.landed_cost_local),
            ("marginLocal", self.margin_local),
            ("netSalePriceLocal", self.net_sale_price_local),
            ("saleVatLocal", self.sale_vat_local),
            ("finalSalePriceLocal", self.final_sale_price_local),
        ]
    }

    /// Name of the earliest step that left the finite range, if any.
    pub fn first_non_finite(&self) -> Option<&'static str> {
        self.steps()
            .into_iter()
            .find(|(_, value)| !value.is_finite())
            .map(|(name, _)| name)
    }
}

/// The landed-cost pipeline. Stateless; one instance can serve any number of
/// concurrent callers.
#[derive(Debug, Clone, Copy, Default)]
pub struct LandedCostCalculator;

impl LandedCostCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Check every precondition and report all failures together.
    pub fn validate(
        &self,
        params: &ParameterSet,
        rates: &ExchangeRateSnapshot,
    ) -> Result<(), ValidationError> {
        let mut violations = Vec::new();

        for (field, value) in [("rates.eurUsd", rates.eur_usd), ("rates.usdLocal", rates.usd_local)] {
            if !value.is_finite() {
                violations.push(Violation::new(field, ViolationKind::NotFinite));
            } else if value <= 0.0 {
                violations.push(Violation::new(field, ViolationKind::NotPositive { value }));
            }
        }

        let years = escalation_years(params);
        if years < 0 {
            violations.push(Violation::new(
                ParameterField::CurrentYear.name(),
                ViolationKind::YearOrder {
                    current_year: params.current_year,
                    quotation_year: params.quotation_year,
                },
            ));
        } else if years > MAX_ESCALATION_YEARS {
            violations.push(Violation::new(
                ParameterField::QuotationYear.name(),
                ViolationKind::YearGapTooLarge {
                    years,
                    max: MAX_ESCALATION_YEARS,
                },
            ));
        }

        let base = params.base_factory_cost_eur;
        if !base.is_finite() {
            violations.push(Violation::new(
                ParameterField::BaseFactoryCostEur.name(),
                ViolationKind::NotFinite,
            ));
        } else if base <= 0.0 {
            violations.push(Violation::new(
                ParameterField::BaseFactoryCostEur.name(),
                ViolationKind::NotPositive { value: base },
            ));
        }

        for (field, value) in params.percentages() {
            if !value.is_finite() {
                violations.push(Violation::new(field.name(), ViolationKind::NotFinite));
            } else if !(0.0..=1.0).contains(&value) {
                violations.push(Violation::new(
                    field.name(),
                    ViolationKind::PercentageOutOfRange { value },
                ));
            }
        }

        for (field, value) in params.amounts() {
            if !value.is_finite() {
                violations.push(Violation::new(field.name(), ViolationKind::NotFinite));
            } else if value < 0.0 {
                violations.push(Violation::new(field.name(), ViolationKind::Negative { value }));
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { violations })
        }
    }

    /// Run the full pipeline. Invalid inputs are rejected before any arithmetic;
    /// inputs that push a step beyond the `f64` range are rejected afterwards.
    /// No partial result is ever returned.
    pub fn calculate(
        &self,
        params: ParameterSet,
        rates: ExchangeRateSnapshot,
    ) -> Result<CalculationResult, ValidationError> {
        self.validate(&params, &rates)?;
        let result = Self::run_pipeline(&params, &rates);

        match result.first_non_finite() {
            None => Ok(result),
            Some(step) => Err(ValidationError {
                violations: vec![Violation::new(
                    format!("result.{}", step),
                    ViolationKind::NotFinite,
                )],
            }),
        }
    }

    fn run_pipeline(p: &ParameterSet, rates: &ExchangeRateSnapshot) -> CalculationResult {
        // Escalation projects the reference-year cost forward to the quotation year.
        // validate bounds the gap to [0, MAX_ESCALATION_YEARS]
        let years = escalation_years(p).clamp(0, MAX_ESCALATION_YEARS) as i32;
        let update_factor = (1.0 + p.annual_update_factor_pct).powi(years);
        let escalated_cost_eur = p.base_factory_cost_eur * update_factor;
        let net_factory_cost_eur_exw = escalated_cost_eur * (1.0 - p.manufacturer_discount_pct);

        let applied_eur_usd = rates.eur_usd * (1.0 + p.eur_usd_buffer_pct);
        let factory_cost_usd_exw = net_factory_cost_eur_exw * applied_eur_usd;

        let origin_costs_usd = p.origin_logistics_cost_eur * applied_eur_usd;
        let freight_handling_usd =
            origin_costs_usd + p.main_freight_usd + p.destination_surcharges_usd;
        let cfr_usd = factory_cost_usd_exw + freight_handling_usd;

        let insurance_base_usd = cfr_usd * INSURABLE_VALUE_FACTOR;
        let insurance_premium_usd = insurance_base_usd * p.insurance_rate_pct;
        let cif_usd = factory_cost_usd_exw + freight_handling_usd + insurance_premium_usd;

        let effective_duty_pct = p.effective_duty_pct();
        let duty_usd = cif_usd * effective_duty_pct;

        // Import VAT is reported but not part of landed cost.
        let import_vat_base_usd = cif_usd + duty_usd;
        let import_vat_usd = import_vat_base_usd * p.vat_pct;

        let other_import_costs_usd = duty_usd + p.customs_agent_fee_usd + p.port_and_misc_fees_usd;
        // unbuffered rate on purpose: the amount is already in local currency
        let national_transport_usd = p.national_transport_local / rates.usd_local;
        let landed_cost_usd = cif_usd + other_import_costs_usd + national_transport_usd;

        let applied_usd_local = rates.usd_local * (1.0 + p.usd_local_buffer_pct);
        let landed_cost_local = landed_cost_usd * applied_usd_local;

        let margin_local = landed_cost_local * p.additional_margin_pct;
        let net_sale_price_local = landed_cost_local + margin_local;
        let sale_vat_local = net_sale_price_local * p.vat_pct;
        let final_sale_price_local = net_sale_price_local + sale_vat_local;

        CalculationResult {
            update_factor,
            escalated_cost_eur,
            net_factory_cost_eur_exw,
            applied_eur_usd,
            factory_cost_usd_exw,
            origin_costs_usd,
            freight_handling_usd,
            cfr_usd,
            insurance_base_usd,
            insurance_premium_usd,
            cif_usd,
            effective_duty_pct,
            duty_usd,
            import_vat_base_usd,
            import_vat_usd,
            other_import_costs_usd,
            national_transport_usd,
            landed_cost_usd,
            applied_usd_local,
            landed_cost_local,
            margin_local,
            net_sale_price_local,
            sale_vat_local,
            final_sale_price_local,
        }
    }
}
