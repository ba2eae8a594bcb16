use serde::{Deserialize, Serialize};

use crate::pricing::CalculationResult;

const RATE_DECIMALS: u32 = 6;

/// Round for display only. The calculator itself never rounds.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Headline figures for list views and quote documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSummary {
    pub currency: String,
    pub cif_usd: f64,
    pub landed_cost_usd: f64,
    pub landed_cost_local: f64,
    pub net_sale_price_local: f64,
    pub sale_vat_local: f64,
    pub final_sale_price_local: f64,
    pub applied_eur_usd: f64,
    pub applied_usd_local: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    Factory,
    FreightAndInsurance,
    Import,
    Local,
    Sale,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownLine {
    /// Stable field name of the underlying pipeline value
    pub key: String,
    pub label: String,
    pub amount: f64,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownStage {
    pub stage: Stage,
    pub lines: Vec<BreakdownLine>,
    pub subtotal: BreakdownLine,
}

/// Audit view: the pipeline grouped by stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteBreakdown {
    pub currency: String,
    pub stages: Vec<BreakdownStage>,
}

impl QuoteBreakdown {
    pub fn stage(&self, stage: Stage) -> Option<&BreakdownStage> {
        self.stages.iter().find(|s| s.stage == stage)
    }
}

/// Projects a [`CalculationResult`] into the shapes API callers render.
#[derive(Debug, Clone)]
pub struct PricingResultFormatter {
    local_currency: String,
    display_decimals: u32,
}

impl Default for PricingResultFormatter {
    fn default() -> Self {
        Self::new("CLP", 2)
    }
}

impl PricingResultFormatter {
    pub fn new(local_currency: impl Into<String>, display_decimals: u32) -> Self {
        Self {
            local_currency: local_currency.into(),
            display_decimals,
        }
    }

    pub fn local_currency(&self) -> &str {
        &self.local_currency
    }

    fn money(&self, value: f64) -> f64 {
        round_to(value, self.display_decimals)
    }

    pub fn summary(&self, r: &CalculationResult) -> QuoteSummary {
        QuoteSummary {
            currency: self.local_currency.clone(),
            cif_usd: self.money(r.cif_usd),
            landed_cost_usd: self.money(r.landed_cost_usd),
            landed_cost_local: self.money(r.landed_cost_local),
            net_sale_price_local: self.money(r.net_sale_price_local),
            sale_vat_local: self.money(r.sale_vat_local),
            final_sale_price_local: self.money(r.final_sale_price_local),
            applied_eur_usd: round_to(r.applied_eur_usd, RATE_DECIMALS),
            applied_usd_local: round_to(r.applied_usd_local, RATE_DECIMALS),
        }
    }

    pub fn breakdown(&self, r: &CalculationResult) -> QuoteBreakdown {
        let local = self.local_currency.as_str();
        let line = |key: &str, label: &str, amount: f64, currency: &str| BreakdownLine {
            key: key.to_string(),
            label: label.to_string(),
            amount: self.money(amount),
            currency: currency.to_string(),
        };

        let stages = vec![
            BreakdownStage {
                stage: Stage::Factory,
                lines: vec![
                    line("escalatedCostEur", "Escalated factory cost", r.escalated_cost_eur, "EUR"),
                    line(
                        "netFactoryCostEurExw",
                        "Net factory cost (EXW)",
                        r.net_factory_cost_eur_exw,
                        "EUR",
                    ),
                ],
                subtotal: line("factoryCostUsdExw", "Factory cost (EXW)", r.factory_cost_usd_exw, "USD"),
            },
            BreakdownStage {
                stage: Stage::FreightAndInsurance,
                lines: vec![
                    line("originCostsUsd", "Origin logistics", r.origin_costs_usd, "USD"),
                    line("freightHandlingUsd", "Freight and handling", r.freight_handling_usd, "USD"),
                    line("cfrUsd", "CFR value", r.cfr_usd, "USD"),
                    line("insurancePremiumUsd", "Insurance premium", r.insurance_premium_usd, "USD"),
                ],
                subtotal: line("cifUsd", "CIF value", r.cif_usd, "USD"),
            },
            BreakdownStage {
                stage: Stage::Import,
                lines: vec![
                    line("dutyUsd", "Ad valorem duty", r.duty_usd, "USD"),
                    line("importVatUsd", "Import VAT (informational)", r.import_vat_usd, "USD"),
                    line(
                        "otherImportCostsUsd",
                        "Duty, customs agent and port fees",
                        r.other_import_costs_usd,
                        "USD",
                    ),
                    line("nationalTransportUsd", "National transport", r.national_transport_usd, "USD"),
                ],
                subtotal: line("landedCostUsd", "Landed cost", r.landed_cost_usd, "USD"),
            },
            BreakdownStage {
                stage: Stage::Local,
                lines: vec![],
                subtotal: line("landedCostLocal", "Landed cost", r.landed_cost_local, local),
            },
            BreakdownStage {
                stage: Stage::Sale,
                lines: vec![
                    line("marginLocal", "Margin", r.margin_local, local),
                    line("netSalePriceLocal", "Net sale price", r.net_sale_price_local, local),
                    line("saleVatLocal", "VAT", r.sale_vat_local, local),
                ],
                subtotal: line("finalSalePriceLocal", "Final sale price", r.final_sale_price_local, local),
            },
        ];

        QuoteBreakdown {
            currency: self.local_currency.clone(),
            stages,
        }
    }
}
