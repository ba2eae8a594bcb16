use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ConfigurationError;

/// Every input the landed-cost pipeline reads, named as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterField {
    ManufacturerDiscountPct,
    AnnualUpdateFactorPct,
    EurUsdBufferPct,
    UsdLocalBufferPct,
    InsuranceRatePct,
    AdditionalMarginPct,
    AdValoremDutyPct,
    VatPct,
    OriginLogisticsCostEur,
    MainFreightUsd,
    DestinationSurchargesUsd,
    CustomsAgentFeeUsd,
    PortAndMiscFeesUsd,
    NationalTransportLocal,
    BaseFactoryCostEur,
    QuotationYear,
    CurrentYear,
    ApplyTradeAgreement,
}

impl ParameterField {
    pub const ALL: [ParameterField; 18] = [
        ParameterField::ManufacturerDiscountPct,
        ParameterField::AnnualUpdateFactorPct,
        ParameterField::EurUsdBufferPct,
        ParameterField::UsdLocalBufferPct,
        ParameterField::InsuranceRatePct,
        ParameterField::AdditionalMarginPct,
        ParameterField::AdValoremDutyPct,
        ParameterField::VatPct,
        ParameterField::OriginLogisticsCostEur,
        ParameterField::MainFreightUsd,
        ParameterField::DestinationSurchargesUsd,
        ParameterField::CustomsAgentFeeUsd,
        ParameterField::PortAndMiscFeesUsd,
        ParameterField::NationalTransportLocal,
        ParameterField::BaseFactoryCostEur,
        ParameterField::QuotationYear,
        ParameterField::CurrentYear,
        ParameterField::ApplyTradeAgreement,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ParameterField::ManufacturerDiscountPct => "manufacturerDiscountPct",
            ParameterField::AnnualUpdateFactorPct => "annualUpdateFactorPct",
            ParameterField::EurUsdBufferPct => "eurUsdBufferPct",
            ParameterField::UsdLocalBufferPct => "usdLocalBufferPct",
            ParameterField::InsuranceRatePct => "insuranceRatePct",
            ParameterField::AdditionalMarginPct => "additionalMarginPct",
            ParameterField::AdValoremDutyPct => "adValoremDutyPct",
            ParameterField::VatPct => "vatPct",
            ParameterField::OriginLogisticsCostEur => "originLogisticsCostEur",
            ParameterField::MainFreightUsd => "mainFreightUsd",
            ParameterField::DestinationSurchargesUsd => "destinationSurchargesUsd",
            ParameterField::CustomsAgentFeeUsd => "customsAgentFeeUsd",
            ParameterField::PortAndMiscFeesUsd => "portAndMiscFeesUsd",
            ParameterField::NationalTransportLocal => "nationalTransportLocal",
            ParameterField::BaseFactoryCostEur => "baseFactoryCostEur",
            ParameterField::QuotationYear => "quotationYear",
            ParameterField::CurrentYear => "currentYear",
            ParameterField::ApplyTradeAgreement => "applyTradeAgreement",
        }
    }

    /// Fields stored as decimals and entered by users as whole percents.
    pub fn is_percentage(&self) -> bool {
        matches!(
            self,
            ParameterField::ManufacturerDiscountPct
                | ParameterField::AnnualUpdateFactorPct
                | ParameterField::EurUsdBufferPct
                | ParameterField::UsdLocalBufferPct
                | ParameterField::InsuranceRatePct
                | ParameterField::AdditionalMarginPct
                | ParameterField::AdValoremDutyPct
                | ParameterField::VatPct
        )
    }

    /// Trade-agreement flag is the only optional input; it defaults to false.
    pub fn is_required(&self) -> bool {
        !matches!(self, ParameterField::ApplyTradeAgreement)
    }
}

impl fmt::Display for ParameterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A fully resolved set of pricing inputs. Percentages are decimals (0.06 = 6%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSet {
    pub manufacturer_discount_pct: f64,
    pub annual_update_factor_pct: f64,
    pub eur_usd_buffer_pct: f64,
    pub usd_local_buffer_pct: f64,
    pub insurance_rate_pct: f64,
    pub additional_margin_pct: f64,
    pub ad_valorem_duty_pct: f64,
    pub vat_pct: f64,
    pub origin_logistics_cost_eur: f64,
    pub main_freight_usd: f64,
    pub destination_surcharges_usd: f64,
    pub customs_agent_fee_usd: f64,
    pub port_and_misc_fees_usd: f64,
    pub national_transport_local: f64,
    pub base_factory_cost_eur: f64,
    pub quotation_year: i32,
    pub current_year: i32,
    #[serde(default)]
    pub apply_trade_agreement: bool,
}

impl ParameterSet {
    /// Percentage inputs paired with their field, in declaration order.
    pub fn percentages(&self) -> [(ParameterField, f64); 8] {
        [
            (ParameterField::ManufacturerDiscountPct, self.manufacturer_discount_pct),
            (ParameterField::AnnualUpdateFactorPct, self.annual_update_factor_pct),
            (ParameterField::EurUsdBufferPct, self.eur_usd_buffer_pct),
            (ParameterField::UsdLocalBufferPct, self.usd_local_buffer_pct),
            (ParameterField::InsuranceRatePct, self.insurance_rate_pct),
            (ParameterField::AdditionalMarginPct, self.additional_margin_pct),
            (ParameterField::AdValoremDutyPct, self.ad_valorem_duty_pct),
            (ParameterField::VatPct, self.vat_pct),
        ]
    }

    /// Money inputs paired with their field, base factory cost excluded.
    pub fn amounts(&self) -> [(ParameterField, f64); 6] {
        [
            (ParameterField::OriginLogisticsCostEur, self.origin_logistics_cost_eur),
            (ParameterField::MainFreightUsd, self.main_freight_usd),
            (ParameterField::DestinationSurchargesUsd, self.destination_surcharges_usd),
            (ParameterField::CustomsAgentFeeUsd, self.customs_agent_fee_usd),
            (ParameterField::PortAndMiscFeesUsd, self.port_and_misc_fees_usd),
            (ParameterField::NationalTransportLocal, self.national_transport_local),
        ]
    }

    /// Duty rate after the trade-agreement flag is taken into account.
    pub fn effective_duty_pct(&self) -> f64 {
        if self.apply_trade_agreement {
            0.0
        } else {
            self.ad_valorem_duty_pct
        }
    }
}

impl From<ParameterSet> for PartialParameterSet {
    fn from(p: ParameterSet) -> Self {
        Self {
            manufacturer_discount_pct: Some(p.manufacturer_discount_pct),
            annual_update_factor_pct: Some(p.annual_update_factor_pct),
            eur_usd_buffer_pct: Some(p.eur_usd_buffer_pct),
            usd_local_buffer_pct: Some(p.usd_local_buffer_pct),
            insurance_rate_pct: Some(p.insurance_rate_pct),
            additional_margin_pct: Some(p.additional_margin_pct),
            ad_valorem_duty_pct: Some(p.ad_valorem_duty_pct),
            vat_pct: Some(p.vat_pct),
            origin_logistics_cost_eur: Some(p.origin_logistics_cost_eur),
            main_freight_usd: Some(p.main_freight_usd),
            destination_surcharges_usd: Some(p.destination_surcharges_usd),
            customs_agent_fee_usd: Some(p.customs_agent_fee_usd),
            port_and_misc_fees_usd: Some(p.port_and_misc_fees_usd),
            national_transport_local: Some(p.national_transport_local),
            base_factory_cost_eur: Some(p.base_factory_cost_eur),
            quotation_year: Some(p.quotation_year),
            current_year: Some(p.current_year),
            apply_trade_agreement: Some(p.apply_trade_agreement),
        }
    }
}

/// The fields an administrator chose to set in one scope. `Some` means present,
/// even when the value is zero or false.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PartialParameterSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer_discount_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_update_factor_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eur_usd_buffer_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usd_local_buffer_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insurance_rate_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_margin_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ad_valorem_duty_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vat_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_logistics_cost_eur: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_freight_usd: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_surcharges_usd: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customs_agent_fee_usd: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port_and_misc_fees_usd: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub national_transport_local: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_factory_cost_eur: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quotation_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apply_trade_agreement: Option<bool>,
}

impl PartialParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_present(&self, field: ParameterField) -> bool {
        match field {
            ParameterField::ManufacturerDiscountPct => self.manufacturer_discount_pct.is_some(),
            ParameterField::AnnualUpdateFactorPct => self.annual_update_factor_pct.is_some(),
            ParameterField::EurUsdBufferPct => self.eur_usd_buffer_pct.is_some(),
            ParameterField::UsdLocalBufferPct => self.usd_local_buffer_pct.is_some(),
            ParameterField::InsuranceRatePct => self.insurance_rate_pct.is_some(),
            ParameterField::AdditionalMarginPct => self.additional_margin_pct.is_some(),
            ParameterField::AdValoremDutyPct => self.ad_valorem_duty_pct.is_some(),
            ParameterField::VatPct => self.vat_pct.is_some(),
            ParameterField::OriginLogisticsCostEur => self.origin_logistics_cost_eur.is_some(),
            ParameterField::MainFreightUsd => self.main_freight_usd.is_some(),
            ParameterField::DestinationSurchargesUsd => self.destination_surcharges_usd.is_some(),
            ParameterField::CustomsAgentFeeUsd => self.customs_agent_fee_usd.is_some(),
            ParameterField::PortAndMiscFeesUsd => self.port_and_misc_fees_usd.is_some(),
            ParameterField::NationalTransportLocal => self.national_transport_local.is_some(),
            ParameterField::BaseFactoryCostEur => self.base_factory_cost_eur.is_some(),
            ParameterField::QuotationYear => self.quotation_year.is_some(),
            ParameterField::CurrentYear => self.current_year.is_some(),
            ParameterField::ApplyTradeAgreement => self.apply_trade_agreement.is_some(),
        }
    }

    /// Present fields, in declaration order.
    pub fn present_fields(&self) -> Vec<ParameterField> {
        ParameterField::ALL
            .iter()
            .copied()
            .filter(|f| self.is_present(*f))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.present_fields().is_empty()
    }

    /// Copy every present field of `upper` over `self`. Absent fields of `upper`
    /// leave `self` untouched.
    pub fn overlay(&mut self, upper: &PartialParameterSet) {
        fn take<T: Copy>(slot: &mut Option<T>, upper: Option<T>) {
            if upper.is_some() {
                *slot = upper;
            }
        }

        take(&mut self.manufacturer_discount_pct, upper.manufacturer_discount_pct);
        take(&mut self.annual_update_factor_pct, upper.annual_update_factor_pct);
        take(&mut self.eur_usd_buffer_pct, upper.eur_usd_buffer_pct);
        take(&mut self.usd_local_buffer_pct, upper.usd_local_buffer_pct);
        take(&mut self.insurance_rate_pct, upper.insurance_rate_pct);
        take(&mut self.additional_margin_pct, upper.additional_margin_pct);
        take(&mut self.ad_valorem_duty_pct, upper.ad_valorem_duty_pct);
        take(&mut self.vat_pct, upper.vat_pct);
        take(&mut self.origin_logistics_cost_eur, upper.origin_logistics_cost_eur);
        take(&mut self.main_freight_usd, upper.main_freight_usd);
        take(&mut self.destination_surcharges_usd, upper.destination_surcharges_usd);
        take(&mut self.customs_agent_fee_usd, upper.customs_agent_fee_usd);
        take(&mut self.port_and_misc_fees_usd, upper.port_and_misc_fees_usd);
        take(&mut self.national_transport_local, upper.national_transport_local);
        take(&mut self.base_factory_cost_eur, upper.base_factory_cost_eur);
        take(&mut self.quotation_year, upper.quotation_year);
        take(&mut self.current_year, upper.current_year);
        take(&mut self.apply_trade_agreement, upper.apply_trade_agreement);
    }

    /// Builder-style overlay.
    pub fn overlaid(mut self, upper: &PartialParameterSet) -> Self {
        self.overlay(upper);
        self
    }

    /// Required fields with no value, in declaration order.
    pub fn missing_required(&self) -> Vec<ParameterField> {
        ParameterField::ALL
            .iter()
            .copied()
            .filter(|f| f.is_required() && !self.is_present(*f))
            .collect()
    }

    /// Convert into a complete set, reporting every absent required field at once.
    pub fn into_complete(self) -> Result<ParameterSet, ConfigurationError> {
        let missing = self.missing_required();
        if !missing.is_empty() {
            return Err(ConfigurationError { missing });
        }

        match self {
            PartialParameterSet {
                manufacturer_discount_pct: Some(manufacturer_discount_pct),
                annual_update_factor_pct: Some(annual_update_factor_pct),
                eur_usd_buffer_pct: Some(eur_usd_buffer_pct),
                usd_local_buffer_pct: Some(usd_local_buffer_pct),
                insurance_rate_pct: Some(insurance_rate_pct),
                additional_margin_pct: Some(additional_margin_pct),
                ad_valorem_duty_pct: Some(ad_valorem_duty_pct),
                vat_pct: Some(vat_pct),
                origin_logistics_cost_eur: Some(origin_logistics_cost_eur),
                main_freight_usd: Some(main_freight_usd),
                destination_surcharges_usd: Some(destination_surcharges_usd),
                customs_agent_fee_usd: Some(customs_agent_fee_usd),
                port_and_misc_fees_usd: Some(port_and_misc_fees_usd),
                national_transport_local: Some(national_transport_local),
                base_factory_cost_eur: Some(base_factory_cost_eur),
                quotation_year: Some(quotation_year),
                current_year: Some(current_year),
                apply_trade_agreement,
            } => Ok(ParameterSet {
                manufacturer_discount_pct,
                annual_update_factor_pct,
                eur_usd_buffer_pct,
                usd_local_buffer_pct,
                insurance_rate_pct,
                additional_margin_pct,
                ad_valorem_duty_pct,
                vat_pct,
                origin_logistics_cost_eur,
                main_freight_usd,
                destination_surcharges_usd,
                customs_agent_fee_usd,
                port_and_misc_fees_usd,
                national_transport_local,
                base_factory_cost_eur,
                quotation_year,
                current_year,
                apply_trade_agreement: apply_trade_agreement.unwrap_or(false),
            }),
            // missing_required already covers every None above
            _ => Err(ConfigurationError { missing: Vec::new() }),
        }
    }
}
