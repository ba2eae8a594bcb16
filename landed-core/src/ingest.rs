use serde::{Deserialize, Serialize};

use crate::params::PartialParameterSet;

/// Parameters as an administrator or salesperson types them: percentage
/// fields hold whole percents (6 means 6%). Only [`UserParameterInput::ingest`]
/// turns these into the decimal form the resolver and calculator work with,
/// so a value can never be scaled twice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserParameterInput(PartialParameterSet);

impl UserParameterInput {
    pub fn new(raw: PartialParameterSet) -> Self {
        Self(raw)
    }

    /// Raw values as entered, percentages still in percent units.
    pub fn as_entered(&self) -> &PartialParameterSet {
        &self.0
    }

    pub fn ingest(self) -> PartialParameterSet {
        let mut p = self.0;
        for slot in [
            &mut p.manufacturer_discount_pct,
            &mut p.annual_update_factor_pct,
            &mut p.eur_usd_buffer_pct,
            &mut p.usd_local_buffer_pct,
            &mut p.insurance_rate_pct,
            &mut p.additional_margin_pct,
            &mut p.ad_valorem_duty_pct,
            &mut p.vat_pct,
        ] {
            if let Some(v) = slot.as_mut() {
                *v /= 100.0;
            }
        }
        p
    }
}

impl From<PartialParameterSet> for UserParameterInput {
    fn from(raw: PartialParameterSet) -> Self {
        Self(raw)
    }
}
