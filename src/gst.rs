use serde::Deserialize;

/// GST slabs offered by the calculator form.
pub const STANDARD_RATES: [f64; 5] = [0.0, 5.0, 12.0, 18.0, 28.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GstMode {
    /// The amount is the pre-tax price; GST is added on top.
    #[default]
    Exclusive,
    /// The amount already includes GST; GST is carved out of it.
    Inclusive,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GstBreakdown {
    pub net: f64,
    pub gst: f64,
    pub cgst: f64,
    pub sgst: f64,
    pub gross: f64,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum GstError {
    #[error("amount must be a non-negative number")]
    InvalidAmount,

    #[error("GST rate must be between 0 and 100 percent")]
    InvalidRate,
}

pub fn calculate(amount: f64, rate: f64, mode: GstMode) -> Result<GstBreakdown, GstError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(GstError::InvalidAmount);
    }
    if !rate.is_finite() || !(0.0..=100.0).contains(&rate) {
        return Err(GstError::InvalidRate);
    }

    // Round the two amounts that are shown as given, then derive the rest from
    // them so the breakdown always adds up.
    let (net, gross) = match mode {
        GstMode::Exclusive => {
            let net = round2(amount);
            (net, round2(net + round2(amount * rate / 100.0)))
        }
        GstMode::Inclusive => (round2(amount * 100.0 / (100.0 + rate)), round2(amount)),
    };
    let gst = round2(gross - net);
    let cgst = round2(gst / 2.0);

    Ok(GstBreakdown {
        net,
        gst,
        cgst,
        sgst: round2(gst - cgst),
        gross,
    })
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
