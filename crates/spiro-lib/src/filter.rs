//! Zero-phase Butterworth filtering on top of `sci_rs`.
//!
//! Design goes through `butter_dyn` in second-order-section form and the
//! forward/backward pass through `sosfiltfilt_dyn`, which odd-extends the
//! input and seeds each pass with steady-state initial conditions.

use crate::error::SpiroError;
use sci_rs::signal::filter::{
    design::{butter_dyn, DigitalFilter, FilterBandType, FilterOutputType, Sos, SosFormatFilter},
    sosfiltfilt_dyn,
};

/// Gain of one section at DC (z = 1).
pub fn dc_gain(section: &Sos<f64>) -> f64 {
    section.b.iter().sum::<f64>() / section.a.iter().sum::<f64>()
}

/// Butterworth low-pass in second-order sections.
///
/// `cutoff` is normalised to the Nyquist frequency and must lie in (0, 1).
pub fn butterworth_lowpass(order: usize, cutoff: f64) -> Result<Vec<Sos<f64>>, SpiroError> {
    if order == 0 {
        return Err(SpiroError::InvalidFilterOrder(order));
    }
    if !(cutoff > 0.0 && cutoff < 1.0) {
        return Err(SpiroError::InvalidCutoff(cutoff));
    }
    match butter_dyn(
        order,
        vec![cutoff],
        Some(FilterBandType::Lowpass),
        Some(false),
        Some(FilterOutputType::Sos),
        None,
    ) {
        DigitalFilter::Sos(SosFormatFilter { sos }) if !sos.is_empty() => Ok(sos),
        _ => Err(SpiroError::InvalidCutoff(cutoff)),
    }
}

/// Odd-extension length `sosfiltfilt_dyn` uses for `sections` sections.
pub fn default_padlen(sections: usize) -> usize {
    3 * (2 * sections + 1)
}

/// Zero-phase filtering: forward pass, reverse, forward pass, reverse.
///
/// Inputs shorter than two samples are returned unchanged. Inputs no longer
/// than the default padding are odd-extended first and trimmed afterwards.
pub fn filtfilt(sections: &[Sos<f64>], data: &[f64]) -> Vec<f64> {
    let n = data.len();
    if n < 2 || sections.is_empty() {
        return data.to_vec();
    }
    let padlen = default_padlen(sections.len());
    if n > padlen {
        return sosfiltfilt_dyn(data.iter(), sections);
    }

    let mut extended = data.to_vec();
    let mut lead = 0;
    while extended.len() <= padlen {
        let pad = (extended.len() - 1).min(padlen + 1 - extended.len());
        extended = odd_extend(&extended, pad);
        lead += pad;
    }
    sosfiltfilt_dyn(extended.iter(), sections)
        .into_iter()
        .skip(lead)
        .take(n)
        .collect()
}

fn odd_extend(data: &[f64], pad: usize) -> Vec<f64> {
    let n = data.len();
    let first = data[0];
    let last = data[n - 1];
    let mut out = Vec::with_capacity(n + 2 * pad);
    out.extend((1..=pad).rev().map(|i| 2.0 * first - data[i]));
    out.extend_from_slice(data);
    out.extend((1..=pad).map(|i| 2.0 * last - data[n - 1 - i]));
    out
}
