//! Pure-alcohol content of a single drink.

use crate::{Error, Result};

/// Density of ethanol in g/cc
pub const ETHANOL_DENSITY_G_PER_CC: f64 = 0.789;

/// Ethanol contained in one drink
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PureAlcohol {
    pub cc: f64,
    pub grams: f64,
}

/// Convert a drink's volume and ABV into pure alcohol
///
/// `cc = volume_cc * abv_percent / 100`, `grams = cc * 0.789`.
/// Out-of-range input is rejected instead of producing a nonsensical value.
pub fn pure_alcohol(volume_cc: f64, abv_percent: f64) -> Result<PureAlcohol> {
    check_volume(volume_cc)?;
    check_abv(abv_percent)?;

    let cc = volume_cc * abv_percent / 100.0;
    Ok(PureAlcohol {
        cc,
        grams: cc * ETHANOL_DENSITY_G_PER_CC,
    })
}

pub(crate) fn check_volume(volume_cc: f64) -> Result<()> {
    if !volume_cc.is_finite() || volume_cc <= 0.0 {
        return Err(Error::invalid(format!(
            "volume must be a positive number of cc, got {}",
            volume_cc
        )));
    }
    Ok(())
}

pub(crate) fn check_abv(abv_percent: f64) -> Result<()> {
    if !abv_percent.is_finite() || !(0.0..=100.0).contains(&abv_percent) {
        return Err(Error::invalid(format!(
            "ABV must be between 0 and 100 percent, got {}",
            abv_percent
        )));
    }
    Ok(())
}
