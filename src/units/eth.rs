use std::fmt::Display;

use serde::Serialize;

/// A price in whole units of the collection's currency, i.e. what ends up in the "Price ETH"
/// column. Only ever produced from a [`super::WeiNewtype`] at the last moment.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EthNewtype(pub f64);

impl Display for EthNewtype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let EthNewtype(amount) = self;
        write!(f, "{amount}")
    }
}
