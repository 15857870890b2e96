use std::{
    fmt::{self, Display},
    num::ParseIntError,
    str::FromStr,
};

use serde::{de, de::Visitor, Deserialize, Serialize};
use thiserror::Error;

use super::{EthNewtype, WEI_PER_ETH};

/// A price in the smallest indivisible unit of the collection's currency. For an 18 decimal
/// token like ETH that is wei.
///
/// Prices sent as JSON strings are read exactly. JSON numbers above `u64::MAX` only reach us as
/// `f64` and keep 53 bits of precision, the marketplace feed sends large prices as strings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub struct WeiNewtype(pub u128);

impl WeiNewtype {
    pub fn from_eth(eth: u128) -> Self {
        Self(eth * WEI_PER_ETH)
    }

    /// Whole and fractional part are converted separately so amounts above 2^53 wei keep their
    /// integer part exact.
    pub fn to_eth(self, UnitDivisor(divisor): UnitDivisor) -> EthNewtype {
        let WeiNewtype(amount) = self;
        let whole = amount / divisor;
        let fraction = amount % divisor;
        EthNewtype(whole as f64 + fraction as f64 / divisor as f64)
    }
}

impl Display for WeiNewtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let WeiNewtype(amount) = self;
        write!(f, "{amount}")
    }
}

impl From<WeiNewtype> for String {
    fn from(WeiNewtype(amount): WeiNewtype) -> Self {
        amount.to_string()
    }
}

impl From<u128> for WeiNewtype {
    fn from(amount: u128) -> Self {
        WeiNewtype(amount)
    }
}

impl FromStr for WeiNewtype {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u128>().map(WeiNewtype)
    }
}

struct WeiAmountVisitor;

impl Visitor<'_> for WeiAmountVisitor {
    type Value = WeiNewtype;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a non-negative integer, or string of one, representing a price in wei")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        v.parse::<WeiNewtype>().map_err(|error| {
            de::Error::invalid_value(
                de::Unexpected::Str(&format!("unexpected value: {}, error: {}", v, error)),
                &"a number as string: \"1180000000000000000\", which fits within u128",
            )
        })
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(WeiNewtype(v.into()))
    }

    fn visit_u128<E>(self, v: u128) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(WeiNewtype(v))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        u128::try_from(v)
            .map(WeiNewtype)
            .map_err(|_| de::Error::invalid_value(de::Unexpected::Signed(v), &self))
    }

    // serde_json hands us integers above u64::MAX as rounded floats, 20 ETH in wei already is one.
    fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        if v.is_finite() && v >= 0.0 && v.fract() == 0.0 {
            Ok(WeiNewtype(v as u128))
        } else {
            Err(de::Error::invalid_value(de::Unexpected::Float(v), &self))
        }
    }
}

impl<'de> Deserialize<'de> for WeiNewtype {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_any(WeiAmountVisitor)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ParseUnitDivisorError {
    #[error("unit divisor must be larger than zero")]
    Zero,
    #[error(transparent)]
    Int(#[from] ParseIntError),
}

/// How many smallest units make up one whole unit of the currency prices are quoted in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnitDivisor(pub u128);

impl Default for UnitDivisor {
    fn default() -> Self {
        Self(WEI_PER_ETH)
    }
}

impl FromStr for UnitDivisor {
    type Err = ParseUnitDivisorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<u128>()? {
            0 => Err(ParseUnitDivisorError::Zero),
            divisor => Ok(UnitDivisor(divisor)),
        }
    }
}
