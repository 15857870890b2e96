mod eth;
mod wei;

pub use eth::EthNewtype;

pub use wei::ParseUnitDivisorError;
pub use wei::UnitDivisor;
pub use wei::WeiNewtype;

pub const WEI_PER_ETH: u128 = 1_000_000_000_000_000_000;
