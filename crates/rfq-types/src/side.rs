//! Trade direction.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a swap from the trader's point of view.
///
/// `Sell` fixes the input amount; `Buy` fixes the output amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeSide {
	Sell,
	Buy,
}

impl fmt::Display for TradeSide {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TradeSide::Sell => write!(f, "SELL"),
			TradeSide::Buy => write!(f, "BUY"),
		}
	}
}
