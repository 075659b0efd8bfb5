//! 공통 타입 정의.

pub mod symbol;
pub mod timeframe;

use rust_decimal::Decimal;

pub use symbol::Symbol;
pub use timeframe::Timeframe;

/// 가격 타입.
pub type Price = Decimal;

/// 수량(거래량) 타입.
pub type Quantity = Decimal;
