// Copyright (c) OpenGradient Contributors
// SPDX-License-Identifier: Apache-2.0

//! Fixed-point numbers as stored by the inference contracts.
//!
//! A value is an integer paired with a decimal shift: `1.5` travels as
//! `(15, 1)` or `(1500000, 6)`. Encoding rounds `v * 10^d` to the nearest
//! integer and decoding recovers `value / 10^d`.

use serde::{Deserialize, Serialize};

use crate::abi::{Token, Tokenizable};
use crate::error::{AbiError, TensorError};

/// Decimal shift used when the caller does not choose one.
pub const DEFAULT_DECIMALS: u32 = 6;

/// Upper bound (exclusive) on magnitudes representable as `i128`, as an `f64`.
const I128_LIMIT: f64 = 170_141_183_460_469_231_731_687_303_715_884_105_728.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FixedPoint {
    pub value: i128,
    pub decimals: i128,
}

impl FixedPoint {
    pub const fn new(value: i128, decimals: i128) -> Self {
        Self { value, decimals }
    }

    pub const fn from_integer(value: i128) -> Self {
        Self { value, decimals: 0 }
    }

    /// Encode `v` with [`DEFAULT_DECIMALS`] places.
    pub fn from_f64(v: f64) -> Result<Self, TensorError> {
        Self::encode(v, DEFAULT_DECIMALS)
    }

    /// `round(v * 10^decimals)`, rounding half away from zero.
    pub fn encode(v: f64, decimals: u32) -> Result<Self, TensorError> {
        if !v.is_finite() {
            return Err(TensorError::NonFinite(v));
        }
        let shift = i32::try_from(decimals)
            .map_err(|_| TensorError::DecimalsOutOfRange(decimals as i128))?;
        let scaled = (v * 10f64.powi(shift)).round();
        if !scaled.is_finite() || scaled >= I128_LIMIT || scaled < -I128_LIMIT {
            return Err(TensorError::Overflow {
                value: v,
                decimals: decimals as i128,
            });
        }
        Ok(Self {
            value: scaled as i128,
            decimals: decimals as i128,
        })
    }

    /// `value / 10^decimals`. Negative shifts scale the value up.
    pub fn decode(&self) -> Result<f64, TensorError> {
        let shift = i32::try_from(self.decimals)
            .map_err(|_| TensorError::DecimalsOutOfRange(self.decimals))?;
        Ok(self.value as f64 / 10f64.powi(shift))
    }
}

impl Tokenizable for FixedPoint {
    fn into_token(self) -> Token {
        Token::Tuple(vec![Token::from_i128(self.value), Token::from_i128(self.decimals)])
    }

    fn from_token(token: Token) -> Result<Self, AbiError> {
        let [value, decimals] = token.into_fixed_tuple::<2>()?;
        Ok(Self {
            value: value.into_i128()?,
            decimals: decimals.into_i128()?,
        })
    }
}
