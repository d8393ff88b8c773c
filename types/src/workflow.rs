// Copyright (c) OpenGradient Contributors
// SPDX-License-Identifier: Apache-2.0

//! Scheduled workflows: contracts that periodically run a model over
//! historical price candles.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::abi::{ParamType, Token};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[serde(rename_all = "UPPERCASE")]
#[repr(u8)]
pub enum CandleOrder {
    #[default]
    Ascending = 0,
    Descending = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[serde(rename_all = "UPPERCASE")]
#[repr(u8)]
pub enum CandleType {
    High = 0,
    Low = 1,
    Open = 2,
    Close = 3,
    Volume = 4,
}

/// Which candles a workflow feeds to its model on every run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalInputQuery {
    pub base: String,
    pub quote: String,
    pub total_candles: u32,
    pub candle_duration_in_mins: u32,
    pub order: CandleOrder,
    pub candle_types: Vec<CandleType>,
}

impl HistoricalInputQuery {
    /// `(string base, string quote, uint32 totalCandles, uint32 candleDurationInMins, uint8 order, uint8[] candleTypes)`
    pub fn to_abi_format(&self) -> Token {
        Token::Tuple(vec![
            Token::String(self.base.clone()),
            Token::String(self.quote.clone()),
            Token::uint(self.total_candles),
            Token::uint(self.candle_duration_in_mins),
            Token::uint(self.order as u8),
            Token::Array(
                self.candle_types
                    .iter()
                    .map(|t| Token::uint(*t as u8))
                    .collect(),
            ),
        ])
    }

    pub fn abi_type() -> ParamType {
        ParamType::Tuple(vec![
            ParamType::String,
            ParamType::String,
            ParamType::Uint(32),
            ParamType::Uint(32),
            ParamType::Uint(8),
            ParamType::array(ParamType::Uint(8)),
        ])
    }
}

/// How often the scheduler triggers a workflow, and until when.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerParams {
    /// Seconds between runs.
    pub frequency: u64,
    pub duration_hours: u64,
    /// Unix timestamp (seconds) after which the task stops.
    pub end_time: u64,
}

impl SchedulerParams {
    /// Schedule starting now and lasting `duration_hours`.
    pub fn new(frequency: u64, duration_hours: u64) -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self::starting_at(now, frequency, duration_hours)
    }

    pub fn starting_at(start: u64, frequency: u64, duration_hours: u64) -> Self {
        Self {
            frequency,
            duration_hours,
            end_time: start.saturating_add(duration_hours.saturating_mul(3600)),
        }
    }
}
