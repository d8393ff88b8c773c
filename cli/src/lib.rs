// Copyright (c) OpenGradient Contributors
// SPDX-License-Identifier: Apache-2.0

pub mod client_commands;
pub mod commands;
pub mod config_commands;
pub mod error;
pub mod response;
