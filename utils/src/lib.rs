// Copyright (c) OpenGradient Contributors
// SPDX-License-Identifier: Apache-2.0

pub mod logging;
