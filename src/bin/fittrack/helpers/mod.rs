// ABOUTME: Helper modules for the fittrack CLI
// ABOUTME: Provides display formatting for records, statistics, and summaries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub mod display;
