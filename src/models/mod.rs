// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Scenario data model.

pub mod connection;
pub mod note;
pub mod project;
pub mod store;
