// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Persistence of the scenario document: autosave, explicit saves, and the
//! exit confirmation workflow.

pub mod autosave;
pub mod coordinator;
pub mod prompt;
