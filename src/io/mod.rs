// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations for scenario files, the autosave slot, and attachments.

pub mod media;
pub mod playback;
pub mod serialization;
pub mod storage;
