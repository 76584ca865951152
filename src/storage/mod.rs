// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod received;
pub mod source;

// Re-export main types for convenience
pub use received::{sanitize_file_name, DirectorySink, ReceivedFileSink};
pub use source::{base_name, read_file_and_hash};
