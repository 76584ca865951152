// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Transfer wire protocol
//!
//! ## Protocol Flow
//!
//! ```text
//! Client                                   Server
//!   |<-------- PublicPointMessage ------------|
//!   |--------- PublicPointMessage ----------->|
//!   |      [both derive the session key]      |
//!   |--------- FileTransferMessage ---------->|
//!   |<-------- outcome text, then close ------|
//! ```

pub mod codec;
pub mod messages;

pub use codec::WireCodec;
pub use messages::{
    FileTransferMessage, PublicPointMessage, TransferOutcome, MAX_POINT_MESSAGE_BYTES,
};
