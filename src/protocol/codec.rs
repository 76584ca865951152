// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! CBOR stream codec
//!
//! Each message is one self-delimiting CBOR data item written straight onto
//! the stream, with no extra length prefix. Structs travel as maps keyed by
//! field name and byte fields as native CBOR byte strings.
//!
//! Before decoding, the item's header chain is walked to find where it ends.
//! That walk touches headers only, so retrying on partial input stays cheap,
//! and a header claiming more than `max_message_bytes` is rejected before
//! its payload is buffered.

use bytes::{Buf, BytesMut};
use serde::{de::DeserializeOwned, Serialize};
use std::marker::PhantomData;
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{TransferError, TransferResult};

/// Upper bound on data items in one message; wire messages are flat maps
const MAX_ITEMS: u64 = 64;

/// Codec for one message type; switch types with [`WireCodec::cast`]
#[derive(Debug)]
pub struct WireCodec<T> {
    max_message_bytes: u64,
    _message: PhantomData<fn() -> T>,
}

impl<T> WireCodec<T> {
    pub fn new(max_message_bytes: u64) -> Self {
        Self {
            max_message_bytes,
            _message: PhantomData,
        }
    }

    /// Different message type and size bound. Used with `Framed::map_codec`
    /// so buffered bytes carry over between protocol steps.
    pub fn cast<U>(self, max_message_bytes: u64) -> WireCodec<U> {
        WireCodec::new(max_message_bytes)
    }
}

impl<T> Clone for WireCodec<T> {
    fn clone(&self) -> Self {
        Self::new(self.max_message_bytes)
    }
}

impl<T: Serialize + DeserializeOwned> Decoder for WireCodec<T> {
    type Item = T;
    type Error = TransferError;

    fn decode(&mut self, src: &mut BytesMut) -> TransferResult<Option<T>> {
        let len = match item_len(&src[..], self.max_message_bytes)? {
            Some(len) => len,
            None => return Ok(None),
        };

        let message = ciborium::from_reader(&src[..len]).map_err(|e| {
            TransferError::Codec(format!(
                "failed to decode {}: {}",
                std::any::type_name::<T>(),
                e
            ))
        })?;
        src.advance(len);
        Ok(Some(message))
    }
}

impl<T: Serialize> Encoder<T> for WireCodec<T> {
    type Error = TransferError;

    fn encode(&mut self, message: T, dst: &mut BytesMut) -> TransferResult<()> {
        let mut encoded = Vec::new();
        ciborium::into_writer(&message, &mut encoded)
            .map_err(|e| TransferError::Codec(format!("failed to encode message: {}", e)))?;

        if encoded.len() as u64 > self.max_message_bytes {
            return Err(TransferError::Codec(format!(
                "message of {} bytes exceeds limit of {} bytes",
                encoded.len(),
                self.max_message_bytes
            )));
        }
        dst.extend_from_slice(&encoded);
        Ok(())
    }
}

/// Length of the first complete CBOR item in `buf`, or `None` while more
/// bytes are needed. Indefinite-length items are refused.
fn item_len(buf: &[u8], max: u64) -> TransferResult<Option<usize>> {
    let mut pos: u64 = 0;
    let mut pending: u64 = 1;
    let mut seen: u64 = 0;

    while pending > 0 {
        pending -= 1;
        seen += 1;
        if seen > MAX_ITEMS {
            return Err(TransferError::Codec(format!(
                "message has more than {} data items",
                MAX_ITEMS
            )));
        }

        let Some(&initial) = buf.get(pos as usize) else {
            return Ok(None);
        };
        pos += 1;

        let major = initial >> 5;
        let info = initial & 0x1f;
        let arg = match info {
            0..=23 => u64::from(info),
            24..=27 => {
                let width = 1usize << (info - 24);
                let start = pos as usize;
                let Some(bytes) = buf.get(start..start + width) else {
                    return Ok(None);
                };
                pos += width as u64;
                bytes.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b))
            }
            _ => {
                return Err(TransferError::Codec(format!(
                    "unsupported CBOR header byte 0x{:02x}",
                    initial
                )))
            }
        };

        match major {
            // Byte and text strings: payload follows the header
            2 | 3 => pos = pos.saturating_add(arg),
            4 => pending = pending.saturating_add(arg),
            5 => pending = pending.saturating_add(arg.saturating_mul(2)),
            6 => pending += 1,
            // Integers and simple values carry everything in the header
            _ => {}
        }

        if pos > max {
            return Err(TransferError::Codec(format!(
                "message exceeds limit of {} bytes",
                max
            )));
        }
    }

    if (buf.len() as u64) < pos {
        return Ok(None);
    }
    Ok(Some(pos as usize))
}
