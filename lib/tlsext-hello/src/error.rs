/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 TlsExt-OSS developers.
 */

use thiserror::Error;

use tlsext_codec::{ExtensionParseError, ExtensionType};

use crate::msg::HandshakeMsg;

/// Errors raised while dispatching or serializing hello extensions.
///
/// Dispatch errors are fatal to the handshake and are meant to be surfaced
/// to the record layer unchanged.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtensionError {
    #[error("malformed extension block: {0}")]
    Malformed(#[from] ExtensionParseError),
    #[error("unsolicited extension {0}")]
    Unsolicited(ExtensionType),
    #[error("duplicate extension {0}")]
    Duplicate(ExtensionType),
    #[error("extension {0} not allowed in {1} message")]
    IllegalForMessage(ExtensionType, HandshakeMsg),
    #[error("extension {0} is not registered")]
    UnknownExtension(ExtensionType),
    #[error("invalid resumption data")]
    InvalidResumptionData,
    #[error("oversized extension payload")]
    OversizedPayload,
    #[error("extension slot table is full")]
    SlotTableFull,
    #[error("extension rejected: {0}")]
    Rejected(&'static str),
}

/// Errors returned by extension registration
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RegisterError {
    #[error("extension {0} is already registered")]
    AlreadyRegistered(ExtensionType),
    #[error("no internal extension id is left")]
    OutOfSpace,
}
