/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 TlsExt-OSS developers.
 */

use std::any::Any;
use std::borrow::Cow;
use std::fmt;

use tlsext_codec::ExtensionType;

use crate::error::ExtensionError;
use crate::msg::MsgFlags;
use crate::session::Session;

/// Upper bound of the internal id space, and thereby of the number of
/// extensions a process plus one session may carry.
pub const MAX_INTERNAL_ID: u16 = 64;

/// Dense small integer keying the advertisement bitset and the per-session
/// state table. Assigned at registration, never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InternalId(u16);

impl InternalId {
    pub(crate) const fn new(value: u16) -> Self {
        InternalId(value)
    }

    pub const fn value(&self) -> u16 {
        self.0
    }

    pub(crate) const fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for InternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Extension private data held in a session slot. Dropping the box is the
/// extension's deinit.
pub type ExtData = Box<dyn Any + Send + Sync>;

/// What a send handler produced
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendResult {
    /// Emit whatever payload was appended to the buffer. If nothing was
    /// appended the extension is not sent at all.
    Appended,
    /// Emit the extension with a zero length payload even though nothing
    /// was appended. The extension still counts as advertised.
    ZeroLength,
}

/// Filter deciding which extensions a dispatch pass will touch
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseClass {
    Any,
    Application,
    TlsEarly,
    TlsLate,
}

pub type RecvFn = fn(&mut Session, &[u8]) -> Result<(), ExtensionError>;
pub type SendFn = fn(&mut Session, &mut Vec<u8>) -> Result<SendResult, ExtensionError>;
pub type PackFn = fn(&dyn Any, &mut Vec<u8>) -> Result<(), ExtensionError>;
pub type UnpackFn = fn(&mut &[u8]) -> Result<ExtData, ExtensionError>;

/// Capability block describing one extension kind.
///
/// Any of the handler slots may be left empty. A descriptor is immutable
/// once it enters a registry or a session overlay.
pub struct ExtensionDef {
    pub(crate) wire_id: ExtensionType,
    pub(crate) internal_id: InternalId,
    pub(crate) name: Cow<'static, str>,
    pub(crate) validity: MsgFlags,
    pub(crate) parse_class: ParseClass,
    pub(crate) recv: Option<RecvFn>,
    pub(crate) send: Option<SendFn>,
    pub(crate) pack: Option<PackFn>,
    pub(crate) unpack: Option<UnpackFn>,
    pub(crate) overridable: bool,
}

impl ExtensionDef {
    pub fn new(
        wire_id: ExtensionType,
        name: impl Into<Cow<'static, str>>,
        parse_class: ParseClass,
    ) -> Self {
        ExtensionDef {
            wire_id,
            internal_id: InternalId(0),
            name: name.into(),
            validity: MsgFlags::empty(),
            parse_class,
            recv: None,
            send: None,
            pack: None,
            unpack: None,
            overridable: true,
        }
    }

    pub fn with_validity(mut self, validity: MsgFlags) -> Self {
        self.validity = validity;
        self
    }

    pub fn with_recv(mut self, recv: RecvFn) -> Self {
        self.recv = Some(recv);
        self
    }

    pub fn with_send(mut self, send: SendFn) -> Self {
        self.send = Some(send);
        self
    }

    pub fn with_pack(mut self, pack: PackFn) -> Self {
        self.pack = Some(pack);
        self
    }

    pub fn with_unpack(mut self, unpack: UnpackFn) -> Self {
        self.unpack = Some(unpack);
        self
    }

    /// Forbid session level registrations from eclipsing this descriptor
    pub fn forbid_override(mut self) -> Self {
        self.overridable = false;
        self
    }

    pub fn wire_id(&self) -> ExtensionType {
        self.wire_id
    }

    /// Meaningful only after the descriptor has been registered
    pub fn internal_id(&self) -> InternalId {
        self.internal_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn validity(&self) -> MsgFlags {
        self.validity
    }

    pub fn parse_class(&self) -> ParseClass {
        self.parse_class
    }

    pub fn overridable(&self) -> bool {
        self.overridable
    }
}

impl fmt::Debug for ExtensionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionDef")
            .field("wire_id", &self.wire_id)
            .field("internal_id", &self.internal_id)
            .field("name", &self.name)
            .field("validity", &self.validity)
            .field("parse_class", &self.parse_class)
            .finish_non_exhaustive()
    }
}
