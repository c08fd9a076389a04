/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 TlsExt-OSS developers.
 */

use std::any::Any;
use std::sync::Arc;

use fixedbitset::FixedBitSet;
use smallvec::SmallVec;

use tlsext_codec::ExtensionType;

use crate::descriptor::{ExtData, ExtensionDef, InternalId, MAX_INTERNAL_ID, ParseClass};
use crate::error::{ExtensionError, RegisterError};
use crate::msg::{HandshakeMsg, MsgFlags};
use crate::registry::ExtensionRegistry;

const MAX_EXT_SLOTS: usize = MAX_INTERNAL_ID as usize;

/// Validity applied to session registrations that supply no mask of their own
const DEFAULT_OVERLAY_VALIDITY: MsgFlags = MsgFlags::CLIENT_HELLO
    .union(MsgFlags::TLS12_SERVER_HELLO)
    .union(MsgFlags::ENCRYPTED_EXTENSIONS);

/// Which end of the handshake this session drives
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Client,
    Server,
}

struct ExtSlot {
    id: InternalId,
    live: Option<ExtData>,
    resumed: Option<ExtData>,
}

impl ExtSlot {
    fn is_vacant(&self) -> bool {
        self.live.is_none() && self.resumed.is_none()
    }
}

/// Per-session extension engine state.
///
/// Owns the session overlay of the extension catalog, the slot table that
/// carries extension private data across the handshake, and the
/// advertisement bitset. All extension state is dropped with the session.
pub struct Session {
    pub(crate) registry: Arc<ExtensionRegistry>,
    pub(crate) side: Side,
    pub(crate) overlay: Vec<Arc<ExtensionDef>>,
    slots: SmallVec<[ExtSlot; 8]>,
    pub(crate) advertised: FixedBitSet,
    pub(crate) current_msg: Option<HandshakeMsg>,
}

impl Session {
    pub fn new(registry: Arc<ExtensionRegistry>, side: Side) -> Self {
        Session {
            registry,
            side,
            overlay: Vec::new(),
            slots: SmallVec::new(),
            advertised: FixedBitSet::with_capacity(MAX_INTERNAL_ID as usize),
            current_msg: None,
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// The handshake message currently being dispatched, if a parse or emit
    /// walk is in progress. Visible to recv/send handlers.
    pub fn current_msg(&self) -> Option<HandshakeMsg> {
        self.current_msg
    }

    /// Register a session scoped extension, eclipsing a built-in with the
    /// same wire id when `override_builtin` is set and the built-in allows
    /// it.
    ///
    /// A registration without validity bits gets the client-hello,
    /// TLS 1.2 server-hello and encrypted-extensions mask.
    pub fn register_ext(
        &mut self,
        mut def: ExtensionDef,
        override_builtin: bool,
    ) -> Result<InternalId, RegisterError> {
        if let Some(builtin) = self.registry.find_by_wire(def.wire_id)
            && (!override_builtin || !builtin.overridable)
        {
            return Err(RegisterError::AlreadyRegistered(def.wire_id));
        }
        if self.overlay.iter().any(|e| e.wire_id == def.wire_id) {
            return Err(RegisterError::AlreadyRegistered(def.wire_id));
        }

        // overlay ids start above every id already taken in either tier
        let next = match self.overlay.last() {
            Some(e) => e.internal_id.value() + 1,
            None => self.registry.next_id(),
        };
        if next >= MAX_INTERNAL_ID {
            return Err(RegisterError::OutOfSpace);
        }
        if def.validity.is_empty() {
            def.validity = DEFAULT_OVERLAY_VALIDITY;
        }
        let id = InternalId::new(next);
        def.internal_id = id;
        self.overlay.push(Arc::new(def));
        Ok(id)
    }

    /// Effective catalog lookup by wire id, overlay before built-ins
    pub(crate) fn find_by_wire(&self, wire_id: ExtensionType) -> Option<&Arc<ExtensionDef>> {
        self.overlay
            .iter()
            .find(|e| e.wire_id == wire_id)
            .or_else(|| self.registry.find_by_wire(wire_id))
    }

    /// Effective catalog lookup by internal id, filtered by parse class
    pub(crate) fn find_by_id(
        &self,
        id: InternalId,
        parse_class: ParseClass,
    ) -> Option<&Arc<ExtensionDef>> {
        let def = self
            .overlay
            .iter()
            .find(|e| e.internal_id == id)
            .or_else(|| self.registry.find_by_id(id))?;
        if parse_class != ParseClass::Any && def.parse_class != parse_class {
            return None;
        }
        Some(def)
    }

    /// Diagnostic name of a wire id as this session sees it
    pub fn ext_name(&self, wire_id: ExtensionType) -> Option<&str> {
        match self.overlay.iter().find(|e| e.wire_id == wire_id) {
            Some(def) => Some(def.name()),
            None => self.registry.name_of(wire_id),
        }
    }

    pub(crate) fn is_advertised(&self, id: InternalId) -> bool {
        self.advertised.contains(id.index())
    }

    /// Set the advertisement bit, reporting whether it was already set
    pub(crate) fn mark_advertised(&mut self, id: InternalId) -> bool {
        let prev = self.advertised.contains(id.index());
        self.advertised.insert(id.index());
        prev
    }

    /// Advertised internal ids in ascending order
    pub fn advertised_ids(&self) -> impl Iterator<Item = InternalId> + '_ {
        self.advertised.ones().map(|i| InternalId::new(i as u16))
    }

    fn claim_slot(&mut self, id: InternalId) -> Result<&mut ExtSlot, ExtensionError> {
        if let Some(pos) = self.slots.iter().position(|s| s.id == id) {
            return Ok(&mut self.slots[pos]);
        }
        if let Some(pos) = self.slots.iter().position(|s| s.is_vacant()) {
            let slot = &mut self.slots[pos];
            slot.id = id;
            return Ok(slot);
        }
        if self.slots.len() >= MAX_EXT_SLOTS {
            return Err(ExtensionError::SlotTableFull);
        }
        self.slots.push(ExtSlot {
            id,
            live: None,
            resumed: None,
        });
        let pos = self.slots.len() - 1;
        Ok(&mut self.slots[pos])
    }

    /// Store live private data for an extension, dropping any previous value
    pub fn set_live(&mut self, id: InternalId, data: ExtData) -> Result<(), ExtensionError> {
        let slot = self.claim_slot(id)?;
        slot.live = Some(data);
        Ok(())
    }

    pub fn get_live(&self, id: InternalId) -> Option<&(dyn Any + Send + Sync)> {
        self.slots
            .iter()
            .find(|s| s.id == id)
            .and_then(|s| s.live.as_deref())
    }

    pub fn get_live_mut(&mut self, id: InternalId) -> Option<&mut (dyn Any + Send + Sync)> {
        self.slots
            .iter_mut()
            .find(|s| s.id == id)
            .and_then(|s| s.live.as_deref_mut())
    }

    /// Drop the live private data of an extension, if any
    pub fn unset_live(&mut self, id: InternalId) {
        if let Some(slot) = self.slots.iter_mut().find(|s| s.id == id) {
            slot.live = None;
        }
    }

    /// Store resumed private data for an extension, dropping any previous
    /// value. Live and resumed data of one id coexist until the extension
    /// reconciles them.
    pub fn set_resumed(&mut self, id: InternalId, data: ExtData) -> Result<(), ExtensionError> {
        let slot = self.claim_slot(id)?;
        slot.resumed = Some(data);
        Ok(())
    }

    pub fn get_resumed(&self, id: InternalId) -> Option<&(dyn Any + Send + Sync)> {
        self.slots
            .iter()
            .find(|s| s.id == id)
            .and_then(|s| s.resumed.as_deref())
    }

    /// Drop the resumed private data of an extension, if any
    pub fn unset_resumed(&mut self, id: InternalId) {
        if let Some(slot) = self.slots.iter_mut().find(|s| s.id == id) {
            slot.resumed = None;
        }
    }

    /// Store live private data keyed by wire id
    pub fn set_ext_data(
        &mut self,
        wire_id: ExtensionType,
        data: ExtData,
    ) -> Result<(), ExtensionError> {
        let Some(def) = self.find_by_wire(wire_id) else {
            return Err(ExtensionError::UnknownExtension(wire_id));
        };
        let id = def.internal_id;
        self.set_live(id, data)
    }

    /// Get live private data keyed by wire id
    pub fn get_ext_data(&self, wire_id: ExtensionType) -> Option<&(dyn Any + Send + Sync)> {
        let def = self.find_by_wire(wire_id)?;
        self.get_live(def.internal_id)
    }
}
