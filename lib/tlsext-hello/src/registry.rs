/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 TlsExt-OSS developers.
 */

use std::sync::Arc;

use tlsext_codec::ExtensionType;

use crate::descriptor::{ExtensionDef, InternalId, MAX_INTERNAL_ID};
use crate::error::RegisterError;

/// Process wide tier of the extension catalog.
///
/// Register every built-in extension while the registry is still exclusively
/// owned, then wrap it in an [`Arc`] and hand clones to sessions. Requiring
/// `&mut self` for registration makes the single-writer-before-sharing rule
/// a compile time property instead of a documentation note.
#[derive(Default)]
pub struct ExtensionRegistry {
    entries: Vec<Arc<ExtensionDef>>,
    next_id: u16,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        ExtensionRegistry {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    /// Register a built-in extension and assign its internal id.
    ///
    /// Internal ids are handed out from 0 upward in registration order,
    /// which is also the order the emit walk visits built-ins in.
    pub fn register(&mut self, mut def: ExtensionDef) -> Result<InternalId, RegisterError> {
        if self.entries.iter().any(|e| e.wire_id == def.wire_id) {
            return Err(RegisterError::AlreadyRegistered(def.wire_id));
        }
        if self.next_id >= MAX_INTERNAL_ID {
            return Err(RegisterError::OutOfSpace);
        }
        let id = InternalId::new(self.next_id);
        self.next_id += 1;
        def.internal_id = id;
        self.entries.push(Arc::new(def));
        Ok(id)
    }

    pub fn find_by_wire(&self, wire_id: ExtensionType) -> Option<&Arc<ExtensionDef>> {
        self.entries.iter().find(|e| e.wire_id == wire_id)
    }

    pub fn find_by_id(&self, id: InternalId) -> Option<&Arc<ExtensionDef>> {
        self.entries.iter().find(|e| e.internal_id == id)
    }

    /// Diagnostic name of a wire id: the registered name if present, the
    /// IANA registry name otherwise
    pub fn name_of(&self, wire_id: ExtensionType) -> Option<&str> {
        match self.find_by_wire(wire_id) {
            Some(def) => Some(def.name()),
            None => wire_id.name(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn entries(&self) -> &[Arc<ExtensionDef>] {
        &self.entries
    }

    pub(crate) fn next_id(&self) -> u16 {
        self.next_id
    }
}
