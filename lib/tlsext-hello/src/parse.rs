/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 TlsExt-OSS developers.
 */

use log::debug;

use tlsext_codec::ExtensionIter;

use crate::descriptor::ParseClass;
use crate::error::ExtensionError;
use crate::msg::HandshakeMsg;
use crate::session::{Session, Side};

impl Session {
    /// Parse an inbound extension block and dispatch each record to its
    /// descriptor's recv handler.
    ///
    /// `block` is the concatenation of TLV records, the outer 16 bit length
    /// already stripped by the message framer. Unknown extensions are
    /// skipped. Errors abort the handshake and must be surfaced to the
    /// record layer unchanged.
    pub fn parse(
        &mut self,
        msg: HandshakeMsg,
        parse_class: ParseClass,
        block: &[u8],
    ) -> Result<(), ExtensionError> {
        self.current_msg = Some(msg);
        let r = self.parse_block(msg, parse_class, block);
        self.current_msg = None;
        r
    }

    fn parse_block(
        &mut self,
        msg: HandshakeMsg,
        parse_class: ParseClass,
        block: &[u8],
    ) -> Result<(), ExtensionError> {
        for item in ExtensionIter::new(block) {
            let ext = item?;

            let Some(def) = self.find_by_wire(ext.ext_type).cloned() else {
                debug!("skipped unknown extension {}", ext.ext_type);
                continue;
            };
            let id = def.internal_id();

            // a server must not send an extension the client did not offer
            if self.side == Side::Client && !self.is_advertised(id) {
                return Err(ExtensionError::Unsolicited(ext.ext_type));
            }

            if parse_class != ParseClass::Any && def.parse_class() != parse_class {
                continue;
            }
            let Some(recv) = def.recv else {
                debug!("extension {} has no recv handler, skipped", def.name());
                continue;
            };

            if !def.validity().contains(msg.flag()) {
                return Err(ExtensionError::IllegalForMessage(ext.ext_type, msg));
            }

            if self.side == Side::Server && self.mark_advertised(id) {
                return Err(ExtensionError::Duplicate(ext.ext_type));
            }

            recv(self, ext.data)?;
        }
        Ok(())
    }
}
