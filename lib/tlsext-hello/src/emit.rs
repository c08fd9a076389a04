/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 TlsExt-OSS developers.
 */

use std::sync::Arc;

use log::trace;

use crate::descriptor::{ExtensionDef, ParseClass, SendResult};
use crate::error::ExtensionError;
use crate::msg::HandshakeMsg;
use crate::session::{Session, Side};

fn patch_u16(buf: &mut [u8], at: usize, value: usize) -> Result<(), ExtensionError> {
    let Ok(value) = u16::try_from(value) else {
        return Err(ExtensionError::OversizedPayload);
    };
    buf[at..at + 2].copy_from_slice(&value.to_be_bytes());
    Ok(())
}

impl Session {
    /// Emit an outbound extension block into `buf`, walking the session
    /// overlay first and the built-ins second, each tier in registration
    /// order.
    ///
    /// The outer 16 bit block length is written by this function. When no
    /// extension produces output the block is omitted entirely and 0 is
    /// returned, otherwise the total number of bytes appended.
    pub fn emit(
        &mut self,
        msg: HandshakeMsg,
        parse_class: ParseClass,
        buf: &mut Vec<u8>,
    ) -> Result<usize, ExtensionError> {
        self.current_msg = Some(msg);
        let r = self.emit_block(msg, parse_class, buf);
        self.current_msg = None;
        r
    }

    fn emit_block(
        &mut self,
        msg: HandshakeMsg,
        parse_class: ParseClass,
        buf: &mut Vec<u8>,
    ) -> Result<usize, ExtensionError> {
        let block_start = buf.len();
        buf.extend_from_slice(&[0, 0]);

        // snapshot the walk order, send handlers may mutate the session
        let defs: Vec<Arc<ExtensionDef>> = self
            .overlay
            .iter()
            .chain(self.registry.entries().iter())
            .cloned()
            .collect();

        for def in &defs {
            self.emit_one(def, msg, parse_class, buf)?;
        }

        let block_len = buf.len() - block_start - 2;
        if block_len == 0 {
            buf.truncate(block_start);
            return Ok(0);
        }
        patch_u16(buf, block_start, block_len)?;
        Ok(buf.len() - block_start)
    }

    fn emit_one(
        &mut self,
        def: &ExtensionDef,
        msg: HandshakeMsg,
        parse_class: ParseClass,
        buf: &mut Vec<u8>,
    ) -> Result<(), ExtensionError> {
        let Some(send) = def.send else {
            return Ok(());
        };
        if parse_class != ParseClass::Any && def.parse_class != parse_class {
            return Ok(());
        }
        if !def.validity.contains(msg.flag()) {
            return Ok(());
        }

        let id = def.internal_id;
        match self.side {
            // the server never emits an extension the client did not offer
            Side::Server => {
                if !self.is_advertised(id) {
                    return Ok(());
                }
            }
            // never emit one wire id twice: skip what was already sent, and
            // skip a built-in eclipsed by a session registration
            Side::Client => {
                if self.is_advertised(id) {
                    return Ok(());
                }
                if let Some(eff) = self.find_by_wire(def.wire_id)
                    && eff.internal_id() != id
                {
                    return Ok(());
                }
            }
        }

        let header_start = buf.len();
        buf.extend_from_slice(&def.wire_id.value().to_be_bytes());
        buf.extend_from_slice(&[0, 0]);
        let payload_start = buf.len();

        let ret = send(self, buf)?;

        let appended = buf.len() - payload_start;
        if appended == 0 && ret != SendResult::ZeroLength {
            // nothing to send, roll the header back
            buf.truncate(header_start);
            return Ok(());
        }
        patch_u16(buf, payload_start - 2, appended)?;
        trace!("sent extension {} ({appended} bytes)", def.name());

        if self.side == Side::Client {
            self.mark_advertised(id);
        }
        Ok(())
    }
}
