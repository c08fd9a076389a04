/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 TlsExt-OSS developers.
 */

use crate::descriptor::ParseClass;
use crate::error::ExtensionError;
use crate::session::Session;

fn read_u32(data: &mut &[u8]) -> Result<u32, ExtensionError> {
    if data.len() < 4 {
        return Err(ExtensionError::InvalidResumptionData);
    }
    let (v, rest) = data.split_at(4);
    *data = rest;
    Ok(u32::from_be_bytes([v[0], v[1], v[2], v[3]]))
}

fn patch_u32(buf: &mut [u8], at: usize, value: usize) -> Result<(), ExtensionError> {
    let Ok(value) = u32::try_from(value) else {
        return Err(ExtensionError::OversizedPayload);
    };
    buf[at..at + 4].copy_from_slice(&value.to_be_bytes());
    Ok(())
}

impl Session {
    /// Serialize the live extension state of this session for resumption.
    ///
    /// Walks the advertised internal ids in ascending order and emits a
    /// record for every one whose descriptor can pack and whose live slot
    /// is populated. A record that packs to zero bytes is still counted.
    ///
    /// The format is private to this engine and stable within one build:
    /// `n: u32 BE | n x { internal_id: u32 BE | size: u32 BE | size bytes }`.
    pub fn pack(&self, buf: &mut Vec<u8>) -> Result<usize, ExtensionError> {
        let count_at = buf.len();
        buf.extend_from_slice(&[0u8; 4]);
        let mut count: u32 = 0;

        for id in self.advertised_ids() {
            let Some(def) = self.find_by_id(id, ParseClass::Any) else {
                continue;
            };
            let Some(pack) = def.pack else {
                continue;
            };
            let Some(data) = self.get_live(id) else {
                continue;
            };

            buf.extend_from_slice(&u32::from(id.value()).to_be_bytes());
            let size_at = buf.len();
            buf.extend_from_slice(&[0u8; 4]);
            pack(data, buf)?;
            let size = buf.len() - size_at - 4;
            patch_u32(buf, size_at, size)?;
            count += 1;
        }

        buf[count_at..count_at + 4].copy_from_slice(&count.to_be_bytes());
        Ok(buf.len() - count_at)
    }

    /// Rebuild the resumed extension state from a blob produced by
    /// [`pack`](Session::pack).
    ///
    /// Each record must name a registered descriptor with an unpack
    /// handler, and the handler must consume exactly the declared number of
    /// bytes. Any structural problem fails with
    /// [`ExtensionError::InvalidResumptionData`].
    pub fn unpack(&mut self, mut data: &[u8]) -> Result<(), ExtensionError> {
        let count = read_u32(&mut data)?;

        for _ in 0..count {
            let id_value = read_u32(&mut data)?;
            let size = read_u32(&mut data)? as usize;
            if data.len() < size {
                return Err(ExtensionError::InvalidResumptionData);
            }
            let (body, rest) = data.split_at(size);
            data = rest;

            let id = match u16::try_from(id_value) {
                Ok(v) => crate::descriptor::InternalId::new(v),
                Err(_) => return Err(ExtensionError::InvalidResumptionData),
            };
            let Some(def) = self.find_by_id(id, ParseClass::Any) else {
                return Err(ExtensionError::InvalidResumptionData);
            };
            let Some(unpack) = def.unpack else {
                return Err(ExtensionError::InvalidResumptionData);
            };

            let mut cursor = body;
            let value =
                unpack(&mut cursor).map_err(|_| ExtensionError::InvalidResumptionData)?;
            if !cursor.is_empty() {
                return Err(ExtensionError::InvalidResumptionData);
            }
            self.set_resumed(id, value)?;
        }

        if !data.is_empty() {
            return Err(ExtensionError::InvalidResumptionData);
        }
        Ok(())
    }
}
