/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 TlsExt-OSS developers.
 */

use std::fmt;

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionParseError {
    #[error("truncated extension header")]
    TruncatedHeader,
    #[error("truncated extension data")]
    TruncatedData,
}

/// The on-the-wire extension type as allocated by IANA.
///
/// Values not present in the IANA registry are representable, unknown
/// extensions are a normal condition on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExtensionType(u16);

macro_rules! iana_extension_types {
    ($(($name:ident, $value:literal, $label:literal),)+) => {
        impl ExtensionType {
            $(
                pub const $name: ExtensionType = ExtensionType($value);
            )+

            /// Get the registered name, if this is a known IANA allocation
            pub const fn name(&self) -> Option<&'static str> {
                match self.0 {
                    $($value => Some($label),)+
                    _ => None,
                }
            }
        }
    };
}

iana_extension_types! {
    (SERVER_NAME, 0x0000, "server_name"),
    (MAX_FRAGMENT_LENGTH, 0x0001, "max_fragment_length"),
    (STATUS_REQUEST, 0x0005, "status_request"),
    (SUPPORTED_GROUPS, 0x000a, "supported_groups"),
    (EC_POINT_FORMATS, 0x000b, "ec_point_formats"),
    (SIGNATURE_ALGORITHMS, 0x000d, "signature_algorithms"),
    (USE_SRTP, 0x000e, "use_srtp"),
    (HEARTBEAT, 0x000f, "heartbeat"),
    (ALPN, 0x0010, "application_layer_protocol_negotiation"),
    (SCT, 0x0012, "signed_certificate_timestamp"),
    (CLIENT_CERTIFICATE_TYPE, 0x0013, "client_certificate_type"),
    (SERVER_CERTIFICATE_TYPE, 0x0014, "server_certificate_type"),
    (PADDING, 0x0015, "padding"),
    (ENCRYPT_THEN_MAC, 0x0016, "encrypt_then_mac"),
    (EXTENDED_MASTER_SECRET, 0x0017, "extended_master_secret"),
    (COMPRESS_CERTIFICATE, 0x001b, "compress_certificate"),
    (RECORD_SIZE_LIMIT, 0x001c, "record_size_limit"),
    (SESSION_TICKET, 0x0023, "session_ticket"),
    (PRE_SHARED_KEY, 0x0029, "pre_shared_key"),
    (EARLY_DATA, 0x002a, "early_data"),
    (SUPPORTED_VERSIONS, 0x002b, "supported_versions"),
    (COOKIE, 0x002c, "cookie"),
    (PSK_KEY_EXCHANGE_MODES, 0x002d, "psk_key_exchange_modes"),
    (CERTIFICATE_AUTHORITIES, 0x002f, "certificate_authorities"),
    (OID_FILTERS, 0x0030, "oid_filters"),
    (POST_HANDSHAKE_AUTH, 0x0031, "post_handshake_auth"),
    (SIGNATURE_ALGORITHMS_CERT, 0x0032, "signature_algorithms_cert"),
    (KEY_SHARE, 0x0033, "key_share"),
    (RENEGOTIATION_INFO, 0xff01, "renegotiation_info"),
}

impl ExtensionType {
    pub const fn new(value: u16) -> Self {
        ExtensionType(value)
    }

    pub const fn value(&self) -> u16 {
        self.0
    }
}

impl From<u16> for ExtensionType {
    fn from(value: u16) -> Self {
        ExtensionType(value)
    }
}

impl From<ExtensionType> for u16 {
    fn from(value: ExtensionType) -> Self {
        value.0
    }
}

impl fmt::Display for ExtensionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "unknown(0x{:04x})", self.0),
        }
    }
}

/// Borrowed view of a single extension record
#[derive(Debug)]
pub struct Extension<'a> {
    pub ext_type: ExtensionType,
    pub data: &'a [u8],
}

/// Iterator over an extension block, the outer length of which has already
/// been stripped by the message framer.
///
/// Each record is `u16 type | u16 length | length bytes`. A record running
/// past the end of the block yields an error and ends the iteration.
pub struct ExtensionIter<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ExtensionIter<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        ExtensionIter { data, offset: 0 }
    }
}

impl<'a> Iterator for ExtensionIter<'a> {
    type Item = Result<Extension<'a>, ExtensionParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        let left = &self.data[self.offset..];
        if left.is_empty() {
            return None;
        }
        if left.len() < 4 {
            self.offset = self.data.len();
            return Some(Err(ExtensionParseError::TruncatedHeader));
        }
        let ext_type = u16::from_be_bytes([left[0], left[1]]);
        let ext_len = u16::from_be_bytes([left[2], left[3]]) as usize;
        if left.len() < 4 + ext_len {
            self.offset = self.data.len();
            return Some(Err(ExtensionParseError::TruncatedData));
        }
        self.offset += 4 + ext_len;
        Some(Ok(Extension {
            ext_type: ExtensionType(ext_type),
            data: &left[4..4 + ext_len],
        }))
    }
}

pub struct ExtensionList {}

impl ExtensionList {
    /// Get the raw value of the given extension from an extension block
    pub fn get_ext(
        data: &[u8],
        ext_type: ExtensionType,
    ) -> Result<Option<&[u8]>, ExtensionParseError> {
        for r in ExtensionIter::new(data) {
            let ext = r?;
            if ext.ext_type == ext_type {
                return Ok(Some(ext.data));
            }
        }
        Ok(None)
    }
}
