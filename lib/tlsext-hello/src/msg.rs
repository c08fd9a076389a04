/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 TlsExt-OSS developers.
 */

use std::fmt;

use bitflags::bitflags;

/// The handshake message an extension block is carried in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandshakeMsg {
    ClientHello,
    Tls12ServerHello,
    Tls13ServerHello,
    EncryptedExtensions,
    Certificate,
    CertificateRequest,
    NewSessionTicket,
    HelloRetryRequest,
}

bitflags! {
    /// Set of handshake messages an extension is allowed to appear in
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct MsgFlags: u16 {
        const CLIENT_HELLO = 1 << 0;
        const TLS12_SERVER_HELLO = 1 << 1;
        const TLS13_SERVER_HELLO = 1 << 2;
        const ENCRYPTED_EXTENSIONS = 1 << 3;
        const CERTIFICATE = 1 << 4;
        const CERTIFICATE_REQUEST = 1 << 5;
        const NEW_SESSION_TICKET = 1 << 6;
        const HELLO_RETRY_REQUEST = 1 << 7;
    }
}

impl HandshakeMsg {
    pub const fn flag(self) -> MsgFlags {
        match self {
            HandshakeMsg::ClientHello => MsgFlags::CLIENT_HELLO,
            HandshakeMsg::Tls12ServerHello => MsgFlags::TLS12_SERVER_HELLO,
            HandshakeMsg::Tls13ServerHello => MsgFlags::TLS13_SERVER_HELLO,
            HandshakeMsg::EncryptedExtensions => MsgFlags::ENCRYPTED_EXTENSIONS,
            HandshakeMsg::Certificate => MsgFlags::CERTIFICATE,
            HandshakeMsg::CertificateRequest => MsgFlags::CERTIFICATE_REQUEST,
            HandshakeMsg::NewSessionTicket => MsgFlags::NEW_SESSION_TICKET,
            HandshakeMsg::HelloRetryRequest => MsgFlags::HELLO_RETRY_REQUEST,
        }
    }
}

impl fmt::Display for HandshakeMsg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HandshakeMsg::ClientHello => "client hello",
            HandshakeMsg::Tls12ServerHello => "TLS 1.2 server hello",
            HandshakeMsg::Tls13ServerHello => "TLS 1.3 server hello",
            HandshakeMsg::EncryptedExtensions => "encrypted extensions",
            HandshakeMsg::Certificate => "certificate",
            HandshakeMsg::CertificateRequest => "certificate request",
            HandshakeMsg::NewSessionTicket => "new session ticket",
            HandshakeMsg::HelloRetryRequest => "hello retry request",
        };
        f.write_str(s)
    }
}
