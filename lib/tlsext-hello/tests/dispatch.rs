/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 TlsExt-OSS developers.
 */

use std::sync::Arc;

use tlsext_codec::{ExtensionIter, ExtensionType};
use tlsext_hello::{
    ExtensionDef, ExtensionError, ExtensionRegistry, HandshakeMsg, MsgFlags, ParseClass,
    RegisterError, SendResult, Session, Side,
};

fn recv_noop(_session: &mut Session, _body: &[u8]) -> Result<(), ExtensionError> {
    Ok(())
}

fn send_flag(_session: &mut Session, _buf: &mut Vec<u8>) -> Result<SendResult, ExtensionError> {
    Ok(SendResult::ZeroLength)
}

#[test]
fn unknown_extension_skipped() {
    let mut registry = ExtensionRegistry::new();
    registry
        .register(
            ExtensionDef::new(ExtensionType::ALPN, "alpn", ParseClass::Application)
                .with_validity(MsgFlags::CLIENT_HELLO)
                .with_recv(recv_noop),
        )
        .unwrap();
    let mut session = Session::new(Arc::new(registry), Side::Server);

    // wire id 99 with an empty body, not in the catalog
    let block: &[u8] = &[0x00, 0x63, 0x00, 0x00];
    session
        .parse(HandshakeMsg::ClientHello, ParseClass::Any, block)
        .unwrap();
    assert_eq!(session.advertised_ids().count(), 0);
    assert!(session.get_ext_data(ExtensionType::new(0x63)).is_none());
}

#[test]
fn unsolicited_server_extension_rejected() {
    let mut registry = ExtensionRegistry::new();
    registry
        .register(
            ExtensionDef::new(
                ExtensionType::SUPPORTED_VERSIONS,
                "supported_versions",
                ParseClass::TlsEarly,
            )
            .with_validity(MsgFlags::CLIENT_HELLO | MsgFlags::TLS13_SERVER_HELLO)
            .with_recv(recv_noop),
        )
        .unwrap();
    // a client that never offered anything
    let mut session = Session::new(Arc::new(registry), Side::Client);

    let block: &[u8] = &[
        0x00, 0x2b, // Extension Type - Supported Versions
        0x00, 0x02, // Extension Length, 2
        0x03, 0x04, // TLS 1.3
    ];
    assert_eq!(
        session
            .parse(HandshakeMsg::Tls13ServerHello, ParseClass::Any, block)
            .unwrap_err(),
        ExtensionError::Unsolicited(ExtensionType::SUPPORTED_VERSIONS)
    );
}

#[test]
fn validity_mask_rejects_misplaced_extension() {
    fn send_body(
        _session: &mut Session,
        buf: &mut Vec<u8>,
    ) -> Result<SendResult, ExtensionError> {
        buf.push(0x00);
        Ok(SendResult::Appended)
    }

    let mut registry = ExtensionRegistry::new();
    registry
        .register(
            ExtensionDef::new(ExtensionType::new(0xfe0d), "client_only", ParseClass::TlsEarly)
                .with_validity(MsgFlags::CLIENT_HELLO)
                .with_recv(recv_noop)
                .with_send(send_body),
        )
        .unwrap();
    let mut session = Session::new(Arc::new(registry), Side::Client);

    // advertise it in the client hello first
    let mut buf = Vec::new();
    session
        .emit(HandshakeMsg::ClientHello, ParseClass::Any, &mut buf)
        .unwrap();

    // a server echoing it in a TLS 1.3 server hello is out of bounds
    let block: &[u8] = &[
        0xfe, 0x0d, // Extension Type
        0x00, 0x00, // Extension Length, 0
    ];
    assert_eq!(
        session
            .parse(HandshakeMsg::Tls13ServerHello, ParseClass::Any, block)
            .unwrap_err(),
        ExtensionError::IllegalForMessage(ExtensionType::new(0xfe0d), HandshakeMsg::Tls13ServerHello)
    );
}

#[test]
fn overlay_override_takes_recv() {
    fn recv_builtin(session: &mut Session, _body: &[u8]) -> Result<(), ExtensionError> {
        session.set_ext_data(ExtensionType::SUPPORTED_GROUPS, Box::new("builtin"))
    }
    fn recv_overlay(session: &mut Session, _body: &[u8]) -> Result<(), ExtensionError> {
        session.set_ext_data(ExtensionType::SUPPORTED_GROUPS, Box::new("overlay"))
    }

    let mut registry = ExtensionRegistry::new();
    registry
        .register(
            ExtensionDef::new(
                ExtensionType::SUPPORTED_GROUPS,
                "supported_groups",
                ParseClass::TlsEarly,
            )
            .with_validity(MsgFlags::CLIENT_HELLO)
            .with_recv(recv_builtin),
        )
        .unwrap();
    let mut session = Session::new(Arc::new(registry), Side::Server);

    // without the override flag the built-in wins the collision
    let def = ExtensionDef::new(
        ExtensionType::SUPPORTED_GROUPS,
        "my_groups",
        ParseClass::TlsEarly,
    )
    .with_recv(recv_overlay);
    assert_eq!(
        session.register_ext(def, false).unwrap_err(),
        RegisterError::AlreadyRegistered(ExtensionType::SUPPORTED_GROUPS)
    );

    let def = ExtensionDef::new(
        ExtensionType::SUPPORTED_GROUPS,
        "my_groups",
        ParseClass::TlsEarly,
    )
    .with_recv(recv_overlay);
    session.register_ext(def, true).unwrap();

    let block: &[u8] = &[
        0x00, 0x0a, // Extension Type - Supported Groups
        0x00, 0x00, // Extension Length, 0
    ];
    session
        .parse(HandshakeMsg::ClientHello, ParseClass::Any, block)
        .unwrap();

    let marker = session
        .get_ext_data(ExtensionType::SUPPORTED_GROUPS)
        .unwrap()
        .downcast_ref::<&str>()
        .unwrap();
    assert_eq!(*marker, "overlay");
}

#[test]
fn client_double_emit_suppressed() {
    fn send_builtin(
        _session: &mut Session,
        buf: &mut Vec<u8>,
    ) -> Result<SendResult, ExtensionError> {
        buf.extend_from_slice(b"builtin");
        Ok(SendResult::Appended)
    }
    fn send_overlay(
        _session: &mut Session,
        buf: &mut Vec<u8>,
    ) -> Result<SendResult, ExtensionError> {
        buf.extend_from_slice(b"overlay");
        Ok(SendResult::Appended)
    }

    let mut registry = ExtensionRegistry::new();
    registry
        .register(
            ExtensionDef::new(ExtensionType::ALPN, "alpn", ParseClass::Application)
                .with_validity(MsgFlags::CLIENT_HELLO)
                .with_send(send_builtin),
        )
        .unwrap();
    let mut session = Session::new(Arc::new(registry), Side::Client);
    session
        .register_ext(
            ExtensionDef::new(ExtensionType::ALPN, "my_alpn", ParseClass::Application)
                .with_send(send_overlay),
            true,
        )
        .unwrap();

    let mut buf = Vec::new();
    session
        .emit(HandshakeMsg::ClientHello, ParseClass::Any, &mut buf)
        .unwrap();

    // exactly one TLV for wire id 16, carrying the overlay payload
    let mut seen = Vec::new();
    for r in ExtensionIter::new(&buf[2..]) {
        let ext = r.unwrap();
        seen.push((ext.ext_type, ext.data.to_vec()));
    }
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, ExtensionType::ALPN);
    assert_eq!(seen[0].1.as_slice(), b"overlay");
}

#[test]
fn emit_order_is_overlay_then_builtins() {
    fn send_one(_session: &mut Session, buf: &mut Vec<u8>) -> Result<SendResult, ExtensionError> {
        buf.push(0x01);
        Ok(SendResult::Appended)
    }

    let mut registry = ExtensionRegistry::new();
    for (wire, name) in [(0x0au16, "groups"), (0x10u16, "alpn"), (0x2bu16, "versions")] {
        registry
            .register(
                ExtensionDef::new(ExtensionType::new(wire), name, ParseClass::TlsEarly)
                    .with_validity(MsgFlags::CLIENT_HELLO)
                    .with_send(send_one),
            )
            .unwrap();
    }
    let mut session = Session::new(Arc::new(registry), Side::Client);
    session
        .register_ext(
            ExtensionDef::new(ExtensionType::new(0xfe00), "overlay_a", ParseClass::TlsEarly)
                .with_send(send_one),
            false,
        )
        .unwrap();
    session
        .register_ext(
            ExtensionDef::new(ExtensionType::new(0xfe01), "overlay_b", ParseClass::TlsEarly)
                .with_send(send_one),
            false,
        )
        .unwrap();

    let mut buf = Vec::new();
    session
        .emit(HandshakeMsg::ClientHello, ParseClass::Any, &mut buf)
        .unwrap();

    let mut order = Vec::new();
    for r in ExtensionIter::new(&buf[2..]) {
        order.push(r.unwrap().ext_type.value());
    }
    assert_eq!(order, vec![0xfe00, 0xfe01, 0x0a, 0x10, 0x2b]);
}

#[test]
fn validity_gating_skips_send_and_recv() {
    fn recv_fail(_session: &mut Session, _body: &[u8]) -> Result<(), ExtensionError> {
        panic!("recv must not run for a message outside the validity mask");
    }
    fn send_fail(_session: &mut Session, _buf: &mut Vec<u8>) -> Result<SendResult, ExtensionError> {
        panic!("send must not run for a message outside the validity mask");
    }

    let mut registry = ExtensionRegistry::new();
    registry
        .register(
            ExtensionDef::new(ExtensionType::EARLY_DATA, "early_data", ParseClass::TlsLate)
                .with_validity(MsgFlags::NEW_SESSION_TICKET)
                .with_recv(recv_fail)
                .with_send(send_fail),
        )
        .unwrap();
    let mut session = Session::new(Arc::new(registry), Side::Client);

    let mut buf = Vec::new();
    let n = session
        .emit(HandshakeMsg::ClientHello, ParseClass::Any, &mut buf)
        .unwrap();
    assert_eq!(n, 0);

    // the parse side errors out before reaching the handler
    let mut server = Session::new(
        {
            let mut registry = ExtensionRegistry::new();
            registry
                .register(
                    ExtensionDef::new(ExtensionType::EARLY_DATA, "early_data", ParseClass::TlsLate)
                        .with_validity(MsgFlags::NEW_SESSION_TICKET)
                        .with_recv(recv_fail),
                )
                .unwrap();
            Arc::new(registry)
        },
        Side::Server,
    );
    let block: &[u8] = &[
        0x00, 0x2a, // Extension Type - Early Data
        0x00, 0x00, // Extension Length, 0
    ];
    assert_eq!(
        server
            .parse(HandshakeMsg::ClientHello, ParseClass::Any, block)
            .unwrap_err(),
        ExtensionError::IllegalForMessage(ExtensionType::EARLY_DATA, HandshakeMsg::ClientHello)
    );
}

#[test]
fn server_answers_only_offered_extensions() {
    let mut registry = ExtensionRegistry::new();
    registry
        .register(
            ExtensionDef::new(
                ExtensionType::EXTENDED_MASTER_SECRET,
                "extended_master_secret",
                ParseClass::TlsEarly,
            )
            .with_validity(MsgFlags::CLIENT_HELLO | MsgFlags::TLS12_SERVER_HELLO)
            .with_recv(recv_noop)
            .with_send(send_flag),
        )
        .unwrap();
    registry
        .register(
            ExtensionDef::new(
                ExtensionType::SESSION_TICKET,
                "session_ticket",
                ParseClass::TlsEarly,
            )
            .with_validity(MsgFlags::CLIENT_HELLO | MsgFlags::TLS12_SERVER_HELLO)
            .with_recv(recv_noop)
            .with_send(send_flag),
        )
        .unwrap();
    let mut server = Session::new(Arc::new(registry), Side::Server);

    // the client offered extended_master_secret only
    let block: &[u8] = &[
        0x00, 0x17, // Extension Type - Extended Master Secret
        0x00, 0x00, // Extension Length, 0
    ];
    server
        .parse(HandshakeMsg::ClientHello, ParseClass::Any, block)
        .unwrap();

    let mut buf = Vec::new();
    server
        .emit(HandshakeMsg::Tls12ServerHello, ParseClass::Any, &mut buf)
        .unwrap();

    let mut types = Vec::new();
    for r in ExtensionIter::new(&buf[2..]) {
        types.push(r.unwrap().ext_type);
    }
    assert_eq!(types, vec![ExtensionType::EXTENDED_MASTER_SECRET]);
}
