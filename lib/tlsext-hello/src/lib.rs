/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 TlsExt-OSS developers.
 */

mod error;
pub use error::{ExtensionError, RegisterError};

mod msg;
pub use msg::{HandshakeMsg, MsgFlags};

mod descriptor;
pub use descriptor::{
    ExtData, ExtensionDef, InternalId, MAX_INTERNAL_ID, PackFn, ParseClass, RecvFn, SendFn,
    SendResult, UnpackFn,
};

mod registry;
pub use registry::ExtensionRegistry;

mod session;
pub use session::{Session, Side};

mod parse;

mod emit;

mod resume;
