/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 TlsExt-OSS developers.
 */

mod extension;
pub use extension::{Extension, ExtensionIter, ExtensionList, ExtensionParseError, ExtensionType};
