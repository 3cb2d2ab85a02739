// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Typed wrappers over `NativeBridge::call_native`, one per native plugin.

pub mod preference;
pub mod router;

pub use preference::PreferencePlugin;
pub use router::RouterPlugin;
