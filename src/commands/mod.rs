//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

mod check;
pub use check::check;

mod launch;
pub use launch::launch;

mod preflight;
pub use preflight::preflight;

mod render;
pub use render::render;

mod serve;
pub use serve::serve;

mod util;
