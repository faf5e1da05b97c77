//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

//! The deterministic analyses the service answers itself
//!
//! Neither needs an ephemeris: the Vastu mapper works on a floor plan, the Dasha timeline on a
//! Moon longitude the caller supplies.

use thiserror::Error as ThisError;

pub mod dasha;
pub mod report;
pub mod vastu;

/// Input that cannot be analysed
#[derive(ThisError, Debug)]
pub enum InputError {
    #[error("Moon longitude must be a finite number, got {0}")]
    NonFiniteLongitude(f64),

    #[error("Invalid timestamp '{value}': {reason}")]
    InvalidTimestamp { value: String, reason: String },

    #[error("Timeline starting at {0} leaves the representable time range")]
    OutOfRange(String),
}
