//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

//! Vimshottari Mahadasha and Antardasha timelines

use chrono::DateTime;
use chrono::Duration;
use chrono::SecondsFormat;
use chrono::Utc;
use getset::CopyGetters;
use getset::Getters;
use serde::Deserialize;
use serde::Serialize;
use tracing::trace;

use crate::astro::InputError;

/// Length of the whole cycle in years
pub const CYCLE_YEARS: f64 = 120.0;

pub const DAYS_PER_YEAR: f64 = 365.2425;

pub const NAKSHATRA_COUNT: usize = 27;

pub const NAKSHATRA_LEN: f64 = 360.0 / NAKSHATRA_COUNT as f64;

#[derive(parse_display::Display, Serialize, Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum Planet {
    Ketu,
    Venus,
    Sun,
    Moon,
    Mars,
    Rahu,
    Jupiter,
    Saturn,
    Mercury,
}

impl Planet {
    /// The order the periods follow each other in
    pub const ORDER: [Planet; 9] = [
        Planet::Ketu,
        Planet::Venus,
        Planet::Sun,
        Planet::Moon,
        Planet::Mars,
        Planet::Rahu,
        Planet::Jupiter,
        Planet::Saturn,
        Planet::Mercury,
    ];

    pub fn years(self) -> f64 {
        match self {
            Planet::Ketu => 7.0,
            Planet::Venus => 20.0,
            Planet::Sun => 6.0,
            Planet::Moon => 10.0,
            Planet::Mars => 7.0,
            Planet::Rahu => 18.0,
            Planet::Jupiter => 16.0,
            Planet::Saturn => 19.0,
            Planet::Mercury => 17.0,
        }
    }

    fn index(self) -> usize {
        Self::ORDER.iter().position(|p| *p == self).unwrap_or(0)
    }

    /// The nine lords starting with this one
    fn cycle_from(self) -> impl Iterator<Item = Planet> {
        let start = self.index();
        (0..Self::ORDER.len()).map(move |i| Self::ORDER[(start + i) % Self::ORDER.len()])
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct DashaRequest {
    pub moon_longitude: f64,

    /// RFC 3339
    pub birth_utc: String,
}

#[derive(Serialize, Clone, Debug, Getters, CopyGetters)]
pub struct DashaPeriod {
    #[getset(get_copy = "pub")]
    planet: Planet,

    #[getset(get = "pub")]
    start_utc: String,

    #[getset(get = "pub")]
    end_utc: String,

    #[getset(get_copy = "pub")]
    duration_years: f64,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[getset(get = "pub")]
    antardashas: Vec<DashaPeriod>,
}

#[derive(Serialize, Debug, Getters, CopyGetters)]
pub struct DashaTimeline {
    #[getset(get = "pub")]
    input: DashaRequest,

    #[getset(get = "pub")]
    utc_birth: String,

    /// Normalized to [0, 360)
    #[getset(get_copy = "pub")]
    moon_longitude: f64,

    #[getset(get_copy = "pub")]
    nakshatra_index: usize,

    #[getset(get_copy = "pub")]
    nakshatra_fraction: f64,

    #[getset(get = "pub")]
    mahadasha_sequence: Vec<DashaPeriod>,
}

/// Map any finite longitude into [0, 360)
pub fn normalize_longitude(deg: f64) -> f64 {
    let d = deg.rem_euclid(360.0);
    // rem_euclid rounds tiny negative values up to 360.0
    if d >= 360.0 {
        0.0
    } else {
        d
    }
}

/// Nakshatra index (0..27) and the elapsed fraction of it
pub fn nakshatra(moon_longitude: f64) -> (usize, f64) {
    let position = normalize_longitude(moon_longitude) / NAKSHATRA_LEN;
    let index = (position.floor() as usize).min(NAKSHATRA_COUNT - 1);
    (index, position - index as f64)
}

fn years_to_duration(years: f64) -> Duration {
    Duration::microseconds((years * DAYS_PER_YEAR * 86_400_000_000.0).round() as i64)
}

fn timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn periods<F>(
    lords: impl Iterator<Item = Planet>,
    start: DateTime<Utc>,
    years_of: F,
) -> Result<Vec<(Planet, DateTime<Utc>, DateTime<Utc>, f64)>, InputError>
where
    F: Fn(usize, Planet) -> f64,
{
    let mut running = start;
    lords
        .enumerate()
        .map(|(idx, planet)| {
            let years = years_of(idx, planet);
            let end = running
                .checked_add_signed(years_to_duration(years))
                .ok_or_else(|| InputError::OutOfRange(timestamp(&start)))?;
            let period = (planet, running, end, years);
            running = end;
            Ok(period)
        })
        .collect()
}

fn antardashas(maha: Planet, start: DateTime<Utc>, maha_years: f64) -> Result<Vec<DashaPeriod>, InputError> {
    let subs = periods(maha.cycle_from(), start, |_, sub| maha_years * sub.years() / CYCLE_YEARS)?
        .into_iter()
        .map(|(planet, start, end, years)| DashaPeriod {
            planet,
            start_utc: timestamp(&start),
            end_utc: timestamp(&end),
            duration_years: years,
            antardashas: Vec::new(),
        })
        .collect();

    Ok(subs)
}

pub fn compute(request: &DashaRequest) -> Result<DashaTimeline, InputError> {
    if !request.moon_longitude.is_finite() {
        return Err(InputError::NonFiniteLongitude(request.moon_longitude));
    }

    let birth = DateTime::parse_from_rfc3339(request.birth_utc.trim())
        .map_err(|e| InputError::InvalidTimestamp {
            value: request.birth_utc.clone(),
            reason: e.to_string(),
        })?
        .with_timezone(&Utc);

    let moon_longitude = normalize_longitude(request.moon_longitude);
    let (nakshatra_index, nakshatra_fraction) = nakshatra(moon_longitude);
    let first = Planet::ORDER[nakshatra_index % Planet::ORDER.len()];
    trace!("Nakshatra {} ({:.4} elapsed), first lord {}", nakshatra_index, nakshatra_fraction, first);

    let mahadasha_sequence = periods(first.cycle_from(), birth, |idx, planet| {
        if idx == 0 {
            planet.years() * (1.0 - nakshatra_fraction)
        } else {
            planet.years()
        }
    })?
    .into_iter()
    .map(|(planet, start, end, years)| {
        Ok(DashaPeriod {
            planet,
            start_utc: timestamp(&start),
            end_utc: timestamp(&end),
            duration_years: years,
            antardashas: antardashas(planet, start, years)?,
        })
    })
    .collect::<Result<Vec<_>, InputError>>()?;

    Ok(DashaTimeline {
        input: request.clone(),
        utc_birth: timestamp(&birth),
        moon_longitude,
        nakshatra_index,
        nakshatra_fraction,
        mahadasha_sequence,
    })
}
