//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

//! Rule based Vastu sector mapping
//!
//! Rooms are placed into the eight compass sectors. Empty sectors are "weak" and get an
//! activation suggestion, a few room placements get a mitigation suggestion.

use std::collections::BTreeMap;

use getset::Getters;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

#[derive(parse_display::Display, Serialize, Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub enum Sector {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl Sector {
    pub const ALL: [Sector; 8] = [
        Sector::N,
        Sector::NE,
        Sector::E,
        Sector::SE,
        Sector::S,
        Sector::SW,
        Sector::W,
        Sector::NW,
    ];

    /// Accepts abbreviations and full names in any case, e.g. "ne", "North-East", "NorthEast"
    pub fn normalize(s: &str) -> Option<Sector> {
        let s = s.trim().to_uppercase();
        let sector = match s.as_str() {
            "N" | "NORTH" => Sector::N,
            "NE" | "NORTHEAST" | "NORTH-EAST" => Sector::NE,
            "E" | "EAST" => Sector::E,
            "SE" | "SOUTHEAST" | "SOUTH-EAST" => Sector::SE,
            "S" | "SOUTH" => Sector::S,
            "SW" | "SOUTHWEST" | "SOUTH-WEST" => Sector::SW,
            "W" | "WEST" => Sector::W,
            "NW" | "NORTHWEST" | "NORTH-WEST" => Sector::NW,
            _ => return None,
        };
        Some(sector)
    }

    pub fn element(self) -> &'static str {
        match self {
            Sector::N | Sector::W => "water",
            Sector::NE | Sector::SW => "earth",
            Sector::E | Sector::NW => "air",
            Sector::SE | Sector::S => "fire",
        }
    }

    pub fn qualities(self) -> &'static [&'static str] {
        match self {
            Sector::N => &["career", "flow"],
            Sector::NE => &["spirituality", "study"],
            Sector::E => &["health", "family"],
            Sector::SE => &["wealth", "kitchen"],
            Sector::S => &["fame", "energy"],
            Sector::SW => &["stability", "relationships"],
            Sector::W => &["children", "creativity"],
            Sector::NW => &["network", "travel"],
        }
    }

    pub fn default_activation(self) -> &'static str {
        match self {
            Sector::NE => "keep clutter free",
            Sector::SW => "strengthen with heavy furniture or earth tones",
            Sector::SE => "kitchen or fire element here is good; if not, use bright lights",
            Sector::N => "water features (small) or mirror carefully",
            Sector::E => "place plants, morning light area",
            Sector::W => "use creative displays for children and hobbies",
            Sector::NW => "keep for guest/transport functions; avoid heavy storage",
            Sector::S => "avoid heavy water in south; use colors for fame",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, Eq, PartialEq)]
pub struct Room {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,

    /// Whatever else the client describes the room with, returned unchanged
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Room {
    /// `sector` wins over `direction`, an empty value counts as missing
    fn placement(&self) -> Option<Sector> {
        self.sector
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.direction.as_deref())
            .and_then(Sector::normalize)
    }

    fn lowercase_name(&self) -> String {
        self.name.as_deref().unwrap_or_default().to_lowercase()
    }
}

/// `facing` and `entrance` are short forms, the long names win if both are given
#[derive(Deserialize, Clone, Debug, Default)]
pub struct VastuRequest {
    #[serde(default)]
    pub plot_facing: Option<String>,

    #[serde(default)]
    pub facing: Option<String>,

    #[serde(default)]
    pub main_entrance: Option<String>,

    #[serde(default)]
    pub entrance: Option<String>,

    #[serde(default)]
    pub rooms: Option<Vec<Room>>,

    #[serde(default)]
    pub plot_type: Option<String>,
}

#[derive(Serialize, Debug, Getters)]
pub struct SectorInfo {
    element: &'static str,
    qualities: &'static [&'static str],

    #[getset(get = "pub")]
    occupancy_count: usize,

    #[getset(get = "pub")]
    rooms: Vec<Room>,
}

#[derive(Serialize, Clone, Debug, Getters)]
pub struct Recommendation {
    #[getset(get = "pub")]
    sector: Sector,

    #[getset(get = "pub")]
    action: String,

    #[getset(get = "pub")]
    priority: usize,

    #[getset(get = "pub")]
    why: String,
}

#[derive(Serialize, Debug, Getters)]
pub struct VastuAnalysis {
    #[getset(get = "pub")]
    plot_facing: Option<Sector>,

    #[getset(get = "pub")]
    entrance: Option<Sector>,

    #[getset(get = "pub")]
    plot_type: String,

    #[getset(get = "pub")]
    sectors: BTreeMap<Sector, SectorInfo>,

    #[getset(get = "pub")]
    weak_sectors: Vec<Sector>,

    #[getset(get = "pub")]
    recommended_activations: Vec<Recommendation>,
}

impl VastuRequest {
    fn plot_facing(&self) -> Option<Sector> {
        first_given(&self.plot_facing, &self.facing).and_then(Sector::normalize)
    }

    fn entrance(&self) -> Option<Sector> {
        first_given(&self.main_entrance, &self.entrance).and_then(Sector::normalize)
    }
}

/// An empty value counts as not given
fn first_given<'a>(preferred: &'a Option<String>, fallback: &'a Option<String>) -> Option<&'a str> {
    preferred
        .as_deref()
        .filter(|s| !s.is_empty())
        .or_else(|| fallback.as_deref())
}

pub fn analyze(request: &VastuRequest) -> VastuAnalysis {
    let plot_facing = request.plot_facing();
    let entrance = request.entrance();
    let plot_type = request
        .plot_type
        .as_deref()
        .filter(|t| !t.is_empty())
        .unwrap_or("house")
        .to_lowercase();

    let mut room_map: BTreeMap<Sector, Vec<Room>> = Sector::ALL.iter().map(|s| (*s, Vec::new())).collect();
    for room in request.rooms.iter().flatten() {
        match room.placement() {
            Some(sector) => room_map.entry(sector).or_default().push(room.clone()),
            None => debug!("Ignoring room without known sector: {:?}", room),
        }
    }

    let weak_sectors = Sector::ALL
        .iter()
        .copied()
        .filter(|s| room_map.get(s).map(Vec::is_empty).unwrap_or(true) && Some(*s) != entrance)
        .collect::<Vec<_>>();

    let mut recs = Vec::new();

    if let Some(sector) = entrance {
        recs.push(Recommendation {
            sector,
            action: sector.default_activation().to_string(),
            priority: 0,
            why: format!("Main entrance is at {sector}"),
        });
    }

    for (idx, sector) in weak_sectors.iter().enumerate() {
        recs.push(Recommendation {
            sector: *sector,
            action: sector.default_activation().to_string(),
            priority: 2 + idx,
            why: format!("Sector {sector} currently has no rooms; suggested activation to balance energy."),
        });
    }

    for (sector, rooms) in room_map.iter() {
        for room in rooms {
            let name = room.lowercase_name();

            if name.contains("kitchen") && *sector == Sector::NE {
                recs.push(Recommendation {
                    sector: *sector,
                    action: String::from("Consider relocating kitchen (NE not ideal for fire); if not possible, mitigate with white tiles and ventilation"),
                    priority: 1,
                    why: String::from("Kitchen (fire) in NE (spiritual sector) - mitigation suggested"),
                });
            }

            let is_shrine = ["puja", "altar", "temple"].iter().any(|w| name.contains(w));
            if is_shrine && !matches!(sector, Sector::NE | Sector::E) {
                recs.push(Recommendation {
                    sector: *sector,
                    action: String::from("Prefer moving puja/meditation to NE/E if possible; otherwise keep clean and elevated"),
                    priority: 1,
                    why: String::from("Puja best suited to NE/E"),
                });
            }
        }
    }

    // stable, equal priorities keep their insertion order
    recs.sort_by_key(|r| r.priority);

    let sectors = room_map
        .into_iter()
        .map(|(sector, rooms)| {
            let info = SectorInfo {
                element: sector.element(),
                qualities: sector.qualities(),
                occupancy_count: rooms.len(),
                rooms,
            };
            (sector, info)
        })
        .collect();

    VastuAnalysis {
        plot_facing,
        entrance,
        plot_type,
        sectors,
        weak_sectors,
        recommended_activations: recs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(name: &str, sector: &str) -> Room {
        Room {
            name: Some(name.to_string()),
            sector: Some(sector.to_string()),
            ..Room::default()
        }
    }

    fn sample() -> VastuRequest {
        VastuRequest {
            plot_facing: Some(String::from("North")),
            main_entrance: Some(String::from("NE")),
            rooms: Some(vec![
                room("master_bed", "SW"),
                room("kitchen", "SE"),
                room("puja", "NW"),
            ]),
            ..VastuRequest::default()
        }
    }

    #[test]
    fn test_normalize() {
        assert_eq!(Sector::normalize("ne"), Some(Sector::NE));
        assert_eq!(Sector::normalize(" North-East "), Some(Sector::NE));
        assert_eq!(Sector::normalize("NorthWest"), Some(Sector::NW));
        assert_eq!(Sector::normalize("south"), Some(Sector::S));
        assert_eq!(Sector::normalize("up"), None);
        assert_eq!(Sector::normalize(""), None);
    }

    #[test]
    fn test_sample_analysis() {
        let a = analyze(&sample());

        assert_eq!(*a.plot_facing(), Some(Sector::N));
        assert_eq!(*a.entrance(), Some(Sector::NE));
        assert_eq!(a.plot_type(), "house");
        assert_eq!(
            a.weak_sectors(),
            &vec![Sector::N, Sector::E, Sector::S, Sector::W]
        );
        assert_eq!(*a.sectors()[&Sector::SW].occupancy_count(), 1);

        let recs = a.recommended_activations();
        assert_eq!(*recs[0].sector(), Sector::NE);
        assert_eq!(*recs[0].priority(), 0);
        assert_eq!(recs[0].action(), "keep clutter free");

        // puja in NW
        assert_eq!(*recs[1].sector(), Sector::NW);
        assert_eq!(*recs[1].priority(), 1);

        let weak = recs.iter().filter(|r| *r.priority() >= 2).map(|r| *r.priority()).collect::<Vec<_>>();
        assert_eq!(weak, vec![2, 3, 4, 5]);
    }

    #[test]
    fn test_priorities_are_sorted_and_stable() {
        let mut req = sample();
        req.rooms = Some(vec![room("kitchen", "NE"), room("temple", "S")]);
        let a = analyze(&req);

        let priorities = a.recommended_activations().iter().map(|r| *r.priority()).collect::<Vec<_>>();
        assert!(priorities.windows(2).all(|w| w[0] <= w[1]));

        // both priority 1 rules keep sector order: NE before S
        let ones = a.recommended_activations().iter().filter(|r| *r.priority() == 1).collect::<Vec<_>>();
        assert_eq!(ones.len(), 2);
        assert_eq!(*ones[0].sector(), Sector::NE);
        assert_eq!(*ones[1].sector(), Sector::S);
    }

    #[test]
    fn test_empty_request() {
        let a = analyze(&VastuRequest::default());
        assert_eq!(a.weak_sectors().len(), 8);
        assert_eq!(a.recommended_activations().len(), 8);
        assert!(a.entrance().is_none());
    }

    #[test]
    fn test_aliases_and_unknown_sectors() {
        let req: VastuRequest = serde_json::from_value(serde_json::json!({
            "facing": "east",
            "entrance": "south-west",
            "plot_type": "Apartment",
            "rooms": [
                {"name": "study", "direction": "E"},
                {"name": "balcony", "sector": "up"}
            ]
        }))
        .unwrap();

        let a = analyze(&req);
        assert_eq!(*a.plot_facing(), Some(Sector::E));
        assert_eq!(*a.entrance(), Some(Sector::SW));
        assert_eq!(a.plot_type(), "apartment");
        assert_eq!(a.sectors().values().map(|s| *s.occupancy_count()).sum::<usize>(), 1);
        assert!(!a.weak_sectors().contains(&Sector::SW));
        assert!(!a.weak_sectors().contains(&Sector::E));
    }

    #[test]
    fn test_long_field_names_win() {
        let req: VastuRequest = serde_json::from_value(serde_json::json!({
            "plot_facing": "North",
            "facing": "South",
            "main_entrance": "NE",
            "entrance": "SW"
        }))
        .unwrap();

        let a = analyze(&req);
        assert_eq!(*a.plot_facing(), Some(Sector::N));
        assert_eq!(*a.entrance(), Some(Sector::NE));

        // an empty long name falls back to the short one
        let req: VastuRequest = serde_json::from_value(serde_json::json!({
            "main_entrance": "",
            "entrance": "SW"
        }))
        .unwrap();
        assert_eq!(*analyze(&req).entrance(), Some(Sector::SW));
    }

    #[test]
    fn test_rooms_are_returned_unchanged() {
        let req: VastuRequest = serde_json::from_value(serde_json::json!({
            "rooms": [{"name": "kitchen", "sector": "SE", "area_sqft": 120, "floor": {"level": 1}}]
        }))
        .unwrap();

        let json = serde_json::to_value(analyze(&req)).unwrap();
        assert_eq!(
            json["sectors"]["SE"]["rooms"][0],
            serde_json::json!({"name": "kitchen", "sector": "SE", "area_sqft": 120, "floor": {"level": 1}})
        );
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(analyze(&sample())).unwrap();
        assert_eq!(json["entrance"], "NE");
        assert_eq!(json["sectors"]["SE"]["element"], "fire");
        assert_eq!(json["sectors"]["SE"]["rooms"][0]["name"], "kitchen");
        assert_eq!(json["weak_sectors"][0], "N");
    }
}
