use serde::{Deserialize, Serialize};

use crate::bridges::BridgeTile;
use crate::grid::ZoneKind;

/// Categorical pollution flavor carried alongside the scalar pollution field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PollutionKind {
    Smoke,
    Chemical,
    Waste,
}

/// Which coverage field a service building feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceClass {
    Police,
    Fire,
    Health,
    Education,
    Power,
    Water,
}

/// Static per-kind stat record. Lookups for kinds without an entry yield the
/// zeroed default rather than failing.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildingStats {
    pub max_population: u32,
    pub max_jobs: u32,
    pub pollution: f32,
    pub pollution_kind: Option<PollutionKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BuildingKind {
    // Structural
    #[default]
    Grass,
    Filler,
    Water,
    Road,
    Rail,
    Bridge,
    Tree,
    // Residential
    SmallHouse,
    House,
    Cottage,
    Bungalow,
    Townhouse,
    Duplex,
    ApartmentBlock,
    ApartmentTower,
    CondoTower,
    // Commercial
    CornerShop,
    Bakery,
    Cafe,
    Grocery,
    Boutique,
    Diner,
    Pharmacy,
    Market,
    Mall,
    Hotel,
    OfficeBlock,
    OfficeTower,
    // Industrial
    Farm,
    Orchard,
    Workshop,
    SmallFactory,
    Warehouse,
    Factory,
    Foundry,
    ChemicalPlant,
    Refinery,
    // Services
    PoliceStation,
    PoliceHq,
    FireStation,
    FireHq,
    Clinic,
    Hospital,
    School,
    HighSchool,
    University,
    Library,
    CoalPlant,
    GasPlant,
    SolarFarm,
    WindTurbine,
    NuclearPlant,
    WaterTower,
    PumpingStation,
    // Civic and landmarks
    SmallPark,
    LargePark,
    Playground,
    Stadium,
    Museum,
    CityHall,
    TrainStation,
    SubwayStation,
    AmusementPark,
    Airport,
}

impl BuildingKind {
    pub fn name(self) -> &'static str {
        match self {
            BuildingKind::Grass => "Grass",
            BuildingKind::Filler => "Filler",
            BuildingKind::Water => "Water",
            BuildingKind::Road => "Road",
            BuildingKind::Rail => "Rail",
            BuildingKind::Bridge => "Bridge",
            BuildingKind::Tree => "Tree",
            BuildingKind::SmallHouse => "Small House",
            BuildingKind::House => "House",
            BuildingKind::Cottage => "Cottage",
            BuildingKind::Bungalow => "Bungalow",
            BuildingKind::Townhouse => "Townhouse",
            BuildingKind::Duplex => "Duplex",
            BuildingKind::ApartmentBlock => "Apartment Block",
            BuildingKind::ApartmentTower => "Apartment Tower",
            BuildingKind::CondoTower => "Condo Tower",
            BuildingKind::CornerShop => "Corner Shop",
            BuildingKind::Bakery => "Bakery",
            BuildingKind::Cafe => "Cafe",
            BuildingKind::Grocery => "Grocery",
            BuildingKind::Boutique => "Boutique",
            BuildingKind::Diner => "Diner",
            BuildingKind::Pharmacy => "Pharmacy",
            BuildingKind::Market => "Market",
            BuildingKind::Mall => "Mall",
            BuildingKind::Hotel => "Hotel",
            BuildingKind::OfficeBlock => "Office Block",
            BuildingKind::OfficeTower => "Office Tower",
            BuildingKind::Farm => "Farm",
            BuildingKind::Orchard => "Orchard",
            BuildingKind::Workshop => "Workshop",
            BuildingKind::SmallFactory => "Small Factory",
            BuildingKind::Warehouse => "Warehouse",
            BuildingKind::Factory => "Factory",
            BuildingKind::Foundry => "Foundry",
            BuildingKind::ChemicalPlant => "Chemical Plant",
            BuildingKind::Refinery => "Refinery",
            BuildingKind::PoliceStation => "Police Station",
            BuildingKind::PoliceHq => "Police HQ",
            BuildingKind::FireStation => "Fire Station",
            BuildingKind::FireHq => "Fire HQ",
            BuildingKind::Clinic => "Clinic",
            BuildingKind::Hospital => "Hospital",
            BuildingKind::School => "School",
            BuildingKind::HighSchool => "High School",
            BuildingKind::University => "University",
            BuildingKind::Library => "Library",
            BuildingKind::CoalPlant => "Coal Plant",
            BuildingKind::GasPlant => "Gas Plant",
            BuildingKind::SolarFarm => "Solar Farm",
            BuildingKind::WindTurbine => "Wind Turbine",
            BuildingKind::NuclearPlant => "Nuclear Plant",
            BuildingKind::WaterTower => "Water Tower",
            BuildingKind::PumpingStation => "Pumping Station",
            BuildingKind::SmallPark => "Small Park",
            BuildingKind::LargePark => "Large Park",
            BuildingKind::Playground => "Playground",
            BuildingKind::Stadium => "Stadium",
            BuildingKind::Museum => "Museum",
            BuildingKind::CityHall => "City Hall",
            BuildingKind::TrainStation => "Train Station",
            BuildingKind::SubwayStation => "Subway Station",
            BuildingKind::AmusementPark => "Amusement Park",
            BuildingKind::Airport => "Airport",
        }
    }

    /// Returns (width, height) footprint in tiles.
    pub fn footprint(self) -> (usize, usize) {
        match self {
            BuildingKind::ApartmentBlock
            | BuildingKind::ApartmentTower
            | BuildingKind::Market
            | BuildingKind::Mall
            | BuildingKind::Hotel
            | BuildingKind::OfficeBlock
            | BuildingKind::Warehouse
            | BuildingKind::Factory
            | BuildingKind::Foundry
            | BuildingKind::ChemicalPlant
            | BuildingKind::PoliceHq
            | BuildingKind::FireHq
            | BuildingKind::Hospital
            | BuildingKind::HighSchool
            | BuildingKind::CoalPlant
            | BuildingKind::GasPlant
            | BuildingKind::SolarFarm
            | BuildingKind::PumpingStation
            | BuildingKind::LargePark
            | BuildingKind::Museum
            | BuildingKind::CityHall
            | BuildingKind::TrainStation => (2, 2),
            BuildingKind::CondoTower
            | BuildingKind::OfficeTower
            | BuildingKind::Refinery
            | BuildingKind::University
            | BuildingKind::NuclearPlant
            | BuildingKind::Stadium
            | BuildingKind::AmusementPark => (3, 3),
            BuildingKind::Airport => (4, 4),
            _ => (1, 1),
        }
    }

    pub fn footprint_area(self) -> usize {
        let (w, h) = self.footprint();
        w * h
    }

    pub fn is_structural(self) -> bool {
        matches!(
            self,
            BuildingKind::Grass
                | BuildingKind::Filler
                | BuildingKind::Water
                | BuildingKind::Road
                | BuildingKind::Rail
                | BuildingKind::Bridge
                | BuildingKind::Tree
        )
    }

    /// Anything a fire can take hold of. The structural kinds never burn.
    pub fn is_flammable(self) -> bool {
        !self.is_structural()
    }

    /// Zone-driven growth kinds, as opposed to placed services and landmarks.
    pub fn is_developable(self) -> bool {
        self.native_zone().is_some()
    }

    /// The zone a developable kind grows in.
    pub fn native_zone(self) -> Option<ZoneKind> {
        match self {
            BuildingKind::SmallHouse
            | BuildingKind::House
            | BuildingKind::Cottage
            | BuildingKind::Bungalow
            | BuildingKind::Townhouse
            | BuildingKind::Duplex
            | BuildingKind::ApartmentBlock
            | BuildingKind::ApartmentTower
            | BuildingKind::CondoTower => Some(ZoneKind::Residential),
            BuildingKind::CornerShop
            | BuildingKind::Bakery
            | BuildingKind::Cafe
            | BuildingKind::Grocery
            | BuildingKind::Boutique
            | BuildingKind::Diner
            | BuildingKind::Pharmacy
            | BuildingKind::Market
            | BuildingKind::Mall
            | BuildingKind::Hotel
            | BuildingKind::OfficeBlock
            | BuildingKind::OfficeTower => Some(ZoneKind::Commercial),
            BuildingKind::Farm
            | BuildingKind::Orchard
            | BuildingKind::Workshop
            | BuildingKind::SmallFactory
            | BuildingKind::Warehouse
            | BuildingKind::Factory
            | BuildingKind::Foundry
            | BuildingKind::ChemicalPlant
            | BuildingKind::Refinery => Some(ZoneKind::Industrial),
            _ => None,
        }
    }

    /// Kinds permitted to construct and occupy without full utility service.
    pub fn is_starter(self) -> bool {
        matches!(
            self,
            BuildingKind::SmallHouse
                | BuildingKind::Cottage
                | BuildingKind::CornerShop
                | BuildingKind::Bakery
                | BuildingKind::Farm
                | BuildingKind::Orchard
                | BuildingKind::Workshop
        )
    }

    /// Small kinds eligible for footprint consolidation during growth.
    pub fn is_mergeable(self) -> bool {
        matches!(
            self,
            BuildingKind::SmallHouse
                | BuildingKind::House
                | BuildingKind::Cottage
                | BuildingKind::Bungalow
                | BuildingKind::CornerShop
                | BuildingKind::Bakery
                | BuildingKind::Cafe
                | BuildingKind::Grocery
                | BuildingKind::Workshop
                | BuildingKind::SmallFactory
        )
    }

    pub fn service_class(self) -> Option<ServiceClass> {
        match self {
            BuildingKind::PoliceStation | BuildingKind::PoliceHq => Some(ServiceClass::Police),
            BuildingKind::FireStation | BuildingKind::FireHq => Some(ServiceClass::Fire),
            BuildingKind::Clinic | BuildingKind::Hospital => Some(ServiceClass::Health),
            BuildingKind::School
            | BuildingKind::HighSchool
            | BuildingKind::University
            | BuildingKind::Library => Some(ServiceClass::Education),
            BuildingKind::CoalPlant
            | BuildingKind::GasPlant
            | BuildingKind::SolarFarm
            | BuildingKind::WindTurbine
            | BuildingKind::NuclearPlant => Some(ServiceClass::Power),
            BuildingKind::WaterTower | BuildingKind::PumpingStation => Some(ServiceClass::Water),
            _ => None,
        }
    }

    /// Utility plants construct without being served themselves.
    pub fn is_utility_plant(self) -> bool {
        matches!(
            self.service_class(),
            Some(ServiceClass::Power) | Some(ServiceClass::Water)
        )
    }

    pub fn is_park(self) -> bool {
        matches!(
            self,
            BuildingKind::SmallPark | BuildingKind::LargePark | BuildingKind::Playground
        )
    }

    /// Base coverage radius in tiles at level 1.
    pub fn base_range(self) -> u32 {
        match self {
            BuildingKind::PoliceStation => 10,
            BuildingKind::PoliceHq => 16,
            BuildingKind::FireStation => 10,
            BuildingKind::FireHq => 16,
            BuildingKind::Clinic => 8,
            BuildingKind::Hospital => 14,
            BuildingKind::School => 8,
            BuildingKind::HighSchool => 10,
            BuildingKind::University => 14,
            BuildingKind::Library => 6,
            BuildingKind::CoalPlant => 18,
            BuildingKind::GasPlant => 16,
            BuildingKind::SolarFarm => 12,
            BuildingKind::WindTurbine => 8,
            BuildingKind::NuclearPlant => 30,
            BuildingKind::WaterTower => 12,
            BuildingKind::PumpingStation => 18,
            _ => 0,
        }
    }

    pub fn stats(self) -> BuildingStats {
        let (max_population, max_jobs, pollution, pollution_kind) = match self {
            BuildingKind::SmallHouse => (6, 0, 0.0, None),
            BuildingKind::House => (10, 0, 0.0, None),
            BuildingKind::Cottage => (8, 0, 0.0, None),
            BuildingKind::Bungalow => (12, 0, 0.0, None),
            BuildingKind::Townhouse => (16, 0, 0.0, None),
            BuildingKind::Duplex => (20, 0, 0.0, None),
            BuildingKind::ApartmentBlock => (60, 0, 0.1, None),
            BuildingKind::ApartmentTower => (120, 0, 0.2, None),
            BuildingKind::CondoTower => (240, 0, 0.2, None),
            BuildingKind::CornerShop => (0, 4, 0.1, None),
            BuildingKind::Bakery => (0, 5, 0.2, Some(PollutionKind::Smoke)),
            BuildingKind::Cafe => (0, 6, 0.1, None),
            BuildingKind::Grocery => (0, 8, 0.1, None),
            BuildingKind::Boutique => (0, 8, 0.1, None),
            BuildingKind::Diner => (0, 10, 0.2, None),
            BuildingKind::Pharmacy => (0, 12, 0.1, None),
            BuildingKind::Market => (0, 24, 0.3, Some(PollutionKind::Waste)),
            BuildingKind::Mall => (0, 60, 0.4, Some(PollutionKind::Waste)),
            BuildingKind::Hotel => (0, 50, 0.3, None),
            BuildingKind::OfficeBlock => (0, 80, 0.2, None),
            BuildingKind::OfficeTower => (0, 200, 0.3, None),
            BuildingKind::Farm => (0, 6, 0.5, Some(PollutionKind::Waste)),
            BuildingKind::Orchard => (0, 5, 0.0, None),
            BuildingKind::Workshop => (0, 10, 1.0, Some(PollutionKind::Smoke)),
            BuildingKind::SmallFactory => (0, 16, 1.5, Some(PollutionKind::Smoke)),
            BuildingKind::Warehouse => (0, 24, 0.8, Some(PollutionKind::Waste)),
            BuildingKind::Factory => (0, 40, 2.5, Some(PollutionKind::Smoke)),
            BuildingKind::Foundry => (0, 50, 3.0, Some(PollutionKind::Smoke)),
            BuildingKind::ChemicalPlant => (0, 60, 3.5, Some(PollutionKind::Chemical)),
            BuildingKind::Refinery => (0, 90, 4.0, Some(PollutionKind::Chemical)),
            BuildingKind::PoliceStation => (0, 10, 0.0, None),
            BuildingKind::PoliceHq => (0, 30, 0.0, None),
            BuildingKind::FireStation => (0, 10, 0.0, None),
            BuildingKind::FireHq => (0, 30, 0.0, None),
            BuildingKind::Clinic => (0, 8, 0.0, None),
            BuildingKind::Hospital => (0, 40, 0.2, Some(PollutionKind::Waste)),
            BuildingKind::School => (0, 12, 0.0, None),
            BuildingKind::HighSchool => (0, 25, 0.0, None),
            BuildingKind::University => (0, 80, 0.0, None),
            BuildingKind::Library => (0, 5, 0.0, None),
            BuildingKind::CoalPlant => (0, 25, 5.0, Some(PollutionKind::Smoke)),
            BuildingKind::GasPlant => (0, 20, 2.5, Some(PollutionKind::Smoke)),
            BuildingKind::SolarFarm => (0, 6, 0.0, None),
            BuildingKind::WindTurbine => (0, 2, 0.0, None),
            BuildingKind::NuclearPlant => (0, 60, 0.5, Some(PollutionKind::Chemical)),
            BuildingKind::WaterTower => (0, 3, 0.0, None),
            BuildingKind::PumpingStation => (0, 12, 0.0, None),
            BuildingKind::SmallPark => (0, 1, -0.5, None),
            BuildingKind::LargePark => (0, 3, -1.0, None),
            BuildingKind::Playground => (0, 1, -0.2, None),
            BuildingKind::Stadium => (0, 80, 0.8, Some(PollutionKind::Waste)),
            BuildingKind::Museum => (0, 30, 0.0, None),
            BuildingKind::CityHall => (0, 50, 0.0, None),
            BuildingKind::TrainStation => (0, 40, 0.6, Some(PollutionKind::Smoke)),
            BuildingKind::SubwayStation => (0, 15, 0.0, None),
            BuildingKind::AmusementPark => (0, 60, 0.5, Some(PollutionKind::Waste)),
            BuildingKind::Airport => (0, 200, 2.0, Some(PollutionKind::Smoke)),
            BuildingKind::Tree => (0, 0, -0.3, None),
            _ => (0, 0, 0.0, None),
        };
        BuildingStats {
            max_population,
            max_jobs,
            pollution,
            pollution_kind,
        }
    }

    /// Placement cost from the tool catalog. Developable kinds grow on their
    /// own and carry no placement cost.
    pub fn build_cost(self) -> f64 {
        match self {
            BuildingKind::Road => 10.0,
            BuildingKind::Rail => 25.0,
            BuildingKind::Tree => 5.0,
            BuildingKind::PoliceStation => 500.0,
            BuildingKind::PoliceHq => 1500.0,
            BuildingKind::FireStation => 500.0,
            BuildingKind::FireHq => 1500.0,
            BuildingKind::Clinic => 300.0,
            BuildingKind::Hospital => 1000.0,
            BuildingKind::School => 400.0,
            BuildingKind::HighSchool => 800.0,
            BuildingKind::University => 2000.0,
            BuildingKind::Library => 350.0,
            BuildingKind::CoalPlant => 800.0,
            BuildingKind::GasPlant => 900.0,
            BuildingKind::SolarFarm => 1200.0,
            BuildingKind::WindTurbine => 400.0,
            BuildingKind::NuclearPlant => 5000.0,
            BuildingKind::WaterTower => 400.0,
            BuildingKind::PumpingStation => 900.0,
            BuildingKind::SmallPark => 100.0,
            BuildingKind::LargePark => 300.0,
            BuildingKind::Playground => 150.0,
            BuildingKind::Stadium => 3000.0,
            BuildingKind::Museum => 2500.0,
            BuildingKind::CityHall => 4000.0,
            BuildingKind::TrainStation => 1500.0,
            BuildingKind::SubwayStation => 1000.0,
            BuildingKind::AmusementPark => 3500.0,
            BuildingKind::Airport => 10000.0,
            _ => 0.0,
        }
    }
}

/// The consolidation target for small buildings merging in the given zone.
pub fn merge_target(zone: ZoneKind) -> Option<BuildingKind> {
    match zone {
        ZoneKind::Residential => Some(BuildingKind::ApartmentBlock),
        ZoneKind::Commercial => Some(BuildingKind::Mall),
        ZoneKind::Industrial => Some(BuildingKind::Factory),
        ZoneKind::None => None,
    }
}

/// Kinds a vacant zoned tile may spawn. All are 1x1; larger footprints only
/// appear through consolidation.
pub fn spawn_candidates(zone: ZoneKind) -> &'static [BuildingKind] {
    match zone {
        ZoneKind::Residential => &[
            BuildingKind::SmallHouse,
            BuildingKind::House,
            BuildingKind::Cottage,
            BuildingKind::Bungalow,
        ],
        ZoneKind::Commercial => &[
            BuildingKind::CornerShop,
            BuildingKind::Bakery,
            BuildingKind::Cafe,
            BuildingKind::Grocery,
        ],
        ZoneKind::Industrial => &[
            BuildingKind::Farm,
            BuildingKind::Workshop,
            BuildingKind::SmallFactory,
        ],
        ZoneKind::None => &[],
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub kind: BuildingKind,
    pub level: u8,
    pub population: u32,
    pub jobs: u32,
    pub powered: bool,
    pub watered: bool,
    pub on_fire: bool,
    pub fire_progress: f32,
    pub age: f32,
    pub construction_progress: f32,
    pub abandoned: bool,
    /// Present only on `BuildingKind::Bridge` tiles.
    pub bridge: Option<BridgeTile>,
    /// Present only on `BuildingKind::Filler` tiles: offset back to the
    /// anchor tile, `anchor = (x - dx, y - dy)`.
    pub filler_anchor: Option<(i8, i8)>,
}

impl Default for Building {
    fn default() -> Self {
        Self::structural(BuildingKind::Grass)
    }
}

impl Building {
    pub fn structural(kind: BuildingKind) -> Self {
        Self {
            kind,
            level: 0,
            population: 0,
            jobs: 0,
            powered: false,
            watered: false,
            on_fire: false,
            fire_progress: 0.0,
            age: 0.0,
            construction_progress: 100.0,
            abandoned: false,
            bridge: None,
            filler_anchor: None,
        }
    }

    pub fn filler(dx: i8, dy: i8) -> Self {
        Self {
            filler_anchor: Some((dx, dy)),
            ..Self::structural(BuildingKind::Filler)
        }
    }

    pub fn bridge(tile: BridgeTile) -> Self {
        Self {
            bridge: Some(tile),
            ..Self::structural(BuildingKind::Bridge)
        }
    }

    pub fn under_construction(kind: BuildingKind) -> Self {
        Self {
            kind,
            level: 1,
            construction_progress: 0.0,
            ..Self::structural(kind)
        }
    }

    pub fn is_complete(&self) -> bool {
        self.construction_progress >= 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_kinds_never_flammable() {
        for kind in [
            BuildingKind::Grass,
            BuildingKind::Water,
            BuildingKind::Road,
            BuildingKind::Rail,
            BuildingKind::Bridge,
            BuildingKind::Tree,
            BuildingKind::Filler,
        ] {
            assert!(!kind.is_flammable(), "{:?} must not burn", kind);
        }
        assert!(BuildingKind::SmallHouse.is_flammable());
        assert!(BuildingKind::CoalPlant.is_flammable());
    }

    #[test]
    fn test_missing_stats_default_to_zero() {
        let stats = BuildingKind::Road.stats();
        assert_eq!(stats.max_population, 0);
        assert_eq!(stats.max_jobs, 0);
        assert_eq!(stats.pollution, 0.0);
    }

    #[test]
    fn test_spawn_candidates_are_single_tile() {
        for zone in [
            ZoneKind::Residential,
            ZoneKind::Commercial,
            ZoneKind::Industrial,
        ] {
            for kind in spawn_candidates(zone) {
                assert_eq!(kind.footprint(), (1, 1));
                assert_eq!(kind.native_zone(), Some(zone));
            }
        }
        assert!(spawn_candidates(ZoneKind::None).is_empty());
    }

    #[test]
    fn test_merge_targets_outgrow_sources() {
        for zone in [
            ZoneKind::Residential,
            ZoneKind::Commercial,
            ZoneKind::Industrial,
        ] {
            let target = merge_target(zone).unwrap();
            assert!(target.footprint_area() > 1);
            assert_eq!(target.native_zone(), Some(zone));
        }
    }

    #[test]
    fn test_footprints_stay_within_bound() {
        for kind in [
            BuildingKind::House,
            BuildingKind::Mall,
            BuildingKind::Refinery,
            BuildingKind::NuclearPlant,
            BuildingKind::Stadium,
            BuildingKind::Airport,
        ] {
            let (w, h) = kind.footprint();
            assert!(w <= crate::config::MAX_FOOTPRINT);
            assert!(h <= crate::config::MAX_FOOTPRINT);
        }
    }

    #[test]
    fn test_service_classification() {
        assert_eq!(
            BuildingKind::NuclearPlant.service_class(),
            Some(ServiceClass::Power)
        );
        assert_eq!(
            BuildingKind::WaterTower.service_class(),
            Some(ServiceClass::Water)
        );
        assert!(BuildingKind::NuclearPlant.is_utility_plant());
        assert!(!BuildingKind::PoliceStation.is_utility_plant());
        assert!(BuildingKind::PoliceStation.base_range() > 0);
        assert_eq!(BuildingKind::House.base_range(), 0);
    }
}
