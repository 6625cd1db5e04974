use crate::types::{Cell, LatLng};
use serde::{Deserialize, Serialize};

/// The classroom the original map was centred on.
pub const OAKES_CLASSROOM: LatLng = LatLng::new(36.98949379578401, -122.06277128548504);

const CELL_EPSILON: f64 = 1e-6;

/// Tunable gameplay parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Position of cell (0, 0) and of the player after a reset.
    pub origin: LatLng,
    /// Edge length of one grid cell, in degrees.
    pub tile_degrees: f64,
    /// Cells scanned on each side of the player, half-open: `[-n, n)`.
    pub neighborhood_size: i32,
    pub cache_spawn_probability: f64,
    /// When true, a depleted cache re-rolls its spawn check on every
    /// refresh and may refill with fresh coins. When false, depletion is final.
    pub allow_cache_regrowth: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            origin:                  OAKES_CLASSROOM,
            tile_degrees:            1e-4,
            neighborhood_size:       8,
            cache_spawn_probability: 0.1,
            allow_cache_regrowth:    false,
        }
    }
}

impl GameConfig {
    /// Load from a JSON file. Missing fields take their defaults.
    /// In tests, use GameConfig::default_test().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: GameConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.tile_degrees.is_finite() && self.tile_degrees > 0.0,
            "tile_degrees must be positive, got {}",
            self.tile_degrees
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.cache_spawn_probability),
            "cache_spawn_probability must be in [0, 1], got {}",
            self.cache_spawn_probability
        );
        anyhow::ensure!(
            self.neighborhood_size >= 0,
            "neighborhood_size must not be negative, got {}",
            self.neighborhood_size
        );
        Ok(())
    }

    /// Small neighbourhood around a round-number origin, for unit tests.
    pub fn default_test() -> Self {
        Self {
            origin:            LatLng::new(0.0, 0.0),
            neighborhood_size: 2,
            ..Self::default()
        }
    }

    /// The cell containing `position`.
    /// Positions reached by stepping sit exactly on cell corners, so a
    /// small epsilon absorbs accumulated float error before flooring.
    pub fn cell_of(&self, position: LatLng) -> Cell {
        let scale = |delta: f64| (delta / self.tile_degrees + CELL_EPSILON).floor() as i32;
        Cell::new(
            scale(position.lat - self.origin.lat),
            scale(position.lng - self.origin.lng),
        )
    }

    /// Whether `position` lands on a cell whose whole neighbourhood has
    /// representable coordinates.
    pub fn is_addressable(&self, position: LatLng) -> bool {
        let n = f64::from(self.neighborhood_size);
        let bounds = (f64::from(i32::MIN) + n)..=(f64::from(i32::MAX) - n);
        [position.lat - self.origin.lat, position.lng - self.origin.lng]
            .into_iter()
            .map(|delta| (delta / self.tile_degrees + CELL_EPSILON).floor())
            .all(|index| index.is_finite() && bounds.contains(&index))
    }

    /// Every cell within `neighborhood_size` of `center`, row-major.
    pub fn neighborhood(&self, center: Cell) -> impl Iterator<Item = Cell> + '_ {
        let n = self.neighborhood_size;
        (-n..n).flat_map(move |di| (-n..n).map(move |dj| center.offset(di, dj)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_original_game() {
        let config = GameConfig::default();
        assert_eq!(config.tile_degrees, 1e-4);
        assert_eq!(config.neighborhood_size, 8);
        assert_eq!(config.cache_spawn_probability, 0.1);
        assert!(!config.allow_cache_regrowth);
        assert_eq!(config.neighborhood(Cell::new(0, 0)).count(), 256);
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let config: GameConfig =
            serde_json::from_str(r#"{ "allow_cache_regrowth": true }"#).unwrap();
        assert!(config.allow_cache_regrowth);
        assert_eq!(config.neighborhood_size, 8);
    }

    #[test]
    fn cell_of_floors_toward_negative_infinity() {
        let config = GameConfig::default_test();
        assert_eq!(config.cell_of(LatLng::new(0.00015, 0.00005)), Cell::new(1, 0));
        assert_eq!(config.cell_of(LatLng::new(-0.00005, -0.00015)), Cell::new(-1, -2));
    }

    #[test]
    fn stepping_lands_in_the_expected_cell() {
        let config = GameConfig::default();
        let mut lat = config.origin.lat;
        for step in 1..=50 {
            lat += config.tile_degrees;
            let cell = config.cell_of(LatLng::new(lat, config.origin.lng));
            assert_eq!(cell, Cell::new(step, 0), "drifted after {step} steps");
        }
    }

    #[test]
    fn far_off_positions_are_not_addressable() {
        let config = GameConfig::default_test();
        assert!(config.is_addressable(LatLng::new(45.0, -120.0)));
        assert!(!config.is_addressable(LatLng::new(1e300, 0.0)));
        assert!(!config.is_addressable(LatLng::new(0.0, f64::NAN)));
        assert!(!config.is_addressable(LatLng::new(f64::NEG_INFINITY, 0.0)));
    }

    #[test]
    fn neighborhood_saturates_at_the_grid_edge() {
        let config = GameConfig::default_test();
        let edge = Cell::new(i32::MAX, i32::MIN);
        assert!(config.neighborhood(edge).all(|c| c.i >= i32::MAX - 2 && c.j <= i32::MIN + 1));
    }

    #[test]
    fn invalid_probability_is_rejected() {
        let config = GameConfig { cache_spawn_probability: 1.5, ..GameConfig::default() };
        assert!(config.validate().is_err());
    }
}
