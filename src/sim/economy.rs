//! Station services: fuel, crystal sales and the rescue tug
//!
//! Every transaction is all-or-nothing. Running short of money is an ordinary
//! outcome reported as `false`, never an error.

use glam::Vec2;

use super::state::{GameEvent, GameState, Material};
use crate::consts::*;

/// What to sell from the crystal bin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sale {
    Only(Material),
    All,
}

impl GameState {
    /// Price of filling the tank, `None` without a ship
    pub fn fuel_cost(&self) -> Option<u32> {
        self.ship()
            .map(|ship| (ship.missing_fuel() * FUEL_COST_PER_UNIT).floor() as u32)
    }

    /// Fill the tank if the player can pay for all of it
    pub fn buy_fuel(&mut self) -> bool {
        let Some(cost) = self.fuel_cost() else {
            return false;
        };
        if cost > self.money {
            log::debug!("Fuel costs ${}, have ${}", cost, self.money);
            return false;
        }
        let Some(ship) = self
            .universe
            .ship_body_mut()
            .and_then(|body| body.ship_state_mut())
        else {
            return false;
        };
        ship.refill();
        self.money -= cost;
        self.rescue_needed = false;
        self.events.push(GameEvent::FuelPurchased { cost });
        true
    }

    /// Sell crystals from the bin; returns the money earned
    pub fn sell_crystals(&mut self, sale: Sale) -> u32 {
        let earned = match sale {
            Sale::Only(material) => self.bin.sell_material(material),
            Sale::All => self.bin.sell_all(),
        };
        if earned > 0 {
            self.money += earned;
            self.events.push(GameEvent::CrystalsSold { earned });
            log::info!("Sold crystals for ${}", earned);
        }
        earned
    }

    pub fn can_afford_rescue(&self) -> bool {
        self.money >= RESCUE_COST
    }

    /// Tow the ship to the station and give it enough fuel to dock
    pub fn request_rescue(&mut self) -> bool {
        if !self.can_afford_rescue() {
            return false;
        }
        let Some(station) = self.universe.station().and_then(|key| self.universe.get(key)) else {
            return false;
        };
        let parking = station.position - Vec2::new(RESCUE_PARKING_OFFSET, 0.0);
        let Some(ship_key) = self.universe.ship() else {
            return false;
        };
        let Some(body) = self.universe.get_mut(ship_key) else {
            return false;
        };

        body.position = parking;
        body.heading = Vec2::ZERO;
        if let Some(ship) = body.ship_state_mut() {
            ship.fuel = RESCUE_FUEL;
            ship.thrusting = false;
            ship.low_fuel_warning = RESCUE_FUEL < SHIP_MAX_FUEL * LOW_FUEL_FRACTION;
        }

        self.money -= RESCUE_COST;
        self.rescue_needed = false;
        self.camera.set_target(Some(ship_key));
        self.events.push(GameEvent::Rescued);
        log::info!("Ship rescued to {:?}", parking);
        true
    }

    /// Open the shop; only possible while docked
    pub fn open_shop(&mut self) -> bool {
        if !self.near_station {
            return false;
        }
        if !self.shop_open {
            self.shop_open = true;
            self.events.push(GameEvent::Docked);
        }
        true
    }

    pub fn close_shop(&mut self) {
        self.shop_open = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Settings;

    fn playing() -> GameState {
        let mut state = GameState::new(Settings::default());
        state.start_game();
        state
    }

    fn set_fuel(state: &mut GameState, fuel: f32) {
        state
            .universe
            .ship_body_mut()
            .and_then(|b| b.ship_state_mut())
            .unwrap()
            .fuel = fuel;
    }

    #[test]
    fn test_buy_fuel_charges_missing_units() {
        let mut state = playing();
        set_fuel(&mut state, 60.5);
        assert_eq!(state.fuel_cost(), Some(118));
        assert!(state.buy_fuel());
        assert_eq!(state.money, 1000 - 118);
        assert_eq!(state.ship().unwrap().fuel, SHIP_MAX_FUEL);
        assert!(state.events.contains(&GameEvent::FuelPurchased { cost: 118 }));
    }

    #[test]
    fn test_refuel_clears_rescue_request() {
        let mut state = playing();
        set_fuel(&mut state, 0.0);
        state.rescue_needed = true;
        assert!(state.buy_fuel());
        assert!(!state.rescue_needed);
    }

    #[test]
    fn test_buy_fuel_unaffordable_changes_nothing() {
        let mut state = playing();
        set_fuel(&mut state, 0.0);
        state.money = 299;
        assert!(!state.buy_fuel());
        assert_eq!(state.money, 299);
        assert_eq!(state.ship().unwrap().fuel, 0.0);
    }

    #[test]
    fn test_buy_fuel_without_ship() {
        let mut state = GameState::new(Settings::default());
        assert_eq!(state.fuel_cost(), None);
        assert!(!state.buy_fuel());
    }

    #[test]
    fn test_sell_crystals() {
        let mut state = playing();
        state.bin.add_particle(Material::Gold, 2);
        state.bin.add_particle(Material::Coal, 3);
        assert_eq!(state.sell_crystals(Sale::Only(Material::Gold)), 20);
        assert_eq!(state.money, 1020);
        assert_eq!(state.sell_crystals(Sale::All), 3);
        assert_eq!(state.money, 1023);
        assert_eq!(state.sell_crystals(Sale::All), 0);
    }

    #[test]
    fn test_rescue_tows_ship_to_station() {
        let mut state = playing();
        set_fuel(&mut state, 0.0);
        state.rescue_needed = true;
        if let Some(ship) = state.universe.ship_body_mut() {
            ship.heading = Vec2::new(3.0, 1.0);
        }

        assert!(state.request_rescue());
        let station = state.universe.get(state.universe.station().unwrap()).unwrap().position;
        let ship = state.universe.ship_body().unwrap();
        assert_eq!(ship.position, station - Vec2::new(100.0, 0.0));
        assert_eq!(ship.heading, Vec2::ZERO);
        assert_eq!(state.ship().unwrap().fuel, RESCUE_FUEL);
        assert_eq!(state.money, 900);
        assert!(!state.rescue_needed);
    }

    #[test]
    fn test_rescue_unaffordable() {
        let mut state = playing();
        state.money = 99;
        assert!(!state.can_afford_rescue());
        assert!(!state.request_rescue());
        assert_eq!(state.money, 99);
    }

    #[test]
    fn test_shop_needs_docking() {
        let mut state = playing();
        assert!(!state.open_shop());
        state.near_station = true;
        assert!(state.open_shop());
        assert!(state.shop_open);
        state.close_shop();
        assert!(!state.shop_open);
    }
}
