//! Action resolution and job bonuses.
//!
//! Every action is resolved against a clone of the incoming state. A
//! rejection discards the clone, so the caller's state is returned exactly
//! as it came in.
use log::{debug, info, warn};

use crate::actions::{Action, BuyItem, CampStyle, ChargeMethod, PetVerb};
use crate::camp::{CampProfile, RangerVisit, epic_scene_payout_cents};
use crate::constants::{
    ADOPT_MORALE, BATTERY_MODULE_RANGE_MILES, CAMP_EPIC_MORALE, CAMP_EPIC_SCENE_CHANCE,
    CONFIDENCE_MORALE_FLOOR_PENALTY, CONFIDENCE_PER_LEVEL, COOK_BUTANE_CANS, COOK_COLD_MORALE,
    COOK_ENERGY, COOK_INVERTER_MORALE, COOK_PROPANE_LB, COOK_STOVE_MORALE, COOK_WATER_GAL,
    DRIVE_ALTERNATOR_PCT_PER_HOUR, DRIVE_ENERGY_PER_HOUR, DRIVE_MPH, DRIVE_WATER_GAL_PER_HOUR,
    EAT_ENERGY, EAT_HEALTH, EPIC_BONUS_CENTS, EPIC_MORALE, EV_STATION_CHARGE_PCT,
    EV_STATION_COST_CENTS, EV_STATION_MINUTES, FRIDGE_MEAL_COMFORT, GATHER_PARTS_YIELD,
    GUIDE_BASE_CENTS, GUIDE_HIKE_MIN_LEVEL, HEATER_DIESEL_GAL_PER_HOUR, HIKE_BASE_ENERGY,
    HIKE_DISCOVERY_BASE, HIKE_DISCOVERY_MORALE, HIKE_MINUTES, HIKE_WATER_GAL, HIKE_XP,
    INVERTER_COOK_AMPS, MEAL_MINUTES, NAP_ENERGY, NAP_MINUTES, PERFORM_BASE_CENTS,
    PERFORM_CONFIDENCE_FREE_MORALE, PET_CARE_MINUTES, PET_NAP_ENERGY, PET_PLAY_MINUTES,
    PET_WATER_GAL, PHOTO_BASE_CENTS, PHOTO_CREATIVITY, QUEST_ACTION_ENERGY, QUEST_ACTION_MINUTES,
    QUEST_ACTION_XP, READ_COMFORT, READ_CREATIVITY, READ_MINUTES, REFUEL_MINUTES,
    REFUEL_PRICE_CENTS_PER_GAL, REPAIR_ENERGY, REPAIR_MINUTES, REPAIR_SHOP_COST_CENTS, REPAIR_XP,
    SHOP_MINUTES, SOLAR_CHARGE_PCT_PER_KW, SOLAR_PANEL_WATTS, STORAGE_MEAL_STEP,
    STORAGE_WATER_STEP_GAL, TRAIL_MIN_HEALTH, TRICKLE_CHARGE_MINUTES, WATCH_ENERGY,
    WATCH_MINUTES, WATCH_MORALE, WIND_CHARGE_PCT_PER_300W, WIND_TURBINE_WATTS, WORK_ENERGY_PER_HOUR,
    WORK_MAX_HOURS, WORK_MIN_ENERGY, WORK_XP_PER_HOUR,
};
use crate::content::{ContentProvider, NoContent, WatchContext};
use crate::environment::EnvironmentSnapshot;
use crate::error::Rejection;
use crate::inventory::Device;
use crate::jobs::{Job, QuestVerb};
use crate::numbers::{ceil_f32_to_u32, ceil_f64_to_i64, i64_to_f64, scale_cents, u32_to_f32};
use crate::outcome::ActionOutcome;
use crate::pet::Pet;
use crate::quests::QuestStep;
use crate::resources::{Consumable, gallons_for};
use crate::rng::Stream;
use crate::state::{GamePhase, GameState, Rest};
use crate::stats::{Stat, diff};
use crate::store::{calculate_effective_price, quote_cents};
use crate::vehicle::{Breakdown, Drivetrain, roll_breakdown};

/// Energy a hike costs this job.
#[must_use]
pub fn hike_energy_cost(job: &Job) -> f32 {
    HIKE_BASE_ENERGY * job.perks.hike_energy_mult
}

/// Resolve `action` with no WATCH content.
#[must_use]
pub fn resolve(
    state: &GameState,
    action: Action,
    env: &EnvironmentSnapshot,
) -> (GameState, ActionOutcome) {
    resolve_with(state, action, env, &mut NoContent)
}

/// Resolve `action` against `env`, drawing WATCH payloads from `content`.
///
/// Returns the successor state and the outcome record. When the action is
/// rejected the returned state equals `state`.
pub fn resolve_with(
    state: &GameState,
    action: Action,
    env: &EnvironmentSnapshot,
    content: &mut dyn ContentProvider,
) -> (GameState, ActionOutcome) {
    let verb = action.verb();
    if state.is_over() {
        return (
            state.clone(),
            ActionOutcome::rejected(verb, Rejection::GameOver),
        );
    }

    let mut turn = Turn {
        state: state.clone(),
        env,
        outcome: ActionOutcome::new(verb),
    };
    match turn.apply(action, content) {
        Ok(()) => turn.finish(state),
        Err(rejection) => {
            debug!("{action} rejected: {rejection}");
            (state.clone(), ActionOutcome::rejected(verb, rejection))
        }
    }
}

struct Turn<'a> {
    state: GameState,
    env: &'a EnvironmentSnapshot,
    outcome: ActionOutcome,
}

impl Turn<'_> {
    fn apply(&mut self, action: Action, content: &mut dyn ContentProvider) -> Result<(), Rejection> {
        match action {
            Action::Hike => self.hike(),
            Action::Work { hours } => self.work(hours),
            Action::Nap => {
                self.pass(NAP_MINUTES, Rest::Asleep);
                self.adjust(Stat::Energy, NAP_ENERGY);
                if let Some(pet) = self.state.pet.as_mut() {
                    pet.adjust_energy(PET_NAP_ENERGY);
                }
                Ok(())
            }
            Action::Cook => self.cook(),
            Action::Eat => self.eat(),
            Action::Pet { verb } => self.pet(verb),
            Action::Refuel { gallons } => self.refuel(gallons),
            Action::Read => {
                self.pass(READ_MINUTES, Rest::Awake);
                self.adjust(Stat::Creativity, READ_CREATIVITY);
                self.adjust(Stat::Comfort, READ_COMFORT);
                Ok(())
            }
            Action::Watch => self.watch(content),
            Action::TakePhoto => self.take_photo(),
            Action::Perform => self.perform(),
            Action::GuideHike => self.guide_hike(),
            Action::GatherParts => self.gather_parts(),
            Action::Drive { miles } => self.drive(miles),
            Action::Camp { style } => self.camp(style),
            Action::Buy { item, qty } => self.buy(item, qty),
            Action::Charge { method } => self.charge(method),
            Action::Toggle { device, on } => self.toggle(device, on),
            Action::Repair => self.repair(),
            Action::AdoptPet => self.adopt_pet(),
        }
    }

    // Shared helpers ---------------------------------------------------------

    fn adjust(&mut self, stat: Stat, delta: f32) {
        self.state.stats.adjust(stat, delta);
    }

    fn spend(&mut self, stat: Stat, cost: f32) -> Result<(), Rejection> {
        let available = self.state.stats.get(stat);
        if available < cost {
            return Err(Rejection::stat_floor(stat, cost, available));
        }
        self.adjust(stat, -cost);
        if stat == Stat::Energy {
            self.outcome.energy_cost += cost;
        }
        Ok(())
    }

    fn require_health(&self, needed: f32) -> Result<(), Rejection> {
        let available = self.state.stats.health;
        if available < needed {
            return Err(Rejection::stat_floor(Stat::Health, needed, available));
        }
        Ok(())
    }

    fn require_daylight(&self, what: &str) -> Result<(), Rejection> {
        if self.state.clock.is_daylight() {
            Ok(())
        } else {
            Err(Rejection::location(format!("too dark to {what}")))
        }
    }

    fn consume(&mut self, kind: Consumable, amount: f32) -> Result<(), Rejection> {
        self.state.inventory.supplies.consume(kind, amount).map(drop)
    }

    fn pass(&mut self, minutes: u32, rest: Rest) {
        let report = self.state.pass_time(minutes, self.env, rest);
        self.outcome.minutes += minutes;
        self.outcome
            .power_transitions
            .extend(report.transitions.iter().copied());
        if report.heater_ran_dry {
            self.outcome.note("heater.out-of-diesel");
        }
        if report.thirsty {
            self.outcome.note("passive.thirst");
        }
        if report.hungry {
            self.outcome.note("passive.hunger");
        }
    }

    /// Credit income scaled by the quest multiplier; returns what was paid.
    fn earn(&mut self, cents: i64) -> i64 {
        let paid = scale_cents(cents, self.state.progress.income_multiplier());
        self.state.cash_cents = self.state.cash_cents.saturating_add(paid);
        paid
    }

    fn pay(&mut self, cents: i64) -> Result<(), Rejection> {
        if self.state.cash_cents < cents {
            return Err(Rejection::InsufficientFunds {
                needed_cents: cents,
                available_cents: self.state.cash_cents,
            });
        }
        self.state.cash_cents -= cents;
        Ok(())
    }

    fn gain_xp(&mut self, xp: u32) {
        self.outcome.levels_gained += self.state.progress.gain_xp(xp);
    }

    fn qualify(&mut self, verb: QuestVerb) {
        if self.state.job.quest.verb != verb {
            return;
        }
        match self.state.progress.record_qualifying() {
            QuestStep::Advanced { count, .. } => self.outcome.quest_count = Some(count),
            QuestStep::Granted(item) => {
                self.outcome.quest_count = Some(self.state.job.quest.threshold);
                self.outcome.quest_grant = Some(item);
                self.state.inventory.quest_items.insert(item);
                info!(
                    "{} quest complete, granted {}",
                    self.state.job.kind,
                    item.key()
                );
            }
            QuestStep::Ignored => {}
        }
    }

    /// Epic moment on the job's signature verb.
    fn roll_epic(&mut self, verb: QuestVerb) {
        if self.state.job.signature_verb() != Some(verb) {
            return;
        }
        let chance = self.state.job.perks.epic_bonus;
        if self.state.rng.roll(Stream::Epic) < chance {
            self.outcome.epic = true;
            self.earn(EPIC_BONUS_CENTS);
            self.adjust(Stat::Morale, EPIC_MORALE);
            self.outcome.note("job.epic");
        }
    }

    fn pet_mut(&mut self) -> Result<&mut Pet, Rejection> {
        self.state
            .pet
            .as_mut()
            .ok_or_else(|| Rejection::invalid("you don't have a pet"))
    }

    // Verbs ------------------------------------------------------------------

    fn hike(&mut self) -> Result<(), Rejection> {
        self.require_daylight("hike")?;
        self.require_health(TRAIL_MIN_HEALTH)?;
        self.spend(Stat::Energy, hike_energy_cost(&self.state.job))?;
        self.consume(Consumable::Water, HIKE_WATER_GAL)?;
        self.pass(HIKE_MINUTES, Rest::Awake);
        let chance = HIKE_DISCOVERY_BASE + self.state.job.perks.hike_find_bonus;
        if self.state.rng.roll(Stream::Discovery) < chance {
            self.outcome.discovery = true;
            self.adjust(Stat::Morale, HIKE_DISCOVERY_MORALE);
            self.outcome.note("hike.discovery");
        }
        self.gain_xp(HIKE_XP);
        Ok(())
    }

    fn work(&mut self, hours: u32) -> Result<(), Rejection> {
        if !(1..=WORK_MAX_HOURS).contains(&hours) {
            return Err(Rejection::invalid(format!(
                "WORK takes 1-{WORK_MAX_HOURS} hours"
            )));
        }
        if self.state.vehicle.is_broken_down() {
            return Err(Rejection::invalid("the rig is broken down; REPAIR first"));
        }
        let cost = WORK_ENERGY_PER_HOUR * u32_to_f32(hours);
        let available = self.state.stats.energy;
        let needed = cost.max(WORK_MIN_ENERGY);
        if available < needed {
            return Err(Rejection::InsufficientEnergy { needed, available });
        }
        self.spend(Stat::Energy, cost)?;

        let mut income = self
            .state
            .job
            .work_rate_cents
            .saturating_mul(i64::from(hours));
        // Remote bonus needs the location's own signal.
        if self.env.has_signal {
            income = income.saturating_add(self.state.job.perks.remote_income_cents);
        }
        self.earn(income);
        self.pass(hours * 60, Rest::Awake);
        self.gain_xp(WORK_XP_PER_HOUR * hours);
        if self.env.has_signal {
            self.qualify(QuestVerb::RemoteWork);
        }
        Ok(())
    }

    fn cook(&mut self) -> Result<(), Rejection> {
        self.consume(Consumable::Meals, 1.0)?;
        self.consume(Consumable::Water, COOK_WATER_GAL)?;
        let inventory = &self.state.inventory;
        let stove = inventory.devices.owns(Device::Stove)
            && inventory.supplies.has(Consumable::Propane, COOK_PROPANE_LB);
        let jetboil = inventory.devices.owns(Device::Jetboil)
            && inventory.supplies.has(Consumable::Butane, COOK_BUTANE_CANS);
        let (morale, key) = if stove {
            self.consume(Consumable::Propane, COOK_PROPANE_LB)?;
            (COOK_STOVE_MORALE, "cook.stove")
        } else if jetboil {
            self.consume(Consumable::Butane, COOK_BUTANE_CANS)?;
            (COOK_STOVE_MORALE, "cook.jetboil")
        } else if self
            .state
            .power
            .draw_house_ah(INVERTER_COOK_AMPS * u32_to_f32(MEAL_MINUTES) / 60.0)
        {
            (COOK_INVERTER_MORALE, "cook.inverter")
        } else {
            (COOK_COLD_MORALE, "cook.cold")
        };
        self.outcome.note(key);
        self.adjust(Stat::Morale, morale);
        self.adjust(Stat::Energy, COOK_ENERGY);
        self.state.last_meal_minute = self.state.clock.minutes;
        self.pass(MEAL_MINUTES, Rest::Awake);
        Ok(())
    }

    fn eat(&mut self) -> Result<(), Rejection> {
        self.consume(Consumable::Meals, 1.0)?;
        self.adjust(Stat::Energy, EAT_ENERGY);
        self.adjust(Stat::Health, EAT_HEALTH);
        if self.state.is_running(Device::Fridge) {
            self.adjust(Stat::Comfort, FRIDGE_MEAL_COMFORT);
        }
        self.state.last_meal_minute = self.state.clock.minutes;
        self.pass(MEAL_MINUTES, Rest::Awake);
        Ok(())
    }

    fn pet(&mut self, verb: PetVerb) -> Result<(), Rejection> {
        self.pet_mut()?;
        match verb {
            PetVerb::Feed => {
                self.consume(Consumable::Meals, 1.0)?;
                self.pet_mut()?.adjust_bond(6.0);
                self.pass(PET_CARE_MINUTES, Rest::Awake);
            }
            PetVerb::Water => {
                self.consume(Consumable::Water, PET_WATER_GAL)?;
                self.pet_mut()?.adjust_bond(3.0);
                self.pass(PET_CARE_MINUTES, Rest::Awake);
            }
            PetVerb::Walk => {
                let pet = self.pet_mut()?;
                pet.adjust_energy(5.0);
                pet.adjust_bond(4.0);
                self.adjust(Stat::Energy, 2.0);
                self.pass(PET_PLAY_MINUTES, Rest::Awake);
            }
            PetVerb::Play => {
                self.pet_mut()?.adjust_bond(5.0);
                self.adjust(Stat::Morale, 4.0);
                self.pass(PET_PLAY_MINUTES, Rest::Awake);
            }
            PetVerb::Guard | PetVerb::Calm => {
                self.pet_mut()?.set_guard(verb == PetVerb::Guard);
            }
        }
        Ok(())
    }

    fn refuel(&mut self, gallons: f32) -> Result<(), Rejection> {
        if self.state.vehicle.drivetrain != Drivetrain::Fuel {
            return Err(Rejection::invalid("electric mode; use CHARGE"));
        }
        if !self.env.facilities.fuel {
            return Err(Rejection::location("no fuel station here"));
        }
        self.state
            .inventory
            .supplies
            .refill(Consumable::Fuel, gallons)?;
        let price = ceil_f64_to_i64(f64::from(gallons) * i64_to_f64(REFUEL_PRICE_CENTS_PER_GAL));
        self.pay(price)?;
        self.pass(REFUEL_MINUTES, Rest::Awake);
        Ok(())
    }

    fn watch(&mut self, content: &mut dyn ContentProvider) -> Result<(), Rejection> {
        if !self.state.has_signal(self.env) {
            return Err(Rejection::location("no signal to stream"));
        }
        let ctx = WatchContext {
            location_id: &self.env.location_id,
            day: self.state.clock.day(),
            morale: self.state.stats.morale,
        };
        let flavor = content.watch(&ctx);
        let bonus = flavor.as_ref().map_or(0.0, |payload| payload.morale_bonus);
        self.outcome.flavor = flavor;
        self.adjust(Stat::Morale, WATCH_MORALE + bonus);
        self.adjust(Stat::Energy, -WATCH_ENERGY);
        self.pass(WATCH_MINUTES, Rest::Awake);
        Ok(())
    }

    fn take_photo(&mut self) -> Result<(), Rejection> {
        self.spend(Stat::Energy, QUEST_ACTION_ENERGY)?;
        self.pass(QUEST_ACTION_MINUTES, Rest::Awake);
        self.earn(PHOTO_BASE_CENTS);
        self.adjust(Stat::Creativity, PHOTO_CREATIVITY);
        self.roll_epic(QuestVerb::TakePhoto);
        self.gain_xp(QUEST_ACTION_XP);
        self.qualify(QuestVerb::TakePhoto);
        Ok(())
    }

    fn perform(&mut self) -> Result<(), Rejection> {
        if !self.env.facilities.town {
            return Err(Rejection::location("no audience out here"));
        }
        self.spend(Stat::Energy, QUEST_ACTION_ENERGY)?;
        self.pass(QUEST_ACTION_MINUTES, Rest::Awake);
        self.earn(PERFORM_BASE_CENTS);
        self.adjust(Stat::Morale, PERFORM_CONFIDENCE_FREE_MORALE);
        self.roll_epic(QuestVerb::Perform);
        self.gain_xp(QUEST_ACTION_XP);
        self.qualify(QuestVerb::Perform);
        Ok(())
    }

    fn guide_hike(&mut self) -> Result<(), Rejection> {
        self.require_daylight("guide a hike")?;
        if !self.env.facilities.trailhead {
            return Err(Rejection::location("no trailhead here"));
        }
        if self.state.progress.level < GUIDE_HIKE_MIN_LEVEL {
            return Err(Rejection::invalid(format!(
                "guiding needs level {GUIDE_HIKE_MIN_LEVEL}"
            )));
        }
        self.require_health(TRAIL_MIN_HEALTH)?;
        self.spend(Stat::Energy, hike_energy_cost(&self.state.job))?;
        self.consume(Consumable::Water, HIKE_WATER_GAL)?;
        self.pass(HIKE_MINUTES, Rest::Awake);
        self.earn(GUIDE_BASE_CENTS);
        self.roll_epic(QuestVerb::GuideHike);
        self.gain_xp(QUEST_ACTION_XP);
        self.qualify(QuestVerb::GuideHike);
        Ok(())
    }

    fn gather_parts(&mut self) -> Result<(), Rejection> {
        self.spend(Stat::Energy, QUEST_ACTION_ENERGY)?;
        self.pass(QUEST_ACTION_MINUTES, Rest::Awake);
        if self
            .state
            .inventory
            .supplies
            .top_up(Consumable::Parts, GATHER_PARTS_YIELD)
            <= 0.0
        {
            self.outcome.note("parts.bin-full");
        }
        self.roll_epic(QuestVerb::GatherParts);
        self.gain_xp(QUEST_ACTION_XP);
        self.qualify(QuestVerb::GatherParts);
        Ok(())
    }

    fn drive(&mut self, miles: f32) -> Result<(), Rejection> {
        if !miles.is_finite() || miles <= 0.0 {
            return Err(Rejection::invalid("DRIVE <miles>"));
        }
        if self.state.vehicle.is_broken_down() {
            return Err(Rejection::invalid("the rig is broken down; REPAIR first"));
        }
        let hours = miles / DRIVE_MPH;
        self.spend(Stat::Energy, DRIVE_ENERGY_PER_HOUR * hours)?;
        match self.state.vehicle.drivetrain {
            Drivetrain::Fuel => {
                let gallons = gallons_for(miles, self.state.vehicle.spec.mpg);
                let from_cans = self.state.inventory.supplies.consume_with_reserve(
                    Consumable::Fuel,
                    Consumable::ExtraFuel,
                    gallons,
                )?;
                if from_cans > 0.0 {
                    self.outcome.note("drive.jerry-can");
                }
            }
            Drivetrain::Electric => {
                self.state.power.draw_ev_for(miles)?;
            }
        }

        let now = self.state.clock.minutes;
        let (_, transition) = self
            .state
            .power
            .charge_house_pct(DRIVE_ALTERNATOR_PCT_PER_HOUR * hours, now);
        if let Some(transition) = transition {
            self.outcome.power_transitions.push(transition);
        }
        self.state
            .inventory
            .supplies
            .drain(Consumable::Water, DRIVE_WATER_GAL_PER_HOUR * hours);
        self.pass(ceil_f32_to_u32(miles * 60.0 / DRIVE_MPH), Rest::Awake);
        self.state.vehicle.odometer_miles += miles;

        let mut rng = self.state.rng.next(Stream::Travel);
        if let Some(part) = roll_breakdown(miles, &mut rng) {
            self.state.vehicle.breakdown = Some(Breakdown {
                part,
                day_started: self.state.clock.day(),
            });
            self.outcome.note(part.key());
        }
        Ok(())
    }

    fn camp(&mut self, style: CampStyle) -> Result<(), Rejection> {
        let minutes = self.state.clock.minutes_until_dawn();
        if minutes == 0 {
            return Err(Rejection::invalid("it's already dawn"));
        }
        let prior_nights =
            if self.state.camp.last_location.as_deref() == Some(self.env.location_id.as_str()) {
                self.state.camp.nights_here
            } else {
                0
            };
        let profile = CampProfile::for_style(
            style,
            &self.state.vehicle.spec,
            self.state.inventory.devices.owns(Device::Tent),
            self.env,
            self.state.pet.as_ref(),
            prior_nights,
        );
        if profile.cost_cents > 0 {
            self.pay(profile.cost_cents)?;
        }
        self.state.camp.record_night(&self.env.location_id);

        if self.state.inventory.supplies.drain(Consumable::Meals, 1.0) <= 0.0 {
            self.state.last_meal_minute = self.state.clock.minutes;
        } else {
            self.outcome.note("camp.no-dinner");
        }
        self.pass(minutes, Rest::Asleep);
        self.adjust(Stat::Energy, profile.energy);
        self.adjust(Stat::Morale, profile.morale);
        if let Some(pet) = self.state.pet.as_mut() {
            pet.adjust_energy(profile.pet_energy);
            pet.adjust_bond(profile.pet_bond);
        }

        if style == CampStyle::Dispersed {
            let perks = self.state.job.perks.clone();
            if self.env.has_signal && perks.remote_income_cents > 0 {
                self.earn(perks.remote_income_cents);
                self.outcome.note("camp.remote-income");
            }
            self.adjust(Stat::Morale, perks.morale_bonus_dispersed);
            if self.state.rng.roll(Stream::Camp) < CAMP_EPIC_SCENE_CHANCE {
                let mut rng = self.state.rng.next(Stream::Camp);
                self.earn(epic_scene_payout_cents(&mut rng, perks.epic_bonus));
                self.adjust(Stat::Morale, CAMP_EPIC_MORALE);
                self.outcome.epic = true;
                self.outcome.note("camp.epic-scene");
            }
        }

        if self.state.rng.roll(Stream::Camp) < profile.ranger_chance {
            let visit = RangerVisit::for_style(style);
            self.outcome.note(visit.key());
            if let RangerVisit::Fine { cents, morale } = visit {
                let collected = cents.min(self.state.cash_cents.max(0));
                self.state.cash_cents -= collected;
                if collected < cents {
                    debug!("ranger fine short by {}c", cents - collected);
                    self.outcome.note("camp.ranger.fine-unpaid");
                }
                self.adjust(Stat::Morale, -morale);
            }
        }
        Ok(())
    }

    fn buy(&mut self, item: BuyItem, qty: u32) -> Result<(), Rejection> {
        if !self.env.facilities.store {
            return Err(Rejection::location("no store here"));
        }
        if qty == 0 {
            return Err(Rejection::invalid("quantity must be a positive number"));
        }
        let price = quote_cents(item, qty, self.state.job.perks.shop_discount);
        match item {
            BuyItem::Supply(Consumable::Fuel) => {
                return Err(Rejection::invalid("fill the tank with REFUEL"));
            }
            BuyItem::Supply(kind) => {
                self.state
                    .inventory
                    .supplies
                    .refill(kind, u32_to_f32(qty))?;
            }
            BuyItem::Device(device) => {
                if qty != 1 {
                    return Err(Rejection::invalid(format!("one {device} is plenty")));
                }
                self.state.inventory.devices.install(device)?;
                self.state
                    .vehicle
                    .reserve_storage(device.storage_slots())?;
            }
            BuyItem::Solar => {
                self.state
                    .power
                    .install_solar(SOLAR_PANEL_WATTS.saturating_mul(qty))?;
            }
            BuyItem::Wind => {
                self.state
                    .power
                    .install_wind(WIND_TURBINE_WATTS.saturating_mul(qty))?;
            }
            BuyItem::Battery => {
                self.state
                    .power
                    .extend_ev_range(BATTERY_MODULE_RANGE_MILES * u32_to_f32(qty))?;
            }
            BuyItem::Storage => self.expand_storage(qty)?,
        }
        self.pay(price)?;
        self.pass(SHOP_MINUTES, Rest::Awake);
        Ok(())
    }

    fn expand_storage(&mut self, qty: u32) -> Result<(), Rejection> {
        let spec = &self.state.vehicle.spec;
        let (max_water, max_meals) = (spec.max_water_gal, spec.max_meals);
        let supplies = &mut self.state.inventory.supplies;
        let water = supplies.capacity(Consumable::Water);
        let meals = supplies.capacity(Consumable::Meals);
        let steps = u32_to_f32(qty);
        let new_water = (water + STORAGE_WATER_STEP_GAL * steps).min(max_water);
        let new_meals = (meals + STORAGE_MEAL_STEP * steps).min(max_meals);
        if new_water <= water && new_meals <= meals {
            return Err(Rejection::invalid("storage is fully expanded"));
        }
        supplies.set_capacity(Consumable::Water, new_water);
        supplies.set_capacity(Consumable::Meals, new_meals);
        Ok(())
    }

    fn charge(&mut self, method: ChargeMethod) -> Result<(), Rejection> {
        if self.state.vehicle.drivetrain != Drivetrain::Electric {
            return Err(Rejection::invalid("charging needs electric mode"));
        }
        match method {
            ChargeMethod::Station => {
                if !self.env.facilities.charger {
                    return Err(Rejection::location("no charger here"));
                }
                if self.state.power.ev_pct >= 100.0 {
                    return Err(Rejection::invalid("the pack is already full"));
                }
                self.pay(EV_STATION_COST_CENTS)?;
                self.state.power.charge_ev(EV_STATION_CHARGE_PCT);
                self.pass(EV_STATION_MINUTES, Rest::Awake);
            }
            ChargeMethod::Solar => {
                let installed = self.state.power.solar.installed_watts;
                if installed == 0 {
                    return Err(Rejection::invalid("no solar installed"));
                }
                self.require_daylight("charge from solar")?;
                let gain = u32_to_f32(installed) / 1000.0
                    * SOLAR_CHARGE_PCT_PER_KW
                    * self.env.solar_site.factor()
                    * self.env.weather.solar_multiplier();
                self.state.power.charge_ev(gain);
                self.pass(TRICKLE_CHARGE_MINUTES, Rest::Awake);
            }
            ChargeMethod::Wind => {
                let installed = self.state.power.wind.installed_watts;
                if installed == 0 {
                    return Err(Rejection::invalid("no wind turbine installed"));
                }
                let gain = u32_to_f32(installed) / 300.0
                    * WIND_CHARGE_PCT_PER_300W
                    * self.env.weather.wind.turbine_fraction();
                self.state.power.charge_ev(gain);
                self.pass(TRICKLE_CHARGE_MINUTES, Rest::Awake);
            }
        }
        Ok(())
    }

    fn toggle(&mut self, device: Device, on: bool) -> Result<(), Rejection> {
        if device == Device::Heater && on {
            let available = self.state.supplies().quantity(Consumable::Diesel);
            if available <= 0.0 {
                return Err(Rejection::InsufficientResource {
                    kind: Consumable::Diesel,
                    needed: HEATER_DIESEL_GAL_PER_HOUR,
                    available,
                });
            }
        }
        self.state.inventory.devices.set_switch(device, on)?;
        if on && !self.state.power.is_online() {
            self.outcome.note("power.offline");
        }
        Ok(())
    }

    fn repair(&mut self) -> Result<(), Rejection> {
        if !self.state.vehicle.is_broken_down() {
            return Err(Rejection::invalid("nothing needs fixing"));
        }
        self.spend(Stat::Energy, REPAIR_ENERGY)?;
        if self.state.supplies().has(Consumable::Parts, 1.0) {
            self.consume(Consumable::Parts, 1.0)?;
            self.outcome.note("repair.spare");
        } else if self.env.facilities.town {
            let discount = f64::from(self.state.job.perks.shop_discount) * 100.0;
            self.pay(calculate_effective_price(REPAIR_SHOP_COST_CENTS, discount))?;
            self.outcome.note("repair.shop");
        } else {
            return Err(Rejection::location(
                "no spare parts and no mechanic in sight",
            ));
        }
        self.state.vehicle.breakdown = None;
        self.pass(REPAIR_MINUTES, Rest::Awake);
        self.gain_xp(REPAIR_XP);
        Ok(())
    }

    fn adopt_pet(&mut self) -> Result<(), Rejection> {
        if !self.env.facilities.pet_adoption {
            return Err(Rejection::location("no shelter here"));
        }
        if self.state.pet.is_some() {
            return Err(Rejection::invalid("one pet per rig"));
        }
        let mut rng = self.state.rng.next(Stream::Pet);
        let pet = Pet::adopt(&mut rng);
        self.outcome.note("pet.adopted");
        self.state.pet = Some(pet);
        self.adjust(Stat::Morale, ADOPT_MORALE);
        self.pass(PET_CARE_MINUTES, Rest::Awake);
        Ok(())
    }

    /// Apply end-of-action rules exactly once and fill in the outcome diff.
    fn finish(mut self, before: &GameState) -> (GameState, ActionOutcome) {
        let levels = self.outcome.levels_gained;
        if levels > 0 {
            self.adjust(Stat::Confidence, CONFIDENCE_PER_LEVEL * u32_to_f32(levels));
        }
        if self.state.stats.is_at_floor(Stat::Morale) {
            self.adjust(Stat::Confidence, -CONFIDENCE_MORALE_FLOOR_PENALTY);
        }
        if self.state.stats.is_at_floor(Stat::Health) {
            self.state.phase = GamePhase::GameOver;
            self.outcome.game_over = true;
            warn!(
                "{} collapsed on {}; game over",
                self.state.player_name, self.state.clock
            );
        }
        self.outcome.rest_suggested = self.state.stats.is_at_floor(Stat::Morale)
            || self.state.stats.is_at_floor(Stat::Energy);

        self.outcome.stat_deltas = diff(&before.stats, &self.state.stats).into_iter().collect();
        self.outcome.resource_deltas = before
            .supplies()
            .diff(self.state.supplies())
            .into_iter()
            .collect();
        self.outcome.cash_delta_cents = self.state.cash_cents - before.cash_cents;
        self.state.actions_taken = self.state.actions_taken.saturating_add(1);
        debug!(
            "{} resolved at {}: {} min, cash {:+}c",
            self.outcome.verb,
            self.state.clock,
            self.outcome.minutes,
            self.outcome.cash_delta_cents
        );
        (self.state, self.outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::XP_PER_LEVEL;
    use crate::environment::Facilities;
    use crate::jobs::JobKind;
    use crate::state::NewGame;
    use crate::vehicle::VehicleKind;

    fn game(job: JobKind) -> GameState {
        GameState::new(&NewGame {
            job,
            seed: 42,
            ..NewGame::default()
        })
        .unwrap()
    }

    fn shop() -> EnvironmentSnapshot {
        EnvironmentSnapshot::town("flagstaff")
    }

    #[test]
    fn hike_costs_scale_with_job() {
        let env = EnvironmentSnapshot::backcountry("swell");
        let (_, guide) = resolve(&game(JobKind::TrailGuide), Action::Hike, &env);
        let (_, dev) = resolve(&game(JobKind::RemoteDev), Action::Hike, &env);
        assert!((guide.energy_cost - 8.0).abs() < 1e-5);
        assert!((dev.energy_cost - 10.0).abs() < 1e-5);
        assert_eq!(guide.minutes, HIKE_MINUTES);
    }

    #[test]
    fn rejection_leaves_state_untouched() {
        let mut state = game(JobKind::Mechanic);
        state.stats.energy = 5.0;
        let env = EnvironmentSnapshot::backcountry("swell");
        let (next, outcome) = resolve(&state, Action::Hike, &env);
        assert_eq!(next, state);
        assert!(matches!(
            outcome.rejection,
            Some(Rejection::InsufficientEnergy { .. })
        ));
    }

    #[test]
    fn levelling_up_builds_confidence() {
        let mut state = game(JobKind::Artist);
        state.progress.xp = XP_PER_LEVEL - 1;
        let env = EnvironmentSnapshot::backcountry("swell");
        let (next, outcome) = resolve(&state, Action::Hike, &env);
        assert!(!outcome.is_rejected(), "{:?}", outcome.rejection);
        assert_eq!(outcome.levels_gained, 1);
        assert_eq!(next.progress.level, 2);
        assert!((outcome.stat_change(Stat::Confidence) - CONFIDENCE_PER_LEVEL).abs() < 1e-5);
    }

    #[test]
    fn ending_an_action_at_zero_morale_costs_confidence() {
        let mut state = game(JobKind::Artist);
        state.stats.morale = 0.0;
        let (next, outcome) = resolve(&state, Action::Read, &EnvironmentSnapshot::new("moab"));
        assert!(!outcome.is_rejected());
        assert_eq!(outcome.levels_gained, 0);
        assert!(
            (next.stats.confidence - (state.stats.confidence - CONFIDENCE_MORALE_FLOOR_PENALTY))
                .abs()
                < 1e-5
        );
        assert!(outcome.rest_suggested);
    }

    #[test]
    fn rejected_actions_leave_confidence_alone() {
        let mut state = game(JobKind::Artist);
        state.stats.morale = 0.0;
        state.stats.energy = 5.0;
        state.progress.xp = XP_PER_LEVEL - 1;
        let env = EnvironmentSnapshot::backcountry("swell");
        let (next, outcome) = resolve(&state, Action::Hike, &env);
        assert!(outcome.is_rejected());
        assert!((next.stats.confidence - state.stats.confidence).abs() < f32::EPSILON);
        assert!(outcome.stat_change(Stat::Confidence).abs() < f32::EPSILON);
    }

    #[test]
    fn ranger_fine_larger_than_the_wallet_is_flagged() {
        let mut state = game(JobKind::Artist);
        state.clock.minutes = 22 * 60;
        state.cash_cents = 1_000;
        state.camp.last_location = Some("lot".to_string());
        state.camp.nights_here = 60;
        let env = EnvironmentSnapshot::new("lot");
        let (next, outcome) = resolve(
            &state,
            Action::Camp {
                style: CampStyle::Stealth,
            },
            &env,
        );
        assert!(!outcome.is_rejected(), "{:?}", outcome.rejection);
        assert!(outcome.events.iter().any(|e| e == "camp.ranger.fine"));
        assert!(outcome.events.iter().any(|e| e == "camp.ranger.fine-unpaid"));
        assert_eq!(next.cash_cents, 0);
        assert_eq!(outcome.cash_delta_cents, -1_000);
    }

    #[test]
    fn hiking_after_dark_is_restricted() {
        let mut state = game(JobKind::Artist);
        state.clock.minutes = 22 * 60;
        let (_, outcome) = resolve(&state, Action::Hike, &EnvironmentSnapshot::new("moab"));
        assert!(matches!(
            outcome.rejection,
            Some(Rejection::LocationRestricted { .. })
        ));
    }

    #[test]
    fn cooking_prefers_the_propane_stove() {
        let mut state = game(JobKind::Artist);
        state.inventory.devices.install(Device::Stove).unwrap();
        state
            .inventory
            .supplies
            .refill(Consumable::Propane, 1.0)
            .unwrap();
        let (next, outcome) = resolve(&state, Action::Cook, &EnvironmentSnapshot::new("moab"));
        assert!(!outcome.is_rejected());
        assert!(outcome.events.iter().any(|e| e == "cook.stove"));
        assert!((outcome.resource_change(Consumable::Propane) + COOK_PROPANE_LB).abs() < 1e-5);
        assert!((outcome.resource_change(Consumable::Meals) + 1.0).abs() < 1e-5);
        assert!(next.stats.morale > state.stats.morale);
    }

    #[test]
    fn cooking_without_a_stove_uses_the_inverter() {
        let state = game(JobKind::Artist);
        let (next, outcome) = resolve(&state, Action::Cook, &EnvironmentSnapshot::new("moab"));
        assert!(outcome.events.iter().any(|e| e == "cook.inverter"));
        assert!(next.power.house_charge_ah < state.power.house_charge_ah);
    }

    #[test]
    fn refuel_needs_a_pump_and_tank_room() {
        let state = game(JobKind::Mechanic);
        let (_, outcome) = resolve(
            &state,
            Action::Refuel { gallons: 5.0 },
            &EnvironmentSnapshot::backcountry("swell"),
        );
        assert!(matches!(
            outcome.rejection,
            Some(Rejection::LocationRestricted { .. })
        ));

        let (next, outcome) = resolve(&state, Action::Refuel { gallons: 5.0 }, &shop());
        assert_eq!(outcome.cash_delta_cents, -2_000);
        assert!((next.supplies().quantity(Consumable::Fuel) - 19.4).abs() < 0.01);

        let (_, outcome) = resolve(&state, Action::Refuel { gallons: 20.0 }, &shop());
        assert!(matches!(
            outcome.rejection,
            Some(Rejection::OverCapacity { .. })
        ));
    }

    #[test]
    fn mechanic_discount_applies_to_solar() {
        let (_, mechanic) = resolve(
            &game(JobKind::Mechanic),
            Action::Buy {
                item: BuyItem::Solar,
                qty: 1,
            },
            &shop(),
        );
        let (_, artist) = resolve(
            &game(JobKind::Artist),
            Action::Buy {
                item: BuyItem::Solar,
                qty: 1,
            },
            &shop(),
        );
        assert_eq!(mechanic.cash_delta_cents, -34_000);
        assert_eq!(artist.cash_delta_cents, -40_000);
    }

    #[test]
    fn storage_upgrade_stops_at_vehicle_max() {
        let mut state = game(JobKind::Artist);
        state.cash_cents = 1_000_000;
        let buy = Action::Buy {
            item: BuyItem::Storage,
            qty: 10,
        };
        let (state, outcome) = resolve(&state, buy, &shop());
        assert!(!outcome.is_rejected());
        assert!((state.supplies().capacity(Consumable::Water) - 24.0).abs() < 1e-5);
        assert!((state.supplies().capacity(Consumable::Meals) - 20.0).abs() < 1e-5);
        let (_, outcome) = resolve(&state, buy, &shop());
        assert!(matches!(
            outcome.rejection,
            Some(Rejection::InvalidAction { .. })
        ));
    }

    #[test]
    fn guide_hike_needs_level_two() {
        let state = game(JobKind::TrailGuide);
        let env = EnvironmentSnapshot::backcountry("swell");
        let (_, outcome) = resolve(&state, Action::GuideHike, &env);
        assert!(matches!(
            outcome.rejection,
            Some(Rejection::InvalidAction { .. })
        ));

        let mut leveled = state;
        leveled.progress.gain_xp(100);
        let (next, outcome) = resolve(&leveled, Action::GuideHike, &env);
        assert!(!outcome.is_rejected());
        assert_eq!(outcome.quest_count, Some(1));
        assert_eq!(next.cash_cents - leveled.cash_cents, GUIDE_BASE_CENTS);
    }

    #[test]
    fn camping_sleeps_until_dawn() {
        let mut state = game(JobKind::Artist);
        state.clock.minutes = 22 * 60;
        let env = EnvironmentSnapshot::backcountry("swell");
        let (next, outcome) = resolve(
            &state,
            Action::Camp {
                style: CampStyle::Dispersed,
            },
            &env,
        );
        assert!(!outcome.is_rejected());
        assert_eq!(outcome.minutes, 8 * 60);
        assert_eq!(next.clock.minute_of_day(), 6 * 60);
        assert_eq!(next.clock.day(), 2);
        assert!(next.stats.energy > state.stats.energy);

        let (_, outcome) = resolve(
            &next,
            Action::Camp {
                style: CampStyle::Paid,
            },
            &env,
        );
        assert!(matches!(
            outcome.rejection,
            Some(Rejection::InvalidAction { .. })
        ));
    }

    #[test]
    fn paid_camp_charges_the_fee() {
        let mut state = game(JobKind::Mechanic);
        state.clock.minutes = 21 * 60;
        let (_, outcome) = resolve(
            &state,
            Action::Camp {
                style: CampStyle::Paid,
            },
            &EnvironmentSnapshot::new("kampground"),
        );
        assert!(outcome.cash_delta_cents <= -3_500);
    }

    #[test]
    fn broken_rig_blocks_work_until_repaired() {
        let mut state = game(JobKind::Mechanic);
        state.vehicle.breakdown = Some(Breakdown {
            part: crate::vehicle::Part::Tire,
            day_started: 1,
        });
        let env = EnvironmentSnapshot::backcountry("swell");
        let (_, outcome) = resolve(&state, Action::Work { hours: 2 }, &env);
        assert!(matches!(
            outcome.rejection,
            Some(Rejection::InvalidAction { .. })
        ));

        let (_, outcome) = resolve(&state, Action::Repair, &env);
        assert!(matches!(
            outcome.rejection,
            Some(Rejection::LocationRestricted { .. })
        ));

        let (fixed, outcome) = resolve(&state, Action::Repair, &shop());
        assert_eq!(outcome.cash_delta_cents, -12_750);
        assert!(!fixed.vehicle.is_broken_down());
    }

    #[test]
    fn heater_needs_diesel_to_switch_on() {
        let mut state = game(JobKind::Artist);
        state.inventory.devices.install(Device::Heater).unwrap();
        let toggle = Action::Toggle {
            device: Device::Heater,
            on: true,
        };
        let (_, outcome) = resolve(&state, toggle, &EnvironmentSnapshot::new("moab"));
        assert!(matches!(
            outcome.rejection,
            Some(Rejection::InsufficientResource {
                kind: Consumable::Diesel,
                ..
            })
        ));
    }

    #[test]
    fn adoption_needs_a_shelter() {
        let state = game(JobKind::Artist);
        let (_, outcome) = resolve(&state, Action::AdoptPet, &shop());
        assert!(outcome.is_rejected());

        let env = EnvironmentSnapshot::new("shelter").with_facilities(Facilities {
            pet_adoption: true,
            ..Facilities::default()
        });
        let (next, outcome) = resolve(&state, Action::AdoptPet, &env);
        assert!(!outcome.is_rejected());
        assert!(next.pet.is_some());
        let (_, again) = resolve(&next, Action::AdoptPet, &env);
        assert!(again.is_rejected());

        let (_, fed) = resolve(
            &next,
            Action::Pet {
                verb: PetVerb::Feed,
            },
            &env,
        );
        assert!((fed.resource_change(Consumable::Meals) + 1.0).abs() < 1e-5);
    }

    #[test]
    fn electric_rigs_charge_at_stations() {
        let state = GameState::new(&NewGame {
            vehicle: VehicleKind::Sedan,
            ..NewGame::default()
        })
        .unwrap();
        let (next, outcome) = resolve(
            &state,
            Action::Charge {
                method: ChargeMethod::Station,
            },
            &shop(),
        );
        assert!(!outcome.is_rejected());
        assert_eq!(outcome.cash_delta_cents, -EV_STATION_COST_CENTS);
        assert!((next.power.ev_pct - 100.0).abs() < 1e-3);

        let (_, outcome) = resolve(
            &state,
            Action::Refuel { gallons: 1.0 },
            &shop(),
        );
        assert!(outcome.is_rejected());
    }
}
