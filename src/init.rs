//! Start-up: command-line arguments and loading cars from the store.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Mutex;
use std::time::Duration;

use crate::config::{self, ElevatorConfig};
use crate::elevator_logic::fsm::ElevatorCar;
use crate::error::{Error, Result};
use crate::print;
use crate::store::StateStore;

/// What the binary should do after parsing its arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum Startup {
    /// Run with this configuration
    Run(ElevatorConfig),
    /// Print [HELP] and exit
    Help,
}

/// Argument overview printed by `help`.
pub const HELP: &str = "\
Available arguments (key::value):
  min_floor::<n>        lowest floor (default 1)
  max_floor::<n>        highest floor (default 20)
  home::<n>             floor fresh cars start at (default 1)
  cars::<n>             number of cars (default 1)
  capacity::<n>         max pending stops per car (default 32)
  travel_ms::<n>        travel time per floor in ms (default 1000)
  dwell_ms::<n>         door dwell in ms (default 2000)
  store::<dir>          directory for car records (default ./elevator_state)
  print_err::true/false
  print_warn::true/false
  print_ok::true/false
  print_info::true/false
  print_else::true/false
  debug                 only error messages are shown
  help                  show this text";

fn set_toggle(toggle: &Mutex<bool>, on: bool) {
    if let Ok(mut flag) = toggle.lock() {
        *flag = on;
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::Config(format!("invalid value '{}' for {}", value, key)))
}

/// Parses `key::value` arguments (program name excluded) into a configuration.
///
/// Print toggles are applied right away. Unknown keys are reported and skipped. The
/// resulting configuration is validated.
///
/// # Example
/// ```
/// use elevatordispatch::init::{parse_args, Startup};
///
/// let args = vec!["max_floor::30".to_string(), "cars::2".to_string()];
/// match parse_args(&args).unwrap() {
///     Startup::Run(config) => assert_eq!((config.max_floor, config.num_cars), (30, 2)),
///     Startup::Help => unreachable!(),
/// }
/// ```
pub fn parse_args(args: &[String]) -> Result<Startup> {
    let mut config = ElevatorConfig::default();

    for arg in args {
        let lower = arg.to_lowercase();
        if lower == "help" {
            return Ok(Startup::Help);
        }

        // Bare flags like `debug` have an empty value
        let (key, value) = match arg.split_once("::") {
            Some((key, value)) => (key.to_lowercase(), value),
            None => (lower.clone(), ""),
        };
        let is_true = value.to_lowercase() == "true";

        match key.as_str() {
            "min_floor" => config.min_floor = parse_value(&key, value)?,
            "max_floor" => config.max_floor = parse_value(&key, value)?,
            "home" => config.home_floor = parse_value(&key, value)?,
            "cars" => config.num_cars = parse_value(&key, value)?,
            "capacity" => config.capacity = parse_value(&key, value)?,
            "travel_ms" => config.travel_time = Duration::from_millis(parse_value(&key, value)?),
            "dwell_ms" => config.door_dwell = Duration::from_millis(parse_value(&key, value)?),
            "store" => config.store_dir = PathBuf::from(value),
            "print_err" => set_toggle(&config::PRINT_ERR_ON, is_true),
            "print_warn" => set_toggle(&config::PRINT_WARN_ON, is_true),
            "print_ok" => set_toggle(&config::PRINT_OK_ON, is_true),
            "print_info" => set_toggle(&config::PRINT_INFO_ON, is_true),
            "print_else" => set_toggle(&config::PRINT_ELSE_ON, is_true),
            // Kun error-meldingar
            "debug" => {
                set_toggle(&config::PRINT_WARN_ON, false);
                set_toggle(&config::PRINT_OK_ON, false);
                set_toggle(&config::PRINT_INFO_ON, false);
                set_toggle(&config::PRINT_ELSE_ON, false);
            }
            _ => print::warn(format!("Unknown argument '{}'", key)),
        }
    }

    config.validate()?;
    Ok(Startup::Run(config))
}

/// Loads every car's record from `store`.
///
/// A missing record starts a fresh car at the home floor. So does an unreachable store,
/// after logging it; the car then runs from memory until the store is back.
pub fn load_cars(config: &ElevatorConfig, store: &dyn StateStore) -> Vec<ElevatorCar> {
    (0..config.num_cars)
        .map(|car_id| match store.load(car_id) {
            Ok(state) => {
                print::ok(format!(
                    "Car {}: restored at floor {} ({}), {} pending stop(s)",
                    car_id,
                    state.current_floor,
                    state.state.as_str(),
                    state.up.len() + state.down.len()
                ));
                ElevatorCar::from_persisted(car_id, config, &state)
            }
            Err(Error::NotFound(_)) => {
                print::info(format!("Car {}: no stored state, starting at floor {}", car_id, config.home_floor));
                ElevatorCar::new(car_id, config)
            }
            Err(e) => {
                print::err(format!("Car {}: could not load state ({}), starting fresh", car_id, e));
                ElevatorCar::new(car_id, config)
            }
        })
        .collect()
}
