use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};

use elevatordispatch::elevator_logic::{ingestion, Floor};
use elevatordispatch::init::{self, Startup};
use elevatordispatch::service::{self, ElevatorService};
use elevatordispatch::store::{JsonFileStore, StateStore};
use elevatordispatch::{print, sync};

const COMMANDS: &str = "\
Commands:
  go <floor>        request a floor inside car 0
  go <car> <floor>  request a floor inside a given car
  up <floor>        call from a floor, going up
  down <floor>      call from a floor, going down
  call <floor> <up|down>
  state             floor, direction and phase of car 0
  floor             current floor of car 0
  stored <car>      the store's copy of a car
  table             all cars
  reset             clear all requests and park the cars
  sim start|stop|status
  quit";


#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match init::parse_args(&args).context("invalid arguments")? {
        Startup::Run(config) => config,
        Startup::Help => {
            println!("{}", init::HELP);
            return Ok(());
        }
    };

    print::banner(config.min_floor, config.max_floor, config.num_cars);

    let store = JsonFileStore::new(&config.store_dir)
        .with_context(|| format!("cannot open store directory {}", config.store_dir.display()))?;
    let store: Arc<dyn StateStore> = Arc::new(store);

    let cars = init::load_cars(&config, store.as_ref());
    let selector = service::default_selector(config.num_cars);
    let service = ElevatorService::new(cars, selector, config);
    let _tasks = service.spawn_tasks(store.clone());

    print::info(format!("Ready. {}", COMMANDS));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.first() == Some(&"quit") {
            break;
        }
        handle_command(&service, store.as_ref(), &words).await;
    }

    print::info("Shutting down".to_string());
    Ok(())
}

fn parse_floor(word: &str) -> Option<Floor> {
    word.parse().ok()
}

async fn handle_command(service: &ElevatorService, store: &dyn StateStore, words: &[&str]) {
    match words {
        ["go", floor] => match parse_floor(floor) {
            Some(floor) => report(service.go_to_floor(floor).await),
            None => print::warn(format!("Not a floor: {}", floor)),
        },
        ["go", car, floor] => match (car.parse(), parse_floor(floor)) {
            (Ok(car), Some(floor)) => report(service.go_to_floor_in(car, floor).await),
            _ => print::warn("Usage: go <car> <floor>".to_string()),
        },
        ["up", floor] => match parse_floor(floor) {
            Some(floor) => report(service.call_up(floor).await),
            None => print::warn(format!("Not a floor: {}", floor)),
        },
        ["down", floor] => match parse_floor(floor) {
            Some(floor) => report(service.call_down(floor).await),
            None => print::warn(format!("Not a floor: {}", floor)),
        },
        ["call", floor, dirn] => match (parse_floor(floor), ingestion::parse_direction(dirn)) {
            (Some(floor), Ok(dirn)) => report(service.call(floor, dirn).await),
            (None, _) => print::warn(format!("Not a floor: {}", floor)),
            (_, Err(e)) => print::warn(e.to_string()),
        },
        ["state"] => report(service.get_state().await),
        ["floor"] => report(service.get_floor().await),
        ["stored", car] => match car.parse() {
            Ok(car) => report(sync::read_stored(store, car)),
            Err(_) => print::warn(format!("Not a car: {}", car)),
        },
        ["table"] => print::cars(&service.snapshots()),
        ["reset"] => service.reset().await,
        ["sim", "start"] => {
            if !service.start_simulation() {
                print::info("Simulation is already running".to_string());
            }
        }
        ["sim", "stop"] => {
            if !service.stop_simulation() {
                print::info("Simulation is not running".to_string());
            }
        }
        ["sim", "status"] => print::info(format!("Simulation running: {}", service.simulation_running())),
        [] => {}
        _ => print::warn(format!("Unknown command. {}", COMMANDS)),
    }
}

fn report<T: std::fmt::Debug>(result: elevatordispatch::error::Result<T>) {
    match result {
        Ok(value) => print::ok(format!("{:?}", value)),
        Err(e) => print::err(e.to_string()),
    }
}
