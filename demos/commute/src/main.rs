//! commute: a weekday on a six-stop bus corridor.
//!
//! Commuters live at the northern end of the corridor and work at the
//! southern end.  Each plans a journey to work in the morning and back home
//! in the late afternoon, choosing between car (or taxi), bus line 3 and
//! walking.  Buses run the timetable from a small fleet; every entity learns
//! segment travel times through its local knowledge.
//!
//! Set `RUST_LOG=debug` to follow boardings and fallbacks.

mod network;
mod planner;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use env_logger::{Builder, Env};

use um_agent::{EntityKind, EntityStore, EntityStoreBuilder, FleetSpec, PersonSpec};
use um_core::{AgencyId, EntityId, EntityRng, RouteId, SimConfig, Tick, TripId};
use um_flow::{Activity, DailySchedule, Flow, PlanJourney};
use um_knowledge::{ExperienceStore, InMemoryExperienceStore, KnowledgeExchange, KnowledgeModel, KnowledgeScope};
use um_output::{CsvWriter, OutputWriter, SimOutputObserver};
use um_planner::{PlanningConfig, PlanningOrchestrator};
use um_sim::{SimBuilder, SimObserver, TickStats};
use um_transit::{Route, Stop, Trip};
use um_world::StreetMap;

use network::{build_corridor, build_stops};
use planner::CorridorPlanner;

// ── Constants ─────────────────────────────────────────────────────────────────

const COMMUTERS:             usize = 48;
const SEED:                  u64   = 42;
const TICK_DURATION_SECS:    u32   = 30;
const SIM_HOURS:             u64   = 14;   // 06:00 – 20:00
const OUTPUT_INTERVAL_TICKS: u64   = 20;   // every 10 minutes
const CAR_OWNERSHIP:         f64   = 0.45;
const KNOWLEDGE_MODEL:       &str  = "local";

const BUS_FLEET:     usize = 4;
const BUS_CAPACITY:  u32   = 40;
const HEADWAY_MINS:  i64   = 10;
const MINS_PER_STOP: i64   = 2;

const OUTPUT_DIR: &str = "output/commute";

/// Monday.
fn sim_start() -> Result<NaiveDateTime> {
    NaiveDate::from_ymd_opt(2026, 3, 2)
        .and_then(|d| d.and_hms_opt(6, 0, 0))
        .context("invalid start date")
}

fn at(h: u32, m: u32) -> Result<NaiveTime> {
    NaiveTime::from_hms_opt(h, m, 0).context("invalid time of day")
}

// ── Timetable ─────────────────────────────────────────────────────────────────

/// Line 3: southbound in the morning peak, northbound in the evening peak,
/// every weekday.
fn build_line(map: &StreetMap, stops: &[Arc<Stop>]) -> Result<(Route, Vec<Arc<Trip>>)> {
    let route_id = RouteId::new("3");
    let mut trips = Vec::new();

    let peaks = [
        ("S", at(6, 30)?, at(9, 30)?, false),
        ("N", at(16, 0)?, at(19, 30)?, true),
    ];
    for (dir, first, last, reversed) in peaks {
        let mut line: Vec<Arc<Stop>> = stops.to_vec();
        if reversed {
            line.reverse();
        }
        let traces = line
            .windows(2)
            .map(|pair| {
                let a = map.snap_to_node(pair[0].position).context("stop off the map")?;
                let b = map.snap_to_node(pair[1].position).context("stop off the map")?;
                Ok(map.path_through(&[a, b])?)
            })
            .collect::<Result<Vec<_>>>()?;

        let mut departure = first;
        while departure <= last {
            let stop_times = (0..line.len() as i64)
                .map(|i| departure + Duration::minutes(i * MINS_PER_STOP))
                .collect();
            let id = TripId::new(format!("3{dir}-{}", departure.format("%H%M")));
            trips.push(Arc::new(Trip::new(id, route_id.clone(), line.clone(), stop_times, traces.clone())));
            departure += Duration::minutes(HEADWAY_MINS);
        }
    }

    let mut route = Route::new(route_id);
    for weekday in 0..5 {
        for trip in &trips {
            route.add_trip(weekday, Arc::clone(trip));
        }
    }
    Ok((route, trips))
}

// ── Population ────────────────────────────────────────────────────────────────

/// Add the commuters and return their daily schedules.
fn add_commuters(
    b:      &mut EntityStoreBuilder,
    stops:  &[Arc<Stop>],
    start:  NaiveDateTime,
) -> Result<Vec<DailySchedule>> {
    let (homes, offices) = stops.split_at(stops.len() / 2);
    let day = start.date();
    let mut schedules = Vec::with_capacity(COMMUTERS);

    for i in 0..COMMUTERS {
        let mut rng = EntityRng::new(SEED, EntityId(i as u32));
        let home = rng.choose(homes).context("no residential stops")?.position;
        let work = rng.choose(offices).context("no office stops")?.position;

        let mut spec = PersonSpec::new(home);
        if rng.gen_bool(CAR_OWNERSHIP) {
            spec = spec.with_car();
        }
        b.add_person(spec);

        let leave_home = day.and_time(at(7, 0)?) + rng.jitter_minutes(Duration::minutes(90));
        let leave_work = day.and_time(at(16, 30)?) + rng.jitter_minutes(Duration::minutes(150));
        let mut schedule = DailySchedule::new();
        schedule.push(leave_home, Activity::PlanJourney(PlanJourney::new(work)));
        schedule.push(leave_work, Activity::PlanJourney(PlanJourney::new(home)));
        schedules.push(schedule);
    }
    Ok(schedules)
}

// ── Observer wrapper ──────────────────────────────────────────────────────────

struct CountingObserver<W: OutputWriter> {
    inner:         SimOutputObserver<W>,
    snapshot_rows: usize,
    summary_rows:  usize,
    peak_active:   usize,
}

impl<W: OutputWriter> CountingObserver<W> {
    fn new(inner: SimOutputObserver<W>) -> Self {
        Self { inner, snapshot_rows: 0, summary_rows: 0, peak_active: 0 }
    }
}

impl<W: OutputWriter> SimObserver for CountingObserver<W> {
    fn on_tick_end(&mut self, tick: Tick, now: NaiveDateTime, stats: &TickStats) {
        self.summary_rows += 1;
        self.peak_active = self.peak_active.max(stats.active);
        self.inner.on_tick_end(tick, now, stats);
    }

    fn on_snapshot(&mut self, tick: Tick, now: NaiveDateTime, entities: &EntityStore, flows: &[Flow]) {
        self.snapshot_rows += entities.len();
        self.inner.on_snapshot(tick, now, entities, flows);
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        self.inner.on_sim_end(final_tick);
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    Builder::from_env(Env::default().default_filter_or("info")).init();

    println!("=== commute: urban mobility on a bus corridor ===");
    println!("Commuters: {COMMUTERS}  |  Δt: {TICK_DURATION_SECS} s  |  Seed: {SEED}");
    println!();

    let start = sim_start()?;

    // 1. Street map and stops.
    let (map, nodes) = build_corridor()?;
    let map = Arc::new(map);
    let stops = build_stops(&map, &nodes);
    println!("Corridor: {} nodes, {} segments, {} stops", map.node_count(), map.segment_count(), stops.len());

    // 2. Timetable.
    let (route, trips) = build_line(&map, &stops)?;
    println!("Line 3: {} trips per weekday", route.trip_count());

    // 3. Knowledge.
    let model: KnowledgeModel = KNOWLEDGE_MODEL.parse()?;
    let memory = Arc::new(InMemoryExperienceStore::new());
    let store: Arc<dyn ExperienceStore> = memory.clone();
    let exchange = Arc::new(KnowledgeExchange::new(2)?);

    // 4. Entities: commuters first, then the agency and its buses.
    let mut b = {
        let store = Arc::clone(&store);
        let exchange = Arc::clone(&exchange);
        EntityStoreBuilder::new().with_knowledge(move |id| model.handle(id, &store, &exchange))
    };
    let mut schedules = add_commuters(&mut b, &stops, start)?;
    let depot = stops.first().context("corridor has no stops")?.position;
    let agency = b.add_agency(
        AgencyId::new("TT"),
        EntityKind::PublicTransportAgency,
        vec![route],
        &FleetSpec { kind: EntityKind::Bus, count: BUS_FLEET, capacity: BUS_CAPACITY, depot },
    )?;
    let entities = b.build();
    schedules.resize_with(entities.len(), DailySchedule::new);
    println!("Entities: {} ({COMMUTERS} commuters, agency {agency}, {BUS_FLEET} buses)", entities.len());

    // 5. Planning.
    let planning = PlanningOrchestrator::new(
        &PlanningConfig { parallel_client_requests: true, threads_per_core: 1 },
        vec![Arc::new(CorridorPlanner::new(Arc::clone(&map), trips))],
        None,
    )?;

    // 6. Build sim.
    let config = SimConfig {
        start,
        tick_duration_secs:    TICK_DURATION_SECS,
        total_ticks:           SIM_HOURS * 3_600 / TICK_DURATION_SECS as u64,
        seed:                  SEED,
        output_interval_ticks: OUTPUT_INTERVAL_TICKS,
    };
    println!("Sim: {} ticks from {start}, output every {OUTPUT_INTERVAL_TICKS} ticks", config.total_ticks);
    println!();

    let mut sim = SimBuilder::new(config, entities, Arc::new(planning))
        .schedules(schedules)
        .map(Arc::clone(&map))
        .stops(stops.iter().cloned())
        .exchange(Arc::clone(&exchange))
        .blocking_planning(true)
        .build()?;

    // 7. Output.
    let writer = CsvWriter::new(Path::new(OUTPUT_DIR))?;
    let mut obs = CountingObserver::new(SimOutputObserver::new(writer));

    // 8. Run.
    let t0 = Instant::now();
    sim.run(&mut obs)?;
    let elapsed = t0.elapsed();

    if let Some(e) = obs.inner.take_error() {
        eprintln!("output error: {e}");
    }

    // 9. Summary.
    println!("Simulation complete in {:.3} s", elapsed.as_secs_f64());
    println!("  entity_snapshots.csv : {} rows", obs.snapshot_rows);
    println!("  tick_summaries.csv   : {} rows", obs.summary_rows);
    println!("  peak active entities : {}", obs.peak_active);
    println!("  learned segment keys : {}", memory.segment_entries());
    println!();

    // 10. Where the commuters ended up.
    let (mut home, mut car_owners) = (0, 0);
    for entity in sim.entities.iter().filter(|e| e.kind == EntityKind::Person) {
        if entity.is_at_home() {
            home += 1;
        }
        if entity.traveller().is_ok_and(|t| t.has_car) {
            car_owners += 1;
        }
    }
    println!("{home}/{COMMUTERS} commuters back home ({car_owners} car owners)");
    println!();

    // 11. Mean departure delay per stop, as learned by the first bus.
    let first_bus = KnowledgeScope::Entity(EntityId(agency.0 + 1));
    println!("{:<16} {:>10}", "Stop", "Delay (s)");
    println!("{}", "-".repeat(27));
    for stop in &stops {
        match memory.mean_stop_delay(first_bus, &stop.id) {
            Some(d) => println!("{:<16} {:>10.1}", stop.name, d),
            None => println!("{:<16} {:>10}", stop.name, "-"),
        }
    }

    Ok(())
}
