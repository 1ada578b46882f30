//! Integration tests for um-sim.

use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use um_agent::{EntityKind, EntityStore, EntityStoreBuilder, FleetSpec, PersonSpec};
use um_core::{AgencyId, EntityId, GeoPoint, NodeId, RouteId, SimConfig, StopId, Tick, TransportMode, TripId};
use um_flow::{Activity, DailySchedule, Flow, FlowError, PlanJourney};
use um_knowledge::{Experience, Knowledge, KnowledgeHandle, NoKnowledge};
use um_planner::{
    Itinerary, ItineraryKind, JourneyRequest, Leg, Planner, PlannerResult, PlanningConfig,
    PlanningOrchestrator,
};
use um_transit::{Route, Stop, TransitError, Trip};
use um_world::{StreetMap, StreetMapBuilder};

use crate::{NoopObserver, SimBuilder, SimError, SimObserver, Simulation, TickStats};

// ── Helpers ───────────────────────────────────────────────────────────────────

const A: GeoPoint = GeoPoint { lat: 46.000, lon: 11.0 };
const B: GeoPoint = GeoPoint { lat: 46.001, lon: 11.0 };
const C: GeoPoint = GeoPoint { lat: 46.002, lon: 11.0 };

fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

/// Monday 2 March 2026 at `h:m`.
fn monday(h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, 2).unwrap().and_time(hm(h, m))
}

fn test_config(start: NaiveDateTime, total_ticks: u64) -> SimConfig {
    SimConfig {
        start,
        tick_duration_secs:    60,
        total_ticks,
        seed:                  42,
        output_interval_ticks: 5,
    }
}

/// A ↔ B ↔ C, ~111 m apart.
fn line_map() -> Arc<StreetMap> {
    let mut b = StreetMapBuilder::new();
    let n0 = b.add_node(A);
    let n1 = b.add_node(B);
    let n2 = b.add_node(C);
    b.add_street(n0, n1, 13.9);
    b.add_street(n1, n2, 13.9);
    Arc::new(b.build().unwrap())
}

fn stops() -> Vec<Arc<Stop>> {
    [("A", A), ("B", B), ("C", C)]
        .into_iter()
        .map(|(id, pos)| Arc::new(Stop::new(StopId::new(id), id, pos)))
        .collect()
}

/// Trip `id` over A-B-C leaving A at `h:m`, five minutes between stops.
fn trip(id: &str, map: &StreetMap, stops: &[Arc<Stop>], h: u32, m: u32) -> Arc<Trip> {
    let p01 = map.path_through(&[NodeId(0), NodeId(1)]).unwrap();
    let p12 = map.path_through(&[NodeId(1), NodeId(2)]).unwrap();
    Arc::new(Trip::new(
        TripId::new(id),
        RouteId::new("5"),
        stops.to_vec(),
        vec![hm(h, m), hm(h, m + 5), hm(h, m + 10)],
        vec![p01, p12],
    ))
}

fn route(id: &str, trips: Vec<Arc<Trip>>) -> Route {
    let mut r = Route::new(RouteId::new(id));
    for t in trips {
        r.add_trip(0, t);
    }
    r
}

fn bus_fleet(count: usize) -> FleetSpec {
    FleetSpec { kind: EntityKind::Bus, count, capacity: 10, depot: A }
}

/// Answers transit requests with a ride on T1 from A to C.
struct Timetable;

impl Planner for Timetable {
    fn request_single_journey(&self, req: &JourneyRequest, out: &mut Vec<Itinerary>) -> PlannerResult<Option<usize>> {
        if !req.allows(TransportMode::Transit) {
            return Ok(None);
        }
        let leg = Leg::new(TransportMode::Bus, A, C, monday(8, 0), 600.0, Vec::new())
            .with_trip(TripId::new("T1"), StopId::new("A"), StopId::new("C"));
        out.push(Itinerary::new(req, vec![leg], 1.2, ItineraryKind::Regular));
        Ok(Some(1))
    }
}

fn planning() -> Arc<PlanningOrchestrator> {
    let config = PlanningConfig { parallel_client_requests: false, threads_per_core: 1 };
    Arc::new(PlanningOrchestrator::new(&config, vec![Arc::new(Timetable)], None).unwrap())
}

#[derive(Default)]
struct Recording {
    seen: Mutex<Vec<Experience>>,
}

impl Knowledge for Recording {
    fn collect(&self, experience: Experience) {
        self.seen.lock().unwrap().push(experience);
    }

    fn predict(&self, _: &mut [Itinerary]) {}
}

/// Commuter 0 at A heading for C; agency 1 with bus 2 running T1 at 08:00.
fn commute() -> (Simulation, Arc<Recording>, Arc<StreetMap>) {
    let map = line_map();
    let stops = stops();
    let rider = Arc::new(Recording::default());

    let handle = Arc::clone(&rider);
    let mut b = EntityStoreBuilder::new().with_knowledge(move |id| -> KnowledgeHandle {
        if id == EntityId(0) { Arc::clone(&handle) as KnowledgeHandle } else { Arc::new(NoKnowledge) }
    });
    b.add_person(PersonSpec::new(A));
    b.add_agency(
        AgencyId::new("TT"),
        EntityKind::PublicTransportAgency,
        vec![route("5", vec![trip("T1", &map, &stops, 8, 0)])],
        &bus_fleet(1),
    )
    .unwrap();
    let store = b.build();

    let mut schedules: Vec<DailySchedule> = (0..store.len()).map(|_| DailySchedule::new()).collect();
    schedules[0].push(monday(7, 58), Activity::PlanJourney(PlanJourney::new(C)));

    let sim = SimBuilder::new(test_config(monday(7, 58), 20), store, planning())
        .schedules(schedules)
        .map(Arc::clone(&map))
        .stops(stops)
        .blocking_planning(true)
        .build()
        .unwrap();
    (sim, rider, map)
}

#[derive(Default)]
struct Counting {
    starts:    u64,
    ends:      u64,
    snapshots: Vec<Tick>,
    last:      Option<TickStats>,
    ended_at:  Option<Tick>,
}

impl SimObserver for Counting {
    fn on_tick_start(&mut self, _: Tick, _: NaiveDateTime) {
        self.starts += 1;
    }

    fn on_tick_end(&mut self, _: Tick, _: NaiveDateTime, stats: &TickStats) {
        self.ends += 1;
        self.last = Some(*stats);
    }

    fn on_snapshot(&mut self, tick: Tick, _: NaiveDateTime, entities: &EntityStore, flows: &[Flow]) {
        assert_eq!(entities.len(), flows.len());
        self.snapshots.push(tick);
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        self.ended_at = Some(final_tick);
    }
}

// ── SimBuilder validation ─────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use super::*;

    fn two_people() -> EntityStore {
        let mut b = EntityStoreBuilder::new();
        b.add_person(PersonSpec::new(A));
        b.add_person(PersonSpec::new(B));
        b.build()
    }

    #[test]
    fn builds_successfully_with_defaults() {
        let sim = SimBuilder::new(test_config(monday(8, 0), 10), two_people(), planning()).build().unwrap();
        assert_eq!(sim.flows.len(), 2);
        assert_eq!(sim.schedules.len(), 2);
        assert_eq!(sim.active_entities(), 0);
        assert_eq!(sim.tick(), Tick(0));
    }

    #[test]
    fn schedule_count_mismatch_errors() {
        let result = SimBuilder::new(test_config(monday(8, 0), 10), two_people(), planning())
            .schedules(vec![DailySchedule::new()])
            .build();
        assert!(matches!(
            result,
            Err(SimError::EntityCountMismatch { expected: 2, got: 1, what: "daily schedules" })
        ));
    }

    #[test]
    fn flow_count_mismatch_errors() {
        let result = SimBuilder::new(test_config(monday(8, 0), 10), two_people(), planning())
            .flows(vec![Flow::new(), Flow::new(), Flow::new()])
            .build();
        assert!(matches!(result, Err(SimError::EntityCountMismatch { got: 3, .. })));
    }

    #[test]
    fn zero_tick_duration_is_rejected() {
        let mut config = test_config(monday(8, 0), 10);
        config.tick_duration_secs = 0;
        let result = SimBuilder::new(config, two_people(), planning()).build();
        assert!(matches!(result, Err(SimError::Config(_))));
    }

    #[test]
    fn agencies_start_scanning_their_timetables() {
        let (sim, _, _) = commute();
        assert!(sim.flows[0].is_idle());
        assert_eq!(sim.flows[1].current().unwrap().name(), "START_NEXT_TRIPS");
        assert!(sim.flows[2].is_idle());
        assert_eq!(sim.ctx.stops.len(), 3);
    }
}

// ── Tick loop ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tick_loop {
    use super::*;

    #[test]
    fn schedule_releases_at_due_time() {
        let mut b = EntityStoreBuilder::new();
        b.add_person(PersonSpec::new(A));
        let mut schedules = vec![DailySchedule::new()];
        schedules[0].push(monday(8, 2), Activity::PlanJourney(PlanJourney::new(C)));
        let mut sim = SimBuilder::new(test_config(monday(8, 0), 10), b.build(), planning())
            .schedules(schedules)
            .build()
            .unwrap();

        assert_eq!(sim.step().unwrap().released, 0);
        assert_eq!(sim.step().unwrap().released, 0);
        let stats = sim.step().unwrap();
        assert_eq!(stats.released, 1);
        assert_eq!(stats.active, 1);
        assert_eq!(stats.planning_rounds, 1);
        assert!(sim.schedules[0].is_empty());
        sim.finish();
    }

    #[test]
    fn run_stops_at_end_tick_and_notifies_observer() {
        let (mut sim, _, _) = commute();
        let mut obs = Counting::default();
        sim.run(&mut obs).unwrap();

        assert_eq!(sim.tick(), Tick(20));
        assert_eq!(obs.starts, 20);
        assert_eq!(obs.ends, 20);
        assert_eq!(obs.snapshots, vec![Tick(0), Tick(5), Tick(10), Tick(15)]);
        assert_eq!(obs.ended_at, Some(Tick(20)));
        // By 08:17 only the agency is still busy.
        assert_eq!(obs.last.map(|s| s.active), Some(1));
    }

    #[test]
    fn run_ticks_ignores_end_tick() {
        let (mut sim, _, _) = commute();
        sim.run_ticks(25, &mut NoopObserver).unwrap();
        assert_eq!(sim.tick(), Tick(25));
    }

    #[test]
    fn commuter_rides_the_bus_to_work() {
        let (mut sim, rider, map) = commute();
        sim.run(&mut NoopObserver).unwrap();

        let person = sim.entities.get(EntityId(0)).unwrap();
        assert_eq!(person.current_position(), C);
        assert!(sim.flows[0].is_idle());
        assert!(sim.flows[2].is_idle(), "bus finished its trip");

        let travelled = rider.seen.lock().unwrap().iter().filter(|e| matches!(e, Experience::Travel(_))).count();
        assert_eq!(travelled, 2, "one experience per segment ridden");

        let agency = sim.entities.get(EntityId(1)).unwrap().agency.as_ref().unwrap();
        assert_eq!(agency.fleet.available(), 1);
        assert!(agency.fleet.is_consistent());

        let bus = sim.entities.get(EntityId(2)).unwrap();
        assert_eq!(bus.current_position(), C);
        assert!(bus.vehicle().unwrap().current_trip.is_none());
        assert_eq!(bus.vehicle().unwrap().cabin.passenger_count(), 0);
        assert!(!sim.ctx.ensembles.contains("T1"));
        assert_eq!(map.total_occupancy(), 0);
    }

    #[test]
    fn bus_is_assigned_in_the_departure_tick() {
        let (mut sim, _, _) = commute();
        sim.step().unwrap(); // 07:58
        sim.step().unwrap(); // 07:59
        assert!(sim.flows[2].is_idle());
        let stats = sim.step().unwrap(); // 08:00
        assert_eq!(stats.effects, 1);
        assert_eq!(sim.flows[2].current().unwrap().name(), "PICKUP_AND_WAIT");
        assert_eq!(sim.ctx.ensembles.members("TransportAgencyTTEnsemble"), vec![EntityId(2)]);
    }

    #[test]
    fn pool_exhaustion_is_fatal() {
        let map = line_map();
        let stops = stops();
        let mut b = EntityStoreBuilder::new();
        b.add_agency(
            AgencyId::new("TT"),
            EntityKind::PublicTransportAgency,
            vec![
                route("1", vec![trip("T1", &map, &stops, 8, 0)]),
                route("2", vec![trip("T2", &map, &stops, 8, 0)]),
            ],
            &bus_fleet(1),
        )
        .unwrap();
        let mut sim = SimBuilder::new(test_config(monday(8, 0), 10), b.build(), planning())
            .stops(stops)
            .build()
            .unwrap();

        let err = sim.step().unwrap_err();
        assert!(matches!(err, SimError::Flow(FlowError::Transit(TransitError::PoolExhausted { .. }))));
        assert_eq!(sim.tick(), Tick(0), "clock does not advance past a fatal tick");
    }
}
