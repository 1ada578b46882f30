//! Tests for um-flow.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use um_agent::{Entity, EntityKind, Traveller, Vehicle};
use um_core::{AgencyId, EntityId, GeoPoint, NodeId, RouteId, SimClock, StopId, TransportMode, TripId};
use um_knowledge::{Experience, Knowledge, KnowledgeHandle};
use um_planner::{
    FlexiBusPlanner, Itinerary, ItineraryKind, JourneyRequest, Leg, Planner, PlannerResult,
    PlanningConfig, PlanningOrchestrator, WeightedUtility,
};
use um_transit::{Cabin, Fleet, Route, Stop, TransitError, TransportAgency, Trip};
use um_world::{SegmentPath, StreetMap, StreetMapBuilder};

use crate::{
    Activity, ActivityCtx, CorrectPosition, DailySchedule, Effect, Flow, FlowError, Learn,
    MoveMode, Movement, MovementProfile, PickUpAndWait, PlanJourney, PrepareTrip, RideTransit,
    SegmentWalker, SimContext, StartNextTrips,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Three nodes in a north-south line, ~111 m apart, limit 13.9 m/s.
fn line_map() -> StreetMap {
    let mut b = StreetMapBuilder::new();
    let n0 = b.add_node(GeoPoint::new(46.000, 11.0));
    let n1 = b.add_node(GeoPoint::new(46.001, 11.0));
    let n2 = b.add_node(GeoPoint::new(46.002, 11.0));
    b.add_street(n0, n1, 13.9);
    b.add_street(n1, n2, 13.9);
    b.build().unwrap()
}

fn path(map: &StreetMap, nodes: &[u32]) -> SegmentPath {
    let nodes: Vec<NodeId> = nodes.iter().map(|&n| NodeId(n)).collect();
    map.path_through(&nodes).unwrap()
}

fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

/// Monday 2 March 2026 at `h:m`.
fn monday(h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, 2).unwrap().and_time(hm(h, m))
}

/// Knowledge that keeps everything it is given.
#[derive(Default)]
struct Recording {
    seen:    Mutex<Vec<Experience>>,
    flushes: AtomicUsize,
}

impl Recording {
    fn travel_count(&self) -> usize {
        self.seen.lock().unwrap().iter().filter(|e| matches!(e, Experience::Travel(_))).count()
    }

    fn stops(&self) -> Vec<um_knowledge::StopExperience> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                Experience::Stop(s) => Some(s.clone()),
                _ => None,
            })
            .collect()
    }
}

impl Knowledge for Recording {
    fn collect(&self, experience: Experience) {
        self.seen.lock().unwrap().push(experience);
    }

    fn predict(&self, _: &mut [Itinerary]) {}

    fn flush(&self) {
        self.flushes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Records what it was asked and answers nothing.
#[derive(Default)]
struct NoResults {
    asked: Mutex<Vec<(u32, Vec<TransportMode>, bool)>>,
}

impl Planner for NoResults {
    fn request_single_journey(&self, req: &JourneyRequest, _: &mut Vec<Itinerary>) -> PlannerResult<Option<usize>> {
        self.asked.lock().unwrap().push((req.req_number, req.modes.clone(), req.is_taxi));
        Ok(None)
    }
}

/// Answers the car request with a drive along `path`.
struct DriveAlong {
    path: SegmentPath,
}

impl Planner for DriveAlong {
    fn request_single_journey(&self, req: &JourneyRequest, out: &mut Vec<Itinerary>) -> PlannerResult<Option<usize>> {
        if !req.allows(TransportMode::Car) {
            return Ok(None);
        }
        let leg = Leg::new(TransportMode::Car, req.from, req.to, req.departure, 16.0, self.path.clone());
        out.push(Itinerary::new(req, vec![leg], 0.08, ItineraryKind::Regular));
        Ok(Some(1))
    }
}

/// Flexible-bus planner that offers one ride when `answers` is set and
/// remembers who was asked and unregistered.
#[derive(Default)]
struct OnDemand {
    answers:      bool,
    asked:        Mutex<Vec<(u32, Vec<TransportMode>)>>,
    unregistered: Mutex<Vec<EntityId>>,
}

impl Planner for OnDemand {
    fn request_single_journey(&self, req: &JourneyRequest, out: &mut Vec<Itinerary>) -> PlannerResult<Option<usize>> {
        self.asked.lock().unwrap().push((req.req_number, req.modes.clone()));
        if !self.answers {
            return Ok(None);
        }
        let leg = Leg::new(TransportMode::FlexiBus, req.from, req.to, req.departure, 420.0, Vec::new());
        out.push(Itinerary::new(req, vec![leg], 1.5, ItineraryKind::Regular));
        Ok(Some(1))
    }
}

impl FlexiBusPlanner for OnDemand {
    fn unregister(&self, entity: EntityId) {
        self.unregistered.lock().unwrap().push(entity);
    }
}

fn planning_sim(planner: Arc<dyn Planner>, flexibus: Option<Arc<dyn FlexiBusPlanner>>) -> SimContext {
    let config = PlanningConfig { parallel_client_requests: false, threads_per_core: 1 };
    let planning = PlanningOrchestrator::new(&config, vec![planner], flexibus).unwrap();
    SimContext::new(SimClock::new(monday(8, 0), 60), Arc::new(planning))
}

fn sim_with(planner: Arc<dyn Planner>) -> SimContext {
    planning_sim(planner, None)
}

fn sim() -> SimContext {
    sim_with(Arc::new(NoResults::default()))
}

fn person(at: GeoPoint, home: GeoPoint, has_car: bool, knowledge: KnowledgeHandle) -> Entity {
    let mut e = Entity::new(EntityId(0), EntityKind::Person, at, knowledge, Arc::new(WeightedUtility));
    e.traveller = Some(Traveller::new(home, has_car, false, false));
    e
}

fn bus(id: u32, fleet: Arc<Fleet>, knowledge: KnowledgeHandle) -> Entity {
    let cabin = Arc::new(Cabin::new(2, GeoPoint::new(46.0, 11.0)).unwrap());
    let mut e = Entity::new(EntityId(id), EntityKind::Bus, GeoPoint::new(46.0, 11.0), knowledge, Arc::new(WeightedUtility));
    e.vehicle = Some(Vehicle::new(fleet, cabin));
    e
}

fn stop(id: &str, lat: f64) -> Arc<Stop> {
    Arc::new(Stop::new(StopId::new(id), id, GeoPoint::new(lat, 11.0)))
}

/// A-B-C along the line map, departing 08:00, 08:05, 08:10.
fn line_trip(map: &StreetMap) -> Arc<Trip> {
    Arc::new(Trip::new(
        TripId::new("T1"),
        RouteId::new("5"),
        vec![stop("A", 46.000), stop("B", 46.001), stop("C", 46.002)],
        vec![hm(8, 0), hm(8, 5), hm(8, 10)],
        vec![path(map, &[0, 1]), path(map, &[1, 2])],
    ))
}

/// Step `flow` once and return the unused time.
fn step(flow: &mut Flow, entity: &mut Entity, sim: &SimContext, dt: f64) -> f64 {
    let mut ctx = ActivityCtx::new(entity, sim);
    flow.step(dt, &mut ctx).unwrap()
}

// ── Segment walker ────────────────────────────────────────────────────────────

#[cfg(test)]
mod walker {
    use super::*;

    #[test]
    fn traversal_time_is_length_over_speed() {
        let map = line_map();
        let p = path(&map, &[0, 1, 2]);
        let total: f64 = p.iter().map(|s| s.length_m).sum();
        let expected = total / 1.29;

        let mut w = SegmentWalker::new(p);
        let mut used = 0.0;
        for _ in 0..100 {
            let left = w.advance(&MoveMode::Walk, 7.0, 0, 0.0, None);
            used += 7.0 - left;
            if w.is_finished() {
                break;
            }
        }
        assert!(w.is_finished());
        assert!((used - expected).abs() < 0.5, "used {used}, expected {expected}");
        assert_eq!(w.take_experiences().len(), 2);
        assert_eq!(w.position(), Some(GeoPoint::new(46.002, 11.0)));
    }

    #[test]
    fn one_experience_per_segment_with_mode_and_cost() {
        let map = line_map();
        let mut w = SegmentWalker::new(path(&map, &[0, 1, 2]));
        let left = w.advance(&MoveMode::Drive { taxi: true }, 600.0, 1_000, 0.0, None);
        assert!(left > 500.0);

        let ex = w.take_experiences();
        assert_eq!(ex.len(), 2);
        assert!(ex.iter().all(|e| e.mode == TransportMode::Car));
        let cost: f64 = ex.iter().map(|e| e.cost).sum();
        let len: f64 = ex.iter().map(|e| e.length_m).sum();
        assert!((cost - (3.0 + len * 0.0004)).abs() < 1e-9);
        assert_eq!(ex[0].start_ms, 1_000);
        assert_eq!(ex[1].start_ms, ex[0].end_ms);
    }

    #[test]
    fn empty_path_finishes_at_once() {
        let mut w = SegmentWalker::new(Vec::new());
        assert_eq!(w.advance(&MoveMode::Cycle, 60.0, 0, 0.0, None), 60.0);
        assert!(w.is_finished());
        assert!(w.position().is_none());
        assert!(w.take_experiences().is_empty());
    }

    #[test]
    fn drivers_hold_occupancy_until_they_leave() {
        let map = line_map();
        let p = path(&map, &[0, 1, 2]);
        let (s0, s1) = (Arc::clone(&p[0]), Arc::clone(&p[1]));
        let mut w = SegmentWalker::new(p);

        w.advance(&MoveMode::Drive { taxi: false }, 2.0, 0, 0.0, None);
        assert_eq!((s0.occupancy(), s1.occupancy()), (1, 0));
        w.advance(&MoveMode::Drive { taxi: false }, 2.0, 2_000, 0.0, None);
        assert_eq!((s0.occupancy(), s1.occupancy()), (1, 0));

        w.advance(&MoveMode::Drive { taxi: false }, 10.0, 4_000, 0.0, None);
        assert_eq!((s0.occupancy(), s1.occupancy()), (0, 1));

        w.advance(&MoveMode::Drive { taxi: false }, 60.0, 14_000, 0.0, None);
        assert!(w.is_finished());
        assert_eq!(map.total_occupancy(), 0);
    }

    #[test]
    fn pedestrians_and_cyclists_do_not_occupy() {
        let map = line_map();
        let mut w = SegmentWalker::new(path(&map, &[0, 1]));
        w.advance(&MoveMode::Walk, 5.0, 0, 0.0, None);
        assert_eq!(map.total_occupancy(), 0);
        assert!(!MoveMode::Cycle.holds_occupancy());
    }

    #[test]
    fn dropped_walker_releases_its_segment() {
        let map = line_map();
        let mut w = SegmentWalker::new(path(&map, &[0, 1]));
        w.advance(&MoveMode::Bus { mode: TransportMode::FlexiBus }, 1.0, 0, 0.0, None);
        assert_eq!(map.total_occupancy(), 1);
        drop(w);
        assert_eq!(map.total_occupancy(), 0);
    }

    #[test]
    fn cycling_speed_is_capped_by_limit() {
        let map = line_map();
        let p = path(&map, &[0, 1]);
        assert_eq!(MoveMode::Cycle.speed(&p[0]), 4.68);
        assert_eq!(MoveMode::Drive { taxi: false }.speed(&p[0]), 13.9);
        assert_eq!(MoveMode::DriveToNextStop { mode: TransportMode::Rail }.mode(), TransportMode::Rail);
    }
}

// ── Flow ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod flow {
    use super::*;

    #[test]
    fn unused_time_carries_over_to_the_next_activity() {
        let map = line_map();
        let sim = sim();
        let rec = Arc::new(Recording::default());
        let mut e = person(GeoPoint::new(46.0, 11.0), GeoPoint::new(45.0, 11.0), false, rec.clone());

        let mut flow = Flow::new();
        flow.push(Activity::Move(Movement::new(MoveMode::Walk, path(&map, &[0, 1]))));
        flow.push(Activity::CorrectPosition(CorrectPosition::new(GeoPoint::new(46.001, 11.0))));
        flow.push(Activity::Move(Movement::new(MoveMode::Walk, path(&map, &[1, 2]))));

        // First walk takes ~86 s; the remaining ~14 s go into the second.
        let left = step(&mut flow, &mut e, &sim, 100.0);
        assert_eq!(left, 0.0);
        assert_eq!(flow.len(), 1);
        assert_eq!(flow.current().unwrap().name(), "WALK");
        assert!(e.position.lat > 46.001 && e.position.lat < 46.002, "at {:?}", e.position);
        assert_eq!(rec.travel_count(), 1);
    }

    #[test]
    fn idle_flow_keeps_the_whole_budget() {
        let sim = sim();
        let mut e = person(GeoPoint::new(46.0, 11.0), GeoPoint::new(46.0, 11.0), false, Arc::new(Recording::default()));
        let mut flow = Flow::new();
        assert!(flow.is_idle());
        assert_eq!(step(&mut flow, &mut e, &sim, 60.0), 60.0);
    }

    #[test]
    fn at_most_one_current_activity_and_none_finished() {
        let map = line_map();
        let sim = sim();
        let mut e = person(GeoPoint::new(46.0, 11.0), GeoPoint::new(45.0, 11.0), false, Arc::new(Recording::default()));
        let mut flow = Flow::new();
        for _ in 0..3 {
            flow.push(Activity::Move(Movement::new(MoveMode::Walk, path(&map, &[0, 1, 2]))));
            flow.push(Activity::Learn(Learn::new()));
        }
        while !flow.is_idle() {
            step(&mut flow, &mut e, &sim, 45.0);
            assert!(flow.iter().all(|a| !a.is_finished()));
        }
    }

    #[test]
    fn arriving_home_clears_used_car() {
        let sim = sim();
        let home = GeoPoint::new(46.0, 11.0);
        let mut e = person(GeoPoint::new(46.01, 11.0), home, true, Arc::new(Recording::default()));
        e.traveller_mut().unwrap().used_car = true;

        let mut flow = Flow::new();
        flow.push(Activity::CorrectPosition(CorrectPosition::new(home)));
        step(&mut flow, &mut e, &sim, 60.0);
        assert!(e.is_at_home());
        assert!(!e.traveller().unwrap().used_car);
    }

    #[test]
    fn daily_schedule_releases_due_activities_in_order() {
        let mut s = DailySchedule::new();
        s.push(monday(17, 10), Activity::Learn(Learn::new()));
        s.push(monday(7, 45), Activity::PlanJourney(PlanJourney::new(GeoPoint::new(46.0, 11.0))));
        s.push(monday(7, 45), Activity::Learn(Learn::new()));
        assert_eq!(s.len(), 3);
        assert_eq!(s.next_due(), Some(monday(7, 45)));

        assert!(s.pop_due(monday(7, 44)).is_empty());
        let due = s.pop_due(monday(8, 0));
        let names: Vec<_> = due.iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["PLAN_JOURNEY", "LEARN"]);
        assert_eq!(s.len(), 1);
        assert_eq!(s.next_due(), Some(monday(17, 10)));
    }
}

// ── Journeys ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod journey {
    use super::*;

    #[test]
    fn no_itineraries_teleports_to_destination() {
        let planner = Arc::new(NoResults::default());
        let sim = sim_with(planner.clone());
        let rec = Arc::new(Recording::default());
        let dest = GeoPoint::new(46.027, 11.0);
        let mut e = person(GeoPoint::new(46.0, 11.0), GeoPoint::new(46.0, 11.0), true, rec.clone());

        let mut flow = Flow::new();
        flow.push(Activity::PlanJourney(PlanJourney::new(dest)));
        assert_eq!(step(&mut flow, &mut e, &sim, 60.0), 0.0);
        assert!(!flow.is_idle());

        sim.planning.dispatch_pending().unwrap().wait();
        step(&mut flow, &mut e, &sim, 60.0);

        assert_eq!(e.position, dest);
        assert!(flow.is_idle());
        assert_eq!(rec.travel_count(), 0);
    }

    #[test]
    fn waits_without_blocking_until_processed() {
        let sim = sim();
        let mut e = person(GeoPoint::new(46.0, 11.0), GeoPoint::new(46.0, 11.0), true, Arc::new(Recording::default()));
        let mut flow = Flow::new();
        flow.push(Activity::PlanJourney(PlanJourney::new(GeoPoint::new(46.01, 11.0))));
        step(&mut flow, &mut e, &sim, 60.0);
        // Nothing dispatched yet: the buffer stays unprocessed.
        assert_eq!(step(&mut flow, &mut e, &sim, 60.0), 0.0);
        assert_eq!(flow.current().unwrap().name(), "PLAN_JOURNEY");
        assert_eq!(sim.planning.pending_rounds(), 1);
    }

    fn requests_for(e: &mut Entity) -> Vec<(u32, Vec<TransportMode>, bool)> {
        let planner = Arc::new(NoResults::default());
        let sim = sim_with(planner.clone());
        let mut flow = Flow::new();
        flow.push(Activity::PlanJourney(PlanJourney::new(GeoPoint::new(46.02, 11.0))));
        step(&mut flow, e, &sim, 60.0);
        sim.planning.dispatch_pending().unwrap().wait();
        // Unanswered requests are retried; keep one entry per request.
        let mut asked = planner.asked.lock().unwrap().clone();
        asked.dedup();
        asked
    }

    #[test]
    fn car_owner_at_home_asks_for_car_transit_and_walk() {
        let home = GeoPoint::new(46.0, 11.0);
        let mut e = person(home, home, true, Arc::new(Recording::default()));
        let asked = requests_for(&mut e);
        assert_eq!(asked.len(), 3);
        assert_eq!(asked[0], (0, vec![TransportMode::Car, TransportMode::Walk], false));
        assert_eq!(asked[1], (1, vec![TransportMode::Transit, TransportMode::Walk], false));
        assert_eq!(asked[2], (2, vec![TransportMode::Walk], false));
        assert_eq!(e.preferences.wmax, 1000.0);
    }

    #[test]
    fn person_without_car_gets_a_taxi_request() {
        let home = GeoPoint::new(46.0, 11.0);
        let mut e = person(home, home, false, Arc::new(Recording::default()));
        let asked = requests_for(&mut e);
        assert!(asked[0].2);
    }

    #[test]
    fn after_driving_only_the_car_is_requested() {
        let mut e = person(GeoPoint::new(46.01, 11.0), GeoPoint::new(46.0, 11.0), true, Arc::new(Recording::default()));
        e.traveller_mut().unwrap().used_car = true;
        let asked = requests_for(&mut e);
        assert_eq!(asked.len(), 1);
        assert_eq!(asked[0], (0, vec![TransportMode::Car, TransportMode::Walk], false));
        // ~1.1 km to go: walking bound is capped at 1 km.
        assert!(e.preferences.wmax <= 1000.0);
    }

    /// A carless flexible-bus subscriber at home, planned until the results
    /// are in.
    fn plan_with_flexibus(flexi: &Arc<OnDemand>) -> (Entity, Flow, Arc<NoResults>) {
        let planner = Arc::new(NoResults::default());
        let sim = planning_sim(planner.clone(), Some(flexi.clone() as Arc<dyn FlexiBusPlanner>));
        let home = GeoPoint::new(46.0, 11.0);
        let mut e = person(home, home, false, Arc::new(Recording::default()));
        e.traveller_mut().unwrap().use_flexibus = true;

        let mut flow = Flow::new();
        flow.push(Activity::PlanJourney(PlanJourney::new(GeoPoint::new(46.02, 11.0))));
        step(&mut flow, &mut e, &sim, 60.0);
        sim.planning.dispatch_pending().unwrap().wait();
        step(&mut flow, &mut e, &sim, 60.0);
        (e, flow, planner)
    }

    #[test]
    fn subscriber_sends_a_fourth_flexibus_request() {
        let flexi = Arc::new(OnDemand { answers: true, ..OnDemand::default() });
        let (_, flow, planner) = plan_with_flexibus(&flexi);

        assert_eq!(*flexi.asked.lock().unwrap(), vec![(3, vec![TransportMode::FlexiBus])]);
        let mut regular = planner.asked.lock().unwrap().clone();
        regular.dedup();
        assert_eq!(regular.iter().map(|r| r.0).collect::<Vec<_>>(), [0, 1, 2]);
        assert_eq!(flow.current().unwrap().name(), "RANK_ALTERNATIVES");
    }

    #[test]
    fn flexibus_registration_dropped_once_results_arrive() {
        let flexi = Arc::new(OnDemand { answers: true, ..OnDemand::default() });
        plan_with_flexibus(&flexi);
        assert_eq!(*flexi.unregistered.lock().unwrap(), vec![EntityId(0)]);
    }

    #[test]
    fn nothing_unregistered_when_no_itinerary_comes_back() {
        let flexi = Arc::new(OnDemand::default());
        let (e, flow, _) = plan_with_flexibus(&flexi);
        assert_eq!(flexi.asked.lock().unwrap().len(), 1);
        assert!(flexi.unregistered.lock().unwrap().is_empty());
        assert!(flow.is_idle());
        assert_eq!(e.position, GeoPoint::new(46.02, 11.0));
    }

    #[test]
    fn non_subscriber_sends_no_flexibus_request() {
        let flexi = Arc::new(OnDemand { answers: true, ..OnDemand::default() });
        let sim = planning_sim(Arc::new(NoResults::default()), Some(flexi.clone() as Arc<dyn FlexiBusPlanner>));
        let home = GeoPoint::new(46.0, 11.0);
        let mut e = person(home, home, false, Arc::new(Recording::default()));
        let mut flow = Flow::new();
        flow.push(Activity::PlanJourney(PlanJourney::new(GeoPoint::new(46.02, 11.0))));
        step(&mut flow, &mut e, &sim, 60.0);
        sim.planning.dispatch_pending().unwrap().wait();
        step(&mut flow, &mut e, &sim, 60.0);
        assert!(flexi.asked.lock().unwrap().is_empty());
        assert!(flexi.unregistered.lock().unwrap().is_empty());
    }

    #[test]
    fn car_journey_end_to_end() {
        let map = line_map();
        let drive = path(&map, &[0, 1, 2]);
        let sim = sim_with(Arc::new(DriveAlong { path: drive }));
        let rec = Arc::new(Recording::default());
        let home = GeoPoint::new(46.0, 11.0);
        let dest = GeoPoint::new(46.002, 11.0);
        let mut e = person(home, home, true, rec.clone());

        let mut flow = Flow::new();
        flow.push(Activity::PlanJourney(PlanJourney::new(dest)));
        step(&mut flow, &mut e, &sim, 60.0);
        sim.planning.dispatch_pending().unwrap().wait();

        // Results arrive; ranking predicts and consumes the tick.
        step(&mut flow, &mut e, &sim, 60.0);
        assert_eq!(flow.current().unwrap().name(), "RANK_ALTERNATIVES");

        // Choice, expansion, and the whole 16 s drive fit in one tick.
        step(&mut flow, &mut e, &sim, 60.0);
        assert!(flow.is_idle());
        assert_eq!(e.position, dest);
        assert!(e.traveller().unwrap().used_car);
        assert!(e.traveller().unwrap().current_itinerary.is_none());
        assert_eq!(rec.travel_count(), 2);
        assert_eq!(rec.flushes.load(Ordering::SeqCst), 1);
        assert_eq!(map.total_occupancy(), 0);
    }
}

// ── Transit service ───────────────────────────────────────────────────────────

#[cfg(test)]
mod service {
    use super::*;

    #[test]
    fn prepare_trip_expands_the_whole_run() {
        let map = line_map();
        let sim = sim();
        let fleet = Arc::new(Fleet::new(AgencyId::new("TT"), [EntityId(1)]));
        let mut b = bus(1, Arc::clone(&fleet), Arc::new(Recording::default()));

        let mut flow = Flow::new();
        flow.push(Activity::PrepareTrip(PrepareTrip::new(line_trip(&map))));
        step(&mut flow, &mut b, &sim, 60.0);

        let names: Vec<_> = flow.iter().map(|a| a.name()).collect();
        assert_eq!(
            names,
            vec![
                "PICKUP_AND_WAIT",
                "DRIVE_TO_NEXT_STOP",
                "PICKUP_AND_WAIT",
                "DRIVE_TO_NEXT_STOP",
                "PICKUP_AND_WAIT",
                "RETURN_TO_AGENCY",
                "LEARN",
            ]
        );
        let v = b.vehicle().unwrap();
        assert_eq!(v.current_trip.as_ref().unwrap().id.as_str(), "T1");
        assert_eq!(v.current_stop.as_ref().unwrap().id.as_str(), "A");
        assert_eq!(sim.ensembles.members("TransportAgencyTTEnsemble"), vec![EntityId(1)]);
        assert!(sim.ensembles.contains("T1"));
    }

    #[test]
    fn inconsistent_trip_is_fatal() {
        let sim = sim();
        let fleet = Arc::new(Fleet::new(AgencyId::new("TT"), [EntityId(1)]));
        let mut b = bus(1, fleet, Arc::new(Recording::default()));
        let trip = Arc::new(Trip::new(
            TripId::new("bad"),
            RouteId::new("5"),
            vec![stop("A", 46.0), stop("B", 46.001)],
            vec![hm(8, 0), hm(8, 5)],
            Vec::new(),
        ));

        let mut flow = Flow::new();
        flow.push(Activity::PrepareTrip(PrepareTrip::new(trip)));
        let mut ctx = ActivityCtx::new(&mut b, &sim);
        let err = flow.step(60.0, &mut ctx).unwrap_err();
        assert!(matches!(err, FlowError::Transit(TransitError::InconsistentTrip { .. })));
    }

    #[test]
    fn stop_times_past_midnight_roll_over() {
        let trip = Arc::new(Trip::new(
            TripId::new("night"),
            RouteId::new("N"),
            vec![stop("A", 46.0), stop("B", 46.001)],
            vec![hm(23, 55), hm(0, 5)],
            vec![Vec::new()],
        ));
        let times = PrepareTrip::new(trip).schedule(monday(23, 55));
        assert_eq!(times[0], monday(23, 55));
        assert_eq!(times[1], NaiveDate::from_ymd_opt(2026, 3, 3).unwrap().and_time(hm(0, 5)));
    }

    #[test]
    fn pick_up_and_wait_records_departure_delay() {
        let mut sim = sim();
        let rec = Arc::new(Recording::default());
        let fleet = Arc::new(Fleet::new(AgencyId::new("TT"), [EntityId(1)]));
        let mut b = bus(1, fleet, rec.clone());
        let a = stop("A", 46.0);
        let trip = Arc::new(Trip::new(TripId::new("T1"), RouteId::new("5"), vec![Arc::clone(&a)], vec![hm(8, 0)], Vec::new()));
        b.vehicle_mut().unwrap().current_trip = Some(trip);

        let mut flow = Flow::new();
        flow.push(Activity::PickUpAndWait(PickUpAndWait::new(Arc::clone(&a), monday(8, 0))));

        step(&mut flow, &mut b, &sim, 60.0);
        assert!(a.has_waiting_vehicle());
        step(&mut flow, &mut b, &sim, 60.0);
        assert!(a.has_waiting_vehicle(), "must not leave before 08:00 has passed");

        sim.clock.advance();
        step(&mut flow, &mut b, &sim, 60.0);
        assert!(flow.is_idle());
        assert!(!a.has_waiting_vehicle());
        assert_eq!(b.vehicle().unwrap().delay_secs, 60.0);
        assert!(b.vehicle().unwrap().current_stop.is_none());

        let stops = rec.stops();
        assert_eq!(stops.len(), 1);
        assert_eq!(stops[0].delay_secs, 60.0);
        assert_eq!(stops[0].departure_ms - stops[0].arrival_ms, 60_000);
    }

    #[test]
    fn start_next_trips_assigns_each_due_trip_once() {
        let map = line_map();
        let sim = sim();
        let fleet = Arc::new(Fleet::new(AgencyId::new("TT"), [EntityId(1), EntityId(2)]));
        let mut route = Route::new(RouteId::new("5"));
        route.add_trip(0, line_trip(&map));
        let mut agency = TransportAgency::new(AgencyId::new("TT"), Arc::clone(&fleet));
        agency.add_route(route);

        let mut a = Entity::new(
            EntityId(0),
            EntityKind::PublicTransportAgency,
            GeoPoint::new(46.0, 11.0),
            Arc::new(Recording::default()),
            Arc::new(WeightedUtility),
        );
        a.agency = Some(agency);

        let mut flow = Flow::new();
        flow.push(Activity::StartNextTrips(StartNextTrips::new()));
        let mut ctx = ActivityCtx::new(&mut a, &sim);
        assert_eq!(flow.step(60.0, &mut ctx).unwrap(), 0.0);
        let effects = ctx.take_effects();
        assert_eq!(effects.len(), 1);
        let Effect::Assign { target, activity } = &effects[0];
        assert_eq!(*target, EntityId(1));
        assert_eq!(activity.name(), "PREPARE_TRIP");
        assert_eq!(fleet.live(), 1);

        // Same minute again: nothing new.
        flow.step(60.0, &mut ctx).unwrap();
        assert!(ctx.take_effects().is_empty());
        assert_eq!(fleet.live(), 1);
        assert!(!flow.is_idle());
        drop(ctx);
        assert_eq!(sim.ensembles.get("TransportAgencyTTEnsemble").unwrap().creator, EntityId(0));
    }
}

// ── Riding ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod ride {
    use super::*;

    fn transit_leg(start: NaiveDateTime) -> Leg {
        Leg::new(TransportMode::Bus, GeoPoint::new(46.0, 11.0), GeoPoint::new(46.002, 11.0), start, 300.0, Vec::new())
            .with_trip(TripId::new("T1"), StopId::new("A"), StopId::new("C"))
    }

    #[test]
    fn unknown_stop_skips_to_leg_end() {
        let sim = sim();
        let mut e = person(GeoPoint::new(46.0, 11.0), GeoPoint::new(45.0, 11.0), false, Arc::new(Recording::default()));
        let mut flow = Flow::new();
        flow.push(Activity::RideTransit(RideTransit::new(transit_leg(monday(8, 0)))));
        assert_eq!(step(&mut flow, &mut e, &sim, 60.0), 60.0);
        assert_eq!(e.position, GeoPoint::new(46.002, 11.0));
    }

    #[test]
    fn gives_up_after_the_boarding_timeout() {
        let mut sim = sim();
        let a = stop("A", 46.0);
        sim.add_stop(Arc::clone(&a));
        let mut e = person(GeoPoint::new(46.0, 11.0), GeoPoint::new(45.0, 11.0), false, Arc::new(Recording::default()));
        let mut flow = Flow::new();
        flow.push(Activity::RideTransit(RideTransit::new(transit_leg(monday(8, 0)))));

        step(&mut flow, &mut e, &sim, 60.0);
        assert_eq!(a.waiting_person_count(), 1);
        for _ in 0..30 {
            sim.clock.advance();
        }
        step(&mut flow, &mut e, &sim, 60.0);
        assert!(!flow.is_idle(), "08:30 is not past the timeout yet");

        sim.clock.advance();
        step(&mut flow, &mut e, &sim, 60.0);
        assert!(flow.is_idle());
        assert_eq!(a.waiting_person_count(), 0);
        assert_eq!(e.position, GeoPoint::new(46.002, 11.0));
    }

    #[test]
    fn rides_the_matching_vehicle_and_gets_off_at_the_alighting_stop() {
        let map = line_map();
        let mut sim = sim();
        let trip = line_trip(&map);
        for s in &trip.stops {
            sim.add_stop(Arc::clone(s));
        }
        let fleet = Arc::new(Fleet::new(AgencyId::new("TT"), [EntityId(1)]));
        fleet.schedule_trip(&trip.id).unwrap();
        let mut b = bus(1, Arc::clone(&fleet), Arc::new(Recording::default()));
        let rider_knowledge = Arc::new(Recording::default());
        let mut p = person(GeoPoint::new(46.0, 11.0), GeoPoint::new(45.0, 11.0), false, rider_knowledge.clone());

        let mut bus_flow = Flow::new();
        bus_flow.push(Activity::PrepareTrip(PrepareTrip::new(Arc::clone(&trip))));
        let mut rider_flow = Flow::new();
        rider_flow.push(Activity::RideTransit(RideTransit::new(transit_leg(monday(8, 0)))));

        // 08:00: bus parks at A, rider boards.
        step(&mut bus_flow, &mut b, &sim, 60.0);
        step(&mut rider_flow, &mut p, &sim, 60.0);
        assert_eq!(b.vehicle().unwrap().cabin.passenger_count(), 1);

        for _ in 0..15 {
            sim.clock.advance();
            step(&mut bus_flow, &mut b, &sim, 60.0);
            step(&mut rider_flow, &mut p, &sim, 60.0);
        }
        assert!(rider_flow.is_idle());
        assert!(bus_flow.is_idle());
        assert_eq!(p.position, GeoPoint::new(46.002, 11.0));
        assert_eq!(rider_knowledge.travel_count(), 2, "one experience per segment ridden");
        assert_eq!(fleet.available(), 1);
        assert!(!sim.ensembles.contains("T1"));
        assert_eq!(map.total_occupancy(), 0);
    }

    #[test]
    fn riders_still_aboard_leave_when_the_vehicle_returns() {
        let map = line_map();
        let mut sim = sim();
        let trip = line_trip(&map);
        for s in &trip.stops {
            sim.add_stop(Arc::clone(s));
        }
        let fleet = Arc::new(Fleet::new(AgencyId::new("TT"), [EntityId(1)]));
        fleet.schedule_trip(&trip.id).unwrap();
        let mut b = bus(1, Arc::clone(&fleet), Arc::new(Recording::default()));
        let mut p = person(GeoPoint::new(46.001, 11.0), GeoPoint::new(45.0, 11.0), false, Arc::new(Recording::default()));

        // Boards at B, wants A: the trip never serves A again.
        let back_to_a = Leg::new(TransportMode::Bus, GeoPoint::new(46.001, 11.0), GeoPoint::new(46.0, 11.0), monday(8, 0), 300.0, Vec::new())
            .with_trip(TripId::new("T1"), StopId::new("B"), StopId::new("A"));

        let mut bus_flow = Flow::new();
        bus_flow.push(Activity::PrepareTrip(PrepareTrip::new(Arc::clone(&trip))));
        let mut rider_flow = Flow::new();
        rider_flow.push(Activity::RideTransit(RideTransit::new(back_to_a)));

        step(&mut bus_flow, &mut b, &sim, 60.0);
        step(&mut rider_flow, &mut p, &sim, 60.0);
        for _ in 0..20 {
            sim.clock.advance();
            step(&mut bus_flow, &mut b, &sim, 60.0);
            step(&mut rider_flow, &mut p, &sim, 60.0);
        }

        assert!(bus_flow.is_idle());
        assert_eq!(fleet.available(), 1);
        assert!(b.vehicle().unwrap().cabin.is_empty());
        assert!(rider_flow.is_idle(), "rider let off when the trip ended");
        assert_eq!(p.position, GeoPoint::new(46.0, 11.0));
    }
}
