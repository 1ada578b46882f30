//! Unit tests for um-core primitives.

#[cfg(test)]
mod ids {
    use crate::{EntityId, NodeId, SegmentId, TripId};

    #[test]
    fn index_roundtrip() {
        let id = EntityId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(EntityId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(EntityId::INVALID.0, u32::MAX);
        assert_eq!(NodeId::INVALID.0, u32::MAX);
        assert_eq!(SegmentId::default(), SegmentId::INVALID);
    }

    #[test]
    fn display() {
        assert_eq!(EntityId(7).to_string(), "EntityId(7)");
        assert_eq!(TripId::new("T-17").to_string(), "T-17");
    }

    #[test]
    fn named_ids_order_by_string() {
        let mut ids = vec![TripId::from("b"), TripId::from("a"), TripId::from("c")];
        ids.sort();
        let names: Vec<&str> = ids.iter().map(TripId::as_str).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }
}

#[cfg(test)]
mod geo {
    use crate::GeoPoint;

    #[test]
    fn zero_distance() {
        let p = GeoPoint::new(46.0667, 11.1167);
        assert!(p.distance_m(p) < 1e-6);
    }

    #[test]
    fn one_degree_latitude() {
        let a = GeoPoint::new(46.0, 11.0);
        let b = GeoPoint::new(47.0, 11.0);
        let d = a.distance_m(b);
        assert!((d - 111_195.0).abs() < 50.0, "got {d}");
    }

    #[test]
    fn lerp_endpoints_and_midpoint() {
        let a = GeoPoint::new(46.0, 11.0);
        let b = GeoPoint::new(46.01, 11.0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 7.0), b);
        let mid = a.lerp(b, 0.5);
        assert!((a.distance_m(mid) - mid.distance_m(b)).abs() < 0.01);
    }
}

#[cfg(test)]
mod time {
    use chrono::{NaiveDate, NaiveTime};

    use crate::{CoreError, MAX_TICK_SECS, SimClock, SimConfig, Tick};

    fn monday_morning() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(6, 0, 0)
            .unwrap()
    }

    #[test]
    fn tick_arithmetic() {
        let t = Tick(10);
        assert_eq!(t + 5, Tick(15));
        assert_eq!(Tick(15) - Tick(10), 5u64);
    }

    #[test]
    fn clock_reads_tick_start() {
        let mut clock = SimClock::new(monday_morning(), 30);
        assert_eq!(clock.delta_t(), 30.0);
        for _ in 0..4 {
            clock.advance();
        }
        assert_eq!(clock.elapsed_secs(), 120);
        assert_eq!(clock.now().time(), NaiveTime::from_hms_opt(6, 2, 0).unwrap());
    }

    #[test]
    fn clock_crosses_midnight() {
        let mut clock = SimClock::new(monday_morning(), 3_600);
        for _ in 0..18 {
            clock.advance();
        }
        assert_eq!(clock.now().date(), NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(clock.to_string(), "T18 (2024-03-05 00:00:00)");
    }

    #[test]
    fn timestamp_ms_tracks_ticks() {
        let mut clock = SimClock::new(monday_morning(), 10);
        let t0 = clock.timestamp_ms();
        clock.advance();
        assert_eq!(clock.timestamp_ms() - t0, 10_000);
    }

    fn config(tick_duration_secs: u32) -> SimConfig {
        SimConfig {
            start: monday_morning(),
            tick_duration_secs,
            total_ticks: 10,
            seed: 1,
            output_interval_ticks: 0,
        }
    }

    #[test]
    fn config_rejects_zero_step() {
        assert!(config(0).validate().is_err());
    }

    #[test]
    fn config_rejects_steps_longer_than_a_minute() {
        assert!(config(MAX_TICK_SECS).validate().is_ok());
        assert!(config(1).validate().is_ok());
        let err = config(MAX_TICK_SECS + 1).validate().unwrap_err();
        assert!(matches!(err, CoreError::Config(ref msg) if msg.contains("61")));
    }
}

#[cfg(test)]
mod transport {
    use crate::{CoreError, TransportMode};

    #[test]
    fn encoding_is_stable_and_invertible() {
        assert_eq!(TransportMode::Walk.encoding(), 0);
        assert_eq!(TransportMode::FlexiBus.encoding(), 7);
        for mode in TransportMode::ALL {
            assert_eq!(TransportMode::from_encoding(mode.encoding()), Some(mode));
        }
        assert_eq!(TransportMode::from_encoding(99), None);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("cable_car".parse::<TransportMode>().unwrap(), TransportMode::CableCar);
        assert_eq!(" BUS ".parse::<TransportMode>().unwrap(), TransportMode::Bus);
    }

    #[test]
    fn unknown_mode_is_error() {
        let err = "hovercraft".parse::<TransportMode>().unwrap_err();
        assert!(matches!(err, CoreError::UnknownMode(ref s) if s == "hovercraft"));
    }
}

#[cfg(test)]
mod rng {
    use chrono::TimeDelta;

    use crate::{EntityId, EntityRng};

    #[test]
    fn entity_rng_is_deterministic() {
        let mut a = EntityRng::new(42, EntityId(3));
        let mut b = EntityRng::new(42, EntityId(3));
        let xs: Vec<u32> = (0..8).map(|_| a.gen_range(0..1_000)).collect();
        let ys: Vec<u32> = (0..8).map(|_| b.gen_range(0..1_000)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn different_entities_diverge() {
        let mut a = EntityRng::new(42, EntityId(0));
        let mut b = EntityRng::new(42, EntityId(1));
        let xs: Vec<u32> = (0..8).map(|_| a.gen_range(0..u32::MAX)).collect();
        let ys: Vec<u32> = (0..8).map(|_| b.gen_range(0..u32::MAX)).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn jitter_stays_inside_the_window() {
        let mut rng = EntityRng::new(7, EntityId(0));
        for _ in 0..200 {
            let j = rng.jitter_minutes(TimeDelta::minutes(90));
            assert!(j >= TimeDelta::zero() && j < TimeDelta::minutes(90));
            assert_eq!(j.num_seconds() % 60, 0);
        }
        assert_eq!(rng.jitter_minutes(TimeDelta::seconds(30)), TimeDelta::zero());
    }

    #[test]
    fn choose_from_empty_is_none() {
        let mut rng = EntityRng::new(7, EntityId(0));
        assert!(rng.choose::<u8>(&[]).is_none());
        assert_eq!(rng.choose(&[5]), Some(&5));
    }
}
