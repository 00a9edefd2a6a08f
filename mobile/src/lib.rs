// health-mobile — Native mobile bindings for iOS and Android
// This crate exports the Health Core API via UniFFI

pub use health_core::*;

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{mpsc, Arc, Weak};
    use std::time::Duration;

    struct FakeHealthKit {
        grant: bool,
    }

    impl AppleHealthSource for FakeHealthKit {
        fn init_health_kit(
            &self,
            read: Vec<String>,
            write: Vec<String>,
        ) -> Result<(), SourceError> {
            assert_eq!(read, vec!["StepCount", "DistanceWalkingRunning"]);
            assert!(write.is_empty());
            if self.grant {
                Ok(())
            } else {
                Err(SourceError::Denied {
                    reason: "Permission was declined".into(),
                })
            }
        }

        fn get_step_count(&self, query: StepCountQuery) -> Result<HealthValue, SourceError> {
            assert!(!query.include_manually_added);
            Ok(HealthValue {
                value: 1200.0,
                start_date: None,
                end_date: None,
            })
        }

        fn get_distance_walking_running(
            &self,
            query: DistanceQuery,
        ) -> Result<HealthValue, SourceError> {
            assert_eq!(query.unit, "mile");
            Ok(HealthValue {
                value: 3.2,
                start_date: None,
                end_date: None,
            })
        }
    }

    struct FakeGoogleFit;

    impl GoogleFitSource for FakeGoogleFit {
        fn authorize(&self, scopes: Vec<String>) -> Result<AuthorizeOutcome, SourceError> {
            assert_eq!(scopes.len(), 3);
            Ok(AuthorizeOutcome {
                success: true,
                message: None,
            })
        }

        fn get_daily_steps(&self) -> Result<Vec<StepSourceBucket>, SourceError> {
            Err(SourceError::Failed {
                reason: "fitness api unreachable".into(),
            })
        }

        fn get_daily_distance_samples(
            &self,
            window: DayWindow,
        ) -> Result<Vec<DistanceSample>, SourceError> {
            Ok(vec![DistanceSample {
                distance: Some(1609.344),
                start_date: window.start_date,
                end_date: window.end_date,
            }])
        }
    }

    struct ChannelObserver(Mutex<mpsc::Sender<()>>);

    impl AvailabilityObserver for ChannelObserver {
        fn on_availability_changed(&self) {
            let _ = self.0.lock().send(());
        }
    }

    /// Reads the step count back through the bridge on its first notification
    struct StepReader {
        bridge: Weak<HealthBridge>,
        fired: AtomicBool,
        results: Mutex<mpsc::Sender<Result<u64, BridgeError>>>,
    }

    impl AvailabilityObserver for StepReader {
        fn on_availability_changed(&self) {
            if self.fired.swap(true, Ordering::SeqCst) {
                return;
            }
            let steps = match self.bridge.upgrade() {
                Some(bridge) => bridge.get_steps_count(),
                None => return,
            };
            let _ = self.results.lock().send(steps);
        }
    }

    fn ios_bridge(grant: bool) -> HealthBridge {
        HealthBridge::for_ios(Box::new(FakeHealthKit { grant }), BridgeSettings::default())
            .expect("Failed to create bridge")
    }

    #[test]
    fn test_ios_bridge_lifecycle() {
        let bridge = ios_bridge(true);

        assert!(bridge.initialize());
        assert!(bridge.is_available());
        assert_eq!(bridge.platform_tag(), "ios");
        assert_eq!(bridge.get_steps_count().unwrap(), 1200);
        assert_eq!(bridge.get_distance_walking().unwrap(), 3.2);
    }

    #[test]
    fn test_ios_bridge_denied() {
        let bridge = ios_bridge(false);

        assert!(!bridge.initialize());
        assert!(bridge
            .last_init_error()
            .unwrap()
            .contains("Permission was declined"));
        assert_eq!(bridge.get_steps_count().unwrap(), 0);
    }

    #[test]
    fn test_android_bridge_query_error_and_conversion() {
        let bridge =
            HealthBridge::for_android(Box::new(FakeGoogleFit), BridgeSettings::default()).unwrap();
        assert!(bridge.initialize());

        let miles = bridge.get_distance_walking().unwrap();
        assert!((miles - 1.0).abs() < 1e-9);

        match bridge.get_steps_count() {
            Err(BridgeError::Query { reason }) => {
                assert!(reason.contains("fitness api unreachable"))
            }
            other => panic!("expected query error, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_platform_is_unsupported() {
        let bridge =
            HealthBridge::for_platform("unknown".to_string(), BridgeSettings::default()).unwrap();

        assert!(!bridge.initialize());
        assert_eq!(
            bridge.last_init_error().as_deref(),
            Some("Platform not supported: unknown")
        );
        assert_eq!(bridge.get_distance_walking().unwrap(), 0.0);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let settings = BridgeSettings {
            query_timeout_ms: Some(0),
            ..BridgeSettings::default()
        };
        match HealthBridge::for_platform("ios".to_string(), settings) {
            Err(BridgeError::InvalidSettings { reason }) => {
                assert!(reason.contains("query_timeout_ms"))
            }
            Err(other) => panic!("expected invalid settings, got {:?}", other),
            Ok(_) => panic!("zero query timeout was accepted"),
        }
    }

    #[test]
    fn test_observer_can_query_bridge() {
        let bridge = Arc::new(ios_bridge(true));
        let (tx, rx) = mpsc::channel();
        let _subscription = bridge.subscribe(Box::new(StepReader {
            bridge: Arc::downgrade(&bridge),
            fired: AtomicBool::new(false),
            results: Mutex::new(tx),
        }));

        assert!(bridge.initialize());

        let steps = rx
            .recv_timeout(Duration::from_secs(2))
            .expect("observer never reported a step count");
        assert_eq!(steps, Ok(1200));
    }

    #[test]
    fn test_subscription_cancel() {
        let bridge = ios_bridge(true);

        let (tx, rx) = mpsc::channel();
        let subscription = bridge.subscribe(Box::new(ChannelObserver(Mutex::new(tx))));
        assert!(subscription.is_active());

        assert!(bridge.initialize());
        rx.recv_timeout(Duration::from_secs(2))
            .expect("observer was not notified");

        subscription.cancel();
        assert!(!subscription.is_active());

        // Launch-time delivery may still be in flight
        while rx.recv_timeout(Duration::from_millis(100)).is_ok() {}

        bridge.initialize();
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
    }

    #[test]
    fn test_meters_to_miles_export() {
        assert!((meters_to_miles(1609.344) - 1.0).abs() < f64::EPSILON);
    }
}
