#[cfg(test)]
mod tests {
    use crate::commands::{CommandQueues, NetCommand};
    use crate::enums::*;
    use crate::error::CombatError;
    use crate::events::SimEvent;
    use crate::kill_queue::{kill_channel, KillPoll, KillRequest};
    use crate::pool::SlotPool;
    use crate::target_handle::TargetHandle;
    use crate::types::{Position, SimTime, Velocity};

    fn make_entity() -> hecs::Entity {
        let mut world = hecs::World::new();
        world.spawn(())
    }

    // Entities from separate worlds pack to identical bits, so tests
    // that need two distinct targets must spawn both from one world.
    fn make_entity_pair() -> (hecs::Entity, hecs::Entity) {
        let mut world = hecs::World::new();
        (world.spawn(()), world.spawn(()))
    }

    // ---- Types ----

    #[test]
    fn test_position_range() {
        let a = Position::new(0.0, 0.0, 0.0);
        let b = Position::new(3.0, 4.0, 0.0);
        assert!((a.range_to(&b) - 5.0).abs() < 1e-10);
        assert!((a.horizontal_range_to(&b) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_ground_bearing_in_pi_range() {
        let origin = Position::new(0.0, 0.0, 0.0);

        // Due North (positive Y)
        let north = Position::new(0.0, 100.0, 0.0);
        assert!((origin.ground_bearing_to(&north)).abs() < 1e-10);

        // Due East (positive X)
        let east = Position::new(100.0, 0.0, 0.0);
        assert!((origin.ground_bearing_to(&east) - std::f64::consts::FRAC_PI_2).abs() < 1e-10);

        // Due West stays in [-pi, pi] (atan2, never wrapped to TAU)
        let west = Position::new(-100.0, 0.0, 0.0);
        assert!((origin.ground_bearing_to(&west) + std::f64::consts::FRAC_PI_2).abs() < 1e-10);
    }

    #[test]
    fn test_position_lerp() {
        let a = Position::new(0.0, 0.0, 0.0);
        let b = Position::new(100.0, 200.0, 0.0);
        let mid = a.lerp(&b, 0.5);
        assert!((mid.x - 50.0).abs() < 1e-10);
        assert!((mid.y - 100.0).abs() < 1e-10);
    }

    #[test]
    fn test_velocity_toward() {
        let from = Position::new(0.0, 0.0, 0.0);
        let to = Position::new(100.0, 0.0, 0.0);
        let v = Velocity::toward(&from, &to, 300.0);
        assert!((v.speed() - 300.0).abs() < 1e-9);
        assert!(v.x > 0.0 && v.y.abs() < 1e-9);
    }

    #[test]
    fn test_sim_time_advance() {
        let mut time = SimTime::default();
        for _ in 0..30 {
            time.advance();
        }
        assert_eq!(time.tick, 30);
        // 30 ticks at 30Hz = 1 second
        assert!((time.elapsed_secs - 1.0).abs() < 1e-10);
    }

    // ---- Enums ----

    #[test]
    fn test_target_category_mask() {
        let mask = TargetCategory::VEHICLES | TargetCategory::AIRCRAFT;
        assert!(mask.matches(TargetCategory::of_kind(UnitKind::Vehicle)));
        assert!(mask.matches(TargetCategory::of_kind(UnitKind::Aircraft)));
        assert!(!mask.matches(TargetCategory::of_kind(UnitKind::Building)));
        assert!(!TargetCategory::NONE.matches(TargetCategory::ALL));
    }

    #[test]
    fn test_health_state_serde() {
        let variants = vec![HealthState::Alive, HealthState::Dying, HealthState::Dead];
        for v in variants {
            let json = serde_json::to_string(&v).unwrap();
            let back: HealthState = serde_json::from_str(&json).unwrap();
            assert_eq!(v, back);
        }
    }

    #[test]
    fn test_net_role_serde() {
        let variants = vec![NetRole::SinglePlayer, NetRole::Host, NetRole::Client];
        for v in variants {
            let json = serde_json::to_string(&v).unwrap();
            let back: NetRole = serde_json::from_str(&json).unwrap();
            assert_eq!(v, back);
        }
    }

    // ---- Commands & events ----

    #[test]
    fn test_net_command_serde() {
        let commands = vec![
            NetCommand::StartAttack {
                attacker_id: 1,
                attacker_network_id: 100,
                target_id: 200,
                target_owner: 2,
                origin: OrderOrigin::Player,
            },
            NetCommand::CeaseAttack {
                attacker_network_id: 100,
            },
            NetCommand::KillSceneItem {
                network_id: 200,
                attacker: Some(1),
            },
        ];
        for cmd in &commands {
            let json = serde_json::to_string(cmd).unwrap();
            let back: NetCommand = serde_json::from_str(&json).unwrap();
            assert_eq!(*cmd, back);
        }
    }

    #[test]
    fn test_command_queues_fifo() {
        let mut queues = CommandQueues::new();
        queues.enqueue_for_client(NetCommand::CeaseAttack {
            attacker_network_id: 1,
        });
        queues.enqueue_for_client(NetCommand::CeaseAttack {
            attacker_network_id: 2,
        });
        let drained: Vec<_> = queues.drain_for_client().collect();
        assert_eq!(drained.len(), 2);
        assert_eq!(
            drained[0],
            NetCommand::CeaseAttack {
                attacker_network_id: 1
            }
        );
        assert_eq!(queues.for_client_len(), 0);
    }

    #[test]
    fn test_sim_event_serde() {
        let events = vec![
            SimEvent::HealthBelowHalf { network_id: 7 },
            SimEvent::UnitRemoved {
                network_id: 7,
                owner: 1,
            },
            SimEvent::ProjectileHit {
                target_network_id: 9,
                damage: 15.0,
                position: Position::default(),
            },
        ];
        for event in &events {
            let json = serde_json::to_string(event).unwrap();
            let back: SimEvent = serde_json::from_str(&json).unwrap();
            assert_eq!(*event, back);
        }
    }

    // ---- Errors ----

    #[test]
    fn test_combat_error_display() {
        let err = CombatError::AngleOutOfRange(4.0);
        assert!(err.to_string().contains("4"));
        let err = CombatError::SpawnSlotOutOfRange(7);
        assert!(err.to_string().contains("7"));
    }

    // ---- Pool ----

    #[test]
    fn test_pool_acquire_release_reuse() {
        let mut pool: SlotPool<u32> = SlotPool::new();
        let a = pool.acquire(10);
        let b = pool.acquire(20);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.capacity(), 2);

        assert_eq!(pool.release(a), Some(10));
        assert_eq!(pool.len(), 1);

        // Reacquire reuses the freed slot — capacity does not grow.
        let c = pool.acquire(30);
        assert_eq!(pool.capacity(), 2);
        assert_eq!(pool.get(c), Some(&30));
        assert_eq!(pool.get(b), Some(&20));
    }

    #[test]
    fn test_pool_stale_handle_rejected() {
        let mut pool: SlotPool<u32> = SlotPool::new();
        let a = pool.acquire(10);
        pool.release(a);
        let _b = pool.acquire(20);

        // Old handle points at a reused slot: must not resolve.
        assert_eq!(pool.get(a), None);
        assert_eq!(pool.release(a), None);
    }

    #[test]
    fn test_pool_double_release_noop() {
        let mut pool: SlotPool<u32> = SlotPool::new();
        let a = pool.acquire(10);
        assert_eq!(pool.release(a), Some(10));
        assert_eq!(pool.release(a), None);
        assert_eq!(pool.len(), 0);
    }

    // ---- Target handle ----

    #[test]
    fn test_target_handle_set_get_clear() {
        let handle = TargetHandle::new();
        assert_eq!(handle.get(), None);

        let e = make_entity();
        handle.set(e);
        assert_eq!(handle.get(), Some(e));

        handle.clear();
        assert_eq!(handle.get(), None);
    }

    #[test]
    fn test_target_handle_set_if_empty() {
        let handle = TargetHandle::new();
        let (a, b) = make_entity_pair();

        assert!(handle.set_if_empty(a));
        // Second CAS loses: the slot already has an order.
        assert!(!handle.set_if_empty(b));
        assert_eq!(handle.get(), Some(a));
    }

    #[test]
    fn test_target_handle_clear_if_respects_newer_write() {
        let handle = TargetHandle::new();
        let (a, b) = make_entity_pair();

        handle.set(a);
        handle.set(b);
        // A stale destroyed-notification for `a` must not clear `b`.
        assert!(!handle.clear_if(a));
        assert_eq!(handle.get(), Some(b));
        assert!(handle.clear_if(b));
        assert_eq!(handle.get(), None);
    }

    #[test]
    fn test_target_handle_shared_across_clones() {
        let handle = TargetHandle::new();
        let clone = handle.clone();
        let e = make_entity();
        clone.set(e);
        assert_eq!(handle.get(), Some(e));
    }

    // ---- Kill queue ----

    #[test]
    fn test_kill_channel_delivers_in_order() {
        let (tx, rx) = kill_channel();
        for i in 0..3u32 {
            tx.send(KillRequest {
                victim_bits: (i + 1) as u64,
                network_id: i,
                owner: 1,
                attacker: None,
            });
        }
        for i in 0..3u32 {
            match rx.poll() {
                KillPoll::Request(req) => assert_eq!(req.network_id, i),
                other => panic!("expected request {i}, got {other:?}"),
            }
        }
        assert!(matches!(rx.poll(), KillPoll::Empty));
    }

    #[test]
    fn test_kill_channel_disconnect() {
        let (tx, rx) = kill_channel();
        drop(tx);
        assert!(matches!(rx.poll(), KillPoll::Disconnected));
    }

    #[test]
    fn test_kill_channel_multi_producer() {
        let (tx, rx) = kill_channel();
        let tx2 = tx.clone();
        let h = std::thread::spawn(move || {
            tx2.send(KillRequest {
                victim_bits: 1,
                network_id: 99,
                owner: 2,
                attacker: Some(1),
            });
        });
        h.join().unwrap();
        match rx.poll() {
            KillPoll::Request(req) => assert_eq!(req.network_id, 99),
            other => panic!("expected cross-thread request, got {other:?}"),
        }
    }
}
