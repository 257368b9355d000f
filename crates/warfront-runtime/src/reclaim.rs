//! Kill-reclaim worker thread.
//!
//! Drains the kill queue off the main tick so variable-cost death
//! bookkeeping never lands inside the frame budget, then posts each
//! request back as a completion for the engine to apply scene-side
//! effects at the next tick boundary.

use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::{debug, trace};

use warfront_core::constants::RECLAIM_BACKOFF_MS;
use warfront_core::kill_queue::{KillCompletion, KillPoll, KillReceiver};

/// Spawn the reclaim worker. It exits when every kill sender is gone or
/// when the completion consumer hangs up.
pub fn spawn_reclaim_worker(
    receiver: KillReceiver,
    completions: mpsc::Sender<KillCompletion>,
) -> JoinHandle<()> {
    std::thread::Builder::new()
        .name("warfront-reclaim".into())
        .spawn(move || run_reclaim_worker(receiver, completions))
        .expect("Failed to spawn reclaim worker thread")
}

fn run_reclaim_worker(receiver: KillReceiver, completions: mpsc::Sender<KillCompletion>) {
    loop {
        match receiver.poll() {
            KillPoll::Request(request) => {
                trace!(
                    network_id = request.network_id,
                    owner = request.owner,
                    "kill request reclaimed"
                );
                if completions.send(KillCompletion { request }).is_err() {
                    debug!("completion consumer gone; reclaim worker exiting");
                    return;
                }
            }
            // An empty queue is "nothing to do": back off briefly
            // instead of spinning.
            KillPoll::Empty => {
                std::thread::sleep(Duration::from_millis(RECLAIM_BACKOFF_MS));
            }
            KillPoll::Disconnected => {
                debug!("all kill senders gone; reclaim worker exiting");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warfront_core::kill_queue::{kill_channel, KillRequest};

    fn request(network_id: u32) -> KillRequest {
        KillRequest {
            victim_bits: 1,
            network_id,
            owner: 2,
            attacker: Some(1),
        }
    }

    #[test]
    fn test_worker_forwards_requests_in_order() {
        let (kill_tx, kill_rx) = kill_channel();
        let (completion_tx, completion_rx) = mpsc::channel();
        let worker = spawn_reclaim_worker(kill_rx, completion_tx);

        for id in [7, 8, 9] {
            kill_tx.send(request(id));
        }

        for expected in [7, 8, 9] {
            let completion = completion_rx
                .recv_timeout(Duration::from_secs(2))
                .expect("completion should arrive");
            assert_eq!(completion.request.network_id, expected);
        }

        drop(kill_tx);
        worker.join().expect("worker should exit cleanly");
    }

    #[test]
    fn test_worker_exits_when_senders_drop() {
        let (kill_tx, kill_rx) = kill_channel();
        let (completion_tx, _completion_rx) = mpsc::channel();
        let worker = spawn_reclaim_worker(kill_rx, completion_tx);

        drop(kill_tx);
        worker.join().expect("worker should exit on disconnect");
    }

    #[test]
    fn test_multiple_producers_single_consumer() {
        let (kill_tx, kill_rx) = kill_channel();
        let (completion_tx, completion_rx) = mpsc::channel();
        let worker = spawn_reclaim_worker(kill_rx, completion_tx);

        let producers: Vec<_> = (0..4u32)
            .map(|i| {
                let tx = kill_tx.clone();
                std::thread::spawn(move || {
                    for j in 0..10u32 {
                        tx.send(request(i * 100 + j));
                    }
                })
            })
            .collect();
        for producer in producers {
            producer.join().unwrap();
        }
        drop(kill_tx);

        let mut received = 0;
        while completion_rx.recv_timeout(Duration::from_secs(2)).is_ok() {
            received += 1;
            if received == 40 {
                break;
            }
        }
        assert_eq!(received, 40, "every request must arrive exactly once");
        worker.join().expect("worker should exit cleanly");
    }
}
