use crate::state::messages::{NetworkRequest, RequestTicket};
use log::{debug, info};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

/// Cancellable periodic poll for the tournament being watched.
///
/// At most one ticker task exists at a time. Each tick sends one
/// `PollTournament` request, and a tick is skipped while the previous poll is
/// still outstanding, so fetch cycles never overlap.
pub struct PollTimer {
    network_requests: mpsc::Sender<NetworkRequest>,
    period: Duration,
    active: Option<ActivePoll>,
}

struct ActivePoll {
    ticket: RequestTicket,
    handle: JoinHandle<()>,
    in_flight: Arc<AtomicBool>,
}

impl PollTimer {
    pub fn new(network_requests: mpsc::Sender<NetworkRequest>, period: Duration) -> Self {
        Self { network_requests, period, active: None }
    }

    pub fn is_active(&self) -> bool {
        self.active.as_ref().is_some_and(|a| !a.handle.is_finished())
    }

    pub fn ticket(&self) -> Option<&RequestTicket> {
        self.active.as_ref().map(|a| &a.ticket)
    }

    /// Start polling for `ticket`. Returns false when that exact poll is
    /// already running; a poll for any other ticket is cancelled first.
    pub fn start(&mut self, ticket: RequestTicket) -> bool {
        if self.is_active() && self.ticket() == Some(&ticket) {
            debug!("poll for tournament {} already running", ticket.tournament_id);
            return false;
        }
        self.stop();

        info!(
            "polling tournament {} every {}s",
            ticket.tournament_id,
            self.period.as_secs_f32()
        );
        let in_flight = Arc::new(AtomicBool::new(false));
        let handle = tokio::spawn(run_ticker(
            self.network_requests.clone(),
            self.period,
            ticket.clone(),
            in_flight.clone(),
        ));
        self.active = Some(ActivePoll { ticket, handle, in_flight });
        true
    }

    /// Cancel the ticker. Returns whether one was running.
    pub fn stop(&mut self) -> bool {
        let Some(active) = self.active.take() else {
            return false;
        };
        active.handle.abort();
        info!("stopped polling tournament {}", active.ticket.tournament_id);
        true
    }

    /// Mark the outstanding poll for `ticket` as answered, re-enabling ticks.
    pub fn complete(&self, ticket: &RequestTicket) {
        if let Some(active) = &self.active
            && &active.ticket == ticket
        {
            active.in_flight.store(false, Ordering::Release);
        }
    }
}

impl Drop for PollTimer {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            active.handle.abort();
        }
    }
}

async fn run_ticker(
    network_requests: mpsc::Sender<NetworkRequest>,
    period: Duration,
    ticket: RequestTicket,
    in_flight: Arc<AtomicBool>,
) {
    let mut ticks = interval(period);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; the first poll waits a full period.
    ticks.tick().await;

    loop {
        ticks.tick().await;
        if in_flight.swap(true, Ordering::AcqRel) {
            debug!("poll for tournament {} still outstanding, skipping tick", ticket.tournament_id);
            continue;
        }
        let request = NetworkRequest::PollTournament { ticket: ticket.clone() };
        if network_requests.send(request).await.is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battlesnake_api::TournamentId;
    use tokio::time::sleep;

    const PERIOD: Duration = Duration::from_secs(5);

    fn ticket(id: u64, generation: u64) -> RequestTicket {
        RequestTicket { tournament_id: TournamentId::from(id), generation }
    }

    fn drain(rx: &mut mpsc::Receiver<NetworkRequest>) -> Vec<NetworkRequest> {
        let mut out = Vec::new();
        while let Ok(request) = rx.try_recv() {
            out.push(request);
        }
        out
    }

    #[tokio::test(start_paused = true)]
    async fn first_poll_waits_a_full_period() {
        let (tx, mut rx) = mpsc::channel(16);
        let mut timer = PollTimer::new(tx, PERIOD);
        timer.start(ticket(1, 0));

        sleep(PERIOD - Duration::from_millis(10)).await;
        assert!(drain(&mut rx).is_empty());

        sleep(Duration::from_millis(20)).await;
        assert_eq!(drain(&mut rx), vec![NetworkRequest::PollTournament { ticket: ticket(1, 0) }]);
    }

    #[tokio::test(start_paused = true)]
    async fn starting_twice_keeps_a_single_ticker() {
        let (tx, mut rx) = mpsc::channel(16);
        let mut timer = PollTimer::new(tx, PERIOD);
        assert!(timer.start(ticket(1, 0)));
        assert!(!timer.start(ticket(1, 0)));

        sleep(PERIOD + Duration::from_millis(10)).await;
        assert_eq!(drain(&mut rx).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_are_skipped_while_a_poll_is_outstanding() {
        let (tx, mut rx) = mpsc::channel(16);
        let mut timer = PollTimer::new(tx, PERIOD);
        timer.start(ticket(1, 0));

        sleep(PERIOD * 3 + Duration::from_millis(10)).await;
        assert_eq!(drain(&mut rx).len(), 1);

        timer.complete(&ticket(1, 0));
        sleep(PERIOD).await;
        assert_eq!(drain(&mut rx).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn completing_a_foreign_ticket_is_ignored() {
        let (tx, mut rx) = mpsc::channel(16);
        let mut timer = PollTimer::new(tx, PERIOD);
        timer.start(ticket(1, 0));

        sleep(PERIOD + Duration::from_millis(10)).await;
        assert_eq!(drain(&mut rx).len(), 1);

        timer.complete(&ticket(2, 0));
        sleep(PERIOD).await;
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn new_ticket_replaces_the_old_ticker() {
        let (tx, mut rx) = mpsc::channel(16);
        let mut timer = PollTimer::new(tx, PERIOD);
        timer.start(ticket(1, 0));
        assert!(timer.start(ticket(2, 1)));

        sleep(PERIOD + Duration::from_millis(10)).await;
        assert_eq!(drain(&mut rx), vec![NetworkRequest::PollTournament { ticket: ticket(2, 1) }]);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_idempotent_and_silences_the_ticker() {
        let (tx, mut rx) = mpsc::channel(16);
        let mut timer = PollTimer::new(tx, PERIOD);
        assert!(!timer.stop());

        timer.start(ticket(1, 0));
        assert!(timer.stop());
        assert!(!timer.stop());
        assert!(!timer.is_active());

        sleep(PERIOD * 2).await;
        assert!(drain(&mut rx).is_empty());
    }
}
