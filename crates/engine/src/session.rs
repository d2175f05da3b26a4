//! Session - routes player intents to whichever state currently owns the game
//!
//! A session is in one of three places: the landing screen (no mode), remote
//! play against the authority, or local play against the AI. Each mode carries
//! the capability it needs, so nothing outside the active variant can touch
//! the game:
//!
//! - [`Mode::Remote`] holds the sync link. Moves are forwarded; the displayed
//!   state is the mirror, and only link events write it.
//! - [`Mode::Local`] holds the local simulation and the pending AI deadline.
//!
//! The session is synchronous. The presentation loop calls [`Session::tick`]
//! with its clock; that is where link events are drained and the AI moves.

use std::collections::VecDeque;

use crate::config::SessionConfig;
use crate::core::{select_move, GameState, MoveContext, MoveError, SimpleRng};
use crate::sync::{LinkHandle, MirrorSource, SyncCommand, SyncEvent, SyncRuntime};
use crate::types::{Move, NextBoard, Side, BOARD_COUNT, CELL_COUNT};

/// Opens links to the authority.
pub trait Connector {
    fn open(&mut self) -> LinkHandle;
}

impl Connector for SyncRuntime {
    fn open(&mut self) -> LinkHandle {
        self.open_link()
    }
}

/// Remote play: the link and its submission bookkeeping.
pub struct RemoteLink {
    link: LinkHandle,
    /// Ticket of the submission awaiting the authority.
    in_flight: Option<u64>,
    next_ticket: u64,
    degraded: bool,
    /// Session clock when the authority last accepted one of our moves.
    last_accepted_ms: Option<u64>,
}

/// Local play: the simulation and the AI opponent.
#[derive(Debug, Clone)]
pub struct LocalGame {
    state: GameState,
    ai_side: Side,
    ai_due_ms: Option<u64>,
}

pub enum Mode {
    Remote(RemoteLink),
    Local(LocalGame),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeKind {
    Remote,
    Local,
}

impl Mode {
    pub fn kind(&self) -> ModeKind {
        match self {
            Mode::Remote(_) => ModeKind::Remote,
            Mode::Local(_) => ModeKind::Local,
        }
    }
}

/// Result of a move intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Applied to the local simulation.
    Applied,
    /// Forwarded to the authority; the mirror updates when it answers.
    Submitted,
    Rejected(MoveError),
    /// A submission or AI move is still pending; the intent was ignored.
    Busy,
    /// No game is active (landing screen).
    Inactive,
    /// The link is gone; nothing was sent.
    Unavailable,
}

/// Something the presentation layer should tell the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Rejected(String),
    MoveFailed(String),
    Degraded(String),
    Restored,
    AiMoved(Move),
    Chat { sender: String, text: String },
}

/// Read-only view of the session for status lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStatus {
    pub mode: Option<ModeKind>,
    pub side: Option<Side>,
    pub degraded: bool,
    pub awaiting_authority: bool,
    pub ai_thinking: bool,
    pub cooldown_remaining_ms: u64,
}

pub struct Session<C: Connector> {
    connector: C,
    config: SessionConfig,
    side: Option<Side>,
    mirror: GameState,
    mode: Option<Mode>,
    rng: SimpleRng,
    notices: VecDeque<Notice>,
}

impl<C: Connector> Session<C> {
    pub fn new(connector: C, config: SessionConfig, seed: u32) -> Self {
        Self {
            connector,
            config,
            side: None,
            mirror: GameState::new(),
            mode: None,
            rng: SimpleRng::new(seed),
            notices: VecDeque::new(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn side(&self) -> Option<Side> {
        self.side
    }

    pub fn mode(&self) -> Option<ModeKind> {
        self.mode.as_ref().map(Mode::kind)
    }

    /// The authority's state as last seen, whatever the current mode.
    pub fn mirror(&self) -> &GameState {
        &self.mirror
    }

    /// The state the board should show; `None` on the landing screen.
    pub fn displayed(&self) -> Option<&GameState> {
        match &self.mode {
            Some(Mode::Remote(_)) => Some(&self.mirror),
            Some(Mode::Local(local)) => Some(&local.state),
            None => None,
        }
    }

    /// Start (or restart) remote play as `side`.
    ///
    /// Any local game and pending AI move are dropped; the new link fetches a
    /// snapshot immediately and then polls.
    pub fn enter_remote(&mut self, side: Side) {
        self.mode = None;
        self.side = Some(side);
        let link = self.connector.open();
        self.mode = Some(Mode::Remote(RemoteLink {
            link,
            in_flight: None,
            next_ticket: 1,
            degraded: false,
            last_accepted_ms: None,
        }));
        log::info!("[Session] remote play as {}", side.as_str());
    }

    /// Start a fresh local game against the AI.
    ///
    /// The remote link is dropped (its polling stops) and the mirror is left as
    /// it was. If the human takes O, the AI opens.
    pub fn enter_local(&mut self, side: Side, now_ms: u64) {
        self.mode = None;
        self.side = Some(side);
        let local = self.fresh_local(side, now_ms);
        self.mode = Some(Mode::Local(local));
        log::info!("[Session] local play as {} against the AI", side.as_str());
    }

    /// Back to the landing screen: everything is dropped.
    pub fn leave(&mut self) {
        if self.mode.take().is_some() {
            log::info!("[Session] back to start");
        }
        self.side = None;
        self.mirror = GameState::new();
    }

    /// Start the current game over. Returns false when there is nothing to reset.
    pub fn reset(&mut self, now_ms: u64) -> bool {
        let Some(side) = self.side else {
            return false;
        };
        match self.mode() {
            Some(ModeKind::Local) => {
                let local = self.fresh_local(side, now_ms);
                self.mode = Some(Mode::Local(local));
                log::info!("[Session] local game reset");
                true
            }
            Some(ModeKind::Remote) => {
                let sent = match &self.mode {
                    Some(Mode::Remote(remote)) => remote.link.send(SyncCommand::Reset),
                    _ => false,
                };
                if !sent {
                    self.notices
                        .push_back(Notice::Degraded("link closed".to_string()));
                }
                sent
            }
            None => false,
        }
    }

    /// Pass a chat line to the authority. Only meaningful in remote play.
    pub fn send_chat(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        match (&self.mode, self.side) {
            (Some(Mode::Remote(remote)), Some(side)) => remote.link.send(SyncCommand::Chat {
                side,
                text: text.to_string(),
            }),
            _ => false,
        }
    }

    /// Handle a "place my mark here" intent.
    pub fn submit_move(&mut self, mv: Move, now_ms: u64) -> MoveOutcome {
        let Some(side) = self.side else {
            return MoveOutcome::Inactive;
        };

        let outcome = match &mut self.mode {
            None => return MoveOutcome::Inactive,
            Some(Mode::Remote(remote)) => {
                if remote.in_flight.is_some() {
                    return MoveOutcome::Busy;
                }
                let cooldown_ms = self.config.move_cooldown_ms;
                let ticket = remote.next_ticket;
                if let Err(e) = precheck_remote(&self.mirror, remote, mv, now_ms, cooldown_ms) {
                    MoveOutcome::Rejected(e)
                } else if remote.link.send(SyncCommand::SubmitMove { ticket, side, mv }) {
                    remote.next_ticket += 1;
                    remote.in_flight = Some(ticket);
                    MoveOutcome::Submitted
                } else {
                    MoveOutcome::Unavailable
                }
            }
            Some(Mode::Local(local)) => {
                if local.ai_due_ms.is_some() {
                    return MoveOutcome::Busy;
                }
                match local.state.apply_move(side, mv, MoveContext::automated(now_ms)) {
                    Ok(()) => {
                        if !local.state.game_over() {
                            let delay = self
                                .rng
                                .range_inclusive(self.config.ai_delay_min_ms, self.config.ai_delay_max_ms);
                            local.ai_due_ms = Some(now_ms + delay);
                        }
                        MoveOutcome::Applied
                    }
                    Err(e) => MoveOutcome::Rejected(e),
                }
            }
        };

        match outcome {
            MoveOutcome::Rejected(e) => self.notices.push_back(Notice::Rejected(e.to_string())),
            MoveOutcome::Unavailable => self
                .notices
                .push_back(Notice::Degraded("link closed".to_string())),
            _ => {}
        }
        outcome
    }

    /// Advance the session to `now_ms`: drain link events, play a due AI move.
    pub fn tick(&mut self, now_ms: u64) {
        match &mut self.mode {
            Some(Mode::Remote(remote)) => {
                while let Some(event) = remote.link.try_recv() {
                    apply_event(&mut self.mirror, remote, &mut self.notices, event, now_ms);
                }
            }
            Some(Mode::Local(local)) => {
                let due = matches!(local.ai_due_ms, Some(due) if now_ms >= due);
                if due {
                    local.ai_due_ms = None;
                    match select_move(&local.state, local.ai_side, &mut self.rng) {
                        Ok(mv) => {
                            let ctx = MoveContext::automated(now_ms);
                            match local.state.apply_move(local.ai_side, mv, ctx) {
                                Ok(()) => self.notices.push_back(Notice::AiMoved(mv)),
                                Err(e) => log::warn!("[Session] AI chose an illegal move {:?}: {}", mv, e),
                            }
                        }
                        Err(e) => log::warn!("[Session] AI could not move: {}", e),
                    }
                }
            }
            None => {}
        }
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    pub fn status(&self, now_ms: u64) -> SessionStatus {
        let mut status = SessionStatus {
            mode: self.mode(),
            side: self.side,
            degraded: false,
            awaiting_authority: false,
            ai_thinking: false,
            cooldown_remaining_ms: 0,
        };
        match &self.mode {
            Some(Mode::Remote(remote)) => {
                status.degraded = remote.degraded;
                status.awaiting_authority = remote.in_flight.is_some();
                status.cooldown_remaining_ms = remote
                    .last_accepted_ms
                    .map(|last| last.saturating_add(self.config.move_cooldown_ms).saturating_sub(now_ms))
                    .unwrap_or(0);
            }
            Some(Mode::Local(local)) => status.ai_thinking = local.ai_due_ms.is_some(),
            None => {}
        }
        status
    }

    fn fresh_local(&mut self, side: Side, now_ms: u64) -> LocalGame {
        let ai_side = side.opponent();
        // X always opens.
        let ai_due_ms = (ai_side == Side::X).then(|| {
            now_ms
                + self
                    .rng
                    .range_inclusive(self.config.ai_delay_min_ms, self.config.ai_delay_max_ms)
        });
        LocalGame {
            state: GameState::new(),
            ai_side,
            ai_due_ms,
        }
    }
}

/// Reject intents the authority would certainly refuse, without a round trip.
fn precheck_remote(
    mirror: &GameState,
    remote: &RemoteLink,
    mv: Move,
    now_ms: u64,
    cooldown_ms: u64,
) -> Result<(), MoveError> {
    if mv.board as usize >= BOARD_COUNT || mv.cell as usize >= CELL_COUNT {
        return Err(MoveError::OutOfRange {
            board: mv.board,
            cell: mv.cell,
        });
    }
    if let Some(last) = remote.last_accepted_ms {
        let ready_at = last.saturating_add(cooldown_ms);
        if now_ms < ready_at {
            return Err(MoveError::CooldownActive {
                remaining_ms: ready_at - now_ms,
            });
        }
    }
    match mirror.next_board() {
        NextBoard::Board(required) if required != mv.board => Err(MoveError::WrongBoard { required }),
        _ => Ok(()),
    }
}

fn apply_event(
    mirror: &mut GameState,
    remote: &mut RemoteLink,
    notices: &mut VecDeque<Notice>,
    event: SyncEvent,
    now_ms: u64,
) {
    match event {
        SyncEvent::Replace { state, source } => {
            *mirror = state;
            if let MirrorSource::MoveResult { ticket } = source {
                remote.last_accepted_ms = Some(now_ms);
                settle(remote, ticket);
            }
            if remote.degraded {
                remote.degraded = false;
                notices.push_back(Notice::Restored);
            }
        }
        SyncEvent::MoveRejected { ticket, reason } => {
            settle(remote, ticket);
            notices.push_back(Notice::Rejected(reason));
        }
        SyncEvent::MoveFailed { ticket, reason } => {
            settle(remote, ticket);
            notices.push_back(Notice::MoveFailed(reason));
        }
        SyncEvent::Degraded { reason } => {
            if !remote.degraded {
                remote.degraded = true;
                notices.push_back(Notice::Degraded(reason));
            }
        }
        SyncEvent::Chat { sender, text } => notices.push_back(Notice::Chat { sender, text }),
    }
}

/// Clear the in-flight submission if `ticket` answers it. Late answers to
/// earlier submissions leave a newer one waiting.
fn settle(remote: &mut RemoteLink, ticket: Option<u64>) {
    if ticket.is_some() && ticket == remote.in_flight {
        remote.in_flight = None;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::sync::{link_pair, LinkPeer};

    #[derive(Default, Clone)]
    struct FakeConnector {
        peers: Rc<RefCell<Vec<LinkPeer>>>,
    }

    impl Connector for FakeConnector {
        fn open(&mut self) -> LinkHandle {
            let (handle, peer) = link_pair();
            self.peers.borrow_mut().push(peer);
            handle
        }
    }

    fn mv(board: u8, cell: u8) -> Move {
        Move::new(board, cell).unwrap()
    }

    fn remote_session() -> (Session<FakeConnector>, FakeConnector) {
        let connector = FakeConnector::default();
        let mut session = Session::new(connector.clone(), SessionConfig::default(), 7);
        session.enter_remote(Side::X);
        (session, connector)
    }

    #[test]
    fn landing_screen_ignores_moves() {
        let mut session = Session::new(FakeConnector::default(), SessionConfig::default(), 1);
        assert_eq!(session.submit_move(mv(0, 0), 0), MoveOutcome::Inactive);
        assert!(session.displayed().is_none());
        assert!(!session.reset(0));
    }

    #[test]
    fn local_move_schedules_one_ai_reply() {
        let mut session = Session::new(FakeConnector::default(), SessionConfig::default(), 3);
        session.enter_local(Side::X, 0);

        assert_eq!(session.submit_move(mv(4, 4), 100), MoveOutcome::Applied);
        assert!(session.status(100).ai_thinking);
        assert_eq!(session.submit_move(mv(4, 0), 150), MoveOutcome::Busy);

        session.tick(100 + 499);
        assert_eq!(session.displayed().unwrap().move_count(), 1);

        session.tick(100 + 1500);
        assert_eq!(session.displayed().unwrap().move_count(), 2);
        session.tick(100 + 5000);
        assert_eq!(session.displayed().unwrap().move_count(), 2);

        let notices = session.drain_notices();
        assert_eq!(notices.len(), 1);
        assert!(matches!(notices[0], Notice::AiMoved(m) if m.board == 4));
    }

    #[test]
    fn local_rejection_leaves_state() {
        let mut session = Session::new(FakeConnector::default(), SessionConfig::instant(), 3);
        session.enter_local(Side::X, 0);
        session.submit_move(mv(4, 0), 0);
        session.tick(0);

        let before = session.displayed().unwrap().clone();
        let outcome = session.submit_move(mv(8, 8), 10);
        assert!(matches!(outcome, MoveOutcome::Rejected(MoveError::WrongBoard { .. })));
        assert_eq!(session.displayed().unwrap(), &before);
        assert!(matches!(session.drain_notices().last(), Some(Notice::Rejected(_))));
    }

    #[test]
    fn ai_opens_when_human_takes_o() {
        let mut session = Session::new(FakeConnector::default(), SessionConfig::instant(), 11);
        session.enter_local(Side::O, 0);
        assert_eq!(session.submit_move(mv(4, 4), 0), MoveOutcome::Busy);
        session.tick(0);
        let state = session.displayed().unwrap();
        assert_eq!(state.move_count(), 1);
        assert!(state.boards().iter().flatten().any(|c| *c == Some(Side::X)));
    }

    #[test]
    fn switching_to_remote_cancels_pending_ai() {
        let mut session = Session::new(FakeConnector::default(), SessionConfig::default(), 5);
        session.enter_local(Side::X, 0);
        session.submit_move(mv(0, 0), 0);

        session.enter_remote(Side::X);
        session.tick(10_000);
        assert_eq!(session.mode(), Some(ModeKind::Remote));
        assert_eq!(session.displayed().unwrap(), &GameState::new());
        assert!(session.drain_notices().is_empty());
    }

    #[test]
    fn remote_move_waits_for_authority() {
        let (mut session, connector) = remote_session();

        assert_eq!(session.submit_move(mv(4, 0), 0), MoveOutcome::Submitted);
        assert_eq!(session.submit_move(mv(0, 0), 5000), MoveOutcome::Busy);
        // Nothing is applied speculatively.
        assert_eq!(session.displayed().unwrap(), &GameState::new());

        let mut peers = connector.peers.borrow_mut();
        let peer = &mut peers[0];
        assert_eq!(
            peer.cmd_rx.try_recv().ok(),
            Some(SyncCommand::SubmitMove {
                ticket: 1,
                side: Side::X,
                mv: mv(4, 0)
            })
        );

        let mut applied = GameState::new();
        applied
            .apply_move(Side::X, mv(4, 0), MoveContext::automated(0))
            .unwrap();
        peer.event_tx
            .send(SyncEvent::Replace {
                state: applied.clone(),
                source: MirrorSource::MoveResult { ticket: Some(1) },
            })
            .unwrap();
        drop(peers);

        session.tick(10);
        assert_eq!(session.displayed().unwrap(), &applied);
        assert!(!session.status(10).awaiting_authority);
    }

    fn answer(connector: &FakeConnector, event: SyncEvent) {
        connector.peers.borrow()[0].event_tx.send(event).unwrap();
    }

    fn accepted(state: &GameState, ticket: Option<u64>) -> SyncEvent {
        SyncEvent::Replace {
            state: state.clone(),
            source: MirrorSource::MoveResult { ticket },
        }
    }

    #[test]
    fn remote_precheck_and_cooldown() {
        let (mut session, connector) = remote_session();
        let mut state = GameState::new();
        state
            .apply_move(Side::O, mv(2, 6), MoveContext::automated(0))
            .unwrap();
        answer(
            &connector,
            SyncEvent::Replace {
                state: state.clone(),
                source: MirrorSource::Push,
            },
        );
        session.tick(0);

        assert_eq!(
            session.submit_move(mv(5, 0), 0),
            MoveOutcome::Rejected(MoveError::WrongBoard { required: 6 })
        );
        assert_eq!(session.submit_move(mv(6, 0), 0), MoveOutcome::Submitted);

        state
            .apply_move(Side::X, mv(6, 0), MoveContext::automated(0))
            .unwrap();
        answer(&connector, accepted(&state, Some(1)));
        session.tick(100);

        assert_eq!(
            session.submit_move(mv(0, 1), 200),
            MoveOutcome::Rejected(MoveError::CooldownActive { remaining_ms: 1900 })
        );
        assert_eq!(session.status(200).cooldown_remaining_ms, 1900);
        assert_eq!(session.submit_move(mv(0, 1), 2100), MoveOutcome::Submitted);
    }

    #[test]
    fn rejected_move_can_be_corrected_right_away() {
        let (mut session, connector) = remote_session();

        assert_eq!(session.submit_move(mv(0, 0), 10_000), MoveOutcome::Submitted);
        answer(
            &connector,
            SyncEvent::MoveRejected {
                ticket: Some(1),
                reason: "Cell already taken".to_string(),
            },
        );
        session.tick(10_050);

        assert_eq!(session.mirror().last_move_ms(), None);
        assert_eq!(session.status(10_100).cooldown_remaining_ms, 0);
        assert_eq!(session.submit_move(mv(0, 1), 10_100), MoveOutcome::Submitted);
    }

    #[test]
    fn late_answer_does_not_release_newer_submission() {
        let (mut session, connector) = remote_session();

        assert_eq!(session.submit_move(mv(4, 0), 0), MoveOutcome::Submitted);
        answer(
            &connector,
            SyncEvent::MoveFailed {
                ticket: Some(1),
                reason: "request 2 timed out".to_string(),
            },
        );
        session.tick(3_000);
        assert_eq!(session.submit_move(mv(4, 1), 3_000), MoveOutcome::Submitted);

        // The first move's answer turns up after it was given up on.
        let mut state = GameState::new();
        state
            .apply_move(Side::X, mv(4, 0), MoveContext::automated(0))
            .unwrap();
        answer(&connector, accepted(&state, None));
        session.tick(3_100);

        assert_eq!(session.mirror(), &state);
        assert!(session.status(3_100).awaiting_authority);
        assert_eq!(session.submit_move(mv(0, 0), 9_000), MoveOutcome::Busy);

        answer(
            &connector,
            SyncEvent::MoveRejected {
                ticket: Some(2),
                reason: "Cell already taken".to_string(),
            },
        );
        session.tick(9_100);
        assert!(!session.status(9_100).awaiting_authority);
    }

    #[test]
    fn huge_cooldown_saturates() {
        let config = SessionConfig {
            move_cooldown_ms: u64::MAX,
            ..SessionConfig::default()
        };
        let connector = FakeConnector::default();
        let mut session = Session::new(connector.clone(), config, 7);
        session.enter_remote(Side::X);

        assert_eq!(session.submit_move(mv(4, 0), 5), MoveOutcome::Submitted);
        answer(&connector, accepted(&GameState::new(), Some(1)));
        session.tick(10);

        assert_eq!(session.status(10).cooldown_remaining_ms, u64::MAX - 10);
        assert_eq!(
            session.submit_move(mv(0, 0), 10),
            MoveOutcome::Rejected(MoveError::CooldownActive {
                remaining_ms: u64::MAX - 10
            })
        );
    }

    #[test]
    fn degraded_is_reported_once_and_cleared_by_replace() {
        let (mut session, connector) = remote_session();
        {
            let peers = connector.peers.borrow();
            for _ in 0..3 {
                peers[0]
                    .event_tx
                    .send(SyncEvent::Degraded {
                        reason: "refused".to_string(),
                    })
                    .unwrap();
            }
        }
        session.tick(0);
        assert!(session.status(0).degraded);
        assert_eq!(session.drain_notices(), vec![Notice::Degraded("refused".to_string())]);

        connector.peers.borrow()[0]
            .event_tx
            .send(SyncEvent::Replace {
                state: GameState::new(),
                source: MirrorSource::Snapshot,
            })
            .unwrap();
        session.tick(1);
        assert!(!session.status(1).degraded);
        assert_eq!(session.drain_notices(), vec![Notice::Restored]);
    }

    #[test]
    fn leaving_remote_drops_the_link() {
        let (mut session, connector) = remote_session();
        session.enter_local(Side::X, 0);

        let mut peers = connector.peers.borrow_mut();
        // The handle is gone, so the link's event channel is closed.
        assert!(peers[0].event_tx.is_closed());
        assert!(peers[0].cmd_rx.try_recv().is_err());
    }

    #[test]
    fn chat_only_in_remote() {
        let (mut session, connector) = remote_session();
        assert!(session.send_chat("  gg  "));
        assert!(!session.send_chat("   "));
        assert_eq!(
            connector.peers.borrow_mut()[0].cmd_rx.try_recv().ok(),
            Some(SyncCommand::Chat {
                side: Side::X,
                text: "gg".to_string()
            })
        );

        session.enter_local(Side::X, 0);
        assert!(!session.send_chat("hello"));
    }

    #[test]
    fn leave_clears_everything() {
        let (mut session, _connector) = remote_session();
        session.leave();
        assert_eq!(session.side(), None);
        assert_eq!(session.mode(), None);
        assert_eq!(session.mirror(), &GameState::new());
    }
}
