use crate::config::Config;
use crate::entry::{ElementDescriptor, EntryKind};
use crate::error::{NavError, NavResult, TransportError};
use crate::io::channel::RequestChannel;
use crate::io::protocol::{
    DirContent, ElementContent, GoToDirRequest, OpenFileRequest, Operation, Request, PARENT_DIR,
};
use crate::message::{Action, Event, RequestTag};
use crate::state::{
    prefix_matches, ControllerState, DirectoryListing, Failure, FilterSlot, FilterState, LoadKind,
    PreviewResolver, PreviewToken, Resolution, SessionState,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;
use tracing::{debug, error, info, trace, warn};

/// Drives one browsing session against a backend reachable through `C`.
///
/// All state is owned here; the view reads it through [`Navigator::view`] and
/// changes it only by dispatching [`Action`]s. Responses are matched against
/// the tag recorded when their request was sent, so late answers for a
/// superseded navigation or an old selection are dropped.
pub struct Navigator<C: RequestChannel> {
    channel: C,
    config: Config,
    state: ControllerState,
    session: SessionState,
    preview: PreviewResolver,
    filter: FilterState,
    filter_slot: FilterSlot,

    // Bumped per navigation request / per applied listing
    nav_epoch: u64,
    listing_epoch: u64,

    in_flight: usize,
    input_reset: bool,
    event_tx: Sender<Event>,
    event_rx: Receiver<Event>,
}

/// Read-only projection for the view layer.
#[derive(Debug)]
pub struct NavigatorView<'a> {
    /// `None` until the first listing arrives.
    pub directory_label: Option<&'a str>,
    pub entries: &'a [ElementDescriptor],
    /// Indices into `entries` that pass the current filter.
    pub visible: &'a [usize],
    pub selected_index: usize,
    pub preview: &'a ElementContent,
    pub preview_pending: bool,
    pub state: &'a ControllerState,
    pub filter_text: &'a str,
}

impl<C: RequestChannel> Navigator<C> {
    pub fn new(channel: C, config: Config) -> Self {
        let (event_tx, event_rx) = mpsc::channel();
        Self {
            channel,
            config,
            state: ControllerState::Uninitialized,
            session: SessionState::new(),
            preview: PreviewResolver::new(),
            filter: FilterState::default(),
            filter_slot: FilterSlot::new(),
            nav_epoch: 0,
            listing_epoch: 0,
            in_flight: 0,
            input_reset: false,
            event_tx,
            event_rx,
        }
    }

    /// Construct and immediately request the initial directory.
    pub fn start(channel: C, config: Config) -> Self {
        let mut navigator = Self::new(channel, config);
        navigator.init();
        navigator
    }

    /// Request the initial directory. Also retries after the initial
    /// request failed; refused in every other state.
    pub fn init(&mut self) {
        let retry = matches!(
            self.state.failure(),
            Some(f) if f.operation == Operation::InitDirectory
        );
        if self.state != ControllerState::Uninitialized && !retry {
            warn!(state = ?self.state, "navigator already initialized");
            return;
        }
        self.begin_listing(LoadKind::Initial, Request::InitDirectory);
        self.process_events();
    }

    pub fn dispatch(&mut self, action: Action) {
        trace!(?action, "dispatch");
        let result = match action {
            Action::SelectRow(index) => {
                self.select(index);
                Ok(())
            }
            Action::MoveSelection(delta) => {
                self.move_selection(delta);
                Ok(())
            }
            Action::ActivateRow(index) => match self.session.entries().get(index).cloned() {
                Some(entry) => self.activate(&entry),
                None => Err(NavError::OutOfRangeSelection {
                    index,
                    len: self.session.entries().len(),
                }),
            },
            Action::ActivateSelected => {
                let index = self.session.selected_index();
                if self.filter.is_active() && !self.filter.contains(index) {
                    debug!(index, "selected entry is hidden by the filter");
                    Ok(())
                } else {
                    match self.session.selected_entry().cloned() {
                        Some(entry) => self.activate(&entry),
                        None => Ok(()),
                    }
                }
            }
            Action::NavigateUp => self.navigate_up(),
            Action::SetFilterText(text) => {
                self.set_filter_text(&text);
                Ok(())
            }
        };
        if let Err(err) = result {
            debug!(%err, "action had no effect");
        }
        self.process_events();
    }

    /// Enter directories, open files. Unknown kinds are reported and ignored.
    pub fn activate(&mut self, entry: &ElementDescriptor) -> NavResult<()> {
        match &entry.kind {
            EntryKind::Directory => self.navigate_into(&entry.name),
            EntryKind::File => self.open_file(&entry.name),
            EntryKind::Unknown(kind) => {
                let err = NavError::UnknownEntryType {
                    name: entry.name.clone(),
                    kind: kind.clone(),
                };
                error!(%err, "cannot activate entry");
                Err(err)
            }
        }
    }

    pub fn navigate_into(&mut self, dir_name: &str) -> NavResult<()> {
        let current_dir = self.current_dir()?;
        info!(%current_dir, dir_name, "navigating");
        self.begin_listing(
            LoadKind::Navigate,
            Request::NavigateToDirectory(GoToDirRequest {
                current_dir,
                dir_name: dir_name.to_string(),
            }),
        );
        Ok(())
    }

    pub fn navigate_up(&mut self) -> NavResult<()> {
        self.navigate_into(PARENT_DIR)
    }

    /// Fire-and-forget; the acknowledgement never changes any state.
    pub fn open_file(&mut self, file_name: &str) -> NavResult<()> {
        let current_dir = self.current_dir()?;
        info!(%current_dir, file_name, "opening file");
        self.send(
            RequestTag::Open {
                file_name: file_name.to_string(),
            },
            Request::OpenFile(OpenFileRequest {
                current_dir,
                file_name: file_name.to_string(),
            }),
        );
        Ok(())
    }

    pub fn select(&mut self, index: usize) {
        match self.session.select(index) {
            Ok(true) => self.refresh_preview(),
            Ok(false) => trace!(index, "selection unchanged"),
            Err(err) => debug!(%err, "ignoring selection"),
        }
    }

    /// Step over the rows left visible by the filter.
    pub fn move_selection(&mut self, delta: i32) {
        let wrap = self.config.navigation.wrap_selection;
        if let Some(index) = self.filter.step(self.session.selected_index(), delta, wrap) {
            self.select(index);
        }
    }

    pub fn set_filter_text(&mut self, text: &str) {
        if !self.filter_slot.dispatch(text) {
            debug!("no filter handler bound yet");
        }
        self.process_events();
    }

    /// Apply every completion and filter result received so far.
    pub fn process_events(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.event_rx.try_recv() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    /// Block until at least one event arrives or `timeout` passes.
    pub fn wait_for_event(&mut self, timeout: Duration) -> bool {
        match self.event_rx.recv_timeout(timeout) {
            Ok(event) => {
                self.handle_event(event);
                self.process_events();
                true
            }
            Err(_) => false,
        }
    }

    pub fn view(&self) -> NavigatorView<'_> {
        NavigatorView {
            directory_label: self.session.directory_id(),
            entries: self.session.entries(),
            visible: &self.filter.visible,
            selected_index: self.session.selected_index(),
            preview: self.preview.content(),
            preview_pending: self.preview.is_pending(),
            state: &self.state,
            filter_text: &self.filter.text,
        }
    }

    /// True once after every listing change: the view should clear and
    /// refocus its filter input.
    pub fn take_input_reset(&mut self) -> bool {
        std::mem::take(&mut self.input_reset)
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn preview(&self) -> &ElementContent {
        self.preview.content()
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    /// The slot is rebound whenever a listing is applied, replacing
    /// whatever was registered here.
    pub fn filter_slot_mut(&mut self) -> &mut FilterSlot {
        &mut self.filter_slot
    }

    /// Requests sent whose completion has not been applied yet.
    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    fn current_dir(&self) -> NavResult<String> {
        self.session
            .directory_id()
            .map(str::to_string)
            .ok_or(NavError::NotLoaded)
    }

    fn begin_listing(&mut self, kind: LoadKind, request: Request) {
        self.nav_epoch += 1;
        self.state = ControllerState::Loading(kind);
        self.send(
            RequestTag::Listing {
                epoch: self.nav_epoch,
                kind,
            },
            request,
        );
    }

    fn send(&mut self, tag: RequestTag, request: Request) {
        let operation = request.operation();
        let uri = self.config.protocol.uri(operation).to_string();
        self.in_flight += 1;

        let payload = match request.payload() {
            Ok(payload) => payload,
            Err(e) => {
                let result = Err(TransportError::malformed(&uri, e));
                let _ = self.event_tx.send(Event::Completed { tag, uri, result });
                return;
            }
        };

        debug!(%uri, ?tag, "sending request");
        let tx = self.event_tx.clone();
        let reply_uri = uri.clone();
        self.channel.send_request(
            &uri,
            operation.method(),
            payload,
            Box::new(move |result| {
                let _ = tx.send(Event::Completed {
                    tag,
                    uri: reply_uri,
                    result,
                });
            }),
        );
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Completed { tag, uri, result } => {
                self.in_flight = self.in_flight.saturating_sub(1);
                match tag {
                    RequestTag::Listing { epoch, kind } => self.on_listing(epoch, kind, &uri, result),
                    RequestTag::Preview(token) => self.on_preview(token, &uri, result),
                    RequestTag::Open { file_name } => on_opened(&file_name, result),
                }
            }
            Event::Filtered {
                listing,
                directory_id,
                prefix,
                matches,
            } => self.on_filtered(listing, &directory_id, prefix, matches),
        }
    }

    fn on_listing(
        &mut self,
        epoch: u64,
        kind: LoadKind,
        uri: &str,
        result: Result<Value, TransportError>,
    ) {
        if epoch != self.nav_epoch {
            debug!(epoch, current = self.nav_epoch, "discarding superseded listing");
            return;
        }
        match result.and_then(|value| decode::<DirContent>(uri, value)) {
            Ok(content) => self.apply_dir_content(content),
            Err(error) => {
                warn!(%error, ?kind, "directory request failed");
                let operation = match kind {
                    LoadKind::Initial => Operation::InitDirectory,
                    LoadKind::Navigate => Operation::NavigateToDirectory,
                };
                self.state = ControllerState::Failed(Failure { operation, error });
            }
        }
    }

    fn apply_dir_content(&mut self, content: DirContent) {
        let DirContent {
            current_dir,
            elements_list,
            prev_dir,
        } = content;
        info!(directory = %current_dir, entries = elements_list.len(), "directory loaded");

        self.session.apply_listing(
            DirectoryListing {
                directory_id: current_dir,
                entries: elements_list,
            },
            prev_dir.as_deref(),
        );
        self.state = ControllerState::Ready;
        self.rebind_filter();
        self.refresh_preview();
    }

    /// Register a handler scoped to the listing just applied.
    fn rebind_filter(&mut self) {
        let Some(directory_id) = self.session.directory_id().map(str::to_string) else {
            return;
        };
        self.listing_epoch += 1;
        let listing = self.listing_epoch;
        let names: Vec<String> = self.session.entries().iter().map(|e| e.name.clone()).collect();
        let case_sensitive = self.config.navigation.case_sensitive_filter;
        let tx = self.event_tx.clone();

        self.filter = FilterState::unfiltered(names.len());
        self.input_reset = true;
        self.filter_slot.register(Box::new(move |prefix: &str| {
            let matches = prefix_matches(&names, prefix, case_sensitive);
            let _ = tx.send(Event::Filtered {
                listing,
                directory_id: directory_id.clone(),
                prefix: prefix.to_string(),
                matches,
            });
        }));
    }

    fn on_filtered(&mut self, listing: u64, directory_id: &str, prefix: String, matches: Vec<usize>) {
        if listing != self.listing_epoch {
            debug!(directory = directory_id, "discarding filter result for a replaced listing");
            return;
        }
        debug!(%prefix, matches = matches.len(), "filter applied");
        self.filter = FilterState {
            text: prefix,
            visible: matches,
        };
        if !self.filter.contains(self.session.selected_index()) {
            if let Some(&first) = self.filter.visible.first() {
                self.select(first);
            }
        }
    }

    fn refresh_preview(&mut self) {
        let Some(directory_id) = self.session.directory_id() else {
            return;
        };
        match self.preview.resolve(directory_id, self.session.selected_entry()) {
            Resolution::Immediate => trace!("nothing selected, preview cleared"),
            Resolution::Lookup(token, request) => {
                self.send(RequestTag::Preview(token), Request::GetElementInfo(request))
            }
        }
    }

    fn on_preview(&mut self, token: PreviewToken, uri: &str, result: Result<Value, TransportError>) {
        if !self.preview.is_current(&token) {
            debug!(epoch = token.epoch, directory = %token.directory_id, "discarding stale preview");
            return;
        }
        match result.and_then(|value| decode::<ElementContent>(uri, value)) {
            Ok(content) => {
                if let Some(entry) = self.session.selected_entry() {
                    if entry.kind != content.kind() {
                        warn!(entry = %entry.name, listed = %entry.kind, got = %content.kind(), "preview kind mismatch");
                    }
                }
                self.preview.commit(&token, content);
                if matches!(self.state.failure(), Some(f) if f.operation == Operation::GetElementInfo) {
                    self.state = ControllerState::Ready;
                }
            }
            Err(error) => {
                warn!(%error, "preview lookup failed");
                self.preview.abandon(&token);
                // Listing failures outrank preview failures
                let listing_failed = matches!(
                    self.state.failure(),
                    Some(f) if f.operation != Operation::GetElementInfo
                );
                if !self.state.is_loading() && !listing_failed {
                    self.state = ControllerState::Failed(Failure {
                        operation: Operation::GetElementInfo,
                        error,
                    });
                }
            }
        }
    }
}

fn on_opened(file_name: &str, result: Result<Value, TransportError>) {
    match result {
        Ok(_) => debug!(file_name, "open acknowledged"),
        Err(error) => warn!(file_name, %error, "open request failed"),
    }
}

fn decode<T: DeserializeOwned>(uri: &str, value: Value) -> Result<T, TransportError> {
    serde_json::from_value(value).map_err(|e| TransportError::malformed(uri, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{dir_content, file_content, ScriptedChannel};
    use serde_json::json;
    use std::cell::Cell;
    use std::rc::Rc;

    fn started() -> (ScriptedChannel, Navigator<ScriptedChannel>) {
        let channel = ScriptedChannel::new();
        let navigator = Navigator::start(channel.clone(), Config::default());
        (channel, navigator)
    }

    /// Initial listing of `/root` applied; request 1 is the pending preview of `a`.
    fn loaded() -> (ScriptedChannel, Navigator<ScriptedChannel>) {
        let (channel, mut nav) = started();
        channel.reply(0, dir_content("/root", &[("a", "Directory"), ("b", "File")], None));
        nav.process_events();
        (channel, nav)
    }

    #[test]
    fn test_init_selects_first_entry_and_requests_its_preview() {
        let (channel, mut nav) = started();
        assert_eq!(nav.state(), &ControllerState::Loading(LoadKind::Initial));
        assert_eq!(nav.view().directory_label, None);
        assert_eq!(channel.request(0), ("initDir".to_string(), json!({})));

        channel.reply(0, dir_content("/root", &[("a", "Directory"), ("b", "File")], None));
        nav.process_events();

        assert_eq!(nav.state(), &ControllerState::Ready);
        assert_eq!(nav.session().directory_id(), Some("/root"));
        assert_eq!(nav.session().selected_index(), 0);
        assert_eq!(
            channel.request(1),
            (
                "elementInfo".to_string(),
                json!({"currentDir": "/root", "elementName": "a"})
            )
        );
        assert!(nav.view().preview_pending);
    }

    #[test]
    fn test_init_restores_hinted_entry() {
        let (channel, mut nav) = started();
        channel.reply(
            0,
            dir_content("/root", &[("a", "File"), ("b", "File"), ("c", "File")], Some("c")),
        );
        nav.process_events();
        assert_eq!(nav.session().selected_index(), 2);
        assert_eq!(channel.request(1).1["elementName"], "c");
    }

    #[test]
    fn test_activating_directory_into_empty_listing() {
        let (channel, mut nav) = loaded();
        nav.dispatch(Action::ActivateRow(0));

        assert_eq!(nav.state(), &ControllerState::Loading(LoadKind::Navigate));
        assert_eq!(
            channel.request(2),
            (
                "goToDir".to_string(),
                json!({"currentDir": "/root", "dirName": "a"})
            )
        );

        channel.reply(2, dir_content("/root/a", &[], None));
        nav.process_events();

        assert_eq!(nav.state(), &ControllerState::Ready);
        assert!(nav.session().entries().is_empty());
        assert_eq!(nav.session().selected_index(), 0);
        assert_eq!(nav.preview(), &ElementContent::empty_file());
        assert_eq!(channel.count("elementInfo"), 1);

        // The lookup for `a` in /root arrives late and is ignored.
        channel.reply(1, file_content("stale"));
        nav.process_events();
        assert_eq!(nav.preview(), &ElementContent::empty_file());
    }

    #[test]
    fn test_activating_file_only_sends_open() {
        let (channel, mut nav) = loaded();
        channel.reply(1, json!({"type": "Directory", "content": {"elementsList": []}}));
        nav.process_events();
        let session_before = nav.session().clone();
        let preview_before = nav.preview().clone();

        nav.dispatch(Action::ActivateRow(1));
        assert_eq!(
            channel.request(2),
            (
                "openFile".to_string(),
                json!({"currentDir": "/root", "fileName": "b"})
            )
        );
        channel.reply(2, json!({"currentDir": "/elsewhere", "elementsList": []}));
        nav.process_events();

        assert_eq!(nav.session(), &session_before);
        assert_eq!(nav.preview(), &preview_before);
        assert_eq!(nav.state(), &ControllerState::Ready);
        assert!(!nav.is_busy());
    }

    #[test]
    fn test_failed_open_does_not_change_state() {
        let (channel, mut nav) = loaded();
        nav.dispatch(Action::ActivateRow(1));
        channel.complete(
            2,
            Err(TransportError::Backend {
                uri: "openFile".into(),
                message: "no handler".into(),
            }),
        );
        nav.process_events();
        assert_eq!(nav.state(), &ControllerState::Ready);
    }

    #[test]
    fn test_selecting_same_row_twice_resolves_once() {
        let (channel, mut nav) = loaded();
        assert_eq!(channel.count("elementInfo"), 1);

        nav.dispatch(Action::SelectRow(1));
        nav.dispatch(Action::SelectRow(1));
        assert_eq!(channel.count("elementInfo"), 2);

        nav.dispatch(Action::SelectRow(7));
        assert_eq!(nav.session().selected_index(), 1);
        assert_eq!(channel.count("elementInfo"), 2);
    }

    #[test]
    fn test_newer_selection_wins_regardless_of_arrival_order() {
        for newest_first in [true, false] {
            let (channel, mut nav) = loaded();
            nav.dispatch(Action::SelectRow(1));
            assert_eq!(channel.request(2).1["elementName"], "b");

            let a = json!({"type": "Directory", "content": {"elementsList": [{"name": "x", "type": "File"}]}});
            if newest_first {
                channel.reply(2, file_content("B"));
                channel.reply(1, a);
            } else {
                channel.reply(1, a);
                channel.reply(2, file_content("B"));
            }
            nav.process_events();

            assert_eq!(nav.preview(), &ElementContent::File { data: "B".into() });
            assert!(!nav.view().preview_pending);
        }
    }

    #[test]
    fn test_superseded_navigation_is_ignored() {
        let (channel, mut nav) = loaded();
        nav.navigate_into("a").unwrap();
        nav.navigate_up().unwrap();
        assert_eq!(channel.request(3).1["dirName"], "..");

        channel.reply(3, dir_content("/", &[("root", "Directory")], Some("root")));
        channel.reply(2, dir_content("/root/a", &[("late", "File")], None));
        nav.process_events();

        assert_eq!(nav.session().directory_id(), Some("/"));
        assert_eq!(nav.session().entries()[0].name, "root");
        assert_eq!(nav.state(), &ControllerState::Ready);
    }

    #[test]
    fn test_navigate_up_restores_origin() {
        let (channel, mut nav) = loaded();
        nav.dispatch(Action::NavigateUp);
        channel.reply(
            2,
            dir_content("/", &[("bin", "Directory"), ("root", "Directory"), ("tmp", "Directory")], Some("root")),
        );
        nav.process_events();

        assert_eq!(nav.session().selected_index(), 1);
        assert_eq!(
            channel.request(3).1,
            json!({"currentDir": "/", "elementName": "root"})
        );
    }

    #[test]
    fn test_navigation_error_keeps_last_listing() {
        let (channel, mut nav) = loaded();
        nav.dispatch(Action::ActivateRow(0));
        let error = TransportError::Backend {
            uri: "goToDir".into(),
            message: "permission denied".into(),
        };
        channel.complete(2, Err(error.clone()));
        nav.process_events();

        assert_eq!(
            nav.state(),
            &ControllerState::Failed(Failure {
                operation: Operation::NavigateToDirectory,
                error,
            })
        );
        assert_eq!(nav.session().directory_id(), Some("/root"));
        assert_eq!(nav.session().entries().len(), 2);
    }

    #[test]
    fn test_malformed_listing_is_a_failure() {
        let (channel, mut nav) = started();
        channel.reply(0, json!({"unexpected": true}));
        nav.process_events();

        let failure = nav.state().failure().expect("should have failed");
        assert_eq!(failure.operation, Operation::InitDirectory);
        assert!(matches!(failure.error, TransportError::Malformed { .. }));
        assert_eq!(nav.session().directory_id(), None);
    }

    #[test]
    fn test_preview_failure_recovers_on_next_preview() {
        let (channel, mut nav) = loaded();
        channel.complete(
            1,
            Err(TransportError::Disconnected {
                uri: "elementInfo".into(),
            }),
        );
        nav.process_events();
        assert_eq!(
            nav.state().failure().map(|f| f.operation),
            Some(Operation::GetElementInfo)
        );

        nav.dispatch(Action::SelectRow(1));
        channel.reply(2, file_content("ok"));
        nav.process_events();
        assert_eq!(nav.state(), &ControllerState::Ready);
    }

    #[test]
    fn test_failed_preview_never_shows_previous_entry() {
        let (channel, mut nav) = loaded();
        channel.reply(1, file_content("A-CONTENT"));
        nav.process_events();
        assert_eq!(nav.preview(), &ElementContent::File { data: "A-CONTENT".into() });

        nav.dispatch(Action::SelectRow(1));
        channel.complete(
            2,
            Err(TransportError::Disconnected {
                uri: "elementInfo".into(),
            }),
        );
        nav.process_events();

        assert_eq!(nav.session().selected_entry().map(|e| e.name.as_str()), Some("b"));
        assert_eq!(nav.preview(), &ElementContent::empty_file());
        assert!(!nav.view().preview_pending);
    }

    #[test]
    fn test_preview_failure_does_not_mask_navigation_failure() {
        let (channel, mut nav) = loaded();
        nav.dispatch(Action::ActivateRow(0));
        channel.complete(
            2,
            Err(TransportError::Backend {
                uri: "goToDir".into(),
                message: "permission denied".into(),
            }),
        );
        nav.process_events();

        // Preview of `a` was requested before the navigation and fails late
        channel.complete(
            1,
            Err(TransportError::Disconnected {
                uri: "elementInfo".into(),
            }),
        );
        nav.process_events();
        assert_eq!(
            nav.state().failure().map(|f| f.operation),
            Some(Operation::NavigateToDirectory)
        );

        nav.dispatch(Action::SelectRow(1));
        channel.reply(3, file_content("b"));
        nav.process_events();
        assert_eq!(
            nav.state().failure().map(|f| f.operation),
            Some(Operation::NavigateToDirectory)
        );
    }

    #[test]
    fn test_init_can_be_retried_after_failure() {
        let (channel, mut nav) = started();
        channel.complete(
            0,
            Err(TransportError::Disconnected {
                uri: "initDir".into(),
            }),
        );
        nav.process_events();
        assert_eq!(
            nav.state().failure().map(|f| f.operation),
            Some(Operation::InitDirectory)
        );

        nav.init();
        assert_eq!(nav.state(), &ControllerState::Loading(LoadKind::Initial));
        assert_eq!(channel.request(1).0, "initDir");
        channel.reply(1, dir_content("/root", &[("a", "File")], None));
        nav.process_events();
        assert_eq!(nav.state(), &ControllerState::Ready);

        nav.init();
        assert_eq!(channel.count("initDir"), 2);
    }

    #[test]
    fn test_unknown_entry_kind_is_reported_not_followed() {
        let (channel, mut nav) = started();
        channel.reply(0, dir_content("/root", &[("pipe", "NamedPipe")], None));
        nav.process_events();
        let sent = channel.len();

        let entry = nav.session().entries()[0].clone();
        assert!(matches!(
            nav.activate(&entry),
            Err(NavError::UnknownEntryType { ref kind, .. }) if kind == "NamedPipe"
        ));
        nav.dispatch(Action::ActivateSelected);
        assert_eq!(channel.len(), sent);
        assert_eq!(nav.state(), &ControllerState::Ready);
    }

    #[test]
    fn test_navigation_before_first_listing_is_rejected() {
        let (channel, mut nav) = started();
        assert!(matches!(nav.navigate_into("a"), Err(NavError::NotLoaded)));
        assert!(matches!(nav.open_file("b"), Err(NavError::NotLoaded)));
        assert_eq!(channel.len(), 1);
    }

    #[test]
    fn test_filter_handler_is_replaced_after_navigation() {
        let (channel, mut nav) = loaded();
        assert!(nav.take_input_reset());

        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        nav.filter_slot_mut()
            .register(Box::new(move |_| counter.set(counter.get() + 1)));
        nav.dispatch(Action::SetFilterText("x".into()));
        assert_eq!(calls.get(), 1);

        nav.dispatch(Action::ActivateRow(0));
        channel.reply(2, dir_content("/root/a", &[("yak", "File"), ("zebra", "File")], None));
        nav.process_events();
        assert!(nav.take_input_reset());
        assert!(!nav.take_input_reset());

        nav.dispatch(Action::SetFilterText("y".into()));
        assert_eq!(calls.get(), 1);
        assert_eq!(nav.filter().text, "y");
        assert_eq!(nav.filter().visible, vec![0]);
    }

    #[test]
    fn test_filter_moves_selection_to_first_match() {
        let (channel, mut nav) = started();
        channel.reply(
            0,
            dir_content(
                "/src",
                &[("alpha", "File"), ("Beta", "Directory"), ("bravo", "File"), ("charlie", "File")],
                None,
            ),
        );
        nav.process_events();

        nav.dispatch(Action::SetFilterText("b".into()));
        assert_eq!(nav.view().visible, &[1, 2]);
        assert_eq!(nav.session().selected_index(), 1);
        assert_eq!(channel.request(channel.len() - 1).1["elementName"], "Beta");

        nav.dispatch(Action::MoveSelection(1));
        assert_eq!(nav.session().selected_index(), 2);
        nav.dispatch(Action::MoveSelection(1));
        assert_eq!(nav.session().selected_index(), 1);

        nav.dispatch(Action::SetFilterText(String::new()));
        assert_eq!(nav.view().visible, &[0, 1, 2, 3]);
        assert_eq!(nav.session().selected_index(), 1);
    }

    #[test]
    fn test_activate_ignores_selection_hidden_by_filter() {
        let (channel, mut nav) = loaded();
        nav.dispatch(Action::SetFilterText("zzz".into()));
        assert!(nav.view().visible.is_empty());
        assert_eq!(nav.session().selected_index(), 0);

        let sent = channel.len();
        nav.dispatch(Action::ActivateSelected);
        assert_eq!(channel.len(), sent);
        assert_eq!(channel.count("goToDir"), 0);
        assert_eq!(nav.state(), &ControllerState::Ready);

        nav.dispatch(Action::SetFilterText(String::new()));
        nav.dispatch(Action::ActivateSelected);
        assert_eq!(channel.count("goToDir"), 1);
    }

    #[test]
    fn test_move_selection_clamps_without_wrap() {
        let channel = ScriptedChannel::new();
        let mut config = Config::default();
        config.navigation.wrap_selection = false;
        let mut nav = Navigator::start(channel.clone(), config);
        channel.reply(0, dir_content("/d", &[("a", "File"), ("b", "File")], None));
        nav.process_events();

        nav.dispatch(Action::MoveSelection(-1));
        assert_eq!(nav.session().selected_index(), 0);
        nav.dispatch(Action::MoveSelection(5));
        assert_eq!(nav.session().selected_index(), 1);
    }

    #[test]
    fn test_custom_uris_are_used() {
        let channel = ScriptedChannel::new();
        let mut config = Config::default();
        config.protocol.init_dir = "/api/init".into();
        let _nav = Navigator::start(channel.clone(), config);
        assert_eq!(channel.request(0).0, "/api/init");
    }

    #[test]
    fn test_end_to_end_with_worker() {
        use crate::config::BackendConfig;
        use crate::io::{spawn_worker, LocalBackend};

        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested").join("inner.txt"), "inner").unwrap();
        std::fs::write(dir.path().join("top.txt"), "top").unwrap();

        let config = Config::default();
        let backend = LocalBackend::new(dir.path().to_path_buf(), &BackendConfig::default());
        let worker = spawn_worker(backend, config.protocol.clone());
        let mut nav = Navigator::start(worker, config);

        let settle = |nav: &mut Navigator<_>| {
            while nav.is_busy() {
                assert!(nav.wait_for_event(Duration::from_secs(5)), "worker stalled");
            }
        };
        settle(&mut nav);
        assert_eq!(nav.state(), &ControllerState::Ready);
        assert_eq!(nav.session().entries()[0], ElementDescriptor::directory("nested"));
        assert_eq!(
            nav.preview(),
            &ElementContent::Directory {
                elements_list: vec![ElementDescriptor::file("inner.txt")]
            }
        );

        nav.dispatch(Action::ActivateSelected);
        settle(&mut nav);
        assert!(nav.session().directory_id().unwrap().ends_with("nested"));
        assert_eq!(nav.preview(), &ElementContent::File { data: "inner".into() });

        nav.dispatch(Action::NavigateUp);
        settle(&mut nav);
        assert_eq!(nav.session().selected_index(), 0);
        assert_eq!(
            nav.session().selected_entry().map(|e| e.name.as_str()),
            Some("nested")
        );
    }
}
