//! Inspector session: the host scene, options and what is currently
//! loaded.
//!
//! A [`Session`] is the only owner of scene state. It starts
//! [`SessionState::Empty`]; each successful [`Session::load`] replaces the
//! live scene wholesale, and a failed one leaves it as it was.

use crate::alignment::Alignment;
use crate::command::InspectCommand;
use crate::controller;
use crate::error::InspectError;
use crate::io::{self, LoadRequest, LoadedAlignment, Storage};
use crate::options::Options;
use crate::playback::{self, PlayArgs, PlaybackOutcome, SkipReason};
use crate::scene::{build_scene, SceneHost, SceneObjects};
use crate::table::AlignmentTable;

/// A loaded alignment and the scene objects built for it.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveScene {
    /// What was loaded.
    pub loaded: LoadedAlignment,
    /// Object ids in the host.
    pub objects: SceneObjects,
    /// Table rows, one per section.
    pub table: AlignmentTable,
    /// Row last selected.
    pub selected_row: Option<usize>,
}

/// Whether anything is loaded.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SessionState {
    /// Nothing loaded yet.
    #[default]
    Empty,
    /// An alignment is on screen.
    Loaded(Box<LiveScene>),
}

/// The inspector bound to one host scene.
pub struct Session<H: SceneHost> {
    host: H,
    options: Options,
    storage: Storage,
    state: SessionState,
}

impl<H: SceneHost> Session<H> {
    /// Start a session on `host` and apply the configured view.
    pub fn new(mut host: H, options: Options) -> Self {
        host.prepare_view(&options.view);
        let storage = Storage::new(&options.storage);
        Self {
            host,
            options,
            storage,
            state: SessionState::Empty,
        }
    }

    // -- Accessors --

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The host scene.
    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Session options.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The loaded alignment, if any.
    #[must_use]
    pub fn alignment(&self) -> Option<&Alignment> {
        self.live().map(|l| &l.loaded.alignment)
    }

    /// The alignment table, if anything is loaded.
    #[must_use]
    pub fn table(&self) -> Option<&AlignmentTable> {
        self.live().map(|l| &l.table)
    }

    /// Row last selected.
    #[must_use]
    pub fn selected_row(&self) -> Option<usize> {
        self.live().and_then(|l| l.selected_row)
    }

    fn live(&self) -> Option<&LiveScene> {
        match &self.state {
            SessionState::Loaded(live) => Some(live.as_ref()),
            SessionState::Empty => None,
        }
    }

    // -- Lifecycle --

    /// Load `request`, replace the current scene and select the first row.
    ///
    /// All reading and object creation happens before the old scene is
    /// removed; on error the session is unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if loading or building the new scene fails.
    pub fn load(&mut self, request: &LoadRequest) -> Result<(), InspectError> {
        let loaded = io::load(&self.storage, request)?;
        let objects =
            build_scene(&mut self.host, &loaded, &self.options.appearance)?;
        let table = AlignmentTable::new(&loaded.alignment);
        let mut live = LiveScene {
            loaded,
            objects,
            table,
            selected_row: None,
        };
        if let Err(e) = controller::select_row(&mut self.host, &mut live, 0) {
            live.objects.teardown(&mut self.host);
            return Err(e);
        }

        let previous = std::mem::replace(
            &mut self.state,
            SessionState::Loaded(Box::new(live)),
        );
        if let SessionState::Loaded(old) = previous {
            old.objects.teardown(&mut self.host);
        }
        Ok(())
    }

    /// Tear down the live scene and hand the host back.
    pub fn close(mut self) -> H {
        if let SessionState::Loaded(live) = std::mem::take(&mut self.state) {
            live.objects.teardown(&mut self.host);
        }
        self.host
    }

    // -- Selection --

    /// Select table row `row`; see [`controller::select_row`].
    ///
    /// # Errors
    ///
    /// Returns the first host error.
    pub fn select_row(
        &mut self,
        row: usize,
    ) -> Result<Option<usize>, InspectError> {
        let SessionState::Loaded(live) = &mut self.state else {
            log::debug!("selection ignored: nothing loaded");
            return Ok(None);
        };
        controller::select_row(&mut self.host, live, row)
    }

    /// Select from the slider; see [`controller::select_slider`].
    ///
    /// # Errors
    ///
    /// Returns the first host error.
    pub fn select_slider(
        &mut self,
        value: i64,
    ) -> Result<Option<usize>, InspectError> {
        let SessionState::Loaded(live) = &mut self.state else {
            log::debug!("selection ignored: nothing loaded");
            return Ok(None);
        };
        controller::select_slider(&mut self.host, live, value)
    }

    /// Select by z-index; see [`controller::select_z`].
    ///
    /// # Errors
    ///
    /// Returns the first host error.
    pub fn select_z(
        &mut self,
        z_index: usize,
    ) -> Result<Option<usize>, InspectError> {
        let SessionState::Loaded(live) = &mut self.state else {
            log::debug!("selection ignored: nothing loaded");
            return Ok(None);
        };
        controller::select_z(&mut self.host, live, z_index)
    }

    // -- Playback --

    /// Play back the loaded alignment.
    ///
    /// # Errors
    ///
    /// Returns the first host error raised during playback.
    pub fn play(
        &mut self,
        args: PlayArgs,
    ) -> Result<PlaybackOutcome, InspectError> {
        if !self.host.is_interactive() {
            log::warn!("InspectET requires an interactive viewer.");
        }
        let SessionState::Loaded(live) = &mut self.state else {
            log::warn!("No tomographic alignment loaded.");
            return Ok(PlaybackOutcome::Skipped(SkipReason::NoAlignment));
        };
        playback::play(&mut self.host, live, args)
    }

    /// Run a parsed command.
    ///
    /// # Errors
    ///
    /// Returns the first host error raised while running `command`.
    pub fn execute(
        &mut self,
        command: &InspectCommand,
    ) -> Result<PlaybackOutcome, InspectError> {
        match *command {
            InspectCommand::Play(args) => self.play(args),
        }
    }
}
