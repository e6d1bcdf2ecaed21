//! Cascading selection flow: branch → semester → classroom.
//!
//! Each later level is fetched only after the earlier level's choice has
//! committed, a strict sequential dependency. Changing an earlier level
//! bumps a generation counter; any later-level fetch still in flight
//! carries the old generation and its result is discarded on arrival, so a
//! stale classroom list can never overwrite one fetched for a newer
//! semester choice. Fetch failures are local to their step and never touch
//! the session.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::api::{DirectoryApi, DirectoryEntry};
use crate::error::{GateError, GateResult};

/// Current selections and the listings fetched for them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadeState {
    pub branches: Vec<DirectoryEntry>,
    pub branch: Option<String>,
    pub semesters: Vec<DirectoryEntry>,
    pub semester: Option<String>,
    pub classrooms: Vec<DirectoryEntry>,
    pub classroom: Option<String>,
}

pub struct CascadeController {
    api: Arc<dyn DirectoryApi>,
    state: RwLock<CascadeState>,
    generation: AtomicU64,
}

impl CascadeController {
    pub fn new(api: Arc<dyn DirectoryApi>) -> Self {
        Self {
            api,
            state: RwLock::new(CascadeState::default()),
            generation: AtomicU64::new(0),
        }
    }

    pub async fn state(&self) -> CascadeState {
        self.state.read().await.clone()
    }

    fn bump_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Fetch the root branch listing.
    pub async fn load_branches(&self) -> GateResult<()> {
        let branches = self.api.fetch_branches().await?;
        self.state.write().await.branches = branches;
        Ok(())
    }

    /// Choose a branch and fetch its semesters. Resets every later level
    /// before the fetch so the UI never shows semesters of the previous
    /// branch while the new ones load.
    pub async fn select_branch(&self, branch_id: impl Into<String>) -> GateResult<()> {
        let branch_id = branch_id.into();
        let generation = self.bump_generation();
        {
            let mut state = self.state.write().await;
            state.branch = Some(branch_id.clone());
            state.semesters.clear();
            state.semester = None;
            state.classrooms.clear();
            state.classroom = None;
        }

        let result = self.api.fetch_semesters(&branch_id).await;

        if self.current_generation() != generation {
            debug!(branch = %branch_id, "discarding stale semester listing");
            return Ok(());
        }
        match result {
            Ok(semesters) => {
                self.state.write().await.semesters = semesters;
                Ok(())
            }
            Err(e) => {
                warn!(branch = %branch_id, error = %e, "semester fetch failed");
                Err(e)
            }
        }
    }

    /// Choose a semester and fetch its classrooms. Requires a committed
    /// branch choice.
    pub async fn select_semester(&self, semester_id: impl Into<String>) -> GateResult<()> {
        let semester_id = semester_id.into();
        let generation = self.bump_generation();
        let branch_id = {
            let mut state = self.state.write().await;
            let Some(branch_id) = state.branch.clone() else {
                return Err(GateError::SelectionOrder("branch"));
            };
            state.semester = Some(semester_id.clone());
            state.classrooms.clear();
            state.classroom = None;
            branch_id
        };

        let result = self.api.fetch_classrooms(&branch_id, &semester_id).await;

        if self.current_generation() != generation {
            debug!(semester = %semester_id, "discarding stale classroom listing");
            return Ok(());
        }
        match result {
            Ok(classrooms) => {
                self.state.write().await.classrooms = classrooms;
                Ok(())
            }
            Err(e) => {
                warn!(semester = %semester_id, error = %e, "classroom fetch failed");
                Err(e)
            }
        }
    }

    /// Choose a classroom. Leaf level, nothing further to fetch.
    pub async fn select_classroom(&self, classroom_id: impl Into<String>) -> GateResult<()> {
        let mut state = self.state.write().await;
        if state.semester.is_none() {
            return Err(GateError::SelectionOrder("semester"));
        }
        state.classroom = Some(classroom_id.into());
        Ok(())
    }
}
