//! Per-tick navigation driver and whole-episode runner.

use tracing::{debug, info};

use crate::error::{NavError, Result};
use crate::simulation::actions::{ActionCatalog, ActionVector};
use crate::simulation::flow::{FlowField, GridPoint};
use crate::simulation::motion::{self, Displacement, TickOutcome};
use crate::simulation::policy::{ActionSelector, PolicyTable, Selection};
use crate::simulation::state::{Fingerprint, State, StateEncoder};

/// Everything computed during one tick.
#[derive(Clone, Debug)]
pub struct TickReport {
    pub position: GridPoint,
    pub state: State,
    pub fingerprint: Fingerprint,
    pub selection: Selection,
    pub action: ActionVector,
    pub displacement: Displacement,
    pub new_position: GridPoint,
    /// Classification of `new_position`
    pub outcome: TickOutcome,
}

/// Drives an agent through a flow field using a fixed policy table.
///
/// Holds only load-time data. The agent position is passed into and returned
/// from every tick, so ticks can be driven by any scheduler.
#[derive(Clone, Debug)]
pub struct Navigator {
    field: FlowField,
    table: PolicyTable,
    catalog: ActionCatalog,
    encoder: StateEncoder,
    selector: ActionSelector,
}

impl Navigator {
    #[must_use]
    pub fn new(
        field: FlowField,
        table: PolicyTable,
        catalog: ActionCatalog,
        encoder: StateEncoder,
    ) -> Self {
        Self {
            field,
            table,
            catalog,
            encoder,
            selector: ActionSelector,
        }
    }

    #[must_use]
    pub const fn field(&self) -> &FlowField {
        &self.field
    }

    #[must_use]
    pub const fn table(&self) -> &PolicyTable {
        &self.table
    }

    #[must_use]
    pub const fn catalog(&self) -> &ActionCatalog {
        &self.catalog
    }

    #[must_use]
    pub const fn encoder(&self) -> &StateEncoder {
        &self.encoder
    }

    /// Runs one encode -> select -> resolve -> classify step from `position`.
    ///
    /// # Errors
    /// Returns `OutOfBounds` if `position` is outside the field.
    pub fn tick(&self, position: GridPoint) -> Result<TickReport> {
        let state = self.encoder.encode(&self.field, position)?;
        let fingerprint = state.fingerprint();

        let selection = self.selector.select(&self.table, fingerprint);
        if selection.hit {
            debug!(%fingerprint, %state, action = selection.index, "state found");
        } else {
            debug!(%fingerprint, %state, "state not in table, taking action 0");
        }

        let action = self.catalog.get(selection.index);
        let displacement = motion::resolve(action, state.current_flow);
        let new_position = displacement.apply(position);
        let outcome = motion::classify(&self.field, new_position);

        Ok(TickReport {
            position,
            state,
            fingerprint,
            selection,
            action,
            displacement,
            new_position,
            outcome,
        })
    }
}

/// Summary of a finished episode.
#[derive(Clone, Debug)]
pub struct EpisodeSummary {
    /// `Continue` when the tick cap ran out first
    pub outcome: TickOutcome,
    pub ticks: u64,
    pub table_hits: u64,
    pub table_misses: u64,
    /// Every visited position, starting with the start point
    pub trajectory: Vec<GridPoint>,
}

/// Sequential run of ticks from a start point until a terminal outcome.
#[derive(Debug)]
pub struct Episode<'a> {
    navigator: &'a Navigator,
    position: GridPoint,
    outcome: TickOutcome,
    ticks: u64,
    table_hits: u64,
    trajectory: Vec<GridPoint>,
}

impl<'a> Episode<'a> {
    /// Starts at `start`. A start on an obstacle or the goal is already
    /// terminal.
    ///
    /// # Errors
    /// Returns `OutOfBounds` if `start` is outside the field.
    pub fn new(navigator: &'a Navigator, start: GridPoint) -> Result<Self> {
        let field = navigator.field();
        if !field.contains(start) {
            return Err(NavError::OutOfBounds {
                point: start,
                len_x: field.len_x(),
                len_y: field.len_y(),
            });
        }
        Ok(Self {
            navigator,
            position: start,
            outcome: motion::classify(field, start),
            ticks: 0,
            table_hits: 0,
            trajectory: vec![start],
        })
    }

    #[must_use]
    pub const fn position(&self) -> GridPoint {
        self.position
    }

    #[must_use]
    pub const fn outcome(&self) -> TickOutcome {
        self.outcome
    }

    /// Advances one tick. Returns `None` once the episode is terminal.
    ///
    /// # Errors
    /// Propagates tick failures.
    pub fn step(&mut self) -> Result<Option<TickReport>> {
        if self.outcome.is_terminal() {
            return Ok(None);
        }
        let report = self.navigator.tick(self.position)?;
        self.ticks += 1;
        if report.selection.hit {
            self.table_hits += 1;
        }
        self.position = report.new_position;
        self.outcome = report.outcome;
        self.trajectory.push(report.new_position);
        Ok(Some(report))
    }

    /// Steps until terminal or until `max_ticks` ticks have run.
    ///
    /// # Errors
    /// Propagates tick failures.
    pub fn run(mut self, max_ticks: u64) -> Result<EpisodeSummary> {
        while self.ticks < max_ticks && self.step()?.is_some() {}

        info!(
            outcome = %self.outcome,
            ticks = self.ticks,
            position = %self.position,
            "episode finished"
        );

        Ok(EpisodeSummary {
            outcome: self.outcome,
            ticks: self.ticks,
            table_hits: self.table_hits,
            table_misses: self.ticks - self.table_hits,
            trajectory: self.trajectory,
        })
    }
}
