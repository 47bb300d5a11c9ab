//! Event types and sinks for observing simulation runs.
//!
//! This module defines [`SimulationEvent`] and a set of sinks and adapters to emit,
//! collect, or forward events while executing a run via
//! [`crate::model::runner::Simulation`] or [`crate::model::runner::run_step`].
use crate::grid::{CategoryCounts, GridShape, LandCover};
use crate::model::demand::Demand;
use crate::model::report::RunReport;
use crate::model::state::StepStats;

/// Describes events emitted by a simulation run.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum SimulationEvent {
    /// Emitted once the inputs passed validation, before the first step.
    RunStarted {
        /// Grid dimensions of the run.
        shape: GridShape,
        /// Number of steps that will be simulated.
        steps: u32,
        /// Category counts of the initial land cover.
        initial_counts: CategoryCounts,
    },

    /// Emitted when a run completes all steps.
    RunFinished {
        /// Summary of the whole run.
        report: RunReport,
    },

    /// Emitted when a step starts.
    StepStarted {
        /// Step number, starting at 1.
        step: u32,
        /// Calendar year the step produces.
        year: i32,
    },

    /// Emitted after pixel demand was derived for a step.
    DemandComputed {
        /// Growth demand before displacement.
        demand: Demand,
    },

    /// Emitted after a category was allocated within a step.
    CategoryAllocated {
        /// Step number.
        step: u32,
        /// Category that received the cells.
        category: LandCover,
        /// Cells asked for.
        requested: usize,
        /// Cells actually assigned.
        assigned: usize,
    },

    /// Emitted when fewer eligible cells existed than were requested.
    UnderAllocation {
        /// Step number.
        step: u32,
        /// Category that fell short.
        category: LandCover,
        /// Cells asked for.
        requested: usize,
        /// Cells actually assigned.
        assigned: usize,
    },

    /// Emitted after a step was committed.
    StepFinished {
        /// Statistics of the committed step.
        stats: StepStats,
    },

    /// Emitted when a run stops early on request.
    Cancelled {
        /// Number of steps committed before stopping.
        completed_steps: u32,
    },
}

/// Discriminant of [`SimulationEvent`], used to filter what a sink receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationEventKind {
    RunStarted,
    RunFinished,
    StepStarted,
    DemandComputed,
    CategoryAllocated,
    UnderAllocation,
    StepFinished,
    Cancelled,
}

impl SimulationEvent {
    pub fn kind(&self) -> SimulationEventKind {
        match self {
            SimulationEvent::RunStarted { .. } => SimulationEventKind::RunStarted,
            SimulationEvent::RunFinished { .. } => SimulationEventKind::RunFinished,
            SimulationEvent::StepStarted { .. } => SimulationEventKind::StepStarted,
            SimulationEvent::DemandComputed { .. } => SimulationEventKind::DemandComputed,
            SimulationEvent::CategoryAllocated { .. } => SimulationEventKind::CategoryAllocated,
            SimulationEvent::UnderAllocation { .. } => SimulationEventKind::UnderAllocation,
            SimulationEvent::StepFinished { .. } => SimulationEventKind::StepFinished,
            SimulationEvent::Cancelled { .. } => SimulationEventKind::Cancelled,
        }
    }
}

/// A generic event sink that accepts [`SimulationEvent`]s.
pub trait EventSink {
    fn send(&mut self, event: SimulationEvent);

    /// Whether the sink is interested in events of `kind`. Emitters skip building
    /// events nobody wants.
    fn wants(&self, _kind: SimulationEventKind) -> bool {
        true
    }

    fn send_many<I>(&mut self, events: I)
    where
        Self: Sized,
        I: IntoIterator<Item = SimulationEvent>,
    {
        for e in events {
            self.send(e);
        }
    }
}

/// A no-op event sink.
impl EventSink for () {
    #[inline]
    fn send(&mut self, _event: SimulationEvent) {}

    #[inline]
    fn wants(&self, _kind: SimulationEventKind) -> bool {
        false
    }
}

/// An event sink that forwards to a user-provided closure.
pub struct FnSink<F>
where
    F: FnMut(SimulationEvent),
{
    f: F,
}

impl<F> FnSink<F>
where
    F: FnMut(SimulationEvent),
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> EventSink for FnSink<F>
where
    F: FnMut(SimulationEvent),
{
    #[inline]
    fn send(&mut self, event: SimulationEvent) {
        (self.f)(event);
    }
}

/// An event sink that collects events in a `Vec`, optionally restricted to some kinds.
#[derive(Default)]
pub struct VecSink {
    events: Vec<SimulationEvent>,
    only: Option<Vec<SimulationEventKind>>,
}

impl VecSink {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            only: None,
        }
    }

    /// Collect only events of the listed kinds.
    pub fn only(kinds: &[SimulationEventKind]) -> Self {
        Self {
            events: Vec::new(),
            only: Some(kinds.to_vec()),
        }
    }

    pub fn into_inner(self) -> Vec<SimulationEvent> {
        self.events
    }

    pub fn as_slice(&self) -> &[SimulationEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for VecSink {
    #[inline]
    fn send(&mut self, event: SimulationEvent) {
        if self.wants(event.kind()) {
            self.events.push(event);
        }
    }

    fn wants(&self, kind: SimulationEventKind) -> bool {
        self.only.as_ref().is_none_or(|k| k.contains(&kind))
    }
}

/// Fan-out sink that forwards each event to all contained sinks.
pub struct MultiSink<S: EventSink> {
    pub(crate) sinks: Vec<S>,
}

impl<S: EventSink> MultiSink<S> {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn with_sinks(sinks: Vec<S>) -> Self {
        Self { sinks }
    }

    pub fn push(&mut self, sink: S) {
        self.sinks.push(sink);
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }
}

impl<S: EventSink> Default for MultiSink<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: EventSink> EventSink for MultiSink<S> {
    fn send(&mut self, event: SimulationEvent) {
        let kind = event.kind();
        let targets: Vec<usize> = (0..self.sinks.len())
            .filter(|&i| self.sinks[i].wants(kind))
            .collect();
        let Some((&last, rest)) = targets.split_last() else {
            return;
        };
        for &i in rest {
            self.sinks[i].send(event.clone());
        }
        self.sinks[last].send(event);
    }

    fn wants(&self, kind: SimulationEventKind) -> bool {
        self.sinks.iter().any(|s| s.wants(kind))
    }
}
